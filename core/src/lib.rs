//! Keyword search over a directory of text documents: a directory indexer with
//! top-K keyword postings, substring term-frequency scoring, and a JSON index file.

pub mod config;
pub mod error;
pub mod index;
pub mod indexer;
pub mod persist;
pub mod reader;
pub mod search;
pub mod tokenizer;

pub use config::{EngineConfig, ScoringMode};
pub use error::{IndexError, ReadError, SearchError};
pub use index::{DocId, Document, Index};
pub use indexer::{index_directory, index_directory_with_report, IndexReport, SkippedFile};
pub use persist::{ensure_index, load_index, save_index};
pub use reader::{read_document, read_document_in_root, DocumentContent};
pub use search::{search_directory, search_index, SearchResult};
