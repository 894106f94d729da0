use crate::config::EngineConfig;
use crate::error::{IndexError, Result};
use crate::index::{DocId, Document, Index};
use crate::indexer::index_directory;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fs::{create_dir_all, File};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::Path;
use time::format_description::well_known::Rfc3339;
use tracing::info;

pub const INDEX_FORMAT_VERSION: u32 = 1;
pub const DEFAULT_INDEX_FILE: &str = "docs_index.json";

/// On-disk layout: the index fields plus a small header. Unknown fields are
/// ignored on read, and `files` is accepted for `documents`.
#[derive(Debug, Deserialize)]
pub struct IndexFile {
    #[serde(default)]
    pub version: u32,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(alias = "files")]
    pub documents: Vec<Document>,
    pub keywords: BTreeMap<String, BTreeSet<DocId>>,
}

#[derive(Serialize)]
struct IndexFileRef<'a> {
    version: u32,
    created_at: Option<String>,
    documents: &'a [Document],
    keywords: &'a BTreeMap<String, BTreeSet<DocId>>,
}

impl IndexFile {
    /// Ids must be unique and every posting must name a listed document.
    pub fn into_index(self) -> std::result::Result<Index, String> {
        let mut ids: HashSet<&str> = HashSet::with_capacity(self.documents.len());
        for doc in &self.documents {
            if !ids.insert(doc.id.as_str()) {
                return Err(format!("duplicate document id {:?}", doc.id));
            }
        }
        for (keyword, plist) in &self.keywords {
            if let Some(id) = plist.iter().find(|id| !ids.contains(id.as_str())) {
                return Err(format!("keyword {keyword:?} names unknown document {id:?}"));
            }
        }
        Ok(Index { documents: self.documents, keyword_postings: self.keywords })
    }
}

/// Write the index as pretty JSON, replacing any existing file.
pub fn save_index<P: AsRef<Path>>(index: &Index, path: P) -> Result<()> {
    let path = path.as_ref();
    let io_err = |source| IndexError::Io { path: path.to_path_buf(), source };
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        create_dir_all(dir).map_err(io_err)?;
    }
    let file = IndexFileRef {
        version: INDEX_FORMAT_VERSION,
        created_at: time::OffsetDateTime::now_utc().format(&Rfc3339).ok(),
        documents: &index.documents,
        keywords: &index.keyword_postings,
    };
    let mut w = BufWriter::new(File::create(path).map_err(io_err)?);
    serde_json::to_writer_pretty(&mut w, &file).map_err(|e| {
        if e.is_io() { io_err(e.into()) } else { IndexError::Json(e) }
    })?;
    w.flush().map_err(io_err)?;
    Ok(())
}

/// Read a persisted index. `Ok(None)` when the file does not exist.
pub fn read_index_file<P: AsRef<Path>>(path: P) -> Result<Option<Index>> {
    let path = path.as_ref();
    let f = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(source) => return Err(IndexError::Io { path: path.to_path_buf(), source }),
    };
    let file: IndexFile = serde_json::from_reader(BufReader::new(f))
        .map_err(|source| IndexError::Corrupt { path: path.to_path_buf(), source })?;
    let index = file
        .into_index()
        .map_err(|reason| IndexError::Inconsistent { path: path.to_path_buf(), reason })?;
    Ok(Some(index))
}

/// Load the index at `path`, building a fresh one from `config.root` when the file is absent.
pub fn load_index<P: AsRef<Path>>(path: P, config: &EngineConfig) -> Result<Index> {
    let path = path.as_ref();
    match read_index_file(path)? {
        Some(index) => Ok(index),
        None => {
            info!(path = %path.display(), "index file missing, rebuilding");
            index_directory(config)
        }
    }
}

/// Return `maybe_index` if it holds documents, otherwise build one from `config.root`.
pub fn ensure_index(maybe_index: Option<Index>, config: &EngineConfig) -> Result<Index> {
    match maybe_index {
        Some(index) if !index.is_empty() => Ok(index),
        _ => index_directory(config),
    }
}
