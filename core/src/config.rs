use crate::tokenizer::{DEFAULT_KEYWORD_LIMIT, DEFAULT_MIN_KEYWORD_LEN};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_EXTENSIONS: &[&str] = &["md", "txt", "html"];
pub const DEFAULT_PREVIEW_CHARS: usize = 200;
pub const DEFAULT_RESULT_LIMIT: usize = 5;

/// How index-assisted search chooses which documents to score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringMode {
    /// Rescan every indexed document.
    #[default]
    Exhaustive,
    /// Only score documents whose keyword postings contain a query term.
    Pruned,
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub root: PathBuf,
    /// File extensions (without the dot) eligible for indexing. Case-sensitive.
    pub extensions: Vec<String>,
    pub keyword_limit: usize,
    pub min_keyword_len: usize,
    pub preview_chars: usize,
    pub scoring: ScoringMode,
}

impl EngineConfig {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            keyword_limit: DEFAULT_KEYWORD_LIMIT,
            min_keyword_len: DEFAULT_MIN_KEYWORD_LEN,
            preview_chars: DEFAULT_PREVIEW_CHARS,
            scoring: ScoringMode::default(),
        }
    }

    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions
            .into_iter()
            .map(|e| e.into().trim_start_matches('.').to_string())
            .collect();
        self
    }

    pub fn with_scoring(mut self, scoring: ScoringMode) -> Self {
        self.scoring = scoring;
        self
    }

    pub fn with_keyword_limit(mut self, limit: usize) -> Self {
        self.keyword_limit = limit;
        self
    }

    pub fn with_preview_chars(mut self, chars: usize) -> Self {
        self.preview_chars = chars;
        self
    }

    pub fn is_eligible(&self, path: &Path) -> bool {
        match path.extension().and_then(|s| s.to_str()) {
            Some(ext) => self.extensions.iter().any(|e| e == ext),
            None => false,
        }
    }
}
