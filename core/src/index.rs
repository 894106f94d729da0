use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

/// Stable identifier: the path relative to the document root, `/`-separated.
pub type DocId = String;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "DocumentRecord")]
pub struct Document {
    pub id: DocId,
    pub path: PathBuf,
    pub title: String,
    /// Content length in bytes at index time.
    pub size: u64,
    /// Modification time at index time, unix milliseconds.
    pub modified_ms: u64,
}

/// Accepts both the current record and older ones carrying `modified` in float seconds.
#[derive(Deserialize)]
struct DocumentRecord {
    id: DocId,
    path: PathBuf,
    title: String,
    size: u64,
    #[serde(default)]
    modified_ms: Option<u64>,
    #[serde(default)]
    modified: Option<f64>,
}

impl From<DocumentRecord> for Document {
    fn from(r: DocumentRecord) -> Self {
        let modified_ms = r
            .modified_ms
            .or_else(|| r.modified.filter(|s| s.is_finite() && *s >= 0.0).map(|s| (s * 1000.0).round() as u64))
            .unwrap_or(0);
        Document { id: r.id, path: r.path, title: r.title, size: r.size, modified_ms }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Index {
    /// Discovery order of the directory walk.
    pub documents: Vec<Document>,
    /// keyword -> ids of documents whose top keywords contain it
    pub keyword_postings: BTreeMap<String, BTreeSet<DocId>>,
}

impl Index {
    pub fn new() -> Self { Self::default() }

    pub fn is_empty(&self) -> bool { self.documents.is_empty() }

    pub fn len(&self) -> usize { self.documents.len() }

    pub fn get(&self, id: &str) -> Option<&Document> {
        self.documents.iter().find(|d| d.id == id)
    }

    /// Append a document and register it under each of its keywords.
    pub fn insert(&mut self, doc: Document, keywords: &[String]) {
        for kw in keywords {
            self.keyword_postings.entry(kw.clone()).or_default().insert(doc.id.clone());
        }
        self.documents.push(doc);
    }

    /// Posting list for `keyword`, in id order.
    pub fn documents_for_keyword(&self, keyword: &str) -> Vec<&str> {
        self.keyword_postings
            .get(&keyword.to_lowercase())
            .map(|ids| ids.iter().map(|id| id.as_str()).collect())
            .unwrap_or_default()
    }
}
