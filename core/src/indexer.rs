use crate::config::EngineConfig;
use crate::error::{IndexError, ReadError, Result};
use crate::index::{DocId, Document, Index};
use crate::reader::read_text;
use crate::tokenizer::extract_keywords;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::time::UNIX_EPOCH;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

lazy_static! {
    static ref HEADING: Regex = Regex::new(r"(?m)^#\s+(.+)$").expect("valid regex");
}

/// A file that was eligible but could not be indexed.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct IndexReport {
    pub index: Index,
    pub skipped: Vec<SkippedFile>,
}

/// An eligible file read from disk, with its metadata derived.
pub(crate) struct LoadedFile {
    pub doc: Document,
    pub content: String,
}

/// Build a fresh index of every eligible file under `config.root`.
pub fn index_directory(config: &EngineConfig) -> Result<Index> {
    index_directory_with_report(config).map(|r| r.index)
}

pub fn index_directory_with_report(config: &EngineConfig) -> Result<IndexReport> {
    let mut skipped = Vec::new();
    let mut index = Index::new();

    for path in eligible_files(config, &mut skipped)? {
        let loaded = match load_file(&config.root, &path) {
            Ok(l) => l,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "skipping file");
                skipped.push(SkippedFile { path, reason: err.to_string() });
                continue;
            }
        };
        let keywords = extract_keywords(&loaded.content, config.keyword_limit, config.min_keyword_len);
        debug!(id = %loaded.doc.id, keywords = keywords.len(), "indexed document");
        index.insert(loaded.doc, &keywords);
    }

    info!(
        root = %config.root.display(),
        num_docs = index.len(),
        num_keywords = index.keyword_postings.len(),
        skipped = skipped.len(),
        "index build complete"
    );
    Ok(IndexReport { index, skipped })
}

/// Walk the root in file-name order and collect eligible files. A missing
/// root is created and yields nothing. Only a failure to enumerate the root
/// itself is fatal; unreadable subdirectories are recorded in `skipped`.
pub(crate) fn eligible_files(config: &EngineConfig, skipped: &mut Vec<SkippedFile>) -> Result<Vec<PathBuf>> {
    let root = &config.root;
    if !root.exists() {
        fs::create_dir_all(root).map_err(|source| IndexError::CreateRoot { path: root.clone(), source })?;
        info!(root = %root.display(), "created document root");
        return Ok(Vec::new());
    }
    if !root.is_dir() {
        return Err(IndexError::NotADirectory(root.clone()));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(e) => e,
            Err(err) if err.depth() == 0 => {
                return Err(IndexError::Walk { path: root.clone(), source: err });
            }
            Err(err) => {
                let path = err.path().map(Path::to_path_buf).unwrap_or_else(|| root.clone());
                warn!(path = %path.display(), error = %err, "skipping unreadable entry");
                skipped.push(SkippedFile { path, reason: err.to_string() });
                continue;
            }
        };
        // symlinked files count; symlinked directories are not descended into
        let is_file = entry.file_type().is_file() || (entry.path_is_symlink() && entry.path().is_file());
        if is_file && config.is_eligible(entry.path()) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

pub(crate) fn load_file(root: &Path, path: &Path) -> std::result::Result<LoadedFile, ReadError> {
    let id = doc_id(root, path).ok_or_else(|| ReadError::NonUtf8Path(path.to_path_buf()))?;
    let content = read_text(path)?;
    let modified_ms = fs::metadata(path)
        .and_then(|m| m.modified())
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);
    let doc = Document {
        id,
        path: path.to_path_buf(),
        title: extract_title(path, &content),
        size: content.len() as u64,
        modified_ms,
    };
    Ok(LoadedFile { doc, content })
}

/// Root-relative path with components joined by `/`, independent of platform separator.
/// `None` when a component is not valid UTF-8.
pub fn doc_id(root: &Path, path: &Path) -> Option<DocId> {
    let rel = path.strip_prefix(root).unwrap_or(path);
    let parts = rel
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_str()),
            _ => None,
        })
        .collect::<Option<Vec<_>>>()?;
    Some(parts.join("/"))
}

/// First `# ` heading of a markdown file, otherwise the file name.
pub fn extract_title(path: &Path, content: &str) -> String {
    let file_name = path
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    if path.extension().and_then(|s| s.to_str()) == Some("md") {
        if let Some(cap) = HEADING.captures(content) {
            let heading = cap[1].trim();
            if !heading.is_empty() {
                return heading.to_string();
            }
        }
        debug!(path = %path.display(), "no heading, using file name as title");
    }
    file_name
}
