use crate::error::ReadError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Component, Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentContent {
    pub path: PathBuf,
    pub content: String,
}

/// Read a whole file as UTF-8 text.
pub(crate) fn read_text(path: &Path) -> Result<String, ReadError> {
    let bytes = fs::read(path).map_err(|e| ReadError::from_io(path.to_path_buf(), e))?;
    String::from_utf8(bytes).map_err(|_| ReadError::Decode(path.to_path_buf()))
}

/// Read one document by path, exactly as given.
pub fn read_document<P: AsRef<Path>>(path: P) -> Result<DocumentContent, ReadError> {
    let path = path.as_ref();
    let content = read_text(path)?;
    Ok(DocumentContent { path: path.to_path_buf(), content })
}

/// Read a document addressed relative to `root`. Absolute paths are accepted
/// only when they lie under the root, and `..` may not climb out of it.
pub fn read_document_in_root<R: AsRef<Path>, P: AsRef<Path>>(root: R, path: P) -> Result<DocumentContent, ReadError> {
    let root = root.as_ref();
    let requested = path.as_ref();
    let joined = if requested.is_absolute() { requested.to_path_buf() } else { root.join(requested) };

    let canonical_root = fs::canonicalize(root).map_err(|e| ReadError::from_io(root.to_path_buf(), e))?;
    let canonical = match fs::canonicalize(&joined) {
        Ok(p) => p,
        Err(e) => {
            // escaping paths are refused whether or not they exist
            let outside = if requested.is_absolute() {
                let normalized = normalize_lexically(requested);
                !normalized.starts_with(&canonical_root) && !normalized.starts_with(normalize_lexically(root))
            } else {
                climbs_out(requested)
            };
            if outside {
                return Err(ReadError::OutsideRoot(requested.to_path_buf()));
            }
            return Err(ReadError::from_io(requested.to_path_buf(), e));
        }
    };
    if !canonical.starts_with(&canonical_root) {
        return Err(ReadError::OutsideRoot(requested.to_path_buf()));
    }
    let content = read_text(&canonical)?;
    Ok(DocumentContent { path: joined, content })
}

/// Resolve `.` and `..` without touching the filesystem.
fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for comp in path.components() {
        match comp {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

fn climbs_out(path: &Path) -> bool {
    let mut depth: i32 = 0;
    for comp in path.components() {
        match comp {
            Component::ParentDir => depth -= 1,
            Component::Normal(_) => depth += 1,
            _ => {}
        }
        if depth < 0 {
            return true;
        }
    }
    false
}
