use crate::config::{EngineConfig, ScoringMode};
use crate::error::SearchError;
use crate::index::{DocId, Document, Index};
use crate::indexer::{eligible_files, load_file};
use crate::reader::read_text;
use crate::tokenizer::query_terms;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: DocId,
    pub path: PathBuf,
    pub title: String,
    pub score: u64,
    pub preview: String,
}

/// Sum over query terms of the number of non-overlapping substring matches in
/// `content_lower`. Repeated query terms count once per repetition.
pub fn score_content(content_lower: &str, terms: &[String]) -> u64 {
    terms
        .iter()
        .filter(|t| !t.is_empty())
        .map(|t| content_lower.matches(t.as_str()).count() as u64)
        .sum()
}

/// First `max_chars` characters of the raw content, with `...` appended when truncated.
pub fn make_preview(content: &str, max_chars: usize) -> String {
    match content.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &content[..cut]),
        None => content.to_string(),
    }
}

/// Score every eligible file under the root without consulting an index.
pub fn search_directory(query: &str, limit: usize, config: &EngineConfig) -> Result<Vec<SearchResult>, SearchError> {
    if limit == 0 {
        return Err(SearchError::InvalidLimit);
    }
    let terms = query_terms(query);
    if terms.is_empty() {
        return Ok(Vec::new());
    }

    let mut skipped = Vec::new();
    let files = eligible_files(config, &mut skipped)?;
    let mut results = Vec::new();
    for path in files {
        match load_file(&config.root, &path) {
            Ok(loaded) => {
                if let Some(hit) = score_document(&loaded.doc, &loaded.content, &terms, config) {
                    results.push(hit);
                }
            }
            Err(err) => warn!(path = %path.display(), error = %err, "skipping file during scan"),
        }
    }
    Ok(rank(results, limit))
}

/// Score the documents of a built index, rereading each file's content.
pub fn search_index(index: &Index, query: &str, limit: usize, config: &EngineConfig) -> Result<Vec<SearchResult>, SearchError> {
    if limit == 0 {
        return Err(SearchError::InvalidLimit);
    }
    let terms = query_terms(query);
    if terms.is_empty() {
        return Ok(Vec::new());
    }

    let candidates: Option<HashSet<&str>> = match config.scoring {
        ScoringMode::Exhaustive => None,
        ScoringMode::Pruned => Some(
            terms
                .iter()
                .flat_map(|t| index.documents_for_keyword(t))
                .collect(),
        ),
    };

    let mut results = Vec::new();
    for doc in &index.documents {
        if let Some(c) = &candidates {
            if !c.contains(doc.id.as_str()) {
                continue;
            }
        }
        let content = match read_text(&doc.path) {
            Ok(c) => c,
            Err(err) => {
                warn!(id = %doc.id, error = %err, "skipping indexed document");
                continue;
            }
        };
        if let Some(hit) = score_document(doc, &content, &terms, config) {
            results.push(hit);
        }
    }
    debug!(query, hits = results.len(), "scored index");
    Ok(rank(results, limit))
}

fn score_document(doc: &Document, content: &str, terms: &[String], config: &EngineConfig) -> Option<SearchResult> {
    let score = score_content(&content.to_lowercase(), terms);
    if score == 0 {
        return None;
    }
    Some(SearchResult {
        id: doc.id.clone(),
        path: doc.path.clone(),
        title: doc.title.clone(),
        score,
        preview: make_preview(content, config.preview_chars),
    })
}

/// Score descending; `sort_by` is stable so ties keep scan order. Truncate after sorting.
fn rank(mut results: Vec<SearchResult>, limit: usize) -> Vec<SearchResult> {
    results.sort_by(|a, b| b.score.cmp(&a.score));
    results.truncate(limit);
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substring_counts_include_longer_words() {
        let terms = vec!["agent".to_string()];
        assert_eq!(score_content("agents and agentic agent", &terms), 3);
    }

    #[test]
    fn repeated_terms_count_each_time() {
        let terms = vec!["rust".to_string(), "rust".to_string()];
        assert_eq!(score_content("rust is rusty", &terms), 4);
    }

    #[test]
    fn matches_do_not_overlap() {
        assert_eq!(score_content("aaaa", &["aa".to_string()]), 2);
    }

    #[test]
    fn preview_truncates_on_char_boundary() {
        assert_eq!(make_preview("short", 200), "short");
        let exact = "x".repeat(200);
        assert_eq!(make_preview(&exact, 200), exact);
        let long = "é".repeat(250);
        let p = make_preview(&long, 200);
        assert_eq!(p.chars().count(), 203);
        assert!(p.ends_with("..."));
    }

    #[test]
    fn rank_is_stable_and_truncates_after_sort() {
        let mk = |id: &str, score| SearchResult { id: id.into(), path: PathBuf::from(id), title: id.into(), score, preview: String::new() };
        let ranked = rank(vec![mk("a", 1), mk("b", 3), mk("c", 1), mk("d", 3)], 3);
        let ids: Vec<&str> = ranked.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "d", "a"]);
    }
}
