use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;

lazy_static! {
    static ref RE: Regex = Regex::new(r"\w+").expect("valid regex");
}

/// Number of keywords kept per document.
pub const DEFAULT_KEYWORD_LIMIT: usize = 20;
/// Tokens must be strictly longer than this (in characters) to be keywords.
pub const DEFAULT_MIN_KEYWORD_LEN: usize = 3;

/// Tokenize text into (term, position): maximal runs of word characters, lowercased.
/// No stemming and no stopword list.
pub fn tokenize(text: &str) -> Vec<(String, usize)> {
    let lowered = text.to_lowercase();
    RE.find_iter(&lowered)
        .enumerate()
        .map(|(pos, mat)| (mat.as_str().to_string(), pos))
        .collect()
}

/// Lowercase whitespace-separated query terms. Repeated terms are kept.
pub fn query_terms(query: &str) -> Vec<String> {
    query.split_whitespace().map(|t| t.to_lowercase()).collect()
}

/// Top `limit` tokens longer than `min_len` characters, ranked by in-document
/// frequency. Ties keep first-occurrence order.
pub fn extract_keywords(text: &str, limit: usize, min_len: usize) -> Vec<String> {
    let mut slots: HashMap<String, usize> = HashMap::new();
    let mut counts: Vec<(String, u32)> = Vec::new();
    for (term, _pos) in tokenize(text) {
        if term.chars().count() <= min_len {
            continue;
        }
        match slots.get(&term) {
            Some(&i) => counts[i].1 += 1,
            None => {
                slots.insert(term.clone(), counts.len());
                counts.push((term, 1));
            }
        }
    }
    // stable sort preserves first-occurrence order among equal counts
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.truncate(limit);
    counts.into_iter().map(|(term, _)| term).collect()
}
