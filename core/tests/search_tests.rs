use docsearch_core::{index_directory, search_directory, search_index, EngineConfig, ScoringMode, SearchError};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn write(root: &Path, rel: &str, content: &str) {
    let p = root.join(rel);
    if let Some(dir) = p.parent() {
        fs::create_dir_all(dir).unwrap();
    }
    fs::write(p, content).unwrap();
}

#[test]
fn ranks_by_term_frequency_in_both_modes() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.md", "Strands agent framework");
    write(dir.path(), "b.md", "Strands Strands Strands");
    let cfg = EngineConfig::new(dir.path());

    let direct = search_directory("Strands", 5, &cfg).unwrap();
    let ids: Vec<(&str, u64)> = direct.iter().map(|r| (r.id.as_str(), r.score)).collect();
    assert_eq!(ids, vec![("b.md", 3), ("a.md", 1)]);

    let index = index_directory(&cfg).unwrap();
    let indexed = search_index(&index, "Strands", 5, &cfg).unwrap();
    assert_eq!(direct, indexed);
}

#[test]
fn empty_root_yields_no_results() {
    let dir = tempdir().unwrap();
    let cfg = EngineConfig::new(dir.path().join("docs"));
    let index = index_directory(&cfg).unwrap();
    assert!(index.documents.is_empty());
    assert!(search_index(&index, "anything", 5, &cfg).unwrap().is_empty());
    assert!(search_directory("anything", 5, &cfg).unwrap().is_empty());
}

#[test]
fn empty_query_yields_no_results() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.md", "content");
    let cfg = EngineConfig::new(dir.path());
    assert!(search_directory("   ", 5, &cfg).unwrap().is_empty());
}

#[test]
fn zero_limit_is_rejected() {
    let dir = tempdir().unwrap();
    let cfg = EngineConfig::new(dir.path());
    assert!(matches!(search_directory("x", 0, &cfg), Err(SearchError::InvalidLimit)));
    let index = index_directory(&cfg).unwrap();
    assert!(matches!(search_index(&index, "x", 0, &cfg), Err(SearchError::InvalidLimit)));
}

#[test]
fn non_matching_documents_are_excluded() {
    let dir = tempdir().unwrap();
    write(dir.path(), "hit.txt", "tool calling");
    write(dir.path(), "miss.txt", "nothing relevant");
    let cfg = EngineConfig::new(dir.path());
    let results = search_directory("tool", 5, &cfg).unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id, "hit.txt");
}

#[test]
fn limit_returns_top_n_with_scan_order_ties() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.txt", "rust");
    write(dir.path(), "b.txt", "rust rust rust");
    write(dir.path(), "c.txt", "rust rust");
    write(dir.path(), "d.txt", "rust rust");
    write(dir.path(), "e.txt", "rust");
    let cfg = EngineConfig::new(dir.path());

    let results = search_directory("rust", 3, &cfg).unwrap();
    let ids: Vec<&str> = results.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["b.txt", "c.txt", "d.txt"]);

    let index = index_directory(&cfg).unwrap();
    let results = search_index(&index, "rust", 4, &cfg).unwrap();
    let ids: Vec<&str> = results.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["b.txt", "c.txt", "d.txt", "a.txt"]);
}

#[test]
fn scoring_is_monotonic_in_term_counts() {
    let dir = tempdir().unwrap();
    for n in 1..=6 {
        let body = vec!["agent tool"; n].join(" filler ");
        write(dir.path(), &format!("doc{n}.txt"), &body);
    }
    let cfg = EngineConfig::new(dir.path());
    let results = search_directory("agent tool", 10, &cfg).unwrap();
    assert_eq!(results.len(), 6);
    for pair in results.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
    assert_eq!(results[0].id, "doc6.txt");
    assert_eq!(results[0].score, 12);
}

#[test]
fn preview_keeps_original_case_and_marks_truncation() {
    let dir = tempdir().unwrap();
    let long = format!("Intro To Agents. {}", "More Words ".repeat(40));
    write(dir.path(), "long.md", &long);
    write(dir.path(), "short.md", "Agents Are Short");
    let cfg = EngineConfig::new(dir.path());
    let results = search_directory("agents", 5, &cfg).unwrap();

    let short = results.iter().find(|r| r.id == "short.md").unwrap();
    assert_eq!(short.preview, "Agents Are Short");
    let long_hit = results.iter().find(|r| r.id == "long.md").unwrap();
    assert!(long_hit.preview.starts_with("Intro To Agents."));
    assert!(long_hit.preview.ends_with("..."));
    assert_eq!(long_hit.preview.chars().count(), 203);
}

#[test]
fn index_mode_rereads_current_content() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.txt", "nothing yet");
    let cfg = EngineConfig::new(dir.path());
    let index = index_directory(&cfg).unwrap();
    write(dir.path(), "a.txt", "memory memory");
    let results = search_index(&index, "memory", 5, &cfg).unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].score, 2);
}

#[test]
fn index_mode_skips_documents_deleted_since_indexing() {
    let dir = tempdir().unwrap();
    write(dir.path(), "gone.txt", "agent");
    write(dir.path(), "kept.txt", "agent");
    let cfg = EngineConfig::new(dir.path());
    let index = index_directory(&cfg).unwrap();
    fs::remove_file(dir.path().join("gone.txt")).unwrap();
    let results = search_index(&index, "agent", 5, &cfg).unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id, "kept.txt");
}

#[test]
fn exhaustive_and_pruned_scoring_diverge_on_substring_only_matches() {
    let dir = tempdir().unwrap();
    // "agents" is a keyword here, "agent" is not
    write(dir.path(), "plural.md", "agents agents coordinate");
    // "agent" is a keyword here
    write(dir.path(), "singular.md", "agent runtime");
    let exhaustive = EngineConfig::new(dir.path());
    let pruned = EngineConfig::new(dir.path()).with_scoring(ScoringMode::Pruned);
    let index = index_directory(&exhaustive).unwrap();

    let all = search_index(&index, "agent", 5, &exhaustive).unwrap();
    let ids: Vec<&str> = all.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["plural.md", "singular.md"]);

    let some = search_index(&index, "agent", 5, &pruned).unwrap();
    let ids: Vec<&str> = some.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["singular.md"]);
}

#[test]
fn pruned_scoring_misses_short_terms() {
    let dir = tempdir().unwrap();
    write(dir.path(), "api.md", "the api docs");
    let cfg = EngineConfig::new(dir.path());
    let index = index_directory(&cfg).unwrap();
    assert_eq!(search_index(&index, "api", 5, &cfg).unwrap().len(), 1);
    let pruned = cfg.clone().with_scoring(ScoringMode::Pruned);
    assert!(search_index(&index, "api", 5, &pruned).unwrap().is_empty());
}

#[test]
fn preview_length_is_configurable() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.txt", "Memory Systems For Agents");
    let cfg = EngineConfig::new(dir.path()).with_preview_chars(6);
    let results = search_directory("memory", 5, &cfg).unwrap();
    assert_eq!(results[0].preview, "Memory...");
}

#[test]
fn direct_scan_skips_undecodable_files() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.txt", "memory layer");
    fs::write(dir.path().join("b.txt"), b"memory memory memory \xff\xfe").unwrap();
    write(dir.path(), "c.txt", "memory memory");
    let cfg = EngineConfig::new(dir.path());

    let results = search_directory("memory", 5, &cfg).unwrap();
    let ids: Vec<(&str, u64)> = results.iter().map(|r| (r.id.as_str(), r.score)).collect();
    assert_eq!(ids, vec![("c.txt", 2), ("a.txt", 1)]);
}

#[cfg(unix)]
#[test]
fn direct_scan_follows_symlinked_files() {
    let outer = tempdir().unwrap();
    let root = outer.path().join("docs");
    fs::create_dir_all(&root).unwrap();
    fs::write(outer.path().join("shared.md"), "strands strands").unwrap();
    write(&root, "plain.md", "strands");
    std::os::unix::fs::symlink(outer.path().join("shared.md"), root.join("link.md")).unwrap();

    let results = search_directory("strands", 5, &EngineConfig::new(&root)).unwrap();
    let ids: Vec<&str> = results.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["link.md", "plain.md"]);
}
