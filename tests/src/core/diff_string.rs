use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use veil_core::{DiffString, Edit};

/// Imperative reference application of an edit list.
fn apply_edits(source: &str, edits: &[Edit]) -> String {
    let mut text = source.to_string();
    for edit in edits {
        let start = edit.pos as usize;
        text.replace_range(start..start + edit.delete as usize, &edit.insert);
    }
    text
}

fn hash_of(diff: &DiffString) -> u64 {
    let mut hasher = DefaultHasher::new();
    diff.hash(&mut hasher);
    hasher.finish()
}

#[test]
fn materialization_matches_imperative_application() {
    let source = "the quick brown fox jumps over the lazy dog";
    let edits = vec![
        Edit::new(4, 5, "slow "),
        Edit::new(10, 5, "red "),
        Edit::new(0, 3, "a"),
        Edit::new(20, 0, "very "),
    ];

    let mut diff = DiffString::from(source);
    for edit in &edits {
        diff.edit(edit.clone());
    }

    assert_eq!(diff.string(), apply_edits(source, &edits));
    assert_eq!(diff.log_size(), edits.len());
}

#[test]
fn equality_follows_the_materialized_text() {
    let mut left = DiffString::from("abcdef");
    left.edit(Edit::new(0, 3, "xyz"));

    let mut right = DiffString::from("uvwdef");
    right.edit(Edit::new(0, 3, "xyz"));

    // Different sources and edit paths, same final text.
    assert_eq!(left, right);
    assert_eq!(left.hash_value(), right.hash_value());
    assert_eq!(hash_of(&left), hash_of(&right));

    right.edit(Edit::new(5, 1, "g"));
    assert_ne!(left, right);
    assert_ne!(left.hash_value(), right.hash_value());
}

#[test]
fn apply_compacts_and_keeps_text_and_hash() {
    let mut diff = DiffString::from("one two three");
    diff.edit(Edit::new(4, 3, "2.0"));
    let text = diff.string();
    let hash = diff.hash_value();

    diff.apply();
    assert_eq!(diff.log_size(), 0);
    assert_eq!(diff.string(), text);
    assert_eq!(diff.hash_value(), hash);
    assert_eq!(diff.source().as_str(), text);
}

#[test]
fn edit_with_text_trusts_the_caller_hash_source() {
    let mut diff = DiffString::from("hello world");
    let edited = "hello moon!";
    diff.edit_with_text(Edit::new(6, 5, "moon!"), edited);

    assert_eq!(diff.string(), edited);
    assert_eq!(diff.hash_value(), DiffString::from(edited).hash_value());
}

#[test]
fn reset_discards_history() {
    let mut diff = DiffString::from("before");
    diff.edit(Edit::new(0, 6, "after"));
    diff.reset(std::sync::Arc::new("fresh".to_string()));

    assert_eq!(diff.log_size(), 0);
    assert_eq!(diff.string(), "fresh");
}
