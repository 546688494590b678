use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use veil_obfuscate::ops::dictionary::load_dictionary;
use veil_obfuscate::ops::{
    CharacterFlip, LexicalReplacement, NgramRemoval, PunctuationMap, WordRemoval, WordReplacement,
};
use veil_obfuscate::{Phrase, PhraseService};
use veil_search::Operator;

use super::{context_of, services, state_of};

fn temp_file(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("veil-{}-{}", std::process::id(), name));
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn dictionaries_load_lowercased_and_memoized() {
    let path = temp_file(
        "dict.tsv",
        "Good\tfine\tnice\nlonely\nBright\tshiny\n\nCat\tfeline\n",
    );
    let services = services();

    let dict = load_dictionary(&services, &path, '\t').expect("dictionary loads");
    assert_eq!(
        dict.get("good").map(Vec::as_slice),
        Some(["fine".to_string(), "nice".to_string()].as_slice())
    );
    assert_eq!(dict.get("bright").map(Vec::len), Some(1));
    assert!(dict.get("lonely").is_none(), "one-field lines are skipped");
    assert!(dict.get("Good").is_none(), "keys are stored lowercased");

    let again = load_dictionary(&services, &path, '\t').unwrap();
    assert!(Arc::ptr_eq(&dict, &again), "second load must hit the cache");

    fs::remove_file(&path).ok();
}

#[test]
fn missing_dictionary_yields_none() {
    let services = services();
    let path = PathBuf::from("/nonexistent/veil-dictionary.tsv");
    assert!(load_dictionary(&services, &path, '\t').is_none());
}

#[test]
fn ngram_removal_deletes_the_focus_window() {
    let state = state_of("one the two the six the ten");
    let context = context_of("the the the the the the");
    let operator = NgramRemoval::new(services());

    let successors = operator.apply(&state, &context);
    assert!(!successors.is_empty());

    let original = state.text().string();
    for successor in &successors {
        let text = successor.text().string();
        assert_ne!(text, original);
        assert_eq!(text.len(), original.len() - 3);
    }
}

#[test]
fn character_flip_swaps_neighbors() {
    let state = state_of("abcd abcd abcd abcd");
    let context = context_of("abc abc abc abc abc");
    let operator = CharacterFlip::new(services());

    let successors = operator.apply(&state, &context);
    assert!(!successors.is_empty());

    let original = state.text().string();
    for successor in &successors {
        let text = successor.text().string();
        assert_eq!(text.len(), original.len(), "a flip preserves length");
        assert_ne!(text, original);
        let differing = text
            .bytes()
            .zip(original.bytes())
            .filter(|(a, b)| a != b)
            .count();
        assert_eq!(differing, 2, "exactly one adjacent pair changed");
    }
}

#[test]
fn punctuation_maps_to_table_variants() {
    let state = state_of("a, b a, b a, b a, b");
    let context = context_of("a, a, a, a, a, a, a,");
    let operator = PunctuationMap::new(services());

    let successors = operator.apply(&state, &context);
    assert!(!successors.is_empty());

    let original = state.text().string();
    for successor in &successors {
        let text = successor.text().string();
        assert_eq!(text.len(), original.len());
        assert!(
            text.contains(';') || text.contains('.'),
            "comma mapped to one of its variants: {text}"
        );
    }
}

#[test]
fn lexical_replacement_substitutes_the_focus_word() {
    let dict = temp_file("synonyms.tsv", "the\tsome\tthat\n");
    let state = state_of("one the two the six the ten");
    let context = context_of("the the the the the the");
    let operator = LexicalReplacement::synonyms(services(), dict.clone());

    let successors = operator.apply(&state, &context);
    assert!(!successors.is_empty());

    for successor in &successors {
        let text = successor.text().string();
        assert!(
            text.contains("some") || text.contains("that"),
            "an alternative must be substituted: {text}"
        );
    }

    fs::remove_file(&dict).ok();
}

#[test]
fn lexical_replacement_without_dictionary_is_silent() {
    let state = state_of("one the two the six the ten");
    let context = context_of("the the the the the the");
    let operator =
        LexicalReplacement::hypernyms(services(), PathBuf::from("/nonexistent/veil-h.tsv"));

    assert!(operator.apply(&state, &context).is_empty());
}

/// Canned phrase-service: the same response for every query.
struct StubPhrases {
    frequency: u64,
}

impl PhraseService for StubPhrases {
    fn search(&self, _query: &str, max_results: u32) -> Vec<Phrase> {
        (0..max_results as usize)
            .map(|i| Phrase {
                words: (0..6).map(|w| format!("w{w}{i}")).collect(),
                frequency: self.frequency,
            })
            .collect()
    }
}

#[test]
fn word_replacement_uses_frequent_completions() {
    let state = state_of("one the two the six the ten");
    let context = context_of("the the the the the the");
    let backend = Arc::new(StubPhrases { frequency: 100_000 });
    let operator = WordReplacement::new(services(), backend);

    let successors = operator.apply(&state, &context);
    assert!(!successors.is_empty());

    let original = state.text().string();
    for successor in &successors {
        assert_ne!(successor.text().string(), original);
    }
}

#[test]
fn word_replacement_filters_rare_completions() {
    let state = state_of("one the two the six the ten");
    let context = context_of("the the the the the the");
    let backend = Arc::new(StubPhrases { frequency: 10 });
    let operator = WordReplacement::new(services(), backend);

    assert!(operator.apply(&state, &context).is_empty());
}

#[test]
fn word_removal_drops_the_focus_word() {
    let state = state_of("one the two the six the ten");
    let context = context_of("the the the the the the");
    let backend = Arc::new(StubPhrases { frequency: 100_000 });
    let operator = WordRemoval::new(services(), backend);

    let successors = operator.apply(&state, &context);
    assert!(!successors.is_empty());

    let original = state.text().string();
    for successor in &successors {
        let text = successor.text().string();
        assert!(text.len() < original.len(), "a word was removed: {text}");
    }
}
