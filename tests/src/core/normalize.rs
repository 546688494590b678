use veil_core::normalize::{normalize_text, strip_pos_annotations};
use veil_core::profile::ngram_bytes;
use veil_core::{GenerateFlags, NgramProfile};

#[test]
fn quotes_dashes_ellipses_and_line_endings_fold() {
    let mut text = String::from("„mixed“ ‘quotes’ — with … and\r\nlines ``old'' style");
    normalize_text(&mut text);
    assert_eq!(
        text,
        "'mixed' 'quotes' -- with ... and\nlines 'old' style"
    );
}

#[test]
fn bom_is_stripped() {
    let mut text = String::from("\u{feff}content");
    normalize_text(&mut text);
    assert_eq!(text, "content");
}

#[test]
fn long_dash_runs_collapse() {
    let mut text = String::from("a ---- b –– c");
    normalize_text(&mut text);
    assert_eq!(text, "a -- b -- c");
}

#[test]
fn pos_tags_are_stripped_from_words() {
    let mut text = String::from("word/NN other/VB last/JJ");
    strip_pos_annotations(&mut text);
    assert_eq!(text, "word other last");
}

#[test]
fn profiling_with_strip_pos_leaves_no_slashes() {
    let mut text = String::from("word/NN other/VB and/CC more/JJR words/NNS here/RB");
    let profile = NgramProfile::generate_from_string(
        &mut text,
        GenerateFlags {
            skip_normalization: false,
            strip_pos_annotations: true,
        },
    )
    .unwrap();

    assert!(!text.contains('/'));
    for (ngram, _) in profile.iter() {
        assert!(
            !ngram_bytes(ngram).contains(&b'/'),
            "profiled n-gram contains a POS separator"
        );
    }
}
