//! Text normalization and part-of-speech tag stripping.
//!
//! Normalization folds typographic variation the profile should not see:
//! quote and dash variants, ellipses, Windows line endings and the UTF-8 BOM.
//! POS stripping removes `word/TAG` annotations from tagged corpora before
//! profiling.

use std::sync::LazyLock;

use regex::Regex;

static QUOTES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"''|``|["„“”‘’«»]"#).expect("quote regex"));

static DASHES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[‒–—―]+|-{2,}").expect("dash regex"));

static ELLIPSES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"…|\.{3,}").expect("ellipsis regex"));

static CRLF: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\r\n").expect("line ending regex"));

static WORD_POS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/[\w+\-$*]+(\s|$)").expect("word pos regex"));

static OPEN_QUOTE_POS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(^|\s)(.{1,2})/``\s").expect("open quote pos regex"));

static CLOSE_QUOTE_POS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s(.{1,2})/''(\s|$)").expect("close quote pos regex"));

static OPEN_BRACKET_POS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(^|\s)(.)/\((?:-\w\w)?\s").expect("open bracket pos regex"));

static CLOSE_BRACKET_POS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s(.)/\)(?:-\w\w)?(\s|$)").expect("close bracket pos regex"));

static PUNCT_POS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s(.)/[.,:'](?:-\w\w)?(\s|$)").expect("punct pos regex"));

/// Normalize characters in a text.
pub fn normalize_text(text: &mut String) {
    if let Some(stripped) = text.strip_prefix('\u{feff}') {
        *text = stripped.to_string();
    }

    *text = QUOTES.replace_all(text, "'").into_owned();
    *text = DASHES.replace_all(text, "--").into_owned();
    *text = ELLIPSES.replace_all(text, "...").into_owned();
    *text = CRLF.replace_all(text, "\n").into_owned();
}

/// Strip part-of-speech annotations (`word/TAG`) from a tagged text.
pub fn strip_pos_annotations(text: &mut String) {
    *text = OPEN_QUOTE_POS.replace_all(text, "${1}${2}").into_owned();
    *text = CLOSE_QUOTE_POS.replace_all(text, "${1}${2}").into_owned();
    *text = OPEN_BRACKET_POS.replace_all(text, "${1}${2}").into_owned();
    *text = CLOSE_BRACKET_POS.replace_all(text, "${1}${2}").into_owned();
    *text = PUNCT_POS.replace_all(text, "${1}${2}").into_owned();
    *text = WORD_POS.replace_all(text, "${1}").into_owned();
}
