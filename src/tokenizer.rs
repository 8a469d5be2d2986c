//! Plaintext splitting.
//!
//! Text is first cut into independent spans on punctuation ([sections]), so that n-grams never
//! span unrelated clauses, then each span is cut into lowercased tokens ([tokens]).

/// Joins the tokens of an n-gram key.
/// Tokens never contain whitespace, so keys are unambiguous.
pub const NGRAM_SEPARATOR: &str = " ";

/// Characters delimiting independent spans of words.
const SECTION_SEPARATORS: [char; 11] = [',', '"', '(', ')', '.', '?', '\u{2013}', ';', '\n', '\r', '\t'];

/// Splits plaintext on punctuation, returning trimmed, non empty spans.
pub fn sections(plaintext: &str) -> impl Iterator<Item = &str> {
    plaintext
        .split(&SECTION_SEPARATORS[..])
        .map(str::trim)
        .filter(|section| !section.is_empty())
}

/// Lowercases a span and splits it on whitespace.
pub fn tokens(section: &str) -> Vec<String> {
    section
        .to_lowercase()
        .split_whitespace()
        .map(String::from)
        .collect()
}

/// Overlapping windows of `n` consecutive tokens, joined with [NGRAM_SEPARATOR].
///
/// Yields nothing when there are less than `n` tokens (or when `n` is 0).
pub fn ngrams(tokens: &[String], n: usize) -> impl Iterator<Item = String> + '_ {
    // windows panics on 0.
    let n = if n == 0 { tokens.len() + 1 } else { n };
    tokens.windows(n).map(|window| window.join(NGRAM_SEPARATOR))
}
