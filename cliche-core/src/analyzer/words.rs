//! Word counting for per-club rankings.
//!
//! Rankings divide cliché counts by the number of words a club's manager
//! spoke. A word is a whitespace-separated token that still has something
//! left after punctuation is stripped, where word characters, digits,
//! underscores and hyphens count as content.

#[inline(always)]
fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-'
}

/// Strips everything but word characters, whitespace and hyphens, then lower-cases.
///
/// This is the text word counts are taken from; it is not the matching
/// normalization (see [`crate::analyzer::normalize`]).
pub fn clean_text(text: &str) -> String {
    text.chars()
        .filter(|&c| is_word_char(c) || c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Counts the words in `text`.
///
/// Punctuation-only tokens such as `...` or `!!` are not words; hyphens are
/// kept, so `-` on its own counts.
///
/// ```
/// use cliche_core::analyzer::word_count;
///
/// assert_eq!(word_count("Credit to the lads... they were brilliant!"), 7);
/// assert_eq!(word_count("well — you know"), 3);
/// ```
pub fn word_count(text: &str) -> usize {
    clean_text(text).split_whitespace().count()
}
