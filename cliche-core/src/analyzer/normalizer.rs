/// Lower-cased form of every ASCII byte that survives normalization.
/// `0` marks a byte that separates words.
const ASCII_FOLD: [u8; 128] = build_fold_table();

const fn build_fold_table() -> [u8; 128] {
    let mut table = [0u8; 128];
    let mut b = 0;
    while b < 128 {
        let c = b as u8;
        table[b] = match c {
            b'a'..=b'z' | b'0'..=b'9' => c,
            b'A'..=b'Z' => c + (b'a' - b'A'),
            _ => 0,
        };
        b += 1;
    }
    table
}

#[inline(always)]
fn fold_char(c: char) -> u8 {
    if c.is_ascii() {
        ASCII_FOLD[c as usize]
    } else {
        0
    }
}

/// Canonicalizes text for phrase matching.
///
/// Performs the following operations:
/// - Converts all characters to lowercase (Unicode-aware, so `K` KELVIN SIGN
///   becomes `k`)
/// - Replaces every run of characters outside `[a-z0-9]` with a single space
/// - Removes leading/trailing separators
///
/// The output is plain ASCII with single spaces between words, which makes
/// matching insensitive to casing, punctuation and transcription whitespace.
/// Normalizing twice gives the same result as normalizing once.
///
/// # Examples
///
/// ```
/// use cliche_core::analyzer::TextNormalizer;
///
/// let normalizer = TextNormalizer::default();
/// assert_eq!(normalizer.normalize("  AT the End-of  Day!! "), "at the end of day");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct TextNormalizer;

impl TextNormalizer {
    /// Creates a normalizer.
    pub const fn new() -> Self {
        Self
    }

    /// Normalizes text into an existing String buffer.
    ///
    /// Reuses the buffer's capacity if sufficient, growing only when necessary.
    /// Clears the buffer before writing.
    #[inline]
    pub fn normalize_into(&self, input: &str, out: &mut String) {
        out.clear();
        out.reserve(input.len());

        let bytes = input.as_bytes();
        let mut i = 0usize;
        let mut pending_space = false;

        while i < bytes.len() {
            let b = bytes[i];
            if b < 128 {
                push_folded(out, ASCII_FOLD[b as usize], &mut pending_space);
                i += 1;
                continue;
            }

            let Some(ch) = input[i..].chars().next() else {
                break;
            };
            i += ch.len_utf8();

            for lowered in ch.to_lowercase() {
                push_folded(out, fold_char(lowered), &mut pending_space);
            }
        }
    }

    /// Normalizes text and returns a new String.
    #[inline]
    pub fn normalize(&self, input: &str) -> String {
        let mut out = String::with_capacity(input.len());
        self.normalize_into(input, &mut out);
        out
    }
}

#[inline(always)]
fn push_folded(out: &mut String, folded: u8, pending_space: &mut bool) {
    if folded == 0 {
        *pending_space = true;
        return;
    }
    if *pending_space && !out.is_empty() {
        out.push(' ');
    }
    *pending_space = false;
    out.push(folded as char);
}

/// Normalizes `text` with the default normalizer.
#[inline]
pub fn normalize(text: &str) -> String {
    TextNormalizer::new().normalize(text)
}

/// Normalizes possibly-absent text; `None` normalizes to the empty string.
#[inline]
pub fn normalize_opt(text: Option<&str>) -> String {
    text.map(normalize).unwrap_or_default()
}
