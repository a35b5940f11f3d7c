//! Text analysis.
//!
//! - **Normalizer**: canonicalizes lexicon phrases and segment text for matching
//! - **Words**: counts spoken words for rate-based rankings

pub mod normalizer;
pub mod words;

pub use normalizer::{normalize, normalize_opt, TextNormalizer};
pub use words::{clean_text, word_count};
