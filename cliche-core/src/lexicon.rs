//! The lexicon of target phrases.
//!
//! Phrases are normalized once, when the lexicon is built, and each keeps a
//! precompiled substring finder for its normalized form. The finished
//! [`Lexicon`] is immutable and is shared by reference across every scan,
//! including scans running on other threads.

use std::fs::File;
use std::io;
use std::path::Path;

use memchr::memmem::Finder;
use tracing::{debug, info};

use crate::analyzer::TextNormalizer;
use crate::error::{Error, Result};

/// Column of the lexicon table holding the phrases.
pub const CLICHE_COLUMN: &str = "cliche";

/// One lexicon entry: the phrase as authored plus its normalized form.
#[derive(Debug, Clone)]
pub struct Pattern {
    original: String,
    normalized: String,
    finder: Finder<'static>,
}

impl Pattern {
    /// Builds a pattern, or `None` when the phrase is blank or normalizes to nothing.
    pub fn new(original: &str) -> Option<Self> {
        if original.trim().is_empty() {
            return None;
        }
        let normalized = TextNormalizer::new().normalize(original);
        if normalized.is_empty() {
            return None;
        }
        let finder = Finder::new(normalized.as_bytes()).into_owned();
        Some(Self {
            original: original.to_owned(),
            normalized,
            finder,
        })
    }

    /// The phrase as authored, used for display.
    #[inline(always)]
    pub fn original(&self) -> &str {
        &self.original
    }

    /// The normalized phrase, used for matching. Never empty.
    #[inline(always)]
    pub fn normalized(&self) -> &str {
        &self.normalized
    }

    /// Returns true if the normalized phrase occurs in `haystack`.
    ///
    /// `haystack` is expected to be normalized text.
    #[inline(always)]
    pub fn is_in(&self, haystack: &str) -> bool {
        self.finder.find(haystack.as_bytes()).is_some()
    }
}

/// Ordered, immutable list of patterns.
///
/// Order is the input order and decides which phrase is reported first when
/// several match at the same segment. Duplicate phrases are kept as separate
/// entries.
#[derive(Debug, Clone, Default)]
pub struct Lexicon {
    patterns: Vec<Pattern>,
}

impl Lexicon {
    /// Builds a lexicon, dropping blank phrases and phrases with no matchable content.
    pub fn build<I, S>(phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut dropped = 0usize;
        let patterns: Vec<Pattern> = phrases
            .into_iter()
            .filter_map(|phrase| {
                let pattern = Pattern::new(phrase.as_ref());
                if pattern.is_none() {
                    dropped += 1;
                }
                pattern
            })
            .collect();

        if dropped > 0 {
            debug!(dropped, "skipped empty lexicon entries");
        }
        Self { patterns }
    }

    /// Reads phrases from the `cliche` column of a CSV table.
    ///
    /// Empty cells are skipped.
    ///
    /// # Errors
    ///
    /// Returns `Error::MissingColumn` if the table has no `cliche` column, and
    /// `Error::Csv` if the table cannot be parsed.
    pub fn from_reader<R: io::Read>(reader: R, source_name: &str) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

        let column = rdr
            .headers()?
            .iter()
            .position(|h| h.trim() == CLICHE_COLUMN)
            .ok_or_else(|| Error::MissingColumn {
                column: CLICHE_COLUMN,
                source_name: source_name.to_owned(),
            })?;

        let mut phrases = Vec::new();
        for record in rdr.records() {
            let record = record?;
            match record.get(column) {
                Some(cell) if !cell.is_empty() => phrases.push(cell.to_owned()),
                _ => {}
            }
        }

        let lexicon = Self::build(&phrases);
        info!(
            source = source_name,
            rows = phrases.len(),
            patterns = lexicon.len(),
            "lexicon loaded"
        );
        Ok(lexicon)
    }

    /// Reads a lexicon table from disk. See [`Lexicon::from_reader`].
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        Self::from_reader(io::BufReader::new(file), &path.display().to_string())
    }

    /// Number of patterns.
    #[inline(always)]
    #[must_use]
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Returns `true` if no phrase survived filtering.
    #[inline(always)]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Patterns in lexicon order.
    #[inline(always)]
    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    /// Iterates patterns in lexicon order.
    pub fn iter(&self) -> std::slice::Iter<'_, Pattern> {
        self.patterns.iter()
    }
}

impl<'a> IntoIterator for &'a Lexicon {
    type Item = &'a Pattern;
    type IntoIter = std::slice::Iter<'a, Pattern>;

    fn into_iter(self) -> Self::IntoIter {
        self.patterns.iter()
    }
}

/// Builds the `(original, normalized)` pairs for a phrase list.
///
/// Same filtering and ordering as [`Lexicon::build`].
pub fn build_patterns<I, S>(phrases: I) -> Vec<(String, String)>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    Lexicon::build(phrases)
        .patterns
        .into_iter()
        .map(|p| (p.original, p.normalized))
        .collect()
}
