//! Scanner state and metrics.

use crate::analyzer::TextNormalizer;
use crate::arena::SegmentArena;

use smallvec::SmallVec;

/// Lexicon sizes up to this many phrases keep their consumption markers inline.
pub const INLINE_MARKERS: usize = 64;

/// Per-transcript cliché scanner.
///
/// Holds the buffers a scan needs (normalized segment text, the two-segment
/// window, one consumption marker per lexicon entry) so they can be reused
/// from one transcript to the next. Markers are reset at the start of every
/// transcript; nothing carries over between scans except capacity and metrics.
///
/// A scanner is cheap to create and is meant to be owned by a single worker.
#[derive(Debug)]
pub struct MatchScanner {
    pub(crate) normalizer: TextNormalizer,
    pub(crate) segments: SegmentArena,
    pub(crate) norm_buf: String,
    /// Normalized text of segments `i` and `i + 1`, joined by a space.
    pub(crate) window_buf: String,
    /// Highest segment index claimed by each lexicon entry, by lexicon position.
    pub(crate) claimed: SmallVec<[Option<usize>; INLINE_MARKERS]>,
    pub(crate) transcripts_scanned: u64,
    pub(crate) segments_scanned: u64,
    pub(crate) hits_emitted: u64,
    pub(crate) boundary_hits: u64,
}

impl Default for MatchScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl MatchScanner {
    /// Creates a scanner with empty buffers.
    pub fn new() -> Self {
        Self {
            normalizer: TextNormalizer::new(),
            segments: SegmentArena::new(),
            norm_buf: String::with_capacity(256),
            window_buf: String::with_capacity(512),
            claimed: SmallVec::new(),
            transcripts_scanned: 0,
            segments_scanned: 0,
            hits_emitted: 0,
            boundary_hits: 0,
        }
    }

    /// Returns running totals over every transcript this scanner has seen.
    #[inline(always)]
    #[must_use]
    pub fn metrics(&self) -> ScanMetrics {
        ScanMetrics {
            transcripts_scanned: self.transcripts_scanned,
            segments_scanned: self.segments_scanned,
            hits_emitted: self.hits_emitted,
            boundary_hits: self.boundary_hits,
        }
    }
}

/// Basic operational metrics for a scanner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanMetrics {
    /// Transcripts scanned.
    pub transcripts_scanned: u64,
    /// Segments normalized and scanned.
    pub segments_scanned: u64,
    /// Hits emitted, boundary hits included.
    pub hits_emitted: u64,
    /// Hits that straddled two segments.
    pub boundary_hits: u64,
}

impl ScanMetrics {
    /// Adds another scanner's totals to these.
    pub fn merge(&mut self, other: ScanMetrics) {
        self.transcripts_scanned += other.transcripts_scanned;
        self.segments_scanned += other.segments_scanned;
        self.hits_emitted += other.hits_emitted;
        self.boundary_hits += other.boundary_hits;
    }

    /// Work done between an `earlier` snapshot of the same scanner and this one.
    pub fn since(self, earlier: ScanMetrics) -> ScanMetrics {
        ScanMetrics {
            transcripts_scanned: self.transcripts_scanned - earlier.transcripts_scanned,
            segments_scanned: self.segments_scanned - earlier.segments_scanned,
            hits_emitted: self.hits_emitted - earlier.hits_emitted,
            boundary_hits: self.boundary_hits - earlier.boundary_hits,
        }
    }
}
