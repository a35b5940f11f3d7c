//! Batch statistics.

use crate::scanner::ScanMetrics;

/// A snapshot of what a batch run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchStats {
    /// Transcripts scanned, malformed ones included.
    pub transcripts: usize,
    /// Transcripts whose segment list could not be decoded.
    pub malformed: usize,
    /// Scanner totals merged over every worker.
    pub scan: ScanMetrics,
    /// Rows removed by the aggregator as exact repeats.
    pub duplicates_dropped: usize,
    /// Rows in the final table.
    pub rows: usize,
}

impl core::fmt::Display for BatchStats {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{} transcripts, {} segments, {} hits ({} across segment boundaries), {} rows",
            self.transcripts,
            self.scan.segments_scanned,
            self.scan.hits_emitted,
            self.scan.boundary_hits,
            self.rows
        )?;

        if self.malformed > 0 {
            write!(f, ", {} malformed transcripts", self.malformed)?;
        }
        if self.duplicates_dropped > 0 {
            write!(f, ", {} duplicate rows dropped", self.duplicates_dropped)?;
        }

        Ok(())
    }
}
