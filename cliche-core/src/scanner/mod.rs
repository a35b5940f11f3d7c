//! Cliché detection over a transcript's ordered segments.
//!
//! The scan is a nested loop, segments outside and lexicon entries inside,
//! with one consumption marker per entry:
//!
//! - A single-segment match claims that segment for the entry.
//! - A boundary match (phrase found only in segment `i` joined with `i + 1`)
//!   claims both segments, so `i + 1` cannot report the same phrase again.
//! - A single-segment match at `i` short-circuits the boundary check at `i`.
//! - Entries never block each other.
//!
//! Threading:
//! - [`MatchScanner`] keeps reusable buffers and is meant to be owned by one
//!   worker. The segment loop is order-dependent (the marker state at `i + 1`
//!   depends on what `i` claimed) and always runs sequentially.

mod scan;
mod types;

pub use scan::scan_transcript;
pub use types::{MatchScanner, ScanMetrics, INLINE_MARKERS};
