//! Cliché detection over football press-conference transcripts.
//!
//! The pipeline reads a lexicon of stock phrases and a table of timestamped
//! transcripts, finds every phrase occurrence (including ones split across
//! two adjacent segments), and writes a sorted hit table with deep links back
//! into each video.
//!
//! ## Modules
//!
//! - [`analyzer`]: text normalization and word counting
//! - [`lexicon`]: phrase loading and pre-normalized patterns
//! - [`transcript`]: transcript table rows and segment decoding
//! - [`scanner`]: the per-transcript matcher
//! - [`batch`]: parallel scanning of a whole table
//! - [`aggregate`]: sorting, deduplication and the persisted hit table
//! - [`report`]: per-club rankings and phrase frequencies
//!
//! ## Example
//!
//! ```
//! use cliche_core::{Lexicon, MatchScanner};
//! use cliche_core::cliche_types::{Segment, TranscriptMeta};
//!
//! let lexicon = Lexicon::build(["take it game by game"]);
//! let meta = TranscriptMeta { video_id: "abc".into(), ..Default::default() };
//! let segments = [
//!     Segment::new("We take it", Some(12.0)),
//!     Segment::new("game by game.", Some(14.5)),
//! ];
//!
//! let hits = MatchScanner::new().scan(&meta, &segments, &lexicon);
//! assert_eq!(hits.len(), 1);
//! assert_eq!(hits[0].segment_text, "We take it game by game.");
//! assert_eq!(hits[0].youtube_link, "https://www.youtube.com/watch?v=abc&t=12s");
//! ```

pub mod aggregate;
pub mod analyzer;
pub mod arena;
pub mod batch;
pub mod error;
pub mod lexicon;
mod literal;
pub mod report;
pub mod scanner;
pub mod transcript;

pub use cliche_types;

pub use aggregate::{HitAggregator, HitTable};
pub use batch::{run_batch, BatchOutcome, BatchStats, TranscriptSummary};
pub use error::{Error, Result};
pub use lexicon::Lexicon;
pub use scanner::{scan_transcript, MatchScanner, ScanMetrics};
pub use transcript::{TranscriptRecord, TranscriptTable};
