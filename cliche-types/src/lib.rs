//! Core types shared by the cliche scanner crates.
//!
//! This crate holds the plain data that flows through the pipeline:
//!
//! - **Inputs**: [`Segment`] and [`TranscriptMeta`], as decoded from the
//!   transcript table
//! - **Output**: [`ClicheHit`], one row of the persisted hit table
//! - **Configuration**: [`ScanConfig`] for the batch driver
//!
//! Keeping them apart from the engine lets readers of the hit table depend on
//! the row layout without pulling in the scanner.

#![warn(missing_docs)]

use core::cmp::Ordering;
use core::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Prefix of every deep link written to the hit table.
pub const YOUTUBE_WATCH_URL: &str = "https://www.youtube.com/watch?v=";

/// Column order of the persisted hit table.
pub const HIT_COLUMNS: [&str; 9] = [
    "club",
    "manager",
    "season",
    "publish_date",
    "video_id",
    "cliche",
    "start_time",
    "segment_text",
    "youtube_link",
];

/// A timestamped chunk of transcribed speech.
///
/// Decoded from one `{text, start}` object of a transcript's segment list.
/// A `null` or missing `text` reads as the empty string; `start` accepts a
/// number or a numeric string and stays `None` when absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Raw caption text, exactly as transcribed.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub text: String,
    /// Start offset in seconds.
    #[serde(default, deserialize_with = "lenient_seconds")]
    pub start: Option<f64>,
}

impl Segment {
    /// Creates a segment.
    pub fn new(text: impl Into<String>, start: Option<f64>) -> Self {
        Self {
            text: text.into(),
            start,
        }
    }

    /// Start offset in seconds, `0.0` when the source had none.
    #[inline(always)]
    pub fn start_or_zero(&self) -> f64 {
        self.start.unwrap_or(0.0)
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Seconds {
    Number(f64),
    Text(String),
}

fn lenient_seconds<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Seconds>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Seconds::Number(secs)) => Ok(Some(secs)),
        Some(Seconds::Text(raw)) => raw
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

/// Descriptive fields of one press-conference video.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TranscriptMeta {
    /// Club the manager was in charge of.
    pub club: String,
    /// Manager giving the press conference.
    pub manager: String,
    /// Season label, e.g. `2025/26`.
    pub season: String,
    /// Publish date of the video (ISO `YYYY-MM-DD`).
    pub publish_date: String,
    /// Platform video identifier.
    pub video_id: String,
}

/// A press conference: metadata plus segments in spoken order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transcript {
    /// Descriptive fields copied onto every hit.
    pub meta: TranscriptMeta,
    /// Segments in temporal order. Never reordered.
    pub segments: Vec<Segment>,
}

/// One detected occurrence of a lexicon phrase within a transcript.
///
/// Field order matches [`HIT_COLUMNS`], so a hit serializes directly into a
/// row of the hit table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClicheHit {
    /// Club from the transcript metadata.
    pub club: String,
    /// Manager from the transcript metadata.
    pub manager: String,
    /// Season from the transcript metadata.
    pub season: String,
    /// Publish date from the transcript metadata.
    pub publish_date: String,
    /// Video the hit was found in.
    pub video_id: String,
    /// Lexicon phrase as authored (not normalized).
    pub cliche: String,
    /// Start of the first segment of the match, in seconds.
    pub start_time: f64,
    /// Raw text of the matched segment, or of both segments for a boundary match.
    pub segment_text: String,
    /// Deep link into the video at `start_time`.
    pub youtube_link: String,
}

impl ClicheHit {
    /// Creates a hit, deriving the deep link from `meta.video_id` and `start_time`.
    pub fn new(
        meta: &TranscriptMeta,
        cliche: &str,
        start_time: f64,
        segment_text: impl Into<String>,
    ) -> Self {
        Self {
            club: meta.club.clone(),
            manager: meta.manager.clone(),
            season: meta.season.clone(),
            publish_date: meta.publish_date.clone(),
            video_id: meta.video_id.clone(),
            cliche: cliche.to_owned(),
            start_time,
            segment_text: segment_text.into(),
            youtube_link: youtube_link(&meta.video_id, start_time),
        }
    }

    /// Orders hits the way the hit table is sorted:
    /// club, manager, season, publish date, video, start time, phrase.
    ///
    /// An empty text field is a missing value and sorts after every present one.
    pub fn table_order(&self, other: &Self) -> Ordering {
        missing_last(&self.club, &other.club)
            .then_with(|| missing_last(&self.manager, &other.manager))
            .then_with(|| missing_last(&self.season, &other.season))
            .then_with(|| missing_last(&self.publish_date, &other.publish_date))
            .then_with(|| missing_last(&self.video_id, &other.video_id))
            .then_with(|| self.start_time.total_cmp(&other.start_time))
            .then_with(|| missing_last(&self.cliche, &other.cliche))
    }
}

#[inline]
fn missing_last(a: &str, b: &str) -> Ordering {
    match (a.is_empty(), b.is_empty()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.cmp(b),
    }
}

impl fmt::Display for ClicheHit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} @ {:.1}s \"{}\"",
            self.video_id, self.start_time, self.cliche
        )
    }
}

/// Whole seconds used in deep links.
///
/// Rounds half to even, so `2.5` links to second 2 and `3.5` to second 4.
#[inline]
pub fn link_seconds(start_time: f64) -> i64 {
    start_time.round_ties_even() as i64
}

/// Builds the deep link for a video at a given offset.
pub fn youtube_link(video_id: &str, start_time: f64) -> String {
    format!(
        "{YOUTUBE_WATCH_URL}{video_id}&t={}s",
        link_seconds(start_time)
    )
}

/// Splits a deep link produced by [`youtube_link`] back into video id and seconds.
///
/// Returns `None` for anything that does not follow the template.
pub fn parse_youtube_link(link: &str) -> Option<(&str, i64)> {
    let rest = link.strip_prefix(YOUTUBE_WATCH_URL)?;
    let (video_id, offset) = rest.rsplit_once("&t=")?;
    let secs = offset.strip_suffix('s')?.parse().ok()?;
    Some((video_id, secs))
}

/// Batch execution options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanConfig {
    /// Scan transcripts on a worker pool instead of the calling thread.
    pub parallel: bool,
    /// Worker count for the pool. `0` uses the global rayon pool.
    pub threads: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            threads: 0,
        }
    }
}

impl ScanConfig {
    /// Scans every transcript on the calling thread.
    pub const fn sequential() -> Self {
        Self {
            parallel: false,
            threads: 0,
        }
    }

    /// Scans on a dedicated pool of `threads` workers.
    pub const fn with_threads(threads: usize) -> Self {
        Self {
            parallel: true,
            threads,
        }
    }
}
