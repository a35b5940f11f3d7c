//! Summaries computed from a finished hit table.
//!
//! Rankings put each club's cliché count against the number of words its
//! manager spoke, so clubs with more press conferences are not favoured.

use std::fs::{self, File};
use std::io;
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use cliche_types::ClicheHit;
use rustc_hash::FxHashMap;
use serde::Serialize;
use tracing::info;

use crate::batch::TranscriptSummary;
use crate::error::Result;

/// Columns of the rankings table, in order.
pub const RANKING_COLUMNS: [&str; 5] = ["rank", "club", "total_words", "total_cliches", "cliches_per_10k"];

/// Restricts reports to one club and/or a publish-date range.
///
/// Both bounds are inclusive. Publish dates are parsed with [`parse_date`];
/// a row whose date cannot be parsed is dropped whenever a bound is set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HitFilter {
    /// Only this club, when set.
    pub club: Option<String>,
    /// Earliest publish date kept.
    pub from: Option<NaiveDate>,
    /// Latest publish date kept.
    pub until: Option<NaiveDate>,
}

impl HitFilter {
    /// A filter that keeps everything.
    pub fn all() -> Self {
        Self::default()
    }

    /// Returns `true` if a row with this club and publish date is kept.
    pub fn matches(&self, club: &str, publish_date: &str) -> bool {
        if self.club.as_deref().is_some_and(|c| c != club) {
            return false;
        }
        if self.from.is_none() && self.until.is_none() {
            return true;
        }
        let Some(day) = parse_date(publish_date) else {
            return false;
        };
        self.from.map_or(true, |from| day >= from) && self.until.map_or(true, |until| day <= until)
    }

    /// Keeps the hits this filter accepts.
    pub fn hits<'a>(&'a self, hits: &'a [ClicheHit]) -> impl Iterator<Item = &'a ClicheHit> + 'a {
        hits.iter()
            .filter(move |h| self.matches(&h.club, &h.publish_date))
    }
}

/// Reads a publish date.
///
/// Accepts `YYYY-MM-DD`, an RFC 3339 timestamp (its date in its own offset),
/// or `YYYY-MM-DD HH:MM:SS`. Returns `None` for anything else.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
}

/// One row of the club rankings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClubRanking {
    /// Position, starting at 1.
    pub rank: usize,
    /// Club name.
    pub club: String,
    /// Words spoken across the club's transcripts.
    pub total_words: u64,
    /// Hits attributed to the club.
    pub total_cliches: u64,
    /// Hits per 10,000 words; `0` when no words were spoken.
    pub cliches_per_10k: f64,
}

/// Ranks clubs by clichés per 10,000 words, highest first.
///
/// Clubs are taken from the transcripts that pass `filter`; hits for clubs
/// with no such transcript are ignored. Ties go to the club name.
pub fn club_rankings(
    transcripts: &[TranscriptSummary],
    hits: &[ClicheHit],
    filter: &HitFilter,
) -> Vec<ClubRanking> {
    let mut totals: FxHashMap<&str, (u64, u64)> = FxHashMap::default();
    for t in transcripts
        .iter()
        .filter(|t| filter.matches(&t.club, &t.publish_date))
    {
        totals.entry(t.club.as_str()).or_default().0 += t.words as u64;
    }
    for hit in filter.hits(hits) {
        if let Some(entry) = totals.get_mut(hit.club.as_str()) {
            entry.1 += 1;
        }
    }

    let mut rows: Vec<ClubRanking> = totals
        .into_iter()
        .map(|(club, (words, cliches))| ClubRanking {
            rank: 0,
            club: club.to_owned(),
            total_words: words,
            total_cliches: cliches,
            cliches_per_10k: rate_per_10k(cliches, words),
        })
        .collect();

    rows.sort_by(|a, b| {
        b.cliches_per_10k
            .total_cmp(&a.cliches_per_10k)
            .then_with(|| a.club.cmp(&b.club))
    });
    for (i, row) in rows.iter_mut().enumerate() {
        row.rank = i + 1;
    }
    rows
}

#[inline]
fn rate_per_10k(cliches: u64, words: u64) -> f64 {
    if words == 0 {
        0.0
    } else {
        cliches as f64 * 10_000.0 / words as f64
    }
}

/// How often one phrase was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhraseCount {
    /// Lexicon phrase as authored.
    pub cliche: String,
    /// Rows carrying it.
    pub count: usize,
}

/// Counts hits per phrase, most frequent first, ties by phrase.
pub fn phrase_frequencies<'a, I>(hits: I) -> Vec<PhraseCount>
where
    I: IntoIterator<Item = &'a ClicheHit>,
{
    let mut counts: FxHashMap<&str, usize> = FxHashMap::default();
    for hit in hits {
        *counts.entry(hit.cliche.as_str()).or_default() += 1;
    }

    let mut rows: Vec<PhraseCount> = counts
        .into_iter()
        .map(|(cliche, count)| PhraseCount {
            cliche: cliche.to_owned(),
            count,
        })
        .collect();
    rows.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.cliche.cmp(&b.cliche)));
    rows
}

/// Writes rankings as CSV. The header row is always written.
pub fn write_rankings_csv<W: io::Write>(rankings: &[ClubRanking], writer: W) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    wtr.write_record(RANKING_COLUMNS)?;
    for row in rankings {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes rankings to `path`, creating parent directories as needed.
pub fn write_rankings_path(rankings: &[ClubRanking], path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    write_rankings_csv(rankings, io::BufWriter::new(File::create(path)?))?;
    info!(path = %path.display(), clubs = rankings.len(), "rankings written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cliche_types::TranscriptMeta;

    fn summary(club: &str, date: &str, words: usize) -> TranscriptSummary {
        TranscriptSummary {
            club: club.into(),
            publish_date: date.into(),
            video_id: format!("{club}-{date}"),
            words,
            ..Default::default()
        }
    }

    fn hit(club: &str, date: &str, cliche: &str) -> ClicheHit {
        let meta = TranscriptMeta {
            club: club.into(),
            publish_date: date.into(),
            video_id: format!("{club}-{date}"),
            ..Default::default()
        };
        ClicheHit::new(&meta, cliche, 1.0, cliche)
    }

    fn day(raw: &str) -> NaiveDate {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").expect("valid date")
    }

    #[test]
    fn filter_bounds_are_inclusive() {
        let filter = HitFilter {
            club: None,
            from: Some(day("2025-08-01")),
            until: Some(day("2025-08-31")),
        };
        assert!(filter.matches("A", "2025-08-01"));
        assert!(filter.matches("A", "2025-08-31"));
        assert!(!filter.matches("A", "2025-07-31"));
        assert!(!filter.matches("A", "2025-09-01"));
        assert!(HitFilter::all().matches("anything", ""));
    }

    #[test]
    fn timestamped_publish_dates() {
        let filter = HitFilter {
            from: Some(day("2025-08-09")),
            until: Some(day("2025-08-09")),
            ..Default::default()
        };
        assert!(filter.matches("A", "2025-08-09T21:30:00Z"));
        assert!(filter.matches("A", "2025-08-09T23:30:00-05:00"));
        assert!(filter.matches("A", "2025-08-09 14:00:00"));
        assert!(!filter.matches("A", "2025-08-10T00:00:01+00:00"));
    }

    #[test]
    fn unparseable_dates() {
        assert_eq!(parse_date("2025-8-9"), Some(day("2025-08-09")));
        assert_eq!(parse_date(" 2025-08-09 "), Some(day("2025-08-09")));
        assert_eq!(parse_date("not a date"), None);
        assert_eq!(parse_date("2025-02-30"), None);
        assert_eq!(parse_date(""), None);

        let bounded = HitFilter {
            until: Some(day("2025-12-31")),
            ..Default::default()
        };
        assert!(!bounded.matches("A", "last week"));
        assert!(HitFilter::all().matches("A", "last week"));
    }

    #[test]
    fn filter_by_club() {
        let filter = HitFilter {
            club: Some("Example FC".into()),
            ..Default::default()
        };
        assert!(filter.matches("Example FC", "2025-08-09"));
        assert!(!filter.matches("Samples United", "2025-08-09"));
    }

    #[test]
    fn rankings_by_rate() {
        let transcripts = vec![
            summary("Alpha", "2025-08-09", 10_000),
            summary("Beta", "2025-08-09", 2_000),
            summary("Beta", "2025-08-16", 3_000),
            summary("Gamma", "2025-08-09", 0),
        ];
        let hits = vec![
            hit("Alpha", "2025-08-09", "the lads"),
            hit("Alpha", "2025-08-09", "fine margins"),
            hit("Beta", "2025-08-16", "the lads"),
            hit("Nowhere", "2025-08-09", "the lads"),
        ];

        let rows = club_rankings(&transcripts, &hits, &HitFilter::all());
        let summary: Vec<(usize, &str, u64, u64, f64)> = rows
            .iter()
            .map(|r| (r.rank, r.club.as_str(), r.total_words, r.total_cliches, r.cliches_per_10k))
            .collect();
        assert_eq!(
            summary,
            [
                (1, "Alpha", 10_000, 2, 2.0),
                (2, "Beta", 5_000, 1, 2.0),
                (3, "Gamma", 0, 0, 0.0),
            ]
        );
    }

    #[test]
    fn rankings_respect_filter() {
        let transcripts = vec![
            summary("Beta", "2025-08-09", 2_000),
            summary("Beta", "2025-08-16", 3_000),
        ];
        let hits = vec![
            hit("Beta", "2025-08-09", "the lads"),
            hit("Beta", "2025-08-16", "the lads"),
        ];
        let filter = HitFilter {
            until: Some(day("2025-08-10")),
            ..Default::default()
        };

        let rows = club_rankings(&transcripts, &hits, &filter);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].total_words, 2_000);
        assert_eq!(rows[0].total_cliches, 1);
        assert_eq!(rows[0].cliches_per_10k, 5.0);
    }

    #[test]
    fn phrase_counts_sorted() {
        let hits = vec![
            hit("A", "2025-08-09", "we go again"),
            hit("A", "2025-08-09", "the lads"),
            hit("B", "2025-08-09", "we go again"),
            hit("B", "2025-08-09", "fine margins"),
        ];
        let counts = phrase_frequencies(&hits);
        let flat: Vec<(&str, usize)> = counts.iter().map(|c| (c.cliche.as_str(), c.count)).collect();
        assert_eq!(flat, [("we go again", 2), ("fine margins", 1), ("the lads", 1)]);

        let filter = HitFilter {
            club: Some("B".into()),
            ..Default::default()
        };
        assert_eq!(phrase_frequencies(filter.hits(&hits)).len(), 2);
    }

    #[test]
    fn rankings_csv_layout() {
        let rows = vec![ClubRanking {
            rank: 1,
            club: "Example FC".into(),
            total_words: 4_000,
            total_cliches: 3,
            cliches_per_10k: 7.5,
        }];
        let mut out = Vec::new();
        write_rankings_csv(&rows, &mut out).expect("should write");
        assert_eq!(
            String::from_utf8(out).expect("utf8"),
            "rank,club,total_words,total_cliches,cliches_per_10k\n1,Example FC,4000,3,7.5\n"
        );

        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("reports").join("rankings.csv");
        write_rankings_path(&rows, &path).expect("should write");
        assert!(std::fs::read_to_string(&path).expect("read").starts_with("rank,club"));
    }
}
