//! Batch driver: scans every transcript of a table against one lexicon.
//!
//! Transcripts are independent, so they are scanned on a rayon pool with one
//! [`MatchScanner`] per worker and the lexicon shared by reference. Results
//! are collected in input order and merged before the aggregator sorts them,
//! so the output does not depend on scheduling.
//!
//! A transcript whose segments cannot be decoded is logged, counted and
//! scanned as empty; it never aborts the batch.

mod stats;

pub use stats::BatchStats;

use cliche_types::{ClicheHit, ScanConfig, Transcript};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::aggregate::{HitAggregator, HitTable};
use crate::error::Result;
use crate::lexicon::Lexicon;
use crate::scanner::{MatchScanner, ScanMetrics};
use crate::transcript::TranscriptRecord;

/// Per-transcript facts kept for reporting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranscriptSummary {
    /// Club.
    pub club: String,
    /// Publish date.
    pub publish_date: String,
    /// Video identifier.
    pub video_id: String,
    /// Decoded segment count.
    pub segments: usize,
    /// Words spoken.
    pub words: usize,
    /// Hits emitted by the scanner, before deduplication.
    pub hits: usize,
    /// The segment list could not be decoded.
    pub malformed: bool,
}

/// Everything a batch run produces.
#[derive(Debug)]
pub struct BatchOutcome {
    /// Final sorted, deduplicated hit table.
    pub table: HitTable,
    /// One summary per input transcript, in input order.
    pub transcripts: Vec<TranscriptSummary>,
    /// Run statistics.
    pub stats: BatchStats,
}

struct Scanned {
    summary: TranscriptSummary,
    hits: Vec<ClicheHit>,
    metrics: ScanMetrics,
}

fn scan_record(scanner: &mut MatchScanner, lexicon: &Lexicon, record: &TranscriptRecord) -> Scanned {
    let (transcript, malformed) = match record.to_transcript() {
        Ok(transcript) => (transcript, false),
        Err(err) => {
            warn!(video_id = %record.video_id, error = %err, "malformed transcript; scanning as empty");
            let empty = Transcript {
                meta: record.meta(),
                segments: Vec::new(),
            };
            (empty, true)
        }
    };
    let Transcript { meta, segments } = transcript;

    let before = scanner.metrics();
    let hits = scanner.scan(&meta, &segments, lexicon);
    let metrics = scanner.metrics().since(before);
    debug!(
        video_id = %meta.video_id,
        segments = segments.len(),
        hits = hits.len(),
        "transcript scanned"
    );

    let words = record.word_count(&segments);
    Scanned {
        summary: TranscriptSummary {
            club: meta.club,
            publish_date: meta.publish_date,
            video_id: meta.video_id,
            segments: segments.len(),
            words,
            hits: hits.len(),
            malformed,
        },
        hits,
        metrics,
    }
}

fn scan_parallel(lexicon: &Lexicon, records: &[TranscriptRecord]) -> Vec<Scanned> {
    records
        .par_iter()
        .map_init(MatchScanner::new, |scanner, record| {
            scan_record(scanner, lexicon, record)
        })
        .collect()
}

/// Scans every record and aggregates the hits.
///
/// # Errors
///
/// Returns `Error::ThreadPool` if a dedicated pool was requested and could
/// not be started. Per-transcript problems are never errors.
#[tracing::instrument(skip_all, fields(transcripts = records.len(), patterns = lexicon.len()))]
pub fn run_batch(
    lexicon: &Lexicon,
    records: &[TranscriptRecord],
    config: &ScanConfig,
) -> Result<BatchOutcome> {
    if lexicon.is_empty() {
        warn!("lexicon is empty; no hits will be produced");
    }

    let scanned = if !config.parallel {
        let mut scanner = MatchScanner::new();
        records
            .iter()
            .map(|record| scan_record(&mut scanner, lexicon, record))
            .collect()
    } else if config.threads == 0 {
        scan_parallel(lexicon, records)
    } else {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.threads)
            .build()?;
        pool.install(|| scan_parallel(lexicon, records))
    };

    Ok(merge(scanned))
}

fn merge(scanned: Vec<Scanned>) -> BatchOutcome {
    let total_hits = scanned.iter().map(|s| s.hits.len()).sum();
    let mut aggregator = HitAggregator::with_capacity(total_hits);
    let mut transcripts = Vec::with_capacity(scanned.len());
    let mut stats = BatchStats::default();

    for item in scanned {
        stats.transcripts += 1;
        stats.malformed += usize::from(item.summary.malformed);
        stats.scan.merge(item.metrics);
        aggregator.extend(item.hits);
        transcripts.push(item.summary);
    }

    let table = aggregator.finish();
    stats.duplicates_dropped = table.duplicates_dropped();
    stats.rows = table.len();
    info!(%stats, "batch complete");

    BatchOutcome {
        table,
        transcripts,
        stats,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::TranscriptTable;

    fn record(club: &str, video_id: &str, segments: &str) -> TranscriptRecord {
        TranscriptRecord {
            club: club.into(),
            manager: "Alex Manager".into(),
            season: "2025/26".into(),
            publish_date: "2025-08-09".into(),
            video_id: video_id.into(),
            transcript_segments: Some(segments.into()),
            transcript_cleaned: None,
        }
    }

    fn lexicon() -> Lexicon {
        Lexicon::build(["at the end of the day", "take it game by game", "the lads"])
    }

    fn corpus(n: usize) -> Vec<TranscriptRecord> {
        (0..n)
            .map(|i| {
                record(
                    &format!("Club {}", i % 7),
                    &format!("v{i:03}"),
                    r#"[{"text": "At the end of the day", "start": 1.0},
                        {"text": "we take it", "start": 4.2},
                        {"text": "game by game. The lads", "start": 6.8},
                        {"text": "were the lads", "start": 9.5}]"#,
                )
            })
            .collect()
    }

    #[test]
    fn sequential_and_parallel_agree() {
        let records = corpus(40);
        let lexicon = lexicon();

        let seq = run_batch(&lexicon, &records, &ScanConfig::sequential()).expect("sequential");
        let par = run_batch(&lexicon, &records, &ScanConfig::default()).expect("parallel");
        let pool = run_batch(&lexicon, &records, &ScanConfig::with_threads(3)).expect("pool");

        assert_eq!(seq.table, par.table);
        assert_eq!(seq.table, pool.table);
        assert_eq!(seq.transcripts, par.transcripts);
        assert_eq!(seq.stats, par.stats);
    }

    #[test]
    fn hits_per_transcript() {
        let outcome = run_batch(&lexicon(), &corpus(1), &ScanConfig::sequential()).expect("run");
        let found: Vec<(&str, f64)> = outcome
            .table
            .rows()
            .iter()
            .map(|h| (h.cliche.as_str(), h.start_time))
            .collect();

        // The window (1, 2) already holds "the lads", claiming segment 2 for it.
        assert_eq!(
            found,
            [
                ("at the end of the day", 1.0),
                ("take it game by game", 4.2),
                ("the lads", 4.2),
                ("the lads", 9.5),
            ]
        );
        assert_eq!(outcome.stats.scan.boundary_hits, 2);
        assert_eq!(outcome.transcripts[0].hits, 4);
        assert_eq!(outcome.transcripts[0].segments, 4);
        assert_eq!(outcome.transcripts[0].words, 17);
    }

    #[test]
    fn malformed_transcript_is_isolated() {
        let mut records = corpus(2);
        records.insert(1, record("Broken FC", "bad", "[{'text': 'unterminated"));

        let outcome = run_batch(&lexicon(), &records, &ScanConfig::default()).expect("run");
        assert_eq!(outcome.stats.transcripts, 3);
        assert_eq!(outcome.stats.malformed, 1);
        assert!(outcome.transcripts[1].malformed);
        assert_eq!(outcome.transcripts[1].hits, 0);
        assert_eq!(outcome.table.len(), 8);
        assert!(outcome.table.rows().iter().all(|h| h.video_id != "bad"));
    }

    #[test]
    fn python_repr_transcript_is_scanned() {
        let records = vec![record(
            "Example FC",
            "repr",
            "[{'text': 'At the end of the day', 'start': 1.0}]",
        )];
        let outcome = run_batch(&lexicon(), &records, &ScanConfig::sequential()).expect("run");
        assert_eq!(outcome.stats.malformed, 0);
        assert_eq!(outcome.table.len(), 1);
        assert_eq!(outcome.table.rows()[0].cliche, "at the end of the day");
        assert_eq!(outcome.table.rows()[0].start_time, 1.0);
    }

    #[test]
    fn empty_lexicon_runs_clean() {
        let outcome =
            run_batch(&Lexicon::default(), &corpus(3), &ScanConfig::default()).expect("run");
        assert!(outcome.table.is_empty());
        assert_eq!(outcome.stats.transcripts, 3);
    }

    #[test]
    fn duplicate_lexicon_entries_collapse_in_table() {
        let lexicon = Lexicon::build(["the lads", "the lads"]);
        let records = vec![record("A", "v1", r#"[{"text": "credit to the lads", "start": 3}]"#)];
        let outcome = run_batch(&lexicon, &records, &ScanConfig::sequential()).expect("run");

        assert_eq!(outcome.stats.scan.hits_emitted, 2);
        assert_eq!(outcome.table.len(), 1);
        assert_eq!(outcome.stats.duplicates_dropped, 1);
    }

    #[test]
    fn files_end_to_end() {
        let dir = tempfile::tempdir().expect("tempdir");
        let lexicon_path = dir.path().join("cliches.csv");
        let transcripts_path = dir.path().join("transcripts.csv");
        let output_path = dir.path().join("processed").join("cliche_hits.csv");

        std::fs::write(&lexicon_path, "cliche\nFine margins\nTake it game by game\n\n")
            .expect("write lexicon");
        std::fs::write(
            &transcripts_path,
            "club,manager,season,publish_date,video_id,transcript_segments\n\
             Samples United,Bailey Boss,2025/26,2025-08-16,v2,\"[{\"\"text\"\": \"\"Fine margins.\"\", \"\"start\"\": 2.5}]\"\n\
             Example FC,Alex Manager,2025/26,2025-08-09,v1,\"[{\"\"text\"\": \"\"we take it\"\", \"\"start\"\": 10}, {\"\"text\"\": \"\"game by game\"\"}]\"\n",
        )
        .expect("write transcripts");

        let lexicon = Lexicon::from_path(&lexicon_path).expect("lexicon");
        let table = TranscriptTable::from_path(&transcripts_path).expect("transcripts");
        let outcome = run_batch(&lexicon, &table.records, &ScanConfig::default()).expect("run");
        outcome.table.write_path(&output_path).expect("write");

        let written = std::fs::read_to_string(&output_path).expect("read back");
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(
            lines,
            [
                "club,manager,season,publish_date,video_id,cliche,start_time,segment_text,youtube_link",
                "Example FC,Alex Manager,2025/26,2025-08-09,v1,Take it game by game,10.0,we take it game by game,https://www.youtube.com/watch?v=v1&t=10s",
                "Samples United,Bailey Boss,2025/26,2025-08-16,v2,Fine margins,2.5,Fine margins.,https://www.youtube.com/watch?v=v2&t=2s",
            ]
        );
    }
}
