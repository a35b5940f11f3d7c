//! Cliché scan over a transcript table.
//!
//! Reads the lexicon and transcript tables, scans every transcript, and
//! writes the sorted hit table. Optionally writes per-club rankings and
//! prints the most frequent phrases.
//!
//! ## Usage
//!
//! ```bash
//! # Default layout: data/raw/{transcripts,cliches}.csv -> data/processed/cliche_hits.csv
//! ./target/release/cliche_scan
//!
//! # Explicit paths, four workers, rankings for August only
//! ./target/release/cliche_scan \
//!     --transcripts pressers.csv --lexicon phrases.csv --output hits.csv \
//!     --threads 4 --rankings rankings.csv --from 2025-08-01 --until 2025-08-31
//! ```
//!
//! Logging goes through `RUST_LOG` (default `info`).

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;

use cliche_core::cliche_types::ScanConfig;
use cliche_core::report::{
    club_rankings, parse_date, phrase_frequencies, write_rankings_path, HitFilter,
};
use cliche_core::{run_batch, BatchOutcome, Lexicon, TranscriptTable};

/// Find football press-conference clichés in timestamped transcripts
#[derive(Parser, Debug)]
#[command(name = "cliche_scan")]
#[command(about = "Scan press-conference transcripts for stock phrases")]
struct Args {
    /// Transcript table (CSV with a transcript_segments column)
    #[arg(long, short = 't', default_value = "data/raw/transcripts.csv")]
    transcripts: PathBuf,

    /// Lexicon table (CSV with a cliche column)
    #[arg(long, short = 'l', default_value = "data/raw/cliches.csv")]
    lexicon: PathBuf,

    /// Where to write the hit table
    #[arg(long, short = 'o', default_value = "data/processed/cliche_hits.csv")]
    output: PathBuf,

    /// Scan on the calling thread only
    #[arg(long, conflicts_with = "threads")]
    sequential: bool,

    /// Worker threads (0 = one per core)
    #[arg(long, short = 'j', default_value_t = 0)]
    threads: usize,

    /// Also write per-club rankings to this file
    #[arg(long)]
    rankings: Option<PathBuf>,

    /// Restrict rankings and phrase counts to one club
    #[arg(long)]
    club: Option<String>,

    /// Earliest publish date for rankings (YYYY-MM-DD, inclusive)
    #[arg(long, value_parser = parse_date_arg)]
    from: Option<NaiveDate>,

    /// Latest publish date for rankings (YYYY-MM-DD, inclusive)
    #[arg(long, value_parser = parse_date_arg)]
    until: Option<NaiveDate>,

    /// Number of top phrases to print
    #[arg(long, default_value_t = 10)]
    top: usize,
}

impl Args {
    fn scan_config(&self) -> ScanConfig {
        if self.sequential {
            ScanConfig::sequential()
        } else {
            ScanConfig::with_threads(self.threads)
        }
    }

    fn filter(&self) -> HitFilter {
        HitFilter {
            club: self.club.clone(),
            from: self.from,
            until: self.until,
        }
    }
}

/// Parse a date bound from the command line
fn parse_date_arg(s: &str) -> Result<NaiveDate, String> {
    parse_date(s).ok_or_else(|| format!("invalid date `{s}`, expected YYYY-MM-DD"))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = Args::parse();

    let lexicon = Lexicon::from_path(&args.lexicon)
        .with_context(|| format!("loading lexicon from {}", args.lexicon.display()))?;
    let table = TranscriptTable::from_path(&args.transcripts)
        .with_context(|| format!("loading transcripts from {}", args.transcripts.display()))?;

    let start = Instant::now();
    let outcome = run_batch(&lexicon, &table.records, &args.scan_config())
        .context("scanning transcripts")?;
    let elapsed = start.elapsed();

    outcome
        .table
        .write_path(&args.output)
        .with_context(|| format!("writing hit table to {}", args.output.display()))?;

    let filter = args.filter();
    if let Some(path) = &args.rankings {
        let rankings = club_rankings(&outcome.transcripts, outcome.table.rows(), &filter);
        write_rankings_path(&rankings, path)
            .with_context(|| format!("writing rankings to {}", path.display()))?;
    }

    print_summary(&outcome, lexicon.len(), table.skipped_rows, elapsed);
    print_top_phrases(&outcome, &filter, args.top);
    Ok(())
}

fn print_summary(outcome: &BatchOutcome, phrases: usize, skipped_rows: usize, elapsed: Duration) {
    let stats = &outcome.stats;
    let secs = elapsed.as_secs_f64();

    println!("--------------------------------");
    println!("Phrases     : {}", fmt_count(phrases as u64));
    println!("Transcripts : {}", fmt_count(stats.transcripts as u64));
    println!("Segments    : {}", fmt_count(stats.scan.segments_scanned));
    println!("Hits        : {}", fmt_count(stats.scan.hits_emitted));
    println!("  boundary  : {}", fmt_count(stats.scan.boundary_hits));
    println!("Rows        : {}", fmt_count(stats.rows as u64));
    if stats.duplicates_dropped > 0 {
        println!("Duplicates  : {}", fmt_count(stats.duplicates_dropped as u64));
    }
    if stats.malformed > 0 || skipped_rows > 0 {
        println!("Malformed   : {}", fmt_count(stats.malformed as u64));
        println!("Skipped rows: {}", fmt_count(skipped_rows as u64));
    }
    println!("Elapsed     : {:.3} s", secs);
    if secs > 0.0 {
        println!(
            "Segments/sec: {}",
            fmt_count((stats.scan.segments_scanned as f64 / secs) as u64)
        );
    }
    println!("--------------------------------");
}

fn print_top_phrases(outcome: &BatchOutcome, filter: &HitFilter, top: usize) {
    if top == 0 {
        return;
    }
    let counts = phrase_frequencies(filter.hits(outcome.table.rows()));
    if counts.is_empty() {
        return;
    }

    println!("\nTop phrases:");
    for c in counts.iter().take(top) {
        println!("  {:>8}  {}", fmt_count(c.count as u64), c.cliche);
    }
}

fn fmt_count(n: u64) -> String {
    let s = n.to_string();
    let mut out = String::with_capacity(s.len() + s.len() / 3);

    for (i, ch) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            out.push('_');
        }
        out.push(ch);
    }

    out.chars().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_data_layout() {
        let args = Args::try_parse_from(["cliche_scan"]).expect("defaults parse");
        assert_eq!(args.transcripts, PathBuf::from("data/raw/transcripts.csv"));
        assert_eq!(args.lexicon, PathBuf::from("data/raw/cliches.csv"));
        assert_eq!(args.output, PathBuf::from("data/processed/cliche_hits.csv"));
        assert_eq!(args.scan_config(), ScanConfig::with_threads(0));
        assert_eq!(args.filter(), HitFilter::all());
    }

    #[test]
    fn date_bounds_are_parsed() {
        let args = Args::try_parse_from([
            "cliche_scan",
            "--from",
            "2025-8-1",
            "--until",
            "2025-08-31",
            "--club",
            "Example FC",
        ])
        .expect("bounds parse");
        let filter = args.filter();
        assert_eq!(filter.from, NaiveDate::from_ymd_opt(2025, 8, 1));
        assert_eq!(filter.until, NaiveDate::from_ymd_opt(2025, 8, 31));
        assert!(filter.matches("Example FC", "2025-08-09"));
        assert!(!filter.matches("Example FC", "2025-09-01"));
    }

    #[test]
    fn bad_date_bound_is_rejected() {
        let err = Args::try_parse_from(["cliche_scan", "--from", "not a date"]).unwrap_err();
        assert!(err.to_string().contains("invalid date `not a date`"));
        assert!(Args::try_parse_from(["cliche_scan", "--until", "2025-02-30"]).is_err());
    }

    #[test]
    fn sequential_conflicts_with_threads() {
        assert!(Args::try_parse_from(["cliche_scan", "--sequential", "--threads", "2"]).is_err());
        let args = Args::try_parse_from(["cliche_scan", "--sequential"]).expect("parse");
        assert_eq!(args.scan_config(), ScanConfig::sequential());
    }
}
