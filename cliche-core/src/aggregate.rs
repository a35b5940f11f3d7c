//! Hit aggregation and the persisted hit table.

use std::fs::{self, File};
use std::io;
use std::path::Path;

use cliche_types::{ClicheHit, HIT_COLUMNS};
use rustc_hash::FxHashSet;
use tracing::{debug, info};

use crate::error::Result;

/// Collects hits from every transcript of a batch.
///
/// Order of arrival does not matter; [`HitAggregator::finish`] sorts.
#[derive(Debug, Default)]
pub struct HitAggregator {
    hits: Vec<ClicheHit>,
}

impl HitAggregator {
    /// Creates an empty aggregator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an aggregator with room for `capacity` hits.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            hits: Vec::with_capacity(capacity),
        }
    }

    /// Adds one hit.
    pub fn push(&mut self, hit: ClicheHit) {
        self.hits.push(hit);
    }

    /// Number of hits collected so far.
    pub fn len(&self) -> usize {
        self.hits.len()
    }

    /// Returns `true` if nothing was collected.
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// Sorts, drops exact repeats and returns the final table.
    pub fn finish(self) -> HitTable {
        HitTable::from_hits(self.hits)
    }
}

impl Extend<ClicheHit> for HitAggregator {
    fn extend<T: IntoIterator<Item = ClicheHit>>(&mut self, iter: T) {
        self.hits.extend(iter);
    }
}

/// The final, sorted hit table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HitTable {
    rows: Vec<ClicheHit>,
    duplicates_dropped: usize,
}

impl HitTable {
    /// Builds a table from raw hits.
    ///
    /// Rows are stable-sorted by club, manager, season, publish date, video,
    /// start time and phrase. A row equal to an earlier one on video, phrase,
    /// start time and matched text is dropped.
    pub fn from_hits(mut rows: Vec<ClicheHit>) -> Self {
        rows.sort_by(ClicheHit::table_order);
        let duplicates_dropped = drop_repeats(&mut rows);
        if duplicates_dropped > 0 {
            debug!(duplicates_dropped, "dropped repeated hit rows");
        }
        Self {
            rows,
            duplicates_dropped,
        }
    }

    /// Rows in table order.
    #[inline(always)]
    pub fn rows(&self) -> &[ClicheHit] {
        &self.rows
    }

    /// Consumes the table, returning its rows.
    pub fn into_rows(self) -> Vec<ClicheHit> {
        self.rows
    }

    /// Number of rows.
    #[inline(always)]
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if the table has no rows.
    #[inline(always)]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows removed as exact repeats while building the table.
    #[inline(always)]
    pub fn duplicates_dropped(&self) -> usize {
        self.duplicates_dropped
    }

    /// Writes the table as CSV. The header row is always written.
    pub fn write_csv<W: io::Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);
        wtr.write_record(HIT_COLUMNS)?;
        for row in &self.rows {
            wtr.serialize(row)?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// Writes the table to `path`, creating parent directories as needed.
    pub fn write_path(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        self.write_csv(io::BufWriter::new(File::create(path)?))?;
        info!(path = %path.display(), rows = self.rows.len(), "hit table written");
        Ok(())
    }

    /// Reads a table written by [`HitTable::write_csv`], keeping row order.
    pub fn read_csv<R: io::Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::Reader::from_reader(reader);
        let rows = rdr
            .deserialize::<ClicheHit>()
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self {
            rows,
            duplicates_dropped: 0,
        })
    }

    /// Reads a table from disk. See [`HitTable::read_csv`].
    pub fn read_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::read_csv(io::BufReader::new(File::open(path)?))
    }
}

/// Removes rows repeating an earlier row's video, phrase, start time and text.
fn drop_repeats(rows: &mut Vec<ClicheHit>) -> usize {
    let before = rows.len();
    let keep: Vec<bool> = {
        let mut seen = FxHashSet::default();
        rows.iter()
            .map(|h| {
                seen.insert((
                    h.video_id.as_str(),
                    h.cliche.as_str(),
                    h.start_time.to_bits(),
                    h.segment_text.as_str(),
                ))
            })
            .collect()
    };

    let mut keep = keep.into_iter();
    rows.retain(|_| keep.next().unwrap_or(true));
    before - rows.len()
}
