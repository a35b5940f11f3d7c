//! Transcript table rows and segment decoding.
//!
//! Each row of the transcript table describes one video. Its segment list is a
//! JSON array of `{text, start}` objects stored in a single cell and decoded
//! on demand, so one bad cell only costs that transcript.

use std::fs::File;
use std::io;
use std::path::Path;

use cliche_types::{Segment, Transcript, TranscriptMeta};
use serde::Deserialize;
use tracing::{info, warn};

use crate::analyzer::word_count;
use crate::error::Result;
use crate::literal;

/// Column holding the serialized segment list.
pub const SEGMENTS_COLUMN: &str = "transcript_segments";

/// One row of the transcript table.
///
/// Absent metadata columns read as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TranscriptRecord {
    /// Club.
    pub club: String,
    /// Manager.
    pub manager: String,
    /// Season label.
    pub season: String,
    /// Publish date.
    pub publish_date: String,
    /// Video identifier.
    pub video_id: String,
    /// JSON-encoded segment list.
    pub transcript_segments: Option<String>,
    /// Pre-cleaned full text, used for word counts when present.
    pub transcript_cleaned: Option<String>,
}

impl TranscriptRecord {
    /// Metadata copied onto every hit from this transcript.
    pub fn meta(&self) -> TranscriptMeta {
        TranscriptMeta {
            club: self.club.clone(),
            manager: self.manager.clone(),
            season: self.season.clone(),
            publish_date: self.publish_date.clone(),
            video_id: self.video_id.clone(),
        }
    }

    /// Decodes the segment list.
    ///
    /// The cell is read as JSON first and, failing that, as a Python literal
    /// (`[{'text': ..., 'start': ...}]`). An empty cell, or a value that is
    /// not a list (`null`, an object), means the transcript has no segments.
    ///
    /// # Errors
    ///
    /// Returns `Error::Segments` when the cell is neither JSON nor a Python
    /// literal, or a list element is not a segment object.
    pub fn segments(&self) -> Result<Vec<Segment>> {
        let Some(cell) = self.transcript_segments.as_deref() else {
            return Ok(Vec::new());
        };
        if cell.trim().is_empty() {
            return Ok(Vec::new());
        }

        let value = match serde_json::from_str::<serde_json::Value>(cell) {
            Ok(value) => value,
            Err(json_err) => literal::parse(cell).map_err(|_| json_err)?,
        };
        if !value.is_array() {
            return Ok(Vec::new());
        }
        Ok(Vec::<Segment>::deserialize(value)?)
    }

    /// Decodes the whole row into a [`Transcript`].
    pub fn to_transcript(&self) -> Result<Transcript> {
        Ok(Transcript {
            meta: self.meta(),
            segments: self.segments()?,
        })
    }

    /// Words spoken in this transcript.
    ///
    /// Uses the pre-cleaned text when the table carries it, otherwise the
    /// decoded segments.
    pub fn word_count(&self, segments: &[Segment]) -> usize {
        match self.transcript_cleaned.as_deref() {
            Some(cleaned) => word_count(cleaned),
            None => segments.iter().map(|s| word_count(&s.text)).sum(),
        }
    }
}

/// All readable rows of a transcript table.
#[derive(Debug, Clone, Default)]
pub struct TranscriptTable {
    /// Rows in file order.
    pub records: Vec<TranscriptRecord>,
    /// Rows that could not be read and were skipped.
    pub skipped_rows: usize,
}

impl TranscriptTable {
    /// Reads a transcript table.
    ///
    /// Rows that fail to parse are logged and skipped; they never abort the read.
    ///
    /// # Errors
    ///
    /// Returns `Error::Csv` if the header row cannot be read.
    pub fn from_reader<R: io::Read>(reader: R, source_name: &str) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
        let headers = rdr.headers()?.clone();

        if !headers.iter().any(|h| h == SEGMENTS_COLUMN) {
            warn!(
                source = source_name,
                column = SEGMENTS_COLUMN,
                "transcript table has no segment column; every transcript will scan empty"
            );
        }

        let mut table = Self::default();
        for (idx, row) in rdr.deserialize::<TranscriptRecord>().enumerate() {
            match row {
                Ok(record) => table.records.push(record),
                Err(err) => {
                    warn!(source = source_name, row = idx + 1, error = %err, "skipping unreadable transcript row");
                    table.skipped_rows += 1;
                }
            }
        }

        info!(
            source = source_name,
            transcripts = table.records.len(),
            skipped = table.skipped_rows,
            "transcripts loaded"
        );
        Ok(table)
    }

    /// Reads a transcript table from disk. See [`TranscriptTable::from_reader`].
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        Self::from_reader(io::BufReader::new(file), &path.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn record(cell: Option<&str>) -> TranscriptRecord {
        TranscriptRecord {
            video_id: "v1".into(),
            transcript_segments: cell.map(str::to_owned),
            ..Default::default()
        }
    }

    #[test]
    fn decodes_segment_list() {
        let rec = record(Some(r#"[{"text": "Hello", "start": 0.5}, {"text": "there", "start": 1}]"#));
        let segments = rec.segments().expect("should decode");
        assert_eq!(
            segments,
            vec![Segment::new("Hello", Some(0.5)), Segment::new("there", Some(1.0))]
        );
    }

    #[test]
    fn empty_and_non_array_cells_have_no_segments() {
        assert!(record(None).segments().expect("ok").is_empty());
        assert!(record(Some("  ")).segments().expect("ok").is_empty());
        assert!(record(Some("null")).segments().expect("ok").is_empty());
        assert!(record(Some(r#"{"text": "x"}"#)).segments().expect("ok").is_empty());
        assert!(record(Some("[]")).segments().expect("ok").is_empty());
    }

    #[test]
    fn python_repr_cells_decode() {
        let rec = record(Some("[{'text': 'at the end of the day', 'start': 1.0}, {'text': \"it's\", 'start': None}]"));
        assert_eq!(
            rec.segments().expect("should decode"),
            vec![
                Segment::new("at the end of the day", Some(1.0)),
                Segment::new("it's", None),
            ]
        );
    }

    #[test]
    fn malformed_cells_are_errors() {
        let err = record(Some("[{'text': 'unterminated}]")).segments().unwrap_err();
        assert!(matches!(err, Error::Segments(_)));
        assert!(record(Some("[{'text' 'missing colon'}]")).segments().is_err());
        assert!(record(Some(r#"["just a string"]"#)).segments().is_err());
        assert!(record(Some("[{\"text\": \"unterminated\"")).segments().is_err());
    }

    #[test]
    fn to_transcript_keeps_order() {
        let rec = record(Some(r#"[{"text": "b", "start": 5}, {"text": "a", "start": 1}]"#));
        let transcript = rec.to_transcript().expect("should decode");
        assert_eq!(transcript.meta.video_id, "v1");
        assert_eq!(transcript.segments[0].text, "b");
        assert_eq!(transcript.segments[1].text, "a");
    }

    #[test]
    fn word_count_prefers_cleaned_text() {
        let segments = vec![Segment::new("one two, three", None), Segment::new("four ...", None)];
        let mut rec = record(None);
        assert_eq!(rec.word_count(&segments), 4);

        rec.transcript_cleaned = Some("one two".into());
        assert_eq!(rec.word_count(&segments), 2);
    }

    #[test]
    fn reads_table_with_missing_columns() {
        let csv = "club,video_id,transcript_segments,extra\n\
                   Example FC,v1,\"[{\"\"text\"\": \"\"hi\"\", \"\"start\"\": 2}]\",x\n\
                   Samples United,v2,,y\n";
        let table = TranscriptTable::from_reader(csv.as_bytes(), "inline").expect("should read");
        assert_eq!(table.records.len(), 2);
        assert_eq!(table.skipped_rows, 0);

        let first = &table.records[0];
        assert_eq!(first.club, "Example FC");
        assert_eq!(first.manager, "");
        assert_eq!(first.segments().expect("ok"), vec![Segment::new("hi", Some(2.0))]);

        let second = &table.records[1];
        assert_eq!(second.transcript_segments, None);
        assert!(second.segments().expect("ok").is_empty());
    }

    #[test]
    fn numeric_looking_metadata_stays_text() {
        let csv = "club,season,publish_date,video_id\nExample FC,2025,2025-08-09,12345\n";
        let table = TranscriptTable::from_reader(csv.as_bytes(), "inline").expect("should read");
        let meta = table.records[0].meta();
        assert_eq!(meta.season, "2025");
        assert_eq!(meta.video_id, "12345");
    }
}
