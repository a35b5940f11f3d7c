//! The segment-by-phrase scan.

use cliche_types::{ClicheHit, Segment, TranscriptMeta};
use tracing::warn;

use crate::lexicon::Lexicon;
use crate::scanner::types::MatchScanner;

impl MatchScanner {
    /// Scans one transcript and hands every hit to `emit`, in detection order.
    ///
    /// Segments are visited in order. At each segment every lexicon entry not
    /// already holding a claim on it is tried, in lexicon order:
    ///
    /// 1. If the segment alone contains the phrase, a hit is emitted with the
    ///    segment's raw text and the entry claims this segment.
    /// 2. Otherwise, if a next segment exists and the two normalized texts
    ///    joined by a space contain the phrase, a hit is emitted with both raw
    ///    texts and the entry claims both segments.
    ///
    /// A claim only blocks the same entry; other entries scan the same
    /// segments independently. Phrases spanning three or more segments are
    /// not detected.
    pub fn scan_transcript<F>(
        &mut self,
        meta: &TranscriptMeta,
        segments: &[Segment],
        lexicon: &Lexicon,
        mut emit: F,
    ) where
        F: FnMut(ClicheHit),
    {
        self.transcripts_scanned += 1;
        self.load_segments(segments);

        self.claimed.clear();
        self.claimed.resize(lexicon.len(), None);

        let n = segments.len();
        for i in 0..n {
            let current = self.segments.get(i).unwrap_or_default();
            let start_time = segments[i].start_or_zero();
            let mut window_ready = false;

            for (claimed, pattern) in self.claimed.iter_mut().zip(lexicon.iter()) {
                if claimed.is_some_and(|end| i <= end) {
                    continue;
                }
                debug_assert!(!pattern.normalized().is_empty());

                if pattern.is_in(current) {
                    emit(ClicheHit::new(
                        meta,
                        pattern.original(),
                        start_time,
                        segments[i].text.as_str(),
                    ));
                    *claimed = Some(i);
                    self.hits_emitted += 1;
                    continue;
                }

                if i + 1 >= n {
                    continue;
                }

                if !window_ready {
                    let next = self.segments.get(i + 1).unwrap_or_default();
                    self.window_buf.clear();
                    self.window_buf.push_str(current);
                    if !current.is_empty() && !next.is_empty() {
                        self.window_buf.push(' ');
                    }
                    self.window_buf.push_str(next);
                    window_ready = true;
                }

                if pattern.is_in(&self.window_buf) {
                    let joined = format!("{} {}", segments[i].text, segments[i + 1].text);
                    emit(ClicheHit::new(
                        meta,
                        pattern.original(),
                        start_time,
                        joined.trim(),
                    ));
                    *claimed = Some(i + 1);
                    self.hits_emitted += 1;
                    self.boundary_hits += 1;
                }
            }
        }
    }

    /// Scans one transcript and collects its hits.
    pub fn scan(
        &mut self,
        meta: &TranscriptMeta,
        segments: &[Segment],
        lexicon: &Lexicon,
    ) -> Vec<ClicheHit> {
        let mut hits = Vec::new();
        self.scan_transcript(meta, segments, lexicon, |hit| hits.push(hit));
        hits
    }

    fn load_segments(&mut self, segments: &[Segment]) {
        self.segments.clear();
        for (i, segment) in segments.iter().enumerate() {
            self.normalizer
                .normalize_into(&segment.text, &mut self.norm_buf);
            if self.segments.push(&self.norm_buf).is_none() {
                warn!(
                    segment = i,
                    total = segments.len(),
                    "transcript text exceeds arena capacity; remaining segments treated as empty"
                );
                break;
            }
        }
        self.segments_scanned += segments.len() as u64;
    }
}

/// Scans one transcript with a fresh scanner.
pub fn scan_transcript(
    meta: &TranscriptMeta,
    segments: &[Segment],
    lexicon: &Lexicon,
) -> Vec<ClicheHit> {
    MatchScanner::new().scan(meta, segments, lexicon)
}
