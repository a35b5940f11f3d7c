//! Bump storage for a transcript's normalized segment text.
//!
//! A scanner normalizes every segment of a transcript once, up front, and then
//! probes the texts many times (once per lexicon phrase). The arena keeps those
//! texts in a single contiguous buffer that survives between transcripts, so a
//! worker scanning thousands of videos allocates only while its buffer grows.
//!
//! ## Memory Layout
//!
//! ```text
//! Arena Buffer: [seg0][seg1][seg2][seg3]...[free space]
//!               ^     ^     ^     ^
//!               |     |     |     |
//! Spans:       (0,5) (5,7) (12,4) (16,8) ...
//! ```

/// Segment reference into the arena buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct TextSpan {
    offset: u32,
    len: u32,
}

impl TextSpan {
    /// Creates a new span.
    #[inline(always)]
    pub(crate) const fn new(offset: u32, len: u32) -> Self {
        Self { offset, len }
    }

    /// Returns the byte offset in the arena.
    #[inline(always)]
    pub(crate) const fn offset(self) -> usize {
        self.offset as usize
    }

    /// Returns the byte length.
    #[inline(always)]
    pub(crate) const fn len(self) -> usize {
        self.len as usize
    }
}

/// Bump allocator for segment text.
#[derive(Debug)]
pub struct SegmentArena {
    buffer: String,
    spans: Vec<TextSpan>,
}

impl Default for SegmentArena {
    fn default() -> Self {
        Self::new()
    }
}

impl SegmentArena {
    /// Creates a new empty arena.
    pub fn new() -> Self {
        Self::with_capacity(16 * 1024, 256)
    }

    /// Creates a new arena with pre-allocated capacity.
    pub fn with_capacity(buffer_cap: usize, segment_cap: usize) -> Self {
        Self {
            buffer: String::with_capacity(buffer_cap),
            spans: Vec::with_capacity(segment_cap),
        }
    }

    /// Returns the number of segments stored.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    /// Returns true if no segments are stored.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Drops all segments, keeping capacity.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.spans.clear();
    }

    /// Appends a segment's text and returns its index.
    ///
    /// Returns `None` once the buffer would pass `u32::MAX` bytes.
    #[inline]
    pub fn push(&mut self, text: &str) -> Option<usize> {
        let offset = u32::try_from(self.buffer.len()).ok()?;
        let len = u32::try_from(text.len()).ok()?;
        offset.checked_add(len)?;

        self.buffer.push_str(text);
        self.spans.push(TextSpan::new(offset, len));
        Some(self.spans.len() - 1)
    }

    /// Gets a segment's text by index.
    #[inline(always)]
    pub fn get(&self, index: usize) -> Option<&str> {
        let span = self.spans.get(index)?;
        self.buffer.get(span.offset()..span.offset() + span.len())
    }

    /// Total bytes of text held.
    #[inline(always)]
    pub fn bytes(&self) -> usize {
        self.buffer.len()
    }
}
