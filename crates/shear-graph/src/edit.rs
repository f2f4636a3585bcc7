//! Offset-stable text editing.
//!
//! [`EditBuffer`] records removals as byte ranges against the *original* text
//! and only materializes the result when rendered. Pending removals never shift
//! each other's offsets, so several declarations can be removed in one pass in
//! any order. Overlapping or duplicate removals are merged.

use std::fmt;
use std::ops::Range;

use crate::span::SourceSpan;

/// Error returned when a removal does not fit the original text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    #[error("Invalid edit range {start}..{end} for source of {len} bytes")]
    OutOfBounds { start: usize, end: usize, len: usize },

    #[error("Edit range {start}..{end} does not fall on UTF-8 character boundaries")]
    NotCharBoundary { start: usize, end: usize },
}

/// Interval-based edit buffer over an immutable original string.
#[derive(Debug, Clone)]
pub struct EditBuffer<'a> {
    original: &'a str,
    removals: Vec<Range<usize>>,
}

impl<'a> EditBuffer<'a> {
    pub fn new(original: &'a str) -> Self {
        Self {
            original,
            removals: Vec::new(),
        }
    }

    pub fn original(&self) -> &'a str {
        self.original
    }

    /// Remove `[start, end)` of the original text.
    pub fn remove(&mut self, start: usize, end: usize) -> Result<&mut Self, EditError> {
        let len = self.original.len();
        if start > end || end > len {
            return Err(EditError::OutOfBounds { start, end, len });
        }
        if !self.original.is_char_boundary(start) || !self.original.is_char_boundary(end) {
            return Err(EditError::NotCharBoundary { start, end });
        }
        if start < end {
            self.removals.push(start..end);
        }
        Ok(self)
    }

    pub fn remove_span(&mut self, span: SourceSpan) -> Result<&mut Self, EditError> {
        self.remove(span.start as usize, span.end as usize)
    }

    /// True when no bytes have been removed.
    pub fn is_untouched(&self) -> bool {
        self.removals.is_empty()
    }

    /// Sorted, non-overlapping removal ranges.
    fn merged_removals(&self) -> Vec<Range<usize>> {
        let mut sorted = self.removals.clone();
        sorted.sort_by_key(|range| (range.start, range.end));

        let mut merged: Vec<Range<usize>> = Vec::with_capacity(sorted.len());
        for range in sorted {
            match merged.last_mut() {
                Some(last) if range.start <= last.end => last.end = last.end.max(range.end),
                _ => merged.push(range),
            }
        }
        merged
    }

    /// Number of original bytes the rendered text omits.
    pub fn removed_len(&self) -> usize {
        self.merged_removals().iter().map(|r| r.end - r.start).sum()
    }

    /// Original bytes that survive, in order.
    fn kept_slices(&self) -> Vec<&'a str> {
        let original = self.original;
        let mut kept = Vec::new();
        let mut cursor = 0;
        for range in self.merged_removals() {
            if cursor < range.start {
                kept.push(&original[cursor..range.start]);
            }
            cursor = range.end;
        }
        if cursor < original.len() {
            kept.push(&original[cursor..]);
        }
        kept
    }
}

impl fmt::Display for EditBuffer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for slice in self.kept_slices() {
            f.write_str(slice)?;
        }
        Ok(())
    }
}
