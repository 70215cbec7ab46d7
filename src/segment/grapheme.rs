//! Extended grapheme cluster iteration over a cursor's rune stream.

use unicode_segmentation::{GraphemeCursor, UnicodeSegmentation};

use crate::segment::Segment;
use crate::text::{Cursor, ReverseCursor, ReverseRunes, Runes};

/// Iterator over extended grapheme clusters, reading forward from a cursor.
///
/// Lazy and non-restartable: each [`next_segment`](Self::next_segment) call
/// overwrites the caller's buffer with the next cluster, the unit every
/// higher layer treats as one visual character.
#[derive(Clone)]
pub struct GraphemeClusterIter<'a> {
    runes: Runes<'a>,
    /// Runes read but not yet emitted. Always starts at a cluster boundary,
    /// so boundary detection never needs earlier context.
    pending: String,
    eof: bool,
}

impl<'a> GraphemeClusterIter<'a> {
    /// Create an iterator over the clusters ahead of a cursor.
    #[must_use]
    pub fn new(cursor: Cursor<'a>) -> Self {
        GraphemeClusterIter {
            runes: cursor.runes(),
            pending: String::new(),
            eof: false,
        }
    }

    /// Write the next cluster into `segment`. Returns false at the end of
    /// the stream, leaving the segment empty.
    pub fn next_segment(&mut self, segment: &mut Segment) -> bool {
        segment.clear();
        loop {
            if !self.pending.is_empty() {
                let mut gc = GraphemeCursor::new(0, usize::MAX, true);
                if let Ok(Some(n)) = gc.next_boundary(self.pending.as_str(), 0) {
                    if n > 0 {
                        for r in self.pending[..n].chars() {
                            segment.push(r);
                        }
                        self.pending.drain(..n);
                        return true;
                    }
                }
            }
            if self.eof {
                if self.pending.is_empty() {
                    return false;
                }
                for r in self.pending.chars() {
                    segment.push(r);
                }
                self.pending.clear();
                return true;
            }
            match self.runes.next() {
                Some(r) => self.pending.push(r),
                None => self.eof = true,
            }
        }
    }
}

/// Iterator over extended grapheme clusters, reading backward from a cursor.
///
/// Refills a window bounded by the previous newline (a position just after a
/// line feed is always a cluster boundary), segments the window forward, and
/// walks it in reverse, so boundaries agree exactly with forward iteration.
#[derive(Clone)]
pub struct ReverseGraphemeClusterIter<'a> {
    runes: ReverseRunes<'a>,
    window: String,
    /// Byte offset of each cluster start in `window`; consumed from the back.
    bounds: Vec<usize>,
    pushback: Option<char>,
    exhausted: bool,
}

impl<'a> ReverseGraphemeClusterIter<'a> {
    /// Create an iterator over the clusters behind a cursor.
    #[must_use]
    pub fn new(cursor: ReverseCursor<'a>) -> Self {
        ReverseGraphemeClusterIter {
            runes: cursor.runes(),
            window: String::new(),
            bounds: Vec::new(),
            pushback: None,
            exhausted: false,
        }
    }

    /// Write the previous cluster into `segment`. Returns false at the start
    /// of the stream, leaving the segment empty.
    pub fn next_segment(&mut self, segment: &mut Segment) -> bool {
        segment.clear();
        if self.bounds.is_empty() && !self.refill() {
            return false;
        }
        let Some(start) = self.bounds.pop() else {
            return false;
        };
        for r in self.window[start..].chars() {
            segment.push(r);
        }
        self.window.truncate(start);
        true
    }

    /// Read back to the previous newline (exclusive) or the start of the
    /// text, then segment that window forward.
    fn refill(&mut self) -> bool {
        if self.exhausted && self.pushback.is_none() {
            return false;
        }
        let first = self.pushback.take().or_else(|| self.runes.next());
        let Some(first) = first else {
            self.exhausted = true;
            return false;
        };

        let mut reversed = vec![first];
        loop {
            match self.runes.next() {
                None => {
                    self.exhausted = true;
                    break;
                }
                Some('\n') => {
                    self.pushback = Some('\n');
                    break;
                }
                Some(r) => reversed.push(r),
            }
        }

        self.window.clear();
        self.window.extend(reversed.iter().rev());
        self.bounds.clear();
        self.bounds
            .extend(self.window.grapheme_indices(true).map(|(i, _)| i));
        true
    }
}
