//! Soft- and hard-wrapped display lines.

use crate::segment::Segment;
use crate::segment::grapheme::GraphemeClusterIter;
use crate::segment::line_break::{LineBreakDecision, LineBreaker};
use crate::text::Cursor;

/// Where a line may be cut when it overflows the display width.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WrapMode {
    /// Cut at any grapheme cluster boundary.
    #[default]
    Cluster,
    /// Prefer the most recent position where the line breaker allowed a
    /// break, falling back to the cluster boundary when there is none.
    Word,
}

/// Configuration for soft-wrapping lines.
#[derive(Clone)]
pub struct LineWrapConfig<F> {
    max_line_width: usize,
    mode: WrapMode,
    width_fn: F,
}

impl<F> LineWrapConfig<F>
where
    F: Fn(&[char], usize) -> usize,
{
    /// Construct a wrap configuration.
    ///
    /// `max_line_width` is the maximum number of cells per line and must be
    /// at least one. `width_fn` returns the width in cells of a grapheme
    /// cluster at a given cell offset in its line.
    ///
    /// # Panics
    ///
    /// Panics if `max_line_width` is zero.
    pub fn new(max_line_width: usize, width_fn: F) -> Self {
        assert!(max_line_width > 0, "max line width must be at least one cell");
        LineWrapConfig {
            max_line_width,
            mode: WrapMode::Cluster,
            width_fn,
        }
    }

    /// Set the wrap mode.
    #[must_use]
    pub fn with_mode(mut self, mode: WrapMode) -> Self {
        self.mode = mode;
        self
    }
}

#[derive(Clone, Debug)]
struct BufferedCluster {
    rune_start: usize,
    rune_len: usize,
    width: usize,
    can_break_before: bool,
}

/// Iterator over soft- and hard-wrapped display lines.
///
/// A hard newline always ends a line and is included in it. A cluster that
/// alone exceeds the maximum width gets a line of its own, never split.
/// Concatenating the emitted lines in order reproduces the input exactly.
#[derive(Clone)]
pub struct WrappedLineIter<'a, F> {
    config: LineWrapConfig<F>,
    gc_iter: GraphemeClusterIter<'a>,
    gc_segment: Segment,
    breaker: LineBreaker,
    buffer: Vec<char>,
    clusters: Vec<BufferedCluster>,
    current_width: usize,
}

impl<'a, F> WrappedLineIter<'a, F>
where
    F: Fn(&[char], usize) -> usize,
{
    /// Create an iterator over the wrapped lines ahead of a cursor.
    #[must_use]
    pub fn new(cursor: Cursor<'a>, config: LineWrapConfig<F>) -> Self {
        WrappedLineIter {
            config,
            gc_iter: GraphemeClusterIter::new(cursor),
            gc_segment: Segment::new(),
            breaker: LineBreaker::new(),
            buffer: Vec::new(),
            clusters: Vec::new(),
            current_width: 0,
        }
    }

    /// Write the next display line into `segment`. Returns false at the end
    /// of the stream, leaving the segment empty.
    pub fn next_segment(&mut self, segment: &mut Segment) -> bool {
        segment.clear();
        loop {
            if !self.gc_iter.next_segment(&mut self.gc_segment) {
                if !self.buffer.is_empty() {
                    // Runes left in the current line; emit them.
                    segment.extend(&self.buffer);
                    self.reset_line();
                    return true;
                }
                return false;
            }

            let can_break_before = self.advance_breaker();

            if self.gc_segment.has_newline() {
                // Hard line break; the newline cluster ends the line.
                segment.extend(&self.buffer).extend(self.gc_segment.runes());
                self.reset_line();
                return true;
            }

            let gc_width = (self.config.width_fn)(self.gc_segment.runes(), self.current_width);
            if self.current_width + gc_width > self.config.max_line_width {
                if self.current_width == 0 {
                    // The cluster is too large to fit on any line, so give
                    // it its own line.
                    segment.extend(self.gc_segment.runes());
                    let mut lookahead = self.gc_iter.clone();
                    if lookahead.next_segment(&mut self.gc_segment)
                        && self.gc_segment.has_newline()
                    {
                        // Absorb the newline into this line so we don't
                        // introduce a spurious empty line after it.
                        self.gc_iter.next_segment(&mut self.gc_segment);
                        self.advance_breaker();
                        segment.extend(self.gc_segment.runes());
                    }
                    return true;
                }

                if self.config.mode == WrapMode::Word {
                    if let Some(k) = self.last_allowed_break() {
                        let cut = self.clusters[k].rune_start;
                        segment.extend(&self.buffer[..cut]);
                        self.carry_tail(k);
                        self.push_cluster(can_break_before, None);
                        return true;
                    }
                }

                // Emit the buffered line; the overflowing cluster starts
                // the next one.
                segment.extend(&self.buffer);
                self.reset_line();
                self.push_cluster(can_break_before, Some(gc_width));
                return true;
            }

            // The cluster fits on the current line.
            self.push_cluster(can_break_before, Some(gc_width));
        }
    }

    /// Feed the breaker the current cluster's runes. Returns whether a break
    /// is allowed before the cluster. Only the word mode pays for this.
    fn advance_breaker(&mut self) -> bool {
        if self.config.mode != WrapMode::Word {
            return false;
        }
        let mut can_break = false;
        for (i, &r) in self.gc_segment.runes().iter().enumerate() {
            let decision = self.breaker.process_rune(r);
            if i == 0 {
                can_break = decision == LineBreakDecision::AllowBreakBefore;
            }
        }
        can_break
    }

    fn push_cluster(&mut self, can_break_before: bool, known_width: Option<usize>) {
        let width = known_width.unwrap_or_else(|| {
            (self.config.width_fn)(self.gc_segment.runes(), self.current_width)
        });
        if self.config.mode == WrapMode::Word {
            self.clusters.push(BufferedCluster {
                rune_start: self.buffer.len(),
                rune_len: self.gc_segment.num_chars(),
                width,
                can_break_before,
            });
        }
        self.buffer.extend_from_slice(self.gc_segment.runes());
        self.current_width += width;
    }

    /// Highest buffered cluster index with an allowed break before it.
    /// Index zero never counts; breaking there would emit an empty line.
    fn last_allowed_break(&self) -> Option<usize> {
        (1..self.clusters.len()).rev().find(|&i| self.clusters[i].can_break_before)
    }

    /// Keep clusters `k..` as the start of the next line, recomputing widths
    /// from cell offset zero.
    fn carry_tail(&mut self, k: usize) {
        let cut = self.clusters[k].rune_start;
        self.buffer.drain(..cut);
        self.clusters.drain(..k);
        self.current_width = 0;
        let mut pos = 0;
        for cluster in &mut self.clusters {
            cluster.rune_start = pos;
            let runes = &self.buffer[pos..pos + cluster.rune_len];
            cluster.width = (self.config.width_fn)(runes, self.current_width);
            self.current_width += cluster.width;
            pos += cluster.rune_len;
        }
    }

    fn reset_line(&mut self) {
        self.buffer.clear();
        self.clusters.clear();
        self.current_width = 0;
    }
}
