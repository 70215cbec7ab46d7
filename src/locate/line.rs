//! Line boundary motions.

use crate::locate::{CharClass, clusters_forward, segment_class};
use crate::segment::Segment;
use crate::text::Tree;

/// Position of the start of the line containing `pos`.
#[must_use]
pub fn prev_line_boundary(tree: &Tree, pos: usize) -> usize {
    let mut p = pos.min(tree.num_chars());
    for r in tree.reverse_cursor_at(p).runes() {
        if r == '\n' {
            break;
        }
        p -= 1;
    }
    p
}

/// Position of the end of the line containing `pos`: the newline (or one
/// past the last character of the document) with
/// `include_end_of_line_or_file`, otherwise the last character of the line.
#[must_use]
pub fn next_line_boundary(tree: &Tree, include_end_of_line_or_file: bool, pos: usize) -> usize {
    let mut p = pos.min(tree.num_chars());
    let mut last_char = p;
    let mut found_char = false;
    let mut iter = clusters_forward(tree, p);
    let mut seg = Segment::new();
    while iter.next_segment(&mut seg) {
        if seg.has_newline() {
            break;
        }
        last_char = p;
        found_char = true;
        p += seg.num_chars();
    }
    if include_end_of_line_or_file || !found_char {
        p
    } else {
        last_char
    }
}

/// Position of the first cluster on the line that is not whitespace, or of
/// the line's newline when the line is blank.
#[must_use]
pub fn next_non_whitespace_or_newline(tree: &Tree, pos: usize) -> usize {
    let mut p = pos.min(tree.num_chars());
    let mut iter = clusters_forward(tree, p);
    let mut seg = Segment::new();
    while iter.next_segment(&mut seg) {
        if segment_class(&seg) != Some(CharClass::Whitespace) || seg.has_newline() {
            break;
        }
        p += seg.num_chars();
    }
    p
}

/// Position of the start of a line, clamped to the last line.
#[must_use]
pub fn start_of_line_num(tree: &Tree, line_num: usize) -> usize {
    let last_line = tree.num_lines() - 1;
    tree.line_start_position(line_num.min(last_line))
}

/// Position of the start of the last line.
#[must_use]
pub fn start_of_last_line(tree: &Tree) -> usize {
    tree.line_start_position(tree.num_newlines())
}

/// Position of the start of the line `count` lines above, clamped to the
/// first line.
#[must_use]
pub fn start_of_line_above(tree: &Tree, count: usize, pos: usize) -> usize {
    let mut p = prev_line_boundary(tree, pos);
    for _ in 0..count {
        if p == 0 {
            break;
        }
        p = prev_line_boundary(tree, p - 1);
    }
    p
}

/// Position of the start of the line `count` lines below, clamped to the
/// last line.
#[must_use]
pub fn start_of_line_below(tree: &Tree, count: usize, pos: usize) -> usize {
    let start = pos.min(tree.num_chars());
    let mut p = start;
    let mut line_start = None;
    let mut remaining = count;
    for r in tree.cursor_at(start).runes() {
        p += 1;
        if r == '\n' {
            line_start = Some(p);
            remaining -= 1;
            if remaining == 0 {
                break;
            }
        }
    }
    line_start.unwrap_or_else(|| prev_line_boundary(tree, pos))
}
