//! Character motions within and across lines.

use crate::locate::{clusters_backward, clusters_forward};
use crate::segment::Segment;
use crate::text::Tree;

/// Position `count` clusters to the right, staying on the current line.
/// With `include_end_of_line_or_file`, the position may land on the line's
/// newline (or one past the last character of the document).
#[must_use]
pub fn next_char_in_line(
    tree: &Tree,
    count: usize,
    include_end_of_line_or_file: bool,
    pos: usize,
) -> usize {
    let mut p = pos.min(tree.num_chars());
    let mut iter = clusters_forward(tree, p);
    let mut seg = Segment::new();
    for _ in 0..count {
        if !iter.next_segment(&mut seg) || seg.has_newline() {
            break;
        }
        let q = p + seg.num_chars();
        if include_end_of_line_or_file {
            p = q;
            continue;
        }
        // The landing position must have a character on this line.
        let mut peek = iter.clone();
        let mut next_seg = Segment::new();
        if peek.next_segment(&mut next_seg) && !next_seg.has_newline() {
            p = q;
        } else {
            break;
        }
    }
    p
}

/// Position `count` clusters to the left, staying on the current line. With
/// `include_end_of_line`, the position may land on the previous line's
/// newline.
#[must_use]
pub fn prev_char_in_line(
    tree: &Tree,
    count: usize,
    include_end_of_line: bool,
    pos: usize,
) -> usize {
    let mut p = pos.min(tree.num_chars());
    let mut iter = clusters_backward(tree, p);
    let mut seg = Segment::new();
    for _ in 0..count {
        if !iter.next_segment(&mut seg) {
            break;
        }
        if seg.has_newline() {
            if include_end_of_line {
                p -= seg.num_chars();
            }
            break;
        }
        p -= seg.num_chars();
    }
    p
}

/// Position `count` clusters to the left, crossing newlines.
#[must_use]
pub fn prev_char(tree: &Tree, count: usize, pos: usize) -> usize {
    let mut p = pos.min(tree.num_chars());
    let mut iter = clusters_backward(tree, p);
    let mut seg = Segment::new();
    for _ in 0..count {
        if !iter.next_segment(&mut seg) {
            break;
        }
        p -= seg.num_chars();
    }
    p
}

/// Scan right on the current line for the `count`-th cluster starting with
/// `target`. Returns the match position (or, without `include_char`, the
/// position just before it) and whether a match was found.
#[must_use]
pub fn next_matching_char_in_line(
    tree: &Tree,
    target: char,
    count: usize,
    include_char: bool,
    pos: usize,
) -> (bool, usize) {
    let pos = pos.min(tree.num_chars());
    let mut iter = clusters_forward(tree, pos);
    let mut seg = Segment::new();
    if !iter.next_segment(&mut seg) || seg.has_newline() {
        return (false, pos);
    }
    let mut prev = pos;
    let mut p = pos + seg.num_chars();
    let mut remaining = count;
    while iter.next_segment(&mut seg) {
        if seg.has_newline() {
            break;
        }
        if seg.first_rune() == Some(target) {
            remaining -= 1;
            if remaining == 0 {
                return (true, if include_char { p } else { prev });
            }
        }
        prev = p;
        p += seg.num_chars();
    }
    (false, pos)
}

/// Scan left on the current line for the `count`-th cluster starting with
/// `target`. Returns the match position (or, without `include_char`, the
/// position just after it) and whether a match was found.
#[must_use]
pub fn prev_matching_char_in_line(
    tree: &Tree,
    target: char,
    count: usize,
    include_char: bool,
    pos: usize,
) -> (bool, usize) {
    let start = pos.min(tree.num_chars());
    let mut iter = clusters_backward(tree, start);
    let mut seg = Segment::new();
    let mut p = start;
    let mut remaining = count;
    while iter.next_segment(&mut seg) {
        if seg.has_newline() {
            break;
        }
        let q = p - seg.num_chars();
        if seg.first_rune() == Some(target) {
            remaining -= 1;
            if remaining == 0 {
                return (true, if include_char { q } else { p });
            }
        }
        p = q;
    }
    (false, start)
}

/// Closest position on the line holding a character the cursor can sit on.
/// Positions on a newline (or past the end of the document) move back one
/// cluster, except on an empty line.
#[must_use]
pub fn closest_char_on_line(tree: &Tree, pos: usize) -> usize {
    let p = pos.min(tree.num_chars());
    let mut iter = clusters_forward(tree, p);
    let mut seg = Segment::new();
    if iter.next_segment(&mut seg) && !seg.has_newline() {
        return p;
    }
    let mut back = clusters_backward(tree, p);
    if back.next_segment(&mut seg) && !seg.has_newline() {
        return p - seg.num_chars();
    }
    p
}
