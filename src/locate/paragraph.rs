//! Paragraph motions. Empty lines separate paragraphs.

use crate::locate::{clusters_backward, clusters_forward};
use crate::segment::Segment;
use crate::text::Tree;

/// Position of the next empty line after the cursor's paragraph, or the end
/// of the document.
#[must_use]
pub fn next_paragraph(tree: &Tree, pos: usize) -> usize {
    let mut p = pos.min(tree.num_chars());
    let mut iter = clusters_forward(tree, p);
    let mut seg = Segment::new();
    let mut prev_newline = false;
    let mut seen_non_newline = false;
    while iter.next_segment(&mut seg) {
        let newline = seg.has_newline();
        if newline && prev_newline && seen_non_newline {
            return p;
        }
        if newline {
            prev_newline = true;
        } else {
            prev_newline = false;
            seen_non_newline = true;
        }
        p += seg.num_chars();
    }
    p
}

/// Position of the closest empty line before the cursor, or the start of the
/// document.
#[must_use]
pub fn prev_paragraph(tree: &Tree, pos: usize) -> usize {
    let mut p = pos.min(tree.num_chars());
    let mut iter = clusters_backward(tree, p);
    let mut seg = Segment::new();
    if !iter.next_segment(&mut seg) {
        return 0;
    }
    let mut current_newline = seg.has_newline();
    let mut q = p - seg.num_chars();
    loop {
        if !iter.next_segment(&mut seg) {
            return 0;
        }
        let before_newline = seg.has_newline();
        if current_newline && before_newline {
            // The line starting at q is empty.
            return q;
        }
        current_newline = before_newline;
        p = q;
        q = p - seg.num_chars();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree(s: &str) -> Tree {
        Tree::from_str(s).expect("valid UTF-8")
    }

    #[test]
    fn test_next_paragraph() {
        let t = tree("one\ntwo\n\nthree\n\nfour");
        assert_eq!(next_paragraph(&t, 0), 8);
        assert_eq!(next_paragraph(&t, 8), 15);
        // No further paragraph boundary: end of document.
        assert_eq!(next_paragraph(&t, 15), 20);
    }

    #[test]
    fn test_next_paragraph_requires_text_between() {
        let t = tree("ab\n\n\ncd");
        // From the first blank line, skip past the adjacent blank.
        assert_eq!(next_paragraph(&t, 3), 7);
    }

    #[test]
    fn test_prev_paragraph() {
        let t = tree("one\ntwo\n\nthree\n\nfour");
        assert_eq!(prev_paragraph(&t, 16), 15);
        assert_eq!(prev_paragraph(&t, 15), 8);
        assert_eq!(prev_paragraph(&t, 8), 0);
        assert_eq!(prev_paragraph(&t, 5), 0);
    }

    #[test]
    fn test_paragraph_motions_empty_document() {
        let t = tree("");
        assert_eq!(next_paragraph(&t, 0), 0);
        assert_eq!(prev_paragraph(&t, 0), 0);
    }

    #[test]
    fn test_paragraph_motions_clamp_positions() {
        let t = tree("ab\n\ncd");
        assert_eq!(next_paragraph(&t, 100), 6);
        assert_eq!(prev_paragraph(&t, 100), 3);
    }
}
