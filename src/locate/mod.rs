//! Motion and text-object queries.
//!
//! Pure functions from a tree and a position to a new position (or a
//! `[start, end)` span), used by the editing-action layer to implement
//! vim-style commands. Nothing here mutates the tree, and nothing fails:
//! out-of-range positions clamp, and a motion with no target returns its
//! input position unchanged, which callers read as failure-to-move.
//!
//! All positions are 0-indexed character offsets; line numbers are
//! 0-indexed.

mod character;
mod delimiter;
mod line;
mod paragraph;
mod word;

pub use character::{
    closest_char_on_line, next_char_in_line, next_matching_char_in_line, prev_char,
    prev_char_in_line, prev_matching_char_in_line,
};
pub use delimiter::{
    ANGLE_PAIR, BRACE_PAIR, BRACKET_PAIR, DelimiterPair, PAREN_PAIR, delimited_block,
    matching_code_block_delimiter, next_unmatched_close_delimiter,
    prev_unmatched_open_delimiter, string_object,
};
pub use line::{
    next_line_boundary, next_non_whitespace_or_newline, prev_line_boundary, start_of_last_line,
    start_of_line_above, start_of_line_below, start_of_line_num,
};
pub use paragraph::{next_paragraph, prev_paragraph};
pub use word::{
    inner_word_object, next_word_end, next_word_start, prev_word_start, word_object,
};

use crate::segment::{GraphemeClusterIter, ReverseGraphemeClusterIter, Segment};
use crate::text::Tree;

/// Three-valued character classification driving word boundaries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum CharClass {
    Whitespace,
    Punctuation,
    Word,
}

/// ASCII punctuation, except underscore. Underscore counts as a word
/// character, so identifiers like `foo_bar` move as one word.
pub(crate) fn is_punct(r: char) -> bool {
    r.is_ascii_punctuation() && r != '_'
}

pub(crate) fn char_class(r: char) -> CharClass {
    if r.is_whitespace() {
        CharClass::Whitespace
    } else if is_punct(r) {
        CharClass::Punctuation
    } else {
        CharClass::Word
    }
}

/// Class of a cluster, keyed off its first rune.
pub(crate) fn segment_class(seg: &Segment) -> Option<CharClass> {
    seg.first_rune().map(char_class)
}

/// Clusters reading forward from a position.
pub(crate) fn clusters_forward(tree: &Tree, pos: usize) -> GraphemeClusterIter<'_> {
    GraphemeClusterIter::new(tree.cursor_at(pos))
}

/// Clusters reading backward from a position.
pub(crate) fn clusters_backward(tree: &Tree, pos: usize) -> ReverseGraphemeClusterIter<'_> {
    ReverseGraphemeClusterIter::new(tree.reverse_cursor_at(pos))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_class() {
        assert_eq!(char_class(' '), CharClass::Whitespace);
        assert_eq!(char_class('\n'), CharClass::Whitespace);
        assert_eq!(char_class('\t'), CharClass::Whitespace);
        assert_eq!(char_class('/'), CharClass::Punctuation);
        assert_eq!(char_class('_'), CharClass::Word);
        assert_eq!(char_class('a'), CharClass::Word);
        assert_eq!(char_class('é'), CharClass::Word);
        assert_eq!(char_class('漢'), CharClass::Word);
    }
}
