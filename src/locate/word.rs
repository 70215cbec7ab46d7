//! Word motions and word text objects.
//!
//! A word is a run of characters in the same class (whitespace, punctuation,
//! or word characters); a class change is a word boundary, and a blank line
//! is a word of its own.

use crate::locate::{CharClass, clusters_backward, clusters_forward, segment_class};
use crate::segment::Segment;
use crate::text::Tree;

/// Position of the start of the next word after `pos`.
///
/// A blank line counts as a word. With no word ahead, returns the end of the
/// document.
#[must_use]
pub fn next_word_start(tree: &Tree, pos: usize) -> usize {
    let mut iter = clusters_forward(tree, pos);
    let mut seg = Segment::new();
    if !iter.next_segment(&mut seg) {
        return pos.min(tree.num_chars());
    }

    let mut prev_class = segment_class(&seg).unwrap_or(CharClass::Whitespace);
    let mut prev_newline = seg.has_newline();
    let mut p = pos + seg.num_chars();

    while iter.next_segment(&mut seg) {
        let class = segment_class(&seg).unwrap_or(CharClass::Whitespace);
        let newline = seg.has_newline();
        // A newline directly after a newline starts an empty line, which is
        // its own word.
        if (newline && prev_newline) || (class != CharClass::Whitespace && class != prev_class) {
            return p;
        }
        prev_class = class;
        prev_newline = newline;
        p += seg.num_chars();
    }
    p
}

/// Position of the end of the current word, or of the next word when already
/// at the end. Blank lines are skipped.
#[must_use]
pub fn next_word_end(tree: &Tree, pos: usize) -> usize {
    let mut iter = clusters_forward(tree, pos);
    let mut seg = Segment::new();
    if !iter.next_segment(&mut seg) {
        return pos.min(tree.num_chars());
    }
    let mut p = pos + seg.num_chars();

    // Step onto the next cluster, then skip whitespace (including blank
    // lines) to the word whose end we want.
    if !iter.next_segment(&mut seg) {
        return pos;
    }
    while segment_class(&seg) == Some(CharClass::Whitespace) {
        p += seg.num_chars();
        if !iter.next_segment(&mut seg) {
            return pos;
        }
    }

    let class = segment_class(&seg);
    let mut last_start = p;
    p += seg.num_chars();
    while iter.next_segment(&mut seg) {
        if segment_class(&seg) != class {
            break;
        }
        last_start = p;
        p += seg.num_chars();
    }
    last_start
}

/// Position of the start of the current word, or of the previous word when
/// already at the start. A blank line counts as a word.
#[must_use]
pub fn prev_word_start(tree: &Tree, pos: usize) -> usize {
    let mut p = pos.min(tree.num_chars());
    let mut iter = clusters_backward(tree, p);
    let mut seg = Segment::new();

    // Skip whitespace behind the position, stopping on an empty line.
    let run_class = loop {
        if !iter.next_segment(&mut seg) {
            return 0;
        }
        let class = segment_class(&seg).unwrap_or(CharClass::Whitespace);
        if class != CharClass::Whitespace {
            p -= seg.num_chars();
            break class;
        }
        let was_newline = seg.has_newline();
        p -= seg.num_chars();
        if was_newline {
            // The newline at `p` starts an empty line if another newline
            // precedes it.
            if !iter.next_segment(&mut seg) {
                return 0;
            }
            if seg.has_newline() {
                return p;
            }
            let class = segment_class(&seg).unwrap_or(CharClass::Whitespace);
            if class != CharClass::Whitespace {
                p -= seg.num_chars();
                break class;
            }
            p -= seg.num_chars();
        }
    };

    // Walk back through the run the position sits in (or follows).
    while iter.next_segment(&mut seg) {
        if segment_class(&seg) != Some(run_class) || seg.has_newline() {
            break;
        }
        p -= seg.num_chars();
    }
    p
}

/// Span of the word under `pos` plus its trailing whitespace, or, when the
/// position sits on whitespace, the whitespace run plus the following word.
/// Whitespace runs never cross a newline.
#[must_use]
pub fn word_object(tree: &Tree, pos: usize) -> (usize, usize) {
    let len = tree.num_chars();
    if len == 0 {
        return (0, 0);
    }
    let pos = pos.min(len - 1);

    let mut iter = clusters_forward(tree, pos);
    let mut seg = Segment::new();
    if !iter.next_segment(&mut seg) {
        return (pos, pos);
    }
    let class = segment_class(&seg).unwrap_or(CharClass::Whitespace);

    if class == CharClass::Whitespace {
        let start = whitespace_run_start(tree, pos);
        let mut p = pos + seg.num_chars();

        // Consume the rest of the whitespace run.
        let mut word_class = None;
        while iter.next_segment(&mut seg) {
            let c = segment_class(&seg).unwrap_or(CharClass::Whitespace);
            if c != CharClass::Whitespace {
                word_class = Some(c);
                break;
            }
            if seg.has_newline() {
                return (start, p);
            }
            p += seg.num_chars();
        }
        let Some(word_class) = word_class else {
            return (start, p);
        };

        // Absorb the following word.
        let mut end = p + seg.num_chars();
        while iter.next_segment(&mut seg) {
            if segment_class(&seg) != Some(word_class) {
                break;
            }
            end += seg.num_chars();
        }
        (start, end)
    } else {
        let start = class_run_start(tree, pos, class);
        let mut end = pos + seg.num_chars();
        loop {
            if !iter.next_segment(&mut seg) {
                return (start, end);
            }
            let c = segment_class(&seg).unwrap_or(CharClass::Whitespace);
            if c == class {
                end += seg.num_chars();
                continue;
            }
            if c == CharClass::Whitespace && !seg.has_newline() {
                // Absorb trailing whitespace up to the end of the line.
                end += seg.num_chars();
                while iter.next_segment(&mut seg) {
                    if segment_class(&seg) != Some(CharClass::Whitespace) || seg.has_newline() {
                        break;
                    }
                    end += seg.num_chars();
                }
            }
            return (start, end);
        }
    }
}

/// Span of only the classified run under `pos`. An empty line is a
/// zero-width word.
#[must_use]
pub fn inner_word_object(tree: &Tree, pos: usize) -> (usize, usize) {
    let len = tree.num_chars();
    if len == 0 {
        return (0, 0);
    }
    let pos = pos.min(len - 1);

    let mut iter = clusters_forward(tree, pos);
    let mut seg = Segment::new();
    if !iter.next_segment(&mut seg) {
        return (pos, pos);
    }

    if seg.has_newline() {
        // On an empty line the word is zero-width.
        let mut back = clusters_backward(tree, pos);
        let mut prev = Segment::new();
        if !back.next_segment(&mut prev) || prev.has_newline() {
            return (pos, pos);
        }
    }

    let class = segment_class(&seg).unwrap_or(CharClass::Whitespace);
    if class == CharClass::Whitespace {
        let start = whitespace_run_start(tree, pos);
        let mut end = pos + seg.num_chars();
        while iter.next_segment(&mut seg) {
            if segment_class(&seg) != Some(CharClass::Whitespace) || seg.has_newline() {
                break;
            }
            end += seg.num_chars();
        }
        (start, end)
    } else {
        let start = class_run_start(tree, pos, class);
        let mut end = pos + seg.num_chars();
        while iter.next_segment(&mut seg) {
            if segment_class(&seg) != Some(class) {
                break;
            }
            end += seg.num_chars();
        }
        (start, end)
    }
}

/// Start of the whitespace run containing `pos`, never crossing a newline.
fn whitespace_run_start(tree: &Tree, pos: usize) -> usize {
    let mut start = pos;
    let mut iter = clusters_backward(tree, pos);
    let mut seg = Segment::new();
    while iter.next_segment(&mut seg) {
        if segment_class(&seg) != Some(CharClass::Whitespace) || seg.has_newline() {
            break;
        }
        start -= seg.num_chars();
    }
    start
}

/// Start of the run of `class` clusters containing `pos`.
fn class_run_start(tree: &Tree, pos: usize, class: CharClass) -> usize {
    let mut start = pos;
    let mut iter = clusters_backward(tree, pos);
    let mut seg = Segment::new();
    while iter.next_segment(&mut seg) {
        if segment_class(&seg) != Some(class) {
            break;
        }
        start -= seg.num_chars();
    }
    start
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locate::is_punct;

    fn tree(s: &str) -> Tree {
        Tree::from_str(s).expect("valid UTF-8")
    }

    #[test]
    fn test_next_word_start() {
        let cases: &[(&str, &str, usize, usize)] = &[
            ("empty", "", 0, 0),
            ("next word from current word, same line", "abc   defg   hij", 1, 6),
            ("next word from whitespace, same line", "abc   defg   hij", 4, 6),
            ("next word from different line", "abc\n   123", 1, 7),
            ("next word to empty line", "abc\n\n   123", 1, 4),
            ("empty line to next word", "abc\n\n   123", 4, 8),
            ("multiple empty lines", "\n\n\n\n", 1, 2),
            ("non-punctuation to punctuation", "abc/def/ghi", 1, 3),
            ("punctuation to non-punctuation", "abc/def/ghi", 3, 4),
            ("repeated punctuation", "abc////cde", 3, 7),
            ("underscores treated as non-punctuation", "abc_def ghi", 0, 8),
            ("last word in document", "foo bar", 5, 7),
        ];
        for (name, input, pos, expected) in cases {
            assert_eq!(next_word_start(&tree(input), *pos), *expected, "{name}");
        }
    }

    #[test]
    fn test_next_word_end() {
        let cases: &[(&str, &str, usize, usize)] = &[
            ("empty", "", 0, 0),
            ("end of word from start of current word", "abc   defg   hij", 6, 9),
            ("end of word from middle of current word", "abc   defg   hij", 7, 9),
            ("next word from end of current word", "abc   defg   hij", 2, 9),
            ("next word from whitespace", "abc   defg   hij", 4, 9),
            ("next word past empty line", "abc\n\n   123   xyz", 2, 10),
            ("empty line to next word", "abc\n\n   123  xyz", 4, 10),
            ("punctuation", "abc/def/ghi", 1, 2),
            ("last word in document, third to last character", "foo bar", 4, 6),
            ("last word in document, second to last character", "foo bar", 5, 6),
            ("last word in document, last character", "foo bar", 6, 6),
        ];
        for (name, input, pos, expected) in cases {
            assert_eq!(next_word_end(&tree(input), *pos), *expected, "{name}");
        }
    }

    #[test]
    fn test_prev_word_start() {
        let cases: &[(&str, &str, usize, usize)] = &[
            ("empty", "", 0, 0),
            ("prev word from current word, same line", "abc   defg   hij", 6, 0),
            ("prev word from whitespace, same line", "abc   defg   hij", 12, 6),
            ("prev word from different line", "abc\n   123", 7, 0),
            ("prev word to empty line", "abc\n\n   123", 8, 4),
            ("empty line to prev word", "abc\n\n   123", 4, 0),
            ("multiple empty lines", "\n\n\n\n", 2, 1),
            ("punctuation", "abc/def/ghi", 5, 4),
        ];
        for (name, input, pos, expected) in cases {
            assert_eq!(prev_word_start(&tree(input), *pos), *expected, "{name}");
        }
    }

    #[test]
    fn test_word_object() {
        let cases: &[(&str, &str, usize, (usize, usize))] = &[
            ("empty", "", 0, (0, 0)),
            ("on start of leading whitespace before word", "abc   def  ghi", 3, (3, 9)),
            ("on middle of leading whitespace before word", "abc   def  ghi", 4, (3, 9)),
            ("on end of leading whitespace before word", "abc   def  ghi", 5, (3, 9)),
            ("on start of word with trailing whitespace", "abc def    ghi", 4, (4, 11)),
            ("on middle of word with trailing whitespace", "abc def    ghi", 5, (4, 11)),
            ("on end of word with trailing whitespace", "abc def    ghi", 6, (4, 11)),
            ("start of word after punctuation", "abc/def/ghi", 4, (4, 7)),
            ("middle of word after punctuation", "abc/def/ghi", 5, (4, 7)),
            ("end of word after punctuation", "abc/def/ghi", 6, (4, 7)),
            ("on punctuation surrounded by words", "abc/def/ghi", 3, (3, 4)),
            ("on punctuation surrounded by whitespace", "a   /   b", 4, (4, 8)),
            ("on multiple punctuation chars", "abc///ghi", 4, (3, 6)),
            ("on leading whitespace before punctuation", "foo  {bar", 3, (3, 6)),
            ("whitespace at start of line", "abc\n    xyz", 6, (4, 11)),
            ("empty line, indentation", "abc\n\n   123", 4, (4, 11)),
            ("empty line, no indentation", "abc\n\n123", 4, (4, 8)),
            ("start of word at end of document", "abcd", 0, (0, 4)),
            ("middle of word at end of document", "abcd", 2, (0, 4)),
            ("end of word at end of document", "abcd", 3, (0, 4)),
            ("on word before whitespace at end of document", "abc    ", 2, (0, 7)),
            ("on whitespace at end of document", "abc    ", 4, (3, 7)),
        ];
        for (name, input, pos, expected) in cases {
            assert_eq!(word_object(&tree(input), *pos), *expected, "{name}");
        }
    }

    #[test]
    fn test_inner_word_object() {
        let cases: &[(&str, &str, usize, (usize, usize))] = &[
            ("empty", "", 0, (0, 0)),
            ("on start of leading whitespace before word", "abc   def  ghi", 3, (3, 6)),
            ("on middle of leading whitespace before word", "abc   def  ghi", 4, (3, 6)),
            ("on end of leading whitespace before word", "abc   def  ghi", 5, (3, 6)),
            ("on start of word with trailing whitespace", "abc def    ghi", 4, (4, 7)),
            ("on middle of word with trailing whitespace", "abc def    ghi", 5, (4, 7)),
            ("on end of word with trailing whitespace", "abc def    ghi", 6, (4, 7)),
            ("start of word after punctuation", "abc/def/ghi", 4, (4, 7)),
            ("middle of word after punctuation", "abc/def/ghi", 5, (4, 7)),
            ("end of word after punctuation", "abc/def/ghi", 6, (4, 7)),
            ("on punctuation surrounded by words", "abc/def/ghi", 3, (3, 4)),
            ("on punctuation surrounded by whitespace", "a   /   b", 4, (4, 5)),
            ("on multiple punctuation chars", "abc///ghi", 4, (3, 6)),
            ("on leading whitespace before punctuation", "foo  {bar", 3, (3, 5)),
            ("whitespace at start of line", "abc\n    xyz", 6, (4, 8)),
            ("empty line, indentation", "abc\n\n   123", 4, (4, 4)),
            ("empty line, no indentation", "abc\n\n123", 4, (4, 4)),
            ("start of word at end of document", "abcd", 0, (0, 4)),
            ("middle of word at end of document", "abcd", 2, (0, 4)),
            ("end of word at end of document", "abcd", 3, (0, 4)),
            ("on word before whitespace at end of document", "abc    ", 2, (0, 3)),
            ("on whitespace at end of document", "abc    ", 4, (3, 7)),
        ];
        for (name, input, pos, expected) in cases {
            assert_eq!(inner_word_object(&tree(input), *pos), *expected, "{name}");
        }
    }

    #[test]
    fn test_word_motions_over_grapheme_clusters() {
        // The combining mark stays glued to its base when counting offsets.
        let t = tree("e\u{0301}xy zw");
        assert_eq!(next_word_start(&t, 0), 5);
        assert_eq!(prev_word_start(&t, 5), 0);
    }

    #[test]
    fn test_is_punct() {
        for b in 0u8..=0x7F {
            let r = char::from(b);
            let expected = matches!(
                r,
                '!' | '"' | '#' | '$' | '%' | '&' | '\'' | '(' | ')' | '*' | '+' | ',' | '-'
                    | '.' | '/' | ':' | ';' | '<' | '=' | '>' | '?' | '@' | '[' | '\\' | ']'
                    | '^' | '`' | '{' | '|' | '}' | '~'
            );
            assert_eq!(is_punct(r), expected, "{r:?}");
        }
        assert!(!is_punct('_'));
        assert!(!is_punct('0'));
        assert!(!is_punct('A'));
        assert!(!is_punct(' '));
        assert!(!is_punct('\u{007f}'));
    }
}
