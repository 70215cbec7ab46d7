//! Bracket and quote matching.
//!
//! The scans ignore delimiters inside string and comment tokens reported by
//! the syntax collaborator, unless the scan itself starts inside such a
//! token, in which case matching is confined to that token.

use crate::locate::line::next_line_boundary;
use crate::syntax::{SyntaxSource, Token, TokenRole};
use crate::text::Tree;

/// An open/close delimiter pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DelimiterPair {
    pub open: char,
    pub close: char,
}

pub const PAREN_PAIR: DelimiterPair = DelimiterPair {
    open: '(',
    close: ')',
};
pub const BRACE_PAIR: DelimiterPair = DelimiterPair {
    open: '{',
    close: '}',
};
pub const BRACKET_PAIR: DelimiterPair = DelimiterPair {
    open: '[',
    close: ']',
};
pub const ANGLE_PAIR: DelimiterPair = DelimiterPair {
    open: '<',
    close: '>',
};

const CODE_BLOCK_PAIRS: [DelimiterPair; 3] = [PAREN_PAIR, BRACE_PAIR, BRACKET_PAIR];

fn rune_at(tree: &Tree, pos: usize) -> Option<char> {
    tree.cursor_at(pos).runes().next()
}

/// Whether the delimiter at `p` participates in a scan scoped by `scope`.
fn relevant(syntax: &dyn SyntaxSource, scope: Option<Token>, p: usize) -> bool {
    match scope {
        // Inside a token, everything up to the token bounds counts.
        Some(_) => true,
        // Outside, skip delimiters buried in strings or comments.
        None => syntax.token_at(p).is_none(),
    }
}

/// Position of the delimiter matching the one under the cursor, if the
/// cursor is on `(`, `)`, `{`, `}`, `[`, or `]` and a match exists.
#[must_use]
pub fn matching_code_block_delimiter(
    tree: &Tree,
    syntax: &dyn SyntaxSource,
    pos: usize,
) -> Option<usize> {
    let r = rune_at(tree, pos)?;
    for pair in CODE_BLOCK_PAIRS {
        if r == pair.open {
            return match_forward(tree, syntax, pair, pos);
        }
        if r == pair.close {
            return match_backward(tree, syntax, pair, pos);
        }
    }
    None
}

/// Position of the close delimiter matching the open delimiter at `pos`.
fn match_forward(
    tree: &Tree,
    syntax: &dyn SyntaxSource,
    pair: DelimiterPair,
    pos: usize,
) -> Option<usize> {
    let scope = syntax.token_at(pos);
    let mut depth = 1usize;
    let mut p = pos + 1;
    for r in tree.cursor_at(p).runes() {
        if let Some(token) = scope {
            if p >= token.end {
                return None;
            }
        }
        if relevant(syntax, scope, p) {
            if r == pair.open {
                depth += 1;
            } else if r == pair.close {
                depth -= 1;
                if depth == 0 {
                    return Some(p);
                }
            }
        }
        p += 1;
    }
    None
}

/// Position of the open delimiter matching the close delimiter at `pos`.
fn match_backward(
    tree: &Tree,
    syntax: &dyn SyntaxSource,
    pair: DelimiterPair,
    pos: usize,
) -> Option<usize> {
    let scope = syntax.token_at(pos);
    let mut depth = 1usize;
    let mut p = pos;
    for r in tree.reverse_cursor_at(pos).runes() {
        p -= 1;
        if let Some(token) = scope {
            if p < token.start {
                return None;
            }
        }
        if relevant(syntax, scope, p) {
            if r == pair.close {
                depth += 1;
            } else if r == pair.open {
                depth -= 1;
                if depth == 0 {
                    return Some(p);
                }
            }
        }
    }
    None
}

/// Position of the closest unmatched open delimiter before the cursor.
#[must_use]
pub fn prev_unmatched_open_delimiter(
    pair: DelimiterPair,
    tree: &Tree,
    syntax: &dyn SyntaxSource,
    pos: usize,
) -> Option<usize> {
    let start = pos.min(tree.num_chars());
    let scope = syntax.token_at(start);
    let mut depth = 0usize;
    let mut p = start;
    for r in tree.reverse_cursor_at(start).runes() {
        p -= 1;
        if let Some(token) = scope {
            if p < token.start {
                return None;
            }
        }
        if relevant(syntax, scope, p) {
            if r == pair.close {
                depth += 1;
            } else if r == pair.open {
                if depth == 0 {
                    return Some(p);
                }
                depth -= 1;
            }
        }
    }
    None
}

/// Position of the closest unmatched close delimiter after the cursor.
#[must_use]
pub fn next_unmatched_close_delimiter(
    pair: DelimiterPair,
    tree: &Tree,
    syntax: &dyn SyntaxSource,
    pos: usize,
) -> Option<usize> {
    let start = pos.min(tree.num_chars());
    let scope = syntax.token_at(start);
    let mut depth = 0usize;
    let mut p = start + 1;
    let mut runes = tree.cursor_at(start).runes();
    if runes.next().is_none() {
        return None;
    }
    for r in runes {
        if let Some(token) = scope {
            if p >= token.end {
                return None;
            }
        }
        if relevant(syntax, scope, p) {
            if r == pair.open {
                depth += 1;
            } else if r == pair.close {
                if depth == 0 {
                    return Some(p);
                }
                depth -= 1;
            }
        }
        p += 1;
    }
    None
}

/// Span of the delimited block around the cursor: `[open, close]` positions
/// when `include_delimiters`, otherwise the range strictly between them.
/// Returns the unchanged position pair when there is no enclosing block.
#[must_use]
pub fn delimited_block(
    pair: DelimiterPair,
    tree: &Tree,
    syntax: &dyn SyntaxSource,
    include_delimiters: bool,
    pos: usize,
) -> (usize, usize) {
    let open_pos = if rune_at(tree, pos) == Some(pair.open) {
        Some(pos)
    } else {
        prev_unmatched_open_delimiter(pair, tree, syntax, pos)
    };
    let Some(open_pos) = open_pos else {
        return (pos, pos);
    };
    let Some(close_pos) = match_forward(tree, syntax, pair, open_pos) else {
        return (pos, pos);
    };
    if include_delimiters {
        (open_pos, close_pos + 1)
    } else {
        (open_pos + 1, close_pos)
    }
}

/// Span of the string token around (or after, on the same line as) the
/// cursor whose delimiter is `quote`. Returns the unchanged position pair
/// when the syntax source reports no such token.
#[must_use]
pub fn string_object(
    quote: char,
    tree: &Tree,
    syntax: &dyn SyntaxSource,
    include_quotes: bool,
    pos: usize,
) -> (usize, usize) {
    let span = |token: Token| {
        if include_quotes {
            (token.start, token.end)
        } else {
            (token.start + 1, token.end - 1)
        }
    };

    if let Some(token) = syntax.token_at(pos) {
        if token.role == TokenRole::String && rune_at(tree, token.start) == Some(quote) {
            return span(token);
        }
    }

    // Look for a string starting later on the same line.
    let line_end = next_line_boundary(tree, true, pos);
    let mut p = pos;
    while p < line_end {
        match syntax.token_at(p) {
            Some(token) => {
                if token.role == TokenRole::String
                    && token.start >= pos
                    && rune_at(tree, token.start) == Some(quote)
                {
                    return span(token);
                }
                p = token.end;
            }
            None => p += 1,
        }
    }
    (pos, pos)
}
