//! Display width calculation for terminal rendering.
//!
//! The wrapped-line iterator takes the width oracle as a plain function, so
//! rendering layers can plug in their own. [`grapheme_cluster_width`] is a
//! reasonable default for terminals.

use std::sync::atomic::{AtomicU8, Ordering};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Cells per tab stop used by the default width oracle.
const TAB_WIDTH: usize = 4;

/// Width calculation method for ambiguous-width characters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WidthMethod {
    /// POSIX-like wcwidth: ambiguous width = 1.
    #[default]
    WcWidth,
    /// Unicode East Asian Width: ambiguous width = 2.
    Unicode,
}

const WIDTH_METHOD_WCWIDTH: u8 = 0;
const WIDTH_METHOD_UNICODE: u8 = 1;

static WIDTH_METHOD: AtomicU8 = AtomicU8::new(WIDTH_METHOD_WCWIDTH);

/// Set the global width method used by the `display_width` helpers.
pub fn set_width_method(method: WidthMethod) {
    let value = match method {
        WidthMethod::WcWidth => WIDTH_METHOD_WCWIDTH,
        WidthMethod::Unicode => WIDTH_METHOD_UNICODE,
    };
    WIDTH_METHOD.store(value, Ordering::Relaxed);
}

/// Get the global width method.
#[must_use]
pub fn width_method() -> WidthMethod {
    match WIDTH_METHOD.load(Ordering::Relaxed) {
        WIDTH_METHOD_UNICODE => WidthMethod::Unicode,
        _ => WidthMethod::WcWidth,
    }
}

/// Get the display width of a string in terminal columns.
#[must_use]
pub fn display_width(s: &str) -> usize {
    match width_method() {
        WidthMethod::WcWidth => UnicodeWidthStr::width(s),
        WidthMethod::Unicode => UnicodeWidthStr::width_cjk(s),
    }
}

/// Get the display width of a character in terminal columns.
///
/// Includes a fast path for ASCII printable characters (0x20-0x7E), which
/// are always width 1 and the most common case.
#[inline]
#[must_use]
pub fn display_width_char(c: char) -> usize {
    if c.is_ascii() && (' '..='~').contains(&c) {
        return 1;
    }
    if c < ' ' {
        return 0;
    }
    match width_method() {
        WidthMethod::WcWidth => UnicodeWidthChar::width(c).unwrap_or(0),
        WidthMethod::Unicode => UnicodeWidthChar::width_cjk(c).unwrap_or(0),
    }
}

/// Default cell width of a grapheme cluster at a cell offset in its line.
///
/// Tabs advance to the next tab stop; line terminators take no cells; other
/// clusters use their display width.
#[must_use]
pub fn grapheme_cluster_width(gc: &[char], cell_offset_in_line: usize) -> usize {
    match gc.first().copied() {
        None => 0,
        Some('\t') => TAB_WIDTH - (cell_offset_in_line % TAB_WIDTH),
        Some('\n' | '\r') => 0,
        Some(_) => {
            let s: String = gc.iter().collect();
            display_width(&s)
        }
    }
}
