//! Text storage and streaming reads.
//!
//! This module provides the tree-backed text store for one open document.
//! The tree addresses text by 0-indexed character offset and 0-indexed line
//! number, supports O(log n) single-character edits, and streams bytes and
//! characters in both directions through cursors that borrow the tree.
//!
//! Key types:
//!
//! - [`Tree`]: the document store; create empty, or bulk-load with
//!   [`Tree::from_reader`] / [`Tree::from_str`]
//! - [`Cursor`] / [`ReverseCursor`]: streaming reads without re-descending
//! - [`Utf8Validator`]: incremental validity check used during bulk loads
//!
//! # Examples
//!
//! ```
//! use textgrove::text::Tree;
//!
//! let mut tree = Tree::from_str("hello\nworld").unwrap();
//! tree.insert_at(5, '!');
//! assert_eq!(tree.to_string(), "hello!\nworld");
//! assert_eq!(tree.num_lines(), 2);
//! ```

mod cursor;
mod tree;
mod utf8;

pub use cursor::{Cursor, ReverseCursor, ReverseRunes, Runes};
pub use tree::Tree;
pub use utf8::Utf8Validator;
