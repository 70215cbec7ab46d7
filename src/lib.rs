//! `textgrove` - text storage and navigation core for modal terminal editors
//!
//! A cache-conscious B+-tree over UTF-8 text with character-offset and
//! line-number addressing, Unicode-correct segmentation (extended grapheme
//! clusters, UAX #14 line breaking), and vim-style motion queries.

// Crate-level lint configuration
#![warn(unsafe_code)]
#![allow(clippy::cast_possible_truncation)] // Intentional arena index casts
#![allow(clippy::module_name_repetitions)] // Allow tree::TreeStats etc
#![allow(clippy::missing_errors_doc)] // Docs WIP
#![allow(clippy::missing_panics_doc)] // Docs WIP
#![allow(clippy::missing_const_for_fn)] // Many functions could be const, not critical
#![allow(clippy::doc_markdown)] // Allow technical names without backticks
#![allow(clippy::use_self)] // Allow explicit type names in impl blocks
#![allow(clippy::inherent_to_string)] // to_string methods are convenient
#![allow(clippy::should_implement_trait)] // from_str naming is intentional
#![allow(clippy::collapsible_if)] // Sometimes nested ifs are clearer
#![allow(clippy::items_after_statements)] // Common pattern in tests
#![allow(clippy::redundant_clone)] // Clones in tests for clarity are fine
#![allow(clippy::semicolon_if_nothing_returned)] // Style preference

pub mod error;
pub mod event;
pub mod locate;
pub mod segment;
pub mod syntax;
pub mod text;
pub mod unicode;

// Re-export core types at crate root
pub use error::{Error, Result};
pub use event::{LogLevel, emit_log, set_log_callback};
pub use segment::{
    GraphemeClusterIter, LineBreakDecision, LineBreaker, LineWrapConfig,
    ReverseGraphemeClusterIter, Segment, WrapMode, WrappedLineIter,
};
pub use syntax::{PlainText, SyntaxSource, Token, TokenList, TokenRole};
pub use text::{Cursor, ReverseCursor, Tree};
pub use unicode::{WidthMethod, set_width_method};
