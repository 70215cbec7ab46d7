//! Display width helpers for terminal rendering layers.

mod width;

pub use width::{
    WidthMethod, display_width, display_width_char, grapheme_cluster_width, set_width_method,
    width_method,
};
