//! Fuzz target for bulk loading.
//!
//! Tests that construction from arbitrary bytes never panics: valid UTF-8
//! must round-trip exactly, invalid UTF-8 must be rejected cleanly.

#![no_main]

use libfuzzer_sys::fuzz_target;
use textgrove::text::Tree;

fuzz_target!(|data: &[u8]| {
    match Tree::from_reader(data) {
        Ok(tree) => {
            // The input was valid UTF-8; the tree must reproduce it.
            let s = std::str::from_utf8(data).expect("accepted input must be valid UTF-8");
            assert_eq!(tree.to_string(), s);
            assert_eq!(tree.num_chars(), s.chars().count());
        }
        Err(_) => {
            assert!(std::str::from_utf8(data).is_err(), "rejected valid UTF-8");
        }
    }
});
