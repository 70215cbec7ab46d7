//! Fuzz target for single-character edits.
//!
//! Applies an arbitrary edit script and checks the tree against a naive
//! Vec<char> model: contents, character counts, and newline counts must
//! agree, and no position may panic.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use textgrove::text::Tree;

#[derive(Arbitrary, Debug)]
enum Edit {
    Insert { pos: u16, ch: char },
    Delete { pos: u16 },
}

fuzz_target!(|edits: Vec<Edit>| {
    let mut tree = Tree::new();
    let mut model: Vec<char> = Vec::new();

    for edit in edits {
        match edit {
            Edit::Insert { pos, ch } => {
                let pos = pos as usize;
                tree.insert_at(pos, ch);
                model.insert(pos.min(model.len()), ch);
            }
            Edit::Delete { pos } => {
                let pos = pos as usize;
                tree.delete_at(pos);
                if pos < model.len() {
                    model.remove(pos);
                }
            }
        }
        assert_eq!(tree.num_chars(), model.len());
    }

    let expected: String = model.iter().collect();
    assert_eq!(tree.to_string(), expected);
    assert_eq!(
        tree.num_newlines(),
        model.iter().filter(|&&c| c == '\n').count()
    );
});
