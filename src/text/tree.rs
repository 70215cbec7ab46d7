//! Cache-conscious B+-tree over UTF-8 text.
//!
//! The design follows two papers: Boehm, Atkinson & Plass (1995), "Ropes: an
//! alternative to strings", and Rao & Ross (2000), "Making B+-trees cache
//! conscious in main memory". Like a rope, the tree keeps character counts at
//! each level to locate a character at a given offset. Like a CSB+-tree, all
//! children of a node live in one fixed-capacity group and the parent
//! addresses them by index within the group, so a descent touches contiguous
//! memory. A leaf node holds 63 bytes plus its length, one 64-byte cache
//! line. Groups live in arenas owned by the tree and are referenced by index;
//! leaf groups form a doubly linked list so cursors can stream in either
//! direction without re-descending.

use std::io;

use crate::error::{Error, Result};
use crate::event::{LogLevel, emit_log};
use crate::text::cursor::{Cursor, ReverseCursor};
use crate::text::utf8::{CHAR_WIDTH, Utf8Validator, is_start_byte};

const MAX_KEYS_PER_NODE: usize = 64;
const MAX_NODES_PER_GROUP: usize = MAX_KEYS_PER_NODE;
const MAX_BYTES_PER_LEAF: usize = 63;

/// Nodes kept in each half when a full group splits.
const GROUP_SPLIT: usize = MAX_NODES_PER_GROUP / 2;

/// Index of a leaf node group in the tree's leaf arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct LeafGroupId(u32);

impl LeafGroupId {
    fn idx(self) -> usize {
        self.0 as usize
    }
}

/// Index of an inner node group in the tree's inner arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct InnerGroupId(u32);

impl InnerGroupId {
    fn idx(self) -> usize {
        self.0 as usize
    }
}

/// Reference from an inner node to the group holding its children.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ChildRef {
    Inner(InnerGroupId),
    Leaf(LeafGroupId),
}

/// Per-child summary used to navigate from an inner node to the child
/// containing a character offset or line number.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Key {
    /// Number of UTF-8 characters in the subtree.
    chars: usize,
    /// Number of newline characters in the subtree.
    newlines: usize,
}

impl Key {
    const ZERO: Key = Key {
        chars: 0,
        newlines: 0,
    };
}

/// Leaf node storing UTF-8 text as a byte array.
///
/// Multi-byte UTF-8 characters are never split between leaf nodes.
#[derive(Clone, Copy, Debug)]
pub(crate) struct LeafNode {
    num_bytes: u8,
    text_bytes: [u8; MAX_BYTES_PER_LEAF],
}

impl LeafNode {
    const EMPTY: LeafNode = LeafNode {
        num_bytes: 0,
        text_bytes: [0; MAX_BYTES_PER_LEAF],
    };

    pub(crate) fn len(&self) -> usize {
        self.num_bytes as usize
    }

    pub(crate) fn bytes(&self) -> &[u8] {
        &self.text_bytes[..self.len()]
    }

    fn key(&self) -> Key {
        let mut key = Key::ZERO;
        for &b in self.bytes() {
            key.chars += usize::from(is_start_byte(b));
            if b == b'\n' {
                key.newlines += 1;
            }
        }
        key
    }

    /// Byte offset of the character at `char_pos`, or the node length if the
    /// position is past the node's content.
    fn byte_offset_for_position(&self, char_pos: usize) -> usize {
        let mut n = 0;
        for (i, &b) in self.bytes().iter().enumerate() {
            if is_start_byte(b) {
                if n == char_pos {
                    return i;
                }
                n += 1;
            }
        }
        self.len()
    }

    /// Byte offset just after the `newline_pos`-th newline in this node, or
    /// the node length if there are not that many newlines.
    fn byte_offset_after_newline(&self, newline_pos: usize) -> usize {
        let mut n = 0;
        for (i, &b) in self.bytes().iter().enumerate() {
            if b == b'\n' {
                if n == newline_pos {
                    return i + 1;
                }
                n += 1;
            }
        }
        self.len()
    }

    /// Character offset just after the `newline_pos`-th newline in this node.
    fn chars_through_newline(&self, newline_pos: usize) -> usize {
        let mut chars = 0;
        let mut newlines = 0;
        for &b in self.bytes() {
            chars += usize::from(is_start_byte(b));
            if b == b'\n' {
                if newlines == newline_pos {
                    return chars;
                }
                newlines += 1;
            }
        }
        chars
    }

    fn delete_at(&mut self, char_pos: usize) -> (bool, bool) {
        let offset = self.byte_offset_for_position(char_pos);
        let len = self.len();
        if offset >= len {
            return (false, false);
        }
        let start_byte = self.text_bytes[offset];
        let width = CHAR_WIDTH[start_byte as usize] as usize;
        self.text_bytes.copy_within(offset + width..len, offset);
        self.num_bytes -= width as u8;
        (true, start_byte == b'\n')
    }

    fn insert_bytes_at(&mut self, offset: usize, bytes: &[u8]) {
        let len = self.len();
        self.text_bytes.copy_within(offset..len, offset + bytes.len());
        self.text_bytes[offset..offset + bytes.len()].copy_from_slice(bytes);
        self.num_bytes += bytes.len() as u8;
    }

    /// Move the bytes from `offset` onward into a new node.
    fn split_off(&mut self, offset: usize) -> LeafNode {
        let len = self.len();
        let mut right = LeafNode::EMPTY;
        right.text_bytes[..len - offset].copy_from_slice(&self.text_bytes[offset..len]);
        right.num_bytes = (len - offset) as u8;
        self.num_bytes = offset as u8;
        right
    }

    fn push_byte(&mut self, b: u8) {
        self.text_bytes[self.len()] = b;
        self.num_bytes += 1;
    }
}

/// Group of leaf nodes referenced by an inner node.
///
/// Groups form a doubly linked list so a cursor can scan the text in either
/// direction without re-descending the tree.
#[derive(Clone, Debug)]
pub(crate) struct LeafGroup {
    pub(crate) prev: Option<LeafGroupId>,
    pub(crate) next: Option<LeafGroupId>,
    pub(crate) num_nodes: usize,
    pub(crate) nodes: [LeafNode; MAX_NODES_PER_GROUP],
}

impl LeafGroup {
    fn empty() -> LeafGroup {
        LeafGroup {
            prev: None,
            next: None,
            num_nodes: 0,
            nodes: [LeafNode::EMPTY; MAX_NODES_PER_GROUP],
        }
    }

    fn insert_node(&mut self, idx: usize, node: LeafNode) {
        self.nodes.copy_within(idx..self.num_nodes, idx + 1);
        self.nodes[idx] = node;
        self.num_nodes += 1;
    }
}

/// Inner node navigating to the child containing an offset or line number.
#[derive(Clone, Copy, Debug)]
struct InnerNode {
    child: ChildRef,
    num_keys: usize,
    keys: [Key; MAX_KEYS_PER_NODE],
}

impl InnerNode {
    fn placeholder() -> InnerNode {
        InnerNode {
            child: ChildRef::Leaf(LeafGroupId(u32::MAX)),
            num_keys: 0,
            keys: [Key::ZERO; MAX_KEYS_PER_NODE],
        }
    }

    fn key(&self) -> Key {
        let mut node_key = Key::ZERO;
        for key in &self.keys[..self.num_keys] {
            node_key.chars += key.chars;
            node_key.newlines += key.newlines;
        }
        node_key
    }

    /// Child index and adjusted offset for a character position. Positions
    /// past the subtree clamp into the last child.
    fn locate_position(&self, char_pos: usize) -> (usize, usize) {
        let mut c = 0;
        for (i, key) in self.keys[..self.num_keys].iter().enumerate() {
            if char_pos < c + key.chars {
                return (i, char_pos - c);
            }
            c += key.chars;
        }
        (self.num_keys - 1, c)
    }

    /// Child index and adjusted newline count for a newline position, plus
    /// the number of characters in the skipped children.
    fn locate_newline(&self, newline_pos: usize) -> (usize, usize, usize) {
        let mut c = 0;
        let mut chars = 0;
        for (i, key) in self.keys[..self.num_keys - 1].iter().enumerate() {
            if newline_pos < c + key.newlines {
                return (i, newline_pos - c, chars);
            }
            c += key.newlines;
            chars += key.chars;
        }
        (self.num_keys - 1, newline_pos - c, chars)
    }
}

/// Group of inner nodes referenced by a parent inner node.
#[derive(Clone, Debug)]
struct InnerGroup {
    num_nodes: usize,
    nodes: [InnerNode; MAX_NODES_PER_GROUP],
}

impl InnerGroup {
    fn empty() -> InnerGroup {
        InnerGroup {
            num_nodes: 0,
            nodes: [InnerNode::placeholder(); MAX_NODES_PER_GROUP],
        }
    }

    fn insert_node(&mut self, idx: usize, node: InnerNode) {
        self.nodes.copy_within(idx..self.num_nodes, idx + 1);
        self.nodes[idx] = node;
        self.num_nodes += 1;
    }
}

/// Location of an inner node: the root, or a slot in an inner group.
#[derive(Clone, Copy)]
enum NodeLoc {
    Root,
    Inner(InnerGroupId, usize),
}

/// Tree representing UTF-8 text, addressable by character offset (0-indexed)
/// and line number (0-indexed, lines split on `\n`).
///
/// Out-of-range positions are clamped rather than rejected, so edits and
/// cursor lookups never fail. Deleting never rebalances leaves: freed space
/// stays where it is, on the assumption that the next edit is usually an
/// insert near the same spot.
#[derive(Clone, Debug)]
pub struct Tree {
    root: InnerNode,
    inners: Vec<InnerGroup>,
    leaves: Vec<LeafGroup>,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    /// Create a tree representing an empty string.
    #[must_use]
    pub fn new() -> Self {
        let mut leaves = vec![LeafGroup::empty()];
        leaves[0].num_nodes = 1;
        let mut tree = Tree {
            root: InnerNode::placeholder(),
            inners: Vec::new(),
            leaves,
        };
        tree.root = tree.node_over(ChildRef::Leaf(LeafGroupId(0)));
        tree
    }

    /// Create a tree from a reader producing UTF-8 bytes.
    ///
    /// This is much cheaper than inserting characters one at a time: bytes
    /// are packed directly into leaves and the inner levels are built
    /// bottom-up. Fails without producing a tree if the input is not valid
    /// UTF-8 (including a truncated trailing sequence).
    pub fn from_reader<R: io::Read>(mut r: R) -> Result<Self> {
        let mut validator = Utf8Validator::new();
        let mut leaves = vec![LeafGroup::empty()];
        leaves[0].num_nodes = 1;
        let mut cur_group = 0usize;
        let mut cur_node = 0usize;

        let mut buf = [0u8; 1024];
        loop {
            let n = r.read(&mut buf)?;
            if n == 0 {
                break;
            }
            if !validator.validate_bytes(&buf[..n]) {
                return Err(Error::InvalidUtf8 {
                    offset: validator.offset(),
                });
            }

            for &b in &buf[..n] {
                // Zero for continuation bytes, so a multi-byte character
                // never lands across a leaf boundary.
                let char_width = CHAR_WIDTH[b as usize] as usize;
                if leaves[cur_group].nodes[cur_node].len() + char_width >= MAX_BYTES_PER_LEAF {
                    if leaves[cur_group].num_nodes < MAX_NODES_PER_GROUP {
                        cur_node = leaves[cur_group].num_nodes;
                        leaves[cur_group].num_nodes += 1;
                    } else {
                        let mut new_group = LeafGroup::empty();
                        new_group.num_nodes = 1;
                        new_group.prev = Some(LeafGroupId(cur_group as u32));
                        leaves.push(new_group);
                        let new_id = leaves.len() - 1;
                        leaves[cur_group].next = Some(LeafGroupId(new_id as u32));
                        cur_group = new_id;
                        cur_node = 0;
                    }
                }
                leaves[cur_group].nodes[cur_node].push_byte(b);
            }
        }

        if !validator.validate_end() {
            return Err(Error::InvalidUtf8 {
                offset: validator.offset(),
            });
        }

        let tree = Self::build_from_leaves(leaves);
        emit_log(
            LogLevel::Debug,
            &format!(
                "bulk load: {} chars, {} lines, {} leaf groups",
                tree.num_chars(),
                tree.num_lines(),
                tree.leaves.len()
            ),
        );
        Ok(tree)
    }

    /// Create a tree from a UTF-8 string.
    pub fn from_str(s: &str) -> Result<Self> {
        Self::from_reader(s.as_bytes())
    }

    /// Build inner levels over packed leaf groups, layer by layer, until a
    /// single group remains under the root.
    fn build_from_leaves(leaves: Vec<LeafGroup>) -> Self {
        let mut tree = Tree {
            root: InnerNode::placeholder(),
            inners: Vec::new(),
            leaves,
        };

        let mut child_refs: Vec<ChildRef> = (0..tree.leaves.len())
            .map(|i| ChildRef::Leaf(LeafGroupId(i as u32)))
            .collect();

        loop {
            let mut current = tree.alloc_inner_group();
            let mut parent_ids = vec![current];
            for &child in &child_refs {
                if tree.inners[current.idx()].num_nodes == MAX_NODES_PER_GROUP {
                    current = tree.alloc_inner_group();
                    parent_ids.push(current);
                }
                let node = tree.node_over(child);
                let group = &mut tree.inners[current.idx()];
                let n = group.num_nodes;
                group.nodes[n] = node;
                group.num_nodes += 1;
            }

            if parent_ids.len() == 1 {
                tree.root = tree.node_over(ChildRef::Inner(parent_ids[0]));
                return tree;
            }

            child_refs = parent_ids.into_iter().map(ChildRef::Inner).collect();
        }
    }

    /// Number of UTF-8 characters in the tree.
    #[must_use]
    pub fn num_chars(&self) -> usize {
        self.root.key().chars
    }

    /// Number of newline characters in the tree.
    #[must_use]
    pub fn num_newlines(&self) -> usize {
        self.root.key().newlines
    }

    /// Number of lines. A document always has at least one line; the last
    /// line has no trailing terminator.
    #[must_use]
    pub fn num_lines(&self) -> usize {
        self.num_newlines() + 1
    }

    /// Check if the tree holds no text.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.num_chars() == 0
    }

    /// Character position of the start of a line. Line 0 starts at offset 0;
    /// line k>0 starts immediately after the k-th newline. Clamps past the
    /// last line to the end of the document.
    #[must_use]
    pub fn line_start_position(&self, line_num: usize) -> usize {
        if line_num == 0 {
            return 0;
        }
        self.position_after_newline(line_num - 1)
    }

    fn position_after_newline(&self, newline_pos: usize) -> usize {
        let mut node = &self.root;
        let mut base = 0;
        let mut n = newline_pos;
        loop {
            let (idx, adjusted, skipped_chars) = node.locate_newline(n);
            base += skipped_chars;
            n = adjusted;
            match node.child {
                ChildRef::Inner(gid) => node = &self.inners[gid.idx()].nodes[idx],
                ChildRef::Leaf(gid) => {
                    return base + self.leaves[gid.idx()].nodes[idx].chars_through_newline(n);
                }
            }
        }
    }

    /// Cursor reading forward from the character at `char_pos`. Past the end
    /// of the text, the cursor reads zero bytes.
    #[must_use]
    pub fn cursor_at(&self, char_pos: usize) -> Cursor<'_> {
        let (gid, node_idx, byte_off) = self.locate_leaf(char_pos);
        Cursor::new(self, gid, node_idx, byte_off)
    }

    /// Cursor reading forward from the first character of a line. For line
    /// zero this is the first character in the tree; for subsequent lines,
    /// the first character after the newline. Past the last line, the cursor
    /// reads zero bytes.
    #[must_use]
    pub fn cursor_at_line(&self, line_num: usize) -> Cursor<'_> {
        if line_num == 0 {
            // The only line that doesn't follow a newline character.
            return self.cursor_at(0);
        }
        let (gid, node_idx, byte_off) = self.locate_leaf_after_newline(line_num - 1);
        Cursor::new(self, gid, node_idx, byte_off)
    }

    /// Cursor reading backward from just before the character at `char_pos`.
    #[must_use]
    pub fn reverse_cursor_at(&self, char_pos: usize) -> ReverseCursor<'_> {
        let (gid, node_idx, byte_off) = self.locate_leaf(char_pos);
        ReverseCursor::new(self, gid, node_idx, byte_off)
    }

    fn locate_leaf(&self, char_pos: usize) -> (LeafGroupId, usize, usize) {
        let mut node = &self.root;
        let mut pos = char_pos;
        loop {
            let (idx, adjusted) = node.locate_position(pos);
            match node.child {
                ChildRef::Inner(gid) => {
                    node = &self.inners[gid.idx()].nodes[idx];
                    pos = adjusted;
                }
                ChildRef::Leaf(gid) => {
                    let off = self.leaves[gid.idx()].nodes[idx].byte_offset_for_position(adjusted);
                    return (gid, idx, off);
                }
            }
        }
    }

    fn locate_leaf_after_newline(&self, newline_pos: usize) -> (LeafGroupId, usize, usize) {
        let mut node = &self.root;
        let mut n = newline_pos;
        loop {
            let (idx, adjusted, _) = node.locate_newline(n);
            match node.child {
                ChildRef::Inner(gid) => {
                    node = &self.inners[gid.idx()].nodes[idx];
                    n = adjusted;
                }
                ChildRef::Leaf(gid) => {
                    let off = self.leaves[gid.idx()].nodes[idx].byte_offset_after_newline(adjusted);
                    return (gid, idx, off);
                }
            }
        }
    }

    /// Remove the character at `char_pos`. Positions past the end of the
    /// text are a no-op. Key decrements propagate along the descent path;
    /// leaves are never rebalanced or compacted.
    pub fn delete_at(&mut self, char_pos: usize) {
        self.delete_node(NodeLoc::Root, char_pos);
    }

    fn delete_node(&mut self, loc: NodeLoc, char_pos: usize) -> (bool, bool) {
        let (child, node_idx, adjusted) = {
            let node = self.node(loc);
            let (i, p) = node.locate_position(char_pos);
            (node.child, i, p)
        };
        let (did_delete, was_newline) = match child {
            ChildRef::Leaf(gid) => self.leaves[gid.idx()].nodes[node_idx].delete_at(adjusted),
            ChildRef::Inner(gid) => self.delete_node(NodeLoc::Inner(gid, node_idx), adjusted),
        };
        if did_delete {
            let node = self.node_mut(loc);
            node.keys[node_idx].chars -= 1;
            if was_newline {
                node.keys[node_idx].newlines -= 1;
            }
        }
        (did_delete, was_newline)
    }

    /// Insert a character at `char_pos`, shifting later characters right.
    /// Positions past the end of the text append. A full leaf splits at the
    /// insertion offset, a full group splits in half, and a root split grows
    /// the tree by one level; a character never straddles two leaves.
    pub fn insert_at(&mut self, char_pos: usize, ch: char) {
        let mut buf = [0u8; 4];
        let n = ch.encode_utf8(&mut buf).len();
        if let Some(sibling) = self.insert_node(NodeLoc::Root, char_pos, &buf[..n]) {
            self.grow_root(sibling);
        }
    }

    fn insert_node(&mut self, loc: NodeLoc, char_pos: usize, bytes: &[u8]) -> Option<InnerNode> {
        let (child, node_idx, adjusted) = {
            let node = self.node(loc);
            let (i, p) = node.locate_position(char_pos);
            (node.child, i, p)
        };
        let split = match child {
            ChildRef::Leaf(gid) => self
                .leaf_group_insert(gid, node_idx, adjusted, bytes)
                .map(|new_gid| self.node_over(ChildRef::Leaf(new_gid))),
            ChildRef::Inner(gid) => self
                .insert_node(NodeLoc::Inner(gid, node_idx), adjusted, bytes)
                .and_then(|sibling| self.inner_group_insert(gid, node_idx + 1, sibling))
                .map(|new_gid| self.node_over(ChildRef::Inner(new_gid))),
        };
        self.recalculate_keys(loc);
        split
    }

    /// Insert encoded bytes into a leaf group. Returns the id of a split-off
    /// group when the group overflowed.
    fn leaf_group_insert(
        &mut self,
        gid: LeafGroupId,
        node_idx: usize,
        char_pos: usize,
        bytes: &[u8],
    ) -> Option<LeafGroupId> {
        let leaf = &mut self.leaves[gid.idx()].nodes[node_idx];
        let offset = leaf.byte_offset_for_position(char_pos);
        if leaf.len() + bytes.len() <= MAX_BYTES_PER_LEAF {
            leaf.insert_bytes_at(offset, bytes);
            return None;
        }

        // Split at the insertion offset so the character lands whole in
        // whichever side has room.
        let mut right = leaf.split_off(offset);
        if leaf.len() + bytes.len() <= MAX_BYTES_PER_LEAF {
            let end = leaf.len();
            leaf.insert_bytes_at(end, bytes);
        } else {
            right.insert_bytes_at(0, bytes);
        }

        if self.leaves[gid.idx()].num_nodes < MAX_NODES_PER_GROUP {
            self.leaves[gid.idx()].insert_node(node_idx + 1, right);
            return None;
        }

        let new_gid = self.split_leaf_group(gid);
        if node_idx + 1 <= GROUP_SPLIT {
            self.leaves[gid.idx()].insert_node(node_idx + 1, right);
        } else {
            self.leaves[new_gid.idx()].insert_node(node_idx + 1 - GROUP_SPLIT, right);
        }
        Some(new_gid)
    }

    /// Move the upper half of a full leaf group into a new group, splicing
    /// it into the linked list after the original.
    fn split_leaf_group(&mut self, gid: LeafGroupId) -> LeafGroupId {
        let new_gid = self.alloc_leaf_group();
        let (tail, old_next) = {
            let g = &mut self.leaves[gid.idx()];
            let tail: Vec<LeafNode> = g.nodes[GROUP_SPLIT..].to_vec();
            g.num_nodes = GROUP_SPLIT;
            (tail, g.next)
        };
        {
            let ng = &mut self.leaves[new_gid.idx()];
            ng.nodes[..tail.len()].copy_from_slice(&tail);
            ng.num_nodes = tail.len();
            ng.prev = Some(gid);
            ng.next = old_next;
        }
        if let Some(next_gid) = old_next {
            self.leaves[next_gid.idx()].prev = Some(new_gid);
        }
        self.leaves[gid.idx()].next = Some(new_gid);
        new_gid
    }

    /// Insert an inner node into a group. Returns the id of a split-off
    /// group when the group overflowed.
    fn inner_group_insert(
        &mut self,
        gid: InnerGroupId,
        idx: usize,
        node: InnerNode,
    ) -> Option<InnerGroupId> {
        if self.inners[gid.idx()].num_nodes < MAX_NODES_PER_GROUP {
            self.inners[gid.idx()].insert_node(idx, node);
            return None;
        }
        let new_gid = self.split_inner_group(gid);
        if idx <= GROUP_SPLIT {
            self.inners[gid.idx()].insert_node(idx, node);
        } else {
            self.inners[new_gid.idx()].insert_node(idx - GROUP_SPLIT, node);
        }
        Some(new_gid)
    }

    fn split_inner_group(&mut self, gid: InnerGroupId) -> InnerGroupId {
        let new_gid = self.alloc_inner_group();
        let tail: Vec<InnerNode> = {
            let g = &mut self.inners[gid.idx()];
            let tail = g.nodes[GROUP_SPLIT..].to_vec();
            g.num_nodes = GROUP_SPLIT;
            tail
        };
        let ng = &mut self.inners[new_gid.idx()];
        ng.nodes[..tail.len()].copy_from_slice(&tail);
        ng.num_nodes = tail.len();
        new_gid
    }

    /// Move the root into a fresh group alongside its split-off sibling and
    /// point a new root at both, growing the tree by one level.
    fn grow_root(&mut self, sibling: InnerNode) {
        let old_root = std::mem::replace(&mut self.root, InnerNode::placeholder());
        let gid = self.alloc_inner_group();
        {
            let g = &mut self.inners[gid.idx()];
            g.nodes[0] = old_root;
            g.nodes[1] = sibling;
            g.num_nodes = 2;
        }
        self.root = self.node_over(ChildRef::Inner(gid));
    }

    /// Build an inner node whose keys summarize the given child group.
    fn node_over(&self, child: ChildRef) -> InnerNode {
        let mut node = InnerNode {
            child,
            num_keys: 0,
            keys: [Key::ZERO; MAX_KEYS_PER_NODE],
        };
        match child {
            ChildRef::Leaf(gid) => {
                let g = &self.leaves[gid.idx()];
                for i in 0..g.num_nodes {
                    node.keys[i] = g.nodes[i].key();
                }
                node.num_keys = g.num_nodes;
            }
            ChildRef::Inner(gid) => {
                let g = &self.inners[gid.idx()];
                for i in 0..g.num_nodes {
                    node.keys[i] = g.nodes[i].key();
                }
                node.num_keys = g.num_nodes;
            }
        }
        node
    }

    fn recalculate_keys(&mut self, loc: NodeLoc) {
        let child = self.node(loc).child;
        let fresh = self.node_over(child);
        *self.node_mut(loc) = fresh;
    }

    fn node(&self, loc: NodeLoc) -> &InnerNode {
        match loc {
            NodeLoc::Root => &self.root,
            NodeLoc::Inner(gid, idx) => &self.inners[gid.idx()].nodes[idx],
        }
    }

    fn node_mut(&mut self, loc: NodeLoc) -> &mut InnerNode {
        match loc {
            NodeLoc::Root => &mut self.root,
            NodeLoc::Inner(gid, idx) => &mut self.inners[gid.idx()].nodes[idx],
        }
    }

    fn alloc_leaf_group(&mut self) -> LeafGroupId {
        self.leaves.push(LeafGroup::empty());
        LeafGroupId((self.leaves.len() - 1) as u32)
    }

    fn alloc_inner_group(&mut self) -> InnerGroupId {
        self.inners.push(InnerGroup::empty());
        InnerGroupId((self.inners.len() - 1) as u32)
    }

    pub(crate) fn leaf_group(&self, gid: LeafGroupId) -> &LeafGroup {
        &self.leaves[gid.idx()]
    }

    /// Read the full text into a string.
    #[must_use]
    pub fn to_string(&self) -> String {
        let mut bytes = Vec::new();
        let mut cursor = self.cursor_at(0);
        let _ = io::Read::read_to_end(&mut cursor, &mut bytes);
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn read_all(tree: &Tree, char_pos: usize) -> String {
        let mut bytes = Vec::new();
        tree.cursor_at(char_pos)
            .read_to_end(&mut bytes)
            .expect("cursor read");
        String::from_utf8(bytes).expect("tree holds valid UTF-8")
    }

    fn read_line(tree: &Tree, line_num: usize) -> String {
        let mut bytes = Vec::new();
        tree.cursor_at_line(line_num)
            .read_to_end(&mut bytes)
            .expect("cursor read");
        String::from_utf8(bytes).expect("tree holds valid UTF-8")
    }

    #[test]
    fn test_empty_tree() {
        let tree = Tree::new();
        assert_eq!(tree.num_chars(), 0);
        assert_eq!(tree.num_lines(), 1);
        assert!(tree.is_empty());
        assert_eq!(read_all(&tree, 0), "");
    }

    #[test]
    fn test_from_str_round_trip() {
        for s in ["", "a", "hello world", "héllo", "漢字テスト", "a😀b", "x\ny\nz"] {
            let tree = Tree::from_str(s).expect("valid UTF-8");
            assert_eq!(read_all(&tree, 0), s);
            assert_eq!(tree.to_string(), s);
            assert_eq!(tree.num_chars(), s.chars().count());
        }
    }

    #[test]
    fn test_from_str_large_round_trip() {
        // Large enough to span several leaf groups and force inner levels.
        let s = "0123456789 ぁabçdé\n".repeat(2_000);
        let tree = Tree::from_str(&s).expect("valid UTF-8");
        assert_eq!(read_all(&tree, 0), s);
        assert_eq!(tree.num_chars(), s.chars().count());
        assert_eq!(tree.num_newlines(), 2_000);
    }

    #[test]
    fn test_from_reader_invalid_utf8() {
        let bytes: &[u8] = &[b'a', b'b', 0xFF, b'c'];
        let err = Tree::from_reader(bytes).expect_err("invalid byte");
        assert!(matches!(err, Error::InvalidUtf8 { offset: 2 }));
    }

    #[test]
    fn test_from_reader_truncated_sequence() {
        let bytes: &[u8] = &[b'a', 0xE4, 0xB8];
        let err = Tree::from_reader(bytes).expect_err("truncated sequence");
        assert!(matches!(err, Error::InvalidUtf8 { .. }));
    }

    #[test]
    fn test_cursor_at_positions() {
        let s = "abcd\nefgh\nij";
        let tree = Tree::from_str(s).expect("valid UTF-8");
        for (pos, _) in s.char_indices() {
            assert_eq!(read_all(&tree, pos), &s[pos..]);
        }
        assert_eq!(read_all(&tree, s.len()), "");
        assert_eq!(read_all(&tree, s.len() + 100), "");
    }

    #[test]
    fn test_cursor_at_multibyte_positions() {
        let s = "漢字😀é";
        let tree = Tree::from_str(s).expect("valid UTF-8");
        let chars: Vec<char> = s.chars().collect();
        for pos in 0..=chars.len() {
            let expected: String = chars[pos..].iter().collect();
            assert_eq!(read_all(&tree, pos), expected);
        }
    }

    #[test]
    fn test_cursor_at_line() {
        let tree = Tree::from_str("line0\nline1\nline2").expect("valid UTF-8");
        assert_eq!(read_line(&tree, 0), "line0\nline1\nline2");
        assert_eq!(read_line(&tree, 1), "line1\nline2");
        assert_eq!(read_line(&tree, 2), "line2");
        assert_eq!(read_line(&tree, 3), "");
        assert_eq!(read_line(&tree, 100), "");
    }

    #[test]
    fn test_cursor_at_line_trailing_newline() {
        let tree = Tree::from_str("abc\n").expect("valid UTF-8");
        assert_eq!(tree.num_lines(), 2);
        assert_eq!(read_line(&tree, 1), "");
    }

    #[test]
    fn test_line_start_position() {
        let tree = Tree::from_str("ab\ncdé\n\nf").expect("valid UTF-8");
        assert_eq!(tree.line_start_position(0), 0);
        assert_eq!(tree.line_start_position(1), 3);
        assert_eq!(tree.line_start_position(2), 7);
        assert_eq!(tree.line_start_position(3), 8);
        // Past the last line clamps to the end.
        assert_eq!(tree.line_start_position(10), 9);
    }

    #[test]
    fn test_delete_at() {
        let tree_text = "abcdef";
        let mut tree = Tree::from_str(tree_text).expect("valid UTF-8");
        tree.delete_at(2);
        assert_eq!(tree.to_string(), "abdef");
        tree.delete_at(0);
        assert_eq!(tree.to_string(), "bdef");
        tree.delete_at(3);
        assert_eq!(tree.to_string(), "bde");
    }

    #[test]
    fn test_delete_at_past_end_is_noop() {
        let mut tree = Tree::from_str("abc").expect("valid UTF-8");
        tree.delete_at(3);
        tree.delete_at(1000);
        assert_eq!(tree.to_string(), "abc");
    }

    #[test]
    fn test_delete_newline_updates_lines() {
        let mut tree = Tree::from_str("ab\ncd").expect("valid UTF-8");
        assert_eq!(tree.num_lines(), 2);
        tree.delete_at(2);
        assert_eq!(tree.to_string(), "abcd");
        assert_eq!(tree.num_lines(), 1);
    }

    #[test]
    fn test_delete_multibyte() {
        let mut tree = Tree::from_str("a漢b").expect("valid UTF-8");
        tree.delete_at(1);
        assert_eq!(tree.to_string(), "ab");
        assert_eq!(tree.num_chars(), 2);
    }

    #[test]
    fn test_delete_everything() {
        let s = "delete me entirely\nplease\n";
        let mut tree = Tree::from_str(s).expect("valid UTF-8");
        for _ in 0..s.chars().count() {
            tree.delete_at(0);
        }
        assert_eq!(tree.to_string(), "");
        assert_eq!(tree.num_chars(), 0);
    }

    #[test]
    fn test_insert_at_empty() {
        let mut tree = Tree::new();
        tree.insert_at(0, 'x');
        assert_eq!(tree.to_string(), "x");
        assert_eq!(tree.num_chars(), 1);
    }

    #[test]
    fn test_insert_at_positions() {
        let mut tree = Tree::from_str("ac").expect("valid UTF-8");
        tree.insert_at(1, 'b');
        assert_eq!(tree.to_string(), "abc");
        tree.insert_at(0, '_');
        assert_eq!(tree.to_string(), "_abc");
        tree.insert_at(4, '!');
        assert_eq!(tree.to_string(), "_abc!");
        // Past-end positions append.
        tree.insert_at(100, '?');
        assert_eq!(tree.to_string(), "_abc!?");
    }

    #[test]
    fn test_insert_multibyte_and_newline() {
        let mut tree = Tree::from_str("ab").expect("valid UTF-8");
        tree.insert_at(1, '漢');
        tree.insert_at(3, '\n');
        assert_eq!(tree.to_string(), "a漢b\n");
        assert_eq!(tree.num_chars(), 4);
        assert_eq!(tree.num_newlines(), 1);
    }

    #[test]
    fn test_insert_fills_and_splits_leaves() {
        let mut tree = Tree::new();
        let mut expected = String::new();
        // Repeated front insertion forces leaf splits and group splits.
        for i in 0..5_000 {
            let ch = char::from(b'a' + (i % 26) as u8);
            tree.insert_at(0, ch);
            expected.insert(0, ch);
        }
        assert_eq!(tree.to_string(), expected);
        assert_eq!(tree.num_chars(), 5_000);
    }

    #[test]
    fn test_insert_after_delete_reuses_leaf_space() {
        let s = "abcdefghij".repeat(50);
        let mut tree = Tree::from_str(&s).expect("valid UTF-8");
        let mut expected: Vec<char> = s.chars().collect();
        for _ in 0..100 {
            tree.delete_at(37);
            expected.remove(37);
        }
        for _ in 0..100 {
            tree.insert_at(37, 'Z');
            expected.insert(37, 'Z');
        }
        assert_eq!(tree.to_string(), expected.iter().collect::<String>());
    }

    #[test]
    fn test_interleaved_edits_match_model() {
        let mut tree = Tree::from_str("the quick\nbrown fox\n").expect("valid UTF-8");
        let mut model: Vec<char> = "the quick\nbrown fox\n".chars().collect();
        let ops: [(usize, Option<char>); 8] = [
            (4, None),
            (4, Some('Q')),
            (0, Some('é')),
            (21, None),
            (100, None),
            (9, Some('\n')),
            (1, None),
            (0, None),
        ];
        for (pos, op) in ops {
            match op {
                Some(ch) => {
                    let at = pos.min(model.len());
                    tree.insert_at(pos, ch);
                    model.insert(at, ch);
                }
                None => {
                    tree.delete_at(pos);
                    if pos < model.len() {
                        model.remove(pos);
                    }
                }
            }
            assert_eq!(tree.to_string(), model.iter().collect::<String>());
        }
    }

    #[test]
    fn test_reverse_cursor_reads_backward() {
        let s = "abc\ndéf😀";
        let tree = Tree::from_str(s).expect("valid UTF-8");
        let chars: Vec<char> = s.chars().collect();
        for pos in 0..=chars.len() {
            let got: Vec<char> = tree.reverse_cursor_at(pos).runes().collect();
            let expected: Vec<char> = chars[..pos].iter().rev().copied().collect();
            assert_eq!(got, expected, "reverse from {pos}");
        }
    }

    #[test]
    fn test_reverse_cursor_across_groups() {
        let s = "0123456789".repeat(1_500);
        let tree = Tree::from_str(&s).expect("valid UTF-8");
        let got: Vec<char> = tree.reverse_cursor_at(s.len()).runes().collect();
        let expected: Vec<char> = s.chars().rev().collect();
        assert_eq!(got, expected);
    }
}
