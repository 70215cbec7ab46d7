//! Text tree performance benchmarks.

use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use std::io::Read;
use textgrove::locate;
use textgrove::text::Tree;

fn sample_text(lines: usize) -> String {
    "the quick brown fox jumps over the lazy dog\n".repeat(lines)
}

fn tree_construction(c: &mut Criterion) {
    c.bench_function("tree_new", |b| {
        b.iter(|| Tree::new());
    });

    let small = sample_text(10);
    c.bench_function("tree_from_str_small", |b| {
        b.iter(|| Tree::from_str(black_box(&small)));
    });

    let large = sample_text(10_000);
    c.bench_function("tree_from_str_440k", |b| {
        b.iter(|| Tree::from_str(black_box(&large)));
    });
}

fn tree_lookups(c: &mut Criterion) {
    let text = sample_text(10_000);
    let tree = Tree::from_str(&text).expect("valid UTF-8");
    let len = tree.num_chars();

    c.bench_function("tree_cursor_at_mid", |b| {
        b.iter(|| black_box(&tree).cursor_at(black_box(len / 2)));
    });

    c.bench_function("tree_cursor_at_line_mid", |b| {
        b.iter(|| black_box(&tree).cursor_at_line(black_box(5_000)));
    });

    c.bench_function("tree_read_all", |b| {
        b.iter(|| {
            let mut bytes = Vec::with_capacity(text.len());
            black_box(&tree)
                .cursor_at(0)
                .read_to_end(&mut bytes)
                .expect("cursor read");
            bytes
        });
    });
}

fn tree_edits(c: &mut Criterion) {
    let text = sample_text(1_000);

    c.bench_function("tree_insert_middle", |b| {
        let mut tree = Tree::from_str(&text).expect("valid UTF-8");
        let mid = tree.num_chars() / 2;
        b.iter(|| tree.insert_at(black_box(mid), 'x'));
    });

    c.bench_function("tree_delete_middle", |b| {
        let mut tree = Tree::from_str(&text).expect("valid UTF-8");
        let mid = tree.num_chars() / 2;
        b.iter(|| tree.delete_at(black_box(mid)));
    });
}

fn motions(c: &mut Criterion) {
    let text = sample_text(1_000);
    let tree = Tree::from_str(&text).expect("valid UTF-8");
    let mid = tree.num_chars() / 2;

    c.bench_function("locate_next_word_start", |b| {
        b.iter(|| locate::next_word_start(black_box(&tree), black_box(mid)));
    });

    c.bench_function("locate_prev_word_start", |b| {
        b.iter(|| locate::prev_word_start(black_box(&tree), black_box(mid)));
    });

    c.bench_function("locate_next_paragraph", |b| {
        b.iter(|| locate::next_paragraph(black_box(&tree), black_box(0)));
    });
}

criterion_group!(benches, tree_construction, tree_lookups, tree_edits, motions);
criterion_main!(benches);
