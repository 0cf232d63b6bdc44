use criterion::{black_box, criterion_group, criterion_main, Criterion};
use howto_core::{Entry, HowToIndex};

const WORDS: &[&str] = &[
    "oak", "birch", "iron", "coal", "furnace", "shelter", "torch", "wheat", "water", "diamond",
    "pickaxe", "sword", "night", "zombie", "planks", "stone", "farm", "boat", "bed", "chest",
];

fn corpus(n: usize) -> HowToIndex {
    HowToIndex::from_entries((0..n).map(|i| {
        let text: Vec<&str> = (0..40).map(|j| WORDS[(i * 7 + j * 3) % WORDS.len()]).collect();
        Entry::new(format!("doc{i}"), text.join(" "), "bench")
    }))
}

fn bench_build(c: &mut Criterion) {
    let mut idx = corpus(200);
    c.bench_function("build_200", |b| b.iter(|| idx.build()));
}

fn bench_search(c: &mut Criterion) {
    let mut idx = corpus(200);
    idx.build();
    c.bench_function("search_200", |b| b.iter(|| idx.search(black_box("iron pickaxe before night"), 5).len()));
}

criterion_group!(benches, bench_build, bench_search);
criterion_main!(benches);
