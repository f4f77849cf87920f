//! This bench classifies the full slot universe of a storage that is mostly
//! full, and asks for the next free slot.

#![allow(missing_docs)]

use std::collections::HashSet;

use criterion::{Criterion, criterion_group, criterion_main};
use tsm_core::domain::{SlotId, scheme};

/// Occupies every slot but the last few, and disables every tenth one.
fn preseed(universe: &[SlotId]) -> (HashSet<SlotId>, HashSet<SlotId>) {
    let occupied = universe
        .iter()
        .take(universe.len() - 3)
        .copied()
        .collect();
    let disabled = universe.iter().step_by(10).copied().collect();
    (occupied, disabled)
}

fn classify(c: &mut Criterion) {
    let universe = scheme::enumerate_universe();
    let (occupied, disabled) = preseed(&universe);

    c.bench_function("classify universe", |b| {
        b.iter(|| scheme::classify(&universe, &occupied, &disabled));
    });

    c.bench_function("suggest next free", |b| {
        b.iter(|| scheme::suggest_next_free(&universe, &occupied, &disabled));
    });

    c.bench_function("enumerate universe", |b| b.iter(scheme::enumerate_universe));
}

criterion_group!(benches, classify);
criterion_main!(benches);
