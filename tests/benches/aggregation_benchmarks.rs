//! # Warp-Signer Benchmarks
//!
//! | Operation | Target |
//! |-----------|--------|
//! | Message derivation | < 1ms |
//! | Share verification + aggregation, 100 validators | < 100ms |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::time::Duration;
use ws_01_message_derivation::{derive_message, FUJI_ID};
use ws_02_signature_aggregation::{aggregate_shares, CanonicalValidatorSet, QuorumThreshold};
use ws_tests::fixtures::{conversion_tx, generate_keys, rng, validators};

fn bench_derivation(c: &mut Criterion) {
    let keys = generate_keys(&mut rng(10), &[1; 16]);
    let tx = conversion_tx(&keys);
    let bytes = tx.bytes().to_vec();

    c.bench_function("ws-01-derive-message-16-validators", |b| {
        b.iter(|| black_box(derive_message(&bytes, FUJI_ID).is_ok()))
    });
}

fn bench_aggregation(c: &mut Criterion) {
    let mut group = c.benchmark_group("ws-02-aggregate-shares");
    group.measurement_time(Duration::from_secs(10));

    for size in [10usize, 50, 100] {
        let keys = generate_keys(&mut rng(size as u64), &vec![10; size]);
        let set = CanonicalValidatorSet::new(&validators(&keys)).expect("valid set");
        let message = b"benchmark attestation".to_vec();
        let shares: Vec<_> = keys.iter().map(|k| k.share(&message)).collect();
        let quorum = QuorumThreshold::default();

        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| black_box(aggregate_shares(&message, &set, &shares, quorum).is_ok()))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_derivation, bench_aggregation);
criterion_main!(benches);
