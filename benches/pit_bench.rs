use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rust_ndnfw_common::{FaceId, Interest, Name};
use rust_ndnfw_fwd::pit::{Pit, PitInsert};
use std::time::{Duration, Instant};

fn interests(n: usize) -> Vec<Interest> {
    (0..n)
        .map(|i| {
            let name = Name::from_uri(&format!("/bench/pit/{}", i)).unwrap();
            Interest::new(name)
                .with_nonce(i as u32)
                .with_lifetime(Duration::from_secs(4))
        })
        .collect()
}

fn bench_pit(c: &mut Criterion) {
    let mut group = c.benchmark_group("pit");
    let batch = interests(1024);

    group.bench_function("insert_erase_1024", |b| {
        let mut pit = Pit::new(4096, 256);
        b.iter(|| {
            let now = Instant::now();
            let mut tokens = Vec::with_capacity(batch.len());
            for interest in &batch {
                if let PitInsert::New(token) = pit.insert(interest, now) {
                    tokens.push(token);
                }
            }
            for token in tokens {
                pit.erase(token);
            }
        });
    });

    // one entry aggregating many downstreams spills into extension blocks
    group.bench_function("record_rx_24_faces", |b| {
        let mut pit = Pit::new(16, 64);
        let interest = &batch[0];
        b.iter(|| {
            let now = Instant::now();
            let PitInsert::New(token) = pit.insert(interest, now) else {
                unreachable!();
            };
            let (entry, arena) = pit.entry_mut(token).unwrap();
            for face in 0..24u16 {
                black_box(entry.record_rx(arena, FaceId(100 + face), interest, face as u64, now));
            }
            pit.erase(token);
        });
    });

    group.finish();
}

criterion_group!(benches, bench_pit);
criterion_main!(benches);
