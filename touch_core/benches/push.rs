use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use touch_core::{GestureDecoder, NoopObserver, TimingConfig};

// Synthetic touch trace: each channel toggles with its own xorshift stream,
// sampled every 10 ms.
fn synth_trace(n: usize, width: u8, seed: u32) -> Vec<(u32, u64)> {
    let mut state = seed.max(1);
    let mut next = || {
        let mut x = state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        state = x;
        x
    };
    let keep = if width >= 32 {
        u32::MAX
    } else {
        (1u32 << width) - 1
    };
    let mut mask = 0u32;
    let mut v = Vec::with_capacity(n);
    for i in 0..n {
        // Flip roughly one channel in eight per sample.
        let flips = next() & next() & next() & keep;
        mask ^= flips;
        v.push((mask, i as u64 * 10));
    }
    v
}

pub fn bench_push(c: &mut Criterion) {
    let mut g = c.benchmark_group("push");
    // Allow quick tweaking without CLI flags (Criterion 0.5):
    //   BENCH_SAMPLE_SIZE=10 cargo bench -p touch_core --bench push
    if let Ok(ss) = std::env::var("BENCH_SAMPLE_SIZE") {
        if let Ok(n) = ss.parse::<usize>() {
            g.sample_size(n.max(1));
        }
    } else {
        g.sample_size(50);
    }

    for width in [12u8, 32] {
        let trace = synth_trace(10_000, width, 0x5A5A_0001);
        g.bench_function(format!("trace_10k_w{width}"), |b| {
            b.iter_batched(
                || {
                    GestureDecoder::with_observer(width, TimingConfig::default(), NoopObserver)
                        .unwrap()
                },
                |mut d| {
                    let mut fired = 0usize;
                    for &(mask, t) in &trace {
                        fired += d.push(black_box(mask), black_box(t)).events().count();
                    }
                    fired
                },
                BatchSize::SmallInput,
            )
        });
    }

    let mut idle =
        GestureDecoder::with_observer(12, TimingConfig::default(), NoopObserver).unwrap();
    g.bench_function("quiet_tick_w12", |b| {
        let mut t = 0u64;
        b.iter(|| {
            t += 10;
            black_box(idle.push(0, t).is_empty())
        })
    });

    g.finish();
}

criterion_group!(benches, bench_push);
criterion_main!(benches);
