use std::sync::Arc;
use std::thread;
use std::time::Duration;

use reaction_timer::clock::MonotonicClock;
use reaction_timer::config::{Config, RebuildPolicy, Retention};
use reaction_timer::{Engine, EngineError, ReactionChannel};

const THREADS: u64 = 8;
const WRITES: u64 = 250;

#[test]
fn concurrent_pairs_lose_and_duplicate_nothing() {
    let engine = Arc::new(Engine::new(&Config {
        retention: Retention::EvictOldest { capacity: 64 },
        rebuild: RebuildPolicy::OnRangeChange,
        ..Config::default()
    }));

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let engine = engine.clone();
            thread::spawn(move || {
                let mut sum = 0u64;
                let mut done = 0u64;
                let mut tick = t * 1_000_000_000;
                while done < WRITES {
                    tick += 1_000;
                    engine.on_stimulus(tick);
                    // another thread may have consumed or replaced our stimulus
                    match engine.on_response(tick + 10 + t) {
                        Ok(sample) => {
                            sum += sample.duration_ns;
                            done += 1;
                        }
                        Err(EngineError::Unarmed) | Err(EngineError::ClockSkew { .. }) => {}
                        Err(e) => panic!("unexpected error: {e}"),
                    }
                }
                sum
            })
        })
        .collect();

    let expected_sum: u64 = handles.into_iter().map(|h| h.join().unwrap()).sum();

    let snap = engine.snapshot();
    assert_eq!(snap.stats.count, THREADS * WRITES);
    assert_eq!(snap.stats.sum, expected_sum);
    assert_eq!(snap.percentiles.count, THREADS * WRITES);
    assert_eq!(snap.retained, 64);
    assert_eq!(snap.bins.iter().map(|b| b.count).sum::<u64>(), 64);
}

#[test]
fn readers_never_see_a_torn_sample() {
    let engine = Arc::new(Engine::new(&Config {
        retention: Retention::Unbounded,
        ..Config::default()
    }));
    let channel = ReactionChannel::new(engine.clone(), Arc::new(MonotonicClock::new()));

    let writer = {
        let channel = channel.clone();
        thread::spawn(move || {
            for _ in 0..2_000 {
                channel.stimulate();
                let _ = channel.write(b"x");
            }
        })
    };

    while !writer.is_finished() {
        let snap = engine.snapshot();
        let binned: u64 = snap.bins.iter().map(|b| b.count).sum();
        assert_eq!(binned, snap.stats.count);
        assert_eq!(snap.retained as u64, snap.stats.count);
        thread::sleep(Duration::from_micros(50));
    }
    writer.join().unwrap();
}
