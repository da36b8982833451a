use std::sync::Arc;

use reaction_timer::clock::ManualClock;
use reaction_timer::config::{Config, Retention};
use reaction_timer::{Engine, EngineError, ReactionChannel};

fn channel_with(config: Config) -> (ReactionChannel, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(0));
    let engine = Arc::new(Engine::new(&config));
    (ReactionChannel::new(engine, clock.clone()), clock)
}

fn read_string(ch: &ReactionChannel) -> String {
    let mut buf = vec![0u8; 8192];
    let n = ch.read(&mut buf).unwrap();
    String::from_utf8(buf[..n].to_vec()).unwrap()
}

/// Fires a stimulus, waits `delay` ns and answers it.
fn react(ch: &ReactionChannel, clock: &ManualClock, delay: u64) {
    clock.advance(1_000_000);
    ch.stimulate();
    clock.advance(delay);
    ch.write(b"1").unwrap();
}

#[test]
fn reads_alternate_regardless_of_writes() {
    let (ch, clock) = channel_with(Config::default());
    react(&ch, &clock, 200);
    react(&ch, &clock, 400);

    let first = read_string(&ch);
    assert!(first.starts_with("Average: 300 ns, Max: 400 ns, Min: 200 ns\nHistogram:\n"));
    assert_eq!(read_string(&ch), "");

    // no intervening write: same report again
    assert_eq!(read_string(&ch), first);

    // a write between report and EOF does not skip the EOF
    react(&ch, &clock, 600);
    assert_eq!(read_string(&ch), "");
    let third = read_string(&ch);
    assert!(third.starts_with("Average: 400 ns, Max: 600 ns, Min: 200 ns\n"));
}

#[test]
fn zero_samples_report_placeholder() {
    let (ch, _clock) = channel_with(Config::default());
    assert_eq!(
        read_string(&ch),
        "Average: 0 ns, Max: 0 ns, Min: 0 ns\nHistogram:\nnot enough data\n"
    );
}

#[test]
fn statistics_match_true_durations() {
    let (ch, clock) = channel_with(Config {
        retention: Retention::EvictOldest { capacity: 5 },
        ..Config::default()
    });
    let durations: Vec<u64> = (1..=40).map(|i| (i * 7_919) % 1_000 + 50).collect();
    for &d in &durations {
        react(&ch, &clock, d);
    }

    let stats = ch.engine().stats();
    let sum: u64 = durations.iter().sum();
    assert_eq!(stats.count, durations.len() as u64);
    assert_eq!(stats.sum, sum);
    assert_eq!(stats.min, durations.iter().copied().min());
    assert_eq!(stats.max, durations.iter().copied().max());

    let report = read_string(&ch);
    let expected = format!(
        "Average: {} ns, Max: {} ns, Min: {} ns\n",
        sum / durations.len() as u64,
        stats.max.unwrap(),
        stats.min.unwrap()
    );
    assert!(report.starts_with(&expected));

    // only the five newest samples are binned
    let snap = ch.engine().snapshot();
    assert_eq!(snap.retained, 5);
    assert_eq!(snap.bins.iter().map(|b| b.count).sum::<u64>(), 5);
    assert_eq!(ch.engine().samples(), durations[35..].to_vec());
}

#[test]
fn unarmed_response_changes_nothing() {
    let (ch, clock) = channel_with(Config::default());
    react(&ch, &clock, 100);
    let before = ch.engine().snapshot();

    assert!(matches!(ch.write(b"late"), Err(EngineError::Unarmed)));
    let after = ch.engine().snapshot();
    assert_eq!(after.stats, before.stats);
    assert_eq!(after.bins, before.bins);
    assert_eq!(after.retained, before.retained);
}

#[test]
fn oversized_report_is_refused_then_delivered() {
    let (ch, clock) = channel_with(Config::default());
    for _ in 0..50 {
        react(&ch, &clock, 10);
    }

    let mut small = [0u8; 64];
    assert!(matches!(
        ch.read(&mut small),
        Err(EngineError::OutputTooLarge { available: 64, .. })
    ));
    // the failed read did not flip the protocol
    assert!(!read_string(&ch).is_empty());
    assert_eq!(read_string(&ch), "");
}
