//! Tests for the progress registry and its granularity policy.

use fetchmeter::progress::policy;
use fetchmeter::ProgressRegistry;
use rand::Rng;
use std::sync::Arc;
use std::thread;

mod common;
use common::helpers::*;

/// Feed `steps` as successive byte counts of one transfer.
fn feed(registry: &ProgressRegistry, key: &str, steps: impl IntoIterator<Item = u64>, total: u64) {
    for current in steps {
        registry.update(key, current, Some(total));
    }
}

#[test]
fn test_one_percent_granularity_scenario() {
    let (registry, mut main_loop) = create_test_registry();
    let calls = expect_recorded(&registry, "a", 1.0);

    feed(&registry, "a", (0..=1000).step_by(10), 1000);
    main_loop.run_pending();

    let calls = recorded(&calls);
    assert_eq!(calls.len(), 101);
    assert_eq!(calls.first(), Some(&(0, Some(1000))));
    assert_single_completion(&calls, 1000);
    assert!(calls.iter().map(|(read, _)| read % 10).all(|rem| rem == 0));
}

#[test]
fn test_random_reads_respect_bound() {
    let mut rng = rand::rng();
    for granularity in [0.5_f32, 1.0, 3.0, 10.0, 25.0] {
        let (registry, mut main_loop) = create_test_registry();
        let calls = expect_recorded(&registry, "a", granularity);

        let total: u64 = rng.random_range(10_000..100_000);
        let mut current = 0;
        let mut steps = vec![0];
        while current < total {
            current = (current + rng.random_range(1..=512)).min(total);
            steps.push(current);
        }
        feed(&registry, "a", steps, total);
        main_loop.run_pending();

        let calls = recorded(&calls);
        let between = calls
            .iter()
            .filter(|(read, _)| *read != 0 && *read != total)
            .count();
        assert_eq!(calls.iter().filter(|(read, _)| *read == 0).count(), 1);
        assert_single_completion(&calls, total);
        assert!(between <= (100.0 / granularity).ceil() as usize);
    }
}

#[test]
fn test_zero_granularity_reports_every_read() {
    let (registry, mut main_loop) = create_test_registry();
    let calls = expect_recorded(&registry, "a", 0.0);

    feed(&registry, "a", 1..=50, 100);
    main_loop.run_pending();

    let reads: Vec<u64> = recorded(&calls).into_iter().map(|(read, _)| read).collect();
    assert_eq!(reads, (1..=50).collect::<Vec<_>>());
}

#[test]
fn test_no_duplicate_completion() {
    let (registry, mut main_loop) = create_test_registry();
    let calls = expect_recorded(&registry, "a", 1.0);

    registry.update("a", 500, Some(500));
    registry.update("a", 250, Some(500));
    registry.update("a", 500, Some(500));
    main_loop.run_pending();

    assert_eq!(recorded(&calls), vec![(500, Some(500))]);
    assert!(registry.is_empty());
}

#[test]
fn test_forget_is_idempotent() {
    let (registry, mut main_loop) = create_test_registry();
    let calls = expect_recorded(&registry, "a", 1.0);
    let other = expect_recorded(&registry, "b", 1.0);

    registry.forget("a");
    registry.forget("a");
    assert!(!registry.is_expecting("a"));
    assert!(registry.is_expecting("b"));

    registry.update("a", 10, Some(100));
    registry.update("b", 10, Some(100));
    main_loop.run_pending();
    assert!(recorded(&calls).is_empty());
    assert_eq!(recorded(&other), vec![(10, Some(100))]);
}

#[test]
fn test_forget_missing_key_on_empty_registry() {
    let (registry, mut main_loop) = create_test_registry();
    registry.forget("missing-key");
    assert!(registry.is_empty());
    assert_eq!(main_loop.run_pending(), 0);
}

#[test]
fn test_update_for_unknown_key_is_ignored() {
    let (registry, mut main_loop) = create_test_registry();
    registry.update("nobody", 10, Some(100));
    registry.update("nobody", 100, Some(100));
    assert_eq!(main_loop.run_pending(), 0);
}

#[test]
fn test_keys_are_normalized() {
    let (registry, mut main_loop) = create_test_registry();
    let calls = expect_recorded(&registry, "HTTPS://EXAMPLE.com/image.jpg", 1.0);

    assert!(registry.is_expecting(TEST_KEY));
    registry.update(TEST_KEY, 10, Some(100));
    main_loop.run_pending();
    assert_eq!(recorded(&calls), vec![(10, Some(100))]);
}

#[test]
fn test_interleaved_keys_are_independent() {
    let (registry, mut main_loop) = create_test_registry();
    let x = expect_recorded(&registry, "x", 10.0);
    let y = expect_recorded(&registry, "y", 10.0);

    // Both transfers sit in the same bucket at the same time.
    for current in (5..=1000).step_by(5) {
        registry.update("x", current, Some(1000));
        registry.update("y", current, Some(1000));
    }
    main_loop.run_pending();

    assert_eq!(recorded(&x), recorded(&y));
    assert_eq!(recorded(&x).len(), 11);
}

#[test]
fn test_concurrent_transfers_from_threads() {
    let (registry, mut main_loop) = create_test_registry();
    let keys: Vec<String> = (0..8).map(|i| format!("https://example.com/{i}.jpg")).collect();
    let calls: Vec<Calls> = keys
        .iter()
        .map(|key| expect_recorded(&registry, key, 1.0))
        .collect();

    let handles: Vec<_> = keys
        .iter()
        .cloned()
        .map(|key| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                for current in (0..=10_000).step_by(7).chain([10_000]) {
                    registry.update(key.as_str(), current, Some(10_000));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("reader thread panicked");
    }
    main_loop.run_pending();

    assert!(registry.is_empty());
    for calls in &calls {
        let calls = recorded(calls);
        assert_single_completion(&calls, 10_000);
        // 0%, buckets 0 through 99, completion.
        assert_eq!(calls.len(), 102);
    }
}

#[test]
fn test_policy_bucket_matches_registry_decisions() {
    assert_eq!(policy::bucket(10, Some(1000), 1.0), Some(1));
    assert_eq!(policy::bucket(999, Some(1000), 1.0), Some(99));
    assert_eq!(policy::bucket(500, Some(1000), 0.0), None);
    assert_eq!(policy::bucket(500, None, 1.0), None);
}
