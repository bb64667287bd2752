//! Stress tests for the pools

use drift_rs::prelude::*;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn many_small_tasks<P: Pool>(pool: &P) {
    let handles: Vec<_> = (0..100_000u64).map(|i| pool.submit(move || i)).collect();
    let sum: u64 = handles.into_iter().map(|h| h.join().unwrap()).sum();
    assert_eq!(sum, 4_999_950_000);
}

#[test]
#[ignore] // Run with --ignored flag
fn stress_test_many_small_tasks() {
    many_small_tasks(&SingleQueuePool::with_threads(8).unwrap());
    many_small_tasks(&ShardedPool::with_threads(8).unwrap());
    many_small_tasks(&WorkStealingPool::with_threads(8).unwrap());
}

#[test]
#[ignore]
fn stress_test_high_contention_producers() {
    let pool = Arc::new(WorkStealingPool::with_threads(4).unwrap());
    let counter = Arc::new(AtomicU64::new(0));

    let producers: Vec<_> = (0..16)
        .map(|_| {
            let pool = pool.clone();
            let counter = counter.clone();
            thread::spawn(move || {
                let handles: Vec<_> = (0..5_000)
                    .map(|_| {
                        let counter = counter.clone();
                        pool.submit(move || {
                            counter.fetch_add(1, Ordering::Relaxed);
                        })
                    })
                    .collect();
                for h in handles {
                    h.join().unwrap();
                }
            })
        })
        .collect();

    for p in producers {
        p.join().unwrap();
    }
    assert_eq!(counter.load(Ordering::Relaxed), 80_000);
}

#[test]
#[ignore]
fn stress_test_uneven_task_cost() {
    // A slow task every few submissions; stealing keeps the rest moving.
    let pool = WorkStealingPool::with_threads(4).unwrap();

    let handles: Vec<_> = (0..400u64)
        .map(|i| {
            pool.submit(move || {
                if i % 8 == 0 {
                    thread::sleep(Duration::from_millis(5));
                }
                i
            })
        })
        .collect();

    let sum: u64 = handles.into_iter().map(|h| h.join().unwrap()).sum();
    assert_eq!(sum, (0..400).sum::<u64>());
}

#[test]
#[ignore]
fn stress_test_panic_recovery() {
    let pool = ShardedPool::with_threads(4).unwrap();

    for _ in 0..10 {
        let handles: Vec<_> = (0..100)
            .map(|i| {
                pool.submit(move || {
                    if i % 10 == 0 {
                        panic!("Intentional panic");
                    }
                })
            })
            .collect();
        let failed = handles.into_iter().map(|h| h.join()).filter(|r| r.is_err()).count();
        assert_eq!(failed, 10);
    }

    // Pool should still work after panics
    assert_eq!(pool.submit(|| 4950).join().unwrap(), 4950);
}

#[test]
#[ignore]
fn stress_test_repeated_construction() {
    for i in 0..50 {
        let pool = WorkStealingPool::with_threads(4).unwrap();
        let handle = pool.submit(move || i);
        assert_eq!(handle.join().unwrap(), i, "Iteration {}", i);
    }
}
