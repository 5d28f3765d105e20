//! Model-checked tests, run with `RUSTFLAGS="--cfg loom" cargo test --release`.

use loom::model::Builder;
use loom::sync::Arc;
use loom::{model, thread};

use crate::{GuardedCell, MultiGuard};

/// Bounds the schedules explored by the multi-lock models, whose back-off
/// loop would otherwise make the search space unbounded.
fn bounded() -> Builder {
    let mut builder = Builder::new();
    builder.preemption_bound = Some(3);
    builder
}

/// Concurrent `lock` calls serialize every increment.
#[test]
fn lock_serializes_increments() {
    model(|| {
        const RUNS: usize = 2;
        let cell = Arc::new(GuardedCell::new(0_usize));
        let handles: Vec<_> = (0..RUNS)
            .map(|_| {
                let cell = Arc::clone(&cell);
                thread::spawn(move || *cell.lock() += 1)
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(*cell.lock(), RUNS);
    });
}

/// A failed `try_lock` never observes or disturbs the holder's update.
#[test]
fn try_lock_is_exclusive() {
    model(|| {
        let cell = Arc::new(GuardedCell::new(0_usize));
        let other = Arc::clone(&cell);
        let handle = thread::spawn(move || {
            if let Some(mut guard) = other.try_lock() {
                *guard += 1;
            }
        });
        *cell.lock() += 1;
        handle.join().unwrap();
        let total = *cell.lock();
        assert!(total == 1 || total == 2);
    });
}

/// Two threads locking the same pair in opposite orders both finish.
#[test]
fn opposite_order_multi_lock_completes() {
    bounded().check(|| {
        let a = Arc::new(GuardedCell::new(0_usize));
        let b = Arc::new(GuardedCell::new(0_usize));

        let handle = {
            let (a, b) = (Arc::clone(&a), Arc::clone(&b));
            thread::spawn(move || {
                let mut guard = MultiGuard::new((&*b, &*a));
                let (b, a) = guard.get_data_mut().unwrap();
                *b += 1;
                *a += 1;
            })
        };

        {
            let mut guard = MultiGuard::new((&*a, &*b));
            let (a, b) = guard.get_data_mut().unwrap();
            *a += 1;
            *b += 1;
        }

        handle.join().unwrap();
        assert_eq!((*a.lock(), *b.lock()), (2, 2));
    });
}

/// A failed joint `try_lock` releases whatever it had taken.
#[test]
fn try_lock_all_leaves_no_partial_state() {
    bounded().check(|| {
        let a = Arc::new(GuardedCell::new(0_usize));
        let b = Arc::new(GuardedCell::new(0_usize));

        let handle = {
            let b = Arc::clone(&b);
            thread::spawn(move || *b.lock() += 1)
        };

        let guard = MultiGuard::try_new((&*a, &*b));
        if !guard.owns() {
            assert!(!a.is_locked());
        }
        drop(guard);

        handle.join().unwrap();
        assert_eq!(*b.lock(), 1);
    });
}
