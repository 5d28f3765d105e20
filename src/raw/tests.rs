use super::*;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Barrier;
use std::thread;
use std::time::Duration;

#[test]
fn test_raw_mutex_lock_unlock() {
    let mutex = RawMutex::new();
    assert!(!mutex.is_locked());

    mutex.lock();
    assert!(mutex.is_locked());
    assert!(!mutex.try_lock());

    unsafe { mutex.unlock() };
    assert!(!mutex.is_locked());
    assert!(mutex.try_lock());
    unsafe { mutex.unlock() };
}

#[test]
fn test_raw_mutex_contention() {
    let mutex = RawMutex::new();
    let inside = AtomicBool::new(false);
    let total = AtomicUsize::new(0);

    thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| {
                for _ in 0..500 {
                    mutex.lock();
                    assert!(!inside.swap(true, Ordering::SeqCst), "two threads inside");
                    total.fetch_add(1, Ordering::Relaxed);
                    inside.store(false, Ordering::SeqCst);
                    unsafe { mutex.unlock() };
                }
            });
        }
    });

    assert_eq!(total.load(Ordering::Relaxed), 2000);
    assert!(!mutex.is_locked());
}

#[test]
fn test_raw_mutex_parked_waiter_is_woken() {
    let mutex = RawMutex::new();
    let barrier = Barrier::new(2);

    mutex.lock();
    thread::scope(|s| {
        s.spawn(|| {
            barrier.wait();
            // Long enough to exhaust the spin phase and park.
            mutex.lock();
            unsafe { mutex.unlock() };
        });

        barrier.wait();
        thread::sleep(Duration::from_millis(50));
        unsafe { mutex.unlock() };
    });
    assert!(!mutex.is_locked());
}

#[test]
fn test_lock_all_and_unlock_all() {
    let a = RawMutex::new();
    let b = RawMutex::new();
    let c = RawMutex::new();
    let set: [&RawMutex; 3] = [&a, &b, &c];

    lock_all(&set[..]);
    assert!(a.is_locked() && b.is_locked() && c.is_locked());

    unsafe { unlock_all(&set[..]) };
    assert!(!a.is_locked() && !b.is_locked() && !c.is_locked());
}

#[test]
fn test_lock_all_empty_set() {
    let set: [&RawMutex; 0] = [];
    lock_all(&set[..]);
    assert!(try_lock_all(&set[..]));
}

#[test]
fn test_try_lock_all_rolls_back() {
    let a = RawMutex::new();
    let b = RawMutex::new();
    let c = RawMutex::new();

    c.lock();
    assert!(!try_lock_all(&[&a, &b, &c][..]));
    assert!(!a.is_locked(), "partial acquisition kept");
    assert!(!b.is_locked(), "partial acquisition kept");

    unsafe { c.unlock() };
    assert!(try_lock_all(&[&a, &b, &c][..]));
    unsafe { unlock_all(&[&a, &b, &c][..]) };
}

#[test]
fn test_lock_all_does_not_hold_while_waiting() {
    let a = RawMutex::new();
    let b = RawMutex::new();
    let done = AtomicBool::new(false);
    let barrier = Barrier::new(2);

    b.lock();
    thread::scope(|s| {
        s.spawn(|| {
            barrier.wait();
            lock_all(&[&a, &b][..]);
            done.store(true, Ordering::SeqCst);
            unsafe { unlock_all(&[&a, &b][..]) };
        });

        barrier.wait();
        // While the other thread waits for `b` it must leave `a` free.
        let mut acquired = false;
        for _ in 0..1000 {
            if a.try_lock() {
                acquired = true;
                break;
            }
            thread::sleep(Duration::from_millis(1));
        }
        assert!(acquired, "lock_all kept `a` while blocked on `b`");
        assert!(!done.load(Ordering::SeqCst));

        unsafe { a.unlock() };
        unsafe { b.unlock() };
    });

    assert!(done.load(Ordering::SeqCst));
}

#[test]
fn test_lock_all_opposite_orders() {
    let a = RawMutex::new();
    let b = RawMutex::new();

    thread::scope(|s| {
        s.spawn(|| {
            for _ in 0..1000 {
                lock_all(&[&a, &b][..]);
                unsafe { unlock_all(&[&a, &b][..]) };
            }
        });
        s.spawn(|| {
            for _ in 0..1000 {
                lock_all(&[&b, &a][..]);
                unsafe { unlock_all(&[&b, &a][..]) };
            }
        });
    });

    assert!(!a.is_locked() && !b.is_locked());
}

#[test]
fn test_find_duplicate_small() {
    let a = RawMutex::new();
    let b = RawMutex::new();

    assert_eq!(find_duplicate(&[&a, &b][..]), None);
    assert_eq!(find_duplicate(&[&a, &b, &a][..]), Some((0, 2)));
    assert_eq!(find_duplicate(&[&a, &b, &b, &a][..]), Some((1, 2)));
}

#[test]
fn test_find_duplicate_large() {
    let mutexes: Vec<RawMutex> = (0..40).map(|_| RawMutex::new()).collect();
    let mut set: Vec<&RawMutex> = mutexes.iter().collect();
    assert_eq!(find_duplicate(&set[..]), None);

    set.push(&mutexes[7]);
    assert_eq!(find_duplicate(&set[..]), Some((7, 40)));
}
