//! Acquiring an ordered collection of raw locks as one unit.
//!
//! [`lock_all`] never blocks while it holds a lock: it blocks on one lock,
//! tries every other lock in set order, and on the first failure releases
//! everything and starts over by blocking on the lock that failed. Two callers
//! locking overlapping sets in different orders therefore cannot deadlock.

use core::ptr;

use crossbeam_utils::Backoff;

use super::RawMutex;
use crate::cfg::hint;
use crate::trace::event;

/// Sets at or below this size are checked for duplicates pairwise.
const PAIRWISE_LIMIT: usize = 16;

/// An ordered, indexable collection of raw locks.
pub trait RawLocks {
    /// Number of locks in the collection.
    fn count(&self) -> usize;

    /// The lock at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.count()`.
    fn raw_at(&self, index: usize) -> &RawMutex;
}

impl RawLocks for [&RawMutex] {
    #[inline]
    fn count(&self) -> usize {
        self.len()
    }

    #[inline]
    fn raw_at(&self, index: usize) -> &RawMutex {
        self[index]
    }
}

/// Acquires every lock in `set`, blocking until all are held at once.
///
/// The caller must not already hold any lock in `set`, and `set` must not
/// contain the same lock twice (see [`find_duplicate`]); otherwise this never
/// returns.
pub fn lock_all<S: RawLocks + ?Sized>(set: &S) {
    if set.count() == 0 {
        return;
    }

    let backoff = Backoff::new();
    let mut first = 0;
    loop {
        set.raw_at(first).lock();
        match try_lock_rest(set, first) {
            None => return,
            Some(contended) => {
                event!(trace, blocked_on = contended, "lock_all released its locks, retrying");
                first = contended;
                hint::snooze(&backoff);
            }
        }
    }
}

/// With `first` held, tries every other lock in set order (wrapping around).
///
/// On failure every lock taken in this round, `first` included, is released
/// and the index of the lock that could not be taken is returned.
fn try_lock_rest<S: RawLocks + ?Sized>(set: &S, first: usize) -> Option<usize> {
    let count = set.count();
    for offset in 1..count {
        let index = (first + offset) % count;
        if !set.raw_at(index).try_lock() {
            for held in 0..offset {
                // SAFETY: locks `first..index` (wrapping) were taken above.
                unsafe { set.raw_at((first + held) % count).unlock() };
            }
            return Some(index);
        }
    }
    None
}

/// Attempts to acquire every lock in `set` without blocking.
///
/// Either all locks are taken and `true` is returned, or none is held on
/// return and the result is `false`.
pub fn try_lock_all<S: RawLocks + ?Sized>(set: &S) -> bool {
    for index in 0..set.count() {
        if !set.raw_at(index).try_lock() {
            for held in 0..index {
                // SAFETY: locks `0..index` were taken above.
                unsafe { set.raw_at(held).unlock() };
            }
            event!(trace, failed_at = index, "try_lock_all rolled back");
            return false;
        }
    }
    true
}

/// Releases every lock in `set`.
///
/// # Safety
///
/// Every lock in `set` must be held by the caller, for example after a
/// successful [`lock_all`] or [`try_lock_all`].
pub unsafe fn unlock_all<S: RawLocks + ?Sized>(set: &S) {
    for index in 0..set.count() {
        // SAFETY: guaranteed by the caller.
        unsafe { set.raw_at(index).unlock() };
    }
}

/// Returns the positions `(first, second)` of a lock that appears twice in
/// `set`, with `first < second`.
pub fn find_duplicate<S: RawLocks + ?Sized>(set: &S) -> Option<(usize, usize)> {
    let count = set.count();
    if count <= PAIRWISE_LIMIT {
        return (1..count).find_map(|second| {
            (0..second)
                .find(|&first| ptr::eq(set.raw_at(first), set.raw_at(second)))
                .map(|first| (first, second))
        });
    }

    let mut addresses: Vec<(*const RawMutex, usize)> = (0..count)
        .map(|index| (set.raw_at(index) as *const RawMutex, index))
        .collect();
    addresses.sort_unstable();
    addresses
        .windows(2)
        .filter(|pair| pair[0].0 == pair[1].0)
        .map(|pair| (pair[0].1, pair[1].1))
        .min_by_key(|&(_, second)| second)
}
