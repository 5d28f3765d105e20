//! Raw lock primitives underneath [`GuardedCell`](crate::GuardedCell).
//!
//! [`RawMutex`] is a futex-style word lock: uncontended acquisition is one
//! compare-and-swap, contended threads spin briefly and then park on the lock
//! word. The set routines ([`lock_all`], [`try_lock_all`], [`unlock_all`])
//! work over any [`RawLocks`] collection, which is how
//! [`MultiGuard`](crate::MultiGuard) acquires tuples, arrays and vectors of
//! cells with one piece of code.

mod futex;
mod mutex;
mod set;

#[cfg(all(test, not(loom)))]
mod tests;

pub use mutex::RawMutex;
pub use set::{find_duplicate, lock_all, try_lock_all, unlock_all, RawLocks};
