//! # `guarded` - Data-Owning Locks
//!
//! A mutex that owns the value it protects, and a way to lock several of them
//! at once without deadlocking.
//!
//! ## Key Features
//!
//! - **Owned data**: a [`GuardedCell<T>`] holds its value and its lock together.
//!   The value is reachable only through a handle that holds the lock.
//! - **Scoped handles**: [`ScopedRef`] releases the lock when it goes out of
//!   scope. An early release is checked: later access panics or returns `None`.
//! - **Deadlock-free multi-lock**: [`MultiGuard`] acquires a tuple, array or
//!   `Vec` of cells as one unit. It never waits while holding a lock, so
//!   threads may name the same cells in any order.
//! - **Compile-time rules**: only [`Guardable`] values can be put in a cell, and
//!   only cells can be passed to a [`MultiGuard`].
//!
//! ## Architecture
//!
//! 1. **Raw locks** ([`raw`]): a futex-style word lock and the set routines
//!    that acquire any ordered collection of them.
//! 2. **Cells** ([`GuardedCell`]): a raw lock plus an `UnsafeCell<T>`.
//! 3. **Handles** ([`ScopedRef`], [`MultiGuard`]): RAII ownership of one or
//!    more locks, with an `owns` flag gating every access.
//!
//! ## Example
//!
//! ```rust
//! use guarded::{GuardedCell, MultiGuard};
//!
//! let label = GuardedCell::new(String::from("First"));
//! let total = GuardedCell::new(0_i32);
//!
//! {
//!     let mut guard = MultiGuard::new((&label, &total));
//!     if let Some((label, total)) = guard.get_data_mut() {
//!         label.push_str(" entry");
//!         *total = 123;
//!     }
//! }
//!
//! assert_eq!(*label.lock(), "First entry");
//! assert_eq!(*total.lock(), 123);
//! ```
//!
//! References are not guardable, so a cell cannot smuggle out a borrow of
//! unprotected data:
//!
//! ```compile_fail
//! use guarded::GuardedCell;
//!
//! let value = 5;
//! let cell = GuardedCell::new(&value);
//! ```

#![warn(missing_docs, clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

mod cfg;
mod error;
mod guard;
mod guarded_cell;
pub mod raw;
mod trace;

#[cfg(all(loom, test))]
mod loom;

pub use error::GuardError;
#[allow(deprecated)]
pub use guard::unlock;
pub use guard::{LockSet, Lockable, MultiGuard, ScopedRef};
pub use guarded_cell::{Guardable, GuardedCell};

// Compile-time assertions for memory layout
#[cfg(not(all(loom, test)))]
const _: () = {
    use core::mem;

    // The lock is a single futex word.
    assert!(mem::size_of::<raw::RawMutex>() == mem::size_of::<u32>());

    // A cell adds one word to its value, padded to the value's alignment.
    assert!(mem::size_of::<GuardedCell<u32>>() == 2 * mem::size_of::<u32>());
    assert!(mem::size_of::<GuardedCell<u64>>() == 2 * mem::size_of::<u64>());

    // Handles are a reference plus a flag.
    assert!(mem::size_of::<ScopedRef<'static, u64>>() <= mem::size_of::<usize>() * 2);
    assert!(
        mem::size_of::<MultiGuard<(&'static GuardedCell<u8>, &'static GuardedCell<u64>)>>()
            <= mem::size_of::<usize>() * 3
    );
};
