//! Joint, deadlock-free ownership of several cells.

use core::fmt;
use core::marker::PhantomData;
use core::mem::ManuallyDrop;
use core::ptr;

use super::set::LockSet;
use crate::error::GuardError;
use crate::raw;
use crate::trace::event;

/// An RAII handle holding the locks of every cell in a [`LockSet`].
///
/// The cells are acquired as one unit: either every lock is held or none is.
/// The blocking constructors never wait while holding a lock, so two threads
/// naming the same cells in opposite orders cannot deadlock.
///
/// ```
/// use guarded::{GuardedCell, MultiGuard};
///
/// let name = GuardedCell::new(String::from("data1"));
/// let count = GuardedCell::new(100);
///
/// {
///     let mut guard = MultiGuard::new((&name, &count));
///     let (name, count) = guard.get_data_mut().unwrap();
///     *name = String::from("new_data");
///     *count += 1;
/// }
///
/// assert_eq!(*name.lock(), "new_data");
/// assert_eq!(*count.lock(), 101);
/// ```
///
/// The references handed out by [`get_data`](Self::get_data) borrow the
/// guard, so they cannot escape it:
///
/// ```compile_fail
/// use guarded::{GuardedCell, MultiGuard};
///
/// let a = GuardedCell::new(1);
/// let b = GuardedCell::new(2);
/// let (x, _) = MultiGuard::new((&a, &b)).get_data().unwrap();
/// println!("{x}");
/// ```
///
/// Guards are released on the thread that acquired them, so they are neither
/// `Send` nor `Sync`:
///
/// ```compile_fail
/// use guarded::{GuardedCell, MultiGuard};
///
/// fn assert_sync<T: Sync>(_: &T) {}
///
/// let a = GuardedCell::new(1);
/// let guard = MultiGuard::new(&a);
/// assert_sync(&guard);
/// ```
#[must_use = "if unused the cells will immediately unlock"]
pub struct MultiGuard<S: LockSet> {
    set: S,
    owns: bool,
    _not_send: PhantomData<*const ()>,
}

impl<S: LockSet> MultiGuard<S> {
    /// Locks every cell in `set`, blocking until all of them are held.
    ///
    /// # Panics
    ///
    /// Panics if the set names the same cell twice.
    #[track_caller]
    pub fn new(set: S) -> Self {
        let mut guard = Self::unlocked_or_panic(set);
        guard.lock();
        guard
    }

    /// Attempts to lock every cell in `set` without blocking.
    ///
    /// On failure the guard is returned with [`owns`](Self::owns) `false` and
    /// no lock held; call [`lock`](Self::lock) or [`try_lock`](Self::try_lock)
    /// to retry.
    ///
    /// # Panics
    ///
    /// Panics if the set names the same cell twice.
    #[track_caller]
    pub fn try_new(set: S) -> Self {
        let mut guard = Self::unlocked_or_panic(set);
        guard.try_lock();
        guard
    }

    /// Like [`new`](Self::new), but reports a repeated cell as an error.
    ///
    /// ```
    /// use guarded::{GuardError, GuardedCell, MultiGuard};
    ///
    /// let cell = GuardedCell::new(0);
    /// let err = MultiGuard::checked((&cell, &cell)).unwrap_err();
    /// assert_eq!(err, GuardError::DuplicateCell { first: 0, second: 1 });
    /// ```
    pub fn checked(set: S) -> Result<Self, GuardError> {
        let mut guard = Self::unlocked(set)?;
        guard.lock();
        Ok(guard)
    }

    /// Like [`try_new`](Self::try_new), but reports a repeated cell or a
    /// failed acquisition as an error.
    pub fn try_checked(set: S) -> Result<Self, GuardError> {
        let mut guard = Self::unlocked(set)?;
        if guard.try_lock() {
            Ok(guard)
        } else {
            Err(GuardError::WouldBlock)
        }
    }

    fn unlocked(set: S) -> Result<Self, GuardError> {
        if let Some((first, second)) = raw::find_duplicate(&set) {
            event!(debug, first, second, "lock set rejected: duplicate cell");
            return Err(GuardError::DuplicateCell { first, second });
        }
        Ok(Self {
            set,
            owns: false,
            _not_send: PhantomData,
        })
    }

    #[track_caller]
    fn unlocked_or_panic(set: S) -> Self {
        match Self::unlocked(set) {
            Ok(guard) => guard,
            Err(err) => panic!("{err}"),
        }
    }

    /// Returns `true` while this guard holds every lock in its set.
    #[inline]
    pub fn owns(&self) -> bool {
        self.owns
    }

    /// Acquires every lock, blocking until all are held. Does nothing if the
    /// guard already owns them.
    pub fn lock(&mut self) {
        if !self.owns {
            raw::lock_all(&self.set);
            self.owns = true;
        }
    }

    /// Attempts to acquire every lock without blocking.
    ///
    /// Returns whether the guard owns the set afterwards. A failed attempt
    /// leaves nothing locked.
    pub fn try_lock(&mut self) -> bool {
        if !self.owns {
            self.owns = raw::try_lock_all(&self.set);
        }
        self.owns
    }

    /// Releases every lock before the guard goes out of scope.
    ///
    /// Does nothing if the guard does not own the set.
    pub fn unlock(&mut self) {
        if self.owns {
            self.owns = false;
            // SAFETY: `owns` was set, so this guard holds every lock.
            unsafe { raw::unlock_all(&self.set) };
            event!(debug, cells = self.set.count(), "multi guard released early");
        }
    }

    /// Returns shared references to every value, in set order, if the guard
    /// owns the set.
    pub fn get_data(&self) -> Option<S::Ref<'_>> {
        if self.owns {
            // SAFETY: every lock is held and `&self` rules out exclusive
            // borrows through this guard.
            Some(unsafe { self.set.data() })
        } else {
            None
        }
    }

    /// Returns exclusive references to every value, in set order, if the
    /// guard owns the set.
    ///
    /// ```
    /// use guarded::{GuardedCell, MultiGuard};
    ///
    /// let a = GuardedCell::new(1);
    /// let b = GuardedCell::new(2);
    /// let mut guard = MultiGuard::new([&a, &b]);
    /// for value in guard.get_data_mut().unwrap() {
    ///     *value *= 10;
    /// }
    /// drop(guard);
    /// assert_eq!((*a.lock(), *b.lock()), (10, 20));
    /// ```
    pub fn get_data_mut(&mut self) -> Option<S::Mut<'_>> {
        if self.owns {
            // SAFETY: every lock is held, the cells are distinct (checked at
            // construction) and `&mut self` rules out any other borrow.
            Some(unsafe { self.set.data_mut() })
        } else {
            None
        }
    }

    /// Number of cells in the set.
    pub fn len(&self) -> usize {
        self.set.count()
    }

    /// Returns `true` if the set has no cells.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Releases the locks and returns the cell references.
    pub fn into_set(mut self) -> S {
        self.unlock();
        let this = ManuallyDrop::new(self);
        // SAFETY: `this` is never dropped, so `set` is moved out exactly once.
        unsafe { ptr::read(&this.set) }
    }
}

impl<S: LockSet> Drop for MultiGuard<S> {
    #[inline]
    fn drop(&mut self) {
        if self.owns {
            // SAFETY: `owns` is only set while this guard holds every lock.
            unsafe { raw::unlock_all(&self.set) };
        }
    }
}

impl<S: LockSet> fmt::Debug for MultiGuard<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultiGuard")
            .field("cells", &self.set.count())
            .field("owns", &self.owns)
            .finish()
    }
}

#[cfg(all(test, not(loom)))]
mod tests {
    use super::*;
    use crate::GuardedCell;

    #[test]
    fn test_new_owns_and_releases_on_drop() {
        let a = GuardedCell::new(1);
        let b = GuardedCell::new(String::from("b"));
        {
            let guard = MultiGuard::new((&a, &b));
            assert!(guard.owns());
            assert!(a.is_locked() && b.is_locked());
        }
        assert!(!a.is_locked() && !b.is_locked());
    }

    #[test]
    fn test_try_new_leaves_nothing_locked_on_failure() {
        let a = GuardedCell::new(1);
        let b = GuardedCell::new(2);
        let held = b.lock();

        let guard = MultiGuard::try_new((&a, &b));
        assert!(!guard.owns());
        assert!(guard.get_data().is_none());
        assert!(!a.is_locked());
        drop(held);
    }

    #[test]
    fn test_try_checked_reports_would_block() {
        let a = GuardedCell::new(1);
        let _held = a.lock();
        let err = MultiGuard::try_checked(&a).unwrap_err();
        assert_eq!(err, GuardError::WouldBlock);
    }

    #[test]
    #[should_panic(expected = "same cell twice")]
    fn test_new_panics_on_duplicate() {
        let a = GuardedCell::new(1);
        let _guard = MultiGuard::new((&a, &a));
    }

    #[test]
    fn test_unlock_and_relock() {
        let a = GuardedCell::new(1);
        let b = GuardedCell::new(2);
        let mut guard = MultiGuard::new([&a, &b]);

        guard.unlock();
        assert!(!guard.owns());
        assert!(guard.get_data_mut().is_none());
        assert!(!a.is_locked() && !b.is_locked());

        assert!(guard.try_lock());
        guard.lock();
        assert_eq!(guard.get_data().map(|[x, y]| x + y), Some(3));
    }

    #[test]
    fn test_single_cell_set() {
        let a = GuardedCell::new(vec![1]);
        let mut guard = MultiGuard::new(&a);
        guard.get_data_mut().unwrap().push(2);
        assert_eq!(guard.get_data().unwrap(), &[1, 2]);
        assert_eq!(guard.len(), 1);
    }

    #[test]
    fn test_into_set_releases() {
        let a = GuardedCell::new(1);
        let b = GuardedCell::new(2);
        let guard = MultiGuard::new((&a, &b));
        let (a_ref, b_ref) = guard.into_set();
        assert!(!a_ref.is_locked() && !b_ref.is_locked());
    }

    #[test]
    fn test_debug() {
        let a = GuardedCell::new(1);
        let guard = MultiGuard::new(vec![&a]);
        assert_eq!(format!("{guard:?}"), "MultiGuard { cells: 1, owns: true }");
    }

    #[cfg(feature = "tracing")]
    #[test]
    fn test_duplicate_rejection_is_logged_at_debug() {
        use std::sync::{Arc, Mutex};
        use tracing::span::{Attributes, Id, Record};
        use tracing::{Event, Level, Metadata, Subscriber};

        struct Levels(Arc<Mutex<Vec<Level>>>);

        impl Subscriber for Levels {
            fn enabled(&self, metadata: &Metadata<'_>) -> bool {
                metadata.target() == "guarded"
            }
            fn new_span(&self, _: &Attributes<'_>) -> Id {
                Id::from_u64(1)
            }
            fn record(&self, _: &Id, _: &Record<'_>) {}
            fn record_follows_from(&self, _: &Id, _: &Id) {}
            fn event(&self, event: &Event<'_>) {
                self.0.lock().unwrap().push(*event.metadata().level());
            }
            fn enter(&self, _: &Id) {}
            fn exit(&self, _: &Id) {}
        }

        let levels = Arc::new(Mutex::new(Vec::new()));
        let a = GuardedCell::new(1);
        tracing::subscriber::with_default(Levels(Arc::clone(&levels)), || {
            assert!(MultiGuard::checked((&a, &a)).is_err());
        });

        assert_eq!(*levels.lock().unwrap(), [Level::DEBUG]);
    }
}
