//! `GuardedCell`: a value and the lock that protects it, owned together.

mod guardable;

pub use guardable::Guardable;

use core::cell::UnsafeCell;
use core::{fmt, mem, ptr};

use crate::guard::{MultiGuard, ScopedRef};
use crate::raw::RawMutex;

/// A mutual-exclusion cell that owns the data it protects.
///
/// The value is reachable only through a [`ScopedRef`] (from [`lock`] or
/// [`try_lock`]) or a [`MultiGuard`] spanning several cells, and the lock is
/// held for exactly as long as that handle lives.
///
/// ```
/// use guarded::GuardedCell;
///
/// let cell = GuardedCell::new(String::from("initial"));
/// {
///     let mut value = cell.lock();
///     value.push_str(" + modified");
/// }
/// assert_eq!(*cell.lock(), "initial + modified");
/// ```
///
/// [`lock`]: GuardedCell::lock
/// [`try_lock`]: GuardedCell::try_lock
pub struct GuardedCell<T: ?Sized> {
    raw: RawMutex,
    data: UnsafeCell<T>,
}

// SAFETY: the lock hands out access to `data` to one thread at a time, so only
// `T: Send` is needed for the cell to be shared.
unsafe impl<T: ?Sized + Send> Sync for GuardedCell<T> {}

impl<T> GuardedCell<T> {
    /// Creates a new unlocked cell owning `value`.
    ///
    /// ```
    /// use guarded::GuardedCell;
    ///
    /// static HITS: GuardedCell<u64> = GuardedCell::new(0);
    ///
    /// *HITS.lock() += 1;
    /// assert_eq!(*HITS.lock(), 1);
    /// ```
    #[cfg(not(all(loom, test)))]
    #[inline]
    pub const fn new(value: T) -> Self
    where
        T: Guardable,
    {
        Self {
            raw: RawMutex::new(),
            data: UnsafeCell::new(value),
        }
    }

    /// Creates a new unlocked cell owning `value`.
    #[cfg(all(loom, test))]
    pub fn new(value: T) -> Self
    where
        T: Guardable,
    {
        Self {
            raw: RawMutex::new(),
            data: UnsafeCell::new(value),
        }
    }

    /// Consumes the cell and returns the value.
    ///
    /// No lock is taken: owning the cell proves no handle to it is alive.
    #[inline]
    pub fn into_inner(self) -> T {
        self.data.into_inner()
    }

    /// Creates a new cell by moving the value out of a shared `source`.
    ///
    /// `source` is locked for the duration of the move and is left holding
    /// `T::default()`.
    ///
    /// ```
    /// use guarded::GuardedCell;
    ///
    /// let source = GuardedCell::new(vec![1, 2, 3]);
    /// let moved = GuardedCell::take_from(&source);
    /// assert_eq!(*moved.lock(), [1, 2, 3]);
    /// assert!(source.lock().is_empty());
    /// ```
    pub fn take_from(source: &Self) -> Self
    where
        T: Guardable + Default,
    {
        let value = mem::take(&mut *source.lock());
        Self::new(value)
    }

    /// Moves the value of `source` into `self`, leaving `T::default()` behind.
    ///
    /// Both cells are locked together, deadlock-free, so a concurrent
    /// `b.assign_from(&a)` cannot deadlock with `a.assign_from(&b)`.
    /// Assigning a cell from itself does nothing.
    pub fn assign_from(&self, source: &Self)
    where
        T: Default,
    {
        if ptr::eq(self, source) {
            return;
        }
        let mut guard = MultiGuard::new((self, source));
        if let Some((target, source)) = guard.get_data_mut() {
            *target = mem::take(source);
        }
    }

    /// Replaces the value under the lock, returning the old one.
    pub fn replace(&self, value: T) -> T {
        mem::replace(&mut *self.lock(), value)
    }

    /// Swaps the values of two cells, locking both deadlock-free.
    ///
    /// Swapping a cell with itself does nothing.
    pub fn swap(&self, other: &Self) {
        if ptr::eq(self, other) {
            return;
        }
        let mut guard = MultiGuard::new((self, other));
        if let Some((a, b)) = guard.get_data_mut() {
            mem::swap(a, b);
        }
    }
}

impl<T: ?Sized> GuardedCell<T> {
    /// Acquires the lock, blocking the current thread until it is available.
    ///
    /// The returned [`ScopedRef`] owns the lock and releases it when dropped.
    #[inline]
    pub fn lock(&self) -> ScopedRef<'_, T> {
        ScopedRef::new(self)
    }

    /// Attempts to acquire the lock without blocking.
    ///
    /// Returns `None` if the lock is held elsewhere; that is an ordinary
    /// outcome, not an error.
    #[inline]
    pub fn try_lock(&self) -> Option<ScopedRef<'_, T>> {
        ScopedRef::try_acquire(self)
    }

    /// Returns `true` if the cell is currently locked.
    ///
    /// The answer may be stale as soon as it is returned; use it for
    /// diagnostics, not for synchronization.
    #[inline]
    pub fn is_locked(&self) -> bool {
        self.raw.is_locked()
    }

    /// Returns a mutable reference to the value without locking.
    ///
    /// `&mut self` already proves that no handle to the cell is alive.
    #[inline]
    pub fn get_mut(&mut self) -> &mut T {
        self.data.get_mut()
    }

    #[inline]
    pub(crate) fn raw(&self) -> &RawMutex {
        &self.raw
    }

    #[inline]
    pub(crate) fn as_mut_ptr(&self) -> *mut T {
        self.data.get()
    }
}

impl<T: Guardable + Default> Default for GuardedCell<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Guardable> From<T> for GuardedCell<T> {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

impl<T: ?Sized + fmt::Debug> fmt::Debug for GuardedCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("GuardedCell");
        match self.try_lock() {
            Some(guard) => {
                d.field("data", &&*guard);
            }
            None => {
                d.field("data", &format_args!("<locked>"));
            }
        }
        d.finish_non_exhaustive()
    }
}
