//! The handle returned by locking a single cell.

use core::fmt;
use core::marker::PhantomData;
use core::ops::{Deref, DerefMut};

use crate::trace::event;
use crate::GuardedCell;

/// An RAII handle holding the lock of one [`GuardedCell`].
///
/// Dereferencing gives access to the protected value. The lock is released
/// when the handle is dropped, or earlier through [`unlock`](Self::unlock);
/// after an early release every access is checked:
/// dereferencing panics and [`get`](Self::get) returns `None` until the lock is
/// taken again with [`lock`](Self::lock) or [`try_lock`](Self::try_lock).
///
/// A `ScopedRef` cannot outlive its cell:
///
/// ```compile_fail
/// use guarded::GuardedCell;
///
/// let guard = {
///     let cell = GuardedCell::new(1);
///     cell.lock()
/// };
/// ```
///
/// and it stays on the thread that acquired it:
///
/// ```compile_fail
/// use guarded::GuardedCell;
///
/// let cell = GuardedCell::new(1);
/// let guard = cell.lock();
/// std::thread::scope(|s| {
///     s.spawn(move || drop(guard));
/// });
/// ```
#[must_use = "if unused the GuardedCell will immediately unlock"]
pub struct ScopedRef<'a, T: ?Sized> {
    cell: &'a GuardedCell<T>,
    owns: bool,
    _not_send: PhantomData<*const ()>,
}

// SAFETY: a shared `&ScopedRef` only ever yields `&T`.
unsafe impl<T: ?Sized + Sync> Sync for ScopedRef<'_, T> {}

impl<'a, T: ?Sized> ScopedRef<'a, T> {
    pub(crate) fn new(cell: &'a GuardedCell<T>) -> Self {
        cell.raw().lock();
        Self {
            cell,
            owns: true,
            _not_send: PhantomData,
        }
    }

    /// Attempts to lock `cell` without blocking.
    ///
    /// Returns `None` if the cell is locked elsewhere. This is what
    /// [`GuardedCell::try_lock`] calls.
    pub fn try_acquire(cell: &'a GuardedCell<T>) -> Option<Self> {
        if cell.raw().try_lock() {
            Some(Self {
                cell,
                owns: true,
                _not_send: PhantomData,
            })
        } else {
            None
        }
    }

    /// Returns `true` while this handle holds the cell's lock.
    #[inline]
    pub fn owns(&self) -> bool {
        self.owns
    }

    /// Returns the value if the lock is held.
    #[inline]
    pub fn get(&self) -> Option<&T> {
        if self.owns {
            // SAFETY: we hold the lock, so no one else can access the value.
            Some(unsafe { &*self.cell.as_mut_ptr() })
        } else {
            None
        }
    }

    /// Returns the value mutably if the lock is held.
    #[inline]
    pub fn get_mut(&mut self) -> Option<&mut T> {
        if self.owns {
            // SAFETY: we hold the lock and `&mut self` rules out other borrows
            // through this handle.
            Some(unsafe { &mut *self.cell.as_mut_ptr() })
        } else {
            None
        }
    }

    /// Releases the lock before the handle goes out of scope.
    ///
    /// Does nothing if the lock is not held.
    ///
    /// ```
    /// use guarded::GuardedCell;
    ///
    /// let cell = GuardedCell::new(1);
    /// let mut guard = cell.lock();
    /// guard.unlock();
    /// assert!(!guard.owns());
    /// assert!(guard.get().is_none());
    /// assert!(cell.try_lock().is_some());
    /// ```
    pub fn unlock(&mut self) {
        if self.owns {
            self.owns = false;
            // SAFETY: `owns` was set, so this handle acquired the lock.
            unsafe { self.cell.raw().unlock() };
            event!(debug, "scoped ref released early");
        }
    }

    /// Re-acquires the lock after [`unlock`](Self::unlock), blocking until it
    /// is available. Does nothing if the lock is already held.
    pub fn lock(&mut self) {
        if !self.owns {
            self.cell.raw().lock();
            self.owns = true;
        }
    }

    /// Attempts to re-acquire the lock without blocking.
    ///
    /// Returns whether the lock is held afterwards.
    pub fn try_lock(&mut self) -> bool {
        if !self.owns {
            self.owns = self.cell.raw().try_lock();
        }
        self.owns
    }
}

#[cold]
#[track_caller]
fn released() -> ! {
    panic!("ScopedRef accessed after its lock was released")
}

impl<T: ?Sized> Deref for ScopedRef<'_, T> {
    type Target = T;

    #[inline]
    #[track_caller]
    fn deref(&self) -> &T {
        match self.get() {
            Some(value) => value,
            None => released(),
        }
    }
}

impl<T: ?Sized> DerefMut for ScopedRef<'_, T> {
    #[inline]
    #[track_caller]
    fn deref_mut(&mut self) -> &mut T {
        match self.get_mut() {
            Some(value) => value,
            None => released(),
        }
    }
}

impl<T: ?Sized> AsRef<T> for ScopedRef<'_, T> {
    fn as_ref(&self) -> &T {
        self
    }
}

impl<T: ?Sized> AsMut<T> for ScopedRef<'_, T> {
    fn as_mut(&mut self) -> &mut T {
        self
    }
}

impl<T: ?Sized> Drop for ScopedRef<'_, T> {
    #[inline]
    fn drop(&mut self) {
        if self.owns {
            // SAFETY: `owns` is only set while this handle holds the lock.
            unsafe { self.cell.raw().unlock() };
        }
    }
}

impl<T: ?Sized + fmt::Debug> fmt::Debug for ScopedRef<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("ScopedRef");
        d.field("owns", &self.owns);
        if let Some(value) = self.get() {
            d.field("data", &value);
        }
        d.finish()
    }
}

impl<T: ?Sized + fmt::Display> fmt::Display for ScopedRef<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.get() {
            Some(value) => value.fmt(f),
            None => f.write_str("<unlocked>"),
        }
    }
}

/// Releases a [`ScopedRef`] before it goes out of scope.
///
/// Kept for callers of the free-function spelling; it is exactly
/// [`ScopedRef::unlock`], so later access through the handle is checked.
#[deprecated(note = "scope the ScopedRef instead, or call ScopedRef::unlock")]
pub fn unlock<T: ?Sized>(guard: &mut ScopedRef<'_, T>) {
    guard.unlock();
}
