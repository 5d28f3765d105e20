//! Which arguments a [`MultiGuard`](crate::MultiGuard) accepts.
//!
//! A lock set is a single cell reference, a tuple of cell references (each
//! with its own value type), an array, or a `Vec` of them. Both traits are
//! sealed: nothing but a [`GuardedCell`] can take part in a joint acquisition.
//!
//! ```compile_fail
//! use guarded::MultiGuard;
//!
//! let plain = 5;
//! let guard = MultiGuard::new((&plain,));
//! ```

use crate::raw::{RawLocks, RawMutex};
use crate::GuardedCell;

mod sealed {
    pub trait Sealed {}
}

/// A reference to a [`GuardedCell`] that can join a lock set.
pub trait Lockable: sealed::Sealed {
    /// The value protected by the cell.
    type Target: ?Sized;

    #[doc(hidden)]
    fn raw_mutex(&self) -> &RawMutex;

    #[doc(hidden)]
    fn data_ptr(&self) -> *mut Self::Target;
}

impl<T: ?Sized> sealed::Sealed for &GuardedCell<T> {}

impl<T: ?Sized> Lockable for &GuardedCell<T> {
    type Target = T;

    #[inline]
    fn raw_mutex(&self) -> &RawMutex {
        GuardedCell::raw(self)
    }

    #[inline]
    fn data_ptr(&self) -> *mut T {
        GuardedCell::as_mut_ptr(self)
    }
}

/// An ordered collection of cells that a [`MultiGuard`](crate::MultiGuard)
/// locks as one unit.
pub trait LockSet: RawLocks + sealed::Sealed {
    /// Shared access to every value in the set, in set order.
    type Ref<'g>
    where
        Self: 'g;

    /// Exclusive access to every value in the set, in set order.
    type Mut<'g>
    where
        Self: 'g;

    #[doc(hidden)]
    /// # Safety
    ///
    /// Every lock in the set must be held and no exclusive reference into the
    /// set may be alive.
    unsafe fn data<'g>(&'g self) -> Self::Ref<'g>;

    #[doc(hidden)]
    /// # Safety
    ///
    /// Every lock in the set must be held, the set must not contain the same
    /// cell twice, and no other reference into the set may be alive.
    unsafe fn data_mut<'g>(&'g self) -> Self::Mut<'g>;
}

#[cold]
#[track_caller]
fn index_out_of_range(index: usize, count: usize) -> ! {
    panic!("lock index {index} out of range for a set of {count} cells")
}

impl<T: ?Sized> RawLocks for &GuardedCell<T> {
    #[inline]
    fn count(&self) -> usize {
        1
    }

    #[inline]
    fn raw_at(&self, index: usize) -> &RawMutex {
        if index != 0 {
            index_out_of_range(index, 1);
        }
        self.raw_mutex()
    }
}

impl<T: ?Sized> LockSet for &GuardedCell<T> {
    type Ref<'g> = &'g T where Self: 'g;
    type Mut<'g> = &'g mut T where Self: 'g;

    #[inline]
    unsafe fn data<'g>(&'g self) -> Self::Ref<'g> {
        // SAFETY: the caller holds the lock.
        unsafe { &*self.data_ptr() }
    }

    #[inline]
    unsafe fn data_mut<'g>(&'g self) -> Self::Mut<'g> {
        // SAFETY: the caller holds the lock and no other reference is alive.
        unsafe { &mut *self.data_ptr() }
    }
}

macro_rules! tuple_lock_set {
    ($count:literal; $(($name:ident, $index:tt)),+) => {
        impl<$($name: Lockable),+> sealed::Sealed for ($($name,)+) {}

        impl<$($name: Lockable),+> RawLocks for ($($name,)+) {
            #[inline]
            fn count(&self) -> usize {
                $count
            }

            fn raw_at(&self, index: usize) -> &RawMutex {
                match index {
                    $($index => self.$index.raw_mutex(),)+
                    _ => index_out_of_range(index, $count),
                }
            }
        }

        impl<$($name: Lockable),+> LockSet for ($($name,)+) {
            type Ref<'g> = ($(&'g <$name as Lockable>::Target,)+) where Self: 'g;
            type Mut<'g> = ($(&'g mut <$name as Lockable>::Target,)+) where Self: 'g;

            #[inline]
            unsafe fn data<'g>(&'g self) -> Self::Ref<'g> {
                // SAFETY: the caller holds every lock in the set.
                unsafe { ($(&*self.$index.data_ptr(),)+) }
            }

            #[inline]
            unsafe fn data_mut<'g>(&'g self) -> Self::Mut<'g> {
                // SAFETY: the caller holds every lock and the cells are distinct,
                // so the exclusive references do not alias.
                unsafe { ($(&mut *self.$index.data_ptr(),)+) }
            }
        }
    };
}

tuple_lock_set!(1; (A, 0));
tuple_lock_set!(2; (A, 0), (B, 1));
tuple_lock_set!(3; (A, 0), (B, 1), (C, 2));
tuple_lock_set!(4; (A, 0), (B, 1), (C, 2), (D, 3));
tuple_lock_set!(5; (A, 0), (B, 1), (C, 2), (D, 3), (E, 4));
tuple_lock_set!(6; (A, 0), (B, 1), (C, 2), (D, 3), (E, 4), (F, 5));
tuple_lock_set!(7; (A, 0), (B, 1), (C, 2), (D, 3), (E, 4), (F, 5), (G, 6));
tuple_lock_set!(8; (A, 0), (B, 1), (C, 2), (D, 3), (E, 4), (F, 5), (G, 6), (H, 7));
tuple_lock_set!(9; (A, 0), (B, 1), (C, 2), (D, 3), (E, 4), (F, 5), (G, 6), (H, 7), (I, 8));
tuple_lock_set!(10; (A, 0), (B, 1), (C, 2), (D, 3), (E, 4), (F, 5), (G, 6), (H, 7), (I, 8), (J, 9));
tuple_lock_set!(11; (A, 0), (B, 1), (C, 2), (D, 3), (E, 4), (F, 5), (G, 6), (H, 7), (I, 8), (J, 9), (K, 10));
tuple_lock_set!(12; (A, 0), (B, 1), (C, 2), (D, 3), (E, 4), (F, 5), (G, 6), (H, 7), (I, 8), (J, 9), (K, 10), (L, 11));

impl<L: Lockable, const N: usize> sealed::Sealed for [L; N] {}

impl<L: Lockable, const N: usize> RawLocks for [L; N] {
    #[inline]
    fn count(&self) -> usize {
        N
    }

    #[inline]
    fn raw_at(&self, index: usize) -> &RawMutex {
        self[index].raw_mutex()
    }
}

impl<L: Lockable, const N: usize> LockSet for [L; N] {
    type Ref<'g> = [&'g L::Target; N] where Self: 'g;
    type Mut<'g> = [&'g mut L::Target; N] where Self: 'g;

    unsafe fn data<'g>(&'g self) -> Self::Ref<'g> {
        // SAFETY: the caller holds every lock in the set.
        core::array::from_fn(|index| unsafe { &*self[index].data_ptr() })
    }

    unsafe fn data_mut<'g>(&'g self) -> Self::Mut<'g> {
        // SAFETY: the caller holds every lock and the cells are distinct.
        core::array::from_fn(|index| unsafe { &mut *self[index].data_ptr() })
    }
}

impl<L: Lockable> sealed::Sealed for Vec<L> {}

impl<L: Lockable> RawLocks for Vec<L> {
    #[inline]
    fn count(&self) -> usize {
        self.len()
    }

    #[inline]
    fn raw_at(&self, index: usize) -> &RawMutex {
        self[index].raw_mutex()
    }
}

impl<L: Lockable> LockSet for Vec<L> {
    type Ref<'g> = Vec<&'g L::Target> where Self: 'g;
    type Mut<'g> = Vec<&'g mut L::Target> where Self: 'g;

    unsafe fn data<'g>(&'g self) -> Self::Ref<'g> {
        // SAFETY: the caller holds every lock in the set.
        self.iter().map(|cell| unsafe { &*cell.data_ptr() }).collect()
    }

    unsafe fn data_mut<'g>(&'g self) -> Self::Mut<'g> {
        // SAFETY: the caller holds every lock and the cells are distinct.
        self.iter().map(|cell| unsafe { &mut *cell.data_ptr() }).collect()
    }
}
