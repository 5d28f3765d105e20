//! Which value types a [`GuardedCell`](crate::GuardedCell) may own.
//!
//! A lock only earns its keep when the value behind it can change. Three kinds
//! of types are therefore rejected at compile time:
//!
//! - shared references, which cannot be mutated through:
//!
//! ```compile_fail
//! use guarded::GuardedCell;
//!
//! static ANSWER: i32 = 42;
//! let cell = GuardedCell::new(&ANSWER);
//! ```
//!
//! - types that already synchronize themselves:
//!
//! ```compile_fail
//! use std::sync::atomic::AtomicUsize;
//! use guarded::GuardedCell;
//!
//! let cell = GuardedCell::new(AtomicUsize::new(0));
//! ```
//!
//! - another `GuardedCell`:
//!
//! ```compile_fail
//! use guarded::GuardedCell;
//!
//! let cell = GuardedCell::new(GuardedCell::new(1));
//! ```
//!
//! Containers are guardable only when their elements are, so the same rules
//! hold one level down:
//!
//! ```compile_fail
//! use guarded::GuardedCell;
//!
//! let cell = GuardedCell::new(Box::new(GuardedCell::new(1)));
//! ```
//!
//! ```compile_fail
//! use std::sync::atomic::AtomicUsize;
//! use guarded::GuardedCell;
//!
//! let cell = GuardedCell::new(vec![AtomicUsize::new(0)]);
//! ```
//!
//! ```compile_fail
//! use guarded::GuardedCell;
//!
//! let cell = GuardedCell::new(vec![GuardedCell::new(1_u8)]);
//! ```
//!
//! Raw pointers are accepted whatever they point to: they grant no access
//! without `unsafe`.
//!
//! Your own types opt in with an empty impl:
//!
//! ```
//! use guarded::{Guardable, GuardedCell};
//!
//! struct Account {
//!     balance: u64,
//! }
//!
//! impl Guardable for Account {}
//!
//! let account = GuardedCell::new(Account { balance: 10 });
//! account.lock().balance += 5;
//! assert_eq!(account.lock().balance, 15);
//! ```
//!
//! The same goes for your own trait objects (`impl Guardable for dyn MyTrait {}`),
//! which makes `Box<dyn MyTrait>` guardable. Types from other crates need a
//! newtype. Downstream crates cannot implement `Guardable` for `GuardedCell<_>`:
//! both the trait and the type are foreign to them.

use std::borrow::Cow;
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet, BinaryHeap, HashMap, HashSet, LinkedList, VecDeque};
use std::ffi::{OsStr, OsString};
use std::fs::File;
use std::num::Wrapping;
use std::path::{Path, PathBuf};
use std::rc::{self, Rc};
use std::sync::{self, Arc};
use std::time::{Duration, Instant, SystemTime};

/// Marker for value types that may be owned by a [`GuardedCell`](crate::GuardedCell).
///
/// See the [module documentation](self) for what is excluded and why.
pub trait Guardable {}

macro_rules! guardable {
    ($($ty:ty),* $(,)?) => {
        $(impl Guardable for $ty {})*
    };
}

guardable!(
    (),
    bool,
    char,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    f32,
    f64,
    str,
    String,
    OsStr,
    OsString,
    Path,
    PathBuf,
    File,
    Duration,
    Instant,
    SystemTime,
);

impl<T: ?Sized> Guardable for *mut T {}
impl<T: ?Sized> Guardable for *const T {}

impl<T: ?Sized + Guardable> Guardable for &mut T {}
impl<T: ?Sized + Guardable> Guardable for Box<T> {}
impl<T: ?Sized + Guardable> Guardable for Rc<T> {}
impl<T: ?Sized + Guardable> Guardable for rc::Weak<T> {}
impl<T: ?Sized + Guardable> Guardable for Arc<T> {}
impl<T: ?Sized + Guardable> Guardable for sync::Weak<T> {}
impl<T: ?Sized + Guardable> Guardable for Cell<T> {}
impl<T: ?Sized + Guardable> Guardable for RefCell<T> {}

impl<B> Guardable for Cow<'_, B>
where
    B: ?Sized + ToOwned + Guardable,
    B::Owned: Guardable,
{
}

impl<T: Guardable> Guardable for [T] {}
impl<T: Guardable, const N: usize> Guardable for [T; N] {}
impl<T: Guardable> Guardable for Vec<T> {}
impl<T: Guardable> Guardable for VecDeque<T> {}
impl<T: Guardable> Guardable for LinkedList<T> {}
impl<T: Guardable> Guardable for BinaryHeap<T> {}
impl<T: Guardable> Guardable for BTreeSet<T> {}
impl<K: Guardable, V: Guardable> Guardable for BTreeMap<K, V> {}
impl<T: Guardable, S> Guardable for HashSet<T, S> {}
impl<K: Guardable, V: Guardable, S> Guardable for HashMap<K, V, S> {}

impl<T: Guardable> Guardable for Option<T> {}
impl<T: Guardable, E: Guardable> Guardable for Result<T, E> {}
impl<T: Guardable> Guardable for Wrapping<T> {}

macro_rules! guardable_tuple {
    ($($name:ident),+) => {
        impl<$($name: Guardable),+> Guardable for ($($name,)+) {}
    };
}

guardable_tuple!(A);
guardable_tuple!(A, B);
guardable_tuple!(A, B, C);
guardable_tuple!(A, B, C, D);
guardable_tuple!(A, B, C, D, E);
guardable_tuple!(A, B, C, D, E, F);
guardable_tuple!(A, B, C, D, E, F, G);
guardable_tuple!(A, B, C, D, E, F, G, H);
guardable_tuple!(A, B, C, D, E, F, G, H, I);
guardable_tuple!(A, B, C, D, E, F, G, H, I, J);
guardable_tuple!(A, B, C, D, E, F, G, H, I, J, K);
guardable_tuple!(A, B, C, D, E, F, G, H, I, J, K, L);

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_guardable<T: Guardable + ?Sized>() {}

    trait Shape {}
    impl Guardable for dyn Shape + Send {}

    #[test]
    fn test_common_types_are_guardable() {
        assert_guardable::<i32>();
        assert_guardable::<String>();
        assert_guardable::<Vec<String>>();
        assert_guardable::<HashMap<String, u64>>();
        assert_guardable::<Option<(u8, String)>>();
        assert_guardable::<[u64; 4]>();
        assert_guardable::<RefCell<Vec<u8>>>();
        assert_guardable::<*mut Vec<i32>>();
    }

    #[test]
    fn test_mutable_wrappers_are_guardable() {
        assert_guardable::<Result<i32, String>>();
        assert_guardable::<Rc<u8>>();
        assert_guardable::<rc::Weak<Vec<u8>>>();
        assert_guardable::<sync::Weak<str>>();
        assert_guardable::<&'static mut Vec<u8>>();
        assert_guardable::<Cow<'static, str>>();
        assert_guardable::<Cow<'static, [u8]>>();
        assert_guardable::<Box<Path>>();
        assert_guardable::<File>();
        assert_guardable::<(u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, String)>();
    }

    #[test]
    fn test_trait_objects_opt_in() {
        assert_guardable::<Box<dyn Shape + Send>>();
    }
}
