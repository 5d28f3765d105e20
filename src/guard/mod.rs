//! Lock handles: [`ScopedRef`] for one cell, [`MultiGuard`] for several.

mod multi;
mod scoped;
mod set;

pub use multi::MultiGuard;
#[allow(deprecated)]
pub use scoped::unlock;
pub use scoped::ScopedRef;
pub use set::{LockSet, Lockable};
