//! Errors reported by the checked [`MultiGuard`](crate::MultiGuard) constructors.

use core::fmt;

/// The error type for checked multi-cell acquisition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum GuardError {
    /// The same cell appears twice in one lock set.
    ///
    /// Acquiring it would never succeed, and the guard would hand out two
    /// exclusive references to the same value.
    DuplicateCell {
        /// Position of the first occurrence.
        first: usize,
        /// Position of the repeated occurrence.
        second: usize,
    },
    /// At least one cell in the set was locked elsewhere, so nothing was acquired.
    WouldBlock,
}

impl fmt::Display for GuardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateCell { first, second } => write!(
                f,
                "lock set contains the same cell twice (positions {first} and {second})"
            ),
            Self::WouldBlock => f.write_str("lock set could not be acquired without blocking"),
        }
    }
}

impl std::error::Error for GuardError {}
