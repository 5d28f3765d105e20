//! Switches atomics and thread hints to loom's model-checked versions when the
//! crate is built with `--cfg loom` for testing.

pub(crate) mod atomic {
    #[cfg(not(all(loom, test)))]
    pub(crate) use core::sync::atomic::{AtomicU32, Ordering};

    #[cfg(all(loom, test))]
    pub(crate) use loom::sync::atomic::{AtomicU32, Ordering};
}

pub(crate) mod hint {
    use crossbeam_utils::Backoff;

    /// Whether a contended lock should spin for a while before parking.
    ///
    /// Loom explores every spin iteration as a separate schedule, so the spin
    /// phase is skipped under the model checker.
    pub(crate) const SPIN_BEFORE_PARK: bool = !cfg!(all(loom, test));

    /// Backs off between two failed acquisition rounds.
    #[inline]
    pub(crate) fn snooze(backoff: &Backoff) {
        #[cfg(not(all(loom, test)))]
        backoff.snooze();

        #[cfg(all(loom, test))]
        {
            let _ = backoff;
            loom::thread::yield_now();
        }
    }
}
