//! Parking on the lock word.
//!
//! Linux uses the futex syscall, Windows uses `WaitOnAddress`. Every other
//! target (and loom) falls back to yielding, which callers tolerate because
//! a wait is always allowed to return spuriously.

use crate::cfg::atomic::AtomicU32;

/// Blocks the current thread while `word` still holds `expected`.
///
/// May return spuriously; callers re-check the word in a loop.
#[cfg(all(target_os = "linux", not(all(loom, test))))]
#[inline]
pub(crate) fn wait(word: &AtomicU32, expected: u32) {
    // SAFETY: `AtomicU32` has the same in-memory representation as `u32`,
    // the address stays valid for the whole call and a null timeout means
    // "wait until woken".
    unsafe {
        libc::syscall(
            libc::SYS_futex,
            (word as *const AtomicU32).cast::<u32>(),
            libc::FUTEX_WAIT | libc::FUTEX_PRIVATE_FLAG,
            expected,
            core::ptr::null::<libc::timespec>(),
        );
    }
}

/// Wakes at most one thread parked on `word`.
#[cfg(all(target_os = "linux", not(all(loom, test))))]
#[inline]
pub(crate) fn wake_one(word: &AtomicU32) {
    // SAFETY: FUTEX_WAKE only uses the address as a key.
    unsafe {
        libc::syscall(
            libc::SYS_futex,
            (word as *const AtomicU32).cast::<u32>(),
            libc::FUTEX_WAKE | libc::FUTEX_PRIVATE_FLAG,
            1,
        );
    }
}

#[cfg(all(windows, not(all(loom, test))))]
#[inline]
pub(crate) fn wait(word: &AtomicU32, expected: u32) {
    use windows_sys::Win32::System::Threading::WaitOnAddress;

    // SAFETY: both pointers are valid for `size_of::<u32>()` bytes for the
    // duration of the call.
    unsafe {
        WaitOnAddress(
            (word as *const AtomicU32).cast(),
            (&expected as *const u32).cast(),
            core::mem::size_of::<u32>(),
            u32::MAX,
        );
    }
}

#[cfg(all(windows, not(all(loom, test))))]
#[inline]
pub(crate) fn wake_one(word: &AtomicU32) {
    use windows_sys::Win32::System::Threading::WakeByAddressSingle;

    // SAFETY: the address is only used as a key.
    unsafe {
        WakeByAddressSingle((word as *const AtomicU32).cast());
    }
}

#[cfg(any(all(loom, test), not(any(target_os = "linux", windows))))]
#[inline]
pub(crate) fn wait(word: &AtomicU32, expected: u32) {
    let _ = (word, expected);
    #[cfg(all(loom, test))]
    loom::thread::yield_now();
    #[cfg(not(all(loom, test)))]
    std::thread::yield_now();
}

#[cfg(any(all(loom, test), not(any(target_os = "linux", windows))))]
#[inline]
pub(crate) fn wake_one(word: &AtomicU32) {
    let _ = word;
}
