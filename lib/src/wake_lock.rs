//! Recursive wake-lock, gated behind the `wake-lock` feature.
//!
//! Any number of callers may hold the lock concurrently; the platform is
//! permitted to enter a low-power suspend only while the count is zero.
//! Pairs the counter with an RAII [`WakeLockGuard`] so a caller can no
//! longer forget to release what it took.

use core::sync::atomic::{AtomicU32, Ordering};

use crate::klog_warn;

static HOLD_COUNT: AtomicU32 = AtomicU32::new(0);

/// Raises the hold count. Prefer [`WakeLockGuard::acquire`] over calling this
/// directly — it exists for integrators that must hold across a scope this
/// crate's RAII guard cannot span (e.g. released from a different stack).
pub fn wake_lock_acquire() {
    HOLD_COUNT.fetch_add(1, Ordering::SeqCst);
}

/// Lowers the hold count. Saturates at zero: an unpaired release is logged
/// and otherwise ignored rather than wrapping the counter around.
pub fn wake_lock_release() {
    let prev = HOLD_COUNT.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |c| {
        if c == 0 {
            None
        } else {
            Some(c - 1)
        }
    });
    if prev.is_err() {
        klog_warn!("wake_lock: release with no matching acquire");
    }
}

/// True while at least one hold is outstanding; the platform must not
/// suspend in this state.
pub fn wake_lock_held() -> bool {
    HOLD_COUNT.load(Ordering::SeqCst) != 0
}

pub fn wake_lock_count() -> u32 {
    HOLD_COUNT.load(Ordering::SeqCst)
}

/// RAII token: acquires on construction, releases on drop.
#[must_use = "the hold ends as soon as this guard is dropped"]
pub struct WakeLockGuard {
    _private: (),
}

impl WakeLockGuard {
    pub fn acquire() -> Self {
        wake_lock_acquire();
        Self { _private: () }
    }
}

impl Drop for WakeLockGuard {
    fn drop(&mut self) {
        wake_lock_release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Shares the module's process-wide counter across assertions, so this
    // runs as a single test to avoid interference from parallel test threads.
    #[test]
    fn test_nested_guards_and_unpaired_release() {
        assert!(!wake_lock_held());
        assert_eq!(wake_lock_count(), 0);
        {
            let _outer = WakeLockGuard::acquire();
            assert!(wake_lock_held());
            assert_eq!(wake_lock_count(), 1);
            {
                let _inner = WakeLockGuard::acquire();
                assert_eq!(wake_lock_count(), 2);
            }
            assert_eq!(wake_lock_count(), 1);
        }
        assert!(!wake_lock_held());

        // An unpaired release saturates at zero instead of underflowing.
        wake_lock_release();
        assert_eq!(wake_lock_count(), 0);
    }
}
