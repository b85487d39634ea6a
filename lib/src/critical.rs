//! Critical-section primitive.
//!
//! The engine depends on a `scoped_acquire` style guarantee: while held on
//! the main execution context, no interrupt can invoke an engine operation.
//! The concrete enter/exit pair (disable/restore interrupts on bare metal,
//! a no-op pair in a hosted test build) is supplied by the host application
//! through [`register_backend`], the same pointer-registration shape this
//! crate's [`klog`](crate::klog) module uses for its logging sink.
//!
//! Before a backend is registered the default is a no-op pair — correct for
//! single-threaded hosted tests, but **not** a safe default for a target with
//! real interrupts. Embedded integrators must register a real backend before
//! scheduling anything from interrupt context.

use core::cell::UnsafeCell;
use core::ops::{Deref, DerefMut};
use core::sync::atomic::{AtomicPtr, Ordering};

/// Enters the critical section, returning an opaque token describing the
/// previous interrupt-enable state. Must be paired with [`ExitFn`].
pub type EnterFn = fn() -> u64;
/// Restores the interrupt-enable state captured by a matching [`EnterFn`] call.
pub type ExitFn = fn(u64);

static ENTER: AtomicPtr<()> = AtomicPtr::new(core::ptr::null_mut());
static EXIT: AtomicPtr<()> = AtomicPtr::new(core::ptr::null_mut());

/// Register the platform's enter/exit pair. Typically called once at startup.
pub fn register_backend(enter: EnterFn, exit: ExitFn) {
    ENTER.store(enter as *mut (), Ordering::Release);
    EXIT.store(exit as *mut (), Ordering::Release);
}

#[inline]
fn do_enter() -> u64 {
    let ptr = ENTER.load(Ordering::Acquire);
    if ptr.is_null() {
        return 0;
    }
    // SAFETY: only ever stored by `register_backend` with a valid `EnterFn`.
    let f: EnterFn = unsafe { core::mem::transmute(ptr) };
    f()
}

#[inline]
fn do_exit(saved: u64) {
    let ptr = EXIT.load(Ordering::Acquire);
    if ptr.is_null() {
        return;
    }
    // SAFETY: only ever stored by `register_backend` with a valid `ExitFn`.
    let f: ExitFn = unsafe { core::mem::transmute(ptr) };
    f(saved)
}

/// RAII guard for one critical-section acquisition.
///
/// Acquisitions nest: each guard independently remembers the state that was
/// current when it was created and restores exactly that state on drop, so
/// an inner guard dropping first never re-enables interrupts an outer guard
/// is still relying on having disabled.
#[must_use = "the critical section ends as soon as this guard is dropped"]
pub struct CriticalGuard {
    saved: u64,
}

impl CriticalGuard {
    #[inline]
    pub fn enter() -> Self {
        Self { saved: do_enter() }
    }
}

impl Drop for CriticalGuard {
    #[inline]
    fn drop(&mut self) {
        do_exit(self.saved);
    }
}

/// A cell whose contents may only be accessed while the critical section is held.
///
/// Mirrors an IRQ-disabling mutex, minus any cross-core ticket/spin
/// machinery: on the single-core cooperative targets this crate is built
/// for, masking interrupts is the whole of mutual exclusion.
pub struct Protected<T> {
    data: UnsafeCell<T>,
}

// SAFETY: access to `data` only ever happens through `lock()`, which holds
// the critical section (interrupts masked) for the guard's lifetime.
unsafe impl<T: Send> Sync for Protected<T> {}

pub struct ProtectedGuard<'a, T> {
    cell: &'a Protected<T>,
    _cs: CriticalGuard,
}

impl<T> Protected<T> {
    #[inline]
    pub const fn new(data: T) -> Self {
        Self {
            data: UnsafeCell::new(data),
        }
    }

    #[inline]
    pub fn lock(&self) -> ProtectedGuard<'_, T> {
        ProtectedGuard {
            cell: self,
            _cs: CriticalGuard::enter(),
        }
    }
}

impl<'a, T> Deref for ProtectedGuard<'a, T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        // SAFETY: guard holds the critical section for its whole lifetime.
        unsafe { &*self.cell.data.get() }
    }
}

impl<'a, T> DerefMut for ProtectedGuard<'a, T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut T {
        // SAFETY: guard holds the critical section for its whole lifetime.
        unsafe { &mut *self.cell.data.get() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::sync::atomic::AtomicU32;

    static NEST_DEPTH: AtomicU32 = AtomicU32::new(0);
    static MAX_DEPTH: AtomicU32 = AtomicU32::new(0);

    fn counting_enter() -> u64 {
        let depth = NEST_DEPTH.fetch_add(1, Ordering::SeqCst) + 1;
        MAX_DEPTH.fetch_max(depth, Ordering::SeqCst);
        depth as u64
    }

    fn counting_exit(_saved: u64) {
        NEST_DEPTH.fetch_sub(1, Ordering::SeqCst);
    }

    // Both assertions share process-wide statics (the registered backend and
    // its nesting counters), so they run as one test to avoid cross-test
    // interference from the harness's default parallel test threads.
    #[test]
    fn test_nested_guards_and_protected_cell() {
        register_backend(counting_enter, counting_exit);
        assert_eq!(NEST_DEPTH.load(Ordering::SeqCst), 0);
        {
            let _outer = CriticalGuard::enter();
            assert_eq!(NEST_DEPTH.load(Ordering::SeqCst), 1);
            {
                let _inner = CriticalGuard::enter();
                assert_eq!(NEST_DEPTH.load(Ordering::SeqCst), 2);
            }
            assert_eq!(NEST_DEPTH.load(Ordering::SeqCst), 1);
        }
        assert_eq!(NEST_DEPTH.load(Ordering::SeqCst), 0);
        assert!(MAX_DEPTH.load(Ordering::SeqCst) >= 2);

        let cell = Protected::new(41u32);
        {
            let mut guard = cell.lock();
            *guard += 1;
        }
        assert_eq!(*cell.lock(), 42);
    }
}
