//! Ambient support crate: logging, the critical-section primitive, and the
//! optional wake-lock — the infrastructure the scheduling engine and its
//! host-loop shim are built on top of, kept separate so either can be reused
//! without pulling in the other.

#![no_std]
#[cfg(test)]
extern crate std;

pub mod critical;
pub mod klog;

#[cfg(feature = "wake-lock")]
pub mod wake_lock;

pub use critical::{CriticalGuard, Protected, ProtectedGuard};
pub use klog::{KlogLevel, klog_get_level, klog_is_enabled, klog_register_backend, klog_set_level};

#[cfg(feature = "wake-lock")]
pub use wake_lock::{WakeLockGuard, wake_lock_count, wake_lock_held};
