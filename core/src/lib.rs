//! A timeline-based deferred-action scheduler for embedded/tickless systems.
//!
//! [`ActionScheduler`] holds a fixed-capacity pool of pending actions ordered
//! by expiry, each stored with its delay relative to the previous node so
//! that [`ActionScheduler::next_event_delay`] is a single read rather than a
//! walk. [`shim::HostLoop`] layers the absolute-time ("schedule N ms from
//! now") convenience and the proceed/suspend main-loop cadence on top.
//!
//! The critical-section primitive this crate depends on lives in
//! [`actsched_lib`] and must be registered by the host application before
//! scheduling anything from interrupt context; see
//! [`actsched_lib::critical`].

#![no_std]
#[cfg(test)]
extern crate std;

mod slot;

pub mod engine;
pub mod error;
pub mod handle;
pub mod outcome;
pub mod shim;

pub use engine::{ActionScheduler, DefaultActionScheduler, DEFAULT_CAPACITY};
pub use error::{ScheduleError, ScheduleResult};
pub use handle::ActionHandle;
pub use outcome::ActionOutcome;
pub use shim::{HostLoop, MIN_SUSPEND_MS, SuspendBackend, SuspendHook, SystemClock, wake_lock};
pub use slot::ActionCallback;
