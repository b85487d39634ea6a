//! Convenience error type layered on top of the raw sentinel/bool contract.
//!
//! The engine's own entry points never panic and never need an error type —
//! failure is a sentinel handle or a `false` return. This type exists purely
//! for callers who would rather use `?` than check a sentinel by hand.

use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleError {
    /// The pool has no free slot.
    Full,
    /// Retained for readers porting call sites that used to pass a null
    /// function pointer; the `fn` callback type used by this crate's safe
    /// API cannot itself be null, so this variant is unreachable in practice.
    NullCallback,
}

impl fmt::Display for ScheduleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full => write!(f, "action scheduler pool is full"),
            Self::NullCallback => write!(f, "callback must not be null"),
        }
    }
}

pub type ScheduleResult<T> = Result<T, ScheduleError>;
