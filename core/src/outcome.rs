//! Callback return contract.

/// What a fired callback wants done with its own slot once it returns.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionOutcome {
    /// Free the slot. The action will not fire again unless rescheduled.
    OneShot,
    /// Re-arm the action `reload_ms` from the new timeline head, unless the
    /// callback itself already freed or rescheduled this slot while it ran.
    Reload,
}
