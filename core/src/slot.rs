//! Pool slot representation. Not part of the public surface: callers only
//! ever see an [`ActionHandle`](crate::handle::ActionHandle).

use crate::outcome::ActionOutcome;

/// Callback invoked on expiry. An ordinary function pointer, not a boxed
/// closure — this keeps a slot `Copy`, allocation-free and `'static`,
/// matching the `void*`-arg C callback it stands in for.
pub type ActionCallback = fn(usize) -> ActionOutcome;

/// One entry in the fixed-size action pool.
///
/// `prev_idx`/`next_idx` link the slot into the active list; on either end
/// of the list the corresponding field points back at the slot's own index
/// (a "self-loop" terminator, never a dedicated sentinel value). A slot
/// is free iff `callback` is `None`.
#[derive(Clone, Copy)]
pub(crate) struct ActionSlot {
    pub callback: Option<ActionCallback>,
    pub arg: usize,
    pub delay_to_previous: u32,
    pub reload: u32,
    pub used_counter: u8,
    pub prev_idx: u8,
    pub next_idx: u8,
}

impl ActionSlot {
    pub const fn empty() -> Self {
        Self {
            callback: None,
            arg: 0,
            delay_to_previous: 0,
            reload: 0,
            used_counter: 0,
            prev_idx: 0,
            next_idx: 0,
        }
    }
}
