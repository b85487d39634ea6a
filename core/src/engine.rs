//! The scheduler engine: a fixed-capacity pool of action slots linked into a
//! relative-delta ordered list.
//!
//! Each node in the active list stores its delay **relative to the
//! predecessor node** rather than an absolute deadline. The head node's
//! `delay_to_previous` is therefore exactly the number of milliseconds until
//! the next event, which is what makes [`ActionScheduler::next_event_delay`]
//! a single array read rather than a walk. The cost is that insertion and
//! removal must repair one neighbour's delay to keep the invariant intact;
//! see [`insert_node`] and [`remove_node`] below.

use actsched_lib::critical::Protected;

use crate::error::{ScheduleError, ScheduleResult};
use crate::handle::ActionHandle;
use crate::outcome::ActionOutcome;
use crate::slot::{ActionCallback, ActionSlot};

/// Sentinel stored in `head_idx`/`tail_idx` when the active list is empty.
/// Never a valid slot index since [`ActionScheduler::new`] rejects any
/// `CAPACITY` above 254.
const NONE: u8 = u8::MAX;

/// Default pool size, suitable for most embedded targets.
pub const DEFAULT_CAPACITY: usize = 64;

/// An [`ActionScheduler`] sized the way most callers want it.
pub type DefaultActionScheduler = ActionScheduler<DEFAULT_CAPACITY>;

struct EngineInner<const CAPACITY: usize> {
    slots: [ActionSlot; CAPACITY],
    head_idx: u8,
    tail_idx: u8,
    active_count: usize,
    proceeding_time: u32,
}

impl<const CAPACITY: usize> EngineInner<CAPACITY> {
    const fn new() -> Self {
        Self {
            slots: [ActionSlot::empty(); CAPACITY],
            head_idx: NONE,
            tail_idx: NONE,
            active_count: 0,
            proceeding_time: 0,
        }
    }
}

/// A fixed-capacity timeline of pending actions.
///
/// `CAPACITY` must be in `1..=254`; a slot index plus an 8-bit generation
/// counter must fit in the 16-bit [`ActionHandle`] alongside a reserved
/// `0xffff` sentinel, which rules out 255 and 256-slot pools. Every public
/// method takes the critical section for its mutation window and is safe to
/// call from interrupt context; [`proceed`](Self::proceed) is the one
/// exception, releasing it around each callback invocation.
pub struct ActionScheduler<const CAPACITY: usize> {
    inner: Protected<EngineInner<CAPACITY>>,
}

impl<const CAPACITY: usize> ActionScheduler<CAPACITY> {
    #[allow(dead_code)]
    const CAPACITY_IN_RANGE: () = assert!(
        CAPACITY >= 1 && CAPACITY <= 254,
        "ActionScheduler CAPACITY must be in 1..=254"
    );

    /// Creates an empty scheduler. Typically stored in a single process-wide
    /// `static`, the way this codebase's network timer wheel is a singleton.
    pub const fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let _ = Self::CAPACITY_IN_RANGE;
        Self {
            inner: Protected::new(EngineInner::new()),
        }
    }

    /// Schedules a one-shot action `delay_ms` from the current timeline
    /// head. Returns [`ActionHandle::INVALID`] if the pool is full.
    pub fn schedule(&self, delay_ms: u32, callback: ActionCallback, arg: usize) -> ActionHandle {
        self.schedule_with_reload(delay_ms, delay_ms, callback, arg)
    }

    /// As [`schedule`](Self::schedule), but re-arms at `reload_ms` from the
    /// new head (instead of `delay_ms`) each time the callback returns
    /// [`ActionOutcome::Reload`].
    pub fn schedule_with_reload(
        &self,
        delay_ms: u32,
        reload_ms: u32,
        callback: ActionCallback,
        arg: usize,
    ) -> ActionHandle {
        let mut guard = self.inner.lock();
        let Some(idx) = find_free_slot(&guard) else {
            log_schedule_full(CAPACITY);
            return ActionHandle::INVALID;
        };
        let generation = guard.slots[idx as usize].used_counter.wrapping_add(1);
        guard.slots[idx as usize].callback = Some(callback);
        guard.slots[idx as usize].arg = arg;
        guard.slots[idx as usize].reload = reload_ms;
        guard.slots[idx as usize].used_counter = generation;
        insert_node(&mut guard, idx, delay_ms);
        guard.active_count += 1;
        ActionHandle::new(idx, generation)
    }

    /// [`schedule`](Self::schedule), returning a [`ScheduleError`] instead of
    /// the sentinel handle on failure.
    pub fn try_schedule(
        &self,
        delay_ms: u32,
        callback: ActionCallback,
        arg: usize,
    ) -> ScheduleResult<ActionHandle> {
        match self.schedule(delay_ms, callback, arg) {
            h if h.is_valid() => Ok(h),
            _ => Err(ScheduleError::Full),
        }
    }

    /// [`schedule_with_reload`](Self::schedule_with_reload), returning a
    /// [`ScheduleError`] instead of the sentinel handle on failure.
    pub fn try_schedule_with_reload(
        &self,
        delay_ms: u32,
        reload_ms: u32,
        callback: ActionCallback,
        arg: usize,
    ) -> ScheduleResult<ActionHandle> {
        match self.schedule_with_reload(delay_ms, reload_ms, callback, arg) {
            h if h.is_valid() => Ok(h),
            _ => Err(ScheduleError::Full),
        }
    }

    /// Cancels the action named by `handle`. Returns `false` — without
    /// touching `handle` — if it is the sentinel, out of range, already
    /// free, or stale (generation mismatch). On success zeroes `*handle`.
    ///
    /// Safe to call from inside the named action's own callback: the node
    /// is isolated at that point (see [`proceed`](Self::proceed)), so this
    /// degrades to freeing the slot without touching the list or
    /// double-counting `active_count`.
    pub fn unschedule(&self, handle: &mut ActionHandle) -> bool {
        if !handle.is_valid() {
            return false;
        }
        let slot = handle.slot() as usize;
        if slot >= CAPACITY {
            return false;
        }
        let mut guard = self.inner.lock();
        if guard.slots[slot].callback.is_none() {
            return false;
        }
        if guard.slots[slot].used_counter != handle.generation() {
            return false;
        }
        let was_linked = remove_node(&mut guard, slot as u8);
        guard.slots[slot].callback = None;
        if was_linked {
            guard.active_count -= 1;
        }
        *handle = ActionHandle::INVALID;
        true
    }

    /// Removes every active slot bearing `callback`. Returns `true` iff at
    /// least one was removed.
    pub fn unschedule_all(&self, callback: ActionCallback) -> bool {
        let mut guard = self.inner.lock();
        let mut removed_any = false;
        let mut cursor = guard.head_idx;
        let mut remaining = guard.active_count;
        while remaining > 0 {
            // Save the successor before a possible removal: `remove_node`
            // does not touch `cursor`'s own `next_idx`, but reading it from
            // a freed neighbour after the splice would be wrong regardless.
            let next = guard.slots[cursor as usize].next_idx;
            remaining -= 1;
            if guard.slots[cursor as usize].callback == Some(callback) {
                remove_node(&mut guard, cursor);
                guard.slots[cursor as usize].callback = None;
                guard.active_count -= 1;
                removed_any = true;
            }
            cursor = next;
        }
        removed_any
    }

    /// Frees every slot, zeroes every generation counter, and resets
    /// `proceeding_time`. Any handle outstanding before this call compares
    /// stale against whatever tenant later claims its slot.
    pub fn clear(&self) {
        let mut guard = self.inner.lock();
        guard.slots = [ActionSlot::empty(); CAPACITY];
        guard.head_idx = NONE;
        guard.tail_idx = NONE;
        guard.active_count = 0;
        guard.proceeding_time = 0;
    }

    /// Advances the timeline by `elapsed_ms`, firing every callback whose
    /// expiry falls within that window in deadline order. Returns `true` iff
    /// any callback fired.
    ///
    /// Each firing node is isolated from the list (self-looped, not
    /// reachable from the head) for the duration of its callback and the
    /// critical section is released across the call, so a callback may
    /// freely schedule, unschedule itself, or unschedule any other pending
    /// action without corrupting the list or deadlocking.
    pub fn proceed(&self, elapsed_ms: u32) -> bool {
        let mut remaining = elapsed_ms;
        let mut fired_any = false;
        let mut guard = self.inner.lock();

        loop {
            if guard.active_count == 0 {
                break;
            }
            let head = guard.head_idx;
            let head_delay = guard.slots[head as usize].delay_to_previous;
            if remaining < head_delay {
                break;
            }
            remaining -= head_delay;
            guard.proceeding_time += head_delay;

            let Some(callback) = guard.slots[head as usize].callback else {
                // Invariant violation: an active node without a callback.
                // Defensive stop rather than firing garbage.
                break;
            };
            let arg = guard.slots[head as usize].arg;
            let reload = guard.slots[head as usize].reload;

            if guard.active_count >= 2 {
                let succ = guard.slots[head as usize].next_idx;
                guard.slots[succ as usize].prev_idx = succ;
                guard.head_idx = succ;
            } else {
                guard.head_idx = NONE;
                guard.tail_idx = NONE;
            }
            guard.slots[head as usize].next_idx = head;
            guard.slots[head as usize].prev_idx = head;
            guard.active_count -= 1;

            drop(guard);
            let outcome = callback(arg);
            fired_any = true;
            guard = self.inner.lock();

            match outcome {
                ActionOutcome::OneShot => {
                    guard.slots[head as usize].callback = None;
                }
                ActionOutcome::Reload => {
                    // Skip re-insertion if the callback itself already
                    // freed (or rescheduled) this slot.
                    if guard.slots[head as usize].callback.is_some() {
                        insert_node(&mut guard, head, reload);
                        guard.active_count += 1;
                    }
                }
            }
        }

        if guard.active_count > 0 {
            let head = guard.head_idx;
            guard.slots[head as usize].delay_to_previous -= remaining;
            guard.proceeding_time += remaining;
        }

        fired_any
    }

    /// Milliseconds until the next due action, or `u32::MAX` if idle.
    pub fn next_event_delay(&self) -> u32 {
        let guard = self.inner.lock();
        if guard.active_count == 0 {
            u32::MAX
        } else {
            guard.slots[guard.head_idx as usize].delay_to_previous
        }
    }

    /// Milliseconds consumed so far by a `proceed` call in progress. Zero
    /// between calls (or after [`clear_proceeding_time`](Self::clear_proceeding_time)).
    pub fn proceeding_time(&self) -> u32 {
        self.inner.lock().proceeding_time
    }

    /// Resets the `proceeding_time` counter to zero.
    pub fn clear_proceeding_time(&self) {
        self.inner.lock().proceeding_time = 0;
    }

    /// True iff any slot in the pool — active list or not, since this scans
    /// the whole pool rather than just the list — carries `callback`.
    pub fn is_callback_armed(&self, callback: ActionCallback) -> bool {
        let guard = self.inner.lock();
        guard.slots.iter().any(|s| s.callback == Some(callback))
    }

    /// Number of slots currently armed.
    pub fn active_count(&self) -> usize {
        self.inner.lock().active_count
    }
}

impl<const CAPACITY: usize> Default for ActionScheduler<CAPACITY> {
    fn default() -> Self {
        Self::new()
    }
}

/// Logs a pool-full condition. Compiled out entirely without `debug-print`.
#[cfg(feature = "debug-print")]
fn log_schedule_full(capacity: usize) {
    actsched_lib::klog_warn!("action scheduler pool full (capacity {capacity}), dropping schedule request");
}

#[cfg(not(feature = "debug-print"))]
fn log_schedule_full(_capacity: usize) {}

/// Scans for a free slot starting just past the current tail, spreading
/// reuse evenly across the pool instead of always refilling low indices
/// first.
fn find_free_slot<const CAPACITY: usize>(inner: &EngineInner<CAPACITY>) -> Option<u8> {
    if inner.active_count >= CAPACITY {
        return None;
    }
    let start = if inner.tail_idx == NONE {
        0usize
    } else {
        (inner.tail_idx as usize + 1) % CAPACITY
    };
    for offset in 0..CAPACITY {
        let idx = (start + offset) % CAPACITY;
        if inner.slots[idx].callback.is_none() {
            return Some(idx as u8);
        }
    }
    None
}

/// Inserts slot `idx` (already populated with callback/arg/reload) into the
/// active list so its total distance from the head is `delay`. Does not
/// touch `active_count` — every caller increments that itself, so a single
/// helper shared by `schedule` and `proceed`'s reload path can't double-count
/// it (see the open question this resolves in `DESIGN.md`).
///
/// Equal deadlines insert after the existing node: the walk below only stops
/// once a node's delay strictly exceeds what is left of `delay`, so ties
/// fall through to "after", giving FIFO ordering among equal deadlines.
fn insert_node<const CAPACITY: usize>(inner: &mut EngineInner<CAPACITY>, idx: u8, mut delay: u32) {
    if inner.active_count == 0 {
        inner.slots[idx as usize].prev_idx = idx;
        inner.slots[idx as usize].next_idx = idx;
        inner.slots[idx as usize].delay_to_previous = delay;
        inner.head_idx = idx;
        inner.tail_idx = idx;
        return;
    }

    let mut cursor = Some(inner.head_idx);
    while let Some(c) = cursor {
        let node_delay = inner.slots[c as usize].delay_to_previous;
        if node_delay > delay {
            break;
        }
        delay -= node_delay;
        cursor = if c == inner.tail_idx {
            None
        } else {
            Some(inner.slots[c as usize].next_idx)
        };
    }

    inner.slots[idx as usize].delay_to_previous = delay;

    match cursor {
        None => {
            // Walked past the tail: back insert.
            let old_tail = inner.tail_idx;
            inner.slots[old_tail as usize].next_idx = idx;
            inner.slots[idx as usize].prev_idx = old_tail;
            inner.slots[idx as usize].next_idx = idx;
            inner.tail_idx = idx;
        }
        Some(succ) if succ == inner.head_idx => {
            // Nothing was consumed: front insert, new node becomes head.
            inner.slots[succ as usize].delay_to_previous -= delay;
            inner.slots[succ as usize].prev_idx = idx;
            inner.slots[idx as usize].prev_idx = idx;
            inner.slots[idx as usize].next_idx = succ;
            inner.head_idx = idx;
        }
        Some(succ) => {
            // Middle insert between the last-consumed node and `succ`.
            let pred = inner.slots[succ as usize].prev_idx;
            inner.slots[succ as usize].delay_to_previous -= delay;
            inner.slots[pred as usize].next_idx = idx;
            inner.slots[succ as usize].prev_idx = idx;
            inner.slots[idx as usize].prev_idx = pred;
            inner.slots[idx as usize].next_idx = succ;
        }
    }
}

/// Unlinks slot `idx` from the active list, repairing the successor's
/// `delay_to_previous` so later nodes' absolute expiries are unchanged.
///
/// Returns `false` without touching anything if `idx` is **isolated**: its
/// own callback is mid-execution (see `proceed`), `prev_idx`/`next_idx` both
/// point at itself, and it is not the current head. This is the one case
/// where unlinking would be wrong — the node was already removed from the
/// list by `proceed` before invoking the callback. Does not touch
/// `active_count`; see [`insert_node`] for why that's the caller's job.
fn remove_node<const CAPACITY: usize>(inner: &mut EngineInner<CAPACITY>, idx: u8) -> bool {
    let node = inner.slots[idx as usize];
    let self_looped = node.prev_idx == idx && node.next_idx == idx;

    if self_looped && idx != inner.head_idx {
        return false;
    }

    if self_looped {
        // Sole node in the list.
        inner.head_idx = NONE;
        inner.tail_idx = NONE;
        return true;
    }

    if idx == inner.head_idx {
        let succ = node.next_idx;
        inner.slots[succ as usize].delay_to_previous += node.delay_to_previous;
        inner.slots[succ as usize].prev_idx = succ;
        inner.head_idx = succ;
    } else if idx == inner.tail_idx {
        let pred = node.prev_idx;
        inner.slots[pred as usize].next_idx = pred;
        inner.tail_idx = pred;
    } else {
        let pred = node.prev_idx;
        let succ = node.next_idx;
        inner.slots[pred as usize].next_idx = succ;
        inner.slots[succ as usize].prev_idx = pred;
        inner.slots[succ as usize].delay_to_previous += node.delay_to_previous;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

    type TestScheduler = ActionScheduler<8>;

    static FIRE_ORDER: [AtomicU32; 16] = [
        AtomicU32::new(0),
        AtomicU32::new(0),
        AtomicU32::new(0),
        AtomicU32::new(0),
        AtomicU32::new(0),
        AtomicU32::new(0),
        AtomicU32::new(0),
        AtomicU32::new(0),
        AtomicU32::new(0),
        AtomicU32::new(0),
        AtomicU32::new(0),
        AtomicU32::new(0),
        AtomicU32::new(0),
        AtomicU32::new(0),
        AtomicU32::new(0),
        AtomicU32::new(0),
    ];
    static FIRE_COUNT: AtomicUsize = AtomicUsize::new(0);

    fn reset_fire_log() {
        FIRE_COUNT.store(0, Ordering::SeqCst);
        for slot in FIRE_ORDER.iter() {
            slot.store(0, Ordering::SeqCst);
        }
    }

    fn record_fire(arg: usize) {
        let i = FIRE_COUNT.fetch_add(1, Ordering::SeqCst);
        FIRE_ORDER[i].store(arg as u32, Ordering::SeqCst);
    }

    fn cb_oneshot(arg: usize) -> ActionOutcome {
        record_fire(arg);
        ActionOutcome::OneShot
    }

    fn cb_reload(arg: usize) -> ActionOutcome {
        record_fire(arg);
        ActionOutcome::Reload
    }

    fn cb_self_reschedule(arg: usize) -> ActionOutcome {
        record_fire(arg);
        ActionOutcome::OneShot
    }

    #[test]
    fn test_basic_ordering() {
        reset_fire_log();
        let sched = TestScheduler::new();
        sched.schedule(100, cb_oneshot, 1);
        sched.schedule(200, cb_oneshot, 2);

        assert_eq!(sched.next_event_delay(), 100);
        assert!(sched.proceed(100));
        assert_eq!(FIRE_COUNT.load(Ordering::SeqCst), 1);
        assert_eq!(FIRE_ORDER[0].load(Ordering::SeqCst), 1);
        assert_eq!(sched.next_event_delay(), 100);

        assert!(sched.proceed(100));
        assert_eq!(FIRE_COUNT.load(Ordering::SeqCst), 2);
        assert_eq!(FIRE_ORDER[1].load(Ordering::SeqCst), 2);
        assert_eq!(sched.next_event_delay(), u32::MAX);
    }

    #[test]
    fn test_unschedule_by_handle() {
        let sched = TestScheduler::new();
        let mut id1 = sched.schedule(100, cb_oneshot, 1);
        let mut id2 = sched.schedule(200, cb_oneshot, 2);

        assert!(sched.unschedule(&mut id1));
        assert!(!id1.is_valid());
        assert_eq!(sched.next_event_delay(), 200);

        assert!(sched.unschedule(&mut id2));
        assert_eq!(sched.next_event_delay(), u32::MAX);

        let mut id3 = sched.schedule(100, cb_oneshot, 3);
        // Corrupt the generation byte (high byte) of the handle.
        let mut corrupted = ActionHandle::new(id3.slot(), id3.generation() ^ 0xff);
        assert!(!sched.unschedule(&mut corrupted));
        assert_eq!(sched.next_event_delay(), 100);
        assert!(sched.unschedule(&mut id3));
    }

    #[test]
    fn test_unschedule_already_fired() {
        reset_fire_log();
        let sched = TestScheduler::new();
        let mut id = sched.schedule(100, cb_oneshot, 1);
        assert!(sched.proceed(100));
        assert!(!sched.unschedule(&mut id));
    }

    #[test]
    fn test_schedule_with_reload() {
        reset_fire_log();
        let sched = TestScheduler::new();
        sched.schedule_with_reload(100, 300, cb_reload, 1);
        assert!(sched.proceed(100));
        assert_eq!(FIRE_COUNT.load(Ordering::SeqCst), 1);
        assert_eq!(sched.next_event_delay(), 300);
    }

    #[test]
    fn test_proceeding_time_accumulation() {
        let sched = TestScheduler::new();
        sched.schedule(100, cb_oneshot, 1);

        assert!(!sched.proceed(50));
        assert_eq!(sched.proceeding_time(), 50);

        assert!(sched.proceed(50));
        assert_eq!(sched.proceeding_time(), 100);

        sched.clear_proceeding_time();
        assert_eq!(sched.proceeding_time(), 0);
    }

    #[test]
    fn test_large_fan_out() {
        reset_fire_log();
        const N: usize = 64;
        let sched: ActionScheduler<N> = ActionScheduler::new();
        for i in 0..N {
            let delay = 1 + (i as u32) * 10;
            sched.schedule(delay, cb_oneshot, i);
        }

        for i in 0..N {
            sched.proceed(10);
            assert_eq!(
                FIRE_COUNT.load(Ordering::SeqCst),
                i + 1,
                "iteration {i}: expected {} callbacks fired",
                i + 1
            );
        }

        // None fired twice: each arg 0..N appears exactly once.
        let mut seen = [false; N];
        for slot in FIRE_ORDER.iter().take(N) {
            let arg = slot.load(Ordering::SeqCst) as usize;
            assert!(!seen[arg], "arg {arg} fired more than once");
            seen[arg] = true;
        }
    }

    #[test]
    fn test_callback_self_unschedule_skips_reload() {
        reset_fire_log();
        static HANDLE: Protected<Option<ActionHandle>> = Protected::new(None);
        static SCHED: ActionScheduler<8> = ActionScheduler::new();

        fn cb(_arg: usize) -> ActionOutcome {
            let mut h = HANDLE.lock();
            if let Some(mut handle) = h.take() {
                SCHED.unschedule(&mut handle);
            }
            ActionOutcome::Reload
        }

        let handle = SCHED.schedule_with_reload(50, 300, cb, 0);
        *HANDLE.lock() = Some(handle);

        assert!(SCHED.proceed(50));
        // The callback unscheduled itself; RELOAD must not have re-armed it.
        assert!(!SCHED.is_callback_armed(cb));
        assert_eq!(SCHED.next_event_delay(), u32::MAX);
    }

    #[test]
    fn test_callback_self_reschedule() {
        reset_fire_log();
        static SCHED: ActionScheduler<8> = ActionScheduler::new();

        fn cb(_arg: usize) -> ActionOutcome {
            SCHED.schedule(50, cb_self_reschedule, 99);
            ActionOutcome::OneShot
        }

        SCHED.schedule(10, cb, 0);
        assert!(SCHED.proceed(10));
        assert_eq!(SCHED.active_count(), 1);
        assert_eq!(SCHED.next_event_delay(), 50);
    }

    #[test]
    fn test_unschedule_all() {
        reset_fire_log();
        let sched = TestScheduler::new();
        sched.schedule(100, cb_oneshot, 1);
        sched.schedule(150, cb_reload, 2);
        sched.schedule(200, cb_oneshot, 3);
        sched.schedule(250, cb_reload, 4);

        assert!(sched.unschedule_all(cb_reload));
        assert!(!sched.is_callback_armed(cb_reload));
        assert_eq!(sched.active_count(), 2);
        assert!(!sched.unschedule_all(cb_reload));
    }

    #[test]
    fn test_clear_resets_everything() {
        let sched = TestScheduler::new();
        sched.schedule(100, cb_oneshot, 1);
        sched.schedule(200, cb_oneshot, 2);
        sched.clear();
        assert_eq!(sched.active_count(), 0);
        assert_eq!(sched.next_event_delay(), u32::MAX);
        assert_eq!(sched.proceeding_time(), 0);
    }

    #[test]
    fn test_pool_full_returns_sentinel() {
        let sched: ActionScheduler<2> = ActionScheduler::new();
        let h1 = sched.schedule(10, cb_oneshot, 1);
        let h2 = sched.schedule(20, cb_oneshot, 2);
        assert!(h1.is_valid());
        assert!(h2.is_valid());
        let h3 = sched.schedule(30, cb_oneshot, 3);
        assert!(!h3.is_valid());
        assert_eq!(sched.try_schedule(30, cb_oneshot, 3), Err(ScheduleError::Full));
    }

    #[test]
    fn test_equal_deadlines_are_fifo() {
        reset_fire_log();
        let sched = TestScheduler::new();
        sched.schedule(100, cb_oneshot, 1);
        sched.schedule(100, cb_oneshot, 2);
        sched.schedule(100, cb_oneshot, 3);
        sched.proceed(100);
        assert_eq!(FIRE_COUNT.load(Ordering::SeqCst), 3);
        assert_eq!(FIRE_ORDER[0].load(Ordering::SeqCst), 1);
        assert_eq!(FIRE_ORDER[1].load(Ordering::SeqCst), 2);
        assert_eq!(FIRE_ORDER[2].load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_is_callback_armed_scans_whole_pool() {
        let sched = TestScheduler::new();
        assert!(!sched.is_callback_armed(cb_oneshot));
        sched.schedule(500, cb_oneshot, 1);
        assert!(sched.is_callback_armed(cb_oneshot));
        assert!(!sched.is_callback_armed(cb_reload));
    }

    #[test]
    fn test_proceed_combined_equals_split() {
        reset_fire_log();
        let combined = TestScheduler::new();
        combined.schedule(100, cb_oneshot, 1);
        combined.schedule(200, cb_oneshot, 2);
        combined.proceed(300);
        let combined_order = [
            FIRE_ORDER[0].load(Ordering::SeqCst),
            FIRE_ORDER[1].load(Ordering::SeqCst),
        ];

        reset_fire_log();
        let split = TestScheduler::new();
        split.schedule(100, cb_oneshot, 1);
        split.schedule(200, cb_oneshot, 2);
        split.proceed(120);
        split.proceed(180);
        let split_order = [
            FIRE_ORDER[0].load(Ordering::SeqCst),
            FIRE_ORDER[1].load(Ordering::SeqCst),
        ];

        assert_eq!(combined_order, split_order);
    }

    #[test]
    fn test_unschedule_invalid_handle() {
        let sched = TestScheduler::new();
        let mut invalid = ActionHandle::INVALID;
        assert!(!sched.unschedule(&mut invalid));
    }
}
