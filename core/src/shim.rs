//! Absolute-time scheduling shim and host main loop.
//!
//! The engine only ever sees relative deltas from its own timeline head. A
//! caller that wants to schedule "10ms from *now*" rather than "10ms from
//! whatever the head currently says" needs to add the time that has already
//! elapsed since the engine's last `proceed` — that's [`head_duration`] below
//! — before calling into the engine. [`HostLoop`] bundles that shim together
//! with the proceed/suspend main-loop cadence described in the module specification.
//!
//! The platform collaborators this needs — a clock pair and a low-power
//! suspend primitive — are abstracted as [`SystemClock`] and
//! [`SuspendBackend`] traits rather than hardwired, the same way the
//! critical-section primitive is a registered backend rather than a direct
//! dependency.

use core::sync::atomic::{AtomicBool, AtomicPtr, Ordering};

use actsched_lib::critical::{CriticalGuard, Protected};
#[cfg(feature = "wake-lock")]
use actsched_lib::wake_lock;
#[cfg(not(feature = "wake-lock"))]
use actsched_lib::klog_warn;

use crate::engine::ActionScheduler;
use crate::handle::ActionHandle;
use crate::slot::ActionCallback;

/// Reads the two clocks the host loop needs: a monotonic millisecond tick
/// (paused while the CPU is suspended, but fine-grained while awake) and an
/// RTC-derived wall-clock millisecond reading (keeps advancing through
/// suspend, coarser while awake).
pub trait SystemClock {
    /// Monotonic milliseconds since some unspecified epoch. Must not go
    /// backwards, but may pause across a suspend.
    fn monotonic_ms(&self) -> u32;
    /// RTC-derived wall milliseconds. Keeps advancing while the platform is
    /// suspended, where the monotonic tick does not.
    fn rtc_ms(&self) -> u32;
}

/// The platform's low-power suspend primitive.
pub trait SuspendBackend {
    /// Arms a wake timer for approximately `delay_ms`, clamped to whatever
    /// range the hardware alarm supports, and returns the delay actually
    /// armed.
    fn arm_wake_timer(&self, delay_ms: u32) -> u32;
    /// Enters the platform's low-power mode. Returns once woken, whether by
    /// the armed timer or some other interrupt.
    fn enter_low_power(&self);
    /// Disarms the wake timer armed by [`arm_wake_timer`](Self::arm_wake_timer).
    fn disarm_wake_timer(&self);
}

/// Below this many milliseconds, suspending is not worth the fixed overhead
/// of entering and leaving low-power mode, so [`HostLoop::loop_once`] skips
/// it and busy-waits instead.
pub const MIN_SUSPEND_MS: u32 = 2;

/// Overridable hook invoked immediately before/after a suspend attempt.
/// Defaults to a no-op; register one with
/// [`HostLoop::set_pre_suspend_hook`] / [`set_post_suspend_hook`](HostLoop::set_post_suspend_hook).
pub type SuspendHook = fn();

fn noop_hook() {}

/// Logs a suspend abort: the critical-section recheck in [`HostLoop::try_suspend`]
/// found a sooner event than the one the caller measured `delay_ms` against.
/// Compiled out entirely without `debug-print`.
#[cfg(feature = "debug-print")]
fn log_suspend_abort(delay_ms: u32) {
    actsched_lib::klog_debug!("suspend aborted: a sooner event is now due within {delay_ms}ms");
}

#[cfg(not(feature = "debug-print"))]
fn log_suspend_abort(_delay_ms: u32) {}

struct HostLoopState {
    prev_monotonic_ms: u32,
    prev_rtc_ms: u32,
    /// Whether the previous iteration suspended the CPU. Controls whether
    /// this iteration measures elapsed time from the monotonic tick (didn't
    /// suspend, finer resolution) or the RTC (did suspend, since the
    /// monotonic tick counter pauses across suspend on this platform).
    last_suspended: bool,
}

/// Drives [`ActionScheduler::proceed`] once per iteration and, between
/// iterations, suspends the platform for exactly as long as
/// [`ActionScheduler::next_event_delay`] reports is safe.
pub struct HostLoop<'a, const CAPACITY: usize, C, S> {
    engine: &'a ActionScheduler<CAPACITY>,
    clock: C,
    suspend_backend: S,
    state: Protected<HostLoopState>,
    suspend_enabled: AtomicBool,
    pre_suspend_hook: AtomicPtr<()>,
    post_suspend_hook: AtomicPtr<()>,
}

impl<'a, const CAPACITY: usize, C, S> HostLoop<'a, CAPACITY, C, S>
where
    C: SystemClock,
    S: SuspendBackend,
{
    /// Builds a host loop bound to `engine`, sampling `clock` once to seed
    /// the "previous iteration" timestamps. Suspend is disabled by default;
    /// call [`set_suspend_enable`](Self::set_suspend_enable) to turn it on.
    pub fn new(engine: &'a ActionScheduler<CAPACITY>, clock: C, suspend_backend: S) -> Self {
        let prev_monotonic_ms = clock.monotonic_ms();
        let prev_rtc_ms = clock.rtc_ms();
        Self {
            engine,
            clock,
            suspend_backend,
            state: Protected::new(HostLoopState {
                prev_monotonic_ms,
                prev_rtc_ms,
                last_suspended: false,
            }),
            suspend_enabled: AtomicBool::new(false),
            pre_suspend_hook: AtomicPtr::new(core::ptr::null_mut()),
            post_suspend_hook: AtomicPtr::new(core::ptr::null_mut()),
        }
    }

    /// Enables or disables the suspend step of [`loop_once`](Self::loop_once).
    /// Off by default, and forced off regardless of this setting whenever a
    /// wake lock is held (`wake-lock` feature only).
    pub fn set_suspend_enable(&self, enable: bool) {
        self.suspend_enabled.store(enable, Ordering::Relaxed);
    }

    /// Registers the hook run immediately before a suspend attempt, even one
    /// that is ultimately skipped or aborted.
    pub fn set_pre_suspend_hook(&self, hook: SuspendHook) {
        self.pre_suspend_hook
            .store(hook as *mut (), Ordering::Release);
    }

    /// Registers the hook run immediately after a suspend attempt.
    pub fn set_post_suspend_hook(&self, hook: SuspendHook) {
        self.post_suspend_hook
            .store(hook as *mut (), Ordering::Release);
    }

    /// Schedules `callback` to fire `delay_ms` from **now** (wall time), not
    /// from the engine's current timeline head. Converts via
    /// [`head_duration`](Self::head_duration) before delegating to
    /// [`ActionScheduler::schedule`].
    pub fn schedule_now(&self, delay_ms: u32, callback: ActionCallback, arg: usize) -> ActionHandle {
        self.schedule_now_with_reload(delay_ms, delay_ms, callback, arg)
    }

    /// As [`schedule_now`](Self::schedule_now), with a distinct reload delay.
    pub fn schedule_now_with_reload(
        &self,
        delay_ms: u32,
        reload_ms: u32,
        callback: ActionCallback,
        arg: usize,
    ) -> ActionHandle {
        let head_duration = self.head_duration();
        self.engine.schedule_with_reload(
            head_duration.saturating_add(delay_ms),
            reload_ms,
            callback,
            arg,
        )
    }

    /// Cancels `handle`. Delegates to [`ActionScheduler::unschedule`].
    pub fn unschedule(&self, handle: &mut ActionHandle) -> bool {
        self.engine.unschedule(handle)
    }

    /// Removes every action carrying `callback`. Delegates to
    /// [`ActionScheduler::unschedule_all`].
    pub fn unschedule_all(&self, callback: ActionCallback) -> bool {
        self.engine.unschedule_all(callback)
    }

    /// Milliseconds elapsed since the last sync point (the last
    /// [`loop_once`](Self::loop_once) call) that the engine does not yet
    /// know about, because they haven't been folded into a `proceed` call.
    /// Adding this to a relative delay converts "from now" into "from the
    /// timeline head", the form the engine understands.
    ///
    /// Uses the RTC delta when the last iteration suspended — the monotonic
    /// tick pauses across suspend, so a caller schedule_now-ing from a
    /// post-wake interrupt would otherwise measure against a clock that
    /// never moved while asleep.
    fn head_duration(&self) -> u32 {
        let now_mono = self.clock.monotonic_ms();
        let now_rtc = self.clock.rtc_ms();
        let (prev_mono, prev_rtc, was_suspended) = {
            let st = self.state.lock();
            (st.prev_monotonic_ms, st.prev_rtc_ms, st.last_suspended)
        };
        let since_sync = if was_suspended {
            now_rtc.wrapping_sub(prev_rtc)
        } else {
            now_mono.wrapping_sub(prev_mono)
        };
        since_sync.saturating_sub(self.engine.proceeding_time())
    }

    /// Runs one iteration: measure elapsed time, proceed the engine, sync
    /// the clock bookkeeping, and — if enabled and no wake lock is held —
    /// suspend until the next event is due.
    pub fn loop_once(&self) {
        let now_mono = self.clock.monotonic_ms();
        let now_rtc = self.clock.rtc_ms();

        let (prev_mono, prev_rtc, was_suspended) = {
            let st = self.state.lock();
            (st.prev_monotonic_ms, st.prev_rtc_ms, st.last_suspended)
        };

        let elapsed = if was_suspended {
            now_rtc.wrapping_sub(prev_rtc)
        } else {
            now_mono.wrapping_sub(prev_mono)
        };

        self.engine.proceed(elapsed);

        {
            let _cs = CriticalGuard::enter();
            let mut st = self.state.lock();
            st.prev_monotonic_ms = now_mono;
            st.prev_rtc_ms = now_rtc;
            self.engine.clear_proceeding_time();
        }

        let suspended = if self.suspend_enabled.load(Ordering::Relaxed) && !wake_locked() {
            let delay = self.engine.next_event_delay();
            self.try_suspend(delay)
        } else {
            false
        };
        self.state.lock().last_suspended = suspended;
    }

    /// Attempts to suspend for `delay_ms`. Returns whether a sleep actually
    /// happened — `false` if `delay_ms` was below [`MIN_SUSPEND_MS`], or if
    /// an interrupt scheduled something sooner between the caller's earlier
    /// [`next_event_delay`](ActionScheduler::next_event_delay) query and the
    /// critical-section recheck here (a **suspend abort**).
    fn try_suspend(&self, delay_ms: u32) -> bool {
        if delay_ms < MIN_SUSPEND_MS {
            return false;
        }

        self.call_hook(&self.pre_suspend_hook);

        let suspended = {
            let _cs = CriticalGuard::enter();
            // Re-check: something may have scheduled a sooner event between
            // the caller's query and this critical section.
            if self.engine.next_event_delay() < delay_ms {
                log_suspend_abort(delay_ms);
                false
            } else {
                self.suspend_backend.arm_wake_timer(delay_ms);
                self.suspend_backend.enter_low_power();
                self.suspend_backend.disarm_wake_timer();
                true
            }
        };

        self.call_hook(&self.post_suspend_hook);
        suspended
    }

    fn call_hook(&self, slot: &AtomicPtr<()>) {
        let ptr = slot.load(Ordering::Acquire);
        let hook: SuspendHook = if ptr.is_null() {
            noop_hook
        } else {
            // SAFETY: only ever stored by `set_pre_suspend_hook` /
            // `set_post_suspend_hook` with a valid `SuspendHook`.
            unsafe { core::mem::transmute(ptr) }
        };
        hook();
    }
}

#[cfg(feature = "wake-lock")]
fn wake_locked() -> bool {
    wake_lock::wake_lock_held()
}

#[cfg(not(feature = "wake-lock"))]
fn wake_locked() -> bool {
    false
}

/// Raw, non-RAII wake-lock toggle for callers that can't use guard scoping.
/// Prefer [`actsched_lib::wake_lock::WakeLockGuard`] in new code — an
/// unpaired `wake_lock(false)` here saturates at zero and logs rather than
/// panicking, but still relies on the caller to balance it.
#[cfg(feature = "wake-lock")]
pub fn wake_lock(hold: bool) {
    if hold {
        wake_lock::wake_lock_acquire();
    } else {
        wake_lock::wake_lock_release();
    }
}

#[cfg(not(feature = "wake-lock"))]
pub fn wake_lock(_hold: bool) {
    klog_warn!("wake_lock: called with the `wake-lock` feature disabled, ignoring");
}
