//! Synchronization Gate
//!
//! Two independent monitors drive the poller:
//! - the wake monitor interrupts the poller's sleep (forced refresh, stop)
//! - the cycle monitor counts started/completed cycles and broadcasts
//!   every completion to all waiting callers
//!
//! A caller never holds one monitor while acquiring the other, so forcing
//! a wake-up cannot block the poller from signalling completion.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
struct WakeState {
    /// A forced refresh is waiting to be picked up
    pending: bool,
    /// Stop requested; permanent
    done: bool,
}

#[derive(Debug, Default)]
struct CycleState {
    started: u64,
    completed: u64,
    /// Poller has exited; nobody will complete another cycle
    stopped: bool,
}

/// Wake-up and cycle-completion signalling between callers and the poller.
#[derive(Debug, Default)]
pub struct SyncGate {
    wake: Mutex<WakeState>,
    wake_cv: Condvar,
    cycles: Mutex<CycleState>,
    cycle_cv: Condvar,
}

impl SyncGate {
    /// Create a gate with no cycles run yet.
    pub fn new() -> Self {
        Self::default()
    }

    fn wake_state(&self) -> MutexGuard<'_, WakeState> {
        self.wake.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn cycle_state(&self) -> MutexGuard<'_, CycleState> {
        self.cycles.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ==================== Caller side ====================

    /// Wake the poller and block until a cycle that started after this
    /// call has completed.
    ///
    /// Returns early, without error, if the poller has stopped.
    pub fn force_refresh_and_wait(&self) {
        let target = {
            let cycles = self.cycle_state();
            if cycles.stopped {
                return;
            }
            cycles.started + 1
        };

        self.wake();

        let mut cycles = self.cycle_state();
        while cycles.completed < target && !cycles.stopped {
            cycles = self
                .cycle_cv
                .wait(cycles)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Cut the poller's current or next sleep short.
    pub fn wake(&self) {
        let mut wake = self.wake_state();
        wake.pending = true;
        self.wake_cv.notify_all();
    }

    /// Ask the poller to exit. Permanent.
    pub fn request_stop(&self) {
        let mut wake = self.wake_state();
        wake.done = true;
        self.wake_cv.notify_all();
    }

    /// Whether a stop has been requested.
    pub fn stop_requested(&self) -> bool {
        self.wake_state().done
    }

    /// Number of completed poll cycles.
    pub fn cycles_completed(&self) -> u64 {
        self.cycle_state().completed
    }

    /// Whether the poller has exited.
    pub fn is_stopped(&self) -> bool {
        self.cycle_state().stopped
    }

    // ==================== Poller side ====================

    /// Record the start of a cycle.
    pub fn begin_cycle(&self) -> u64 {
        let mut cycles = self.cycle_state();
        cycles.started += 1;
        cycles.started
    }

    /// Record the end of a cycle and release every waiter it satisfies.
    pub fn complete_cycle(&self) {
        let mut cycles = self.cycle_state();
        cycles.completed += 1;
        self.cycle_cv.notify_all();
    }

    /// Record that the poller has exited and release all waiters.
    pub fn mark_stopped(&self) {
        let mut cycles = self.cycle_state();
        cycles.stopped = true;
        self.cycle_cv.notify_all();
    }

    /// Sleep until `timeout` elapses, a wake-up arrives or a stop is requested.
    ///
    /// Returns true if the poller should exit.
    pub fn sleep(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut wake = self.wake_state();
        loop {
            if wake.done {
                return true;
            }
            if wake.pending {
                wake.pending = false;
                return false;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            let (next, _) = self
                .wake_cv
                .wait_timeout(wake, deadline - now)
                .unwrap_or_else(PoisonError::into_inner);
            wake = next;
        }
    }
}
