//! Fan-out/fan-in barrier for the encode phase.
//!
//! The orchestrator arms the barrier with the number of encode tasks it is
//! about to submit, each task holds an [`ArrivalGuard`] for its whole run,
//! and the orchestrator blocks in [`TickBarrier::wait`] until every guard
//! has dropped. Arrival-on-drop is the load-bearing part: a task that
//! panics mid-encode still arrives while unwinding, so one bad observer can
//! never wedge the tick for everyone else.
//!
//! The barrier is reusable; re-arming it resets the count for the next
//! tick. Re-arming while arrivals are outstanding means a task from the
//! previous tick is still running, which breaks the tick's join contract
//! and panics.

use parking_lot::{Condvar, Mutex};

struct BarrierState {
    registered: usize,
    arrived: usize,
}

pub struct TickBarrier {
    state: Mutex<BarrierState>,
    all_arrived: Condvar,
}

impl TickBarrier {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(BarrierState {
                registered: 0,
                arrived: 0,
            }),
            all_arrived: Condvar::new(),
        }
    }

    /// Arms the barrier for a tick expecting `count` arrivals.
    pub fn register(&self, count: usize) {
        let mut state = self.state.lock();
        if state.arrived < state.registered {
            panic!(
                "barrier re-armed with {} of {} arrivals outstanding",
                state.registered - state.arrived,
                state.registered
            );
        }
        state.registered = count;
        state.arrived = 0;
    }

    /// One registered arrival, signaled when the guard drops.
    pub fn arrival(&self) -> ArrivalGuard<'_> {
        ArrivalGuard { barrier: self }
    }

    /// Blocks until every registered arrival has happened. Arming with zero
    /// tasks returns immediately.
    pub fn wait(&self) {
        let mut state = self.state.lock();
        while state.arrived < state.registered {
            self.all_arrived.wait(&mut state);
        }
    }

    fn arrive(&self) {
        let mut state = self.state.lock();
        state.arrived += 1;
        if state.arrived >= state.registered {
            self.all_arrived.notify_all();
        }
    }
}

impl Default for TickBarrier {
    fn default() -> Self {
        Self::new()
    }
}

pub struct ArrivalGuard<'a> {
    barrier: &'a TickBarrier,
}

impl Drop for ArrivalGuard<'_> {
    fn drop(&mut self) {
        self.barrier.arrive();
    }
}
