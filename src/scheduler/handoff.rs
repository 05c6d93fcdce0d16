/*!
 * Execution Handoff
 * Baton transfer between logical threads and the OS thread trampoline
 */

use super::thread::Handler;
use super::{Engine, Scheduler};
use crate::core::sync::Gate;
use crate::core::types::{Priority, ThreadStatus, Tid};
use parking_lot::MutexGuard;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, error, trace, warn};

impl Scheduler {
    /// Dispatch `next`, release the engine lock, then post its gate
    ///
    /// `me` is the outgoing thread, already requeued or terminated by the caller.
    /// If `me` is still alive it parks on its own gate until resumed. When `next`
    /// is `me` the baton never leaves this OS thread.
    pub(super) fn handoff(
        &self,
        mut guard: MutexGuard<'_, Option<Engine>>,
        me: Option<Tid>,
        next: Tid,
    ) {
        let Some(engine) = guard.as_mut() else {
            return;
        };

        let next_gate = engine.dispatch(next);
        self.inner.stats.inc_dispatches();

        if me == Some(next) {
            trace!(tid = %next, "Reselected current thread");
            return;
        }

        self.inner.stats.inc_context_switches();
        let my_gate = me.map(|tid| Arc::clone(&engine.record(tid).gate));
        trace!(
            from = ?me,
            to = %next,
            priority = engine.record(next).priority,
            "Handing off"
        );
        drop(guard);

        next_gate.post();
        if let Some(gate) = my_gate {
            gate.wait();
        }
    }

    /// Entry point of every OS thread backing a logical thread
    pub(super) fn run_thread(
        self,
        tid: Tid,
        priority: Priority,
        gate: Arc<Gate>,
        handler: Handler,
    ) {
        gate.wait();
        trace!(%tid, priority, "Entering handler");

        let outcome = panic::catch_unwind(AssertUnwindSafe(move || handler(priority)));
        if outcome.is_err() {
            error!(%tid, "Handler panicked; terminating thread");
        }

        self.terminate(tid);

        if let Err(payload) = outcome {
            panic::resume_unwind(payload);
        }
    }

    /// Mark `tid` terminated and pass the baton on; never parks
    fn terminate(&self, tid: Tid) {
        let mut guard = self.inner.state.lock();
        let Some(engine) = guard.as_mut() else {
            return;
        };

        engine.record_mut(tid).set_status(ThreadStatus::Terminated);
        if engine.current == Some(tid) {
            engine.current = None;
        }
        self.inner.stats.inc_terminated();
        debug!(%tid, "Thread terminated");

        if let Some(next) = engine.pop_ready() {
            self.handoff(guard, None, next);
            return;
        }

        // Nobody left who could signal the waiters
        if let Some(orphan) = engine.pop_waiting() {
            let record = engine.record_mut(orphan);
            warn!(
                tid = %orphan,
                device = ?record.io,
                "Deadlock: no ready thread remains, failing wait"
            );
            record.unblock();
            record.deadlocked = true;
            self.inner.stats.inc_deadlocks();
            self.handoff(guard, None, orphan);
            return;
        }

        debug!("No runnable threads left; scheduler idle");
    }
}
