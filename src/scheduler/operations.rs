/*!
 * Scheduler Core Operations
 * fork, exec, wait and signal
 */

use super::thread::ThreadRecord;
use super::Scheduler;
use crate::core::errors::{ForkError, SignalError, WaitError};
use crate::core::sync::Gate;
use crate::core::types::{DeviceId, Priority, Tid, MAX_PRIORITY};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread;
use tracing::{debug, trace, warn};

impl Scheduler {
    /// Create a logical thread running `handler(priority)`
    ///
    /// The first thread forked while nothing runs takes the baton immediately.
    /// Otherwise the new thread is queued READY and, when called from the
    /// running thread, the caller is charged one `exec` step.
    pub fn fork<F>(&self, handler: F, priority: Priority) -> Result<Tid, ForkError>
    where
        F: FnOnce(Priority) + Send + 'static,
    {
        if priority > MAX_PRIORITY {
            return Err(ForkError::InvalidPriority(priority));
        }

        let mut guard = self.inner.state.lock();
        let engine = guard.as_mut().ok_or(ForkError::NotStarted)?;

        let tid = Tid::new(self.inner.next_tid.fetch_add(1, Ordering::Relaxed));
        let gate = Arc::new(Gate::new());

        let scheduler = self.clone();
        let thread_gate = Arc::clone(&gate);
        let mut builder = thread::Builder::new().name(format!("lthread-{}", tid.as_u64()));
        if let Some(bytes) = engine.stack_size {
            builder = builder.stack_size(bytes);
        }
        let handle = builder
            .spawn(move || scheduler.run_thread(tid, priority, thread_gate, Box::new(handler)))
            .map_err(|e| {
                warn!(%tid, error = %e, "Failed to spawn OS thread");
                ForkError::Spawn(e.to_string())
            })?;

        let record = ThreadRecord::new(tid, priority, engine.quantum, gate, handle.thread().id());
        engine.threads.insert(tid, record);
        engine.handles.push_back(handle);
        self.inner.stats.inc_forks();

        if engine.current.is_none() {
            debug!(%tid, priority, "Forked first runnable thread");
            self.handoff(guard, None, tid);
            return Ok(tid);
        }

        engine.requeue(tid);
        let charge_caller = engine.caller().is_some();
        debug!(%tid, priority, queued = engine.queue.len(), "Forked thread queued");
        drop(guard);

        if charge_caller {
            self.exec();
        }
        Ok(tid)
    }

    /// Consume one quantum step of the running thread
    ///
    /// No-op unless called from the running logical thread.
    pub fn exec(&self) {
        let mut guard = self.inner.state.lock();
        let Some(engine) = guard.as_mut() else {
            return;
        };
        let Some(tid) = engine.caller() else {
            return;
        };

        let record = engine.record_mut(tid);
        record.remaining = record.remaining.saturating_sub(1);
        if record.remaining > 0 {
            return;
        }

        trace!(%tid, "Quantum expired");
        self.inner.stats.inc_preemptions();
        let quantum = engine.quantum;
        engine.record_mut(tid).remaining = quantum;
        engine.requeue(tid);

        // The caller itself was just queued READY, so a successor always exists
        let Some(next) = engine.pop_ready() else {
            unreachable!("ready queue lost {}", tid);
        };
        self.handoff(guard, Some(tid), next);
    }

    /// Block the running thread on `device` until a matching `signal`
    ///
    /// Fails without touching any state when no other thread is READY.
    pub fn wait(&self, device: DeviceId) -> Result<(), WaitError> {
        let mut guard = self.inner.state.lock();
        let engine = guard.as_mut().ok_or(WaitError::NoCurrentThread)?;

        if device >= engine.max_io {
            return Err(WaitError::InvalidDevice {
                device,
                max_io: engine.max_io,
            });
        }
        if engine.current.is_none() {
            return Err(WaitError::NoCurrentThread);
        }
        let tid = engine.caller().ok_or(WaitError::NotCurrentThread)?;

        let Some(next) = engine.pop_ready() else {
            self.inner.stats.inc_deadlocks();
            warn!(%tid, device, "Deadlock: wait with no ready successor");
            return Err(WaitError::Deadlock);
        };

        let record = engine.record_mut(tid);
        record.block_on(device);
        let priority = record.priority;
        engine.queue.push(tid, priority);
        self.inner.stats.inc_waits();
        debug!(%tid, device, "Thread waiting on device");

        self.handoff(guard, Some(tid), next);

        // Resumed: either signaled or woken by deadlock recovery
        let mut guard = self.inner.state.lock();
        let deadlocked = guard
            .as_mut()
            .map(|engine| std::mem::take(&mut engine.record_mut(tid).deadlocked))
            .unwrap_or(false);
        if deadlocked {
            return Err(WaitError::Deadlock);
        }
        Ok(())
    }

    /// Wake every thread waiting on `device`, then yield
    ///
    /// The caller is requeued READY behind its priority peers and may be
    /// reselected immediately. Returns the number of threads released.
    pub fn signal(&self, device: DeviceId) -> Result<usize, SignalError> {
        let mut guard = self.inner.state.lock();
        let engine = guard.as_mut().ok_or(SignalError::NoCurrentThread)?;

        if device >= engine.max_io {
            return Err(SignalError::InvalidDevice {
                device,
                max_io: engine.max_io,
            });
        }
        if engine.current.is_none() {
            return Err(SignalError::NoCurrentThread);
        }
        let tid = engine.caller().ok_or(SignalError::NotCurrentThread)?;

        let mut woken = 0;
        for queued in engine.queue.iter() {
            if let Some(record) = engine.threads.get_mut(&queued) {
                if record.is_waiting_on(device) {
                    record.unblock();
                    woken += 1;
                }
            }
        }
        self.inner.stats.add_signal(woken);
        debug!(%tid, device, woken, "Signaled device");

        engine.requeue(tid);
        let Some(next) = engine.pop_ready() else {
            unreachable!("ready queue lost {}", tid);
        };
        self.handoff(guard, Some(tid), next);

        Ok(woken)
    }
}
