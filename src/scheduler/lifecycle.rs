/*!
 * Scheduler Lifecycle
 * Initialization, shutdown and read-only introspection
 */

use super::config::SchedulerConfig;
use super::{Engine, Scheduler};
use crate::core::errors::InitError;
use crate::core::types::{DeviceId, ThreadStatus, Tid};
use tracing::{debug, error, info, warn};

impl Scheduler {
    /// Start the engine with `quantum` exec steps per turn and device ids below `max_devices`
    pub fn init(&self, quantum: u32, max_devices: u32) -> Result<(), InitError> {
        self.init_with(SchedulerConfig::new(quantum, max_devices))
    }

    /// Start the engine from a config value
    pub fn init_with(&self, config: SchedulerConfig) -> Result<(), InitError> {
        config.validate()?;

        let mut state = self.inner.state.lock();
        if state.is_some() {
            return Err(InitError::AlreadyStarted);
        }
        *state = Some(Engine::new(config));
        self.inner.stats.reset(&config);

        info!(
            quantum = config.quantum,
            max_devices = config.max_devices,
            "Scheduler initialized"
        );
        Ok(())
    }

    /// Join every logical thread and release the engine
    ///
    /// Threads forked while the join is in progress are joined too. A thread
    /// whose handler panicked is logged and skipped. Calling this from inside a
    /// handler would join the caller itself, so it is refused.
    pub fn shutdown(&self) {
        {
            let state = self.inner.state.lock();
            match state.as_ref() {
                None => {
                    debug!("Shutdown requested but scheduler never started");
                    return;
                }
                Some(engine) if engine.is_logical_caller() => {
                    warn!("Shutdown called from a logical thread; ignoring");
                    return;
                }
                Some(_) => {}
            }
        }

        let mut joined = 0usize;
        let mut failed = 0usize;
        loop {
            let handle = self
                .inner
                .state
                .lock()
                .as_mut()
                .and_then(|engine| engine.handles.pop_front());
            let Some(handle) = handle else {
                break;
            };

            let name = handle.thread().name().unwrap_or("<unnamed>").to_string();
            match handle.join() {
                Ok(()) => joined += 1,
                Err(_) => {
                    failed += 1;
                    error!(thread = %name, "Logical thread panicked; continuing shutdown");
                }
            }
        }

        let engine = self.inner.state.lock().take();
        drop(engine);
        info!(joined, failed, "Scheduler shut down");
    }

    /// Whether `init` has succeeded and `shutdown` has not run since
    pub fn is_started(&self) -> bool {
        self.inner.state.lock().is_some()
    }

    /// Log a one-line summary of scheduler activity
    pub fn log_summary(&self) {
        let stats = self.stats();
        info!(
            forks = stats.forks,
            dispatches = stats.dispatches,
            preemptions = stats.preemptions,
            signals = stats.signals,
            deadlocks = stats.deadlocks,
            "Scheduler summary"
        );
    }

    /// Running thread, if any
    pub fn current(&self) -> Option<Tid> {
        self.inner
            .state
            .lock()
            .as_ref()
            .and_then(|engine| engine.current)
    }

    /// Status of a registered thread
    pub fn status(&self, tid: Tid) -> Option<ThreadStatus> {
        self.inner
            .state
            .lock()
            .as_ref()
            .and_then(|engine| engine.threads.get(&tid))
            .map(|record| record.status)
    }

    /// Device a thread is blocked on
    pub fn waiting_on(&self, tid: Tid) -> Option<DeviceId> {
        self.inner
            .state
            .lock()
            .as_ref()
            .and_then(|engine| engine.threads.get(&tid))
            .and_then(|record| record.io)
    }

    /// Number of registered threads currently in `status`
    pub fn count_with_status(&self, status: ThreadStatus) -> usize {
        self.inner
            .state
            .lock()
            .as_ref()
            .map(|engine| {
                engine
                    .threads
                    .values()
                    .filter(|record| record.status == status)
                    .count()
            })
            .unwrap_or(0)
    }

    /// Number of threads registered since `init`
    pub fn thread_count(&self) -> usize {
        self.inner
            .state
            .lock()
            .as_ref()
            .map(|engine| engine.threads.len())
            .unwrap_or(0)
    }

    /// Ready queue length, waiting members included
    pub fn queue_len(&self) -> usize {
        self.inner
            .state
            .lock()
            .as_ref()
            .map(|engine| engine.queue.len())
            .unwrap_or(0)
    }
}
