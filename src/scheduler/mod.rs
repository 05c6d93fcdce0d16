/*!
 * Cooperative Scheduler
 *
 * Multiplexes logical threads over parked OS threads. Every logical thread owns
 * an OS thread blocked on its private gate; the engine releases exactly one
 * gate at a time, so only the current thread ever executes handler code.
 */

use crate::core::errors::InitError;
use crate::core::sync::Gate;
use crate::core::types::{ThreadStatus, Tid};
use ahash::AHashMap;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::AtomicU64;
use std::sync::Arc;
use std::thread::JoinHandle;

mod atomic_stats;
pub mod config;
mod handoff;
mod lifecycle;
mod operations;
mod queue;
mod stats;
mod thread;

pub use config::SchedulerConfig;
pub use stats::SchedulerStats;

use atomic_stats::AtomicSchedulerStats;
use queue::ReadyQueue;
use thread::ThreadRecord;

/// Engine state, present only between `init` and `shutdown`
pub(crate) struct Engine {
    quantum: u32,
    max_io: u32,
    stack_size: Option<usize>,
    current: Option<Tid>,
    queue: ReadyQueue,
    // Registry of every thread forked since init; joined on shutdown
    threads: AHashMap<Tid, ThreadRecord>,
    handles: VecDeque<JoinHandle<()>>,
}

impl Engine {
    fn new(config: SchedulerConfig) -> Self {
        Self {
            quantum: config.quantum,
            max_io: config.max_devices,
            stack_size: config.stack_size,
            current: None,
            queue: ReadyQueue::new(),
            threads: AHashMap::new(),
            handles: VecDeque::new(),
        }
    }

    fn record(&self, tid: Tid) -> &ThreadRecord {
        match self.threads.get(&tid) {
            Some(record) => record,
            None => unreachable!("{} is not registered", tid),
        }
    }

    fn record_mut(&mut self, tid: Tid) -> &mut ThreadRecord {
        match self.threads.get_mut(&tid) {
            Some(record) => record,
            None => unreachable!("{} is not registered", tid),
        }
    }

    /// The current thread, if the calling OS thread is the one backing it
    fn caller(&self) -> Option<Tid> {
        let me = std::thread::current().id();
        self.current.filter(|&tid| self.record(tid).os_id == me)
    }

    /// Whether the calling OS thread backs any logical thread
    fn is_logical_caller(&self) -> bool {
        let me = std::thread::current().id();
        self.threads.values().any(|record| record.os_id == me)
    }

    /// Mark READY and append to its priority lane
    fn requeue(&mut self, tid: Tid) {
        let record = self.record_mut(tid);
        record.set_status(ThreadStatus::Ready);
        let priority = record.priority;
        self.queue.push(tid, priority);
    }

    /// Pick-next: highest priority READY member, FIFO among equals
    fn pop_ready(&mut self) -> Option<Tid> {
        let threads = &self.threads;
        self.queue
            .pop_next(|tid| threads.get(&tid).is_some_and(ThreadRecord::is_ready))
    }

    /// First WAITING member in selection order
    fn pop_waiting(&mut self) -> Option<Tid> {
        let threads = &self.threads;
        self.queue.pop_next(|tid| {
            threads
                .get(&tid)
                .is_some_and(|r| r.status == ThreadStatus::Waiting)
        })
    }

    /// Give `tid` the baton: RUNNING, fresh quantum, recorded as current
    ///
    /// Returns the gate the caller must post once the lock is released.
    fn dispatch(&mut self, tid: Tid) -> Arc<Gate> {
        let quantum = self.quantum;
        let record = self.record_mut(tid);
        record.set_status(ThreadStatus::Running);
        record.remaining = quantum;
        let gate = Arc::clone(&record.gate);
        self.current = Some(tid);
        gate
    }
}

struct Inner {
    state: Mutex<Option<Engine>>,
    next_tid: AtomicU64,
    stats: AtomicSchedulerStats,
}

/// Scheduler handle
///
/// Cheap to clone; every clone drives the same engine. Handlers capture a clone
/// to call `fork`, `exec`, `wait` and `signal` from inside a logical thread.
#[derive(Clone)]
pub struct Scheduler {
    inner: Arc<Inner>,
}

impl Scheduler {
    /// Create an uninitialized scheduler; call `init` before forking
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(None),
                next_tid: AtomicU64::new(1),
                stats: AtomicSchedulerStats::new(),
            }),
        }
    }

    /// Create and initialize in one step
    pub fn with_config(config: SchedulerConfig) -> Result<Self, InitError> {
        let scheduler = Self::new();
        scheduler.init_with(config)?;
        Ok(scheduler)
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.lock();
        match state.as_ref() {
            Some(engine) => f
                .debug_struct("Scheduler")
                .field("quantum", &engine.quantum)
                .field("max_io", &engine.max_io)
                .field("current", &engine.current)
                .field("queued", &engine.queue.len())
                .field("threads", &engine.threads.len())
                .finish(),
            None => f
                .debug_struct("Scheduler")
                .field("started", &false)
                .finish(),
        }
    }
}
