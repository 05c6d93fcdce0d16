/*!
 * Lock-Free Scheduler Statistics
 * Atomic counters updated on the handoff path
 */

use super::config::SchedulerConfig;
use super::stats::SchedulerStats;
use std::sync::atomic::{AtomicU32, AtomicU64, AtomicUsize, Ordering};

/// Atomic scheduler statistics for lock-free updates
///
/// # Performance
/// - Cache-line aligned to prevent false sharing
/// - All operations use relaxed ordering; snapshots are monitoring-grade
#[repr(C, align(64))]
#[derive(Default)]
pub struct AtomicSchedulerStats {
    forks: AtomicU64,
    dispatches: AtomicU64,
    context_switches: AtomicU64,
    preemptions: AtomicU64,
    waits: AtomicU64,
    signals: AtomicU64,
    woken: AtomicU64,
    terminated: AtomicU64,
    deadlocks: AtomicU64,
    live_threads: AtomicUsize,
    // Config of the latest init; kept after shutdown
    quantum: AtomicU32,
    max_devices: AtomicU32,
}

impl AtomicSchedulerStats {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline(always)]
    pub fn inc_forks(&self) {
        self.forks.fetch_add(1, Ordering::Relaxed);
        self.live_threads.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn inc_dispatches(&self) {
        self.dispatches.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn inc_context_switches(&self) {
        self.context_switches.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn inc_preemptions(&self) {
        self.preemptions.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn inc_waits(&self) {
        self.waits.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn add_signal(&self, woken: usize) {
        self.signals.fetch_add(1, Ordering::Relaxed);
        self.woken.fetch_add(woken as u64, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn inc_terminated(&self) {
        self.terminated.fetch_add(1, Ordering::Relaxed);
        self.live_threads.fetch_sub(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn inc_deadlocks(&self) {
        self.deadlocks.fetch_add(1, Ordering::Relaxed);
    }

    /// Zero every counter and record the new config (used on initialization)
    pub fn reset(&self, config: &SchedulerConfig) {
        for counter in [
            &self.forks,
            &self.dispatches,
            &self.context_switches,
            &self.preemptions,
            &self.waits,
            &self.signals,
            &self.woken,
            &self.terminated,
            &self.deadlocks,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
        self.live_threads.store(0, Ordering::Relaxed);
        self.quantum.store(config.quantum, Ordering::Relaxed);
        self.max_devices.store(config.max_devices, Ordering::Relaxed);
    }

    /// Get snapshot of current stats
    #[inline]
    pub fn snapshot(&self) -> SchedulerStats {
        SchedulerStats {
            forks: self.forks.load(Ordering::Relaxed),
            dispatches: self.dispatches.load(Ordering::Relaxed),
            context_switches: self.context_switches.load(Ordering::Relaxed),
            preemptions: self.preemptions.load(Ordering::Relaxed),
            waits: self.waits.load(Ordering::Relaxed),
            signals: self.signals.load(Ordering::Relaxed),
            woken: self.woken.load(Ordering::Relaxed),
            terminated: self.terminated.load(Ordering::Relaxed),
            deadlocks: self.deadlocks.load(Ordering::Relaxed),
            live_threads: self.live_threads.load(Ordering::Relaxed),
            quantum: self.quantum.load(Ordering::Relaxed),
            max_devices: self.max_devices.load(Ordering::Relaxed),
        }
    }
}
