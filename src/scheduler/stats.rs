/*!
 * Scheduler Statistics
 * Track and report scheduler activity
 */

use super::Scheduler;
use serde::{Deserialize, Serialize};

/// Scheduler statistics snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SchedulerStats {
    pub forks: u64,
    /// Threads handed the baton (includes self-reselection)
    pub dispatches: u64,
    /// Dispatches that moved the baton to a different OS thread
    pub context_switches: u64,
    /// Quantum expiries
    pub preemptions: u64,
    pub waits: u64,
    pub signals: u64,
    /// Threads released by signals
    pub woken: u64,
    pub terminated: u64,
    pub deadlocks: u64,
    pub live_threads: usize,
    pub quantum: u32,
    pub max_devices: u32,
}

impl Scheduler {
    /// Get scheduler statistics
    ///
    /// Lock-free; still reports the last run after `shutdown`.
    pub fn stats(&self) -> SchedulerStats {
        self.inner.stats.snapshot()
    }
}
