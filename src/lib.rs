/*!
 * Cooperative Scheduler Library
 *
 * Priority round-robin scheduling of logical threads over parked OS threads,
 * with quantum preemption and simulated device wait/signal.
 */

pub mod core;
pub mod monitoring;
pub mod scheduler;

// Re-exports
pub use crate::core::errors::{
    ForkError, InitError, SchedError, SchedResult, SignalError, WaitError,
};
pub use crate::core::types::{DeviceId, Priority, ThreadStatus, Tid, MAX_DEVICES, MAX_PRIORITY};
pub use monitoring::init_tracing;
pub use scheduler::{Scheduler, SchedulerConfig, SchedulerStats};
