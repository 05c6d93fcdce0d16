/*!
 * Scheduler Configuration
 *
 * Quantum, device bound and thread stack size with env overrides
 */

use crate::core::errors::InitError;
use crate::core::types::MAX_DEVICES;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Env var overriding the quantum
pub const QUANTUM_ENV: &str = "SCHED_QUANTUM";

/// Env var overriding the device bound
pub const MAX_DEVICES_ENV: &str = "SCHED_MAX_DEVICES";

/// Scheduler configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// exec steps per scheduling turn
    pub quantum: u32,
    /// Exclusive upper bound on device ids
    pub max_devices: u32,
    /// Stack size of each backing OS thread; platform default when unset
    pub stack_size: Option<usize>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            quantum: 4,
            max_devices: 16,
            stack_size: None,
        }
    }
}

impl SchedulerConfig {
    pub const fn new(quantum: u32, max_devices: u32) -> Self {
        Self {
            quantum,
            max_devices,
            stack_size: None,
        }
    }

    pub const fn with_stack_size(mut self, bytes: usize) -> Self {
        self.stack_size = Some(bytes);
        self
    }

    /// Defaults overridden by `SCHED_QUANTUM` / `SCHED_MAX_DEVICES`
    ///
    /// Unparseable values are logged and ignored.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(quantum) = read_env(QUANTUM_ENV) {
            config.quantum = quantum;
        }
        if let Some(max_devices) = read_env(MAX_DEVICES_ENV) {
            config.max_devices = max_devices;
        }
        config
    }

    pub fn validate(&self) -> Result<(), InitError> {
        if self.quantum == 0 {
            return Err(InitError::InvalidQuantum);
        }
        if self.max_devices > MAX_DEVICES {
            return Err(InitError::TooManyDevices(self.max_devices));
        }
        Ok(())
    }
}

fn read_env(key: &str) -> Option<u32> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(key, value = %raw, error = %e, "Ignoring invalid scheduler env override");
            None
        }
    }
}
