/*!
 * Error Types
 * Centralized error handling with thiserror, miette, and serde support
 */

use super::types::{DeviceId, Priority, MAX_DEVICES, MAX_PRIORITY};
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Scheduler initialization errors
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum InitError {
    #[error("Invalid quantum: must be positive")]
    #[diagnostic(
        code(init::invalid_quantum),
        help("A thread needs at least one exec step per turn.")
    )]
    InvalidQuantum,

    #[error("Device bound {0} exceeds maximum ({})", MAX_DEVICES)]
    #[diagnostic(code(init::too_many_devices))]
    TooManyDevices(u32),

    #[error("Scheduler already started")]
    #[diagnostic(
        code(init::already_started),
        help("Call shutdown() before initializing again.")
    )]
    AlreadyStarted,
}

/// Logical thread creation errors
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum ForkError {
    #[error("Scheduler not started")]
    #[diagnostic(code(fork::not_started), help("Call init() first."))]
    NotStarted,

    #[error("Priority {0} exceeds maximum ({})", MAX_PRIORITY)]
    #[diagnostic(code(fork::invalid_priority))]
    InvalidPriority(Priority),

    #[error("Failed to spawn OS thread: {0}")]
    #[diagnostic(
        code(fork::spawn_failed),
        help("System may be out of threads or memory.")
    )]
    Spawn(String),
}

/// Device wait errors
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum WaitError {
    #[error("Device {device} out of range (max {max_io})")]
    #[diagnostic(code(wait::invalid_device))]
    InvalidDevice { device: DeviceId, max_io: u32 },

    #[error("No logical thread is running")]
    #[diagnostic(code(wait::no_current_thread))]
    NoCurrentThread,

    #[error("Caller is not the running logical thread")]
    #[diagnostic(
        code(wait::not_current_thread),
        help("wait() must be called from inside a handler.")
    )]
    NotCurrentThread,

    #[error("Deadlock: no ready thread can run")]
    #[diagnostic(
        code(wait::deadlock),
        help("Every waiter needs a future signal on its device from a thread that can still run.")
    )]
    Deadlock,
}

/// Device signal errors
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum SignalError {
    #[error("Device {device} out of range (max {max_io})")]
    #[diagnostic(code(signal::invalid_device))]
    InvalidDevice { device: DeviceId, max_io: u32 },

    #[error("No logical thread is running")]
    #[diagnostic(code(signal::no_current_thread))]
    NoCurrentThread,

    #[error("Caller is not the running logical thread")]
    #[diagnostic(
        code(signal::not_current_thread),
        help("signal() must be called from inside a handler.")
    )]
    NotCurrentThread,
}

/// Unified scheduler error type with miette diagnostics
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum SchedError {
    #[error("Init error: {0}")]
    #[diagnostic(transparent)]
    Init(#[from] InitError),

    #[error("Fork error: {0}")]
    #[diagnostic(transparent)]
    Fork(#[from] ForkError),

    #[error("Wait error: {0}")]
    #[diagnostic(transparent)]
    Wait(#[from] WaitError),

    #[error("Signal error: {0}")]
    #[diagnostic(transparent)]
    Signal(#[from] SignalError),
}

/// Scheduler result type
pub type SchedResult<T> = Result<T, SchedError>;
