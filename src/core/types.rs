/*!
 * Core Types
 * Common types used across the scheduler
 */

use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical thread priority (0..=MAX_PRIORITY, higher runs first)
pub type Priority = u8;

/// Abstract I/O device identifier
pub type DeviceId = u32;

/// Highest priority a logical thread may be forked with
pub const MAX_PRIORITY: Priority = 5;

/// Upper bound on the device count accepted by `init`
pub const MAX_DEVICES: u32 = 256;

/// Logical thread identifier
///
/// Assigned when the backing OS thread is spawned, never reused within a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tid(u64);

impl Tid {
    #[inline]
    pub(crate) const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw numeric value
    #[inline(always)]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Tid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tid:{}", self.0)
    }
}

/// Logical thread lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreadStatus {
    /// Created, OS thread parked, not yet scheduled
    New,
    /// Eligible for selection
    Ready,
    /// Holding the baton
    Running,
    /// Blocked on a device, inert in the ready queue
    Waiting,
    /// Handler returned
    Terminated,
}

impl ThreadStatus {
    /// Check whether `self -> next` is a legal transition
    pub const fn can_transition_to(self, next: ThreadStatus) -> bool {
        use ThreadStatus::*;
        matches!(
            (self, next),
            (New, Ready)
                | (New, Running)
                | (Ready, Running)
                | (Running, Ready)
                | (Running, Waiting)
                | (Waiting, Ready)
                | (Running, Terminated)
        )
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Ready => "ready",
            Self::Running => "running",
            Self::Waiting => "waiting",
            Self::Terminated => "terminated",
        }
    }
}

impl fmt::Display for ThreadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
