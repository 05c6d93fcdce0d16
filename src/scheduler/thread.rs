/*!
 * Logical Thread Record
 * Per-thread scheduling state owned by the engine registry
 */

use crate::core::sync::Gate;
use crate::core::types::{DeviceId, Priority, ThreadStatus, Tid};
use std::sync::Arc;
use std::thread::ThreadId;

/// User handler, invoked exactly once with the thread's priority
pub(crate) type Handler = Box<dyn FnOnce(Priority) + Send + 'static>;

/// Logical thread scheduling record
#[derive(Debug)]
pub(super) struct ThreadRecord {
    pub tid: Tid,
    pub priority: Priority,
    pub remaining: u32,
    pub status: ThreadStatus,
    pub io: Option<DeviceId>,
    pub gate: Arc<Gate>,
    /// Backing OS thread, used to recognise the caller of an operation
    pub os_id: ThreadId,
    /// Set when resumed from a wait that can never be signaled
    pub deadlocked: bool,
}

impl ThreadRecord {
    pub fn new(
        tid: Tid,
        priority: Priority,
        quantum: u32,
        gate: Arc<Gate>,
        os_id: ThreadId,
    ) -> Self {
        Self {
            tid,
            priority,
            remaining: quantum,
            status: ThreadStatus::New,
            io: None,
            gate,
            os_id,
            deadlocked: false,
        }
    }

    /// Move to `next`, checking the lifecycle state machine in debug builds
    #[inline]
    pub fn set_status(&mut self, next: ThreadStatus) {
        debug_assert!(
            self.status.can_transition_to(next),
            "illegal transition for {}: {} -> {}",
            self.tid,
            self.status,
            next
        );
        self.status = next;
    }

    /// Park on a device
    pub fn block_on(&mut self, device: DeviceId) {
        self.io = Some(device);
        self.set_status(ThreadStatus::Waiting);
    }

    /// Release from a device wait
    pub fn unblock(&mut self) {
        self.io = None;
        self.set_status(ThreadStatus::Ready);
    }

    #[inline(always)]
    pub fn is_ready(&self) -> bool {
        self.status == ThreadStatus::Ready
    }

    #[inline(always)]
    pub fn is_waiting_on(&self, device: DeviceId) -> bool {
        self.status == ThreadStatus::Waiting && self.io == Some(device)
    }
}
