/*!
 * Ready Queue
 * Priority-ordered, FIFO-within-priority collection of schedulable threads
 */

use crate::core::types::{Priority, Tid, MAX_PRIORITY};
use std::collections::VecDeque;

const LEVELS: usize = MAX_PRIORITY as usize + 1;

/// Ready queue with one FIFO lane per priority level
///
/// Holds thread ids only; the engine registry owns the records. Waiting
/// threads stay in their lane and are skipped by the selection predicate.
#[derive(Debug, Clone)]
pub(crate) struct ReadyQueue {
    lanes: [VecDeque<Tid>; LEVELS],
    len: usize,
}

impl ReadyQueue {
    pub fn new() -> Self {
        Self {
            lanes: std::array::from_fn(|_| VecDeque::new()),
            len: 0,
        }
    }

    /// Append to the tail of the priority lane
    pub fn push(&mut self, tid: Tid, priority: Priority) {
        debug_assert!(priority <= MAX_PRIORITY, "{} has priority {}", tid, priority);
        self.lanes[priority as usize].push_back(tid);
        self.len += 1;
    }

    /// Remove and return the first eligible thread, highest priority first
    pub fn pop_next<F>(&mut self, mut eligible: F) -> Option<Tid>
    where
        F: FnMut(Tid) -> bool,
    {
        for lane in self.lanes.iter_mut().rev() {
            if let Some(pos) = lane.iter().position(|&tid| eligible(tid)) {
                self.len -= 1;
                return lane.remove(pos);
            }
        }
        None
    }

    /// Members in selection order
    pub fn iter(&self) -> impl Iterator<Item = Tid> + '_ {
        self.lanes.iter().rev().flat_map(|lane| lane.iter().copied())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }
}
