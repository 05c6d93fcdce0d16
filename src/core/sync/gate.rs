/*!
 * Execution Gate
 *
 * Binary semaphore built on parking_lot::Condvar. Each logical thread parks its
 * OS thread on one of these until the scheduler hands it the baton.
 */

use parking_lot::{Condvar, Mutex};

/// Binary semaphore with initial value 0
///
/// `post` on an already released gate is idempotent: the value saturates at 1.
pub struct Gate {
    released: Mutex<bool>,
    condvar: Condvar,
}

impl Gate {
    pub fn new() -> Self {
        Self {
            released: Mutex::new(false),
            condvar: Condvar::new(),
        }
    }

    /// Block until released, then consume the release
    pub fn wait(&self) {
        let mut released = self.released.lock();
        while !*released {
            self.condvar.wait(&mut released);
        }
        *released = false;
    }

    /// Release the gate, waking the parked thread if any
    pub fn post(&self) {
        let mut released = self.released.lock();
        *released = true;
        self.condvar.notify_one();
    }

    /// Consume a pending release without blocking
    pub fn try_wait(&self) -> bool {
        let mut released = self.released.lock();
        std::mem::replace(&mut *released, false)
    }
}

impl Default for Gate {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Gate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gate")
            .field("released", &*self.released.lock())
            .finish()
    }
}
