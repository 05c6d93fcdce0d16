/*!
 * Synchronization Primitives
 *
 * Per-thread execution gates used by the scheduler handoff
 */

mod gate;

pub use gate::Gate;
