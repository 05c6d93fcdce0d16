/*!
 * Core Module
 * Fundamental scheduler types, synchronization and error handling
 */

pub mod errors;
pub mod sync;
pub mod types;

// Re-export for convenience
pub use errors::*;
pub use sync::Gate;
pub use types::*;
