//! General-purpose utility modules.

pub mod error;

// Re-export commonly used items
pub use error::{HuffError, Result};
