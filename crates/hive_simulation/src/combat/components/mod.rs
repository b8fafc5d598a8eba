//! Combat components

pub mod options;
pub mod profile;


// Re-export all components
pub use options::*;
pub use profile::*;
