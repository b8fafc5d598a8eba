//! Combat systems (ECS side of reach, melee, damage)

pub mod damage;
pub mod melee;
pub mod reach;

// Tests (separate files with _tests suffix)
#[cfg(test)]
mod damage_tests;

// Re-export all systems
pub use damage::*;
pub use melee::*;
pub use reach::*;
