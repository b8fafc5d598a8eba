//! ECS Components для игровых entity
//!
//! Организация по доменам:
//! - actor: базовые характеристики (faction, classification, health, collision volume)

pub mod actor;

// Re-exports для удобного импорта
pub use actor::*;
