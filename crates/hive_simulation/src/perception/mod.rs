//! Perception Engine
//!
//! Два режима:
//! - Sight: дистанция + line-of-sight через SpatialQuery, каждый tick
//! - Swarm sense: только радиус, без LOS, с интервалом (drones, queen)
//!
//! Результат — списки `PerceivedTarget` в `Perception` и обновлённая `EnemyMemory`.

use bevy::prelude::*;

pub mod components;
pub mod senses;
pub mod systems;

#[cfg(test)]
mod senses_tests;

pub use components::*;
pub use senses::{gather_sight, gather_swarm_sense, SenseCandidate, SenseObserver, SenseReport};

use crate::SimulationSet;

/// Perception Plugin
///
/// Sight → swarm sense, обе в SimulationSet::Perception
/// (до оценки атак в том же tick).
pub struct PerceptionPlugin;

impl Plugin for PerceptionPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            (systems::refresh_sight, systems::refresh_swarm_sense)
                .chain()
                .in_set(SimulationSet::Perception),
        );
    }
}
