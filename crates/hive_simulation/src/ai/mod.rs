//! AI decision-making module
//!
//! Выбор врага из perception и выбор атаки по вердиктам reach evaluator.
//! Grab-атака босса живёт в `grab` (у неё свой цикл).

use bevy::prelude::*;

pub mod decision;


pub use decision::{nearest_threat, select_enemy, select_melee_attack};

use crate::SimulationSet;

/// AI Plugin
///
/// Регистрирует AI системы в FixedUpdate для детерминизма.
/// Порядок выполнения:
/// 1. select_enemy — после refresh perception (SimulationSet::Perception)
/// 2. select_melee_attack — после reach evaluation (SimulationSet::Decision)
pub struct AIPlugin;

impl Plugin for AIPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            (
                select_enemy
                    .in_set(SimulationSet::Perception)
                    .after(crate::perception::systems::refresh_swarm_sense),
                select_melee_attack.in_set(SimulationSet::Decision),
            ),
        );
    }
}
