//! Combat system module
//!
//! ECS ответственность:
//! - Attack profiles + reach evaluation (какие атаки доступны)
//! - Melee impact resolution (volumetric sweep → hits)
//! - Damage queue: DamageRequest → Health, DamageDealt, EntityDied
//!
//! Collaborators:
//! - SpatialQuery: sweep'и (CollisionWorld)
//! - RelationshipClassifier: кого бить (FactionRelations)
//! - DamageDispatch: очередь DamageRequest

use bevy::prelude::*;

pub mod components;
pub mod damage;
pub mod melee;
pub mod reach;
pub mod systems;

#[cfg(test)]
mod reach_tests;

// Re-export основных типов
pub use components::*;
pub use damage::{
    BleedEffect, DamageDealt, DamageDispatch, DamageFlags, DamageRequest, Dead, DespawnAfter, EntityDied,
};
pub use melee::{resolve_melee_impact, ImpactProbe, ImpactProbeResult, MeleeAttacker, MeleeHit, MAX_MELEE_HITS};
pub use reach::{evaluate, evaluate_slot, facing_dot, BlockReason, ReachVerdict};
pub use systems::{MeleeStrikeIntent, MeleeStrikeResolved};

use crate::SimulationSet;

/// Combat Plugin
///
/// Регистрирует combat системы в FixedUpdate по фазам SimulationSet:
/// 1. Evaluation: tick_attack_cooldowns → evaluate_attack_reach
/// 2. Resolution: resolve_melee_strikes (intent → DamageRequest)
/// 3. Damage: apply_damage_requests (redirect, gating, resistance, смерть)
/// 4. Teardown: despawn_after_timeout
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        // Регистрация событий
        app.add_event::<DamageRequest>()
            .add_event::<DamageDealt>()
            .add_event::<EntityDied>()
            .add_event::<BleedEffect>()
            .add_event::<MeleeStrikeIntent>()
            .add_event::<MeleeStrikeResolved>();

        app.add_systems(
            FixedUpdate,
            (
                (systems::tick_attack_cooldowns, systems::evaluate_attack_reach)
                    .chain()
                    .in_set(SimulationSet::Evaluation),
                systems::resolve_melee_strikes.in_set(SimulationSet::Resolution),
                systems::apply_damage_requests.in_set(SimulationSet::Damage),
                systems::despawn_after_timeout.in_set(SimulationSet::Teardown),
            ),
        );
    }
}
