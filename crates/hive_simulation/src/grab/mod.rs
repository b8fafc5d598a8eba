//! Multi-Agent Grab Coordinator
//!
//! Босс (queen) периодически выпускает под землёй primary grabber'а. Тот
//! догоняет цель, встаёт рядом и спавнит peers по кругу; вместе они держат
//! и ранят цель, затем уходят домой. Смерть primary или босса убивает всю
//! группу в том же tick.
//!
//! Группы живут в арене `GrabGroups`; члены ссылаются на группу по ID.

use bevy::prelude::*;

pub mod arena;
pub mod components;
pub mod events;
pub mod motion;
pub mod placement;
pub mod systems;

#[cfg(test)]
mod components_tests;
#[cfg(test)]
mod motion_tests;

pub use arena::{GrabGroup, GrabGroups, GroupPhase};
pub use components::{
    DiverPhase, GrabAttackConfig, GrabBoss, GrabGroupId, GrabRole, GrabStartError, Grabber, GrabberState,
};
pub use events::{
    DisbandReason, GrabCue, GrabGroupDisbanded, GrabGroupFinished, GrabMemberHurt, GrabPresentation,
    PresentationFinished,
};
pub use motion::{advance_chase, advance_retract, ChaseStep, LossReason, RetractStep};
pub use placement::{find_grab_position, peer_spawn_angles, GrabPlacement};

use crate::SimulationSet;

/// Grab Attack Plugin
///
/// - Decision: boss_grab_cycle
/// - Resolution: drive_grab_groups (после melee, grab-урон идёт в ту же очередь)
/// - Teardown: react_to_grab_casualties → finalize_grab_groups (до despawn_after_timeout)
pub struct GrabAttackPlugin;

impl Plugin for GrabAttackPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<GrabGroups>()
            .add_event::<GrabPresentation>()
            .add_event::<PresentationFinished>()
            .add_event::<GrabMemberHurt>()
            .add_event::<GrabGroupDisbanded>()
            .add_event::<GrabGroupFinished>();

        app.add_systems(
            FixedUpdate,
            (
                systems::boss_grab_cycle.in_set(SimulationSet::Decision),
                systems::drive_grab_groups
                    .in_set(SimulationSet::Resolution)
                    .after(crate::combat::systems::resolve_melee_strikes),
                (systems::react_to_grab_casualties, systems::finalize_grab_groups)
                    .chain()
                    .in_set(SimulationSet::Teardown)
                    .before(crate::combat::systems::despawn_after_timeout),
            ),
        );
    }
}
