//! Grab coordinator events.

use bevy::prelude::*;

use super::components::GrabGroupId;

/// Анимационная подсказка presentation-слою
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GrabCue {
    EnterGrabPose,
    /// Уход под землю; симуляция ждёт `PresentationFinished`
    EnterRetractPose,
}

#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct GrabPresentation {
    pub member: Entity,
    pub cue: GrabCue,
}

/// Presentation-слой → симуляция: retract-поза доиграна
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct PresentationFinished {
    pub member: Entity,
}

/// Член группы получил обычный урон и выжил (→ retract)
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct GrabMemberHurt {
    pub member: Entity,
    pub amount: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisbandReason {
    PrimaryKilled,
    BossKilled,
    /// Primary догнал цель, но места вокруг неё нет
    PlacementFailed,
}

/// Группа расформирована принудительно
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct GrabGroupDisbanded {
    pub boss: Entity,
    pub group: GrabGroupId,
    pub reason: DisbandReason,
}

/// Группа штатно вернулась домой и удалена
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct GrabGroupFinished {
    pub boss: Entity,
    pub group: GrabGroupId,
}
