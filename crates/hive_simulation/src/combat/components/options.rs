//! AttackOptions — результат reach-оценки за текущий tick.

use bevy::prelude::*;

use super::AttackSlot;
use crate::combat::ReachVerdict;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttackOption {
    pub slot: AttackSlot,
    pub verdict: ReachVerdict,
    /// Per-slot и shared cooldown истекли
    pub ready: bool,
}

impl AttackOption {
    pub fn is_available(&self) -> bool {
        self.ready && self.verdict == ReachVerdict::Usable
    }
}

/// Какие атаки сейчас доступны против `target`
///
/// Пересчитывается каждый tick `evaluate_attack_reach`; decision layer только читает.
#[derive(Component, Debug, Clone, Default)]
pub struct AttackOptions {
    pub target: Option<Entity>,
    pub options: Vec<AttackOption>,
}

impl AttackOptions {
    pub fn clear(&mut self) {
        self.target = None;
        self.options.clear();
    }

    pub fn verdict(&self, slot: AttackSlot) -> Option<ReachVerdict> {
        self.options
            .iter()
            .find(|option| option.slot == slot)
            .map(|option| option.verdict)
    }

    /// Первая доступная melee атака (Melee1 приоритетнее Melee2)
    pub fn first_available_melee(&self) -> Option<AttackSlot> {
        self.options
            .iter()
            .filter(|option| option.slot.is_melee())
            .find(|option| option.is_available())
            .map(|option| option.slot)
    }
}
