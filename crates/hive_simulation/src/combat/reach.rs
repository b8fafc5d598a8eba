//! Attack Reach Evaluator
//!
//! Чистая функция: (профиль, дистанция, facing dot) → вердикт.
//! Без side effects, можно звать каждый tick для каждого профиля.

use bevy::prelude::*;

use super::components::{AttackProfile, AttackProfiles, AttackSlot, FacingRequirement};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockReason {
    TooClose,
    TooFar,
    NotFacing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReachVerdict {
    /// Профиль выключен или не задан
    NotApplicable,
    Blocked(BlockReason),
    Usable,
}

/// Правила проверяются по порядку:
/// disabled → TooClose → TooFar → NotFacing → Usable.
///
/// Каждый профиль проверяет свой собственный facing threshold.
pub fn evaluate(profile: &AttackProfile, distance: f32, facing_dot: f32) -> ReachVerdict {
    if !profile.enabled {
        return ReachVerdict::NotApplicable;
    }
    if distance < profile.min_range {
        return ReachVerdict::Blocked(BlockReason::TooClose);
    }
    if distance > profile.effective_max_range(facing_dot) {
        return ReachVerdict::Blocked(BlockReason::TooFar);
    }
    if let FacingRequirement::MinDot(min_dot) = profile.facing {
        if facing_dot < min_dot {
            return ReachVerdict::Blocked(BlockReason::NotFacing);
        }
    }
    ReachVerdict::Usable
}

/// То же для слота: пустой слот = NotApplicable
pub fn evaluate_slot(
    profiles: &AttackProfiles,
    slot: AttackSlot,
    distance: f32,
    facing_dot: f32,
) -> ReachVerdict {
    profiles
        .get(slot)
        .map_or(ReachVerdict::NotApplicable, |profile| {
            evaluate(profile, distance, facing_dot)
        })
}

/// Cos угла между горизонтальным forward и горизонтальным направлением на цель
///
/// Цель ровно над/под атакующим считается "перед ним" (1.0).
pub fn facing_dot(forward: Vec3, from: Vec3, to: Vec3) -> f32 {
    let forward = Vec3::new(forward.x, 0.0, forward.z).normalize_or_zero();
    let to_target = Vec3::new(to.x - from.x, 0.0, to.z - from.z).normalize_or_zero();
    if forward == Vec3::ZERO || to_target == Vec3::ZERO {
        return 1.0;
    }
    forward.dot(to_target)
}
