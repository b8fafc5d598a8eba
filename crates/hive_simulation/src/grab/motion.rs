//! Подземное движение членов grab-группы: chase к цели и retract домой.
//!
//! Чистые функции над позицией; высота всегда снапается к земле через `GroundHeight`.

use bevy::prelude::*;

use super::components::GrabAttackConfig;
use crate::spatial::GroundHeight;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LossReason {
    TargetGone,
    /// Цель на другом этаже / на возвышении
    HeightMismatch,
    ChaseTimeout,
    /// Цель ушла дальше release distance во время захвата
    TargetEscaped,
    GrabExpired,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChaseStep {
    Advanced { position: Vec3, speed: f32 },
    Reached { position: Vec3 },
    Lost(LossReason),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RetractStep {
    Moving(Vec3),
    Home(Vec3),
}

fn horizontal(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

/// Один шаг chase
///
/// Порядок проверок: цель есть → таймаут → высота → дистанция.
pub fn advance_chase(
    position: Vec3,
    speed: f32,
    elapsed: f32,
    target: Option<Vec3>,
    dt: f32,
    config: &GrabAttackConfig,
    ground: &dyn GroundHeight,
) -> ChaseStep {
    let Some(target) = target else {
        return ChaseStep::Lost(LossReason::TargetGone);
    };

    if config.max_chase_duration.is_some_and(|limit| elapsed >= limit) {
        return ChaseStep::Lost(LossReason::ChaseTimeout);
    }

    if (target.y - ground.ground_height_at(position)).abs() > config.vertical_tolerance {
        return ChaseStep::Lost(LossReason::HeightMismatch);
    }

    let offset = horizontal(target - position);
    let distance = offset.length();
    if distance <= config.approach_distance {
        return ChaseStep::Reached { position };
    }

    let speed = (speed + config.chase_acceleration * dt).min(config.chase_max_speed);
    let step = (speed * dt).min(distance - config.approach_distance);
    let mut next = position + offset / distance * step;
    next.y = ground.ground_height_at(next);

    ChaseStep::Advanced { position: next, speed }
}

/// Один шаг возврата к точке выхода
pub fn advance_retract(
    position: Vec3,
    origin: Vec3,
    dt: f32,
    config: &GrabAttackConfig,
    ground: &dyn GroundHeight,
) -> RetractStep {
    let offset = horizontal(origin - position);
    let distance = offset.length();
    if distance <= config.home_tolerance {
        return RetractStep::Home(position);
    }

    let step = (config.retract_speed * dt).min(distance);
    let mut next = position + offset / distance * step;
    next.y = ground.ground_height_at(next);

    if distance - step <= config.home_tolerance {
        RetractStep::Home(next)
    } else {
        RetractStep::Moving(next)
    }
}
