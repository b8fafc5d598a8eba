//! Поиск места вокруг цели для членов grab-группы.
//!
//! Кандидат на окружности `placement_offset` вокруг цели проверяется двумя
//! sweep'ами (у земли и на высоте головы) от цели к кандидату. Заблокирован —
//! поворачиваем на `placement_angle_step` и пробуем снова.

use bevy::prelude::*;
use std::f32::consts::TAU;

use super::components::GrabAttackConfig;
use crate::spatial::{CollisionGroup, GroundHeight, HullExtents, SpatialQuery, Sweep, SweepFilter};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrabPlacement {
    pub position: Vec3,
    pub angle: f32,
    /// Номер попытки (0 — стартовый угол подошёл)
    pub attempt: u32,
}

/// Горизонтальное направление для угла (0 → +X, против часовой к +Z)
pub fn direction_for_angle(angle: f32) -> Vec3 {
    Vec3::new(angle.cos(), 0.0, angle.sin())
}

pub fn angle_towards(from: Vec3, to: Vec3) -> f32 {
    (to.z - from.z).atan2(to.x - from.x)
}

/// Стартовые углы peers: равномерно по кругу, начиная после угла primary
pub fn peer_spawn_angles(primary_angle: f32, peer_count: usize) -> Vec<f32> {
    let slots = (peer_count + 1) as f32;
    (1..=peer_count)
        .map(|i| primary_angle + TAU * i as f32 / slots)
        .collect()
}

pub fn find_grab_position(
    target_entity: Entity,
    target: Vec3,
    start_angle: f32,
    group: CollisionGroup,
    config: &GrabAttackConfig,
    spatial: &dyn SpatialQuery,
    ground: &dyn GroundHeight,
) -> Option<GrabPlacement> {
    let step = config.placement_angle_step.to_radians();
    let probe = HullExtents::cube(config.placement_probe_half_extent);
    let filter = SweepFilter {
        ignore_entity: Some(target_entity),
        ignore_group: Some(group),
        hit_world: true,
        accept: None,
    };

    for attempt in 0..config.placement_attempts {
        let angle = start_angle + step * attempt as f32;
        let mut candidate = target + direction_for_angle(angle) * config.placement_offset;
        candidate.y = ground.ground_height_at(candidate);

        // Обрыв / ступень выше допустимого
        if (candidate.y - target.y).abs() > config.vertical_tolerance {
            continue;
        }

        let blocked = [config.ground_clearance, config.head_height].into_iter().any(|height| {
            let from = target + Vec3::Y * height;
            let to = candidate + Vec3::Y * height;
            spatial.sweep_first_hit(&Sweep::new(from, to, probe), &filter).is_some()
        });

        if !blocked {
            return Some(GrabPlacement {
                position: candidate,
                angle,
                attempt,
            });
        }
    }

    None
}
