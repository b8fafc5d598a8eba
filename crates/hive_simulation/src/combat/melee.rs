//! Melee Impact Resolver
//!
//! Один volumetric sweep вперёд от атакующего → до `MAX_MELEE_HITS` попаданий,
//! урон и импульс каждому, плюс "primary" цель (лучше всего выровненная с forward).

use arrayvec::ArrayVec;
use bevy::prelude::*;
use std::ops::ControlFlow;

use super::components::MeleeStrike;
use super::damage::{DamageDispatch, DamageFlags, DamageRequest};
use crate::components::{Actor, CollisionVolume};
use crate::relations::{resolve_relationship, ActorDirectory, RelationshipClassifier};
use crate::spatial::{SpatialQuery, Sweep, SweepFilter};

/// Потолок попаданий за один sweep (stack-local буфер)
pub const MAX_MELEE_HITS: usize = 8;

/// Импульс на единицу урона (масса ~75 × 4)
pub const IMPACT_FORCE_PER_DAMAGE: f32 = 300.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImpactProbe {
    pub sweep: Sweep,
    pub damage: f32,
    pub flags: DamageFlags,
    pub force_scale: f32,
    pub damage_any: bool,
}

impl ImpactProbe {
    /// Sweep от тела атакующего вдоль горизонтального forward
    ///
    /// Старт — на половине высоты тела, но не ниже `hull.maxs.y + 1` над origin,
    /// чтобы hull не цеплял пол.
    pub fn forward_from(origin: Vec3, forward: Vec3, body: &CollisionVolume, strike: &MeleeStrike) -> Self {
        let mut vertical_offset = body.half_height();
        if vertical_offset < strike.hull.maxs.y {
            vertical_offset = strike.hull.maxs.y + 1.0;
        }

        let flat = Vec3::new(forward.x, 0.0, forward.z).normalize_or_zero();
        let direction = if flat == Vec3::ZERO { forward.normalize_or_zero() } else { flat };

        let start = origin + Vec3::Y * vertical_offset;
        let end = start + direction * strike.reach;

        Self {
            sweep: Sweep::new(start, end, strike.hull),
            damage: strike.damage,
            flags: strike.flags,
            force_scale: strike.force_scale,
            damage_any: strike.damage_any,
        }
    }
}

/// Кто бьёт
pub struct MeleeAttacker<'a> {
    pub entity: Entity,
    pub actor: &'a Actor,
    /// World-space центр тела
    pub center: Vec3,
    pub forward: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeleeHit {
    pub target: Entity,
    pub point: Vec3,
    pub normal: Vec3,
    pub force: Vec3,
    /// Что вернул DamageDispatch
    pub applied: f32,
    /// forward · направление на центр цели
    pub alignment: f32,
}

#[derive(Debug, Clone, Default)]
pub struct ImpactProbeResult {
    pub hits: ArrayVec<MeleeHit, MAX_MELEE_HITS>,
    primary: Option<usize>,
    /// Пересечения сверх потолка (отброшены)
    pub dropped: usize,
}

impl ImpactProbeResult {
    pub fn primary(&self) -> Option<&MeleeHit> {
        self.primary.and_then(|index| self.hits.get(index))
    }

    pub fn primary_target(&self) -> Option<Entity> {
        self.primary().map(|hit| hit.target)
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }
}

/// Разрешает melee удар.
///
/// Пустой sweep — не ошибка, просто промах (`primary() == None`).
pub fn resolve_melee_impact(
    attacker: &MeleeAttacker,
    probe: &ImpactProbe,
    spatial: &dyn SpatialQuery,
    actors: &dyn ActorDirectory,
    relations: &dyn RelationshipClassifier,
    damage: &mut dyn DamageDispatch,
) -> ImpactProbeResult {
    let forward = attacker.forward.normalize_or_zero();

    let accept = |entity: Entity| -> bool {
        let Some(other) = actors.actor(entity) else {
            return false;
        };
        probe.damage_any || resolve_relationship(relations, attacker.actor, other, entity).is_hostile()
    };
    let filter = SweepFilter::solid_except(attacker.entity).with_accept(&accept);

    let mut result = ImpactProbeResult::default();
    spatial.sweep_all_hits(&probe.sweep, &filter, &mut |hit| {
        let Some(target) = hit.entity else {
            return ControlFlow::Continue(());
        };

        if result.hits.is_full() {
            if result.dropped == 0 && cfg!(debug_assertions) {
                crate::logger::log(&format!(
                    "🗡️ Melee sweep of {:?} exceeded {} hits, extra targets dropped",
                    attacker.entity, MAX_MELEE_HITS
                ));
            }
            result.dropped += 1;
            return ControlFlow::Continue(());
        }

        let mut direction = (hit.point - attacker.center).normalize_or_zero();
        if direction == Vec3::ZERO {
            direction = forward;
        }
        let force = direction * probe.damage * IMPACT_FORCE_PER_DAMAGE * probe.force_scale;

        let applied = damage.apply_damage(DamageRequest {
            attacker: Some(attacker.entity),
            target,
            amount: probe.damage,
            flags: probe.flags | DamageFlags::MELEE,
            force,
            position: hit.point,
        });

        let alignment = forward.dot((hit.collider_center - attacker.center).normalize_or_zero());
        result.hits.push(MeleeHit {
            target,
            point: hit.point,
            normal: hit.normal,
            force,
            applied,
            alignment,
        });
        ControlFlow::Continue(())
    });

    // При равном выравнивании побеждает ближний (первый записанный)
    let mut best: Option<(usize, f32)> = None;
    for (index, hit) in result.hits.iter().enumerate() {
        if best.map_or(true, |(_, score)| hit.alignment > score) {
            best = Some((index, hit.alignment));
        }
    }
    result.primary = best.map(|(index, _)| index);

    result
}
