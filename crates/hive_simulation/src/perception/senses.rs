//! Sight и swarm sense как чистые функции над списком кандидатов.

use bevy::prelude::*;

use super::components::{PerceivedTarget, BAIT_SIGHT_LIMIT};
use crate::components::{Actor, Classification};
use crate::relations::{resolve_relationship, Relationship, RelationshipClassifier};
use crate::spatial::{SpatialQuery, Sweep, SweepFilter};

/// Наблюдатель
pub struct SenseObserver<'a> {
    pub entity: Entity,
    pub actor: &'a Actor,
    /// Глаза (центр тела)
    pub eye: Vec3,
    /// Текущий враг из EnemyMemory
    pub remembered_enemy: Option<Entity>,
}

/// Кандидат на восприятие
#[derive(Debug, Clone, Copy)]
pub struct SenseCandidate {
    pub entity: Entity,
    pub actor: Actor,
    /// Origin (у ног) — то, что попадает в last_known_position
    pub position: Vec3,
    /// Центр тела — цель луча зрения
    pub eye: Vec3,
}

#[derive(Debug, Clone, Default)]
pub struct SenseReport {
    pub entries: Vec<PerceivedTarget>,
    /// Позиция запомненного врага, если его ощутили в этом refresh
    pub enemy_position: Option<Vec3>,
}

impl SenseReport {
    fn record(
        &mut self,
        observer: &SenseObserver,
        candidate: &SenseCandidate,
        relationship: Relationship,
    ) {
        self.entries.push(PerceivedTarget {
            entity: candidate.entity,
            last_known_position: candidate.position,
            relationship,
            threat: relationship.is_hostile(),
        });
        // Память о враге обновляется независимо от того, как его классифицировали сейчас
        if observer.remembered_enemy == Some(candidate.entity) {
            self.enemy_position = Some(candidate.position);
        }
    }
}

/// Все кандидаты в пределах `max_distance` с чистой линией видимости
///
/// Луч блокирует только статическая геометрия; акторы друг друга не заслоняют.
pub fn gather_sight(
    observer: &SenseObserver,
    candidates: &[SenseCandidate],
    max_distance: f32,
    spatial: &dyn SpatialQuery,
    relations: &dyn RelationshipClassifier,
) -> SenseReport {
    let mut report = SenseReport::default();

    for candidate in candidates {
        if candidate.entity == observer.entity {
            continue;
        }

        let limit = if candidate.actor.classification == Classification::Bait {
            max_distance.min(BAIT_SIGHT_LIMIT)
        } else {
            max_distance
        };
        if observer.eye.distance(candidate.eye) > limit {
            continue;
        }

        let only_candidate = |entity: Entity| entity == candidate.entity;
        let filter = SweepFilter::solid_except(observer.entity).with_accept(&only_candidate);
        let visible = spatial
            .sweep_first_hit(&Sweep::ray(observer.eye, candidate.eye), &filter)
            .map_or(true, |hit| hit.entity == Some(candidate.entity));
        if !visible {
            continue;
        }

        let relationship = resolve_relationship(relations, observer.actor, &candidate.actor, candidate.entity);
        report.record(observer, candidate, relationship);
    }

    report
}

/// Все кандидаты в радиусе — без line-of-sight
pub fn gather_swarm_sense(
    observer: &SenseObserver,
    candidates: &[SenseCandidate],
    radius: f32,
    relations: &dyn RelationshipClassifier,
) -> SenseReport {
    let mut report = SenseReport::default();

    for candidate in candidates {
        if candidate.entity == observer.entity {
            continue;
        }
        if observer.eye.distance(candidate.eye) > radius {
            continue;
        }

        let relationship = resolve_relationship(relations, observer.actor, &candidate.actor, candidate.entity);
        report.record(observer, candidate, relationship);
    }

    report
}
