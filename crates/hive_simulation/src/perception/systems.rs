//! Perception systems (sight + swarm sense refresh).

use bevy::prelude::*;
use rand::Rng;

use super::components::{EnemyMemory, Perception, SwarmSense};
use super::senses::{gather_sight, gather_swarm_sense, SenseCandidate, SenseObserver};
use crate::combat::Dead;
use crate::components::{Actor, CollisionVolume};
use crate::relations::FactionRelations;
use crate::spatial::CollisionWorld;
use crate::DeterministicRng;

/// Живые акторы в стабильном порядке (по Entity)
fn collect_candidates(
    candidates: &Query<(Entity, &Actor, &Transform, &CollisionVolume), Without<Dead>>,
) -> Vec<SenseCandidate> {
    let mut list: Vec<SenseCandidate> = candidates
        .iter()
        .map(|(entity, actor, transform, volume)| SenseCandidate {
            entity,
            actor: *actor,
            position: transform.translation,
            eye: volume.center_at(transform.translation),
        })
        .collect();
    list.sort_by_key(|candidate| candidate.entity);
    list
}

/// System: зрение (каждый tick)
pub fn refresh_sight(
    time: Res<Time<Fixed>>,
    world: Res<CollisionWorld>,
    relations: Res<FactionRelations>,
    mut observers: Query<
        (Entity, &Actor, &Transform, &CollisionVolume, &mut Perception, &mut EnemyMemory),
        Without<Dead>,
    >,
    candidates: Query<(Entity, &Actor, &Transform, &CollisionVolume), Without<Dead>>,
) {
    let now = time.elapsed_secs();
    let all = collect_candidates(&candidates);

    for (entity, actor, transform, volume, mut perception, mut memory) in observers.iter_mut() {
        let observer = SenseObserver {
            entity,
            actor,
            eye: volume.center_at(transform.translation),
            remembered_enemy: memory.enemy,
        };
        let report = gather_sight(&observer, &all, perception.sight_distance, &*world, &*relations);

        if let Some(position) = report.enemy_position {
            memory.remember(position, now);
        }
        perception.set_seen(report.entries);
    }
}

/// System: swarm sense (раз в `interval`, старт разнесён deterministic RNG)
///
/// Между проверками список не пересчитывается, но погибшие и исчезнувшие
/// акторы выкидываются из него каждый tick.
pub fn refresh_swarm_sense(
    time: Res<Time<Fixed>>,
    relations: Res<FactionRelations>,
    mut rng: ResMut<DeterministicRng>,
    mut observers: Query<
        (Entity, &Actor, &Transform, &CollisionVolume, &mut SwarmSense, &mut Perception, &mut EnemyMemory),
        Without<Dead>,
    >,
    candidates: Query<(Entity, &Actor, &Transform, &CollisionVolume), Without<Dead>>,
) {
    let now = time.elapsed_secs();
    let mut all: Option<Vec<SenseCandidate>> = None;

    // Порядок observers влияет на RNG — сортируем
    let mut order: Vec<Entity> = observers.iter().map(|(entity, ..)| entity).collect();
    order.sort();

    for observer_entity in order {
        let Ok((entity, actor, transform, volume, mut sense, mut perception, mut memory)) =
            observers.get_mut(observer_entity)
        else {
            continue;
        };

        if perception
            .iter_swarm_sensed()
            .any(|target| !candidates.contains(target.entity))
        {
            perception.retain_swarm_sensed(|sensed| candidates.contains(sensed));
        }

        let next_check = match sense.next_check {
            Some(next) => next,
            None => {
                // Первая проверка — случайно внутри интервала, чтобы рой не думал синхронно
                let offset = if sense.interval > 0.0 {
                    rng.rng.gen_range(0.0..sense.interval)
                } else {
                    0.0
                };
                sense.next_check = Some(now + offset);
                now + offset
            }
        };
        if now < next_check {
            continue;
        }
        sense.next_check = Some(now + sense.interval);

        let all = all.get_or_insert_with(|| collect_candidates(&candidates));
        let observer = SenseObserver {
            entity,
            actor,
            eye: volume.center_at(transform.translation),
            remembered_enemy: memory.enemy,
        };
        let report = gather_swarm_sense(&observer, all, sense.radius, &*relations);

        if let Some(position) = report.enemy_position {
            memory.remember(position, now);
        }
        perception.set_swarm_sensed(report.entries);
    }
}
