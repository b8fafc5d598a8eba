//! CollisionWorld — box-sweep мир на bevy_math bounding volumes.
//!
//! Статика (obstacles, floor patches) задаётся при построении уровня,
//! actor colliders пересобираются каждый tick из ECS (`sync_collision_world`).

use bevy::math::bounding::{Aabb3d, AabbCast3d, BoundingVolume, IntersectsVolume};
use bevy::math::{Dir3A, Vec3A};
use bevy::prelude::*;
use std::ops::ControlFlow;

use super::{CollisionGroup, GroundHeight, SpatialQuery, Sweep, SweepFilter, SweepHit};
use crate::combat::Dead;
use crate::components::{Actor, CollisionVolume};
use crate::grab::Grabber;

/// Прямоугольный участок пола (XZ) с собственной высотой
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloorPatch {
    pub min: Vec2,
    pub max: Vec2,
    pub height: f32,
}

impl FloorPatch {
    pub fn contains(&self, position: Vec3) -> bool {
        position.x >= self.min.x
            && position.x <= self.max.x
            && position.z >= self.min.y
            && position.z <= self.max.y
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ActorCollider {
    pub entity: Entity,
    pub bounds: Aabb3d,
    pub group: Option<CollisionGroup>,
}

#[derive(Resource, Debug, Clone, Default)]
pub struct CollisionWorld {
    obstacles: Vec<Aabb3d>,
    floors: Vec<FloorPatch>,
    base_floor: f32,
    actors: Vec<ActorCollider>,
}

impl CollisionWorld {
    pub fn with_base_floor(base_floor: f32) -> Self {
        Self {
            base_floor,
            ..Default::default()
        }
    }

    /// Статический box (стена, колонна)
    pub fn add_obstacle(&mut self, min: Vec3, max: Vec3) {
        self.obstacles.push(Aabb3d {
            min: Vec3A::from(min),
            max: Vec3A::from(max),
        });
    }

    pub fn add_floor_patch(&mut self, patch: FloorPatch) {
        self.floors.push(patch);
    }

    pub fn set_actor_colliders(&mut self, actors: Vec<ActorCollider>) {
        self.actors = actors;
    }

    pub fn actor_colliders(&self) -> &[ActorCollider] {
        &self.actors
    }

    /// Дистанция контакта объёма `sweep` с box'ом `bounds`, None — промах
    fn contact_distance(sweep: &Sweep, cast: Option<&AabbCast3d>, bounds: Aabb3d) -> Option<f32> {
        match cast {
            Some(cast) => cast.aabb_collision_at(bounds),
            // Нулевая длина: sweep вырождается в overlap-тест
            None => {
                let probe = Aabb3d {
                    min: Vec3A::from(sweep.start + sweep.volume.mins),
                    max: Vec3A::from(sweep.start + sweep.volume.maxs),
                };
                probe.intersects(&bounds).then_some(0.0)
            }
        }
    }

    fn make_hit(
        sweep: &Sweep,
        entity: Option<Entity>,
        bounds: Aabb3d,
        distance: f32,
    ) -> SweepHit {
        let direction = (sweep.end - sweep.start).normalize_or_zero();
        let point = sweep.start + direction * distance;
        let expanded = Aabb3d {
            min: bounds.min - Vec3A::from(sweep.volume.maxs),
            max: bounds.max - Vec3A::from(sweep.volume.mins),
        };
        SweepHit {
            entity,
            point,
            normal: contact_normal(&expanded, point),
            distance,
            collider_center: match entity {
                Some(_) => Vec3::from(bounds.center()),
                None => point,
            },
        }
    }

    fn nearest_world_hit(&self, sweep: &Sweep, cast: Option<&AabbCast3d>) -> Option<SweepHit> {
        self.obstacles
            .iter()
            .filter_map(|bounds| {
                Self::contact_distance(sweep, cast, *bounds)
                    .map(|distance| Self::make_hit(sweep, None, *bounds, distance))
            })
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }

    fn actor_hits(
        &self,
        sweep: &Sweep,
        cast: Option<&AabbCast3d>,
        filter: &SweepFilter,
    ) -> Vec<SweepHit> {
        let mut hits: Vec<SweepHit> = self
            .actors
            .iter()
            .filter(|collider| filter.passes(collider.entity, collider.group))
            .filter_map(|collider| {
                Self::contact_distance(sweep, cast, collider.bounds).map(|distance| {
                    Self::make_hit(sweep, Some(collider.entity), collider.bounds, distance)
                })
            })
            .collect();
        // Стабильная сортировка: при равной дистанции порядок регистрации сохраняется
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }
}

fn build_cast(sweep: &Sweep) -> Option<AabbCast3d> {
    let delta = sweep.end - sweep.start;
    let direction = Dir3A::new(Vec3A::from(delta)).ok()?;
    Some(AabbCast3d::new(
        Aabb3d {
            min: Vec3A::from(sweep.volume.mins),
            max: Vec3A::from(sweep.volume.maxs),
        },
        Vec3A::from(sweep.start),
        direction,
        delta.length(),
    ))
}

/// Нормаль грани expanded box'а, ближайшей к точке контакта
fn contact_normal(expanded: &Aabb3d, point: Vec3) -> Vec3 {
    let p = Vec3A::from(point);
    let candidates = [
        ((p.x - expanded.min.x).abs(), Vec3::NEG_X),
        ((expanded.max.x - p.x).abs(), Vec3::X),
        ((p.y - expanded.min.y).abs(), Vec3::NEG_Y),
        ((expanded.max.y - p.y).abs(), Vec3::Y),
        ((p.z - expanded.min.z).abs(), Vec3::NEG_Z),
        ((expanded.max.z - p.z).abs(), Vec3::Z),
    ];
    candidates
        .iter()
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, normal)| *normal)
        .unwrap_or(Vec3::Y)
}

impl SpatialQuery for CollisionWorld {
    fn sweep_first_hit(&self, sweep: &Sweep, filter: &SweepFilter) -> Option<SweepHit> {
        let cast = build_cast(sweep);
        let world_hit = if filter.hit_world {
            self.nearest_world_hit(sweep, cast.as_ref())
        } else {
            None
        };
        let actor_hit = self
            .actor_hits(sweep, cast.as_ref(), filter)
            .into_iter()
            .next();

        match (world_hit, actor_hit) {
            (Some(world), Some(actor)) if actor.distance <= world.distance => Some(actor),
            (Some(world), _) => Some(world),
            (None, actor) => actor,
        }
    }

    fn sweep_all_hits(
        &self,
        sweep: &Sweep,
        filter: &SweepFilter,
        visit: &mut dyn FnMut(SweepHit) -> ControlFlow<()>,
    ) {
        let cast = build_cast(sweep);
        let wall_distance = if filter.hit_world {
            self.nearest_world_hit(sweep, cast.as_ref())
                .map_or(f32::INFINITY, |hit| hit.distance)
        } else {
            f32::INFINITY
        };

        for hit in self.actor_hits(sweep, cast.as_ref(), filter) {
            // Стена останавливает sweep: всё, что за ней, недостижимо
            if hit.distance > wall_distance {
                break;
            }
            if visit(hit).is_break() {
                break;
            }
        }
    }
}

impl GroundHeight for CollisionWorld {
    fn ground_height_at(&self, position: Vec3) -> f32 {
        self.floors
            .iter()
            .filter(|patch| patch.contains(position))
            .map(|patch| patch.height)
            .fold(self.base_floor, f32::max)
    }
}

/// Система: пересобирает actor colliders из ECS
///
/// Мёртвые и закопанные (underground) grabber'ы не участвуют в sweep'ах.
pub fn sync_collision_world(
    mut world: ResMut<CollisionWorld>,
    actors: Query<(Entity, &Transform, &CollisionVolume, Option<&Grabber>), (With<Actor>, Without<Dead>)>,
) {
    let mut colliders: Vec<ActorCollider> = actors
        .iter()
        .filter(|(_, _, _, grabber)| grabber.map_or(true, |g| g.is_exposed()))
        .map(|(entity, transform, volume, grabber)| ActorCollider {
            entity,
            bounds: volume.bounds_at(transform.translation),
            group: grabber.map(|g| g.group.collision_group()),
        })
        .collect();

    // Query order не гарантирован — сортируем для детерминизма
    colliders.sort_by_key(|collider| collider.entity);
    world.set_actor_colliders(colliders);
}
