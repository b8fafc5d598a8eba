//! Spatial Query Collaborator
//!
//! Контракт sweep-запросов (box sweep между двумя точками) и высоты земли.
//! Ядро (perception, melee, grab placement) работает только через трейты
//! `SpatialQuery` / `GroundHeight`; `CollisionWorld` — in-crate реализация на
//! bevy_math bounding volumes.

use bevy::prelude::*;
use std::ops::ControlFlow;

pub mod world;


pub use world::{sync_collision_world, ActorCollider, CollisionWorld, FloorPatch};

/// Коллизионная группа (все члены одной grab-группы делят её)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub struct CollisionGroup(pub u32);

/// Объём sweep'а относительно центра (mins ≤ 0 ≤ maxs)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HullExtents {
    pub mins: Vec3,
    pub maxs: Vec3,
}

impl HullExtents {
    /// Нулевой объём — луч
    pub const POINT: Self = Self {
        mins: Vec3::ZERO,
        maxs: Vec3::ZERO,
    };

    pub fn new(mins: Vec3, maxs: Vec3) -> Self {
        Self { mins, maxs }
    }

    pub fn cube(half: f32) -> Self {
        Self {
            mins: Vec3::splat(-half),
            maxs: Vec3::splat(half),
        }
    }
}

/// Один sweep: объём `volume` протаскивается от `start` до `end`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sweep {
    pub start: Vec3,
    pub end: Vec3,
    pub volume: HullExtents,
}

impl Sweep {
    pub fn new(start: Vec3, end: Vec3, volume: HullExtents) -> Self {
        Self { start, end, volume }
    }

    pub fn ray(start: Vec3, end: Vec3) -> Self {
        Self::new(start, end, HullExtents::POINT)
    }
}

/// Результат пересечения
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepHit {
    /// None — статическая геометрия мира
    pub entity: Option<Entity>,
    /// Позиция центра объёма в момент контакта
    pub point: Vec3,
    pub normal: Vec3,
    /// Дистанция вдоль sweep'а
    pub distance: f32,
    /// Центр задетого collider'а (для world hit совпадает с point)
    pub collider_center: Vec3,
}

/// Исключения для sweep'а: по identity, по коллизионной группе, по отношениям
/// (через `accept`), плюс флаг "мир блокирует".
#[derive(Clone, Copy, Default)]
pub struct SweepFilter<'a> {
    pub ignore_entity: Option<Entity>,
    pub ignore_group: Option<CollisionGroup>,
    /// Статическая геометрия участвует в sweep'е
    pub hit_world: bool,
    /// Актор засчитывается, только если predicate вернул true
    pub accept: Option<&'a dyn Fn(Entity) -> bool>,
}

impl<'a> SweepFilter<'a> {
    /// Мир + все акторы кроме `entity`
    pub fn solid_except(entity: Entity) -> Self {
        Self {
            ignore_entity: Some(entity),
            hit_world: true,
            ..Default::default()
        }
    }

    pub fn with_group(mut self, group: CollisionGroup) -> Self {
        self.ignore_group = Some(group);
        self
    }

    pub fn with_accept(mut self, accept: &'a dyn Fn(Entity) -> bool) -> Self {
        self.accept = Some(accept);
        self
    }

    pub fn passes(&self, entity: Entity, group: Option<CollisionGroup>) -> bool {
        if self.ignore_entity == Some(entity) {
            return false;
        }
        if self.ignore_group.is_some() && self.ignore_group == group {
            return false;
        }
        self.accept.map_or(true, |accept| accept(entity))
    }
}

pub trait SpatialQuery {
    /// Ближайшее пересечение (мир или актор), прошедшее фильтр
    fn sweep_first_hit(&self, sweep: &Sweep, filter: &SweepFilter) -> Option<SweepHit>;

    /// Все пересечения с акторами по возрастанию дистанции.
    ///
    /// Если `filter.hit_world`, sweep останавливается на первой статической геометрии.
    /// `visit` может прервать обход через `ControlFlow::Break`.
    fn sweep_all_hits(
        &self,
        sweep: &Sweep,
        filter: &SweepFilter,
        visit: &mut dyn FnMut(SweepHit) -> ControlFlow<()>,
    );
}

pub trait GroundHeight {
    fn ground_height_at(&self, position: Vec3) -> f32;
}
