//! Perception components: что агент видит/чувствует и кого помнит врагом.

use bevy::prelude::*;

use crate::relations::Relationship;

/// Дальность зрения по умолчанию
pub const DEFAULT_SIGHT_DISTANCE: f32 = 768.0;
/// Радиус swarm sense по умолчанию
pub const DEFAULT_SWARM_SENSE_RADIUS: f32 = 576.0;
/// Long-range агенты видят и чувствуют вдвое дальше
pub const LONG_RANGE_MULTIPLIER: f32 = 2.0;
/// Приманка видна только вблизи
pub const BAIT_SIGHT_LIMIT: f32 = 300.0;
pub const DEFAULT_SWARM_SENSE_INTERVAL: f32 = 0.5;

/// Запись о воспринятом акторе
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct PerceivedTarget {
    pub entity: Entity,
    pub last_known_position: Vec3,
    pub relationship: Relationship,
    /// Требует реакции (только Hostile)
    pub threat: bool,
}

/// Результат последнего refresh'а зрения и swarm sense
///
/// Списки перезаписываются целиком каждый refresh; итерация по ним
/// (`iter_sensed`) стабильна в пределах tick.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
#[require(EnemyMemory)]
pub struct Perception {
    pub sight_distance: f32,
    seen: Vec<PerceivedTarget>,
    swarm_sensed: Vec<PerceivedTarget>,
}

impl Default for Perception {
    fn default() -> Self {
        Self::new(DEFAULT_SIGHT_DISTANCE)
    }
}

impl Perception {
    pub fn new(sight_distance: f32) -> Self {
        Self {
            sight_distance,
            seen: Vec::new(),
            swarm_sensed: Vec::new(),
        }
    }

    pub fn long_range() -> Self {
        Self::new(DEFAULT_SIGHT_DISTANCE * LONG_RANGE_MULTIPLIER)
    }

    pub fn iter_seen(&self) -> std::slice::Iter<'_, PerceivedTarget> {
        self.seen.iter()
    }

    pub fn iter_swarm_sensed(&self) -> std::slice::Iter<'_, PerceivedTarget> {
        self.swarm_sensed.iter()
    }

    /// Все записи: сначала увиденные, потом почувствованные
    pub fn iter_sensed(&self) -> impl Iterator<Item = &PerceivedTarget> {
        self.seen.iter().chain(self.swarm_sensed.iter())
    }

    pub fn threats(&self) -> impl Iterator<Item = &PerceivedTarget> {
        self.iter_sensed().filter(|target| target.threat)
    }

    pub fn senses(&self, entity: Entity) -> bool {
        self.iter_sensed().any(|target| target.entity == entity)
    }

    pub fn set_seen(&mut self, seen: Vec<PerceivedTarget>) {
        self.seen = seen;
    }

    pub fn set_swarm_sensed(&mut self, sensed: Vec<PerceivedTarget>) {
        self.swarm_sensed = sensed;
    }

    /// Оставляет только swarm-записи, для которых `keep` вернул true
    pub fn retain_swarm_sensed(&mut self, mut keep: impl FnMut(Entity) -> bool) {
        self.swarm_sensed.retain(|target| keep(target.entity));
    }
}

/// Capability: радиусное чутьё без line-of-sight (drones, queen)
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
#[require(Perception)]
pub struct SwarmSense {
    pub radius: f32,
    pub interval: f32,
    /// Следующая проверка (fixed elapsed secs); None — ещё не разнесена по времени
    pub next_check: Option<f32>,
}

impl Default for SwarmSense {
    fn default() -> Self {
        Self::new(DEFAULT_SWARM_SENSE_RADIUS)
    }
}

impl SwarmSense {
    pub fn new(radius: f32) -> Self {
        Self {
            radius,
            interval: DEFAULT_SWARM_SENSE_INTERVAL,
            next_check: None,
        }
    }

    pub fn long_range() -> Self {
        Self::new(DEFAULT_SWARM_SENSE_RADIUS * LONG_RANGE_MULTIPLIER)
    }
}

/// Текущий враг агента и где его последний раз ощущали
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
pub struct EnemyMemory {
    pub enemy: Option<Entity>,
    pub last_known_position: Vec3,
    pub last_sensed: f32,
}

impl EnemyMemory {
    pub fn set_enemy(&mut self, enemy: Entity, position: Vec3, now: f32) {
        self.enemy = Some(enemy);
        self.remember(position, now);
    }

    pub fn remember(&mut self, position: Vec3, now: f32) {
        self.last_known_position = position;
        self.last_sensed = now;
    }

    pub fn forget(&mut self) {
        self.enemy = None;
    }
}
