//! Damage types, events и Damage Dispatch Collaborator.
//!
//! Ядро не интерпретирует damage taxonomy дальше флагов, которые выставляет само:
//! melee, shock/burn (подавляют bleed), grab, forced kill.

use bevy::prelude::*;
use bitflags::bitflags;

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct DamageFlags: u32 {
        const MELEE = 1 << 0;
        const SLASH = 1 << 1;
        const CLUB = 1 << 2;
        const SHOCK = 1 << 3;
        const BURN = 1 << 4;
        /// Урон от удержания grab-группой
        const GRAB = 1 << 5;
        /// "Overwhelming damage": обходит gating и resistance, не перенаправляется
        const FORCED_KILL = 1 << 6;
    }
}

impl DamageFlags {
    pub fn is_forced_kill(self) -> bool {
        self.contains(DamageFlags::FORCED_KILL)
    }

    /// Shock/burn урон не вызывает кровотечения
    pub fn suppresses_bleed(self) -> bool {
        self.intersects(DamageFlags::SHOCK | DamageFlags::BURN)
    }
}

/// Запрос на урон (очередь обрабатывает `apply_damage_requests`)
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct DamageRequest {
    pub attacker: Option<Entity>,
    pub target: Entity,
    pub amount: f32,
    pub flags: DamageFlags,
    pub force: Vec3,
    pub position: Vec3,
}

impl DamageRequest {
    pub fn forced_kill(target: Entity, attacker: Option<Entity>, position: Vec3) -> Self {
        Self {
            attacker,
            target,
            amount: f32::MAX,
            flags: DamageFlags::FORCED_KILL,
            force: Vec3::ZERO,
            position,
        }
    }
}

/// Damage Dispatch Collaborator
///
/// Возвращает количество урона, принятое к применению. Для очереди событий это
/// запрошенный amount; фактическое списание (resistance, redirect) видно в `DamageDealt`.
pub trait DamageDispatch {
    fn apply_damage(&mut self, request: DamageRequest) -> f32;
}

impl DamageDispatch for EventWriter<'_, DamageRequest> {
    fn apply_damage(&mut self, request: DamageRequest) -> f32 {
        self.write(request);
        request.amount
    }
}

/// Сборщик запросов (тесты, batch-обработка)
impl DamageDispatch for Vec<DamageRequest> {
    fn apply_damage(&mut self, request: DamageRequest) -> f32 {
        self.push(request);
        request.amount
    }
}

/// Событие: урон применён
#[derive(Event, Debug, Clone)]
pub struct DamageDealt {
    pub attacker: Option<Entity>,
    /// Чьё здоровье реально уменьшилось
    pub target: Entity,
    pub amount: f32,
    pub flags: DamageFlags,
    pub force: Vec3,
    pub position: Vec3,
    /// Peer grab-группы, чей урон ушёл в health pool primary
    pub redirected_from: Option<Entity>,
}

/// Событие: entity умерла (Health дошло до 0)
#[derive(Event, Debug, Clone)]
pub struct EntityDied {
    pub entity: Entity,
    pub killer: Option<Entity>,
    pub flags: DamageFlags,
}

/// Событие: кровь от melee попадания (presentation)
#[derive(Event, Debug, Clone)]
pub struct BleedEffect {
    pub target: Entity,
    pub position: Vec3,
    pub direction: Vec3,
}

/// Компонент-маркер: entity мертва (Health <= 0)
///
/// Трупы остаются на месте до `DespawnAfter`.
#[derive(Component, Debug)]
pub struct Dead;

/// Компонент-маркер: деспавн entity после указанного времени
#[derive(Component, Debug)]
pub struct DespawnAfter {
    /// Время деспавна (в секундах fixed-времени)
    pub despawn_time: f32,
}
