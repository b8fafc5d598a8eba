//! Базовые компоненты акторов: Actor, Health, CollisionVolume

use bevy::math::bounding::Aabb3d;
use bevy::math::Vec3A;
use bevy::prelude::*;

/// Актор (marine, alien, boss, grabber, bait) — базовый компонент для всего, что участвует в бою
///
/// Автоматически добавляет Health, CollisionVolume, Transform через Required Components.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
#[require(Health, CollisionVolume, Transform)]
pub struct Actor {
    /// Stable ID фракции (для FactionRelations)
    pub faction_id: u64,
    /// Явная классификация вместо проверки конкретного типа
    pub classification: Classification,
}

impl Actor {
    pub fn new(faction_id: u64, classification: Classification) -> Self {
        Self {
            faction_id,
            classification,
        }
    }

    pub fn classification(&self) -> Classification {
        self.classification
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Reflect)]
pub enum Classification {
    Marine,
    #[default]
    Alien,
    /// Босс, владеющий grab-группой (queen)
    Boss,
    /// Член grab-группы (primary или peer)
    Grabber,
    /// Приманка: видна только вблизи
    Bait,
    /// Разрушаемый prop: получает урон, но не участвует в отношениях
    Prop,
}

/// Здоровье актора
///
/// Инвариант: 0 ≤ current ≤ max
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Health {
    pub current: f32,
    pub max: f32,
}

impl Default for Health {
    fn default() -> Self {
        Self::new(100.0) // Default 100 HP
    }
}

impl Health {
    pub fn new(max: f32) -> Self {
        Self { current: max, max }
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0.0
    }

    /// Возвращает реально снятое здоровье (не больше текущего)
    pub fn take_damage(&mut self, amount: f32) -> f32 {
        let applied = amount.max(0.0).min(self.current);
        self.current -= applied;
        applied
    }

    pub fn heal(&mut self, amount: f32) {
        self.current = (self.current + amount.max(0.0)).min(self.max);
    }
}

/// Коллизионный объём актора (axis-aligned box)
///
/// Origin актора — у ног (Transform.translation), box стоит на нём:
/// центр = origin + (0, half_extents.y, 0).
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct CollisionVolume {
    pub half_extents: Vec3,
}

impl Default for CollisionVolume {
    fn default() -> Self {
        // Human-sized hull: 26×72×26
        Self::new(Vec3::new(13.0, 36.0, 13.0))
    }
}

impl CollisionVolume {
    pub fn new(half_extents: Vec3) -> Self {
        Self { half_extents }
    }

    pub fn half_height(&self) -> f32 {
        self.half_extents.y
    }

    pub fn center_at(&self, origin: Vec3) -> Vec3 {
        origin + Vec3::Y * self.half_extents.y
    }

    pub fn bounds_at(&self, origin: Vec3) -> Aabb3d {
        Aabb3d::new(
            Vec3A::from(self.center_at(origin)),
            Vec3A::from(self.half_extents),
        )
    }
}

/// Множитель входящего урона (queen получает 0.2×)
///
/// Forced kill множитель игнорирует.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct DamageResistance {
    pub scale: f32,
}

impl Default for DamageResistance {
    fn default() -> Self {
        Self { scale: 1.0 }
    }
}
