//! Attack profiles — статическая конфигурация атак агента.
//!
//! Вместо наследования creature variants каждый агент держит набор
//! `AttackProfile` по слотам (Melee1/Melee2/Range1/Range2), а evaluator и
//! melee resolver — общие функции.

use bevy::prelude::*;
use thiserror::Error;

use crate::combat::DamageFlags;
use crate::spatial::HullExtents;

// ============================================================================
// Slots & facing
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Reflect)]
pub enum AttackSlot {
    Melee1,
    Melee2,
    Range1,
    Range2,
}

impl AttackSlot {
    pub const ALL: [AttackSlot; 4] = [
        AttackSlot::Melee1,
        AttackSlot::Melee2,
        AttackSlot::Range1,
        AttackSlot::Range2,
    ];

    pub fn is_melee(self) -> bool {
        matches!(self, AttackSlot::Melee1 | AttackSlot::Melee2)
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Требование к направлению на цель
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub enum FacingRequirement {
    /// Facing не проверяется
    Ignore,
    /// Минимальный cos угла между forward и направлением на цель
    MinDot(f32),
}

impl FacingRequirement {
    /// Цель в пределах `degrees` от forward
    pub fn within_degrees(degrees: f32) -> Self {
        FacingRequirement::MinDot(degrees.to_radians().cos())
    }
}

// ============================================================================
// Melee strike
// ============================================================================

/// Параметры volumetric sweep'а для melee слота
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeleeStrike {
    /// Длина sweep'а вперёд
    pub reach: f32,
    pub hull: HullExtents,
    pub damage: f32,
    pub flags: DamageFlags,
    pub force_scale: f32,
    /// Бить всех, а не только hostile
    pub damage_any: bool,
}

impl MeleeStrike {
    pub fn new(reach: f32, hull_half: f32, damage: f32) -> Self {
        Self {
            reach,
            hull: HullExtents::cube(hull_half),
            damage,
            flags: DamageFlags::SLASH,
            force_scale: 1.0,
            damage_any: false,
        }
    }

    pub fn with_flags(mut self, flags: DamageFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_force_scale(mut self, force_scale: f32) -> Self {
        self.force_scale = force_scale;
        self
    }

    pub fn hitting_anyone(mut self) -> Self {
        self.damage_any = true;
        self
    }
}

// ============================================================================
// Attack profile
// ============================================================================

#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum ProfileError {
    #[error("min range {min} exceeds max range {max}")]
    InvertedRange { min: f32, max: f32 },
    #[error("{field} must be non-negative, got {value}")]
    Negative { field: &'static str, value: f32 },
    #[error("facing dot {0} is outside [-1, 1]")]
    FacingOutOfRange(f32),
    #[error("slot {0:?} is a melee slot but the profile has no strike")]
    MissingStrike(AttackSlot),
}

/// Одна атака: дистанция, facing, cooldown
///
/// Не меняется после построения (builder + `AttackProfiles::with`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttackProfile {
    pub enabled: bool,
    pub min_range: f32,
    pub max_range: f32,
    pub facing: FacingRequirement,
    pub cooldown: f32,
    /// Boss-профили: max range растёт, когда цель сбоку (`1 + (1 - dot) * boost`)
    pub facing_range_boost: f32,
    /// Использование атаки заводит общий `SharedCooldown` группы
    pub shares_cooldown: bool,
    pub strike: Option<MeleeStrike>,
}

impl AttackProfile {
    pub fn new(min_range: f32, max_range: f32) -> Self {
        Self {
            enabled: true,
            min_range,
            max_range,
            facing: FacingRequirement::Ignore,
            cooldown: 0.0,
            facing_range_boost: 0.0,
            shares_cooldown: false,
            strike: None,
        }
    }

    pub fn melee(max_range: f32, strike: MeleeStrike) -> Self {
        Self::new(0.0, max_range).with_strike(strike)
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::new(0.0, 0.0)
        }
    }

    pub fn with_facing(mut self, facing: FacingRequirement) -> Self {
        self.facing = facing;
        self
    }

    pub fn with_cooldown(mut self, cooldown: f32) -> Self {
        self.cooldown = cooldown;
        self
    }

    pub fn with_facing_range_boost(mut self, boost: f32) -> Self {
        self.facing_range_boost = boost;
        self
    }

    pub fn with_strike(mut self, strike: MeleeStrike) -> Self {
        self.strike = Some(strike);
        self
    }

    pub fn shared_cooldown(mut self) -> Self {
        self.shares_cooldown = true;
        self
    }

    /// Max range с учётом facing boost
    pub fn effective_max_range(&self, facing_dot: f32) -> f32 {
        if self.facing_range_boost > 0.0 && facing_dot > 0.0 {
            self.max_range * (1.0 + (1.0 - facing_dot) * self.facing_range_boost)
        } else {
            self.max_range
        }
    }

    pub fn validate(&self, slot: AttackSlot) -> Result<(), ProfileError> {
        for (field, value) in [
            ("min_range", self.min_range),
            ("max_range", self.max_range),
            ("cooldown", self.cooldown),
            ("facing_range_boost", self.facing_range_boost),
        ] {
            if value < 0.0 {
                return Err(ProfileError::Negative { field, value });
            }
        }
        if self.min_range > self.max_range {
            return Err(ProfileError::InvertedRange {
                min: self.min_range,
                max: self.max_range,
            });
        }
        if let FacingRequirement::MinDot(dot) = self.facing {
            if !(-1.0..=1.0).contains(&dot) {
                return Err(ProfileError::FacingOutOfRange(dot));
            }
        }
        if self.enabled && slot.is_melee() && self.strike.is_none() {
            return Err(ProfileError::MissingStrike(slot));
        }
        Ok(())
    }
}

// ============================================================================
// Components
// ============================================================================

/// Набор атак агента + per-slot cooldown таймеры
///
/// Автоматически добавляет AttackOptions (результат reach-оценки).
#[derive(Component, Debug, Clone, Default)]
#[require(crate::combat::AttackOptions)]
pub struct AttackProfiles {
    profiles: [Option<AttackProfile>; 4],
    cooldowns: [f32; 4],
}

impl AttackProfiles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Добавляет профиль в слот (проверяя его)
    pub fn with(mut self, slot: AttackSlot, profile: AttackProfile) -> Result<Self, ProfileError> {
        profile.validate(slot)?;
        self.profiles[slot.index()] = Some(profile);
        Ok(self)
    }

    pub fn get(&self, slot: AttackSlot) -> Option<&AttackProfile> {
        self.profiles[slot.index()].as_ref()
    }

    pub fn iter(&self) -> impl Iterator<Item = (AttackSlot, &AttackProfile)> {
        AttackSlot::ALL
            .into_iter()
            .filter_map(|slot| self.get(slot).map(|profile| (slot, profile)))
    }

    pub fn cooldown_remaining(&self, slot: AttackSlot) -> f32 {
        self.cooldowns[slot.index()]
    }

    pub fn is_ready(&self, slot: AttackSlot) -> bool {
        self.cooldowns[slot.index()] <= 0.0
    }

    pub fn start_cooldown(&mut self, slot: AttackSlot) {
        if let Some(profile) = self.get(slot) {
            self.cooldowns[slot.index()] = profile.cooldown;
        }
    }

    pub fn tick(&mut self, delta: f32) {
        for timer in self.cooldowns.iter_mut() {
            *timer = (*timer - delta).max(0.0);
        }
    }
}

/// Общий cooldown, разделяемый группой агентов одного типа
///
/// Живёт на отдельной entity, которую создаёт spawning-система; агенты
/// получают ссылку через `CooldownGroup`.
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
pub struct SharedCooldown {
    pub remaining: f32,
}

impl SharedCooldown {
    pub fn is_ready(&self) -> bool {
        self.remaining <= 0.0
    }

    pub fn trigger(&mut self, duration: f32) {
        self.remaining = self.remaining.max(duration);
    }
}

/// Ссылка агента на entity с `SharedCooldown`
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct CooldownGroup(pub Entity);
