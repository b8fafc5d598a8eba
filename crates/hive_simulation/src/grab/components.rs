//! Grab coordinator components: члены группы (Grabber) и босс-владелец (GrabBoss).

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::spatial::CollisionGroup;

/// ID группы в арене `GrabGroups`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Reflect)]
pub struct GrabGroupId(pub u32);

impl GrabGroupId {
    /// Члены группы не мешают placement-поиску друг друга
    pub fn collision_group(self) -> CollisionGroup {
        CollisionGroup(self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum GrabRole {
    /// Координатор: держит health pool, спавнит peers
    Primary,
    Peer,
}

/// Idle → Chasing → Grabbing → Retracting → Done
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum GrabberState {
    /// Под землёй, ещё не в деле
    Idle,
    Chasing,
    Grabbing,
    Retracting,
    /// Удаляется из симуляции
    Done,
}

/// Член grab-группы
///
/// Связь с группой — только через `group` + `role`, без ссылок на других членов.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct Grabber {
    pub group: GrabGroupId,
    pub role: GrabRole,
    pub state: GrabberState,
    /// Текущая скорость chase
    pub speed: f32,
    pub chase_elapsed: f32,
    pub grab_elapsed: f32,
    /// До следующего тика grab-урона
    pub damage_timer: f32,
    /// Retract presentation дошла до "ушёл под землю" — можно двигаться домой
    pub retract_ready: bool,
}

impl Grabber {
    pub fn new(group: GrabGroupId, role: GrabRole) -> Self {
        Self {
            group,
            role,
            state: GrabberState::Idle,
            speed: 0.0,
            chase_elapsed: 0.0,
            grab_elapsed: 0.0,
            damage_timer: 0.0,
            retract_ready: false,
        }
    }

    pub fn is_done(&self) -> bool {
        self.state == GrabberState::Done
    }

    /// Над землёй: участвует в sweep'ах и получает обычный урон
    pub fn is_exposed(&self) -> bool {
        match self.state {
            GrabberState::Grabbing => true,
            GrabberState::Retracting => !self.retract_ready,
            GrabberState::Idle | GrabberState::Chasing | GrabberState::Done => false,
        }
    }

    pub fn begin_chase(&mut self, start_speed: f32) {
        self.state = GrabberState::Chasing;
        self.speed = start_speed;
        self.chase_elapsed = 0.0;
    }

    pub fn begin_grab(&mut self, damage_interval: f32) {
        self.state = GrabberState::Grabbing;
        self.grab_elapsed = 0.0;
        self.damage_timer = damage_interval;
    }

    /// Переход в Retracting. Возвращает true, если нужна retract-поза
    /// (член был над землёй); из Idle/Chasing он уже под землёй и сразу готов двигаться.
    pub fn begin_retract(&mut self) -> bool {
        match self.state {
            GrabberState::Grabbing => {
                self.state = GrabberState::Retracting;
                self.retract_ready = false;
                true
            }
            GrabberState::Idle | GrabberState::Chasing => {
                self.state = GrabberState::Retracting;
                self.retract_ready = true;
                false
            }
            GrabberState::Retracting | GrabberState::Done => false,
        }
    }

    pub fn finish(&mut self) {
        self.state = GrabberState::Done;
    }
}

/// Параметры grab-атаки (per boss)
#[derive(Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
#[serde(default)]
pub struct GrabAttackConfig {
    /// Сколько peers спавнит primary
    pub peer_count: usize,
    /// Секунды между grab-атаками босса
    pub attack_interval: f32,
    /// Шанс начать атаку, когда интервал истёк
    pub attack_chance: f32,
    pub plunge_duration: f32,
    pub unplunge_duration: f32,
    /// Где primary выходит из-под босса (вперёд от него)
    pub diver_spot_distance: f32,

    pub chase_start_speed: f32,
    pub chase_acceleration: f32,
    pub chase_max_speed: f32,
    /// None — без лимита
    pub max_chase_duration: Option<f32>,
    pub approach_distance: f32,
    pub vertical_tolerance: f32,
    /// Дальше этого цель "вырвалась" из захвата
    pub release_distance: f32,

    pub max_grab_duration: f32,
    pub grab_damage: f32,
    pub grab_damage_interval: f32,

    pub placement_offset: f32,
    pub placement_attempts: u32,
    /// Градусы между попытками
    pub placement_angle_step: f32,
    pub placement_probe_half_extent: f32,
    /// Высота нижнего probe над землёй
    pub ground_clearance: f32,
    pub head_height: f32,

    pub retract_speed: f32,
    pub home_tolerance: f32,

    pub member_health: f32,
    pub member_radius: f32,
    pub member_half_height: f32,
}

impl Default for GrabAttackConfig {
    fn default() -> Self {
        Self {
            peer_count: 5,
            attack_interval: 20.0,
            attack_chance: 1.0,
            plunge_duration: 1.0,
            unplunge_duration: 1.5,
            diver_spot_distance: 64.0,
            chase_start_speed: 60.0,
            chase_acceleration: 240.0,
            chase_max_speed: 320.0,
            max_chase_duration: None,
            approach_distance: 48.0,
            vertical_tolerance: 64.0,
            release_distance: 128.0,
            max_grab_duration: 5.0,
            grab_damage: 4.0,
            grab_damage_interval: 0.5,
            placement_offset: 40.0,
            placement_attempts: 8,
            placement_angle_step: 45.0,
            placement_probe_half_extent: 8.0,
            ground_clearance: 12.0,
            head_height: 60.0,
            retract_speed: 250.0,
            home_tolerance: 4.0,
            member_health: 100.0,
            member_radius: 12.0,
            member_half_height: 30.0,
        }
    }
}

impl GrabAttackConfig {
    /// Queen: chase ограничен 6 секундами
    pub fn boss_default() -> Self {
        Self {
            max_chase_duration: Some(6.0),
            ..Self::default()
        }
    }
}

/// Фаза "diver" цикла босса
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub enum DiverPhase {
    Idle,
    /// Primary уже создан под землёй, босс "ныряет"
    Plunging { remaining: f32 },
    Chasing,
    Grabbing,
    Retracting,
    Unplunging { remaining: f32 },
}

#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum GrabStartError {
    #[error("a grab group is already active")]
    AlreadyActive,
    #[error("no living enemy to grab")]
    NoTarget,
    #[error("grab attack on cooldown for {remaining:.2}s")]
    OnCooldown { remaining: f32 },
}

/// Босс, владеющий не более чем одной grab-группой
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct GrabBoss {
    pub config: GrabAttackConfig,
    pub phase: DiverPhase,
    pub active_group: Option<GrabGroupId>,
    /// Fixed elapsed secs, раньше которого новая атака не начнётся
    pub next_attack_at: f32,
}

impl Default for GrabBoss {
    fn default() -> Self {
        Self::new(GrabAttackConfig::boss_default())
    }
}

impl GrabBoss {
    pub fn new(config: GrabAttackConfig) -> Self {
        Self {
            next_attack_at: config.attack_interval,
            config,
            phase: DiverPhase::Idle,
            active_group: None,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.phase != DiverPhase::Idle || self.active_group.is_some()
    }

    /// Проверка перед стартом атаки; возвращает цель
    pub fn try_start_grab_attack(&self, now: f32, target: Option<Entity>) -> Result<Entity, GrabStartError> {
        if self.is_busy() {
            return Err(GrabStartError::AlreadyActive);
        }
        let target = target.ok_or(GrabStartError::NoTarget)?;
        if now < self.next_attack_at {
            return Err(GrabStartError::OnCooldown {
                remaining: self.next_attack_at - now,
            });
        }
        Ok(target)
    }

    pub fn schedule_next_attack(&mut self, now: f32) {
        self.next_attack_at = now + self.config.attack_interval;
    }
}
