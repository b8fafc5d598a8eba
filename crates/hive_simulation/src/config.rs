//! Конфигурация симуляции (JSON).
//!
//! Всё, что не задано в файле, берётся из `Default` (`#[serde(default)]`).

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::grab::GrabAttackConfig;
use crate::relations::{FactionRelations, Relationship};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

/// Запись таблицы отношений (симметричная)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactionRelationEntry {
    pub a: u64,
    pub b: u64,
    pub relationship: Relationship,
}

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Частота FixedUpdate
    pub tick_hz: f64,
    pub seed: u64,
    /// Сколько секунд труп лежит до despawn
    pub corpse_lifetime: f32,
    pub factions: Vec<FactionRelationEntry>,
    /// Grab-атака по умолчанию для боссов
    pub grab: GrabAttackConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_hz: 60.0,
            seed: 42,
            corpse_lifetime: 10.0,
            factions: Vec::new(),
            grab: GrabAttackConfig::boss_default(),
        }
    }
}

impl SimulationConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.tick_hz > 0.0) {
            return Err(invalid("tick_hz", format!("must be positive, got {}", self.tick_hz)));
        }
        if self.corpse_lifetime < 0.0 {
            return Err(invalid("corpse_lifetime", "must be non-negative"));
        }
        self.grab.validate()
    }

    pub fn faction_relations(&self) -> FactionRelations {
        let mut relations = FactionRelations::default();
        for entry in &self.factions {
            relations.set(entry.a, entry.b, entry.relationship);
        }
        relations
    }
}

impl GrabAttackConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("grab.attack_interval", self.attack_interval),
            ("grab.plunge_duration", self.plunge_duration),
            ("grab.unplunge_duration", self.unplunge_duration),
            ("grab.chase_acceleration", self.chase_acceleration),
            ("grab.approach_distance", self.approach_distance),
            ("grab.vertical_tolerance", self.vertical_tolerance),
            ("grab.max_grab_duration", self.max_grab_duration),
            ("grab.grab_damage", self.grab_damage),
            ("grab.placement_offset", self.placement_offset),
            ("grab.home_tolerance", self.home_tolerance),
        ] {
            if value < 0.0 {
                return Err(invalid(field, format!("must be non-negative, got {}", value)));
            }
        }
        for (field, value) in [
            ("grab.chase_max_speed", self.chase_max_speed),
            ("grab.retract_speed", self.retract_speed),
            ("grab.grab_damage_interval", self.grab_damage_interval),
            ("grab.member_health", self.member_health),
        ] {
            if value <= 0.0 {
                return Err(invalid(field, format!("must be positive, got {}", value)));
            }
        }
        if !(0.0..=1.0).contains(&self.attack_chance) {
            return Err(invalid("grab.attack_chance", "must be within [0, 1]"));
        }
        if self.chase_start_speed > self.chase_max_speed {
            return Err(invalid("grab.chase_start_speed", "exceeds chase_max_speed"));
        }
        if self.release_distance < self.approach_distance {
            return Err(invalid("grab.release_distance", "is shorter than approach_distance"));
        }
        if self.max_chase_duration.is_some_and(|limit| limit <= 0.0) {
            return Err(invalid("grab.max_chase_duration", "must be positive when set"));
        }
        Ok(())
    }
}
