//! Relationship/Classification Collaborator
//!
//! Perception и melee спрашивают "кто это для меня" через `RelationshipClassifier`.
//! `FactionRelations` — таблица отношений между фракциями (resource).

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::components::{Actor, Classification};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect, Serialize, Deserialize)]
pub enum Relationship {
    Hostile,
    Ally,
    Neutral,
    /// Отношение не задано; потребители деградируют его до Neutral
    Unknown,
}

impl Relationship {
    pub fn is_hostile(self) -> bool {
        self == Relationship::Hostile
    }
}

pub trait RelationshipClassifier {
    fn classify(&self, observer: &Actor, other: &Actor) -> Relationship;
}

/// Lookup Actor по Entity (ECS query в системах, HashMap в тестах)
pub trait ActorDirectory {
    fn actor(&self, entity: Entity) -> Option<&Actor>;
}

impl ActorDirectory for Query<'_, '_, &Actor> {
    fn actor(&self, entity: Entity) -> Option<&Actor> {
        self.get(entity).ok()
    }
}

impl ActorDirectory for HashMap<Entity, Actor> {
    fn actor(&self, entity: Entity) -> Option<&Actor> {
        self.get(&entity)
    }
}

/// Таблица отношений фракций
///
/// Своя фракция — всегда Ally, Prop — всегда Neutral, незаданная пара — Unknown.
#[derive(Resource, Debug, Clone, Default)]
pub struct FactionRelations {
    table: HashMap<(u64, u64), Relationship>,
}

impl FactionRelations {
    /// Симметричная запись (a→b и b→a)
    pub fn set(&mut self, a: u64, b: u64, relationship: Relationship) {
        self.table.insert((a, b), relationship);
        self.table.insert((b, a), relationship);
    }

    pub fn with(mut self, a: u64, b: u64, relationship: Relationship) -> Self {
        self.set(a, b, relationship);
        self
    }

    pub fn get(&self, a: u64, b: u64) -> Option<Relationship> {
        self.table.get(&(a, b)).copied()
    }
}

impl RelationshipClassifier for FactionRelations {
    fn classify(&self, observer: &Actor, other: &Actor) -> Relationship {
        if other.classification == Classification::Prop {
            return Relationship::Neutral;
        }
        if observer.faction_id == other.faction_id {
            return Relationship::Ally;
        }
        self.get(observer.faction_id, other.faction_id)
            .unwrap_or(Relationship::Unknown)
    }
}

/// Классифицирует и деградирует Unknown до Neutral (с диагностикой)
pub fn resolve_relationship(
    classifier: &dyn RelationshipClassifier,
    observer: &Actor,
    other: &Actor,
    other_entity: Entity,
) -> Relationship {
    match classifier.classify(observer, other) {
        Relationship::Unknown => {
            crate::logger::log_warning(&format!(
                "⚠️ Can't assess relationship faction {} → {:?} (faction {}), treating as neutral",
                observer.faction_id, other_entity, other.faction_id
            ));
            Relationship::Neutral
        }
        known => known,
    }
}
