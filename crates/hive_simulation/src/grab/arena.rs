//! Арена grab-групп.
//!
//! Группа — запись в `GrabGroups` (resource), члены ссылаются на неё по
//! `GrabGroupId`. BTreeMap даёт стабильный порядок обхода между запусками.

use bevy::prelude::*;
use std::collections::BTreeMap;

use super::components::{GrabAttackConfig, GrabGroupId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum GroupPhase {
    /// Primary создан, босс ещё ныряет
    Forming,
    Chasing,
    Grabbing,
    Retracting,
}

#[derive(Debug, Clone)]
pub struct GrabGroup {
    pub id: GrabGroupId,
    pub boss: Entity,
    pub target: Entity,
    /// Точка выхода (сюда возвращаются при retract)
    pub origin: Vec3,
    pub primary: Entity,
    /// В порядке создания
    pub peers: Vec<Entity>,
    pub phase: GroupPhase,
    /// Forced teardown уже выполнен (повторный не нужен)
    pub disbanded: bool,
    pub config: GrabAttackConfig,
    pub faction_id: u64,
}

impl GrabGroup {
    pub fn new(
        id: GrabGroupId,
        boss: Entity,
        target: Entity,
        origin: Vec3,
        primary: Entity,
        config: GrabAttackConfig,
        faction_id: u64,
    ) -> Self {
        Self {
            id,
            boss,
            target,
            origin,
            primary,
            peers: Vec::new(),
            phase: GroupPhase::Forming,
            disbanded: false,
            config,
            faction_id,
        }
    }

    /// Primary первым, затем peers по порядку создания
    pub fn members(&self) -> impl Iterator<Item = Entity> + '_ {
        std::iter::once(self.primary).chain(self.peers.iter().copied())
    }
}

#[derive(Resource, Debug, Default)]
pub struct GrabGroups {
    next_id: u32,
    groups: BTreeMap<GrabGroupId, GrabGroup>,
}

impl GrabGroups {
    pub fn reserve_id(&mut self) -> GrabGroupId {
        let id = GrabGroupId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn insert(&mut self, group: GrabGroup) {
        self.groups.insert(group.id, group);
    }

    pub fn get(&self, id: GrabGroupId) -> Option<&GrabGroup> {
        self.groups.get(&id)
    }

    pub fn get_mut(&mut self, id: GrabGroupId) -> Option<&mut GrabGroup> {
        self.groups.get_mut(&id)
    }

    pub fn remove(&mut self, id: GrabGroupId) -> Option<GrabGroup> {
        self.groups.remove(&id)
    }

    /// Снимок ID (для обхода с мутацией)
    pub fn ids(&self) -> Vec<GrabGroupId> {
        self.groups.keys().copied().collect()
    }

    pub fn group_of_boss(&self, boss: Entity) -> Option<GrabGroupId> {
        self.groups
            .values()
            .find(|group| group.boss == boss)
            .map(|group| group.id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &GrabGroup> {
        self.groups.values()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
