//! HIVE Simulation Core
//!
//! ECS-симуляция боевого AI роя на Bevy 0.16 (headless):
//! - Perception: зрение с LOS + swarm sense без LOS
//! - Attack reach: какие атаки доступны по дистанции и facing
//! - Melee impact: volumetric sweep → до 8 попаданий + primary цель
//! - Grab coordinator: босс + группа grabber'ов под землёй
//!
//! Геометрия мира — `CollisionWorld` (bevy_math bounding volumes), отношения
//! фракций — `FactionRelations`. Всё крутится в FixedUpdate по `SimulationSet`.

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod ai;
pub mod combat;
pub mod components;
pub mod config;
pub mod grab;
pub mod logger;
pub mod perception;
pub mod relations;
pub mod spatial;

// Re-export базовых компонентов для удобства
pub use ai::AIPlugin;
pub use combat::{
    AttackProfile, AttackProfiles, AttackSlot, CombatPlugin, DamageDealt, DamageFlags, DamageRequest, Dead,
    EntityDied, FacingRequirement, MeleeStrike, MeleeStrikeIntent, ReachVerdict,
};
pub use components::*;
pub use config::{ConfigError, SimulationConfig};
pub use grab::{GrabAttackConfig, GrabAttackPlugin, GrabBoss, GrabGroups, Grabber};
pub use logger::{init_logger, log, log_error, log_info, log_warning};
pub use perception::{EnemyMemory, Perception, PerceptionPlugin, SwarmSense};
pub use relations::{FactionRelations, Relationship};
pub use spatial::CollisionWorld;

/// Фазы одного simulation tick (FixedUpdate), строго по порядку
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    /// Actor colliders → CollisionWorld
    Spatial,
    /// Sight, swarm sense, выбор врага
    Perception,
    /// Cooldowns + reach evaluation
    Evaluation,
    /// Выбор атаки, diver цикл босса
    Decision,
    /// Melee sweep'ы, движение grab-групп
    Resolution,
    /// Очередь DamageRequest
    Damage,
    /// Смерти, teardown групп, despawn
    Teardown,
}

/// Главный plugin симуляции (объединяет все подсистемы)
///
/// `SimulationConfig`, `DeterministicRng` и `FactionRelations`, вставленные до
/// plugin'а, сохраняются; иначе берутся из конфига по умолчанию.
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        let config = app
            .world()
            .get_resource::<SimulationConfig>()
            .cloned()
            .unwrap_or_default();

        if !app.world().contains_resource::<DeterministicRng>() {
            app.insert_resource(DeterministicRng::new(config.seed));
        }
        if !app.world().contains_resource::<FactionRelations>() {
            app.insert_resource(config.faction_relations());
        }

        app
            // Fixed timestep для simulation tick
            .insert_resource(Time::<Fixed>::from_hz(config.tick_hz))
            .insert_resource(config)
            .init_resource::<CollisionWorld>()
            .configure_sets(
                FixedUpdate,
                (
                    SimulationSet::Spatial,
                    SimulationSet::Perception,
                    SimulationSet::Evaluation,
                    SimulationSet::Decision,
                    SimulationSet::Resolution,
                    SimulationSet::Damage,
                    SimulationSet::Teardown,
                )
                    .chain(),
            )
            .add_systems(
                FixedUpdate,
                spatial::sync_collision_world.in_set(SimulationSet::Spatial),
            )
            // Подсистемы
            .add_plugins((PerceptionPlugin, CombatPlugin, AIPlugin, GrabAttackPlugin));
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Создаёт minimal Bevy App для headless симуляции
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed))
        .insert_resource(Time::<Fixed>::from_hz(60.0)); // 60Hz FixedUpdate

    app
}

/// Ровно один FixedUpdate tick, без зависимости от wall clock
///
/// Время подаётся вручную (`TimeUpdateStrategy::ManualDuration` = timestep).
/// Самый первый update только заводит часы, поэтому крутим до двух раз.
pub fn run_fixed_tick(app: &mut App) {
    let Some(fixed) = app.world().get_resource::<Time<Fixed>>() else {
        app.update();
        return;
    };
    let timestep = fixed.timestep();
    let before = fixed.elapsed();

    app.insert_resource(TimeUpdateStrategy::ManualDuration(timestep));
    for _ in 0..2 {
        app.update();
        let advanced = app
            .world()
            .get_resource::<Time<Fixed>>()
            .map_or(true, |fixed| fixed.elapsed() > before);
        if advanced {
            return;
        }
    }
}

/// `run_fixed_tick` × n
pub fn run_fixed_ticks(app: &mut App, ticks: usize) {
    for _ in 0..ticks {
        run_fixed_tick(app);
    }
}

/// Snapshot мира для сравнения детерминизма
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    // Собираем все компоненты в детерминированный формат
    let mut snapshot = Vec::new();

    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();

    // Сортируем по Entity ID для детерминизма
    entities.sort_by_key(|(entity, _)| entity.index());

    // Сериализуем в байты через Debug (простейший способ)
    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}
