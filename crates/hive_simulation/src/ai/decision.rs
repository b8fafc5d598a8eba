//! Decision layer: выбор врага из perception и выбор melee атаки.
//!
//! Perception → select_enemy → (reach evaluation) → select_melee_attack → MeleeStrikeIntent

use bevy::prelude::*;

use crate::combat::{AttackOptions, AttackProfiles, CooldownGroup, Dead, MeleeStrikeIntent, SharedCooldown};
use crate::components::Health;
use crate::perception::{EnemyMemory, PerceivedTarget, Perception};

/// Helper: ближайшая угроза из списков perception
pub fn nearest_threat<'a>(
    origin: Vec3,
    sensed: impl Iterator<Item = &'a PerceivedTarget>,
    is_valid: impl Fn(Entity) -> bool,
) -> Option<&'a PerceivedTarget> {
    let mut nearest: Option<(&PerceivedTarget, f32)> = None;

    for target in sensed {
        if !target.threat || !is_valid(target.entity) {
            continue;
        }

        let distance = origin.distance(target.last_known_position);
        match nearest {
            Some((_, best_distance)) if distance >= best_distance => {}
            _ => nearest = Some((target, distance)),
        }
    }

    nearest.map(|(target, _)| target)
}

/// Система: выбор/сброс врага
///
/// Мёртвый или исчезнувший враг забывается; без врага берём ближайшую угрозу.
pub fn select_enemy(
    time: Res<Time<Fixed>>,
    mut agents: Query<(Entity, &Transform, &Perception, &mut EnemyMemory), Without<Dead>>,
    alive: Query<&Health, Without<Dead>>,
) {
    let now = time.elapsed_secs();
    let is_valid = |entity: Entity| alive.get(entity).is_ok_and(|health| health.is_alive());

    for (entity, transform, perception, mut memory) in agents.iter_mut() {
        if let Some(enemy) = memory.enemy {
            if is_valid(enemy) {
                continue;
            }
            crate::logger::log(&format!("🎯 {:?} lost enemy {:?}", entity, enemy));
            memory.forget();
        }

        if let Some(target) = nearest_threat(transform.translation, perception.iter_sensed(), is_valid) {
            crate::logger::log(&format!("🎯 {:?} targets {:?}", entity, target.entity));
            memory.set_enemy(target.entity, target.last_known_position, now);
        }
    }
}

/// Система: запуск melee атаки, если reach evaluator её разрешил
///
/// Берёт первый доступный melee слот, заводит его cooldown (и shared cooldown
/// группы, если профиль его разделяет) и пишет MeleeStrikeIntent.
pub fn select_melee_attack(
    mut agents: Query<(Entity, &AttackOptions, &mut AttackProfiles, Option<&CooldownGroup>), Without<Dead>>,
    mut shared: Query<&mut SharedCooldown>,
    mut intents: EventWriter<MeleeStrikeIntent>,
) {
    for (entity, options, mut profiles, cooldown_group) in agents.iter_mut() {
        let Some(slot) = options.first_available_melee() else {
            continue;
        };

        profiles.start_cooldown(slot);
        if let (Some(profile), Some(group)) = (profiles.get(slot), cooldown_group) {
            if profile.shares_cooldown {
                if let Ok(mut cooldown) = shared.get_mut(group.0) {
                    cooldown.trigger(profile.cooldown);
                }
            }
        }

        intents.write(MeleeStrikeIntent {
            attacker: entity,
            slot,
        });
    }
}
