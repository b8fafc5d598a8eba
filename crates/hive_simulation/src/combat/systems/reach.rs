//! Cooldowns + reach evaluation systems.

use bevy::prelude::*;

use crate::combat::reach::{evaluate_slot, facing_dot};
use crate::combat::{AttackOption, AttackOptions, AttackProfiles, AttackSlot, CooldownGroup, Dead, SharedCooldown};
use crate::perception::EnemyMemory;

/// System: обновление per-slot и shared cooldown таймеров
pub fn tick_attack_cooldowns(
    time: Res<Time<Fixed>>,
    mut profiles: Query<&mut AttackProfiles>,
    mut shared: Query<&mut SharedCooldown>,
) {
    let delta = time.delta_secs();

    for mut attack_profiles in profiles.iter_mut() {
        attack_profiles.tick(delta);
    }

    for mut cooldown in shared.iter_mut() {
        cooldown.remaining = (cooldown.remaining - delta).max(0.0);
    }
}

/// System: оценка всех слотов против текущего врага
///
/// Дистанция — между origin'ами, facing — по горизонтальному forward.
/// Запускается после perception, так что врагом считается уже обновлённая память.
pub fn evaluate_attack_reach(
    mut agents: Query<
        (&Transform, &AttackProfiles, &EnemyMemory, Option<&CooldownGroup>, &mut AttackOptions),
        Without<Dead>,
    >,
    targets: Query<&Transform, Without<Dead>>,
    shared: Query<&SharedCooldown>,
) {
    for (transform, profiles, memory, cooldown_group, mut options) in agents.iter_mut() {
        options.clear();

        let Some(enemy) = memory.enemy else {
            continue;
        };
        let Ok(target) = targets.get(enemy) else {
            continue;
        };

        let from = transform.translation;
        let to = target.translation;
        let distance = from.distance(to);
        let dot = facing_dot(*transform.forward(), from, to);

        let shared_ready = cooldown_group
            .and_then(|group| shared.get(group.0).ok())
            .map_or(true, |cooldown| cooldown.is_ready());

        options.target = Some(enemy);
        for slot in AttackSlot::ALL {
            let Some(profile) = profiles.get(slot) else {
                continue;
            };
            let ready = profiles.is_ready(slot) && (!profile.shares_cooldown || shared_ready);
            options.options.push(AttackOption {
                slot,
                verdict: evaluate_slot(profiles, slot, distance, dot),
                ready,
            });
        }
    }
}
