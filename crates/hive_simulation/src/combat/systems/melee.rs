//! Melee strike systems (intent → sweep → damage requests).

use bevy::prelude::*;

use crate::combat::melee::{resolve_melee_impact, ImpactProbe, MeleeAttacker};
use crate::combat::{AttackProfiles, AttackSlot, DamageRequest, Dead};
use crate::components::{Actor, CollisionVolume};
use crate::relations::FactionRelations;
use crate::spatial::CollisionWorld;

/// Event: decision layer решил ударить слотом `slot`
#[derive(Event, Debug, Clone, Copy)]
pub struct MeleeStrikeIntent {
    pub attacker: Entity,
    pub slot: AttackSlot,
}

/// Event: удар разрешён (для follow-up эффектов: звук, анимация, AI реакция)
#[derive(Event, Debug, Clone)]
pub struct MeleeStrikeResolved {
    pub attacker: Entity,
    pub slot: AttackSlot,
    pub primary: Option<Entity>,
    pub hits: usize,
    pub dropped: usize,
}

/// System: разрешение melee ударов
///
/// Урон не применяется здесь — уходит в очередь DamageRequest
/// (обрабатывается `apply_damage_requests` в том же tick).
pub fn resolve_melee_strikes(
    mut intents: EventReader<MeleeStrikeIntent>,
    mut resolved: EventWriter<MeleeStrikeResolved>,
    mut damage: EventWriter<DamageRequest>,
    world: Res<CollisionWorld>,
    relations: Res<FactionRelations>,
    attackers: Query<(&Transform, &CollisionVolume, &AttackProfiles), Without<Dead>>,
    actors: Query<&Actor>,
) {
    for intent in intents.read() {
        let Ok((transform, volume, profiles)) = attackers.get(intent.attacker) else {
            continue;
        };
        let Ok(actor) = actors.get(intent.attacker) else {
            continue;
        };
        let Some(strike) = profiles.get(intent.slot).and_then(|profile| profile.strike) else {
            crate::logger::log_warning(&format!(
                "⚠️ {:?} tried melee {:?} without a strike",
                intent.attacker, intent.slot
            ));
            continue;
        };

        let forward = *transform.forward();
        let probe = ImpactProbe::forward_from(transform.translation, forward, volume, &strike);
        let attacker = MeleeAttacker {
            entity: intent.attacker,
            actor,
            center: volume.center_at(transform.translation),
            forward,
        };

        let result = resolve_melee_impact(&attacker, &probe, &*world, &actors, &*relations, &mut damage);

        crate::logger::log(&format!(
            "⚔️ {:?} {:?}: {} hits, primary {:?}",
            intent.attacker,
            intent.slot,
            result.hits.len(),
            result.primary_target()
        ));

        resolved.write(MeleeStrikeResolved {
            attacker: intent.attacker,
            slot: intent.slot,
            primary: result.primary_target(),
            hits: result.hits.len(),
            dropped: result.dropped,
        });
    }
}
