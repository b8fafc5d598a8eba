//! Damage application and death systems.

use bevy::prelude::*;

use crate::combat::{BleedEffect, DamageDealt, DamageFlags, DamageRequest, Dead, DespawnAfter, EntityDied};
use crate::components::{DamageResistance, Health};
use crate::config::SimulationConfig;
use crate::grab::{GrabGroups, GrabMemberHurt, GrabRole, Grabber};

/// Кому на самом деле достаётся урон
///
/// Peer grab-группы перенаправляет урон в health pool primary (пока тот жив).
/// Forced kill всегда бьёт адресата.
fn damage_recipient(
    request: &DamageRequest,
    grabber: Option<&Grabber>,
    groups: &GrabGroups,
    primary_alive: impl Fn(Entity) -> bool,
) -> Entity {
    if request.flags.is_forced_kill() {
        return request.target;
    }
    match grabber {
        Some(grabber) if grabber.role == GrabRole::Peer => groups
            .get(grabber.group)
            .map(|group| group.primary)
            .filter(|primary| primary_alive(*primary))
            .unwrap_or(request.target),
        _ => request.target,
    }
}

/// Сколько снимает запрос: forced kill — всё оставшееся здоровье,
/// обычный урон масштабируется resistance
pub(crate) fn requested_amount(request: &DamageRequest, health: &Health, resistance: Option<&DamageResistance>) -> f32 {
    if request.flags.is_forced_kill() {
        health.current.max(0.0)
    } else {
        request.amount * resistance.map_or(1.0, |r| r.scale)
    }
}

/// Смерть от запроса: Dead + DespawnAfter, возвращает EntityDied для отправки
pub(crate) fn record_death(
    commands: &mut Commands,
    entity: Entity,
    request: &DamageRequest,
    despawn_time: f32,
) -> EntityDied {
    crate::logger::log_info(&format!(
        "💀 {:?} died (killer: {:?}, flags: {:?})",
        entity, request.attacker, request.flags
    ));
    commands.entity(entity).insert((Dead, DespawnAfter { despawn_time }));
    EntityDied {
        entity,
        killer: request.attacker,
        flags: request.flags,
    }
}

/// System: применение очереди DamageRequest
///
/// Gating: закопанные члены grab-группы неуязвимы для обычного урона.
/// Resistance масштабирует обычный урон; forced kill снимает всё здоровье.
pub fn apply_damage_requests(
    mut commands: Commands,
    time: Res<Time<Fixed>>,
    config: Res<SimulationConfig>,
    groups: Res<GrabGroups>,
    mut requests: EventReader<DamageRequest>,
    mut dealt: EventWriter<DamageDealt>,
    mut died: EventWriter<EntityDied>,
    mut bleeds: EventWriter<BleedEffect>,
    mut hurt: EventWriter<GrabMemberHurt>,
    mut targets: Query<(&mut Health, Option<&DamageResistance>, Option<&Grabber>)>,
) {
    let now = time.elapsed_secs();

    for request in requests.read() {
        let forced = request.flags.is_forced_kill();

        let Ok((_, _, grabber)) = targets.get(request.target) else {
            continue;
        };
        let grabber = grabber.cloned();

        if let Some(grabber) = &grabber {
            if !forced && !grabber.is_exposed() {
                continue;
            }
        }

        let recipient = damage_recipient(request, grabber.as_ref(), &groups, |primary| {
            targets
                .get(primary)
                .is_ok_and(|(health, _, _)| health.is_alive())
        });

        let Ok((mut health, resistance, _)) = targets.get_mut(recipient) else {
            continue;
        };
        if !health.is_alive() {
            continue;
        }

        let amount = requested_amount(request, &health, resistance);
        let applied = health.take_damage(amount);
        let killed = !health.is_alive();

        dealt.write(DamageDealt {
            attacker: request.attacker,
            target: recipient,
            amount: applied,
            flags: request.flags,
            force: request.force,
            position: request.position,
            redirected_from: (recipient != request.target).then_some(request.target),
        });

        if applied >= 1.0 && request.flags.contains(DamageFlags::MELEE) && !request.flags.suppresses_bleed() {
            bleeds.write(BleedEffect {
                target: recipient,
                position: request.position,
                direction: request.force.normalize_or_zero(),
            });
        }

        if killed {
            died.write(record_death(&mut commands, recipient, request, now + config.corpse_lifetime));
        } else if grabber.is_some() && !forced && applied > 0.0 {
            // Член grab-группы, которого ранили, уходит под землю
            hurt.write(GrabMemberHurt {
                member: request.target,
                amount: applied,
            });
        }
    }
}

/// Система: деспавн entities с истёкшим DespawnAfter timeout
pub fn despawn_after_timeout(
    mut commands: Commands,
    query: Query<(Entity, &DespawnAfter)>,
    time: Res<Time<Fixed>>,
) {
    let current_time = time.elapsed_secs();

    for (entity, despawn_after) in query.iter() {
        if current_time >= despawn_after.despawn_time {
            crate::logger::log(&format!("⚰️ Despawning entity {:?} (timeout)", entity));
            commands.entity(entity).despawn();
        }
    }
}
