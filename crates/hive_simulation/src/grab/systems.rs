//! Grab coordinator systems.
//!
//! Порядок внутри tick:
//! - Decision: `boss_grab_cycle` (diver цикл босса, старт группы)
//! - Resolution: `drive_grab_groups` (chase, placement, grab-урон, retract)
//! - Teardown: `react_to_grab_casualties` → `finalize_grab_groups`

use bevy::ecs::event::EventCursor;
use bevy::prelude::*;
use rand::Rng;

use super::arena::{GrabGroup, GrabGroups, GroupPhase};
use super::components::{DiverPhase, GrabBoss, GrabRole, GrabStartError, Grabber, GrabberState};
use super::events::{
    DisbandReason, GrabCue, GrabGroupDisbanded, GrabGroupFinished, GrabMemberHurt, GrabPresentation,
    PresentationFinished,
};
use super::motion::{advance_chase, advance_retract, ChaseStep, LossReason, RetractStep};
use super::placement::{angle_towards, find_grab_position, peer_spawn_angles, GrabPlacement};
use crate::combat::systems::damage::{record_death, requested_amount};
use crate::combat::{DamageDealt, DamageFlags, DamageRequest, Dead, EntityDied};
use crate::components::{Actor, Classification, CollisionVolume, Health};
use crate::config::SimulationConfig;
use crate::perception::EnemyMemory;
use crate::relations::{FactionRelations, RelationshipClassifier};
use crate::spatial::{CollisionWorld, GroundHeight};
use crate::DeterministicRng;

/// Перевод одного члена в Retracting (с retract-позой, если он был над землёй)
fn retract_member(member: Entity, grabber: &mut Grabber, presentation: &mut EventWriter<GrabPresentation>) {
    if grabber.begin_retract() {
        presentation.write(GrabPresentation {
            member,
            cue: GrabCue::EnterRetractPose,
        });
    }
}

fn retract_group(
    group: &mut GrabGroup,
    members: &mut Query<(&mut Grabber, &mut Transform)>,
    presentation: &mut EventWriter<GrabPresentation>,
) {
    group.phase = GroupPhase::Retracting;
    for member in group.members() {
        if let Ok((mut grabber, _)) = members.get_mut(member) {
            retract_member(member, &mut grabber, presentation);
        }
    }
}

fn member_bundle(
    group: &GrabGroup,
    role: GrabRole,
    position: Vec3,
) -> (Actor, Health, CollisionVolume, Transform, Grabber) {
    let config = &group.config;
    (
        Actor::new(group.faction_id, Classification::Grabber),
        Health::new(config.member_health),
        CollisionVolume::new(Vec3::new(config.member_radius, config.member_half_height, config.member_radius)),
        Transform::from_translation(position),
        Grabber::new(group.id, role),
    )
}

// ============================================================================
// Boss diver cycle
// ============================================================================

/// System: diver цикл босса
///
/// Idle → (атака) Plunging → Chasing/Grabbing/Retracting (зеркалит группу) → Unplunging → Idle.
/// Primary создаётся в момент старта атаки, под землёй в точке перед боссом.
pub fn boss_grab_cycle(
    mut commands: Commands,
    time: Res<Time<Fixed>>,
    world: Res<CollisionWorld>,
    mut rng: ResMut<DeterministicRng>,
    mut groups: ResMut<GrabGroups>,
    mut disbanded: EventReader<GrabGroupDisbanded>,
    mut finished: EventReader<GrabGroupFinished>,
    mut bosses: Query<
        (Entity, &mut GrabBoss, &Actor, &Transform, Option<&EnemyMemory>),
        (Without<Dead>, Without<Grabber>),
    >,
    mut members: Query<&mut Grabber>,
    targets: Query<&Health, Without<Dead>>,
) {
    let now = time.elapsed_secs();
    let dt = time.delta_secs();

    // Группа закончилась → босс выныривает
    let notifications = disbanded
        .read()
        .map(|event| (event.boss, event.group, Some(event.reason)))
        .chain(finished.read().map(|event| (event.boss, event.group, None)));
    for (boss_entity, group_id, reason) in notifications {
        let Ok((_, mut boss, ..)) = bosses.get_mut(boss_entity) else {
            continue;
        };
        if boss.active_group != Some(group_id) {
            continue;
        }
        boss.active_group = None;
        boss.phase = match reason {
            Some(DisbandReason::PlacementFailed) => DiverPhase::Idle,
            _ => DiverPhase::Unplunging {
                remaining: boss.config.unplunge_duration,
            },
        };
        boss.schedule_next_attack(now);
    }

    // RNG — порядок обхода фиксирован
    let mut order: Vec<Entity> = bosses.iter().map(|(entity, ..)| entity).collect();
    order.sort();

    for boss_entity in order {
        let Ok((_, mut boss, actor, transform, memory)) = bosses.get_mut(boss_entity) else {
            continue;
        };

        match boss.phase {
            DiverPhase::Idle => {
                let target = memory
                    .and_then(|memory| memory.enemy)
                    .filter(|enemy| targets.get(*enemy).is_ok_and(|health| health.is_alive()));

                let target = match boss.try_start_grab_attack(now, target) {
                    Ok(target) => target,
                    Err(GrabStartError::NoTarget | GrabStartError::OnCooldown { .. }) => continue,
                    Err(error) => {
                        crate::logger::log_warning(&format!("🦑 {:?} grab attack rejected: {}", boss_entity, error));
                        continue;
                    }
                };

                boss.schedule_next_attack(now);
                if boss.config.attack_chance < 1.0 && rng.rng.gen::<f32>() >= boss.config.attack_chance {
                    continue;
                }

                let forward = Vec3::new(transform.forward().x, 0.0, transform.forward().z).normalize_or_zero();
                let mut spot = transform.translation + forward * boss.config.diver_spot_distance;
                spot.y = world.ground_height_at(spot);

                let id = groups.reserve_id();
                // Primary entity нужен до создания группы — резервируем его
                let primary = commands.spawn_empty().id();
                let group = GrabGroup::new(
                    id,
                    boss_entity,
                    target,
                    spot,
                    primary,
                    boss.config.clone(),
                    actor.faction_id,
                );
                commands.entity(primary).insert(member_bundle(&group, GrabRole::Primary, spot));
                groups.insert(group);

                boss.active_group = Some(id);
                boss.phase = DiverPhase::Plunging {
                    remaining: boss.config.plunge_duration,
                };
                crate::logger::log_info(&format!(
                    "🦑 {:?} starts grab attack {:?} on {:?} (primary {:?})",
                    boss_entity, id, target, primary
                ));
            }
            DiverPhase::Plunging { remaining } => {
                let remaining = remaining - dt;
                if remaining > 0.0 {
                    boss.phase = DiverPhase::Plunging { remaining };
                    continue;
                }

                let start_speed = boss.config.chase_start_speed;
                let group = match boss.active_group {
                    Some(id) => groups.get_mut(id),
                    None => None,
                };
                match group {
                    Some(group) => {
                        if let Ok(mut primary) = members.get_mut(group.primary) {
                            primary.begin_chase(start_speed);
                        }
                        group.phase = GroupPhase::Chasing;
                        boss.phase = DiverPhase::Chasing;
                    }
                    None => {
                        boss.phase = DiverPhase::Unplunging {
                            remaining: boss.config.unplunge_duration,
                        };
                    }
                }
            }
            DiverPhase::Chasing | DiverPhase::Grabbing | DiverPhase::Retracting => {
                let Some(group) = boss.active_group.and_then(|id| groups.get(id)) else {
                    boss.active_group = None;
                    boss.phase = DiverPhase::Unplunging {
                        remaining: boss.config.unplunge_duration,
                    };
                    continue;
                };
                boss.phase = match group.phase {
                    GroupPhase::Forming => boss.phase,
                    GroupPhase::Chasing => DiverPhase::Chasing,
                    GroupPhase::Grabbing => DiverPhase::Grabbing,
                    GroupPhase::Retracting => DiverPhase::Retracting,
                };
            }
            DiverPhase::Unplunging { remaining } => {
                let remaining = remaining - dt;
                boss.phase = if remaining > 0.0 {
                    DiverPhase::Unplunging { remaining }
                } else {
                    DiverPhase::Idle
                };
            }
        }
    }
}

// ============================================================================
// Group driver
// ============================================================================

enum PrimaryOutcome {
    Continue,
    Reached(Vec3),
    Lost(LossReason),
}

/// System: движение и захват
///
/// Primary обрабатывается первым, затем peers в порядке создания.
/// Цель потеряна, если она мертва, исчезла или больше не Hostile для фракции группы.
pub fn drive_grab_groups(
    mut commands: Commands,
    time: Res<Time<Fixed>>,
    world: Res<CollisionWorld>,
    relations: Res<FactionRelations>,
    mut groups: ResMut<GrabGroups>,
    mut finished: EventReader<PresentationFinished>,
    mut presentation: EventWriter<GrabPresentation>,
    mut disbanded: EventWriter<GrabGroupDisbanded>,
    mut damage: EventWriter<DamageRequest>,
    mut members: Query<(&mut Grabber, &mut Transform)>,
    targets: Query<(&Transform, &Health, &Actor), (Without<Grabber>, Without<Dead>)>,
) {
    let dt = time.delta_secs();

    for event in finished.read() {
        if let Ok((mut grabber, _)) = members.get_mut(event.member) {
            if grabber.state == GrabberState::Retracting {
                grabber.retract_ready = true;
            }
        }
    }

    for id in groups.ids() {
        let Some(group) = groups.get_mut(id) else {
            continue;
        };
        if group.disbanded {
            continue;
        }

        let hunter = Actor::new(group.faction_id, Classification::Grabber);
        let target = targets
            .get(group.target)
            .ok()
            .filter(|(_, health, actor)| health.is_alive() && relations.classify(&hunter, actor).is_hostile())
            .map(|(transform, ..)| transform.translation);

        match group.phase {
            GroupPhase::Forming | GroupPhase::Retracting => {}
            GroupPhase::Chasing => {
                let outcome = match members.get_mut(group.primary) {
                    Ok((mut grabber, mut transform)) if grabber.state == GrabberState::Chasing => {
                        let step = advance_chase(
                            transform.translation,
                            grabber.speed,
                            grabber.chase_elapsed,
                            target,
                            dt,
                            &group.config,
                            &*world,
                        );
                        grabber.chase_elapsed += dt;
                        match step {
                            ChaseStep::Advanced { position, speed } => {
                                transform.translation = position;
                                grabber.speed = speed;
                                PrimaryOutcome::Continue
                            }
                            ChaseStep::Reached { position } => PrimaryOutcome::Reached(position),
                            ChaseStep::Lost(reason) => PrimaryOutcome::Lost(reason),
                        }
                    }
                    _ => PrimaryOutcome::Continue,
                };

                match (outcome, target) {
                    (PrimaryOutcome::Reached(position), Some(target)) => {
                        let start_angle = angle_towards(target, position);
                        match find_grab_position(
                            group.target,
                            target,
                            start_angle,
                            id.collision_group(),
                            &group.config,
                            &*world,
                            &*world,
                        ) {
                            Some(placement) => {
                                begin_grab(&mut commands, group, placement, target, &world, &mut members, &mut presentation);
                            }
                            None => {
                                crate::logger::log_warning(&format!(
                                    "🦑 Grab group {:?}: no room around {:?}, disbanding",
                                    id, group.target
                                ));
                                if let Ok((mut primary, _)) = members.get_mut(group.primary) {
                                    primary.finish();
                                }
                                group.disbanded = true;
                                disbanded.write(GrabGroupDisbanded {
                                    boss: group.boss,
                                    group: id,
                                    reason: DisbandReason::PlacementFailed,
                                });
                            }
                        }
                    }
                    (PrimaryOutcome::Lost(reason), _) => {
                        crate::logger::log(&format!("🦑 Grab group {:?} lost its target: {:?}", id, reason));
                        retract_group(group, &mut members, &mut presentation);
                    }
                    _ => {}
                }
            }
            GroupPhase::Grabbing => {
                let held = hold_target(group, target, dt, &mut members, &mut damage);
                if let Err(reason) = held {
                    crate::logger::log(&format!("🦑 Grab group {:?} releases {:?}: {:?}", id, group.target, reason));
                    retract_group(group, &mut members, &mut presentation);
                }
            }
        }

        if group.disbanded {
            continue;
        }

        // Primary ушёл под землю → вся группа уходит
        let primary_retreating = members
            .get(group.primary)
            .map_or(true, |(grabber, _)| {
                matches!(grabber.state, GrabberState::Retracting | GrabberState::Done)
            });
        if primary_retreating && matches!(group.phase, GroupPhase::Chasing | GroupPhase::Grabbing) {
            retract_group(group, &mut members, &mut presentation);
        }

        for member in group.members() {
            let Ok((mut grabber, mut transform)) = members.get_mut(member) else {
                continue;
            };
            if grabber.state != GrabberState::Retracting || !grabber.retract_ready {
                continue;
            }
            match advance_retract(transform.translation, group.origin, dt, &group.config, &*world) {
                RetractStep::Moving(position) => transform.translation = position,
                RetractStep::Home(position) => {
                    transform.translation = position;
                    grabber.finish();
                }
            }
        }
    }
}

/// Primary встал на позицию: Grabbing + спавн peers по кругу
fn begin_grab(
    commands: &mut Commands,
    group: &mut GrabGroup,
    placement: GrabPlacement,
    target: Vec3,
    world: &CollisionWorld,
    members: &mut Query<(&mut Grabber, &mut Transform)>,
    presentation: &mut EventWriter<GrabPresentation>,
) {
    let interval = group.config.grab_damage_interval;
    if let Ok((mut primary, mut transform)) = members.get_mut(group.primary) {
        primary.begin_grab(interval);
        transform.translation = placement.position;
        transform.look_at(Vec3::new(target.x, placement.position.y, target.z), Vec3::Y);
    }
    group.phase = GroupPhase::Grabbing;
    presentation.write(GrabPresentation {
        member: group.primary,
        cue: GrabCue::EnterGrabPose,
    });

    for angle in peer_spawn_angles(placement.angle, group.config.peer_count) {
        let Some(spot) = find_grab_position(
            group.target,
            target,
            angle,
            group.id.collision_group(),
            &group.config,
            world,
            world,
        ) else {
            crate::logger::log(&format!("🦑 Grab group {:?}: peer at {:.2} rad has no room", group.id, angle));
            continue;
        };

        let (actor, health, volume, mut transform, mut grabber) = member_bundle(group, GrabRole::Peer, spot.position);
        grabber.begin_grab(interval);
        transform.look_at(Vec3::new(target.x, spot.position.y, target.z), Vec3::Y);
        let peer = commands.spawn((actor, health, volume, transform, grabber)).id();
        group.peers.push(peer);
        presentation.write(GrabPresentation {
            member: peer,
            cue: GrabCue::EnterGrabPose,
        });
    }

    crate::logger::log_info(&format!(
        "🦑 Grab group {:?} holds {:?} with {} peers",
        group.id,
        group.target,
        group.peers.len()
    ));
}

/// Удержание: урон цели от всех захвативших, пока она рядом и время не вышло
fn hold_target(
    group: &GrabGroup,
    target: Option<Vec3>,
    dt: f32,
    members: &mut Query<(&mut Grabber, &mut Transform)>,
    damage: &mut EventWriter<DamageRequest>,
) -> Result<(), LossReason> {
    let target = target.ok_or(LossReason::TargetGone)?;

    if let Ok((mut primary, transform)) = members.get_mut(group.primary) {
        if primary.grab_elapsed >= group.config.max_grab_duration {
            return Err(LossReason::GrabExpired);
        }
        let offset = target - transform.translation;
        if Vec3::new(offset.x, 0.0, offset.z).length() > group.config.release_distance {
            return Err(LossReason::TargetEscaped);
        }
        primary.grab_elapsed += dt;
    }

    for member in group.members() {
        let Ok((mut grabber, _)) = members.get_mut(member) else {
            continue;
        };
        if grabber.state != GrabberState::Grabbing {
            continue;
        }
        grabber.damage_timer -= dt;
        if grabber.damage_timer <= 0.0 {
            grabber.damage_timer += group.config.grab_damage_interval;
            damage.write(DamageRequest {
                attacker: Some(member),
                target: group.target,
                amount: group.config.grab_damage,
                flags: DamageFlags::MELEE | DamageFlags::GRAB,
                force: Vec3::ZERO,
                position: target,
            });
        }
    }

    Ok(())
}

// ============================================================================
// Casualties & teardown
// ============================================================================

/// Принудительное расформирование: каждый живой член получает forced kill
/// в этом же tick. Повторный вызов для той же группы ничего не делает.
fn force_teardown(
    commands: &mut Commands,
    group: &mut GrabGroup,
    reason: DisbandReason,
    despawn_time: f32,
    members: &mut Query<(&mut Grabber, &mut Health, &Transform)>,
    dealt: &mut EventWriter<DamageDealt>,
    deaths: &mut Vec<EntityDied>,
    disbanded: &mut EventWriter<GrabGroupDisbanded>,
) {
    if group.disbanded {
        return;
    }
    group.disbanded = true;

    let mut killed = 0;
    for member in group.members() {
        let Ok((mut grabber, mut health, transform)) = members.get_mut(member) else {
            continue;
        };
        if grabber.is_done() {
            continue;
        }
        grabber.finish();

        // Уже мёртвый (убитый primary) — его смерть отработала очередь урона
        if !health.is_alive() {
            continue;
        }

        let request = DamageRequest::forced_kill(member, None, transform.translation);
        let amount = requested_amount(&request, &health, None);
        let applied = health.take_damage(amount);
        dealt.write(DamageDealt {
            attacker: request.attacker,
            target: member,
            amount: applied,
            flags: request.flags,
            force: request.force,
            position: request.position,
            redirected_from: None,
        });
        deaths.push(record_death(commands, member, &request, despawn_time));
        killed += 1;
    }

    crate::logger::log_info(&format!(
        "🦑 Grab group {:?} disbanded ({:?}), {} members killed",
        group.id, reason, killed
    ));
    disbanded.write(GrabGroupDisbanded {
        boss: group.boss,
        group: group.id,
        reason,
    });
}

/// System: смерти и ранения членов групп (и смерть босса)
///
/// Forced kill'ы teardown'а публикуются как обычные `EntityDied`.
pub fn react_to_grab_casualties(
    mut commands: Commands,
    time: Res<Time<Fixed>>,
    config: Res<SimulationConfig>,
    mut groups: ResMut<GrabGroups>,
    mut deaths: ResMut<Events<EntityDied>>,
    mut death_cursor: Local<EventCursor<EntityDied>>,
    mut hurt: EventReader<GrabMemberHurt>,
    mut dealt: EventWriter<DamageDealt>,
    mut presentation: EventWriter<GrabPresentation>,
    mut disbanded: EventWriter<GrabGroupDisbanded>,
    mut members: Query<(&mut Grabber, &mut Health, &Transform)>,
) {
    let despawn_time = time.elapsed_secs() + config.corpse_lifetime;
    let casualties: Vec<EntityDied> = death_cursor.read(&deaths).cloned().collect();
    let mut teardown_deaths = Vec::new();

    for event in casualties {
        let casualty = members
            .get(event.entity)
            .ok()
            .map(|(grabber, ..)| (grabber.group, grabber.role));

        let (group_id, reason) = match casualty {
            Some((group_id, GrabRole::Primary)) => (group_id, DisbandReason::PrimaryKilled),
            Some((_, GrabRole::Peer)) => {
                if let Ok((mut grabber, ..)) = members.get_mut(event.entity) {
                    grabber.finish();
                }
                continue;
            }
            None => {
                let Some(group_id) = groups.group_of_boss(event.entity) else {
                    continue;
                };
                (group_id, DisbandReason::BossKilled)
            }
        };

        if let Some(group) = groups.get_mut(group_id) {
            force_teardown(
                &mut commands,
                group,
                reason,
                despawn_time,
                &mut members,
                &mut dealt,
                &mut teardown_deaths,
                &mut disbanded,
            );
        }
    }

    if !teardown_deaths.is_empty() {
        deaths.extend(teardown_deaths);
        // Свои же forced kill'ы разбирать не нужно: члены уже Done
        death_cursor.clear(&deaths);
    }

    for event in hurt.read() {
        let Ok((grabber, ..)) = members.get(event.member) else {
            continue;
        };
        if grabber.is_done() {
            continue;
        }
        let (group_id, role) = (grabber.group, grabber.role);

        match role {
            GrabRole::Primary => {
                let Some(group) = groups.get_mut(group_id) else {
                    continue;
                };
                if group.disbanded {
                    continue;
                }
                group.phase = GroupPhase::Retracting;
                for member in group.members() {
                    if let Ok((mut grabber, ..)) = members.get_mut(member) {
                        retract_member(member, &mut grabber, &mut presentation);
                    }
                }
            }
            GrabRole::Peer => {
                if let Ok((mut grabber, ..)) = members.get_mut(event.member) {
                    retract_member(event.member, &mut grabber, &mut presentation);
                }
            }
        }
    }
}

/// System: удаляет закончивших членов и пустые группы
pub fn finalize_grab_groups(
    mut commands: Commands,
    mut groups: ResMut<GrabGroups>,
    members: Query<&Grabber>,
    mut finished: EventWriter<GrabGroupFinished>,
) {
    for id in groups.ids() {
        let Some(group) = groups.get_mut(id) else {
            continue;
        };

        let mut live = 0;
        for member in group.members() {
            match members.get(member) {
                Ok(grabber) if grabber.is_done() => {
                    if let Ok(mut entity) = commands.get_entity(member) {
                        entity.despawn();
                    }
                }
                Ok(_) => live += 1,
                Err(_) => {}
            }
        }
        group
            .peers
            .retain(|peer| members.get(*peer).is_ok_and(|grabber| !grabber.is_done()));

        if live > 0 {
            continue;
        }

        if let Some(group) = groups.remove(id) {
            if !group.disbanded {
                crate::logger::log_info(&format!("🦑 Grab group {:?} is back home", id));
                finished.write(GrabGroupFinished {
                    boss: group.boss,
                    group: id,
                });
            }
        }
    }
}

