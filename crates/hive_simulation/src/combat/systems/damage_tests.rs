//! Tests for the damage queue (resistance, gating, redirect, bleed, death).

#[cfg(test)]
mod tests {
    use super::super::damage::apply_damage_requests;
    use crate::combat::{BleedEffect, DamageDealt, DamageFlags, DamageRequest, Dead, DespawnAfter, EntityDied};
    use crate::components::{DamageResistance, Health};
    use crate::config::SimulationConfig;
    use crate::grab::{GrabAttackConfig, GrabGroup, GrabGroups, GrabMemberHurt, GrabRole, Grabber};
    use bevy::prelude::*;

    fn setup() -> App {
        let mut app = App::new();
        app.add_event::<DamageRequest>()
            .add_event::<DamageDealt>()
            .add_event::<EntityDied>()
            .add_event::<BleedEffect>()
            .add_event::<GrabMemberHurt>()
            .insert_resource(Time::<Fixed>::default())
            .insert_resource(SimulationConfig::default())
            .init_resource::<GrabGroups>()
            .add_systems(Update, apply_damage_requests);
        app
    }

    fn hit(target: Entity, amount: f32, flags: DamageFlags) -> DamageRequest {
        DamageRequest {
            attacker: None,
            target,
            amount,
            flags,
            force: Vec3::X,
            position: Vec3::ZERO,
        }
    }

    fn apply(app: &mut App, requests: impl IntoIterator<Item = DamageRequest>) {
        for request in requests {
            app.world_mut().send_event(request);
        }
        app.world_mut().run_schedule(Update);
    }

    fn events<E: Event + Clone>(app: &App) -> Vec<E> {
        app.world()
            .resource::<Events<E>>()
            .iter_current_update_events()
            .cloned()
            .collect()
    }

    fn health(app: &App, entity: Entity) -> f32 {
        app.world().get::<Health>(entity).map_or(-1.0, |health| health.current)
    }

    /// Primary + один peer, оба держат цель
    fn spawn_grab_pair(app: &mut App) -> (Entity, Entity) {
        let id = app.world_mut().resource_mut::<GrabGroups>().reserve_id();

        let mut primary_grabber = Grabber::new(id, GrabRole::Primary);
        primary_grabber.begin_grab(0.5);
        let primary = app.world_mut().spawn((Health::new(100.0), primary_grabber)).id();

        let mut peer_grabber = Grabber::new(id, GrabRole::Peer);
        peer_grabber.begin_grab(0.5);
        let peer = app.world_mut().spawn((Health::new(100.0), peer_grabber)).id();

        let mut group = GrabGroup::new(
            id,
            Entity::from_raw(900),
            Entity::from_raw(901),
            Vec3::ZERO,
            primary,
            GrabAttackConfig::default(),
            1,
        );
        group.peers.push(peer);
        app.world_mut().resource_mut::<GrabGroups>().insert(group);

        (primary, peer)
    }

    #[test]
    fn test_resistance_scales_damage() {
        let mut app = setup();
        let queen = app
            .world_mut()
            .spawn((Health::new(100.0), DamageResistance { scale: 0.2 }))
            .id();

        apply(&mut app, [hit(queen, 50.0, DamageFlags::MELEE)]);

        assert_eq!(health(&app, queen), 90.0);
        let dealt = events::<DamageDealt>(&app);
        assert_eq!(dealt.len(), 1);
        assert_eq!(dealt[0].amount, 10.0);
        assert_eq!(dealt[0].redirected_from, None);
    }

    #[test]
    fn test_forced_kill_ignores_resistance() {
        let mut app = setup();
        let queen = app
            .world_mut()
            .spawn((Health::new(100.0), DamageResistance { scale: 0.2 }))
            .id();

        apply(&mut app, [DamageRequest::forced_kill(queen, None, Vec3::ZERO)]);

        assert_eq!(health(&app, queen), 0.0);
        assert!(app.world().get::<Dead>(queen).is_some());
        let despawn = app.world().get::<DespawnAfter>(queen).map(|d| d.despawn_time);
        assert_eq!(despawn, Some(SimulationConfig::default().corpse_lifetime));

        let died = events::<EntityDied>(&app);
        assert_eq!(died.len(), 1);
        assert_eq!(died[0].entity, queen);
        assert!(died[0].flags.is_forced_kill());
    }

    #[test]
    fn test_bleed_only_for_real_melee_wounds() {
        let mut app = setup();
        let marine = app.world_mut().spawn(Health::new(100.0)).id();

        apply(
            &mut app,
            [
                hit(marine, 5.0, DamageFlags::MELEE | DamageFlags::SLASH),
                hit(marine, 5.0, DamageFlags::MELEE | DamageFlags::SHOCK),
                hit(marine, 5.0, DamageFlags::MELEE | DamageFlags::BURN),
                hit(marine, 0.5, DamageFlags::MELEE),
                hit(marine, 5.0, DamageFlags::CLUB),
            ],
        );

        assert_eq!(health(&app, marine), 79.5);
        let bleeds = events::<BleedEffect>(&app);
        assert_eq!(bleeds.len(), 1);
        assert_eq!(bleeds[0].target, marine);
        assert_eq!(bleeds[0].direction, Vec3::X);
    }

    #[test]
    fn test_peer_damage_goes_to_primary_pool() {
        let mut app = setup();
        let (primary, peer) = spawn_grab_pair(&mut app);

        apply(&mut app, [hit(peer, 30.0, DamageFlags::MELEE)]);

        assert_eq!(health(&app, primary), 70.0);
        assert_eq!(health(&app, peer), 100.0);

        let dealt = events::<DamageDealt>(&app);
        assert_eq!(dealt.len(), 1);
        assert_eq!(dealt[0].target, primary);
        assert_eq!(dealt[0].redirected_from, Some(peer));

        // Раненый член группы уходит под землю
        let hurt = events::<GrabMemberHurt>(&app);
        assert_eq!(hurt.len(), 1);
        assert_eq!(hurt[0].member, peer);
        assert_eq!(hurt[0].amount, 30.0);
    }

    #[test]
    fn test_forced_kill_on_peer_is_not_redirected() {
        let mut app = setup();
        let (primary, peer) = spawn_grab_pair(&mut app);

        apply(&mut app, [DamageRequest::forced_kill(peer, None, Vec3::ZERO)]);

        assert_eq!(health(&app, primary), 100.0);
        assert_eq!(health(&app, peer), 0.0);
        assert!(events::<GrabMemberHurt>(&app).is_empty());
    }

    #[test]
    fn test_peer_takes_own_damage_once_primary_is_dead() {
        let mut app = setup();
        let (primary, peer) = spawn_grab_pair(&mut app);
        if let Some(mut health) = app.world_mut().get_mut::<Health>(primary) {
            health.current = 0.0;
        }

        apply(&mut app, [hit(peer, 30.0, DamageFlags::MELEE)]);

        assert_eq!(health(&app, peer), 70.0);
        let dealt = events::<DamageDealt>(&app);
        assert_eq!(dealt[0].target, peer);
        assert_eq!(dealt[0].redirected_from, None);
    }

    #[test]
    fn test_burrowed_grabber_ignores_normal_damage() {
        let mut app = setup();
        let id = app.world_mut().resource_mut::<GrabGroups>().reserve_id();
        let mut chaser = Grabber::new(id, GrabRole::Primary);
        chaser.begin_chase(60.0);
        let primary = app.world_mut().spawn((Health::new(100.0), chaser)).id();

        apply(&mut app, [hit(primary, 30.0, DamageFlags::MELEE)]);
        assert_eq!(health(&app, primary), 100.0);
        assert!(events::<DamageDealt>(&app).is_empty());

        apply(&mut app, [DamageRequest::forced_kill(primary, None, Vec3::ZERO)]);
        assert_eq!(health(&app, primary), 0.0);
    }

    #[test]
    fn test_lethal_hit_emits_death_once() {
        let mut app = setup();
        let marine = app.world_mut().spawn(Health::new(20.0)).id();

        apply(
            &mut app,
            [hit(marine, 15.0, DamageFlags::MELEE), hit(marine, 15.0, DamageFlags::MELEE), hit(marine, 15.0, DamageFlags::MELEE)],
        );

        assert_eq!(health(&app, marine), 0.0);
        assert_eq!(events::<EntityDied>(&app).len(), 1);
        // Третий удар по трупу ничего не снимает
        let dealt = events::<DamageDealt>(&app);
        assert_eq!(dealt.len(), 2);
        assert_eq!(dealt[1].amount, 5.0);
    }
}
