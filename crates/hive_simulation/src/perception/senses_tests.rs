//! Tests for sight and swarm sense.

#[cfg(test)]
mod tests {
    use super::super::components::*;
    use super::super::senses::*;
    use crate::components::{Actor, Classification};
    use crate::relations::{FactionRelations, Relationship};
    use crate::spatial::CollisionWorld;
    use bevy::prelude::*;

    const ALIENS: u64 = 1;
    const MARINES: u64 = 2;
    const CIVILIANS: u64 = 3;

    fn relations() -> FactionRelations {
        FactionRelations::default()
            .with(ALIENS, MARINES, Relationship::Hostile)
            .with(ALIENS, CIVILIANS, Relationship::Neutral)
    }

    fn candidate(index: u32, faction: u64, classification: Classification, position: Vec3) -> SenseCandidate {
        SenseCandidate {
            entity: Entity::from_raw(index),
            actor: Actor::new(faction, classification),
            position,
            eye: position + Vec3::Y * 36.0,
        }
    }

    fn drone_at_origin(actor: &Actor) -> SenseObserver<'_> {
        SenseObserver {
            entity: Entity::from_raw(100),
            actor,
            eye: Vec3::Y * 36.0,
            remembered_enemy: None,
        }
    }

    /// Стена между дроном и морпехом
    fn walled_world() -> CollisionWorld {
        let mut world = CollisionWorld::default();
        world.add_obstacle(Vec3::new(90.0, 0.0, -50.0), Vec3::new(110.0, 200.0, 50.0));
        world
    }

    #[test]
    fn test_swarm_sense_ignores_obstacles() {
        let drone = Actor::new(ALIENS, Classification::Alien);
        let observer = drone_at_origin(&drone);
        let marine = candidate(1, MARINES, Classification::Marine, Vec3::new(200.0, 0.0, 0.0));
        let world = walled_world();

        let sight = gather_sight(&observer, &[marine], DEFAULT_SIGHT_DISTANCE, &world, &relations());
        assert!(sight.entries.is_empty(), "wall must block sight");

        let sensed = gather_swarm_sense(&observer, &[marine], DEFAULT_SWARM_SENSE_RADIUS, &relations());
        assert_eq!(sensed.entries.len(), 1);
        assert_eq!(sensed.entries[0].entity, marine.entity);
        assert!(sensed.entries[0].threat);
    }

    #[test]
    fn test_sight_records_relationships() {
        let drone = Actor::new(ALIENS, Classification::Alien);
        let observer = drone_at_origin(&drone);
        let candidates = [
            candidate(1, MARINES, Classification::Marine, Vec3::new(100.0, 0.0, 0.0)),
            candidate(2, ALIENS, Classification::Alien, Vec3::new(0.0, 0.0, 100.0)),
            candidate(3, CIVILIANS, Classification::Marine, Vec3::new(-100.0, 0.0, 0.0)),
            // Фракция без записи в таблице → Unknown → Neutral
            candidate(4, 9, Classification::Marine, Vec3::new(0.0, 0.0, -100.0)),
        ];

        let report = gather_sight(
            &observer,
            &candidates,
            DEFAULT_SIGHT_DISTANCE,
            &CollisionWorld::default(),
            &relations(),
        );

        let relationships: Vec<_> = report.entries.iter().map(|e| (e.entity, e.relationship, e.threat)).collect();
        assert_eq!(
            relationships,
            vec![
                (Entity::from_raw(1), Relationship::Hostile, true),
                (Entity::from_raw(2), Relationship::Ally, false),
                (Entity::from_raw(3), Relationship::Neutral, false),
                (Entity::from_raw(4), Relationship::Neutral, false),
            ]
        );
    }

    #[test]
    fn test_sight_distance_and_self() {
        let drone = Actor::new(ALIENS, Classification::Alien);
        let observer = drone_at_origin(&drone);
        let itself = SenseCandidate {
            entity: observer.entity,
            actor: drone,
            position: Vec3::ZERO,
            eye: observer.eye,
        };
        let far = candidate(1, MARINES, Classification::Marine, Vec3::new(800.0, 0.0, 0.0));
        let near = candidate(2, MARINES, Classification::Marine, Vec3::new(700.0, 0.0, 0.0));

        let report = gather_sight(
            &observer,
            &[itself, far, near],
            DEFAULT_SIGHT_DISTANCE,
            &CollisionWorld::default(),
            &relations(),
        );

        assert_eq!(report.entries.len(), 1);
        assert_eq!(report.entries[0].entity, near.entity);
    }

    #[test]
    fn test_bait_only_seen_up_close() {
        let drone = Actor::new(ALIENS, Classification::Alien);
        let observer = drone_at_origin(&drone);
        let far_bait = candidate(1, MARINES, Classification::Bait, Vec3::new(400.0, 0.0, 0.0));
        let near_bait = candidate(2, MARINES, Classification::Bait, Vec3::new(250.0, 0.0, 0.0));

        let report = gather_sight(
            &observer,
            &[far_bait, near_bait],
            DEFAULT_SIGHT_DISTANCE,
            &CollisionWorld::default(),
            &relations(),
        );

        assert_eq!(report.entries.len(), 1);
        assert_eq!(report.entries[0].entity, near_bait.entity);
    }

    #[test]
    fn test_remembered_enemy_position_updates() {
        let drone = Actor::new(ALIENS, Classification::Alien);
        let mut observer = drone_at_origin(&drone);
        // Враг из другой фракции, с которой отношения не заданы
        let enemy = candidate(1, 9, Classification::Marine, Vec3::new(150.0, 0.0, 20.0));
        observer.remembered_enemy = Some(enemy.entity);

        let report = gather_swarm_sense(&observer, &[enemy], DEFAULT_SWARM_SENSE_RADIUS, &relations());

        assert_eq!(report.enemy_position, Some(enemy.position));
        assert!(!report.entries[0].threat);
    }

    #[test]
    fn test_long_range_doubles_distances() {
        assert_eq!(Perception::long_range().sight_distance, 1536.0);
        assert_eq!(SwarmSense::long_range().radius, 1152.0);
        assert_eq!(SwarmSense::default().interval, DEFAULT_SWARM_SENSE_INTERVAL);
    }

    #[test]
    fn test_iter_sensed_order() {
        let mut perception = Perception::default();
        let seen = PerceivedTarget {
            entity: Entity::from_raw(1),
            last_known_position: Vec3::ZERO,
            relationship: Relationship::Hostile,
            threat: true,
        };
        let sensed = PerceivedTarget {
            entity: Entity::from_raw(2),
            relationship: Relationship::Neutral,
            threat: false,
            ..seen
        };
        perception.set_seen(vec![seen]);
        perception.set_swarm_sensed(vec![sensed]);

        let order: Vec<_> = perception.iter_sensed().map(|t| t.entity).collect();
        assert_eq!(order, vec![Entity::from_raw(1), Entity::from_raw(2)]);
        assert_eq!(perception.threats().count(), 1);
        assert!(perception.senses(Entity::from_raw(2)));
    }
}
