//! Tests for grab chase/retract motion.

#[cfg(test)]
mod tests {
    use super::super::components::GrabAttackConfig;
    use super::super::motion::*;
    use crate::spatial::{CollisionWorld, FloorPatch};
    use bevy::prelude::*;

    const DT: f32 = 1.0 / 60.0;

    fn config() -> GrabAttackConfig {
        GrabAttackConfig::default()
    }

    #[test]
    fn test_chase_accelerates_towards_target() {
        let world = CollisionWorld::default();
        let config = config();

        let step = advance_chase(Vec3::ZERO, config.chase_start_speed, 0.0, Some(Vec3::new(500.0, 0.0, 0.0)), DT, &config, &world);

        let ChaseStep::Advanced { position, speed } = step else {
            panic!("expected Advanced, got {:?}", step);
        };
        assert!((speed - (60.0 + 240.0 * DT)).abs() < 1e-4);
        assert!((position.x - speed * DT).abs() < 1e-4);
        assert_eq!(position.z, 0.0);
    }

    #[test]
    fn test_chase_speed_is_capped() {
        let world = CollisionWorld::default();
        let config = config();

        let ChaseStep::Advanced { speed, .. } =
            advance_chase(Vec3::ZERO, 1000.0, 0.0, Some(Vec3::new(5000.0, 0.0, 0.0)), DT, &config, &world)
        else {
            panic!("expected Advanced");
        };
        assert_eq!(speed, config.chase_max_speed);
    }

    #[test]
    fn test_chase_never_overshoots_approach_distance() {
        let world = CollisionWorld::default();
        let config = config();

        // 50 от цели, approach 48: шаг не больше 2
        let ChaseStep::Advanced { position, .. } =
            advance_chase(Vec3::ZERO, 300.0, 0.0, Some(Vec3::new(50.0, 0.0, 0.0)), DT, &config, &world)
        else {
            panic!("expected Advanced");
        };
        assert!((position.x - 2.0).abs() < 1e-4);

        let reached = advance_chase(position, 300.0, 0.0, Some(Vec3::new(50.0, 0.0, 0.0)), DT, &config, &world);
        assert_eq!(reached, ChaseStep::Reached { position });
    }

    #[test]
    fn test_chase_loss_reasons() {
        let world = CollisionWorld::default();
        let mut config = config();

        assert_eq!(
            advance_chase(Vec3::ZERO, 60.0, 0.0, None, DT, &config, &world),
            ChaseStep::Lost(LossReason::TargetGone)
        );

        // Цель на балконе выше vertical tolerance
        assert_eq!(
            advance_chase(Vec3::ZERO, 60.0, 0.0, Some(Vec3::new(300.0, 200.0, 0.0)), DT, &config, &world),
            ChaseStep::Lost(LossReason::HeightMismatch)
        );

        config.max_chase_duration = Some(6.0);
        assert_eq!(
            advance_chase(Vec3::ZERO, 60.0, 6.0, Some(Vec3::new(300.0, 0.0, 0.0)), DT, &config, &world),
            ChaseStep::Lost(LossReason::ChaseTimeout)
        );
        // Без лимита тот же elapsed — не проблема
        config.max_chase_duration = None;
        assert!(matches!(
            advance_chase(Vec3::ZERO, 60.0, 600.0, Some(Vec3::new(300.0, 0.0, 0.0)), DT, &config, &world),
            ChaseStep::Advanced { .. }
        ));
    }

    #[test]
    fn test_chase_follows_ground() {
        let mut world = CollisionWorld::default();
        world.add_floor_patch(FloorPatch {
            min: Vec2::new(0.5, -10.0),
            max: Vec2::new(100.0, 10.0),
            height: 16.0,
        });
        let config = config();

        let ChaseStep::Advanced { position, .. } =
            advance_chase(Vec3::ZERO, 120.0, 0.0, Some(Vec3::new(300.0, 16.0, 0.0)), DT, &config, &world)
        else {
            panic!("expected Advanced");
        };
        assert_eq!(position.y, 16.0);
    }

    #[test]
    fn test_retract_reaches_home() {
        let world = CollisionWorld::default();
        let config = config();
        let origin = Vec3::ZERO;

        let mut position = Vec3::new(100.0, 0.0, 0.0);
        let mut steps = 0;
        loop {
            steps += 1;
            assert!(steps < 100, "retract never finished");
            match advance_retract(position, origin, DT, &config, &world) {
                RetractStep::Moving(next) => {
                    assert!(next.x < position.x);
                    position = next;
                }
                RetractStep::Home(next) => {
                    assert!(next.distance(origin) <= config.home_tolerance);
                    break;
                }
            }
        }
        // 100 / (250/60) ≈ 24 шага
        assert!(steps >= 23 && steps <= 25, "steps = {}", steps);
    }
}
