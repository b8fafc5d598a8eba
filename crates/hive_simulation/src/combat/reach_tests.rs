//! Tests for the attack reach evaluator.

#[cfg(test)]
mod tests {
    use super::super::reach::*;
    use crate::combat::{AttackProfile, AttackProfiles, AttackSlot, FacingRequirement, MeleeStrike};
    use bevy::prelude::*;

    fn claw_profile() -> AttackProfile {
        AttackProfile::melee(64.0, MeleeStrike::new(64.0, 16.0, 10.0))
            .with_facing(FacingRequirement::within_degrees(30.0))
    }

    fn verdict_against(target: Vec3) -> ReachVerdict {
        let attacker = Vec3::ZERO;
        let distance = attacker.distance(target);
        evaluate(&claw_profile(), distance, facing_dot(Vec3::X, attacker, target))
    }

    #[test]
    fn test_scenario_usable_not_facing_too_far() {
        // Атакующий в начале координат смотрит в +X
        assert_eq!(verdict_against(Vec3::new(40.0, 0.0, 0.0)), ReachVerdict::Usable);
        // 45° в сторону — дальше 30° конуса
        assert_eq!(
            verdict_against(Vec3::new(40.0, 0.0, 40.0)),
            ReachVerdict::Blocked(BlockReason::NotFacing)
        );
        assert_eq!(
            verdict_against(Vec3::new(100.0, 0.0, 0.0)),
            ReachVerdict::Blocked(BlockReason::TooFar)
        );
    }

    #[test]
    fn test_disabled_is_never_applicable() {
        let disabled = AttackProfile {
            enabled: false,
            ..claw_profile()
        };

        for distance in [0.0, 10.0, 64.0, 1000.0] {
            for dot in [-1.0, 0.0, 1.0] {
                assert_eq!(evaluate(&disabled, distance, dot), ReachVerdict::NotApplicable);
            }
        }
    }

    #[test]
    fn test_rule_order() {
        let profile = AttackProfile::new(20.0, 64.0).with_facing(FacingRequirement::MinDot(0.9));

        // Слишком близко и не лицом — TooClose проверяется раньше
        assert_eq!(evaluate(&profile, 5.0, -1.0), ReachVerdict::Blocked(BlockReason::TooClose));
        // Слишком далеко и не лицом — TooFar раньше NotFacing
        assert_eq!(evaluate(&profile, 100.0, -1.0), ReachVerdict::Blocked(BlockReason::TooFar));
        assert_eq!(evaluate(&profile, 30.0, 0.5), ReachVerdict::Blocked(BlockReason::NotFacing));
        // Границы включительно
        assert_eq!(evaluate(&profile, 20.0, 0.9), ReachVerdict::Usable);
        assert_eq!(evaluate(&profile, 64.0, 1.0), ReachVerdict::Usable);
    }

    #[test]
    fn test_ignore_facing() {
        let profile = AttackProfile::new(0.0, 64.0);
        assert_eq!(evaluate(&profile, 30.0, -1.0), ReachVerdict::Usable);
    }

    #[test]
    fn test_evaluate_is_pure() {
        let profile = claw_profile();
        let first = evaluate(&profile, 50.0, 0.95);
        for _ in 0..100 {
            assert_eq!(evaluate(&profile, 50.0, 0.95), first);
        }
    }

    #[test]
    fn test_each_profile_checks_own_facing() {
        let profiles = AttackProfiles::new()
            .with(AttackSlot::Melee1, claw_profile())
            .and_then(|p| {
                p.with(
                    AttackSlot::Melee2,
                    AttackProfile::melee(64.0, MeleeStrike::new(64.0, 16.0, 20.0))
                        .with_facing(FacingRequirement::within_degrees(80.0)),
                )
            })
            .expect("valid profiles");

        // 60° в сторону: первичный конус (30°) не проходит, вторичный (80°) — проходит
        let dot = 60.0f32.to_radians().cos();
        assert_eq!(
            evaluate_slot(&profiles, AttackSlot::Melee1, 40.0, dot),
            ReachVerdict::Blocked(BlockReason::NotFacing)
        );
        assert_eq!(evaluate_slot(&profiles, AttackSlot::Melee2, 40.0, dot), ReachVerdict::Usable);
        assert_eq!(
            evaluate_slot(&profiles, AttackSlot::Range1, 40.0, dot),
            ReachVerdict::NotApplicable
        );
    }

    #[test]
    fn test_facing_range_boost_extends_reach() {
        let profile = AttackProfile::new(0.0, 100.0).with_facing_range_boost(0.25);

        assert_eq!(evaluate(&profile, 110.0, 1.0), ReachVerdict::Blocked(BlockReason::TooFar));
        assert_eq!(evaluate(&profile, 110.0, 0.5), ReachVerdict::Usable);
    }

    #[test]
    fn test_facing_dot_is_horizontal() {
        // Высота цели не влияет на facing
        let dot = facing_dot(Vec3::X, Vec3::ZERO, Vec3::new(50.0, 200.0, 0.0));
        assert!((dot - 1.0).abs() < 1e-6);

        let behind = facing_dot(Vec3::X, Vec3::ZERO, Vec3::new(-10.0, 0.0, 0.0));
        assert!((behind + 1.0).abs() < 1e-6);

        // Цель точно сверху — считается "перед"
        assert_eq!(facing_dot(Vec3::X, Vec3::ZERO, Vec3::new(0.0, 30.0, 0.0)), 1.0);
    }
}
