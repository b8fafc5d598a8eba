//! Tests for grabber state transitions and the boss start gate.

#[cfg(test)]
mod tests {
    use super::super::components::*;
    use bevy::prelude::*;

    fn grabber() -> Grabber {
        Grabber::new(GrabGroupId(0), GrabRole::Peer)
    }

    #[test]
    fn test_exposure_follows_state() {
        let mut member = grabber();
        assert!(!member.is_exposed());

        member.begin_chase(60.0);
        assert!(!member.is_exposed());

        member.begin_grab(0.5);
        assert!(member.is_exposed());
        assert_eq!(member.damage_timer, 0.5);

        // Уходит под землю: пока поза не доиграна — уязвим
        assert!(member.begin_retract());
        assert!(member.is_exposed());
        member.retract_ready = true;
        assert!(!member.is_exposed());

        member.finish();
        assert!(!member.is_exposed());
    }

    #[test]
    fn test_retract_from_underground_needs_no_pose() {
        let mut member = grabber();
        member.begin_chase(60.0);

        assert!(!member.begin_retract());
        assert_eq!(member.state, GrabberState::Retracting);
        assert!(member.retract_ready);

        // Повторный retract ничего не меняет
        assert!(!member.begin_retract());
        member.finish();
        assert!(!member.begin_retract());
        assert!(member.is_done());
    }

    #[test]
    fn test_boss_start_gate() {
        let mut boss = GrabBoss::new(GrabAttackConfig::default());
        let target = Entity::from_raw(3);

        assert_eq!(
            boss.try_start_grab_attack(0.0, Some(target)),
            Err(GrabStartError::OnCooldown { remaining: 20.0 })
        );
        assert_eq!(boss.try_start_grab_attack(25.0, None), Err(GrabStartError::NoTarget));
        assert_eq!(boss.try_start_grab_attack(25.0, Some(target)), Ok(target));

        boss.active_group = Some(GrabGroupId(1));
        assert_eq!(
            boss.try_start_grab_attack(25.0, Some(target)),
            Err(GrabStartError::AlreadyActive)
        );

        boss.active_group = None;
        boss.phase = DiverPhase::Unplunging { remaining: 1.0 };
        assert_eq!(
            boss.try_start_grab_attack(25.0, Some(target)),
            Err(GrabStartError::AlreadyActive)
        );
    }

    #[test]
    fn test_boss_default_limits_chase() {
        assert_eq!(GrabAttackConfig::boss_default().max_chase_duration, Some(6.0));
        assert_eq!(GrabAttackConfig::default().max_chase_duration, None);
        assert_eq!(GrabBoss::default().next_attack_at, 20.0);
    }
}
