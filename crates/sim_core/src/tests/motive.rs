use super::*;

fn motive() -> Motive {
    Motive::new(Uid::new(EntityKind::Pilot, 1), 12345, 0.2)
}

#[test]
fn xorshift_is_deterministic_and_never_stuck_at_zero() {
    let mut a = XorShift32::new(0);
    let mut b = XorShift32::new(0);
    let first = a.next_u32();
    assert_ne!(first, 0);
    assert_eq!(first, b.next_u32());
    for _ in 0..1000 {
        let f = a.next_f32();
        assert!((0.0..1.0).contains(&f));
    }
}

#[test]
fn patrol_points_stay_inside_the_disk() {
    let mut m = motive();
    let center = Vec2::new(30.0, -12.0);
    m.assign_order(Order::Patrol {
        center,
        radius: 10.0,
    });
    for _ in 0..200 {
        // Standing on the current point forces a resample.
        let origin = m.roam_point().unwrap_or(center);
        m.ensure_patrol(origin, 5.0, center, 10.0).unwrap();
        let point = m.roam_point().unwrap();
        assert!(point.distance(center) <= 10.0 + 1e-4, "{point:?}");
    }
}

#[test]
fn patrol_keeps_its_point_until_arrival() {
    let mut m = motive();
    m.ensure_patrol(Vec2::ZERO, 5.0, Vec2::ZERO, 10.0).unwrap();
    let point = m.roam_point().unwrap();
    let state = m.rng_state();

    let short_of_point = point.lerp(Vec2::ZERO, 0.5);
    m.ensure_patrol(short_of_point, 5.0, Vec2::ZERO, 10.0).unwrap();
    assert_eq!(m.roam_point(), Some(point));
    assert_eq!(m.rng_state(), state);

    let at_point = point + Vec2::new(0.1, 0.0);
    m.ensure_patrol(at_point, 5.0, Vec2::ZERO, 10.0).unwrap();
    assert_ne!(m.roam_point(), Some(point));
    assert_ne!(m.rng_state(), state);
}

#[test]
fn repeated_patrol_reconciliation_keeps_depth_one() {
    let mut m = motive();
    m.assign_order(patrol_at_origin(10.0));
    let ship = ship_at(1, Vec2::ZERO);
    m.advance(&ship).unwrap();
    m.advance(&ship).unwrap();
    assert_eq!(m.actions().depth(), 1);

    // Arriving swaps the destination without pushing.
    let mut arrived = ship_at(1, m.roam_point().unwrap());
    arrived.stats.max_speed = 3.0;
    m.advance(&arrived).unwrap();
    assert_eq!(m.actions().depth(), 1);
    assert!(matches!(
        m.current_action(),
        Some(Action::Move { speed, .. }) if (*speed - 3.0).abs() < f32::EPSILON
    ));
}

#[test]
fn attack_all_enemies_acquires_then_attacks() {
    let mut m = motive();
    m.assign_order(hunter_order());
    let ship = ship_at(1, Vec2::ZERO);

    m.advance(&ship).unwrap();
    assert!(matches!(m.current_action(), Some(Action::Acquire { .. })));

    let enemy = Uid::new(EntityKind::Ship, 9);
    m.apply_outcome(ActionOutcome::TargetAcquired(enemy));
    assert_eq!(m.target(), Some(enemy));
    assert!(m.actions().is_empty());

    m.advance(&ship).unwrap();
    m.advance(&ship).unwrap();
    assert_eq!(m.actions().depth(), 1);
    assert!(matches!(
        m.current_action(),
        Some(Action::Attack { target, .. }) if *target == enemy
    ));
}

#[test]
fn hunter_losing_its_target_goes_back_to_acquire() {
    let mut m = motive();
    m.assign_order(hunter_order());
    let ship = ship_at(1, Vec2::ZERO);
    m.apply_outcome(ActionOutcome::TargetAcquired(Uid::new(EntityKind::Ship, 9)));
    m.advance(&ship).unwrap();

    m.apply_outcome(ActionOutcome::TargetLost);
    assert_eq!(m.target(), None);
    assert!(matches!(m.order(), Order::AttackAllEnemies { .. }));

    m.advance(&ship).unwrap();
    assert!(matches!(m.current_action(), Some(Action::Acquire { .. })));
}

#[test]
fn attack_target_falls_back_to_idle_when_lost() {
    let mut m = motive();
    let target = Uid::new(EntityKind::Ship, 4);
    m.assign_order(Order::AttackTarget {
        target,
        range: 5.0,
        friendly_fire: false,
    });
    assert_eq!(m.target(), Some(target));
    m.advance(&ship_at(1, Vec2::ZERO)).unwrap();
    assert_eq!(m.actions().depth(), 1);

    m.apply_outcome(ActionOutcome::TargetLost);
    assert_eq!(*m.order(), Order::Idle);
    assert_eq!(m.target(), None);
    assert!(m.actions().is_empty());
}

#[test]
fn new_order_clears_the_stack() {
    let mut m = motive();
    m.assign_order(patrol_at_origin(10.0));
    m.advance(&ship_at(1, Vec2::ZERO)).unwrap();
    assert!(m.roam_point().is_some());

    m.assign_order(Order::Idle);
    assert!(m.actions().is_empty());
    assert_eq!(m.roam_point(), None);
}

#[test]
fn motive_survives_a_json_round_trip_mid_patrol() {
    let mut m = motive();
    m.assign_order(patrol_at_origin(10.0));
    let ship = ship_at(1, Vec2::ZERO);
    m.advance(&ship).unwrap();

    let json = serde_json::to_string(&m).unwrap();
    let mut restored: Motive = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, m);
    assert!(restored.actions().iter().eq(m.actions().iter()));

    // Both copies resample the same next point from the restored RNG state.
    let arrived = ship_at(1, m.roam_point().unwrap());
    m.advance(&arrived).unwrap();
    restored.advance(&arrived).unwrap();
    assert_eq!(restored.roam_point(), m.roam_point());
    assert_eq!(restored.rng_state(), m.rng_state());
}
