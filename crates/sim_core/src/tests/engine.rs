use super::*;
use crate::test_fixtures::fleet_content;

#[test]
fn first_tick_spawns_the_roster_once() {
    let mut world = WorldContext::new(&fleet_content(3), 11);
    assert!(!world.is_spawned());
    tick(&mut world).unwrap();
    tick(&mut world).unwrap();
    assert!(world.is_spawned());
    // 3 per side, 2 sides, 2 systems.
    assert_eq!(world.uids.issued(EntityKind::Ship), 12);
    assert_eq!(world.ships.total_count(), 12);
    assert_eq!(world.pilots.len(), 12);
    assert!(world.ships.is_consistent());
}

#[test]
fn spawned_ships_sit_inside_the_spawn_disk() {
    let mut world = WorldContext::new(&fleet_content(5), 2);
    let out = tick(&mut world).unwrap();
    let radius = world.constants.spawn_radius;
    assert_eq!(out.frame.ships.len(), 20);
    // One tick of movement at speed 5 on top of the spawn radius.
    for sample in &out.frame.ships {
        assert!(sample.position.length() <= radius + 5.0 + 1e-3);
    }
}

#[test]
fn same_seed_same_frames() {
    let run = |seed| {
        let mut world = WorldContext::new(&fleet_content(4), seed);
        (0..30)
            .map(|_| tick(&mut world).unwrap().frame)
            .collect::<Vec<_>>()
    };
    assert_eq!(run(42), run(42));
    assert_ne!(run(42), run(43));
}

#[test]
fn tick_index_advances_and_is_stamped_on_output() {
    let mut world = base_world(1);
    let first = tick(&mut world).unwrap();
    let second = tick(&mut world).unwrap();
    assert_eq!(first.tick, 1);
    assert_eq!(second.tick, 2);
    assert_eq!(second.frame.tick, 2);
    // Empty world: nothing to publish.
    assert!(!second.dynamic_data_changed);
}

#[test]
fn hunter_kills_target_and_the_wreck_is_reaped() {
    let mut world = base_world(1);
    let hunter = spawn_gunship(&mut world, 0, Vec2::ZERO, hunter_order());
    let victim = spawn_unarmed(&mut world, 1, Vec2::new(3.0, 0.0), Order::Idle);
    let victim_pilot = pilot_of(&world, victim);

    // Tick 1 acquires, ticks 2..=11 deal 10 damage each.
    let mut events = Vec::new();
    for _ in 0..11 {
        events.extend(tick(&mut world).unwrap().events);
    }
    assert_eq!(events.len(), 10);
    assert!(events.iter().all(|e| e.shooter == hunter && e.target == victim));
    assert_eq!(events.iter().filter(|e| e.target_destroyed).count(), 1);
    assert!(events.last().unwrap().target_destroyed);

    assert!(world.ship(victim).is_none());
    assert!(world.motive(victim_pilot).is_none());
    assert!(world.ships.is_consistent());

    let motive = world.motive(pilot_of(&world, hunter)).unwrap();
    assert_eq!(motive.target(), None);

    // Nothing left to find: the hunter keeps searching.
    let out = tick(&mut world).unwrap();
    assert!(out.events.is_empty());
    let motive = world.motive(pilot_of(&world, hunter)).unwrap();
    assert!(matches!(motive.current_action(), Some(Action::Acquire { .. })));
}

#[test]
fn wrecks_never_appear_in_the_frame() {
    let mut world = base_world(1);
    spawn_gunship(&mut world, 0, Vec2::ZERO, hunter_order());
    let victim = spawn_unarmed(&mut world, 1, Vec2::new(3.0, 0.0), Order::Idle);
    world.ships.get_mut(victim).unwrap().stats.hp = 5.0;

    tick(&mut world).unwrap();
    let out = tick(&mut world).unwrap();
    assert!(out.events.iter().any(|e| e.target_destroyed));
    assert!(out.frame.ships.iter().all(|s| s.uid != victim && s.active));
}

#[test]
fn only_the_observed_system_is_traced() {
    let mut world = base_world(1);
    let near = spawn_unarmed(&mut world, 0, Vec2::ZERO, patrol_at_origin(10.0));
    let far = world
        .spawn_ship(
            &template(5.0, vec![]),
            spawn_request(1, 0, Vec2::ZERO, patrol_at_origin(10.0)),
        )
        .unwrap();

    let out = tick(&mut world).unwrap();
    assert!(out.trace.samples.is_empty());
    assert_eq!(out.trace.version, 0);

    world.set_observed_system(Some(SystemId(0))).unwrap();
    let out = tick(&mut world).unwrap();
    assert_eq!(out.trace.system, Some(SystemId(0)));
    assert!(out.trace.samples_for(near).count() > 0);
    assert_eq!(out.trace.samples_for(far).count(), 0);
    assert_eq!(out.trace.version, 1);

    assert_eq!(
        world.set_observed_system(Some(SystemId(9))),
        Err(SimError::UnknownSystem(SystemId(9)))
    );
}

#[test]
fn failed_roster_spawn_leaves_no_ships_behind() {
    let mut content = fleet_content(2);
    // Second rule cannot be spawned: nine weapons for eight slots.
    content.roster[1].template = template(5.0, vec![weapon(5.0, 1.0, 10.0); 9]);
    let mut world = WorldContext::new(&content, 3);

    assert_eq!(tick(&mut world).unwrap_err(), SimError::TooManyWeapons(9));
    assert!(!world.is_spawned());
    assert_eq!(world.ships.total_count(), 0);
    assert!(world.pilots.is_empty());
    assert!(world.ships.is_consistent());

    // Retrying fails the same way instead of ticking a half-spawned roster.
    assert!(tick(&mut world).is_err());
    assert_eq!(world.ships.total_count(), 0);
    assert_eq!(world.tick_index(), 0);
}

#[test]
fn static_world_reports_no_dynamic_change() {
    let mut world = base_world(1);
    spawn_unarmed(&mut world, 0, Vec2::new(3.0, 4.0), Order::Idle);
    assert!(tick(&mut world).unwrap().dynamic_data_changed);
    assert!(!tick(&mut world).unwrap().dynamic_data_changed);
    assert!(!tick(&mut world).unwrap().dynamic_data_changed);

    let ship = world.ships.iter().next().unwrap().1.uid;
    let pilot = pilot_of(&world, ship);
    world.assign_order(pilot, patrol_at_origin(10.0)).unwrap();
    assert!(tick(&mut world).unwrap().dynamic_data_changed);
}
