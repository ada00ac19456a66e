use crate::{CombatEvent, Ship, SystemId, Vec2};

/// Fire every weapon of `attacker` that can reach `target`.
///
/// Weapons out of range are left untouched. In range, a weapon adds its rate
/// to its shot accumulator once per call (rate is shots per tick) and fires the
/// whole shots accumulated. Returns true when this call destroyed the target.
pub fn fire_weapons(
    attacker: &mut Ship,
    target: &mut Ship,
    tick: u64,
    system: SystemId,
    events: &mut Vec<CombatEvent>,
) -> bool {
    if !target.active {
        return false;
    }
    let distance = attacker.position.distance(target.position);
    let mut destroyed = false;

    for (slot, weapon) in attacker.weapons.iter_mut().enumerate() {
        if distance > weapon.range {
            continue;
        }
        weapon.shots_accumulator += weapon.rate;
        if weapon.shots_accumulator < 1.0 {
            continue;
        }
        let shots = weapon.shots_accumulator.floor();
        weapon.shots_accumulator -= shots;

        let damage = weapon.damage_per_shot * shots;
        target.stats.hp = (target.stats.hp - damage).max(0.0);
        let killed = target.stats.hp <= 0.0;
        if killed {
            target.active = false;
            target.velocity = Vec2::ZERO;
            destroyed = true;
        }

        events.push(CombatEvent {
            tick,
            system,
            shooter: attacker.uid,
            target: target.uid,
            weapon_slot: slot as u8,
            shots_fired: shots as u32,
            damage,
            shooter_position: attacker.position,
            target_position: target.position,
            bullet: weapon.bullet,
            target_destroyed: killed,
        });

        if killed {
            break;
        }
    }
    destroyed
}
