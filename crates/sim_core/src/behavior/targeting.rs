use crate::{HostilityTable, Ship};

/// Whether `seeker` may engage `candidate` at all.
pub fn is_valid_target(
    seeker: &Ship,
    candidate: &Ship,
    hostility: &HostilityTable,
    friendly_fire: bool,
) -> bool {
    candidate.uid != seeker.uid
        && candidate.active
        && (friendly_fire || hostility.is_hostile(seeker.faction, candidate.faction))
}

/// Slot of the nearest valid target for the ship in `seeker_slot`.
///
/// Linear scan in slot order; a candidate replaces the best only when strictly
/// nearer, so the first of several equidistant ships wins. `radius` limits the
/// search when set.
pub fn find_nearest_target(
    slots: &[Ship],
    seeker_slot: usize,
    hostility: &HostilityTable,
    radius: Option<f32>,
    friendly_fire: bool,
) -> Option<usize> {
    let seeker = slots.get(seeker_slot)?;
    let limit = radius.map(|r| r * r);
    let mut best: Option<(usize, f32)> = None;

    for (slot, candidate) in slots.iter().enumerate() {
        if slot == seeker_slot || !is_valid_target(seeker, candidate, hostility, friendly_fire) {
            continue;
        }
        let dist_sq = (candidate.position - seeker.position).length_squared();
        if limit.is_some_and(|limit| dist_sq > limit) {
            continue;
        }
        if best.is_none_or(|(_, best_sq)| dist_sq < best_sq) {
            best = Some((slot, dist_sq));
        }
    }
    best.map(|(slot, _)| slot)
}
