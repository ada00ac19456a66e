//! Steering toward a point with a bounded turn rate.

use std::f32::consts::{PI, TAU};

use crate::{Ship, SubstepTrace, Vec2};

/// Floor applied to the requested cruise speed.
pub const MIN_MOVE_SPEED: f32 = 0.1;
/// Longest substep the integrator takes.
pub const MAX_SUBSTEP_SECONDS: f32 = 0.05;
/// Upper bound on substeps per call, whatever the delta.
pub const MAX_SUBSTEPS: u32 = 60;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveRequest {
    pub destination: Vec2,
    pub speed: f32,
    pub arrive_distance: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveStatus {
    Arrived,
    Moving,
}

/// Advance `ship` toward `request.destination` over `dt` seconds.
///
/// A ship already within the arrival distance is snapped onto the destination
/// with zero velocity and reported `Arrived`; calling again keeps it there.
/// Otherwise the delta is split into at most [`MAX_SUBSTEPS`] substeps. Each
/// substep turns the heading by at most `speed * agility * sub_dt` radians and
/// then moves along the new heading, never past the remaining distance
/// projected onto it. Samples go to `trace` when one is supplied.
pub fn steer_toward(
    ship: &mut Ship,
    request: MoveRequest,
    dt: f32,
    mut trace: Option<&mut SubstepTrace>,
) -> MoveStatus {
    let arrive_distance = request.arrive_distance.max(0.0);
    if ship.position.distance(request.destination) <= arrive_distance {
        ship.position = request.destination;
        ship.velocity = Vec2::ZERO;
        return MoveStatus::Arrived;
    }

    let max_speed = ship.stats.max_speed;
    if max_speed <= 0.0 || dt <= 0.0 || max_speed.is_nan() || dt.is_nan() {
        ship.velocity = Vec2::ZERO;
        return MoveStatus::Moving;
    }

    let speed = request.speed.max(MIN_MOVE_SPEED).min(max_speed);
    // Turn radius is 1 / agility; no agility means the heading snaps.
    let turn_rate = if ship.stats.agility > 0.0 {
        speed * ship.stats.agility
    } else {
        f32::INFINITY
    };

    let substeps = ((dt / MAX_SUBSTEP_SECONDS).ceil() as u32).clamp(1, MAX_SUBSTEPS);
    let sub_dt = dt / substeps as f32;

    let start = ship.position;
    let mut position = ship.position;
    let mut heading = ship.heading();

    for step in 0..substeps {
        let to_target = request.destination - position;
        let remaining = to_target.length();
        if remaining <= arrive_distance || remaining <= f32::EPSILON {
            break;
        }
        let desired = to_target * (1.0 / remaining);
        heading = rotate_toward(heading, desired, turn_rate * sub_dt);

        let along = to_target.dot(heading).max(0.0);
        let advance = (speed * sub_dt).min(along);
        position += heading * advance;

        if let Some(trace) = trace.as_deref_mut() {
            let t = (step + 1) as f32 / substeps as f32;
            trace.record(ship.uid, t, position, heading.angle());
        }
    }

    ship.position = position;
    ship.orientation = heading.angle();
    ship.velocity = (position - start) * (1.0 / dt);
    MoveStatus::Moving
}

/// Rotate unit vector `current` toward unit vector `desired` by at most `max_angle`.
pub fn rotate_toward(current: Vec2, desired: Vec2, max_angle: f32) -> Vec2 {
    if desired.length_squared() <= f32::EPSILON {
        return current;
    }
    let from = current.angle();
    let delta = wrap_angle(desired.angle() - from);
    if !max_angle.is_finite() || delta.abs() <= max_angle {
        desired
    } else {
        Vec2::from_angle(from + max_angle.copysign(delta))
    }
}

/// Map an angle into `[-PI, PI)`.
pub fn wrap_angle(angle: f32) -> f32 {
    (angle + PI).rem_euclid(TAU) - PI
}
