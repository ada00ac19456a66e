//! Smoothing ship motion between two logic ticks.

use sim_core::behavior::movement::wrap_angle;
use sim_core::Vec2;

/// Position at `progress` between `from` (previous tick) and `to` (current tick).
///
/// Cubic Hermite with tangents `velocity * step_seconds`. A tangent pointing
/// back against the displacement loses that component so the curve never
/// swings behind its endpoints. Falls back to a straight line when the curve
/// is not finite. `progress` is clamped to `[0, 1]` and the endpoints are
/// returned exactly.
pub fn hermite_position(
    from: Vec2,
    from_velocity: Vec2,
    to: Vec2,
    to_velocity: Vec2,
    step_seconds: f32,
    progress: f32,
) -> Vec2 {
    let t = if progress.is_nan() {
        1.0
    } else {
        progress.clamp(0.0, 1.0)
    };
    if t <= 0.0 {
        return from;
    }
    if t >= 1.0 {
        return to;
    }

    let displacement = to - from;
    let m0 = clamp_backward(from_velocity * step_seconds, displacement);
    let m1 = clamp_backward(to_velocity * step_seconds, displacement);

    let t2 = t * t;
    let t3 = t2 * t;
    let h00 = 2.0 * t3 - 3.0 * t2 + 1.0;
    let h10 = t3 - 2.0 * t2 + t;
    let h01 = -2.0 * t3 + 3.0 * t2;
    let h11 = t3 - t2;
    let point = from * h00 + m0 * h10 + to * h01 + m1 * h11;

    if point.is_finite() {
        point
    } else {
        linear_position(from, to, t)
    }
}

pub fn linear_position(from: Vec2, to: Vec2, progress: f32) -> Vec2 {
    let lerped = from.lerp(to, progress.clamp(0.0, 1.0));
    if lerped.is_finite() {
        lerped
    } else {
        to
    }
}

/// Shortest-arc blend between two headings.
pub fn blend_orientation(from: f32, to: f32, progress: f32) -> f32 {
    if !from.is_finite() {
        return to;
    }
    let t = progress.clamp(0.0, 1.0);
    if t >= 1.0 {
        return to;
    }
    from + wrap_angle(to - from) * t
}

fn clamp_backward(tangent: Vec2, displacement: Vec2) -> Vec2 {
    if !tangent.is_finite() {
        return Vec2::ZERO;
    }
    let axis = displacement.normalize_or_zero();
    let along = tangent.dot(axis);
    if along < 0.0 {
        tangent - axis * along
    } else {
        tangent
    }
}
