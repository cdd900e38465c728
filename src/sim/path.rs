//! Path evaluation along waypoints and cubic curves
//!
//! `evaluate_linear` splits [0, 1] into equal *parameter* segments, one per pair of
//! waypoints, regardless of how long each segment is. Movement along an uneven
//! path therefore speeds up on long segments. Use [`resample_even`] first when
//! constant speed matters.

use glam::Vec2;

#[inline]
fn clamp_t(t: f32) -> f32 {
    if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 }
}

/// Position along a polyline at progress `t` (clamped to [0, 1])
///
/// Empty paths evaluate to the origin, single points to themselves.
pub fn evaluate_linear(waypoints: &[Vec2], t: f32) -> Vec2 {
    match waypoints {
        [] => Vec2::ZERO,
        [only] => *only,
        _ => {
            let t = clamp_t(t);
            let segments = (waypoints.len() - 1) as f32;
            let segment_t = t * segments;
            let index = (segment_t as usize).min(waypoints.len() - 2);
            let local_t = segment_t - index as f32;
            waypoints[index].lerp(waypoints[index + 1], local_t)
        }
    }
}

/// Cubic Bézier through control points p0..p3 at `t` (clamped to [0, 1])
pub fn evaluate_bezier(p0: Vec2, p1: Vec2, p2: Vec2, p3: Vec2, t: f32) -> Vec2 {
    let t = clamp_t(t);
    let u = 1.0 - t;
    u * u * u * p0 + 3.0 * u * u * t * p1 + 3.0 * u * t * t * p2 + t * t * t * p3
}

/// Total length of a polyline
pub fn polyline_length(waypoints: &[Vec2]) -> f32 {
    waypoints.windows(2).map(|pair| pair[0].distance(pair[1])).sum()
}

/// Resample a polyline into `count` points evenly spaced by arc length
///
/// Feeding the result to [`evaluate_linear`] gives (approximately) constant-speed
/// traversal. Degenerate paths (fewer than two points or zero length) repeat
/// their first point.
pub fn resample_even(waypoints: &[Vec2], count: usize) -> Vec<Vec2> {
    if count == 0 {
        return Vec::new();
    }
    let total = polyline_length(waypoints);
    if waypoints.len() < 2 || total <= f32::EPSILON {
        return vec![evaluate_linear(waypoints, 0.0); count];
    }
    if count == 1 {
        return vec![waypoints[0]];
    }

    let step = total / (count - 1) as f32;
    let mut out = Vec::with_capacity(count);
    let mut segment = 0;
    let mut walked = 0.0;

    for i in 0..count {
        let target = (step * i as f32).min(total);
        // Advance to the segment containing `target`
        while segment < waypoints.len() - 2 {
            let len = waypoints[segment].distance(waypoints[segment + 1]);
            if walked + len >= target {
                break;
            }
            walked += len;
            segment += 1;
        }
        let a = waypoints[segment];
        let b = waypoints[segment + 1];
        let len = a.distance(b);
        let local = if len > f32::EPSILON {
            ((target - walked) / len).clamp(0.0, 1.0)
        } else {
            0.0
        };
        out.push(a.lerp(b, local));
    }

    out
}
