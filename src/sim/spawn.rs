//! Pattern expansion: one firing event into a batch of bullets
//!
//! Angles are in degrees with 0° along +x, counter-clockwise. The RNG is only
//! drawn from by [`SpreadStyle::Random`] patterns with a non-zero spread, so
//! the other styles are deterministic regardless of seed.

use glam::Vec2;
use rand::Rng;

use super::motion::MotionState;
use crate::content::{PatternDefinition, SpreadStyle};
use crate::direction_from_degrees;

/// Firing angle (degrees) of every bullet in `pattern`, in spawn order
pub fn bullet_angles<R: Rng + ?Sized>(
    pattern: &PatternDefinition,
    aim_deg: f32,
    rng: &mut R,
) -> Vec<f32> {
    bullet_angles_capped(pattern, aim_deg, usize::MAX, rng)
}

/// Angles of the first `limit` bullets of `pattern`
///
/// Each angle is computed from its index within the full pattern, so the kept
/// bullets match the uncapped expansion; `Random` only draws for kept bullets.
pub fn bullet_angles_capped<R: Rng + ?Sized>(
    pattern: &PatternDefinition,
    aim_deg: f32,
    limit: usize,
    rng: &mut R,
) -> Vec<f32> {
    let count = pattern.bullet_count as usize;
    let take = count.min(limit);
    if take == 0 {
        return Vec::new();
    }

    let center = aim_deg + pattern.angle_offset;
    let spread = pattern.sanitized_spread();
    let half = spread / 2.0;

    match pattern.spread {
        SpreadStyle::Fan => {
            if count == 1 {
                vec![center]
            } else {
                let step = spread / (count - 1) as f32;
                (0..take).map(|i| center - half + step * i as f32).collect()
            }
        }
        SpreadStyle::Circle => {
            let step = 360.0 / count as f32;
            (0..take).map(|i| center + step * i as f32).collect()
        }
        // Deliberately co-linear: every bullet leaves on the same line
        SpreadStyle::Line => vec![center; take],
        SpreadStyle::Random => {
            if half > 0.0 {
                (0..take)
                    .map(|_| center + rng.random_range(-half..=half))
                    .collect()
            } else {
                vec![center; take]
            }
        }
    }
}

/// Expand `pattern` fired from `origin` toward `aim_deg`
///
/// A missing pattern or a zero bullet count yields nothing; this never fails.
pub fn spawn<R: Rng + ?Sized>(
    pattern: Option<&PatternDefinition>,
    origin: Vec2,
    aim_deg: f32,
    rng: &mut R,
) -> Vec<MotionState> {
    let Some(pattern) = pattern else {
        return Vec::new();
    };
    let angles = bullet_angles(pattern, aim_deg, rng);
    spawn_at_angles(pattern, origin, &angles)
}

/// Fresh states at `origin`, one per firing angle, at the pattern's speed
pub fn spawn_at_angles(pattern: &PatternDefinition, origin: Vec2, angles: &[f32]) -> Vec<MotionState> {
    let speed = if pattern.speed.is_finite() { pattern.speed } else { 0.0 };
    angles
        .iter()
        .map(|&angle| MotionState::new(origin, direction_from_degrees(angle) * speed))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn pattern(spread: SpreadStyle, count: u32, spread_angle: f32) -> PatternDefinition {
        PatternDefinition {
            spread,
            bullet_count: count,
            spread_angle,
            ..PatternDefinition::new("test")
        }
    }

    fn rng() -> Pcg32 {
        Pcg32::seed_from_u64(0xC0FFEE)
    }

    #[test]
    fn test_missing_or_empty_pattern_spawns_nothing() {
        assert!(spawn(None, Vec2::ZERO, 0.0, &mut rng()).is_empty());
        let empty = pattern(SpreadStyle::Fan, 0, 30.0);
        assert!(spawn(Some(&empty), Vec2::ZERO, 0.0, &mut rng()).is_empty());
    }

    #[test]
    fn test_single_fan_bullet_uses_center_exactly() {
        let mut single = pattern(SpreadStyle::Fan, 1, 45.0);
        single.angle_offset = 12.5;
        assert_eq!(bullet_angles(&single, 30.0, &mut rng()), vec![42.5]);
    }

    #[test]
    fn test_fan_spans_spread() {
        let fan = pattern(SpreadStyle::Fan, 5, 60.0);
        assert_eq!(
            bullet_angles(&fan, 90.0, &mut rng()),
            vec![60.0, 75.0, 90.0, 105.0, 120.0]
        );
    }

    #[test]
    fn test_circle_ignores_spread() {
        let circle = pattern(SpreadStyle::Circle, 4, 10.0);
        assert_eq!(
            bullet_angles(&circle, 0.0, &mut rng()),
            vec![0.0, 90.0, 180.0, 270.0]
        );
    }

    #[test]
    fn test_line_is_colinear() {
        let mut line = pattern(SpreadStyle::Line, 3, 90.0);
        line.angle_offset = -10.0;
        assert_eq!(bullet_angles(&line, 0.0, &mut rng()), vec![-10.0; 3]);
    }

    #[test]
    fn test_random_stays_inside_spread() {
        let random = pattern(SpreadStyle::Random, 32, 40.0);
        for angle in bullet_angles(&random, -90.0, &mut rng()) {
            assert!((-110.0..=-70.0).contains(&angle), "angle {angle} out of spread");
        }
    }

    #[test]
    fn test_random_with_same_seed_is_identical() {
        let random = pattern(SpreadStyle::Random, 8, 120.0);
        let a = spawn(Some(&random), Vec2::new(1.0, 2.0), 45.0, &mut rng());
        let b = spawn(Some(&random), Vec2::new(1.0, 2.0), 45.0, &mut rng());
        assert_eq!(a, b);
    }

    #[test]
    fn test_deterministic_styles_ignore_seed() {
        for style in [SpreadStyle::Fan, SpreadStyle::Circle, SpreadStyle::Line] {
            let p = pattern(style, 6, 50.0);
            let a = spawn(Some(&p), Vec2::ZERO, 10.0, &mut Pcg32::seed_from_u64(1));
            let b = spawn(Some(&p), Vec2::ZERO, 10.0, &mut Pcg32::seed_from_u64(2));
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_spawned_state() {
        let mut p = pattern(SpreadStyle::Fan, 1, 0.0);
        p.speed = 4.0;
        let origin = Vec2::new(3.0, -1.0);
        let bullets = spawn(Some(&p), origin, 90.0, &mut rng());
        assert_eq!(bullets.len(), 1);
        let bullet = bullets[0];
        assert_eq!(bullet.pos, origin);
        assert_eq!(bullet.origin, origin);
        assert_eq!(bullet.age, 0.0);
        assert!(bullet.active);
        assert!((bullet.vel - Vec2::new(0.0, 4.0)).length() < 1e-5);
    }

    #[test]
    fn test_capped_angles_match_full_prefix() {
        let fan = pattern(SpreadStyle::Fan, 5, 60.0);
        assert_eq!(
            bullet_angles_capped(&fan, 90.0, 2, &mut rng()),
            vec![60.0, 75.0]
        );

        let huge = pattern(SpreadStyle::Circle, u32::MAX, 0.0);
        let angles = bullet_angles_capped(&huge, 0.0, 4, &mut rng());
        assert_eq!(angles.len(), 4);
        assert_eq!(angles[0], 0.0);
    }
}
