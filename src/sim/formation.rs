//! Formation offsets for the entities of one wave
//!
//! All offsets are relative to the wave's anchor. Order is stable: entity `i` of a
//! wave always gets offset `i` for the same inputs (and the same RNG state for
//! `Random`).

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;

use super::path::evaluate_linear;
use crate::content::FormationStyle;
use crate::polar_to_cartesian;

/// Spawn offsets for `count` entities arranged in `style`
///
/// `custom_path` is only read by [`FormationStyle::Custom`]; `rng` is only drawn
/// from by [`FormationStyle::Random`].
pub fn generate_offsets<R: Rng + ?Sized>(
    count: u32,
    spacing: f32,
    style: FormationStyle,
    custom_path: &[Vec2],
    rng: &mut R,
) -> Vec<Vec2> {
    generate_offsets_capped(count, spacing, style, custom_path, usize::MAX, rng)
}

/// The first `limit` offsets of a `count`-entity formation
///
/// Geometry is that of the full formation; only the kept entities are computed
/// (and, for `Random`, drawn), so the cost is bounded by `limit`.
pub fn generate_offsets_capped<R: Rng + ?Sized>(
    count: u32,
    spacing: f32,
    style: FormationStyle,
    custom_path: &[Vec2],
    limit: usize,
    rng: &mut R,
) -> Vec<Vec2> {
    let n = count as usize;
    let take = n.min(limit);
    if take == 0 {
        return Vec::new();
    }
    let spacing = if spacing.is_finite() { spacing } else { 0.0 };

    match style {
        FormationStyle::Line => line_offsets(n, take, spacing),
        FormationStyle::V => v_offsets(take, spacing),
        FormationStyle::Circle => circle_offsets(n, take, spacing),
        FormationStyle::Random => random_offsets(n, take, spacing, rng),
        FormationStyle::Custom => custom_offsets(n, take, custom_path),
    }
}

/// Centered on the anchor along x
fn line_offsets(n: usize, take: usize, spacing: f32) -> Vec<Vec2> {
    let center = (n as f32 - 1.0) / 2.0;
    (0..take)
        .map(|i| Vec2::new((i as f32 - center) * spacing, 0.0))
        .collect()
}

/// Leader at the tip, pairs alternating right/left and trailing along +y
fn v_offsets(take: usize, spacing: f32) -> Vec<Vec2> {
    (0..take)
        .map(|i| {
            let rank = i.div_ceil(2) as f32;
            let side = if i % 2 == 1 { 1.0 } else { -1.0 };
            Vec2::new(side * rank * spacing, rank * spacing)
        })
        .collect()
}

/// Evenly spaced on a circle whose circumference is `spacing * n`
fn circle_offsets(n: usize, take: usize, spacing: f32) -> Vec<Vec2> {
    let radius = spacing * n as f32 / TAU;
    (0..take)
        .map(|i| polar_to_cartesian(radius, TAU * i as f32 / n as f32))
        .collect()
}

/// Uniform inside a square of side `spacing * sqrt(n)`
fn random_offsets<R: Rng + ?Sized>(n: usize, take: usize, spacing: f32, rng: &mut R) -> Vec<Vec2> {
    let half = (spacing.abs() * (n as f32).sqrt()) / 2.0;
    if half <= 0.0 || !half.is_finite() {
        return vec![Vec2::ZERO; take];
    }
    (0..take)
        .map(|_| Vec2::new(rng.random_range(-half..=half), rng.random_range(-half..=half)))
        .collect()
}

/// The custom path sampled at `n` evenly spaced parameters
fn custom_offsets(n: usize, take: usize, path: &[Vec2]) -> Vec<Vec2> {
    if path.is_empty() {
        log::debug!("Custom formation without a path, stacking {} entities on the anchor", take);
    }
    if n == 1 {
        return vec![evaluate_linear(path, 0.0)];
    }
    let last = (n - 1) as f32;
    (0..take)
        .map(|i| evaluate_linear(path, i as f32 / last))
        .collect()
}
