//! Motion integration for a single bullet
//!
//! Order per step: homing turn, acceleration along heading, position, age,
//! culling. Inactive states are never touched again.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::content::PatternDefinition;
use crate::normalize_angle;

/// Kinematic state of one moving entity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionState {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Where the entity spawned (culling is measured from here)
    pub origin: Vec2,
    /// Seconds since spawn
    pub age: f32,
    pub active: bool,
}

impl MotionState {
    pub fn new(pos: Vec2, vel: Vec2) -> Self {
        Self {
            pos,
            vel,
            origin: pos,
            age: 0.0,
            active: true,
        }
    }

    /// External kill signal (collision, lifetime); permanent
    pub fn deactivate(&mut self) {
        self.active = false;
    }

    pub fn speed(&self) -> f32 {
        self.vel.length()
    }
}

/// Per-bullet integration parameters
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MotionParams {
    /// Signed, along the current heading
    pub acceleration: f32,
    /// Turn-rate bound in degrees per second, if homing
    pub homing_rate: Option<f32>,
    /// Deactivate beyond this distance from origin
    pub culling_radius: Option<f32>,
}

impl MotionParams {
    pub fn from_pattern(pattern: &PatternDefinition, culling_radius: Option<f32>) -> Self {
        Self {
            acceleration: if pattern.acceleration.is_finite() {
                pattern.acceleration
            } else {
                0.0
            },
            homing_rate: pattern.homing_rate(),
            culling_radius,
        }
    }
}

/// Answers "where is the nearest thing worth steering toward?"
///
/// The engine never looks into scene state itself; homing goes through this.
pub trait TargetLocator {
    fn nearest_target(&self, from: Vec2) -> Option<Vec2>;
}

impl TargetLocator for Vec2 {
    fn nearest_target(&self, _from: Vec2) -> Option<Vec2> {
        Some(*self)
    }
}

impl TargetLocator for Option<Vec2> {
    fn nearest_target(&self, _from: Vec2) -> Option<Vec2> {
        *self
    }
}

impl TargetLocator for [Vec2] {
    fn nearest_target(&self, from: Vec2) -> Option<Vec2> {
        self.iter().copied().min_by(|a, b| {
            a.distance_squared(from)
                .partial_cmp(&b.distance_squared(from))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
    }
}

impl TargetLocator for Vec<Vec2> {
    fn nearest_target(&self, from: Vec2) -> Option<Vec2> {
        self.as_slice().nearest_target(from)
    }
}

/// Adapts a closure into a [`TargetLocator`]
pub struct LocateWith<F>(pub F);

impl<F> TargetLocator for LocateWith<F>
where
    F: Fn(Vec2) -> Option<Vec2>,
{
    fn nearest_target(&self, from: Vec2) -> Option<Vec2> {
        (self.0)(from)
    }
}

/// Advance one state by `dt` seconds
pub fn step(
    state: &mut MotionState,
    dt: f32,
    params: &MotionParams,
    targets: Option<&dyn TargetLocator>,
) {
    if !state.active || !dt.is_finite() || dt <= 0.0 {
        return;
    }

    if let (Some(rate), Some(locator)) = (params.homing_rate, targets) {
        if let Some(target) = locator.nearest_target(state.pos) {
            steer_toward(state, target, rate, dt);
        }
    }

    // Acceleration changes speed, never heading; deceleration stops at rest
    if params.acceleration != 0.0 {
        let speed = state.vel.length();
        if speed > 0.0 {
            let new_speed = (speed + params.acceleration * dt).max(0.0);
            state.vel = state.vel / speed * new_speed;
        }
    }

    state.pos += state.vel * dt;
    state.age += dt;

    if let Some(radius) = params.culling_radius {
        if state.pos.distance(state.origin) > radius {
            state.deactivate();
        }
    }
}

/// Rotate velocity toward `target` by at most `rate_deg * dt` degrees, keeping speed
fn steer_toward(state: &mut MotionState, target: Vec2, rate_deg: f32, dt: f32) {
    let to_target = target - state.pos;
    let speed = state.vel.length();
    if speed == 0.0 || to_target == Vec2::ZERO {
        return;
    }

    let heading = state.vel.y.atan2(state.vel.x);
    let desired = to_target.y.atan2(to_target.x);
    let delta = normalize_angle(desired - heading);
    let max_turn = rate_deg.to_radians() * dt;
    let turn = delta.clamp(-max_turn, max_turn);

    state.vel = Vec2::from_angle(heading + turn) * speed;
}
