//! Shmup Sim - bullet pattern and wave simulation for shoot-em-up content
//!
//! Core modules:
//! - `content`: Authored definitions (patterns, weapons, enemies, levels)
//! - `sim`: Deterministic simulation (spawning, motion, formations, scheduling)
//! - `settings`: Per-session configuration caps and defaults
//! - `error`: Configuration diagnostics and load errors

pub mod content;
pub mod error;
pub mod settings;
pub mod sim;

pub use content::{
    ContentBundle, EnemyDefinition, FormationStyle, LevelTimeline, PatternDefinition, PatternId,
    PatternLibrary, SpreadStyle, TemplateId, TriggerEntry, TriggerKind, WaveDefinition,
    WeaponDefinition,
};
pub use error::{ConfigError, ContentError};
pub use settings::SimSettings;
pub use sim::{Session, SessionEvent};

use glam::Vec2;

/// Simulation constants
pub mod consts {
    /// Nominal preview tick (60 Hz)
    pub const PREVIEW_DT: f32 = 0.016;
    /// Ticks longer than this are treated as a stall (debugger pause, dragged window)
    pub const MAX_DT: f32 = 0.1;

    /// Default live bullet cap per session
    pub const MAX_LIVE_BULLETS: usize = 4096;
    /// Hard bound on sub-pattern nesting, even for acyclic chains
    pub const MAX_SUB_PATTERN_DEPTH: u32 = 8;
    /// Default cap on spawn requests from one wave
    pub const MAX_WAVE_SPAWNS: usize = 256;
    /// Default culling distance from a bullet's spawn origin
    pub const CULLING_RADIUS: f32 = 24.0;

    /// Where waves appear when neither the wave nor its template says otherwise
    pub const DEFAULT_WAVE_ANCHOR: (f32, f32) = (0.0, 6.0);
    /// Waves aim straight down the screen by default (degrees, y up)
    pub const DEFAULT_WAVE_AIM: f32 = -90.0;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    if !angle.is_finite() {
        return 0.0;
    }
    angle %= 2.0 * PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Unit vector for an angle in degrees (0° = +x, counter-clockwise)
#[inline]
pub fn direction_from_degrees(degrees: f32) -> Vec2 {
    polar_to_cartesian(1.0, degrees.to_radians())
}

/// Heading of a vector in degrees, or `None` for a zero vector
#[inline]
pub fn heading_degrees(v: Vec2) -> Option<f32> {
    if v == Vec2::ZERO {
        None
    } else {
        Some(v.y.atan2(v.x).to_degrees())
    }
}
