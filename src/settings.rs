//! Session settings
//!
//! Caps and defaults a caller hands to a [`crate::Session`]. Nothing here is
//! global; two sessions with different settings never see each other.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ContentError;

/// Per-session configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimSettings {
    /// Run seed for reproducibility
    pub seed: u64,

    // === Tick handling ===
    /// Ticks longer than this are collapsed to `fallback_dt`
    pub max_dt: f32,
    /// Tick used in place of a stalled one
    pub fallback_dt: f32,

    // === Resource caps ===
    /// Spawns past this many live bullets are dropped
    pub max_live_bullets: usize,
    /// Sub-pattern nesting bound (safety net on top of cycle detection)
    pub max_sub_pattern_depth: u32,
    /// Spawn requests a single wave may emit; the rest of the wave is dropped
    pub max_wave_spawns: usize,

    // === Motion ===
    /// Bullets farther than this from their spawn origin deactivate (None = never)
    pub culling_radius: Option<f32>,

    // === Waves ===
    /// Anchor for waves whose template has no move path
    pub default_wave_anchor: Vec2,
    /// Aim (degrees) for waves that do not set one
    pub default_wave_aim: f32,
}

impl Default for SimSettings {
    fn default() -> Self {
        Self {
            seed: 0,

            max_dt: MAX_DT,
            fallback_dt: PREVIEW_DT,

            max_live_bullets: MAX_LIVE_BULLETS,
            max_sub_pattern_depth: MAX_SUB_PATTERN_DEPTH,
            max_wave_spawns: MAX_WAVE_SPAWNS,

            culling_radius: Some(CULLING_RADIUS),

            default_wave_anchor: Vec2::new(DEFAULT_WAVE_ANCHOR.0, DEFAULT_WAVE_ANCHOR.1),
            default_wave_aim: DEFAULT_WAVE_AIM,
        }
    }
}

impl SimSettings {
    /// Default settings with the given seed
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    /// Collapse a stalled or invalid tick into something safe to integrate
    pub fn clamp_dt(&self, dt: f32) -> f32 {
        if !dt.is_finite() || dt <= 0.0 {
            0.0
        } else if dt > self.max_dt {
            self.fallback_dt
        } else {
            dt
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, ContentError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load settings from a JSON file; missing fields keep their defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ContentError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let settings = Self::from_json_str(&json)?;
        log::info!("Loaded settings from {}", path.as_ref().display());
        Ok(settings)
    }
}
