//! Bullet patterns, weapons and the pattern library

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::{PatternId, WeaponId};
use crate::error::ConfigError;

/// Angular distribution rule used when a pattern fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SpreadStyle {
    /// Evenly across the spread angle, centered on the aim
    #[default]
    Fan,
    /// Evenly around the full circle
    Circle,
    /// Every bullet on the aim line
    Line,
    /// Uniformly random inside the spread angle
    Random,
}

/// Declarative description of one firing event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternDefinition {
    pub id: PatternId,
    pub spread: SpreadStyle,
    pub bullet_count: u32,
    /// Degrees, meaningful in [0, 360]
    pub spread_angle: f32,
    /// Degrees, added to the aim angle
    pub angle_offset: f32,
    pub speed: f32,
    /// Signed, applied along the current heading
    pub acceleration: f32,
    /// Cosmetic only; handed to the renderer untouched
    pub size: f32,
    pub homing: bool,
    /// Maximum turn rate in degrees per second
    pub homing_strength: f32,
    pub sub_pattern: Option<PatternId>,
    /// Seconds after each parent bullet is created
    pub sub_pattern_delay: f32,
}

impl Default for PatternDefinition {
    fn default() -> Self {
        Self {
            id: PatternId::default(),
            spread: SpreadStyle::Fan,
            bullet_count: 3,
            spread_angle: 30.0,
            angle_offset: 0.0,
            speed: 5.0,
            acceleration: 0.0,
            size: 1.0,
            homing: false,
            homing_strength: 1.0,
            sub_pattern: None,
            sub_pattern_delay: 0.0,
        }
    }
}

impl PatternDefinition {
    /// Default pattern with the given id
    pub fn new(id: impl Into<PatternId>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Spread angle clamped to [0, 360], non-finite treated as 0
    pub fn sanitized_spread(&self) -> f32 {
        if self.spread_angle.is_finite() {
            self.spread_angle.clamp(0.0, 360.0)
        } else {
            0.0
        }
    }

    /// Sub-pattern delay, never negative
    pub fn sanitized_sub_delay(&self) -> f32 {
        if self.sub_pattern_delay.is_finite() {
            self.sub_pattern_delay.max(0.0)
        } else {
            0.0
        }
    }

    /// Turn-rate bound if homing is enabled
    pub fn homing_rate(&self) -> Option<f32> {
        (self.homing && self.homing_strength.is_finite() && self.homing_strength > 0.0)
            .then_some(self.homing_strength)
    }
}

/// A weapon fires all of its patterns together, once per fire interval
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponDefinition {
    pub id: WeaponId,
    /// Seconds between shots
    #[serde(alias = "fire_rate")]
    pub fire_interval: f32,
    pub patterns: Vec<PatternId>,
}

impl Default for WeaponDefinition {
    fn default() -> Self {
        Self {
            id: WeaponId::default(),
            fire_interval: 0.2,
            patterns: Vec::new(),
        }
    }
}

/// Patterns addressable by id (ordered for deterministic iteration)
#[derive(Debug, Clone, Default)]
pub struct PatternLibrary {
    patterns: BTreeMap<PatternId, PatternDefinition>,
}

impl PatternLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a library; a repeated id replaces the earlier definition
    pub fn from_patterns(patterns: impl IntoIterator<Item = PatternDefinition>) -> Self {
        let mut library = Self::new();
        for pattern in patterns {
            library.insert(pattern);
        }
        library
    }

    /// Add or replace a pattern
    pub fn insert(&mut self, pattern: PatternDefinition) {
        if let Some(previous) = self.patterns.insert(pattern.id.clone(), pattern) {
            log::warn!("Pattern `{}` defined twice, keeping the later one", previous.id);
        }
    }

    pub fn get(&self, id: &PatternId) -> Option<&PatternDefinition> {
        self.patterns.get(id)
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PatternDefinition> {
        self.patterns.values()
    }

    /// Walk the sub-pattern chain starting at `root`
    ///
    /// Fails on a dangling reference or when a pattern is reached twice, which
    /// would otherwise spawn forever.
    pub fn validate_chain(&self, root: &PatternId) -> Result<(), ConfigError> {
        let mut visited: BTreeSet<&PatternId> = BTreeSet::new();
        let mut current = root;
        let mut referenced_by = String::from("caller");

        loop {
            let Some(pattern) = self.patterns.get(current) else {
                return Err(ConfigError::MissingPattern {
                    missing: current.clone(),
                    referenced_by,
                });
            };
            if !visited.insert(current) {
                return Err(ConfigError::SubPatternCycle {
                    pattern: root.clone(),
                    repeated: current.clone(),
                });
            }
            match &pattern.sub_pattern {
                Some(next) => {
                    referenced_by = pattern.id.to_string();
                    current = next;
                }
                None => return Ok(()),
            }
        }
    }
}
