//! Authored content definitions
//!
//! These are read-only inputs to the simulation. The authoring layer owns their
//! persistence; this module only knows how to read them from JSON, skipping
//! individual malformed entries instead of rejecting a whole bundle.

pub mod level;
pub mod pattern;

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use level::{
    EnemyDefinition, FormationStyle, LevelTimeline, TriggerEntry, TriggerKind, WaveDefinition,
};
pub use pattern::{PatternDefinition, PatternLibrary, SpreadStyle, WeaponDefinition};

use crate::error::{ConfigError, ContentError};

macro_rules! content_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

content_id!(
    /// Identifies a bullet pattern
    PatternId
);
content_id!(
    /// Identifies an enemy template
    TemplateId
);
content_id!(
    /// Identifies a weapon
    WeaponId
);

/// Everything the simulation needs for one project, as a single document
#[derive(Debug, Clone, Default, Serialize)]
pub struct ContentBundle {
    pub patterns: Vec<PatternDefinition>,
    pub weapons: Vec<WeaponDefinition>,
    pub enemies: Vec<EnemyDefinition>,
    pub level: Option<LevelTimeline>,
}

/// Outer shape of a bundle; entries stay untyped until read one by one
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawBundle {
    patterns: Vec<Value>,
    weapons: Vec<Value>,
    enemies: Vec<Value>,
    level: Option<RawLevel>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct RawLevel {
    name: String,
    duration: f32,
    waves: Vec<Value>,
    triggers: Vec<Value>,
}

impl Default for RawLevel {
    fn default() -> Self {
        let defaults = LevelTimeline::default();
        Self {
            name: defaults.name,
            duration: defaults.duration,
            waves: Vec::new(),
            triggers: Vec::new(),
        }
    }
}

impl ContentBundle {
    /// Parse a bundle, skipping malformed entries
    ///
    /// Fails only when the document itself is unreadable. Each skipped entry is
    /// reported as a [`ConfigError::InvalidEntry`].
    pub fn from_json_str(json: &str) -> Result<(Self, Vec<ConfigError>), ContentError> {
        let raw: RawBundle = serde_json::from_str(json)?;
        let mut diagnostics = Vec::new();

        let patterns = read_entries("pattern", raw.patterns, &mut diagnostics);
        let weapons = read_entries("weapon", raw.weapons, &mut diagnostics);
        let enemies = read_entries("enemy", raw.enemies, &mut diagnostics);
        let level = raw.level.map(|level| LevelTimeline {
            name: level.name,
            duration: level.duration,
            waves: read_entries("wave", level.waves, &mut diagnostics),
            triggers: read_entries("trigger", level.triggers, &mut diagnostics),
        });

        for diagnostic in &diagnostics {
            log::warn!("{}", diagnostic);
        }

        Ok((
            Self {
                patterns,
                weapons,
                enemies,
                level,
            },
            diagnostics,
        ))
    }

    /// Read a bundle from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<(Self, Vec<ConfigError>), ContentError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        log::info!("Loading content from {}", path.as_ref().display());
        Self::from_json_str(&json)
    }

    pub fn library(&self) -> PatternLibrary {
        PatternLibrary::from_patterns(self.patterns.iter().cloned())
    }

    pub fn enemy_index(&self) -> BTreeMap<TemplateId, EnemyDefinition> {
        self.enemies
            .iter()
            .map(|enemy| (enemy.id.clone(), enemy.clone()))
            .collect()
    }

    pub fn weapon(&self, id: &WeaponId) -> Option<&WeaponDefinition> {
        self.weapons.iter().find(|weapon| &weapon.id == id)
    }

    /// Static checks over the whole bundle
    ///
    /// Everything reported here would also be caught (and neutralized) at spawn
    /// or schedule time; this just surfaces it before playback.
    pub fn validate(&self) -> Vec<ConfigError> {
        let library = self.library();
        let mut problems = Vec::new();

        for pattern in library.iter() {
            if pattern.bullet_count == 0 {
                problems.push(ConfigError::EmptyPattern(pattern.id.clone()));
            }
            if let Err(err) = library.validate_chain(&pattern.id) {
                problems.push(err);
            }
        }

        for weapon in &self.weapons {
            for id in &weapon.patterns {
                if library.get(id).is_none() {
                    problems.push(ConfigError::MissingPattern {
                        missing: id.clone(),
                        referenced_by: format!("weapon {}", weapon.id),
                    });
                }
            }
        }

        if let Some(level) = &self.level {
            for (index, wave) in level.waves.iter().enumerate() {
                if wave.count == 0 {
                    problems.push(ConfigError::EmptyWave {
                        index,
                        template: wave.template.to_string(),
                    });
                }
            }
        }

        problems
    }
}

fn read_entries<T: DeserializeOwned>(
    kind: &'static str,
    values: Vec<Value>,
    diagnostics: &mut Vec<ConfigError>,
) -> Vec<T> {
    values
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value(value) {
            Ok(entry) => Some(entry),
            Err(err) => {
                diagnostics.push(ConfigError::InvalidEntry {
                    kind,
                    index,
                    reason: err.to_string(),
                });
                None
            }
        })
        .collect()
}
