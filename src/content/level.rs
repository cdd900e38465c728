//! Level timelines: waves, triggers and the enemy templates waves refer to

use glam::Vec2;
use serde::{Deserialize, Deserializer, Serialize};

use super::{TemplateId, WeaponId};

/// Spatial arrangement of the entities in one wave
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum FormationStyle {
    #[default]
    Line,
    V,
    Circle,
    Random,
    Custom,
}

impl FormationStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormationStyle::Line => "Line",
            FormationStyle::V => "V",
            FormationStyle::Circle => "Circle",
            FormationStyle::Random => "Random",
            FormationStyle::Custom => "Custom",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "line" => Some(FormationStyle::Line),
            "v" | "wedge" => Some(FormationStyle::V),
            "circle" | "ring" => Some(FormationStyle::Circle),
            "random" => Some(FormationStyle::Random),
            "custom" | "path" => Some(FormationStyle::Custom),
            _ => None,
        }
    }
}

// Unknown formation names degrade to `Line` instead of rejecting the whole wave.
impl<'de> Deserialize<'de> for FormationStyle {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(FormationStyle::from_str(&name).unwrap_or_else(|| {
            log::warn!("Unknown formation `{}`, using Line", name);
            FormationStyle::Line
        }))
    }
}

/// A timed request to spawn a group of entities of one template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveDefinition {
    pub template: TemplateId,
    /// Seconds from level start
    pub spawn_time: f32,
    pub count: u32,
    pub spacing: f32,
    pub formation: FormationStyle,
    /// Offsets relative to the anchor, used by `Custom`
    pub formation_path: Vec<Vec2>,
    /// Explicit anchor; otherwise resolved from the template
    pub anchor: Option<Vec2>,
    /// Degrees; otherwise the session default
    pub aim: Option<f32>,
}

impl Default for WaveDefinition {
    fn default() -> Self {
        Self {
            template: TemplateId::default(),
            spawn_time: 0.0,
            count: 1,
            spacing: 0.5,
            formation: FormationStyle::Line,
            formation_path: Vec::new(),
            anchor: None,
            aim: None,
        }
    }
}

impl WaveDefinition {
    pub fn new(template: impl Into<TemplateId>, spawn_time: f32, count: u32) -> Self {
        Self {
            template: template.into(),
            spawn_time,
            count,
            ..Self::default()
        }
    }
}

/// Non-spawn timeline event kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerKind {
    CameraShake,
    #[serde(alias = "BGMChange")]
    MusicChange,
    WaveActivate,
    #[serde(alias = "BossWarning")]
    Warning,
    SpeedChange,
}

/// A timed non-spawn event with an opaque parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerEntry {
    #[serde(alias = "trigger_time")]
    pub time: f32,
    pub kind: TriggerKind,
    #[serde(default)]
    pub parameter: String,
}

impl TriggerEntry {
    pub fn new(time: f32, kind: TriggerKind, parameter: impl Into<String>) -> Self {
        Self {
            time,
            kind,
            parameter: parameter.into(),
        }
    }
}

/// One level: duration plus ordered waves and triggers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelTimeline {
    pub name: String,
    /// Seconds
    pub duration: f32,
    pub waves: Vec<WaveDefinition>,
    pub triggers: Vec<TriggerEntry>,
}

impl Default for LevelTimeline {
    fn default() -> Self {
        Self {
            name: "New Level".to_string(),
            duration: 120.0,
            waves: Vec::new(),
            triggers: Vec::new(),
        }
    }
}

impl LevelTimeline {
    pub fn new(name: impl Into<String>, duration: f32) -> Self {
        Self {
            name: name.into(),
            duration,
            ..Self::default()
        }
    }

    pub fn with_wave(mut self, wave: WaveDefinition) -> Self {
        self.waves.push(wave);
        self
    }

    pub fn with_trigger(mut self, trigger: TriggerEntry) -> Self {
        self.triggers.push(trigger);
        self
    }

    /// Duration usable as a traversal bound (non-finite or negative becomes 0)
    pub fn sanitized_duration(&self) -> f32 {
        if self.duration.is_finite() {
            self.duration.max(0.0)
        } else {
            0.0
        }
    }
}

/// Enemy template a wave spawns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyDefinition {
    pub id: TemplateId,
    pub hp: u32,
    pub score_value: u32,
    pub weapon: Option<WeaponId>,
    /// Waypoints; the first one is where the enemy enters
    pub move_path: Vec<Vec2>,
    pub move_speed: f32,
}

impl Default for EnemyDefinition {
    fn default() -> Self {
        Self {
            id: TemplateId::default(),
            hp: 1,
            score_value: 100,
            weapon: None,
            move_path: Vec::new(),
            move_speed: 3.0,
        }
    }
}

impl EnemyDefinition {
    /// Entry point of the move path, if it has one
    pub fn entry_point(&self) -> Option<Vec2> {
        self.move_path.first().copied()
    }
}
