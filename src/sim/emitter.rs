//! Weapon emitters: fire a weapon's patterns on its cadence
//!
//! An emitter fires on its first update and then once per full fire interval of
//! accumulated clock time. The actual spawning goes through the session, so
//! emitter shots obey the same cycle checks and live-bullet cap as any other.

use glam::Vec2;

use crate::content::WeaponDefinition;

/// Upper bound on shots resolved in one update (tiny intervals on a long tick)
const MAX_SHOTS_PER_UPDATE: u32 = 64;

/// A weapon mounted at a position, firing toward an aim angle
#[derive(Debug, Clone)]
pub struct WeaponEmitter {
    weapon: WeaponDefinition,
    pub origin: Vec2,
    /// Degrees
    pub aim: f32,
    pub enabled: bool,
    cooldown: f32,
    spent: bool,
}

impl WeaponEmitter {
    pub fn new(weapon: WeaponDefinition, origin: Vec2, aim: f32) -> Self {
        Self {
            weapon,
            origin,
            aim,
            enabled: true,
            cooldown: 0.0,
            spent: false,
        }
    }

    pub fn weapon(&self) -> &WeaponDefinition {
        &self.weapon
    }

    /// Shots due after `dt` more seconds
    pub fn update(&mut self, dt: f32) -> u32 {
        if !self.enabled || self.spent {
            return 0;
        }

        let interval = self.weapon.fire_interval;
        if !interval.is_finite() || interval <= 0.0 {
            // No cadence: a single volley
            self.spent = true;
            return 1;
        }

        self.cooldown -= dt.max(0.0);
        let mut shots = 0;
        while self.cooldown <= 0.0 && shots < MAX_SHOTS_PER_UPDATE {
            self.cooldown += interval;
            shots += 1;
        }
        if self.cooldown <= 0.0 {
            // Dropped the backlog past the cap
            self.cooldown = interval;
        }
        shots
    }

    /// Back to the freshly mounted state
    pub fn reset(&mut self) {
        self.cooldown = 0.0;
        self.spent = false;
    }
}
