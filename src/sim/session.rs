//! Simulation session: owns all live state for one preview or playback run
//!
//! One external driver calls [`Session::step`] once per tick. Per step:
//! 1. Clamp `dt` (stalls collapse to the fallback tick)
//! 2. Drop bullets that went inactive on the previous step
//! 3. Advance the clock and integrate live bullets
//! 4. Fire due waves and triggers, then weapon emitters
//! 5. Fire due sub-patterns (including ones spawned this step with no delay)

use std::collections::BTreeMap;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::emitter::WeaponEmitter;
use super::formation::generate_offsets_capped;
use super::motion::{self, MotionParams, MotionState, TargetLocator};
use super::schedule::{Scheduled, WaveScheduler};
use super::spawn;
use crate::content::{
    ContentBundle, EnemyDefinition, LevelTimeline, PatternDefinition, PatternId, PatternLibrary,
    TemplateId, TriggerKind,
};
use crate::error::ConfigError;
use crate::heading_degrees;
use crate::settings::SimSettings;

/// A live bullet
#[derive(Debug, Clone)]
pub struct Bullet {
    pub id: u32,
    pub pattern: PatternId,
    /// Cosmetic, copied from the pattern
    pub size: f32,
    /// Sub-pattern nesting level (0 for a directly fired pattern)
    pub depth: u32,
    /// Angle the bullet was fired at (degrees)
    pub aim: f32,
    pub state: MotionState,
    params: MotionParams,
    /// Follow-up pattern and its delay, until it fires
    sub_pattern: Option<(PatternId, f32)>,
}

impl Bullet {
    /// Whether this bullet still owes a sub-pattern spawn
    pub fn has_pending_sub_pattern(&self) -> bool {
        self.sub_pattern.is_some()
    }
}

/// Request for the playback layer to spawn one wave entity
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnRequest {
    /// Index of the wave in the level timeline
    pub wave: usize,
    pub template: TemplateId,
    pub position: Vec2,
    /// Degrees
    pub aim: f32,
}

/// A trigger that came due
#[derive(Debug, Clone, PartialEq)]
pub struct TriggerEvent {
    /// Index of the trigger in the level timeline
    pub index: usize,
    pub kind: TriggerKind,
    pub parameter: String,
    /// Scheduled time of the trigger
    pub time: f32,
}

/// Everything a step emits for external systems, each exactly once
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Spawn(SpawnRequest),
    Trigger(TriggerEvent),
}

/// Owner of the clock, the live bullet list and the level schedule
#[derive(Debug)]
pub struct Session {
    settings: SimSettings,
    library: PatternLibrary,
    enemies: BTreeMap<TemplateId, EnemyDefinition>,
    rng: Pcg32,
    clock: f32,
    bullets: Vec<Bullet>,
    /// Active entries in `bullets`
    live: usize,
    next_id: u32,
    scheduler: Option<WaveScheduler>,
    emitters: Vec<WeaponEmitter>,
    events: Vec<SessionEvent>,
    diagnostics: Vec<ConfigError>,
    dropped_spawns: u64,
}

impl Session {
    pub fn new(settings: SimSettings, library: PatternLibrary) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(settings.seed),
            settings,
            library,
            enemies: BTreeMap::new(),
            clock: 0.0,
            bullets: Vec::new(),
            live: 0,
            next_id: 1,
            scheduler: None,
            emitters: Vec::new(),
            events: Vec::new(),
            diagnostics: Vec::new(),
            dropped_spawns: 0,
        }
    }

    /// Session over a loaded bundle, with its level (if any) ready to play
    pub fn from_bundle(settings: SimSettings, bundle: &ContentBundle) -> Self {
        let mut session = Self::new(settings, bundle.library());
        if let Some(level) = &bundle.level {
            session.load_level(level.clone(), bundle.enemy_index().into_values());
        }
        session
    }

    /// Install a level timeline and the templates its waves refer to
    pub fn load_level(
        &mut self,
        timeline: LevelTimeline,
        enemies: impl IntoIterator<Item = EnemyDefinition>,
    ) {
        log::info!(
            "Level \"{}\": {} waves, {} triggers, {}s",
            timeline.name,
            timeline.waves.len(),
            timeline.triggers.len(),
            timeline.duration
        );
        self.enemies = enemies
            .into_iter()
            .map(|enemy| (enemy.id.clone(), enemy))
            .collect();
        self.scheduler = Some(WaveScheduler::new(timeline));
    }

    pub fn settings(&self) -> &SimSettings {
        &self.settings
    }

    pub fn library(&self) -> &PatternLibrary {
        &self.library
    }

    /// Seconds of simulated time since start or last reset
    pub fn clock(&self) -> f32 {
        self.clock
    }

    /// Live bullets, including those that deactivated on the latest step
    pub fn bullets(&self) -> &[Bullet] {
        &self.bullets
    }

    pub fn live_count(&self) -> usize {
        self.live
    }

    /// Events emitted by the latest step
    pub fn events(&self) -> &[SessionEvent] {
        &self.events
    }

    /// Configuration problems seen so far (each reported once)
    pub fn diagnostics(&self) -> &[ConfigError] {
        &self.diagnostics
    }

    /// Spawns dropped because the live-bullet cap was reached
    pub fn dropped_spawns(&self) -> u64 {
        self.dropped_spawns
    }

    pub fn scheduler(&self) -> Option<&WaveScheduler> {
        self.scheduler.as_ref()
    }

    /// Mount a weapon emitter; returns its index
    pub fn add_emitter(&mut self, emitter: WeaponEmitter) -> usize {
        self.emitters.push(emitter);
        self.emitters.len() - 1
    }

    pub fn emitter_mut(&mut self, index: usize) -> Option<&mut WeaponEmitter> {
        self.emitters.get_mut(index)
    }

    /// Fire a library pattern; returns how many bullets were spawned
    ///
    /// A pattern whose sub-pattern chain is cyclic or dangling fires nothing and
    /// is reported as a diagnostic.
    pub fn fire(&mut self, id: &PatternId, origin: Vec2, aim: f32) -> usize {
        if let Err(err) = self.library.validate_chain(id) {
            self.report(err);
            return 0;
        }
        let spawned = match self.library.get(id).cloned() {
            Some(pattern) => self.emit(&pattern, origin, aim, 0),
            None => 0,
        };
        // Zero-delay follow-ups belong to the same instant as their parents
        self.run_sub_patterns();
        spawned
    }

    /// Fire a pattern that need not be in the library (e.g. one being edited)
    ///
    /// Its sub-pattern, if any, is still resolved through the library.
    pub fn spawn_pattern(&mut self, pattern: &PatternDefinition, origin: Vec2, aim: f32) -> usize {
        if let Some(sub) = &pattern.sub_pattern {
            if let Err(err) = self.check_sub_chain(&pattern.id, sub) {
                self.report(err);
                return 0;
            }
        }
        let spawned = self.emit(pattern, origin, aim, 0);
        self.run_sub_patterns();
        spawned
    }

    /// External kill signal (collision, lifetime) for one bullet
    pub fn kill(&mut self, id: u32) -> bool {
        match self.bullets.iter_mut().find(|b| b.id == id && b.state.active) {
            Some(bullet) => {
                bullet.state.deactivate();
                self.live -= 1;
                true
            }
            None => false,
        }
    }

    /// Advance the simulation by one external tick
    pub fn step(&mut self, dt: f32, targets: Option<&dyn TargetLocator>) {
        let dt = self.settings.clamp_dt(dt);

        self.events.clear();
        self.bullets.retain(|b| b.state.active);

        self.clock += dt;
        let mut live = 0;
        for bullet in &mut self.bullets {
            motion::step(&mut bullet.state, dt, &bullet.params, targets);
            live += usize::from(bullet.state.active);
        }
        self.live = live;

        self.run_schedule();
        self.run_emitters(dt);
        self.run_sub_patterns();
    }

    /// Restart: empty field, every entry pending, clock and RNG back to the start
    pub fn reset(&mut self) {
        self.bullets.clear();
        self.live = 0;
        self.events.clear();
        self.clock = 0.0;
        self.next_id = 1;
        self.dropped_spawns = 0;
        self.rng = Pcg32::seed_from_u64(self.settings.seed);
        if let Some(scheduler) = &mut self.scheduler {
            scheduler.reset();
        }
        for emitter in &mut self.emitters {
            emitter.reset();
        }
        log::debug!("Session reset (seed {})", self.settings.seed);
    }

    fn run_schedule(&mut self) {
        // Out of `self` while firing, so the timeline can be read without a copy
        let Some(mut scheduler) = self.scheduler.take() else {
            return;
        };
        let mut due = Vec::new();
        scheduler.advance_to(self.clock, &mut due);

        let timeline = scheduler.timeline();
        for entry in due {
            match entry {
                Scheduled::Wave(index) => self.fire_wave(timeline, index),
                Scheduled::Trigger(index) => {
                    let trigger = &timeline.triggers[index];
                    log::debug!(
                        "t={:.2} trigger {:?} ({})",
                        self.clock,
                        trigger.kind,
                        trigger.parameter
                    );
                    self.events.push(SessionEvent::Trigger(TriggerEvent {
                        index,
                        kind: trigger.kind,
                        parameter: trigger.parameter.clone(),
                        time: trigger.time,
                    }));
                }
            }
        }
        self.scheduler = Some(scheduler);
    }

    fn fire_wave(&mut self, timeline: &LevelTimeline, index: usize) {
        let wave = &timeline.waves[index];
        if wave.count == 0 {
            self.report(ConfigError::EmptyWave {
                index,
                template: wave.template.to_string(),
            });
            return;
        }

        let anchor = wave
            .anchor
            .or_else(|| self.enemies.get(&wave.template).and_then(|e| e.entry_point()))
            .unwrap_or(self.settings.default_wave_anchor);
        let aim = wave
            .aim
            .filter(|aim| aim.is_finite())
            .unwrap_or(self.settings.default_wave_aim);
        let limit = self.settings.max_wave_spawns;
        if wave.count as usize > limit {
            self.report(ConfigError::WaveTruncated {
                index,
                template: wave.template.to_string(),
                count: wave.count,
                limit,
            });
        }
        let offsets = generate_offsets_capped(
            wave.count,
            wave.spacing,
            wave.formation,
            &wave.formation_path,
            limit,
            &mut self.rng,
        );

        log::debug!(
            "t={:.2} wave {}: {} x{} ({})",
            self.clock,
            index,
            wave.template,
            offsets.len(),
            wave.formation.as_str()
        );
        for offset in offsets {
            self.events.push(SessionEvent::Spawn(SpawnRequest {
                wave: index,
                template: wave.template.clone(),
                position: anchor + offset,
                aim,
            }));
        }
    }

    fn run_emitters(&mut self, dt: f32) {
        for index in 0..self.emitters.len() {
            let shots = self.emitters[index].update(dt);
            if shots == 0 {
                continue;
            }
            let emitter = &self.emitters[index];
            let (origin, aim) = (emitter.origin, emitter.aim);
            let patterns = emitter.weapon().patterns.clone();
            for _ in 0..shots {
                for id in &patterns {
                    self.fire(id, origin, aim);
                }
            }
        }
    }

    /// Fire every due follow-up; children appended here are checked too
    fn run_sub_patterns(&mut self) {
        let mut index = 0;
        while index < self.bullets.len() {
            let bullet = &mut self.bullets[index];
            index += 1;

            let due = bullet.state.active
                && matches!(&bullet.sub_pattern, Some((_, delay)) if bullet.state.age >= *delay);
            if !due {
                continue;
            }
            let Some((sub_id, _)) = bullet.sub_pattern.take() else {
                continue;
            };
            let origin = bullet.state.pos;
            let aim = heading_degrees(bullet.state.vel).unwrap_or(bullet.aim);
            let depth = bullet.depth + 1;

            if depth > self.settings.max_sub_pattern_depth {
                self.report(ConfigError::SubPatternTooDeep {
                    pattern: sub_id,
                    depth,
                    limit: self.settings.max_sub_pattern_depth,
                });
                continue;
            }
            if let Some(pattern) = self.library.get(&sub_id).cloned() {
                self.emit(&pattern, origin, aim, depth);
            }
        }
    }

    /// Spawn one pattern's bullets into the live list, respecting the cap
    ///
    /// Only bullets that fit under the cap are built; the rest are counted as
    /// dropped without being generated.
    fn emit(&mut self, pattern: &PatternDefinition, origin: Vec2, aim: f32, depth: u32) -> usize {
        if pattern.bullet_count == 0 {
            self.report(ConfigError::EmptyPattern(pattern.id.clone()));
            return 0;
        }

        let room = self.settings.max_live_bullets.saturating_sub(self.live);
        let angles = spawn::bullet_angles_capped(pattern, aim, room, &mut self.rng);
        let dropped = pattern.bullet_count as usize - angles.len();
        self.dropped_spawns += dropped as u64;
        if angles.is_empty() {
            return 0;
        }

        let params = MotionParams::from_pattern(pattern, self.settings.culling_radius);
        let sub_pattern = pattern
            .sub_pattern
            .clone()
            .map(|id| (id, pattern.sanitized_sub_delay()));
        let states = spawn::spawn_at_angles(pattern, origin, &angles);

        let spawned = states.len();
        self.bullets.reserve(spawned);
        for (state, angle) in states.into_iter().zip(angles) {
            let id = self.next_id;
            self.next_id = self.next_id.wrapping_add(1);
            self.bullets.push(Bullet {
                id,
                pattern: pattern.id.clone(),
                size: pattern.size,
                depth,
                aim: angle,
                state,
                params,
                sub_pattern: sub_pattern.clone(),
            });
        }
        self.live += spawned;
        spawned
    }

    /// Chain from `sub` must be valid and must not lead back to `root`
    fn check_sub_chain(&self, root: &PatternId, sub: &PatternId) -> Result<(), ConfigError> {
        let mut current = sub;
        let mut referenced_by = root;
        for _ in 0..=self.library.len() {
            if current == root {
                return Err(ConfigError::SubPatternCycle {
                    pattern: root.clone(),
                    repeated: root.clone(),
                });
            }
            let Some(pattern) = self.library.get(current) else {
                return Err(ConfigError::MissingPattern {
                    missing: current.clone(),
                    referenced_by: referenced_by.to_string(),
                });
            };
            match &pattern.sub_pattern {
                Some(next) => {
                    referenced_by = current;
                    current = next;
                }
                None => return Ok(()),
            }
        }
        // Longer than the library: the chain loops without passing through `root`
        self.library.validate_chain(sub)
    }

    fn report(&mut self, err: ConfigError) {
        if !self.diagnostics.contains(&err) {
            log::warn!("{}", err);
            self.diagnostics.push(err);
        }
    }
}
