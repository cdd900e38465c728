//! Timed wave and trigger scheduling
//!
//! Each entry is `Pending` until the clock passes its time, then `Fired` until the
//! next reset. A clock advance from `t_prev` to `t_now` fires everything in
//! `(t_prev, t_now]`; the first advance after a reset includes `t = 0`. Traversal
//! never goes past the level's duration, so entries scheduled after it (or before
//! zero, or at a non-finite time) simply never fire.

use serde::{Deserialize, Serialize};

use crate::content::LevelTimeline;

/// Per-entry firing state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EntryState {
    #[default]
    Pending,
    Fired,
}

/// An entry that came due during an advance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheduled {
    /// Index into the timeline's waves
    Wave(usize),
    /// Index into the timeline's triggers
    Trigger(usize),
}

/// Walks one level timeline against a monotonic clock
#[derive(Debug, Clone)]
pub struct WaveScheduler {
    timeline: LevelTimeline,
    wave_states: Vec<EntryState>,
    trigger_states: Vec<EntryState>,
    /// All entries sorted by time; ties keep list order, waves before triggers
    order: Vec<(f32, Scheduled)>,
    clock: f32,
    started: bool,
}

impl WaveScheduler {
    pub fn new(timeline: LevelTimeline) -> Self {
        let mut order: Vec<(f32, Scheduled)> = timeline
            .waves
            .iter()
            .enumerate()
            .map(|(i, wave)| (wave.spawn_time, Scheduled::Wave(i)))
            .chain(
                timeline
                    .triggers
                    .iter()
                    .enumerate()
                    .map(|(i, trigger)| (trigger.time, Scheduled::Trigger(i))),
            )
            .filter(|(time, _)| time.is_finite())
            .collect();
        // Stable sort keeps authoring order for identical times
        order.sort_by(|a, b| a.0.total_cmp(&b.0));

        Self {
            wave_states: vec![EntryState::Pending; timeline.waves.len()],
            trigger_states: vec![EntryState::Pending; timeline.triggers.len()],
            timeline,
            order,
            clock: 0.0,
            started: false,
        }
    }

    pub fn timeline(&self) -> &LevelTimeline {
        &self.timeline
    }

    /// Scheduler's own clock (clamped to the level duration)
    pub fn clock(&self) -> f32 {
        self.clock
    }

    pub fn wave_state(&self, index: usize) -> Option<EntryState> {
        self.wave_states.get(index).copied()
    }

    pub fn trigger_state(&self, index: usize) -> Option<EntryState> {
        self.trigger_states.get(index).copied()
    }

    /// Entries that can still fire in this run
    pub fn pending_count(&self) -> usize {
        self.order
            .iter()
            .filter(|(time, entry)| self.reachable(*time) && !self.is_fired(*entry))
            .count()
    }

    /// Clock reached the end of the level
    pub fn is_finished(&self) -> bool {
        self.started && self.clock >= self.timeline.sanitized_duration()
    }

    /// Advance to `t_now`, appending newly due entries to `out` in firing order
    pub fn advance_to(&mut self, t_now: f32, out: &mut Vec<Scheduled>) {
        if !t_now.is_finite() {
            return;
        }
        let duration = self.timeline.sanitized_duration();
        let t_now = t_now.min(duration);
        let t_prev = self.clock;
        let first = !self.started;

        if t_now < t_prev || (!first && t_now == t_prev) {
            return;
        }

        for &(time, entry) in &self.order {
            if time > t_now {
                break;
            }
            let in_window = if first {
                time >= 0.0
            } else {
                time > t_prev
            };
            if !in_window {
                continue;
            }
            let state = match entry {
                Scheduled::Wave(i) => &mut self.wave_states[i],
                Scheduled::Trigger(i) => &mut self.trigger_states[i],
            };
            if *state == EntryState::Pending {
                *state = EntryState::Fired;
                out.push(entry);
            }
        }

        self.clock = t_now;
        self.started = true;
    }

    /// Every entry back to `Pending`, clock to zero
    pub fn reset(&mut self) {
        self.wave_states.fill(EntryState::Pending);
        self.trigger_states.fill(EntryState::Pending);
        self.clock = 0.0;
        self.started = false;
    }

    fn reachable(&self, time: f32) -> bool {
        time >= 0.0 && time <= self.timeline.sanitized_duration()
    }

    fn is_fired(&self, entry: Scheduled) -> bool {
        match entry {
            Scheduled::Wave(i) => self.wave_states[i] == EntryState::Fired,
            Scheduled::Trigger(i) => self.trigger_states[i] == EntryState::Fired,
        }
    }
}
