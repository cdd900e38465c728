//! Deterministic simulation module
//!
//! Everything that moves lives here. This module must stay pure and deterministic:
//! - Time advances only through `Session::step`
//! - Seeded RNG only (one `Pcg32` per session)
//! - Stable iteration order (spawn order, list order for ties)
//! - No rendering or scene dependencies

pub mod emitter;
pub mod formation;
pub mod motion;
pub mod path;
pub mod schedule;
pub mod session;
pub mod spawn;

pub use emitter::WeaponEmitter;
pub use formation::{generate_offsets, generate_offsets_capped};
pub use motion::{LocateWith, MotionParams, MotionState, TargetLocator, step};
pub use path::{evaluate_bezier, evaluate_linear, polyline_length, resample_even};
pub use schedule::{EntryState, Scheduled, WaveScheduler};
pub use session::{Bullet, Session, SessionEvent, SpawnRequest, TriggerEvent};
pub use spawn::{bullet_angles, bullet_angles_capped, spawn};
