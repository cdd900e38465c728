//! Shmup Sim headless runner
//!
//! Loads a content bundle, plays its level back at a fixed tick and logs every
//! spawn request and trigger. Useful for checking authored content without an
//! editor or a game attached.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use glam::Vec2;

use shmup_sim::consts::PREVIEW_DT;
use shmup_sim::content::{ContentBundle, PatternId, WeaponId};
use shmup_sim::sim::{TargetLocator, WeaponEmitter};
use shmup_sim::{Session, SessionEvent, SimSettings};

#[derive(Parser, Debug)]
#[command(about = "Play back a shmup content bundle headlessly", version)]
struct Args {
    /// Content bundle (JSON)
    bundle: PathBuf,
    /// Seconds to simulate (defaults to the level duration)
    #[arg(long)]
    seconds: Option<f32>,
    /// Fixed tick in seconds
    #[arg(long, default_value_t = PREVIEW_DT)]
    dt: f32,
    /// RNG seed (overrides the settings file)
    #[arg(long)]
    seed: Option<u64>,
    /// Simulation settings (JSON)
    #[arg(long)]
    settings: Option<PathBuf>,
    /// Pattern to fire once at the start, from the default wave anchor
    #[arg(long = "fire")]
    patterns: Vec<String>,
    /// Weapon to mount at the default wave anchor
    #[arg(long = "weapon")]
    weapons: Vec<String>,
    /// Homing target as `x,y`
    #[arg(long, value_parser = parse_point)]
    target: Option<Vec2>,
    /// Fail if the bundle has any content problems
    #[arg(long)]
    strict: bool,
}

fn parse_point(s: &str) -> Result<Vec2, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected `x,y`, got `{}`", s))?;
    let x = x.trim().parse::<f32>().map_err(|e| e.to_string())?;
    let y = y.trim().parse::<f32>().map_err(|e| e.to_string())?;
    Ok(Vec2::new(x, y))
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut settings = match &args.settings {
        Some(path) => SimSettings::load(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => SimSettings::default(),
    };
    if let Some(seed) = args.seed {
        settings.seed = seed;
    }

    let (bundle, skipped) = ContentBundle::load(&args.bundle)
        .with_context(|| format!("loading bundle from {}", args.bundle.display()))?;
    let mut problems = skipped;
    problems.extend(bundle.validate());
    for problem in &problems {
        log::warn!("{}", problem);
    }
    if args.strict && !problems.is_empty() {
        bail!("{} content problem(s) in {}", problems.len(), args.bundle.display());
    }

    let mut session = Session::from_bundle(settings, &bundle);
    let anchor = session.settings().default_wave_anchor;
    let aim = session.settings().default_wave_aim;

    for id in &args.weapons {
        let Some(weapon) = bundle.weapon(&WeaponId::from(id.as_str())) else {
            bail!("unknown weapon `{}`", id);
        };
        session.add_emitter(WeaponEmitter::new(weapon.clone(), anchor, aim));
    }
    for id in &args.patterns {
        let spawned = session.fire(&PatternId::from(id.as_str()), anchor, aim);
        log::info!("Fired `{}`: {} bullets", id, spawned);
    }

    let seconds = args
        .seconds
        .or_else(|| bundle.level.as_ref().map(|level| level.sanitized_duration()))
        .unwrap_or(10.0);
    if !args.dt.is_finite() || args.dt <= 0.0 {
        bail!("tick must be positive, got {}", args.dt);
    }
    let ticks = (seconds / args.dt).ceil().max(0.0) as u64;

    let target = args.target;
    let locator = target.as_ref().map(|t| t as &dyn TargetLocator);
    let (mut spawns, mut triggers, mut peak) = (0usize, 0usize, 0usize);

    for _ in 0..ticks {
        session.step(args.dt, locator);
        for event in session.events() {
            match event {
                SessionEvent::Spawn(request) => {
                    spawns += 1;
                    log::info!(
                        "t={:.3} spawn {} (wave {}) at ({:.2}, {:.2}) aim {:.1}",
                        session.clock(),
                        request.template,
                        request.wave,
                        request.position.x,
                        request.position.y,
                        request.aim
                    );
                }
                SessionEvent::Trigger(trigger) => {
                    triggers += 1;
                    log::info!(
                        "t={:.3} trigger {:?} \"{}\"",
                        session.clock(),
                        trigger.kind,
                        trigger.parameter
                    );
                }
            }
        }
        peak = peak.max(session.live_count());
    }

    println!(
        "Simulated {:.2}s in {} ticks: {} spawns, {} triggers, {} live bullets (peak {}), {} dropped",
        session.clock(),
        ticks,
        spawns,
        triggers,
        session.live_count(),
        peak,
        session.dropped_spawns()
    );
    for diagnostic in session.diagnostics() {
        println!("  problem: {}", diagnostic);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_point() {
        assert_eq!(parse_point("1.5, -2"), Ok(Vec2::new(1.5, -2.0)));
        assert!(parse_point("3").is_err());
        assert!(parse_point("a,b").is_err());
    }

    #[test]
    fn test_args_parse() {
        let args = Args::try_parse_from([
            "shmup-sim",
            "level.json",
            "--seed",
            "7",
            "--fire",
            "ring",
            "--target",
            "0,-4",
        ])
        .unwrap();
        assert_eq!(args.seed, Some(7));
        assert_eq!(args.patterns, vec!["ring".to_string()]);
        assert_eq!(args.target, Some(Vec2::new(0.0, -4.0)));
        assert_eq!(args.dt, PREVIEW_DT);
    }
}
