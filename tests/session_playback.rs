use glam::Vec2;

use shmup_sim::content::{
    ContentBundle, EnemyDefinition, FormationStyle, LevelTimeline, PatternDefinition,
    PatternLibrary, SpreadStyle, TriggerEntry, TriggerKind, WaveDefinition,
};
use shmup_sim::sim::{Session, SessionEvent, SpawnRequest, TargetLocator, TriggerEvent};
use shmup_sim::{ConfigError, SimSettings};

fn settings(max_dt: f32) -> SimSettings {
    SimSettings {
        max_dt,
        ..SimSettings::with_seed(0x5eed)
    }
}

fn level() -> LevelTimeline {
    LevelTimeline::new("test", 30.0)
        .with_wave(WaveDefinition::new("drone", 5.0, 3))
        .with_trigger(TriggerEntry::new(5.0, TriggerKind::CameraShake, "0.3"))
        .with_trigger(TriggerEntry::new(8.0, TriggerKind::Warning, "boss"))
}

fn run(session: &mut Session, steps: &[f32]) -> Vec<SessionEvent> {
    let mut events = Vec::new();
    for &dt in steps {
        session.step(dt, None);
        events.extend_from_slice(session.events());
    }
    events
}

fn wave_spawns(events: &[SessionEvent]) -> Vec<&SpawnRequest> {
    events
        .iter()
        .filter_map(|event| match event {
            SessionEvent::Spawn(request) => Some(request),
            SessionEvent::Trigger(_) => None,
        })
        .collect()
}

#[test]
fn wave_fires_once_regardless_of_step_partition() {
    let mut split = Session::new(settings(10.0), PatternLibrary::new());
    split.load_level(level(), []);
    let split_events = run(&mut split, &[3.0, 3.0]);

    let mut single = Session::new(settings(10.0), PatternLibrary::new());
    single.load_level(level(), []);
    let single_events = run(&mut single, &[6.0]);

    assert_eq!(wave_spawns(&split_events).len(), 3);
    assert_eq!(split_events, single_events);

    // Nothing re-fires once the clock is past t=5
    let later = run(&mut single, &[1.0, 1.0, 1.0]);
    assert!(wave_spawns(&later).is_empty());
    assert_eq!(
        later,
        vec![SessionEvent::Trigger(TriggerEvent {
            index: 1,
            kind: TriggerKind::Warning,
            parameter: "boss".to_string(),
            time: 8.0,
        })]
    );
}

#[test]
fn reset_allows_a_fresh_run() {
    let mut session = Session::new(settings(10.0), PatternLibrary::new());
    session.load_level(level(), []);
    let first = run(&mut session, &[6.0]);

    session.reset();
    assert_eq!(session.clock(), 0.0);
    assert!(session.bullets().is_empty());
    assert!(session.events().is_empty());

    let second = run(&mut session, &[6.0]);
    assert_eq!(first, second);
}

#[test]
fn wave_anchor_resolution_order() {
    let timeline = LevelTimeline::new("anchors", 10.0)
        .with_wave(WaveDefinition {
            anchor: Some(Vec2::new(1.0, 1.0)),
            aim: Some(180.0),
            ..WaveDefinition::new("drone", 0.0, 1)
        })
        .with_wave(WaveDefinition::new("drone", 0.0, 1))
        .with_wave(WaveDefinition::new("unknown", 0.0, 1));
    let drone = EnemyDefinition {
        id: "drone".into(),
        move_path: vec![Vec2::new(0.0, 5.0), Vec2::new(0.0, -5.0)],
        ..EnemyDefinition::default()
    };

    let mut session = Session::new(SimSettings::default(), PatternLibrary::new());
    session.load_level(timeline, [drone]);
    session.step(0.016, None);

    let spawns = wave_spawns(session.events());
    let positions: Vec<Vec2> = spawns.iter().map(|s| s.position).collect();
    assert_eq!(
        positions,
        vec![Vec2::new(1.0, 1.0), Vec2::new(0.0, 5.0), Vec2::new(0.0, 6.0)]
    );
    assert_eq!(spawns[0].aim, 180.0);
    assert_eq!(spawns[1].aim, -90.0);
}

#[test]
fn formation_offsets_are_applied_around_anchor() {
    let timeline = LevelTimeline::new("line", 10.0).with_wave(WaveDefinition {
        anchor: Some(Vec2::new(0.0, 4.0)),
        spacing: 1.0,
        formation: FormationStyle::Line,
        ..WaveDefinition::new("drone", 1.0, 3)
    });
    let mut session = Session::new(settings(10.0), PatternLibrary::new());
    session.load_level(timeline, []);
    session.step(1.0, None);

    let positions: Vec<Vec2> = wave_spawns(session.events())
        .iter()
        .map(|s| s.position)
        .collect();
    assert_eq!(
        positions,
        vec![Vec2::new(-1.0, 4.0), Vec2::new(0.0, 4.0), Vec2::new(1.0, 4.0)]
    );
}

#[test]
fn empty_wave_is_reported_and_skipped() {
    let timeline =
        LevelTimeline::new("empty", 10.0).with_wave(WaveDefinition::new("drone", 0.0, 0));
    let mut session = Session::new(SimSettings::default(), PatternLibrary::new());
    session.load_level(timeline, []);
    session.step(0.016, None);

    assert!(session.events().is_empty());
    assert_eq!(
        session.diagnostics(),
        &[ConfigError::EmptyWave {
            index: 0,
            template: "drone".to_string(),
        }]
    );
}

#[test]
fn random_patterns_replay_identically_after_reset() {
    let spray = PatternDefinition {
        spread: SpreadStyle::Random,
        bullet_count: 16,
        spread_angle: 90.0,
        ..PatternDefinition::new("spray")
    };
    let mut session = Session::new(
        SimSettings::with_seed(99),
        PatternLibrary::from_patterns([spray]),
    );

    let snapshot = |session: &mut Session| {
        session.fire(&"spray".into(), Vec2::ZERO, -90.0);
        for _ in 0..30 {
            session.step(1.0 / 60.0, None);
        }
        session
            .bullets()
            .iter()
            .map(|b| (b.id, b.state.pos, b.state.vel))
            .collect::<Vec<_>>()
    };

    let first = snapshot(&mut session);
    session.reset();
    let second = snapshot(&mut session);
    assert_eq!(first.len(), 16);
    assert_eq!(first, second);
}

#[test]
fn homing_bullets_turn_toward_locator() {
    let seeker = PatternDefinition {
        spread: SpreadStyle::Fan,
        bullet_count: 1,
        speed: 4.0,
        homing: true,
        homing_strength: 90.0,
        ..PatternDefinition::new("seeker")
    };
    let mut session = Session::new(
        SimSettings {
            culling_radius: None,
            ..SimSettings::default()
        },
        PatternLibrary::from_patterns([seeker]),
    );
    session.fire(&"seeker".into(), Vec2::ZERO, 0.0);

    let player: &dyn TargetLocator = &Vec2::new(0.0, -20.0);
    for _ in 0..10 {
        session.step(0.1, Some(player));
    }
    let vel = session.bullets()[0].state.vel;
    let heading = vel.y.atan2(vel.x).to_degrees();
    // 90°/s for one second, turning clockwise toward the target below
    assert!((heading + 90.0).abs() < 1.0, "heading was {heading}");
    assert!((vel.length() - 4.0).abs() < 1e-3);
}

#[test]
fn bullets_past_culling_radius_are_removed() {
    let fast = PatternDefinition {
        spread: SpreadStyle::Circle,
        bullet_count: 4,
        speed: 10.0,
        ..PatternDefinition::new("fast")
    };
    let mut session = Session::new(
        SimSettings {
            culling_radius: Some(5.0),
            ..SimSettings::default()
        },
        PatternLibrary::from_patterns([fast]),
    );
    session.fire(&"fast".into(), Vec2::new(2.0, 2.0), 0.0);

    for _ in 0..6 {
        session.step(0.1, None);
    }
    assert_eq!(session.live_count(), 0);
    assert_eq!(session.bullets().len(), 4);
    session.step(0.1, None);
    assert!(session.bullets().is_empty());
}

#[test]
fn bundle_plays_back_end_to_end() {
    let json = r#"{
        "patterns": [
            { "id": "aimed", "spread": "Fan", "bullet_count": 3, "spread_angle": 20.0 },
            { "id": "burst", "spread": "Circle", "bullet_count": 6, "sub_pattern": "aimed", "sub_pattern_delay": 0.25 }
        ],
        "enemies": [ { "id": "popcorn", "move_path": [[-2.0, 6.0], [2.0, -6.0]] } ],
        "level": {
            "name": "Stage 1",
            "duration": 5.0,
            "waves": [ { "template": "popcorn", "spawn_time": 0.5, "count": 5, "formation": "V", "spacing": 0.75 } ],
            "triggers": [ { "time": 4.0, "kind": "BGMChange", "parameter": "boss_theme" } ]
        }
    }"#;
    let (bundle, diagnostics) = ContentBundle::from_json_str(json).unwrap();
    assert!(diagnostics.is_empty());
    assert!(bundle.validate().is_empty());

    let mut session = Session::from_bundle(SimSettings::with_seed(1), &bundle);
    session.fire(&"burst".into(), Vec2::ZERO, -90.0);

    let mut events = Vec::new();
    for _ in 0..400 {
        session.step(1.0 / 60.0, None);
        events.extend_from_slice(session.events());
    }

    let spawns = wave_spawns(&events);
    assert_eq!(spawns.len(), 5);
    assert_eq!(spawns[0].position, Vec2::new(-2.0, 6.0));
    assert!(events.iter().any(|e| matches!(
        e,
        SessionEvent::Trigger(t) if t.kind == TriggerKind::MusicChange && t.parameter == "boss_theme"
    )));
    assert!(session.scheduler().unwrap().is_finished());
    assert!(session.diagnostics().is_empty());
}
