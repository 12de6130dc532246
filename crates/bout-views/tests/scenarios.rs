//! End-to-end bout scenarios through `Game`

use bout_core::{Payload, Tick};
use bout_views::{
    kind, BoutEvent, BoxTrips, Error, Game, JamClock, LastUndoable, LineupClock, Penalties,
    PeriodClock, Ruleset, Stage, Team, TeamTimeouts, Timeline, TimeoutKind,
};

fn jam_ends(game: &Game) -> Vec<Tick> {
    game.events()
        .unwrap()
        .iter()
        .filter(|e| e.kind() == kind::JAM_ENDED)
        .map(|e| e.tick)
        .collect()
}

#[test]
fn test_jam_clock_expiry_is_stamped_at_duration() {
    let mut game = Game::new().unwrap();
    game.submit(Tick(0), BoutEvent::JamStarted).unwrap();

    let outcome = game.tick(Tick(130_000)).unwrap();
    assert_eq!(outcome.emitted, 1);
    assert_eq!(jam_ends(&game), vec![Tick(120_000)]);

    let logged = game.events().unwrap();
    let ended = logged.last().unwrap();
    assert!(ended.is_tick_driven());
    assert_eq!(game.stage().unwrap().stage, Stage::Lineup);

    // Not running any more: later ticks emit nothing
    let outcome = game.tick(Tick(140_000)).unwrap();
    assert_eq!(outcome.emitted, 0);
    assert_eq!(jam_ends(&game).len(), 1);
}

#[test]
fn test_tick_is_idempotent() {
    let mut game = Game::new().unwrap();
    game.submit(Tick(0), BoutEvent::JamStarted).unwrap();

    game.tick(Tick(50_000)).unwrap();
    let jam = game.state::<JamClock>().unwrap();
    let period = game.state::<PeriodClock>().unwrap();

    game.tick(Tick(50_000)).unwrap();
    assert_eq!(*game.state::<JamClock>().unwrap(), *jam);
    assert_eq!(*game.state::<PeriodClock>().unwrap(), *period);
    assert_eq!(jam.watch.passed, Tick(50_000));
}

#[test]
fn test_clock_time_is_monotonic() {
    let mut game = Game::new().unwrap();
    game.submit(Tick(0), BoutEvent::JamStarted).unwrap();

    game.tick(Tick(60_000)).unwrap();
    let first = game.state::<PeriodClock>().unwrap().watch.passed;
    game.tick(Tick(80_000)).unwrap();
    let second = game.state::<PeriodClock>().unwrap().watch.passed;
    assert!(second >= first);

    // An older tick is dropped outright
    assert!(game.tick(Tick(70_000)).unwrap().is_dropped());
    assert_eq!(game.state::<PeriodClock>().unwrap().watch.passed, second);

    // Late implicit events stamped in the past do not pull clocks back either
    game.submit(Tick(75_000), BoutEvent::JamEnded).unwrap();
    assert_eq!(game.state::<PeriodClock>().unwrap().watch.passed, second);
}

#[test]
fn test_nested_cascade_attributes_to_root() {
    let mut game = Game::new().unwrap();
    game.configure(Ruleset {
        period_duration: Tick(10_000),
        ..Ruleset::default()
    })
    .unwrap();

    game.submit(Tick(0), BoutEvent::JamStarted).unwrap();
    // Period time runs out while the jam is still going
    game.tick(Tick(11_000)).unwrap();
    let period = game.state::<PeriodClock>().unwrap();
    assert!(period.expired && !period.announced);
    assert_eq!(game.stage().unwrap().stage, Stage::Jam);

    // Timeout -> JamEnded -> PeriodEnded
    let outcome = game
        .submit(Tick(12_000), BoutEvent::TimeoutStarted { kind: None })
        .unwrap();
    assert_eq!(outcome.depth, 2);

    let undo = game.state::<LastUndoable>().unwrap();
    let entry = undo.entry.as_ref().unwrap();
    assert_eq!(Some(entry.root), outcome.root);
    assert_eq!(entry.kind, kind::TIMEOUT_STARTED);
    assert_eq!(game.stage().unwrap().stage, Stage::Intermission);

    // The timeout only lasted part of the cascade
    let timeline = game.state::<Timeline>().unwrap();
    let stages: Vec<Stage> = timeline.history.iter().map(|i| i.stage).collect();
    assert_eq!(stages, vec![Stage::Jam]);
    assert_eq!(timeline.history[0].duration, Tick(12_000));
}

#[test]
fn test_period_expiry_between_jams() {
    let mut game = Game::new().unwrap();
    game.configure(Ruleset {
        period_duration: Tick(100_000),
        ..Ruleset::default()
    })
    .unwrap();

    game.submit(Tick(0), BoutEvent::JamStarted).unwrap();
    game.submit(Tick(60_000), BoutEvent::JamEnded).unwrap();
    game.tick(Tick(105_000)).unwrap();

    let ended: Vec<_> = game
        .events()
        .unwrap()
        .into_iter()
        .filter(|e| e.kind() == kind::PERIOD_ENDED)
        .collect();
    assert_eq!(ended.len(), 1);
    assert_eq!(ended[0].tick, Tick(100_000));
    assert_eq!(game.stage().unwrap().stage, Stage::Intermission);

    // The next jam opens period 2
    game.submit(Tick(200_000), BoutEvent::JamStarted).unwrap();
    let stage = game.stage().unwrap();
    assert_eq!((stage.period, stage.jam, stage.total_jams), (2, 1, 2));
    assert!(!game.state::<PeriodClock>().unwrap().expired);
}

#[test]
fn test_full_game_reaches_after_game() {
    let mut game = Game::new().unwrap();
    game.configure(Ruleset {
        period_duration: Tick(100_000),
        intermission_duration: Tick(50_000),
        ..Ruleset::default()
    })
    .unwrap();

    game.submit(Tick(0), BoutEvent::JamStarted).unwrap();
    game.submit(Tick(90_000), BoutEvent::JamEnded).unwrap();
    assert_eq!(game.stage().unwrap().stage, Stage::Lineup);

    // Period time runs out during the lineup
    game.tick(Tick(100_000)).unwrap();
    assert_eq!(game.stage().unwrap().stage, Stage::Intermission);

    game.tick(Tick(160_000)).unwrap();
    let intermission: Vec<_> = game
        .events()
        .unwrap()
        .into_iter()
        .filter(|e| e.kind() == kind::INTERMISSION_ENDED)
        .collect();
    assert_eq!(intermission.len(), 1);
    assert_eq!(intermission[0].tick, Tick(150_000));
    assert_eq!(game.stage().unwrap().stage, Stage::Lineup);
    assert!(game.state::<LineupClock>().unwrap().watch.running);

    game.submit(Tick(200_000), BoutEvent::JamStarted).unwrap();
    // The jam (at 320s) and the period (at 300s) both run out
    game.tick(Tick(330_000)).unwrap();
    assert_eq!(game.stage().unwrap().stage, Stage::AfterGame);
    assert_eq!(jam_ends(&game), vec![Tick(90_000), Tick(320_000)]);

    let timeline = game.state::<Timeline>().unwrap();
    let stages: Vec<Stage> = timeline.history.iter().map(|i| i.stage).collect();
    assert_eq!(
        stages,
        vec![
            Stage::Jam,
            Stage::Lineup,
            Stage::Intermission,
            Stage::Lineup,
            Stage::Jam
        ]
    );
    let stage = game.stage().unwrap();
    assert_eq!((stage.period, stage.jam, stage.total_jams), (2, 1, 2));
    assert_eq!(
        timeline.current.as_ref().map(|c| c.stage),
        Some(Stage::AfterGame)
    );
}

#[test]
fn test_box_trip_through_game() {
    let mut game = Game::new().unwrap();
    game.submit(Tick(0), BoutEvent::JamStarted).unwrap();
    game.submit(
        Tick(1_234),
        BoutEvent::SkaterSatInBox {
            team: Team::Away,
            skater: "123".into(),
        },
    )
    .unwrap();
    game.submit(Tick(50_000), BoutEvent::JamEnded).unwrap();
    game.submit(Tick(80_000), BoutEvent::JamStarted).unwrap();
    game.submit(Tick(90_000), BoutEvent::JamEnded).unwrap();
    game.submit(Tick(120_000), BoutEvent::JamStarted).unwrap();
    game.submit(
        Tick(125_000),
        BoutEvent::SkaterReleasedFromBox {
            team: Team::Away,
            skater: "123".into(),
        },
    )
    .unwrap();

    let trips = game.team::<BoxTrips>(Team::Away).unwrap();
    let trip = &trips.trips[0];
    assert_eq!((trip.period, trip.jam, trip.total_jam_start), (1, 1, 1));
    assert_eq!(trip.duration_in_jams, Some(2));
    assert_eq!(trip.elapsed, Some(Tick(125_000 - 1_234)));
    assert!(game.team::<BoxTrips>(Team::Home).unwrap().trips.is_empty());
}

fn played() -> Game {
    let mut game = Game::new().unwrap();
    game.submit(Tick(0), BoutEvent::JamStarted).unwrap();
    game.submit(
        Tick(10_000),
        BoutEvent::PenaltyIssued {
            team: Team::Home,
            skater: "7".into(),
            code: "X".into(),
        },
    )
    .unwrap();
    game.submit(
        Tick(11_000),
        BoutEvent::SkaterSatInBox {
            team: Team::Home,
            skater: "7".into(),
        },
    )
    .unwrap();
    game.tick(Tick(125_000)).unwrap();
    game.submit(
        Tick(130_000),
        BoutEvent::TimeoutStarted {
            kind: Some(TimeoutKind::Team(Team::Away)),
        },
    )
    .unwrap();
    game.submit(Tick(190_000), BoutEvent::TimeoutEnded).unwrap();
    game.submit(Tick(200_000), BoutEvent::JamStarted).unwrap();
    game.submit(
        Tick(230_000),
        BoutEvent::SkaterReleasedFromBox {
            team: Team::Home,
            skater: "7".into(),
        },
    )
    .unwrap();
    game
}

fn assert_same_derived_state(a: &Game, b: &Game) {
    assert_eq!(*a.stage().unwrap(), *b.stage().unwrap());
    assert_eq!(*a.state::<Timeline>().unwrap(), *b.state::<Timeline>().unwrap());
    assert_eq!(
        *a.state::<LastUndoable>().unwrap(),
        *b.state::<LastUndoable>().unwrap()
    );
    for team in Team::ALL {
        assert_eq!(*a.team::<BoxTrips>(team).unwrap(), *b.team::<BoxTrips>(team).unwrap());
        assert_eq!(*a.team::<Penalties>(team).unwrap(), *b.team::<Penalties>(team).unwrap());
        assert_eq!(
            *a.team::<TeamTimeouts>(team).unwrap(),
            *b.team::<TeamTimeouts>(team).unwrap()
        );
    }
}

#[test]
fn test_cold_start_replay_matches_live() {
    let live = played();

    let mut cold = Game::new().unwrap();
    let mut log = bout_core::MemoryLog::new();
    for event in live.events().unwrap() {
        bout_core::EventLog::append(&mut log, &event).unwrap();
    }
    let mut cold_from_log = Game::with_log(log).unwrap();
    cold_from_log.rebuild().unwrap();
    assert_same_derived_state(&live, &cold_from_log);

    // Rebuilding in place gives the same answer too
    let mut again = played();
    again.rebuild().unwrap();
    assert_same_derived_state(&live, &again);

    // A fresh game that has seen nothing stays at its defaults
    assert_eq!(cold.stage().unwrap().stage, Stage::BeforeGame);
    assert!(cold.rebuild().is_ok());
}

#[test]
fn test_undo_removes_whole_cascade() {
    let mut game = Game::new().unwrap();
    game.submit(Tick(0), BoutEvent::JamStarted).unwrap();
    game.submit(Tick(40_000), BoutEvent::TimeoutStarted { kind: None })
        .unwrap();
    assert_eq!(game.stage().unwrap().stage, Stage::Timeout);
    // TimeoutStarted plus the JamEnded it caused
    assert_eq!(game.logged().unwrap(), 3);

    let undone = game.undo().unwrap();
    assert_eq!(undone.kind, kind::TIMEOUT_STARTED);
    assert_eq!(game.logged().unwrap(), 1);
    assert_eq!(game.stage().unwrap().stage, Stage::Jam);

    let undone = game.undo().unwrap();
    assert_eq!(undone.kind, kind::JAM_STARTED);
    assert_eq!(game.stage().unwrap().stage, Stage::BeforeGame);

    assert!(matches!(game.undo(), Err(Error::NothingToUndo)));
}

#[test]
fn test_tick_driven_cascades_are_not_undoable() {
    let mut game = Game::new().unwrap();
    let started = game.submit(Tick(0), BoutEvent::JamStarted).unwrap();
    game.tick(Tick(121_000)).unwrap();
    assert_eq!(game.stage().unwrap().stage, Stage::Lineup);

    let undo = game.state::<LastUndoable>().unwrap();
    assert_eq!(undo.entry.as_ref().map(|e| e.root), started.root);
    assert!(BoutEvent::JamEnded.is_undoable());
}

#[test]
fn test_timeouts_charged_per_team() {
    let game = played();
    let rules = game.rules().unwrap();
    let away = game.team::<TeamTimeouts>(Team::Away).unwrap();
    assert_eq!(away.timeouts_remaining(&rules), rules.team_timeouts - 1);
    assert_eq!(game.team::<TeamTimeouts>(Team::Home).unwrap().timeouts_used, 0);
}
