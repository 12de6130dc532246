//! On-disk log behaviour and restarts

use bout_core::{Event, EventId, EventLog, Tick};
use bout_journal::{Error, Keyframes, RonFileLog};
use bout_views::{BoutEvent, BoxTrips, Game, Penalties, SnapshotPolicy, Stage, Team};
use std::fs;
use tempfile::tempdir;

fn penalty(skater: &str) -> BoutEvent {
    BoutEvent::PenaltyIssued {
        team: Team::Home,
        skater: skater.into(),
        code: "C".into(),
    }
}

#[test]
fn test_append_and_read_preserve_order() {
    let dir = tempdir().unwrap();
    let mut log = RonFileLog::<BoutEvent>::open(dir.path().join("bout.log")).unwrap();

    let first = Event::new(EventId::new(Tick(0), 0), BoutEvent::JamStarted);
    let second = Event::new(EventId::new(Tick(10), 1), penalty("7"));
    log.append(&first).unwrap();
    log.append(&second).unwrap();

    assert_eq!(log.read_all().unwrap(), vec![first, second]);
    assert_eq!(log.len().unwrap(), 2);
}

#[test]
fn test_open_creates_parent_directories() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("games").join("bout.log");
    let log = RonFileLog::<BoutEvent>::open(&path).unwrap();

    assert!(path.exists());
    assert!(log.is_empty().unwrap());
}

#[test]
fn test_remove_rewrites_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bout.log");
    let mut log = RonFileLog::<BoutEvent>::open(&path).unwrap();

    let events: Vec<_> = (0..4)
        .map(|n| Event::new(EventId::new(Tick(n), n), penalty(&n.to_string())))
        .collect();
    for event in &events {
        log.append(event).unwrap();
    }

    let removed = log.remove(&[events[1].id, events[3].id]).unwrap();
    assert_eq!(removed, 2);
    assert_eq!(fs::read_to_string(&path).unwrap().lines().count(), 2);

    // Appends after a rewrite land in the new file
    let late = Event::new(EventId::new(Tick(9), 9), BoutEvent::JamEnded);
    log.append(&late).unwrap();
    let ids: Vec<_> = log.read_all().unwrap().iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![events[0].id, events[2].id, late.id]);

    assert_eq!(log.remove(&[EventId::new(Tick(99), 99)]).unwrap(), 0);
}

#[test]
fn test_corrupt_line_is_reported() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bout.log");
    let mut log = RonFileLog::<BoutEvent>::open(&path).unwrap();
    log.append(&Event::new(EventId::new(Tick(0), 0), BoutEvent::JamStarted))
        .unwrap();
    let mut content = fs::read_to_string(&path).unwrap();
    content.push_str("(not an event\n");
    fs::write(&path, content).unwrap();

    match log.events() {
        Err(Error::Corrupt { line, .. }) => assert_eq!(line, 2),
        other => panic!("expected corrupt line, got {other:?}"),
    }
    assert!(log.read_all().is_err());
}

#[test]
fn test_game_survives_restart() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bout.log");

    let expected_trips = {
        let mut game = Game::with_log(RonFileLog::open(&path).unwrap()).unwrap();
        game.submit(Tick(0), BoutEvent::JamStarted).unwrap();
        game.submit(
            Tick(3_000),
            BoutEvent::SkaterSatInBox {
                team: Team::Away,
                skater: "21".into(),
            },
        )
        .unwrap();
        game.tick(Tick(125_000)).unwrap();
        (*game.team::<BoxTrips>(Team::Away).unwrap()).clone()
    };

    let mut game = Game::with_log(RonFileLog::open(&path).unwrap()).unwrap();
    assert_eq!(game.stage().unwrap().stage, Stage::BeforeGame);

    let applied = game.rebuild().unwrap();
    assert_eq!(applied, 3);
    assert_eq!(game.stage().unwrap().stage, Stage::Lineup);
    assert_eq!(*game.team::<BoxTrips>(Team::Away).unwrap(), expected_trips);

    // Fresh ids continue after the replayed ones
    game.submit(Tick(150_000), BoutEvent::JamStarted).unwrap();
    let events = game.events().unwrap();
    let mut ids: Vec<_> = events.iter().map(|e| e.id).collect();
    ids.dedup();
    assert_eq!(ids.len(), events.len());
}

#[test]
fn test_undo_on_file_log_and_keyframe_rebuild() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bout.log");
    let mut game = Game::with_log(RonFileLog::open(&path).unwrap()).unwrap();
    game.set_snapshot_policy(SnapshotPolicy {
        interval: 2,
        max_keyframes: 4,
    })
    .unwrap();
    let mut keyframes = Keyframes::new();

    game.submit(Tick(0), BoutEvent::JamStarted).unwrap();
    game.submit(Tick(1_000), penalty("1")).unwrap();
    keyframes.observe(&game).unwrap();
    game.submit(Tick(2_000), penalty("2")).unwrap();

    game.undo().unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap().lines().count(), 2);
    assert_eq!(game.team::<Penalties>(Team::Home).unwrap().penalties.len(), 1);

    // The keyframe prefix is untouched by that undo, so it is reused
    let replayed = keyframes.rebuild(&mut game).unwrap();
    assert_eq!(replayed, 0);
    assert_eq!(game.team::<Penalties>(Team::Home).unwrap().penalties.len(), 1);
    assert_eq!(game.stage().unwrap().stage, Stage::Jam);
}
