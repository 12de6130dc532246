//! Scheduling real games

use bout_core::Tick;
use bout_hub::{GameId, ManualTickSource, Scheduler, SchedulerConfig};
use bout_views::{kind, BoutEvent, Game, Stage};

fn scheduler_with(ids: &[&str], workers: usize) -> Scheduler<Game> {
    let mut scheduler = Scheduler::new(SchedulerConfig::with_workers(workers));
    for id in ids {
        scheduler.add(*id, Game::new().unwrap()).unwrap();
    }
    scheduler
}

#[test]
fn test_pump_expires_jam_clock() {
    let mut scheduler = scheduler_with(&["main"], 1);
    let main = GameId::from("main");
    scheduler
        .game_mut(&main)
        .unwrap()
        .submit(Tick(0), BoutEvent::JamStarted)
        .unwrap();

    let mut source = ManualTickSource::new();
    for second in 1..=125u64 {
        source.set("main", Tick::from_secs(second));
        let report = scheduler.pump(&source);
        assert!(report.failed.is_empty());
    }

    let game = scheduler.game(&main).unwrap();
    assert_eq!(game.stage().unwrap().stage, Stage::Lineup);
    let ends: Vec<_> = game
        .events()
        .unwrap()
        .into_iter()
        .filter(|e| e.kind() == kind::JAM_ENDED)
        .map(|e| e.tick)
        .collect();
    assert_eq!(ends, vec![Tick(120_000)]);
}

#[test]
fn test_games_do_not_interfere() {
    let mut scheduler = scheduler_with(&["a", "b", "c"], 2);
    let a = GameId::from("a");
    let b = GameId::from("b");
    scheduler
        .game_mut(&a)
        .unwrap()
        .submit(Tick(0), BoutEvent::JamStarted)
        .unwrap();

    let mut source = ManualTickSource::new();
    source.set("a", Tick(130_000));
    source.set("b", Tick(130_000));

    let report = scheduler.pump(&source);
    assert_eq!(report.ticked, 2);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.emitted, 1);

    assert_eq!(scheduler.game(&a).unwrap().stage().unwrap().stage, Stage::Lineup);
    assert_eq!(
        scheduler.game(&b).unwrap().stage().unwrap().stage,
        Stage::BeforeGame
    );
    assert!(scheduler.game(&b).unwrap().events().unwrap().is_empty());
}
