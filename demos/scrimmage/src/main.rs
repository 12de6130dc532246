//! Plays a short scripted scrimmage
//!
//! `scrimmage [ruleset.ron]` drives one game second by second through the
//! scheduler, submitting the scripted officiating calls along the way, then
//! prints the text export. Set `RUST_LOG=debug` to watch every cascade.

use bout_core::Tick;
use bout_hub::{GameId, ManualTickSource, Scheduler, SchedulerConfig};
use bout_journal::{ExportFormat, Exporter};
use bout_views::{BoutEvent, Game, Ruleset, Team, TimeoutKind};
use std::error::Error;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Short periods so the whole scrimmage fits in a few simulated minutes
const SCRIMMAGE_RULES: &str = r#"(
    periods: 2,
    period_duration: 240000,
    jam_duration: 60000,
    lineup_duration: 30000,
    intermission_duration: 60000,
    timeout_duration: 30000,
)"#;

fn script() -> Vec<(u64, BoutEvent)> {
    let penalty = |team, skater: &str, code: &str| BoutEvent::PenaltyIssued {
        team,
        skater: skater.into(),
        code: code.into(),
    };
    let sat = |team, skater: &str| BoutEvent::SkaterSatInBox {
        team,
        skater: skater.into(),
    };
    let released = |team, skater: &str| BoutEvent::SkaterReleasedFromBox {
        team,
        skater: skater.into(),
    };

    vec![
        (5, BoutEvent::JamStarted),
        (20, penalty(Team::Home, "17", "B")),
        (22, sat(Team::Home, "17")),
        // Jam clock runs out at 65 and ends the jam on its own
        (80, BoutEvent::JamStarted),
        (90, penalty(Team::Away, "4", "X")),
        (92, sat(Team::Away, "4")),
        (112, released(Team::Away, "4")),
        (120, BoutEvent::JamEnded),
        (125, BoutEvent::TimeoutStarted { kind: None }),
        (
            130,
            BoutEvent::TimeoutTypeSet {
                kind: TimeoutKind::Team(Team::Away),
            },
        ),
        (150, BoutEvent::TimeoutEnded),
        (155, BoutEvent::JamStarted),
        (170, released(Team::Home, "17")),
        (200, BoutEvent::JamEnded),
        // Period clock expires while lining up, intermission follows
        (340, BoutEvent::JamStarted),
        (420, BoutEvent::JamStarted),
    ]
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("bout=info".parse()?)
                .add_directive("scrimmage=info".parse()?),
        )
        .init();

    let rules = match std::env::args().nth(1) {
        Some(path) => Ruleset::load(path)?,
        None => Ruleset::from_ron(SCRIMMAGE_RULES)?,
    };
    let total = (rules.period_duration.seconds() * u64::from(rules.periods))
        + rules.intermission_duration.seconds()
        + 180;

    let mut game = Game::new()?;
    game.configure(rules)?;

    let id = GameId::from("scrimmage");
    let mut scheduler = Scheduler::new(SchedulerConfig::default());
    scheduler.add(id.clone(), game)?;
    let mut source = ManualTickSource::new();

    let mut script = script().into_iter().peekable();
    for second in 0..=total {
        let now = Tick::from_secs(second);
        source.set(id.clone(), now);
        let report = scheduler.pump(&source);
        if !report.failed.is_empty() {
            warn!(%now, "tick failed, stopping");
            break;
        }

        while let Some((_, body)) = script.next_if(|(at, _)| *at == second) {
            let Some(game) = scheduler.game_mut(&id) else {
                break;
            };
            let outcome = game.submit(now, body)?;
            info!(%now, emitted = outcome.emitted, "submitted call");
        }
    }

    let game = scheduler.remove(&id)?;
    println!("{}", Exporter::new(&game).export(ExportFormat::Text)?);
    Ok(())
}
