//! Scheduler - injects tick pseudo-events into every live game
//!
//! Each game is an isolated [`TickTarget`]: a pump visits every game once,
//! asks the [`TickSource`] for its current tick and runs that tick's cascade
//! to completion. A failing game is reported and left alone; the others are
//! unaffected.

use crate::{Error, Result, SchedulerConfig, TickSource};
use bout_core::{Tick, TickTarget};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::thread;
use tracing::{debug, error, trace};

/// Identifier of a scheduled game
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GameId(String);

impl GameId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for GameId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for GameId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// What one pump did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PumpReport {
    /// Games whose tick cascade ran
    pub ticked: usize,
    /// Games that were not live, or whose tick was stale
    pub skipped: usize,
    /// Games whose tick cascade failed
    pub failed: Vec<GameId>,
    /// Implicit events emitted across all games
    pub emitted: usize,
}

impl PumpReport {
    fn record(&mut self, id: &GameId, visit: Visit) {
        match visit {
            Visit::Ticked { emitted } => {
                self.ticked += 1;
                self.emitted += emitted;
            }
            Visit::Skipped => self.skipped += 1,
            Visit::Failed => self.failed.push(id.clone()),
        }
    }
}

enum Visit {
    Ticked { emitted: usize },
    Skipped,
    Failed,
}

fn visit<G: TickTarget>(source: &dyn TickSource, id: &GameId, game: &mut G) -> Visit {
    let Some(tick) = source.current_tick(id) else {
        trace!(game = %id, "not live");
        return Visit::Skipped;
    };
    match game.advance_to(tick) {
        Ok(outcome) if outcome.is_dropped() => Visit::Skipped,
        Ok(outcome) => Visit::Ticked {
            emitted: outcome.emitted,
        },
        Err(err) => {
            error!(game = %id, %tick, error = %err, "tick cascade failed");
            Visit::Failed
        }
    }
}

/// Owns many isolated games and pumps ticks into them
pub struct Scheduler<G> {
    config: SchedulerConfig,
    games: IndexMap<GameId, G>,
}

impl<G: TickTarget> Scheduler<G> {
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            config,
            games: IndexMap::new(),
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Change the worker count; takes effect from the next pump
    pub fn set_config(&mut self, config: SchedulerConfig) {
        self.config = config;
    }

    /// Schedule a game
    pub fn add(&mut self, id: impl Into<GameId>, game: G) -> Result<()> {
        let id = id.into();
        if self.games.contains_key(&id) {
            return Err(Error::DuplicateGame(id));
        }
        debug!(game = %id, "scheduled game");
        self.games.insert(id, game);
        Ok(())
    }

    /// Stop scheduling a game and hand it back
    pub fn remove(&mut self, id: &GameId) -> Result<G> {
        self.games
            .shift_remove(id)
            .ok_or_else(|| Error::UnknownGame(id.clone()))
    }

    pub fn game(&self, id: &GameId) -> Option<&G> {
        self.games.get(id)
    }

    pub fn game_mut(&mut self, id: &GameId) -> Option<&mut G> {
        self.games.get_mut(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &GameId> {
        self.games.keys()
    }

    /// The latest tick each game has processed
    pub fn latest_ticks(&self) -> impl Iterator<Item = (&GameId, Option<Tick>)> {
        self.games.iter().map(|(id, game)| (id, game.latest_tick()))
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    /// Tick every live game once
    pub fn pump(&mut self, source: &dyn TickSource) -> PumpReport {
        let workers = self.config.workers().min(self.games.len());
        let report = if workers <= 1 {
            self.pump_serial(source)
        } else {
            self.pump_parallel(source, workers)
        };
        debug!(
            ticked = report.ticked,
            skipped = report.skipped,
            failed = report.failed.len(),
            emitted = report.emitted,
            "pump finished"
        );
        report
    }

    fn pump_serial(&mut self, source: &dyn TickSource) -> PumpReport {
        let mut report = PumpReport::default();
        for (id, game) in self.games.iter_mut() {
            let outcome = visit(source, id, game);
            report.record(id, outcome);
        }
        report
    }

    fn pump_parallel(&mut self, source: &dyn TickSource, workers: usize) -> PumpReport {
        let mut entries: Vec<(&GameId, &mut G)> = self.games.iter_mut().collect();
        let chunk = entries.len().div_ceil(workers);
        let mut report = PumpReport::default();

        thread::scope(|scope| {
            let handles: Vec<_> = entries
                .chunks_mut(chunk)
                .map(|part| {
                    let ids: Vec<GameId> = part.iter().map(|(id, _)| (*id).clone()).collect();
                    let handle = scope.spawn(move || {
                        part.iter_mut()
                            .map(|(id, game)| visit(source, id, &mut **game))
                            .collect::<Vec<_>>()
                    });
                    (ids, handle)
                })
                .collect();

            for (ids, handle) in handles {
                match handle.join() {
                    Ok(visits) => {
                        for (id, outcome) in ids.iter().zip(visits) {
                            report.record(id, outcome);
                        }
                    }
                    Err(_) => {
                        error!(games = ids.len(), "scheduler worker panicked");
                        report.failed.extend(ids);
                    }
                }
            }
        });

        report
    }
}

impl<G: TickTarget> Default for Scheduler<G> {
    fn default() -> Self {
        Self::new(SchedulerConfig::default())
    }
}
