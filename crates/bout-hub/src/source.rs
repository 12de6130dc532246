//! Where the scheduler learns each game's current tick

use crate::GameId;
use bout_core::Tick;
use indexmap::IndexMap;
use std::time::{Duration, Instant};

/// Supplies the current logical tick of each game
///
/// `None` means the game is not live and should not be ticked.
pub trait TickSource: Send + Sync {
    fn current_tick(&self, game: &GameId) -> Option<Tick>;
}

/// Ticks set by hand, for tests and demos
#[derive(Debug, Clone, Default)]
pub struct ManualTickSource {
    ticks: IndexMap<GameId, Tick>,
}

impl ManualTickSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `game` live at `tick`
    pub fn set(&mut self, game: impl Into<GameId>, tick: Tick) {
        self.ticks.insert(game.into(), tick);
    }

    /// Move a live game forward by `by` milliseconds
    pub fn advance(&mut self, game: &GameId, by: u64) -> Option<Tick> {
        let tick = self.ticks.get_mut(game)?;
        *tick += Tick(by);
        Some(*tick)
    }

    /// Move every live game forward by `by` milliseconds
    pub fn advance_all(&mut self, by: u64) {
        for tick in self.ticks.values_mut() {
            *tick += Tick(by);
        }
    }

    /// Take a game off the air
    pub fn stop(&mut self, game: &GameId) -> Option<Tick> {
        self.ticks.shift_remove(game)
    }
}

impl TickSource for ManualTickSource {
    fn current_tick(&self, game: &GameId) -> Option<Tick> {
        self.ticks.get(game).copied()
    }
}

#[derive(Debug, Clone, Copy)]
struct WallClock {
    /// Time accumulated before the current run
    banked: Tick,
    running_since: Option<Instant>,
}

impl WallClock {
    fn elapsed(&self, now: Instant) -> Tick {
        let running = self
            .running_since
            .map_or(Duration::ZERO, |since| now.saturating_duration_since(since));
        self.banked + u64::try_from(running.as_millis()).unwrap_or(u64::MAX)
    }
}

/// Ticks from elapsed wall time since each game was started
///
/// Paused games report `None`; resuming continues from where the pause left
/// off, so a game's ticks never jump over the paused stretch.
#[derive(Debug, Clone, Default)]
pub struct WallClockTickSource {
    clocks: IndexMap<GameId, WallClock>,
}

impl WallClockTickSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start (or resume) a game's clock
    pub fn start(&mut self, game: impl Into<GameId>) {
        let clock = self.clocks.entry(game.into()).or_insert(WallClock {
            banked: Tick::ZERO,
            running_since: None,
        });
        if clock.running_since.is_none() {
            clock.running_since = Some(Instant::now());
        }
    }

    /// Freeze a game's clock, returning the tick it stopped at
    pub fn pause(&mut self, game: &GameId) -> Option<Tick> {
        let clock = self.clocks.get_mut(game)?;
        clock.banked = clock.elapsed(Instant::now());
        clock.running_since = None;
        Some(clock.banked)
    }

    pub fn is_running(&self, game: &GameId) -> bool {
        self.clocks
            .get(game)
            .is_some_and(|clock| clock.running_since.is_some())
    }

    /// Forget a game entirely
    pub fn remove(&mut self, game: &GameId) {
        self.clocks.shift_remove(game);
    }
}

impl TickSource for WallClockTickSource {
    fn current_tick(&self, game: &GameId) -> Option<Tick> {
        let clock = self.clocks.get(game)?;
        clock.running_since?;
        Some(clock.elapsed(Instant::now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_source() {
        let mut source = ManualTickSource::new();
        let game = GameId::from("a");
        assert_eq!(source.current_tick(&game), None);

        source.set("a", Tick(1_000));
        assert_eq!(source.advance(&game, 500), Some(Tick(1_500)));
        source.advance_all(500);
        assert_eq!(source.current_tick(&game), Some(Tick(2_000)));

        assert_eq!(source.stop(&game), Some(Tick(2_000)));
        assert_eq!(source.current_tick(&game), None);
        assert_eq!(source.advance(&game, 1), None);
    }

    #[test]
    fn test_wall_clock_pause_and_resume() {
        let mut source = WallClockTickSource::new();
        let game = GameId::from("a");
        assert_eq!(source.current_tick(&game), None);

        source.start("a");
        assert!(source.is_running(&game));
        let first = source.current_tick(&game).unwrap();

        let paused = source.pause(&game).unwrap();
        assert!(paused >= first);
        assert!(!source.is_running(&game));
        assert_eq!(source.current_tick(&game), None);

        source.start("a");
        assert!(source.current_tick(&game).unwrap() >= paused);
    }
}
