//! Bout Views - The bout domain over bout-core
//!
//! This crate provides everything that makes a bus a roller derby bout:
//! - `BoutEvent`: the closed union of things that can happen
//! - `Ruleset` and `SnapshotPolicy`: configuration slices read like any state
//! - Clocks (jam, period, lineup, timeout, intermission) that turn expiry
//!   into ordinary events
//! - `GameStage`: the master phase machine every other view defers to
//! - Per-team timeouts, box trips and penalties
//! - `UndoTracker` and `TimelineView`: catch-all observers
//! - `Game`: a bus with every view registered, plus rebuild and undo
//!
//! ## Example
//!
//! ```rust
//! use bout_views::{BoutEvent, Game, Stage};
//! use bout_core::Tick;
//!
//! let mut game = Game::new().unwrap();
//! game.submit(Tick(0), BoutEvent::JamStarted).unwrap();
//! game.tick(Tick(130_000)).unwrap();
//!
//! // The jam clock ran out at two minutes and ended the jam itself
//! assert_eq!(game.stage().unwrap().stage, Stage::Lineup);
//! ```

pub mod box_trips;
pub mod clock;
mod config;
mod error;
mod event;
mod game;
pub mod penalties;
pub mod stage;
pub mod timeline;
pub mod timeouts;
pub mod undo;

pub use box_trips::{BoxTrip, BoxTrips};
pub use clock::{IntermissionClock, JamClock, LineupClock, PeriodClock, Stopwatch, TimeoutClock};
pub use config::{Ruleset, SnapshotPolicy};
pub use error::{Error, Result};
pub use event::{kind, BoutEvent, Team, TimeoutKind};
pub use game::Game;
pub use penalties::{Penalties, Penalty};
pub use stage::{GameStage, Stage};
pub use timeline::{Interval, OpenInterval, Timeline};
pub use timeouts::TeamTimeouts;
pub use undo::{LastUndoable, UndoEntry};
