//! Bout Hub - Tick scheduling for many isolated games
//!
//! ## Architecture
//!
//! ```text
//! Scheduler (owns every game)
//!  │
//!  ├── TickSource (trait) ← "what time is it in game X?"
//!  │
//!  └── TickTarget[] ← one isolated bus per game
//!       └── tick pseudo-event → full cascade
//! ```
//!
//! ## Key Components
//!
//! - [`Scheduler`]: owns the games and pumps one tick into each live one
//! - [`TickSource`]: supplies the current tick; see [`ManualTickSource`] and
//!   [`WallClockTickSource`]
//! - [`SchedulerConfig`]: how many worker threads a pump may use
//!
//! Games share nothing, so a failed or poisoned game is reported in the
//! [`PumpReport`] while every other game keeps running.

mod config;
mod error;
mod scheduler;
mod source;

pub use config::{max_workers, SchedulerConfig};
pub use error::{Error, Result};
pub use scheduler::{GameId, PumpReport, Scheduler};
pub use source::{ManualTickSource, TickSource, WallClockTickSource};
