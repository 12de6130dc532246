//! Bout Journal - Durability, keyframes and export for bouts
//!
//! This crate builds on `bout-views` to provide:
//!
//! - **RonFileLog**: an append-only on-disk event log, one RON event per line
//! - **Keyframes**: store snapshots so a rebuild only replays the log's tail
//! - **Exporter**: read-only export of a settled game to RON, JSON, CSV or text
//!
//! # Example
//!
//! ```rust,no_run
//! use bout_core::Tick;
//! use bout_journal::{ExportFormat, Exporter, Keyframes, RonFileLog};
//! use bout_views::{BoutEvent, Game};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let log = RonFileLog::<BoutEvent>::open("bout.log")?;
//! let mut game = Game::with_log(log)?;
//! let mut keyframes = Keyframes::new();
//!
//! game.submit(Tick(0), BoutEvent::JamStarted)?;
//! keyframes.observe(&game)?;
//!
//! // After a restart: restore the newest keyframe and replay the rest
//! keyframes.rebuild(&mut game)?;
//!
//! println!("{}", Exporter::new(&game).export(ExportFormat::Text)?);
//! # Ok(())
//! # }
//! ```

mod error;
mod exporter;
mod file_log;
mod keyframes;

pub use error::{Error, Result};
pub use exporter::{ExportFormat, Exporter};
pub use file_log::RonFileLog;
pub use keyframes::{Keyframe, Keyframes};
