//! Configuration slices installed by the game before any cascade
//!
//! Views read these through declared dependencies like any other slice; only
//! [`Game::configure`](crate::Game::configure) writes them.

use crate::error::Result;
use bout_core::{State, Tick};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Durations and allowances of a bout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Ruleset {
    pub periods: u32,
    pub period_duration: Tick,
    pub jam_duration: Tick,
    pub lineup_duration: Tick,
    pub intermission_duration: Tick,
    pub timeout_duration: Tick,
    /// Team timeouts per team per game
    pub team_timeouts: u32,
    /// Official reviews per team per game
    pub official_reviews: u32,
    /// Whether any timeout stops the period clock
    pub timeouts_stop_period_clock: bool,
}

impl Default for Ruleset {
    fn default() -> Self {
        Self {
            periods: 2,
            period_duration: Tick::from_secs(30 * 60),
            jam_duration: Tick::from_secs(2 * 60),
            lineup_duration: Tick::from_secs(30),
            intermission_duration: Tick::from_secs(15 * 60),
            timeout_duration: Tick::from_secs(60),
            team_timeouts: 3,
            official_reviews: 1,
            timeouts_stop_period_clock: true,
        }
    }
}

impl State for Ruleset {
    const NAME: &'static str = "ruleset";
}

impl Ruleset {
    /// Parse from RON; omitted fields keep their defaults
    pub fn from_ron(text: &str) -> Result<Self> {
        Ok(ron::from_str(text)?)
    }

    /// Load from a RON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_ron(&content)
    }
}

/// How often a journal captures keyframes of the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotPolicy {
    /// Persisted events between keyframes
    pub interval: usize,
    /// Keyframes kept; the oldest is dropped first
    pub max_keyframes: usize,
}

impl Default for SnapshotPolicy {
    fn default() -> Self {
        Self {
            interval: 50,
            max_keyframes: 8,
        }
    }
}

impl State for SnapshotPolicy {
    const NAME: &'static str = "snapshot_policy";
}

impl SnapshotPolicy {
    /// Parse from RON; omitted fields keep their defaults
    pub fn from_ron(text: &str) -> Result<Self> {
        Ok(ron::from_str(text)?)
    }
}
