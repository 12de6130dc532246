//! Store snapshots for faster rebuilds
//!
//! A keyframe is a copy of a settled store plus the position in the log it
//! corresponds to. Rebuilding restores the newest keyframe whose log prefix
//! is still intact and replays only the tail; anything else falls back to a
//! full replay.

use crate::Result;
use bout_core::{EventId, StateStore, Tick};
use bout_views::Game;
use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use tracing::debug;

/// One captured store
#[derive(Debug, Clone)]
pub struct Keyframe {
    /// Logged events the store reflects
    pub events: usize,
    /// Id of the last of those events
    pub last: Option<EventId>,
    pub latest_tick: Option<Tick>,
    pub store: StateStore,
    pub taken_at: DateTime<Utc>,
}

/// Keyframes of one game, oldest first
#[derive(Debug, Clone, Default)]
pub struct Keyframes {
    frames: VecDeque<Keyframe>,
}

impl Keyframes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture a keyframe if the game's snapshot policy says one is due
    pub fn observe(&mut self, game: &Game) -> Result<bool> {
        let policy = game.snapshot_policy()?;
        if policy.interval == 0 {
            return Ok(false);
        }
        let since = self.frames.back().map_or(0, |f| f.events);
        if game.logged()? < since + policy.interval {
            return Ok(false);
        }
        self.capture(game)?;
        Ok(true)
    }

    /// Capture a keyframe now
    pub fn capture(&mut self, game: &Game) -> Result<()> {
        let events = game.events()?;
        let frame = Keyframe {
            events: events.len(),
            last: events.last().map(|e| e.id),
            latest_tick: game.latest_tick(),
            store: game.store().clone(),
            taken_at: Utc::now(),
        };
        debug!(events = frame.events, "captured keyframe");
        self.frames.push_back(frame);

        let max = game.snapshot_policy()?.max_keyframes.max(1);
        while self.frames.len() > max {
            self.frames.pop_front();
        }
        Ok(())
    }

    /// Rebuild `game` from the newest usable keyframe
    ///
    /// Returns the number of events replayed.
    pub fn rebuild(&self, game: &mut Game) -> Result<usize> {
        let events = game.events()?;
        let usable = self.frames.iter().rev().find(|frame| {
            frame.events <= events.len()
                && frame.events.checked_sub(1).map(|i| events[i].id) == frame.last
        });

        match usable {
            Some(frame) => {
                debug!(from = frame.events, total = events.len(), "rebuilding from keyframe");
                let tail = events[frame.events..].to_vec();
                Ok(game.restore(frame.store.clone(), frame.latest_tick, tail)?)
            }
            None => Ok(game.rebuild()?),
        }
    }

    pub fn latest(&self) -> Option<&Keyframe> {
        self.frames.back()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}
