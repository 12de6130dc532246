//! The closed union of bout events

use bout_core::{EventId, Key, Payload};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable type tags of [`BoutEvent`] variants
pub mod kind {
    pub const TICK: &str = "tick";
    pub const JAM_STARTED: &str = "jam_started";
    pub const JAM_ENDED: &str = "jam_ended";
    pub const TIMEOUT_STARTED: &str = "timeout_started";
    pub const TIMEOUT_TYPE_SET: &str = "timeout_type_set";
    pub const TIMEOUT_ENDED: &str = "timeout_ended";
    pub const PERIOD_ENDED: &str = "period_ended";
    pub const INTERMISSION_ENDED: &str = "intermission_ended";
    pub const SKATER_SAT_IN_BOX: &str = "skater_sat_in_box";
    pub const SKATER_RELEASED_FROM_BOX: &str = "skater_released_from_box";
    pub const PENALTY_ISSUED: &str = "penalty_issued";
    pub const PENALTY_RESCINDED: &str = "penalty_rescinded";
}

/// A team side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    Home,
    Away,
}

impl Team {
    /// Both sides, home first
    pub const ALL: [Team; 2] = [Team::Home, Team::Away];

    /// Partition key of this side's keyed slices
    pub fn key(self) -> Key {
        Key::from(self.as_str())
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Team::Home => "home",
            Team::Away => "away",
        }
    }
}

impl From<Team> for Key {
    fn from(team: Team) -> Self {
        team.key()
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who a timeout is charged to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeoutKind {
    /// Called by officials, charged to nobody
    Official,
    /// A team timeout
    Team(Team),
    /// An official review requested by a team
    OfficialReview(Team),
}

impl TimeoutKind {
    /// The team this timeout is charged to, if any
    pub fn team(self) -> Option<Team> {
        match self {
            TimeoutKind::Official => None,
            TimeoutKind::Team(team) | TimeoutKind::OfficialReview(team) => Some(team),
        }
    }
}

/// Every event a bout understands
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BoutEvent {
    /// Ephemeral tick signal; never logged
    Tick,
    JamStarted,
    JamEnded,
    /// `kind` may be unknown when the whistle blows and set later
    TimeoutStarted {
        kind: Option<TimeoutKind>,
    },
    TimeoutTypeSet {
        kind: TimeoutKind,
    },
    TimeoutEnded,
    PeriodEnded,
    IntermissionEnded,
    SkaterSatInBox {
        team: Team,
        skater: String,
    },
    SkaterReleasedFromBox {
        team: Team,
        skater: String,
    },
    PenaltyIssued {
        team: Team,
        skater: String,
        code: String,
    },
    PenaltyRescinded {
        team: Team,
        /// Id of the `PenaltyIssued` event being withdrawn
        penalty: EventId,
    },
}

impl Payload for BoutEvent {
    fn kind(&self) -> &'static str {
        match self {
            BoutEvent::Tick => kind::TICK,
            BoutEvent::JamStarted => kind::JAM_STARTED,
            BoutEvent::JamEnded => kind::JAM_ENDED,
            BoutEvent::TimeoutStarted { .. } => kind::TIMEOUT_STARTED,
            BoutEvent::TimeoutTypeSet { .. } => kind::TIMEOUT_TYPE_SET,
            BoutEvent::TimeoutEnded => kind::TIMEOUT_ENDED,
            BoutEvent::PeriodEnded => kind::PERIOD_ENDED,
            BoutEvent::IntermissionEnded => kind::INTERMISSION_ENDED,
            BoutEvent::SkaterSatInBox { .. } => kind::SKATER_SAT_IN_BOX,
            BoutEvent::SkaterReleasedFromBox { .. } => kind::SKATER_RELEASED_FROM_BOX,
            BoutEvent::PenaltyIssued { .. } => kind::PENALTY_ISSUED,
            BoutEvent::PenaltyRescinded { .. } => kind::PENALTY_RESCINDED,
        }
    }

    fn tick_signal() -> Self {
        BoutEvent::Tick
    }

    fn is_tick_signal(&self) -> bool {
        matches!(self, BoutEvent::Tick)
    }

    fn is_undoable(&self) -> bool {
        !self.is_tick_signal()
    }
}
