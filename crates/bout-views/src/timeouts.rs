//! Per-team timeout and official review allowances

use crate::clock::TimeoutClock;
use crate::event::kind;
use crate::{BoutEvent, Ruleset, Team, TimeoutKind};
use bout_core::{reads, Event, Key, Reaction, Reader, Result, State, Subscription, View};
use serde::{Deserialize, Serialize};

/// Timeouts and official reviews one team has spent
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamTimeouts {
    /// Team timeouts charged so far
    pub timeouts_used: u32,
    /// Official reviews charged so far
    pub reviews_used: u32,
}

impl State for TeamTimeouts {
    const NAME: &'static str = "team_timeouts";
}

impl TeamTimeouts {
    /// Team timeouts left under `rules`
    pub fn timeouts_remaining(&self, rules: &Ruleset) -> u32 {
        rules.team_timeouts.saturating_sub(self.timeouts_used)
    }

    pub fn reviews_remaining(&self, rules: &Ruleset) -> u32 {
        rules.official_reviews.saturating_sub(self.reviews_used)
    }

    fn adjust(&self, kind: TimeoutKind, delta: i32) -> Self {
        let apply = |n: u32| n.saturating_add_signed(delta);
        match kind {
            TimeoutKind::Official => self.clone(),
            TimeoutKind::Team(_) => Self {
                timeouts_used: apply(self.timeouts_used),
                ..self.clone()
            },
            TimeoutKind::OfficialReview(_) => Self {
                reviews_used: apply(self.reviews_used),
                ..self.clone()
            },
        }
    }
}

/// Charges timeouts to one team
pub struct TeamTimeoutsView {
    team: Team,
}

impl TeamTimeoutsView {
    pub fn new(team: Team) -> Self {
        Self { team }
    }

    fn charges(&self, kind: Option<TimeoutKind>) -> Option<TimeoutKind> {
        kind.filter(|k| k.team() == Some(self.team))
    }
}

reads!(TeamTimeoutsView => TimeoutClock);

impl View<BoutEvent> for TeamTimeoutsView {
    type State = TeamTimeouts;
    const NAME: &'static str = "team_timeouts";

    fn key(&self) -> Option<Key> {
        Some(self.team.key())
    }

    fn subscription(&self) -> Subscription {
        Subscription::Kinds(&[kind::TIMEOUT_STARTED, kind::TIMEOUT_TYPE_SET])
    }

    fn on_event(
        &self,
        state: &TeamTimeouts,
        event: &Event<BoutEvent>,
        reader: &Reader<'_, Self>,
    ) -> Result<Reaction<TeamTimeouts, BoutEvent>> {
        // The clock has already taken this event's type; compare against
        // the clock as it stood before the cascade
        let clock = reader.get_cached::<TimeoutClock>()?;
        let (previous, current) = match event.body {
            BoutEvent::TimeoutStarted { kind } if !clock.watch.running => (None, kind),
            BoutEvent::TimeoutStarted { kind: Some(kind) } => (clock.kind, Some(kind)),
            BoutEvent::TimeoutTypeSet { kind } => (clock.kind, Some(kind)),
            _ => return Ok(Reaction::unchanged()),
        };
        if previous == current {
            return Ok(Reaction::unchanged());
        }

        let mut next = state.clone();
        if let Some(refund) = self.charges(previous) {
            next = next.adjust(refund, -1);
        }
        if let Some(charge) = self.charges(current) {
            next = next.adjust(charge, 1);
        }

        Ok(if next == *state {
            Reaction::unchanged()
        } else {
            Reaction::replace(next)
        })
    }
}
