//! Stage history of the bout

use crate::stage::{GameStage, Stage};
use crate::BoutEvent;
use bout_core::{reads, Event, EventId, Reaction, Reader, Result, State, Subscription, Tick, View};
use serde::{Deserialize, Serialize};

/// The stage currently in effect
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenInterval {
    pub stage: Stage,
    /// Tick of the event that opened it
    pub start: Tick,
    /// Event that moved the game into this stage
    pub opened_by: EventId,
    /// Type name of that event
    pub opened_kind: String,
}

/// A stage that is over
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    pub stage: Stage,
    pub start: Tick,
    /// Time until the next stage opened
    pub duration: Tick,
    pub opened_by: EventId,
    pub opened_kind: String,
}

/// Every stage the bout has been through, oldest first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeline {
    pub current: Option<OpenInterval>,
    pub history: Vec<Interval>,
}

impl State for Timeline {
    const NAME: &'static str = "timeline";
}

/// Catch-all observer closing an interval whenever the stage moves on
///
/// Registered after every stage-affecting view, so within a layer it sees the
/// stage as the rest of that layer left it. Changes are measured against the
/// timeline as it stood when the cascade began: a stage the cascade passes
/// through on its way somewhere else leaves no interval behind.
pub struct TimelineView;
reads!(TimelineView => GameStage);

impl View<BoutEvent> for TimelineView {
    type State = Timeline;
    const NAME: &'static str = "timeline";

    fn subscription(&self) -> Subscription {
        Subscription::All
    }

    fn on_event(
        &self,
        state: &Timeline,
        event: &Event<BoutEvent>,
        reader: &Reader<'_, Self>,
    ) -> Result<Reaction<Timeline, BoutEvent>> {
        // Tick signals are never recorded as what opened a stage
        if event.is_tick_signal() {
            return Ok(Reaction::unchanged());
        }
        let stage = reader.get::<GameStage>()?.stage;
        if state.current.as_ref().map(|c| c.stage) == Some(stage) {
            return Ok(Reaction::unchanged());
        }

        let mut next = (*reader.get_cached_dyn::<Timeline>()?).clone();
        if next.current.as_ref().map(|c| c.stage) == Some(stage) {
            // Back where the cascade started
            return Ok(Reaction::replace(next));
        }
        if let Some(open) = next.current.take() {
            next.history.push(Interval {
                stage: open.stage,
                start: open.start,
                duration: event.tick.since(open.start),
                opened_by: open.opened_by,
                opened_kind: open.opened_kind,
            });
        }
        next.current = Some(OpenInterval {
            stage,
            start: event.tick,
            opened_by: event.id,
            opened_kind: event.kind().to_string(),
        });
        Ok(Reaction::replace(next))
    }
}
