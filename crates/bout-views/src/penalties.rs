//! Penalties issued per team

use crate::event::kind;
use crate::stage::GameStage;
use crate::{BoutEvent, Team};
use bout_core::{
    reads, Event, EventId, Key, Reaction, Reader, Result, State, Subscription, Tick, View,
};
use serde::{Deserialize, Serialize};

/// A penalty issued and not rescinded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Penalty {
    /// Id of the event that issued it; rescinds refer to this
    pub id: EventId,
    pub skater: String,
    /// Penalty code letter
    pub code: String,
    pub period: u32,
    pub jam: u32,
    pub issued: Tick,
}

/// Penalties against one team
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Penalties {
    pub penalties: Vec<Penalty>,
}

impl State for Penalties {
    const NAME: &'static str = "penalties";
}

impl Penalties {
    /// Penalties against one skater
    pub fn for_skater<'a>(&'a self, skater: &'a str) -> impl Iterator<Item = &'a Penalty> + 'a {
        self.penalties.iter().filter(move |p| p.skater == skater)
    }
}

/// Owns one team's [`Penalties`]
pub struct PenaltiesView {
    team: Team,
}

impl PenaltiesView {
    pub fn new(team: Team) -> Self {
        Self { team }
    }
}

reads!(PenaltiesView => GameStage);

impl View<BoutEvent> for PenaltiesView {
    type State = Penalties;
    const NAME: &'static str = "penalties";

    fn key(&self) -> Option<Key> {
        Some(self.team.key())
    }

    fn subscription(&self) -> Subscription {
        Subscription::Kinds(&[kind::PENALTY_ISSUED, kind::PENALTY_RESCINDED])
    }

    fn on_event(
        &self,
        state: &Penalties,
        event: &Event<BoutEvent>,
        reader: &Reader<'_, Self>,
    ) -> Result<Reaction<Penalties, BoutEvent>> {
        let mut next = state.clone();
        match &event.body {
            BoutEvent::PenaltyIssued { team, skater, code } if *team == self.team => {
                let stage = reader.get::<GameStage>()?;
                next.penalties.push(Penalty {
                    id: event.id,
                    skater: skater.clone(),
                    code: code.clone(),
                    period: stage.period,
                    jam: stage.jam,
                    issued: event.tick,
                });
            }
            BoutEvent::PenaltyRescinded { team, penalty } if *team == self.team => {
                next.penalties.retain(|p| p.id != *penalty);
                if next.penalties.len() == state.penalties.len() {
                    return Ok(Reaction::unchanged());
                }
            }
            _ => return Ok(Reaction::unchanged()),
        }
        Ok(Reaction::replace(next))
    }
}
