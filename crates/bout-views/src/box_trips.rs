//! Penalty box trips per team
//!
//! A trip opens when a skater sits and closes when they are released. Open
//! trips carry over jam and period boundaries; the trip's length in jams is
//! counted on the game-wide jam counter so it stays correct across periods.

use crate::event::kind;
use crate::stage::GameStage;
use crate::{BoutEvent, Team};
use bout_core::{reads, Event, Key, Reaction, Reader, Result, State, Subscription, Tick, View};
use serde::{Deserialize, Serialize};

/// One visit of a skater to the penalty box
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoxTrip {
    /// Skater number as printed on the jersey
    pub skater: String,
    /// Period and jam the skater sat down in
    pub period: u32,
    pub jam: u32,
    /// Game-wide jam number the trip started in
    pub total_jam_start: u32,
    /// Tick the skater sat down
    pub entered: Tick,
    /// Jams spanned; `None` while the skater is still seated
    pub duration_in_jams: Option<u32>,
    /// Ticks spent in the box; `None` while the skater is still seated
    pub elapsed: Option<Tick>,
}

impl BoxTrip {
    pub fn is_open(&self) -> bool {
        self.duration_in_jams.is_none()
    }
}

/// Box trips of one team, in the order they started
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoxTrips {
    pub trips: Vec<BoxTrip>,
}

impl State for BoxTrips {
    const NAME: &'static str = "box_trips";
}

impl BoxTrips {
    /// Trips still in progress
    pub fn open(&self) -> impl Iterator<Item = &BoxTrip> {
        self.trips.iter().filter(|t| t.is_open())
    }

    fn open_index(&self, skater: &str) -> Option<usize> {
        self.trips
            .iter()
            .rposition(|t| t.is_open() && t.skater == skater)
    }
}

/// Owns one team's [`BoxTrips`]
pub struct BoxTripsView {
    team: Team,
}

impl BoxTripsView {
    pub fn new(team: Team) -> Self {
        Self { team }
    }
}

reads!(BoxTripsView => GameStage);

impl View<BoutEvent> for BoxTripsView {
    type State = BoxTrips;
    const NAME: &'static str = "box_trips";

    fn key(&self) -> Option<Key> {
        Some(self.team.key())
    }

    fn subscription(&self) -> Subscription {
        Subscription::Kinds(&[kind::SKATER_SAT_IN_BOX, kind::SKATER_RELEASED_FROM_BOX])
    }

    fn on_event(
        &self,
        state: &BoxTrips,
        event: &Event<BoutEvent>,
        reader: &Reader<'_, Self>,
    ) -> Result<Reaction<BoxTrips, BoutEvent>> {
        match &event.body {
            BoutEvent::SkaterSatInBox { team, skater } if *team == self.team => {
                if state.open_index(skater).is_some() {
                    return Ok(Reaction::unchanged());
                }
                let stage = reader.get::<GameStage>()?;
                let mut next = state.clone();
                next.trips.push(BoxTrip {
                    skater: skater.clone(),
                    period: stage.period,
                    jam: stage.jam,
                    total_jam_start: stage.total_jams,
                    entered: event.tick,
                    duration_in_jams: None,
                    elapsed: None,
                });
                Ok(Reaction::replace(next))
            }
            BoutEvent::SkaterReleasedFromBox { team, skater } if *team == self.team => {
                let Some(index) = state.open_index(skater) else {
                    return Ok(Reaction::unchanged());
                };
                let stage = reader.get::<GameStage>()?;
                let mut next = state.clone();
                let trip = &mut next.trips[index];
                trip.duration_in_jams = Some(stage.total_jams.saturating_sub(trip.total_jam_start));
                trip.elapsed = Some(event.tick.since(trip.entered));
                Ok(Reaction::replace(next))
            }
            _ => Ok(Reaction::unchanged()),
        }
    }
}
