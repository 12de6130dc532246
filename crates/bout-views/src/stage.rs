//! The master phase of the bout
//!
//! `GameStage` is the single source of truth for "what part of the bout is
//! happening now". Other views read it; none re-derive it.

use crate::clock::PeriodClock;
use crate::event::kind;
use crate::{BoutEvent, Ruleset};
use bout_core::{reads, Event, Reaction, Reader, Result, State, Subscription, View};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Phase of the bout
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    #[default]
    BeforeGame,
    Lineup,
    Jam,
    Timeout,
    Intermission,
    AfterGame,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::BeforeGame => "before game",
            Stage::Lineup => "lineup",
            Stage::Jam => "jam",
            Stage::Timeout => "timeout",
            Stage::Intermission => "intermission",
            Stage::AfterGame => "after game",
        };
        f.write_str(name)
    }
}

/// Where the bout stands, with period and jam numbering
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStage {
    pub stage: Stage,
    /// Current period, 1-based; 0 before the first jam
    pub period: u32,
    /// Jam number within the period
    pub jam: u32,
    /// Jams started in the whole game
    pub total_jams: u32,
    /// The current period is over; the next jam opens a new one
    #[serde(default)]
    pub between_periods: bool,
    /// Stage to return to when the running timeout ends
    #[serde(default)]
    pub after_timeout: Option<Stage>,
}

impl State for GameStage {
    const NAME: &'static str = "stage";
}

impl GameStage {
    fn at(&self, stage: Stage) -> Self {
        Self {
            stage,
            ..self.clone()
        }
    }

    fn period_over(&self, rules: &Ruleset) -> Self {
        let stage = if self.period >= rules.periods {
            Stage::AfterGame
        } else {
            Stage::Intermission
        };
        Self {
            between_periods: stage == Stage::Intermission,
            after_timeout: None,
            ..self.at(stage)
        }
    }

    fn timeout(&self) -> Self {
        // A timeout cannot end an intermission or reopen a finished game
        let resume = match self.stage {
            Stage::Intermission | Stage::AfterGame => self.stage,
            _ => Stage::Lineup,
        };
        Self {
            after_timeout: Some(resume),
            ..self.at(Stage::Timeout)
        }
    }

    fn new_period(&self) -> Self {
        Self {
            stage: Stage::Jam,
            period: self.period + 1,
            jam: 1,
            total_jams: self.total_jams + 1,
            between_periods: false,
            after_timeout: None,
        }
    }

    fn timeout_over(&self) -> Self {
        Self {
            after_timeout: None,
            ..self.at(self.after_timeout.unwrap_or(Stage::Lineup))
        }
    }
}

/// Owns [`GameStage`]
pub struct StageView;
reads!(StageView => PeriodClock, Ruleset);

impl View<BoutEvent> for StageView {
    type State = GameStage;
    const NAME: &'static str = "stage";

    fn subscription(&self) -> Subscription {
        Subscription::Kinds(&[
            kind::JAM_STARTED,
            kind::JAM_ENDED,
            kind::TIMEOUT_STARTED,
            kind::TIMEOUT_ENDED,
            kind::PERIOD_ENDED,
            kind::INTERMISSION_ENDED,
        ])
    }

    fn on_event(
        &self,
        state: &GameStage,
        event: &Event<BoutEvent>,
        reader: &Reader<'_, Self>,
    ) -> Result<Reaction<GameStage, BoutEvent>> {
        use Stage::*;

        let next = match (&event.body, state.stage) {
            (BoutEvent::JamStarted, Jam) => None,
            (BoutEvent::JamStarted, BeforeGame) => Some(state.new_period()),
            (BoutEvent::JamStarted, _) if state.between_periods => Some(state.new_period()),
            (BoutEvent::JamStarted, _) => Some(GameStage {
                stage: Jam,
                jam: state.jam + 1,
                total_jams: state.total_jams + 1,
                after_timeout: None,
                ..state.clone()
            }),
            (BoutEvent::JamEnded, Jam) => {
                if reader.get::<PeriodClock>()?.expired {
                    Some(state.period_over(&*reader.get::<Ruleset>()?))
                } else {
                    Some(state.at(Lineup))
                }
            }
            (BoutEvent::TimeoutStarted { .. }, BeforeGame | Timeout) => None,
            (BoutEvent::TimeoutStarted { .. }, _) => Some(state.timeout()),
            (BoutEvent::TimeoutEnded, Timeout) => Some(state.timeout_over()),
            (BoutEvent::PeriodEnded, BeforeGame | Intermission | AfterGame) => None,
            (BoutEvent::PeriodEnded, _) => Some(state.period_over(&*reader.get::<Ruleset>()?)),
            (BoutEvent::IntermissionEnded, Intermission) => Some(state.at(Lineup)),
            // The break ran out while officials were in a timeout
            (BoutEvent::IntermissionEnded, Timeout)
                if state.after_timeout == Some(Intermission) =>
            {
                Some(GameStage {
                    after_timeout: Some(Lineup),
                    ..state.clone()
                })
            }
            _ => None,
        };

        Ok(match next {
            Some(next) if next != *state => Reaction::replace(next),
            _ => Reaction::unchanged(),
        })
    }
}
