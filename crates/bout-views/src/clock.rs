//! Clock views
//!
//! Every clock keeps a [`Stopwatch`]. Expiring clocks (jam, period,
//! intermission) never just flip a flag when their duration runs out: they
//! emit the same domain event a user would submit, stamped at the exact tick
//! the duration was reached, so everything downstream sees one event type and
//! one cascade path however the clock stopped.

use crate::event::kind;
use crate::stage::{GameStage, Stage};
use crate::{BoutEvent, Ruleset, TimeoutKind};
use bout_core::{reads, Event, Reaction, Reader, Result, State, Subscription, Tick, View};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Running/stopped time accumulator
///
/// `passed` only ever grows while the watch runs, so an older tick fed after
/// a newer one never moves it back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stopwatch {
    pub running: bool,
    /// Tick of the most recent start
    pub last_start: Tick,
    /// `passed` as it stood at that start
    pub passed_at_last_start: Tick,
    /// Time run so far
    pub passed: Tick,
}

impl Stopwatch {
    /// A fresh watch running from `tick`
    pub fn started(tick: Tick) -> Self {
        Self {
            running: true,
            last_start: tick,
            passed_at_last_start: Tick::ZERO,
            passed: Tick::ZERO,
        }
    }

    /// Resume from the time already passed
    pub fn start(self, tick: Tick) -> Self {
        if self.running {
            return self;
        }
        Self {
            running: true,
            last_start: tick,
            passed_at_last_start: self.passed,
            passed: self.passed,
        }
    }

    /// Stop at `tick`, keeping the time passed so far
    pub fn stop(self, tick: Tick) -> Self {
        Self {
            running: false,
            ..self.advance(tick)
        }
    }

    /// Stop with exactly `duration` passed
    pub fn expire(self, duration: Tick) -> Self {
        Self {
            running: false,
            passed: duration,
            ..self
        }
    }

    /// Bring `passed` up to `tick`; never moves it back
    pub fn advance(self, tick: Tick) -> Self {
        if !self.running {
            return self;
        }
        Self {
            passed: self.passed.max(self.elapsed_at(tick)),
            ..self
        }
    }

    /// Time passed as of `tick`, assuming the watch kept running
    pub fn elapsed_at(&self, tick: Tick) -> Tick {
        tick.since(self.last_start) + self.passed_at_last_start
    }

    /// The tick at which `duration` is (or was) reached
    pub fn reached_at(&self, duration: Tick) -> Tick {
        self.last_start + duration.since(self.passed_at_last_start)
    }

    /// Time left of `duration`
    pub fn remaining(&self, duration: Tick) -> Tick {
        duration - self.passed
    }
}

fn advanced<S: PartialEq>(state: &S, next: S) -> Reaction<S, BoutEvent> {
    if *state == next {
        Reaction::unchanged()
    } else {
        Reaction::replace(next)
    }
}

/// Time of the current (or last) jam
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JamClock {
    pub watch: Stopwatch,
}

impl State for JamClock {
    const NAME: &'static str = "jam_clock";
}

/// Runs for the length of a jam; emits `JamEnded` when the jam times out
pub struct JamClockView;
reads!(JamClockView => Ruleset);

impl View<BoutEvent> for JamClockView {
    type State = JamClock;
    const NAME: &'static str = "jam_clock";

    fn subscription(&self) -> Subscription {
        Subscription::Kinds(&[
            kind::JAM_STARTED,
            kind::JAM_ENDED,
            kind::TIMEOUT_STARTED,
            kind::PERIOD_ENDED,
        ])
    }

    fn ticks(&self) -> bool {
        true
    }

    fn on_event(
        &self,
        state: &JamClock,
        event: &Event<BoutEvent>,
        _: &Reader<'_, Self>,
    ) -> Result<Reaction<JamClock, BoutEvent>> {
        let running = state.watch.running;
        Ok(match event.body {
            BoutEvent::JamStarted if !running => Reaction::replace(JamClock {
                watch: Stopwatch::started(event.tick),
            }),
            // A period called off mid-jam takes the jam with it
            BoutEvent::JamEnded | BoutEvent::PeriodEnded if running => {
                Reaction::replace(JamClock {
                    watch: state.watch.stop(event.tick),
                })
            }
            // Officials calling a timeout end the jam in progress
            BoutEvent::TimeoutStarted { .. } if running => {
                Reaction::unchanged().emit(BoutEvent::JamEnded)
            }
            _ => Reaction::unchanged(),
        })
    }

    fn on_tick(
        &self,
        state: &JamClock,
        tick: Tick,
        reader: &Reader<'_, Self>,
    ) -> Result<Reaction<JamClock, BoutEvent>> {
        if !state.watch.running {
            return Ok(Reaction::unchanged());
        }
        let duration = reader.get::<Ruleset>()?.jam_duration;
        if state.watch.elapsed_at(tick) >= duration {
            let at = state.watch.reached_at(duration);
            debug!(%at, %tick, "jam clock expired");
            return Ok(Reaction::replace(JamClock {
                watch: state.watch.expire(duration),
            })
            .emit_at(at, BoutEvent::JamEnded));
        }
        Ok(advanced(
            state,
            JamClock {
                watch: state.watch.advance(tick),
            },
        ))
    }
}

/// Game time of the current period
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PeriodClock {
    pub watch: Stopwatch,
    /// The period's time has run out
    pub expired: bool,
    /// `PeriodEnded` has been emitted or received for this period
    pub announced: bool,
}

impl State for PeriodClock {
    const NAME: &'static str = "period_clock";
}

/// Runs through jams and lineups; the period ends once time is up and no
/// jam is running
pub struct PeriodClockView;
reads!(PeriodClockView => Ruleset, JamClock);

impl View<BoutEvent> for PeriodClockView {
    type State = PeriodClock;
    const NAME: &'static str = "period_clock";

    fn subscription(&self) -> Subscription {
        Subscription::Kinds(&[
            kind::JAM_STARTED,
            kind::JAM_ENDED,
            kind::TIMEOUT_STARTED,
            kind::PERIOD_ENDED,
        ])
    }

    fn ticks(&self) -> bool {
        true
    }

    fn on_event(
        &self,
        state: &PeriodClock,
        event: &Event<BoutEvent>,
        reader: &Reader<'_, Self>,
    ) -> Result<Reaction<PeriodClock, BoutEvent>> {
        let tick = event.tick;
        let reaction = match event.body {
            BoutEvent::JamStarted if state.expired => Reaction::replace(PeriodClock {
                watch: Stopwatch::started(tick),
                expired: false,
                announced: false,
            }),
            BoutEvent::JamStarted if !state.watch.running => Reaction::replace(PeriodClock {
                watch: state.watch.start(tick),
                ..state.clone()
            }),
            // Time ran out mid-jam; the period ends with the jam
            BoutEvent::JamEnded if state.expired && !state.announced => {
                Reaction::replace(PeriodClock {
                    announced: true,
                    ..state.clone()
                })
                .emit(BoutEvent::PeriodEnded)
            }
            BoutEvent::TimeoutStarted { .. } if state.watch.running => {
                if reader.get::<Ruleset>()?.timeouts_stop_period_clock {
                    Reaction::replace(PeriodClock {
                        watch: state.watch.stop(tick),
                        ..state.clone()
                    })
                } else {
                    Reaction::unchanged()
                }
            }
            BoutEvent::PeriodEnded if !state.announced => Reaction::replace(PeriodClock {
                watch: state.watch.stop(tick),
                expired: true,
                announced: true,
            }),
            _ => Reaction::unchanged(),
        };
        Ok(reaction)
    }

    fn on_tick(
        &self,
        state: &PeriodClock,
        tick: Tick,
        reader: &Reader<'_, Self>,
    ) -> Result<Reaction<PeriodClock, BoutEvent>> {
        if !state.watch.running {
            return Ok(Reaction::unchanged());
        }
        let duration = reader.get::<Ruleset>()?.period_duration;
        if state.watch.elapsed_at(tick) < duration {
            return Ok(advanced(
                state,
                PeriodClock {
                    watch: state.watch.advance(tick),
                    ..state.clone()
                },
            ));
        }

        let at = state.watch.reached_at(duration);
        let jam_running = reader.get::<JamClock>()?.watch.running;
        debug!(%at, %tick, jam_running, "period clock expired");
        let next = PeriodClock {
            watch: state.watch.expire(duration),
            expired: true,
            announced: !jam_running,
        };
        if jam_running {
            Ok(Reaction::replace(next))
        } else {
            Ok(Reaction::replace(next).emit_at(at, BoutEvent::PeriodEnded))
        }
    }
}

/// Length of the current (or last) timeout
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeoutClock {
    pub watch: Stopwatch,
    /// Who the current (or last) timeout is charged to, once known
    pub kind: Option<TimeoutKind>,
}

impl State for TimeoutClock {
    const NAME: &'static str = "timeout_clock";
}

/// Times the current timeout and remembers its type
pub struct TimeoutClockView;
reads!(TimeoutClockView =>);

impl View<BoutEvent> for TimeoutClockView {
    type State = TimeoutClock;
    const NAME: &'static str = "timeout_clock";

    fn subscription(&self) -> Subscription {
        Subscription::Kinds(&[
            kind::TIMEOUT_STARTED,
            kind::TIMEOUT_TYPE_SET,
            kind::TIMEOUT_ENDED,
            kind::JAM_STARTED,
        ])
    }

    fn ticks(&self) -> bool {
        true
    }

    fn on_event(
        &self,
        state: &TimeoutClock,
        event: &Event<BoutEvent>,
        _: &Reader<'_, Self>,
    ) -> Result<Reaction<TimeoutClock, BoutEvent>> {
        let running = state.watch.running;
        Ok(match event.body {
            BoutEvent::TimeoutStarted { kind } if !running => Reaction::replace(TimeoutClock {
                watch: Stopwatch::started(event.tick),
                kind,
            }),
            BoutEvent::TimeoutStarted { kind: Some(kind) } => Reaction::replace(TimeoutClock {
                kind: Some(kind),
                ..state.clone()
            }),
            BoutEvent::TimeoutTypeSet { kind } if state.kind != Some(kind) => {
                Reaction::replace(TimeoutClock {
                    kind: Some(kind),
                    ..state.clone()
                })
            }
            BoutEvent::TimeoutEnded | BoutEvent::JamStarted if running => {
                Reaction::replace(TimeoutClock {
                    watch: state.watch.stop(event.tick),
                    ..state.clone()
                })
            }
            _ => Reaction::unchanged(),
        })
    }

    fn on_tick(
        &self,
        state: &TimeoutClock,
        tick: Tick,
        _: &Reader<'_, Self>,
    ) -> Result<Reaction<TimeoutClock, BoutEvent>> {
        Ok(advanced(
            state,
            TimeoutClock {
                watch: state.watch.advance(tick),
                ..state.clone()
            },
        ))
    }
}

/// Time spent lining up since the last jam
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineupClock {
    pub watch: Stopwatch,
}

impl State for LineupClock {
    const NAME: &'static str = "lineup_clock";
}

/// Runs while the stage is `Lineup`
pub struct LineupClockView;
reads!(LineupClockView => GameStage);

impl View<BoutEvent> for LineupClockView {
    type State = LineupClock;
    const NAME: &'static str = "lineup_clock";

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

    fn ticks(&self) -> bool {
        true
    }

    fn on_event(
        &self,
        state: &LineupClock,
        event: &Event<BoutEvent>,
        reader: &Reader<'_, Self>,
    ) -> Result<Reaction<LineupClock, BoutEvent>> {
        let in_lineup = reader.get::<GameStage>()?.stage == Stage::Lineup;
        let watch = match (in_lineup, state.watch.running) {
            (true, false) => Stopwatch::started(event.tick),
            (false, true) => state.watch.stop(event.tick),
            _ => return Ok(Reaction::unchanged()),
        };
        Ok(Reaction::replace(LineupClock { watch }))
    }

    fn on_tick(
        &self,
        state: &LineupClock,
        tick: Tick,
        _: &Reader<'_, Self>,
    ) -> Result<Reaction<LineupClock, BoutEvent>> {
        Ok(advanced(
            state,
            LineupClock {
                watch: state.watch.advance(tick),
            },
        ))
    }
}

/// Time of the break between periods
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IntermissionClock {
    pub watch: Stopwatch,
    /// This intermission already ran out or was ended by officials
    pub expired: bool,
}

impl State for IntermissionClock {
    const NAME: &'static str = "intermission_clock";
}

/// Runs while the stage is `Intermission`; emits `IntermissionEnded` when
/// the break is over
pub struct IntermissionClockView;
reads!(IntermissionClockView => GameStage, Ruleset);

impl View<BoutEvent> for IntermissionClockView {
    type State = IntermissionClock;
    const NAME: &'static str = "intermission_clock";

    fn subscription(&self) -> Subscription {
        Subscription::Kinds(&[
            kind::JAM_STARTED,
            kind::JAM_ENDED,
            kind::PERIOD_ENDED,
            kind::INTERMISSION_ENDED,
            kind::TIMEOUT_STARTED,
            kind::TIMEOUT_ENDED,
        ])
    }

    fn ticks(&self) -> bool {
        true
    }

    fn on_event(
        &self,
        state: &IntermissionClock,
        event: &Event<BoutEvent>,
        reader: &Reader<'_, Self>,
    ) -> Result<Reaction<IntermissionClock, BoutEvent>> {
        if let BoutEvent::IntermissionEnded = event.body {
            return Ok(advanced(
                state,
                IntermissionClock {
                    watch: state.watch.stop(event.tick),
                    expired: true,
                },
            ));
        }

        let in_intermission = reader.get::<GameStage>()?.stage == Stage::Intermission;
        let next = if in_intermission {
            if state.watch.running || state.expired {
                return Ok(Reaction::unchanged());
            }
            // Back from a timeout taken during the break
            let watch = match event.body {
                BoutEvent::TimeoutEnded => state.watch.start(event.tick),
                _ => Stopwatch::started(event.tick),
            };
            IntermissionClock {
                watch,
                expired: false,
            }
        } else {
            IntermissionClock {
                watch: state.watch.stop(event.tick),
                expired: false,
            }
        };
        Ok(advanced(state, next))
    }

    fn on_tick(
        &self,
        state: &IntermissionClock,
        tick: Tick,
        reader: &Reader<'_, Self>,
    ) -> Result<Reaction<IntermissionClock, BoutEvent>> {
        if !state.watch.running {
            return Ok(Reaction::unchanged());
        }
        let duration = reader.get::<Ruleset>()?.intermission_duration;
        if state.watch.elapsed_at(tick) >= duration {
            let at = state.watch.reached_at(duration);
            debug!(%at, %tick, "intermission clock expired");
            return Ok(Reaction::replace(IntermissionClock {
                watch: state.watch.expire(duration),
                expired: true,
            })
            .emit_at(at, BoutEvent::IntermissionEnded));
        }
        Ok(advanced(
            state,
            IntermissionClock {
                watch: state.watch.advance(tick),
                ..state.clone()
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bout_core::{EventBus, EventLog, MemoryLog};

    #[test]
    fn test_stopwatch_accumulates_across_restarts() {
        let watch = Stopwatch::started(Tick(1_000)).stop(Tick(4_000));
        assert_eq!(watch.passed, Tick(3_000));
        assert!(!watch.running);

        let watch = watch.start(Tick(10_000)).advance(Tick(12_500));
        assert_eq!(watch.passed, Tick(5_500));
        assert_eq!(watch.passed_at_last_start, Tick(3_000));
        assert_eq!(watch.remaining(Tick(6_000)), Tick(500));
    }

    #[test]
    fn test_stopwatch_never_regresses() {
        let watch = Stopwatch::started(Tick(0)).advance(Tick(9_000));
        let older = watch.advance(Tick(4_000));
        assert_eq!(older.passed, Tick(9_000));
        assert_eq!(watch.stop(Tick(2_000)).passed, Tick(9_000));
    }

    #[test]
    fn test_stopwatch_reached_at() {
        let watch = Stopwatch::started(Tick(0)).stop(Tick(30_000)).start(Tick(50_000));
        // 90s remain after the restart at 50s
        assert_eq!(watch.reached_at(Tick(120_000)), Tick(140_000));
        assert_eq!(watch.elapsed_at(Tick(140_000)), Tick(120_000));
    }

    #[test]
    fn test_stopped_watch_ignores_ticks() {
        let watch = Stopwatch::default();
        assert_eq!(watch.advance(Tick(5_000)), watch);
        assert_eq!(watch.start(Tick(5_000)).passed, Tick::ZERO);
    }

    #[test]
    fn test_period_end_stops_running_jam() {
        let mut bus = EventBus::new(MemoryLog::new());
        bus.register(JamClockView).unwrap();
        bus.configure(Ruleset::default()).unwrap();

        bus.submit(Tick(0), BoutEvent::JamStarted).unwrap();
        bus.submit(Tick(10_000), BoutEvent::PeriodEnded).unwrap();
        let clock = bus.store().get::<JamClock>().unwrap();
        assert!(!clock.watch.running);
        assert_eq!(clock.watch.passed, Tick(10_000));

        // The jam's own duration passing later ends nothing
        let outcome = bus.tick(Tick(130_000)).unwrap();
        assert_eq!(outcome.emitted, 0);
        assert_eq!(bus.log().len().unwrap(), 2);
    }
}
