//! A bout: the bus wired with every view, plus rebuild and undo

use crate::box_trips::BoxTripsView;
use crate::clock::{
    IntermissionClockView, JamClockView, LineupClockView, PeriodClockView, TimeoutClockView,
};
use crate::error::{Error, Result};
use crate::penalties::PenaltiesView;
use crate::stage::{GameStage, StageView};
use crate::timeline::TimelineView;
use crate::timeouts::TeamTimeoutsView;
use crate::undo::{LastUndoable, UndoEntry, UndoTracker};
use crate::{BoutEvent, Ruleset, SnapshotPolicy, Team};
use bout_core::{
    BusConfig, CascadeOutcome, Event, EventBus, EventId, EventLog, MemoryLog, State, StateStore,
    Tick, TickTarget,
};
use std::sync::Arc;
use tracing::info;

/// One isolated bout
///
/// Every method that changes state runs a full cascade before returning, so
/// the read accessors only ever observe settled state.
pub struct Game {
    bus: EventBus<BoutEvent>,
}

impl Game {
    /// A game with default rules and an in-memory log
    pub fn new() -> Result<Self> {
        Self::with_log(MemoryLog::new())
    }

    /// A game with default rules writing to `log`
    pub fn with_log(log: impl EventLog<BoutEvent> + 'static) -> Result<Self> {
        Self::with_config(log, BusConfig::default())
    }

    /// A game with explicit bus tuning
    pub fn with_config(log: impl EventLog<BoutEvent> + 'static, config: BusConfig) -> Result<Self> {
        let mut bus = EventBus::with_config(log, config);

        // Order matters: readers of a slice come after its owner
        bus.register(JamClockView)?;
        bus.register(PeriodClockView)?;
        bus.register(TimeoutClockView)?;
        for team in Team::ALL {
            bus.register(TeamTimeoutsView::new(team))?;
        }
        bus.register(StageView)?;
        bus.register(LineupClockView)?;
        bus.register(IntermissionClockView)?;
        for team in Team::ALL {
            bus.register(BoxTripsView::new(team))?;
        }
        for team in Team::ALL {
            bus.register(PenaltiesView::new(team))?;
        }
        bus.register(UndoTracker)?;
        bus.register(TimelineView)?;

        bus.configure(Ruleset::default())?;
        bus.configure(SnapshotPolicy::default())?;
        Ok(Self { bus })
    }

    /// Install a ruleset; takes effect from the next cascade
    pub fn configure(&mut self, rules: Ruleset) -> Result<()> {
        info!(?rules, "configured ruleset");
        Ok(self.bus.configure(rules)?)
    }

    /// Install a keyframe policy
    pub fn set_snapshot_policy(&mut self, policy: SnapshotPolicy) -> Result<()> {
        Ok(self.bus.configure(policy)?)
    }

    /// Submit something that happened at `tick`
    pub fn submit(&mut self, tick: Tick, body: BoutEvent) -> Result<CascadeOutcome> {
        Ok(self.run(|bus| bus.submit(tick, body))?)
    }

    /// Advance the clocks to `tick`
    pub fn tick(&mut self, tick: Tick) -> Result<CascadeOutcome> {
        Ok(self.run(|bus| bus.tick(tick))?)
    }

    /// Settled value of a singleton slice
    pub fn state<S: State>(&self) -> Result<Arc<S>> {
        Ok(self.bus.store().get::<S>()?)
    }

    /// Settled value of a per-team slice
    pub fn team<S: State>(&self, team: Team) -> Result<Arc<S>> {
        Ok(self.bus.store().get_keyed::<S>(&team.key())?)
    }

    pub fn stage(&self) -> Result<Arc<GameStage>> {
        self.state::<GameStage>()
    }

    pub fn rules(&self) -> Result<Arc<Ruleset>> {
        self.state::<Ruleset>()
    }

    pub fn snapshot_policy(&self) -> Result<Arc<SnapshotPolicy>> {
        self.state::<SnapshotPolicy>()
    }

    /// The whole store, for exporters and keyframes
    pub fn store(&self) -> &StateStore {
        self.bus.store()
    }

    /// Every logged event in insertion order
    pub fn events(&self) -> Result<Vec<Event<BoutEvent>>> {
        Ok(self.bus.log().read_all()?)
    }

    /// Number of logged events
    pub fn logged(&self) -> Result<usize> {
        Ok(self.bus.log().len()?)
    }

    pub fn latest_tick(&self) -> Option<Tick> {
        self.bus.latest_tick()
    }

    /// Whether an aborted cascade requires [`Game::rebuild`]
    pub fn is_poisoned(&self) -> bool {
        self.bus.is_poisoned()
    }

    /// Throw away derived state and replay the whole log
    ///
    /// Clocks reflect the newest logged event until the next tick arrives.
    pub fn rebuild(&mut self) -> Result<usize> {
        let events = self.events()?;
        self.bus.reset();
        let applied = self.bus.replay(events)?;
        info!(applied, "rebuilt game from log");
        Ok(applied)
    }

    /// Resume from a captured store and replay the events logged after it
    pub fn restore(
        &mut self,
        store: StateStore,
        latest_tick: Option<Tick>,
        tail: Vec<Event<BoutEvent>>,
    ) -> Result<usize> {
        self.bus.restore(store, latest_tick);
        let applied = self.bus.replay(tail)?;
        info!(applied, "restored game from keyframe");
        Ok(applied)
    }

    /// Remove the latest undoable cascade from the log and rebuild
    ///
    /// Repeating the call walks further back: after the rebuild the tracker
    /// holds the previous undoable cascade still in the log.
    pub fn undo(&mut self) -> Result<UndoEntry> {
        let entry = self
            .state::<LastUndoable>()?
            .entry
            .clone()
            .ok_or(Error::NothingToUndo)?;

        let doomed: Vec<EventId> = self
            .events()?
            .iter()
            .filter(|e| e.cascade_root() == entry.root)
            .map(|e| e.id)
            .collect();
        let removed = self.bus.log_mut().remove(&doomed)?;
        info!(root = %entry.root, kind = %entry.kind, removed, "undoing cascade");

        self.rebuild()?;
        Ok(entry)
    }

    fn run(
        &mut self,
        step: impl FnOnce(&mut EventBus<BoutEvent>) -> bout_core::Result<CascadeOutcome>,
    ) -> bout_core::Result<CascadeOutcome> {
        let before = self.bus.store().get::<GameStage>()?;
        let outcome = step(&mut self.bus)?;
        let after = self.bus.store().get::<GameStage>()?;
        if before.stage != after.stage {
            info!(
                from = %before.stage,
                to = %after.stage,
                period = after.period,
                jam = after.jam,
                root = ?outcome.root,
                "stage changed"
            );
        }
        Ok(outcome)
    }
}

impl TickTarget for Game {
    fn advance_to(&mut self, tick: Tick) -> bout_core::Result<CascadeOutcome> {
        self.run(|bus| bus.tick(tick))
    }

    fn latest_tick(&self) -> Option<Tick> {
        self.bus.latest_tick()
    }
}
