//! The event bus: persist, dispatch, drain the implicit-event cascade
//!
//! One bus serves one game. Every submitted event and every tick signal runs
//! to full cascade completion before the call returns:
//!
//! 1. Non-tick events are appended to the log before anything is applied
//! 2. Every view, in registration order, is fed the event's tick (if it is
//!    tick-reactive) and then the event (if it is subscribed)
//! 3. Emitted events are stamped, tagged with the cascade root and queued
//! 4. The FIFO queue is drained layer by layer until empty
//!
//! A cascade that fails part-way leaves earlier writes in place. The bus then
//! refuses further work with [`Error::Poisoned`] until it is rebuilt from the
//! log via [`EventBus::reset`] and [`EventBus::replay`].

use crate::view::{ErasedView, Registered};
use crate::{
    Emission, Error, Event, EventId, EventLog, IdGenerator, Payload, Result, State, StateId,
    StateStore, Tick, View,
};
use std::collections::VecDeque;
use tracing::{debug, error, trace, warn};

/// Bus tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusConfig {
    /// Deepest cascade layer an implicit event may be queued at
    pub max_depth: usize,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self { max_depth: 64 }
    }
}

/// Summary of one processed cascade
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CascadeOutcome {
    /// Root event id, `None` when the input was dropped
    pub root: Option<EventId>,
    /// Events dispatched, root included
    pub processed: usize,
    /// Implicit events produced by views
    pub emitted: usize,
    /// Events appended to the log
    pub persisted: usize,
    /// Deepest layer reached (0 = root only)
    pub depth: usize,
}

impl CascadeOutcome {
    fn started(root: EventId) -> Self {
        Self {
            root: Some(root),
            ..Default::default()
        }
    }

    /// Whether the input was discarded without running a cascade
    pub fn is_dropped(&self) -> bool {
        self.root.is_none()
    }
}

/// Something a tick scheduler can drive forward in time
pub trait TickTarget: Send {
    /// Submit a tick signal for `tick`
    fn advance_to(&mut self, tick: Tick) -> Result<CascadeOutcome>;

    /// The newest tick seen so far
    fn latest_tick(&self) -> Option<Tick>;
}

/// Event bus for one game
pub struct EventBus<E: Payload> {
    views: Vec<Box<dyn ErasedView<E>>>,
    store: StateStore,
    log: Box<dyn EventLog<E>>,
    ids: IdGenerator,
    latest_tick: Option<Tick>,
    config: BusConfig,
    poisoned: bool,
}

impl<E: Payload> EventBus<E> {
    /// Create a bus writing to `log`
    pub fn new(log: impl EventLog<E> + 'static) -> Self {
        Self::with_config(log, BusConfig::default())
    }

    /// Create a bus with explicit tuning
    pub fn with_config(log: impl EventLog<E> + 'static, config: BusConfig) -> Self {
        Self {
            views: Vec::new(),
            store: StateStore::new(),
            log: Box::new(log),
            ids: IdGenerator::new(),
            latest_tick: None,
            config,
            poisoned: false,
        }
    }

    /// Register a view; dispatch order is registration order
    pub fn register<V: View<E>>(&mut self, view: V) -> Result<()> {
        let registered = Registered::new::<E>(view);
        let duplicate = {
            let owns = ErasedView::<E>::owns(&registered);
            self.views
                .iter()
                .any(|v| v.owns() == owns)
                .then(|| owns.1.map(|k| k.to_string()))
        };
        if let Some(key) = duplicate {
            return Err(Error::DuplicateOwner {
                state: <V::State as State>::NAME,
                key,
            });
        }

        debug!(view = V::NAME, state = <V::State as State>::NAME, "registered view");
        self.views.push(Box::new(registered));
        Ok(())
    }

    /// Install an externally supplied singleton slice (e.g. configuration)
    ///
    /// Only slices no view owns may be written this way.
    pub fn configure<S: State>(&mut self, value: S) -> Result<()> {
        let id = StateId::of::<S>();
        if let Some(owner) = self.views.iter().find(|v| v.owns().0 == id) {
            return Err(Error::ForeignWrite {
                owner: owner.name(),
                state: S::NAME,
            });
        }
        debug!(state = S::NAME, "configured state");
        self.store.set(value);
        Ok(())
    }

    /// Submit a domain event that happened at `tick`
    pub fn submit(&mut self, tick: Tick, body: E) -> Result<CascadeOutcome> {
        self.ensure_healthy()?;
        let id = self.ids.issue(tick);
        self.process(Event::new(id, body))
    }

    /// Advance time to `tick`
    ///
    /// A tick older than the newest tick already seen is dropped.
    pub fn tick(&mut self, tick: Tick) -> Result<CascadeOutcome> {
        self.ensure_healthy()?;
        if let Some(latest) = self.latest_tick {
            if tick < latest {
                warn!(%tick, %latest, "dropping regressed tick");
                return Ok(CascadeOutcome::default());
            }
        }
        let id = self.ids.issue(tick);
        self.process(Event::tick_signal(id))
    }

    /// Re-apply logged events without appending them again
    ///
    /// Emissions are discarded: whatever the views emitted the first time
    /// is already in the log. Returns the number of events applied.
    pub fn replay(&mut self, events: impl IntoIterator<Item = Event<E>>) -> Result<usize> {
        self.ensure_healthy()?;
        let mut current_root = None;
        let mut applied = 0;

        for event in events {
            let root = event.cascade_root();
            if current_root != Some(root) {
                self.store.begin_cascade();
                current_root = Some(root);
            }
            self.ids.observe(event.id);
            self.observe_tick(event.tick);

            if let Err(err) = self.dispatch(&event) {
                error!(event = %event.id, kind = event.kind(), error = %err, "replay aborted");
                self.poisoned = true;
                return Err(err);
            }
            applied += 1;
        }

        debug!(applied, "replayed events");
        Ok(applied)
    }

    /// Drop every view-owned slice so the log can be replayed from scratch
    ///
    /// Configured slices survive. The id generator keeps counting.
    pub fn reset(&mut self) {
        let owned: Vec<StateId> = self.views.iter().map(|v| v.owns().0).collect();
        self.store.retain(|id| !owned.contains(&id));
        self.latest_tick = None;
        self.poisoned = false;
    }

    /// Replace the whole store with a previously captured one
    pub fn restore(&mut self, store: StateStore, latest_tick: Option<Tick>) {
        self.store = store;
        self.latest_tick = latest_tick;
        self.poisoned = false;
    }

    /// Read-only access to the settled store
    pub fn store(&self) -> &StateStore {
        &self.store
    }

    /// The event log
    pub fn log(&self) -> &dyn EventLog<E> {
        self.log.as_ref()
    }

    /// Mutable access to the event log, for undo
    pub fn log_mut(&mut self) -> &mut dyn EventLog<E> {
        self.log.as_mut()
    }

    /// The newest tick seen so far
    pub fn latest_tick(&self) -> Option<Tick> {
        self.latest_tick
    }

    /// Tuning in effect
    pub fn config(&self) -> &BusConfig {
        &self.config
    }

    /// Whether an aborted cascade left the store unusable
    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    /// Names of registered views in dispatch order
    pub fn view_names(&self) -> Vec<&'static str> {
        self.views.iter().map(|v| v.name()).collect()
    }

    fn ensure_healthy(&self) -> Result<()> {
        if self.poisoned {
            Err(Error::Poisoned)
        } else {
            Ok(())
        }
    }

    fn observe_tick(&mut self, tick: Tick) {
        if self.latest_tick.map_or(true, |latest| tick > latest) {
            self.latest_tick = Some(tick);
        }
    }

    fn process(&mut self, root: Event<E>) -> Result<CascadeOutcome> {
        let mut outcome = CascadeOutcome::started(root.id);
        let root_id = root.id;
        let kind = root.kind();

        match self.cascade(root, &mut outcome) {
            Ok(()) => {
                debug!(
                    root = %root_id,
                    kind,
                    processed = outcome.processed,
                    emitted = outcome.emitted,
                    depth = outcome.depth,
                    "cascade settled"
                );
                Ok(outcome)
            }
            Err(err) => {
                // An unpersisted root changed nothing
                let untouched = matches!(err, Error::Persistence(_)) && outcome.processed == 0;
                if !untouched {
                    self.poisoned = true;
                }
                error!(
                    root = %root_id,
                    kind,
                    processed = outcome.processed,
                    poisoned = self.poisoned,
                    error = %err,
                    "cascade aborted"
                );
                Err(err)
            }
        }
    }

    fn cascade(&mut self, root: Event<E>, outcome: &mut CascadeOutcome) -> Result<()> {
        let attribution = root.as_root();
        // A root that never reached the log must not advance time
        if !root.is_tick_signal() {
            self.log.append(&root)?;
            outcome.persisted += 1;
        }
        self.observe_tick(root.tick);
        self.store.begin_cascade();

        let mut queue = VecDeque::new();
        queue.push_back((root, 0usize));

        while let Some((event, depth)) = queue.pop_front() {
            if depth > 0 && !event.is_tick_signal() {
                self.log.append(&event)?;
                outcome.persisted += 1;
            }

            debug!(event = %event.id, kind = event.kind(), tick = %event.tick, depth, "dispatch");
            let emitted = self.dispatch(&event)?;
            outcome.processed += 1;
            outcome.depth = outcome.depth.max(depth);

            for Emission { at, body } in emitted {
                if depth + 1 > self.config.max_depth {
                    return Err(Error::CascadeOverflow {
                        root: attribution.id,
                        limit: self.config.max_depth,
                    });
                }
                let id = self.ids.issue(at.unwrap_or(event.tick));
                queue.push_back((Event::new(id, body).caused_by(attribution), depth + 1));
                outcome.emitted += 1;
            }
        }

        Ok(())
    }

    fn dispatch(&mut self, event: &Event<E>) -> Result<Vec<Emission<E>>> {
        let kind = event.kind();
        let mut emitted = Vec::new();

        for view in &self.views {
            if view.ticks() {
                trace!(view = view.name(), tick = %event.tick, "feed tick");
                emitted.extend(view.tick(&mut self.store, event.tick)?);
            }
            if view.accepts(kind) {
                trace!(view = view.name(), event = %event.id, kind, "handle event");
                emitted.extend(view.dispatch(&mut self.store, event)?);
            }
        }

        Ok(emitted)
    }
}

impl<E: Payload> TickTarget for EventBus<E> {
    fn advance_to(&mut self, tick: Tick) -> Result<CascadeOutcome> {
        self.tick(tick)
    }

    fn latest_tick(&self) -> Option<Tick> {
        self.latest_tick
    }
}
