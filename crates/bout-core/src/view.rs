//! Views (reducers) and the handles they read state through
//!
//! A view owns exactly one state type, optionally partitioned by a key, and
//! turns events (and, if it asks for them, ticks) into a new slice plus zero
//! or more implicit events. Handlers are pure: everything they may look at is
//! the event, their own slice, and the slices they declared with [`reads!`].
//!
//! # Declared dependencies
//!
//! `reads!` implements [`Reads<S>`] for every listed state type and records
//! the same list for the runtime guard. The typed accessors on [`Reader`]
//! only compile for declared types:
//!
//! ```compile_fail
//! use bout_core::{reads, Event, Payload, Reaction, Reader, Result, State, Subscription, View};
//!
//! #[derive(Debug, Clone, Default)]
//! struct Secret;
//! impl State for Secret { const NAME: &'static str = "secret"; }
//!
//! #[derive(Debug, Clone, Default)]
//! struct Mine;
//! impl State for Mine { const NAME: &'static str = "mine"; }
//!
//! #[derive(Debug, Clone)]
//! struct Body;
//! impl Payload for Body {
//!     fn kind(&self) -> &'static str { "body" }
//!     fn tick_signal() -> Self { Body }
//!     fn is_tick_signal(&self) -> bool { false }
//! }
//!
//! struct Nosy;
//! reads!(Nosy =>);
//!
//! impl View<Body> for Nosy {
//!     type State = Mine;
//!     const NAME: &'static str = "nosy";
//!     fn subscription(&self) -> Subscription { Subscription::All }
//!     fn on_event(&self, _: &Mine, _: &Event<Body>, reader: &Reader<'_, Self>) -> Result<Reaction<Mine, Body>> {
//!         let _ = reader.get::<Secret>()?; // Nosy does not implement Reads<Secret>
//!         Ok(Reaction::unchanged())
//!     }
//! }
//! ```
//!
//! Catch-all observers that cannot name their dependencies statically use the
//! `*_dyn` accessors, which enforce the same list at call time.

use crate::{Error, Event, Key, Payload, Result, State, StateId, StateStore, Tick};
use std::marker::PhantomData;
use std::sync::Arc;

/// Marker: the implementing view declared a read dependency on `S`
pub trait Reads<S: State> {}

/// The full list of state types a view declared
pub trait Dependencies {
    /// Declared read dependencies
    fn dependencies() -> Vec<StateId>;
}

/// Declare the state types a view may read
///
/// ```ignore
/// reads!(StageView => PeriodClock, Ruleset);
/// reads!(JamCounter =>);
/// ```
#[macro_export]
macro_rules! reads {
    ($view:ty => $($state:ty),* $(,)?) => {
        $(impl $crate::Reads<$state> for $view {})*

        impl $crate::Dependencies for $view {
            fn dependencies() -> ::std::vec::Vec<$crate::StateId> {
                ::std::vec![$($crate::StateId::of::<$state>()),*]
            }
        }
    };
}

/// Which events a view's handler is invoked for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subscription {
    /// Only events whose type tag is listed
    Kinds(&'static [&'static str]),
    /// Every event, tick signals included
    All,
}

impl Subscription {
    /// Whether an event with this type tag reaches the handler
    pub fn accepts(&self, kind: &str) -> bool {
        match self {
            Subscription::Kinds(kinds) => kinds.contains(&kind),
            Subscription::All => true,
        }
    }
}

/// An implicit event requested by a handler
#[derive(Debug, Clone, PartialEq)]
pub struct Emission<E> {
    /// Tick to stamp the event with; `None` uses the triggering event's tick
    pub at: Option<Tick>,
    /// Event body
    pub body: E,
}

/// What a handler produced: maybe a replacement slice, maybe implicit events
#[derive(Debug, Clone)]
pub struct Reaction<S, E> {
    state: Option<S>,
    emitted: Vec<Emission<E>>,
}

impl<S, E> Reaction<S, E> {
    /// Leave the slice as it is and emit nothing
    pub fn unchanged() -> Self {
        Self {
            state: None,
            emitted: Vec::new(),
        }
    }

    /// Replace the slice
    pub fn replace(state: S) -> Self {
        Self {
            state: Some(state),
            emitted: Vec::new(),
        }
    }

    /// Emit an implicit event stamped with the triggering event's tick
    pub fn emit(mut self, body: E) -> Self {
        self.emitted.push(Emission { at: None, body });
        self
    }

    /// Emit an implicit event stamped at `tick`
    pub fn emit_at(mut self, tick: Tick, body: E) -> Self {
        self.emitted.push(Emission {
            at: Some(tick),
            body,
        });
        self
    }

    /// The replacement slice, if any
    pub fn state(&self) -> Option<&S> {
        self.state.as_ref()
    }

    /// Implicit events requested so far
    pub fn emitted(&self) -> &[Emission<E>] {
        &self.emitted
    }

    /// True when nothing changes and nothing is emitted
    pub fn is_unchanged(&self) -> bool {
        self.state.is_none() && self.emitted.is_empty()
    }

    /// Split into the replacement slice and the implicit events
    pub fn into_parts(self) -> (Option<S>, Vec<Emission<E>>) {
        (self.state, self.emitted)
    }
}

/// Read handle given to a view's handlers
///
/// Typed accessors require `V: Reads<S>` at compile time; the `*_dyn`
/// accessors check the declared list at call time and fail with
/// [`Error::UndeclaredDependency`].
pub struct Reader<'a, V> {
    store: &'a StateStore,
    view: &'static str,
    allowed: &'a [StateId],
    _view: PhantomData<fn() -> V>,
}

impl<'a, V> Reader<'a, V> {
    pub(crate) fn new(store: &'a StateStore, view: &'static str, allowed: &'a [StateId]) -> Self {
        Self {
            store,
            view,
            allowed,
            _view: PhantomData,
        }
    }

    /// Name of the view holding this reader
    pub fn view(&self) -> &'static str {
        self.view
    }

    /// Current singleton value of a declared dependency
    pub fn get<S: State>(&self) -> Result<Arc<S>>
    where
        V: Reads<S>,
    {
        self.get_dyn::<S>()
    }

    /// Current keyed value of a declared dependency
    pub fn get_keyed<S: State>(&self, key: &Key) -> Result<Arc<S>>
    where
        V: Reads<S>,
    {
        self.get_keyed_dyn::<S>(key)
    }

    /// Singleton value of a declared dependency at cascade start
    pub fn get_cached<S: State>(&self) -> Result<Arc<S>>
    where
        V: Reads<S>,
    {
        self.get_cached_dyn::<S>()
    }

    /// Keyed value of a declared dependency at cascade start
    pub fn get_cached_keyed<S: State>(&self, key: &Key) -> Result<Arc<S>>
    where
        V: Reads<S>,
    {
        self.check::<S>()?;
        self.store.get_cached_keyed::<S>(key)
    }

    /// Keys written so far for a declared keyed dependency
    pub fn keys<S: State>(&self) -> Vec<Key>
    where
        V: Reads<S>,
    {
        self.store.keys::<S>()
    }

    /// Runtime-checked singleton read
    pub fn get_dyn<S: State>(&self) -> Result<Arc<S>> {
        self.check::<S>()?;
        self.store.get::<S>()
    }

    /// Runtime-checked keyed read
    pub fn get_keyed_dyn<S: State>(&self, key: &Key) -> Result<Arc<S>> {
        self.check::<S>()?;
        self.store.get_keyed::<S>(key)
    }

    /// Runtime-checked read of the cascade-start value
    pub fn get_cached_dyn<S: State>(&self) -> Result<Arc<S>> {
        self.check::<S>()?;
        self.store.get_cached::<S>()
    }

    fn check<S: State>(&self) -> Result<()> {
        if self.allowed.contains(&StateId::of::<S>()) {
            Ok(())
        } else {
            Err(Error::UndeclaredDependency {
                view: self.view,
                state: S::NAME,
            })
        }
    }
}

/// A derived view of the game
pub trait View<E: Payload>: Dependencies + Sized + Send + Sync + 'static {
    /// The slice this view owns
    type State: State;

    /// Diagnostic name
    const NAME: &'static str;

    /// Partition key, `None` for singleton views
    fn key(&self) -> Option<Key> {
        None
    }

    /// Event types the handler is invoked for
    fn subscription(&self) -> Subscription;

    /// Whether the view is fed the tick of every dispatched event
    fn ticks(&self) -> bool {
        false
    }

    /// React to one event
    fn on_event(
        &self,
        state: &Self::State,
        event: &Event<E>,
        reader: &Reader<'_, Self>,
    ) -> Result<Reaction<Self::State, E>>;

    /// React to time advancing to `tick`; must be idempotent for a repeated tick
    fn on_tick(
        &self,
        state: &Self::State,
        tick: Tick,
        reader: &Reader<'_, Self>,
    ) -> Result<Reaction<Self::State, E>> {
        let _ = (state, tick, reader);
        Ok(Reaction::unchanged())
    }
}

/// Type-erased registration the bus dispatches through
pub(crate) trait ErasedView<E>: Send + Sync {
    fn name(&self) -> &'static str;
    fn owns(&self) -> (StateId, Option<&Key>);
    fn ticks(&self) -> bool;
    fn accepts(&self, kind: &str) -> bool;
    fn tick(&self, store: &mut StateStore, tick: Tick) -> Result<Vec<Emission<E>>>;
    fn dispatch(&self, store: &mut StateStore, event: &Event<E>) -> Result<Vec<Emission<E>>>;
}

pub(crate) struct Registered<V> {
    view: V,
    key: Option<Key>,
    subscription: Subscription,
    ticks: bool,
    allowed: Vec<StateId>,
}

impl<V> Registered<V> {
    pub(crate) fn new<E: Payload>(view: V) -> Self
    where
        V: View<E>,
    {
        let mut allowed = V::dependencies();
        // A view may always look at its own cascade-start value
        allowed.push(StateId::of::<V::State>());
        Self {
            key: view.key(),
            subscription: view.subscription(),
            ticks: view.ticks(),
            view,
            allowed,
        }
    }

    fn commit<E: Payload>(
        &self,
        store: &mut StateStore,
        reaction: Reaction<V::State, E>,
    ) -> Vec<Emission<E>>
    where
        V: View<E>,
    {
        let (state, emitted) = reaction.into_parts();
        if let Some(state) = state {
            store.write(self.key.as_ref(), state);
        }
        emitted
    }
}

impl<E: Payload, V: View<E>> ErasedView<E> for Registered<V> {
    fn name(&self) -> &'static str {
        V::NAME
    }

    fn owns(&self) -> (StateId, Option<&Key>) {
        (StateId::of::<V::State>(), self.key.as_ref())
    }

    fn ticks(&self) -> bool {
        self.ticks
    }

    fn accepts(&self, kind: &str) -> bool {
        self.subscription.accepts(kind)
    }

    fn tick(&self, store: &mut StateStore, tick: Tick) -> Result<Vec<Emission<E>>> {
        let current = store.slice::<V::State>(self.key.as_ref())?;
        let reaction = {
            let reader = Reader::new(store, V::NAME, &self.allowed);
            self.view.on_tick(&current, tick, &reader)?
        };
        Ok(self.commit(store, reaction))
    }

    fn dispatch(&self, store: &mut StateStore, event: &Event<E>) -> Result<Vec<Emission<E>>> {
        let current = store.slice::<V::State>(self.key.as_ref())?;
        let reaction = {
            let reader = Reader::new(store, V::NAME, &self.allowed);
            self.view.on_event(&current, event, &reader)?
        };
        Ok(self.commit(store, reaction))
    }
}
