//! State store for derived-view slices
//!
//! Slices are stored behind `Arc`, so every write replaces a slice wholesale
//! and snapshots of the whole store are O(number of slices):
//! - The cascade-start cache is an `Arc` copy of the current map
//! - Keyframes taken by a journal are plain clones of the store
//!
//! Access control lives in [`Reader`](crate::Reader); the store itself is
//! unguarded and only reachable by the bus, the configuration collaborator and
//! read-only callers between cascades.

use crate::{Error, Key, Result, State, StateId};
use indexmap::IndexMap;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

type Slice = Arc<dyn Any + Send + Sync>;

#[derive(Clone, Default)]
struct Slot {
    single: Option<Slice>,
    keyed: IndexMap<Key, Slice>,
}

/// Current values of every state slice in one game
#[derive(Clone, Default)]
pub struct StateStore {
    current: IndexMap<StateId, Slot>,
    /// Values as they stood when the current cascade started
    cached: IndexMap<StateId, Slot>,
}

impl StateStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Current singleton value, or the type's default if never written
    pub fn get<S: State>(&self) -> Result<Arc<S>> {
        read::<S>(&self.current, None)
    }

    /// Current value for `key`, or the type's default if never written
    pub fn get_keyed<S: State>(&self, key: &Key) -> Result<Arc<S>> {
        read::<S>(&self.current, Some(key))
    }

    /// Singleton value at the start of the current cascade
    pub fn get_cached<S: State>(&self) -> Result<Arc<S>> {
        read::<S>(&self.cached, None)
    }

    /// Keyed value at the start of the current cascade
    pub fn get_cached_keyed<S: State>(&self, key: &Key) -> Result<Arc<S>> {
        read::<S>(&self.cached, Some(key))
    }

    /// Replace a singleton slice
    pub fn set<S: State>(&mut self, value: S) {
        self.write(None, value);
    }

    /// Replace the slice stored under `key`
    pub fn set_keyed<S: State>(&mut self, key: Key, value: S) {
        self.write(Some(&key), value);
    }

    /// Keys written so far for a keyed state type
    pub fn keys<S: State>(&self) -> Vec<Key> {
        self.current
            .get(&StateId::of::<S>())
            .map(|slot| slot.keyed.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Whether a value has been written for `S` (under `key`, if given)
    pub fn contains<S: State>(&self, key: Option<&Key>) -> bool {
        self.current
            .get(&StateId::of::<S>())
            .map(|slot| match key {
                None => slot.single.is_some(),
                Some(k) => slot.keyed.contains_key(k),
            })
            .unwrap_or(false)
    }

    /// Number of state types with at least one written value
    pub fn len(&self) -> usize {
        self.current.len()
    }

    /// Whether nothing has been written yet
    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    /// Freeze the current values as the cascade-start snapshot
    pub fn begin_cascade(&mut self) {
        self.cached = self.current.clone();
    }

    /// Drop every slice whose state type fails `keep`
    pub fn retain(&mut self, mut keep: impl FnMut(StateId) -> bool) {
        self.current.retain(|id, _| keep(*id));
        self.cached.retain(|id, _| keep(*id));
    }

    pub(crate) fn slice<S: State>(&self, key: Option<&Key>) -> Result<Arc<S>> {
        read::<S>(&self.current, key)
    }

    pub(crate) fn write<S: State>(&mut self, key: Option<&Key>, value: S) {
        let slice: Slice = Arc::new(value);
        let slot = self.current.entry(StateId::of::<S>()).or_default();
        match key {
            None => slot.single = Some(slice),
            Some(k) => {
                slot.keyed.insert(k.clone(), slice);
            }
        }
    }
}

fn read<S: State>(slots: &IndexMap<StateId, Slot>, key: Option<&Key>) -> Result<Arc<S>> {
    let slice = slots
        .get(&StateId::of::<S>())
        .and_then(|slot| match key {
            None => slot.single.as_ref(),
            Some(k) => slot.keyed.get(k),
        });

    match slice {
        None => Ok(Arc::new(S::default())),
        Some(slice) => Arc::clone(slice)
            .downcast::<S>()
            .map_err(|_| Error::StateTypeMismatch(S::NAME)),
    }
}

impl fmt::Debug for StateStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (id, slot) in &self.current {
            map.entry(&id.name(), &(slot.single.is_some(), slot.keyed.len()));
        }
        map.finish()
    }
}
