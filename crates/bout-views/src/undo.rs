//! Latest undoable action

use crate::BoutEvent;
use bout_core::{reads, Event, EventId, Payload, Reaction, Reader, Result, State, Subscription, View};
use serde::{Deserialize, Serialize};

/// The cascade an undo would remove
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UndoEntry {
    /// Id of the root event
    pub root: EventId,
    /// Type name of the root event
    pub kind: String,
}

/// Latest undoable action; each new one replaces the last (not a stack)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastUndoable {
    pub entry: Option<UndoEntry>,
}

impl State for LastUndoable {
    const NAME: &'static str = "last_undoable";
}

/// Catch-all observer recording every undoable root event
///
/// Implicit events are skipped, so the entry names what the user submitted.
/// Cascades started by a tick signal are skipped: a clock running out is not
/// something a user did.
pub struct UndoTracker;
reads!(UndoTracker =>);

impl View<BoutEvent> for UndoTracker {
    type State = LastUndoable;
    const NAME: &'static str = "undo_tracker";

    fn subscription(&self) -> Subscription {
        Subscription::All
    }

    fn on_event(
        &self,
        state: &LastUndoable,
        event: &Event<BoutEvent>,
        _: &Reader<'_, Self>,
    ) -> Result<Reaction<LastUndoable, BoutEvent>> {
        if !event.is_root() || event.is_tick_signal() || !event.body.is_undoable() {
            return Ok(Reaction::unchanged());
        }
        let entry = UndoEntry {
            root: event.id,
            kind: event.kind().to_string(),
        };
        if state.entry.as_ref() == Some(&entry) {
            return Ok(Reaction::unchanged());
        }
        Ok(Reaction::replace(LastUndoable { entry: Some(entry) }))
    }
}
