//! Event envelopes

use crate::{EventId, Tick};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// The closed union of event bodies a game understands
///
/// Implemented by the domain's event enum. The kernel only needs the type tag
/// and a way to build and recognise the ephemeral tick signal.
pub trait Payload: Clone + Debug + Send + Sync + 'static {
    /// Stable type tag, e.g. `"jam_started"`
    fn kind(&self) -> &'static str;

    /// The body of a tick pseudo-event
    fn tick_signal() -> Self;

    /// Whether this body is the tick pseudo-event
    fn is_tick_signal(&self) -> bool;

    /// Whether a user may undo the cascade this event belongs to
    fn is_undoable(&self) -> bool {
        false
    }
}

/// Reference from an implicit event to the root of its cascade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Root {
    /// Identifier of the cascade's originating event
    pub id: EventId,
    /// Whether the originating event was a tick pseudo-event
    pub tick_signal: bool,
}

/// An immutable event envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event<E> {
    /// Time-ordered identifier
    pub id: EventId,
    /// When the event happened
    pub tick: Tick,
    /// Cascade root, `None` for events that start a cascade
    pub root: Option<Root>,
    /// Typed body
    pub body: E,
}

impl<E: Payload> Event<E> {
    /// Create a root event; its tick is the identifier's tick
    pub fn new(id: EventId, body: E) -> Self {
        Self {
            id,
            tick: id.tick(),
            root: None,
            body,
        }
    }

    /// Create a tick pseudo-event
    pub fn tick_signal(id: EventId) -> Self {
        Self::new(id, E::tick_signal())
    }

    /// Tag this event as produced inside the cascade started by `root`
    pub fn caused_by(mut self, root: Root) -> Self {
        self.root = Some(root);
        self
    }

    /// Type tag of the body
    pub fn kind(&self) -> &'static str {
        self.body.kind()
    }

    /// Whether this is a tick pseudo-event
    pub fn is_tick_signal(&self) -> bool {
        self.body.is_tick_signal()
    }

    /// Whether this event started its cascade
    pub fn is_root(&self) -> bool {
        self.root.is_none()
    }

    /// Identifier of the event that started this event's cascade
    pub fn cascade_root(&self) -> EventId {
        self.root.map(|r| r.id).unwrap_or(self.id)
    }

    /// Whether the cascade this event belongs to was started by a tick
    pub fn is_tick_driven(&self) -> bool {
        match self.root {
            Some(root) => root.tick_signal,
            None => self.is_tick_signal(),
        }
    }

    /// The `Root` reference implicit events of this cascade should carry
    pub fn as_root(&self) -> Root {
        self.root.unwrap_or(Root {
            id: self.id,
            tick_signal: self.is_tick_signal(),
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Minimal payload used by the kernel's own tests
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub(crate) enum Sample {
        Tick,
        Ping(u32),
        Pong(u32),
        Note(String),
    }

    impl Payload for Sample {
        fn kind(&self) -> &'static str {
            match self {
                Sample::Tick => "tick",
                Sample::Ping(_) => "ping",
                Sample::Pong(_) => "pong",
                Sample::Note(_) => "note",
            }
        }

        fn tick_signal() -> Self {
            Sample::Tick
        }

        fn is_tick_signal(&self) -> bool {
            matches!(self, Sample::Tick)
        }

        fn is_undoable(&self) -> bool {
            !self.is_tick_signal()
        }
    }

    #[test]
    fn test_root_attribution() {
        let root = Event::new(EventId::new(Tick(5), 0), Sample::Ping(1));
        assert!(root.is_root());
        assert_eq!(root.cascade_root(), root.id);

        let child = Event::new(EventId::new(Tick(5), 1), Sample::Pong(1)).caused_by(root.as_root());
        let grandchild =
            Event::new(EventId::new(Tick(5), 2), Sample::Pong(2)).caused_by(child.as_root());

        assert_eq!(child.cascade_root(), root.id);
        assert_eq!(grandchild.cascade_root(), root.id);
        assert!(!grandchild.is_tick_driven());
    }

    #[test]
    fn test_tick_driven() {
        let tick = Event::<Sample>::tick_signal(EventId::new(Tick(9), 0));
        assert!(tick.is_tick_signal());
        assert_eq!(tick.kind(), "tick");

        let child = Event::new(EventId::new(Tick(7), 1), Sample::Ping(0)).caused_by(tick.as_root());
        assert!(child.is_tick_driven());
        // Stamped at its own tick, not the tick that produced it
        assert_eq!(child.tick, Tick(7));
    }

    #[test]
    fn test_ron_envelope() {
        let event = Event::new(EventId::new(Tick(1), 2), Sample::Note("x".into()));
        let text = ron::to_string(&event).unwrap();
        let back: Event<Sample> = ron::from_str(&text).unwrap();
        assert_eq!(back, event);
    }
}
