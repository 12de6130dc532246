//! Bout Core - Event-sourcing kernel for live bout tracking
//!
//! This crate provides the domain-free kernel that every derived view of a
//! bout runs on:
//! - Logical time (`Tick`) and time-ordered identifiers (`EventId`)
//! - Immutable event envelopes over a closed payload union (`Event`, `Payload`)
//! - A state store of singleton and keyed slices with declared-dependency
//!   enforcement and a cascade-start cache (`StateStore`)
//! - Views (reducers) that own exactly one state type (`View`)
//! - The event bus that persists, dispatches and drains implicit-event
//!   cascades breadth-first (`EventBus`)
//!
//! ## Processing Model
//!
//! One event is processed to full cascade completion before the next is
//! accepted. Views run in registration order inside every layer of a
//! cascade, so a view reading another view's slice sees the value left by
//! earlier-registered views in the same layer, or the value at cascade start
//! through the cached accessors.
//!
//! ```text
//! submit / tick
//!      │
//!      ▼
//! EventBus ── append ──► EventLog
//!      │
//!      ├─► View 1 (tick, then event) ─► emitted ─┐
//!      ├─► View 2 ...                            │
//!      └─► View N                                │
//!                                                ▼
//!                              FIFO queue (tagged with cascade root)
//! ```

mod bus;
mod error;
mod event;
mod id;
mod log;
mod state;
mod store;
mod tick;
mod view;

pub use bus::{BusConfig, CascadeOutcome, EventBus, TickTarget};
pub use error::{Error, Result};
pub use event::{Event, Payload, Root};
pub use id::{EventId, IdGenerator};
pub use log::{EventLog, MemoryLog};
pub use state::{Key, State, StateId};
pub use store::StateStore;
pub use tick::Tick;
pub use view::{Dependencies, Emission, Reaction, Reader, Reads, Subscription, View};
