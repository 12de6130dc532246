//! Per-game append-only event log

use crate::{Event, EventId, Result};

/// Durable, append-only storage for one game's events
///
/// The bus appends every non-tick event before applying it. Removal exists
/// only for undo, which rewrites history and then rebuilds from scratch.
pub trait EventLog<E>: Send {
    /// Durably record one event
    fn append(&mut self, event: &Event<E>) -> Result<()>;

    /// Every recorded event in insertion order
    fn read_all(&self) -> Result<Vec<Event<E>>>;

    /// Remove the events with the given ids, returning how many were removed
    fn remove(&mut self, ids: &[EventId]) -> Result<usize>;

    /// Number of recorded events
    fn len(&self) -> Result<usize> {
        Ok(self.read_all()?.len())
    }

    /// Whether nothing has been recorded
    fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

/// In-memory log for tests and short-lived games
#[derive(Debug, Clone)]
pub struct MemoryLog<E> {
    events: Vec<Event<E>>,
}

impl<E> MemoryLog<E> {
    /// Create an empty log
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Recorded events
    pub fn events(&self) -> &[Event<E>] {
        &self.events
    }
}

impl<E> Default for MemoryLog<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Clone + Send> EventLog<E> for MemoryLog<E> {
    fn append(&mut self, event: &Event<E>) -> Result<()> {
        self.events.push(event.clone());
        Ok(())
    }

    fn read_all(&self) -> Result<Vec<Event<E>>> {
        Ok(self.events.clone())
    }

    fn remove(&mut self, ids: &[EventId]) -> Result<usize> {
        let before = self.events.len();
        self.events.retain(|e| !ids.contains(&e.id));
        Ok(before - self.events.len())
    }

    fn len(&self) -> Result<usize> {
        Ok(self.events.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::tests::Sample;
    use crate::Tick;

    #[test]
    fn test_memory_log_order_and_remove() {
        let mut log = MemoryLog::new();
        let a = Event::new(EventId::new(Tick(1), 0), Sample::Ping(1));
        let b = Event::new(EventId::new(Tick(2), 1), Sample::Ping(2));
        let c = Event::new(EventId::new(Tick(3), 2), Sample::Ping(3));
        for e in [&a, &b, &c] {
            log.append(e).unwrap();
        }

        assert_eq!(log.read_all().unwrap(), vec![a.clone(), b.clone(), c.clone()]);
        assert_eq!(log.remove(&[b.id, EventId::new(Tick(9), 9)]).unwrap(), 1);
        assert_eq!(log.read_all().unwrap(), vec![a, c]);
        assert_eq!(log.len().unwrap(), 2);
    }
}
