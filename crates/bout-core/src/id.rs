//! Time-ordered event identifiers

use crate::{Error, Tick};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of one event within a game
///
/// Ordered by `(tick, seq)`. `seq` comes from the game's [`IdGenerator`] and
/// only ever increases, so two events sharing a tick order by submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EventId {
    tick: Tick,
    seq: u64,
}

impl EventId {
    /// Create an identifier from its parts
    pub const fn new(tick: Tick, seq: u64) -> Self {
        Self { tick, seq }
    }

    /// The tick this identifier was built from
    pub const fn tick(&self) -> Tick {
        self.tick
    }

    /// The uniquifier
    pub const fn seq(&self) -> u64 {
        self.seq
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.tick.millis(), self.seq)
    }
}

impl FromStr for EventId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (tick, seq) = s
            .split_once('-')
            .ok_or_else(|| Error::InvalidEventId(s.to_string()))?;
        let tick = tick
            .parse::<u64>()
            .map_err(|_| Error::InvalidEventId(s.to_string()))?;
        let seq = seq
            .parse::<u64>()
            .map_err(|_| Error::InvalidEventId(s.to_string()))?;
        Ok(Self::new(Tick(tick), seq))
    }
}

/// Hands out event identifiers for one game
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    next_seq: u64,
}

impl IdGenerator {
    /// Create a generator starting at sequence 0
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue the next identifier for an event at `tick`
    pub fn issue(&mut self, tick: Tick) -> EventId {
        let id = EventId::new(tick, self.next_seq);
        self.next_seq += 1;
        id
    }

    /// Make sure identifiers issued from now on never collide with `id`
    ///
    /// Used when replaying a log into a fresh game.
    pub fn observe(&mut self, id: EventId) {
        if id.seq() >= self.next_seq {
            self.next_seq = id.seq() + 1;
        }
    }

    /// The sequence number the next identifier will carry
    pub fn peek(&self) -> u64 {
        self.next_seq
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_round_trip() {
        let mut ids = IdGenerator::new();
        let id = ids.issue(Tick(1234));
        assert_eq!(id.tick(), Tick(1234));
    }

    #[test]
    fn test_order_by_tick_then_submission() {
        let mut ids = IdGenerator::new();
        let a = ids.issue(Tick(500));
        let b = ids.issue(Tick(500));
        let c = ids.issue(Tick(100));

        assert!(a < b);
        // An earlier tick sorts first even when issued later
        assert!(c < a);
    }

    #[test]
    fn test_observe_skips_seen_ids() {
        let mut ids = IdGenerator::new();
        ids.observe(EventId::new(Tick(10), 41));
        assert_eq!(ids.issue(Tick(20)).seq(), 42);

        // Older ids do not move the counter back
        ids.observe(EventId::new(Tick(10), 3));
        assert_eq!(ids.peek(), 43);
    }

    #[test]
    fn test_parse_display() {
        let id = EventId::new(Tick(120_000), 7);
        assert_eq!(id.to_string(), "120000-7");
        assert_eq!("120000-7".parse::<EventId>().unwrap(), id);
        assert!(matches!(
            "garbage".parse::<EventId>(),
            Err(Error::InvalidEventId(_))
        ));
    }
}
