//! Logical bout time
//!
//! A `Tick` is the number of milliseconds elapsed since the bout started.
//! Ticks are monotonic per game; arithmetic never wraps below zero.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub};

/// Elapsed bout time in milliseconds
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Tick(pub u64);

impl Tick {
    /// The start of the bout
    pub const ZERO: Tick = Tick(0);

    /// Create a tick from milliseconds
    pub const fn from_millis(ms: u64) -> Self {
        Self(ms)
    }

    /// Create a tick from whole seconds
    pub const fn from_secs(secs: u64) -> Self {
        Self(secs * 1000)
    }

    /// Raw milliseconds
    pub const fn millis(self) -> u64 {
        self.0
    }

    /// Whole seconds, truncated
    pub const fn seconds(self) -> u64 {
        self.0 / 1000
    }

    /// Time elapsed since `earlier`, zero if `earlier` is later than `self`
    pub const fn since(self, earlier: Tick) -> Tick {
        Tick(self.0.saturating_sub(earlier.0))
    }
}

impl Add for Tick {
    type Output = Tick;

    fn add(self, rhs: Tick) -> Tick {
        Tick(self.0.saturating_add(rhs.0))
    }
}

impl Add<u64> for Tick {
    type Output = Tick;

    fn add(self, rhs: u64) -> Tick {
        Tick(self.0.saturating_add(rhs))
    }
}

impl AddAssign for Tick {
    fn add_assign(&mut self, rhs: Tick) {
        *self = *self + rhs;
    }
}

impl Sub for Tick {
    type Output = Tick;

    fn sub(self, rhs: Tick) -> Tick {
        self.since(rhs)
    }
}

impl From<u64> for Tick {
    fn from(ms: u64) -> Self {
        Self(ms)
    }
}

impl fmt::Display for Tick {
    /// Formats as `mm:ss.mmm`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = self.seconds();
        write!(f, "{:02}:{:02}.{:03}", secs / 60, secs % 60, self.0 % 1000)
    }
}
