//! State slice identity

use serde::{Deserialize, Serialize};
use std::any::{Any, TypeId};
use std::fmt::{self, Debug};
use std::hash::{Hash, Hasher};

/// A named, immutable value held in the [`StateStore`](crate::StateStore)
///
/// `Default` supplies the value readers see before the owning view first
/// writes the slice.
pub trait State: Any + Clone + Debug + Default + Send + Sync {
    /// Human-readable name used in diagnostics
    const NAME: &'static str;
}

/// Runtime identity of a state type
#[derive(Debug, Clone, Copy)]
pub struct StateId {
    type_id: TypeId,
    name: &'static str,
}

impl StateId {
    /// Identity of `S`
    pub fn of<S: State>() -> Self {
        Self {
            type_id: TypeId::of::<S>(),
            name: S::NAME,
        }
    }

    /// Diagnostic name
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for StateId {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for StateId {}

impl Hash for StateId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Partition key of a keyed slice (e.g. a team side)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Key(pub String);

impl Key {
    /// Create a key
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Default)]
    struct Alpha;
    impl State for Alpha {
        const NAME: &'static str = "alpha";
    }

    #[derive(Debug, Clone, Default)]
    struct Beta;
    impl State for Beta {
        const NAME: &'static str = "beta";
    }

    #[test]
    fn test_state_id_identity() {
        assert_eq!(StateId::of::<Alpha>(), StateId::of::<Alpha>());
        assert_ne!(StateId::of::<Alpha>(), StateId::of::<Beta>());
        assert_eq!(StateId::of::<Beta>().to_string(), "beta");
    }

    #[test]
    fn test_key() {
        let key = Key::from("home");
        assert_eq!(key.as_str(), "home");
        assert_eq!(format!("{}", key), "home");
    }
}
