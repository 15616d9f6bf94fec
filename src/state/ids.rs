/// Entity identifiers for the two linked frontiers
///
/// Both ID types are opaque strings compared by exact value. Keeping them as
/// distinct newtypes stops an account ID from ever landing in the match frontier.
use std::fmt;

/// The two entity kinds the crawler alternates between
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Account,
    Match,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Account => write!(f, "account"),
            Self::Match => write!(f, "match"),
        }
    }
}

/// An identifier that can be tracked by a [`Frontier`](super::Frontier)
pub trait EntityId: Clone + Eq + std::hash::Hash + fmt::Display {
    /// Which frontier this ID belongs to
    const KIND: EntityKind;

    /// Borrows the raw identifier
    fn as_str(&self) -> &str;
}

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident, $kind:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }
        }

        impl EntityId for $name {
            const KIND: EntityKind = $kind;

            fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }
    };
}

entity_id!(
    /// Identifier of a player account
    AccountId,
    EntityKind::Account
);

entity_id!(
    /// Identifier of a single match (the upstream `gameId`)
    MatchId,
    EntityKind::Match
);
