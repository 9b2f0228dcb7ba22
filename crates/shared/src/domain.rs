use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(BoardId);
id_newtype!(ListId);
id_newtype!(CardId);

/// Placeholder identity for an entity the store has not acknowledged yet.
/// Never sent over the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LocalId(pub u64);

impl fmt::Display for LocalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "local-{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKey<Id> {
    Remote(Id),
    Local(LocalId),
}

impl<Id: Copy> EntityKey<Id> {
    pub fn remote(&self) -> Option<Id> {
        match self {
            Self::Remote(id) => Some(*id),
            Self::Local(_) => None,
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }
}

impl<Id: fmt::Display> fmt::Display for EntityKey<Id> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remote(id) => write!(f, "{id}"),
            Self::Local(local) => write!(f, "{local}"),
        }
    }
}

pub type ListKey = EntityKey<ListId>;
pub type CardKey = EntityKey<CardId>;

/// The board loaded when nothing else is configured.
pub const DEFAULT_BOARD_ID: BoardId = BoardId(1);
