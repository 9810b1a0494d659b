//! digger tree
//!
//! The in-memory side of digger: an explicit [`Store`] owning a forest of
//! [`Model`]s, [`Container`] views over them, and the selector matcher.

mod container;
mod matcher;
mod model;
mod store;
mod value;

pub use container::Container;
pub use matcher::{match_step, matches_phase, select, Scope};
pub use model::{Draft, Model};
pub use store::{Store, StoreOptions};
pub use value::Value;

use digger_nestedset::EncodeError;

/// Model handle (index into the store's arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelId(pub(crate) u32);

impl ModelId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// Store lifecycle and structural errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    #[error("store is closed")]
    Closed,

    #[error("no such model")]
    UnknownModel,

    #[error("no model with that diggerid")]
    UnknownDiggerid,

    #[error("store holds the maximum number of models")]
    CapacityExceeded,

    #[error("list index {index} in attribute path {path:?} is too far past the end ({len} items)")]
    ListIndexOutOfRange {
        path: String,
        index: usize,
        len: usize,
    },

    #[error(transparent)]
    Encode(#[from] EncodeError),
}
