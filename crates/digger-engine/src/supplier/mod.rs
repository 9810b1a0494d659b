//! Suppliers
//!
//! A supplier answers one phase at a time: given the skeletons of the
//! previous phase's matches, return the skeletons of the models the phase
//! reaches. Any backend that can do that can serve a full selector through
//! [`crate::Engine`].

mod memory;
mod nestedset;

pub use memory::MemorySupplier;
pub use nestedset::{NestedSetSupplier, Record};

use serde::{Deserialize, Serialize};

use digger_nestedset::Skeleton;
use digger_selector::{Combinator, Phase};
use digger_tree::Draft;

use crate::EngineError;

/// One phase to resolve against a backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectRequest {
    pub phase: Phase,
    /// How the phase is reached from `context`
    #[serde(default)]
    pub combinator: Combinator,
    /// Empty means the whole forest
    #[serde(default)]
    pub context: Vec<Skeleton>,
}

impl SelectRequest {
    pub fn new(phase: Phase, combinator: Combinator, context: Vec<Skeleton>) -> Self {
        Self {
            phase,
            combinator,
            context,
        }
    }

    /// Unscoped request searching the whole forest
    pub fn unscoped(phase: Phase) -> Self {
        Self::new(phase, Combinator::Descendant, Vec::new())
    }
}

/// Storage backend that can resolve phases and take writes
pub trait Supplier {
    /// Short name for logs
    fn name(&self) -> &str;

    /// Resolve one phase; results in document order.
    fn select(&self, request: &SelectRequest) -> Result<Vec<Skeleton>, EngineError>;

    /// Append drafts as the last children of `target`, or at the top level.
    /// Returns skeletons of the appended top models.
    fn append(
        &mut self,
        target: Option<&str>,
        drafts: Vec<Draft>,
    ) -> Result<Vec<Skeleton>, EngineError>;

    /// Remove a model and everything beneath it. Returns removed diggerids.
    fn remove(&mut self, diggerid: &str) -> Result<Vec<String>, EngineError>;
}
