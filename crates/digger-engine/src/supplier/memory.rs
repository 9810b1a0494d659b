//! Supplier backed by an in-memory store

use digger_nestedset::Skeleton;
use digger_tree::{match_step, Draft, ModelId, Scope, Store, StoreOptions};

use super::{SelectRequest, Supplier};
use crate::EngineError;

/// Runs phases with the tree matcher
#[derive(Debug)]
pub struct MemorySupplier {
    store: Store,
}

impl MemorySupplier {
    pub fn new(options: StoreOptions) -> Self {
        Self {
            store: Store::open(options),
        }
    }

    pub fn from_store(store: Store) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut Store {
        &mut self.store
    }

    pub fn into_store(self) -> Store {
        self.store
    }

    fn skeletons(&self, ids: &[ModelId]) -> Vec<Skeleton> {
        ids.iter().filter_map(|id| self.store.skeleton(*id)).collect()
    }
}

impl Default for MemorySupplier {
    fn default() -> Self {
        Self::new(StoreOptions::default())
    }
}

impl Supplier for MemorySupplier {
    fn name(&self) -> &str {
        "memory"
    }

    fn select(&self, request: &SelectRequest) -> Result<Vec<Skeleton>, EngineError> {
        let matches = if request.context.is_empty() {
            match_step(&self.store, Scope::Forest, request.combinator, &request.phase)
        } else {
            let scope: Vec<ModelId> = request
                .context
                .iter()
                .filter_map(|skeleton| self.store.lookup(&skeleton.diggerid))
                .collect();
            if scope.len() < request.context.len() {
                tracing::debug!(
                    "Skipping {} unknown context model(s)",
                    request.context.len() - scope.len()
                );
            }
            match_step(
                &self.store,
                Scope::Models(&scope),
                request.combinator,
                &request.phase,
            )
        };

        tracing::debug!(
            "[{}] {} over {} context(s): {} match(es)",
            self.name(),
            request.phase,
            request.context.len(),
            matches.len()
        );
        Ok(self.skeletons(&matches))
    }

    fn append(
        &mut self,
        target: Option<&str>,
        drafts: Vec<Draft>,
    ) -> Result<Vec<Skeleton>, EngineError> {
        let parent = match target {
            Some(diggerid) => Some(
                self.store
                    .lookup(diggerid)
                    .ok_or_else(|| EngineError::UnknownTarget(diggerid.to_string()))?,
            ),
            None => None,
        };
        let ids = self.store.append_all(parent, drafts)?;
        tracing::debug!("[{}] Appended {} model(s)", self.name(), ids.len());
        Ok(self.skeletons(&ids))
    }

    fn remove(&mut self, diggerid: &str) -> Result<Vec<String>, EngineError> {
        let id = self
            .store
            .lookup(diggerid)
            .ok_or_else(|| EngineError::UnknownTarget(diggerid.to_string()))?;
        let removed = self.store.remove(id)?;
        tracing::debug!("[{}] Removed {} model(s)", self.name(), removed.len());
        Ok(removed)
    }
}
