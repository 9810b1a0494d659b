//! Explicit model store
//!
//! Arena of models with an open/close lifecycle. Appending assigns every new
//! model a diggerid, its sibling path and its nested-set span; counters only
//! grow, so removal never renumbers anything that remains.

use std::collections::HashMap;

use digger_nestedset::{EncodingFormat, SiblingPath, Skeleton};
use digger_selector::Selector;

use crate::container::Container;
use crate::matcher::{self, Scope};
use crate::model::{Draft, Model};
use crate::value::Value;
use crate::{ModelId, StoreError};

/// Store settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreOptions {
    pub format: EncodingFormat,
    /// Sibling index of a parent's first child. Values below 1 make a first
    /// child share its parent's left boundary.
    pub first_child_index: u64,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            format: EncodingFormat::default(),
            first_child_index: 1,
        }
    }
}

/// Owner of a forest of models
#[derive(Debug)]
pub struct Store {
    options: StoreOptions,
    open: bool,
    models: Vec<Option<Model>>,
    roots: Vec<ModelId>,
    next_root: u64,
    index: HashMap<String, ModelId>,
}

impl Store {
    /// Open an empty store
    pub fn open(options: StoreOptions) -> Self {
        tracing::debug!(
            "Opening store ({}+{} digit positions, first child index {})",
            options.format.integer_digits,
            options.format.fraction_digits,
            options.first_child_index
        );
        Self {
            options,
            open: true,
            models: Vec::new(),
            roots: Vec::new(),
            next_root: 0,
            index: HashMap::new(),
        }
    }

    /// Close the store. Reads keep working, mutations fail.
    pub fn close(&mut self) {
        if self.open {
            tracing::debug!("Closing store with {} model(s)", self.len());
            self.open = false;
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    /// Number of live models
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn get(&self, id: ModelId) -> Option<&Model> {
        self.models.get(id.index()).and_then(Option::as_ref)
    }

    fn get_mut(&mut self, id: ModelId) -> Result<&mut Model, StoreError> {
        self.models
            .get_mut(id.index())
            .and_then(Option::as_mut)
            .ok_or(StoreError::UnknownModel)
    }

    /// Resolve a diggerid
    pub fn lookup(&self, diggerid: &str) -> Option<ModelId> {
        self.index.get(diggerid).copied()
    }

    /// Top-level models in append order
    pub fn roots(&self) -> &[ModelId] {
        &self.roots
    }

    pub fn children(&self, id: ModelId) -> &[ModelId] {
        self.get(id).map(Model::children).unwrap_or(&[])
    }

    pub fn parent(&self, id: ModelId) -> Option<ModelId> {
        self.get(id).and_then(Model::parent)
    }

    /// Diggerid of a model's parent
    pub fn parent_diggerid(&self, id: ModelId) -> Option<&str> {
        self.parent(id)
            .and_then(|p| self.get(p))
            .map(Model::diggerid)
    }

    /// Every model strictly below `id`, pre-order
    pub fn descendants(&self, id: ModelId) -> Vec<ModelId> {
        let mut out = Vec::new();
        self.collect_subtree(self.children(id), &mut out);
        out
    }

    /// Every model of the forest, pre-order
    pub fn walk(&self) -> Vec<ModelId> {
        let mut out = Vec::with_capacity(self.len());
        self.collect_subtree(&self.roots, &mut out);
        out
    }

    fn collect_subtree(&self, from: &[ModelId], out: &mut Vec<ModelId>) {
        // Explicit stack; children pushed in reverse to pop left to right
        let mut stack: Vec<ModelId> = from.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
    }

    /// True when `ancestor` lies strictly above `id`
    pub fn is_ancestor(&self, ancestor: ModelId, id: ModelId) -> bool {
        let mut current = self.parent(id);
        while let Some(p) = current {
            if p == ancestor {
                return true;
            }
            current = self.parent(p);
        }
        false
    }

    /// Skeleton of one model
    pub fn skeleton(&self, id: ModelId) -> Option<Skeleton> {
        self.get(id).map(Model::skeleton)
    }

    /// Container over the top-level models
    pub fn root_container(&self) -> Container<'_> {
        Container::new(self, self.roots.clone())
    }

    /// Container over explicit models
    pub fn container(&self, ids: Vec<ModelId>) -> Container<'_> {
        Container::new(self, ids)
    }

    /// Run a selector against the whole forest.
    pub fn select(&self, selector: &Selector) -> Container<'_> {
        Container::new(self, matcher::select(self, Scope::Forest, selector))
    }

    /// Parse and run a selector against the whole forest.
    pub fn find(&self, selector: &str) -> Result<Container<'_>, digger_selector::SyntaxError> {
        Ok(self.select(&digger_selector::parse(selector)?))
    }

    /// Append a draft (with its subtree) as the last child of `parent`, or
    /// as a new top-level model.
    pub fn append(&mut self, parent: Option<ModelId>, draft: Draft) -> Result<ModelId, StoreError> {
        if !self.open {
            return Err(StoreError::Closed);
        }
        let Draft {
            tag,
            id,
            class,
            attrs,
            children,
        } = draft;

        let (path, parent_span) = match parent {
            Some(p) => {
                let owner = self.get(p).ok_or(StoreError::UnknownModel)?;
                (owner.path.child(owner.next_child), Some(owner.span.clone()))
            }
            None => (SiblingPath::new(vec![self.next_root])?, None),
        };
        let span = path.encode_with(self.options.format)?;
        span.check_resolved(parent_span.as_ref(), path.depth() - 1)?;
        let model_id = next_model_id(self.models.len())?;

        match parent {
            Some(p) => self.get_mut(p)?.next_child += 1,
            None => self.next_root += 1,
        }

        let diggerid = self.fresh_diggerid();
        let attrs = if attrs.is_null() { Value::map() } else { attrs };

        tracing::trace!("Appending {} {} at {:?}", tag, diggerid, path.indices());

        self.models.push(Some(Model {
            diggerid: diggerid.clone(),
            tag,
            id,
            classes: class.into_iter().collect(),
            attrs,
            children: Vec::new(),
            parent,
            path,
            span,
            next_child: self.options.first_child_index,
        }));
        self.index.insert(diggerid, model_id);

        match parent {
            Some(p) => self.get_mut(p)?.children.push(model_id),
            None => self.roots.push(model_id),
        }

        for child in children {
            if let Err(err) = self.append(Some(model_id), child) {
                self.remove(model_id)?;
                return Err(err);
            }
        }

        Ok(model_id)
    }

    /// Append several drafts in order.
    pub fn append_all(
        &mut self,
        parent: Option<ModelId>,
        drafts: impl IntoIterator<Item = Draft>,
    ) -> Result<Vec<ModelId>, StoreError> {
        drafts
            .into_iter()
            .map(|draft| self.append(parent, draft))
            .collect()
    }

    /// Remove a model and its subtree. Returns the removed diggerids,
    /// pre-order.
    pub fn remove(&mut self, id: ModelId) -> Result<Vec<String>, StoreError> {
        if !self.open {
            return Err(StoreError::Closed);
        }
        let parent = self.get(id).ok_or(StoreError::UnknownModel)?.parent;

        match parent {
            Some(p) => self.get_mut(p)?.children.retain(|c| *c != id),
            None => self.roots.retain(|c| *c != id),
        }

        let mut doomed = vec![id];
        self.collect_subtree(self.children(id), &mut doomed);

        let mut removed = Vec::with_capacity(doomed.len());
        for doomed_id in doomed {
            if let Some(model) = self.models.get_mut(doomed_id.index()).and_then(Option::take) {
                self.index.remove(&model.diggerid);
                removed.push(model.diggerid);
            }
        }

        tracing::debug!("Removed {} model(s)", removed.len());
        Ok(removed)
    }

    /// Remove by diggerid.
    pub fn remove_diggerid(&mut self, diggerid: &str) -> Result<Vec<String>, StoreError> {
        let id = self.lookup(diggerid).ok_or(StoreError::UnknownDiggerid)?;
        self.remove(id)
    }

    /// Set a dotted-path attribute.
    pub fn set_attr(
        &mut self,
        id: ModelId,
        path: &str,
        value: impl Into<Value>,
    ) -> Result<(), StoreError> {
        self.ensure_open()?;
        self.get_mut(id)?.attrs.set_path(path, value.into())
    }

    pub fn add_class(&mut self, id: ModelId, class: &str) -> Result<(), StoreError> {
        self.ensure_open()?;
        self.get_mut(id)?.classes.insert(class.to_string());
        Ok(())
    }

    pub fn remove_class(&mut self, id: ModelId, class: &str) -> Result<(), StoreError> {
        self.ensure_open()?;
        self.get_mut(id)?.classes.shift_remove(class);
        Ok(())
    }

    /// Set (or clear) the human identifier.
    pub fn set_id(&mut self, id: ModelId, value: Option<&str>) -> Result<(), StoreError> {
        self.ensure_open()?;
        self.get_mut(id)?.id = value.map(str::to_string);
        Ok(())
    }

    fn ensure_open(&self) -> Result<(), StoreError> {
        if self.open {
            Ok(())
        } else {
            Err(StoreError::Closed)
        }
    }

    fn fresh_diggerid(&self) -> String {
        loop {
            let candidate = format!("{:032x}", fastrand::u128(..));
            if !self.index.contains_key(&candidate) {
                return candidate;
            }
        }
    }
}

/// Handle for the model stored at arena slot `len`.
fn next_model_id(len: usize) -> Result<ModelId, StoreError> {
    u32::try_from(len)
        .map(ModelId)
        .map_err(|_| StoreError::CapacityExceeded)
}

impl Default for Store {
    fn default() -> Self {
        Self::open(StoreOptions::default())
    }
}
