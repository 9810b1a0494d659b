//! In-memory selector matching
//!
//! Legs run as a pipeline: each leg's result is the scope of the next. Within
//! a leg, the head phase searches every model below the scope, and each later
//! phase searches either the direct children (`>`) or the whole subtree
//! (whitespace) of the previous phase's matches. Every phase result is
//! deduplicated and put in document order before its pseudo-modifier runs.

use std::collections::HashSet;

use digger_selector::{Combinator, Leg, Phase, Selector};

use crate::model::Model;
use crate::store::Store;
use crate::ModelId;

/// Where a search starts
#[derive(Debug, Clone, Copy)]
pub enum Scope<'a> {
    /// Implicit root above the top-level models
    Forest,
    Models(&'a [ModelId]),
}

/// Run a full selector.
pub fn select(store: &Store, scope: Scope<'_>, selector: &Selector) -> Vec<ModelId> {
    let mut legs = selector.legs.iter();
    let Some(first) = legs.next() else {
        return Vec::new();
    };

    let mut results = run_leg(store, scope, first);
    for leg in legs {
        if results.is_empty() {
            break;
        }
        results = run_leg(store, Scope::Models(&results), leg);
    }

    tracing::trace!("Selector {} matched {} model(s)", selector, results.len());
    results
}

fn run_leg(store: &Store, scope: Scope<'_>, leg: &Leg) -> Vec<ModelId> {
    let mut matches = Vec::new();
    for (i, (combinator, phase)) in leg.steps().enumerate() {
        if i > 0 && matches.is_empty() {
            break;
        }
        let from = if i == 0 { scope } else { Scope::Models(&matches) };
        matches = match_step(store, from, combinator, phase);
    }
    matches
}

/// Match one phase reached from `from` through `combinator`.
pub fn match_step(
    store: &Store,
    from: Scope<'_>,
    combinator: Combinator,
    phase: &Phase,
) -> Vec<ModelId> {
    let candidates = match (from, combinator) {
        (Scope::Forest, Combinator::Child) => store.roots().to_vec(),
        (Scope::Forest, Combinator::Descendant) => store.walk(),
        (Scope::Models(ids), Combinator::Child) => ids
            .iter()
            .flat_map(|id| store.children(*id).iter().copied())
            .collect(),
        (Scope::Models(ids), Combinator::Descendant) => {
            ids.iter().flat_map(|id| store.descendants(*id)).collect()
        }
    };

    let mut seen = HashSet::with_capacity(candidates.len());
    let mut matched: Vec<(ModelId, &Model)> = candidates
        .into_iter()
        .filter(|id| seen.insert(*id))
        .filter_map(|id| store.get(id).map(|model| (id, model)))
        .filter(|(_, model)| matches_phase(model, phase))
        .collect();

    sort_document_order(&mut matched);

    let ids: Vec<ModelId> = matched.into_iter().map(|(id, _)| id).collect();
    match phase.modifier {
        Some(modifier) => modifier.apply(ids),
        None => ids,
    }
}

/// Pre-order, left to right: ascending left boundary, shallower first on a
/// shared boundary.
pub(crate) fn sort_document_order(models: &mut [(ModelId, &Model)]) {
    models.sort_by(|(_, a), (_, b)| {
        a.span()
            .left
            .cmp(&b.span().left)
            .then_with(|| a.depth().cmp(&b.depth()))
    });
}

/// Evaluate every condition of a phase against one model.
pub fn matches_phase(model: &Model, phase: &Phase) -> bool {
    if let Some(tag) = phase.tag.as_deref() {
        if tag != "*" && tag != model.tag() {
            return false;
        }
    }
    if let Some(id) = phase.id.as_deref() {
        if model.id() != Some(id) {
            return false;
        }
    }
    if let Some(diggerid) = phase.diggerid.as_deref() {
        if model.diggerid() != diggerid {
            return false;
        }
    }
    if !phase.classes.iter().all(|class| model.has_class(class)) {
        return false;
    }
    phase.attrs.iter().all(|predicate| {
        model
            .attr(&predicate.field)
            .is_some_and(|value| value.compare(predicate.operator, &predicate.value))
    })
}
