//! Supplier backed by a flat nested-set table
//!
//! Records carry no child pointers. Every select is answered by compiling
//! the phase to a [`Query`] and scanning the table with it, the way a
//! database holding the same columns would.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use digger_nestedset::{
    compile_step, EncodingFormat, Position, Predicate, Query, SiblingPath, Skeleton, Span,
    FIELD_CLASS, FIELD_DIGGERID, FIELD_ID, FIELD_LEFT, FIELD_PARENTID, FIELD_RIGHT, FIELD_TAG,
};
use digger_selector::{Combinator, Literal, Operator};
use digger_tree::{Draft, StoreOptions, Value};

use super::{SelectRequest, Supplier};
use crate::EngineError;

/// One row of the table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub diggerid: String,
    pub parentid: Option<String>,
    pub tag: String,
    pub id: Option<String>,
    pub class: Vec<String>,
    pub path: SiblingPath,
    pub left: Position,
    pub right: Position,
    pub attrs: Value,
}

impl Record {
    pub fn span(&self) -> Span {
        Span {
            left: self.left.clone(),
            right: self.right.clone(),
        }
    }

    pub fn skeleton(&self) -> Skeleton {
        Skeleton::from_span(
            self.diggerid.as_str(),
            self.tag.as_str(),
            &self.span(),
            self.class.clone(),
        )
    }

    /// Evaluate one flat predicate against this row.
    pub fn satisfies(&self, predicate: &Predicate) -> bool {
        let operator = predicate.operator;
        let value = &predicate.value;
        match predicate.field.as_str() {
            FIELD_TAG => compare_text(Some(self.tag.as_str()), operator, value),
            FIELD_ID => compare_text(self.id.as_deref(), operator, value),
            FIELD_DIGGERID => compare_text(Some(self.diggerid.as_str()), operator, value),
            FIELD_PARENTID => compare_text(self.parentid.as_deref(), operator, value),
            FIELD_CLASS => self
                .class
                .iter()
                .any(|class| compare_text(Some(class.as_str()), operator, value)),
            FIELD_LEFT => compare_position(&self.left, operator, value),
            FIELD_RIGHT => compare_position(&self.right, operator, value),
            path => self
                .attrs
                .get_path(path)
                .is_some_and(|attr| attr.compare(operator, value)),
        }
    }

    /// AND of `search`, then OR across skeleton groups when scoped.
    pub fn satisfies_query(&self, query: &Query) -> bool {
        query.search.iter().all(|p| self.satisfies(p))
            && (!query.is_scoped()
                || query
                    .skeleton
                    .iter()
                    .any(|group| group.iter().all(|p| self.satisfies(p))))
    }
}

fn compare_text(field: Option<&str>, operator: Operator, value: &Literal) -> bool {
    match field {
        Some(text) => Value::from(text).compare(operator, value),
        None => false,
    }
}

/// Positional fields compare encoding strings byte-wise. A numeric literal
/// is compared against the exact rational value.
fn compare_position(position: &Position, operator: Operator, value: &Literal) -> bool {
    let ordering = match value {
        Literal::String(encoding) => position.encoding.as_str().cmp(encoding.as_str()),
        Literal::Number(n) => {
            let exact = position.numerator as f64 / position.denominator as f64;
            match exact.partial_cmp(n) {
                Some(ordering) => ordering,
                None => return false,
            }
        }
    };
    match operator {
        Operator::Eq => ordering == Ordering::Equal,
        Operator::Lt => ordering == Ordering::Less,
        Operator::Gt => ordering == Ordering::Greater,
        Operator::Prefix => position.encoding.starts_with(&value.to_text()),
    }
}

/// Table of records answered through compiled queries
#[derive(Debug, Default)]
pub struct NestedSetSupplier {
    options: StoreOptions,
    records: Vec<Record>,
    next_root: u64,
    next_child: HashMap<String, u64>,
}

impl NestedSetSupplier {
    pub fn new(options: StoreOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn format(&self) -> EncodingFormat {
        self.options.format
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, diggerid: &str) -> Option<&Record> {
        self.records.iter().find(|r| r.diggerid == diggerid)
    }

    /// Compile and run one phase.
    pub fn query(&self, request: &SelectRequest) -> Vec<&Record> {
        let query = compile_step(&request.phase, request.combinator, &request.context);
        let top_level_only = request.context.is_empty() && request.combinator == Combinator::Child;

        let mut matched: Vec<&Record> = self
            .records
            .iter()
            .filter(|r| !top_level_only || r.parentid.is_none())
            .filter(|r| r.satisfies_query(&query))
            .collect();

        matched.sort_by(|a, b| {
            a.left
                .encoding
                .cmp(&b.left.encoding)
                .then_with(|| a.left.cmp(&b.left))
                .then_with(|| a.path.depth().cmp(&b.path.depth()))
        });

        match query.modifier {
            Some(modifier) => modifier.apply(matched),
            None => matched,
        }
    }

    fn append_draft(
        &mut self,
        parent: Option<(&str, &SiblingPath)>,
        draft: Draft,
    ) -> Result<Skeleton, EngineError> {
        let path = match parent {
            Some((parentid, parent_path)) => {
                let first = self.options.first_child_index;
                let index = *self.next_child.get(parentid).unwrap_or(&first);
                parent_path.child(index)
            }
            None => SiblingPath::new(vec![self.next_root])?,
        };
        let span = path.encode_with(self.options.format)?;
        let parent_span = match parent {
            Some((_, parent_path)) => Some(parent_path.encode_with(self.options.format)?),
            None => None,
        };
        span.check_resolved(parent_span.as_ref(), path.depth() - 1)?;

        match parent {
            Some((parentid, _)) => {
                let first = self.options.first_child_index;
                *self.next_child.entry(parentid.to_string()).or_insert(first) += 1;
            }
            None => self.next_root += 1,
        }

        let diggerid = self.fresh_diggerid();
        let record = Record {
            diggerid: diggerid.clone(),
            parentid: parent.map(|(parentid, _)| parentid.to_string()),
            tag: draft.tag,
            id: draft.id,
            class: draft.class,
            path: path.clone(),
            left: span.left,
            right: span.right,
            attrs: if draft.attrs.is_null() {
                Value::map()
            } else {
                draft.attrs
            },
        };
        let skeleton = record.skeleton();
        self.records.push(record);

        for child in draft.children {
            if let Err(err) = self.append_draft(Some((diggerid.as_str(), &path)), child) {
                self.remove(&diggerid)?;
                return Err(err);
            }
        }
        Ok(skeleton)
    }

    fn fresh_diggerid(&self) -> String {
        loop {
            let candidate = format!("{:032x}", fastrand::u128(..));
            if self.get(&candidate).is_none() {
                return candidate;
            }
        }
    }
}

impl Supplier for NestedSetSupplier {
    fn name(&self) -> &str {
        "nestedset"
    }

    fn select(&self, request: &SelectRequest) -> Result<Vec<Skeleton>, EngineError> {
        let matched = self.query(request);
        tracing::debug!(
            "[{}] {} over {} context(s): {} match(es)",
            self.name(),
            request.phase,
            request.context.len(),
            matched.len()
        );
        Ok(matched.into_iter().map(Record::skeleton).collect())
    }

    fn append(
        &mut self,
        target: Option<&str>,
        drafts: Vec<Draft>,
    ) -> Result<Vec<Skeleton>, EngineError> {
        let parent = match target {
            Some(diggerid) => {
                let record = self
                    .get(diggerid)
                    .ok_or_else(|| EngineError::UnknownTarget(diggerid.to_string()))?;
                Some((record.diggerid.clone(), record.path.clone()))
            }
            None => None,
        };

        let mut appended = Vec::with_capacity(drafts.len());
        for draft in drafts {
            let parent = parent.as_ref().map(|(id, path)| (id.as_str(), path));
            appended.push(self.append_draft(parent, draft)?);
        }
        tracing::debug!("[{}] Appended {} record tree(s)", self.name(), appended.len());
        Ok(appended)
    }

    fn remove(&mut self, diggerid: &str) -> Result<Vec<String>, EngineError> {
        let span = self
            .get(diggerid)
            .map(Record::span)
            .ok_or_else(|| EngineError::UnknownTarget(diggerid.to_string()))?;

        let mut removed = Vec::new();
        self.records.retain(|record| {
            let doomed = record.diggerid == diggerid || span.contains(&record.span());
            if doomed {
                removed.push(record.diggerid.clone());
            }
            !doomed
        });
        self.next_child.retain(|id, _| !removed.contains(id));

        tracing::debug!("[{}] Removed {} record(s)", self.name(), removed.len());
        Ok(removed)
    }
}
