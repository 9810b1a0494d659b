//! Models and drafts

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use digger_nestedset::{SiblingPath, Skeleton, Span};

use crate::value::Value;
use crate::ModelId;

/// One node of the forest, owned by a [`crate::Store`]
#[derive(Debug, Clone)]
pub struct Model {
    pub(crate) diggerid: String,
    pub(crate) tag: String,
    pub(crate) id: Option<String>,
    pub(crate) classes: IndexSet<String>,
    pub(crate) attrs: Value,
    pub(crate) children: Vec<ModelId>,
    pub(crate) parent: Option<ModelId>,
    pub(crate) path: SiblingPath,
    pub(crate) span: Span,
    /// Next sibling index handed to an appended child
    pub(crate) next_child: u64,
}

impl Model {
    /// Globally unique identifier
    pub fn diggerid(&self) -> &str {
        &self.diggerid
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Human identifier
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn classes(&self) -> &IndexSet<String> {
        &self.classes
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.contains(class)
    }

    pub fn attrs(&self) -> &Value {
        &self.attrs
    }

    /// Dotted-path attribute lookup
    pub fn attr(&self, path: &str) -> Option<&Value> {
        self.attrs.get_path(path)
    }

    pub fn children(&self) -> &[ModelId] {
        &self.children
    }

    pub fn parent(&self) -> Option<ModelId> {
        self.parent
    }

    /// Root-to-node sibling indices
    pub fn path(&self) -> &SiblingPath {
        &self.path
    }

    pub fn span(&self) -> &Span {
        &self.span
    }

    pub fn depth(&self) -> usize {
        self.path.depth()
    }

    /// Context projection: identifier, tag, boundaries and classes
    pub fn skeleton(&self) -> Skeleton {
        Skeleton::from_span(
            self.diggerid.as_str(),
            self.tag.as_str(),
            &self.span,
            self.classes.iter().cloned().collect(),
        )
    }

    /// `name: tag#id.class`
    pub fn summary(&self) -> String {
        let mut out = String::new();
        if let Some(name) = self.attr("name").and_then(Value::as_text) {
            out.push_str(&name);
            out.push_str(": ");
        }
        out.push_str(&self.tag);
        if let Some(id) = &self.id {
            out.push('#');
            out.push_str(id);
        }
        for class in &self.classes {
            out.push('.');
            out.push_str(class);
        }
        out
    }
}

/// Owned description of a model (and its subtree) to be appended
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Draft {
    pub tag: String,
    pub id: Option<String>,
    pub class: Vec<String>,
    pub attrs: Value,
    pub children: Vec<Draft>,
}

impl Default for Draft {
    fn default() -> Self {
        Self {
            tag: String::new(),
            id: None,
            class: Vec::new(),
            attrs: Value::map(),
            children: Vec::new(),
        }
    }
}

impl Draft {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        let class = class.into();
        if !self.class.contains(&class) {
            self.class.push(class);
        }
        self
    }

    /// Builder form of [`Value::set_path`]. A rejected list write leaves the
    /// draft unchanged.
    pub fn with_attr(mut self, path: &str, value: impl Into<Value>) -> Self {
        if let Err(err) = self.attrs.set_path(path, value.into()) {
            tracing::warn!("Draft {}: {}", self.tag, err);
        }
        self
    }

    pub fn with_child(mut self, child: Draft) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = Draft>) -> Self {
        self.children.extend(children);
        self
    }

    /// Number of models this draft creates, itself included
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(Draft::size).sum::<usize>()
    }
}
