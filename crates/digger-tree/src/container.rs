//! Container views
//!
//! A container is an ordered list of model handles borrowed from a
//! [`Store`]. It owns no models and never mutates them.

use digger_nestedset::Skeleton;
use digger_selector::{Selector, SyntaxError};

use crate::matcher::{self, Scope};
use crate::model::Model;
use crate::store::Store;
use crate::value::Value;
use crate::ModelId;

/// Ordered view over models of one store
#[derive(Debug, Clone)]
pub struct Container<'s> {
    store: &'s Store,
    ids: Vec<ModelId>,
}

impl<'s> Container<'s> {
    pub fn new(store: &'s Store, ids: Vec<ModelId>) -> Self {
        Self { store, ids }
    }

    pub fn store(&self) -> &'s Store {
        self.store
    }

    pub fn ids(&self) -> &[ModelId] {
        &self.ids
    }

    pub fn into_ids(self) -> Vec<ModelId> {
        self.ids
    }

    pub fn count(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Model at `index`
    pub fn get(&self, index: usize) -> Option<&'s Model> {
        self.ids.get(index).and_then(|id| self.store.get(*id))
    }

    /// Single-model container at `index` (empty when out of range)
    pub fn eq(&self, index: usize) -> Container<'s> {
        self.derive(self.ids.get(index).copied().into_iter().collect())
    }

    pub fn first(&self) -> Container<'s> {
        self.eq(0)
    }

    pub fn last(&self) -> Container<'s> {
        self.derive(self.ids.last().copied().into_iter().collect())
    }

    /// Direct children of every model, in order
    pub fn children(&self) -> Container<'s> {
        self.derive(
            self.ids
                .iter()
                .flat_map(|id| self.store.children(*id).iter().copied())
                .collect(),
        )
    }

    /// Every model below each model, pre-order
    pub fn descendants(&self) -> Container<'s> {
        self.derive(
            self.ids
                .iter()
                .flat_map(|id| self.store.descendants(*id))
                .collect(),
        )
    }

    pub fn filter(&self, mut keep: impl FnMut(&Model) -> bool) -> Container<'s> {
        self.derive(
            self.ids
                .iter()
                .copied()
                .filter(|id| self.store.get(*id).is_some_and(&mut keep))
                .collect(),
        )
    }

    pub fn map<T>(&self, f: impl FnMut(&'s Model) -> T) -> Vec<T> {
        self.iter().map(f).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'s Model> + '_ {
        let store = self.store;
        self.ids.iter().filter_map(move |id| store.get(*id))
    }

    /// Attribute of the first model
    pub fn attr(&self, path: &str) -> Option<&'s Value> {
        self.get(0).and_then(|model| model.attr(path))
    }

    /// Tag of the first model
    pub fn tag(&self) -> Option<&'s str> {
        self.get(0).map(Model::tag)
    }

    /// Diggerid of the first model
    pub fn diggerid(&self) -> Option<&'s str> {
        self.get(0).map(Model::diggerid)
    }

    /// Whether the first model has this tag
    pub fn is(&self, tag: &str) -> bool {
        self.tag() == Some(tag)
    }

    /// Whether the first model carries this class
    pub fn has_class(&self, class: &str) -> bool {
        self.get(0).is_some_and(|model| model.has_class(class))
    }

    /// Classes of the first model
    pub fn classnames(&self) -> Vec<&'s str> {
        self.get(0)
            .map(|model| model.classes().iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// One skeleton per model
    pub fn skeleton(&self) -> Vec<Skeleton> {
        self.iter().map(Model::skeleton).collect()
    }

    /// Summary of the first model, empty for an empty container
    pub fn summary(&self) -> String {
        self.get(0).map(Model::summary).unwrap_or_default()
    }

    /// Run a selector below the models of this container.
    pub fn select(&self, selector: &Selector) -> Container<'s> {
        self.derive(matcher::select(
            self.store,
            Scope::Models(&self.ids),
            selector,
        ))
    }

    /// Parse and run a selector below the models of this container.
    pub fn find(&self, selector: &str) -> Result<Container<'s>, SyntaxError> {
        Ok(self.select(&digger_selector::parse(selector)?))
    }

    fn derive(&self, ids: Vec<ModelId>) -> Container<'s> {
        Container::new(self.store, ids)
    }
}

impl<'s> IntoIterator for &Container<'s> {
    type Item = &'s Model;
    type IntoIter = std::vec::IntoIter<&'s Model>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter().collect::<Vec<_>>().into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Draft;

    fn catalogue() -> (Store, ModelId) {
        let mut store = Store::default();
        let product = store
            .append(
                None,
                Draft::new("product")
                    .with_attr("price", 100)
                    .with_attr("address.postcode", "apples"),
            )
            .unwrap();
        store
            .append_all(
                Some(product),
                [
                    Draft::new("caption").with_class("apples").with_attr("test", "hello1"),
                    Draft::new("caption").with_class("oranges").with_attr("test", "hello2"),
                ],
            )
            .unwrap();
        (store, product)
    }

    #[test]
    fn test_first_model_accessors() {
        let (store, product) = catalogue();
        let container = store.container(vec![product]);

        assert_eq!(container.count(), 1);
        assert_eq!(container.attr("price"), Some(&Value::Number(100.0)));
        assert_eq!(
            container.attr("address.postcode").and_then(Value::as_str),
            Some("apples")
        );
        assert_eq!(container.tag(), Some("product"));
        assert!(container.is("product"));
        assert!(!container.is("product2"));
        assert_eq!(container.diggerid().map(str::len), Some(32));
    }

    #[test]
    fn test_append_and_find_children() {
        let (store, product) = catalogue();
        let container = store.container(vec![product]);

        assert_eq!(container.children().count(), 2);
        assert_eq!(container.first().tag(), Some("product"));
        assert_eq!(container.find(".apples").unwrap().tag(), Some("caption"));
        assert_eq!(
            container
                .find(".oranges")
                .unwrap()
                .attr("test")
                .and_then(Value::as_str),
            Some("hello2")
        );
    }

    #[test]
    fn test_views_keep_order() {
        let (store, product) = catalogue();
        let children = store.container(vec![product]).children();

        let tests = children.map(|m| m.attr("test").and_then(Value::as_text));
        assert_eq!(tests, vec![Some("hello1".into()), Some("hello2".into())]);

        assert!(children.eq(1).has_class("oranges"));
        assert_eq!(children.last().classnames(), vec!["oranges"]);
        assert!(children.eq(5).is_empty());

        let oranges = children.filter(|m| m.has_class("oranges"));
        assert_eq!(oranges.count(), 1);
        assert_eq!(
            store.root_container().descendants().count(),
            2
        );
        assert_eq!((&children).into_iter().count(), 2);
    }

    #[test]
    fn test_skeleton_and_summary() {
        let mut store = Store::default();
        let id = store
            .append(
                None,
                Draft::new("product")
                    .with_attr("name", "test")
                    .with_class("thing")
                    .with_id("45"),
            )
            .unwrap();
        let container = store.container(vec![id]);
        assert_eq!(container.summary(), "test: product#45.thing");

        let skeleton = container.skeleton();
        assert_eq!(skeleton.len(), 1);
        assert_eq!(skeleton[0].tag, "product");
        assert_eq!(skeleton[0].class, vec!["thing"]);
        assert_eq!(Some(skeleton[0].diggerid.as_str()), container.diggerid());
    }

    #[test]
    fn test_empty_container() {
        let store = Store::default();
        let empty = store.root_container();
        assert!(empty.is_empty());
        assert_eq!(empty.tag(), None);
        assert_eq!(empty.summary(), "");
        assert!(empty.classnames().is_empty());
        assert!(!empty.has_class("x"));
    }
}
