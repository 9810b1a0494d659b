//! Phase-to-predicate compiler
//!
//! A compiled [`Query`] only names fields, operators and values. Positional
//! context is expressed as span predicates over `_digger.left` and
//! `_digger.right`, so any store with range predicates can answer it.

use serde::{Deserialize, Deserializer, Serialize};

use digger_selector::{
    format_number, AttrPredicate, Combinator, Literal, Operator, Phase, Pseudo,
};

use crate::position::Span;

pub const FIELD_TAG: &str = "_digger.tag";
pub const FIELD_CLASS: &str = "_digger.class";
pub const FIELD_ID: &str = "_digger.id";
pub const FIELD_DIGGERID: &str = "_digger.diggerid";
pub const FIELD_LEFT: &str = "_digger.left";
pub const FIELD_RIGHT: &str = "_digger.right";
pub const FIELD_PARENTID: &str = "_digger.parentid";

/// Flat `{field, operator, value}` condition
pub type Predicate = AttrPredicate;

/// Minimal projection of a model passed as matching context
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skeleton {
    /// Numbers on the wire are read as their decimal text
    #[serde(deserialize_with = "diggerid_from_wire")]
    pub diggerid: String,
    #[serde(default)]
    pub tag: String,
    pub left: Literal,
    pub right: Literal,
    #[serde(default)]
    pub class: Vec<String>,
}

impl Skeleton {
    /// Skeleton whose boundaries are the span's encoding strings.
    pub fn from_span(
        diggerid: impl Into<String>,
        tag: impl Into<String>,
        span: &Span,
        class: Vec<String>,
    ) -> Self {
        Self {
            diggerid: diggerid.into(),
            tag: tag.into(),
            left: Literal::String(span.left.encoding.clone()),
            right: Literal::String(span.right.encoding.clone()),
            class,
        }
    }
}

fn diggerid_from_wire<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Wire {
        Text(String),
        Unsigned(u64),
        Signed(i64),
        Float(f64),
    }

    Ok(match Wire::deserialize(deserializer)? {
        Wire::Text(text) => text,
        Wire::Unsigned(n) => n.to_string(),
        Wire::Signed(n) => n.to_string(),
        Wire::Float(n) => format_number(n),
    })
}

/// Backend-agnostic query for one phase
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Query {
    /// AND-combined phase conditions
    pub search: Vec<Predicate>,
    /// One group per context node, OR-combined; each group is AND-combined
    /// with `search`. Empty means unscoped.
    pub skeleton: Vec<Vec<Predicate>>,
    /// Applied by the backend after ordering matches by `_digger.left`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modifier: Option<Pseudo>,
}

impl Query {
    pub fn is_scoped(&self) -> bool {
        !self.skeleton.is_empty()
    }
}

/// Compile a phase searched anywhere beneath the context nodes.
pub fn compile(phase: &Phase, contexts: &[Skeleton]) -> Query {
    compile_step(phase, Combinator::Descendant, contexts)
}

/// Compile a phase reached from the context nodes through `combinator`.
pub fn compile_step(phase: &Phase, combinator: Combinator, contexts: &[Skeleton]) -> Query {
    let mut search = Vec::with_capacity(phase.classes.len() + phase.attrs.len() + 3);

    if let Some(tag) = &phase.tag {
        search.push(Predicate::new(FIELD_TAG, Operator::Eq, tag.as_str()));
    }
    if let Some(id) = &phase.id {
        search.push(Predicate::new(FIELD_ID, Operator::Eq, id.as_str()));
    }
    if let Some(diggerid) = &phase.diggerid {
        search.push(Predicate::new(FIELD_DIGGERID, Operator::Eq, diggerid.as_str()));
    }
    for class in &phase.classes {
        search.push(Predicate::new(FIELD_CLASS, Operator::Eq, class.as_str()));
    }
    search.extend(phase.attrs.iter().cloned());

    let skeleton = contexts
        .iter()
        .map(|context| {
            let mut group = vec![
                Predicate::new(FIELD_LEFT, Operator::Gt, context.left.clone()),
                Predicate::new(FIELD_RIGHT, Operator::Lt, context.right.clone()),
            ];
            if combinator == Combinator::Child {
                group.push(Predicate::new(
                    FIELD_PARENTID,
                    Operator::Eq,
                    context.diggerid.as_str(),
                ));
            }
            group
        })
        .collect();

    tracing::trace!(
        "Compiled phase {} into {} condition(s) over {} context(s)",
        phase,
        search.len(),
        contexts.len()
    );

    Query {
        search,
        skeleton,
        modifier: phase.modifier,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numeric_skeleton(diggerid: &str, left: i64, right: i64) -> Skeleton {
        Skeleton {
            diggerid: diggerid.into(),
            tag: String::new(),
            left: left.into(),
            right: right.into(),
            class: Vec::new(),
        }
    }

    #[test]
    fn test_unscoped_query() {
        let phase = Phase::new()
            .with_tag("product")
            .with_class("onsale")
            .with_attr("price", Operator::Lt, 100);
        let query = compile(&phase, &[]);

        assert_eq!(
            query.search,
            vec![
                Predicate::new(FIELD_TAG, Operator::Eq, "product"),
                Predicate::new(FIELD_CLASS, Operator::Eq, "onsale"),
                Predicate::new("price", Operator::Lt, 100),
            ]
        );
        assert!(query.skeleton.is_empty());
        assert!(!query.is_scoped());
    }

    #[test]
    fn test_scoped_query() {
        let phase = Phase::new().with_tag("product");
        let contexts = [
            numeric_skeleton("123", 34, 78),
            numeric_skeleton("456", 89, 123),
        ];
        let query = compile(&phase, &contexts);

        assert_eq!(query.skeleton.len(), 2);
        assert_eq!(
            query.skeleton[1],
            vec![
                Predicate::new(FIELD_LEFT, Operator::Gt, 89),
                Predicate::new(FIELD_RIGHT, Operator::Lt, 123),
            ]
        );
    }

    #[test]
    fn test_skeleton_diggerid_accepts_numbers() {
        let contexts: Vec<Skeleton> = serde_json::from_str(
            r#"[
                {"diggerid": 123, "left": 34, "right": 78},
                {"diggerid": "456", "left": 89, "right": 123},
                {"diggerid": -7, "left": 1, "right": 2},
                {"diggerid": 2.5, "left": 1, "right": 2}
            ]"#,
        )
        .unwrap();

        let ids: Vec<&str> = contexts.iter().map(|c| c.diggerid.as_str()).collect();
        assert_eq!(ids, vec!["123", "456", "-7", "2.5"]);
        assert_eq!(contexts[0], numeric_skeleton("123", 34, 78));

        let query = compile(&Phase::new().with_tag("product"), &contexts[..2]);
        assert_eq!(query.skeleton[0][0], Predicate::new(FIELD_LEFT, Operator::Gt, 34));
        assert!(serde_json::from_str::<Skeleton>(r#"{"diggerid": true, "left": 1, "right": 2}"#).is_err());
    }

    #[test]
    fn test_shortcuts_follow_tag() {
        let phase = Phase::new()
            .with_tag("city")
            .with_id("london")
            .with_diggerid("ab12")
            .with_class("south");
        let fields: Vec<String> = compile(&phase, &[])
            .search
            .into_iter()
            .map(|p| p.field)
            .collect();
        assert_eq!(fields, vec![FIELD_TAG, FIELD_ID, FIELD_DIGGERID, FIELD_CLASS]);
    }

    #[test]
    fn test_child_step_pins_parent() {
        let phase = Phase::new().with_tag("city");
        let query = compile_step(&phase, Combinator::Child, &[numeric_skeleton("7", 1, 2)]);
        assert_eq!(query.skeleton[0].len(), 3);
        assert_eq!(
            query.skeleton[0][2],
            Predicate::new(FIELD_PARENTID, Operator::Eq, "7")
        );
    }

    #[test]
    fn test_modifier_carried() {
        let phase = Phase::new().with_tag("city").with_modifier(Pseudo::Limit(2));
        assert_eq!(compile(&phase, &[]).modifier, Some(Pseudo::Limit(2)));
    }

    #[test]
    fn test_wildcard_has_no_conditions() {
        let query = compile(&Phase::new(), &[]);
        assert!(query.search.is_empty());
    }

    #[test]
    fn test_skeleton_from_span_uses_encodings() {
        let span = crate::encode(&[45, 3, 4, 5]).unwrap();
        let skeleton = Skeleton::from_span("x", "city", &span, vec!["south".into()]);
        assert_eq!(
            skeleton.left,
            Literal::String("004579289940828402366863905325443786".into())
        );

        let json = serde_json::to_value(&skeleton).unwrap();
        assert_eq!(json["diggerid"], "x");
        assert_eq!(json["class"], serde_json::json!(["south"]));
    }
}
