//! Selector AST
//!
//! A selector is a pipeline of legs. Each leg is a chain of phases joined by
//! combinators, and each phase is a compound condition on a single model.

use std::fmt;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// Scalar literal carried by an attribute predicate.
///
/// Values that parse as numbers are typed as numbers, everything else is a
/// string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Literal {
    Number(f64),
    String(String),
}

impl Literal {
    /// Type a raw token: numeric literals become numbers.
    pub fn from_token(token: &str) -> Self {
        match numeric_literal(token) {
            Some(n) => Literal::Number(n),
            None => Literal::String(token.to_string()),
        }
    }

    /// Numeric view, `None` for strings.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Literal::Number(n) => Some(*n),
            Literal::String(_) => None,
        }
    }

    /// String view, `None` for numbers.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Literal::Number(_) => None,
            Literal::String(s) => Some(s),
        }
    }

    /// Coerce to a string the way prefix tests see it.
    pub fn to_text(&self) -> String {
        match self {
            Literal::Number(n) => format_number(*n),
            Literal::String(s) => s.clone(),
        }
    }
}

impl From<f64> for Literal {
    fn from(n: f64) -> Self {
        Literal::Number(n)
    }
}

impl From<i64> for Literal {
    fn from(n: i64) -> Self {
        Literal::Number(n as f64)
    }
}

impl From<i32> for Literal {
    fn from(n: i32) -> Self {
        Literal::Number(n as f64)
    }
}

impl From<&str> for Literal {
    fn from(s: &str) -> Self {
        Literal::String(s.to_string())
    }
}

impl From<String> for Literal {
    fn from(s: String) -> Self {
        Literal::String(s)
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Number(n) => f.write_str(&format_number(*n)),
            Literal::String(s) => {
                let needs_quotes = s.is_empty()
                    || numeric_literal(s).is_some()
                    || s.chars().any(|c| {
                        c.is_whitespace() || matches!(c, ']' | '"' | '\'' | '/' | '\\')
                    });
                if !needs_quotes {
                    return f.write_str(s);
                }
                let quote = if s.contains('"') && !s.contains('\'') {
                    '\''
                } else {
                    '"'
                };
                write!(f, "{}", quote)?;
                for c in s.chars() {
                    if c == quote || c == '\\' {
                        f.write_str("\\")?;
                    }
                    write!(f, "{}", c)?;
                }
                write!(f, "{}", quote)
            }
        }
    }
}

/// Render a number without a trailing `.0` for integral values.
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// Parse a token as a finite numeric literal.
pub(crate) fn numeric_literal(token: &str) -> Option<f64> {
    let looks_numeric = token.chars().any(|c| c.is_ascii_digit())
        && token
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'));
    if !looks_numeric {
        return None;
    }
    token.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Attribute comparison operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    /// `=` - equality by type and content
    #[serde(rename = "=")]
    Eq,
    /// `^=` - string prefix
    #[serde(rename = "^=")]
    Prefix,
    /// `<` - numeric less-than
    #[serde(rename = "<")]
    Lt,
    /// `>` - numeric greater-than
    #[serde(rename = ">")]
    Gt,
}

impl Operator {
    /// Parse an operator token
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "=" => Some(Self::Eq),
            "^=" => Some(Self::Prefix),
            "<" => Some(Self::Lt),
            ">" => Some(Self::Gt),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Prefix => "^=",
            Self::Lt => "<",
            Self::Gt => ">",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `[field op value]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttrPredicate {
    /// Dotted path into the attribute tree
    pub field: String,
    pub operator: Operator,
    pub value: Literal,
}

impl AttrPredicate {
    pub fn new(field: impl Into<String>, operator: Operator, value: impl Into<Literal>) -> Self {
        Self {
            field: field.into(),
            operator,
            value: value.into(),
        }
    }
}

impl fmt::Display for AttrPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}{}{}]", self.field, self.operator, self.value)
    }
}

/// Post-filter applied to a phase's full match set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pseudo {
    /// Earliest match in document order
    First,
    /// Latest match in document order
    Last,
    /// First `n` matches in document order
    Limit(usize),
}

impl Pseudo {
    /// Apply the modifier to an ordered match list.
    pub fn apply<T>(&self, mut matches: Vec<T>) -> Vec<T> {
        match self {
            Pseudo::First => {
                matches.truncate(1);
                matches
            }
            Pseudo::Last => match matches.pop() {
                Some(last) => vec![last],
                None => matches,
            },
            Pseudo::Limit(n) => {
                matches.truncate(*n);
                matches
            }
        }
    }
}

impl fmt::Display for Pseudo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pseudo::First => f.write_str(":first"),
            Pseudo::Last => f.write_str(":last"),
            Pseudo::Limit(n) => write!(f, ":limit({})", n),
        }
    }
}

/// Relationship between consecutive phases
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Combinator {
    /// Whitespace - any depth
    #[default]
    Descendant,
    /// `>` - direct children only
    Child,
}

/// One compound selector unit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Phase {
    /// Tag to match, `None` is the wildcard
    pub tag: Option<String>,
    /// Human identifier shortcut (`#id` / `_id`)
    pub id: Option<String>,
    /// Unique identifier shortcut (all-digit token / `=id`)
    pub diggerid: Option<String>,
    /// Required classes, all must be present
    #[serde(rename = "class")]
    pub classes: IndexSet<String>,
    #[serde(rename = "attr")]
    pub attrs: Vec<AttrPredicate>,
    pub modifier: Option<Pseudo>,
}

impl Phase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_diggerid(mut self, diggerid: impl Into<String>) -> Self {
        self.diggerid = Some(diggerid.into());
        self
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.insert(class.into());
        self
    }

    pub fn with_attr(
        mut self,
        field: impl Into<String>,
        operator: Operator,
        value: impl Into<Literal>,
    ) -> Self {
        self.attrs.push(AttrPredicate::new(field, operator, value));
        self
    }

    pub fn with_modifier(mut self, modifier: Pseudo) -> Self {
        self.modifier = Some(modifier);
        self
    }

    /// True when the phase places no condition at all (`*`).
    pub fn is_wildcard(&self) -> bool {
        self.tag.is_none()
            && self.id.is_none()
            && self.diggerid.is_none()
            && self.classes.is_empty()
            && self.attrs.is_empty()
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut wrote = false;
        if let Some(tag) = &self.tag {
            f.write_str(tag)?;
            wrote = true;
        }
        if let Some(diggerid) = &self.diggerid {
            write!(f, "={}", diggerid)?;
            wrote = true;
        }
        if let Some(id) = &self.id {
            write!(f, "#{}", id)?;
            wrote = true;
        }
        for class in &self.classes {
            write!(f, ".{}", class)?;
            wrote = true;
        }
        for attr in &self.attrs {
            write!(f, "{}", attr)?;
            wrote = true;
        }
        if !wrote {
            f.write_str("*")?;
        }
        if let Some(modifier) = &self.modifier {
            write!(f, "{}", modifier)?;
        }
        Ok(())
    }
}

/// One `/`-separated stage: a head phase followed by combinator/phase steps
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Leg {
    pub head: Phase,
    pub tail: Vec<(Combinator, Phase)>,
}

impl Leg {
    pub fn new(head: Phase) -> Self {
        Self {
            head,
            tail: Vec::new(),
        }
    }

    pub fn then(mut self, combinator: Combinator, phase: Phase) -> Self {
        self.tail.push((combinator, phase));
        self
    }

    /// Phases in order
    pub fn phases(&self) -> impl Iterator<Item = &Phase> {
        std::iter::once(&self.head).chain(self.tail.iter().map(|(_, p)| p))
    }

    /// Combinators between consecutive phases
    pub fn combinators(&self) -> impl Iterator<Item = Combinator> + '_ {
        self.tail.iter().map(|(c, _)| *c)
    }

    /// Every phase paired with the combinator that leads into it.
    ///
    /// The head phase is searched at any depth below the scope, so it is
    /// reported with `Descendant`.
    pub fn steps(&self) -> impl Iterator<Item = (Combinator, &Phase)> {
        std::iter::once((Combinator::Descendant, &self.head))
            .chain(self.tail.iter().map(|(c, p)| (*c, p)))
    }

    pub fn len(&self) -> usize {
        1 + self.tail.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

impl fmt::Display for Leg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.head)?;
        for (combinator, phase) in &self.tail {
            match combinator {
                Combinator::Descendant => write!(f, " {}", phase)?,
                Combinator::Child => write!(f, " > {}", phase)?,
            }
        }
        Ok(())
    }
}

/// Parsed selector
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Selector {
    pub legs: Vec<Leg>,
}

impl Selector {
    pub fn new(legs: Vec<Leg>) -> Self {
        Self { legs }
    }

    /// Selector with a single one-phase leg
    pub fn from_phase(phase: Phase) -> Self {
        Self {
            legs: vec![Leg::new(phase)],
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, leg) in self.legs.iter().enumerate() {
            if i > 0 {
                f.write_str(" / ")?;
            }
            write!(f, "{}", leg)?;
        }
        Ok(())
    }
}
