//! digger selectors
//!
//! CSS-like selector language for querying a forest of tagged, classed,
//! attributed models:
//!
//! ```text
//! country[name^=U] > city.south area.poor
//! product.onsale/caption.red
//! city.south:limit(2)
//! ```

mod ast;
mod parser;

pub use ast::{
    format_number, AttrPredicate, Combinator, Leg, Literal, Operator, Phase, Pseudo, Selector,
};
pub use parser::SelectorParser;

use std::str::FromStr;

/// Parse a selector string.
///
/// Never returns a partial result: any malformed leg fails the whole parse.
pub fn parse(text: &str) -> Result<Selector, SyntaxError> {
    let selector = SelectorParser::new(text).parse()?;
    tracing::trace!("Parsed selector {:?} into {} leg(s)", text, selector.legs.len());
    Ok(selector)
}

/// Parse a string holding exactly one phase (no combinators or legs).
pub fn parse_phase(text: &str) -> Result<Phase, SyntaxError> {
    SelectorParser::new(text).parse_single_phase()
}

impl FromStr for Selector {
    type Err = SyntaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

impl FromStr for Phase {
    type Err = SyntaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_phase(s)
    }
}

/// Selector syntax error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyntaxError {
    #[error("empty selector")]
    Empty,

    #[error("empty phase at offset {offset}")]
    EmptyPhase { offset: usize },

    #[error("expected a name at offset {offset}")]
    ExpectedName { offset: usize },

    #[error("unterminated '[' at offset {offset}")]
    UnterminatedBracket { offset: usize },

    #[error("unrecognized operator {operator:?} at offset {offset}")]
    UnknownOperator { offset: usize, operator: String },

    #[error("unrecognized pseudo-modifier ':{name}' at offset {offset}")]
    UnknownPseudo { offset: usize, name: String },

    #[error("a phase may carry only one pseudo-modifier (offset {offset})")]
    DuplicatePseudo { offset: usize },

    #[error("invalid :limit() argument at offset {offset}")]
    InvalidLimit { offset: usize },

    #[error("unexpected {found:?} at offset {offset}")]
    UnexpectedChar { offset: usize, found: char },
}

impl SyntaxError {
    /// Byte offset of the error in the selector text, if known
    pub fn offset(&self) -> Option<usize> {
        match self {
            SyntaxError::Empty => None,
            SyntaxError::EmptyPhase { offset }
            | SyntaxError::ExpectedName { offset }
            | SyntaxError::UnterminatedBracket { offset }
            | SyntaxError::UnknownOperator { offset, .. }
            | SyntaxError::UnknownPseudo { offset, .. }
            | SyntaxError::DuplicatePseudo { offset }
            | SyntaxError::InvalidLimit { offset }
            | SyntaxError::UnexpectedChar { offset, .. } => Some(*offset),
        }
    }
}
