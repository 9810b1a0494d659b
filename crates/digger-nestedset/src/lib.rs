//! digger nested sets
//!
//! Rational nested-set positions and the compiler that turns a selector phase
//! into flat predicates a storage backend can answer without walking a tree.

mod compile;
mod fraction;
mod position;

pub use compile::{
    compile, compile_step, Predicate, Query, Skeleton, FIELD_CLASS, FIELD_DIGGERID, FIELD_ID,
    FIELD_LEFT, FIELD_PARENTID, FIELD_RIGHT, FIELD_TAG,
};
pub use fraction::Fraction;
pub use position::{encode, encode_with, interval, EncodingFormat, Position, SiblingPath, Span};

/// Invalid sibling-index path or unrepresentable position
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EncodeError {
    #[error("path is empty; every node has at least its root-level index")]
    EmptyPath,

    #[error("negative index {value} at depth {depth}")]
    NegativeIndex { depth: usize, value: i64 },

    #[error("non-integer index {value} at depth {depth}")]
    NonIntegerIndex { depth: usize, value: f64 },

    #[error("position arithmetic overflowed at depth {depth}")]
    Overflow { depth: usize },

    #[error("integer part has {digits} digits but the encoding allows {width}")]
    IntegerPartTooWide { digits: usize, width: usize },

    #[error("encoding precision exhausted at depth {depth}: boundaries no longer separate")]
    PrecisionExhausted { depth: usize },
}
