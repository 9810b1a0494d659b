//! Nested-set position encoder
//!
//! Each node gets a `(left, right)` pair of exact rationals derived from its
//! root-to-node path of sibling indices by walking the Stern-Brocot tree:
//!
//! - the working interval starts as `(0/1, 1/0)`
//! - for index `k`, take `k` mediant steps that raise `lo` towards `hi`,
//!   then one mediant step that lowers `hi` towards the new `lo`
//!
//! The node's span is the final `(lo, hi)`. Sibling `k` of a parent spanning
//! `(L, H)` therefore spans `(L + k*H, L + (k+1)*H)` in mediant arithmetic;
//! the spans of consecutive siblings touch and every later sibling stays to
//! the right, so appending a child never moves an earlier one.
//!
//! In continued-fraction terms the path `[a1, a2, .., an]` maps to
//! `left = [a1; 1, a2, 1, .., 1, an]` and `right = [a1; 1, a2, 1, .., 1, an + 1]`.
//!
//! A child with index `0` shares its parent's `left`. Strict containment
//! between ancestor and descendant spans needs every index below the root
//! level to be at least `1`.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::fraction::Fraction;
use crate::EncodeError;

/// Fixed-width decimal rendering of positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodingFormat {
    /// Zero-padded digits before the (implicit) decimal point
    pub integer_digits: usize,
    /// Truncated digits after it
    pub fraction_digits: usize,
}

impl EncodingFormat {
    pub const fn new(integer_digits: usize, fraction_digits: usize) -> Self {
        Self {
            integer_digits,
            fraction_digits,
        }
    }

    /// Total width of every encoding string
    pub fn width(&self) -> usize {
        self.integer_digits + self.fraction_digits
    }
}

impl Default for EncodingFormat {
    /// 4 integer digits + 32 fractional digits = 36
    fn default() -> Self {
        Self::new(4, 32)
    }
}

/// One nested-set boundary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub numerator: u128,
    pub denominator: u128,
    /// Fixed-width, zero-padded decimal digits; byte-wise order follows the
    /// rational order up to the rendering's precision
    pub encoding: String,
}

impl Position {
    pub fn fraction(&self) -> Fraction {
        Fraction::new(self.numerator, self.denominator)
    }

    fn render(fraction: Fraction, format: EncodingFormat) -> Result<Self, EncodeError> {
        let fraction = fraction.reduced();
        let encoding = fraction
            .to_decimal(format.integer_digits, format.fraction_digits)
            .ok_or(EncodeError::IntegerPartTooWide {
                digits: integer_digits_of(&fraction),
                width: format.integer_digits,
            })?;
        Ok(Self {
            numerator: fraction.numerator,
            denominator: fraction.denominator,
            encoding,
        })
    }
}

fn integer_digits_of(fraction: &Fraction) -> usize {
    if fraction.is_infinite() {
        return usize::MAX;
    }
    (fraction.numerator / fraction.denominator).to_string().len()
}

impl PartialEq for Position {
    fn eq(&self, other: &Self) -> bool {
        self.fraction() == other.fraction()
    }
}

impl Eq for Position {}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> Ordering {
        self.fraction().cmp(&other.fraction())
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

/// A node's `(left, right)` boundaries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub left: Position,
    pub right: Position,
}

impl Span {
    /// Ancestor test: `self` strictly encloses `other`.
    pub fn contains(&self, other: &Span) -> bool {
        self.left < other.left && other.right < self.right
    }

    /// Same test over the encoding strings, as a backend would run it.
    pub fn contains_encoded(&self, other: &Span) -> bool {
        self.left.encoding < other.left.encoding && other.right.encoding < self.right.encoding
    }

    /// Check that truncated encodings still tell this span apart.
    ///
    /// Every strict exact order among `left`, `right` and the parent's
    /// boundaries must survive rendering. Siblings touch (`right` of one is
    /// exactly `left` of the next), so a separated span also keeps every
    /// sibling strictly after the previous one. An index-0 child shares its
    /// parent's `left` exactly and may share its encoding.
    pub fn check_resolved(&self, parent: Option<&Span>, depth: usize) -> Result<(), EncodeError> {
        let kept = |a: &Position, b: &Position| a >= b || a.encoding < b.encoding;
        let separated = kept(&self.left, &self.right);
        let inside = parent.is_none_or(|parent| {
            kept(&parent.left, &self.left) && kept(&self.right, &parent.right)
        });
        if separated && inside {
            Ok(())
        } else {
            Err(EncodeError::PrecisionExhausted { depth })
        }
    }
}

/// A validated root-to-node path of sibling indices
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<i64>", into = "Vec<i64>")]
pub struct SiblingPath(Vec<u64>);

impl SiblingPath {
    pub fn new(indices: Vec<u64>) -> Result<Self, EncodeError> {
        if indices.is_empty() {
            return Err(EncodeError::EmptyPath);
        }
        Ok(Self(indices))
    }

    /// Validate signed indices
    pub fn from_signed(indices: &[i64]) -> Result<Self, EncodeError> {
        let checked = indices
            .iter()
            .enumerate()
            .map(|(depth, &value)| {
                u64::try_from(value).map_err(|_| EncodeError::NegativeIndex { depth, value })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(checked)
    }

    /// Validate loosely-typed numeric indices (e.g. decoded from JSON)
    pub fn from_f64(indices: &[f64]) -> Result<Self, EncodeError> {
        let checked = indices
            .iter()
            .enumerate()
            .map(|(depth, &value)| {
                if !value.is_finite() || value.fract() != 0.0 {
                    Err(EncodeError::NonIntegerIndex { depth, value })
                } else if value < 0.0 {
                    Err(EncodeError::NegativeIndex {
                        depth,
                        value: value as i64,
                    })
                } else if value >= u64::MAX as f64 {
                    Err(EncodeError::Overflow { depth })
                } else {
                    Ok(value as u64)
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(checked)
    }

    pub fn indices(&self) -> &[u64] {
        &self.0
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// Path of the `index`-th child of this node
    pub fn child(&self, index: u64) -> SiblingPath {
        let mut indices = self.0.clone();
        indices.push(index);
        SiblingPath(indices)
    }

    pub fn encode(&self) -> Result<Span, EncodeError> {
        encode_with(&self.0, EncodingFormat::default())
    }

    pub fn encode_with(&self, format: EncodingFormat) -> Result<Span, EncodeError> {
        encode_with(&self.0, format)
    }
}

impl TryFrom<Vec<i64>> for SiblingPath {
    type Error = EncodeError;

    fn try_from(value: Vec<i64>) -> Result<Self, Self::Error> {
        Self::from_signed(&value)
    }
}

impl From<SiblingPath> for Vec<i64> {
    fn from(path: SiblingPath) -> Self {
        path.0.into_iter().map(|i| i as i64).collect()
    }
}

/// Encode a path with the default 36-digit format.
pub fn encode(path: &[u64]) -> Result<Span, EncodeError> {
    encode_with(path, EncodingFormat::default())
}

/// Encode a path with an explicit rendering format.
pub fn encode_with(path: &[u64], format: EncodingFormat) -> Result<Span, EncodeError> {
    let (lo, hi) = interval(path)?;
    Ok(Span {
        left: Position::render(lo, format)?,
        right: Position::render(hi, format)?,
    })
}

/// The exact `(lo, hi)` interval of a path, before rendering.
pub fn interval(path: &[u64]) -> Result<(Fraction, Fraction), EncodeError> {
    if path.is_empty() {
        return Err(EncodeError::EmptyPath);
    }

    let mut lo = Fraction::ZERO;
    let mut hi = Fraction::INFINITY;

    for (depth, &index) in path.iter().enumerate() {
        lo = lo
            .mediant_steps(&hi, index)
            .ok_or(EncodeError::Overflow { depth })?;
        hi = lo.mediant(&hi).ok_or(EncodeError::Overflow { depth })?;
    }

    Ok((lo, hi))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fractions(path: &[u64]) -> ((u128, u128), (u128, u128)) {
        let span = encode(path).unwrap();
        (
            (span.left.numerator, span.left.denominator),
            (span.right.numerator, span.right.denominator),
        )
    }

    #[test]
    fn test_regression_vector() {
        let span = encode(&[45, 3, 4, 5]).unwrap();
        assert_eq!(span.left.numerator, 7739);
        assert_eq!(span.left.denominator, 169);
        assert_eq!(span.left.encoding, "004579289940828402366863905325443786");
        assert_eq!(span.right.numerator, 9067);
        assert_eq!(span.right.denominator, 198);
        assert_eq!(span.right.encoding, "004579292929292929292929292929292929");
    }

    #[test]
    fn test_check_resolved_catches_collapsed_encodings() {
        let format = EncodingFormat::new(1, 2);
        let root = encode_with(&[0], format).unwrap();
        let child = encode_with(&[0, 1], format).unwrap();
        assert_eq!(child.left.encoding, "050");
        assert_eq!(child.right.encoding, "066");
        assert!(root.check_resolved(None, 0).is_ok());
        assert!(child.check_resolved(Some(&root), 1).is_ok());

        let mut path = vec![0];
        let mut parent = root;
        let mut failed_at = None;
        for depth in 1..20 {
            path.push(1);
            let span = encode_with(&path, format).unwrap();
            if let Err(err) = span.check_resolved(Some(&parent), depth) {
                assert_eq!(err, EncodeError::PrecisionExhausted { depth });
                failed_at = Some(depth);
                break;
            }
            assert!(parent.contains(&span));
            parent = span;
        }
        assert!(failed_at.is_some_and(|depth| depth > 1));
    }

    #[test]
    fn test_default_format_resolves_moderate_chains() {
        let mut path = vec![0];
        let mut parent = encode(&path).unwrap();
        for depth in 1..30 {
            path.push(1);
            let span = encode(&path).unwrap();
            span.check_resolved(Some(&parent), depth).unwrap();
            parent = span;
        }
    }

    #[test]
    fn test_root_level_vectors() {
        assert_eq!(fractions(&[0]), ((0, 1), (1, 1)));
        assert_eq!(fractions(&[2]), ((2, 1), (3, 1)));
        assert_eq!(fractions(&[45]), ((45, 1), (46, 1)));

        let span = encode(&[0]).unwrap();
        assert_eq!(span.left.encoding, "0".repeat(36));
        assert_eq!(span.right.encoding, format!("0001{}", "0".repeat(32)));
    }

    #[test]
    fn test_deeper_vectors() {
        assert_eq!(fractions(&[1, 1]), ((3, 2), (5, 3)));
        assert_eq!(fractions(&[0, 2]), ((2, 3), (3, 4)));
        assert_eq!(fractions(&[0, 1, 1]), ((3, 5), (5, 8)));
        assert_eq!(fractions(&[3, 1, 2]), ((29, 8), (40, 11)));
        assert_eq!(fractions(&[45, 3]), ((183, 4), (229, 5)));

        let span = encode(&[1, 1]).unwrap();
        assert_eq!(span.left.encoding, format!("00015{}", "0".repeat(31)));
        assert_eq!(span.right.encoding, format!("0001{}", "6".repeat(32)));

        let span = encode(&[3, 1, 2]).unwrap();
        assert_eq!(span.left.encoding, "000362500000000000000000000000000000");
        assert_eq!(span.right.encoding, "000363636363636363636363636363636363");
    }

    #[test]
    fn test_next_sibling_starts_where_previous_ends() {
        let fifth = encode(&[45, 3, 4, 5]).unwrap();
        let sixth = encode(&[45, 3, 4, 6]).unwrap();
        assert_eq!(fifth.right, sixth.left);
        assert_eq!(sixth.right.numerator, 10395);
        assert_eq!(sixth.right.denominator, 227);
    }

    #[test]
    fn test_step_by_step_walk_agrees() {
        let path = [4u64, 2, 7, 1, 3];
        let mut lo = Fraction::ZERO;
        let mut hi = Fraction::INFINITY;
        for &k in &path {
            for _ in 0..k {
                lo = lo.mediant(&hi).unwrap();
            }
            hi = lo.mediant(&hi).unwrap();
        }
        assert_eq!(interval(&path).unwrap(), (lo, hi));
    }

    #[test]
    fn test_positions_are_lowest_terms() {
        for path in [&[45u64, 3, 4, 5][..], &[7, 9, 11], &[0, 1, 1, 1, 1], &[12, 30]] {
            let span = encode(path).unwrap();
            assert!(span.left.fraction().is_reduced());
            assert!(span.right.fraction().is_reduced());
        }
    }

    #[test]
    fn test_containment() {
        let parent = encode(&[45, 3, 4]).unwrap();
        let child = encode(&[45, 3, 4, 5]).unwrap();
        let grandchild = encode(&[45, 3, 4, 5, 1]).unwrap();
        let sibling = encode(&[45, 3, 4, 6]).unwrap();

        assert!(parent.contains(&child));
        assert!(parent.contains(&grandchild));
        assert!(child.contains(&grandchild));
        assert!(!child.contains(&parent));
        assert!(!child.contains(&sibling));
        assert!(!sibling.contains(&grandchild));
        assert!(!child.contains(&child));
        assert!(parent.contains_encoded(&grandchild));
    }

    #[test]
    fn test_first_child_at_zero_shares_left() {
        let parent = encode(&[2]).unwrap();
        let child = encode(&[2, 0]).unwrap();
        assert_eq!(parent.left, child.left);
        assert!(!parent.contains(&child));
    }

    #[test]
    fn test_errors() {
        assert_eq!(encode(&[]), Err(EncodeError::EmptyPath));
        assert_eq!(
            SiblingPath::from_signed(&[1, -2]),
            Err(EncodeError::NegativeIndex { depth: 1, value: -2 })
        );
        assert!(matches!(
            SiblingPath::from_f64(&[1.0, 2.5]),
            Err(EncodeError::NonIntegerIndex { depth: 1, .. })
        ));
        assert!(matches!(
            SiblingPath::from_f64(&[f64::NAN]),
            Err(EncodeError::NonIntegerIndex { depth: 0, .. })
        ));
        assert!(matches!(
            SiblingPath::from_f64(&[-1.0]),
            Err(EncodeError::NegativeIndex { depth: 0, value: -1 })
        ));
        assert_eq!(SiblingPath::new(vec![]), Err(EncodeError::EmptyPath));
        assert_eq!(
            encode(&[10_000]),
            Err(EncodeError::IntegerPartTooWide { digits: 5, width: 4 })
        );
    }

    #[test]
    fn test_overflow_is_reported() {
        let path = vec![u64::MAX; 8];
        assert!(matches!(interval(&path), Err(EncodeError::Overflow { .. })));
    }

    #[test]
    fn test_sibling_path_encode() {
        let path = SiblingPath::from_f64(&[45.0, 3.0, 4.0, 5.0]).unwrap();
        assert_eq!(path.encode().unwrap(), encode(&[45, 3, 4, 5]).unwrap());
        assert_eq!(path.child(1).depth(), 5);
    }

    #[test]
    fn test_custom_format() {
        let span = encode_with(&[1, 1], EncodingFormat::new(2, 4)).unwrap();
        assert_eq!(span.left.encoding, "015000");
        assert_eq!(span.right.encoding, "016666");
    }
}
