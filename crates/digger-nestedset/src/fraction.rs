//! Exact non-negative fractions
//!
//! Numerator/denominator pairs over `u128`. A zero denominator stands for the
//! point at infinity, which only ever appears as the upper bound of the
//! initial interval.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// Non-negative rational `numerator / denominator`
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Fraction {
    pub numerator: u128,
    pub denominator: u128,
}

impl Fraction {
    pub const ZERO: Fraction = Fraction {
        numerator: 0,
        denominator: 1,
    };

    pub const INFINITY: Fraction = Fraction {
        numerator: 1,
        denominator: 0,
    };

    pub fn new(numerator: u128, denominator: u128) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    pub fn is_infinite(&self) -> bool {
        self.denominator == 0
    }

    /// Mediant `(a + c) / (b + d)`, `None` on overflow
    pub fn mediant(&self, other: &Fraction) -> Option<Fraction> {
        Some(Fraction {
            numerator: self.numerator.checked_add(other.numerator)?,
            denominator: self.denominator.checked_add(other.denominator)?,
        })
    }

    /// `k` successive mediants towards `toward`, in closed form:
    /// `(a + k*c) / (b + k*d)`.
    pub fn mediant_steps(&self, toward: &Fraction, k: u64) -> Option<Fraction> {
        let k = k as u128;
        Some(Fraction {
            numerator: self
                .numerator
                .checked_add(k.checked_mul(toward.numerator)?)?,
            denominator: self
                .denominator
                .checked_add(k.checked_mul(toward.denominator)?)?,
        })
    }

    /// Reduce to lowest terms
    pub fn reduced(&self) -> Fraction {
        if self.is_infinite() {
            return Fraction::INFINITY;
        }
        let g = gcd(self.numerator, self.denominator);
        if g <= 1 {
            return *self;
        }
        Fraction {
            numerator: self.numerator / g,
            denominator: self.denominator / g,
        }
    }

    pub fn is_reduced(&self) -> bool {
        gcd(self.numerator, self.denominator) == 1
    }

    /// Decimal expansion by long division: the integer part left-padded with
    /// zeros to `integer_digits`, followed by exactly `fraction_digits`
    /// truncated fractional digits.
    ///
    /// Returns `None` when the integer part does not fit.
    pub fn to_decimal(&self, integer_digits: usize, fraction_digits: usize) -> Option<String> {
        if self.is_infinite() {
            return None;
        }
        let whole = (self.numerator / self.denominator).to_string();
        if whole.len() > integer_digits {
            return None;
        }

        let mut out = String::with_capacity(integer_digits + fraction_digits);
        for _ in whole.len()..integer_digits {
            out.push('0');
        }
        out.push_str(&whole);

        let mut remainder = self.numerator % self.denominator;
        for _ in 0..fraction_digits {
            let (digit, next) = times_ten_divmod(remainder, self.denominator);
            out.push(char::from(b'0' + digit as u8));
            remainder = next;
        }
        Some(out)
    }
}

impl PartialEq for Fraction {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Fraction {}

impl PartialOrd for Fraction {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Fraction {
    /// Exact comparison by simultaneous continued-fraction expansion, so no
    /// cross-multiplication can overflow.
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.is_infinite(), other.is_infinite()) {
            (true, true) => return Ordering::Equal,
            (true, false) => return Ordering::Greater,
            (false, true) => return Ordering::Less,
            (false, false) => {}
        }

        let (mut an, mut ad) = (self.numerator, self.denominator);
        let (mut bn, mut bd) = (other.numerator, other.denominator);
        let mut flipped = false;

        loop {
            let (aq, ar) = (an / ad, an % ad);
            let (bq, br) = (bn / bd, bn % bd);

            let ordering = if aq != bq {
                aq.cmp(&bq)
            } else {
                match (ar == 0, br == 0) {
                    (true, true) => Ordering::Equal,
                    (true, false) => Ordering::Less,
                    (false, true) => Ordering::Greater,
                    (false, false) => {
                        // ar/ad vs br/bd  <=>  bd/br vs ad/ar
                        (an, ad, bn, bd) = (ad, ar, bd, br);
                        flipped = !flipped;
                        continue;
                    }
                }
            };

            return if flipped { ordering.reverse() } else { ordering };
        }
    }
}

/// `(remainder * 10) / d` and `(remainder * 10) % d` without overflow,
/// given `remainder < d`.
fn times_ten_divmod(remainder: u128, d: u128) -> (u128, u128) {
    if let Some(scaled) = remainder.checked_mul(10) {
        return (scaled / d, scaled % d);
    }
    // Ten modular additions, counting wraps past `d`.
    let mut acc = 0u128;
    let mut carries = 0u128;
    for _ in 0..10 {
        let gap = d - acc;
        if remainder >= gap {
            acc = remainder - gap;
            carries += 1;
        } else {
            acc += remainder;
        }
    }
    (carries, acc)
}

pub(crate) fn gcd(mut a: u128, mut b: u128) -> u128 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}
