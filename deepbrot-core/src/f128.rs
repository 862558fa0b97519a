//! 128-bit extended real: the quad-width companion of [`DoubleDouble`].
//!
//! Same contract and algorithm shape as the double-double type, carried in a
//! two-limb array instead of named components. The kernels in `eft` are
//! shared, so both types satisfy the same normalization invariant and edge
//! case behavior; an escape-time kernel generic over the arithmetic trait
//! can be instantiated with either.
//!
//! [`DoubleDouble`]: crate::DoubleDouble

use crate::eft;
use crate::fmt::format_extended;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

/// Quad-precision value stored as `[leading, correction]` limbs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Float128 {
    limbs: [f64; 2],
}

impl Float128 {
    pub const ZERO: Self = Self { limbs: [0.0, 0.0] };
    pub const ONE: Self = Self { limbs: [1.0, 0.0] };

    pub const PI: Self = Self {
        limbs: [3.141592653589793, 1.2246467991473532e-16],
    };
    pub const E: Self = Self {
        limbs: [2.718281828459045, 1.4456468917292502e-16],
    };
    pub const LN_2: Self = Self {
        limbs: [0.6931471805599453, 2.3190468138462996e-17],
    };
    pub const LOG2_E: Self = Self {
        limbs: [1.4426950408889634, 2.0355273740931033e-17],
    };

    /// Scaled-`f64::MAX` infinity sentinel, shared with the double-double
    /// type.
    pub const INFINITY: Self = Self {
        limbs: [f64::MAX / 134_217_729.0, 0.0],
    };
    pub const NEG_INFINITY: Self = Self {
        limbs: [-f64::MAX / 134_217_729.0, 0.0],
    };
    pub const NAN: Self = Self {
        limbs: [f64::NAN, 0.0],
    };

    #[inline]
    pub const fn new(hi: f64, lo: f64) -> Self {
        Self { limbs: [hi, lo] }
    }

    #[inline]
    pub const fn from_f64(value: f64) -> Self {
        Self {
            limbs: [value, 0.0],
        }
    }

    /// Leading limb; the correctly rounded double approximation.
    #[inline]
    pub const fn hi(&self) -> f64 {
        self.limbs[0]
    }

    /// Correction limb.
    #[inline]
    pub const fn lo(&self) -> f64 {
        self.limbs[1]
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.limbs[0] == 0.0 && self.limbs[1] == 0.0
    }

    #[inline]
    pub fn is_nan(&self) -> bool {
        self.limbs[0].is_nan()
    }

    #[inline]
    pub fn is_infinite(&self) -> bool {
        self.limbs[0] >= Self::INFINITY.limbs[0] || self.limbs[0] <= Self::NEG_INFINITY.limbs[0]
    }

    #[inline]
    pub fn normalized(self) -> Self {
        Self::from_parts(eft::normalize(self.limbs[0], self.limbs[1]))
    }

    #[inline]
    fn parts(self) -> (f64, f64) {
        (self.limbs[0], self.limbs[1])
    }

    #[inline]
    fn from_parts(parts: (f64, f64)) -> Self {
        Self {
            limbs: [parts.0, parts.1],
        }
    }

    /// Precise sum, correct for any operand magnitude order.
    #[inline]
    pub fn add(self, rhs: Self) -> Self {
        Self::from_parts(eft::add(self.parts(), rhs.parts()))
    }

    #[inline]
    pub fn add_f64(self, rhs: f64) -> Self {
        Self::from_parts(eft::add_f64(self.parts(), rhs))
    }

    /// Fast sum; requires `|self| >= |rhs|`, unchecked.
    #[inline]
    pub fn add_fast(self, rhs: Self) -> Self {
        Self::from_parts(eft::add_fast(self.parts(), rhs.parts()))
    }

    /// Precise difference, correct for any operand magnitude order.
    #[inline]
    pub fn sub(self, rhs: Self) -> Self {
        Self::from_parts(eft::sub(self.parts(), rhs.parts()))
    }

    #[inline]
    pub fn sub_f64(self, rhs: f64) -> Self {
        Self::from_parts(eft::sub_f64(self.parts(), rhs))
    }

    /// `lhs - self` with a native-double left operand.
    #[inline]
    pub fn sub_from(self, lhs: f64) -> Self {
        Self::from_parts(eft::sub_from_f64(self.parts(), lhs))
    }

    /// Fast difference; requires `|self| >= |rhs|`, unchecked.
    #[inline]
    pub fn sub_fast(self, rhs: Self) -> Self {
        Self::from_parts(eft::sub_fast(self.parts(), rhs.parts()))
    }

    #[inline]
    pub fn mul(self, rhs: Self) -> Self {
        Self::from_parts(eft::mul(self.parts(), rhs.parts()))
    }

    #[inline]
    pub fn mul_f64(self, rhs: f64) -> Self {
        Self::from_parts(eft::mul_f64(self.parts(), rhs))
    }

    /// Exact scaling; `rhs` must be a power of two.
    #[inline]
    pub fn mul_pow2(self, rhs: f64) -> Self {
        Self::from_parts(eft::mul_pow2(self.parts(), rhs))
    }

    #[inline]
    pub fn sqr(self) -> Self {
        Self::from_parts(eft::sqr(self.parts()))
    }

    #[inline]
    pub fn div(self, rhs: Self) -> Self {
        Self::from_parts(eft::div(self.parts(), rhs.parts()))
    }

    #[inline]
    pub fn div_f64(self, rhs: f64) -> Self {
        Self::from_parts(eft::div_f64(self.parts(), rhs))
    }

    /// Cheaper divide with a single residual pass.
    #[inline]
    pub fn div_fast(self, rhs: Self) -> Self {
        Self::from_parts(eft::div_fast(self.parts(), rhs.parts()))
    }

    /// `lhs / self` with a native-double dividend.
    #[inline]
    pub fn div_into(self, lhs: f64) -> Self {
        Self::from_parts(eft::div_into_f64(self.parts(), lhs))
    }

    /// Exact scaling; `rhs` must be a power of two.
    #[inline]
    pub fn div_pow2(self, rhs: f64) -> Self {
        Self::from_parts(eft::div_pow2(self.parts(), rhs))
    }

    #[inline]
    pub fn recip(self) -> Self {
        Self::from_parts(eft::recip(self.parts()))
    }

    /// Newton-refined square root. Zero for zero, NaN for negative input.
    #[inline]
    pub fn sqrt(self) -> Self {
        Self::from_parts(eft::sqrt(self.parts()))
    }

    /// Cheaper square root with a single f64 residual pass.
    #[inline]
    pub fn sqrt_fast(self) -> Self {
        Self::from_parts(eft::sqrt_fast(self.parts()))
    }

    pub fn exp(self) -> Self {
        Self::from_parts(eft::exp(self.parts()))
    }

    /// Natural log; NaN for non-positive input.
    pub fn ln(self) -> Self {
        Self::from_parts(eft::ln(self.parts()))
    }

    pub fn powi(self, n: i32) -> Self {
        Self::from_parts(eft::pow_i(self.parts(), n))
    }

    pub fn powf(self, y: f64) -> Self {
        self.ln().mul_f64(y).exp()
    }

    /// Quad power: `exp(ln(self) * y)`.
    pub fn pow(self, y: Self) -> Self {
        self.ln().mul(y).exp()
    }

    pub fn root_i(self, n: i32) -> Self {
        Self::from_parts(eft::root_i(self.parts(), n))
    }

    /// Real root: `exp(ln(self) / y)`.
    pub fn root_f(self, y: f64) -> Self {
        self.ln().div_f64(y).exp()
    }

    #[inline]
    pub fn abs(self) -> Self {
        if self.limbs[0] < 0.0 {
            -self
        } else {
            self
        }
    }

    pub fn floor(self) -> Self {
        Self::from_parts(eft::floor(self.parts()))
    }

    pub fn ceil(self) -> Self {
        Self::from_parts(eft::ceil(self.parts()))
    }

    pub fn round(self) -> Self {
        Self::from_parts(eft::round(self.parts()))
    }

    pub fn trunc(self) -> Self {
        Self::from_parts(eft::trunc(self.parts()))
    }

    #[inline]
    pub fn to_i64(self) -> i64 {
        eft::round_to_i64(self.limbs[0], self.limbs[1])
    }

    #[inline]
    pub fn to_f64(self) -> f64 {
        self.limbs[0]
    }

    #[inline]
    pub fn min(self, other: Self) -> Self {
        if self < other {
            self
        } else {
            other
        }
    }

    #[inline]
    pub fn max(self, other: Self) -> Self {
        if self > other {
            self
        } else {
            other
        }
    }
}

impl From<f64> for Float128 {
    fn from(value: f64) -> Self {
        Self::from_f64(value)
    }
}

impl PartialOrd for Float128 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match self.limbs[0].partial_cmp(&other.limbs[0]) {
            Some(Ordering::Equal) => self.limbs[1].partial_cmp(&other.limbs[1]),
            ord => ord,
        }
    }
}

impl Add for Float128 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Float128::add(self, rhs)
    }
}

impl Sub for Float128 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Float128::sub(self, rhs)
    }
}

impl Mul for Float128 {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        Float128::mul(self, rhs)
    }
}

impl Div for Float128 {
    type Output = Self;
    fn div(self, rhs: Self) -> Self {
        Float128::div(self, rhs)
    }
}

impl Neg for Float128 {
    type Output = Self;
    fn neg(self) -> Self {
        Self {
            limbs: [-self.limbs[0], -self.limbs[1]],
        }
    }
}

impl AddAssign for Float128 {
    fn add_assign(&mut self, rhs: Self) {
        *self = Float128::add(*self, rhs);
    }
}

impl SubAssign for Float128 {
    fn sub_assign(&mut self, rhs: Self) {
        *self = Float128::sub(*self, rhs);
    }
}

impl MulAssign for Float128 {
    fn mul_assign(&mut self, rhs: Self) {
        *self = Float128::mul(*self, rhs);
    }
}

impl DivAssign for Float128 {
    fn div_assign(&mut self, rhs: Self) {
        *self = Float128::div(*self, rhs);
    }
}

impl fmt::Display for Float128 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        format_extended(self.limbs[0], self.limbs[1], f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limbs_round_trip_through_accessors() {
        let x = Float128::new(2.0, 1.0e-20);
        assert_eq!(x.hi(), 2.0);
        assert_eq!(x.lo(), 1.0e-20);
    }

    #[test]
    fn shares_constants_with_double_double() {
        use crate::DoubleDouble;
        assert_eq!(Float128::PI.hi(), DoubleDouble::PI.hi);
        assert_eq!(Float128::PI.lo(), DoubleDouble::PI.lo);
    }

    #[test]
    fn ordering_falls_through_to_correction_limb() {
        let a = Float128::new(1.0, 1.0e-20);
        let b = Float128::new(1.0, 2.0e-20);
        assert!(a < b);
        assert_eq!(a.max(b), b);
    }
}
