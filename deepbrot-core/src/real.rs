//! Arithmetic capability interface for the escape-time kernels.
//!
//! The kernel is written once against this trait and monomorphized per
//! backend: native f32/f64, software decimal, and the extended-precision
//! pair types. The fast newtype wrappers swap the precise add/sub for the
//! three-step transformations, which is exactly how the fast render tiers
//! differ from the precise ones.

use crate::{DoubleDouble, Float128};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Numeric backend contract for per-pixel iteration.
///
/// Implementations must be plain values (`Copy`) so kernels can be
/// monomorphized without indirection, and thread-safe so the row-partitioned
/// renderers can share coordinates across workers.
pub trait RealScalar: Copy + PartialOrd + Send + Sync + 'static {
    fn from_f64(value: f64) -> Self;
    fn to_f64(self) -> f64;

    fn add(self, rhs: Self) -> Self;
    fn sub(self, rhs: Self) -> Self;
    fn mul(self, rhs: Self) -> Self;
    fn div(self, rhs: Self) -> Self;

    #[inline]
    fn sqr(self) -> Self {
        self.mul(self)
    }

    #[inline]
    fn zero() -> Self {
        Self::from_f64(0.0)
    }

    #[inline]
    fn two() -> Self {
        Self::from_f64(2.0)
    }

    #[inline]
    fn four() -> Self {
        Self::from_f64(4.0)
    }
}

impl RealScalar for f32 {
    #[inline]
    fn from_f64(value: f64) -> Self {
        value as f32
    }
    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }
    #[inline]
    fn add(self, rhs: Self) -> Self {
        self + rhs
    }
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        self - rhs
    }
    #[inline]
    fn mul(self, rhs: Self) -> Self {
        self * rhs
    }
    #[inline]
    fn div(self, rhs: Self) -> Self {
        self / rhs
    }
}

impl RealScalar for f64 {
    #[inline]
    fn from_f64(value: f64) -> Self {
        value
    }
    #[inline]
    fn to_f64(self) -> f64 {
        self
    }
    #[inline]
    fn add(self, rhs: Self) -> Self {
        self + rhs
    }
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        self - rhs
    }
    #[inline]
    fn mul(self, rhs: Self) -> Self {
        self * rhs
    }
    #[inline]
    fn div(self, rhs: Self) -> Self {
        self / rhs
    }
}

/// 96-bit scaled-integer decimal backend. Exact decimal steps make it useful
/// for checking binary-float artifacts; escape-time magnitudes stay far from
/// its overflow range.
impl RealScalar for Decimal {
    #[inline]
    fn from_f64(value: f64) -> Self {
        <Decimal as FromPrimitive>::from_f64(value).unwrap_or_default()
    }
    #[inline]
    fn to_f64(self) -> f64 {
        ToPrimitive::to_f64(&self).unwrap_or(f64::NAN)
    }
    #[inline]
    fn add(self, rhs: Self) -> Self {
        self + rhs
    }
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        self - rhs
    }
    #[inline]
    fn mul(self, rhs: Self) -> Self {
        self * rhs
    }
    #[inline]
    fn div(self, rhs: Self) -> Self {
        self / rhs
    }
    #[inline]
    fn zero() -> Self {
        Decimal::ZERO
    }
    #[inline]
    fn two() -> Self {
        Decimal::TWO
    }
    #[inline]
    fn four() -> Self {
        Decimal::TWO + Decimal::TWO
    }
}

impl RealScalar for DoubleDouble {
    #[inline]
    fn from_f64(value: f64) -> Self {
        DoubleDouble::from_f64(value)
    }
    #[inline]
    fn to_f64(self) -> f64 {
        DoubleDouble::to_f64(self)
    }
    #[inline]
    fn add(self, rhs: Self) -> Self {
        DoubleDouble::add(self, rhs)
    }
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        DoubleDouble::sub(self, rhs)
    }
    #[inline]
    fn mul(self, rhs: Self) -> Self {
        DoubleDouble::mul(self, rhs)
    }
    #[inline]
    fn div(self, rhs: Self) -> Self {
        DoubleDouble::div(self, rhs)
    }
    #[inline]
    fn sqr(self) -> Self {
        DoubleDouble::sqr(self)
    }
}

impl RealScalar for Float128 {
    #[inline]
    fn from_f64(value: f64) -> Self {
        Float128::from_f64(value)
    }
    #[inline]
    fn to_f64(self) -> f64 {
        Float128::to_f64(self)
    }
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Float128::add(self, rhs)
    }
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Float128::sub(self, rhs)
    }
    #[inline]
    fn mul(self, rhs: Self) -> Self {
        Float128::mul(self, rhs)
    }
    #[inline]
    fn div(self, rhs: Self) -> Self {
        Float128::div(self, rhs)
    }
    #[inline]
    fn sqr(self) -> Self {
        Float128::sqr(self)
    }
}

/// Double-double backend routing add/sub/div through the fast three-step
/// transformations.
///
/// The fast transformations assume `|lhs| >= |rhs|`. The escape-time loop
/// keeps its operands inside that envelope for typical viewports, which is
/// why this tier trades the last couple of bits for throughput; results are
/// not guaranteed to match the precise tier pixel-for-pixel.
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct FastDoubleDouble(pub DoubleDouble);

impl RealScalar for FastDoubleDouble {
    #[inline]
    fn from_f64(value: f64) -> Self {
        Self(DoubleDouble::from_f64(value))
    }
    #[inline]
    fn to_f64(self) -> f64 {
        self.0.to_f64()
    }
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self(self.0.add_fast(rhs.0))
    }
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self(self.0.sub_fast(rhs.0))
    }
    #[inline]
    fn mul(self, rhs: Self) -> Self {
        Self(self.0.mul(rhs.0))
    }
    #[inline]
    fn div(self, rhs: Self) -> Self {
        Self(self.0.div_fast(rhs.0))
    }
    #[inline]
    fn sqr(self) -> Self {
        Self(self.0.sqr())
    }
}

/// Quad backend with the same fast-path substitutions as
/// [`FastDoubleDouble`].
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct FastFloat128(pub Float128);

impl RealScalar for FastFloat128 {
    #[inline]
    fn from_f64(value: f64) -> Self {
        Self(Float128::from_f64(value))
    }
    #[inline]
    fn to_f64(self) -> f64 {
        self.0.to_f64()
    }
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self(self.0.add_fast(rhs.0))
    }
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self(self.0.sub_fast(rhs.0))
    }
    #[inline]
    fn mul(self, rhs: Self) -> Self {
        Self(self.0.mul(rhs.0))
    }
    #[inline]
    fn div(self, rhs: Self) -> Self {
        Self(self.0.div_fast(rhs.0))
    }
    #[inline]
    fn sqr(self) -> Self {
        Self(self.0.sqr())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quadratic_step<T: RealScalar>(x: f64) -> f64 {
        // x^2 - x computed through the trait surface
        let v = T::from_f64(x);
        v.sqr().sub(v).to_f64()
    }

    #[test]
    fn backends_agree_on_exact_arithmetic() {
        for x in [0.0, 1.0, -1.5, 2.0, 0.25] {
            let expected = x * x - x;
            assert_eq!(quadratic_step::<f64>(x), expected);
            assert_eq!(quadratic_step::<f32>(x), expected);
            assert_eq!(quadratic_step::<Decimal>(x), expected);
            assert_eq!(quadratic_step::<DoubleDouble>(x), expected);
            assert_eq!(quadratic_step::<Float128>(x), expected);
            assert_eq!(quadratic_step::<FastDoubleDouble>(x), expected);
            assert_eq!(quadratic_step::<FastFloat128>(x), expected);
        }
    }

    #[test]
    fn constants_match_their_f64_values() {
        assert_eq!(<DoubleDouble as RealScalar>::four().to_f64(), 4.0);
        assert_eq!(<Decimal as RealScalar>::two().to_f64(), 2.0);
        assert_eq!(<FastFloat128 as RealScalar>::zero().to_f64(), 0.0);
    }

    #[test]
    fn fast_wrappers_keep_ordering() {
        let a = FastDoubleDouble::from_f64(1.0);
        let b = FastDoubleDouble::from_f64(4.0);
        assert!(a < b);
        assert!(b.sqr() > b);
    }
}
