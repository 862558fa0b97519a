//! Error-free transformation kernels for double-double arithmetic.
//!
//! Every routine operates on a raw `(hi, lo)` pair of IEEE doubles whose sum
//! represents the value to ~106 mantissa bits, and returns a normalized pair
//! (`|lo| <= 0.5 * ulp(hi)`). The exact sequence and grouping of additions and
//! subtractions is load-bearing: each step recovers the rounding error of the
//! step before it. Do not reassociate, reorder, or "simplify" any of these
//! expressions.
//!
//! Precise add/sub use the six-step two-sum form and are correct for any
//! operand order. The `*_fast` forms use Dekker's three-step transformation
//! and require `|lhs| >= |rhs|`; callers must establish that ordering
//! themselves.

/// Veltkamp splitting constant, 2^27 + 1. Multiplying by this and subtracting
/// splits a double into two 26-bit halves whose product terms are exact.
const SPLIT: f64 = 134_217_729.0;

/// Inputs above this overflow `exp` past the scaled-infinity sentinel.
const EXP_OVERFLOW: f64 = 691.067739;

/// The exp/log power series runs until successive terms drop below this.
const SERIES_EPS: f64 = 1e-40;

// 1/ln2 and ln2 to double-double precision, with the leading doubles
// pre-split into their 26-bit halves (hi = SPLIT_HI - SPLIT_LO).
const INV_LN2_HI: f64 = 1.442_695_040_888_963_4;
const INV_LN2_LO: f64 = 2.035_527_374_093_103_3e-17;
const INV_LN2_SPLIT_HI: f64 = 1.442_695_051_431_655_9;
const INV_LN2_SPLIT_LO: f64 = 1.054_269_249_678_441_2e-8;
const LN2_HI: f64 = 0.693_147_180_559_945_3;
const LN2_LO: f64 = 2.319_046_813_846_299_6e-17;
const LN2_SPLIT_HI: f64 = 0.693_147_182_464_599_6;
const LN2_SPLIT_LO: f64 = 1.904_654_323_148_236e-9;

/// Re-establish the `|lo| <= 0.5 * ulp(hi)` invariant after an operation that
/// may have violated it.
#[inline]
pub(crate) fn normalize(hi: f64, lo: f64) -> (f64, f64) {
    let sum = hi + lo;
    (sum, lo + (hi - sum))
}

/// Precise `x + y` for double-double operands, any magnitude order.
#[inline]
pub(crate) fn add(x: (f64, f64), y: (f64, f64)) -> (f64, f64) {
    let (x_hi, x_lo) = x;
    let (y_hi, y_lo) = y;
    let hi_sum = x_hi + y_hi;
    let hi_round = x_hi - hi_sum;
    let lo_sum = x_lo + y_lo;
    let lo_round = x_lo - lo_sum;
    let hi_err = ((x_hi - (hi_round + hi_sum)) + (hi_round + y_hi)) + lo_sum;
    let sum = hi_sum + hi_err;
    let err =
        ((x_lo - (lo_round + lo_sum)) + (lo_round + y_lo)) + (hi_err + (hi_sum - sum));
    let hi = sum + err;
    (hi, err + (sum - hi))
}

/// Precise `x + y` for a native-double right operand.
#[inline]
pub(crate) fn add_f64(x: (f64, f64), y: f64) -> (f64, f64) {
    let (x_hi, x_lo) = x;
    let sum = x_hi + y;
    let round = x_hi - sum;
    let err = ((x_hi - (sum + round)) + (y + round)) + x_lo;
    let hi = sum + err;
    (hi, err + (sum - hi))
}

/// Dekker fast add. Requires `|x| >= |y|`; silently loses accuracy otherwise.
#[inline]
pub(crate) fn add_fast(x: (f64, f64), y: (f64, f64)) -> (f64, f64) {
    let (x_hi, x_lo) = x;
    let (y_hi, y_lo) = y;
    let sum = x_hi + y_hi;
    let round = x_hi - sum;
    let err = ((x_hi - (round + sum)) + (round + y_hi)) + (x_lo + y_lo);
    let hi = sum + err;
    (hi, err + (sum - hi))
}

/// Precise `x - y` for double-double operands, any magnitude order.
#[inline]
pub(crate) fn sub(x: (f64, f64), y: (f64, f64)) -> (f64, f64) {
    let (x_hi, x_lo) = x;
    let (y_hi, y_lo) = y;
    let lo_diff = x_lo - y_lo;
    let lo_round = x_lo - lo_diff;
    let hi_diff = x_hi - y_hi;
    let hi_round = x_hi - hi_diff;
    let hi_err = ((x_hi - (hi_round + hi_diff)) + (hi_round - y_hi)) + lo_diff;
    let diff = hi_diff + hi_err;
    let err =
        (hi_err + (hi_diff - diff)) + ((x_lo - (lo_round + lo_diff)) + (lo_round - y_lo));
    let hi = diff + err;
    (hi, err + (diff - hi))
}

/// Precise `x - y` for a native-double right operand.
#[inline]
pub(crate) fn sub_f64(x: (f64, f64), y: f64) -> (f64, f64) {
    let (x_hi, x_lo) = x;
    let diff = x_hi - y;
    let round = x_hi - diff;
    let err = ((x_hi - (round + diff)) + (round - y)) + x_lo;
    let hi = diff + err;
    (hi, err + (diff - hi))
}

/// Precise `y - x` with a native-double left operand.
#[inline]
pub(crate) fn sub_from_f64(x: (f64, f64), y: f64) -> (f64, f64) {
    let (x_hi, x_lo) = x;
    let diff = y - x_hi;
    let round = y - diff;
    let err = ((y - (round + diff)) + (round - x_hi)) - x_lo;
    let hi = diff + err;
    (hi, err + (diff - hi))
}

/// Dekker fast subtract. Requires `|x| >= |y|`.
#[inline]
pub(crate) fn sub_fast(x: (f64, f64), y: (f64, f64)) -> (f64, f64) {
    let (x_hi, x_lo) = x;
    let (y_hi, y_lo) = y;
    let diff = x_hi - y_hi;
    let round = x_hi - diff;
    let err = (((x_hi - (round + diff)) + (round - y_hi)) + x_lo) - y_lo;
    let hi = diff + err;
    (hi, err + (diff - hi))
}

/// Full double-double product. Splits both leading doubles into 26-bit halves
/// so the cross products recover the rounding error of the native multiply,
/// then folds in the carried low-order terms.
#[inline]
pub(crate) fn mul(x: (f64, f64), y: (f64, f64)) -> (f64, f64) {
    let (x_hi, x_lo) = x;
    let (y_hi, y_lo) = y;
    let mut x_split_hi = SPLIT * x_hi;
    x_split_hi += x_hi - x_split_hi;
    let x_split_lo = x_hi - x_split_hi;
    let mut y_split_hi = SPLIT * y_hi;
    y_split_hi += y_hi - y_split_hi;
    let y_split_lo = y_hi - y_split_hi;
    let prod = x_hi * y_hi;
    let err = (((x_split_hi * y_split_hi - prod)
        + (x_split_hi * y_split_lo + x_split_lo * y_split_hi))
        + x_split_lo * y_split_lo)
        + (x_lo * y_hi + x_hi * y_lo);
    let hi = prod + err;
    (hi, err + (prod - hi))
}

/// `x * y` for a native-double right operand.
#[inline]
pub(crate) fn mul_f64(x: (f64, f64), y: f64) -> (f64, f64) {
    let (x_hi, x_lo) = x;
    let mut x_split_hi = SPLIT * x_hi;
    x_split_hi += x_hi - x_split_hi;
    let x_split_lo = x_hi - x_split_hi;
    let mut y_split_hi = SPLIT * y;
    y_split_hi += y - y_split_hi;
    let y_split_lo = y - y_split_hi;
    let prod = x_hi * y;
    let err = (((x_split_hi * y_split_hi - prod)
        + (x_split_hi * y_split_lo + x_split_lo * y_split_hi))
        + x_split_lo * y_split_lo)
        + x_lo * y;
    let hi = prod + err;
    (hi, err + (prod - hi))
}

/// Exact scaling by a power of two.
#[inline]
pub(crate) fn mul_pow2(x: (f64, f64), y: f64) -> (f64, f64) {
    (x.0 * y, x.1 * y)
}

/// Exact division by a power of two.
#[inline]
pub(crate) fn div_pow2(x: (f64, f64), y: f64) -> (f64, f64) {
    (x.0 / y, x.1 / y)
}

/// Double-double square. One split instead of two; the `2 * hi * lo` cross
/// term carries the low half.
#[inline]
pub(crate) fn sqr(x: (f64, f64)) -> (f64, f64) {
    let (x_hi, x_lo) = x;
    let mut split_hi = SPLIT * x_hi;
    split_hi += x_hi - split_hi;
    let split_lo = x_hi - split_hi;
    let prod = x_hi * x_hi;
    let err = ((((split_hi * split_hi - prod) + split_hi * split_lo * 2.0)
        + split_lo * split_lo)
        + x_hi * x_lo * 2.0)
        + x_lo * x_lo;
    let hi = err + prod;
    (hi, err + (prod - hi))
}

/// Full double-double divide: native divide for the quotient estimate, exact
/// residual via the split product, one Newton correction.
#[inline]
pub(crate) fn div(x: (f64, f64), y: (f64, f64)) -> (f64, f64) {
    let (x_hi, x_lo) = x;
    let (y_hi, y_lo) = y;
    let quot = x_hi / y_hi;
    let mut y_split_hi = SPLIT * y_hi;
    y_split_hi += y_hi - y_split_hi;
    let y_split_lo = y_hi - y_split_hi;
    let mut q_split_hi = SPLIT * quot;
    q_split_hi += quot - q_split_hi;
    let q_split_lo = quot - q_split_hi;
    let prod = y_hi * quot;
    let prod_err = (((y_split_hi * q_split_hi - prod)
        + (y_split_hi * q_split_lo + y_split_lo * q_split_hi))
        + y_split_lo * q_split_lo)
        + y_lo * quot;
    let lo_diff = x_lo - prod_err;
    let lo_round = x_lo - lo_diff;
    let hi_diff = x_hi - prod;
    let hi_err = (x_hi - ((x_hi - hi_diff) + hi_diff)) + lo_diff;
    let resid = hi_diff + hi_err;
    let resid_err = hi_err
        + ((hi_diff - resid) + ((x_lo - (lo_round + lo_diff)) + (lo_round - prod_err)));
    let resid_sum = resid + resid_err;
    let corr = resid_sum / y_hi;
    let quot_adj = quot + (resid_err + (resid - resid_sum)) / y_hi;
    let hi = quot_adj + corr;
    (hi, corr + (quot_adj - hi))
}

/// `x / y` for a native-double divisor.
#[inline]
pub(crate) fn div_f64(x: (f64, f64), y: f64) -> (f64, f64) {
    let (x_hi, x_lo) = x;
    let quot = x_hi / y;
    let mut q_split_hi = SPLIT * quot;
    q_split_hi += quot - q_split_hi;
    let q_split_lo = quot - q_split_hi;
    let mut y_split_hi = SPLIT * y;
    y_split_hi += y - y_split_hi;
    let y_split_lo = y - y_split_hi;
    let prod = quot * y;
    let resid = x_hi - prod;
    let resid_round = x_hi - resid;
    let corr = (resid
        + ((((x_hi - (resid_round + resid)) + (resid_round - prod)) + x_lo)
            - (((q_split_hi * y_split_hi - prod)
                + (q_split_hi * y_split_lo + q_split_lo * y_split_hi))
                + q_split_lo * y_split_lo)))
        / y;
    let hi = quot + corr;
    (hi, corr + (quot - hi))
}

/// Fast divide: single residual pass against the double-double divisor.
#[inline]
pub(crate) fn div_fast(x: (f64, f64), y: (f64, f64)) -> (f64, f64) {
    let (x_hi, x_lo) = x;
    let (y_hi, y_lo) = y;
    let quot = x_hi / y_hi;
    let mut y_split_hi = SPLIT * y_hi;
    y_split_hi += y_hi - y_split_hi;
    let y_split_lo = y_hi - y_split_hi;
    let mut q_split_hi = SPLIT * quot;
    q_split_hi += quot - q_split_hi;
    let q_split_lo = quot - q_split_hi;
    let prod = y_hi * quot;
    let prod_err = (((y_split_hi * q_split_hi - prod)
        + (y_split_hi * q_split_lo + y_split_lo * q_split_hi))
        + y_split_lo * q_split_lo)
        + y_lo * quot;
    let prod_sum = prod + prod_err;
    let resid = x_hi - prod_sum;
    let corr = (resid
        + ((((x_hi - resid) - prod_sum) - ((prod - prod_sum) + prod_err)) + x_lo))
        / y_hi;
    let hi = quot + corr;
    (hi, corr + (quot - hi))
}

/// `y / x` with a native-double dividend.
#[inline]
pub(crate) fn div_into_f64(x: (f64, f64), y: f64) -> (f64, f64) {
    let (x_hi, x_lo) = x;
    let quot = y / x_hi;
    let mut x_split_hi = SPLIT * x_hi;
    x_split_hi += x_hi - x_split_hi;
    let x_split_lo = x_hi - x_split_hi;
    let mut q_split_hi = SPLIT * quot;
    q_split_hi += quot - q_split_hi;
    let q_split_lo = quot - q_split_hi;
    let prod = x_hi * quot;
    let corr = ((y - prod)
        - ((((x_split_hi * q_split_hi - prod)
            + (x_split_hi * q_split_lo + x_split_lo * q_split_hi))
            + x_split_lo * q_split_lo)
            + x_lo * quot))
        / x_hi;
    let hi = quot + corr;
    (hi, corr + (quot - hi))
}

/// `1 / x`, one Newton correction around the native reciprocal.
#[inline]
pub(crate) fn recip(x: (f64, f64)) -> (f64, f64) {
    let (x_hi, x_lo) = x;
    let quot = 1.0 / x_hi;
    let mut x_split_hi = SPLIT * x_hi;
    x_split_hi += x_hi - x_split_hi;
    let x_split_lo = x_hi - x_split_hi;
    let mut q_split_hi = SPLIT * quot;
    q_split_hi += quot - q_split_hi;
    let q_split_lo = quot - q_split_hi;
    let prod = x_hi * quot;
    let corr = ((1.0 - prod)
        - ((((x_split_hi * q_split_hi - prod)
            + (x_split_hi * q_split_lo + x_split_lo * q_split_hi))
            + x_split_lo * q_split_lo)
            + x_lo * quot))
        / x_hi;
    let hi = quot + corr;
    (hi, corr + (quot - hi))
}

/// Double-double square root: Newton refinement seeded by the native
/// `1/sqrt`. Zero maps to zero; negative input propagates the native NaN.
pub(crate) fn sqrt(x: (f64, f64)) -> (f64, f64) {
    let (x_hi, x_lo) = x;
    if x_hi == 0.0 && x_lo == 0.0 {
        return (0.0, 0.0);
    }

    let mut half_inv_root = 1.0 / x_hi.sqrt();
    let root = x_hi * half_inv_root;
    half_inv_root *= 0.5;

    // Exact square of the 53-bit root estimate.
    let mut r_split_hi = SPLIT * root;
    r_split_hi += root - r_split_hi;
    let r_split_lo = root - r_split_hi;
    let root_sq = root * root;
    let root_sq_err =
        ((r_split_hi * r_split_hi - root_sq) + r_split_hi * r_split_lo * 2.0)
            + r_split_lo * r_split_lo;

    // resid = x - root^2, full precision.
    let lo_diff = x_lo - root_sq_err;
    let lo_round = x_lo - lo_diff;
    let hi_diff = x_hi - root_sq;
    let hi_round = x_hi - hi_diff;
    let hi_err = ((x_hi - (hi_round + hi_diff)) + (hi_round - root_sq)) + lo_diff;
    let resid_hi_pre = hi_diff + hi_err;
    let resid_lo_pre = (hi_err + (hi_diff - resid_hi_pre))
        + ((x_lo - (lo_round + lo_diff)) + (lo_round - root_sq_err));
    let resid_hi = resid_hi_pre + resid_lo_pre;
    let resid_lo = resid_lo_pre + (resid_hi_pre - resid_hi);

    // corr = resid * (0.5 / sqrt(x)), then root + corr.
    let mut resid_split_hi = SPLIT * resid_hi;
    resid_split_hi += resid_hi - resid_split_hi;
    let resid_split_lo = resid_hi - resid_split_hi;
    let mut g_split_hi = SPLIT * half_inv_root;
    g_split_hi += half_inv_root - g_split_hi;
    let g_split_lo = half_inv_root - g_split_hi;
    let corr = resid_hi * half_inv_root;
    let mut corr_err = ((resid_split_hi * g_split_hi - corr)
        + (resid_split_hi * g_split_lo + resid_split_lo * g_split_hi))
        + resid_split_lo * g_split_lo;
    corr_err += resid_lo * half_inv_root;
    let corr_hi = corr + corr_err;
    let corr_lo = corr_err + (corr - corr_hi);
    let hi = corr_hi + root;
    let round = corr_hi - hi;
    (hi, corr_lo + ((corr_hi - (hi + round)) + (root + round)))
}

/// Cheaper square root: same seed, single f64 residual pass.
pub(crate) fn sqrt_fast(x: (f64, f64)) -> (f64, f64) {
    let (x_hi, x_lo) = x;
    if x_hi == 0.0 && x_lo == 0.0 {
        return (0.0, 0.0);
    }

    let inv_root = 1.0 / x_hi.sqrt();
    let root = x_hi * inv_root;
    let mut r_split_hi = SPLIT * root;
    r_split_hi += root - r_split_hi;
    let r_split_lo = root - r_split_hi;
    let root_sq = root * root;
    let root_sq_err =
        ((r_split_hi * r_split_hi - root_sq) + r_split_hi * r_split_lo * 2.0)
            + r_split_lo * r_split_lo;
    let resid = x_hi - root_sq;
    let resid_round = x_hi - resid;
    let corr = (resid + (((x_hi - (resid_round + resid)) + x_lo) - root_sq_err))
        * inv_root
        * 0.5;
    let hi = root + corr;
    let round = root - hi;
    (hi, (root - (round + hi)) + (round + corr))
}

/// Round half up; the tie direction the half-point corrections below assume.
#[inline]
fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Round a double-double toward the nearest integer, letting `lo` break the
/// tie when `hi` sits exactly on an integer or a half.
#[inline]
pub(crate) fn round_to_i64(hi: f64, lo: f64) -> i64 {
    let hi_rounded = round_half_up(hi);
    if hi == hi_rounded {
        (hi_rounded + round_half_up(lo)) as i64
    } else if (hi_rounded - hi).abs() == 0.5 && lo < 0.0 {
        // hi sat exactly on a half and lo pulls the true value below it.
        hi_rounded as i64 - 1
    } else {
        hi_rounded as i64
    }
}

/// Nearest-integer rounding of the full double-double value.
pub(crate) fn round(x: (f64, f64)) -> (f64, f64) {
    let (x_hi, x_lo) = x;
    let hi_rounded = round_half_up(x_hi);
    if x_hi == hi_rounded {
        // hi is already integral; lo decides the final digit.
        let lo_rounded = round_half_up(x_lo);
        let hi = hi_rounded + lo_rounded;
        (hi, lo_rounded + (hi_rounded - hi))
    } else if (hi_rounded - x_hi).abs() == 0.5 && x_lo < 0.0 {
        (hi_rounded - 1.0, 0.0)
    } else {
        (hi_rounded, 0.0)
    }
}

pub(crate) fn floor(x: (f64, f64)) -> (f64, f64) {
    let (x_hi, x_lo) = x;
    let hi_floor = x_hi.floor();
    if x_hi == hi_floor {
        let lo_floor = x_lo.floor();
        let hi = hi_floor + lo_floor;
        (hi, lo_floor + (hi_floor - hi))
    } else {
        (hi_floor, 0.0)
    }
}

pub(crate) fn ceil(x: (f64, f64)) -> (f64, f64) {
    let (x_hi, x_lo) = x;
    let hi_ceil = x_hi.ceil();
    if x_hi == hi_ceil {
        let lo_ceil = x_lo.ceil();
        let hi = hi_ceil + lo_ceil;
        (hi, lo_ceil + (hi_ceil - hi))
    } else {
        (hi_ceil, 0.0)
    }
}

pub(crate) fn trunc(x: (f64, f64)) -> (f64, f64) {
    let (x_hi, x_lo) = x;
    let hi_trunc = x_hi.trunc();
    if x_hi == hi_trunc {
        let lo_trunc = x_lo.trunc();
        let hi = hi_trunc + lo_trunc;
        (hi, lo_trunc + (hi_trunc - hi))
    } else {
        (hi_trunc, 0.0)
    }
}

/// Integer power by binary exponentiation; negative exponents go through the
/// reciprocal of the positive power.
pub(crate) fn pow_i(x: (f64, f64), n: i32) -> (f64, f64) {
    let mut remaining = (n as i64).unsigned_abs();
    let mut base = x;
    let mut acc = (1.0, 0.0);
    while remaining > 0 {
        if remaining & 1 == 1 {
            acc = mul(acc, base);
        }
        base = sqr(base);
        remaining >>= 1;
    }
    if n < 0 {
        recip(acc)
    } else {
        acc
    }
}

/// n-th root. One Newton step on the reciprocal root, seeded by the native
/// `exp(ln(x) / -n)`, composed from the primitive kernels above.
pub(crate) fn root_i(x: (f64, f64), n: i32) -> (f64, f64) {
    let (x_hi, x_lo) = x;
    if x_hi == 0.0 && x_lo == 0.0 {
        return (0.0, 0.0);
    }
    if x_hi < 0.0 && (n & 1) == 0 {
        return (f64::NAN, 0.0);
    }
    if n == 1 {
        return x;
    }
    if n == 2 {
        return sqrt(x);
    }

    let mag = if x_hi < 0.0 { (-x_hi, -x_lo) } else { (x_hi, x_lo) };
    // seed ~ mag^(-1/n) at 53 bits; libm keeps the seed identical across
    // platforms, and with it the refined result
    let seed = libm::exp(libm::log(mag.0) / -(n as f64));

    // seed^n in full precision
    let mut remaining = n as i64;
    let mut base = (seed, 0.0);
    let mut power = (1.0, 0.0);
    while remaining > 0 {
        if remaining & 1 == 1 {
            power = mul(power, base);
        }
        base = sqr(base);
        remaining >>= 1;
    }

    // Newton: inv_root = seed + (1 - mag * seed^n) * seed / n
    let resid = sub_from_f64(mul(mag, power), 1.0);
    let update = add_f64(div_f64(mul_f64(resid, seed), n as f64), seed);
    let signed = if x_hi < 0.0 { (-update.0, -update.1) } else { update };
    recip(signed)
}

/// `exp(x)`. Reduces by the nearest multiple of ln2, runs the fixed-point
/// series until the running term drops below `SERIES_EPS`, then reconstructs
/// with `2^k` built by repeated squaring.
pub(crate) fn exp(x: (f64, f64)) -> (f64, f64) {
    let (x_hi, x_lo) = x;
    if x_hi > EXP_OVERFLOW {
        return (f64::INFINITY, 0.0);
    }

    // x / ln2 as a split product, then the integer multiple k.
    let mut x_split_hi = SPLIT * x_hi;
    x_split_hi += x_hi - x_split_hi;
    let x_split_lo = x_split_hi - x_hi;
    let quot_hi = x_hi * INV_LN2_HI;
    let quot_lo = (((x_split_hi * INV_LN2_SPLIT_HI - quot_hi)
        - (x_split_lo * INV_LN2_SPLIT_HI + x_split_hi * INV_LN2_SPLIT_LO))
        + x_split_lo * INV_LN2_SPLIT_LO)
        + (x_lo * INV_LN2_HI + x_hi * INV_LN2_LO);
    let k = round_to_i64(quot_hi, quot_lo);
    let k_f = k as f64;

    // k * ln2 against the pre-split halves of ln2's leading double.
    let ln2_k_hi = LN2_HI * k_f;
    let ln2_k_lo =
        ((k_f * LN2_SPLIT_HI - ln2_k_hi) - k_f * LN2_SPLIT_LO) + LN2_LO * k_f;

    // Reduced argument r = x - k * ln2.
    let red_lo0 = x_lo - ln2_k_lo;
    let red_round = x_lo - red_lo0;
    let red_diff = x_hi - ln2_k_hi;
    let red_hi = red_diff + red_lo0;
    let red_lo = ((x_lo - (red_round + red_lo0)) + (red_round - ln2_k_lo))
        + (red_lo0 + (red_diff - red_hi));

    // Series accumulator starts at 1 + r.
    let one_sum = red_hi + 1.0;
    let one_round = red_hi - one_sum;
    let mut sum_lo = ((red_hi - (one_sum + one_round)) + (1.0 + one_round)) + red_lo;
    let sum_hi = one_sum + sum_lo;
    sum_lo += one_sum - sum_hi;

    // First power term r^2.
    let mut r_split_hi = SPLIT * red_hi;
    r_split_hi += red_hi - r_split_hi;
    let r_split_lo = red_hi - r_split_hi;
    let r_sq = red_hi * red_hi;
    let mut pow_lo = ((r_split_hi * r_split_hi - r_sq)
        + r_split_hi * r_split_lo * 2.0)
        + r_split_lo * r_split_lo;
    pow_lo += red_hi * red_lo * 2.0;
    pow_lo += red_lo * red_lo;
    let pow_hi = pow_lo + r_sq;
    pow_lo += r_sq - pow_hi;

    let (total_hi, total_lo, term_hi, term_lo) =
        exp_series(sum_hi, sum_lo, pow_hi, pow_lo, red_hi, red_lo);
    let (folded_hi, folded_lo) = fold_term(total_hi, total_lo, term_hi, term_lo);
    let scale = pow2_scale(k);
    (folded_hi * scale, folded_lo * scale)
}

/// `ln(x)`. Computes `s = ln(hi)` natively, evaluates `exp(-s)` through the
/// shared series machinery, and applies one Newton step:
/// `ln(x) = s + (x * exp(-s) - 1)`. Non-positive input yields the NaN
/// sentinel.
pub(crate) fn ln(x: (f64, f64)) -> (f64, f64) {
    let (x_hi, x_lo) = x;
    if x_hi <= 0.0 {
        return (f64::NAN, 0.0);
    }

    let approx = libm::log(x_hi);

    // t = round(-s / ln2) via the same split product exp() uses.
    let mut s_split_hi = SPLIT * approx;
    s_split_hi += approx - s_split_hi;
    let s_split_lo = s_split_hi - approx;
    let quot_hi = approx * INV_LN2_HI;
    let quot_lo = (((s_split_hi * INV_LN2_SPLIT_HI - quot_hi)
        - (s_split_lo * INV_LN2_SPLIT_HI + s_split_hi * INV_LN2_SPLIT_LO))
        + s_split_lo * INV_LN2_SPLIT_LO)
        + approx * INV_LN2_LO;
    let t = round_to_i64(-quot_hi, -quot_lo);
    let t_f = t as f64;

    // u = s + t * ln2, so the reduced argument of exp(-s) is -u.
    let ln2_t_hi = LN2_HI * t_f;
    let ln2_t_lo =
        ((t_f * LN2_SPLIT_HI - ln2_t_hi) - t_f * LN2_SPLIT_LO) + LN2_LO * t_f;
    let u_base = ln2_t_hi + approx;
    let u_hi = u_base + ln2_t_lo;
    let u_neg_lo = (u_hi - u_base) - ln2_t_lo;

    // Accumulator starts at 1 - u.
    let one_diff = 1.0 - u_hi;
    let mut sum_lo = ((1.0 - one_diff) - u_hi) + u_neg_lo;
    let sum_hi = one_diff + sum_lo;
    sum_lo += one_diff - sum_hi;

    // Reduced argument r = -u and its square.
    let red_hi = -u_hi;
    let red_lo = u_neg_lo;
    let mut r_split_hi = SPLIT * red_hi;
    r_split_hi += red_hi - r_split_hi;
    let r_split_lo = red_hi - r_split_hi;
    let u_sq = u_hi * u_hi;
    let mut pow_lo = ((r_split_hi * r_split_hi - u_sq)
        + r_split_hi * r_split_lo * 2.0)
        + r_split_lo * r_split_lo;
    pow_lo += red_hi * red_lo * 2.0;
    pow_lo += red_lo * red_lo;
    let pow_hi = pow_lo + u_sq;
    pow_lo += u_sq - pow_hi;

    let (total_hi, total_lo, term_hi, term_lo) =
        exp_series(sum_hi, sum_lo, pow_hi, pow_lo, red_hi, red_lo);
    let (folded_hi, folded_lo) = fold_term(total_hi, total_lo, term_hi, term_lo);
    let scale = pow2_scale(t);
    let exp_neg_hi = folded_hi * scale;
    let exp_neg_lo = folded_lo * scale;

    // Newton: result = s + (x * exp(-s) - 1).
    let mut x_split_hi = SPLIT * x_hi;
    x_split_hi += x_hi - x_split_hi;
    let x_split_lo = x_hi - x_split_hi;
    let mut g_split_hi = SPLIT * exp_neg_hi;
    g_split_hi += exp_neg_hi - g_split_hi;
    let g_split_lo = exp_neg_hi - g_split_hi;
    let prod = x_hi * exp_neg_hi;
    let prod_err = (((x_split_hi * g_split_hi - prod)
        + (x_split_hi * g_split_lo + x_split_lo * g_split_hi))
        + x_split_lo * g_split_lo)
        + (x_lo * exp_neg_hi + x_hi * exp_neg_lo);
    let resid_base = prod - 1.0;
    let resid_hi = resid_base + prod_err;
    let resid_lo = prod_err + (resid_base - resid_hi);
    let total = resid_hi + approx;
    let total_round = resid_hi - total;
    let err = resid_lo + ((resid_hi - (total + total_round)) + (approx + total_round));
    let hi = total + err;
    (hi, err + (total - hi))
}

/// The shared exp/log fixed-point series: accumulates `power * coeff` terms
/// into `sum`, advancing `power *= r` and `coeff = coeff / next-q` each pass,
/// until the running term falls below `SERIES_EPS`. Returns the accumulator
/// and the final (unfolded) term.
fn exp_series(
    mut sum_hi: f64,
    mut sum_lo: f64,
    mut pow_hi: f64,
    mut pow_lo: f64,
    red_hi: f64,
    red_lo: f64,
) -> (f64, f64, f64, f64) {
    let mut coeff_hi = 0.5_f64;
    let mut coeff_lo = 0.0_f64;
    let mut q = 2.0_f64;
    let mut term_hi = pow_hi * coeff_hi;
    let mut term_lo = pow_lo * coeff_hi;

    loop {
        // sum += term
        let lo_sum = sum_lo + term_lo;
        let lo_round = sum_lo - lo_sum;
        let hi_sum = sum_hi + term_hi;
        let hi_round = sum_hi - hi_sum;
        let hi_err = ((sum_hi - (hi_round + hi_sum)) + (hi_round + term_hi)) + lo_sum;
        let new_sum = hi_sum + hi_err;
        sum_lo = (hi_err + (hi_sum - new_sum))
            + ((sum_lo - (lo_round + lo_sum)) + (lo_round + term_lo));
        sum_hi = new_sum + sum_lo;
        sum_lo += new_sum - sum_hi;

        // power *= r
        let mut p_split_hi = SPLIT * pow_hi;
        p_split_hi += pow_hi - p_split_hi;
        let p_split_lo = pow_hi - p_split_hi;
        let mut a_split_hi = SPLIT * red_hi;
        a_split_hi += red_hi - a_split_hi;
        let a_split_lo = red_hi - a_split_hi;
        let prod = pow_hi * red_hi;
        pow_lo = (((p_split_hi * a_split_hi - prod)
            + (p_split_hi * a_split_lo + p_split_lo * a_split_hi))
            + p_split_lo * a_split_lo)
            + (pow_lo * red_hi + pow_hi * red_lo);
        pow_hi = prod + pow_lo;
        pow_lo += prod - pow_hi;

        // coeff /= next q (q stays an exactly representable small integer)
        q += 1.0;
        let next_coeff = coeff_hi / q;
        let mut n_split_hi = SPLIT * next_coeff;
        n_split_hi += next_coeff - n_split_hi;
        let n_split_lo = next_coeff - n_split_hi;
        let scaled_back = next_coeff * q;
        let div_diff = coeff_hi - scaled_back;
        let div_round = coeff_hi - div_diff;
        coeff_lo = (div_diff
            + ((((coeff_hi - (div_round + div_diff)) + (div_round - scaled_back))
                + coeff_lo)
                - ((n_split_hi * q - scaled_back) + n_split_lo * q)))
            / q;
        coeff_hi = next_coeff;

        // term = power * coeff
        let mut pw_split_hi = SPLIT * pow_hi;
        pw_split_hi += pow_hi - pw_split_hi;
        let pw_split_lo = pow_hi - pw_split_hi;
        let mut c_split_hi = SPLIT * coeff_hi;
        c_split_hi += coeff_hi - c_split_hi;
        let c_split_lo = coeff_hi - c_split_hi;
        let t_prod = pow_hi * coeff_hi;
        term_lo = (((pw_split_hi * c_split_hi - t_prod)
            + (pw_split_hi * c_split_lo + pw_split_lo * c_split_hi))
            + pw_split_lo * c_split_lo)
            + (pow_lo * coeff_hi + pow_hi * coeff_lo);
        term_hi = t_prod + term_lo;
        term_lo += t_prod - term_hi;

        if !(term_hi > SERIES_EPS || term_hi < -SERIES_EPS) {
            return (sum_hi, sum_lo, term_hi, term_lo);
        }
    }
}

/// Fold the final series term into the accumulator.
fn fold_term(sum_hi: f64, sum_lo: f64, term_hi: f64, term_lo: f64) -> (f64, f64) {
    let lo_sum = sum_lo + term_lo;
    let lo_round = sum_lo - lo_sum;
    let hi_sum = sum_hi + term_hi;
    let hi_round = sum_hi - hi_sum;
    let hi_err = ((sum_hi - (hi_round + hi_sum)) + (hi_round + term_hi)) + lo_sum;
    let hi = hi_sum + hi_err;
    let lo = (hi_err + (hi_sum - hi))
        + ((sum_lo - (lo_round + lo_sum)) + (lo_round + term_lo));
    (hi, lo)
}

/// `2^k` by repeated squaring; exact for every k the reduction can produce.
fn pow2_scale(k: i64) -> f64 {
    let mut scale = 1.0_f64;
    let (mut base, mut remaining) = if k < 0 { (0.5, -k) } else { (2.0, k) };
    while remaining > 0 {
        if remaining & 1 == 1 {
            scale *= base;
        }
        base *= base;
        remaining >>= 1;
    }
    scale
}
