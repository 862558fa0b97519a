//! Ordering, rounding-to-integral, and conversion tests for the
//! double-double type. The integral operations look at `hi` first and only
//! consult `lo` when `hi` already sits on an integer, so no double-rounding
//! can creep in.

use deepbrot_core::DoubleDouble;

fn dd(v: f64) -> DoubleDouble {
    DoubleDouble::from_f64(v)
}

#[test]
fn ordering_uses_hi_then_lo() {
    assert!(dd(1.0) < dd(2.0));
    assert!(dd(-3.0) < dd(-2.0));
    assert!(DoubleDouble::new(1.0, 1.0e-20) > dd(1.0));
    assert!(DoubleDouble::new(1.0, -1.0e-20) < dd(1.0));
    assert_eq!(dd(5.0), dd(5.0));
}

#[test]
fn nan_never_compares() {
    let nan = DoubleDouble::NAN;
    assert!(!(nan < dd(1.0)));
    assert!(!(nan > dd(1.0)));
    assert!(nan != nan);
}

#[test]
fn min_max_respect_the_correction_term() {
    let lower = DoubleDouble::new(2.0, -1.0e-18);
    let upper = DoubleDouble::new(2.0, 1.0e-18);
    assert_eq!(lower.min(upper), lower);
    assert_eq!(lower.max(upper), upper);
    assert_eq!(dd(1.0).min(dd(-1.0)), dd(-1.0));
}

#[test]
fn floor_operates_on_hi_first() {
    assert_eq!(dd(2.7).floor(), dd(2.0));
    assert_eq!(dd(-2.3).floor(), dd(-3.0));
    // hi already integral: lo decides
    assert_eq!(DoubleDouble::new(2.0, 0.5).floor(), dd(2.0));
    assert_eq!(DoubleDouble::new(2.0, -1.0e-20).floor(), dd(1.0));
}

#[test]
fn ceil_operates_on_hi_first() {
    assert_eq!(dd(2.3).ceil(), dd(3.0));
    assert_eq!(dd(-2.7).ceil(), dd(-2.0));
    assert_eq!(DoubleDouble::new(3.0, 1.0e-20).ceil(), dd(4.0));
    assert_eq!(DoubleDouble::new(3.0, -0.25).ceil(), dd(3.0));
}

#[test]
fn trunc_drops_toward_zero() {
    assert_eq!(dd(2.9).trunc(), dd(2.0));
    assert_eq!(dd(-2.9).trunc(), dd(-2.0));
    assert_eq!(DoubleDouble::new(2.0, 0.9).trunc(), dd(2.0));
}

#[test]
fn round_breaks_half_ties_with_lo() {
    assert_eq!(dd(2.4).round(), dd(2.0));
    assert_eq!(dd(2.6).round(), dd(3.0));
    // exactly on the half: rounds up...
    assert_eq!(dd(2.5).round(), dd(3.0));
    // ...unless lo says the true value is below it
    assert_eq!(DoubleDouble::new(2.5, -1.0e-20).round(), dd(2.0));
    assert_eq!(DoubleDouble::new(-2.5, -1.0e-20).round(), dd(-3.0));
}

#[test]
fn to_i64_matches_round() {
    assert_eq!(dd(2.5).to_i64(), 3);
    assert_eq!(DoubleDouble::new(2.5, -1.0e-20).to_i64(), 2);
    assert_eq!(dd(-7.2).to_i64(), -7);
    assert_eq!(DoubleDouble::new(4.0, 0.75).to_i64(), 5);
}

#[test]
fn to_f64_is_the_leading_component() {
    let x = dd(0.1) + dd(0.2);
    assert_eq!(x.to_f64(), x.hi);
    assert_eq!(dd(-42.0).to_f64(), -42.0);
}

#[test]
fn sub_based_comparison_agrees_with_partial_ord() {
    // The renderer's bailout test is `a < b`; it must agree with the sign of
    // the subtraction the reference kernels used.
    let pairs = [
        (dd(3.9), dd(4.0)),
        (dd(4.1), dd(4.0)),
        (DoubleDouble::new(4.0, -1.0e-25), dd(4.0)),
        (DoubleDouble::new(4.0, 1.0e-25), dd(4.0)),
    ];
    for (a, b) in pairs {
        assert_eq!(a < b, a.sub(b).hi < 0.0, "mismatch for {a} vs {b}");
    }
}
