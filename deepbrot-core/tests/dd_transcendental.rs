//! sqrt, exp, log, and power family tests for the double-double type.

use deepbrot_core::DoubleDouble;

fn dd(v: f64) -> DoubleDouble {
    DoubleDouble::from_f64(v)
}

fn diff(a: DoubleDouble, b: DoubleDouble) -> f64 {
    let d = a.sub(b);
    (d.hi + d.lo).abs()
}

#[test]
fn sqrt_of_perfect_squares() {
    // power-of-two radicand: every intermediate is exact
    assert_eq!(dd(4.0).sqrt(), dd(2.0));
    assert_eq!(dd(0.0).sqrt(), DoubleDouble::ZERO);
    // non-power-of-two seed rounds, the refinement pulls it back
    let three = dd(9.0).sqrt();
    assert_eq!(three.hi, 3.0);
    assert!(three.lo.abs() < 1.0e-30);
}

#[test]
fn sqrt_squared_recovers_the_radicand() {
    for &v in &[2.0, 3.0, 0.5, 1234.5678, 1.0e-8] {
        let root = dd(v).sqrt();
        assert!(
            diff(root.sqr(), dd(v)) < 1.0e-30 * v.max(1.0),
            "sqrt({v})^2 drifted by {}",
            diff(root.sqr(), dd(v))
        );
    }
}

#[test]
fn sqrt_of_two_beats_native_precision() {
    let root = dd(2.0).sqrt();
    assert_eq!(root.hi, 2.0_f64.sqrt());
    // the correction term must be a real refinement, not noise
    assert!(root.lo.abs() > 0.0);
    assert!(root.lo.abs() < 1.0e-16);
}

#[test]
fn sqrt_of_negative_is_nan() {
    assert!(dd(-1.0).sqrt().is_nan());
    assert!(dd(-1.0e-300).sqrt().is_nan());
}

#[test]
fn sqrt_fast_is_close_to_sqrt() {
    for &v in &[2.0, 7.5, 0.125] {
        let precise = dd(v).sqrt();
        let fast = dd(v).sqrt_fast();
        assert!(diff(precise, fast) < 1.0e-30);
    }
    assert_eq!(dd(0.0).sqrt_fast(), DoubleDouble::ZERO);
}

#[test]
fn exp_of_zero_is_one() {
    assert_eq!(dd(0.0).exp(), DoubleDouble::ONE);
}

#[test]
fn exp_of_one_matches_the_e_constant() {
    let e = dd(1.0).exp();
    assert_eq!(e.hi, DoubleDouble::E.hi);
    assert!(diff(e, DoubleDouble::E) < 1.0e-31);
}

#[test]
fn exp_overflow_hits_the_infinity_sentinel() {
    assert!(dd(700.0).exp().is_infinite());
    assert!(!dd(100.0).exp().is_infinite());
}

#[test]
fn ln_of_e_is_one() {
    assert!(diff(DoubleDouble::E.ln(), DoubleDouble::ONE) < 1.0e-31);
}

#[test]
fn ln_of_two_matches_the_constant() {
    assert!(diff(dd(2.0).ln(), DoubleDouble::LN_2) < 1.0e-31);
}

#[test]
fn ln_inverts_exp() {
    for &v in &[0.5, 1.5, -2.25, 10.0] {
        let round_trip = dd(v).exp().ln();
        assert!(
            diff(round_trip, dd(v)) < 1.0e-30,
            "ln(exp({v})) drifted by {}",
            diff(round_trip, dd(v))
        );
    }
}

#[test]
fn ln_of_nonpositive_is_nan() {
    assert!(dd(0.0).ln().is_nan());
    assert!(dd(-3.0).ln().is_nan());
}

#[test]
fn log2_e_is_the_reciprocal_of_ln_2() {
    assert!(diff(DoubleDouble::LN_2.recip(), DoubleDouble::LOG2_E) < 1.0e-31);
}

#[test]
fn integer_powers_of_small_integers_are_exact() {
    assert_eq!(dd(2.0).powi(10), dd(1024.0));
    assert_eq!(dd(3.0).powi(4), dd(81.0));
    assert_eq!(dd(5.0).powi(0), DoubleDouble::ONE);
    assert_eq!(dd(4.0).powi(-1), dd(0.25));
}

#[test]
fn negative_powers_invert_positive_ones() {
    let x = dd(1.5);
    let p = x.powi(7);
    let n = x.powi(-7);
    assert!(diff(p * n, DoubleDouble::ONE) < 1.0e-30);
}

#[test]
fn real_powers_route_through_exp_log() {
    assert!(diff(dd(2.0).powf(3.0), dd(8.0)) < 1.0e-30);
    assert!(diff(dd(4.0).pow(dd(0.5)), dd(2.0)) < 1.0e-30);
    assert!(dd(-1.0).powf(2.0).is_nan());
}

#[test]
fn integer_roots_invert_integer_powers() {
    assert!(diff(dd(27.0).root_i(3), dd(3.0)) < 1.0e-30);
    assert!(diff(dd(32.0).root_i(5), dd(2.0)) < 1.0e-30);
    assert!(diff(dd(16.0).root_i(4), dd(2.0)) < 1.0e-30);
    // odd roots keep the sign
    assert!(diff(dd(-8.0).root_i(3), dd(-2.0)) < 1.0e-30);
}

#[test]
fn root_edge_cases() {
    assert_eq!(dd(0.0).root_i(5), DoubleDouble::ZERO);
    assert!(dd(-16.0).root_i(4).is_nan());
    assert_eq!(dd(7.0).root_i(1), dd(7.0));
    // the square root shortcut matches sqrt bit for bit
    assert_eq!(dd(2.0).root_i(2), dd(2.0).sqrt());
}

#[test]
fn real_roots_route_through_exp_log() {
    assert!(diff(dd(32.0).root_f(5.0), dd(2.0)) < 1.0e-30);
    assert!(diff(dd(1.0e6).root_f(3.0), dd(100.0)) < 1.0e-28);
}
