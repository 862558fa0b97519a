//! Escape-time iteration kernels.
//!
//! Per-pixel state is `(z_re, z_im, iters)` with `z0 = c`; each step applies
//! `z <- z^2 + c` in a fixed operation order and bails out once
//! `|z|^2 >= 4` or the iteration cap is passed. A pixel that escapes reports
//! the 1-based count of the escaping step; a pixel that never escapes
//! reports [`interior_sentinel`], which keeps "interior" distinguishable
//! from "escaped exactly at the cap".
//!
//! The lane-batched kernels carry an explicit active mask per lane: a lane
//! retires the moment its own bailout condition fires (its counter stops
//! moving) while the remaining lanes iterate on, and the batch only ends
//! when every lane has retired. Per-pixel results are identical to the
//! scalar kernel.

use deepbrot_core::{DdLanes, RealScalar};

/// The count reported for pixels that never escape: one past the cap.
#[inline]
pub fn interior_sentinel(max_iterations: u32) -> u32 {
    max_iterations + 1
}

/// Scalar escape-time iteration for a single plane point.
pub fn escape_time<T: RealScalar>(c_re: T, c_im: T, max_iterations: u32) -> u32 {
    let two = T::two();
    let four = T::four();
    let mut z_re = c_re;
    let mut z_im = c_im;
    let mut iters = 0u32;
    loop {
        let re_sq = z_re.sqr();
        let im_sq = z_im.sqr();
        let next_re = re_sq.sub(im_sq).add(c_re);
        let next_im = two.mul(z_re).mul(z_im).add(c_im);
        z_re = next_re;
        z_im = next_im;
        iters += 1;
        let norm_sq = z_re.sqr().add(z_im.sqr());
        if !(norm_sq < four && iters <= max_iterations) {
            return iters;
        }
    }
}

/// Masked batch iteration over `W` adjacent plane points sharing one row.
pub fn escape_time_lanes<T: RealScalar, const W: usize>(
    c_re: &[T; W],
    c_im: T,
    max_iterations: u32,
) -> [u32; W] {
    let two = T::two();
    let four = T::four();
    let mut z_re = *c_re;
    let mut z_im = [c_im; W];
    let mut iters = [0u32; W];
    let mut active = [true; W];
    loop {
        let mut any_active = false;
        for lane in 0..W {
            // Retired lanes hold their state; only the live ones advance.
            if !active[lane] {
                continue;
            }
            let re_sq = z_re[lane].sqr();
            let im_sq = z_im[lane].sqr();
            let next_re = re_sq.sub(im_sq).add(c_re[lane]);
            let next_im = two.mul(z_re[lane]).mul(z_im[lane]).add(c_im);
            z_re[lane] = next_re;
            z_im[lane] = next_im;
            iters[lane] += 1;
            let norm_sq = next_re.sqr().add(next_im.sqr());
            active[lane] = norm_sq < four && iters[lane] <= max_iterations;
            any_active |= active[lane];
        }
        if !any_active {
            return iters;
        }
    }
}

/// Masked batch iteration in structure-of-arrays form with the fast
/// three-step add/sub, for the fast extended-precision tiers. All lanes run
/// the arithmetic every pass; the mask gates only the counters and
/// retirement, so retired lanes may grow toward the infinity sentinel
/// harmlessly.
pub fn escape_time_lanes_fast<const W: usize>(
    c_re: DdLanes<W>,
    c_im: DdLanes<W>,
    max_iterations: u32,
) -> [u32; W] {
    let mut z_re = c_re;
    let mut z_im = c_im;
    let mut iters = [0u32; W];
    let mut active = [true; W];
    loop {
        let re_sq = z_re.sqr();
        let im_sq = z_im.sqr();
        let cross = z_re.mul(z_im);
        let next_re = re_sq.sub_fast(im_sq).add_fast(c_re);
        let next_im = cross.add_fast(cross).add_fast(c_im);
        z_re = next_re;
        z_im = next_im;
        let norm_sq = next_re.sqr().add_fast(next_im.sqr());

        let mut any_active = false;
        for lane in 0..W {
            if active[lane] {
                iters[lane] += 1;
                active[lane] = norm_sq.hi[lane] < 4.0 && iters[lane] <= max_iterations;
                any_active |= active[lane];
            }
        }
        if !any_active {
            return iters;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deepbrot_core::{DoubleDouble, FastDoubleDouble, Float128};

    #[test]
    fn origin_reports_interior_sentinel() {
        // (0, 0) sits in the main cardioid and never escapes.
        assert_eq!(escape_time(0.0f64, 0.0, 50), 51);
        assert_eq!(escape_time(0.0f64, 0.0, 50), interior_sentinel(50));
    }

    #[test]
    fn point_two_escapes_on_first_iteration() {
        // z1 = 4 + 2 = 6, |z1|^2 = 36 >= 4.
        assert_eq!(escape_time(2.0f64, 0.0, 100), 1);
    }

    #[test]
    fn period_two_bulb_is_interior() {
        assert_eq!(escape_time(-1.0f64, 0.0, 200), interior_sentinel(200));
    }

    #[test]
    fn boundary_point_escapes_late_but_escapes() {
        let iters = escape_time(-0.75f64, 0.1, 1000);
        assert!(iters > 10);
        assert!(iters <= 1000);
    }

    #[test]
    fn interior_is_distinguishable_from_escape_at_cap() {
        // With a cap of 2, (0.26, 0) has not escaped yet at the cap...
        let c = 0.26f64;
        assert_eq!(escape_time(c, 0.0, 2), 3);
        // ...but it does escape eventually, reporting a count <= the cap.
        let escaped = escape_time(c, 0.0, 100);
        assert!(escaped <= 100, "escaped at {escaped}");
    }

    #[test]
    fn extended_backends_agree_with_f64_on_easy_points() {
        for (re, im) in [(0.0, 0.0), (2.0, 0.0), (-1.0, 0.0), (0.3, 0.5)] {
            let expected = escape_time(re, im, 100);
            assert_eq!(
                escape_time(DoubleDouble::from_f64(re), DoubleDouble::from_f64(im), 100),
                expected
            );
            assert_eq!(
                escape_time(Float128::from_f64(re), Float128::from_f64(im), 100),
                expected
            );
        }
    }

    #[test]
    fn lanes_match_scalar_per_pixel() {
        let c_im = -0.7f64;
        let c_re: [f64; 8] = std::array::from_fn(|i| -2.0 + 0.35 * i as f64);
        let batched = escape_time_lanes(&c_re, c_im, 75);
        for lane in 0..8 {
            assert_eq!(
                batched[lane],
                escape_time(c_re[lane], c_im, 75),
                "lane {lane} diverged"
            );
        }
    }

    #[test]
    fn lanes_handle_mixed_interior_and_escaping_pixels() {
        // Lane 0 is interior (runs to the sentinel), the rest escape early;
        // their counters must freeze while lane 0 keeps iterating.
        let c_re = [0.0f64, 2.0, 3.0, -2.5];
        let counts = escape_time_lanes(&c_re, 0.0, 40);
        assert_eq!(counts[0], 41);
        assert_eq!(counts[1], 1);
        assert_eq!(counts[2], 1);
        assert_eq!(counts[3], 1);
    }

    #[test]
    fn fast_soa_lanes_match_fast_scalar() {
        let window_re: [f64; 4] = [-1.8, -0.6, 0.2, 0.35];
        let c_im = 0.41f64;
        let c_re = DdLanes::<4>::from_fn(|i| DoubleDouble::from_f64(window_re[i]));
        let c_im_lanes = DdLanes::<4>::splat(DoubleDouble::from_f64(c_im));
        let batched = escape_time_lanes_fast(c_re, c_im_lanes, 60);
        for lane in 0..4 {
            let scalar = escape_time(
                FastDoubleDouble::from_f64(window_re[lane]),
                FastDoubleDouble::from_f64(c_im),
                60,
            );
            assert_eq!(batched[lane], scalar, "lane {lane} diverged");
        }
    }
}
