//! Viewport window over the complex plane.
//!
//! A window is immutable for the duration of a render call. Pixel
//! coordinates are always derived as `min + step * index` (never by
//! accumulating `step`), so the plane coordinate of a pixel is a pure
//! function of its indices and the same in every render strategy.

use crate::RealScalar;
use serde::{Deserialize, Serialize};

/// Rectangular region of the plane plus the per-pixel step, in the numeric
/// backend's own representation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Viewport<T> {
    pub xmin: T,
    pub xmax: T,
    pub ymin: T,
    pub ymax: T,
    pub step: T,
}

impl<T: RealScalar> Viewport<T> {
    pub fn new(xmin: T, xmax: T, ymin: T, ymax: T, step: T) -> Self {
        Self {
            xmin,
            xmax,
            ymin,
            ymax,
            step,
        }
    }

    /// Pixel columns covered by the window: `(xmax - xmin) / step`, rounded.
    pub fn columns(&self) -> u32 {
        grid_extent(self.xmin, self.xmax, self.step)
    }

    /// Pixel rows covered by the window.
    pub fn rows(&self) -> u32 {
        grid_extent(self.ymin, self.ymax, self.step)
    }

    /// Plane coordinate of pixel column `px`.
    #[inline]
    pub fn column_coord(&self, px: u32) -> T {
        self.xmin.add(self.step.mul(T::from_f64(px as f64)))
    }

    /// Plane coordinate of pixel row `py`.
    #[inline]
    pub fn row_coord(&self, py: u32) -> T {
        self.ymin.add(self.step.mul(T::from_f64(py as f64)))
    }
}

impl Viewport<f64> {
    /// Convert the boundary-form window into a backend-typed one.
    pub fn to_backend<T: RealScalar>(&self) -> Viewport<T> {
        Viewport {
            xmin: T::from_f64(self.xmin),
            xmax: T::from_f64(self.xmax),
            ymin: T::from_f64(self.ymin),
            ymax: T::from_f64(self.ymax),
            step: T::from_f64(self.step),
        }
    }

    /// Window for a pixel canvas centered on a plane point, one plane unit of
    /// `step` per pixel. This is the pan/zoom form UI layers produce.
    pub fn around_center(
        center_re: f64,
        center_im: f64,
        step: f64,
        width_px: u32,
        height_px: u32,
    ) -> Self {
        let half_width = (width_px / 2) as f64;
        let half_height = (height_px / 2) as f64;
        Self {
            xmin: -half_width * step + center_re,
            xmax: half_width * step + center_re,
            ymin: -half_height * step + center_im,
            ymax: half_height * step + center_im,
            step,
        }
    }
}

fn grid_extent<T: RealScalar>(min: T, max: T, step: T) -> u32 {
    let count = max.sub(min).div(step).add(T::from_f64(0.5)).to_f64();
    if count <= 0.0 {
        0
    } else {
        count as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DoubleDouble;

    #[test]
    fn classic_window_is_300_by_300() {
        let window = Viewport::new(-2.0, 1.0, -1.5, 1.5, 0.01);
        assert_eq!(window.columns(), 300);
        assert_eq!(window.rows(), 300);
    }

    #[test]
    fn grid_extent_matches_across_backends() {
        let window = Viewport::new(-2.0, 1.0, -1.5, 1.5, 0.01);
        let dd = window.to_backend::<DoubleDouble>();
        assert_eq!(dd.columns(), window.columns());
        assert_eq!(dd.rows(), window.rows());
    }

    #[test]
    fn coordinates_come_from_index_multiplication() {
        let window = Viewport::new(-2.0, 1.0, -1.5, 1.5, 0.01);
        assert_eq!(window.column_coord(0), -2.0);
        assert_eq!(window.column_coord(100), -2.0 + 0.01 * 100.0);
        assert_eq!(window.row_coord(150), -1.5 + 0.01 * 150.0);
    }

    #[test]
    fn around_center_spans_symmetrically() {
        let window = Viewport::around_center(0.25, -0.5, 0.001, 800, 600);
        assert!((window.xmax - window.xmin - 0.8).abs() < 1e-12);
        assert!((window.ymax - window.ymin - 0.6).abs() < 1e-12);
        assert!(((window.xmax + window.xmin) / 2.0 - 0.25).abs() < 1e-12);
        assert_eq!(window.step, 0.001);
    }

    #[test]
    fn empty_window_has_no_pixels() {
        let window = Viewport::new(1.0, 1.0, 0.0, 0.0, 0.01);
        assert_eq!(window.columns(), 0);
        assert_eq!(window.rows(), 0);
    }

    #[test]
    fn serde_roundtrip() {
        let window = Viewport::new(-2.0, 1.0, -1.5, 1.5, 0.01);
        let json = serde_json::to_string(&window).unwrap();
        let back: Viewport<f64> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, window);
    }
}
