//! Render strategies: the scalar and lane-batched kernels behind one
//! interface, each with a single-threaded and a row-partitioned entry point.
//!
//! Results leave exclusively through the draw callback; the engine never
//! owns pixel storage. In the multi-threaded paths each rayon task owns a
//! disjoint set of rows, so the caller's buffer needs no locking as long as
//! its callback writes only the `(x, y)` it is handed. Row completion order
//! is unspecified.
//!
//! Cancellation is coarse: the abort state is polled once per row (scalar)
//! or once per batch (vectorized). A row or batch that has started always
//! completes, so `false` means "some rows were never drawn", never "a row
//! was half-drawn".

use crate::cancellation::AbortFlag;
use crate::kernel::{escape_time, escape_time_lanes, escape_time_lanes_fast};
use deepbrot_core::{DdLanes, DoubleDouble, RealScalar, Viewport};
use rayon::prelude::*;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Per-pixel output callback: `(x, y, iteration_count)`.
pub type DrawPixel = Arc<dyn Fn(u32, u32, u32) + Send + Sync>;

/// Caller-supplied advisory abort predicate.
pub type AbortPredicate = Arc<dyn Fn() -> bool + Send + Sync>;

/// Draw callback plus abort state, shared by every strategy.
pub struct RenderSink {
    draw: DrawPixel,
    abort: AbortPredicate,
    pinned: AbortFlag,
}

impl RenderSink {
    pub fn new(draw: DrawPixel, abort: AbortPredicate) -> Self {
        Self {
            draw,
            abort,
            pinned: AbortFlag::new(),
        }
    }

    /// True once the caller's predicate fires or the strategy has been
    /// pinned.
    #[inline]
    pub fn aborted(&self) -> bool {
        self.pinned.is_set() || (self.abort)()
    }

    #[inline]
    fn draw(&self, x: u32, y: u32, iters: u32) {
        (self.draw)(x, y, iters)
    }

    /// Handle to the pin flag; triggering it makes every later render on
    /// this strategy return `false` immediately.
    pub fn abort_flag(&self) -> AbortFlag {
        self.pinned.clone()
    }
}

/// One render strategy. Both entry points return `false` iff the render was
/// abandoned before completion; a `false` render's output buffer is
/// incomplete and must be discarded by the caller.
///
/// This trait is also the seam for opaque external implementations (such as
/// a GPU renderer behind a foreign-function boundary): anything satisfying
/// the contract can stand in for the built-in kernels.
pub trait EscapeTimeRenderer: Send + Sync {
    fn render_single_threaded(&self, window: &Viewport<f64>, max_iterations: u32) -> bool;
    fn render_multi_threaded(&self, window: &Viewport<f64>, max_iterations: u32) -> bool;
    fn abort_flag(&self) -> AbortFlag;
}

/// One pixel at a time, generic over the numeric backend.
pub struct ScalarRenderer<T> {
    sink: RenderSink,
    backend: PhantomData<T>,
}

impl<T: RealScalar> ScalarRenderer<T> {
    pub fn new(draw: DrawPixel, abort: AbortPredicate) -> Self {
        Self {
            sink: RenderSink::new(draw, abort),
            backend: PhantomData,
        }
    }
}

impl<T: RealScalar> EscapeTimeRenderer for ScalarRenderer<T> {
    fn render_single_threaded(&self, window: &Viewport<f64>, max_iterations: u32) -> bool {
        let w = window.to_backend::<T>();
        let columns = w.columns();
        let rows = w.rows();
        for py in 0..rows {
            if self.sink.aborted() {
                log::debug!("scalar render aborted at row {py}/{rows}");
                return false;
            }
            let c_im = w.row_coord(py);
            for px in 0..columns {
                let iters = escape_time(w.column_coord(px), c_im, max_iterations);
                self.sink.draw(px, py, iters);
            }
        }
        true
    }

    fn render_multi_threaded(&self, window: &Viewport<f64>, max_iterations: u32) -> bool {
        let w = window.to_backend::<T>();
        let columns = w.columns();
        let rows = w.rows();
        let abandoned = AtomicBool::new(false);
        (0..rows).into_par_iter().for_each(|py| {
            if abandoned.load(Ordering::Relaxed) {
                return;
            }
            if self.sink.aborted() {
                abandoned.store(true, Ordering::Relaxed);
                return;
            }
            let c_im = w.row_coord(py);
            for px in 0..columns {
                let iters = escape_time(w.column_coord(px), c_im, max_iterations);
                self.sink.draw(px, py, iters);
            }
        });
        !abandoned.load(Ordering::Relaxed)
    }

    fn abort_flag(&self) -> AbortFlag {
        self.sink.abort_flag()
    }
}

/// `W` adjacent columns per batch through the masked lane kernel, generic
/// over the numeric backend. Per-pixel output is identical to
/// [`ScalarRenderer`] over the same backend.
pub struct VectorRenderer<T, const W: usize> {
    sink: RenderSink,
    backend: PhantomData<T>,
}

impl<T: RealScalar, const W: usize> VectorRenderer<T, W> {
    pub fn new(draw: DrawPixel, abort: AbortPredicate) -> Self {
        Self {
            sink: RenderSink::new(draw, abort),
            backend: PhantomData,
        }
    }

    /// Compute and draw one batch. Lanes past the right edge are computed
    /// (they cost nothing extra in lockstep) but never drawn.
    fn run_batch(&self, w: &Viewport<T>, px: u32, c_im: T, columns: u32, py: u32, max_iterations: u32) {
        let coords: [T; W] = std::array::from_fn(|lane| w.column_coord(px + lane as u32));
        let counts = escape_time_lanes(&coords, c_im, max_iterations);
        for (lane, &iters) in counts.iter().enumerate() {
            let x = px + lane as u32;
            if x < columns {
                self.sink.draw(x, py, iters);
            }
        }
    }
}

impl<T: RealScalar, const W: usize> EscapeTimeRenderer for VectorRenderer<T, W> {
    fn render_single_threaded(&self, window: &Viewport<f64>, max_iterations: u32) -> bool {
        let w = window.to_backend::<T>();
        let columns = w.columns();
        let rows = w.rows();
        for py in 0..rows {
            let c_im = w.row_coord(py);
            let mut px = 0u32;
            while px < columns {
                if self.sink.aborted() {
                    log::debug!("vector render aborted at row {py}/{rows}");
                    return false;
                }
                self.run_batch(&w, px, c_im, columns, py, max_iterations);
                px += W as u32;
            }
        }
        true
    }

    fn render_multi_threaded(&self, window: &Viewport<f64>, max_iterations: u32) -> bool {
        let w = window.to_backend::<T>();
        let columns = w.columns();
        let rows = w.rows();
        let abandoned = AtomicBool::new(false);
        (0..rows).into_par_iter().for_each(|py| {
            let c_im = w.row_coord(py);
            let mut px = 0u32;
            while px < columns {
                if abandoned.load(Ordering::Relaxed) {
                    return;
                }
                if self.sink.aborted() {
                    abandoned.store(true, Ordering::Relaxed);
                    return;
                }
                self.run_batch(&w, px, c_im, columns, py, max_iterations);
                px += W as u32;
            }
        });
        !abandoned.load(Ordering::Relaxed)
    }

    fn abort_flag(&self) -> AbortFlag {
        self.sink.abort_flag()
    }
}

/// Lane-batched renderer for the fast extended-precision tiers, carrying
/// coordinates in structure-of-arrays hi/lo form.
pub struct FastLanesRenderer<const W: usize> {
    sink: RenderSink,
}

impl<const W: usize> FastLanesRenderer<W> {
    pub fn new(draw: DrawPixel, abort: AbortPredicate) -> Self {
        Self {
            sink: RenderSink::new(draw, abort),
        }
    }

    fn run_batch(
        &self,
        w: &Viewport<DoubleDouble>,
        px: u32,
        c_im: DdLanes<W>,
        columns: u32,
        py: u32,
        max_iterations: u32,
    ) {
        let c_re = DdLanes::<W>::from_fn(|lane| w.column_coord(px + lane as u32));
        let counts = escape_time_lanes_fast(c_re, c_im, max_iterations);
        for (lane, &iters) in counts.iter().enumerate() {
            let x = px + lane as u32;
            if x < columns {
                self.sink.draw(x, py, iters);
            }
        }
    }
}

impl<const W: usize> EscapeTimeRenderer for FastLanesRenderer<W> {
    fn render_single_threaded(&self, window: &Viewport<f64>, max_iterations: u32) -> bool {
        let w = window.to_backend::<DoubleDouble>();
        let columns = w.columns();
        let rows = w.rows();
        for py in 0..rows {
            let c_im = DdLanes::<W>::splat(w.row_coord(py));
            let mut px = 0u32;
            while px < columns {
                if self.sink.aborted() {
                    log::debug!("fast lanes render aborted at row {py}/{rows}");
                    return false;
                }
                self.run_batch(&w, px, c_im, columns, py, max_iterations);
                px += W as u32;
            }
        }
        true
    }

    fn render_multi_threaded(&self, window: &Viewport<f64>, max_iterations: u32) -> bool {
        let w = window.to_backend::<DoubleDouble>();
        let columns = w.columns();
        let rows = w.rows();
        let abandoned = AtomicBool::new(false);
        (0..rows).into_par_iter().for_each(|py| {
            let c_im = DdLanes::<W>::splat(w.row_coord(py));
            let mut px = 0u32;
            while px < columns {
                if abandoned.load(Ordering::Relaxed) {
                    return;
                }
                if self.sink.aborted() {
                    abandoned.store(true, Ordering::Relaxed);
                    return;
                }
                self.run_batch(&w, px, c_im, columns, py, max_iterations);
                px += W as u32;
            }
        });
        !abandoned.load(Ordering::Relaxed)
    }

    fn abort_flag(&self) -> AbortFlag {
        self.sink.abort_flag()
    }
}
