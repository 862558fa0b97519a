//! Strategy dispatch: one flat factory over the configuration tuple.
//!
//! Callers hand over a draw callback and an abort predicate, name a
//! configuration, and get back a render callable bound to the chosen
//! concurrency plus an abort handle. There is no renderer class hierarchy;
//! each arm constructs a free-standing monomorphized strategy.

use crate::config::{Concurrency, PrecisionTier, RenderOptions, Vectorization};
use crate::renderer::{
    AbortPredicate, DrawPixel, EscapeTimeRenderer, FastLanesRenderer, ScalarRenderer,
    VectorRenderer,
};
use deepbrot_core::{DoubleDouble, FastDoubleDouble, FastFloat128, Float128, Viewport};
use rust_decimal::Decimal;

/// A dispatched render entry point: `(window, max_iterations) -> completed`.
pub type RenderFn = Box<dyn Fn(&Viewport<f64>, u32) -> bool + Send + Sync>;

/// Pins the dispatched strategy into the aborted state, permanently.
pub struct AbortHandle {
    flag: crate::cancellation::AbortFlag,
}

impl AbortHandle {
    pub fn trigger(&self) {
        self.flag.trigger()
    }
}

/// SIMD lane widths per element size: eight f32 lanes or four 64-bit-wide
/// lanes per batch.
const LANES_32: usize = 8;
const LANES_64: usize = 4;

/// Build the renderer selected by `options`. The returned callable runs the
/// single- or multi-threaded entry point of a concrete kernel; the handle
/// aborts it (and every later call through the same callable).
pub fn select_renderer(
    options: RenderOptions,
    draw: DrawPixel,
    abort: AbortPredicate,
) -> (RenderFn, AbortHandle) {
    log::debug!("dispatching renderer for {options:?}");
    let concurrency = options.concurrency;
    match (options.precision, options.vectorization) {
        (PrecisionTier::Float32, Vectorization::Scalar) => {
            strategy(ScalarRenderer::<f32>::new(draw, abort), concurrency)
        }
        (PrecisionTier::Float32, Vectorization::Simd) => {
            strategy(VectorRenderer::<f32, LANES_32>::new(draw, abort), concurrency)
        }
        (PrecisionTier::Float64, Vectorization::Scalar) => {
            strategy(ScalarRenderer::<f64>::new(draw, abort), concurrency)
        }
        (PrecisionTier::Float64, Vectorization::Simd) => {
            strategy(VectorRenderer::<f64, LANES_64>::new(draw, abort), concurrency)
        }
        (PrecisionTier::Decimal, Vectorization::Scalar) => {
            strategy(ScalarRenderer::<Decimal>::new(draw, abort), concurrency)
        }
        (PrecisionTier::Decimal, Vectorization::Simd) => {
            strategy(VectorRenderer::<Decimal, LANES_64>::new(draw, abort), concurrency)
        }
        (PrecisionTier::DoubleDouble, Vectorization::Scalar) => {
            strategy(ScalarRenderer::<DoubleDouble>::new(draw, abort), concurrency)
        }
        (PrecisionTier::DoubleDouble, Vectorization::Simd) => {
            strategy(
                VectorRenderer::<DoubleDouble, LANES_64>::new(draw, abort),
                concurrency,
            )
        }
        (PrecisionTier::DoubleDoubleFast, Vectorization::Scalar) => {
            strategy(
                ScalarRenderer::<FastDoubleDouble>::new(draw, abort),
                concurrency,
            )
        }
        (PrecisionTier::DoubleDoubleFast, Vectorization::Simd) => {
            strategy(FastLanesRenderer::<LANES_64>::new(draw, abort), concurrency)
        }
        (PrecisionTier::Quad128, Vectorization::Scalar) => {
            strategy(ScalarRenderer::<Float128>::new(draw, abort), concurrency)
        }
        (PrecisionTier::Quad128, Vectorization::Simd) => {
            strategy(
                VectorRenderer::<Float128, LANES_64>::new(draw, abort),
                concurrency,
            )
        }
        (PrecisionTier::Quad128Fast, Vectorization::Scalar) => {
            strategy(ScalarRenderer::<FastFloat128>::new(draw, abort), concurrency)
        }
        (PrecisionTier::Quad128Fast, Vectorization::Simd) => {
            strategy(FastLanesRenderer::<LANES_64>::new(draw, abort), concurrency)
        }
    }
}

fn strategy<R>(renderer: R, concurrency: Concurrency) -> (RenderFn, AbortHandle)
where
    R: EscapeTimeRenderer + 'static,
{
    let handle = AbortHandle {
        flag: renderer.abort_flag(),
    };
    let render: RenderFn = match concurrency {
        Concurrency::Single => {
            Box::new(move |window, max_iterations| {
                renderer.render_single_threaded(window, max_iterations)
            })
        }
        Concurrency::Multi => {
            Box::new(move |window, max_iterations| {
                renderer.render_multi_threaded(window, max_iterations)
            })
        }
    };
    (render, handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn all_tiers() -> [PrecisionTier; 7] {
        [
            PrecisionTier::Float32,
            PrecisionTier::Float64,
            PrecisionTier::Decimal,
            PrecisionTier::DoubleDouble,
            PrecisionTier::DoubleDoubleFast,
            PrecisionTier::Quad128,
            PrecisionTier::Quad128Fast,
        ]
    }

    #[test]
    fn every_configuration_dispatches_and_completes() {
        let window = Viewport::new(-2.0, -1.5, 0.5, 1.0, 0.1);
        for tier in all_tiers() {
            for vectorization in [Vectorization::Scalar, Vectorization::Simd] {
                for concurrency in [Concurrency::Single, Concurrency::Multi] {
                    let count = Arc::new(AtomicU32::new(0));
                    let seen = Arc::clone(&count);
                    let draw: DrawPixel = Arc::new(move |_x, _y, _i| {
                        seen.fetch_add(1, Ordering::Relaxed);
                    });
                    let options = RenderOptions::new(tier, vectorization, concurrency);
                    let (render, _abort) = select_renderer(options, draw, Arc::new(|| false));
                    assert!(render(&window, 20), "{options:?} did not complete");
                    assert_eq!(
                        count.load(Ordering::Relaxed),
                        25,
                        "{options:?} drew the wrong pixel count"
                    );
                }
            }
        }
    }

    #[test]
    fn abort_handle_pins_the_dispatched_strategy() {
        let window = Viewport::new(-2.0, -1.5, 0.5, 1.0, 0.1);
        let count = Arc::new(AtomicU32::new(0));
        let seen = Arc::clone(&count);
        let draw: DrawPixel = Arc::new(move |_x, _y, _i| {
            seen.fetch_add(1, Ordering::Relaxed);
        });
        let (render, abort) =
            select_renderer(RenderOptions::default(), draw, Arc::new(|| false));
        assert!(render(&window, 20));
        let first_pass = count.load(Ordering::Relaxed);
        abort.trigger();
        assert!(!render(&window, 20));
        assert_eq!(count.load(Ordering::Relaxed), first_pass);
    }
}
