//! Render configuration: the (precision, vectorization, concurrency) tuple
//! the dispatch layer turns into a concrete kernel, plus the step-driven
//! heuristics UI layers use to pick sensible values while zooming.

use serde::{Deserialize, Serialize};

/// Numeric backend selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrecisionTier {
    Float32,
    Float64,
    Decimal,
    DoubleDouble,
    /// Double-double with the three-step fast add/sub; not guaranteed to
    /// match the precise tier pixel-for-pixel.
    DoubleDoubleFast,
    Quad128,
    Quad128Fast,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Vectorization {
    Scalar,
    Simd,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Concurrency {
    Single,
    Multi,
}

/// Full configuration tuple, consumed once per dispatch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RenderOptions {
    pub precision: PrecisionTier,
    pub vectorization: Vectorization,
    pub concurrency: Concurrency,
}

impl RenderOptions {
    pub fn new(
        precision: PrecisionTier,
        vectorization: Vectorization,
        concurrency: Concurrency,
    ) -> Self {
        Self {
            precision,
            vectorization,
            concurrency,
        }
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            precision: PrecisionTier::Float32,
            vectorization: Vectorization::Simd,
            concurrency: Concurrency::Multi,
        }
    }
}

/// Iteration budget for a zoom depth: `-512 * log10(step)`, clamped to at
/// least one iteration. Deeper zooms sit closer to the set boundary and need
/// proportionally more iterations before points escape.
pub fn max_iterations_for_step(step: f64) -> u32 {
    (-512.0 * step.log10()).max(1.0) as u32
}

/// Cheapest tier whose mantissa still separates adjacent pixels at `step`.
/// f32 runs out near 1e-5 plane units per pixel, f64 near 1e-13; past that
/// only the extended types can tell neighboring pixels apart.
pub fn tier_for_step(step: f64) -> PrecisionTier {
    const F32_LIMIT: f64 = 1e-5;
    const F64_LIMIT: f64 = 1e-13;
    if step > F32_LIMIT {
        PrecisionTier::Float32
    } else if step > F64_LIMIT {
        PrecisionTier::Float64
    } else {
        PrecisionTier::DoubleDouble
    }
}
