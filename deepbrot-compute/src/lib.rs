pub mod cancellation;
pub mod config;
pub mod dispatch;
pub mod kernel;
pub mod renderer;

pub use cancellation::AbortFlag;
pub use config::{
    max_iterations_for_step, tier_for_step, Concurrency, PrecisionTier, RenderOptions,
    Vectorization,
};
pub use dispatch::{select_renderer, AbortHandle, RenderFn};
pub use kernel::{escape_time, escape_time_lanes, escape_time_lanes_fast, interior_sentinel};
pub use renderer::{
    AbortPredicate, DrawPixel, EscapeTimeRenderer, FastLanesRenderer, RenderSink,
    ScalarRenderer, VectorRenderer,
};

// Re-export core types for convenience
pub use deepbrot_core::*;
