pub mod color;
pub mod dd;
mod eft;
pub mod f128;
mod fmt;
pub mod lanes;
pub mod real;
pub mod viewport;

pub use color::{iterations_to_rgb, legacy_color, legacy_palette, pack_rgb};
pub use dd::DoubleDouble;
pub use f128::Float128;
pub use lanes::DdLanes;
pub use real::{FastDoubleDouble, FastFloat128, RealScalar};
pub use viewport::Viewport;
