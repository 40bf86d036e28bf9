pub mod config;
pub mod error;
pub mod geometry;
pub mod glass;
pub mod math;
pub mod model;
pub mod operations;
pub mod params;
pub mod slider_log;
pub mod tessellation;
pub mod topology;

pub use config::GlassConfig;
pub use error::{Result, VitrumError};
pub use glass::{create_glass_base, create_glass_body, ConstructionError, Frame, GlassFrames};
pub use model::{GlassModel, HostScope};
pub use params::{Resolution, SliderValues};

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod test_support;
