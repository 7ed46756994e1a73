//! Spectra Core: interactive frequency-domain image editing.
//!
//! An RGB image is transformed into a centre-shifted complex spectrum per
//! channel. The spectrum is shown as a log-magnitude raster and three
//! hue-encoded phase rasters; strokes painted on those rasters, or on the
//! image itself, edit the data and the inverse transform is recomputed.
//! No windowing, file or rendering dependencies.

pub mod codec;
pub mod config;
pub mod edit;
pub mod error;
pub mod filters;
pub mod image;
pub mod session;
pub mod spectrum;
pub mod transform;

// Re-exports for convenience.
pub use config::{EngineConfig, RadiusReference};
pub use edit::{Stroke, StrokeMask, StrokeOutcome, StrokeTarget};
pub use error::{EngineError, Result};
pub use filters::Filter;
pub use image::{Channel, ChannelLocks, DisplayImage, SpatialImage};
pub use session::{FilterOutcome, Session, SessionState, SharedSession};
pub use spectrum::Spectrum;
