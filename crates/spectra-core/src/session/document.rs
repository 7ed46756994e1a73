//! Engine-owned state for one loaded image and its derived views.

use std::time::Instant;

use crate::codec;
use crate::image::{Channel, DisplayImage, SpatialImage};
use crate::spectrum::Spectrum;
use crate::transform;

use super::SessionState;

/// Display rasters derived from the spectrum, plus the scale they share.
#[derive(Debug, Clone, PartialEq)]
pub struct Displays {
    /// Log-magnitude display, one display channel per spectrum channel.
    pub magnitude: DisplayImage,
    /// Phase displays indexed by [`Channel::index`].
    pub phase: [DisplayImage; 3],
    /// Global maximum `ln(1 + |v|)` used to scale every raster above.
    pub global_max: f64,
}

impl Displays {
    /// Encode every display from a spectrum.
    pub fn encode(spectrum: &Spectrum) -> Self {
        let (magnitude, global_max) = codec::encode_magnitude(spectrum);
        let phase = codec::encode_phase(spectrum, global_max);
        Self {
            magnitude,
            phase,
            global_max,
        }
    }

    /// Phase display of one channel.
    pub fn phase(&self, channel: Channel) -> &DisplayImage {
        &self.phase[channel.index()]
    }
}

/// Everything the engine owns for the current image.
#[derive(Debug, Clone)]
pub struct Document {
    /// Editable baseline image.
    pub original: SpatialImage,
    /// Authoritative frequency data.
    pub spectrum: Spectrum,
    /// Inverse transform of `spectrum`.
    pub result: SpatialImage,
    /// Cached display rasters.
    pub displays: Displays,
    /// Whether `spectrum` still equals the forward transform of `original`.
    pub state: SessionState,
}

impl Document {
    /// Derive spectrum, result and displays from a fresh original.
    pub fn from_original(original: SpatialImage) -> (Self, usize) {
        let spectrum = transform::forward(&original);
        let displays = Displays::encode(&spectrum);
        let reconstruction = transform::inverse(&spectrum);
        let doc = Self {
            original,
            spectrum,
            result: reconstruction.image,
            displays,
            state: SessionState::Loaded,
        };
        (doc, reconstruction.non_finite_samples)
    }

    /// Recompute the spectrum from `original`, discarding frequency edits.
    ///
    /// Returns the number of non-finite samples repaired by the inverse.
    pub fn resync(&mut self) -> usize {
        let start = Instant::now();
        self.spectrum = transform::forward(&self.original);
        let bad = self.rebuild();
        self.state = SessionState::Loaded;
        tracing::debug!(
            "resync: {:.2}ms ({}x{})",
            start.elapsed().as_secs_f64() * 1000.0,
            self.original.width,
            self.original.height
        );
        bad
    }

    /// Rebuild `result` and every display from the current spectrum.
    pub fn rebuild(&mut self) -> usize {
        self.displays = Displays::encode(&self.spectrum);
        self.reconstruct()
    }

    /// Rebuild `result` and one phase display, keeping the cached magnitude
    /// display and scale. Valid only when no magnitude changed.
    pub fn rebuild_phase(&mut self, channel: Channel) -> usize {
        self.displays.phase[channel.index()] =
            codec::encode_phase_channel(&self.spectrum, channel, self.displays.global_max);
        self.reconstruct()
    }

    fn reconstruct(&mut self) -> usize {
        let reconstruction = transform::inverse(&self.spectrum);
        self.result = reconstruction.image;
        if reconstruction.non_finite_samples > 0 {
            tracing::warn!(
                "inverse transform produced {} non-finite samples; clamped",
                reconstruction.non_finite_samples
            );
        }
        reconstruction.non_finite_samples
    }
}
