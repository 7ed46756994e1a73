//! Session state machine.
//!
//! A [`Session`] owns at most one [`Document`]. Before the first load every
//! operation returns [`EngineError::EmptyImage`]. After that the session is
//! either `Loaded` (the spectrum is the forward transform of `original`) or
//! `Edited` (frequency-domain edits are pending).
//!
//! ```text
//! load / spatial stroke / apply / reset  ──► Loaded
//! magnitude stroke / phase stroke / filter ──► Edited
//! ```

pub mod document;
pub mod shared;

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::edit::{self, Stroke, StrokeOutcome};
use crate::error::{EngineError, Result};
use crate::filters::{self, Filter};
use crate::image::{Channel, DisplayImage, SpatialImage};
use crate::spectrum::Spectrum;

pub use document::{Displays, Document};
pub use shared::SharedSession;

/// Whether the spectrum still matches `original`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Spectrum equals the forward transform of `original`.
    Loaded,
    /// Frequency-domain edits have been applied since the last resync.
    Edited,
}

/// What a filter call did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterOutcome {
    /// Filter after parameter clamping.
    pub applied: Filter,
    /// Non-finite samples repaired while reconstructing `result`.
    pub non_finite_samples: usize,
}

/// The engine: configuration plus the currently loaded document.
#[derive(Debug, Clone, Default)]
pub struct Session {
    config: EngineConfig,
    doc: Option<Document>,
}

impl Session {
    /// Empty session using `config`.
    pub fn new(config: EngineConfig) -> Self {
        Self { config, doc: None }
    }

    /// Replace any loaded image with `image` and derive everything from it.
    ///
    /// Returns the number of non-finite samples repaired by the initial
    /// reconstruction (zero for any real image).
    pub fn load(&mut self, mut image: SpatialImage) -> Result<usize> {
        if image.width == 0 || image.height == 0 {
            return Err(EngineError::ZeroSizedImage);
        }
        let pixels = u64::from(image.width) * u64::from(image.height);
        if pixels > self.config.max_pixels {
            return Err(EngineError::ImageTooLarge {
                pixels,
                limit: self.config.max_pixels,
            });
        }
        let expected = image.width as usize * image.height as usize;
        if image.pixels.len() != expected {
            return Err(EngineError::BufferLength {
                expected,
                actual: image.pixels.len(),
            });
        }

        let repaired = image.clamp_intensities();
        if repaired > 0 {
            tracing::warn!("{} samples outside [0, 255] clamped on load", repaired);
        }

        let (width, height) = (image.width, image.height);
        let (doc, bad) = Document::from_original(image);
        tracing::info!(
            "loaded {}x{} image, global max log-magnitude {:.3}",
            width,
            height,
            doc.displays.global_max
        );
        self.doc = Some(doc);
        Ok(bad)
    }

    /// Apply one committed stroke. See [`edit::apply_stroke`].
    pub fn apply_stroke(&mut self, stroke: &Stroke) -> Result<StrokeOutcome> {
        let doc = self.doc.as_mut().ok_or(EngineError::EmptyImage)?;
        edit::apply_stroke(doc, stroke, &self.config)
    }

    /// Run a filter over the spectrum and rebuild every derived view.
    pub fn apply_filter(&mut self, filter: Filter) -> Result<FilterOutcome> {
        let doc = self.doc.as_mut().ok_or(EngineError::EmptyImage)?;
        let applied = filters::apply(&mut doc.spectrum, filter, self.config.radius_reference);
        let non_finite_samples = doc.rebuild();
        doc.state = SessionState::Edited;
        tracing::info!("applied {}: {:?}", applied.name(), applied);
        Ok(FilterOutcome {
            applied,
            non_finite_samples,
        })
    }

    /// Commit `result` as the new `original`, then resync from it.
    pub fn apply_result_to_original(&mut self) -> Result<usize> {
        let doc = self.doc.as_mut().ok_or(EngineError::EmptyImage)?;
        doc.original = doc.result.clone();
        let bad = doc.resync();
        tracing::info!("result committed to original");
        Ok(bad)
    }

    /// Discard frequency-domain edits by resyncing from `original`.
    pub fn reset_frequency_edits(&mut self) -> Result<usize> {
        let doc = self.doc.as_mut().ok_or(EngineError::EmptyImage)?;
        let bad = doc.resync();
        tracing::info!("frequency edits reset");
        Ok(bad)
    }

    /// Engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Whether an image has been loaded.
    pub fn is_loaded(&self) -> bool {
        self.doc.is_some()
    }

    /// Loaded document.
    pub fn document(&self) -> Result<&Document> {
        self.doc.as_ref().ok_or(EngineError::EmptyImage)
    }

    pub fn state(&self) -> Result<SessionState> {
        Ok(self.document()?.state)
    }

    pub fn original(&self) -> Result<&SpatialImage> {
        Ok(&self.document()?.original)
    }

    pub fn result(&self) -> Result<&SpatialImage> {
        Ok(&self.document()?.result)
    }

    pub fn spectrum(&self) -> Result<&Spectrum> {
        Ok(&self.document()?.spectrum)
    }

    pub fn magnitude_display(&self) -> Result<&DisplayImage> {
        Ok(&self.document()?.displays.magnitude)
    }

    pub fn phase_display(&self, channel: Channel) -> Result<&DisplayImage> {
        Ok(self.document()?.displays.phase(channel))
    }

    /// Scale shared by every display raster.
    pub fn global_max(&self) -> Result<f64> {
        Ok(self.document()?.displays.global_max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: u32, height: u32) -> SpatialImage {
        let mut img = SpatialImage::filled(width, height, [0.0; 3]);
        for y in 0..height {
            for x in 0..width {
                let idx = img.index(x, y);
                img.pixels[idx] = [(x * 40) as f64, (y * 30) as f64, 77.0];
            }
        }
        img
    }

    #[test]
    fn test_operations_before_load_fail() {
        let mut session = Session::default();
        assert!(!session.is_loaded());
        assert!(matches!(session.state(), Err(EngineError::EmptyImage)));
        assert!(matches!(
            session.apply_filter(Filter::GaussianLowPass { sigma: 2.0 }),
            Err(EngineError::EmptyImage)
        ));
        assert!(matches!(session.reset_frequency_edits(), Err(EngineError::EmptyImage)));
        assert!(matches!(session.apply_result_to_original(), Err(EngineError::EmptyImage)));
    }

    #[test]
    fn test_load_rejects_zero_sized() {
        let mut session = Session::default();
        let err = session.load(SpatialImage::filled(0, 5, [0.0; 3])).unwrap_err();
        assert!(matches!(err, EngineError::ZeroSizedImage));
    }

    #[test]
    fn test_load_rejects_oversized() {
        let config = EngineConfig {
            max_pixels: 15,
            ..EngineConfig::default()
        };
        let mut session = Session::new(config);
        let err = session.load(SpatialImage::filled(4, 4, [0.0; 3])).unwrap_err();
        assert!(matches!(err, EngineError::ImageTooLarge { pixels: 16, limit: 15 }));
        assert!(!session.is_loaded());
    }

    #[test]
    fn test_load_rejects_short_buffer() {
        let mut session = Session::default();
        let mut img = SpatialImage::filled(3, 3, [1.0; 3]);
        img.pixels.pop();
        let err = session.load(img).unwrap_err();
        assert!(matches!(err, EngineError::BufferLength { expected: 9, actual: 8 }));
    }

    #[test]
    fn test_load_clamps_out_of_range_samples() {
        let mut session = Session::default();
        let mut img = SpatialImage::filled(4, 3, [100.0; 3]);
        img.pixels[2] = [f64::NAN, 300.0, -20.0];
        img.pixels[7] = [f64::INFINITY, 40.0, f64::NEG_INFINITY];
        assert_eq!(session.load(img).unwrap(), 0);

        let original = session.original().unwrap();
        assert_eq!(original.pixels[2], [0.0, 255.0, 0.0]);
        assert_eq!(original.pixels[7], [255.0, 40.0, 0.0]);
        assert!(session.spectrum().unwrap().max_log_magnitude().is_finite());
        assert_eq!(session.result().unwrap(), original);
    }

    #[test]
    fn test_filter_then_reset_returns_to_loaded() {
        let mut session = Session::default();
        session.load(gradient(6, 5)).unwrap();
        let loaded = session.spectrum().unwrap().clone();

        session
            .apply_filter(Filter::RadialLowPass { radius_percent: 10.0 })
            .unwrap();
        assert_eq!(session.state().unwrap(), SessionState::Edited);
        assert_ne!(session.spectrum().unwrap(), &loaded);

        session.reset_frequency_edits().unwrap();
        assert_eq!(session.state().unwrap(), SessionState::Loaded);
        assert_eq!(session.spectrum().unwrap(), &loaded);
    }

    #[test]
    fn test_apply_result_commits_filtered_image() {
        let mut session = Session::default();
        session.load(gradient(6, 5)).unwrap();
        session
            .apply_filter(Filter::GaussianLowPass { sigma: 1.5 })
            .unwrap();
        let filtered = session.result().unwrap().clone();

        session.apply_result_to_original().unwrap();
        assert_eq!(session.state().unwrap(), SessionState::Loaded);
        assert_eq!(session.original().unwrap(), &filtered);
    }
}
