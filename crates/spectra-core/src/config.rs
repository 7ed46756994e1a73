//! Engine configuration.
//!
//! All thresholds that shape interactive editing live here so a host can
//! tune them without touching the engine. Every field has a serde default,
//! so a partial JSON document is a valid configuration.

use serde::{Deserialize, Serialize};

/// Default near-black threshold for magnitude masking strokes.
const DEFAULT_BLACK_THRESHOLD: u8 = 5;
/// Default per-channel tolerance for "pixel already shows this color".
const DEFAULT_CHANGE_TOLERANCE: u8 = 10;
/// Default upper bound on image size (16 megapixels).
const DEFAULT_MAX_PIXELS: u64 = 1 << 24;

/// Which distance the radial low-pass treats as 100%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RadiusReference {
    /// Distance from the centre to the farthest corner,
    /// `sqrt((h / 2)^2 + (w / 2)^2)`. This is the default because every bin
    /// lies within it, so a 100% radial low-pass leaves the spectrum as is.
    #[default]
    Corner,
    /// Smaller of half-width and half-height. 100% is the largest circle
    /// that fits inside the image.
    Edge,
}

/// Tunable engine behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// A magnitude stroke whose color has every channel strictly below this
    /// value zeroes the unlocked channels instead of setting a magnitude.
    #[serde(default = "EngineConfig::default_black_threshold")]
    pub black_threshold: u8,
    /// Masked pixels whose display color is within this distance of the
    /// stroke color on every channel are left untouched.
    #[serde(default = "EngineConfig::default_change_tolerance")]
    pub change_tolerance: u8,
    /// Reference distance for the radial low-pass filter.
    #[serde(default)]
    pub radius_reference: RadiusReference,
    /// Largest image, in pixels, the engine accepts.
    #[serde(default = "EngineConfig::default_max_pixels")]
    pub max_pixels: u64,
}

impl EngineConfig {
    fn default_black_threshold() -> u8 {
        DEFAULT_BLACK_THRESHOLD
    }

    fn default_change_tolerance() -> u8 {
        DEFAULT_CHANGE_TOLERANCE
    }

    fn default_max_pixels() -> u64 {
        DEFAULT_MAX_PIXELS
    }

    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            black_threshold: DEFAULT_BLACK_THRESHOLD,
            change_tolerance: DEFAULT_CHANGE_TOLERANCE,
            radius_reference: RadiusReference::Corner,
            max_pixels: DEFAULT_MAX_PIXELS,
        }
    }
}
