//! Edit applicator: turns a committed stroke into a state change.
//!
//! Spatial strokes paint `original` and resynchronize the spectrum from it,
//! which throws away any frequency-domain edits. Magnitude and phase strokes
//! mutate the spectrum directly, bin by bin, without restoring conjugate
//! symmetry. Every stroke is validated before anything is written.

pub mod mask;

use serde::{Deserialize, Serialize};

use crate::codec::{self, MagnitudeTarget};
use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::image::{Channel, ChannelLocks};
use crate::session::SessionState;
use crate::session::document::Document;

pub use mask::StrokeMask;

/// Layer a stroke was drawn on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrokeTarget {
    /// The editable spatial image.
    Spatial,
    /// The log-magnitude display.
    Magnitude,
    /// One channel's phase display.
    Phase(Channel),
}

/// One committed drawing gesture.
#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    /// Layer the stroke applies to.
    pub target: StrokeTarget,
    /// Pixel-exact coverage.
    pub mask: StrokeMask,
    /// Pen color as `[r, g, b]`.
    pub color: [u8; 3],
    /// Channels excluded from magnitude edits.
    pub locks: ChannelLocks,
}

/// What a stroke did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrokeOutcome {
    /// Masked pixels that were actually modified.
    pub pixels_changed: usize,
    /// Masked pixels skipped because they already showed the pen color.
    pub pixels_skipped: usize,
    /// Non-finite samples repaired while reconstructing `result`.
    pub non_finite_samples: usize,
}

/// Apply a stroke to a document.
///
/// Fails with [`EngineError::InvalidDimensions`] if the mask does not match
/// the loaded image; in that case nothing is modified.
pub fn apply_stroke(doc: &mut Document, stroke: &Stroke, config: &EngineConfig) -> Result<StrokeOutcome> {
    let expected = (doc.original.width, doc.original.height);
    let actual = stroke.mask.dimensions();
    if actual != expected {
        return Err(EngineError::InvalidDimensions {
            what: "stroke mask",
            expected,
            actual,
        });
    }

    let outcome = match stroke.target {
        StrokeTarget::Spatial => apply_spatial(doc, stroke),
        StrokeTarget::Magnitude => apply_magnitude(doc, stroke, config),
        StrokeTarget::Phase(channel) => apply_phase(doc, stroke, channel, config),
    };
    tracing::debug!(
        "{:?} stroke: {} changed, {} skipped",
        stroke.target,
        outcome.pixels_changed,
        outcome.pixels_skipped
    );
    Ok(outcome)
}

fn apply_spatial(doc: &mut Document, stroke: &Stroke) -> StrokeOutcome {
    let color = stroke.color.map(f64::from);
    let mut pixels_changed = 0;
    for idx in stroke.mask.covered() {
        doc.original.pixels[idx] = color;
        pixels_changed += 1;
    }
    let non_finite_samples = doc.resync();
    StrokeOutcome {
        pixels_changed,
        pixels_skipped: 0,
        non_finite_samples,
    }
}

fn apply_magnitude(doc: &mut Document, stroke: &Stroke, config: &EngineConfig) -> StrokeOutcome {
    let targets = codec::decode_magnitude_edit(
        stroke.color,
        stroke.locks,
        doc.displays.global_max,
        config.black_threshold,
    );
    let masking = targets.iter().any(|t| *t == MagnitudeTarget::Zero);
    let open: Vec<usize> = stroke.locks.unlocked().map(Channel::index).collect();

    let mut pixels_changed = 0;
    let mut pixels_skipped = 0;
    for idx in stroke.mask.covered() {
        let shown = doc.displays.magnitude.pixels[idx];
        if open.is_empty()
            || (!masking && codec::within_tolerance(shown, stroke.color, &open, config.change_tolerance))
        {
            pixels_skipped += 1;
            continue;
        }
        for ch in Channel::ALL {
            match targets[ch.index()] {
                MagnitudeTarget::Keep => {}
                MagnitudeTarget::Zero => doc.spectrum.zero(ch, idx),
                MagnitudeTarget::Set(m) => doc.spectrum.set_magnitude(ch, idx, m),
            }
        }
        pixels_changed += 1;
    }

    let non_finite_samples = doc.rebuild();
    doc.state = SessionState::Edited;
    StrokeOutcome {
        pixels_changed,
        pixels_skipped,
        non_finite_samples,
    }
}

fn apply_phase(doc: &mut Document, stroke: &Stroke, channel: Channel, config: &EngineConfig) -> StrokeOutcome {
    let angle = codec::decode_phase_edit(stroke.color);
    let wanted = codec::phase::hue_pixel(angle, u8::MAX);

    let mut pixels_changed = 0;
    let mut pixels_skipped = 0;
    for idx in stroke.mask.covered() {
        let current = doc.spectrum.plane(channel)[idx].arg();
        let shown = codec::phase::hue_pixel(current, u8::MAX);
        if codec::within_tolerance(shown, wanted, &[0, 1, 2], config.change_tolerance) {
            pixels_skipped += 1;
            continue;
        }
        doc.spectrum.set_phase(channel, idx, angle);
        pixels_changed += 1;
    }

    let non_finite_samples = doc.rebuild_phase(channel);
    doc.state = SessionState::Edited;
    StrokeOutcome {
        pixels_changed,
        pixels_skipped,
        non_finite_samples,
    }
}
