//! Phase display encoding (hue = angle, value = log-magnitude) and
//! phase-stroke decoding.
//!
//! Angles map linearly onto the HSV hue wheel: `-π` is red, then green,
//! blue, and back to red at `+π`. Saturation is always full. The value
//! channel reuses the magnitude display intensity, floored at 1 so the hue
//! of a near-empty bin stays visible.

use std::f64::consts::PI;

use palette::{FromColor, Hsv, Srgb, encoding};
use rustfft::num_complex::Complex64;

use super::intensity;
use crate::image::{Channel, DisplayImage};
use crate::spectrum::{Spectrum, log_magnitude};

/// Lowest value component written to a phase display.
pub const MIN_PHASE_VALUE: u8 = 1;

/// Encode the phase display of every channel, indexed by [`Channel::index`].
pub fn encode_phase(spectrum: &Spectrum, global_max: f64) -> [DisplayImage; 3] {
    let encode = |ch| encode_phase_channel(spectrum, ch, global_max);
    let (r, (g, b)) = rayon::join(
        || encode(Channel::Red),
        || rayon::join(|| encode(Channel::Green), || encode(Channel::Blue)),
    );
    [r, g, b]
}

/// Encode the phase display of a single channel.
pub fn encode_phase_channel(spectrum: &Spectrum, channel: Channel, global_max: f64) -> DisplayImage {
    let pixels = spectrum
        .plane(channel)
        .iter()
        .map(|v| phase_pixel(*v, global_max))
        .collect();
    DisplayImage {
        width: spectrum.width,
        height: spectrum.height,
        pixels,
    }
}

/// Display color of one spectrum value.
pub fn phase_pixel(value: Complex64, global_max: f64) -> [u8; 3] {
    let level = intensity(log_magnitude(value), global_max).max(MIN_PHASE_VALUE);
    hue_pixel(value.arg(), level)
}

/// Full-saturation color whose hue encodes `angle` and whose value is `level`.
pub fn hue_pixel(angle: f64, level: u8) -> [u8; 3] {
    let turn = if angle.is_finite() {
        (angle + PI) / (2.0 * PI)
    } else {
        0.0
    };
    let hsv: Hsv<encoding::Srgb, f64> = Hsv::new(turn * 360.0, 1.0, level as f64 / 255.0);
    let (r, g, b) = Srgb::<f64>::from_color(hsv)
        .into_format::<u8>()
        .into_components();
    [r, g, b]
}

/// Recover a phase angle in `[-π, π)` from a color's hue.
///
/// Achromatic colors carry hue 0 and decode to `-π`. The magnitude of the
/// edited bin is not derived from the color.
pub fn decode_phase_edit(color: [u8; 3]) -> f64 {
    let rgb: Srgb<f64> = Srgb::new(color[0], color[1], color[2]).into_format();
    let hsv: Hsv<encoding::Srgb, f64> = Hsv::from_color(rgb);
    let degrees = hsv.hue.into_positive_degrees() % 360.0;
    degrees / 360.0 * 2.0 * PI - PI
}
