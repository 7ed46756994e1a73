//! Log-magnitude display encoding and magnitude-stroke decoding.

use rayon::prelude::*;

use super::intensity;
use crate::image::{Channel, ChannelLocks, DisplayImage};
use crate::spectrum::{Spectrum, log_magnitude};

/// What a magnitude stroke does to one channel of one bin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MagnitudeTarget {
    /// Channel is locked; leave the bin alone.
    Keep,
    /// Masking stroke; zero the bin.
    Zero,
    /// Set the bin's magnitude, keeping its phase.
    Set(f64),
}

/// Build the log-magnitude display and the global maximum it was scaled by.
///
/// Each display channel carries the matching spectrum channel:
/// `round(ln(1 + |v|) / global_max * 255)`.
pub fn encode_magnitude(spectrum: &Spectrum) -> (DisplayImage, f64) {
    let global_max = spectrum.max_log_magnitude();

    let channels: Vec<Vec<u8>> = spectrum
        .planes
        .as_slice()
        .par_iter()
        .map(|plane| {
            plane
                .iter()
                .map(|v| intensity(log_magnitude(*v), global_max))
                .collect()
        })
        .collect();

    let pixels = (0..spectrum.len())
        .map(|i| [channels[0][i], channels[1][i], channels[2][i]])
        .collect();

    let display = DisplayImage {
        width: spectrum.width,
        height: spectrum.height,
        pixels,
    };
    (display, global_max)
}

/// Interpret a stroke color drawn on the magnitude display.
///
/// A color with every channel strictly below `black_threshold` is a masking
/// stroke and zeroes each unlocked channel. Any other color sets each
/// unlocked channel's magnitude to `exp(intensity / 255 · global_max) − 1`,
/// the inverse of the display encoding.
pub fn decode_magnitude_edit(
    color: [u8; 3],
    locks: ChannelLocks,
    global_max: f64,
    black_threshold: u8,
) -> [MagnitudeTarget; 3] {
    let masking = color.iter().all(|&v| v < black_threshold);
    let scale = super::normalizer(global_max);

    Channel::ALL.map(|ch| {
        if locks.is_locked(ch) {
            MagnitudeTarget::Keep
        } else if masking {
            MagnitudeTarget::Zero
        } else {
            let log_mag = color[ch.index()] as f64 / 255.0 * scale;
            MagnitudeTarget::Set(log_mag.exp_m1().max(0.0))
        }
    })
}
