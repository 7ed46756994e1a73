//! Transform adapter: spatial image ⇄ centre-shifted spectrum.
//!
//! The three channels never interact here; each is planned, transformed and
//! shifted on its own, so they run on separate rayon workers and are joined
//! before the call returns.

pub mod fft2d;
pub mod shift;

use rayon::prelude::*;
use rustfft::FftDirection;
use rustfft::num_complex::Complex64;

use crate::image::{Channel, SpatialImage};
use crate::spectrum::Spectrum;
use fft2d::Fft2d;

/// Output of [`inverse`]: the displayable image plus how many samples had
/// to be repaired because the transform produced NaN or infinity.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconstruction {
    /// Real part of the inverse transform, clamped to `[0, 255]` and rounded.
    pub image: SpatialImage,
    /// Number of channel samples that were not finite before clamping.
    pub non_finite_samples: usize,
}

/// Forward 2D FFT of every channel, DC moved to the centre.
pub fn forward(image: &SpatialImage) -> Spectrum {
    let width = image.width as usize;
    let height = image.height as usize;
    let plan = Fft2d::new(width, height, FftDirection::Forward);

    let mut planes: [Vec<Complex64>; 3] = Channel::ALL.map(|ch| {
        image
            .plane(ch)
            .into_iter()
            .map(|v| Complex64::new(v, 0.0))
            .collect()
    });

    planes.as_mut_slice().par_iter_mut().for_each(|plane| {
        plan.process(plane);
        *plane = shift::shift(plane, width, height);
    });

    Spectrum {
        width: image.width,
        height: image.height,
        planes,
    }
}

/// Inverse 2D FFT of every channel.
///
/// Undoes the centre shift, normalizes by `1 / (width · height)`, keeps the
/// real part, then clamps to `[0, 255]` and rounds. Imaginary residue left
/// by asymmetric edits is discarded. NaN samples become 0 and infinities
/// saturate; both are counted in the result.
pub fn inverse(spectrum: &Spectrum) -> Reconstruction {
    let width = spectrum.width as usize;
    let height = spectrum.height as usize;
    let plan = Fft2d::new(width, height, FftDirection::Inverse);
    let scale = if spectrum.is_empty() {
        1.0
    } else {
        1.0 / spectrum.len() as f64
    };

    let channels: Vec<(Vec<f64>, usize)> = spectrum
        .planes
        .as_slice()
        .par_iter()
        .map(|plane| {
            let mut buf = shift::unshift(plane, width, height);
            plan.process(&mut buf);
            let mut bad = 0;
            let values = buf
                .iter()
                .map(|v| {
                    let (value, finite) = to_intensity(v.re * scale);
                    if !finite {
                        bad += 1;
                    }
                    value
                })
                .collect();
            (values, bad)
        })
        .collect();

    let non_finite_samples = channels.iter().map(|(_, bad)| bad).sum();
    let pixels = (0..spectrum.len())
        .map(|i| [channels[0].0[i], channels[1].0[i], channels[2].0[i]])
        .collect();

    Reconstruction {
        image: SpatialImage {
            width: spectrum.width,
            height: spectrum.height,
            pixels,
        },
        non_finite_samples,
    }
}

/// Clamp and round one sample. The flag is false when the input was not finite.
fn to_intensity(value: f64) -> (f64, bool) {
    if value.is_nan() {
        (0.0, false)
    } else if value.is_infinite() {
        (if value > 0.0 { 255.0 } else { 0.0 }, false)
    } else {
        (value.clamp(0.0, 255.0).round(), true)
    }
}
