//! Filter bank: global operations applied directly to the spectrum.
//!
//! Filters are pure functions of `(spectrum, parameter)`. Out-of-range
//! parameters are clamped rather than rejected, and each function returns
//! the [`Filter`] that actually took effect so callers can show (and tests
//! can check) the clamped value.

use serde::{Deserialize, Serialize};

use crate::config::RadiusReference;
use crate::image::Channel;
use crate::spectrum::{Spectrum, log_magnitude};

/// Smallest Gaussian sigma accepted, in frequency bins.
pub const MIN_SIGMA: f64 = 1e-3;

/// A filter and its parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Filter {
    /// Zero every bin farther than `radius_percent` of the reference radius
    /// from the centre.
    RadialLowPass { radius_percent: f64 },
    /// Zero every bin whose `ln(1 + |v|)` is below `threshold_percent` of the
    /// current global maximum.
    LogMagnitudeHighPass { threshold_percent: f64 },
    /// Multiply every bin by `exp(-d² / (2σ²))`, `d` in bins from the centre.
    GaussianLowPass { sigma: f64 },
}

impl Filter {
    /// Same filter with its parameter clamped to the valid range.
    ///
    /// Percentages land in `[0, 100]`; sigma in `[MIN_SIGMA, ∞)`. NaN maps to
    /// the lower bound.
    pub fn clamped(self) -> Self {
        match self {
            Self::RadialLowPass { radius_percent } => Self::RadialLowPass {
                radius_percent: clamp_percent(radius_percent),
            },
            Self::LogMagnitudeHighPass { threshold_percent } => Self::LogMagnitudeHighPass {
                threshold_percent: clamp_percent(threshold_percent),
            },
            Self::GaussianLowPass { sigma } => Self::GaussianLowPass {
                sigma: if sigma.is_nan() { MIN_SIGMA } else { sigma.max(MIN_SIGMA) },
            },
        }
    }

    /// Short name for logs.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::RadialLowPass { .. } => "radial low-pass",
            Self::LogMagnitudeHighPass { .. } => "log-magnitude high-pass",
            Self::GaussianLowPass { .. } => "gaussian low-pass",
        }
    }
}

fn clamp_percent(value: f64) -> f64 {
    if value.is_nan() { 0.0 } else { value.clamp(0.0, 100.0) }
}

/// Apply a filter in place and return the clamped filter that was used.
pub fn apply(spectrum: &mut Spectrum, filter: Filter, reference: RadiusReference) -> Filter {
    let effective = filter.clamped();
    if effective != filter {
        tracing::warn!("{} parameter clamped: {:?} -> {:?}", filter.name(), filter, effective);
    }
    match effective {
        Filter::RadialLowPass { radius_percent } => {
            radial_low_pass(spectrum, radius_percent, reference)
        }
        Filter::LogMagnitudeHighPass { threshold_percent } => {
            log_magnitude_high_pass(spectrum, threshold_percent)
        }
        Filter::GaussianLowPass { sigma } => gaussian_low_pass(spectrum, sigma),
    }
    effective
}

/// Distance that counts as 100% for the radial low-pass.
///
/// `Corner` reaches the farthest bin, so 100% keeps everything. `Edge` is
/// the largest circle that fits inside the grid.
pub fn max_radius(spectrum: &Spectrum, reference: RadiusReference) -> f64 {
    max_radius_squared(spectrum, reference).sqrt()
}

/// Square of [`max_radius`], exact in integer arithmetic.
fn max_radius_squared(spectrum: &Spectrum, reference: RadiusReference) -> f64 {
    let (cx, cy) = spectrum.center();
    let (cx, cy) = (cx as u64, cy as u64);
    let r2 = match reference {
        RadiusReference::Corner => cx * cx + cy * cy,
        RadiusReference::Edge => cx.min(cy).pow(2),
    };
    r2 as f64
}

/// Zero bins outside `radius_percent` of [`max_radius`]. The centre bin
/// always survives, so 0% leaves only DC.
pub fn radial_low_pass(spectrum: &mut Spectrum, radius_percent: f64, reference: RadiusReference) {
    let fraction = radius_percent / 100.0;
    let cutoff2 = fraction * fraction * max_radius_squared(spectrum, reference);
    let outside: Vec<bool> = distances_squared(spectrum).map(|d2| d2 > cutoff2).collect();
    for ch in Channel::ALL {
        for (v, kill) in spectrum.plane_mut(ch).iter_mut().zip(&outside) {
            if *kill {
                *v = Default::default();
            }
        }
    }
}

/// Zero bins whose log-magnitude is below `threshold_percent` of the
/// spectrum's current global maximum (computed fresh, not cached).
pub fn log_magnitude_high_pass(spectrum: &mut Spectrum, threshold_percent: f64) {
    let threshold = threshold_percent / 100.0 * spectrum.max_log_magnitude();
    for ch in Channel::ALL {
        for v in spectrum.plane_mut(ch).iter_mut() {
            if log_magnitude(*v) < threshold {
                *v = Default::default();
            }
        }
    }
}

/// Weight every bin by a centred Gaussian of width `sigma` bins.
pub fn gaussian_low_pass(spectrum: &mut Spectrum, sigma: f64) {
    let denom = 2.0 * sigma * sigma;
    let weights: Vec<f64> = distances_squared(spectrum)
        .map(|d2| (-d2 / denom).exp())
        .collect();
    for ch in Channel::ALL {
        for (v, w) in spectrum.plane_mut(ch).iter_mut().zip(&weights) {
            *v *= *w;
        }
    }
}

/// Squared distance of every bin from the centre, row-major.
fn distances_squared(spectrum: &Spectrum) -> impl Iterator<Item = f64> {
    let (cx, cy) = spectrum.center();
    let (width, height) = (spectrum.width, spectrum.height);
    (0..height).flat_map(move |y| {
        (0..width).map(move |x| {
            let dx = x as f64 - cx as f64;
            let dy = y as f64 - cy as f64;
            dx * dx + dy * dy
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustfft::num_complex::Complex64;

    fn ones(width: u32, height: u32) -> Spectrum {
        let mut s = Spectrum::zeros(width, height);
        for plane in &mut s.planes {
            plane.fill(Complex64::new(1.0, 1.0));
        }
        s
    }

    fn nonzero(s: &Spectrum, ch: Channel) -> usize {
        s.plane(ch).iter().filter(|v| v.norm() > 0.0).count()
    }

    #[test]
    fn test_clamped_percentages() {
        let f = Filter::RadialLowPass { radius_percent: 140.0 }.clamped();
        assert_eq!(f, Filter::RadialLowPass { radius_percent: 100.0 });
        let f = Filter::LogMagnitudeHighPass { threshold_percent: -3.0 }.clamped();
        assert_eq!(f, Filter::LogMagnitudeHighPass { threshold_percent: 0.0 });
    }

    #[test]
    fn test_clamped_sigma() {
        let f = Filter::GaussianLowPass { sigma: -1.0 }.clamped();
        assert_eq!(f, Filter::GaussianLowPass { sigma: MIN_SIGMA });
        let f = Filter::GaussianLowPass { sigma: f64::NAN }.clamped();
        assert_eq!(f, Filter::GaussianLowPass { sigma: MIN_SIGMA });
    }

    #[test]
    fn test_apply_reports_effective_filter() {
        let mut s = ones(4, 4);
        let used = apply(
            &mut s,
            Filter::RadialLowPass { radius_percent: 250.0 },
            RadiusReference::Corner,
        );
        assert_eq!(used, Filter::RadialLowPass { radius_percent: 100.0 });
        assert_eq!(s, ones(4, 4));
    }

    #[test]
    fn test_radial_full_radius_is_noop_for_odd_size() {
        let mut s = ones(5, 7);
        radial_low_pass(&mut s, 100.0, RadiusReference::Corner);
        assert_eq!(s, ones(5, 7));
    }

    #[test]
    fn test_radial_zero_keeps_only_center() {
        let mut s = ones(6, 4);
        radial_low_pass(&mut s, 0.0, RadiusReference::Corner);
        assert_eq!(nonzero(&s, Channel::Red), 1);
        let (cx, cy) = s.center();
        assert!(s.get(Channel::Blue, cx, cy).norm() > 0.0);
    }

    #[test]
    fn test_radial_edge_reference_trims_corners() {
        let mut s = ones(8, 8);
        radial_low_pass(&mut s, 100.0, RadiusReference::Edge);
        assert_eq!(s.get(Channel::Green, 0, 0).norm(), 0.0);
        assert!(s.get(Channel::Green, 4, 0).norm() > 0.0);
    }

    #[test]
    fn test_high_pass_zero_is_noop_and_full_keeps_max() {
        let mut s = ones(3, 3);
        s.planes[0][4] = Complex64::new(50.0, 0.0);
        let before = s.clone();
        log_magnitude_high_pass(&mut s, 0.0);
        assert_eq!(s, before);
        log_magnitude_high_pass(&mut s, 100.0);
        assert_eq!(nonzero(&s, Channel::Red), 1);
        assert_eq!(nonzero(&s, Channel::Blue), 0);
    }

    #[test]
    fn test_gaussian_leaves_center_and_attenuates_edges() {
        let mut s = ones(5, 5);
        gaussian_low_pass(&mut s, 1.0);
        assert_eq!(s.get(Channel::Red, 2, 2), Complex64::new(1.0, 1.0));
        let edge = s.get(Channel::Red, 0, 2);
        assert!((edge.re - (-2.0_f64).exp()).abs() < 1e-12);
    }
}
