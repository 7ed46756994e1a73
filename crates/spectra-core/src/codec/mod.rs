//! Visualization codec: spectrum ⇄ 8-bit display rasters.
//!
//! Magnitude and phase displays share one brightness scale: the largest
//! `ln(1 + |v|)` over all channels and bins, computed once per recompute
//! and cached alongside the rasters it produced.

pub mod magnitude;
pub mod phase;

pub use magnitude::{MagnitudeTarget, decode_magnitude_edit, encode_magnitude};
pub use phase::{decode_phase_edit, encode_phase, encode_phase_channel, phase_pixel};

/// Divisor used when turning log-magnitudes into intensities.
///
/// An all-zero spectrum has a global maximum of 0; fall back to 1 so the
/// displays come out black instead of NaN.
pub fn normalizer(global_max: f64) -> f64 {
    if global_max.is_finite() && global_max > 0.0 {
        global_max
    } else {
        1.0
    }
}

/// `round(log_mag / global_max * 255)`, saturated to `u8`.
pub fn intensity(log_mag: f64, global_max: f64) -> u8 {
    let scaled = log_mag / normalizer(global_max) * 255.0;
    if scaled.is_nan() {
        return 0;
    }
    scaled.clamp(0.0, 255.0).round() as u8
}

/// Whether two display colors agree on every listed channel within `tolerance`.
pub fn within_tolerance(a: [u8; 3], b: [u8; 3], channels: &[usize], tolerance: u8) -> bool {
    channels.iter().all(|&c| a[c].abs_diff(b[c]) <= tolerance)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalizer_falls_back_for_zero_spectrum() {
        assert_eq!(normalizer(0.0), 1.0);
        assert_eq!(normalizer(f64::NAN), 1.0);
        assert_eq!(normalizer(3.5), 3.5);
    }

    #[test]
    fn test_intensity_maps_max_to_full_scale() {
        assert_eq!(intensity(4.0, 4.0), 255);
        assert_eq!(intensity(0.0, 4.0), 0);
        assert_eq!(intensity(2.0, 4.0), 128);
        assert_eq!(intensity(f64::NAN, 4.0), 0);
    }

    #[test]
    fn test_within_tolerance_checks_only_listed_channels() {
        assert!(within_tolerance([10, 200, 0], [15, 0, 0], &[0, 2], 10));
        assert!(!within_tolerance([10, 200, 0], [15, 0, 0], &[0, 1], 10));
    }
}
