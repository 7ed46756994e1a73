//! Per-channel complex spectrum: the engine's single source of truth.
//!
//! Values are stored centre-shifted: the zero-frequency (DC) term of each
//! channel sits at `(width / 2, height / 2)`. Nothing here enforces
//! conjugate symmetry; edits are applied pointwise and whatever asymmetry
//! they introduce is carried through to the inverse transform.

use rustfft::num_complex::Complex64;

use crate::image::Channel;

/// Centre-shifted complex frequency data for three channels.
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrum {
    /// Width in frequency bins (same as the image width).
    pub width: u32,
    /// Height in frequency bins (same as the image height).
    pub height: u32,
    /// One row-major plane per channel, indexed by [`Channel::index`].
    pub planes: [Vec<Complex64>; 3],
}

impl Spectrum {
    /// All-zero spectrum.
    pub fn zeros(width: u32, height: u32) -> Self {
        let len = width as usize * height as usize;
        let zero = Complex64::new(0.0, 0.0);
        Self {
            width,
            height,
            planes: [vec![zero; len], vec![zero; len], vec![zero; len]],
        }
    }

    /// Number of bins per channel.
    pub fn len(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Whether the spectrum has no bins.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bin coordinates of the DC term.
    pub fn center(&self) -> (u32, u32) {
        (self.width / 2, self.height / 2)
    }

    /// Row-major index of `(x, y)`.
    pub fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Plane for one channel.
    pub fn plane(&self, channel: Channel) -> &[Complex64] {
        &self.planes[channel.index()]
    }

    /// Mutable plane for one channel.
    pub fn plane_mut(&mut self, channel: Channel) -> &mut [Complex64] {
        &mut self.planes[channel.index()]
    }

    /// Value at `(x, y)` for one channel.
    pub fn get(&self, channel: Channel, x: u32, y: u32) -> Complex64 {
        self.planes[channel.index()][self.index(x, y)]
    }

    /// Replace the magnitude at row-major index `idx`, keeping the phase.
    ///
    /// A bin with zero magnitude has phase 0 (`atan2(0, 0)`), so setting a
    /// magnitude on it produces a purely real value.
    pub fn set_magnitude(&mut self, channel: Channel, idx: usize, magnitude: f64) {
        let value = &mut self.planes[channel.index()][idx];
        *value = Complex64::from_polar(magnitude, value.arg());
    }

    /// Replace the phase at row-major index `idx`, keeping the magnitude.
    pub fn set_phase(&mut self, channel: Channel, idx: usize, angle: f64) {
        let value = &mut self.planes[channel.index()][idx];
        *value = Complex64::from_polar(value.norm(), angle);
    }

    /// Zero the bin at row-major index `idx`.
    pub fn zero(&mut self, channel: Channel, idx: usize) {
        self.planes[channel.index()][idx] = Complex64::new(0.0, 0.0);
    }

    /// Largest `ln(1 + |v|)` over every bin of every channel.
    ///
    /// Non-finite magnitudes are ignored so a single bad bin cannot poison
    /// the shared normalization.
    pub fn max_log_magnitude(&self) -> f64 {
        self.planes
            .iter()
            .flat_map(|plane| plane.iter())
            .map(|v| log_magnitude(*v))
            .filter(|m| m.is_finite())
            .fold(0.0, f64::max)
    }
}

/// `ln(1 + |v|)`, the log-compressed magnitude shown on every display.
pub fn log_magnitude(value: Complex64) -> f64 {
    value.norm().ln_1p()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    const EPSILON: f64 = 1e-12;

    #[test]
    fn test_center_uses_integer_halves() {
        assert_eq!(Spectrum::zeros(4, 4).center(), (2, 2));
        assert_eq!(Spectrum::zeros(5, 3).center(), (2, 1));
    }

    #[test]
    fn test_set_magnitude_keeps_phase() {
        let mut s = Spectrum::zeros(2, 2);
        s.planes[0][1] = Complex64::from_polar(3.0, FRAC_PI_2);
        s.set_magnitude(Channel::Red, 1, 5.0);
        let v = s.planes[0][1];
        assert!((v.norm() - 5.0).abs() < EPSILON);
        assert!((v.arg() - FRAC_PI_2).abs() < EPSILON);
    }

    #[test]
    fn test_set_phase_keeps_magnitude() {
        let mut s = Spectrum::zeros(2, 2);
        s.planes[2][3] = Complex64::new(3.0, 4.0);
        s.set_phase(Channel::Blue, 3, -1.0);
        let v = s.planes[2][3];
        assert!((v.norm() - 5.0).abs() < EPSILON);
        assert!((v.arg() + 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_max_log_magnitude_spans_channels() {
        let mut s = Spectrum::zeros(2, 1);
        s.planes[1][0] = Complex64::new(9.0, 0.0);
        s.planes[2][1] = Complex64::new(f64::NAN, 0.0);
        assert!((s.max_log_magnitude() - 10.0_f64.ln()).abs() < EPSILON);
    }
}
