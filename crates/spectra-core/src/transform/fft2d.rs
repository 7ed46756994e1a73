//! Separable 2D FFT built on `rustfft`.
//!
//! Rows are transformed in place (rustfft processes a buffer as consecutive
//! chunks of the plan length), then the plane is transposed so the columns
//! become rows, transformed, and transposed back. `rustfft` picks Bluestein
//! or mixed-radix algorithms internally, so any size is supported.

use std::sync::Arc;

use rustfft::num_complex::Complex64;
use rustfft::{Fft, FftDirection, FftPlanner};

/// Planned 2D transform for one image size and direction.
pub struct Fft2d {
    width: usize,
    height: usize,
    rows: Arc<dyn Fft<f64>>,
    cols: Arc<dyn Fft<f64>>,
}

impl Fft2d {
    /// Plan a transform for a `width × height` plane.
    pub fn new(width: usize, height: usize, direction: FftDirection) -> Self {
        let mut planner = FftPlanner::new();
        Self {
            width,
            height,
            rows: planner.plan_fft(width, direction),
            cols: planner.plan_fft(height, direction),
        }
    }

    /// Transform one row-major plane in place. Unnormalized.
    pub fn process(&self, plane: &mut [Complex64]) {
        debug_assert_eq!(plane.len(), self.width * self.height);
        if plane.is_empty() {
            return;
        }
        self.rows.process(plane);
        let mut transposed = transpose(plane, self.width, self.height);
        self.cols.process(&mut transposed);
        plane.copy_from_slice(&transpose(&transposed, self.height, self.width));
    }
}

/// Transpose a row-major `width × height` plane into `height × width`.
fn transpose(plane: &[Complex64], width: usize, height: usize) -> Vec<Complex64> {
    let mut out = Vec::with_capacity(plane.len());
    for x in 0..width {
        for y in 0..height {
            out.push(plane[y * width + x]);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    #[test]
    fn test_impulse_has_flat_spectrum() {
        let mut plane = vec![Complex64::new(0.0, 0.0); 6 * 5];
        plane[0] = Complex64::new(1.0, 0.0);
        Fft2d::new(6, 5, FftDirection::Forward).process(&mut plane);
        for v in &plane {
            assert!((v.re - 1.0).abs() < EPSILON && v.im.abs() < EPSILON, "{v}");
        }
    }

    #[test]
    fn test_forward_then_inverse_scales_by_len() {
        let original: Vec<Complex64> = (0..21)
            .map(|i| Complex64::new(i as f64 * 0.5, 0.0))
            .collect();
        let mut plane = original.clone();
        Fft2d::new(7, 3, FftDirection::Forward).process(&mut plane);
        Fft2d::new(7, 3, FftDirection::Inverse).process(&mut plane);
        for (a, b) in plane.iter().zip(&original) {
            assert!((*a / 21.0 - *b).norm() < EPSILON);
        }
    }
}
