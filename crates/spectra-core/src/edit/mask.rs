//! Rasterized stroke masks.
//!
//! A mask is a per-pixel alpha plane in image coordinates; any non-zero
//! alpha counts as covered. The paint helpers let a host turn pen geometry
//! into a pixel-exact mask; everything is clipped to the image bounds.

use std::ops::RangeInclusive;

use glam::{DVec2, I64Vec2, IVec2};

use crate::error::{EngineError, Result};

/// Alpha written by the paint helpers.
const OPAQUE: u8 = u8::MAX;

/// Pixels affected by one drawing gesture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrokeMask {
    width: u32,
    height: u32,
    alpha: Vec<u8>,
}

impl StrokeMask {
    /// Empty mask of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            alpha: vec![0; width as usize * height as usize],
        }
    }

    /// Wrap an externally rasterized alpha plane.
    pub fn from_alpha(width: u32, height: u32, alpha: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize;
        if alpha.len() != expected {
            return Err(EngineError::BufferLength {
                expected,
                actual: alpha.len(),
            });
        }
        Ok(Self { width, height, alpha })
    }

    /// `(width, height)` of the mask.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Raw alpha plane.
    pub fn alpha(&self) -> &[u8] {
        &self.alpha
    }

    /// Whether the pixel at `(x, y)` is covered.
    pub fn is_covered(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height && self.alpha[self.index(x, y)] > 0
    }

    /// Row-major indices of every covered pixel.
    pub fn covered(&self) -> impl Iterator<Item = usize> + '_ {
        self.alpha
            .iter()
            .enumerate()
            .filter(|(_, a)| **a > 0)
            .map(|(i, _)| i)
    }

    /// Number of covered pixels.
    pub fn coverage(&self) -> usize {
        self.alpha.iter().filter(|a| **a > 0).count()
    }

    /// Cover one pixel. Out-of-bounds points are ignored.
    pub fn paint_point(&mut self, p: IVec2) {
        self.cover(p.as_i64vec2());
    }

    /// Cover every pixel whose centre lies within `radius` of `center`.
    ///
    /// Only the part of the disc's bounding box inside the image is walked,
    /// so arbitrarily large radii and far-away centres are cheap.
    pub fn paint_disc(&mut self, center: IVec2, radius: u32) {
        let c = center.as_i64vec2();
        let r = i64::from(radius);
        let Some((xs, ys)) = self.clip_box(c - r, c + r) else {
            return;
        };
        let r2 = i128::from(r) * i128::from(r);
        for y in ys {
            for x in xs.clone() {
                let dx = i128::from(i64::from(x) - c.x);
                let dy = i128::from(i64::from(y) - c.y);
                if dx * dx + dy * dy <= r2 {
                    self.set(x, y);
                }
            }
        }
    }

    /// Cover a straight segment drawn with a round pen of `width` pixels.
    ///
    /// Thin pens walk the centre line with Bresenham's algorithm after the
    /// segment is clipped to the image. Wider pens cover every pixel whose
    /// centre lies within `width / 2` of the segment, i.e. the union of discs
    /// swept along it.
    pub fn paint_line(&mut self, from: IVec2, to: IVec2, width: u32) {
        if width > 1 {
            self.paint_capsule(from, to, width / 2);
            return;
        }
        if let Some((a, b)) = self.clip_segment(from.as_i64vec2(), to.as_i64vec2()) {
            for p in bresenham(a, b) {
                self.cover(p);
            }
        }
    }

    fn paint_capsule(&mut self, from: IVec2, to: IVec2, radius: u32) {
        let (a, b) = (from.as_i64vec2(), to.as_i64vec2());
        let r = i64::from(radius);
        let Some((xs, ys)) = self.clip_box(a.min(b) - r, a.max(b) + r) else {
            return;
        };
        let r2 = i128::from(r) * i128::from(r);
        let ab = [i128::from(b.x - a.x), i128::from(b.y - a.y)];
        let len2 = ab[0] * ab[0] + ab[1] * ab[1];
        for y in ys {
            for x in xs.clone() {
                let v = [i128::from(i64::from(x) - a.x), i128::from(i64::from(y) - a.y)];
                let dot = v[0] * ab[0] + v[1] * ab[1];
                let inside = if dot <= 0 {
                    v[0] * v[0] + v[1] * v[1] <= r2
                } else if dot >= len2 {
                    let w = [v[0] - ab[0], v[1] - ab[1]];
                    w[0] * w[0] + w[1] * w[1] <= r2
                } else {
                    // Perpendicular distance: cross² / len2 <= r².
                    let cross = v[0] * ab[1] - v[1] * ab[0];
                    within_radius(cross, len2, r2)
                };
                if inside {
                    self.set(x, y);
                }
            }
        }
    }

    /// Intersect an inclusive box with the image. `None` when they are disjoint.
    fn clip_box(&self, min: I64Vec2, max: I64Vec2) -> Option<(RangeInclusive<u32>, RangeInclusive<u32>)> {
        let x0 = min.x.max(0);
        let y0 = min.y.max(0);
        let x1 = max.x.min(i64::from(self.width) - 1);
        let y1 = max.y.min(i64::from(self.height) - 1);
        if x0 > x1 || y0 > y1 {
            return None;
        }
        Some((x0 as u32..=x1 as u32, y0 as u32..=y1 as u32))
    }

    /// Clip a segment to the image grown by one pixel on every side
    /// (Liang-Barsky). Endpoints inside the image are returned unchanged.
    fn clip_segment(&self, a: I64Vec2, b: I64Vec2) -> Option<(I64Vec2, I64Vec2)> {
        if self.width == 0 || self.height == 0 {
            return None;
        }
        let (w, h) = (i64::from(self.width), i64::from(self.height));
        let inside = |p: I64Vec2| p.x >= 0 && p.y >= 0 && p.x < w && p.y < h;
        if inside(a) && inside(b) {
            return Some((a, b));
        }

        let lo = DVec2::splat(-1.0);
        let hi = DVec2::new(w as f64, h as f64);
        let af = a.as_dvec2();
        let d = b.as_dvec2() - af;
        let (mut t0, mut t1) = (0.0_f64, 1.0_f64);
        for (p, q) in [
            (-d.x, af.x - lo.x),
            (d.x, hi.x - af.x),
            (-d.y, af.y - lo.y),
            (d.y, hi.y - af.y),
        ] {
            if p == 0.0 {
                if q < 0.0 {
                    return None;
                }
                continue;
            }
            let t = q / p;
            if p < 0.0 {
                if t > t1 {
                    return None;
                }
                t0 = t0.max(t);
            } else {
                if t < t0 {
                    return None;
                }
                t1 = t1.min(t);
            }
        }
        let start = if t0 == 0.0 { a } else { (af + d * t0).round().as_i64vec2() };
        let end = if t1 == 1.0 { b } else { (af + d * t1).round().as_i64vec2() };
        Some((start, end))
    }

    fn cover(&mut self, p: I64Vec2) {
        if p.x < 0 || p.y < 0 || p.x >= i64::from(self.width) || p.y >= i64::from(self.height) {
            return;
        }
        self.set(p.x as u32, p.y as u32);
    }

    fn set(&mut self, x: u32, y: u32) {
        let idx = self.index(x, y);
        self.alpha[idx] = OPAQUE;
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }
}

/// `cross² <= r2 · len2`, exact unless both sides overflow `i128`.
fn within_radius(cross: i128, len2: i128, r2: i128) -> bool {
    match (cross.checked_mul(cross), r2.checked_mul(len2)) {
        (Some(lhs), Some(rhs)) => lhs <= rhs,
        (None, Some(_)) => false,
        (Some(_), None) => true,
        (None, None) => (cross as f64).powi(2) <= r2 as f64 * len2 as f64,
    }
}

/// Integer points on the segment `from → to`, both ends included.
fn bresenham(from: I64Vec2, to: I64Vec2) -> Vec<I64Vec2> {
    let delta = (to - from).abs();
    let step = I64Vec2::new(
        if from.x < to.x { 1 } else { -1 },
        if from.y < to.y { 1 } else { -1 },
    );
    let mut err = delta.x - delta.y;
    let mut p = from;
    let mut points = Vec::with_capacity((delta.x.max(delta.y) + 1) as usize);
    loop {
        points.push(p);
        if p == to {
            break;
        }
        let e2 = 2 * err;
        if e2 > -delta.y {
            err -= delta.y;
            p.x += step.x;
        }
        if e2 < delta.x {
            err += delta.x;
            p.y += step.y;
        }
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_alpha_rejects_wrong_length() {
        let err = StrokeMask::from_alpha(3, 3, vec![0; 8]).unwrap_err();
        assert!(matches!(err, EngineError::BufferLength { expected: 9, actual: 8 }));
    }

    #[test]
    fn test_point_outside_is_clipped() {
        let mut mask = StrokeMask::new(4, 4);
        mask.paint_point(IVec2::new(-1, 2));
        mask.paint_point(IVec2::new(4, 0));
        assert_eq!(mask.coverage(), 0);
    }

    #[test]
    fn test_disc_radius_one_is_a_plus() {
        let mut mask = StrokeMask::new(5, 5);
        mask.paint_disc(IVec2::new(2, 2), 1);
        assert_eq!(mask.coverage(), 5);
        assert!(mask.is_covered(2, 1));
        assert!(!mask.is_covered(1, 1));
    }

    #[test]
    fn test_thin_diagonal_line() {
        let mut mask = StrokeMask::new(4, 4);
        mask.paint_line(IVec2::new(0, 0), IVec2::new(3, 3), 1);
        let covered: Vec<usize> = mask.covered().collect();
        assert_eq!(covered, vec![0, 5, 10, 15]);
    }

    #[test]
    fn test_wide_line_is_union_of_discs() {
        let mut mask = StrokeMask::new(8, 5);
        mask.paint_line(IVec2::new(2, 2), IVec2::new(5, 2), 3);
        // Rows 1..=3 between x=2 and x=5, plus the end caps at x=1 and x=6.
        assert_eq!(mask.coverage(), 3 * 4 + 2);
        assert!(mask.is_covered(1, 2) && mask.is_covered(6, 2));
        assert!(!mask.is_covered(1, 1));
    }

    #[test]
    fn test_bresenham_includes_both_ends() {
        let pts = bresenham(I64Vec2::new(3, 1), I64Vec2::new(0, 2));
        assert_eq!(pts.first(), Some(&I64Vec2::new(3, 1)));
        assert_eq!(pts.last(), Some(&I64Vec2::new(0, 2)));
        assert_eq!(pts.len(), 4);
    }

    #[test]
    fn test_huge_disc_covers_whole_image() {
        let mut mask = StrokeMask::new(4, 4);
        mask.paint_disc(IVec2::new(1, 1), 50_000);
        assert_eq!(mask.coverage(), 16);

        let mut mask = StrokeMask::new(3, 2);
        mask.paint_disc(IVec2::new(i32::MIN, i32::MAX), u32::MAX);
        assert_eq!(mask.coverage(), 6);
    }

    #[test]
    fn test_far_disc_covers_nothing() {
        let mut mask = StrokeMask::new(4, 4);
        mask.paint_disc(IVec2::new(i32::MAX, i32::MIN), 3);
        mask.paint_disc(IVec2::new(-5, 1), 4);
        assert_eq!(mask.coverage(), 0);
    }

    #[test]
    fn test_far_apart_endpoints_are_clipped() {
        let mut mask = StrokeMask::new(4, 4);
        mask.paint_line(IVec2::new(-2_000_000_000, 0), IVec2::new(2_000_000_000, 0), 1);
        let covered: Vec<usize> = mask.covered().collect();
        assert_eq!(covered, vec![0, 1, 2, 3]);

        let mut mask = StrokeMask::new(4, 4);
        mask.paint_line(IVec2::new(i32::MIN, 1), IVec2::new(i32::MAX, 1), 3);
        assert_eq!(mask.coverage(), 12, "rows 0..=2 should be covered");
    }

    #[test]
    fn test_partly_outside_diagonal_keeps_its_pixels() {
        let mut mask = StrokeMask::new(4, 4);
        mask.paint_line(IVec2::new(-2, -2), IVec2::new(3, 3), 1);
        let covered: Vec<usize> = mask.covered().collect();
        assert_eq!(covered, vec![0, 5, 10, 15]);
    }

    #[test]
    fn test_line_missing_the_image_covers_nothing() {
        let mut mask = StrokeMask::new(4, 4);
        mask.paint_line(IVec2::new(10, 10), IVec2::new(20, 40), 1);
        mask.paint_line(IVec2::new(-30, 2), IVec2::new(-6, 3), 5);
        assert_eq!(mask.coverage(), 0);
    }

    #[test]
    fn test_huge_pen_width_covers_whole_image() {
        let mut mask = StrokeMask::new(5, 3);
        mask.paint_line(IVec2::new(0, 0), IVec2::new(1, 1), u32::MAX);
        assert_eq!(mask.coverage(), 15);
    }
}
