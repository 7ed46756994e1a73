//! Raster types shared by the engine and its collaborators.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the three independent color channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Red,
    Green,
    Blue,
}

impl Channel {
    /// All channels in buffer order.
    pub const ALL: [Channel; 3] = [Channel::Red, Channel::Green, Channel::Blue];

    /// Position of this channel inside `[_; 3]` pixel arrays.
    pub const fn index(self) -> usize {
        match self {
            Self::Red => 0,
            Self::Green => 1,
            Self::Blue => 2,
        }
    }

    /// Single-letter label used in logs and output file names.
    pub const fn letter(self) -> char {
        match self {
            Self::Red => 'r',
            Self::Green => 'g',
            Self::Blue => 'b',
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Red => write!(f, "red"),
            Self::Green => write!(f, "green"),
            Self::Blue => write!(f, "blue"),
        }
    }
}

/// Channels excluded from magnitude edits.
///
/// Locks only gate magnitude strokes; phase and spatial strokes ignore them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChannelLocks {
    locked: [bool; 3],
}

impl ChannelLocks {
    /// No channel locked.
    pub const NONE: ChannelLocks = ChannelLocks { locked: [false; 3] };

    /// Locks for the given channels.
    pub fn of(channels: &[Channel]) -> Self {
        let mut locks = Self::NONE;
        for &ch in channels {
            locks.lock(ch);
        }
        locks
    }

    /// Exclude a channel.
    pub fn lock(&mut self, channel: Channel) {
        self.locked[channel.index()] = true;
    }

    /// Re-include a channel.
    pub fn unlock(&mut self, channel: Channel) {
        self.locked[channel.index()] = false;
    }

    /// Whether a channel is excluded.
    pub fn is_locked(&self, channel: Channel) -> bool {
        self.locked[channel.index()]
    }

    /// Channels that magnitude edits may touch.
    pub fn unlocked(&self) -> impl Iterator<Item = Channel> + '_ {
        Channel::ALL.into_iter().filter(|ch| !self.is_locked(*ch))
    }
}

/// Real-valued three-channel image, intensities in `[0, 255]`.
///
/// Pixels are row-major `[r, g, b]` triples. The engine keeps two of these:
/// the editable `original` and the reconstructed `result`.
#[derive(Debug, Clone, PartialEq)]
pub struct SpatialImage {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Pixel data, `width * height` entries.
    pub pixels: Vec<[f64; 3]>,
}

impl SpatialImage {
    /// Image filled with a single color.
    pub fn filled(width: u32, height: u32, rgb: [f64; 3]) -> Self {
        Self {
            width,
            height,
            pixels: vec![rgb; width as usize * height as usize],
        }
    }

    /// Number of pixels.
    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    /// Whether the image has no pixels.
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Row-major index of `(x, y)`.
    pub fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Pixel at `(x, y)`.
    pub fn get(&self, x: u32, y: u32) -> [f64; 3] {
        self.pixels[self.index(x, y)]
    }

    /// Copy one channel out as a flat plane.
    pub fn plane(&self, channel: Channel) -> Vec<f64> {
        let c = channel.index();
        self.pixels.iter().map(|px| px[c]).collect()
    }

    /// Per-channel arithmetic mean.
    pub fn channel_means(&self) -> [f64; 3] {
        if self.pixels.is_empty() {
            return [0.0; 3];
        }
        let mut sum = [0.0_f64; 3];
        for px in &self.pixels {
            for c in 0..3 {
                sum[c] += px[c];
            }
        }
        let n = self.pixels.len() as f64;
        [sum[0] / n, sum[1] / n, sum[2] / n]
    }

    /// Force every sample into `[0, 255]`: NaN becomes 0, infinities and
    /// other out-of-range values saturate. Returns how many samples changed.
    pub fn clamp_intensities(&mut self) -> usize {
        let mut changed = 0;
        for px in &mut self.pixels {
            for v in px.iter_mut() {
                let clamped = if v.is_nan() { 0.0 } else { v.clamp(0.0, 255.0) };
                if clamped != *v {
                    *v = clamped;
                    changed += 1;
                }
            }
        }
        changed
    }

    /// Convert from an 8-bit RGB raster.
    pub fn from_rgb8(img: &image::RgbImage) -> Self {
        let (width, height) = img.dimensions();
        let pixels = img
            .pixels()
            .map(|p| [p.0[0] as f64, p.0[1] as f64, p.0[2] as f64])
            .collect();
        Self { width, height, pixels }
    }

    /// Quantize to an 8-bit display raster (clamped and rounded).
    pub fn to_display(&self) -> DisplayImage {
        let pixels = self
            .pixels
            .iter()
            .map(|px| px.map(|v| v.clamp(0.0, 255.0).round() as u8))
            .collect();
        DisplayImage {
            width: self.width,
            height: self.height,
            pixels,
        }
    }
}

/// 8-bit RGB raster handed to the rendering layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayImage {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Row-major `[r, g, b]` pixels.
    pub pixels: Vec<[u8; 3]>,
}

impl DisplayImage {
    /// Black raster of the given size.
    pub fn black(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![[0; 3]; width as usize * height as usize],
        }
    }

    /// Pixel at `(x, y)`.
    pub fn get(&self, x: u32, y: u32) -> [u8; 3] {
        self.pixels[y as usize * self.width as usize + x as usize]
    }

    /// Tightly packed RGB bytes, `width * height * 3` long.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    /// Copy into an `image` crate buffer for encoding.
    pub fn to_rgb8(&self) -> image::RgbImage {
        image::RgbImage::from_fn(self.width, self.height, |x, y| image::Rgb(self.get(x, y)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_indices_are_distinct() {
        let mut seen = [false; 3];
        for ch in Channel::ALL {
            assert!(!seen[ch.index()], "duplicate index for {ch}");
            seen[ch.index()] = true;
        }
    }

    #[test]
    fn test_locks_filter_unlocked_channels() {
        let locks = ChannelLocks::of(&[Channel::Blue]);
        let open: Vec<Channel> = locks.unlocked().collect();
        assert_eq!(open, vec![Channel::Red, Channel::Green]);
        assert!(locks.is_locked(Channel::Blue));
    }

    #[test]
    fn test_channel_means() {
        let mut img = SpatialImage::filled(2, 1, [10.0, 20.0, 30.0]);
        img.pixels[1] = [30.0, 40.0, 50.0];
        assert_eq!(img.channel_means(), [20.0, 30.0, 40.0]);
    }

    #[test]
    fn test_clamp_intensities_repairs_out_of_range_samples() {
        let mut img = SpatialImage::filled(2, 1, [12.5; 3]);
        img.pixels[0] = [f64::NAN, 300.0, -5.0];
        img.pixels[1] = [f64::INFINITY, f64::NEG_INFINITY, 255.0];
        assert_eq!(img.clamp_intensities(), 5);
        assert_eq!(img.pixels[0], [0.0, 255.0, 0.0]);
        assert_eq!(img.pixels[1], [255.0, 0.0, 255.0]);
        assert_eq!(img.clamp_intensities(), 0);
    }

    #[test]
    fn test_to_display_clamps_and_rounds() {
        let mut img = SpatialImage::filled(3, 1, [0.0; 3]);
        img.pixels[0] = [-4.0, 12.6, 300.0];
        img.pixels[1] = [127.4, 127.5, 254.9];
        let d = img.to_display();
        assert_eq!(d.pixels[0], [0, 13, 255]);
        assert_eq!(d.pixels[1], [127, 128, 255]);
    }

    #[test]
    fn test_display_bytes_are_packed() {
        let mut d = DisplayImage::black(2, 1);
        d.pixels[1] = [1, 2, 3];
        assert_eq!(d.as_bytes(), &[0, 0, 0, 1, 2, 3]);
    }

    #[test]
    fn test_rgb8_round_trip() {
        let mut src = image::RgbImage::new(2, 2);
        src.put_pixel(1, 0, image::Rgb([9, 8, 7]));
        let img = SpatialImage::from_rgb8(&src);
        assert_eq!(img.get(1, 0), [9.0, 8.0, 7.0]);
        assert_eq!(img.to_display().to_rgb8(), src);
    }
}
