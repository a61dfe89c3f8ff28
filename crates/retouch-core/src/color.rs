//! Per-pixel color and tone adjustments.
//!
//! All functions are pure: they read a [`PixelBuffer`] and return a new
//! one. Intermediate math is floating point; results are stored through
//! [`saturate`].

use image::GrayImage;

use crate::types::{PixelBuffer, saturate};

/// ITU-R BT.601 luma weights for R, G, B.
pub const LUMA_WEIGHTS: [f64; 3] = [0.299, 0.587, 0.114];

/// Luma of one RGB pixel, unrounded.
#[must_use]
pub fn luma(pixel: [u8; 3]) -> f64 {
    let [r, g, b] = pixel;
    LUMA_WEIGHTS[2].mul_add(
        f64::from(b),
        LUMA_WEIGHTS[0].mul_add(f64::from(r), LUMA_WEIGHTS[1] * f64::from(g)),
    )
}

/// Convert to grayscale, keeping three channels (R = G = B = luma).
#[must_use = "returns the grayscale image"]
pub fn grayscale(image: &PixelBuffer) -> PixelBuffer {
    image.map_pixels(|p| {
        let l = saturate(luma(p));
        [l, l, l]
    })
}

/// Single-channel grayscale variant.
#[must_use = "returns the grayscale image"]
pub fn grayscale_luma(image: &PixelBuffer) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        image::Luma([saturate(luma(image.pixel(x, y)))])
    })
}

/// Sepia: `gray = luma / 255`, then `(255, 204, 153) * gray`.
#[must_use = "returns the sepia-toned image"]
pub fn sepia(image: &PixelBuffer) -> PixelBuffer {
    image.map_pixels(|p| {
        let gray = f64::from(saturate(luma(p))) / 255.0;
        [
            saturate(255.0 * gray),
            saturate(204.0 * gray),
            saturate(153.0 * gray),
        ]
    })
}

/// Bitwise invert of every sample. Self-inverse.
#[must_use = "returns the inverted image"]
pub fn ghost(image: &PixelBuffer) -> PixelBuffer {
    let lut: [u8; 256] = std::array::from_fn(|s| 255 - u8::try_from(s).unwrap_or(u8::MAX));
    image.map_samples(&lut)
}

/// Logistic contrast curve: `255 / (1 + exp(-(k / 1000) * (s - 127.5)))`.
///
/// `k = 0` is *not* the identity: the curve is flat and every sample
/// becomes 128.
#[must_use = "returns the contrast-adjusted image"]
pub fn contrast(image: &PixelBuffer, amount: f64) -> PixelBuffer {
    let slope = amount / 1000.0;
    let lut: [u8; 256] = std::array::from_fn(|s| {
        let s = f64::from(u8::try_from(s).unwrap_or(u8::MAX));
        saturate(255.0 / (1.0 + (-slope * (s - 127.5)).exp()))
    });
    image.map_samples(&lut)
}

/// Warm/cool shift: red gains `amount`, blue loses it, green is kept.
#[must_use = "returns the toned image"]
pub fn tone(image: &PixelBuffer, amount: i32) -> PixelBuffer {
    let t = f64::from(amount);
    image.map_pixels(|[r, g, b]| [saturate(f64::from(r) + t), g, saturate(f64::from(b) - t)])
}

/// Add `delta` to the HSV saturation channel (on a 0..=255 scale),
/// clamp, and convert back.
///
/// Hue and value are carried through the round trip in floating point,
/// so only chroma intensity changes.
#[must_use = "returns the saturation-adjusted image"]
pub fn saturation(image: &PixelBuffer, delta: i32) -> PixelBuffer {
    let delta = f64::from(delta);
    image.map_pixels(|p| {
        let hsv = Hsv::from_rgb(p);
        let s = (hsv.saturation + delta).clamp(0.0, 255.0);
        Hsv {
            saturation: s,
            ..hsv
        }
        .to_rgb()
    })
}

/// A color in HSV space.
///
/// `hue` is in degrees `[0, 360)`; `saturation` and `value` use the
/// 8-bit scale `[0, 255]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsv {
    /// Hue in degrees.
    pub hue: f64,
    /// Saturation, `0..=255`.
    pub saturation: f64,
    /// Value (brightest channel), `0..=255`.
    pub value: f64,
}

impl Hsv {
    /// Convert an RGB pixel to HSV.
    #[must_use]
    pub fn from_rgb([r, g, b]: [u8; 3]) -> Self {
        let (r, g, b) = (f64::from(r), f64::from(g), f64::from(b));
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let chroma = max - min;

        let saturation = if max > 0.0 { 255.0 * chroma / max } else { 0.0 };

        let hue = if chroma <= 0.0 {
            0.0
        } else if (max - r).abs() < f64::EPSILON {
            60.0 * (g - b) / chroma
        } else if (max - g).abs() < f64::EPSILON {
            60.0_f64.mul_add((b - r) / chroma, 120.0)
        } else {
            60.0_f64.mul_add((r - g) / chroma, 240.0)
        };

        Self {
            hue: hue.rem_euclid(360.0),
            saturation,
            value: max,
        }
    }

    /// Convert back to an RGB pixel.
    #[must_use]
    pub fn to_rgb(self) -> [u8; 3] {
        let chroma = self.value * self.saturation / 255.0;
        let sector = self.hue.rem_euclid(360.0) / 60.0;
        let x = chroma * (1.0 - (sector.rem_euclid(2.0) - 1.0).abs());
        let m = self.value - chroma;

        let (r, g, b) = match sector {
            s if s < 1.0 => (chroma, x, 0.0),
            s if s < 2.0 => (x, chroma, 0.0),
            s if s < 3.0 => (0.0, chroma, x),
            s if s < 4.0 => (0.0, x, chroma),
            s if s < 5.0 => (x, 0.0, chroma),
            _ => (chroma, 0.0, x),
        };

        [saturate(r + m), saturate(g + m), saturate(b + m)]
    }
}
