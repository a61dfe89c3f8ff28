//! White balance by per-channel scaling against green.
//!
//! Gray-world assumes the scene averages to neutral gray, so red and
//! blue are scaled until their means match the green mean. White-world
//! assumes the brightest sample of each channel should be white, so the
//! channel maxima are matched instead. Green is never scaled.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{CHANNELS, PixelBuffer, saturate};

/// Which channel statistic white balance equalizes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BalanceMode {
    /// Equalize channel means.
    #[default]
    Gray,
    /// Equalize channel maxima.
    White,
}

impl fmt::Display for BalanceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gray => f.write_str("gray"),
            Self::White => f.write_str("white"),
        }
    }
}

/// Per-channel multipliers `[red, green, blue]` for the given mode.
///
/// A channel whose statistic is zero keeps a scale of 1.
#[must_use]
pub fn channel_scales(image: &PixelBuffer, mode: BalanceMode) -> [f64; 3] {
    let stats = match mode {
        BalanceMode::Gray => channel_means(image),
        BalanceMode::White => channel_maxima(image),
    };
    let green = stats[1];
    [scale(green, stats[0]), 1.0, scale(green, stats[2])]
}

/// Apply white balance.
#[must_use = "returns the balanced image"]
pub fn white_balance(image: &PixelBuffer, mode: BalanceMode) -> PixelBuffer {
    let [sr, sg, sb] = channel_scales(image, mode);
    image.map_pixels(|[r, g, b]| {
        [
            saturate(f64::from(r) * sr),
            saturate(f64::from(g) * sg),
            saturate(f64::from(b) * sb),
        ]
    })
}

fn scale(reference: f64, stat: f64) -> f64 {
    if stat > 0.0 { reference / stat } else { 1.0 }
}

#[allow(clippy::cast_precision_loss)]
fn channel_means(image: &PixelBuffer) -> [f64; 3] {
    let mut sums = [0_u64; CHANNELS];
    for px in image.as_raw().chunks_exact(CHANNELS) {
        for (sum, &s) in sums.iter_mut().zip(px) {
            *sum += u64::from(s);
        }
    }
    let count = (image.as_raw().len() / CHANNELS) as f64;
    sums.map(|s| s as f64 / count)
}

fn channel_maxima(image: &PixelBuffer) -> [f64; 3] {
    let mut maxima = [0_u8; CHANNELS];
    for px in image.as_raw().chunks_exact(CHANNELS) {
        for (max, &s) in maxima.iter_mut().zip(px) {
            *max = (*max).max(s);
        }
    }
    maxima.map(f64::from)
}
