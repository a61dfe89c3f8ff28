//! Gaussian blur with mirrored borders.
//!
//! Each channel is convolved with the kernel from [`crate::kernel`].
//! Samples outside the image are mirrored about the edge pixel
//! (`dcb|abcd|cba`), never zero-padded, so a uniform image stays
//! uniform right up to its border.
//!
//! The square kernel is separable, so the convolution runs as a
//! horizontal pass followed by a vertical pass over an `f64` scratch
//! buffer. Rounding happens once, after the second pass.

use image::RgbImage;

use crate::kernel::Kernel;
use crate::types::{CHANNELS, PixelBuffer, saturate};

/// Blur an image with the Gaussian kernel of the given half-width.
///
/// `half_width = 0` returns the input unchanged (identity kernel).
#[must_use = "returns the blurred image"]
pub fn gaussian_blur(image: &PixelBuffer, half_width: u32) -> PixelBuffer {
    if half_width == 0 {
        return image.clone();
    }
    convolve_separable(image, &Kernel::gaussian(half_width))
}

/// Convolve every channel with a separable kernel, mirrored borders.
#[must_use = "returns the convolved image"]
pub fn convolve_separable(image: &PixelBuffer, kernel: &Kernel) -> PixelBuffer {
    let width = image.width() as usize;
    let height = image.height() as usize;
    let factor = kernel.factor();
    let half = kernel.half_width() as usize;
    let src = image.as_raw();

    // Horizontal pass.
    let mut horizontal = vec![0.0_f64; src.len()];
    for y in 0..height {
        let row = y * width * CHANNELS;
        for x in 0..width {
            for (k, &w) in factor.iter().enumerate() {
                let sx = mirror(x + k, half, width);
                let offset = row + sx * CHANNELS;
                for c in 0..CHANNELS {
                    horizontal[row + x * CHANNELS + c] += w * f64::from(src[offset + c]);
                }
            }
        }
    }

    // Vertical pass.
    let mut samples = vec![0_u8; src.len()];
    for y in 0..height {
        for x in 0..width {
            let mut acc = [0.0_f64; CHANNELS];
            for (k, &w) in factor.iter().enumerate() {
                let sy = mirror(y + k, half, height);
                let offset = (sy * width + x) * CHANNELS;
                for (c, sum) in acc.iter_mut().enumerate() {
                    *sum += w * horizontal[offset + c];
                }
            }
            let out = (y * width + x) * CHANNELS;
            for (c, sum) in acc.into_iter().enumerate() {
                samples[out + c] = saturate(sum);
            }
        }
    }

    RgbImage::from_raw(image.width(), image.height(), samples)
        .map_or_else(|| image.clone(), PixelBuffer::wrap)
}

/// Map the shifted index `shifted - half` into `0..len`, mirroring about
/// the first and last element without repeating them.
///
/// Taking `shifted = i + half` keeps the arithmetic unsigned. Kernels
/// wider than the image bounce back and forth until the index lands
/// inside.
fn mirror(shifted: usize, half: usize, len: usize) -> usize {
    if len == 1 {
        return 0;
    }
    let period = 2 * (len - 1);
    // Shift by a whole number of periods so the subtraction cannot wrap.
    let lifted = shifted + period * (half / period + 1) - half;
    let m = lifted % period;
    if m < len { m } else { period - m }
}
