//! Image resizing with optional aspect-ratio preservation.
//!
//! Target dimensions are resolved from the optional width/height
//! parameters first ([`resolve_dimensions`]), then the image is
//! resampled. Pure downscales use area averaging: every output pixel
//! is the overlap-weighted mean of the source pixels it covers.
//! Anything that enlarges an axis uses the `image` crate's `Triangle`
//! (bilinear) filter.

use image::RgbImage;
use image::imageops::FilterType;
use serde::{Deserialize, Serialize};

use crate::types::{CHANNELS, Dimensions, EditError, PixelBuffer, saturate};

/// Parameters for [`resize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResizeParams {
    /// Requested width in pixels.
    #[serde(default)]
    pub width: Option<u32>,
    /// Requested height in pixels.
    #[serde(default)]
    pub height: Option<u32>,
    /// Derive the missing (or second) dimension from the original
    /// aspect ratio.
    #[serde(default = "default_preserve_aspect")]
    pub preserve_aspect: bool,
}

const fn default_preserve_aspect() -> bool {
    true
}

impl Default for ResizeParams {
    fn default() -> Self {
        Self {
            width: None,
            height: None,
            preserve_aspect: true,
        }
    }
}

impl ResizeParams {
    /// Largest accepted output side.
    pub const MAX_SIDE: u32 = 16_384;

    /// Largest accepted output area in pixels.
    pub const MAX_PIXELS: u64 = 64 * 1024 * 1024;

    /// Resize to a width, deriving the height from the aspect ratio.
    #[must_use]
    pub const fn width(width: u32) -> Self {
        Self {
            width: Some(width),
            height: None,
            preserve_aspect: true,
        }
    }

    /// Resize to a height, deriving the width from the aspect ratio.
    #[must_use]
    pub const fn height(height: u32) -> Self {
        Self {
            width: None,
            height: Some(height),
            preserve_aspect: true,
        }
    }

    /// Resize to exact dimensions, ignoring the aspect ratio.
    #[must_use]
    pub const fn exact(width: u32, height: u32) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
            preserve_aspect: false,
        }
    }
}

/// Work out the output size for `params` applied to an image of size
/// `original`.
///
/// Returns `Ok(None)` when neither dimension is given (no resize).
/// With `preserve_aspect`, a given width wins over a given height and
/// the other side is `round(given * other_original / given_original)`.
/// Without it, given sides are used verbatim and missing sides keep
/// their original size.
///
/// # Errors
///
/// Returns [`EditError::InvalidDimension`] if a resolved side is zero,
/// and [`EditError::InvalidParameter`] if the result exceeds
/// [`ResizeParams::MAX_SIDE`] or [`ResizeParams::MAX_PIXELS`].
pub fn resolve_dimensions(
    original: Dimensions,
    params: &ResizeParams,
) -> Result<Option<Dimensions>, EditError> {
    let resolved = match (params.width, params.height, params.preserve_aspect) {
        (None, None, _) => return Ok(None),
        (Some(width), _, true) => {
            Dimensions::new(width, scale_side(width, original.height, original.width))
        }
        (None, Some(height), true) => {
            Dimensions::new(scale_side(height, original.width, original.height), height)
        }
        (width, height, false) => Dimensions::new(
            width.unwrap_or(original.width),
            height.unwrap_or(original.height),
        ),
    };

    if resolved.width == 0 || resolved.height == 0 {
        return Err(EditError::InvalidDimension {
            width: resolved.width,
            height: resolved.height,
        });
    }
    let area = u64::from(resolved.width) * u64::from(resolved.height);
    if resolved.width > ResizeParams::MAX_SIDE
        || resolved.height > ResizeParams::MAX_SIDE
        || area > ResizeParams::MAX_PIXELS
    {
        return Err(EditError::invalid_parameter(
            "size",
            format!(
                "resolves to {resolved}, limit is {max}x{max} and {} pixels",
                ResizeParams::MAX_PIXELS,
                max = ResizeParams::MAX_SIDE,
            ),
        ));
    }
    Ok(Some(resolved))
}

/// `round(given * numerator / denominator)`, saturated to `u32`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn scale_side(given: u32, numerator: u32, denominator: u32) -> u32 {
    let scaled = f64::from(given) * f64::from(numerator) / f64::from(denominator);
    scaled.round().clamp(0.0, f64::from(u32::MAX)) as u32
}

/// Resize an image.
///
/// # Errors
///
/// Same conditions as [`resolve_dimensions`].
pub fn resize(image: &PixelBuffer, params: &ResizeParams) -> Result<PixelBuffer, EditError> {
    let Some(target) = resolve_dimensions(image.dimensions(), params)? else {
        return Ok(image.clone());
    };
    Ok(resample(image, target))
}

/// Resample to exactly `target`, choosing the filter by direction.
#[must_use = "returns the resampled image"]
pub fn resample(image: &PixelBuffer, target: Dimensions) -> PixelBuffer {
    let source = image.dimensions();
    if source == target {
        return image.clone();
    }
    if target.width <= source.width && target.height <= source.height {
        area_average(image, target)
    } else {
        PixelBuffer::wrap(image::imageops::resize(
            image.as_image(),
            target.width,
            target.height,
            FilterType::Triangle,
        ))
    }
}

/// Downscale by area averaging.
///
/// Separable: columns are averaged first into an `f64` scratch buffer,
/// then rows. Output is rounded once at the end.
fn area_average(image: &PixelBuffer, target: Dimensions) -> PixelBuffer {
    let src_w = image.width() as usize;
    let dst_w = target.width as usize;
    let dst_h = target.height as usize;
    let columns = area_weights(image.width(), target.width);
    let rows = area_weights(image.height(), target.height);
    let src = image.as_raw();

    // Horizontal: src_h x dst_w.
    let src_h = image.height() as usize;
    let mut horizontal = vec![0.0_f64; src_h * dst_w * CHANNELS];
    for y in 0..src_h {
        for (x, taps) in columns.iter().enumerate() {
            let out = (y * dst_w + x) * CHANNELS;
            for &(sx, w) in taps {
                let offset = (y * src_w + sx) * CHANNELS;
                for c in 0..CHANNELS {
                    horizontal[out + c] += w * f64::from(src[offset + c]);
                }
            }
        }
    }

    // Vertical: dst_h x dst_w.
    let mut samples = vec![0_u8; dst_h * dst_w * CHANNELS];
    for (y, taps) in rows.iter().enumerate() {
        for x in 0..dst_w {
            let mut acc = [0.0_f64; CHANNELS];
            for &(sy, w) in taps {
                let offset = (sy * dst_w + x) * CHANNELS;
                for (c, sum) in acc.iter_mut().enumerate() {
                    *sum += w * horizontal[offset + c];
                }
            }
            let out = (y * dst_w + x) * CHANNELS;
            for (c, sum) in acc.into_iter().enumerate() {
                samples[out + c] = saturate(sum);
            }
        }
    }

    RgbImage::from_raw(target.width, target.height, samples)
        .map_or_else(|| image.clone(), PixelBuffer::wrap)
}

/// For each destination index, the source indices it covers and their
/// normalized overlap weights. Requires `dst_len <= src_len`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn area_weights(src_len: u32, dst_len: u32) -> Vec<Vec<(usize, f64)>> {
    let scale = f64::from(src_len) / f64::from(dst_len);
    (0..dst_len)
        .map(|d| {
            let start = f64::from(d) * scale;
            let end = (start + scale).min(f64::from(src_len));
            let first = start.floor() as u32;
            let last = (end.ceil() as u32).min(src_len);
            (first..last)
                .filter_map(|s| {
                    let overlap = end.min(f64::from(s + 1)) - start.max(f64::from(s));
                    (overlap > 1e-12).then(|| (s as usize, overlap / scale))
                })
                .collect()
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sized(w: u32, h: u32) -> PixelBuffer {
        PixelBuffer::filled(w, h, [128, 128, 128]).unwrap()
    }

    // --- resolve_dimensions ---

    #[test]
    fn no_dimensions_returns_input_unchanged() {
        let img = sized(10, 5);
        let out = resize(&img, &ResizeParams::default()).unwrap();
        assert!(out.shares_storage_with(&img));
    }

    #[test]
    fn aspect_from_width() {
        let d = resolve_dimensions(Dimensions::new(1024, 768), &ResizeParams::width(256)).unwrap();
        assert_eq!(d, Some(Dimensions::new(256, 192)));
    }

    #[test]
    fn aspect_from_height() {
        let d = resolve_dimensions(Dimensions::new(600, 1200), &ResizeParams::height(256)).unwrap();
        assert_eq!(d, Some(Dimensions::new(128, 256)));
    }

    #[test]
    fn aspect_rounds_to_nearest() {
        // 100 * 3 / 7 = 42.86
        let d = resolve_dimensions(Dimensions::new(7, 3), &ResizeParams::width(100)).unwrap();
        assert_eq!(d, Some(Dimensions::new(100, 43)));
    }

    #[test]
    fn aspect_with_both_given_uses_width() {
        let params = ResizeParams {
            width: Some(50),
            height: Some(999),
            preserve_aspect: true,
        };
        let d = resolve_dimensions(Dimensions::new(100, 40), &params).unwrap();
        assert_eq!(d, Some(Dimensions::new(50, 20)));
    }

    #[test]
    fn no_aspect_keeps_missing_side() {
        let params = ResizeParams {
            width: None,
            height: Some(12),
            preserve_aspect: false,
        };
        let d = resolve_dimensions(Dimensions::new(30, 40), &params).unwrap();
        assert_eq!(d, Some(Dimensions::new(30, 12)));

        let d = resolve_dimensions(Dimensions::new(30, 40), &ResizeParams::exact(7, 9)).unwrap();
        assert_eq!(d, Some(Dimensions::new(7, 9)));
    }

    #[test]
    fn zero_width_is_invalid() {
        let result = resize(&sized(10, 10), &ResizeParams::exact(0, 5));
        assert!(matches!(
            result,
            Err(EditError::InvalidDimension {
                width: 0,
                height: 5
            })
        ));
    }

    #[test]
    fn derived_side_rounding_to_zero_is_invalid() {
        // 1000x1 -> width 10 gives height round(0.01) = 0.
        let result = resize(&sized(1000, 1), &ResizeParams::width(10));
        assert!(matches!(result, Err(EditError::InvalidDimension { .. })));
    }

    #[test]
    fn oversized_targets_are_rejected_before_resampling() {
        let img = sized(12, 8);
        for params in [
            ResizeParams::width(u32::MAX),
            ResizeParams::height(ResizeParams::MAX_SIDE + 1),
            // Width is in range; the derived height is not.
            ResizeParams::width(ResizeParams::MAX_SIDE),
            ResizeParams::exact(ResizeParams::MAX_SIDE, ResizeParams::MAX_SIDE),
        ] {
            let result = resize(&img, &params);
            assert!(
                matches!(result, Err(EditError::InvalidParameter { ref name, .. }) if name == "size"),
                "{params:?}: {result:?}",
            );
        }
    }

    #[test]
    fn largest_accepted_side_resolves() {
        let d = resolve_dimensions(
            Dimensions::new(100, 1),
            &ResizeParams::width(ResizeParams::MAX_SIDE),
        )
        .unwrap();
        assert_eq!(d, Some(Dimensions::new(ResizeParams::MAX_SIDE, 164)));
    }

    #[test]
    fn aspect_ratio_preserved_within_one_pixel() {
        for (w, h) in [(640, 480), (333, 101), (17, 290), (1920, 1080)] {
            for target in [1, 7, 64, 500, 2000] {
                let Ok(Some(d)) =
                    resolve_dimensions(Dimensions::new(w, h), &ResizeParams::width(target))
                else {
                    continue;
                };
                let expected = f64::from(target) * f64::from(h) / f64::from(w);
                assert!(
                    (f64::from(d.height) - expected).abs() <= 1.0,
                    "{w}x{h} -> width {target}: height {}",
                    d.height,
                );
            }
        }
    }

    // --- resampling ---

    #[test]
    fn output_has_resolved_dimensions() {
        let img = sized(40, 20);
        let down = resize(&img, &ResizeParams::width(10)).unwrap();
        assert_eq!(down.dimensions(), Dimensions::new(10, 5));
        let up = resize(&img, &ResizeParams::height(50)).unwrap();
        assert_eq!(up.dimensions(), Dimensions::new(100, 50));
    }

    #[test]
    fn area_average_of_blocks_is_exact() {
        // 4x4 made of four 2x2 blocks of distinct colors.
        let img = PixelBuffer::from_fn(4, 4, |x, y| match (x / 2, y / 2) {
            (0, 0) => [10, 20, 30],
            (1, 0) => [40, 50, 60],
            (0, 1) => [70, 80, 90],
            _ => [100, 110, 120],
        })
        .unwrap();
        let out = resample(&img, Dimensions::new(2, 2));
        assert_eq!(out.pixel(0, 0), [10, 20, 30]);
        assert_eq!(out.pixel(1, 0), [40, 50, 60]);
        assert_eq!(out.pixel(0, 1), [70, 80, 90]);
        assert_eq!(out.pixel(1, 1), [100, 110, 120]);
    }

    #[test]
    fn area_average_handles_fractional_coverage() {
        // 3 -> 2 columns: each output pixel covers 1.5 source pixels.
        let img = PixelBuffer::from_raw(3, 1, vec![0, 0, 0, 90, 90, 90, 180, 180, 180]).unwrap();
        let out = resample(&img, Dimensions::new(2, 1));
        // (0 * 1 + 90 * 0.5) / 1.5 = 30; (90 * 0.5 + 180 * 1) / 1.5 = 150
        assert_eq!(out.pixel(0, 0), [30, 30, 30]);
        assert_eq!(out.pixel(1, 0), [150, 150, 150]);
    }

    #[test]
    fn area_weights_sum_to_one() {
        for (src, dst) in [(10, 3), (7, 7), (100, 1), (13, 5)] {
            for taps in area_weights(src, dst) {
                let sum: f64 = taps.iter().map(|&(_, w)| w).sum();
                assert!((sum - 1.0).abs() < 1e-9, "{src}->{dst}: {sum}");
            }
        }
    }

    #[test]
    fn uniform_image_stays_uniform_when_upscaled() {
        let img = PixelBuffer::filled(3, 2, [12, 34, 56]).unwrap();
        let out = resample(&img, Dimensions::new(9, 8));
        assert!(out.as_image().pixels().all(|p| p.0 == [12, 34, 56]));
    }

    #[test]
    fn params_serde_defaults_preserve_aspect() {
        let params: ResizeParams = serde_json::from_str(r#"{"width": 10}"#).unwrap();
        assert_eq!(params, ResizeParams::width(10));
    }
}
