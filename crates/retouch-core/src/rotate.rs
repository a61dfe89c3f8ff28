//! Rotation about a point on a fixed-size canvas.
//!
//! Positive angles turn the picture clockwise as displayed (the row
//! axis points down, so this is the negated math-convention angle).
//! The canvas keeps its size: corners rotated outside are lost and
//! uncovered areas are filled with black. Sampling is bilinear.

use image::Rgb;
use imageproc::geometric_transformations::{Interpolation, rotate as warp_rotate};
use serde::{Deserialize, Serialize};

use crate::types::{Dimensions, EditError, PixelBuffer};

/// Fill color for pixels with no source.
pub const BACKGROUND: [u8; 3] = [0, 0, 0];

/// Parameters for [`rotate`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RotateParams {
    /// Clockwise rotation in degrees.
    pub angle_degrees: f32,
    /// Pivot `(x, y)` in pixel coordinates. Defaults to the image center.
    #[serde(default)]
    pub center: Option<(f32, f32)>,
}

impl RotateParams {
    /// Rotate about the image center.
    #[must_use]
    pub const fn degrees(angle_degrees: f32) -> Self {
        Self {
            angle_degrees,
            center: None,
        }
    }

    /// Check that the angle and pivot are finite.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::InvalidParameter`] for NaN or infinite values.
    pub fn validate(&self) -> Result<(), EditError> {
        if !self.angle_degrees.is_finite() {
            return Err(EditError::invalid_parameter(
                "angle_degrees",
                "must be a finite number",
            ));
        }
        if let Some((x, y)) = self.center
            && !(x.is_finite() && y.is_finite())
        {
            return Err(EditError::invalid_parameter(
                "center",
                "coordinates must be finite numbers",
            ));
        }
        Ok(())
    }
}

/// Center of the pixel grid: the midpoint between the first and last
/// pixel centers on each axis.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn image_center(dimensions: Dimensions) -> (f32, f32) {
    (
        (dimensions.width as f32 - 1.0) / 2.0,
        (dimensions.height as f32 - 1.0) / 2.0,
    )
}

/// Rotate an image clockwise by `params.angle_degrees`.
#[must_use = "returns the rotated image"]
pub fn rotate(image: &PixelBuffer, params: &RotateParams) -> PixelBuffer {
    if params.angle_degrees.rem_euclid(360.0).abs() < f32::EPSILON {
        return image.clone();
    }
    let center = params
        .center
        .unwrap_or_else(|| image_center(image.dimensions()));
    let rotated = warp_rotate(
        image.as_image(),
        center,
        params.angle_degrees.to_radians(),
        Interpolation::Bilinear,
        Rgb(BACKGROUND),
    );
    PixelBuffer::wrap(rotated)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const MARK: [u8; 3] = [255, 0, 0];

    /// 7x7 black image with one marked pixel.
    fn marked(x: u32, y: u32) -> PixelBuffer {
        PixelBuffer::from_fn(7, 7, |px, py| if (px, py) == (x, y) { MARK } else { [0, 0, 0] })
            .unwrap()
    }

    fn assert_near(actual: [u8; 3], expected: [u8; 3]) {
        for c in 0..3 {
            let diff = i16::from(actual[c]) - i16::from(expected[c]);
            assert!(diff.abs() <= 2, "expected ~{expected:?}, got {actual:?}");
        }
    }

    #[test]
    fn zero_and_full_turns_are_identity() {
        let img = marked(4, 3);
        assert_eq!(rotate(&img, &RotateParams::degrees(0.0)), img);
        assert_eq!(rotate(&img, &RotateParams::degrees(360.0)), img);
    }

    #[test]
    fn positive_angle_turns_clockwise() {
        // Right of center (4, 3) lands below center (3, 4).
        let out = rotate(&marked(4, 3), &RotateParams::degrees(90.0));
        assert_near(out.pixel(3, 4), MARK);
        assert_near(out.pixel(4, 3), [0, 0, 0]);
    }

    #[test]
    fn negative_angle_turns_counter_clockwise() {
        // Right of center lands above center.
        let out = rotate(&marked(4, 3), &RotateParams::degrees(-90.0));
        assert_near(out.pixel(3, 2), MARK);
    }

    #[test]
    fn half_turn_mirrors_through_center() {
        let out = rotate(&marked(1, 2), &RotateParams::degrees(180.0));
        assert_near(out.pixel(5, 4), MARK);
    }

    #[test]
    fn canvas_size_is_kept() {
        let img = PixelBuffer::filled(20, 4, [9, 9, 9]).unwrap();
        let out = rotate(&img, &RotateParams::degrees(45.0));
        assert_eq!(out.dimensions(), img.dimensions());
        // The wide image's corners leave the canvas; the corner is black.
        assert_eq!(out.pixel(0, 0), BACKGROUND);
    }

    #[test]
    fn custom_center_is_the_pivot() {
        let params = RotateParams {
            angle_degrees: 90.0,
            center: Some((1.0, 1.0)),
        };
        // (2, 1) is right of the pivot; it lands below it at (1, 2).
        let out = rotate(&marked(2, 1), &params);
        assert_near(out.pixel(1, 2), MARK);
    }

    #[test]
    fn non_finite_angle_is_rejected() {
        let result = RotateParams::degrees(f32::NAN).validate();
        assert!(matches!(result, Err(EditError::InvalidParameter { .. })));
    }

    #[test]
    fn default_center_is_grid_midpoint() {
        assert_eq!(image_center(Dimensions::new(7, 4)), (3.0, 1.5));
    }
}
