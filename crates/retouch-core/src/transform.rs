//! The transform catalogue: one variant per edit, each with its own
//! validated parameters, dispatched through [`Transform::apply_to`].
//!
//! Parameters are validated before any pixel is touched, so a rejected
//! transform never produces a partial result.

use std::fmt;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::balance::{self, BalanceMode};
use crate::resize::{self, ResizeParams};
use crate::rotate::{self, RotateParams};
use crate::types::{EditError, Mask, PixelBuffer};
use crate::{blur, color, select};

/// White balance parameters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhiteBalanceParams {
    /// Statistic to equalize.
    pub mode: BalanceMode,
}

/// Gaussian blur parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlurParams {
    /// Kernel half-width; the kernel side is `2 * half_width + 1`.
    pub half_width: u32,
}

impl BlurParams {
    /// Largest accepted half-width.
    pub const MAX_HALF_WIDTH: u32 = 15;
}

/// Saturation shift on the 0..=255 HSV scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaturationParams {
    /// Amount added to S.
    pub amount: i32,
}

impl SaturationParams {
    /// Accepted amounts.
    pub const RANGE: RangeInclusive<i32> = -100..=100;
}

/// Logistic contrast steepness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContrastParams {
    /// Curve steepness in thousandths; 0 flattens the image to gray.
    pub amount: i32,
}

impl ContrastParams {
    /// Accepted amounts.
    pub const RANGE: RangeInclusive<i32> = 0..=50;
}

/// Warm/cool tone shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToneParams {
    /// Added to red, subtracted from blue.
    pub amount: i32,
}

impl ToneParams {
    /// Accepted amounts.
    pub const RANGE: RangeInclusive<i32> = -50..=50;
}

/// Parameter-free look filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterKind {
    /// R = G = B = luma.
    Grayscale,
    /// Warm brown monochrome.
    Sepia,
    /// Inverted samples.
    Ghost,
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Grayscale => f.write_str("grayscale"),
            Self::Sepia => f.write_str("sepia"),
            Self::Ghost => f.write_str("ghost"),
        }
    }
}

/// Filter parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterParams {
    /// Which filter to run.
    pub kind: FilterKind,
}

/// Mask-based crop parameters.
///
/// Masks are raster data and do not go through serde; callers decode
/// them separately (see [`crate::codec::decode_mask`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// Selection weights; must match the image size.
    pub mask: Mask,
    /// Keep the unselected part instead.
    pub invert: bool,
}

/// One edit on a [`PixelBuffer`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Transform {
    /// Resample to new dimensions.
    Resize(ResizeParams),
    /// Rotate on a fixed canvas.
    Rotate(RotateParams),
    /// Gray-world or white-world color correction.
    WhiteBalance(WhiteBalanceParams),
    /// Gaussian blur.
    Blur(BlurParams),
    /// HSV saturation shift.
    Saturation(SaturationParams),
    /// Logistic contrast.
    Contrast(ContrastParams),
    /// Warm/cool tone.
    Tone(ToneParams),
    /// Grayscale, sepia or ghost.
    Filter(FilterParams),
    /// Mask-weighted crop.
    #[serde(skip)]
    Select(Selection),
}

impl Transform {
    /// Check every parameter against its accepted range.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::InvalidParameter`] naming the first
    /// offending parameter.
    pub fn validate(&self) -> Result<(), EditError> {
        match self {
            Self::Rotate(params) => params.validate(),
            Self::Blur(params) if params.half_width > BlurParams::MAX_HALF_WIDTH => {
                Err(EditError::invalid_parameter(
                    "half_width",
                    format!(
                        "must be at most {}, got {}",
                        BlurParams::MAX_HALF_WIDTH,
                        params.half_width,
                    ),
                ))
            }
            Self::Saturation(params) => check_range("amount", params.amount, &SaturationParams::RANGE),
            Self::Contrast(params) => check_range("amount", params.amount, &ContrastParams::RANGE),
            Self::Tone(params) => check_range("amount", params.amount, &ToneParams::RANGE),
            Self::Resize(_)
            | Self::WhiteBalance(_)
            | Self::Blur(_)
            | Self::Filter(_)
            | Self::Select(_) => Ok(()),
        }
    }

    /// Validate, then run the transform on `image`, producing a new
    /// buffer.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::InvalidParameter`] for out-of-range
    /// parameters, [`EditError::InvalidDimension`] for a resize that
    /// resolves to zero, and [`EditError::ShapeMismatch`] for a mask of
    /// the wrong size.
    pub fn apply_to(&self, image: &PixelBuffer) -> Result<PixelBuffer, EditError> {
        self.validate()?;
        let out = match self {
            Self::Resize(params) => resize::resize(image, params)?,
            Self::Rotate(params) => rotate::rotate(image, params),
            Self::WhiteBalance(params) => balance::white_balance(image, params.mode),
            Self::Blur(params) => blur::gaussian_blur(image, params.half_width),
            Self::Saturation(params) => color::saturation(image, params.amount),
            Self::Contrast(params) => color::contrast(image, f64::from(params.amount)),
            Self::Tone(params) => color::tone(image, params.amount),
            Self::Filter(params) => match params.kind {
                FilterKind::Grayscale => color::grayscale(image),
                FilterKind::Sepia => color::sepia(image),
                FilterKind::Ghost => color::ghost(image),
            },
            Self::Select(selection) => select::select(image, &selection.mask, selection.invert)?,
        };
        Ok(out)
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resize(p) => write!(
                f,
                "resize(width={:?}, height={:?}, preserve_aspect={})",
                p.width, p.height, p.preserve_aspect,
            ),
            Self::Rotate(p) => write!(f, "rotate({} deg)", p.angle_degrees),
            Self::WhiteBalance(p) => write!(f, "white_balance({})", p.mode),
            Self::Blur(p) => write!(f, "blur({})", p.half_width),
            Self::Saturation(p) => write!(f, "saturation({})", p.amount),
            Self::Contrast(p) => write!(f, "contrast({})", p.amount),
            Self::Tone(p) => write!(f, "tone({})", p.amount),
            Self::Filter(p) => write!(f, "filter({})", p.kind),
            Self::Select(s) => write!(f, "select(invert={})", s.invert),
        }
    }
}

fn check_range(name: &str, value: i32, range: &RangeInclusive<i32>) -> Result<(), EditError> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(EditError::invalid_parameter(
            name,
            format!(
                "must be in {}..={}, got {value}",
                range.start(),
                range.end()
            ),
        ))
    }
}
