//! Shared types for the retouch editing core.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Re-export `RgbImage` so downstream crates can build and inspect
/// pixel data without depending on `image` directly.
pub use image::RgbImage;

/// Re-export `GrayImage`, the backing store of [`Mask`] and of the
/// single-channel grayscale variant.
pub use image::GrayImage;

/// Number of interleaved samples per pixel in a [`PixelBuffer`].
pub const CHANNELS: usize = 3;

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Dimensions {
    /// Create a new dimensions value.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Convert a floating-point sample to `u8`: round half away from zero,
/// then clamp to `[0, 255]`.
///
/// Every transform that computes in floating point stores its result
/// through this function. NaN saturates to 0.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn saturate(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, 255.0) as u8
}

/// An immutable RGB raster: 3 interleaved 8-bit channels, row-major.
///
/// Storage is reference counted, so cloning a buffer (as the undo
/// history does on every edit) shares the samples instead of copying
/// them. There is no mutable access: transforms always build a new
/// buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer(Arc<RgbImage>);

impl PixelBuffer {
    /// Build a buffer from raw interleaved RGB samples.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::Decode`] if either dimension is zero or
    /// `samples.len() != width * height * 3`.
    pub fn from_raw(width: u32, height: u32, samples: Vec<u8>) -> Result<Self, EditError> {
        check_nonzero(width, height)?;
        let expected = width as usize * height as usize * CHANNELS;
        if samples.len() != expected {
            return Err(EditError::Decode(format!(
                "expected {expected} samples for a {width}x{height} RGB image, got {}",
                samples.len(),
            )));
        }
        RgbImage::from_raw(width, height, samples)
            .map(Self::wrap)
            .ok_or_else(|| EditError::Decode("sample buffer does not match dimensions".to_string()))
    }

    /// Build a buffer from a per-pixel generator.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::Decode`] if either dimension is zero.
    pub fn from_fn(
        width: u32,
        height: u32,
        mut f: impl FnMut(u32, u32) -> [u8; 3],
    ) -> Result<Self, EditError> {
        check_nonzero(width, height)?;
        Ok(Self::wrap(RgbImage::from_fn(width, height, |x, y| {
            image::Rgb(f(x, y))
        })))
    }

    /// Build a buffer where every pixel has the same value.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::Decode`] if either dimension is zero.
    pub fn filled(width: u32, height: u32, pixel: [u8; 3]) -> Result<Self, EditError> {
        Self::from_fn(width, height, |_, _| pixel)
    }

    /// Wrap an image produced inside this crate. Callers guarantee
    /// non-zero dimensions.
    pub(crate) fn wrap(image: RgbImage) -> Self {
        debug_assert!(image.width() > 0 && image.height() > 0, "empty image");
        Self(Arc::new(image))
    }

    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.0.width()
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.0.height()
    }

    /// Width and height together.
    #[must_use]
    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.width(), self.height())
    }

    /// The raw interleaved samples.
    #[must_use]
    pub fn as_raw(&self) -> &[u8] {
        self.0.as_raw()
    }

    /// Borrow the underlying image.
    #[must_use]
    pub fn as_image(&self) -> &RgbImage {
        &self.0
    }

    /// The RGB value at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinates are out of bounds.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        self.0.get_pixel(x, y).0
    }

    /// Returns `true` if both buffers share the same storage.
    #[must_use]
    pub fn shares_storage_with(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Produce a new buffer by mapping every pixel.
    #[must_use]
    pub fn map_pixels(&self, mut f: impl FnMut([u8; 3]) -> [u8; 3]) -> Self {
        let mut out = RgbImage::new(self.width(), self.height());
        for (dst, src) in out.pixels_mut().zip(self.0.pixels()) {
            dst.0 = f(src.0);
        }
        Self::wrap(out)
    }

    /// Produce a new buffer by mapping every sample through a lookup
    /// table.
    #[must_use]
    pub fn map_samples(&self, lut: &[u8; 256]) -> Self {
        let samples = self
            .as_raw()
            .iter()
            .map(|&s| lut[usize::from(s)])
            .collect();
        let image = RgbImage::from_raw(self.width(), self.height(), samples);
        image.map_or_else(|| self.clone(), Self::wrap)
    }
}

impl TryFrom<RgbImage> for PixelBuffer {
    type Error = EditError;

    fn try_from(image: RgbImage) -> Result<Self, Self::Error> {
        check_nonzero(image.width(), image.height())?;
        Ok(Self::wrap(image))
    }
}

/// A single-channel selection mask.
///
/// Values are in `[0, 255]` and are scaled by `1/255` into a weight
/// before being combined with an image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask(GrayImage);

impl Mask {
    /// Build a mask from raw single-channel samples.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::Decode`] if either dimension is zero or
    /// `samples.len() != width * height`.
    pub fn from_raw(width: u32, height: u32, samples: Vec<u8>) -> Result<Self, EditError> {
        check_nonzero(width, height)?;
        let expected = width as usize * height as usize;
        if samples.len() != expected {
            return Err(EditError::Decode(format!(
                "expected {expected} samples for a {width}x{height} mask, got {}",
                samples.len(),
            )));
        }
        GrayImage::from_raw(width, height, samples)
            .map(Self)
            .ok_or_else(|| EditError::Decode("mask buffer does not match dimensions".to_string()))
    }

    /// Build a mask from a per-pixel generator.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::Decode`] if either dimension is zero.
    pub fn from_fn(
        width: u32,
        height: u32,
        mut f: impl FnMut(u32, u32) -> u8,
    ) -> Result<Self, EditError> {
        check_nonzero(width, height)?;
        Ok(Self(GrayImage::from_fn(width, height, |x, y| {
            image::Luma([f(x, y)])
        })))
    }

    /// Width and height of the mask.
    #[must_use]
    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.0.width(), self.0.height())
    }

    /// The selection weight at `(x, y)`, in `[0, 1]`.
    #[must_use]
    pub fn weight(&self, x: u32, y: u32) -> f64 {
        f64::from(self.0.get_pixel(x, y).0[0]) / 255.0
    }

    /// Borrow the underlying single-channel image.
    #[must_use]
    pub const fn as_image(&self) -> &GrayImage {
        &self.0
    }
}

impl TryFrom<GrayImage> for Mask {
    type Error = EditError;

    fn try_from(image: GrayImage) -> Result<Self, Self::Error> {
        check_nonzero(image.width(), image.height())?;
        Ok(Self(image))
    }
}

fn check_nonzero(width: u32, height: u32) -> Result<(), EditError> {
    if width == 0 || height == 0 {
        return Err(EditError::Decode(format!(
            "image dimensions must be positive, got {width}x{height}"
        )));
    }
    Ok(())
}

/// Errors produced by the editing core.
///
/// Every variant is a local, caller-correctable condition; none is
/// transient. The payloads are plain strings and numbers so errors can
/// cross a JSON boundary unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum EditError {
    /// Input bytes or raw samples could not be turned into an image.
    #[error("failed to decode image: {0}")]
    Decode(String),

    /// An image could not be encoded for output.
    #[error("failed to encode image: {0}")]
    Encode(String),

    /// A resolved output dimension was zero.
    #[error("invalid output dimensions {width}x{height}: both must be positive")]
    InvalidDimension {
        /// Resolved width.
        width: u32,
        /// Resolved height.
        height: u32,
    },

    /// A mask does not have the same size as the image it is applied to.
    #[error("mask is {mask} but image is {image}")]
    ShapeMismatch {
        /// Size of the target image.
        image: Dimensions,
        /// Size of the supplied mask.
        mask: Dimensions,
    },

    /// The operation needs a loaded document.
    #[error("no image loaded")]
    NotLoaded,

    /// `undo` was called with an empty undo stack.
    #[error("Nothing to undo")]
    NothingToUndo,

    /// `redo` was called with an empty redo stack.
    #[error("Nothing to redo")]
    NothingToRedo,

    /// A transform parameter is missing or out of range.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        /// Parameter name.
        name: String,
        /// What is wrong with it.
        reason: String,
    },
}

impl EditError {
    /// Shorthand for [`EditError::InvalidParameter`].
    pub fn invalid_parameter(name: &str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}
