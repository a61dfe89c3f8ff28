//! Mask-weighted crop/selection.
//!
//! Each pixel is multiplied by its mask weight (`mask / 255`, or
//! `1 - mask / 255` when inverted). A binary mask therefore keeps the
//! selected pixels and zeroes the rest; gray mask values fade.

use crate::types::{EditError, Mask, PixelBuffer, saturate};

/// Keep the masked part of `image`.
///
/// # Errors
///
/// Returns [`EditError::ShapeMismatch`] if the mask and image sizes
/// differ.
pub fn select(image: &PixelBuffer, mask: &Mask, invert: bool) -> Result<PixelBuffer, EditError> {
    if mask.dimensions() != image.dimensions() {
        return Err(EditError::ShapeMismatch {
            image: image.dimensions(),
            mask: mask.dimensions(),
        });
    }

    PixelBuffer::from_fn(image.width(), image.height(), |x, y| {
        let weight = mask.weight(x, y);
        let weight = if invert { 1.0 - weight } else { weight };
        image.pixel(x, y).map(|s| saturate(f64::from(s) * weight))
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::Dimensions;

    fn left_half_mask(w: u32, h: u32) -> Mask {
        Mask::from_fn(w, h, |x, _| if x < w / 2 { 255 } else { 0 }).unwrap()
    }

    #[test]
    fn binary_mask_keeps_selection() {
        let img = PixelBuffer::filled(4, 2, [10, 20, 30]).unwrap();
        let out = select(&img, &left_half_mask(4, 2), false).unwrap();
        assert_eq!(out.pixel(0, 0), [10, 20, 30]);
        assert_eq!(out.pixel(1, 1), [10, 20, 30]);
        assert_eq!(out.pixel(2, 0), [0, 0, 0]);
        assert_eq!(out.pixel(3, 1), [0, 0, 0]);
    }

    #[test]
    fn inverted_mask_keeps_complement() {
        let img = PixelBuffer::filled(4, 2, [10, 20, 30]).unwrap();
        let out = select(&img, &left_half_mask(4, 2), true).unwrap();
        assert_eq!(out.pixel(0, 0), [0, 0, 0]);
        assert_eq!(out.pixel(3, 1), [10, 20, 30]);
    }

    #[test]
    fn gray_mask_scales_proportionally() {
        let img = PixelBuffer::filled(1, 1, [200, 100, 50]).unwrap();
        let mask = Mask::from_raw(1, 1, vec![51]).unwrap(); // weight 0.2
        let out = select(&img, &mask, false).unwrap();
        assert_eq!(out.pixel(0, 0), [40, 20, 10]);
    }

    #[test]
    fn size_mismatch_is_rejected() {
        let img = PixelBuffer::filled(4, 4, [1, 2, 3]).unwrap();
        let result = select(&img, &left_half_mask(4, 3), false);
        assert_eq!(
            result,
            Err(EditError::ShapeMismatch {
                image: Dimensions::new(4, 4),
                mask: Dimensions::new(4, 3),
            })
        );
    }
}
