//! Base64 image payloads.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use retouch_core::{Mask, PixelBuffer, codec};

use crate::error::SessionError;

/// Strip an optional `data:<mime>;base64,` prefix, as browsers produce
/// from `FileReader::readAsDataURL`.
fn strip_data_url(payload: &str) -> &str {
    let payload = payload.trim();
    if payload.starts_with("data:")
        && let Some((_, data)) = payload.split_once(',')
    {
        return data;
    }
    payload
}

fn decode_bytes(payload: &str) -> Result<Vec<u8>, SessionError> {
    Ok(BASE64.decode(strip_data_url(payload))?)
}

/// Decode a base64 image payload into a buffer.
///
/// # Errors
///
/// Returns [`SessionError::Base64`] for invalid base64 and
/// [`SessionError::Edit`] if the bytes are not a decodable image.
pub fn decode_image(payload: &str) -> Result<PixelBuffer, SessionError> {
    Ok(codec::decode(&decode_bytes(payload)?)?)
}

/// Decode a base64 image payload into a selection mask.
///
/// # Errors
///
/// Same conditions as [`decode_image`].
pub fn decode_mask(payload: &str) -> Result<Mask, SessionError> {
    Ok(codec::decode_mask(&decode_bytes(payload)?)?)
}

/// Encode a buffer as base64 PNG.
///
/// # Errors
///
/// Returns [`SessionError::Edit`] if PNG encoding fails.
pub fn encode_image(image: &PixelBuffer) -> Result<String, SessionError> {
    Ok(BASE64.encode(codec::encode_png(image)?))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use retouch_core::EditError;

    #[test]
    fn round_trip_through_base64_png() {
        let image = PixelBuffer::from_fn(3, 3, |x, y| {
            let v = u8::try_from(x * 3 + y).unwrap();
            [v * 20, v * 10, 255 - v]
        })
        .unwrap();
        let payload = encode_image(&image).unwrap();
        assert_eq!(decode_image(&payload).unwrap(), image);
    }

    #[test]
    fn data_url_prefix_is_accepted() {
        let image = PixelBuffer::filled(2, 2, [1, 2, 3]).unwrap();
        let payload = format!("data:image/png;base64,{}", encode_image(&image).unwrap());
        assert_eq!(decode_image(&payload).unwrap(), image);
    }

    #[test]
    fn invalid_base64_is_reported_as_such() {
        assert!(matches!(
            decode_image("not base64 !!"),
            Err(SessionError::Base64(_))
        ));
    }

    #[test]
    fn valid_base64_of_garbage_is_a_decode_error() {
        let payload = BASE64.encode([0xde, 0xad, 0xbe, 0xef]);
        assert!(matches!(
            decode_image(&payload),
            Err(SessionError::Edit(EditError::Decode(_)))
        ));
    }
}
