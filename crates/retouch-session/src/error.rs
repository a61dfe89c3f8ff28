//! Session-level errors and their mapping to response statuses.

use retouch_core::EditError;

/// Errors surfaced to a client of the session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The editing core rejected the request.
    #[error(transparent)]
    Edit(#[from] EditError),

    /// An image payload was not valid base64.
    #[error("invalid base64 image payload: {0}")]
    Base64(#[from] base64::DecodeError),

    /// A request body was not valid JSON for the protocol.
    #[error("malformed request: {0}")]
    Json(#[from] serde_json::Error),
}

impl SessionError {
    /// HTTP-style status for this error.
    ///
    /// Everything the caller can fix is a 400; failing to encode our
    /// own output is a 500.
    #[must_use]
    pub const fn status(&self) -> u16 {
        match self {
            Self::Edit(EditError::Encode(_)) => 500,
            Self::Edit(_) | Self::Base64(_) | Self::Json(_) => 400,
        }
    }

    /// Stable machine-readable code, one per error kind.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Edit(e) => match e {
                EditError::Decode(_) => "decode_error",
                EditError::Encode(_) => "encode_error",
                EditError::InvalidDimension { .. } => "invalid_dimension",
                EditError::ShapeMismatch { .. } => "shape_mismatch",
                EditError::NotLoaded => "not_loaded",
                EditError::NothingToUndo => "nothing_to_undo",
                EditError::NothingToRedo => "nothing_to_redo",
                EditError::InvalidParameter { .. } => "invalid_parameter",
            },
            Self::Base64(_) => "decode_error",
            Self::Json(_) => "invalid_request",
        }
    }
}
