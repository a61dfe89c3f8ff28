//! JSON request/response protocol.
//!
//! Requests are tagged by `op`. Images travel as base64-encoded file
//! bytes (any format the core can decode on the way in, PNG on the way
//! out). Responses are untagged so the wire shapes stay flat:
//!
//! - `{"image": "<base64 png>"}`
//! - `{"states": {"undo": 1, "redo": 0, "width": 640, "height": 480}}`
//! - `{"layer": "layer2"}`
//! - `{"status": 400, "code": "nothing_to_undo", "message": "Nothing to undo", "success": false}`

use retouch_core::{DocumentStates, Transform};
use serde::{Deserialize, Serialize};

use crate::error::SessionError;

/// A client request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    /// Load a new image, discarding the previous document and its
    /// history.
    Upload {
        /// Base64 image file bytes.
        image: String,
    },
    /// Report history depths and current size.
    States,
    /// Apply a parameterized transform to the current image.
    Transform {
        /// The edit to run.
        transform: Transform,
    },
    /// Crop the current image with a mask.
    Select {
        /// Base64 image file bytes; the luma is used as the mask.
        mask: String,
        /// Keep the unselected part instead.
        #[serde(default)]
        invert: bool,
    },
    /// Add a named layer.
    AddLayer {
        /// Base64 image file bytes.
        image: String,
        /// Layer name; generated when absent.
        #[serde(default)]
        name: Option<String>,
    },
    /// Undo the last edit.
    Undo,
    /// Redo the last undone edit.
    Redo,
}

/// Body of a failed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// HTTP-style status.
    pub status: u16,
    /// Machine-readable error kind.
    pub code: String,
    /// Human-readable message.
    pub message: String,
    /// Always `false`.
    pub success: bool,
}

impl From<&SessionError> for ErrorBody {
    fn from(err: &SessionError) -> Self {
        Self {
            status: err.status(),
            code: err.code().to_string(),
            message: err.to_string(),
            success: false,
        }
    }
}

/// A session response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Response {
    /// The current image after the request.
    Image {
        /// Base64 PNG.
        image: String,
    },
    /// History depths and size.
    States {
        /// The reported states.
        states: DocumentStates,
    },
    /// Name given to a newly added layer.
    Layer {
        /// Layer name.
        layer: String,
    },
    /// The request failed.
    Error(ErrorBody),
}

impl Response {
    /// Returns `true` unless this is an error response.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        !matches!(self, Self::Error(_))
    }
}
