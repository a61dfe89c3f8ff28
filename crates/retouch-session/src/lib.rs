//! Request/response binding over a [`retouch_core::Document`].
//!
//! A [`Session`] owns at most one document. Clients send JSON
//! [`Request`]s carrying base64 image payloads and get back flat
//! [`Response`]s; every failure becomes an [`ErrorBody`] with an
//! HTTP-style status, a stable code, and `success: false`.
//!
//! ```
//! use retouch_session::Session;
//!
//! let mut session = Session::default();
//! let reply = session.respond_json(r#"{"op": "undo"}"#);
//! assert!(reply.contains("not_loaded"));
//! ```

pub mod error;
pub mod payload;
pub mod protocol;
pub mod session;

pub use error::SessionError;
pub use protocol::{ErrorBody, Request, Response};
pub use session::{Session, SharedSession};
