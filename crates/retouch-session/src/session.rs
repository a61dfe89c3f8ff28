//! The session binding: one optional [`Document`] per session.
//!
//! [`Session`] is a plain value the caller owns and passes requests to.
//! [`SharedSession`] puts it behind a mutex so a concurrent host can
//! share it; each request then runs as a single critical section, which
//! keeps the undo/redo order linear.

use std::sync::{Mutex, PoisonError};

use log::{info, warn};
use retouch_core::transform::Selection;
use retouch_core::{Document, DocumentConfig, DocumentStates, EditError, Transform};

use crate::error::SessionError;
use crate::payload;
use crate::protocol::{ErrorBody, Request, Response};

/// One editing session.
#[derive(Debug, Default)]
pub struct Session {
    config: DocumentConfig,
    document: Option<Document>,
}

impl Session {
    /// An empty session whose documents use `config`.
    #[must_use]
    pub const fn new(config: DocumentConfig) -> Self {
        Self {
            config,
            document: None,
        }
    }

    /// The loaded document, if any.
    #[must_use]
    pub const fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    /// History depths and size; zeros before the first upload.
    #[must_use]
    pub fn states(&self) -> DocumentStates {
        DocumentStates::of(self.document.as_ref())
    }

    fn document_mut(&mut self) -> Result<&mut Document, EditError> {
        self.document.as_mut().ok_or(EditError::NotLoaded)
    }

    /// Run one request.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] if the payload is malformed, no image is
    /// loaded yet, or the core rejects the edit. A failed request leaves
    /// the document and its history unchanged.
    pub fn handle(&mut self, request: Request) -> Result<Response, SessionError> {
        let image = match request {
            Request::Upload { image } => {
                let image = payload::decode_image(&image)?;
                info!("loaded {} image", image.dimensions());
                let document = Document::load_with_config(image, self.config);
                self.document.insert(document).image().clone()
            }
            Request::States => {
                return Ok(Response::States {
                    states: self.states(),
                });
            }
            Request::Transform { transform } => {
                self.document_mut()?.apply(&transform)?.clone()
            }
            Request::Select { mask, invert } => {
                let document = self.document_mut()?;
                let mask = payload::decode_mask(&mask)?;
                document
                    .apply(&Transform::Select(Selection { mask, invert }))?
                    .clone()
            }
            Request::AddLayer { image, name } => {
                let document = self.document_mut()?;
                let image = payload::decode_image(&image)?;
                return Ok(Response::Layer {
                    layer: document.add_layer(image, name),
                });
            }
            Request::Undo => self.document_mut()?.undo()?.clone(),
            Request::Redo => self.document_mut()?.redo()?.clone(),
        };
        Ok(Response::Image {
            image: payload::encode_image(&image)?,
        })
    }

    /// Run one request, folding failures into [`Response::Error`].
    pub fn respond(&mut self, request: Request) -> Response {
        self.handle(request).unwrap_or_else(|err| {
            warn!("request rejected: {err}");
            Response::Error(ErrorBody::from(&err))
        })
    }

    /// Parse a JSON request, run it, and serialize the response.
    pub fn respond_json(&mut self, body: &str) -> String {
        let response = match serde_json::from_str::<Request>(body) {
            Ok(request) => self.respond(request),
            Err(err) => {
                let err = SessionError::from(err);
                warn!("request rejected: {err}");
                Response::Error(ErrorBody::from(&err))
            }
        };
        to_json(&response)
    }
}

fn to_json(response: &Response) -> String {
    serde_json::to_string(response).unwrap_or_else(|err| {
        format!(
            r#"{{"status":500,"code":"encode_error","message":"failed to serialize response: {err}","success":false}}"#
        )
    })
}

/// A [`Session`] guarded by a mutex.
#[derive(Debug, Default)]
pub struct SharedSession {
    inner: Mutex<Session>,
}

impl SharedSession {
    /// Wrap a session for shared use.
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self {
            inner: Mutex::new(session),
        }
    }

    /// Run one request under the lock.
    ///
    /// A poisoned lock is recovered: the document is only replaced after
    /// an edit has fully succeeded, so the state it guards is consistent.
    pub fn respond(&self, request: Request) -> Response {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .respond(request)
    }

    /// JSON variant of [`respond`](Self::respond).
    pub fn respond_json(&self, body: &str) -> String {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .respond_json(body)
    }

    /// Current history depths and size.
    pub fn states(&self) -> DocumentStates {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .states()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use retouch_core::PixelBuffer;
    use retouch_core::transform::{FilterKind, FilterParams, ToneParams};

    use super::*;

    fn upload_request(pixel: [u8; 3]) -> Request {
        let image = PixelBuffer::filled(4, 4, pixel).unwrap();
        Request::Upload {
            image: payload::encode_image(&image).unwrap(),
        }
    }

    fn ghost() -> Request {
        Request::Transform {
            transform: Transform::Filter(FilterParams {
                kind: FilterKind::Ghost,
            }),
        }
    }

    fn image_of(response: &Response) -> PixelBuffer {
        match response {
            Response::Image { image } => payload::decode_image(image).unwrap(),
            other => panic!("expected image response, got {other:?}"),
        }
    }

    #[test]
    fn transform_before_upload_is_not_loaded() {
        let mut session = Session::default();
        let response = session.respond(ghost());
        let Response::Error(body) = response else {
            panic!("expected error, got {response:?}");
        };
        assert_eq!(body.status, 400);
        assert_eq!(body.code, "not_loaded");
        assert!(!body.success);
    }

    #[test]
    fn states_before_upload_are_zero() {
        let mut session = Session::default();
        let response = session.respond(Request::States);
        assert_eq!(
            response,
            Response::States {
                states: DocumentStates::default()
            }
        );
    }

    #[test]
    fn upload_transform_undo_redo() {
        let mut session = Session::default();
        let uploaded = image_of(&session.respond(upload_request([10, 20, 30])));
        assert_eq!(uploaded.pixel(0, 0), [10, 20, 30]);

        let edited = image_of(&session.respond(ghost()));
        assert_eq!(edited.pixel(0, 0), [245, 235, 225]);

        let undone = image_of(&session.respond(Request::Undo));
        assert_eq!(undone, uploaded);

        let redone = image_of(&session.respond(Request::Redo));
        assert_eq!(redone, edited);
        assert_eq!(session.states().undo, 1);
    }

    #[test]
    fn undo_on_fresh_upload_reports_nothing_to_undo() {
        let mut session = Session::default();
        session.respond(upload_request([1, 1, 1]));
        let Response::Error(body) = session.respond(Request::Undo) else {
            panic!("expected error");
        };
        assert_eq!(body.message, "Nothing to undo");
        assert_eq!(body.code, "nothing_to_undo");
    }

    #[test]
    fn upload_discards_history() {
        let mut session = Session::default();
        session.respond(upload_request([1, 1, 1]));
        session.respond(ghost());
        session.respond(ghost());
        assert_eq!(session.states().undo, 2);

        session.respond(upload_request([2, 2, 2]));
        assert_eq!(session.states().undo, 0);
        assert_eq!(session.states().redo, 0);
    }

    #[test]
    fn rejected_edit_keeps_history() {
        let mut session = Session::default();
        session.respond(upload_request([1, 1, 1]));
        session.respond(ghost());
        let before = session.states();

        let response = session.respond(Request::Transform {
            transform: Transform::Tone(ToneParams { amount: 500 }),
        });
        assert!(!response.is_success());
        assert_eq!(session.states(), before);
    }

    #[test]
    fn oversized_resize_is_a_client_error() {
        let mut session = Session::default();
        session.respond(upload_request([1, 1, 1]));
        let response = session.respond_json(
            r#"{"op": "transform", "transform": {"type": "resize", "width": 4294967295}}"#,
        );
        let value: serde_json::Value = serde_json::from_str(&response).unwrap();
        assert_eq!(value["status"], 400);
        assert_eq!(value["code"], "invalid_parameter");
        assert_eq!(session.states().width, 4);
    }

    #[test]
    fn select_with_mismatched_mask_fails() {
        let mut session = Session::default();
        session.respond(upload_request([50, 50, 50]));
        let mask = PixelBuffer::filled(2, 2, [255, 255, 255]).unwrap();
        let request = Request::Select {
            mask: payload::encode_image(&mask).unwrap(),
            invert: false,
        };
        let Response::Error(body) = session.respond(request) else {
            panic!("expected error");
        };
        assert_eq!(body.code, "shape_mismatch");
    }

    #[test]
    fn add_layer_returns_generated_name() {
        let mut session = Session::default();
        let add = |session: &mut Session| {
            let image = PixelBuffer::filled(4, 4, [0, 0, 0]).unwrap();
            session.respond(Request::AddLayer {
                image: payload::encode_image(&image).unwrap(),
                name: None,
            })
        };
        assert!(!add(&mut session).is_success());

        session.respond(upload_request([1, 1, 1]));
        assert_eq!(
            add(&mut session),
            Response::Layer {
                layer: "layer2".to_string()
            }
        );
        assert_eq!(session.states().undo, 1);
    }

    #[test]
    fn json_round_trip() {
        let mut session = Session::default();
        let out = session.respond_json(r#"{"op": "states"}"#);
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["states"]["undo"], 0);

        let out = session.respond_json("{not json");
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["code"], "invalid_request");
        assert_eq!(value["status"], 400);
    }

    #[test]
    fn shared_session_serializes_edits() {
        let shared = Arc::new(SharedSession::default());
        assert!(shared.respond(upload_request([0, 0, 0])).is_success());

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let shared = Arc::clone(&shared);
                thread::spawn(move || {
                    for _ in 0..5 {
                        assert!(shared.respond(ghost()).is_success());
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(shared.states().undo, 20);
        assert!(!shared.respond(Request::Redo).is_success());
        let image = image_of(&shared.respond(Request::Undo));
        // 19 ghosts applied: odd count.
        assert_eq!(image.pixel(0, 0), [255, 255, 255]);
    }
}
