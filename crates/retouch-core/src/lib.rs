//! retouch-core: in-memory raster image editing (sans-IO).
//!
//! Holds one image document and applies pixel-level transforms to it
//! with linear undo/redo:
//!
//! - [`types`]: [`PixelBuffer`], [`Mask`], [`EditError`]
//! - [`kernel`] and [`blur`]: Gaussian kernel and mirrored-border blur
//! - [`color`] and [`balance`]: grayscale, saturation, contrast, tone,
//!   sepia, ghost, white balance
//! - [`resize`], [`rotate`], [`select`]: geometric and masked edits
//! - [`transform`]: the [`Transform`] catalogue and its dispatch
//! - [`document`]: the [`Document`] state machine
//! - [`codec`]: file bytes in, PNG bytes out
//!
//! This crate has **no I/O dependencies**: it works on in-memory byte
//! slices and buffers. Transport and session handling live in
//! `retouch-session`.
//!
//! ```rust
//! # use retouch_core::{Document, EditError, PixelBuffer, Transform};
//! # use retouch_core::transform::{FilterKind, FilterParams};
//! let image = PixelBuffer::filled(4, 4, [100, 150, 200])?;
//! let mut doc = Document::load(image);
//! doc.apply(&Transform::Filter(FilterParams { kind: FilterKind::Ghost }))?;
//! assert_eq!(doc.image().pixel(0, 0), [155, 105, 55]);
//! doc.undo()?;
//! assert_eq!(doc.image().pixel(0, 0), [100, 150, 200]);
//! # Ok::<(), EditError>(())
//! ```

pub mod balance;
pub mod blur;
pub mod codec;
pub mod color;
pub mod document;
pub mod kernel;
pub mod resize;
pub mod rotate;
pub mod select;
pub mod transform;
pub mod types;

pub use document::{Document, DocumentConfig, DocumentStates, Layers, Snapshot};
pub use kernel::Kernel;
pub use transform::Transform;
pub use types::{Dimensions, EditError, Mask, PixelBuffer};
