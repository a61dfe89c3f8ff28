//! The editable document: current image, named layers and linear
//! undo/redo history.
//!
//! Every forward edit ([`Document::apply`], [`Document::apply_image`],
//! [`Document::add_layer`]) snapshots the pre-edit state onto the undo
//! stack and clears the redo stack. [`Document::undo`] and
//! [`Document::redo`] swap the current state with the top of the
//! respective stack.
//!
//! Snapshots hold [`PixelBuffer`]s, which share their samples, so a
//! snapshot costs one reference count per layer rather than a copy of
//! every pixel. Buffers are immutable, so sharing is unobservable.

use std::collections::{BTreeMap, VecDeque};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::transform::Transform;
use crate::types::{EditError, PixelBuffer};

/// Name of the layer created by [`Document::load`].
pub const INITIAL_LAYER: &str = "layer1";

/// Document configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DocumentConfig {
    /// Maximum undo depth. `None` keeps every snapshot; when set, the
    /// oldest snapshot is dropped once the cap is exceeded.
    pub max_history: Option<usize>,
}

/// Named layers with one current layer.
///
/// Never empty: it is created with one layer and layers are only ever
/// added.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layers {
    entries: BTreeMap<String, PixelBuffer>,
    current: String,
}

impl Layers {
    fn new(image: PixelBuffer) -> Self {
        let mut entries = BTreeMap::new();
        entries.insert(INITIAL_LAYER.to_string(), image);
        Self {
            entries,
            current: INITIAL_LAYER.to_string(),
        }
    }

    /// Name of the current layer.
    #[must_use]
    pub fn current_name(&self) -> &str {
        &self.current
    }

    /// Image of the named layer.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&PixelBuffer> {
        self.entries.get(name)
    }

    /// Number of layers, at least one.
    #[must_use]
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    fn set_current(&mut self, image: PixelBuffer) {
        self.entries.insert(self.current.clone(), image);
    }

    fn insert(&mut self, name: String, image: PixelBuffer) {
        self.entries.insert(name, image);
    }
}

/// A point-in-time copy of a document's image and layers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// The current image.
    pub image: PixelBuffer,
    /// All layers.
    pub layers: Layers,
}

/// Undo depth, redo depth and current image size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentStates {
    /// Entries on the undo stack.
    pub undo: usize,
    /// Entries on the redo stack.
    pub redo: usize,
    /// Current image width (0 without a document).
    pub width: u32,
    /// Current image height (0 without a document).
    pub height: u32,
}

impl DocumentStates {
    /// States of an optional document; all zeros for `None`.
    #[must_use]
    pub fn of(document: Option<&Document>) -> Self {
        document.map_or_else(Self::default, Document::states)
    }
}

#[derive(Debug, Clone, Default)]
struct History {
    undo: VecDeque<Snapshot>,
    redo: Vec<Snapshot>,
    max_depth: Option<usize>,
}

impl History {
    fn record(&mut self, snapshot: Snapshot) {
        self.undo.push_back(snapshot);
        if let Some(max) = self.max_depth {
            while self.undo.len() > max {
                self.undo.pop_front();
            }
        }
        self.redo.clear();
    }
}

/// A loaded image plus its edit history.
///
/// There is no empty document: the "nothing loaded" state belongs to
/// whoever holds an `Option<Document>`.
#[derive(Debug, Clone)]
pub struct Document {
    image: PixelBuffer,
    layers: Layers,
    layer_count: u32,
    history: History,
}

impl Document {
    /// Start a fresh document with default configuration.
    #[must_use]
    pub fn load(image: PixelBuffer) -> Self {
        Self::load_with_config(image, DocumentConfig::default())
    }

    /// Start a fresh document: one layer named [`INITIAL_LAYER`], empty
    /// history.
    #[must_use]
    pub fn load_with_config(image: PixelBuffer, config: DocumentConfig) -> Self {
        debug!("loading {} image", image.dimensions());
        Self {
            layers: Layers::new(image.clone()),
            image,
            layer_count: 1,
            history: History {
                max_depth: config.max_history,
                ..History::default()
            },
        }
    }

    /// The current image.
    #[must_use]
    pub const fn image(&self) -> &PixelBuffer {
        &self.image
    }

    /// The layer set.
    #[must_use]
    pub const fn layers(&self) -> &Layers {
        &self.layers
    }

    /// Copy of the current image and layers.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            image: self.image.clone(),
            layers: self.layers.clone(),
        }
    }

    /// Depths of both stacks and the current size.
    #[must_use]
    pub fn states(&self) -> DocumentStates {
        DocumentStates {
            undo: self.history.undo.len(),
            redo: self.history.redo.len(),
            width: self.image.width(),
            height: self.image.height(),
        }
    }

    /// Run `transform` on the current image and record it as an edit.
    ///
    /// The transform runs before any state changes; if it fails, the
    /// document and its history are untouched.
    ///
    /// # Errors
    ///
    /// Propagates the transform's error.
    pub fn apply(&mut self, transform: &Transform) -> Result<&PixelBuffer, EditError> {
        let next = transform.apply_to(&self.image)?;
        debug!("applied {transform}");
        self.apply_image(next);
        Ok(&self.image)
    }

    /// Replace the current image (and current layer) with an already
    /// computed buffer, recording the change as an edit.
    pub fn apply_image(&mut self, image: PixelBuffer) {
        let snapshot = self.snapshot();
        self.history.record(snapshot);
        self.layers.set_current(image.clone());
        self.image = image;
    }

    /// Add a layer. Unnamed layers are called `layer{N}` where `N`
    /// counts every layer ever added, starting after [`INITIAL_LAYER`].
    /// Returns the name used. Adding is itself an undoable edit; a name
    /// that already exists is overwritten.
    pub fn add_layer(&mut self, image: PixelBuffer, name: Option<String>) -> String {
        self.layer_count += 1;
        let name = name
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| format!("layer{}", self.layer_count));
        let snapshot = self.snapshot();
        self.history.record(snapshot);
        debug!("adding layer {name}");
        self.layers.insert(name.clone(), image);
        name
    }

    /// Step back one edit.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::NothingToUndo`] if there is no earlier state.
    pub fn undo(&mut self) -> Result<&PixelBuffer, EditError> {
        let previous = self.history.undo.pop_back().ok_or(EditError::NothingToUndo)?;
        let current = self.restore(previous);
        self.history.redo.push(current);
        debug!("undo: {:?}", self.states());
        Ok(&self.image)
    }

    /// Step forward one undone edit.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::NothingToRedo`] if nothing has been undone
    /// since the last forward edit.
    pub fn redo(&mut self) -> Result<&PixelBuffer, EditError> {
        let next = self.history.redo.pop().ok_or(EditError::NothingToRedo)?;
        let current = self.restore(next);
        self.history.undo.push_back(current);
        debug!("redo: {:?}", self.states());
        Ok(&self.image)
    }

    /// Install `snapshot` as the current state, returning the state it
    /// replaced.
    fn restore(&mut self, snapshot: Snapshot) -> Snapshot {
        Snapshot {
            image: std::mem::replace(&mut self.image, snapshot.image),
            layers: std::mem::replace(&mut self.layers, snapshot.layers),
        }
    }
}
