use std::path::PathBuf;

use retouch_core::EditError;

/// Everything that can stop a `retouch` run.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Reading the input or writing the output failed.
    #[error("{path}: {source}")]
    Io {
        /// File that was being read or written.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// An `--edit` argument could not be parsed.
    #[error("invalid edit {edit:?}: {reason}")]
    Parse {
        /// The edit as given on the command line.
        edit: String,
        /// What was wrong with it.
        reason: String,
    },

    /// `--edits-json` was not a JSON array of transforms.
    #[error("invalid --edits-json: {0}")]
    Json(#[from] serde_json::Error),

    /// The editing core rejected an edit or an image.
    #[error(transparent)]
    Edit(#[from] EditError),
}

impl CliError {
    pub(crate) fn parse(edit: &str, reason: impl Into<String>) -> Self {
        Self::Parse {
            edit: edit.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
