use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

/// Represents all possible errors in the restatic crate.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Hash, Eq)]
pub enum Error {
    /// The requested path does not exist under the served root.
    #[error("Not found: {what}")]
    NotFound {
        /// The path that was not found.
        what: String,
    },

    /// Error indicating a failure to stat, list or read a path for a reason
    /// other than its absence.
    #[error("Failed to read {what}: {how}")]
    Unreadable {
        /// The item that failed to be read.
        what: String,
        /// The reason for the failure.
        how: String,
    },

    /// The target text of a symlink could not be read.
    #[error("Failed to read link {what}: {how}")]
    LinkResolution {
        /// The symlink whose target could not be read.
        what: String,
        /// The reason for the failure.
        how: String,
    },

    /// The content of a list or map file could not be read in full.
    #[error("Failed to read content of {what}: {how}")]
    ContentRead {
        /// The file whose content could not be read.
        what: String,
        /// The reason for the failure.
        how: String,
    },

    /// Error indicating an invalid path.
    #[error("Invalid path: {what}")]
    InvalidPath {
        /// The invalid path description.
        what: String,
    },

    /// Error indicating a failure to bind or run the HTTP server.
    #[error("Failed to serve {what}: {how}")]
    Serve {
        /// The address or stage that failed.
        what: String,
        /// The reason for the failure.
        how: String,
    },
}

impl Error {
    /// Maps an I/O error on `path` to `NotFound` when the path is absent and
    /// to `Unreadable` otherwise.
    pub fn from_io(path: &std::path::Path, e: &std::io::Error) -> Self {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::NotFound {
                what: path.display().to_string(),
            }
        } else {
            Error::Unreadable {
                what: path.display().to_string(),
                how: e.to_string(),
            }
        }
    }
}
