//! Error type of the generation pipeline.

use std::path::PathBuf;

/// Errors raised while compiling, formatting or saving generated types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The `"file"` resolver has no definition for the URL.
    #[error("cannot resolve schema for {url}")]
    UnresolvedRef {
        /// Absolute URL of the referenced document.
        url: String,
    },

    /// No registered resolver accepts the URL.
    #[error("no resolver accepts reference {url}")]
    NoResolver {
        /// Absolute URL of the referenced document.
        url: String,
    },

    /// The fragment part of a `$ref` points nowhere.
    #[error("JSON pointer '{pointer}' does not exist in {document}")]
    InvalidPointer {
        /// The JSON pointer after `#`.
        pointer: String,
        /// `#` for the document being compiled, else its URL.
        document: String,
    },

    /// Reading or writing a file failed.
    #[error("failed to access {}: {source}", path.display())]
    Io {
        /// File being accessed.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: std::io::Error,
    },

    /// A document could not be (de)serialized.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// The schema-ready callback rejected the document.
    #[error("schema hook failed: {0}")]
    Hook(String),
}

/// Result alias defaulting to [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;
