use jsonfx_alloc::AllocError;
use thiserror::Error;

/// Why a document could not be loaded.
///
/// A failed load leaves the previous root in place.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// The text is not well-formed JSON.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The pool refused to grow a node, typically a container or string
    /// larger than one chunk while big allocations are disabled.
    #[error("pool refused an allocation: {0}")]
    Alloc(#[from] AllocError),

    /// Reading the input stream failed.
    #[error("failed to read input stream: {0}")]
    Io(#[from] std::io::Error),

    /// The input holds nothing but whitespace.
    #[error("input is empty")]
    Empty,

    /// The input bytes are not UTF-8.
    #[error("input is not valid UTF-8 after byte {valid_up_to}")]
    NotUtf8 {
        /// Length of the valid prefix.
        valid_up_to: usize,
    },
}

impl From<core::str::Utf8Error> for DocumentError {
    fn from(err: core::str::Utf8Error) -> Self {
        DocumentError::NotUtf8 {
            valid_up_to: err.valid_up_to(),
        }
    }
}
