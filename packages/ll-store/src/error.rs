//! Error types for the LL layer.
//!
//! Errors at this level are storage-focused. No semantic errors like
//! "malformed document" or "counter out of range" - those belong in higher layers.

use crate::FileHandle;

/// Errors at the LL (low-level) layer.
///
/// These are filesystem and durable-memory errors only. Semantic errors
/// (bad JSON, invalid counter records) belong in higher layers.
#[derive(Debug)]
pub enum LLError {
    /// Generic I/O failure from the backing medium.
    Transport(Box<dyn std::error::Error + Send + Sync>),

    /// The operation is not supported by this provider.
    ///
    /// For example, writing through a handle opened for reading.
    NotSupported,

    /// Resource limit exceeded.
    ///
    /// Out of space, too many open handles, etc.
    ResourceExhausted,

    /// The filesystem is not mounted.
    NotMounted,

    /// No file exists at the given path.
    NotFound {
        /// The path that was looked up.
        path: String,
    },

    /// The handle is not open on this provider.
    InvalidHandle(FileHandle),

    /// A durable-memory access fell outside the addressable range.
    OutOfBounds {
        offset: usize,
        len: usize,
        capacity: usize,
    },
}

impl std::fmt::Display for LLError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LLError::Transport(e) => write!(f, "transport error: {}", e),
            LLError::NotSupported => write!(f, "operation not supported"),
            LLError::ResourceExhausted => write!(f, "resource exhausted"),
            LLError::NotMounted => write!(f, "filesystem not mounted"),
            LLError::NotFound { path } => write!(f, "no such file: {}", path),
            LLError::InvalidHandle(handle) => write!(f, "invalid file handle: {}", handle),
            LLError::OutOfBounds {
                offset,
                len,
                capacity,
            } => write!(
                f,
                "access of {} bytes at offset {} exceeds capacity {}",
                len, offset, capacity
            ),
        }
    }
}

impl std::error::Error for LLError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LLError::Transport(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

impl From<std::io::Error> for LLError {
    fn from(e: std::io::Error) -> Self {
        match e.kind() {
            std::io::ErrorKind::NotFound => LLError::NotFound {
                path: e.to_string(),
            },
            _ => LLError::Transport(Box::new(e)),
        }
    }
}
