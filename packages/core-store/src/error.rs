//! Error types for the Core layer.

use flashcfg_ll_store::LLError;

/// Errors at the Core layer.
///
/// These include semantic errors (malformed documents, counter placement)
/// in addition to the storage errors from the LL layer.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("storage error: {0}")]
    Storage(#[from] LLError),

    #[error("malformed config document: {message}")]
    Malformed { message: String },

    #[error("config document has no sections")]
    EmptyDocument,

    #[error("config path must not be empty")]
    EmptyPath,

    #[error("nothing was written to {path}")]
    NothingWritten { path: String },

    #[error("no valid placement for wear records: {message}")]
    Placement { message: String },

    #[error("wear tracker is not initialized")]
    NotInitialized,

    #[error("refused: {message}")]
    Refused { message: String },
}
