//! Errors surfaced to the command line.

use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum CliError {
    #[error("could not read settings file {path}: {source}")]
    SettingsRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid settings file {path}: {source}")]
    SettingsFormat {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("no data directory found; pass --root")]
    NoDataDir,

    #[error("could not create {path}: {source}")]
    CreateRoot {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Store(#[from] flashcfg_core_store::Error),

    #[error(transparent)]
    Storage(#[from] flashcfg_ll_store::LLError),

    #[error("could not save {path}")]
    NotSaved { path: String },

    #[error("could not remove {path}")]
    NotRemoved { path: String },

    #[error("'{text}' is not {len} bytes of hex")]
    BadHex { text: String, len: usize },
}
