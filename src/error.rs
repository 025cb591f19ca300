use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while building a keymap from JSON.
#[derive(Debug, Error)]
pub enum KeymapError {
    #[error("failed to read keymap at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid keymap document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("keymap entry {id} must declare combos")]
    MissingCombos { id: String },

    #[error("failed to parse combo '{combo}' for {id}: {reason}")]
    InvalidCombo {
        id: String,
        combo: String,
        reason: String,
    },
}

/// Errors raised while mounting a form navigator.
#[derive(Debug, Error)]
pub enum NavigatorError {
    #[error("initial focus target '{id}' is not an enabled field")]
    UnknownInitialFocus { id: String },
}
