use std::path::PathBuf;

use renderview::error::{SceneError, ViewError};

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid scenario JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("object `{object}` names unknown parent `{parent}`")]
    UnknownParent { object: String, parent: String },
    #[error("duplicate object name `{0}`")]
    DuplicateObject(String),
    #[error("step {step} names viewport {index}, but the scenario declares {count}")]
    UnknownViewport { step: usize, index: usize, count: usize },
    #[error(transparent)]
    View(#[from] ViewError),
    #[error(transparent)]
    Scene(#[from] SceneError),
}
