use thiserror::Error;

use crate::platform::StorageError;
use crate::scene::SceneError;

#[derive(Error, Debug)]
pub enum SaveError {
    #[error("No player found in the current scene")]
    PlayerNotFound,

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Failed to parse save data: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("Failed to serialize save data: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("No save data given")]
    MissingSnapshot,

    #[error("Save data has no player section")]
    MissingPlayer,

    #[error("Scene transition failed: {0}")]
    SceneTransition(#[from] SceneError),

    #[error("Invalid checkpoint interval: {interval_ms} ms")]
    InvalidTimerInterval { interval_ms: f64 },
}

pub type SaveResult<T> = Result<T, SaveError>;
