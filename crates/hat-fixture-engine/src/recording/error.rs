use thiserror::Error;

use crate::recording::snapshot::SnapshotError;

#[derive(Debug, Error)]
pub enum RecorderError {
    #[error("Illegal test case state: {0}")]
    IllegalState(&'static str),
    #[error("Snapshot capture failed: {0}")]
    Snapshot(#[from] SnapshotError),
    #[error("Fixture serialization failed: {0}")]
    Serialize(#[from] serde_yaml::Error),
}
