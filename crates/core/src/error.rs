use thiserror::Error;

use crate::model::IdError;
use crate::model::SnapshotError;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Id(#[from] IdError),
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}
