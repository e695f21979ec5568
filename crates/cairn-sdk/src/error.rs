use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("DAG error: {0}")]
    Dag(#[from] cairn_dag::DagError),

    #[error("upload error: {0}")]
    Sync(#[from] cairn_sync::SyncError),

    #[error("CAR error: {0}")]
    Car(#[from] cairn_car::CarError),

    #[error("store error: {0}")]
    Store(#[from] cairn_store::StoreError),
}

pub type SdkResult<T> = Result<T, SdkError>;
