use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("key not found: {0}")]
    NotFound(String),

    #[error("address already occupied: {0}")]
    Duplicate(String),

    #[error("storage backend error: {0}")]
    Backend(String),
}
