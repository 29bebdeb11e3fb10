use thiserror::Error;

use crate::data::store::{EntityType, Post, User};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} id `{1}` is used more than once")]
    DuplicateId(EntityType, String),
    #[error("invalid dataset: {0}")]
    InvalidDataset(String),
    #[error("failed to read dataset file {0}: {1}")]
    Io(String, std::io::Error),
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::InvalidDataset(e.to_string())
    }
}

/// Read access to the users and posts of the dataset.
///
/// A lookup for an id that does not exist returns `Ok(None)`; errors are
/// reserved for the store itself failing. List operations return records in
/// the order in which they were added to the dataset. Implementations are
/// shared between all concurrent requests.
pub trait DatasetStore: Send + Sync + 'static {
    fn get_user(&self, id: &str) -> Result<Option<User>, StoreError>;

    fn get_post(&self, id: &str) -> Result<Option<Post>, StoreError>;

    fn list_users(&self) -> Result<Vec<User>, StoreError>;

    fn list_posts(&self) -> Result<Vec<Post>, StoreError>;
}
