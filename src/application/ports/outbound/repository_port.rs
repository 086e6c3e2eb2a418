//! Repository port - Interface for story persistence

use async_trait::async_trait;

use crate::domain::entities::Story;
use crate::domain::value_objects::StoryId;

/// Errors surfaced by story repositories
#[derive(Debug, thiserror::Error)]
pub enum StoryRepositoryError {
    #[error("story not found: {0}")]
    NotFound(StoryId),
    #[error("database error: {0}")]
    Database(String),
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Persistence interface for stories.
///
/// The generation and edit services never touch this; only the request
/// handlers do. Implementations live in the infrastructure layer.
#[async_trait]
pub trait StoryRepository: Send + Sync {
    async fn create(&self, story: &Story) -> Result<(), StoryRepositoryError>;

    async fn get(&self, id: StoryId) -> Result<Option<Story>, StoryRepositoryError>;

    /// All stories, newest first.
    async fn list(&self) -> Result<Vec<Story>, StoryRepositoryError>;

    /// Overwrite an existing story row. Fails with `NotFound` if the story
    /// does not exist.
    async fn update(&self, story: &Story) -> Result<(), StoryRepositoryError>;

    /// Returns whether a row was deleted.
    async fn delete(&self, id: StoryId) -> Result<bool, StoryRepositoryError>;
}
