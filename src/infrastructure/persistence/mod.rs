//! Persistence implementations - Infrastructure adapters for the repository port

mod story_repository;

pub use story_repository::SqliteStoryRepository;
