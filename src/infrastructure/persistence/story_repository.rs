//! SQLite adapter for story persistence

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::application::ports::outbound::{StoryRepository, StoryRepositoryError};
use crate::domain::entities::Story;
use crate::domain::value_objects::{GenerationParameters, StoryId};

const CREATE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS stories (
    id          TEXT PRIMARY KEY,
    title       TEXT NOT NULL,
    content     TEXT NOT NULL,
    characters  TEXT NOT NULL,
    scenes      TEXT NOT NULL,
    parameters  TEXT NOT NULL,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
)
"#;

/// SQLite-backed story repository
#[derive(Clone)]
pub struct SqliteStoryRepository {
    pool: SqlitePool,
}

impl SqliteStoryRepository {
    /// Create the repository, ensuring the schema exists
    pub async fn new(pool: SqlitePool) -> Result<Self, StoryRepositoryError> {
        sqlx::query(CREATE_TABLE)
            .execute(&pool)
            .await
            .map_err(database_error)?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl StoryRepository for SqliteStoryRepository {
    async fn create(&self, story: &Story) -> Result<(), StoryRepositoryError> {
        let parameters = serde_json::to_string(&story.parameters)
            .map_err(|e| StoryRepositoryError::Serialization(e.to_string()))?;

        sqlx::query(
            "INSERT INTO stories (id, title, content, characters, scenes, parameters, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .bind(story.id.to_string())
        .bind(&story.title)
        .bind(&story.content)
        .bind(&story.characters)
        .bind(&story.scenes)
        .bind(parameters)
        .bind(story.created_at.to_rfc3339())
        .bind(story.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(database_error)?;

        Ok(())
    }

    async fn get(&self, id: StoryId) -> Result<Option<Story>, StoryRepositoryError> {
        let row = sqlx::query("SELECT * FROM stories WHERE id = ?1")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(database_error)?;

        row.map(|r| story_from_row(&r)).transpose()
    }

    async fn list(&self) -> Result<Vec<Story>, StoryRepositoryError> {
        let rows = sqlx::query("SELECT * FROM stories ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await
            .map_err(database_error)?;

        rows.iter().map(story_from_row).collect()
    }

    async fn update(&self, story: &Story) -> Result<(), StoryRepositoryError> {
        let parameters = serde_json::to_string(&story.parameters)
            .map_err(|e| StoryRepositoryError::Serialization(e.to_string()))?;

        let result = sqlx::query(
            "UPDATE stories
             SET title = ?1, content = ?2, characters = ?3, scenes = ?4, parameters = ?5, updated_at = ?6
             WHERE id = ?7",
        )
        .bind(&story.title)
        .bind(&story.content)
        .bind(&story.characters)
        .bind(&story.scenes)
        .bind(parameters)
        .bind(story.updated_at.to_rfc3339())
        .bind(story.id.to_string())
        .execute(&self.pool)
        .await
        .map_err(database_error)?;

        if result.rows_affected() == 0 {
            return Err(StoryRepositoryError::NotFound(story.id));
        }
        Ok(())
    }

    async fn delete(&self, id: StoryId) -> Result<bool, StoryRepositoryError> {
        let result = sqlx::query("DELETE FROM stories WHERE id = ?1")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(database_error)?;

        Ok(result.rows_affected() > 0)
    }
}

fn database_error(e: sqlx::Error) -> StoryRepositoryError {
    StoryRepositoryError::Database(e.to_string())
}

fn story_from_row(row: &SqliteRow) -> Result<Story, StoryRepositoryError> {
    let id: String = row.try_get("id").map_err(database_error)?;
    let parameters: String = row.try_get("parameters").map_err(database_error)?;
    let created_at: String = row.try_get("created_at").map_err(database_error)?;
    let updated_at: String = row.try_get("updated_at").map_err(database_error)?;

    let id = Uuid::parse_str(&id)
        .map(StoryId::from_uuid)
        .map_err(|e| StoryRepositoryError::Serialization(e.to_string()))?;
    let parameters: GenerationParameters = serde_json::from_str(&parameters)
        .map_err(|e| StoryRepositoryError::Serialization(e.to_string()))?;

    Ok(Story {
        id,
        title: row.try_get("title").map_err(database_error)?,
        content: row.try_get("content").map_err(database_error)?,
        characters: row.try_get("characters").map_err(database_error)?,
        scenes: row.try_get("scenes").map_err(database_error)?,
        parameters,
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, StoryRepositoryError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoryRepositoryError::Serialization(e.to_string()))
}
