//! Shared application state

use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool};

use crate::application::services::{StoryEditService, StoryGenerationService};
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::ollama::OllamaClient;
use crate::infrastructure::persistence::SqliteStoryRepository;

/// Shared application state
pub struct AppState {
    pub config: AppConfig,
    pub repository: SqliteStoryRepository,
    pub generation_service: StoryGenerationService<OllamaClient>,
    pub edit_service: StoryEditService<OllamaClient>,
}

impl AppState {
    pub async fn new(config: AppConfig) -> Result<Self> {
        // Ensure the database directory exists
        if let Some(parent) = std::path::Path::new(&config.database_path).parent() {
            std::fs::create_dir_all(parent).context("Failed to create database directory")?;
        }

        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", config.database_path))
            .context("Invalid database path")?
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(options)
            .await
            .context("Failed to connect to SQLite story database")?;
        let repository = SqliteStoryRepository::new(pool)
            .await
            .context("Failed to initialize story repository")?;

        let llm_client = Arc::new(OllamaClient::new(
            &config.ollama_base_url,
            &config.ollama_model,
        ));
        if !llm_client.health_check().await.unwrap_or(false) {
            tracing::warn!("Ollama is not reachable at {}", config.ollama_base_url);
        }
        let generation_service = StoryGenerationService::new(llm_client.clone());
        let edit_service = StoryEditService::new(llm_client);

        Ok(Self {
            config,
            repository,
            generation_service,
            edit_service,
        })
    }
}
