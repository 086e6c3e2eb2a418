//! Story API routes

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::application::ports::outbound::StoryRepository;
use crate::domain::entities::Story;
use crate::domain::value_objects::{
    EditClassification, EditRequest, GenerationParameters, StoryId,
};
use crate::infrastructure::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateStoryRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    pub age_group: String,
    pub language: String,
    pub topic: String,
    pub subtopic: String,
    pub style: String,
}

impl CreateStoryRequest {
    fn into_parameters(self) -> GenerationParameters {
        GenerationParameters {
            title: self.title,
            first_name: self.first_name,
            gender: self.gender,
            age_group: self.age_group,
            language: self.language,
            topic: self.topic,
            subtopic: self.subtopic,
            style: self.style,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryResponse {
    pub id: String,
    pub title: String,
    pub content: String,
    pub characters: String,
    pub scenes: String,
    pub parameters: GenerationParameters,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Story> for StoryResponse {
    fn from(s: Story) -> Self {
        Self {
            id: s.id.to_string(),
            title: s.title,
            content: s.content,
            characters: s.characters,
            scenes: s.scenes,
            parameters: s.parameters,
            created_at: s.created_at,
            updated_at: s.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditStoryResponse {
    pub classification: EditClassification,
    pub regeneration_attempted: bool,
    pub regeneration_succeeded: bool,
    pub story: StoryResponse,
}

/// Generate and persist a new story
pub async fn create_story(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateStoryRequest>,
) -> Result<(StatusCode, Json<StoryResponse>), (StatusCode, String)> {
    validate_required(&req)?;
    let params = req.into_parameters();

    let bundle = state
        .generation_service
        .generate_story(params)
        .await
        .map_err(|e| {
            tracing::error!("Story generation failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to generate story".to_string(),
            )
        })?;

    let story = Story::from_bundle(bundle);
    state
        .repository
        .create(&story)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    Ok((StatusCode::CREATED, Json(StoryResponse::from(story))))
}

/// List stories, newest first
pub async fn list_stories(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<StoryResponse>>, (StatusCode, String)> {
    let stories = state
        .repository
        .list()
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    Ok(Json(stories.into_iter().map(StoryResponse::from).collect()))
}

/// Fetch a single story
pub async fn get_story(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<StoryResponse>, (StatusCode, String)> {
    let id = parse_story_id(&id)?;
    let story = state
        .repository
        .get(id)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
        .ok_or((StatusCode::NOT_FOUND, "Story not found".to_string()))?;

    Ok(Json(StoryResponse::from(story)))
}

/// Edit a story, re-adapting its text where the change demands it
pub async fn edit_story(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<EditRequest>,
) -> Result<Json<EditStoryResponse>, (StatusCode, String)> {
    let id = parse_story_id(&id)?;
    let mut story = state
        .repository
        .get(id)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
        .ok_or((StatusCode::NOT_FOUND, "Story not found".to_string()))?;

    let snapshot = story.snapshot();
    let decision = state.edit_service.classify_and_resolve(&snapshot, &req).await;

    if decision.classification != EditClassification::NoOp {
        // New parameters are only persisted when the story text was actually
        // adapted to them; a failed adaptation keeps the row fully untouched
        // except for the user's own title/content.
        let parameters = if decision.classification == EditClassification::MetadataEdit
            && decision.regeneration_succeeded
        {
            req.merged_parameters(&snapshot.parameters)
        } else {
            snapshot.parameters.clone()
        };

        story.apply_edit(
            decision.final_title.clone(),
            decision.final_story_content.clone(),
            parameters,
        );
        state
            .repository
            .update(&story)
            .await
            .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    }

    Ok(Json(EditStoryResponse {
        classification: decision.classification,
        regeneration_attempted: decision.regeneration_attempted,
        regeneration_succeeded: decision.regeneration_succeeded,
        story: StoryResponse::from(story),
    }))
}

/// Delete a story
pub async fn delete_story(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, (StatusCode, String)> {
    let id = parse_story_id(&id)?;
    let deleted = state
        .repository
        .delete(id)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err((StatusCode::NOT_FOUND, "Story not found".to_string()))
    }
}

fn parse_story_id(raw: &str) -> Result<StoryId, (StatusCode, String)> {
    Uuid::parse_str(raw)
        .map(StoryId::from_uuid)
        .map_err(|_| (StatusCode::BAD_REQUEST, "Invalid story ID".to_string()))
}

fn validate_required(req: &CreateStoryRequest) -> Result<(), (StatusCode, String)> {
    let required = [
        ("ageGroup", &req.age_group),
        ("language", &req.language),
        ("topic", &req.topic),
        ("subtopic", &req.subtopic),
        ("style", &req.style),
    ];
    for (name, value) in required {
        if value.trim().is_empty() {
            return Err((
                StatusCode::UNPROCESSABLE_ENTITY,
                format!("{} must not be empty", name),
            ));
        }
    }
    Ok(())
}
