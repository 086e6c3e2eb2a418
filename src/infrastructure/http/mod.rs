//! HTTP REST API routes

mod story_routes;

use axum::{
    routing::{delete, get, patch, post},
    Router,
};
use std::sync::Arc;

use crate::infrastructure::state::AppState;

pub use story_routes::*;

/// Create all API routes
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/stories", get(story_routes::list_stories))
        .route("/api/stories", post(story_routes::create_story))
        .route("/api/stories/{id}", get(story_routes::get_story))
        .route("/api/stories/{id}", patch(story_routes::edit_story))
        .route("/api/stories/{id}", delete(story_routes::delete_story))
}
