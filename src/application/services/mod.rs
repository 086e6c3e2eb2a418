//! Application services - Use case implementations
//!
//! Each service follows hexagonal architecture principles: it depends on the
//! outbound ports it needs and returns domain values. The two story services
//! are generic over the LLM port so tests can drive them with mocks.

pub mod llm;
pub mod story_edit_service;
pub mod story_generation_service;

pub use story_edit_service::{classify, StoryEditService};
pub use story_generation_service::{GenerationError, StoryGenerationService};
