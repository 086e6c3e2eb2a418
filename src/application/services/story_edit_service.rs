//! Story edit service - change classification and regeneration
//!
//! An edit request is first classified against a snapshot of the stored
//! story, then resolved: kept as-is, overwritten with the user's text, or
//! semantically re-adapted through the LLM. A manual content edit is
//! authoritative and is never overwritten by automatic adaptation, even when
//! metadata changed in the same request.

use std::sync::Arc;

use crate::application::ports::outbound::{ChatMessage, LlmPort, LlmRequest};
use crate::application::services::llm::{normalize_title, prompt_builder};
use crate::domain::value_objects::{
    EditClassification, EditDecision, EditRequest, GenerationParameters, StorySnapshot,
};

/// Framing shared by the adaptation calls.
const SYSTEM_PROMPT: &str =
    "You are a warm, imaginative children's author who adapts gentle bedtime stories.";

/// Errors internal to the adaptation path. These never escape
/// [`StoryEditService::classify_and_resolve`]; they only exist so the
/// fallback-to-original merge is an explicit step over a `Result`.
#[derive(Debug, thiserror::Error)]
pub enum AdaptationError {
    #[error("LLM error: {0}")]
    Llm(String),
}

/// Classify an edit request against the original story state.
///
/// Precedence: a changed content field wins over changed metadata, which wins
/// over a changed title. Absent fields never count as changes.
pub fn classify(snapshot: &StorySnapshot, request: &EditRequest) -> EditClassification {
    if content_changed(snapshot, request) {
        return EditClassification::ContentEdit;
    }
    if metadata_changed(&snapshot.parameters, request) {
        return EditClassification::MetadataEdit;
    }
    if title_changed(snapshot, request) {
        return EditClassification::TitleOnlyEdit;
    }
    EditClassification::NoOp
}

fn content_changed(snapshot: &StorySnapshot, request: &EditRequest) -> bool {
    request
        .content
        .as_deref()
        .is_some_and(|incoming| incoming.trim() != snapshot.content.trim())
}

fn metadata_changed(original: &GenerationParameters, request: &EditRequest) -> bool {
    fn differs(incoming: &Option<String>, original: &str) -> bool {
        incoming.as_deref().is_some_and(|v| v != original)
    }
    fn differs_opt(incoming: &Option<String>, original: &Option<String>) -> bool {
        incoming
            .as_deref()
            .is_some_and(|v| Some(v) != original.as_deref())
    }

    differs(&request.age_group, &original.age_group)
        || differs(&request.language, &original.language)
        || differs(&request.topic, &original.topic)
        || differs(&request.subtopic, &original.subtopic)
        || differs(&request.style, &original.style)
        || differs_opt(&request.first_name, &original.first_name)
        || differs_opt(&request.gender, &original.gender)
}

fn title_changed(snapshot: &StorySnapshot, request: &EditRequest) -> bool {
    request
        .title
        .as_deref()
        .is_some_and(|incoming| incoming.trim() != snapshot.title.trim())
}

/// The incoming title, trimmed, when it is present and actually different.
fn explicit_title(snapshot: &StorySnapshot, request: &EditRequest) -> Option<String> {
    request
        .title
        .as_deref()
        .map(str::trim)
        .filter(|incoming| *incoming != snapshot.title.trim())
        .map(str::to_string)
}

/// Service that resolves story edits
pub struct StoryEditService<L: LlmPort> {
    llm: Arc<L>,
}

impl<L: LlmPort> StoryEditService<L> {
    pub fn new(llm: Arc<L>) -> Self {
        Self { llm }
    }

    /// Classify the edit and resolve the final title and content.
    ///
    /// Never fails: a generation failure during adaptation degrades to
    /// keeping the original content and title untouched, so an edit request
    /// cannot leave a story worse off than it was.
    pub async fn classify_and_resolve(
        &self,
        snapshot: &StorySnapshot,
        request: &EditRequest,
    ) -> EditDecision {
        match classify(snapshot, request) {
            EditClassification::NoOp => EditDecision {
                classification: EditClassification::NoOp,
                final_title: snapshot.title.clone(),
                final_story_content: snapshot.content.clone(),
                regeneration_attempted: false,
                regeneration_succeeded: false,
            },
            EditClassification::ContentEdit => {
                // The manual edit is used verbatim; the title only moves if
                // the user changed it themselves.
                let final_title =
                    explicit_title(snapshot, request).unwrap_or_else(|| snapshot.title.clone());
                let final_story_content = request
                    .content
                    .clone()
                    .unwrap_or_else(|| snapshot.content.clone());
                EditDecision {
                    classification: EditClassification::ContentEdit,
                    final_title,
                    final_story_content,
                    regeneration_attempted: false,
                    regeneration_succeeded: false,
                }
            }
            EditClassification::TitleOnlyEdit => EditDecision {
                classification: EditClassification::TitleOnlyEdit,
                final_title: explicit_title(snapshot, request)
                    .unwrap_or_else(|| snapshot.title.clone()),
                final_story_content: snapshot.content.clone(),
                regeneration_attempted: false,
                regeneration_succeeded: false,
            },
            EditClassification::MetadataEdit => {
                let effective = request.merged_parameters(&snapshot.parameters);
                match self.adapt_story(snapshot, &effective).await {
                    Ok((adapted_content, adapted_title)) => {
                        // An explicitly supplied title beats the adapted one.
                        let final_title =
                            explicit_title(snapshot, request).unwrap_or(adapted_title);
                        EditDecision {
                            classification: EditClassification::MetadataEdit,
                            final_title,
                            final_story_content: adapted_content,
                            regeneration_attempted: true,
                            regeneration_succeeded: true,
                        }
                    }
                    Err(e) => {
                        tracing::warn!(
                            "Story adaptation failed, keeping original content and title: {}",
                            e
                        );
                        EditDecision {
                            classification: EditClassification::MetadataEdit,
                            final_title: snapshot.title.clone(),
                            final_story_content: snapshot.content.clone(),
                            regeneration_attempted: true,
                            regeneration_succeeded: false,
                        }
                    }
                }
            }
        }
    }

    /// Adapt the story text to the effective parameter set, then re-title it.
    ///
    /// The title call only runs once adapted content exists, so the title
    /// always reflects the final story. Either call failing fails the whole
    /// adaptation; the caller falls back to the originals.
    async fn adapt_story(
        &self,
        snapshot: &StorySnapshot,
        effective: &GenerationParameters,
    ) -> Result<(String, String), AdaptationError> {
        let adaptation_prompt = prompt_builder::compose_adaptation_prompt(
            &snapshot.title,
            &snapshot.content,
            &snapshot.parameters,
            effective,
        );
        let adapted_content = self.run_generation(adaptation_prompt, None).await?;

        let title_prompt = prompt_builder::compose_adapted_title_prompt(
            &snapshot.title,
            &adapted_content,
            effective,
        );
        let raw_title = self.run_generation(title_prompt, Some(64)).await?;

        Ok((adapted_content, normalize_title(&raw_title)))
    }

    async fn run_generation(
        &self,
        prompt: String,
        max_tokens: Option<u32>,
    ) -> Result<String, AdaptationError> {
        let request = LlmRequest::new(vec![ChatMessage::user(prompt)])
            .with_system_prompt(SYSTEM_PROMPT)
            .with_temperature(0.8)
            .with_max_tokens(max_tokens);

        let response = self
            .llm
            .generate(request)
            .await
            .map_err(|e| AdaptationError::Llm(e.to_string()))?;

        Ok(response.content)
    }
}
