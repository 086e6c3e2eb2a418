//! Value objects for the story edit path

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::GenerationParameters;

/// The original state of a story, as the edit classifier diffs against it.
///
/// Fetched fresh from the repository for each edit request; read-only for the
/// duration of that request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorySnapshot {
    pub title: String,
    pub parameters: GenerationParameters,
    pub content: String,
}

/// An incoming partial update to a story. Any absent field means
/// "unchanged, use the original value".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub first_name: Option<String>,
    pub gender: Option<String>,
    pub age_group: Option<String>,
    pub language: Option<String>,
    pub topic: Option<String>,
    pub subtopic: Option<String>,
    pub style: Option<String>,
}

impl EditRequest {
    /// The effective new parameter set: the original parameters overridden
    /// field-by-field by whichever fields this request carries.
    pub fn merged_parameters(&self, original: &GenerationParameters) -> GenerationParameters {
        GenerationParameters {
            title: original.title.clone(),
            first_name: self
                .first_name
                .clone()
                .or_else(|| original.first_name.clone()),
            gender: self.gender.clone().or_else(|| original.gender.clone()),
            age_group: self
                .age_group
                .clone()
                .unwrap_or_else(|| original.age_group.clone()),
            language: self
                .language
                .clone()
                .unwrap_or_else(|| original.language.clone()),
            topic: self.topic.clone().unwrap_or_else(|| original.topic.clone()),
            subtopic: self
                .subtopic
                .clone()
                .unwrap_or_else(|| original.subtopic.clone()),
            style: self.style.clone().unwrap_or_else(|| original.style.clone()),
        }
    }
}

/// How an edit request relates to the stored story.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EditClassification {
    /// Nothing effectively changed.
    NoOp,
    /// The story text itself was manually changed.
    ContentEdit,
    /// A generation parameter changed while the content was left untouched.
    MetadataEdit,
    /// Only the title changed.
    TitleOnlyEdit,
}

/// Resolution of one edit request: the classification plus the final title
/// and content the caller should persist. Never stored as its own record.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditDecision {
    pub classification: EditClassification,
    pub final_title: String,
    pub final_story_content: String,
    pub regeneration_attempted: bool,
    pub regeneration_succeeded: bool,
}
