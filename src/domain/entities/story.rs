//! Story entity - A finished bedtime story and the parameters it came from

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{
    GeneratedStoryBundle, GenerationParameters, StoryId, StorySnapshot,
};

/// A persisted bedtime story.
///
/// `characters` and `scenes` keep the intermediate pipeline outputs the story
/// was written from; they are never shown to readers but make the story
/// reproducible and support later adaptation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Story {
    pub id: StoryId,
    pub title: String,
    pub content: String,
    pub characters: String,
    pub scenes: String,
    pub parameters: GenerationParameters,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Story {
    /// Create a story from the terminal output of one pipeline run.
    pub fn from_bundle(bundle: GeneratedStoryBundle) -> Self {
        let now = Utc::now();
        Self {
            id: StoryId::new(),
            title: bundle.metadata.title,
            content: bundle.story,
            characters: bundle.characters,
            scenes: bundle.scenes,
            parameters: bundle.metadata.parameters,
            created_at: now,
            updated_at: now,
        }
    }

    /// Project the fields the edit classifier diffs against.
    pub fn snapshot(&self) -> StorySnapshot {
        StorySnapshot {
            title: self.title.clone(),
            parameters: self.parameters.clone(),
            content: self.content.clone(),
        }
    }

    /// Apply the resolved outcome of an edit request.
    pub fn apply_edit(
        &mut self,
        title: String,
        content: String,
        parameters: GenerationParameters,
    ) {
        self.title = title;
        self.content = content;
        self.parameters = parameters;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::StoryMetadata;

    fn params() -> GenerationParameters {
        GenerationParameters {
            title: None,
            first_name: None,
            gender: None,
            age_group: "6-8".to_string(),
            language: "en".to_string(),
            topic: "science".to_string(),
            subtopic: "dinosaurs".to_string(),
            style: "adventure".to_string(),
        }
    }

    #[test]
    fn test_from_bundle_carries_all_stage_texts() {
        let bundle = GeneratedStoryBundle {
            story: "Once upon a time.".to_string(),
            characters: "Rex the dinosaur".to_string(),
            scenes: "A mossy valley".to_string(),
            metadata: StoryMetadata {
                title: "Rex Finds a Friend".to_string(),
                parameters: params(),
            },
        };

        let story = Story::from_bundle(bundle);
        assert_eq!(story.title, "Rex Finds a Friend");
        assert_eq!(story.content, "Once upon a time.");
        assert_eq!(story.characters, "Rex the dinosaur");
        assert_eq!(story.scenes, "A mossy valley");
        assert_eq!(story.created_at, story.updated_at);
    }

    #[test]
    fn test_snapshot_projects_edit_fields() {
        let bundle = GeneratedStoryBundle {
            story: "Once.".to_string(),
            characters: String::new(),
            scenes: String::new(),
            metadata: StoryMetadata {
                title: "A Title".to_string(),
                parameters: params(),
            },
        };
        let story = Story::from_bundle(bundle);

        let snapshot = story.snapshot();
        assert_eq!(snapshot.title, story.title);
        assert_eq!(snapshot.content, story.content);
        assert_eq!(snapshot.parameters, story.parameters);
    }
}
