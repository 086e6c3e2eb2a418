//! Value objects for the story generation pipeline

use serde::{Deserialize, Serialize};

/// Parameters describing the story a user wants generated.
///
/// `age_group`, `language`, `topic`, `subtopic` and `style` must be present
/// and non-empty for a valid generation request; callers validate that before
/// invoking the pipeline. `title`, `first_name` and `gender` are optional
/// personalization fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationParameters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    pub age_group: String,
    pub language: String,
    pub topic: String,
    pub subtopic: String,
    pub style: String,
}

impl GenerationParameters {
    /// The user-supplied title, if it is present and non-blank.
    pub fn supplied_title(&self) -> Option<&str> {
        self.title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

/// The ordered stages of the generation pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageName {
    Characters,
    Scenes,
    Title,
    Story,
}

impl StageName {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Characters => "characters",
            Self::Scenes => "scenes",
            Self::Title => "title",
            Self::Story => "story",
        }
    }
}

impl std::fmt::Display for StageName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The raw text produced by one pipeline stage. Immutable after creation.
#[derive(Debug, Clone, PartialEq)]
pub struct StageOutput {
    pub stage: StageName,
    pub text: String,
}

impl StageOutput {
    pub fn new(stage: StageName, text: impl Into<String>) -> Self {
        Self {
            stage,
            text: text.into(),
        }
    }
}

/// Accumulator for stage outputs, in execution order.
///
/// Later stages read the literal text of earlier stages from here when
/// composing their prompts, which keeps the sequential dependency between
/// stages explicit instead of being spread across local variables.
#[derive(Debug, Clone, Default)]
pub struct StageOutputs {
    outputs: Vec<StageOutput>,
}

impl StageOutputs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed stage. Stages are recorded in the order they ran.
    pub fn record(&mut self, output: StageOutput) {
        self.outputs.push(output);
    }

    /// The text a stage produced, if that stage has run.
    pub fn text_of(&self, stage: StageName) -> Option<&str> {
        self.outputs
            .iter()
            .find(|o| o.stage == stage)
            .map(|o| o.text.as_str())
    }

    /// Number of stages that have run.
    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }

    /// Stages in the order they ran.
    pub fn stages(&self) -> impl Iterator<Item = StageName> + '_ {
        self.outputs.iter().map(|o| o.stage)
    }
}

/// Metadata describing a finished story: the resolved title plus the
/// parameters the story was generated from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryMetadata {
    pub title: String,
    pub parameters: GenerationParameters,
}

/// Terminal output of one pipeline run. Ownership transfers to the caller,
/// which persists whichever fields it needs.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedStoryBundle {
    pub story: String,
    pub characters: String,
    pub scenes: String,
    pub metadata: StoryMetadata,
}
