//! Story generation service - the multi-stage creation pipeline
//!
//! Generation runs as a fixed sequence of stages, each consuming the literal
//! text the earlier stages produced: Characters -> Scenes -> Title (skipped
//! when the caller supplied one) -> Story. A failure at any stage aborts the
//! whole run; no partial bundle is ever returned.

use std::sync::Arc;

use crate::application::ports::outbound::{ChatMessage, LlmPort, LlmRequest};
use crate::application::services::llm::{normalize_title, prompt_builder};
use crate::domain::value_objects::{
    GeneratedStoryBundle, GenerationParameters, StageName, StageOutput, StageOutputs,
    StoryMetadata,
};

/// Framing shared by every generation call.
const SYSTEM_PROMPT: &str =
    "You are a warm, imaginative children's author who writes gentle bedtime stories.";

/// Errors raised by the generation pipeline
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// The text-generation capability did not return usable text
    #[error("LLM error: {0}")]
    Llm(String),
    /// A stage was asked for before it ran - an ordering bug, not a model failure
    #[error("missing output for stage: {0}")]
    MissingStageOutput(StageName),
}

/// Service that runs the story creation pipeline
pub struct StoryGenerationService<L: LlmPort> {
    llm: Arc<L>,
}

impl<L: LlmPort> StoryGenerationService<L> {
    pub fn new(llm: Arc<L>) -> Self {
        Self { llm }
    }

    /// Run the full pipeline for one creation request.
    ///
    /// Stages are strictly sequential: each prompt embeds the raw text of the
    /// stages before it, read back from the accumulator they were recorded
    /// into. When `params.title` is non-blank the title stage is skipped and
    /// the supplied title is only normalized, so such a run makes three
    /// generation calls instead of four.
    pub async fn generate_story(
        &self,
        params: GenerationParameters,
    ) -> Result<GeneratedStoryBundle, GenerationError> {
        let mut context = StageOutputs::new();

        self.run_stage(
            &mut context,
            StageName::Characters,
            prompt_builder::compose_character_prompt(&params),
        )
        .await?;

        let scene_prompt =
            prompt_builder::compose_scene_prompt(&params, require(&context, StageName::Characters)?);
        self.run_stage(&mut context, StageName::Scenes, scene_prompt)
            .await?;

        let title = match params.supplied_title() {
            Some(supplied) => normalize_title(supplied),
            None => {
                let title_prompt = prompt_builder::compose_title_prompt(
                    &params,
                    require(&context, StageName::Characters)?,
                    require(&context, StageName::Scenes)?,
                );
                self.run_stage(&mut context, StageName::Title, title_prompt)
                    .await?;
                normalize_title(require(&context, StageName::Title)?)
            }
        };

        let story_prompt = prompt_builder::compose_story_prompt(
            &params,
            require(&context, StageName::Characters)?,
            require(&context, StageName::Scenes)?,
            &title,
        );
        self.run_stage(&mut context, StageName::Story, story_prompt)
            .await?;

        let bundle = GeneratedStoryBundle {
            story: require(&context, StageName::Story)?.to_string(),
            characters: require(&context, StageName::Characters)?.to_string(),
            scenes: require(&context, StageName::Scenes)?.to_string(),
            metadata: StoryMetadata { title, parameters: params },
        };

        let sequence: Vec<&str> = context.stages().map(|s| s.as_str()).collect();
        tracing::info!(
            "Story pipeline complete after {} stages ({})",
            context.len(),
            sequence.join(" -> ")
        );

        Ok(bundle)
    }

    /// Run one stage: a single call to the LLM, recorded into the accumulator.
    async fn run_stage(
        &self,
        context: &mut StageOutputs,
        stage: StageName,
        prompt: String,
    ) -> Result<(), GenerationError> {
        tracing::debug!("Running {} stage", stage);

        let max_tokens = match stage {
            StageName::Title => Some(64),
            _ => None,
        };
        let request = LlmRequest::new(vec![ChatMessage::user(prompt)])
            .with_system_prompt(SYSTEM_PROMPT)
            .with_temperature(0.8)
            .with_max_tokens(max_tokens);

        let response = self
            .llm
            .generate(request)
            .await
            .map_err(|e| GenerationError::Llm(e.to_string()))?;

        tracing::debug!(
            "Stage {} answered by {} ({} tokens)",
            stage,
            response.model,
            response.tokens_used
        );
        tracing::info!("Stage {} complete ({} chars)", stage, response.content.len());
        context.record(StageOutput::new(stage, response.content));
        Ok(())
    }
}

/// Read a stage's text from the accumulator, failing if the stage has not run.
fn require(context: &StageOutputs, stage: StageName) -> Result<&str, GenerationError> {
    context
        .text_of(stage)
        .ok_or(GenerationError::MissingStageOutput(stage))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::outbound::LlmResponse;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Mock LLM that replays scripted responses and records every request
    struct MockLlm {
        responses: Mutex<VecDeque<String>>,
        requests: Mutex<Vec<LlmRequest>>,
    }

    impl MockLlm {
        fn scripted(responses: &[&str]) -> Self {
            Self {
                responses: Mutex::new(responses.iter().map(|r| r.to_string()).collect()),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn request_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }

        fn prompt_of_request(&self, index: usize) -> String {
            self.requests.lock().unwrap()[index].messages[0].content.clone()
        }
    }

    #[async_trait::async_trait]
    impl LlmPort for MockLlm {
        type Error = String;

        async fn generate(&self, request: LlmRequest) -> Result<LlmResponse, Self::Error> {
            self.requests.lock().unwrap().push(request);
            let content = self
                .responses
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| "no scripted response left".to_string())?;
            Ok(LlmResponse {
                content,
                model: "mock".to_string(),
                tokens_used: 0,
            })
        }
    }

    /// Mock LLM that always fails
    struct FailingLlm;

    #[async_trait::async_trait]
    impl LlmPort for FailingLlm {
        type Error = String;

        async fn generate(&self, _request: LlmRequest) -> Result<LlmResponse, Self::Error> {
            Err("model unavailable".to_string())
        }
    }

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

    #[tokio::test]
    async fn test_pipeline_runs_four_stages_in_order_without_title() {
        let llm = Arc::new(MockLlm::scripted(&[
            "CHARACTERS_TEXT",
            "SCENES_TEXT",
            "Generated Title",
            "STORY_TEXT",
        ]));
        let service = StoryGenerationService::new(llm.clone());

        let bundle = service.generate_story(params()).await.unwrap();

        assert_eq!(llm.request_count(), 4);
        assert_eq!(bundle.characters, "CHARACTERS_TEXT");
        assert_eq!(bundle.scenes, "SCENES_TEXT");
        assert_eq!(bundle.story, "STORY_TEXT");
        assert_eq!(bundle.metadata.title, "Generated Title");
    }

    #[tokio::test]
    async fn test_each_stage_prompt_embeds_earlier_stage_text_verbatim() {
        let llm = Arc::new(MockLlm::scripted(&[
            "CHARACTERS_TEXT",
            "SCENES_TEXT",
            "A Title",
            "STORY_TEXT",
        ]));
        let service = StoryGenerationService::new(llm.clone());

        service.generate_story(params()).await.unwrap();

        // scene prompt quotes the character stage's output byte-for-byte
        assert!(llm.prompt_of_request(1).contains("CHARACTERS_TEXT"));
        // title prompt quotes both
        assert!(llm.prompt_of_request(2).contains("CHARACTERS_TEXT"));
        assert!(llm.prompt_of_request(2).contains("SCENES_TEXT"));
        // story prompt quotes both plus the resolved title
        assert!(llm.prompt_of_request(3).contains("CHARACTERS_TEXT"));
        assert!(llm.prompt_of_request(3).contains("SCENES_TEXT"));
        assert!(llm.prompt_of_request(3).contains("A Title"));
    }

    #[tokio::test]
    async fn test_supplied_title_skips_the_title_stage() {
        let llm = Arc::new(MockLlm::scripted(&["CHARS", "SCENES", "STORY"]));
        let service = StoryGenerationService::new(llm.clone());

        let mut p = params();
        p.title = Some(" \"The Brave Seed\" ".to_string());
        let bundle = service.generate_story(p).await.unwrap();

        // three calls: characters, scenes, story
        assert_eq!(llm.request_count(), 3);
        // supplied title still goes through normalization
        assert_eq!(bundle.metadata.title, "The Brave Seed");
        assert!(llm.prompt_of_request(2).contains("The Brave Seed"));
    }

    #[tokio::test]
    async fn test_blank_supplied_title_still_generates_one() {
        let llm = Arc::new(MockLlm::scripted(&["CHARS", "SCENES", "Made Up", "STORY"]));
        let service = StoryGenerationService::new(llm.clone());

        let mut p = params();
        p.title = Some("   ".to_string());
        let bundle = service.generate_story(p).await.unwrap();

        assert_eq!(llm.request_count(), 4);
        assert_eq!(bundle.metadata.title, "Made Up");
    }

    #[tokio::test]
    async fn test_generated_title_is_normalized() {
        let llm = Arc::new(MockLlm::scripted(&[
            "CHARS",
            "SCENES",
            "\"Quoted Title\"\n",
            "STORY",
        ]));
        let service = StoryGenerationService::new(llm);

        let bundle = service.generate_story(params()).await.unwrap();
        assert_eq!(bundle.metadata.title, "Quoted Title");
    }

    #[tokio::test]
    async fn test_stage_failure_aborts_the_pipeline() {
        let service = StoryGenerationService::new(Arc::new(FailingLlm));

        let result = service.generate_story(params()).await;
        assert!(matches!(result, Err(GenerationError::Llm(_))));
    }

    #[tokio::test]
    async fn test_mid_pipeline_failure_returns_no_partial_bundle() {
        // two scripted responses, then the mock runs dry and errors
        let llm = Arc::new(MockLlm::scripted(&["CHARS", "SCENES"]));
        let service = StoryGenerationService::new(llm.clone());

        let result = service.generate_story(params()).await;
        assert!(result.is_err());
        assert_eq!(llm.request_count(), 3);
    }
}
