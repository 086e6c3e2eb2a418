//! Prompt building functions for the story generation pipeline
//!
//! Every function here is a pure string builder: typed parameters (plus the
//! literal text of earlier stages, where a stage depends on one) in, one
//! instruction string out. No network, no randomness.

use crate::domain::value_objects::{language_display_name, GenerationParameters};

/// Build the character-design prompt, the first stage of the pipeline.
pub fn compose_character_prompt(params: &GenerationParameters) -> String {
    let language = language_display_name(&params.language);
    let mut prompt = String::new();

    prompt.push_str(&format!(
        "You are preparing a bedtime story for children aged {}.\n\n",
        params.age_group
    ));
    prompt.push_str(&format!("TOPIC: {}\n", params.topic));
    prompt.push_str(&format!("SUBTOPIC: {}\n", params.subtopic));
    prompt.push_str(&format!("STYLE: {}\n", params.style));
    prompt.push_str(&format!("LANGUAGE: {}\n\n", language));

    prompt.push_str(
        "Invent 2-4 characters for this story. For each character give a name, \
         a short description of who they are, and one endearing trait a child \
         would remember.\n",
    );

    if let Some(instruction) = protagonist_instruction(params) {
        prompt.push_str(&instruction);
        prompt.push('\n');
    }

    prompt.push_str(&format!(
        "\nKeep every description gentle and age-appropriate for {} year olds. \
         Write the character descriptions in {}.\n",
        params.age_group, language
    ));

    prompt
}

/// Build the scene-design prompt. Embeds the character stage's text verbatim
/// so scene design is grounded in the characters that were actually generated.
pub fn compose_scene_prompt(params: &GenerationParameters, characters_text: &str) -> String {
    let language = language_display_name(&params.language);
    let mut prompt = String::new();

    prompt.push_str(&format!(
        "You are preparing a bedtime story for children aged {}.\n\n",
        params.age_group
    ));
    prompt.push_str(&format!("TOPIC: {}\n", params.topic));
    prompt.push_str(&format!("SUBTOPIC: {}\n", params.subtopic));
    prompt.push_str(&format!("STYLE: {}\n\n", params.style));

    prompt.push_str("THE CHARACTERS OF THIS STORY:\n");
    prompt.push_str(characters_text);
    prompt.push_str("\n\n");

    prompt.push_str(
        "Sketch 3-5 scenes that take these characters through a complete story \
         arc: a warm opening, a small challenge, and a soothing resolution \
         suitable for the last minutes before sleep. Describe each scene in \
         2-3 sentences.\n",
    );

    if let Some(instruction) = protagonist_instruction(params) {
        prompt.push_str(&instruction);
        prompt.push('\n');
    }

    prompt.push_str(&format!("\nWrite the scene descriptions in {}.\n", language));

    prompt
}

/// Build the title prompt, used only when the caller did not supply a title.
pub fn compose_title_prompt(
    params: &GenerationParameters,
    characters_text: &str,
    scenes_text: &str,
) -> String {
    let language = language_display_name(&params.language);
    let mut prompt = String::new();

    prompt.push_str(&format!(
        "Suggest a title for a bedtime story for children aged {}.\n\n",
        params.age_group
    ));
    prompt.push_str(&format!("TOPIC: {}\n", params.topic));
    prompt.push_str(&format!("SUBTOPIC: {}\n", params.subtopic));
    prompt.push_str(&format!("STYLE: {}\n\n", params.style));

    prompt.push_str("THE CHARACTERS OF THIS STORY:\n");
    prompt.push_str(characters_text);
    prompt.push_str("\n\nTHE SCENES OF THIS STORY:\n");
    prompt.push_str(scenes_text);
    prompt.push_str("\n\n");

    prompt.push_str(&format!(
        "The title must be 3 to 8 words, age-appropriate, reflect the topic, \
         subtopic and style above, and be written in {}. Respond with the \
         title only - no quotes, no explanation.\n",
        language
    ));

    prompt
}

/// Build the final story prompt from everything the earlier stages produced.
pub fn compose_story_prompt(
    params: &GenerationParameters,
    characters_text: &str,
    scenes_text: &str,
    title: &str,
) -> String {
    let language = language_display_name(&params.language);
    let mut prompt = String::new();

    prompt.push_str(&format!(
        "Write a bedtime story titled \"{}\" for children aged {}.\n\n",
        title, params.age_group
    ));
    prompt.push_str(&format!("STYLE: {}\n", params.style));
    prompt.push_str(&format!("LANGUAGE: {}\n\n", language));

    prompt.push_str("THE CHARACTERS OF THIS STORY:\n");
    prompt.push_str(characters_text);
    prompt.push_str("\n\nTHE SCENES OF THIS STORY:\n");
    prompt.push_str(scenes_text);
    prompt.push_str("\n\n");

    prompt.push_str(
        "Tell the story scene by scene in warm, simple language, ending calmly \
         so a child can drift off to sleep. Write flowing prose, not a list.\n",
    );

    if let Some(name) = present(&params.first_name) {
        prompt.push_str(&format!(
            "Make {} the hero of the story and address their experiences \
             directly.\n",
            name
        ));
    }

    prompt.push_str(&format!("\nWrite the story in {}.\n", language));

    prompt
}

/// Build the adaptation prompt used when a story's parameters changed and the
/// existing text must be carried over to the new parameter set.
pub fn compose_adaptation_prompt(
    original_title: &str,
    original_content: &str,
    original_params: &GenerationParameters,
    new_params: &GenerationParameters,
) -> String {
    let mut prompt = String::new();

    prompt.push_str(&format!(
        "An existing bedtime story titled \"{}\" needs to be adapted because \
         its story settings changed.\n\n",
        original_title
    ));

    prompt.push_str("THE ORIGINAL STORY:\n");
    prompt.push_str(original_content);
    prompt.push_str("\n\nORIGINAL SETTINGS:\n");
    prompt.push_str(&describe_parameters(original_params));
    prompt.push_str("\nNEW SETTINGS:\n");
    prompt.push_str(&describe_parameters(new_params));
    prompt.push('\n');

    prompt.push_str(
        "Rewrite the story for the new settings. Preserve the narrative \
         structure, the order of the plot, and the emotional beats of the \
         original. Change only what the new settings require. Respond with \
         the adapted story text only.\n",
    );

    prompt
}

/// Build the prompt that re-titles an adapted story. Unlike the plain title
/// prompt, this one carries the original title forward as a concept to adapt
/// rather than asking for an unrelated invention.
pub fn compose_adapted_title_prompt(
    original_title: &str,
    adapted_content: &str,
    new_params: &GenerationParameters,
) -> String {
    let language = language_display_name(&new_params.language);
    let mut prompt = String::new();

    prompt.push_str(&format!(
        "A bedtime story titled \"{}\" was adapted to new settings. This is \
         the adapted story:\n\n",
        original_title
    ));
    prompt.push_str(adapted_content);
    prompt.push_str("\n\nNEW SETTINGS:\n");
    prompt.push_str(&describe_parameters(new_params));
    prompt.push('\n');

    prompt.push_str(&format!(
        "Suggest a new title that adapts the concept of the original title to \
         the adapted story - do not invent an unrelated one. The title must \
         be 3 to 8 words, age-appropriate for children aged {}, and written \
         in {}. Respond with the title only - no quotes, no explanation.\n",
        new_params.age_group, language
    ));

    prompt
}

/// Render a parameter set as a settings block for the adaptation prompts.
fn describe_parameters(params: &GenerationParameters) -> String {
    let mut out = String::new();
    out.push_str(&format!("- Age group: {}\n", params.age_group));
    out.push_str(&format!(
        "- Language: {}\n",
        language_display_name(&params.language)
    ));
    out.push_str(&format!("- Topic: {}\n", params.topic));
    out.push_str(&format!("- Subtopic: {}\n", params.subtopic));
    out.push_str(&format!("- Style: {}\n", params.style));
    if let Some(name) = present(&params.first_name) {
        out.push_str(&format!("- Main character name: {}\n", name));
    }
    if let Some(gender) = present(&params.gender) {
        out.push_str(&format!("- Main character gender: {}\n", gender));
    }
    out
}

/// Personalization line for the character and scene prompts.
///
/// Precedence: name and gender together, then name alone, then gender alone.
fn protagonist_instruction(params: &GenerationParameters) -> Option<String> {
    match (present(&params.first_name), present(&params.gender)) {
        (Some(name), Some(gender)) => Some(format!(
            "One of the characters must be a {} named {}, written so they can \
             carry the story as its protagonist.",
            gender, name
        )),
        (Some(name), None) => Some(format!(
            "One of the characters must be named {}, written so they can \
             carry the story as its protagonist.",
            name
        )),
        (None, Some(gender)) => Some(format!(
            "The protagonist of the story should be a {}.",
            gender
        )),
        (None, None) => None,
    }
}

fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

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
    fn test_character_prompt_mentions_all_parameters() {
        let prompt = compose_character_prompt(&params());

        assert!(prompt.contains("6-8"));
        assert!(prompt.contains("science"));
        assert!(prompt.contains("dinosaurs"));
        assert!(prompt.contains("adventure"));
        assert!(prompt.contains("English"));
    }

    #[test]
    fn test_character_prompt_resolves_language_name() {
        let mut p = params();
        p.language = "es".to_string();
        assert!(compose_character_prompt(&p).contains("Spanish"));

        // unknown codes pass through as-is
        p.language = "xx".to_string();
        assert!(compose_character_prompt(&p).contains("LANGUAGE: xx"));
    }

    #[test]
    fn test_personalization_precedence() {
        let mut p = params();

        p.first_name = Some("Mia".to_string());
        p.gender = Some("girl".to_string());
        let prompt = compose_character_prompt(&p);
        assert!(prompt.contains("a girl named Mia"));

        p.gender = None;
        let prompt = compose_character_prompt(&p);
        assert!(prompt.contains("named Mia"));
        assert!(!prompt.contains("girl"));

        p.first_name = None;
        p.gender = Some("boy".to_string());
        let prompt = compose_character_prompt(&p);
        assert!(prompt.contains("should be a boy"));
        assert!(!prompt.contains("Mia"));

        p.gender = None;
        let prompt = compose_character_prompt(&p);
        assert!(!prompt.contains("protagonist"));
    }

    #[test]
    fn test_blank_personalization_fields_are_ignored() {
        let mut p = params();
        p.first_name = Some("   ".to_string());
        let prompt = compose_character_prompt(&p);
        assert!(!prompt.contains("protagonist"));
    }

    #[test]
    fn test_scene_prompt_embeds_characters_verbatim() {
        let characters = "1. Rex, a small green dinosaur\n2. Luna, a firefly";
        let prompt = compose_scene_prompt(&params(), characters);
        assert!(prompt.contains(characters));
    }

    #[test]
    fn test_title_prompt_embeds_both_stages_and_constraints() {
        let prompt = compose_title_prompt(&params(), "CHARS", "SCENES");
        assert!(prompt.contains("CHARS"));
        assert!(prompt.contains("SCENES"));
        assert!(prompt.contains("3 to 8 words"));
        assert!(prompt.contains("title only"));
    }

    #[test]
    fn test_story_prompt_embeds_title_and_stage_texts() {
        let mut p = params();
        p.first_name = Some("Mia".to_string());
        let prompt = compose_story_prompt(&p, "CHARS", "SCENES", "Rex Finds a Friend");
        assert!(prompt.contains("\"Rex Finds a Friend\""));
        assert!(prompt.contains("CHARS"));
        assert!(prompt.contains("SCENES"));
        assert!(prompt.contains("Make Mia the hero"));
    }

    #[test]
    fn test_adaptation_prompt_carries_both_parameter_sets() {
        let original = params();
        let mut new = params();
        new.topic = "history".to_string();

        let prompt =
            compose_adaptation_prompt("The Brave Seed", "Once upon a time.", &original, &new);
        assert!(prompt.contains("The Brave Seed"));
        assert!(prompt.contains("Once upon a time."));
        assert!(prompt.contains("- Topic: science"));
        assert!(prompt.contains("- Topic: history"));
        assert!(prompt.contains("emotional beats"));
    }

    #[test]
    fn test_adapted_title_prompt_references_original_concept() {
        let prompt = compose_adapted_title_prompt("The Brave Seed", "Adapted text.", &params());
        assert!(prompt.contains("The Brave Seed"));
        assert!(prompt.contains("Adapted text."));
        assert!(prompt.contains("adapts the concept"));
        assert!(prompt.contains("title only"));
    }
}
