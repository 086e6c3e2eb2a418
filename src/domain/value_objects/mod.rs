//! Value objects - Immutable objects defined by their attributes

mod edit;
mod generation;
mod ids;
mod language;

pub use edit::{EditClassification, EditDecision, EditRequest, StorySnapshot};
pub use generation::{
    GeneratedStoryBundle, GenerationParameters, StageName, StageOutput, StageOutputs,
    StoryMetadata,
};
pub use ids::*;
pub use language::language_display_name;
