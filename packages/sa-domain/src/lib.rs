pub mod action;
pub mod example;
pub mod message;
pub mod prompt;
pub mod schema;

pub use action::{ActionSet, SmartAction};
pub use example::{Dataset, LabeledExample};
pub use message::Message;
pub use prompt::{FewShotExample, PromptBuilder, RenderedPrompt};
pub use schema::{ClassificationResponse, ClosestMatch, MatchMetadata, Shape, ValidationError};
