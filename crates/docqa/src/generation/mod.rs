//! Answer generation over retrieved chunks

pub mod chain;
pub mod prompt;

pub use chain::{parse_scored_answer, Answer, AnswerGenerator, ScoredAnswer};
pub use prompt::PromptBuilder;
