pub mod groq;
pub mod responder;
pub mod summarizer;

use crate::error::ModelError;

pub use groq::GroqChat;
pub use responder::ResponseSuggester;
pub use summarizer::{HuggingFaceSummarizer, Summarizer};

/// A text-generation model: prompt in, raw completion out.
pub trait TextGenerator {
    fn generate(&self, prompt: &str) -> Result<String, ModelError>;
}
