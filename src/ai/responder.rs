use crate::ai::TextGenerator;
use crate::error::ModelError;

const PLACEHOLDER: &str = "{email_content}";

pub const PROMPT_TEMPLATE: &str = "
You are a professional email assistant. Based on the email content provided below, generate a thoughtful and appropriate response.
You must generate the response immediately, without generating any other words that are not related to response generation.
Ensure that the generated response is precise and to the point without beating around the bush.

Email Content:
{email_content}

Response:
";

pub fn render_prompt(email_body: &str) -> String {
    PROMPT_TEMPLATE.replace(PLACEHOLDER, email_body)
}

/// Template + model + plain-text output.
pub struct ResponseSuggester<G: TextGenerator> {
    generator: G,
}

impl<G: TextGenerator> ResponseSuggester<G> {
    pub fn new(generator: G) -> Self {
        Self { generator }
    }

    pub fn suggest_response(&self, email_body: &str) -> Result<String, ModelError> {
        let raw = self.generator.generate(&render_prompt(email_body))?;
        Ok(raw.trim().to_string())
    }
}
