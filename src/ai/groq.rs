//! Groq chat completions (OpenAI-compatible), one-shot and non-streaming.

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::ai::TextGenerator;
use crate::config::GeneratorConfig;
use crate::error::ModelError;

pub const API_KEY_VAR: &str = "GROQ_API_KEY";

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

pub struct GroqChat {
    http: Client,
    url: String,
    model: String,
    api_key: Option<String>,
}

impl GroqChat {
    /// A missing key is not an error here; it surfaces on the first `generate`.
    pub fn new(cfg: &GeneratorConfig, api_key: Option<String>) -> Result<Self, ModelError> {
        let http = Client::builder().timeout(Duration::from_secs(60)).build()?;
        Ok(Self {
            http,
            url: format!("{}/chat/completions", cfg.base_url.trim_end_matches('/')),
            model: cfg.model.clone(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        })
    }

    pub fn from_env(cfg: &GeneratorConfig) -> Result<Self, ModelError> {
        Self::new(cfg, std::env::var(API_KEY_VAR).ok())
    }
}

impl TextGenerator for GroqChat {
    fn generate(&self, prompt: &str) -> Result<String, ModelError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ModelError::MissingApiKey(API_KEY_VAR))?;

        let body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            stream: false,
        };

        log::debug!("POST {} (model {})", self.url, self.model);
        let resp = self.http.post(&self.url).bearer_auth(api_key).json(&body).send()?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ModelError::Status {
                status: status.as_u16(),
                body: resp.text().unwrap_or_default(),
            });
        }

        let parsed: ChatResponse = resp.json()?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| ModelError::Malformed("no completion choices".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_fails_on_first_call() {
        let chat = GroqChat::new(&GeneratorConfig::default(), None).unwrap();
        assert!(matches!(
            chat.generate("hi"),
            Err(ModelError::MissingApiKey(API_KEY_VAR))
        ));
    }

    #[test]
    fn blank_key_counts_as_missing() {
        let chat = GroqChat::new(&GeneratorConfig::default(), Some("  ".into())).unwrap();
        assert!(matches!(chat.generate("hi"), Err(ModelError::MissingApiKey(_))));
    }

    #[test]
    fn response_content_is_read_from_first_choice() {
        let raw = r#"{"choices":[{"message":{"role":"assistant","content":"  Sure.  "}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.choices[0].message.content.as_deref(), Some("  Sure.  "));
    }
}
