use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::SummarizerConfig;
use crate::error::ModelError;

/// Upper bound on summary length, in words.
pub const MAX_SUMMARY_LEN: usize = 150;
/// Lower bound the model is asked for; it can only be met by long enough input.
pub const MIN_SUMMARY_LEN: usize = 10;

pub trait Summarizer {
    fn summarize(&self, text: &str) -> Result<String, ModelError>;
}

#[derive(Debug, Serialize)]
struct SummaryParameters {
    max_length: usize,
    min_length: usize,
    do_sample: bool,
}

#[derive(Debug, Serialize)]
struct SummaryRequest<'a> {
    inputs: &'a str,
    parameters: SummaryParameters,
}

#[derive(Debug, Deserialize)]
struct SummaryOutput {
    summary_text: String,
}

/// Hugging Face inference API, deterministic decoding with fixed length bounds.
pub struct HuggingFaceSummarizer {
    http: Client,
    url: String,
    api_token: Option<String>,
}

impl HuggingFaceSummarizer {
    pub fn new(cfg: &SummarizerConfig, api_token: Option<String>) -> Result<Self, ModelError> {
        let http = Client::builder().timeout(Duration::from_secs(60)).build()?;
        Ok(Self {
            http,
            url: format!("{}/{}", cfg.endpoint.trim_end_matches('/'), cfg.model),
            api_token,
        })
    }

    pub fn from_env(cfg: &SummarizerConfig) -> Result<Self, ModelError> {
        Self::new(cfg, std::env::var("HF_API_TOKEN").ok())
    }
}

impl Summarizer for HuggingFaceSummarizer {
    fn summarize(&self, text: &str) -> Result<String, ModelError> {
        if text.trim().is_empty() {
            return Err(ModelError::EmptyInput);
        }

        let mut req = self.http.post(&self.url).json(&SummaryRequest {
            inputs: text,
            parameters: SummaryParameters {
                max_length: MAX_SUMMARY_LEN,
                min_length: MIN_SUMMARY_LEN,
                do_sample: false,
            },
        });
        if let Some(token) = &self.api_token {
            req = req.bearer_auth(token);
        }

        let resp = req.send()?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ModelError::Status {
                status: status.as_u16(),
                body: resp.text().unwrap_or_default(),
            });
        }

        let outputs: Vec<SummaryOutput> = resp.json()?;
        let first = outputs
            .into_iter()
            .next()
            .ok_or_else(|| ModelError::Malformed("empty summary list".to_string()))?;
        Ok(clamp_words(&first.summary_text, MAX_SUMMARY_LEN))
    }
}

/// Trim and cut `text` to at most `max` whitespace-separated words.
pub fn clamp_words(text: &str, max: usize) -> String {
    let trimmed = text.trim();
    if trimmed.split_whitespace().count() <= max {
        return trimmed.to_string();
    }
    trimmed.split_whitespace().take(max).collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_only_trimmed() {
        assert_eq!(clamp_words("  a  b\nc ", 5), "a  b\nc");
    }

    #[test]
    fn long_text_is_cut_to_the_bound() {
        let long = vec!["word"; 400].join(" ");
        let out = clamp_words(&long, MAX_SUMMARY_LEN);
        assert_eq!(out.split_whitespace().count(), MAX_SUMMARY_LEN);
    }

    #[test]
    fn request_body_carries_fixed_parameters() {
        let body = serde_json::to_value(SummaryRequest {
            inputs: "hello",
            parameters: SummaryParameters {
                max_length: MAX_SUMMARY_LEN,
                min_length: MIN_SUMMARY_LEN,
                do_sample: false,
            },
        })
        .unwrap();
        assert_eq!(body["parameters"]["max_length"], 150);
        assert_eq!(body["parameters"]["min_length"], 10);
        assert_eq!(body["parameters"]["do_sample"], false);
    }

    #[test]
    fn empty_input_is_rejected_before_any_request() {
        let s = HuggingFaceSummarizer::new(&SummarizerConfig::default(), None).unwrap();
        assert!(matches!(s.summarize("   "), Err(ModelError::EmptyInput)));
    }
}
