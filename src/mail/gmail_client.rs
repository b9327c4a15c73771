use reqwest::StatusCode;
use reqwest::blocking::{Client, Response};
use serde::Deserialize;
use std::time::Duration;

use crate::auth::TokenSource;
use crate::domain::email::{MessageDetail, MessageId, MessageSummary};
use crate::error::ProviderError;
use crate::mail::MailClient;
use crate::mail::decoders::{
    NO_SUBJECT, Payload, UNKNOWN_DATE, UNKNOWN_SENDER, decode_html_entities, extract_text_body,
    find_header, header_value,
};

const BASE_URL: &str = "https://gmail.googleapis.com/gmail/v1";
const MAX_PAGE: u32 = 500;

#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    messages: Vec<MessageRef>,
}

#[derive(Debug, Deserialize)]
struct MessageRef {
    id: String,
}

#[derive(Debug, Deserialize)]
struct GmailMessage {
    id: String,
    #[serde(default)]
    snippet: String,
    #[serde(default)]
    payload: Payload,
}

/// Read-only Gmail REST client. The bearer token is asked for on every request.
pub struct GmailClient {
    http: Client,
    base_url: String,
    tokens: Box<dyn TokenSource>,
}

impl GmailClient {
    pub fn new(tokens: impl TokenSource + 'static) -> Result<Self, ProviderError> {
        Self::with_base_url(tokens, BASE_URL)
    }

    pub fn with_base_url(
        tokens: impl TokenSource + 'static,
        base_url: impl Into<String>,
    ) -> Result<Self, ProviderError> {
        let http = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self {
            http,
            base_url: base_url.into(),
            tokens: Box::new(tokens),
        })
    }

    fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<Response, ProviderError> {
        let token = self.tokens.access_token()?;
        log::debug!("GET {url}");
        Ok(self.http.get(url).bearer_auth(token).query(query).send()?)
    }

    fn fetch(&self, id: &str, query: &[(&str, &str)]) -> Result<GmailMessage, ProviderError> {
        let url = format!("{}/users/me/messages/{}", self.base_url, id);
        let resp = self.get(&url, query)?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Err(ProviderError::NotFound(MessageId::new(id)));
        }
        Ok(check_status(resp)?.json()?)
    }
}

fn check_status(resp: Response) -> Result<Response, ProviderError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().unwrap_or_default();
    Err(ProviderError::Status {
        status: status.as_u16(),
        body,
    })
}

impl MailClient for GmailClient {
    fn list_messages(&self, max_results: u32) -> Result<Vec<MessageSummary>, ProviderError> {
        let max = max_results.clamp(1, MAX_PAGE).to_string();
        let url = format!("{}/users/me/messages", self.base_url);
        let list: ListResponse = check_status(self.get(&url, &[("maxResults", max.as_str())])?)?.json()?;

        let mut out = Vec::with_capacity(list.messages.len());
        for m in list.messages {
            let fetched = self.fetch(
                &m.id,
                &[
                    ("format", "metadata"),
                    ("metadataHeaders", "Subject"),
                    ("metadataHeaders", "From"),
                    ("metadataHeaders", "Date"),
                ],
            );
            let msg = match fetched {
                Ok(msg) => msg,
                // deleted between the list call and this fetch
                Err(ProviderError::NotFound(id)) => {
                    log::debug!("skipping vanished message {id}");
                    continue;
                }
                Err(e) => return Err(e),
            };
            let headers = &msg.payload.headers;
            out.push(MessageSummary {
                id: MessageId::new(msg.id),
                subject: header_value(headers, "Subject", NO_SUBJECT),
                sender: header_value(headers, "From", UNKNOWN_SENDER),
                date: header_value(headers, "Date", UNKNOWN_DATE),
                snippet: decode_html_entities(&msg.snippet),
            });
        }
        log::info!("listed {} messages", out.len());
        Ok(out)
    }

    fn get_message(&self, id: &MessageId) -> Result<MessageDetail, ProviderError> {
        let msg = self.fetch(id.as_str(), &[("format", "full")])?;
        let headers = &msg.payload.headers;

        let sender = find_header(headers, "From")
            .ok_or(ProviderError::MissingHeader("From"))?
            .to_string();
        let body = extract_text_body(&msg.payload)
            .unwrap_or_else(|| decode_html_entities(&msg.snippet));

        Ok(MessageDetail {
            id: MessageId::new(msg.id),
            subject: header_value(headers, "Subject", NO_SUBJECT),
            sender,
            body,
        })
    }
}
