#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::io::Read;
use std::thread;

use smart_mail::ai::{ResponseSuggester, Summarizer, TextGenerator};
use smart_mail::domain::email::{MessageDetail, MessageId, MessageSummary};
use smart_mail::error::{ModelError, ProviderError};
use smart_mail::mail::MailClient;
use smart_mail::session::SessionController;
use tiny_http::{Header, Response, Server};

pub fn summary(id: &str, subject: &str) -> MessageSummary {
    MessageSummary {
        id: MessageId::new(id),
        subject: subject.to_string(),
        sender: format!("sender{id}@example.com"),
        date: "Mon, 1 Jan 2024 10:00:00 +0000".to_string(),
        snippet: format!("snippet {id}"),
    }
}

/// In-memory mailbox that counts calls.
pub struct StubMail {
    pub listing: RefCell<Vec<MessageSummary>>,
    pub list_calls: Cell<usize>,
    pub get_calls: Cell<usize>,
}

impl StubMail {
    pub fn new(listing: Vec<MessageSummary>) -> Self {
        Self {
            listing: RefCell::new(listing),
            list_calls: Cell::new(0),
            get_calls: Cell::new(0),
        }
    }
}

impl MailClient for StubMail {
    fn list_messages(&self, max_results: u32) -> Result<Vec<MessageSummary>, ProviderError> {
        self.list_calls.set(self.list_calls.get() + 1);
        Ok(self
            .listing
            .borrow()
            .iter()
            .take(max_results as usize)
            .cloned()
            .collect())
    }

    fn get_message(&self, id: &MessageId) -> Result<MessageDetail, ProviderError> {
        self.get_calls.set(self.get_calls.get() + 1);
        let listing = self.listing.borrow();
        let m = listing
            .iter()
            .find(|m| &m.id == id)
            .ok_or_else(|| ProviderError::NotFound(id.clone()))?;
        Ok(MessageDetail {
            id: m.id.clone(),
            subject: m.subject.clone(),
            sender: m.sender.clone(),
            body: format!("Body of {}: {}", m.id, m.subject),
        })
    }
}

/// Returns the first ten words of its input, like a tiny extractive model.
pub struct FirstWords;

impl Summarizer for FirstWords {
    fn summarize(&self, text: &str) -> Result<String, ModelError> {
        Ok(text.split_whitespace().take(10).collect::<Vec<_>>().join(" "))
    }
}

/// Echoes the prompt with padding, the worst case for output cleanup.
pub struct EchoModel;

impl TextGenerator for EchoModel {
    fn generate(&self, prompt: &str) -> Result<String, ModelError> {
        Ok(format!("   {prompt}\n\n"))
    }
}

pub type StubController = SessionController<StubMail, FirstWords, EchoModel>;

pub fn controller(listing: Vec<MessageSummary>) -> StubController {
    SessionController::new(
        StubMail::new(listing),
        FirstWords,
        ResponseSuggester::new(EchoModel),
        10,
    )
}

/// Serve `handler(url, body) -> (status, json)` on an ephemeral loopback port.
pub fn serve<F>(handler: F) -> String
where
    F: Fn(&str, &str) -> (u16, String) + Send + 'static,
{
    serve_with_auth(move |url, body, _auth| handler(url, body))
}

/// Like `serve`, but answers 401 to any bearer token other than `token`.
pub fn serve_authorized<F>(token: &'static str, handler: F) -> String
where
    F: Fn(&str, &str) -> (u16, String) + Send + 'static,
{
    let expected = format!("Bearer {token}");
    serve_with_auth(move |url, body, auth| {
        if auth != Some(expected.as_str()) {
            return (401, r#"{"error":{"code":401}}"#.to_string());
        }
        handler(url, body)
    })
}

fn serve_with_auth<F>(handler: F) -> String
where
    F: Fn(&str, &str, Option<&str>) -> (u16, String) + Send + 'static,
{
    let server = Server::http("127.0.0.1:0").unwrap();
    let port = server.server_addr().port();
    thread::spawn(move || {
        for mut request in server.incoming_requests() {
            let mut body = String::new();
            let _ = request.as_reader().read_to_string(&mut body);
            let auth = request
                .headers()
                .iter()
                .find(|h| h.field.equiv("Authorization"))
                .map(|h| h.value.as_str().to_string());
            let (status, json) = handler(request.url(), &body, auth.as_deref());
            let response = Response::from_string(json)
                .with_status_code(status)
                .with_header(Header::from_bytes("Content-Type", "application/json").unwrap());
            let _ = request.respond(response);
        }
    });
    format!("http://127.0.0.1:{port}")
}
