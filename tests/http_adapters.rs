//! Gmail, summarizer and chat adapters against a loopback fake server.

mod common;

use base64::{Engine as _, engine::general_purpose};
use serde_json::{Value, json};

use smart_mail::ai::summarizer::{MAX_SUMMARY_LEN, Summarizer};
use smart_mail::ai::{GroqChat, HuggingFaceSummarizer, ResponseSuggester, TextGenerator};
use smart_mail::auth::{AuthorizationFlow, Credential, CredentialFile, CredentialProvider};
use smart_mail::config::{GeneratorConfig, SummarizerConfig};
use smart_mail::domain::email::MessageId;
use smart_mail::error::{AuthError, ModelError, ProviderError};
use smart_mail::mail::{GmailClient, MailClient};

fn headers(pairs: &[(&str, &str)]) -> Value {
    Value::Array(
        pairs
            .iter()
            .map(|(n, v)| json!({ "name": n, "value": v }))
            .collect(),
    )
}

fn fake_gmail() -> String {
    common::serve(|url, _body| {
        let path = url.split('?').next().unwrap_or("");
        match path {
            "/users/me/messages" => {
                assert!(url.contains("maxResults=2"), "unexpected list url {url}");
                (
                    200,
                    json!({ "messages": [{ "id": "a", "threadId": "t" }, { "id": "b", "threadId": "t" }] })
                        .to_string(),
                )
            }
            "/users/me/messages/a" => (
                200,
                json!({
                    "id": "a",
                    "snippet": "it&#39;s lunch time",
                    "payload": {
                        "mimeType": "multipart/alternative",
                        "headers": headers(&[("Subject", "Lunch"), ("From", "Ann <ann@example.com>"), ("Date", "Tue")]),
                        "parts": [{
                            "mimeType": "text/plain",
                            "body": { "data": general_purpose::URL_SAFE_NO_PAD.encode("Lunch at noon?\r\n") }
                        }]
                    }
                })
                .to_string(),
            ),
            "/users/me/messages/b" => (
                200,
                json!({
                    "id": "b",
                    "snippet": "no headers here",
                    "payload": { "mimeType": "text/plain", "headers": [] }
                })
                .to_string(),
            ),
            _ => (404, json!({ "error": { "code": 404 } }).to_string()),
        }
    })
}

#[test]
fn listing_applies_header_defaults_in_provider_order() {
    let client = GmailClient::with_base_url("token", fake_gmail()).unwrap();

    let list = client.list_messages(2).unwrap();

    assert_eq!(list.len(), 2);
    assert_eq!(list[0].id.as_str(), "a");
    assert_eq!(list[0].subject, "Lunch");
    assert_eq!(list[0].snippet, "it's lunch time");
    assert_eq!(list[1].subject, "No Subject");
    assert_eq!(list[1].sender, "Unknown Sender");
    assert_eq!(list[1].date, "Unknown Date");
}

#[test]
fn get_message_prefers_the_plain_text_part() {
    let client = GmailClient::with_base_url("token", fake_gmail()).unwrap();

    let detail = client.get_message(&MessageId::new("a")).unwrap();

    assert_eq!(detail.sender, "Ann <ann@example.com>");
    assert_eq!(detail.subject, "Lunch");
    assert_eq!(detail.body, "Lunch at noon?");
}

#[test]
fn get_message_without_from_header_fails() {
    let client = GmailClient::with_base_url("token", fake_gmail()).unwrap();

    let err = client.get_message(&MessageId::new("b")).unwrap_err();

    assert!(matches!(err, ProviderError::MissingHeader("From")));
}

#[test]
fn unknown_id_is_not_found() {
    let client = GmailClient::with_base_url("token", fake_gmail()).unwrap();

    let err = client.get_message(&MessageId::new("gone")).unwrap_err();

    assert!(matches!(err, ProviderError::NotFound(id) if id.as_str() == "gone"));
}

#[test]
fn listing_skips_ids_deleted_before_their_fetch() {
    let base = common::serve(|url, _body| {
        let path = url.split('?').next().unwrap_or("");
        match path {
            "/users/me/messages" => (
                200,
                json!({ "messages": [{ "id": "a" }, { "id": "gone" }, { "id": "c" }] }).to_string(),
            ),
            "/users/me/messages/gone" => (404, json!({ "error": { "code": 404 } }).to_string()),
            _ => {
                let id = path.trim_start_matches("/users/me/messages/");
                let msg = json!({ "id": id, "payload": { "headers": headers(&[("Subject", id)]) } });
                (200, msg.to_string())
            }
        }
    });
    let client = GmailClient::with_base_url("token", base).unwrap();

    let list = client.list_messages(3).unwrap();

    let ids: Vec<&str> = list.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "c"]);
}

/// Hands out "fresh" for any refresh token; consent must never be needed.
struct RefreshOnly;

impl AuthorizationFlow for RefreshOnly {
    fn refresh(&self, _refresh_token: &str) -> Result<Credential, AuthError> {
        Ok(Credential::new("fresh".into(), None, Some(3600)))
    }

    fn authorize(&self) -> Result<Credential, AuthError> {
        panic!("consent must not run mid-session");
    }
}

#[test]
fn expired_token_is_renewed_before_the_request() {
    let base = common::serve_authorized("fresh", |_url, _body| {
        (200, json!({ "messages": [] }).to_string())
    });
    let dir = tempfile::tempdir().unwrap();
    let file = CredentialFile::new(dir.path().join("credential.json"));
    file.save(&Credential {
        access_token: "stale".into(),
        refresh_token: Some("rt".into()),
        expires_at_epoch: Some(0),
    })
    .unwrap();

    let stale = GmailClient::with_base_url("stale", base.clone()).unwrap();
    assert!(matches!(
        stale.list_messages(5),
        Err(ProviderError::Status { status: 401, .. })
    ));

    let client = GmailClient::with_base_url(CredentialProvider::new(RefreshOnly, file.clone()), base).unwrap();
    assert!(client.list_messages(5).unwrap().is_empty());
    assert_eq!(file.load().map(|c| c.access_token).as_deref(), Some("fresh"));
}

#[test]
fn summarizer_sends_fixed_parameters_and_bounds_output() {
    let base = common::serve(|_url, body| {
        let req: Value = serde_json::from_str(body).unwrap();
        assert_eq!(req["parameters"]["max_length"], 150);
        assert_eq!(req["parameters"]["min_length"], 10);
        assert_eq!(req["parameters"]["do_sample"], false);
        // a misbehaving model that repeats its input twice
        let input = req["inputs"].as_str().unwrap();
        let text = format!("  {input} {input}  ");
        (200, json!([{ "summary_text": text }]).to_string())
    });
    let cfg = SummarizerConfig {
        endpoint: base,
        model: "distilbart".into(),
    };
    let summarizer = HuggingFaceSummarizer::new(&cfg, Some("hf-token".into())).unwrap();

    let input = vec!["lorem"; 120].join(" ");
    let out = summarizer.summarize(&input).unwrap();
    let words = out.split_whitespace().count();

    assert!(words <= MAX_SUMMARY_LEN);
    assert!(words >= 10);
    assert_eq!(out, out.trim());
}

#[test]
fn summarizer_reports_model_errors() {
    let base = common::serve(|_url, _body| (400, json!({ "error": "input too long" }).to_string()));
    let cfg = SummarizerConfig {
        endpoint: base,
        model: "distilbart".into(),
    };
    let summarizer = HuggingFaceSummarizer::new(&cfg, None).unwrap();

    let err = summarizer.summarize("some text").unwrap_err();

    assert!(matches!(err, ModelError::Status { status: 400, .. }));
}

#[test]
fn chat_echo_comes_back_trimmed() {
    let base = common::serve(|url, body| {
        assert_eq!(url, "/chat/completions");
        let req: Value = serde_json::from_str(body).unwrap();
        assert_eq!(req["model"], "llama3-70b-8192");
        assert_eq!(req["stream"], false);
        let prompt = req["messages"][0]["content"].as_str().unwrap();
        let reply = json!({ "choices": [{ "message": { "role": "assistant", "content": format!("\n  {prompt}  \n") } }] });
        (200, reply.to_string())
    });
    let cfg = GeneratorConfig {
        base_url: base,
        model: "llama3-70b-8192".into(),
    };
    let suggester = ResponseSuggester::new(GroqChat::new(&cfg, Some("key".into())).unwrap());

    let out = suggester.suggest_response("Can we move the call?").unwrap();

    assert_eq!(out, out.trim());
    assert!(out.contains("Can we move the call?"));
}

#[test]
fn chat_rate_limit_is_a_model_error() {
    let base = common::serve(|_url, _body| (429, json!({ "error": "rate limited" }).to_string()));
    let cfg = GeneratorConfig {
        base_url: base,
        model: "llama3-70b-8192".into(),
    };
    let chat = GroqChat::new(&cfg, Some("key".into())).unwrap();

    assert!(matches!(
        chat.generate("hi"),
        Err(ModelError::Status { status: 429, .. })
    ));
}
