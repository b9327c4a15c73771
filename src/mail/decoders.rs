//! Gmail payload helpers: header lookup, snippet cleanup and body extraction.

use base64::{Engine as _, engine::general_purpose};
use serde::Deserialize;

pub const NO_SUBJECT: &str = "No Subject";
pub const UNKNOWN_SENDER: &str = "Unknown Sender";
pub const UNKNOWN_DATE: &str = "Unknown Date";

#[derive(Debug, Clone, Deserialize)]
pub struct Header {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PartBody {
    pub data: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payload {
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub headers: Vec<Header>,
    #[serde(default)]
    pub body: PartBody,
    #[serde(default)]
    pub parts: Vec<Payload>,
}

/// First header named `name` (ASCII case-insensitive).
pub fn find_header<'a>(headers: &'a [Header], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|h| h.name.eq_ignore_ascii_case(name))
        .map(|h| h.value.as_str())
}

pub fn header_value(headers: &[Header], name: &str, default: &str) -> String {
    find_header(headers, name).unwrap_or(default).to_string()
}

/// Gmail snippets arrive HTML-escaped ("it&#39;s").
pub fn decode_html_entities(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let Some(semi) = tail.find(';').filter(|&i| i <= 10) else {
            out.push('&');
            rest = &tail[1..];
            continue;
        };
        match decode_entity(&tail[1..semi]) {
            Some(ch) => {
                out.push(ch);
                rest = &tail[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some(' '),
        _ => {
            let num = name.strip_prefix('#')?;
            let hex = num.strip_prefix('x').or_else(|| num.strip_prefix('X'));
            let code = match hex {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => num.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}

/// Best readable text of a message: text/plain, else text/html flattened, else None.
pub fn extract_text_body(payload: &Payload) -> Option<String> {
    if let Some(plain) = find_part(payload, "text/plain").and_then(decode_part) {
        return Some(plain);
    }
    let html = find_part(payload, "text/html").and_then(decode_part)?;
    match html2text::from_read(html.as_bytes(), 100) {
        Ok(text) => Some(text),
        Err(e) => {
            log::debug!("html2text failed, using raw html: {e}");
            Some(html)
        }
    }
}

fn find_part<'a>(p: &'a Payload, mime: &str) -> Option<&'a Payload> {
    if p.mime_type.eq_ignore_ascii_case(mime) && p.body.data.is_some() {
        return Some(p);
    }
    p.parts.iter().find_map(|sp| find_part(sp, mime))
}

fn decode_part(p: &Payload) -> Option<String> {
    let data = p.body.data.as_deref()?;
    let bytes = general_purpose::URL_SAFE_NO_PAD
        .decode(data.trim_end_matches('='))
        .ok()?;
    let text = String::from_utf8_lossy(&bytes).trim().to_string();
    if text.is_empty() { None } else { Some(text) }
}
