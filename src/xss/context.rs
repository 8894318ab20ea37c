// Reflection context classification
// Decides where, syntactically, a payload came back in a response

use crate::http::response::HttpResponse;
use scraper::{Html, Selector};
use serde::Serialize;
use std::fmt;

/// Ordered from most to least exploitable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReflectionContext {
    ReflectedInScript,
    ReflectedInEventHandler,
    ReflectedInAttribute,
    ReflectedInHtml,
    ReflectedInHeader,
}

impl ReflectionContext {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReflectionContext::ReflectedInScript => "reflected-in-script",
            ReflectionContext::ReflectedInEventHandler => "reflected-in-event-handler",
            ReflectionContext::ReflectedInAttribute => "reflected-in-attribute",
            ReflectionContext::ReflectedInHtml => "reflected-in-html",
            ReflectionContext::ReflectedInHeader => "reflected-in-header",
        }
    }
}

impl fmt::Display for ReflectionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Removes every whitespace character.
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect()
}

/// Classify where `payload` is reflected in `body`; first match wins.
///
/// 1. whitespace-normalized payload inside a `<script>` body
/// 2. payload inside an `on*` attribute value
/// 3. payload inside any other attribute value
/// 4. raw payload anywhere in the body
///
/// Only step 1 tolerates whitespace changes. Steps 2-4 need the payload
/// verbatim. A body that does not contain the normalized payload at all is
/// never classified, which keeps entity-encoded attribute values (decoded
/// by the parser) from counting as reflections.
///
/// Step 3 also needs a verbatim copy inside a start tag. An encoded copy in
/// an attribute next to a raw copy in text is `reflected-in-html`. Step 2
/// skips that check since handler values are entity-decoded before they run.
pub fn classify(body: &str, payload: &str) -> Option<ReflectionContext> {
    if payload.is_empty() {
        return None;
    }

    let normalized_payload = normalize_whitespace(payload);
    if !normalize_whitespace(body).contains(&normalized_payload) {
        return None;
    }

    let document = Html::parse_document(body);

    if let Ok(script_sel) = Selector::parse("script") {
        for script in document.select(&script_sel) {
            let text: String = script.text().collect();
            if normalize_whitespace(&text).contains(&normalized_payload) {
                return Some(ReflectionContext::ReflectedInScript);
            }
        }
    }

    let mut in_attribute = false;
    if let Ok(all_sel) = Selector::parse("*") {
        for element in document.select(&all_sel) {
            for (name, value) in element.value().attrs() {
                if !value.contains(payload) {
                    continue;
                }
                if name.to_ascii_lowercase().starts_with("on") {
                    return Some(ReflectionContext::ReflectedInEventHandler);
                }
                in_attribute = true;
            }
        }
    }

    if in_attribute && raw_inside_tag(body, payload) {
        return Some(ReflectionContext::ReflectedInAttribute);
    }

    if body.contains(payload) {
        return Some(ReflectionContext::ReflectedInHtml);
    }

    None
}

/// Some verbatim occurrence of `payload` sits between a `<` and its `>`.
fn raw_inside_tag(body: &str, payload: &str) -> bool {
    body.match_indices(payload).any(|(idx, _)| {
        let before = &body[..idx];
        match (before.rfind('<'), before.rfind('>')) {
            (Some(open), Some(close)) => open > close,
            (Some(_), None) => true,
            _ => false,
        }
    })
}

/// Body contexts first, then header values.
pub fn classify_response(resp: &HttpResponse, payload: &str) -> Option<ReflectionContext> {
    let body = resp.body_text();
    if let Some(ctx) = classify(&body, payload) {
        return Some(ctx);
    }

    if !payload.is_empty() && resp.headers.values().any(|v| v.contains(payload)) {
        return Some(ReflectionContext::ReflectedInHeader);
    }

    None
}

/// Up to `radius` characters either side of the first occurrence of `needle`.
pub fn snippet(body: &str, needle: &str, radius: usize) -> String {
    let Some(pos) = body.find(needle) else {
        return String::new();
    };

    let start = body[..pos]
        .char_indices()
        .rev()
        .nth(radius.saturating_sub(1))
        .map(|(i, _)| i)
        .unwrap_or(0);
    let end_offset = pos + needle.len();
    let end = body[end_offset..]
        .char_indices()
        .nth(radius)
        .map(|(i, _)| end_offset + i)
        .unwrap_or(body.len());

    body[start..end].trim().to_string()
}
