//! Request mutation: query rewriting and form value filling

use crate::payload::corpus::Marker;
use crate::scanner::surface::{FieldDescriptor, FormDescriptor};
use url::form_urlencoded::{byte_serialize, parse};
use url::Url;

/// Replaces the value of every `param` occurrence in the query with
/// `payload`, appending the parameter when it is missing. All other
/// segments are copied through untouched, in their original order.
pub fn inject_query_param(base: &Url, param: &str, payload: &str) -> Url {
    let encoded: String = byte_serialize(payload.as_bytes()).collect();
    let mut segments: Vec<String> = Vec::new();
    let mut found = false;

    if let Some(query) = base.query().filter(|q| !q.is_empty()) {
        for segment in query.split('&') {
            let raw_key = segment.split('=').next().unwrap_or_default();
            if decode_key(raw_key) == param {
                segments.push(format!("{}={}", raw_key, encoded));
                found = true;
            } else {
                segments.push(segment.to_string());
            }
        }
    }

    if !found {
        let key: String = byte_serialize(param.as_bytes()).collect();
        segments.push(format!("{}={}", key, encoded));
    }

    let mut url = base.clone();
    url.set_query(Some(&segments.join("&")));
    url
}

fn decode_key(raw: &str) -> String {
    parse(raw.as_bytes())
        .next()
        .map(|(k, _)| k.into_owned())
        .unwrap_or_default()
}

/// Appends `name=value` without encoding `value`, so pre-encoded
/// traversal sequences reach the server as written.
pub fn append_query_param(base: &Url, name: &str, value: &str) -> Url {
    let mut url = base.clone();
    url.set_fragment(None);
    let query = match url.query() {
        Some(q) if !q.is_empty() => format!("{}&{}={}", q, name, value),
        _ => format!("{}={}", name, value),
    };
    url.set_query(Some(&query));
    url
}

/// Innocuous value that keeps a form submission well-formed.
pub fn placeholder(field: &FieldDescriptor, marker: &Marker) -> String {
    match field.field_type.as_str() {
        "checkbox" | "radio" => "on".to_string(),
        "password" => "Password123!".to_string(),
        "email" => marker.email(),
        "hidden" => field.value.clone().unwrap_or_else(|| "test".to_string()),
        _ => "test".to_string(),
    }
}

/// Values for a reflected probe: `target` carries the payload, every other
/// named field gets a placeholder. Submit-like fields keep their declared
/// value so the request looks like a real button press.
pub fn fill_form(
    form: &FormDescriptor,
    target: &str,
    payload: &str,
    marker: &Marker,
) -> Vec<(String, String)> {
    let mut values: Vec<(String, String)> = Vec::with_capacity(form.fields.len());

    for field in &form.fields {
        if values.iter().any(|(name, _)| name == &field.name) {
            continue;
        }
        let value = if field.name == target {
            payload.to_string()
        } else if field.is_submit_like {
            field.value.clone().unwrap_or_else(|| "test".to_string())
        } else {
            placeholder(field, marker)
        };
        values.push((field.name.clone(), value));
    }

    if !values.iter().any(|(name, _)| name == target) {
        values.push((target.to_string(), payload.to_string()));
    }

    values
}

/// Values for a stored probe: every text-like field carries the payload,
/// submit-like fields are left out.
pub fn fill_storage_form(
    form: &FormDescriptor,
    payload: &str,
    marker: &Marker,
) -> Vec<(String, String)> {
    let mut values: Vec<(String, String)> = Vec::new();

    for field in form.injectable_fields() {
        if values.iter().any(|(name, _)| name == &field.name) {
            continue;
        }
        let value = if field.is_text_like() {
            payload.to_string()
        } else {
            placeholder(field, marker)
        };
        values.push((field.name.clone(), value));
    }

    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::surface::FormMethod;

    fn form(fields: Vec<FieldDescriptor>) -> FormDescriptor {
        FormDescriptor {
            index: 0,
            action_url: Url::parse("http://target.test/submit").unwrap(),
            method: FormMethod::Post,
            fields,
            text: String::new(),
        }
    }

    #[test]
    fn test_inject_keeps_other_params_byte_identical() {
        let base = Url::parse("http://t.test/p?a=1%202&q=old&z=%E2%9C%93&b=x+y").unwrap();
        let url = inject_query_param(&base, "q", "<script>alert(1)</script>");
        let query = url.query().unwrap();
        let segments: Vec<&str> = query.split('&').collect();
        assert_eq!(segments[0], "a=1%202");
        assert!(segments[1].starts_with("q="));
        assert_eq!(segments[2], "z=%E2%9C%93");
        assert_eq!(segments[3], "b=x+y");

        let decoded: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(decoded[1].1, "<script>alert(1)</script>");
    }

    #[test]
    fn test_inject_appends_missing_param() {
        let base = Url::parse("http://t.test/p?a=1").unwrap();
        let url = inject_query_param(&base, "q", "x");
        assert_eq!(url.query(), Some("a=1&q=x"));

        let bare = Url::parse("http://t.test/p").unwrap();
        assert_eq!(inject_query_param(&bare, "q", "x").query(), Some("q=x"));
    }

    #[test]
    fn test_inject_replaces_every_occurrence() {
        let base = Url::parse("http://t.test/p?q=1&b=2&q=3").unwrap();
        let url = inject_query_param(&base, "q", "P");
        assert_eq!(url.query(), Some("q=P&b=2&q=P"));
    }

    #[test]
    fn test_append_keeps_value_raw() {
        let base = Url::parse("http://t.test/view").unwrap();
        let url = append_query_param(&base, "file", "..%2F..%2Fetc%2Fpasswd");
        assert_eq!(url.as_str(), "http://t.test/view?file=..%2F..%2Fetc%2Fpasswd");

        let with_query = Url::parse("http://t.test/view?page=1#top").unwrap();
        let url = append_query_param(&with_query, "url", "http://127.0.0.1");
        assert_eq!(url.as_str(), "http://t.test/view?page=1&url=http://127.0.0.1");
    }

    #[test]
    fn test_fill_form_placeholders() {
        let marker = Marker::from_token("ABC12345");
        let f = form(vec![
            FieldDescriptor::new("q", "text"),
            FieldDescriptor::new("mail", "email"),
            FieldDescriptor::new("pw", "password"),
            FieldDescriptor::new("agree", "checkbox"),
            FieldDescriptor::new("csrf", "hidden").with_value("tok"),
            FieldDescriptor::new("go", "submit").with_value("Send"),
        ]);
        let values = fill_form(&f, "q", "<svg>", &marker);
        assert_eq!(
            values,
            vec![
                ("q".to_string(), "<svg>".to_string()),
                ("mail".to_string(), "test-ABC12345@example.com".to_string()),
                ("pw".to_string(), "Password123!".to_string()),
                ("agree".to_string(), "on".to_string()),
                ("csrf".to_string(), "tok".to_string()),
                ("go".to_string(), "Send".to_string()),
            ]
        );
    }

    #[test]
    fn test_fill_storage_form_spreads_payload_over_text_fields() {
        let marker = Marker::from_token("ABC12345");
        let f = form(vec![
            FieldDescriptor::new("name", "text"),
            FieldDescriptor::new("comment", "textarea"),
            FieldDescriptor::new("age", "number"),
            FieldDescriptor::new("post", "submit"),
        ]);
        let values = fill_storage_form(&f, "P", &marker);
        assert_eq!(
            values,
            vec![
                ("name".to_string(), "P".to_string()),
                ("comment".to_string(), "P".to_string()),
                ("age".to_string(), "test".to_string()),
            ]
        );
    }
}
