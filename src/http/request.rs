use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use url::Url;

/// A fully built probe, ready for [`crate::http::client::HttpClient::execute`].
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// Set a header
    pub fn set_header(&mut self, name: &str, value: &str) {
        if let Ok(header_name) = HeaderName::from_bytes(name.as_bytes()) {
            if let Ok(header_value) = HeaderValue::from_str(value) {
                self.headers.insert(header_name, header_value);
            }
        }
    }

    /// Create a GET request
    pub fn get(url: Url) -> Self {
        Self::new(Method::GET, url)
    }

    /// Form-encoded POST. Field order is kept as given.
    pub fn post_form(url: Url, fields: &[(String, String)]) -> Self {
        let mut req = Self::new(Method::POST, url);
        let body = serde_urlencoded::to_string(fields).unwrap_or_default();
        req.body = Some(body.into_bytes());
        req.set_header("Content-Type", "application/x-www-form-urlencoded");
        req
    }

    /// GET with `fields` as the whole query string, replacing any existing one.
    pub fn get_with_query(mut url: Url, fields: &[(String, String)]) -> Self {
        {
            let mut pairs = url.query_pairs_mut();
            pairs.clear();
            for (name, value) in fields {
                pairs.append_pair(name, value);
            }
        }
        if fields.is_empty() {
            url.set_query(None);
        }
        Self::get(url)
    }

    pub fn body_text(&self) -> Option<String> {
        self.body
            .as_ref()
            .map(|b| String::from_utf8_lossy(b).into_owned())
    }
}
