use std::collections::HashMap;
use url::Url;

/// Raw response capture. Never mutated after `execute` returns it.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    /// Header names are lowercased; repeated headers are joined with ", ".
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
    /// URL after redirects.
    pub final_url: Url,
    pub elapsed_ms: u128,
}

impl HttpResponse {
    /// Get body as UTF-8 string (lossy conversion)
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn is_error_status(&self) -> bool {
        self.status >= 400
    }
}
