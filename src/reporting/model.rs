use crate::scanner::surface::Surface;
use crate::xss::context::ReflectionContext;
use serde::Serialize;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum VulnClass {
    ReflectedXss,
    DomXss,
    StoredXss,
    Clickjacking,
    Lfi,
    Ssrf,
}

impl VulnClass {
    pub fn label(&self) -> &'static str {
        match self {
            VulnClass::ReflectedXss => "Reflected XSS",
            VulnClass::DomXss => "DOM XSS",
            VulnClass::StoredXss => "Stored XSS",
            VulnClass::Clickjacking => "Clickjacking",
            VulnClass::Lfi => "LFI",
            VulnClass::Ssrf => "SSRF",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FindingContext {
    ReflectedInScript,
    ReflectedInAttribute,
    ReflectedInEventHandler,
    ReflectedInHtml,
    ReflectedInHeader,
    StoredConfirmed,
    HeaderMissing,
    SignatureMatched,
    SinkDetected,
}

impl From<ReflectionContext> for FindingContext {
    fn from(ctx: ReflectionContext) -> Self {
        match ctx {
            ReflectionContext::ReflectedInScript => FindingContext::ReflectedInScript,
            ReflectionContext::ReflectedInEventHandler => FindingContext::ReflectedInEventHandler,
            ReflectionContext::ReflectedInAttribute => FindingContext::ReflectedInAttribute,
            ReflectionContext::ReflectedInHtml => FindingContext::ReflectedInHtml,
            ReflectionContext::ReflectedInHeader => FindingContext::ReflectedInHeader,
        }
    }
}

/// One confirmed or suspected issue. Scanners collect these in discovery
/// order and hand back their `summary` lines.
#[derive(Debug, Clone, Serialize)]
pub struct Finding {
    pub vuln_class: VulnClass,
    pub context: FindingContext,
    pub surface: Option<Surface>,
    pub payload: Option<String>,
    /// URL the evidence was observed at.
    pub location: String,
    pub evidence: String,
    pub summary: String,
}

impl Finding {
    pub fn reflected(
        surface: Surface,
        payload: &str,
        context: ReflectionContext,
        location: &Url,
        evidence: String,
    ) -> Self {
        let summary = format!(
            "Reflected XSS found in {} with payload: {} (context: {})",
            surface.label(),
            payload,
            context
        );
        Self {
            vuln_class: VulnClass::ReflectedXss,
            context: context.into(),
            surface: Some(surface),
            payload: Some(payload.to_string()),
            location: location.to_string(),
            evidence,
            summary,
        }
    }

    /// `page` is set when the marker turned up on a linked content page
    /// rather than the submission response or the origin page.
    pub fn stored(
        surface: Option<Surface>,
        form_number: usize,
        payload: &str,
        location: &Url,
        page: Option<&Url>,
        evidence: String,
    ) -> Self {
        let summary = match page {
            Some(page) => format!(
                "Potential Stored XSS found in form #{}, payload detected on page: {}",
                form_number, page
            ),
            None => format!(
                "Potential Stored XSS found in form #{} with payload: {}",
                form_number, payload
            ),
        };
        Self {
            vuln_class: VulnClass::StoredXss,
            context: FindingContext::StoredConfirmed,
            surface,
            payload: Some(payload.to_string()),
            location: location.to_string(),
            evidence,
            summary,
        }
    }

    pub fn dom_probe(payload: &str, location: &Url, evidence: String) -> Self {
        Self {
            vuln_class: VulnClass::DomXss,
            context: FindingContext::SinkDetected,
            surface: None,
            payload: Some(payload.to_string()),
            location: location.to_string(),
            evidence,
            summary: format!("Potential DOM XSS vulnerability found with payload: {}", payload),
        }
    }

    pub fn dom_sinks(sinks: &[String], location: &Url) -> Self {
        let joined = sinks.join(", ");
        Self {
            vuln_class: VulnClass::DomXss,
            context: FindingContext::SinkDetected,
            surface: None,
            payload: None,
            location: location.to_string(),
            evidence: joined.clone(),
            summary: format!(
                "Potential DOM XSS sinks found but no confirmed vulnerabilities: {}",
                joined
            ),
        }
    }

    pub fn signature(
        vuln_class: VulnClass,
        signature: &str,
        payload: &str,
        location: &Url,
        evidence: String,
    ) -> Self {
        Self {
            vuln_class,
            context: FindingContext::SignatureMatched,
            surface: None,
            payload: Some(payload.to_string()),
            location: location.to_string(),
            evidence,
            summary: format!(
                "{} vulnerable: signature '{}' found with payload '{}' at {}",
                vuln_class.label(),
                signature,
                payload,
                location
            ),
        }
    }

    pub fn header_missing(location: &Url) -> Self {
        Self {
            vuln_class: VulnClass::Clickjacking,
            context: FindingContext::HeaderMissing,
            surface: None,
            payload: None,
            location: location.to_string(),
            evidence: String::new(),
            summary: "No X-Frame-Options or CSP frame-ancestors header found.".to_string(),
        }
    }

    pub fn describe(&self) -> &str {
        &self.summary
    }
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Low,
    Medium,
    High,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "ℹ️  INFO"),
            Severity::Low => write!(f, "🟢 LOW"),
            Severity::Medium => write!(f, "🟡 MEDIUM"),
            Severity::High => write!(f, "🟠 HIGH"),
        }
    }
}
