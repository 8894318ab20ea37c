// Clickjacking header check
// One fetch, then X-Frame-Options and CSP frame-ancestors

use crate::core::capability::ScanType;
use crate::core::context::ScanOptions;
use crate::http::request::HttpRequest;
use crate::http::response::HttpResponse;
use crate::reporting::aggregate::ScanResult;
use crate::reporting::model::Finding;
use crate::scanner::{prepare, Scanner};
use async_trait::async_trait;
use serde::Serialize;
use url::Url;

const PROTECTED: &str = "At least one protective header is present.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClickjackingReport {
    pub vulnerable: bool,
    /// Upper-cased header value, `None` when absent or blank.
    pub x_frame_options: Option<String>,
    /// Value of the `frame-ancestors` directive, `None` when the directive is absent.
    pub csp_frame_ancestors: Option<String>,
    pub details: Vec<String>,
}

impl ClickjackingReport {
    fn unreachable(message: String) -> Self {
        Self {
            vulnerable: false,
            x_frame_options: None,
            csp_frame_ancestors: None,
            details: vec![message],
        }
    }
}

/// Value of the first `frame-ancestors` directive in a CSP header.
pub fn frame_ancestors(csp: &str) -> Option<String> {
    csp.split(';')
        .map(str::trim)
        .find(|d| d.starts_with("frame-ancestors"))
        .map(|d| d["frame-ancestors".len()..].trim().to_string())
}

/// Vulnerable only when neither protective header is in place.
pub fn inspect_headers(resp: &HttpResponse, location: &Url) -> ClickjackingReport {
    let x_frame_options = resp
        .header("x-frame-options")
        .map(|v| v.trim().to_uppercase())
        .filter(|v| !v.is_empty());
    let csp_frame_ancestors = resp
        .header("content-security-policy")
        .and_then(frame_ancestors);

    let vulnerable = x_frame_options.is_none() && csp_frame_ancestors.is_none();
    let details = if vulnerable {
        vec![Finding::header_missing(location).summary]
    } else {
        vec![PROTECTED.to_string()]
    };

    ClickjackingReport {
        vulnerable,
        x_frame_options,
        csp_frame_ancestors,
        details,
    }
}

#[derive(Default)]
pub struct ClickjackingScanner;

impl ClickjackingScanner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Scanner for ClickjackingScanner {
    fn scan_type(&self) -> ScanType {
        ScanType::Clickjacking
    }

    async fn scan(&self, url: &str, opts: &ScanOptions) -> ScanResult {
        opts.info(&format!("Starting Clickjacking scan on {}", url));
        let (client, target) = match prepare(url, opts) {
            Ok(prepared) => prepared,
            Err(e) => {
                let line = format!("Error fetching URL: {}", e);
                opts.warn(&line);
                return ScanResult::Headers(ClickjackingReport::unreachable(line));
            }
        };

        let resp = match client.execute(HttpRequest::get(target.clone())).await {
            Ok(resp) => resp,
            Err(e) => {
                let line = format!("Error fetching URL: {}", e);
                opts.warn(&line);
                return ScanResult::Headers(ClickjackingReport::unreachable(line));
            }
        };

        let report = inspect_headers(&resp, &target);
        match &report.x_frame_options {
            Some(v) => opts.debug(&format!("X-Frame-Options header found: {}", v)),
            None => opts.debug("X-Frame-Options header not found"),
        }
        match &report.csp_frame_ancestors {
            Some(v) => opts.debug(&format!("CSP frame-ancestors directive found: {}", v)),
            None => opts.debug("CSP frame-ancestors directive not found"),
        }
        if report.vulnerable {
            opts.warn("Potential Clickjacking vulnerability detected!");
        } else {
            opts.info("✓ No Clickjacking vulnerability detected");
        }

        ScanResult::Headers(report)
    }
}
