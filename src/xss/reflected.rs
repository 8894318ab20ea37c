// Reflected XSS scanner
// Cheap payloads first, escalating per surface only while nothing has reflected

use crate::core::capability::ScanType;
use crate::core::context::ScanOptions;
use crate::error::{FetchError, ProbeError, ScanError};
use crate::http::client::HttpClient;
use crate::payload::corpus::{Escalation, Marker, BASIC_XSS};
use crate::reporting::aggregate::ScanResult;
use crate::reporting::model::Finding;
use crate::scanner::discover::discover;
use crate::scanner::executor::InjectionExecutor;
use crate::scanner::surface::Surface;
use crate::scanner::{into_lines, prepare, Scanner};
use crate::xss::context::{classify_response, snippet};
use async_trait::async_trait;
use url::Url;

const NONE_FOUND: &str = "No Reflected XSS vulnerabilities found";

pub struct ReflectedXssScanner {
    marker: Marker,
}

impl Default for ReflectedXssScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl ReflectedXssScanner {
    pub fn new() -> Self {
        Self {
            marker: Marker::random(),
        }
    }

    fn escalation(surface: &Surface) -> Escalation {
        match surface {
            Surface::QueryParam { .. } => Escalation::Advanced,
            Surface::FormField { field_type, .. } => Escalation::for_field_type(field_type),
        }
    }

    pub async fn run(
        &self,
        client: &HttpClient,
        page_url: &Url,
        opts: &ScanOptions,
    ) -> Result<Vec<Finding>, FetchError> {
        let page = discover(client, page_url).await?;
        let exec = InjectionExecutor::new(client, &self.marker);

        let mut surfaces = page.query_params.clone();
        surfaces.extend(page.form_surfaces());
        opts.debug(&format!(
            "{} query parameter(s), {} form(s) on {}",
            page.query_params.len(),
            page.forms.len(),
            page_url
        ));

        let mut findings = Vec::new();

        'surfaces: for surface in &surfaces {
            opts.info(&format!("Testing {}", surface.label()));
            let payloads = BASIC_XSS
                .iter()
                .chain(Self::escalation(surface).payloads().iter());

            for payload in payloads {
                opts.debug(&format!("Testing payload: {}", payload));

                let probe = match exec.probe(page_url, surface, payload).await {
                    Ok(probe) => probe,
                    Err(ProbeError::Cancelled) => {
                        opts.warn("Reflected XSS scan cancelled, keeping findings so far");
                        break 'surfaces;
                    }
                    Err(e) => {
                        opts.debug(&format!("Probe of {} failed: {}", surface.label(), e));
                        continue;
                    }
                };

                if let Some(ctx) = classify_response(&probe.response, payload) {
                    let body = probe.response.body_text();
                    let evidence = snippet(&body, payload, 40);
                    let finding = Finding::reflected(
                        surface.clone(),
                        payload,
                        ctx,
                        &probe.url,
                        evidence,
                    );
                    opts.info(&format!("✓ {}", finding.describe()));
                    findings.push(finding);
                    break;
                }
            }
        }

        Ok(findings)
    }
}

#[async_trait]
impl Scanner for ReflectedXssScanner {
    fn scan_type(&self) -> ScanType {
        ScanType::XssReflected
    }

    async fn scan(&self, url: &str, opts: &ScanOptions) -> ScanResult {
        opts.info(&format!("Starting Reflected XSS scan on {}", url));
        let outcome = match prepare(url, opts) {
            Ok((client, target)) => self
                .run(&client, &target, opts)
                .await
                .map_err(ScanError::from),
            Err(e) => Err(e),
        };
        into_lines(self.scan_type(), outcome, NONE_FOUND, opts)
    }
}
