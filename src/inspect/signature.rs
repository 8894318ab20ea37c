// LFI / SSRF signature probes
// Append a fixed payload to one query parameter and look for a known
// response-body signature

use crate::core::capability::ScanType;
use crate::core::context::ScanOptions;
use crate::error::ProbeError;
use crate::http::client::HttpClient;
use crate::http::request::HttpRequest;
use crate::payload::corpus::{LFI_PAYLOADS, LFI_SIGNATURES, SSRF_PAYLOADS, SSRF_SIGNATURES};
use crate::payload::injector::append_query_param;
use crate::reporting::aggregate::ScanResult;
use crate::reporting::model::{Finding, VulnClass};
use crate::scanner::{into_lines, prepare, Scanner};
use async_trait::async_trait;
use url::Url;

const EVIDENCE_LEN: usize = 200;

/// Static description of one signature-driven check.
#[derive(Debug)]
pub struct SignatureCheck {
    pub scan_type: ScanType,
    pub class: VulnClass,
    pub param: &'static str,
    pub payloads: &'static [&'static str],
    pub signatures: &'static [&'static str],
    pub ignore_case: bool,
    pub none_line: &'static str,
}

pub const LFI: SignatureCheck = SignatureCheck {
    scan_type: ScanType::Lfi,
    class: VulnClass::Lfi,
    param: "file",
    payloads: LFI_PAYLOADS,
    signatures: LFI_SIGNATURES,
    ignore_case: false,
    none_line: "No LFI vulnerabilities found",
};

pub const SSRF: SignatureCheck = SignatureCheck {
    scan_type: ScanType::Ssrf,
    class: VulnClass::Ssrf,
    param: "url",
    payloads: SSRF_PAYLOADS,
    signatures: SSRF_SIGNATURES,
    ignore_case: true,
    none_line: "No SSRF vulnerabilities found",
};

impl SignatureCheck {
    /// First signature present in `body`.
    pub fn matched(&self, body: &str) -> Option<&'static str> {
        if self.ignore_case {
            let lower = body.to_lowercase();
            self.signatures
                .iter()
                .copied()
                .find(|s| lower.contains(&s.to_lowercase()))
        } else {
            self.signatures.iter().copied().find(|s| body.contains(s))
        }
    }
}

pub struct SignatureScanner {
    check: &'static SignatureCheck,
}

impl SignatureScanner {
    pub fn lfi() -> Self {
        Self { check: &LFI }
    }

    pub fn ssrf() -> Self {
        Self { check: &SSRF }
    }

    /// Stops at the first payload whose response carries a signature.
    /// Probe failures are logged and skipped.
    pub async fn run(&self, client: &HttpClient, target: &Url, opts: &ScanOptions) -> Vec<Finding> {
        let check = self.check;
        let mut findings = Vec::new();

        for payload in check.payloads {
            let test_url = append_query_param(target, check.param, payload);
            let resp = match client.execute(HttpRequest::get(test_url.clone())).await {
                Ok(resp) => resp,
                Err(ProbeError::Cancelled) => {
                    opts.warn(&format!("{} scan cancelled", check.scan_type.label()));
                    break;
                }
                Err(e) => {
                    opts.debug(&format!("Request error with payload {}: {}", payload, e));
                    continue;
                }
            };

            let body = resp.body_text();
            match check.matched(&body) {
                Some(signature) => {
                    let evidence: String = body.chars().take(EVIDENCE_LEN).collect();
                    let finding =
                        Finding::signature(check.class, signature, payload, &test_url, evidence);
                    opts.info(&format!("✓ {}", finding.describe()));
                    findings.push(finding);
                    break;
                }
                None => opts.debug(&format!(
                    "No {} detected with: {}",
                    check.scan_type.label(),
                    payload
                )),
            }
        }

        findings
    }
}

#[async_trait]
impl Scanner for SignatureScanner {
    fn scan_type(&self) -> ScanType {
        self.check.scan_type
    }

    async fn scan(&self, url: &str, opts: &ScanOptions) -> ScanResult {
        opts.info(&format!("Starting {} scan on {}", self.check.scan_type.label(), url));
        let outcome = match prepare(url, opts) {
            Ok((client, target)) => Ok(self.run(&client, &target, opts).await),
            Err(e) => Err(e),
        };
        into_lines(self.scan_type(), outcome, self.check.none_line, opts)
    }
}
