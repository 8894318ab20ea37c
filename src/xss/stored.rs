// Stored/Persistent XSS scanner
// Submits marker payloads through data-storing forms and hands each one to
// the stored-state verifier

use crate::core::capability::ScanType;
use crate::core::context::ScanOptions;
use crate::error::{FetchError, ProbeError, ScanError};
use crate::http::client::HttpClient;
use crate::payload::corpus::{stored_xss, Marker};
use crate::payload::injector::fill_storage_form;
use crate::reporting::aggregate::ScanResult;
use crate::reporting::model::Finding;
use crate::scanner::discover::discover;
use crate::scanner::surface::{FormDescriptor, FormMethod, Surface};
use crate::scanner::{into_lines, prepare, Scanner};
use crate::xss::verify::{Stage, StoredStateVerifier, Verdict};
use async_trait::async_trait;
use url::Url;

pub const STORAGE_KEYWORDS: &[&str] = &[
    "comment", "post", "message", "content", "blog", "forum", "reply", "review", "feedback",
];

pub const NO_CANDIDATES: &str = "No forms that potentially store data were found";

pub const NONE_FOUND: &str = "No Stored XSS vulnerabilities detected (Note: no evidence found \
within the bounded search of the submission response, the origin page and up to 3 linked \
content pages; absence is not proven)";

/// POST forms with a textarea, or a storage keyword in the form text or in
/// a field's name, id or placeholder.
pub fn is_storage_candidate(form: &FormDescriptor) -> bool {
    if form.method != FormMethod::Post {
        return false;
    }
    if form.fields.iter().any(|f| f.is_textarea()) {
        return true;
    }

    let has_keyword = |s: &str| {
        let s = s.to_lowercase();
        STORAGE_KEYWORDS.iter().any(|k| s.contains(k))
    };

    has_keyword(&form.text)
        || form.fields.iter().any(|f| {
            has_keyword(&f.name)
                || f.id.as_deref().is_some_and(has_keyword)
                || f.placeholder.as_deref().is_some_and(has_keyword)
        })
}

#[derive(Debug)]
pub enum StoredOutcome {
    NoCandidates,
    Checked(Vec<Finding>),
}

pub struct StoredXssScanner {
    marker: Marker,
}

impl Default for StoredXssScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl StoredXssScanner {
    pub fn new() -> Self {
        Self::with_marker(Marker::random())
    }

    pub fn with_marker(marker: Marker) -> Self {
        Self { marker }
    }

    pub async fn run(
        &self,
        client: &HttpClient,
        page_url: &Url,
        opts: &ScanOptions,
    ) -> Result<StoredOutcome, FetchError> {
        let page = discover(client, page_url).await?;

        let candidates: Vec<&FormDescriptor> =
            page.forms.iter().filter(|f| is_storage_candidate(f)).collect();
        if candidates.is_empty() {
            return Ok(StoredOutcome::NoCandidates);
        }
        opts.info(&format!(
            "Found {} form(s) that may store data",
            candidates.len()
        ));

        let verifier = StoredStateVerifier::new(client, opts);
        let payloads = stored_xss(&self.marker);
        let mut findings = Vec::new();

        'forms: for form in candidates {
            opts.info(&format!("Testing form #{} for stored XSS", form.number()));
            let surface = form
                .injectable_fields()
                .find(|f| f.is_text_like())
                .map(|f| Surface::FormField {
                    name: f.name.clone(),
                    field_type: f.field_type.clone(),
                    form: form.clone(),
                });

            for payload in &payloads {
                opts.debug(&format!("Submitting payload: {}", payload));
                let values = fill_storage_form(form, payload, &self.marker);

                match verifier
                    .verify(page_url, &form.action_url, form.method, &values, &self.marker)
                    .await
                {
                    Verdict::Stored(hit) => {
                        let page = (hit.stage == Stage::ContentPage).then_some(&hit.page);
                        let finding = Finding::stored(
                            surface.clone(),
                            form.number(),
                            payload,
                            &form.action_url,
                            page,
                            hit.snippet.clone(),
                        );
                        opts.info(&format!("✓ {} ({})", finding.describe(), hit.context));
                        findings.push(finding);
                        break;
                    }
                    Verdict::NoEvidence => {
                        opts.debug("Marker not found within the bounded search");
                    }
                    Verdict::Rejected(e) => {
                        opts.debug(&format!("Form #{}: {}", form.number(), e));
                    }
                    Verdict::Unreachable(ProbeError::Cancelled) => {
                        opts.warn("Stored XSS scan cancelled, keeping findings so far");
                        break 'forms;
                    }
                    Verdict::Unreachable(e) => {
                        opts.debug(&format!("Submission of form #{} failed: {}", form.number(), e));
                    }
                }
            }
        }

        Ok(StoredOutcome::Checked(findings))
    }
}

#[async_trait]
impl Scanner for StoredXssScanner {
    fn scan_type(&self) -> ScanType {
        ScanType::XssStored
    }

    async fn scan(&self, url: &str, opts: &ScanOptions) -> ScanResult {
        opts.info(&format!("Starting Stored XSS scan on {}", url));
        let outcome = match prepare(url, opts) {
            Ok((client, target)) => self
                .run(&client, &target, opts)
                .await
                .map_err(ScanError::from),
            Err(e) => Err(e),
        };

        match outcome {
            Ok(StoredOutcome::NoCandidates) => {
                opts.info(NO_CANDIDATES);
                ScanResult::Findings(vec![NO_CANDIDATES.to_string()])
            }
            Ok(StoredOutcome::Checked(findings)) => {
                into_lines(self.scan_type(), Ok(findings), NONE_FOUND, opts)
            }
            Err(e) => into_lines(self.scan_type(), Err(e), NONE_FOUND, opts),
        }
    }
}
