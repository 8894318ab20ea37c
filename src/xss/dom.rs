// DOM-based XSS Detection Module
// Static source/sink analysis of page scripts plus reflected DOM payload probes

use crate::core::capability::ScanType;
use crate::core::context::ScanOptions;
use crate::error::{FetchError, ProbeError, ScanError};
use crate::http::client::HttpClient;
use crate::http::request::HttpRequest;
use crate::payload::corpus::{DOM_SINKS, DOM_XSS};
use crate::reporting::aggregate::ScanResult;
use crate::reporting::model::Finding;
use crate::scanner::{into_lines, prepare, Scanner};
use crate::xss::context::snippet;
use async_trait::async_trait;
use regex::Regex;
use scraper::{Html, Selector};
use url::Url;

const NONE_FOUND: &str = "No DOM XSS vulnerabilities found";

/// A variable assigned from a DOM source that later reaches a sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomXssFlow {
    pub source: String,
    pub sink: String,
    pub variable: String,
}

impl DomXssFlow {
    pub fn describe(&self) -> String {
        format!("{} -> {} (via {})", self.source, self.sink, self.variable)
    }
}

const FLOW_SINKS: &[&str] = &[
    "innerHTML",
    "outerHTML",
    "insertAdjacentHTML",
    "document.write",
    "eval(",
    "setTimeout(",
    "setInterval(",
    "Function(",
    ".html(",
];

const ASSIGNMENT: &str = r"([A-Za-z_$][\w$]*)\s*=\s*[^;\n]*?(location\.(?:hash|search|href|pathname)|document\.(?:URL|documentURI|baseURI|referrer|cookie)|window\.name|localStorage|sessionStorage)";

/// Known sources and sinks mentioned in `js`, in catalog order.
pub fn find_sinks(js: &str) -> Vec<&'static str> {
    DOM_SINKS.iter().copied().filter(|s| js.contains(s)).collect()
}

/// Light taint pass: `x = location.hash ...` followed by a sink line naming `x`.
pub fn trace_flows(js: &str) -> Vec<DomXssFlow> {
    let mut flows: Vec<DomXssFlow> = Vec::new();
    let Ok(assignment) = Regex::new(ASSIGNMENT) else {
        return flows;
    };

    for cap in assignment.captures_iter(js) {
        let (Some(var), Some(source)) = (cap.get(1), cap.get(2)) else {
            continue;
        };
        let Ok(word) = Regex::new(&format!(r"(^|[^\w$]){}([^\w$]|$)", regex::escape(var.as_str())))
        else {
            continue;
        };

        for line in js[cap.get(0).map_or(0, |m| m.end())..].lines() {
            let Some(sink) = FLOW_SINKS.iter().find(|s| line.contains(*s)) else {
                continue;
            };
            if !word.is_match(line) {
                continue;
            }
            let flow = DomXssFlow {
                source: source.as_str().to_string(),
                sink: sink.trim_end_matches('(').trim_start_matches('.').to_string(),
                variable: var.as_str().to_string(),
            };
            if !flows.contains(&flow) {
                flows.push(flow);
            }
        }
    }

    flows
}

/// The part of a DOM payload the page would actually see.
fn injected_value(payload: &str) -> &str {
    if let Some(fragment) = payload.strip_prefix('#') {
        return fragment;
    }
    payload.split_once('=').map_or(payload, |(_, v)| v)
}

/// Reflected inside a script or an event handler, or an alert payload
/// reflected anywhere.
pub fn probe_confirms(body: &str, payload: &str) -> bool {
    let injected = injected_value(payload);
    if injected.is_empty() {
        return false;
    }

    let document = Html::parse_document(body);
    if let Ok(sel) = Selector::parse("script") {
        if document
            .select(&sel)
            .any(|s| s.text().collect::<String>().contains(injected))
        {
            return true;
        }
    }
    if let Ok(sel) = Selector::parse("*") {
        for el in document.select(&sel) {
            if el
                .value()
                .attrs()
                .any(|(name, value)| name.starts_with("on") && value.contains(injected))
            {
                return true;
            }
        }
    }

    injected.contains("alert") && body.contains(injected)
}

#[derive(Default)]
pub struct DomXssScanner;

impl DomXssScanner {
    pub fn new() -> Self {
        Self
    }

    pub async fn run(
        &self,
        client: &HttpClient,
        page_url: &Url,
        opts: &ScanOptions,
    ) -> Result<Vec<Finding>, FetchError> {
        let resp = client
            .execute(HttpRequest::get(page_url.clone()))
            .await
            .map_err(|e| FetchError::new(page_url, e))?;
        let body = resp.body_text();

        let (inline, sources, handlers) = {
            let document = Html::parse_document(&body);
            let mut inline: Vec<String> = Vec::new();
            let mut sources: Vec<Url> = Vec::new();
            if let Ok(sel) = Selector::parse("script") {
                for script in document.select(&sel) {
                    if let Some(src) = script.value().attr("src") {
                        if let Ok(url) = page_url.join(src) {
                            sources.push(url);
                        }
                    }
                    let text: String = script.text().collect();
                    if !text.trim().is_empty() {
                        inline.push(text);
                    }
                }
            }
            let mut handlers: Vec<String> = Vec::new();
            if let Ok(sel) = Selector::parse("*") {
                for el in document.select(&sel) {
                    for (name, _) in el.value().attrs() {
                        if name.starts_with("on") {
                            handlers.push(format!("Event handler: {}", name));
                        }
                    }
                }
            }
            (inline, sources, handlers)
        };

        let mut scripts = inline;
        let mut cancelled = false;
        for src in sources {
            opts.debug(&format!("Fetching external script {}", src));
            match client.execute(HttpRequest::get(src.clone())).await {
                Ok(r) => scripts.push(r.body_text()),
                Err(ProbeError::Cancelled) => {
                    cancelled = true;
                    break;
                }
                Err(e) => opts.debug(&format!("Could not fetch script {}: {}", src, e)),
            }
        }

        let mut sinks: Vec<String> = Vec::new();
        let mut push = |item: String| {
            if !sinks.contains(&item) {
                sinks.push(item);
            }
        };
        for js in &scripts {
            for sink in find_sinks(js) {
                opts.debug(&format!("Potential DOM XSS sink: {}", sink));
                push(sink.to_string());
            }
            for flow in trace_flows(js) {
                opts.info(&format!("Possible DOM data flow: {}", flow.describe()));
                push(format!("flow {}", flow.describe()));
            }
        }
        for handler in handlers {
            push(handler);
        }

        let mut findings = Vec::new();
        if !cancelled {
            for payload in DOM_XSS {
                let Ok(test_url) = page_url.join(payload) else {
                    continue;
                };
                opts.debug(&format!("Testing DOM payload: {}", payload));
                match client.execute(HttpRequest::get(test_url.clone())).await {
                    Ok(r) => {
                        let probe_body = r.body_text();
                        if probe_confirms(&probe_body, payload) {
                            let finding = Finding::dom_probe(
                                payload,
                                &test_url,
                                snippet(&probe_body, injected_value(payload), 40),
                            );
                            opts.info(&format!("✓ {}", finding.describe()));
                            findings.push(finding);
                        }
                    }
                    Err(ProbeError::Cancelled) => {
                        opts.warn("DOM XSS scan cancelled, keeping findings so far");
                        break;
                    }
                    Err(e) => opts.debug(&format!("DOM probe failed: {}", e)),
                }
            }
        }

        if findings.is_empty() && !sinks.is_empty() {
            findings.push(Finding::dom_sinks(&sinks, page_url));
        }

        Ok(findings)
    }
}

#[async_trait]
impl Scanner for DomXssScanner {
    fn scan_type(&self) -> ScanType {
        ScanType::XssDom
    }

    async fn scan(&self, url: &str, opts: &ScanOptions) -> ScanResult {
        opts.info(&format!("Starting DOM XSS scan on {}", url));
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
