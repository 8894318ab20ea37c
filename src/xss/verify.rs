// Stored-state verification
// Submit, then look for the marker in a fixed, bounded set of places

use crate::core::context::ScanOptions;
use crate::error::{ProbeError, SubmissionError};
use crate::http::client::HttpClient;
use crate::http::request::HttpRequest;
use crate::payload::corpus::Marker;
use crate::scanner::executor::form_request;
use crate::scanner::surface::FormMethod;
use crate::xss::context::{classify, snippet, ReflectionContext};
use scraper::{Html, Selector};
use url::Url;

/// Links whose text or href contains one of these may show stored content.
pub const CONTENT_KEYWORDS: &[&str] = &[
    "comment", "post", "message", "view", "read", "article", "blog", "forum", "thread",
];

pub const MAX_CONTENT_PAGES: usize = 3;

/// Where the marker was seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Submission,
    Origin,
    ContentPage,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredHit {
    pub stage: Stage,
    pub page: Url,
    pub context: ReflectionContext,
    pub snippet: String,
}

#[derive(Debug)]
pub enum Verdict {
    Stored(StoredHit),
    /// Nothing within the bounded search. Absence is not proven.
    NoEvidence,
    Rejected(SubmissionError),
    Unreachable(ProbeError),
}

pub struct StoredStateVerifier<'a> {
    client: &'a HttpClient,
    opts: &'a ScanOptions,
}

impl<'a> StoredStateVerifier<'a> {
    pub fn new(client: &'a HttpClient, opts: &'a ScanOptions) -> Self {
        Self { client, opts }
    }

    pub async fn verify(
        &self,
        origin: &Url,
        submit_url: &Url,
        method: FormMethod,
        values: &[(String, String)],
        marker: &Marker,
    ) -> Verdict {
        let tag = marker.tag();

        // Submit
        let req = form_request(submit_url, method, values);
        let resp = match self.client.execute(req).await {
            Ok(resp) => resp,
            Err(e) => return Verdict::Unreachable(e),
        };
        if resp.is_error_status() {
            return Verdict::Rejected(SubmissionError {
                url: submit_url.to_string(),
                status: resp.status,
            });
        }
        self.opts.debug(&format!(
            "Submission to {} accepted ({})",
            submit_url, resp.status
        ));

        // Submission response
        if let Some(hit) = check(&resp.body_text(), &tag, Stage::Submission, &resp.final_url) {
            return Verdict::Stored(hit);
        }

        // Origin page, after the settle delay
        let settle = self.client.delay().saturating_mul(2);
        if !settle.is_zero() {
            tokio::time::sleep(settle).await;
        }
        let origin_body = match self.fetch(origin).await {
            Ok(body) => body,
            Err(ProbeError::Cancelled) => return Verdict::Unreachable(ProbeError::Cancelled),
            Err(e) => {
                self.opts
                    .debug(&format!("Re-fetch of {} failed: {}", origin, e));
                return Verdict::NoEvidence;
            }
        };
        if let Some(hit) = check(&origin_body, &tag, Stage::Origin, origin) {
            return Verdict::Stored(hit);
        }

        // Linked content pages
        for page in content_links(origin, &origin_body) {
            self.opts.debug(&format!("Checking content page {}", page));
            match self.fetch(&page).await {
                Ok(body) => {
                    if let Some(hit) = check(&body, &tag, Stage::ContentPage, &page) {
                        return Verdict::Stored(hit);
                    }
                }
                Err(ProbeError::Cancelled) => return Verdict::Unreachable(ProbeError::Cancelled),
                Err(e) => self.opts.debug(&format!("Fetch of {} failed: {}", page, e)),
            }
        }

        Verdict::NoEvidence
    }

    async fn fetch(&self, url: &Url) -> Result<String, ProbeError> {
        let resp = self.client.execute(HttpRequest::get(url.clone())).await?;
        Ok(resp.body_text())
    }
}

fn check(body: &str, tag: &str, stage: Stage, page: &Url) -> Option<StoredHit> {
    classify(body, tag).map(|context| StoredHit {
        stage,
        page: page.clone(),
        context,
        snippet: snippet(body, tag, 40),
    })
}

/// Up to three distinct http(s) links that look like content pages.
pub fn content_links(base: &Url, body: &str) -> Vec<Url> {
    let document = Html::parse_document(body);
    let Ok(sel) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    let mut links: Vec<Url> = Vec::new();
    for a in document.select(&sel) {
        let Some(href) = a.value().attr("href") else {
            continue;
        };
        let text = a.text().collect::<String>().to_lowercase();
        let href_lower = href.to_lowercase();
        if !CONTENT_KEYWORDS
            .iter()
            .any(|k| text.contains(k) || href_lower.contains(k))
        {
            continue;
        }

        let Ok(mut url) = base.join(href) else {
            continue;
        };
        if url.scheme() != "http" && url.scheme() != "https" {
            continue;
        }
        url.set_fragment(None);
        if !links.contains(&url) {
            links.push(url);
        }
        if links.len() == MAX_CONTENT_PAGES {
            break;
        }
    }
    links
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn values() -> Vec<(String, String)> {
        vec![(
            "comment".to_string(),
            "<div id=\"XSS-ABC12345\">XSS Test</div>".to_string(),
        )]
    }

    fn client() -> HttpClient {
        HttpClient::from_options(&ScanOptions::silent(Duration::ZERO)).unwrap()
    }

    #[tokio::test]
    async fn test_submission_response_short_circuits() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/comment"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"<html><div id="XSS-ABC12345">XSS Test</div></html>"#,
            ))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let opts = ScanOptions::silent(Duration::ZERO);
        let c = client();
        let origin = Url::parse(&format!("{}/blog", server.uri())).unwrap();
        let submit = Url::parse(&format!("{}/comment", server.uri())).unwrap();
        let marker = Marker::from_token("ABC12345");

        let verdict = StoredStateVerifier::new(&c, &opts)
            .verify(&origin, &submit, FormMethod::Post, &values(), &marker)
            .await;

        match verdict {
            Verdict::Stored(hit) => {
                assert_eq!(hit.stage, Stage::Submission);
                assert_eq!(hit.context, ReflectionContext::ReflectedInAttribute);
                assert!(hit.snippet.contains("XSS-ABC12345"));
            }
            other => panic!("expected stored verdict, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_error_status_rejects_without_further_checks() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string("XSS-ABC12345"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let opts = ScanOptions::silent(Duration::ZERO);
        let c = client();
        let origin = Url::parse(&server.uri()).unwrap();
        let submit = Url::parse(&format!("{}/comment", server.uri())).unwrap();

        let verdict = StoredStateVerifier::new(&c, &opts)
            .verify(
                &origin,
                &submit,
                FormMethod::Post,
                &values(),
                &Marker::from_token("ABC12345"),
            )
            .await;
        match verdict {
            Verdict::Rejected(err) => assert_eq!(err.status, 403),
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_marker_found_on_linked_content_page() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(302))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"<a href="/about">About</a>
                   <a href="/posts/1">Latest</a>
                   <a href="/list">Read more</a>"#,
            ))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/posts/1"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<p>nothing</p>"))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/list"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string("<ul><li><!--XSS-ABC12345--></li></ul>"),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/about"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let opts = ScanOptions::silent(Duration::ZERO);
        let c = client();
        let origin = Url::parse(&format!("{}/", server.uri())).unwrap();
        let submit = Url::parse(&format!("{}/comment", server.uri())).unwrap();

        let verdict = StoredStateVerifier::new(&c, &opts)
            .verify(
                &origin,
                &submit,
                FormMethod::Post,
                &values(),
                &Marker::from_token("ABC12345"),
            )
            .await;
        match verdict {
            Verdict::Stored(hit) => {
                assert_eq!(hit.stage, Stage::ContentPage);
                assert_eq!(hit.page.path(), "/list");
                assert_eq!(hit.context, ReflectionContext::ReflectedInHtml);
            }
            other => panic!("expected stored verdict, got {:?}", other),
        }
    }

    #[test]
    fn test_content_links_are_bounded_and_deduped() {
        let base = Url::parse("http://t.test/home").unwrap();
        let body = r#"
            <a href="/blog#top">Blog</a>
            <a href="/blog">Blog again</a>
            <a href="mailto:post@t.test">Mail a post</a>
            <a href="/contact">Contact</a>
            <a href="/thread/9">x</a>
            <a href="/a">Read</a>
            <a href="/forum">Forum</a>"#;
        let links: Vec<String> = content_links(&base, body)
            .into_iter()
            .map(|u| u.to_string())
            .collect();
        assert_eq!(
            links,
            vec![
                "http://t.test/blog",
                "http://t.test/thread/9",
                "http://t.test/a"
            ]
        );
    }
}
