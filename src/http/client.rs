//! Paced HTTP client with a fixed per-request timeout and cancellation

use crate::core::cancel::CancelFlag;
use crate::core::context::ScanOptions;
use crate::core::rate_limit::RateLimiter;
use crate::error::ProbeError;
use crate::http::request::HttpRequest;
use crate::http::response::HttpResponse;
use reqwest::{header, redirect::Policy, Client};
use std::collections::HashMap;
use std::time::{Duration, Instant};

const USER_AGENT: &str = concat!("CyberNexus/", env!("CARGO_PKG_VERSION"));
const ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
const MAX_REDIRECTS: usize = 5;

/// One client per scanner instance. Every request goes through the same
/// limiter, so two requests from one scanner never start closer together
/// than the configured delay.
pub struct HttpClient {
    client: Client,
    limiter: RateLimiter,
    timeout: Duration,
    cancel: CancelFlag,
}

impl HttpClient {
    pub fn new(limiter: RateLimiter, timeout: Duration, cancel: CancelFlag) -> Result<Self, ProbeError> {
        let client = Client::builder()
            .danger_accept_invalid_certs(true)
            .redirect(Policy::limited(MAX_REDIRECTS))
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(ProbeError::Network)?;

        Ok(Self {
            client,
            limiter,
            timeout,
            cancel,
        })
    }

    pub fn from_options(opts: &ScanOptions) -> Result<Self, ProbeError> {
        Self::new(
            RateLimiter::new(opts.delay),
            opts.timeout,
            opts.cancel.clone(),
        )
    }

    pub fn delay(&self) -> Duration {
        self.limiter.interval()
    }

    pub async fn execute(&self, req: HttpRequest) -> Result<HttpResponse, ProbeError> {
        if self.cancel.is_cancelled() {
            return Err(ProbeError::Cancelled);
        }

        self.limiter.wait().await;
        let result = self.send(req).await;
        self.limiter.settle().await;
        result
    }

    async fn send(&self, req: HttpRequest) -> Result<HttpResponse, ProbeError> {
        let start = Instant::now();

        let mut request = self
            .client
            .request(req.method, req.url)
            .header(header::ACCEPT, ACCEPT)
            .headers(req.headers);

        if let Some(body) = req.body {
            request = request.body(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ProbeError::from_reqwest(e, self.timeout))?;

        let status = response.status().as_u16();
        let final_url = response.url().clone();

        let mut headers: HashMap<String, String> = HashMap::new();
        for (k, v) in response.headers().iter() {
            let value = String::from_utf8_lossy(v.as_bytes()).to_string();
            headers
                .entry(k.as_str().to_ascii_lowercase())
                .and_modify(|existing| {
                    existing.push_str(", ");
                    existing.push_str(&value);
                })
                .or_insert(value);
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ProbeError::from_reqwest(e, self.timeout))?;

        Ok(HttpResponse {
            status,
            headers,
            body: body.to_vec(),
            final_url,
            elapsed_ms: start.elapsed().as_millis(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client() -> HttpClient {
        HttpClient::new(
            RateLimiter::new(Duration::ZERO),
            Duration::from_secs(5),
            CancelFlag::new(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_execute_captures_status_headers_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page"))
            .respond_with(
                ResponseTemplate::new(404)
                    .insert_header("X-Frame-Options", "SAMEORIGIN")
                    .set_body_string("missing"),
            )
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/page", server.uri())).unwrap();
        let resp = client().execute(HttpRequest::get(url)).await.unwrap();

        assert_eq!(resp.status, 404);
        assert_eq!(resp.header("x-frame-options"), Some("SAMEORIGIN"));
        assert_eq!(resp.body_text(), "missing");
        assert!(resp.is_error_status());
    }

    #[tokio::test]
    async fn test_cancelled_client_issues_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let c = client();
        c.cancel.cancel();
        let url = Url::parse(&server.uri()).unwrap();
        let err = c.execute(HttpRequest::get(url)).await.unwrap_err();
        assert!(matches!(err, ProbeError::Cancelled));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_probe_error() {
        let url = Url::parse("http://127.0.0.1:9/").unwrap();
        let err = client().execute(HttpRequest::get(url)).await.unwrap_err();
        assert!(matches!(err, ProbeError::Network(_) | ProbeError::Timeout(_)));
    }
}
