//! Turns a (surface, payload) pair into a paced request

use crate::error::ProbeError;
use crate::http::client::HttpClient;
use crate::http::request::HttpRequest;
use crate::http::response::HttpResponse;
use crate::payload::corpus::Marker;
use crate::payload::injector::{fill_form, inject_query_param};
use crate::scanner::surface::{FormMethod, Surface};
use url::Url;

/// A sent probe and what came back.
#[derive(Debug, Clone)]
pub struct Probe {
    pub url: Url,
    pub response: HttpResponse,
}

pub struct InjectionExecutor<'a> {
    client: &'a HttpClient,
    marker: &'a Marker,
}

impl<'a> InjectionExecutor<'a> {
    pub fn new(client: &'a HttpClient, marker: &'a Marker) -> Self {
        Self { client, marker }
    }

    pub fn build(&self, page_url: &Url, surface: &Surface, payload: &str) -> HttpRequest {
        match surface {
            Surface::QueryParam { name } => {
                HttpRequest::get(inject_query_param(page_url, name, payload))
            }
            Surface::FormField { name, form, .. } => {
                let values = fill_form(form, name, payload, self.marker);
                form_request(&form.action_url, form.method, &values)
            }
        }
    }

    /// One request through the scanner's client, so pacing applies.
    pub async fn probe(
        &self,
        page_url: &Url,
        surface: &Surface,
        payload: &str,
    ) -> Result<Probe, ProbeError> {
        let req = self.build(page_url, surface, payload);
        let url = req.url.clone();
        let response = self.client.execute(req).await?;
        Ok(Probe { url, response })
    }
}

pub fn form_request(action: &Url, method: FormMethod, values: &[(String, String)]) -> HttpRequest {
    match method {
        FormMethod::Post => HttpRequest::post_form(action.clone(), values),
        FormMethod::Get => HttpRequest::get_with_query(action.clone(), values),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cancel::CancelFlag;
    use crate::core::rate_limit::RateLimiter;
    use crate::scanner::surface::{FieldDescriptor, FormDescriptor};
    use reqwest::Method;
    use std::time::{Duration, Instant};
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(delay: Duration) -> HttpClient {
        HttpClient::new(RateLimiter::new(delay), Duration::from_secs(5), CancelFlag::new()).unwrap()
    }

    fn comment_form(method: FormMethod) -> FormDescriptor {
        FormDescriptor {
            index: 0,
            action_url: Url::parse("http://t.test/post").unwrap(),
            method,
            fields: vec![
                FieldDescriptor::new("msg", "text"),
                FieldDescriptor::new("pw", "password"),
            ],
            text: String::new(),
        }
    }

    #[test]
    fn test_build_form_post_and_get() {
        let c = client(Duration::ZERO);
        let marker = Marker::from_token("ABC12345");
        let exec = InjectionExecutor::new(&c, &marker);
        let page = Url::parse("http://t.test/").unwrap();

        let surface = Surface::FormField {
            name: "msg".to_string(),
            field_type: "text".to_string(),
            form: comment_form(FormMethod::Post),
        };
        let req = exec.build(&page, &surface, "<b>");
        assert_eq!(req.method, Method::POST);
        assert_eq!(req.body_text().unwrap(), "msg=%3Cb%3E&pw=Password123%21");

        let surface = Surface::FormField {
            name: "msg".to_string(),
            field_type: "text".to_string(),
            form: comment_form(FormMethod::Get),
        };
        let req = exec.build(&page, &surface, "<b>");
        assert_eq!(req.method, Method::GET);
        assert_eq!(req.url.query(), Some("msg=%3Cb%3E&pw=Password123%21"));
    }

    #[tokio::test]
    async fn test_probe_starts_are_paced() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/s"))
            .and(query_param("q", "x"))
            .respond_with(ResponseTemplate::new(200).set_body_string("x"))
            .expect(3)
            .mount(&server)
            .await;

        let delay = Duration::from_millis(60);
        let c = client(delay);
        let marker = Marker::from_token("ABC12345");
        let exec = InjectionExecutor::new(&c, &marker);
        let page = Url::parse(&format!("{}/s?q=1", server.uri())).unwrap();
        let surface = Surface::QueryParam {
            name: "q".to_string(),
        };

        let mut starts = Vec::new();
        for _ in 0..3 {
            starts.push(Instant::now());
            let probe = exec.probe(&page, &surface, "x").await.unwrap();
            assert_eq!(probe.response.body_text(), "x");
        }
        for pair in starts.windows(2) {
            assert!(pair[1].duration_since(pair[0]) >= delay);
        }
    }
}
