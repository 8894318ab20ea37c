//! Error taxonomy for the probing engine.
//!
//! Only [`FetchError`] is fatal, and only to the scanner run that hit it.
//! Everything else is recovered where it happens and at most shows up as a
//! verbose diagnostic.

use std::time::Duration;
use thiserror::Error;

/// Failure of a single outbound request.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("scan cancelled")]
    Cancelled,
}

impl ProbeError {
    pub fn from_reqwest(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            ProbeError::Timeout(timeout)
        } else {
            ProbeError::Network(err)
        }
    }
}

/// The initial page fetch of a scan failed.
#[derive(Error, Debug)]
#[error("failed to fetch {url}: {source}")]
pub struct FetchError {
    pub url: String,
    #[source]
    pub source: ProbeError,
}

impl FetchError {
    pub fn new(url: &url::Url, source: ProbeError) -> Self {
        Self {
            url: url.to_string(),
            source,
        }
    }
}

/// Why a scanner run produced an error line instead of findings.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("invalid target URL '{url}': {source}")]
    InvalidTarget {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("could not build HTTP client: {0}")]
    Client(#[source] ProbeError),

    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// A state-changing form submission was answered with an error status.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("submission to {url} rejected with status {status}")]
pub struct SubmissionError {
    pub url: String,
    pub status: u16,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_message_names_url() {
        let url = url::Url::parse("http://target.test/page").unwrap();
        let err = FetchError::new(&url, ProbeError::Timeout(Duration::from_secs(10)));
        let msg = err.to_string();
        assert!(msg.contains("http://target.test/page"));
        assert!(msg.contains("timed out"));
    }

    #[test]
    fn test_scan_error_wraps_fetch_error_transparently() {
        let url = url::Url::parse("http://target.test/").unwrap();
        let err: ScanError = FetchError::new(&url, ProbeError::Cancelled).into();
        assert_eq!(err.to_string(), "failed to fetch http://target.test/: scan cancelled");
    }

    #[test]
    fn test_submission_error_display() {
        let err = SubmissionError {
            url: "http://target.test/comment".to_string(),
            status: 403,
        };
        assert_eq!(
            err.to_string(),
            "submission to http://target.test/comment rejected with status 403"
        );
    }
}
