//! Scanner contract and the pieces every scanner shares

pub mod discover;
pub mod executor;
pub mod surface;

use crate::core::capability::ScanType;
use crate::core::context::ScanOptions;
use crate::error::ScanError;
use crate::http::client::HttpClient;
use crate::reporting::aggregate::ScanResult;
use crate::reporting::model::Finding;
use async_trait::async_trait;
use url::Url;

/// One vulnerability class against one URL.
///
/// Implementations never fail: a run that cannot start or whose initial
/// fetch fails yields a single `"Error during ... scan: ..."` line.
#[async_trait]
pub trait Scanner: Send + Sync {
    fn scan_type(&self) -> ScanType;

    async fn scan(&self, url: &str, opts: &ScanOptions) -> ScanResult;
}

/// Parse the target and build the paced client a run will use.
pub fn prepare(url: &str, opts: &ScanOptions) -> Result<(HttpClient, Url), ScanError> {
    let target = Url::parse(url).map_err(|source| ScanError::InvalidTarget {
        url: url.to_string(),
        source,
    })?;
    let client = HttpClient::from_options(opts).map_err(ScanError::Client)?;
    Ok((client, target))
}

/// Findings become their summary lines; no findings becomes `none_line`.
pub fn into_lines(
    scan_type: ScanType,
    outcome: Result<Vec<Finding>, ScanError>,
    none_line: &str,
    opts: &ScanOptions,
) -> ScanResult {
    match outcome {
        Ok(findings) if findings.is_empty() => {
            opts.info(none_line);
            ScanResult::Findings(vec![none_line.to_string()])
        }
        Ok(findings) => ScanResult::Findings(
            findings.iter().map(|f| f.describe().to_string()).collect(),
        ),
        Err(e) => {
            let line = format!("Error during {} scan: {}", scan_type.label(), e);
            opts.warn(&line);
            ScanResult::Findings(vec![line])
        }
    }
}
