use crate::core::capability::ScanType;
use crate::reporting::aggregate::{ScanReport, ScanResult, Tally};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

#[derive(Serialize)]
struct Envelope<'a> {
    metadata: Metadata<'a>,
    results: OrderedResults<'a>,
}

#[derive(Serialize)]
struct Metadata<'a> {
    scanner: &'static str,
    version: &'static str,
    target: &'a str,
    timestamp: String,
    summary: Tally,
}

/// Results keyed by scan type, in the order the scans ran.
struct OrderedResults<'a>(&'a [(ScanType, ScanResult)]);

impl Serialize for OrderedResults<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (scan_type, result) in self.0 {
            map.serialize_entry(scan_type.as_str(), result)?;
        }
        map.end()
    }
}

fn envelope(report: &ScanReport) -> Envelope<'_> {
    Envelope {
        metadata: Metadata {
            scanner: "CyberNexus",
            version: env!("CARGO_PKG_VERSION"),
            target: &report.target,
            timestamp: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            summary: report.tally(),
        },
        results: OrderedResults(&report.results),
    }
}

/// One envelope for a single target, a list of envelopes otherwise.
pub fn render(reports: &[ScanReport]) -> anyhow::Result<String> {
    let json = match reports {
        [single] => serde_json::to_string_pretty(&envelope(single))?,
        many => serde_json::to_string_pretty(&many.iter().map(envelope).collect::<Vec<_>>())?,
    };
    Ok(json)
}
