//! Per-target result collection and severity tallies.

use crate::core::capability::ScanType;
use crate::inspect::clickjacking::ClickjackingReport;
use crate::reporting::model::Severity;
use serde::Serialize;

/// What one scanner hands back for one URL.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ScanResult {
    Findings(Vec<String>),
    Headers(ClickjackingReport),
}

impl ScanResult {
    /// Severity of every line (or of the header report as a whole).
    pub fn severities(&self) -> Vec<Severity> {
        match self {
            ScanResult::Findings(lines) => lines.iter().map(|l| classify_line(l)).collect(),
            ScanResult::Headers(report) if report.vulnerable => vec![Severity::High],
            ScanResult::Headers(report) => report
                .details
                .iter()
                .map(|d| {
                    if d.starts_with("Error") {
                        Severity::Low
                    } else {
                        Severity::Info
                    }
                })
                .collect(),
        }
    }
}

/// Classify a finding line by its wording. Status words are checked
/// before issue words so "No ... found" stays informational.
pub fn classify_line(line: &str) -> Severity {
    let lower = line.to_lowercase();
    if line.starts_with("Error") {
        Severity::Low
    } else if line.starts_with("No ") || line.contains("Note:") || lower.contains(" not ") {
        Severity::Info
    } else if lower.contains("potential") || lower.contains("warning") {
        Severity::Medium
    } else if lower.contains("vulnerable") || lower.contains("found") {
        Severity::High
    } else {
        Severity::Info
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Tally {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub info: usize,
}

impl Tally {
    fn add(&mut self, severity: Severity) {
        match severity {
            Severity::High => self.high += 1,
            Severity::Medium => self.medium += 1,
            Severity::Low => self.low += 1,
            Severity::Info => self.info += 1,
        }
    }

    fn merge(&mut self, other: Tally) {
        self.high += other.high;
        self.medium += other.medium;
        self.low += other.low;
        self.info += other.info;
    }

    /// Lines that point at a problem (everything but informational).
    pub fn issues(&self) -> usize {
        self.high + self.medium + self.low
    }
}

/// All results for one target, in execution order.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanReport {
    pub target: String,
    pub results: Vec<(ScanType, ScanResult)>,
}

impl ScanReport {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            results: Vec::new(),
        }
    }

    pub fn tally(&self) -> Tally {
        let mut tally = Tally::default();
        for (_, result) in &self.results {
            for severity in result.severities() {
                tally.add(severity);
            }
        }
        tally
    }
}

#[derive(Debug, Default)]
pub struct ResultAggregator {
    reports: Vec<ScanReport>,
}

impl ResultAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends to the report for `target`, opening one if this is the
    /// first result for it.
    pub fn record(&mut self, target: &str, scan_type: ScanType, result: ScanResult) {
        let idx = match self.reports.iter().position(|r| r.target == target) {
            Some(idx) => idx,
            None => {
                self.reports.push(ScanReport::new(target));
                self.reports.len() - 1
            }
        };
        self.reports[idx].results.push((scan_type, result));
    }

    pub fn reports(&self) -> &[ScanReport] {
        &self.reports
    }

    pub fn tally(&self) -> Tally {
        let mut total = Tally::default();
        for report in &self.reports {
            total.merge(report.tally());
        }
        total
    }
}
