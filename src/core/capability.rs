//! Scan types and the selectors users name them by

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A concrete scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScanType {
    XssReflected,
    XssDom,
    XssStored,
    Clickjacking,
    Lfi,
    Ssrf,
}

impl ScanType {
    pub const ALL: [ScanType; 6] = [
        ScanType::XssReflected,
        ScanType::XssDom,
        ScanType::XssStored,
        ScanType::Clickjacking,
        ScanType::Lfi,
        ScanType::Ssrf,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ScanType::XssReflected => "xss-reflected",
            ScanType::XssDom => "xss-dom",
            ScanType::XssStored => "xss-stored",
            ScanType::Clickjacking => "clickjacking",
            ScanType::Lfi => "lfi",
            ScanType::Ssrf => "ssrf",
        }
    }

    /// Name used in error lines, e.g. "Error during DOM XSS scan: ...".
    pub fn label(&self) -> &'static str {
        match self {
            ScanType::XssReflected => "XSS",
            ScanType::XssDom => "DOM XSS",
            ScanType::XssStored => "Stored XSS",
            ScanType::Clickjacking => "clickjacking",
            ScanType::Lfi => "LFI",
            ScanType::Ssrf => "SSRF",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ScanType::XssReflected => "Reflected XSS in URL parameters and form fields",
            ScanType::XssDom => "Static DOM XSS source/sink analysis",
            ScanType::XssStored => "Stored XSS via data-storing forms",
            ScanType::Clickjacking => "Missing X-Frame-Options / CSP frame-ancestors",
            ScanType::Lfi => "Local file inclusion via file= parameter",
            ScanType::Ssrf => "Server-side request forgery via url= parameter",
        }
    }
}

impl fmt::Display for ScanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a user may ask for on the command line or in a profile.
/// `XssAll` stands for the three XSS scanners and is expanded once, when
/// the scan plan is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScanSelector {
    #[value(alias = "xss")]
    #[serde(alias = "xss")]
    XssReflected,
    XssDom,
    XssStored,
    XssAll,
    Clickjacking,
    Lfi,
    Ssrf,
}

impl ScanSelector {
    pub fn expand(self) -> Vec<ScanType> {
        match self {
            ScanSelector::XssReflected => vec![ScanType::XssReflected],
            ScanSelector::XssDom => vec![ScanType::XssDom],
            ScanSelector::XssStored => vec![ScanType::XssStored],
            ScanSelector::XssAll => vec![
                ScanType::XssReflected,
                ScanType::XssDom,
                ScanType::XssStored,
            ],
            ScanSelector::Clickjacking => vec![ScanType::Clickjacking],
            ScanSelector::Lfi => vec![ScanType::Lfi],
            ScanSelector::Ssrf => vec![ScanType::Ssrf],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xss_all_expands_to_three_scanners() {
        assert_eq!(
            ScanSelector::XssAll.expand(),
            vec![ScanType::XssReflected, ScanType::XssDom, ScanType::XssStored]
        );
        assert_eq!(ScanSelector::Lfi.expand(), vec![ScanType::Lfi]);
    }

    #[test]
    fn test_selector_names_match_scan_type_names() {
        for t in ScanType::ALL {
            let parsed = ScanSelector::from_str(t.as_str(), false).unwrap();
            assert_eq!(parsed.expand(), vec![t]);
        }
        assert_eq!(
            ScanSelector::from_str("xss", false).unwrap(),
            ScanSelector::XssReflected
        );
    }

    #[test]
    fn test_selector_deserializes_with_alias() {
        let parsed: Vec<ScanSelector> =
            serde_json::from_str(r#"["xss", "xss-all", "clickjacking"]"#).unwrap();
        assert_eq!(
            parsed,
            vec![
                ScanSelector::XssReflected,
                ScanSelector::XssAll,
                ScanSelector::Clickjacking
            ]
        );
    }
}
