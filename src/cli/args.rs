use crate::core::capability::ScanSelector;
use crate::reporting::aggregate::ScanReport;
use crate::reporting::{html, json, text};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// CyberNexus – multi-vector web vulnerability scanner
#[derive(Parser, Debug)]
#[command(
    name = "cybernexus",
    version,
    about = "CyberNexus – multi-vector web vulnerability scanner",
    long_about = r#"
CyberNexus discovers injectable surfaces on a page (query parameters and
form fields), sends crafted payloads against them and classifies what comes
back.

SCAN TYPES:
  • xss-reflected  Reflected XSS, context-aware (script, event handler,
                   attribute, HTML, header)
  • xss-dom        Static DOM source/sink analysis plus DOM payload probes
  • xss-stored     Marker payloads through data-storing forms, re-checked
                   on the origin page and up to 3 linked content pages
  • xss-all        All three XSS scanners
  • clickjacking   X-Frame-Options / CSP frame-ancestors
  • lfi            Path traversal signatures via file=
  • ssrf           Loopback / metadata signatures via url=

Requests to a target are strictly sequential and paced by --delay
(capped at one hour). Every request times out after 10 seconds."#,
    after_help = r#"EXAMPLES:
  cybernexus scan -u "https://example.com/search?q=test" -t xss-reflected
  cybernexus scan -u https://example.com/blog -t xss-stored -t clickjacking -d 1
  cybernexus scan -u https://example.com --all -f html -o report.html
  cybernexus profile-scan --file profile.json -o results.json
  cybernexus profile create -n quick -t xss-all clickjacking
  cybernexus profile run -n quick -u https://example.com
  cybernexus list"#
)]
pub struct Cli {
    // ═══════════════════════════════════════════════════════════════════
    // OUTPUT & REPORTING
    // ═══════════════════════════════════════════════════════════════════
    /// Show payload-by-payload progress and probe errors
    #[arg(short, long, global = true, help_heading = "OUTPUT & REPORTING")]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, help_heading = "OUTPUT & REPORTING")]
    pub quiet: bool,

    /// Save the report to a file
    #[arg(short, long, global = true, help_heading = "OUTPUT & REPORTING")]
    pub output: Option<PathBuf>,

    /// Report file format
    #[arg(
        short,
        long,
        value_enum,
        default_value_t = ReportFormat::Json,
        global = true,
        help_heading = "OUTPUT & REPORTING"
    )]
    pub format: ReportFormat,

    /// Don't display the banner
    #[arg(long = "no-banner", global = true, help_heading = "OUTPUT & REPORTING")]
    pub no_banner: bool,

    // ═══════════════════════════════════════════════════════════════════
    // RATE LIMITING
    // ═══════════════════════════════════════════════════════════════════
    /// Seconds between consecutive requests
    #[arg(
        short,
        long,
        default_value_t = 0.5,
        global = true,
        help_heading = "RATE LIMITING"
    )]
    pub delay: f64,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan one URL
    Scan(ScanArgs),
    /// List scan types and registered plugins
    List,
}

#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Target URL (e.g. https://example.com/search?q=test)
    #[arg(short, long)]
    pub url: String,

    /// Scan type(s) to run
    #[arg(
        short = 't',
        long = "type",
        value_enum,
        required_unless_present = "all",
        conflicts_with = "all"
    )]
    pub types: Vec<ScanSelector>,

    /// Run every scan type
    #[arg(long)]
    pub all: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Json,
    Html,
    Txt,
}

impl ReportFormat {
    pub fn render(&self, reports: &[ScanReport]) -> anyhow::Result<String> {
        Ok(match self {
            ReportFormat::Json => json::render(reports)?,
            ReportFormat::Html => html::render(reports),
            ReportFormat::Txt => text::render(reports),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_scan_arguments() {
        let cli = Cli::try_parse_from([
            "cybernexus",
            "-d",
            "1.5",
            "scan",
            "-u",
            "http://t.test/",
            "-t",
            "xss",
            "-t",
            "lfi",
            "-f",
            "html",
        ])
        .unwrap();
        assert_eq!(cli.delay, 1.5);
        assert_eq!(cli.format, ReportFormat::Html);
        match cli.command {
            Some(Commands::Scan(args)) => {
                assert_eq!(args.url, "http://t.test/");
                assert_eq!(args.types, vec![ScanSelector::XssReflected, ScanSelector::Lfi]);
                assert!(!args.all);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_scan_requires_types_or_all() {
        assert!(Cli::try_parse_from(["cybernexus", "scan", "-u", "http://t.test/"]).is_err());
        assert!(Cli::try_parse_from([
            "cybernexus", "scan", "-u", "http://t.test/", "--all", "-t", "lfi"
        ])
        .is_err());
        assert!(Cli::try_parse_from(["cybernexus", "scan", "-u", "http://t.test/", "--all"]).is_ok());
    }
}
