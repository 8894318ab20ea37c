mod cli;
mod core;
mod error;
mod http;
mod inspect;
mod payload;
mod reporting;
mod scanner;
mod xss;

use crate::cli::args::{Cli, Commands};
use crate::core::cancel::CancelFlag;
use crate::core::capability::ScanType;
use crate::core::context::{ScanJob, ScanOptions};
use crate::core::engine::Engine;
use crate::core::profile::ScanPlan;
use crate::core::registry::{PluginOutcome, PluginRegistry};
use crate::core::sink::SilentSink;
use crate::reporting::text;
use anyhow::Context as _;
use clap::{CommandFactory, FromArgMatches};
use std::env;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const BANNER: &str = r#"
 ╔════════════════════════════════════════════════════════════════════╗
 ║                                                                    ║
 ║    ██████╗██╗   ██╗██████╗ ███████╗██████╗                         ║
 ║   ██╔════╝╚██╗ ██╔╝██╔══██╗██╔════╝██╔══██╗                        ║
 ║   ██║      ╚████╔╝ ██████╔╝█████╗  ██████╔╝                        ║
 ║   ██║       ╚██╔╝  ██╔══██╗██╔══╝  ██╔══██╗                        ║
 ║   ╚██████╗   ██║   ██████╔╝███████╗██║  ██║   N E X U S            ║
 ║    ╚═════╝   ╚═╝   ╚═════╝ ╚══════╝╚═╝  ╚═╝                        ║
 ║                                                                    ║
 ║    Multi-vector Web Vulnerability Scanner                          ║
 ║    XSS (reflected / DOM / stored) · Clickjacking · LFI · SSRF      ║
 ║                                                                    ║
 ╚════════════════════════════════════════════════════════════════════╝
"#;

fn print_banner() {
    println!("\x1b[36m{}\x1b[0m", BANNER); // Cyan color
}

fn init_tracing(cli: &Cli) {
    let level = if cli.quiet {
        "error"
    } else if cli.verbose {
        "warn,cybernexus=debug"
    } else {
        "warn,cybernexus=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn print_list(registry: &PluginRegistry) {
    println!("Scan types:");
    for t in ScanType::ALL {
        println!("  {:<15} {}", t.as_str(), t.description());
    }
    println!("  {:<15} {}", "xss-all", "xss-reflected, xss-dom and xss-stored");
    println!("\nPlugins:");
    for plugin in registry.plugins() {
        println!("  {:<15} {}", plugin.name(), plugin.about());
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();

    // Banner goes above clap's own help/version output
    let show_help = args.iter().any(|a| a == "--help" || a == "-h");
    let show_version = args.iter().any(|a| a == "--version" || a == "-V");
    let no_banner = args.iter().any(|a| a == "--no-banner");
    if (show_help || show_version) && !no_banner {
        print_banner();
    }

    let registry = PluginRegistry::builtin();
    let mut command = registry.augment(Cli::command());
    let matches = command.clone().get_matches();
    let cli = match Cli::from_arg_matches(&matches) {
        Ok(cli) => cli,
        Err(e) => e.exit(),
    };

    // Show banner for normal runs unless --no-banner or --quiet
    if !cli.no_banner && !cli.quiet {
        print_banner();
    }

    init_tracing(&cli);

    let jobs = match (&cli.command, matches.subcommand()) {
        (Some(Commands::List), _) => {
            print_list(&registry);
            return Ok(());
        }
        (Some(Commands::Scan(scan)), _) => {
            let plan = if scan.all {
                ScanPlan::all()
            } else {
                ScanPlan::from_selectors(scan.types.iter().copied())
            };
            vec![ScanJob::new(scan.url.clone(), plan)]
        }
        (None, Some((name, sub))) => match registry.find(name) {
            Some(plugin) => match plugin.execute(sub)? {
                PluginOutcome::Jobs(jobs) => jobs,
                PluginOutcome::Done(message) => {
                    if !cli.quiet {
                        println!("{}", message);
                    }
                    return Ok(());
                }
            },
            None => anyhow::bail!("unknown command '{}'", name),
        },
        (None, None) => {
            command.print_help()?;
            println!();
            return Ok(());
        }
    };

    let cancel = CancelFlag::new();
    cancel.listen_for_interrupt();

    let mut opts = ScanOptions::new(cli.verbose, cli.delay).with_cancel(cancel);
    if cli.quiet {
        opts = opts.with_sink(Arc::new(SilentSink));
    }

    let aggregator = Engine::new(opts).run(jobs).await;
    let reports = aggregator.reports();

    if !cli.quiet {
        println!("{}", text::render(reports));
    }

    if let Some(path) = &cli.output {
        let rendered = cli.format.render(reports)?;
        std::fs::write(path, rendered)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        if !cli.quiet {
            println!("📄 Report saved to: {}", path.display());
        }
    }

    Ok(())
}
