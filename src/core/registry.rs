//! Static scanner table and the plugin registry.
//!
//! Plugins are resolved from a fixed list compiled into the binary. Each
//! one contributes a subcommand and either turns its parsed arguments into
//! scan jobs or handles the command itself. Nothing is discovered from the
//! filesystem.

use crate::core::capability::{ScanSelector, ScanType};
use crate::core::context::ScanJob;
use crate::core::profile::{NamedProfile, ProfileFile, ProfileStore, DEFAULT_PROFILE_DIR};
use crate::inspect::clickjacking::ClickjackingScanner;
use crate::inspect::signature::SignatureScanner;
use crate::scanner::Scanner;
use crate::xss::dom::DomXssScanner;
use crate::xss::reflected::ReflectedXssScanner;
use crate::xss::stored::StoredXssScanner;
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;

/// A fresh scanner instance (fresh marker, empty findings) per call.
pub fn scanner_for(scan_type: ScanType) -> Box<dyn Scanner> {
    match scan_type {
        ScanType::XssReflected => Box::new(ReflectedXssScanner::new()),
        ScanType::XssDom => Box::new(DomXssScanner::new()),
        ScanType::XssStored => Box::new(StoredXssScanner::new()),
        ScanType::Clickjacking => Box::new(ClickjackingScanner::new()),
        ScanType::Lfi => Box::new(SignatureScanner::lfi()),
        ScanType::Ssrf => Box::new(SignatureScanner::ssrf()),
    }
}

/// What a plugin made of its subcommand.
#[derive(Debug)]
pub enum PluginOutcome {
    /// Scans for the engine to run.
    Jobs(Vec<ScanJob>),
    /// Handled by the plugin; the message is printed and nothing is scanned.
    Done(String),
}

pub trait Plugin: Send + Sync {
    /// Subcommand name.
    fn name(&self) -> &'static str;

    fn about(&self) -> &'static str;

    /// Add this plugin's subcommand to the top-level command.
    fn register(&self, cmd: Command) -> Command;

    fn execute(&self, matches: &ArgMatches) -> anyhow::Result<PluginOutcome>;
}

/// `profile-scan --file <profile.json>`
pub struct ProfileScanPlugin;

impl Plugin for ProfileScanPlugin {
    fn name(&self) -> &'static str {
        "profile-scan"
    }

    fn about(&self) -> &'static str {
        "Run the targets and scan types listed in a JSON profile"
    }

    fn register(&self, cmd: Command) -> Command {
        cmd.subcommand(
            Command::new(self.name()).about(self.about()).arg(
                Arg::new("file")
                    .long("file")
                    .value_name("PROFILE")
                    .help("Profile file: {\"targets\": [{\"url\": ..., \"scan\": [...]}]}")
                    .value_parser(clap::value_parser!(PathBuf))
                    .required(true),
            ),
        )
    }

    fn execute(&self, matches: &ArgMatches) -> anyhow::Result<PluginOutcome> {
        let Some(path) = matches.get_one::<PathBuf>("file") else {
            anyhow::bail!("profile-scan requires --file");
        };
        Ok(PluginOutcome::Jobs(ProfileFile::load(path)?.into_jobs()))
    }
}

fn name_arg() -> Arg {
    Arg::new("name")
        .short('n')
        .long("name")
        .value_name("NAME")
        .help("Profile name")
        .required(true)
}

/// `profile [--dir DIR] list | create -n NAME -t TYPE.. | run -n NAME -u URL | delete -n NAME`
pub struct ProfilePlugin;

impl ProfilePlugin {
    fn string<'a>(matches: &'a ArgMatches, id: &str) -> anyhow::Result<&'a str> {
        matches
            .get_one::<String>(id)
            .map(String::as_str)
            .ok_or_else(|| anyhow::anyhow!("missing --{}", id))
    }
}

impl Plugin for ProfilePlugin {
    fn name(&self) -> &'static str {
        "profile"
    }

    fn about(&self) -> &'static str {
        "Manage and run saved scan profiles"
    }

    fn register(&self, cmd: Command) -> Command {
        cmd.subcommand(
            Command::new(self.name())
                .about(self.about())
                .subcommand_required(true)
                .arg(
                    Arg::new("dir")
                        .long("dir")
                        .value_name("DIR")
                        .help("Profile directory")
                        .default_value(DEFAULT_PROFILE_DIR)
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .subcommand(Command::new("list").about("List saved profiles"))
                .subcommand(
                    Command::new("create")
                        .about("Save a profile")
                        .arg(name_arg())
                        .arg(
                            Arg::new("types")
                                .short('t')
                                .long("types")
                                .value_name("TYPE")
                                .help("Scan types to include")
                                .num_args(1..)
                                .action(ArgAction::Append)
                                .value_parser(clap::value_parser!(ScanSelector))
                                .required(true),
                        ),
                )
                .subcommand(
                    Command::new("run")
                        .about("Run a saved profile against a URL")
                        .arg(name_arg())
                        .arg(
                            Arg::new("url")
                                .short('u')
                                .long("url")
                                .value_name("URL")
                                .help("Target URL")
                                .required(true),
                        ),
                )
                .subcommand(Command::new("delete").about("Delete a profile").arg(name_arg())),
        )
    }

    fn execute(&self, matches: &ArgMatches) -> anyhow::Result<PluginOutcome> {
        let dir = matches
            .get_one::<PathBuf>("dir")
            .cloned()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PROFILE_DIR));
        let store = ProfileStore::new(dir);

        match matches.subcommand() {
            Some(("list", _)) => {
                let profiles = store.list()?;
                if profiles.is_empty() {
                    return Ok(PluginOutcome::Done("No profiles found".to_string()));
                }
                let lines: Vec<String> = profiles
                    .iter()
                    .map(|p| {
                        let types: Vec<&str> = p.scan_types.iter().map(|t| t.as_str()).collect();
                        format!(
                            "  {:<15} {:<50} {}",
                            p.name,
                            types.join(", "),
                            p.created_at.as_deref().unwrap_or("Unknown")
                        )
                    })
                    .collect();
                Ok(PluginOutcome::Done(format!("Profiles:\n{}", lines.join("\n"))))
            }
            Some(("create", sub)) => {
                let name = Self::string(sub, "name")?;
                let selectors: Vec<ScanSelector> = sub
                    .get_many::<ScanSelector>("types")
                    .map(|v| v.copied().collect())
                    .unwrap_or_default();
                let profile = NamedProfile::new(name, &selectors)?;
                let path = store.save(&profile)?;
                Ok(PluginOutcome::Done(format!(
                    "✓ Profile '{}' saved to {}",
                    name,
                    path.display()
                )))
            }
            Some(("run", sub)) => {
                let profile = store.load(Self::string(sub, "name")?)?;
                let url = Self::string(sub, "url")?;
                Ok(PluginOutcome::Jobs(vec![profile.job(url)]))
            }
            Some(("delete", sub)) => {
                let name = Self::string(sub, "name")?;
                store.delete(name)?;
                Ok(PluginOutcome::Done(format!("✓ Profile '{}' deleted", name)))
            }
            _ => anyhow::bail!("profile requires one of: list, create, run, delete"),
        }
    }
}

pub struct PluginRegistry {
    plugins: Vec<Box<dyn Plugin>>,
}

impl PluginRegistry {
    pub fn builtin() -> Self {
        Self {
            plugins: vec![Box::new(ProfileScanPlugin), Box::new(ProfilePlugin)],
        }
    }

    pub fn augment(&self, cmd: Command) -> Command {
        self.plugins.iter().fold(cmd, |cmd, p| p.register(cmd))
    }

    pub fn find(&self, name: &str) -> Option<&dyn Plugin> {
        self.plugins
            .iter()
            .find(|p| p.name() == name)
            .map(|p| p.as_ref())
    }

    pub fn plugins(&self) -> impl Iterator<Item = &dyn Plugin> {
        self.plugins.iter().map(|p| p.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_scanner_table_covers_every_type() {
        for t in ScanType::ALL {
            assert_eq!(scanner_for(t).scan_type(), t);
        }
    }

    #[test]
    fn test_profile_plugin_builds_jobs() {
        let dir = std::env::temp_dir().join(format!("cybernexus-profile-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("profile.json");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(
            file,
            r#"{{"targets": [{{"url": "http://t.test/", "scan": ["xss-all", "lfi"]}}]}}"#
        )
        .unwrap();

        let registry = PluginRegistry::builtin();
        let cmd = registry.augment(Command::new("cybernexus"));
        let matches = cmd
            .try_get_matches_from([
                "cybernexus",
                "profile-scan",
                "--file",
                path.to_str().unwrap(),
            ])
            .unwrap();
        let (name, sub) = matches.subcommand().unwrap();
        let PluginOutcome::Jobs(jobs) = registry.find(name).unwrap().execute(sub).unwrap() else {
            panic!("profile-scan should produce jobs");
        };

        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].target, "http://t.test/");
        assert_eq!(
            jobs[0].plan.types(),
            &[
                ScanType::XssReflected,
                ScanType::XssDom,
                ScanType::XssStored,
                ScanType::Lfi
            ]
        );
        std::fs::remove_dir_all(&dir).ok();
    }

    fn run_profile(registry: &PluginRegistry, dir: &std::path::Path, args: &[&str]) -> PluginOutcome {
        let cmd = registry.augment(Command::new("cybernexus"));
        let mut argv = vec!["cybernexus", "profile", "--dir", dir.to_str().unwrap()];
        argv.extend_from_slice(args);
        let matches = cmd.try_get_matches_from(argv).unwrap();
        let (name, sub) = matches.subcommand().unwrap();
        registry.find(name).unwrap().execute(sub).unwrap()
    }

    #[test]
    fn test_named_profile_lifecycle() {
        let dir = std::env::temp_dir().join(format!("cybernexus-named-{}", std::process::id()));
        std::fs::remove_dir_all(&dir).ok();
        let registry = PluginRegistry::builtin();

        let PluginOutcome::Done(msg) = run_profile(&registry, &dir, &["list"]) else {
            panic!("list should not scan");
        };
        assert_eq!(msg, "No profiles found");

        let PluginOutcome::Done(msg) = run_profile(
            &registry,
            &dir,
            &["create", "-n", "quick", "-t", "clickjacking", "lfi"],
        ) else {
            panic!("create should not scan");
        };
        assert!(msg.contains("'quick' saved"));

        let PluginOutcome::Done(msg) = run_profile(&registry, &dir, &["list"]) else {
            panic!("list should not scan");
        };
        assert!(msg.contains("quick"));
        assert!(msg.contains("clickjacking, lfi"));

        let PluginOutcome::Jobs(jobs) =
            run_profile(&registry, &dir, &["run", "-n", "quick", "-u", "http://t.test/"])
        else {
            panic!("run should produce jobs");
        };
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].target, "http://t.test/");
        assert_eq!(jobs[0].plan.types(), &[ScanType::Clickjacking, ScanType::Lfi]);

        let PluginOutcome::Done(msg) = run_profile(&registry, &dir, &["delete", "-n", "quick"])
        else {
            panic!("delete should not scan");
        };
        assert!(msg.contains("deleted"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_running_missing_profile_fails() {
        let dir = std::env::temp_dir().join(format!("cybernexus-missing-{}", std::process::id()));
        let registry = PluginRegistry::builtin();
        let cmd = registry.augment(Command::new("cybernexus"));
        let matches = cmd
            .try_get_matches_from([
                "cybernexus",
                "profile",
                "--dir",
                dir.to_str().unwrap(),
                "run",
                "-n",
                "nope",
                "-u",
                "http://t.test/",
            ])
            .unwrap();
        let (name, sub) = matches.subcommand().unwrap();
        assert!(registry.find(name).unwrap().execute(sub).is_err());
    }

    #[test]
    fn test_unknown_plugin_is_none() {
        assert!(PluginRegistry::builtin().find("update-all").is_none());
        assert_eq!(PluginRegistry::builtin().plugins().count(), 2);
    }
}
