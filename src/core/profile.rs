//! Scan plans and the JSON profile format

use crate::core::capability::{ScanSelector, ScanType};
use crate::core::context::ScanJob;
use anyhow::Context as _;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_PROFILE_DIR: &str = "profiles";

/// Concrete, deduplicated scan types in first-requested order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScanPlan {
    types: Vec<ScanType>,
}

impl ScanPlan {
    pub fn from_selectors<I>(selectors: I) -> Self
    where
        I: IntoIterator<Item = ScanSelector>,
    {
        let mut plan = Self::default();
        for selector in selectors {
            for t in selector.expand() {
                plan.push(t);
            }
        }
        plan
    }

    /// Every scanner.
    pub fn all() -> Self {
        Self {
            types: ScanType::ALL.to_vec(),
        }
    }

    fn push(&mut self, t: ScanType) {
        if !self.types.contains(&t) {
            self.types.push(t);
        }
    }

    pub fn types(&self) -> &[ScanType] {
        &self.types
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// `{"targets": [{"url": "...", "scan": ["xss-all", "lfi"]}]}`
#[derive(Debug, Deserialize)]
pub struct ProfileFile {
    pub targets: Vec<ProfileTarget>,
}

#[derive(Debug, Deserialize)]
pub struct ProfileTarget {
    pub url: String,
    #[serde(default)]
    pub scan: Vec<ScanSelector>,
}

impl ProfileFile {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read profile {}", path.display()))?;
        Self::parse(&raw).with_context(|| format!("Invalid profile {}", path.display()))
    }

    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        let profile: ProfileFile = serde_json::from_str(raw)?;
        if profile.targets.is_empty() {
            anyhow::bail!("profile has no targets");
        }
        Ok(profile)
    }

    pub fn into_jobs(self) -> Vec<ScanJob> {
        self.targets
            .into_iter()
            .map(|t| ScanJob::new(t.url, ScanPlan::from_selectors(t.scan)))
            .collect()
    }
}

/// A saved, named set of scan types: `<dir>/<name>.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedProfile {
    pub name: String,
    pub scan_types: Vec<ScanType>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl NamedProfile {
    pub fn new(name: &str, selectors: &[ScanSelector]) -> anyhow::Result<Self> {
        let plan = ScanPlan::from_selectors(selectors.iter().copied());
        if plan.is_empty() {
            anyhow::bail!("profile '{}' needs at least one scan type", name);
        }
        Ok(Self {
            name: name.to_string(),
            scan_types: plan.types().to_vec(),
            created_at: Some(chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()),
        })
    }

    pub fn job(&self, target: &str) -> ScanJob {
        ScanJob::new(
            target,
            ScanPlan {
                types: self.scan_types.clone(),
            },
        )
    }
}

/// Directory of named profiles.
#[derive(Debug, Clone)]
pub struct ProfileStore {
    dir: PathBuf,
}

impl ProfileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, name: &str) -> anyhow::Result<PathBuf> {
        let valid = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            anyhow::bail!(
                "invalid profile name '{}' (use letters, digits, '-' and '_')",
                name
            );
        }
        Ok(self.dir.join(format!("{}.json", name)))
    }

    pub fn save(&self, profile: &NamedProfile) -> anyhow::Result<PathBuf> {
        let path = self.path_for(&profile.name)?;
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create {}", self.dir.display()))?;
        let raw = serde_json::to_string_pretty(profile)?;
        std::fs::write(&path, raw)
            .with_context(|| format!("Failed to write profile {}", path.display()))?;
        Ok(path)
    }

    pub fn load(&self, name: &str) -> anyhow::Result<NamedProfile> {
        let path = self.path_for(name)?;
        if !path.exists() {
            anyhow::bail!("profile '{}' not found", name);
        }
        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read profile {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("Invalid profile {}", path.display()))
    }

    /// Profiles sorted by name. Unreadable files are skipped. A missing
    /// directory lists as empty.
    pub fn list(&self) -> anyhow::Result<Vec<NamedProfile>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let entries = std::fs::read_dir(&self.dir)
            .with_context(|| format!("Failed to read {}", self.dir.display()))?;

        let mut profiles = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            match self.load(name) {
                Ok(profile) => profiles.push(profile),
                Err(e) => tracing::warn!("Skipping profile {}: {:#}", path.display(), e),
            }
        }
        profiles.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(profiles)
    }

    pub fn delete(&self, name: &str) -> anyhow::Result<()> {
        let path = self.path_for(name)?;
        if !path.exists() {
            anyhow::bail!("profile '{}' not found", name);
        }
        std::fs::remove_file(&path)
            .with_context(|| format!("Failed to delete profile {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store(tag: &str) -> ProfileStore {
        let dir = std::env::temp_dir().join(format!(
            "cybernexus-store-{}-{}",
            tag,
            std::process::id()
        ));
        std::fs::remove_dir_all(&dir).ok();
        ProfileStore::new(dir)
    }

    #[test]
    fn test_plan_dedups_and_keeps_order() {
        let plan = ScanPlan::from_selectors([
            ScanSelector::Lfi,
            ScanSelector::XssDom,
            ScanSelector::XssAll,
            ScanSelector::Lfi,
        ]);
        assert_eq!(
            plan.types(),
            &[
                ScanType::Lfi,
                ScanType::XssDom,
                ScanType::XssReflected,
                ScanType::XssStored
            ]
        );
    }

    #[test]
    fn test_parse_profile_into_jobs() {
        let raw = r#"{
            "targets": [
                {"url": "http://a.test/", "scan": ["xss", "clickjacking"]},
                {"url": "http://b.test/?file=x", "scan": ["lfi", "ssrf"]}
            ]
        }"#;
        let jobs = ProfileFile::parse(raw).unwrap().into_jobs();
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].target, "http://a.test/");
        assert_eq!(
            jobs[0].plan.types(),
            &[ScanType::XssReflected, ScanType::Clickjacking]
        );
        assert_eq!(jobs[1].plan.types(), &[ScanType::Lfi, ScanType::Ssrf]);
    }

    #[test]
    fn test_unknown_scan_type_is_rejected() {
        let raw = r#"{"targets": [{"url": "http://a.test/", "scan": ["sqli"]}]}"#;
        assert!(ProfileFile::parse(raw).is_err());
    }

    #[test]
    fn test_empty_profile_is_rejected() {
        assert!(ProfileFile::parse(r#"{"targets": []}"#).is_err());
    }

    #[test]
    fn test_store_save_load_list_delete() {
        let store = temp_store("crud");
        assert!(store.list().unwrap().is_empty());

        let quick = NamedProfile::new("quick", &[ScanSelector::XssAll, ScanSelector::Lfi]).unwrap();
        let headers = NamedProfile::new("headers", &[ScanSelector::Clickjacking]).unwrap();
        store.save(&quick).unwrap();
        store.save(&headers).unwrap();

        let loaded = store.load("quick").unwrap();
        assert_eq!(loaded, quick);
        assert_eq!(
            loaded.scan_types,
            vec![
                ScanType::XssReflected,
                ScanType::XssDom,
                ScanType::XssStored,
                ScanType::Lfi
            ]
        );

        let names: Vec<String> = store.list().unwrap().into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["headers".to_string(), "quick".to_string()]);

        store.delete("quick").unwrap();
        assert!(store.load("quick").is_err());
        assert!(store.delete("quick").is_err());
        assert_eq!(store.list().unwrap().len(), 1);

        std::fs::remove_dir_all(&store.dir).ok();
    }

    #[test]
    fn test_store_rejects_path_like_names() {
        let store = temp_store("names");
        let profile = NamedProfile {
            name: "../escape".to_string(),
            scan_types: vec![ScanType::Lfi],
            created_at: None,
        };
        assert!(store.save(&profile).is_err());
        assert!(store.load("a/b").is_err());
        assert!(store.delete("").is_err());
    }

    #[test]
    fn test_named_profile_needs_scan_types() {
        assert!(NamedProfile::new("empty", &[]).is_err());
    }

    #[test]
    fn test_named_profile_job_keeps_order() {
        let profile = NamedProfile::new("p", &[ScanSelector::Ssrf, ScanSelector::XssDom]).unwrap();
        let job = profile.job("http://t.test/");
        assert_eq!(job.target, "http://t.test/");
        assert_eq!(job.plan.types(), &[ScanType::Ssrf, ScanType::XssDom]);
    }
}
