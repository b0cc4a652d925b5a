use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use zine_curator_core::classify::{Policy, PolicyTables};
use zine_curator_core::prune::{PruneRules, ERA_START};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub store: StoreConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
    #[serde(default)]
    pub prune: PruneConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    pub path: PathBuf,
    #[serde(default = "default_backup_dir")]
    pub backup_dir: PathBuf,
    /// Base directory for relative image paths. Defaults to the store
    /// file's parent directory.
    #[serde(default)]
    pub image_root: Option<PathBuf>,
}

fn default_backup_dir() -> PathBuf {
    PathBuf::from("backups")
}

fn default_store_path() -> PathBuf {
    PathBuf::from("punk_zines_database.json")
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ClassifierConfig {
    #[serde(default)]
    pub extra_series: Vec<String>,
    #[serde(default)]
    pub extra_positive: Vec<String>,
    #[serde(default)]
    pub extra_negative: Vec<String>,
    #[serde(default)]
    pub use_tags: bool,
}

/// False-positive screening of classifier-accepted records.
#[derive(Debug, Deserialize, Clone)]
pub struct PruneConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_era_start")]
    pub era_start: Option<i64>,
    #[serde(default)]
    pub era_end: Option<i64>,
    #[serde(default)]
    pub extra_phrases: Vec<String>,
    #[serde(default)]
    pub extra_title_exclusions: Vec<String>,
}

impl Default for PruneConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            era_start: default_era_start(),
            era_end: None,
            extra_phrases: Vec::new(),
            extra_title_exclusions: Vec::new(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_era_start() -> Option<i64> {
    Some(ERA_START)
}

impl Config {
    /// Defaults used when no config file exists at the default location.
    pub fn minimal() -> Self {
        Self {
            store: StoreConfig {
                path: default_store_path(),
                backup_dir: default_backup_dir(),
                image_root: None,
            },
            classifier: ClassifierConfig::default(),
            prune: PruneConfig::default(),
        }
    }

    /// Directory relative image paths resolve against.
    pub fn image_root(&self) -> PathBuf {
        match &self.store.image_root {
            Some(root) => root.clone(),
            None => self
                .store
                .path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default(),
        }
    }

    /// The classification policy: built-in tables plus configured extras.
    pub fn policy(&self) -> Policy {
        let mut tables = PolicyTables::standard();
        tables.series.extend(self.classifier.extra_series.iter().cloned());
        tables.positive.extend(self.classifier.extra_positive.iter().cloned());
        tables.negative.extend(self.classifier.extra_negative.iter().cloned());
        tables.use_tags = self.classifier.use_tags;
        Policy::from_tables(tables)
    }

    /// Screening rules; configured extra series are also protected here.
    pub fn prune_rules(&self) -> PruneRules {
        if !self.prune.enabled {
            return PruneRules::none();
        }
        PruneRules::standard()
            .with_known_good(self.classifier.extra_series.iter().cloned())
            .with_phrases(self.prune.extra_phrases.iter().cloned())
            .with_title_exclusions(self.prune.extra_title_exclusions.iter().cloned())
            .with_era(self.prune.era_start, self.prune.era_end)
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    validate(&config)?;
    Ok(config)
}

/// Load `path`, or fall back to [`Config::minimal`] when `path` is the
/// default location and nothing is there.
pub fn load_or_default(path: &Path, is_default_path: bool) -> Result<Config> {
    if is_default_path && !path.exists() {
        return Ok(Config::minimal());
    }
    load_config(path)
}

fn validate(config: &Config) -> Result<()> {
    if config.store.path.as_os_str().is_empty() {
        bail!("store.path must not be empty");
    }

    let lists = [
        ("classifier.extra_series", &config.classifier.extra_series),
        ("classifier.extra_positive", &config.classifier.extra_positive),
        ("classifier.extra_negative", &config.classifier.extra_negative),
        ("prune.extra_phrases", &config.prune.extra_phrases),
        ("prune.extra_title_exclusions", &config.prune.extra_title_exclusions),
    ];
    for (name, tokens) in lists {
        if tokens.iter().any(|t| t.trim().is_empty()) {
            bail!("{} must not contain blank entries", name);
        }
    }

    if let (Some(start), Some(end)) = (config.prune.era_start, config.prune.era_end) {
        if start > end {
            bail!("prune.era_start ({}) is after prune.era_end ({})", start, end);
        }
    }

    Ok(())
}
