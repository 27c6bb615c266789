use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::paths::{resolve_home_dir, resolve_under};

/// Main application configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Directory holding local storage and logs; normalized to an absolute path on load.
    #[serde(default)]
    pub home_dir: String,
    /// Key-value storage backing the snapshot, session token and verification marker.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Portal behavior: storage keys and validation limits.
    #[serde(default)]
    pub portal: PortalSection,
    /// Per-subsystem log sinks; built-in defaults apply when absent.
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// JSON file on disk, survives across process runs.
    #[default]
    File,
    /// Process-local map, discarded on exit.
    Memory,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    /// Storage file, relative paths resolve against `home_dir`.
    #[serde(default = "default_storage_path")]
    pub path: String,
    /// Upper bound on the total stored bytes; writes beyond it fail.
    #[serde(default)]
    pub quota_bytes: Option<usize>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PortalSection {
    #[serde(default = "default_snapshot_key")]
    pub snapshot_key: String,
    #[serde(default = "default_session_key")]
    pub session_key: String,
    #[serde(default = "default_unverified_key")]
    pub unverified_key: String,
    #[serde(default = "default_min_password_length")]
    pub min_password_length: usize,
}

/// Subsystem (tracing target prefix) to sink settings. The `default` entry covers
/// every target without its own entry and names the log file.
pub type LoggingConfig = HashMap<String, Section>;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Section {
    /// trace | debug | info | warn | error | off
    pub console_level: String,
    #[serde(default)]
    pub file: String, // "logs/hr_portal.log"
    #[serde(default)]
    pub file_level: String,
    #[serde(default)]
    pub max_size_mb: Option<u64>,
    /// Rotated files kept next to the active log.
    #[serde(default)]
    pub max_backups: Option<usize>,
}

fn default_storage_path() -> String {
    "storage/local_storage.json".to_string()
}

fn default_snapshot_key() -> String {
    "ipt_demo_v1".to_string()
}

fn default_session_key() -> String {
    "auth_token".to_string()
}

fn default_unverified_key() -> String {
    "unverified_email".to_string()
}

fn default_min_password_length() -> usize {
    6
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::File,
            path: default_storage_path(),
            quota_bytes: None,
        }
    }
}

impl Default for PortalSection {
    fn default() -> Self {
        Self {
            snapshot_key: default_snapshot_key(),
            session_key: default_session_key(),
            unverified_key: default_unverified_key(),
            min_password_length: default_min_password_length(),
        }
    }
}

/// Warnings on the console, debug and up into `logs/hr_portal.log`.
pub fn default_logging_config() -> LoggingConfig {
    let mut logging = HashMap::new();
    logging.insert(
        "default".to_string(),
        Section {
            console_level: "warn".to_string(),
            file: "logs/hr_portal.log".to_string(),
            file_level: "debug".to_string(),
            max_size_mb: Some(10),
            max_backups: Some(3),
        },
    );
    logging
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            home_dir: String::new(),
            storage: StorageConfig::default(),
            portal: PortalSection::default(),
            logging: Some(default_logging_config()),
        }
    }
}

impl AppConfig {
    /// Load configuration with layered loading: defaults → YAML file → environment variables.
    /// Also normalizes `home_dir` into an absolute path and creates the directory.
    pub fn load_layered<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        use figment::{
            providers::{Env, Format, Serialized, Yaml},
            Figment,
        };

        let path = config_path.as_ref();
        if !path.is_file() {
            bail!("config file not found: {}", path.display());
        }

        // Logging stays None unless YAML/ENV provide it.
        let base = AppConfig {
            logging: None,
            ..AppConfig::default()
        };

        let figment = Figment::new()
            .merge(Serialized::defaults(base))
            .merge(Yaml::file(path))
            // Example: APP__STORAGE__PATH=/tmp/ls.json maps to storage.path
            .merge(Env::prefixed("APP__").split("__"));

        let mut config: AppConfig = figment
            .extract()
            .with_context(|| format!("Failed to parse yaml config {}", path.display()))?;

        config.normalize_home_dir()?;
        Ok(config)
    }

    /// Layered load when a path is given, built-in defaults otherwise.
    pub fn load_or_default<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_layered(path),
            None => {
                let mut c = Self::default();
                c.normalize_home_dir()
                    .context("Failed to resolve home_dir (defaults)")?;
                Ok(c)
            }
        }
    }

    /// Effective configuration as YAML (`--print-config`, `check`).
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize config to YAML")
    }

    /// Absolute path of the storage file.
    pub fn storage_path(&self) -> PathBuf {
        resolve_under(&self.storage.path, Path::new(&self.home_dir))
    }

    /// Command line flags win over file and environment.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(storage) = &args.storage {
            self.storage.path = storage.clone();
        }
        if args.memory {
            self.storage.backend = StorageBackend::Memory;
        }

        let logging = self.logging.get_or_insert_with(default_logging_config);
        if let Some(default_section) = logging.get_mut("default") {
            default_section.console_level = match args.verbose {
                0 => default_section.console_level.clone(),
                1 => "info".to_string(),
                2 => "debug".to_string(),
                _ => "trace".to_string(),
            };
        }
    }

    fn normalize_home_dir(&mut self) -> Result<()> {
        let opt = if self.home_dir.trim().is_empty() {
            None
        } else {
            Some(self.home_dir.clone())
        };

        let resolved = resolve_home_dir(opt, default_subdir(), true)
            .context("home_dir normalization failed")?;
        self.home_dir = resolved.to_string_lossy().to_string();
        Ok(())
    }
}

/// Flags the host binary forwards into configuration.
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    pub config: Option<String>,
    pub storage: Option<String>,
    pub memory: bool,
    pub print_config: bool,
    pub verbose: u8,
}

const fn default_subdir() -> &'static str {
    ".hr_portal"
}
