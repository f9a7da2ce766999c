//! Configuration for hcmirror.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (ZENDESK_DOMAIN, ZENDESK_USER, ZENDESK_TOKEN,
//!    HCMIRROR_BACKUP_FOLDER, HCMIRROR_LANGUAGE)
//! 2. Config file (.hcmirror/config.yaml)
//! 3. Defaults (backups_md, en-us, 30s request timeout)
//!
//! Config file discovery:
//! - Searches current directory and parents for .hcmirror/config.yaml
//! - A relative backup_folder is resolved against the config file's project root
//!
//! Credentials are never read from the config file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

pub const ENV_DOMAIN: &str = "ZENDESK_DOMAIN";
pub const ENV_USER: &str = "ZENDESK_USER";
pub const ENV_TOKEN: &str = "ZENDESK_TOKEN";
pub const ENV_BACKUP_FOLDER: &str = "HCMIRROR_BACKUP_FOLDER";
pub const ENV_LANGUAGE: &str = "HCMIRROR_LANGUAGE";

pub const DEFAULT_BACKUP_FOLDER: &str = "backups_md";
pub const DEFAULT_LANGUAGE: &str = "en-us";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variables: {}", .0.join(", "))]
    MissingCredentials(Vec<&'static str>),
}

/// API credentials and help-center domain
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Host name, e.g. `example.zendesk.com`
    pub domain: String,
    /// Agent email address
    pub user: String,
    /// API token
    pub token: String,
}

impl Credentials {
    /// Read credentials from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read credentials through an arbitrary lookup (empty values count as missing)
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let domain = get(ENV_DOMAIN);
        let user = get(ENV_USER);
        let token = get(ENV_TOKEN);

        match (domain, user, token) {
            (Some(domain), Some(user), Some(token)) => Ok(Self {
                domain,
                user,
                token,
            }),
            (domain, user, token) => {
                let mut missing = Vec::new();
                if domain.is_none() {
                    missing.push(ENV_DOMAIN);
                }
                if user.is_none() {
                    missing.push(ENV_USER);
                }
                if token.is_none() {
                    missing.push(ENV_TOKEN);
                }
                Err(ConfigError::MissingCredentials(missing))
            }
        }
    }

    /// Base URL of the help center
    pub fn base_url(&self) -> String {
        let domain = self.domain.trim().trim_end_matches('/');
        if domain.starts_with("http://") || domain.starts_with("https://") {
            domain.to_string()
        } else {
            format!("https://{}", domain)
        }
    }
}

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub version: Option<String>,
    pub backup_folder: Option<String>,
    pub language: Option<String>,
    pub request_timeout_seconds: Option<u64>,
}

/// Settings resolved from env, config file and defaults
#[derive(Debug, Clone)]
pub struct Settings {
    pub backup_folder: PathBuf,
    pub language: String,
    pub request_timeout: Duration,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            backup_folder: PathBuf::from(DEFAULT_BACKUP_FOLDER),
            language: DEFAULT_LANGUAGE.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECONDS),
            config_file: None,
        }
    }
}

/// Everything the backup pipeline needs besides the API client
#[derive(Debug, Clone)]
pub struct BackupConfig {
    /// Root of all backups
    pub backup_folder: PathBuf,
    /// Help-center locale, e.g. `en-us`
    pub language: String,
    /// Put articles directly under category folders
    pub flatten_sections: bool,
    /// Optional JSON5 ignore file
    pub ignore_file: Option<PathBuf>,
    /// Date stamp of this run
    pub run_date: NaiveDate,
}

impl BackupConfig {
    /// Build a config for today's UTC date
    pub fn new(settings: &Settings, flatten_sections: bool, ignore_file: Option<PathBuf>) -> Self {
        Self {
            backup_folder: settings.backup_folder.clone(),
            language: settings.language.clone(),
            flatten_sections,
            ignore_file,
            run_date: Utc::now().date_naive(),
        }
    }

    /// `<backup-folder>/<run-date>/<language>`
    pub fn base_run_path(&self) -> PathBuf {
        self.backup_folder
            .join(self.run_date.format("%Y-%m-%d").to_string())
            .join(&self.language)
    }
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(".hcmirror").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Merge env overrides, an optional config file and defaults
fn resolve_settings<F>(config_file: Option<(PathBuf, ConfigFile)>, env: F) -> Settings
where
    F: Fn(&str) -> Option<String>,
{
    let mut settings = Settings::default();

    if let Some((path, file)) = config_file {
        // Project root is the parent of .hcmirror/
        let base_dir = path
            .parent()
            .and_then(|p| p.parent())
            .unwrap_or(Path::new("."))
            .to_path_buf();

        if let Some(folder) = file.backup_folder {
            let folder = PathBuf::from(folder);
            settings.backup_folder = if folder.is_absolute() {
                folder
            } else {
                base_dir.join(folder)
            };
        }
        if let Some(language) = file.language {
            settings.language = language;
        }
        if let Some(seconds) = file.request_timeout_seconds {
            settings.request_timeout = Duration::from_secs(seconds);
        }
        settings.config_file = Some(path);
    }

    if let Some(folder) = env(ENV_BACKUP_FOLDER).filter(|v| !v.is_empty()) {
        settings.backup_folder = PathBuf::from(folder);
    }
    if let Some(language) = env(ENV_LANGUAGE).filter(|v| !v.is_empty()) {
        settings.language = language;
    }

    settings
}

/// Load settings from all sources
pub fn load_settings() -> Result<Settings> {
    let config_file = match find_config_file() {
        Some(path) => {
            let file = load_config_file(&path)?;
            Some((path, file))
        }
        None => None,
    };

    let settings = resolve_settings(config_file, |key| std::env::var(key).ok());
    match &settings.config_file {
        Some(path) => info!(path = %path.display(), "Loaded config file"),
        None => debug!("No config file found, using defaults"),
    }
    debug!(
        backup_folder = %settings.backup_folder.display(),
        language = %settings.language,
        "Resolved settings"
    );
    Ok(settings)
}
