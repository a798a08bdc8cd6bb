//! Runtime configuration.
//!
//! Values resolve in order: command line, environment (including a `.env`
//! file), files in `~/.scanner_utils`, built-in defaults.

use crate::ai::client::{DEFAULT_MODEL, OPENAI_API_URL};
use crate::ai::credentials::CredentialManager;
use crate::ai::http_client::DEFAULT_REQUEST_TIMEOUT;
use crate::ai::prompts::DEFAULT_MAX_DOCUMENT_CHARS;
use crate::exemplars::DEFAULT_EXEMPLAR_CAP;
use crate::scanner::DEFAULT_PROFILE;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const ROOT_ENV: &str = "FILER_DOCUMENT_ROOT";
pub const CAP_ENV: &str = "FILER_EXEMPLAR_CAP";
pub const MODEL_ENV: &str = "FILER_MODEL";
pub const BASE_URL_ENV: &str = "OPENAI_BASE_URL";
pub const TIMEOUT_ENV: &str = "FILER_TIMEOUT_SECS";
pub const MAX_CHARS_ENV: &str = "FILER_MAX_DOCUMENT_CHARS";
pub const PROFILE_ENV: &str = "FILER_SCANNER_PROFILE";

/// Settings file holding the document root path
pub const ROOT_FILE_NAME: &str = "root";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("No document root configured. Pass --root, set {ROOT_ENV} or write the path to ~/.scanner_utils/{ROOT_FILE_NAME}")]
    MissingRoot,

    #[error("Document root does not exist: {}", .0.display())]
    RootNotFound(PathBuf),

    #[error("Invalid value for {name}: {value:?}")]
    InvalidValue { name: &'static str, value: String },

    #[error("Exemplar cap must be at least 1")]
    ZeroCap,
}

/// Values given explicitly on the command line
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub document_root: Option<PathBuf>,
    pub exemplar_cap: Option<usize>,
    pub model: Option<String>,
    pub scanner_profile: Option<String>,
    pub fail_fast: bool,
    pub dry_run: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilerConfig {
    /// Root folder holding the category tree
    pub document_root: PathBuf,
    /// Exemplars shown per category
    pub exemplar_cap: usize,
    pub model: String,
    pub api_base_url: String,
    pub request_timeout: Duration,
    /// Character budget for the document text in the prompt
    pub max_document_chars: usize,
    pub scanner_profile: String,
    /// Stop the batch at the first failed document
    pub fail_fast: bool,
    /// Classify and report without moving anything
    pub dry_run: bool,
}

impl FilerConfig {
    /// Resolve from the process environment and `~/.scanner_utils`
    pub fn load(overrides: ConfigOverrides) -> Result<Self, ConfigError> {
        let settings_dir = CredentialManager::settings_dir();
        Self::resolve(overrides, |name| std::env::var(name).ok(), settings_dir.as_deref())
    }

    /// Resolve with an explicit environment lookup
    pub fn resolve<F>(
        overrides: ConfigOverrides,
        env: F,
        settings_dir: Option<&Path>,
    ) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = |name: &str| env(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let document_root = overrides
            .document_root
            .or_else(|| env(ROOT_ENV).map(PathBuf::from))
            .or_else(|| settings_dir.and_then(read_root_file))
            .ok_or(ConfigError::MissingRoot)?;

        if !document_root.is_dir() {
            return Err(ConfigError::RootNotFound(document_root));
        }

        let exemplar_cap = match overrides.exemplar_cap {
            Some(cap) => cap,
            None => parse_env(&env, CAP_ENV)?.unwrap_or(DEFAULT_EXEMPLAR_CAP),
        };
        if exemplar_cap == 0 {
            return Err(ConfigError::ZeroCap);
        }

        let request_timeout = parse_env::<u64, _>(&env, TIMEOUT_ENV)?
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT);

        let max_document_chars =
            parse_env(&env, MAX_CHARS_ENV)?.unwrap_or(DEFAULT_MAX_DOCUMENT_CHARS);

        Ok(Self {
            document_root,
            exemplar_cap,
            model: overrides
                .model
                .or_else(|| env(MODEL_ENV))
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            api_base_url: env(BASE_URL_ENV).unwrap_or_else(|| OPENAI_API_URL.to_string()),
            request_timeout,
            max_document_chars,
            scanner_profile: overrides
                .scanner_profile
                .or_else(|| env(PROFILE_ENV))
                .unwrap_or_else(|| DEFAULT_PROFILE.to_string()),
            fail_fast: overrides.fail_fast,
            dry_run: overrides.dry_run,
        })
    }
}

fn parse_env<T, F>(env: &F, name: &'static str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match env(name) {
        None => Ok(None),
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { name, value }),
    }
}

/// Read `<settings_dir>/root`, expanding a leading `~`
fn read_root_file(settings_dir: &Path) -> Option<PathBuf> {
    let contents = std::fs::read_to_string(settings_dir.join(ROOT_FILE_NAME)).ok()?;
    let line = contents.lines().next()?.trim();
    if line.is_empty() {
        return None;
    }

    match line.strip_prefix("~/") {
        Some(rest) => dirs::home_dir().map(|home| home.join(rest)),
        None => Some(PathBuf::from(line)),
    }
}
