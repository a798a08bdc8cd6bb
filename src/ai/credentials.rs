use keyring::Entry;
use std::fs;
use std::path::{Path, PathBuf};

const SERVICE_NAME: &str = "scan-filer";

/// Provider name, also the key file name
pub const OPENAI_PROVIDER: &str = "openai";

/// Environment variable checked first for the API key
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Directory holding the scanner utility settings (`~/.scanner_utils`)
pub const SETTINGS_DIR_NAME: &str = ".scanner_utils";

/// A store of API keys by provider name
pub trait KeyStore {
    fn lookup(&self, provider: &str) -> Option<String>;
}

/// OS keychain (macOS Keychain, Windows Credential Manager, Linux keyutils)
#[derive(Debug, Default, Clone, Copy)]
pub struct Keychain;

impl KeyStore for Keychain {
    fn lookup(&self, provider: &str) -> Option<String> {
        let entry = match Entry::new(SERVICE_NAME, provider) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!("[Credentials] Keychain unavailable: {}", e);
                return None;
            }
        };

        match entry.get_password() {
            Ok(password) => Some(password),
            Err(keyring::Error::NoEntry) => None,
            Err(e) => {
                tracing::warn!("[Credentials] Keychain lookup for {} failed: {}", provider, e);
                None
            }
        }
    }
}

/// Credential lookup: environment, then keychain, then key file
pub struct CredentialManager;

impl CredentialManager {
    /// Settings directory under the user's home
    pub fn settings_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(SETTINGS_DIR_NAME))
    }

    /// Get an API key for `provider`
    pub fn get_api_key(provider: &str) -> Result<String, String> {
        resolve_api_key(
            provider,
            |name| std::env::var(name).ok(),
            &Keychain,
            Self::settings_dir().as_deref(),
        )
    }
}

/// Resolve a key from explicit sources, first non-blank wins
pub fn resolve_api_key<F>(
    provider: &str,
    env: F,
    keystore: &dyn KeyStore,
    settings_dir: Option<&Path>,
) -> Result<String, String>
where
    F: Fn(&str) -> Option<String>,
{
    let non_blank = |key: String| {
        let key = key.trim();
        (!key.is_empty()).then(|| key.to_string())
    };

    if let Some(key) = env(API_KEY_ENV).and_then(non_blank) {
        tracing::debug!("[Credentials] Using API key from {}", API_KEY_ENV);
        return Ok(key);
    }

    if let Some(key) = keystore.lookup(provider).and_then(non_blank) {
        tracing::debug!("[Credentials] Retrieved API key from keychain for: {}", provider);
        return Ok(key);
    }

    // Key file path for a provider (`~/.scanner_utils/openai`)
    let path = settings_dir
        .map(|dir| dir.join(provider))
        .ok_or_else(|| "Could not determine home directory".to_string())?;

    read_key_file(&path)?.ok_or_else(|| {
        format!(
            "API key not found. Set {}, store it in the keychain (service \"{}\", account \"{}\") or enter it in {}",
            API_KEY_ENV,
            SERVICE_NAME,
            provider,
            path.display()
        )
    })
}

/// Read a key file; a missing or blank file yields `None`
pub fn read_key_file(path: &Path) -> Result<Option<String>, String> {
    if !path.exists() {
        return Ok(None);
    }

    let contents = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read API key from {}: {}", path.display(), e))?;
    let key = contents.trim();

    Ok((!key.is_empty()).then(|| key.to_string()))
}
