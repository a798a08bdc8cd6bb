//! Scanning with the NAPS2 console tool.
//!
//! `naps2.console` drives the scanner through a named profile and writes an
//! OCR'd PDF, which then goes through the regular filing pipeline.

use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;

/// Executable name of the NAPS2 console
pub const NAPS2_COMMAND: &str = "naps2.console";

/// Scanner profile used when none is given
pub const DEFAULT_PROFILE: &str = "CANON P-208II";

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("{0} not installed or not on PATH")]
    ToolMissing(String),

    #[error("Failed to run {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Scan failed ({status}): {stderr}")]
    Failed { status: String, stderr: String },

    #[error("Scan reported success but {} was not written", .0.display())]
    NoOutput(PathBuf),
}

/// Produces a PDF at the requested path
pub trait Scanner {
    fn scan(&self, output: &Path) -> Result<PathBuf, ScanError>;
}

/// NAPS2 console invocation with a fixed profile
#[derive(Debug, Clone)]
pub struct Naps2Scanner {
    command: String,
    profile: String,
}

impl Naps2Scanner {
    pub fn new(profile: impl Into<String>) -> Self {
        Self {
            command: NAPS2_COMMAND.to_string(),
            profile: profile.into(),
        }
    }

    /// Use a different executable (full path or wrapper script)
    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = command.into();
        self
    }

    /// Check that the tool can be started
    pub fn check_available(&self) -> Result<(), ScanError> {
        match Command::new(&self.command).arg("--help").output() {
            Ok(_) => Ok(()),
            Err(_) => Err(ScanError::ToolMissing(self.command.clone())),
        }
    }

    fn args(&self, output: &Path) -> Vec<String> {
        vec![
            "-o".to_string(),
            output.to_string_lossy().to_string(),
            "-p".to_string(),
            self.profile.clone(),
            "--enableocr".to_string(),
            "--force".to_string(),
        ]
    }
}

impl Default for Naps2Scanner {
    fn default() -> Self {
        Self::new(DEFAULT_PROFILE)
    }
}

impl Scanner for Naps2Scanner {
    fn scan(&self, output: &Path) -> Result<PathBuf, ScanError> {
        tracing::info!(
            "[Scanner] Scanning with profile \"{}\" into {}",
            self.profile,
            output.display()
        );

        let result = Command::new(&self.command)
            .args(self.args(output))
            .output()
            .map_err(|source| ScanError::Spawn {
                command: self.command.clone(),
                source,
            })?;

        if !result.status.success() {
            return Err(ScanError::Failed {
                status: result.status.to_string(),
                stderr: String::from_utf8_lossy(&result.stderr).trim().to_string(),
            });
        }

        if !output.is_file() {
            return Err(ScanError::NoOutput(output.to_path_buf()));
        }

        Ok(output.to_path_buf())
    }
}
