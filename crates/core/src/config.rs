//! Verification configuration via `snapverify.toml` and environment
//!
//! Settings are resolved in three layers: built-in defaults, an optional
//! `snapverify.toml`, then environment variables. CI systems usually only
//! set `SNAPSHOT_ARTIFACTS` so failing renderings land somewhere they
//! collect.

use crate::error::{Result, SnapshotError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Config file name looked up by [`SnapshotConfig::load`].
pub const CONFIG_FILE_NAME: &str = "snapverify.toml";

/// Global record-all flag (`1`, `true`, `yes`, `on` enable it).
pub const ENV_RECORD: &str = "SNAPSHOT_RECORD";
/// External diff tool command template.
pub const ENV_DIFF_TOOL: &str = "SNAPSHOT_DIFF_TOOL";
/// Root directory for failing artifacts.
pub const ENV_ARTIFACTS: &str = "SNAPSHOT_ARTIFACTS";
/// Reference directory override.
pub const ENV_REFERENCE_DIR: &str = "SNAPSHOT_REFERENCE_DIR";
/// Default rendering timeout in milliseconds.
pub const ENV_TIMEOUT_MS: &str = "SNAPSHOT_TIMEOUT_MS";

/// Placeholder replaced with the reference path in a diff tool template.
pub const REFERENCE_PLACEHOLDER: &str = "{reference}";
/// Placeholder replaced with the failing artifact path in a diff tool template.
pub const ACTUAL_PLACEHOLDER: &str = "{actual}";

fn default_timeout_ms() -> u64 {
    5000
}

/// Process-wide verification settings.
///
/// # Example
///
/// ```toml
/// # Re-record every reference this run
/// record = false
///
/// # Shown on mismatch with both paths substituted
/// diff_tool = "ksdiff {reference} {actual}"
///
/// # Where failing renderings are written (default: OS temp dir)
/// artifacts_dir = "target/snapshot-artifacts"
///
/// # Rendering wait in milliseconds
/// timeout_ms = 5000
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotConfig {
    /// Re-record every reference instead of comparing.
    #[serde(default)]
    pub record: bool,
    /// External diff tool command template.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diff_tool: Option<String>,
    /// Root for failing artifacts. `None` means the OS temp directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifacts_dir: Option<PathBuf>,
    /// Reference directory override applied to every assertion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot_dir: Option<PathBuf>,
    /// Rendering wait in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            record: false,
            diff_tool: None,
            artifacts_dir: None,
            snapshot_dir: None,
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl SnapshotConfig {
    /// Defaults overlaid with the process environment.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Read `snapverify.toml` from `dir` if present, then overlay the environment.
    pub fn load(dir: &Path) -> Result<Self> {
        let mut config = Self::from_dir(dir)?;
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Read `snapverify.toml` from `dir`, or defaults when there is none.
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE_NAME);
        if !path.exists() {
            debug!(target: "snapverify::config", dir = %dir.display(), "No config file; using defaults");
            return Ok(Self::default());
        }
        let config = Self::from_file(&path)?;
        debug!(target: "snapverify::config", path = %path.display(), "Loaded config file");
        Ok(config)
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            SnapshotError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        toml::from_str(&content).map_err(|e| {
            SnapshotError::Config(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| SnapshotError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content).map_err(|e| SnapshotError::io("write config", path, e))
    }

    /// Overlay values from a variable lookup. Unset variables leave fields alone.
    ///
    /// Every valid variable is applied even when others fail to parse; the
    /// error then names each rejected variable.
    pub fn apply_env<L>(&mut self, lookup: L) -> Result<()>
    where
        L: Fn(&str) -> Option<String>,
    {
        let mut rejected = Vec::new();

        if let Some(raw) = lookup(ENV_RECORD) {
            match parse_flag(&raw) {
                Some(record) => self.record = record,
                None => rejected.push(format!(
                    "Invalid {} '{}'. Expected true or false.",
                    ENV_RECORD, raw
                )),
            }
        }
        if let Some(tool) = lookup(ENV_DIFF_TOOL).filter(|s| !s.trim().is_empty()) {
            self.diff_tool = Some(tool);
        }
        if let Some(dir) = lookup(ENV_ARTIFACTS).filter(|s| !s.is_empty()) {
            self.artifacts_dir = Some(PathBuf::from(dir));
        }
        if let Some(dir) = lookup(ENV_REFERENCE_DIR).filter(|s| !s.is_empty()) {
            self.snapshot_dir = Some(PathBuf::from(dir));
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_MS) {
            match raw.trim().parse() {
                Ok(ms) => self.timeout_ms = ms,
                Err(_) => rejected.push(format!(
                    "Invalid {} '{}'. Expected milliseconds.",
                    ENV_TIMEOUT_MS, raw
                )),
            }
        }

        if rejected.is_empty() {
            Ok(())
        } else {
            Err(SnapshotError::Config(rejected.join(" ")))
        }
    }

    /// Rendering timeout as a `Duration`.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Effective artifacts root.
    pub fn artifacts_root(&self) -> PathBuf {
        self.artifacts_dir
            .clone()
            .unwrap_or_else(std::env::temp_dir)
    }

    /// Comparison hint for a mismatch.
    ///
    /// With a diff tool configured the template is filled in; otherwise a
    /// plain expected/actual listing of both paths is produced.
    pub fn diff_hint(&self, reference: &Path, actual: &Path) -> String {
        match &self.diff_tool {
            Some(template) => format_diff_tool(template, reference, actual),
            None => format!(
                "--- expected\n\"{}\"\n+++ actual\n\"{}\"",
                reference.display(),
                actual.display()
            ),
        }
    }
}

/// Fill a diff tool template with the reference and artifact paths.
///
/// A template without placeholders gets both quoted paths appended.
pub fn format_diff_tool(template: &str, reference: &Path, actual: &Path) -> String {
    let reference = reference.display().to_string();
    let actual = actual.display().to_string();
    if template.contains(REFERENCE_PLACEHOLDER) || template.contains(ACTUAL_PLACEHOLDER) {
        template
            .replace(REFERENCE_PLACEHOLDER, &reference)
            .replace(ACTUAL_PLACEHOLDER, &actual)
    } else {
        format!("{} \"{}\" \"{}\"", template.trim_end(), reference, actual)
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
