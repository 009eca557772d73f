//! Runtime configuration read from `WEIGHTWISE_*` environment variables.

use std::path::PathBuf;
use std::str::FromStr;

use crate::adapters::artifacts::IntegrityPolicy;
use crate::domain::Locale;

pub const DEFAULT_ARTIFACT_DIR: &str = "models";
pub const DEFAULT_LOG_FILE: &str = "weightwise.log";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{var}: unsupported value {value:?}")]
    InvalidValue { var: &'static str, value: String },
}

/// Where log output goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogMode {
    File,
    Stderr,
    /// File when stdout is a terminal, stderr otherwise
    #[default]
    Auto,
}

impl LogMode {
    /// Resolve `Auto` against whether the terminal UI will run.
    #[must_use]
    pub fn use_file(self, interactive: bool) -> bool {
        match self {
            Self::File => true,
            Self::Stderr => false,
            Self::Auto => interactive,
        }
    }
}

impl FromStr for LogMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(Self::File),
            "stderr" => Ok(Self::Stderr),
            "auto" | "" => Ok(Self::Auto),
            _ => Err(()),
        }
    }
}

/// `true` for "1", "true" or "yes" (lower or upper case).
#[must_use]
pub fn parse_bool_env(value: &str) -> bool {
    matches!(value, "1" | "true" | "TRUE" | "yes" | "YES")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub artifact_dir: PathBuf,
    pub locale: Locale,
    pub log_mode: LogMode,
    pub log_file: PathBuf,
    pub public_key_b64: Option<String>,
    pub require_signed: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            artifact_dir: PathBuf::from(DEFAULT_ARTIFACT_DIR),
            locale: Locale::default(),
            log_mode: LogMode::default(),
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            public_key_b64: None,
            require_signed: false,
        }
    }
}

impl AppConfig {
    /// Read the process environment.
    ///
    /// # Errors
    /// Returns `ConfigError::InvalidValue` for an unrecognized locale or log
    /// mode.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup.
    ///
    /// # Errors
    /// See [`AppConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let locale = match lookup("WEIGHTWISE_LOCALE") {
            Some(v) => v.parse::<Locale>().map_err(|_| ConfigError::InvalidValue {
                var: "WEIGHTWISE_LOCALE",
                value: v,
            })?,
            None => defaults.locale,
        };
        let log_mode = match lookup("WEIGHTWISE_LOG_MODE") {
            Some(v) => v.parse::<LogMode>().map_err(|()| ConfigError::InvalidValue {
                var: "WEIGHTWISE_LOG_MODE",
                value: v,
            })?,
            None => defaults.log_mode,
        };

        Ok(Self {
            artifact_dir: lookup("WEIGHTWISE_ARTIFACT_DIR")
                .filter(|v| !v.trim().is_empty())
                .map_or(defaults.artifact_dir, PathBuf::from),
            locale,
            log_mode,
            log_file: lookup("WEIGHTWISE_LOG_FILE")
                .filter(|v| !v.trim().is_empty())
                .map_or(defaults.log_file, PathBuf::from),
            public_key_b64: lookup("WEIGHTWISE_ARTIFACT_PUBKEY_B64")
                .filter(|v| !v.trim().is_empty()),
            require_signed: lookup("WEIGHTWISE_REQUIRE_SIGNED_ARTIFACTS")
                .is_some_and(|v| parse_bool_env(&v)),
        })
    }

    #[must_use]
    pub fn integrity_policy(&self) -> IntegrityPolicy {
        IntegrityPolicy {
            require_signed: self.require_signed,
            public_key_b64: self.public_key_b64.clone(),
        }
    }
}
