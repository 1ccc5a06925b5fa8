use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::event::DEFAULT_PLATFORM;
use crate::util::paths::config_path;

/// Example configuration file contents (bundled with the binary)
pub const EXAMPLE_CONFIG: &str = include_str!("config.toml.example");

/// Environment variable overriding `capture.locals`
pub const ENV_CAPTURE_LOCALS: &str = "STACKVARS_CAPTURE_LOCALS";

/// Error loading a configuration file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Something ignored while loading the configuration
#[derive(Debug, Error)]
pub enum ConfigWarning {
    #[error("Ignoring invalid config file: {0}")]
    InvalidFile(#[source] ConfigError),
    #[error("Ignoring unrecognized {var} value {value:?}")]
    UnrecognizedEnv { var: &'static str, value: String },
}

impl ConfigWarning {
    pub fn log(&self) {
        match self {
            ConfigWarning::InvalidFile(error) => {
                tracing::warn!(error = %error, "Ignoring invalid config file");
            }
            ConfigWarning::UnrecognizedEnv { var, value } => {
                tracing::warn!(var = %var, value = %value, "Ignoring unrecognized value");
            }
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Config {
    /// Local variable capture
    pub capture: CaptureConfig,
    /// Defaults applied to every event
    pub event: EventConfig,
    /// Log filtering for the binary
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaptureConfig {
    /// Attach captured locals to stack elements
    pub locals: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self { locals: true }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventConfig {
    pub platform: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logger: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_name: Option<String>,
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            platform: DEFAULT_PLATFORM.to_string(),
            logger: None,
            release: None,
            environment: None,
            server_name: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "warn".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlCaptureConfig {
    pub locals: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlEventConfig {
    pub platform: Option<String>,
    pub logger: Option<String>,
    pub release: Option<String>,
    pub environment: Option<String>,
    pub server_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlLoggingConfig {
    pub filter: Option<String>,
}

/// TOML representation of the config file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    pub capture: Option<TomlCaptureConfig>,
    pub event: Option<TomlEventConfig>,
    pub logging: Option<TomlLoggingConfig>,
}

impl Config {
    /// Load configuration from the default path, merging with defaults.
    ///
    /// A missing or unreadable file leaves the defaults in place. Anything
    /// that was ignored along the way is logged at warn level.
    pub fn load() -> Self {
        let (config, warnings) = Self::load_with_warnings();
        for warning in &warnings {
            warning.log();
        }
        config
    }

    /// Like [`Config::load`], handing back what was ignored instead of
    /// logging it. The binary loads its config before logging is set up.
    pub fn load_with_warnings() -> (Self, Vec<ConfigWarning>) {
        let config_file = config_path();
        let mut warnings = Vec::new();
        let mut config = if config_file.exists() {
            Self::load_from(&config_file).unwrap_or_else(|e| {
                warnings.push(ConfigWarning::InvalidFile(e));
                Config::default()
            })
        } else {
            Config::default()
        };
        warnings.extend(config.apply_env());
        (config, warnings)
    }

    /// Load configuration from `path`, merging with defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse TOML contents, merging them on top of the defaults.
    pub fn from_toml_str(contents: &str) -> Result<Self, toml::de::Error> {
        let toml_config: TomlConfig = toml::from_str(contents)?;
        let mut config = Config::default();
        config.merge(toml_config);
        Ok(config)
    }

    fn merge(&mut self, toml_config: TomlConfig) {
        if let Some(capture) = toml_config.capture {
            if let Some(locals) = capture.locals {
                self.capture.locals = locals;
            }
        }

        if let Some(event) = toml_config.event {
            if let Some(platform) = event.platform {
                self.event.platform = platform;
            }
            if event.logger.is_some() {
                self.event.logger = event.logger;
            }
            if event.release.is_some() {
                self.event.release = event.release;
            }
            if event.environment.is_some() {
                self.event.environment = event.environment;
            }
            if event.server_name.is_some() {
                self.event.server_name = event.server_name;
            }
        }

        if let Some(logging) = toml_config.logging {
            if let Some(filter) = logging.filter {
                self.logging.filter = filter;
            }
        }
    }

    /// Apply overrides from the process environment. Returns the override
    /// that was ignored, if any.
    pub fn apply_env(&mut self) -> Option<ConfigWarning> {
        let raw = std::env::var(ENV_CAPTURE_LOCALS).ok();
        self.apply_capture_override(raw.as_deref())
    }

    fn apply_capture_override(&mut self, raw: Option<&str>) -> Option<ConfigWarning> {
        match raw?.trim().to_ascii_lowercase().as_str() {
            "1" | "true" => self.capture.locals = true,
            "0" | "false" => self.capture.locals = false,
            other => {
                return Some(ConfigWarning::UnrecognizedEnv {
                    var: ENV_CAPTURE_LOCALS,
                    value: other.to_string(),
                });
            }
        }
        None
    }

    pub fn with_capture_locals(mut self, enabled: bool) -> Self {
        self.capture.locals = enabled;
        self
    }
}
