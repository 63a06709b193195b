use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub data: DataConfig,
    pub negotiation: NegotiationConfig,
    pub logging: LoggingConfig,
}

/// Where the read-only catalog and template data is loaded from. A missing
/// `templates_dir` means the compiled-in skeletons are used.
#[derive(Clone, Debug)]
pub struct DataConfig {
    pub catalog_path: PathBuf,
    pub operations_path: PathBuf,
    pub templates_dir: Option<PathBuf>,
}

#[derive(Clone, Debug)]
pub struct NegotiationConfig {
    pub default_reply_minutes: i64,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub catalog_path: Option<PathBuf>,
    pub operations_path: Option<PathBuf>,
    pub templates_dir: Option<PathBuf>,
    pub default_reply_minutes: Option<i64>,
    pub log_level: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data: DataConfig {
                catalog_path: PathBuf::from("catalog/eclass.json"),
                operations_path: PathBuf::from("catalog/operations.json"),
                templates_dir: None,
            },
            negotiation: NegotiationConfig { default_reply_minutes: 10 },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    /// Precedence: programmatic overrides > environment > file > defaults.
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("parley.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(data) = patch.data {
            if let Some(catalog_path) = data.catalog_path {
                self.data.catalog_path = catalog_path;
            }
            if let Some(operations_path) = data.operations_path {
                self.data.operations_path = operations_path;
            }
            if let Some(templates_dir) = data.templates_dir {
                self.data.templates_dir = Some(templates_dir);
            }
        }

        if let Some(negotiation) = patch.negotiation {
            if let Some(default_reply_minutes) = negotiation.default_reply_minutes {
                self.negotiation.default_reply_minutes = default_reply_minutes;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("PARLEY_CATALOG_PATH") {
            self.data.catalog_path = PathBuf::from(value);
        }
        if let Some(value) = read_env("PARLEY_OPERATIONS_PATH") {
            self.data.operations_path = PathBuf::from(value);
        }
        if let Some(value) = read_env("PARLEY_TEMPLATES_DIR") {
            self.data.templates_dir = Some(PathBuf::from(value));
        }

        if let Some(value) = read_env("PARLEY_DEFAULT_REPLY_MINUTES") {
            self.negotiation.default_reply_minutes =
                parse_i64("PARLEY_DEFAULT_REPLY_MINUTES", &value)?;
        }

        let log_level = read_env("PARLEY_LOGGING_LEVEL").or_else(|| read_env("PARLEY_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("PARLEY_LOGGING_FORMAT").or_else(|| read_env("PARLEY_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(catalog_path) = overrides.catalog_path {
            self.data.catalog_path = catalog_path;
        }
        if let Some(operations_path) = overrides.operations_path {
            self.data.operations_path = operations_path;
        }
        if let Some(templates_dir) = overrides.templates_dir {
            self.data.templates_dir = Some(templates_dir);
        }
        if let Some(default_reply_minutes) = overrides.default_reply_minutes {
            self.negotiation.default_reply_minutes = default_reply_minutes;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.data.catalog_path.as_os_str().is_empty() {
            return Err(ConfigError::Validation("data.catalog_path must not be empty".to_string()));
        }
        if self.data.operations_path.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "data.operations_path must not be empty".to_string(),
            ));
        }

        // One week is far beyond any realistic reply window.
        if !(1..=10_080).contains(&self.negotiation.default_reply_minutes) {
            return Err(ConfigError::Validation(
                "negotiation.default_reply_minutes must be in range 1..=10080".to_string(),
            ));
        }

        let level = self.logging.level.trim().to_ascii_lowercase();
        match level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
            _ => Err(ConfigError::Validation(
                "logging.level must be one of trace|debug|info|warn|error".to_string(),
            )),
        }
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("parley.toml"), PathBuf::from("config/parley.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    toml::from_str::<ConfigPatch>(&raw)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_i64(key: &str, value: &str) -> Result<i64, ConfigError> {
    value.parse::<i64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    data: Option<DataPatch>,
    negotiation: Option<NegotiationPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct DataPatch {
    catalog_path: Option<PathBuf>,
    operations_path: Option<PathBuf>,
    templates_dir: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct NegotiationPatch {
    default_reply_minutes: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
