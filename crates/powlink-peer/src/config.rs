use std::path::{Path, PathBuf};

use powlink_engine::{EngineOptions, MAX_DIFFICULTY};
use serde::Deserialize;

use crate::error::ConfigError;

/// Default broker endpoint path.
pub const DEFAULT_ENDPOINT_PATH: &str = "/tmp/powlink.sock";

/// Default per-request difficulty ceiling.
pub const DEFAULT_MAX_DIFFICULTY: u8 = 14;

/// Broker configuration.
///
/// Precedence, lowest to highest: defaults, configuration file, environment
/// (`POWLINK_*`), CLI flags, explicit in-process overrides. The file and
/// environment layers are applied here; flag and override layers are the
/// caller's (they mutate the loaded value).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BrokerConfig {
    pub server: ServerConfig,
    pub engine: EngineConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub endpoint_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Selector for the concrete engine implementation.
    #[serde(rename = "type")]
    pub engine_type: String,
    /// Per-request difficulty ceiling, enforced on every work request.
    pub max_difficulty: u8,
    /// Engine-specific, opaque to the broker core.
    pub device_path: Option<PathBuf>,
    /// Engine-specific, opaque to the broker core.
    pub firmware_file: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    pub level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            endpoint_path: PathBuf::from(DEFAULT_ENDPOINT_PATH),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            engine_type: "curl".to_string(),
            max_difficulty: DEFAULT_MAX_DIFFICULTY,
            device_path: None,
            firmware_file: None,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            engine: EngineConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl BrokerConfig {
    /// Load the file layer (when a path is given) and the environment layer.
    /// The result is validated; callers applying flag overrides validate
    /// again afterwards.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML configuration file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply the environment layer through an injectable lookup.
    pub fn apply_env(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(path) = lookup("POWLINK_SERVER_ENDPOINT_PATH") {
            self.server.endpoint_path = PathBuf::from(path);
        }
        if let Some(engine_type) = lookup("POWLINK_ENGINE_TYPE") {
            self.engine.engine_type = engine_type;
        }
        if let Some(raw) = lookup("POWLINK_ENGINE_MAX_DIFFICULTY") {
            self.engine.max_difficulty =
                raw.parse::<u8>().map_err(|err| ConfigError::Invalid {
                    key: "POWLINK_ENGINE_MAX_DIFFICULTY".to_string(),
                    message: format!("{raw:?}: {err}"),
                })?;
        }
        if let Some(level) = lookup("POWLINK_LOG_LEVEL") {
            self.log.level = level;
        }
        Ok(())
    }

    /// Enforce cross-field constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.engine.max_difficulty > MAX_DIFFICULTY {
            return Err(ConfigError::Invalid {
                key: "engine.max_difficulty".to_string(),
                message: format!(
                    "{} exceeds the absolute maximum {MAX_DIFFICULTY}",
                    self.engine.max_difficulty
                ),
            });
        }
        Ok(())
    }

    /// The engine-specific option block, for the engine registry.
    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            device_path: self.engine.device_path.clone(),
            firmware_file: self.engine.firmware_file.clone(),
        }
    }
}
