//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load configuration from a TOML file, apply environment overrides,
/// and validate the result.
pub fn load_config(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let mut config: GatewayConfig = toml::from_str(&content).map_err(ConfigError::Parse)?;

    apply_env(&mut config, |name| std::env::var(name).ok());
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

impl GatewayConfig {
    /// Build a configuration from defaults plus environment variables only.
    /// This is the file-less deployment shape: the upstream base, token and
    /// authorization scheme all come from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = GatewayConfig::default();
        apply_env(&mut config, |name| std::env::var(name).ok());
        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }
}

/// Apply `WB_*` environment overrides onto a configuration.
///
/// Takes the variable lookup as a closure so tests do not have to mutate
/// process-global environment state.
pub fn apply_env<F>(config: &mut GatewayConfig, var: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(base) = var("WB_BASE") {
        config.upstream.base_url = base;
    }
    if let Some(token) = var("WB_TOKEN") {
        config.upstream.token = token;
    }
    if let Some(bearer) = var("WB_BEARER") {
        config.upstream.bearer = bearer == "true";
    }
    if let Some(header) = var("WB_AUTH_HEADER") {
        config.upstream.auth_header = header;
    }
}
