use std::env;
use thiserror::Error;

const DEFAULT_APP_NAME: &str = "Workers Jobs Manager API";
const DEFAULT_ENVIRONMENT: &str = "development";
const DEFAULT_DATABASE_URL: &str = "sqlite://app.db";
const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8000";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_API_BASE: &str = "http://localhost:8000";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{var} must be a positive integer, got '{value}'")]
    InvalidNumber { var: &'static str, value: String },

    #[error("{var} must not be empty")]
    Empty { var: &'static str },
}

/// Runtime settings, read from `WJM_*` environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub app_name: String,
    pub environment: String,
    pub database_url: String,
    pub bind_address: String,
    pub max_connections: u32,
    pub api_base: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            app_name: DEFAULT_APP_NAME.into(),
            environment: DEFAULT_ENVIRONMENT.into(),
            database_url: DEFAULT_DATABASE_URL.into(),
            bind_address: DEFAULT_BIND_ADDRESS.into(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            api_base: DEFAULT_API_BASE.into(),
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds settings from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Settings::default();

        let text = |var: &'static str, default: String| -> Result<String, ConfigError> {
            match lookup(var) {
                Some(value) if value.trim().is_empty() => Err(ConfigError::Empty { var }),
                Some(value) => Ok(value.trim().to_string()),
                None => Ok(default),
            }
        };

        let max_connections = match lookup("WJM_MAX_CONNECTIONS") {
            Some(value) => match value.trim().parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::InvalidNumber {
                        var: "WJM_MAX_CONNECTIONS",
                        value,
                    })
                }
            },
            None => defaults.max_connections,
        };

        let api_base = text("WJM_API_BASE", defaults.api_base)?
            .trim_end_matches('/')
            .to_string();

        Ok(Settings {
            app_name: text("WJM_APP_NAME", defaults.app_name)?,
            environment: text("WJM_ENVIRONMENT", defaults.environment)?,
            database_url: text("WJM_DATABASE_URL", defaults.database_url)?,
            bind_address: text("WJM_BIND_ADDRESS", defaults.bind_address)?,
            max_connections,
            api_base,
        })
    }
}
