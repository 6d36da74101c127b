//! Environment detection and logging configuration

use serde::{Deserialize, Serialize};
use std::env;

/// Application environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Development environment
    #[default]
    Development,
    /// Staging/test environment
    Staging,
    /// Production environment
    Production,
}

impl Environment {
    /// Check if running in production
    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }

    /// Get environment from ENV variable
    pub fn from_env() -> Self {
        env::var("ENVIRONMENT")
            .or_else(|_| env::var("ENV"))
            .or_else(|_| env::var("RUST_ENV"))
            .unwrap_or_else(|_| String::from("development"))
            .parse()
            .unwrap_or(Environment::Development)
    }

    /// Get the .env file name for this environment
    pub fn env_file(&self) -> &str {
        match self {
            Environment::Development => ".env.development",
            Environment::Staging => ".env.staging",
            Environment::Production => ".env.production",
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Staging => write!(f, "staging"),
            Environment::Production => write!(f, "production"),
        }
    }
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "staging" | "stage" | "test" => Ok(Environment::Staging),
            "production" | "prod" => Ok(Environment::Production),
            _ => Err(format!("Invalid environment: {}", s)),
        }
    }
}

/// Log format enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
    Compact,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Default filter directive (trace, debug, info, warn, error or a full
    /// `tracing` filter string); `RUST_LOG` takes precedence when set
    pub level: String,

    /// Output format
    #[serde(default = "default_log_format")]
    pub format: LogFormat,

    /// Enable ANSI colours (terminal only)
    #[serde(default = "default_colored")]
    pub colored: bool,

    /// Include source file and line in events
    #[serde(default)]
    pub source_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: default_log_format(),
            colored: default_colored(),
            source_location: false,
        }
    }
}

impl LoggingConfig {
    /// Create logging config for environment
    pub fn for_environment(env: Environment) -> Self {
        match env {
            Environment::Development => Self {
                level: String::from("debug"),
                format: LogFormat::Pretty,
                colored: true,
                source_location: true,
            },
            Environment::Staging => Self {
                level: String::from("info"),
                format: LogFormat::Json,
                colored: false,
                source_location: false,
            },
            Environment::Production => Self {
                level: String::from("info"),
                format: LogFormat::Json,
                colored: false,
                source_location: false,
            },
        }
    }

    /// Load from `LOG_LEVEL` / `LOG_FORMAT`, falling back to the environment defaults
    pub fn from_env(env: Environment) -> Self {
        let mut config = Self::for_environment(env);
        if let Ok(level) = std::env::var("LOG_LEVEL") {
            config.level = level;
        }
        if let Ok(format) = std::env::var("LOG_FORMAT") {
            config.format = match format.to_lowercase().as_str() {
                "json" => LogFormat::Json,
                "compact" => LogFormat::Compact,
                "pretty" => LogFormat::Pretty,
                _ => config.format,
            };
        }
        config
    }
}

fn default_log_format() -> LogFormat {
    LogFormat::Pretty
}

fn default_colored() -> bool {
    true
}
