//! Client configuration.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

pub const DEVELOPMENT_BASE_URL: &str = "http://localhost:5000";
pub const PRODUCTION_BASE_URL: &str = "https://image-toolbox-backend.onrender.com";

/// Deployment environment, which selects the default backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn default_base_url(&self) -> &'static str {
        match self {
            Environment::Development => DEVELOPMENT_BASE_URL,
            Environment::Production => PRODUCTION_BASE_URL,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(format!("Unknown environment: {}", other)),
        }
    }
}

/// Configuration for the processing client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Environment the base URL was selected for
    pub environment: Environment,
    /// Base URL of the processing backend, without trailing slash
    pub base_url: String,
    /// Whole-request timeout; `None` leaves the transport default
    pub timeout: Option<Duration>,
    /// Connect timeout; `None` leaves the transport default
    pub connect_timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::for_environment(Environment::default())
    }
}

impl ClientConfig {
    pub fn for_environment(environment: Environment) -> Self {
        Self {
            environment,
            base_url: environment.default_base_url().to_string(),
            timeout: None,
            connect_timeout: None,
        }
    }

    /// Switch environment, moving to its default backend. Timeouts are kept.
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self.base_url = environment.default_base_url().to_string();
        self
    }

    /// Point at an explicit backend.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = normalize_base_url(&base_url.into());
        self
    }

    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let environment = environment_from_var(
            std::env::var("IMAGE_TOOLBOX_ENV")
                .or_else(|_| std::env::var("ENVIRONMENT"))
                .ok(),
        );

        let mut config = Self::for_environment(environment);

        if let Ok(url) = std::env::var("IMAGE_TOOLBOX_BASE_URL") {
            if !url.trim().is_empty() {
                config = config.with_base_url(url);
            }
        }

        config.timeout = std::env::var("IMAGE_TOOLBOX_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs);

        config
    }

    /// Check if running in production mode.
    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }
}

fn environment_from_var(value: Option<String>) -> Environment {
    match value {
        Some(raw) => raw.parse().unwrap_or_else(|e| {
            warn!("{}, falling back to {}", e, Environment::default());
            Environment::default()
        }),
        None => Environment::default(),
    }
}

fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}
