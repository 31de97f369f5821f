use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::{ConfigError, get_env_parsed_or};

/// Configuration for the tracing subscriber.
///
/// `RUST_LOG` takes precedence over `level` when it is set.
///
/// # Examples
///
/// ```ignore
/// use waypost::prelude::*;
///
/// Waypost::new()
///     .with_tracing(TracingConfig::new().json())
///     .discover(Discovery::new("src/routes"), Manifest::collected())?
///     .listen("127.0.0.1:3000")
///     .await
/// ```
#[derive(Debug, Clone)]
pub struct TracingConfig {
    pub json: bool,
    pub level: Level,
    /// Include the target (module path) in logs.
    pub with_target: bool,
    pub with_file: bool,
    pub with_line_number: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            json: false,
            level: Level::INFO,
            with_target: true,
            with_file: false,
            with_line_number: false,
        }
    }
}

impl TracingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads `WAYPOST_LOG_JSON` and `WAYPOST_LOG_LEVEL`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            json: get_env_parsed_or("WAYPOST_LOG_JSON", false)?,
            level: get_env_parsed_or("WAYPOST_LOG_LEVEL", Level::INFO)?,
            ..Self::default()
        })
    }

    /// Enables JSON output format.
    pub fn json(mut self) -> Self {
        self.json = true;
        self
    }

    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn with_target(mut self, enabled: bool) -> Self {
        self.with_target = enabled;
        self
    }

    pub fn with_file(mut self, enabled: bool) -> Self {
        self.with_file = enabled;
        self
    }

    pub fn with_line_number(mut self, enabled: bool) -> Self {
        self.with_line_number = enabled;
        self
    }

    /// Installs the global subscriber.
    ///
    /// Returns `false` when a global subscriber was already installed, in
    /// which case that one stays in place.
    pub fn init(self) -> bool {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.level.to_string()));

        let builder = fmt()
            .with_env_filter(filter)
            .with_target(self.with_target)
            .with_file(self.with_file)
            .with_line_number(self.with_line_number);

        if self.json {
            builder.json().try_init().is_ok()
        } else {
            builder.try_init().is_ok()
        }
    }
}
