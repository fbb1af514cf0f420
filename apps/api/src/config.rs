//! API server configuration.
//!
//! Configuration is loaded from environment variables with fallback to
//! defaults, so a bare `cargo run` starts a working local server.

use std::env;

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// HTTP port to listen on.
    pub port: u16,

    /// Path to the SQLite database file.
    pub database_path: String,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    ///
    /// ## Variables
    /// - `PORT` - HTTP port (default: 3000)
    /// - `DATABASE_PATH` - SQLite file path (default: `avemaria.db`)
    pub fn load() -> Result<Self, ConfigError> {
        let config = ApiConfig {
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("PORT".to_string()))?,

            database_path: env::var("DATABASE_PATH").unwrap_or_else(|_| "avemaria.db".to_string()),
        };

        Ok(config)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        // Only assert defaults when the variables are not set in the
        // environment running the tests.
        if env::var("PORT").is_err() && env::var("DATABASE_PATH").is_err() {
            let config = ApiConfig::load().unwrap();
            assert_eq!(config.port, 3000);
            assert_eq!(config.database_path, "avemaria.db");
        }
    }
}
