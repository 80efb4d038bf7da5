//! Configuration module for the Q&A backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Default JWT lifetime in hours.
const DEFAULT_JWT_EXPIRY_HOURS: i64 = 24;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Secret used to sign and verify JWT access tokens
    pub jwt_secret: String,
    /// JWT lifetime in hours
    pub jwt_expiry_hours: i64,
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Path to Tantivy search index directory
    pub index_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let jwt_secret = env::var("QNA_JWT_SECRET")
            .unwrap_or_else(|_| "insecure-dev-secret-change-me".to_string());

        let jwt_expiry_hours = env::var("QNA_JWT_EXPIRY_HOURS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_JWT_EXPIRY_HOURS);

        let db_path = env::var("QNA_DB_PATH")
            .unwrap_or_else(|_| "./data/app.sqlite".to_string())
            .into();

        let index_path = env::var("QNA_INDEX_PATH")
            .unwrap_or_else(|_| "./data/index".to_string())
            .into();

        let bind_addr = env::var("QNA_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:5000".to_string())
            .parse()
            .expect("Invalid QNA_BIND_ADDR format");

        let log_level = env::var("QNA_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Self {
            jwt_secret,
            jwt_expiry_hours,
            db_path,
            index_path,
            bind_addr,
            log_level,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        // Clear any existing env vars
        env::remove_var("QNA_JWT_SECRET");
        env::remove_var("QNA_JWT_EXPIRY_HOURS");
        env::remove_var("QNA_DB_PATH");
        env::remove_var("QNA_INDEX_PATH");
        env::remove_var("QNA_BIND_ADDR");
        env::remove_var("QNA_LOG_LEVEL");

        let config = Config::from_env();

        assert_eq!(config.jwt_expiry_hours, 24);
        assert_eq!(config.db_path, PathBuf::from("./data/app.sqlite"));
        assert_eq!(config.index_path, PathBuf::from("./data/index"));
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:5000");
        assert_eq!(config.log_level, "info");
    }
}
