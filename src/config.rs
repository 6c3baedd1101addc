//! Configuration module
//!
//! Loads configuration from environment variables.

use std::env;
use std::str::FromStr;

use rust_decimal::Decimal;

use crate::engine::PriceDefaults;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Database connection URL
    pub database_url: String,

    /// Maximum database connections in pool
    pub database_max_connections: u32,

    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Environment (development, production)
    pub environment: String,

    /// Defaults for lazily created good price records
    pub price_defaults: PriceDefaults,

    /// Seconds without a payment after which a credit is overdue
    pub credit_overdue_secs: i64,

    /// Fallback privateer license fee when the catalog has no entry
    pub privateer_fee_fallback: Decimal,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url =
            env::var("DATABASE_URL").map_err(|_| ConfigError::MissingEnv("DATABASE_URL"))?;

        let database_max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("DATABASE_MAX_CONNECTIONS"))?;

        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("PORT"))?;

        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        let price_defaults = PriceDefaults {
            pmax: decimal_env("GOODS_DEFAULT_PMAX", "100")?,
            n_for_drop: env::var("GOODS_DEFAULT_N_FOR_DROP")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("GOODS_DEFAULT_N_FOR_DROP"))?,
            t_recovery_secs: env::var("GOODS_DEFAULT_T_RECOVERY_SECS")
                .unwrap_or_else(|_| "300".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("GOODS_DEFAULT_T_RECOVERY_SECS"))?,
        };

        let credit_overdue_secs = env::var("CREDIT_OVERDUE_SECS")
            .unwrap_or_else(|_| "600".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("CREDIT_OVERDUE_SECS"))?;

        let privateer_fee_fallback = decimal_env("PRIVATEER_FEE_FALLBACK", "50")?;

        Ok(Self {
            database_url,
            database_max_connections,
            host,
            port,
            environment,
            price_defaults,
            credit_overdue_secs,
            privateer_fee_fallback,
        })
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

fn decimal_env(name: &'static str, default: &str) -> Result<Decimal, ConfigError> {
    let raw = env::var(name).unwrap_or_else(|_| default.to_string());
    Decimal::from_str(&raw).map_err(|_| ConfigError::InvalidValue(name))
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnv(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(&'static str),
}
