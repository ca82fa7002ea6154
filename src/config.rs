// Application configuration
// Loads runtime settings from the environment (after dotenv has populated it)

use rust_decimal::Decimal;
use std::str::FromStr;

/// Default flat shipping cost in Rupiah
pub const DEFAULT_SHIPPING_COST: i64 = 15_000;

/// Errors raised while reading configuration at startup
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set in environment")]
    Missing(&'static str),

    #[error("{name} has an invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

/// Runtime configuration for the API server
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    /// Flat shipping cost added to every checkout
    pub shipping_cost: Decimal,
    pub db_max_connections: u32,
}

impl AppConfig {
    /// Read configuration from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through an arbitrary lookup function
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let jwt_secret = lookup("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = parse_or("PORT", lookup("PORT"), 8080u16)?;
        let shipping_cost = parse_or(
            "SHIPPING_COST",
            lookup("SHIPPING_COST"),
            Decimal::from(DEFAULT_SHIPPING_COST),
        )?;
        if shipping_cost.is_sign_negative() {
            return Err(ConfigError::Invalid {
                name: "SHIPPING_COST",
                value: shipping_cost.to_string(),
            });
        }
        let db_max_connections = parse_or("DB_MAX_CONNECTIONS", lookup("DB_MAX_CONNECTIONS"), 5u32)?;

        Ok(Self {
            database_url,
            host,
            port,
            jwt_secret,
            shipping_cost,
            db_max_connections,
        })
    }

    /// Socket address string the server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T: FromStr>(name: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}
