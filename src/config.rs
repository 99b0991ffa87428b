use std::env;
use std::fmt;

/// `DATABASE_URL` value that selects the in-process document store.
pub const MEMORY_STORE_URL: &str = "memory://";

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_TOKEN_TTL_DAYS: i64 = 30;

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid { key: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "{} must be set", key),
            ConfigError::Invalid { key, value } => write!(f, "{} has invalid value {:?}", key, value),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub server_port: u16,
    pub server_host: String,
    pub token_secret: String,
    pub token_ttl_days: i64,
    pub base_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup so tests do not have to
    /// mutate the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let token_secret = lookup("ACCESS_TOKEN_SECRET")
            .or_else(|| lookup("JWT_SECRET"))
            .filter(|secret| !secret.is_empty())
            .ok_or(ConfigError::Missing("ACCESS_TOKEN_SECRET"))?;

        let server_port = match lookup("SERVER_PORT").or_else(|| lookup("PORT")) {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                key: "SERVER_PORT",
                value: raw,
            })?,
            None => DEFAULT_PORT,
        };
        let server_host = lookup("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string());

        let token_ttl_days = match lookup("TOKEN_TTL_DAYS") {
            Some(raw) => match raw.parse::<i64>() {
                Ok(days) if days > 0 => days,
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "TOKEN_TTL_DAYS",
                        value: raw,
                    })
                }
            },
            None => DEFAULT_TOKEN_TTL_DAYS,
        };

        let base_url = lookup("BASE_URL")
            .unwrap_or_else(|| format!("http://{}:{}", server_host, server_port));

        Ok(Self {
            database_url,
            server_port,
            server_host,
            token_secret,
            token_ttl_days,
            base_url,
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }

    pub fn uses_memory_store(&self) -> bool {
        self.database_url == MEMORY_STORE_URL
    }
}
