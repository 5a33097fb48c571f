use std::str::FromStr;
use std::time::Duration;

use crate::core::services::auth::AdminSeed;
use crate::error::Error;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub db_max_connections: u32,
    pub upload_path: String,
    pub public_base_url: String,
    pub static_dir: String,
    pub setup_secret: Option<String>,
    pub admin_username: Option<String>,
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
    pub rate_limit_window: Duration,
    pub rate_limit_max: u32,
    pub rate_limit_sweep: Duration,
}

fn parse_or<T: FromStr>(key: &str, value: Option<String>, default: T) -> Result<T, Error> {
    match value {
        Some(v) => v.parse().map_err(|_| Error::ConfigError(format!("{} is not a valid value: {}", key, v))),
        None => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| dotenv::var(key).ok())
    }

    /// Builds the configuration from `lookup`; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());
        let required = |key: &str| get(key).ok_or_else(|| Error::ConfigError(format!("environment variable {} is not set", key)));
        Ok(Config {
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:8000".into()),
            db_max_connections: parse_or("DB_MAX_CONNECTIONS", get("DB_MAX_CONNECTIONS"), 5)?,
            upload_path: get("UPLOAD_PATH").unwrap_or_else(|| "./uploads".into()),
            public_base_url: get("PUBLIC_BASE_URL").unwrap_or_else(|| "http://localhost:8000".into()),
            static_dir: get("STATIC_DIR").unwrap_or_else(|| "./public".into()),
            setup_secret: get("SETUP_SECRET"),
            admin_username: get("ADMIN_USERNAME"),
            admin_email: get("ADMIN_EMAIL"),
            admin_password: get("ADMIN_PASSWORD"),
            rate_limit_window: Duration::from_secs(parse_or("RATE_LIMIT_WINDOW_SECS", get("RATE_LIMIT_WINDOW_SECS"), 300)?),
            rate_limit_max: parse_or("RATE_LIMIT_MAX", get("RATE_LIMIT_MAX"), 1)?,
            rate_limit_sweep: Duration::from_secs(parse_or("RATE_LIMIT_SWEEP_SECS", get("RATE_LIMIT_SWEEP_SECS"), 60)?),
        })
    }

    /// The designated admin account, when all of its credentials are configured.
    pub fn admin_seed(&self) -> Option<AdminSeed> {
        match (&self.admin_username, &self.admin_email, &self.admin_password) {
            (Some(username), Some(email), Some(password)) => Some(AdminSeed {
                username: username.clone(),
                email: email.to_lowercase(),
                password: password.clone(),
            }),
            _ => None,
        }
    }
}
