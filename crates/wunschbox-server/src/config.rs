use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};

/// Placeholder JWT secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &[
    "change-me-to-a-random-string",
    "dev-secret-change-me",
];

const DEFAULT_TOKEN_TTL_DAYS: i64 = 30;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub jwt_secret: String,
    pub token_ttl_days: i64,
    /// Gift suggestions are disabled when unset.
    pub gemini_api_key: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let jwt_secret = get("WUNSCHBOX_JWT_SECRET").unwrap_or_default();
        if jwt_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            bail!("WUNSCHBOX_JWT_SECRET is unset or still a placeholder; set it in .env and restart");
        }

        let port = match get("WUNSCHBOX_PORT") {
            Some(v) => v.parse().context("WUNSCHBOX_PORT is not a port number")?,
            None => 3000,
        };

        let token_ttl_days = match get("WUNSCHBOX_TOKEN_TTL_DAYS") {
            Some(v) => v.parse().context("WUNSCHBOX_TOKEN_TTL_DAYS is not a number")?,
            None => DEFAULT_TOKEN_TTL_DAYS,
        };
        if token_ttl_days <= 0 {
            bail!("WUNSCHBOX_TOKEN_TTL_DAYS must be positive");
        }

        Ok(Self {
            host: get("WUNSCHBOX_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            db_path: get("WUNSCHBOX_DB_PATH")
                .unwrap_or_else(|| "wunschbox.db".into())
                .into(),
            jwt_secret,
            token_ttl_days,
            gemini_api_key: get("GEMINI_API_KEY").filter(|k| !k.trim().is_empty()),
        })
    }

    pub fn addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }
}
