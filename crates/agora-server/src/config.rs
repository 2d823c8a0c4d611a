use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};

use agora_api::auth::DEFAULT_TOKEN_TTL_MINUTES;

/// Secrets that only exist in sample configs.
pub const PLACEHOLDER_SECRETS: &[&str] = &[
    "dev-secret-change-me",
    "change-me-to-a-random-string",
    "your_jwt_secret_key",
];

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub jwt_secret: String,
    pub token_ttl_minutes: i64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup so tests don't have to touch the process
    /// environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("AGORA_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = lookup("AGORA_PORT")
            .unwrap_or_else(|| "4000".into())
            .parse()
            .context("AGORA_PORT must be a port number")?;
        let db_path: PathBuf = lookup("AGORA_DB_PATH")
            .unwrap_or_else(|| "agora.db".into())
            .into();
        let jwt_secret =
            lookup("AGORA_JWT_SECRET").unwrap_or_else(|| "dev-secret-change-me".into());
        let token_ttl_minutes: i64 = match lookup("AGORA_TOKEN_TTL_MINUTES") {
            Some(v) => v
                .parse()
                .context("AGORA_TOKEN_TTL_MINUTES must be a whole number of minutes")?,
            None => DEFAULT_TOKEN_TTL_MINUTES,
        };
        if token_ttl_minutes <= 0 {
            anyhow::bail!("AGORA_TOKEN_TTL_MINUTES must be positive");
        }
        if jwt_secret.is_empty() {
            anyhow::bail!("AGORA_JWT_SECRET must not be empty");
        }

        Ok(Self {
            host,
            port,
            db_path,
            jwt_secret,
            token_ttl_minutes,
        })
    }

    pub fn addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid listen address {}:{}", self.host, self.port))
    }

    pub fn uses_placeholder_secret(&self) -> bool {
        PLACEHOLDER_SECRETS.contains(&self.jwt_secret.as_str())
    }
}
