use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::Duration;

use agora_api::credentials::AuthConfig;

/// Placeholder JWT secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &["change-me-to-a-random-string", "dev-secret-change-me"];

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub auth: AuthConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let jwt_secret = lookup("AGORA_JWT_SECRET").unwrap_or_default();
        if jwt_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            bail!("AGORA_JWT_SECRET is unset or still a placeholder");
        }

        let host = lookup("AGORA_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = lookup("AGORA_PORT")
            .unwrap_or_else(|| "8000".into())
            .parse()
            .context("AGORA_PORT must be a port number")?;
        let db_path: PathBuf = lookup("AGORA_DB_PATH")
            .unwrap_or_else(|| "agora.db".into())
            .into();
        let ttl_minutes: i64 = lookup("AGORA_TOKEN_TTL_MINUTES")
            .unwrap_or_else(|| "30".into())
            .parse()
            .context("AGORA_TOKEN_TTL_MINUTES must be a whole number of minutes")?;
        if ttl_minutes <= 0 {
            bail!("AGORA_TOKEN_TTL_MINUTES must be positive");
        }

        Ok(Self {
            host,
            port,
            db_path,
            auth: AuthConfig {
                jwt_secret,
                token_ttl: Duration::minutes(ttl_minutes),
            },
        })
    }

    pub fn addr(&self) -> Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_only_secret_is_set() {
        let cfg = config(&[("AGORA_JWT_SECRET", "s3cret")]).unwrap();
        assert_eq!(cfg.port, 8000);
        assert_eq!(cfg.db_path, PathBuf::from("agora.db"));
        assert_eq!(cfg.auth.token_ttl, Duration::minutes(30));
        assert_eq!(cfg.addr().unwrap().to_string(), "0.0.0.0:8000");
    }

    #[test]
    fn missing_or_placeholder_secret_is_refused() {
        assert!(config(&[]).is_err());
        assert!(config(&[("AGORA_JWT_SECRET", "dev-secret-change-me")]).is_err());
    }

    #[test]
    fn overrides_are_parsed() {
        let cfg = config(&[
            ("AGORA_JWT_SECRET", "s3cret"),
            ("AGORA_HOST", "127.0.0.1"),
            ("AGORA_PORT", "9001"),
            ("AGORA_DB_PATH", "/tmp/feed.db"),
            ("AGORA_TOKEN_TTL_MINUTES", "5"),
        ])
        .unwrap();
        assert_eq!(cfg.addr().unwrap().to_string(), "127.0.0.1:9001");
        assert_eq!(cfg.db_path, PathBuf::from("/tmp/feed.db"));
        assert_eq!(cfg.auth.token_ttl, Duration::minutes(5));
    }

    #[test]
    fn bad_numbers_are_errors() {
        assert!(config(&[("AGORA_JWT_SECRET", "s"), ("AGORA_PORT", "eighty")]).is_err());
        assert!(config(&[("AGORA_JWT_SECRET", "s"), ("AGORA_TOKEN_TTL_MINUTES", "0")]).is_err());
    }
}
