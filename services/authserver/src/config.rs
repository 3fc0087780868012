use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::net::SocketAddr;

// Authserver configuration sourced from environment variables, with an
// optional YAML override file.
#[derive(Debug, Clone)]
pub struct AuthServerConfig {
    pub bind_addr: SocketAddr,
    pub metrics_bind: SocketAddr,
    pub issuer: String,
    pub access_ttl_secs: i64,
    pub refresh_ttl_secs: i64,
    pub max_refresh_count: u32,
    pub leeway_secs: u64,
}

#[derive(Debug, Deserialize)]
struct AuthServerConfigOverride {
    bind_addr: Option<String>,
    metrics_bind: Option<String>,
    issuer: Option<String>,
    access_ttl_secs: Option<i64>,
    refresh_ttl_secs: Option<i64>,
    max_refresh_count: Option<u32>,
    leeway_secs: Option<u64>,
}

impl AuthServerConfig {
    pub fn from_env() -> Result<Self> {
        let bind_addr = std::env::var("SHEPHERD_AUTH_BIND")
            .unwrap_or_else(|_| "0.0.0.0:8090".to_string())
            .parse()
            .with_context(|| "parse SHEPHERD_AUTH_BIND")?;
        let metrics_bind = std::env::var("SHEPHERD_AUTH_METRICS_BIND")
            .unwrap_or_else(|_| "0.0.0.0:9090".to_string())
            .parse()
            .with_context(|| "parse SHEPHERD_AUTH_METRICS_BIND")?;
        let issuer = std::env::var("SHEPHERD_AUTH_ISSUER")
            .unwrap_or_else(|_| "https://auth.shepherd.dev".to_string());
        let access_ttl_secs = std::env::var("SHEPHERD_AUTH_ACCESS_TTL_SECS")
            .unwrap_or_else(|_| "900".to_string())
            .parse()
            .with_context(|| "parse SHEPHERD_AUTH_ACCESS_TTL_SECS")?;
        let refresh_ttl_secs = std::env::var("SHEPHERD_AUTH_REFRESH_TTL_SECS")
            .unwrap_or_else(|_| "86400".to_string())
            .parse()
            .with_context(|| "parse SHEPHERD_AUTH_REFRESH_TTL_SECS")?;
        let max_refresh_count = std::env::var("SHEPHERD_AUTH_MAX_REFRESH_COUNT")
            .unwrap_or_else(|_| "24".to_string())
            .parse()
            .with_context(|| "parse SHEPHERD_AUTH_MAX_REFRESH_COUNT")?;
        let leeway_secs = std::env::var("SHEPHERD_AUTH_LEEWAY_SECS")
            .unwrap_or_else(|_| "60".to_string())
            .parse()
            .with_context(|| "parse SHEPHERD_AUTH_LEEWAY_SECS")?;
        Ok(Self {
            bind_addr,
            metrics_bind,
            issuer,
            access_ttl_secs,
            refresh_ttl_secs,
            max_refresh_count,
            leeway_secs,
        })
    }

    pub fn from_env_or_yaml() -> Result<Self> {
        let mut config = Self::from_env()?;
        if let Ok(path) = std::env::var("SHEPHERD_AUTH_CONFIG") {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("read SHEPHERD_AUTH_CONFIG: {path}"))?;
            let override_cfg: AuthServerConfigOverride =
                serde_yaml::from_str(&contents).with_context(|| "parse authserver config yaml")?;
            if let Some(value) = override_cfg.bind_addr {
                config.bind_addr = value.parse().with_context(|| "parse bind_addr")?;
            }
            if let Some(value) = override_cfg.metrics_bind {
                config.metrics_bind = value.parse().with_context(|| "parse metrics_bind")?;
            }
            if let Some(value) = override_cfg.issuer {
                config.issuer = value;
            }
            if let Some(value) = override_cfg.access_ttl_secs {
                config.access_ttl_secs = value;
            }
            if let Some(value) = override_cfg.refresh_ttl_secs {
                config.refresh_ttl_secs = value;
            }
            if let Some(value) = override_cfg.max_refresh_count {
                config.max_refresh_count = value;
            }
            if let Some(value) = override_cfg.leeway_secs {
                config.leeway_secs = value;
            }
        }
        Ok(config)
    }
}
