//! Gateway configuration from environment variables with optional YAML
//! overrides.
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::net::SocketAddr;

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    // HTTP listener bind address.
    pub bind_addr: SocketAddr,
    // Metrics HTTP listener bind address.
    pub metrics_bind: SocketAddr,
    // Authserver base URL for JWKS lookups.
    pub auth_url: String,
    // Expected token issuer.
    pub issuer: String,
    // Clock-skew allowance during verification.
    pub leeway_secs: u64,
    // JWKS cache TTL.
    pub jwks_ttl_secs: u64,
}

const DEFAULT_ISSUER: &str = "https://auth.shepherd.dev";
const DEFAULT_LEEWAY_SECS: u64 = 60;
const DEFAULT_JWKS_TTL_SECS: u64 = 3600;

#[derive(Debug, Deserialize)]
struct GatewayConfigOverride {
    bind_addr: Option<String>,
    metrics_bind: Option<String>,
    auth_url: Option<String>,
    issuer: Option<String>,
    leeway_secs: Option<u64>,
    jwks_ttl_secs: Option<u64>,
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self> {
        let bind_addr = std::env::var("SHEPHERD_GW_BIND")
            .unwrap_or_else(|_| "0.0.0.0:8080".to_string())
            .parse()
            .with_context(|| "parse SHEPHERD_GW_BIND")?;
        let metrics_bind = std::env::var("SHEPHERD_GW_METRICS_BIND")
            .unwrap_or_else(|_| "0.0.0.0:9091".to_string())
            .parse()
            .with_context(|| "parse SHEPHERD_GW_METRICS_BIND")?;
        let auth_url = std::env::var("SHEPHERD_GW_AUTH_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:8090".to_string());
        let issuer =
            std::env::var("SHEPHERD_GW_ISSUER").unwrap_or_else(|_| DEFAULT_ISSUER.to_string());
        let leeway_secs = std::env::var("SHEPHERD_GW_LEEWAY_SECS")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .unwrap_or(DEFAULT_LEEWAY_SECS);
        let jwks_ttl_secs = std::env::var("SHEPHERD_GW_JWKS_TTL_SECS")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .filter(|value| *value > 0)
            .unwrap_or(DEFAULT_JWKS_TTL_SECS);
        Ok(Self {
            bind_addr,
            metrics_bind,
            auth_url,
            issuer,
            leeway_secs,
            jwks_ttl_secs,
        })
    }

    pub fn from_env_or_yaml() -> Result<Self> {
        let mut config = Self::from_env()?;
        if let Ok(path) = std::env::var("SHEPHERD_GW_CONFIG") {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("read SHEPHERD_GW_CONFIG: {path}"))?;
            let override_cfg: GatewayConfigOverride =
                serde_yaml::from_str(&contents).with_context(|| "parse gateway config yaml")?;
            if let Some(value) = override_cfg.bind_addr {
                config.bind_addr = value.parse().with_context(|| "parse bind_addr")?;
            }
            if let Some(value) = override_cfg.metrics_bind {
                config.metrics_bind = value.parse().with_context(|| "parse metrics_bind")?;
            }
            if let Some(value) = override_cfg.auth_url {
                config.auth_url = value;
            }
            if let Some(value) = override_cfg.issuer {
                config.issuer = value;
            }
            if let Some(value) = override_cfg.leeway_secs {
                config.leeway_secs = value;
            }
            if let Some(value) = override_cfg.jwks_ttl_secs
                && value > 0
            {
                config.jwks_ttl_secs = value;
            }
        }
        Ok(config)
    }
}
