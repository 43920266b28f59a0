//! Admin-plane configuration.
//!
//! Environment variables supply defaults; a YAML file named by
//! `CADENCE_ADMIN_CONFIG` may override them and seed groups and nodes.
use anyhow::{Context, Result, bail};
use cadence_authz::SigningConfig;
use serde::Deserialize;
use std::fs;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_BIND: &str = "0.0.0.0:20000";
const DEFAULT_METRICS_BIND: &str = "0.0.0.0:20001";
const DEFAULT_TOKEN_TTL_SECS: u64 = 3600;
const DEFAULT_RPC_TIMEOUT_MS: u64 = 5000;

#[derive(Clone)]
pub struct AdminConfig {
    pub bind_addr: SocketAddr,
    pub metrics_bind: SocketAddr,
    pub signing_key: String,
    pub token_ttl: Duration,
    pub rpc_timeout: Duration,
    pub groups: Vec<GroupSeed>,
    pub nodes: Vec<NodeSeed>,
}

impl std::fmt::Debug for AdminConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminConfig")
            .field("bind_addr", &self.bind_addr)
            .field("metrics_bind", &self.metrics_bind)
            .field("signing_key", &"<redacted>")
            .field("token_ttl", &self.token_ttl)
            .field("rpc_timeout", &self.rpc_timeout)
            .field("groups", &self.groups)
            .field("nodes", &self.nodes)
            .finish()
    }
}

/// Group created at startup in addition to the built-in super group.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct GroupSeed {
    pub id: u64,
    pub name: String,
}

/// Worker node registered at startup.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct NodeSeed {
    pub addr: String,
    pub group_id: u64,
}

#[derive(Debug, Deserialize)]
struct AdminConfigOverride {
    bind_addr: Option<String>,
    metrics_bind: Option<String>,
    signing_key: Option<String>,
    token_ttl_secs: Option<u64>,
    rpc_timeout_ms: Option<u64>,
    #[serde(default)]
    groups: Vec<GroupSeed>,
    #[serde(default)]
    nodes: Vec<NodeSeed>,
}

fn env_u64(key: &str, default: u64) -> Result<u64> {
    match std::env::var(key) {
        Ok(value) => value.parse().with_context(|| format!("parse {key}")),
        Err(_) => Ok(default),
    }
}

impl AdminConfig {
    pub fn from_env() -> Result<Self> {
        let bind_addr = std::env::var("CADENCE_ADMIN_BIND")
            .unwrap_or_else(|_| DEFAULT_BIND.to_string())
            .parse()
            .with_context(|| "parse CADENCE_ADMIN_BIND")?;
        let metrics_bind = std::env::var("CADENCE_ADMIN_METRICS_BIND")
            .unwrap_or_else(|_| DEFAULT_METRICS_BIND.to_string())
            .parse()
            .with_context(|| "parse CADENCE_ADMIN_METRICS_BIND")?;
        let signing_key = std::env::var("CADENCE_JWT_SIGNING_KEY").unwrap_or_default();
        let token_ttl =
            Duration::from_secs(env_u64("CADENCE_JWT_EXPIRES_SECS", DEFAULT_TOKEN_TTL_SECS)?);
        let rpc_timeout =
            Duration::from_millis(env_u64("CADENCE_RPC_TIMEOUT_MS", DEFAULT_RPC_TIMEOUT_MS)?);
        Ok(Self {
            bind_addr,
            metrics_bind,
            signing_key,
            token_ttl,
            rpc_timeout,
            groups: Vec::new(),
            nodes: Vec::new(),
        })
    }

    /// Load from the environment, apply the YAML override if one is named,
    /// then check the result.
    ///
    /// # Errors
    /// Fails on unparsable values, an unreadable override file, or an empty
    /// signing key.
    pub fn from_env_or_yaml() -> Result<Self> {
        let mut config = Self::from_env()?;
        if let Ok(path) = std::env::var("CADENCE_ADMIN_CONFIG") {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("read CADENCE_ADMIN_CONFIG: {path}"))?;
            let override_cfg: AdminConfigOverride =
                serde_yaml::from_str(&contents).with_context(|| "parse admin config yaml")?;
            config.apply(override_cfg)?;
        }
        config.validate()?;
        Ok(config)
    }

    fn apply(&mut self, override_cfg: AdminConfigOverride) -> Result<()> {
        if let Some(value) = override_cfg.bind_addr {
            self.bind_addr = value.parse().with_context(|| "parse bind_addr")?;
        }
        if let Some(value) = override_cfg.metrics_bind {
            self.metrics_bind = value.parse().with_context(|| "parse metrics_bind")?;
        }
        if let Some(value) = override_cfg.signing_key {
            self.signing_key = value;
        }
        if let Some(value) = override_cfg.token_ttl_secs {
            self.token_ttl = Duration::from_secs(value);
        }
        if let Some(value) = override_cfg.rpc_timeout_ms {
            self.rpc_timeout = Duration::from_millis(value);
        }
        self.groups.extend(override_cfg.groups);
        self.nodes.extend(override_cfg.nodes);
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.signing_key.is_empty() {
            bail!("CADENCE_JWT_SIGNING_KEY must be set");
        }
        if self.token_ttl.is_zero() {
            bail!("token ttl must be positive");
        }
        if self.rpc_timeout.is_zero() {
            bail!("rpc timeout must be positive");
        }
        if let Some(seed) = self.groups.iter().find(|seed| seed.id <= 1) {
            bail!("group seed {} reuses a reserved id", seed.name);
        }
        Ok(())
    }

    /// Immutable signing material shared by every token operation.
    pub fn signing_config(&self) -> Arc<SigningConfig> {
        Arc::new(SigningConfig::new(
            self.signing_key.as_bytes().to_vec(),
            self.token_ttl,
        ))
    }
}
