//! Worker node RPC channel.
//!
//! # Purpose
//! Defines the single blocking call the admin plane makes against a worker
//! node, plus the HTTP transport used in production.
//!
//! # Wire format
//! `POST http://{addr}/rpc` with body `{"method": "...", "params": {...}}`.
//! The node answers `{"result": ...}` on success or `{"error": "..."}` when the
//! method itself failed.
use async_trait::async_trait;
use cadence_authz::NodeAddr;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("remote error: {0}")]
    Remote(String),
    #[error("invalid reply: {0}")]
    Decode(String),
}

/// A request/reply call against one worker node.
#[async_trait]
pub trait NodeRpc: Send + Sync {
    async fn invoke(
        &self,
        addr: &NodeAddr,
        method: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, RpcError>;
}

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    method: &'a str,
    params: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct RpcReply {
    #[serde(default)]
    result: Option<serde_json::Value>,
    #[serde(default)]
    error: Option<String>,
}

/// JSON-over-HTTP node client.
#[derive(Debug, Clone)]
pub struct HttpNodeRpc {
    client: reqwest::Client,
}

impl HttpNodeRpc {
    /// Build a client whose connect phase is bounded by `connect_timeout`.
    /// The overall call deadline is enforced by the dispatcher.
    pub fn new(connect_timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .no_proxy()
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self { client })
    }

    fn endpoint(addr: &NodeAddr) -> String {
        format!("http://{addr}/rpc")
    }
}

#[async_trait]
impl NodeRpc for HttpNodeRpc {
    async fn invoke(
        &self,
        addr: &NodeAddr,
        method: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, RpcError> {
        let response = self
            .client
            .post(Self::endpoint(addr))
            .json(&RpcRequest { method, params })
            .send()
            .await
            .map_err(|err| RpcError::Transport(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(RpcError::Transport(format!("node answered {status}")));
        }
        let reply: RpcReply = response
            .json()
            .await
            .map_err(|err| RpcError::Decode(err.to_string()))?;
        match reply.error {
            Some(message) if !message.is_empty() => Err(RpcError::Remote(message)),
            _ => Ok(reply.result.unwrap_or(serde_json::Value::Null)),
        }
    }
}
