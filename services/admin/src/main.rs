//! Cadence admin-plane HTTP service entry point.
//!
//! # Purpose
//! Loads configuration, seeds the in-memory store, wires the audit RPC
//! client, and serves the admin API plus the metrics listener.
use admin::app::{AppState, build_router};
use admin::audit::HttpNodeRpc;
use admin::config::AdminConfig;
use admin::model::{Group, Node};
use admin::observability;
use admin::store::{AdminStore, DirectoryStore};
use admin::store::memory::InMemoryStore;
use anyhow::Context;
use cadence_authz::{GroupId, NodeAddr};
use std::future::Future;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AdminConfig::from_env_or_yaml().context("admin config")?;
    run_with_shutdown(config, async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await
}

async fn run_with_shutdown<F>(config: AdminConfig, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let metrics_handle = observability::init_observability("cadence-admin");
    let state = build_state(&config).await?;
    let metrics_task = tokio::spawn(observability::serve_metrics(
        metrics_handle,
        config.metrics_bind,
    ));

    let app = build_router(state.clone());
    let addr = config.bind_addr;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind {addr}"))?;
    tracing::info!(%addr, backend = state.store.backend_name(), "admin plane listening");
    tokio::pin!(shutdown);
    tokio::select! {
        result = axum::serve(listener, app.into_make_service()) => {
            result?;
        }
        _ = &mut shutdown => {}
    }

    metrics_task.abort();
    let _ = metrics_task.await;
    Ok(())
}

async fn build_state(config: &AdminConfig) -> anyhow::Result<AppState> {
    let store = Arc::new(InMemoryStore::new());
    for seed in &config.groups {
        store
            .seed_group(Group {
                id: GroupId::new(seed.id),
                name: seed.name.clone(),
            })
            .await;
    }
    for seed in &config.nodes {
        store
            .upsert_node(Node::new(
                NodeAddr::new(seed.addr.clone()),
                GroupId::new(seed.group_id),
            ))
            .await
            .with_context(|| format!("seed node {}", seed.addr))?;
    }
    let rpc = Arc::new(HttpNodeRpc::new(config.rpc_timeout).context("build node rpc client")?);
    Ok(AppState::new(
        store,
        config.signing_config(),
        rpc,
        config.rpc_timeout,
    ))
}
