#![allow(dead_code)]

use admin::app::{AppState, build_router};
use admin::audit::{EventPublisher, NodeRpc, RpcError};
use admin::model::{AuditEvent, NewAuditEvent, NewUser, Node, User};
use admin::store::memory::InMemoryStore;
use admin::store::{
    DirectoryStore, EventStore, Page, SortOrder, StoreError, StoreResult, UserStore,
};
use async_trait::async_trait;
use axum::Router;
use cadence_authz::{GroupId, NodeAddr, SessionTtl, SigningConfig, UserId};
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const SIGNING_KEY: &[u8] = b"integration-signing-key";

pub async fn read_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}

/// How the scripted node answers every call.
#[derive(Clone)]
pub enum Script {
    Reply(Value),
    Fail(String),
    Hang(Duration),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub addr: NodeAddr,
    pub method: String,
    pub params: Value,
}

pub struct ScriptedRpc {
    script: Script,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedRpc {
    pub fn new(script: Script) -> Arc<Self> {
        Arc::new(Self {
            script,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().expect("calls").clone()
    }
}

#[async_trait]
impl NodeRpc for ScriptedRpc {
    async fn invoke(&self, addr: &NodeAddr, method: &str, params: Value) -> Result<Value, RpcError> {
        self.calls.lock().expect("calls").push(RecordedCall {
            addr: addr.clone(),
            method: method.to_string(),
            params,
        });
        match &self.script {
            Script::Reply(value) => Ok(value.clone()),
            Script::Fail(reason) => Err(RpcError::Transport(reason.clone())),
            Script::Hang(delay) => {
                tokio::time::sleep(*delay).await;
                Ok(Value::Null)
            }
        }
    }
}

/// Event store that rejects every write.
#[derive(Default)]
pub struct FailingEventStore {
    pub attempts: AtomicUsize,
}

#[async_trait]
impl EventStore for FailingEventStore {
    async fn append_event(&self, _event: NewAuditEvent) -> StoreResult<AuditEvent> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(StoreError::Unexpected(anyhow::anyhow!("event table offline")))
    }

    async fn list_events(&self, _user_id: UserId, _page: Page) -> StoreResult<Vec<AuditEvent>> {
        Ok(Vec::new())
    }
}

pub struct Harness {
    pub store: Arc<InMemoryStore>,
    pub rpc: Arc<ScriptedRpc>,
    pub state: AppState,
}

impl Harness {
    pub fn new(script: Script) -> Self {
        Self::with_timeout(script, Duration::from_secs(2))
    }

    pub fn with_timeout(script: Script, rpc_timeout: Duration) -> Self {
        let store = Arc::new(InMemoryStore::new());
        let rpc = ScriptedRpc::new(script);
        let signing = Arc::new(SigningConfig::new(
            SIGNING_KEY.to_vec(),
            Duration::from_secs(3600),
        ));
        let state = AppState::new(store.clone(), signing, rpc.clone(), rpc_timeout);
        Self { store, rpc, state }
    }

    /// Route audit writes to a store that always fails.
    pub fn fail_event_writes(&mut self) -> Arc<FailingEventStore> {
        let failing = Arc::new(FailingEventStore::default());
        self.state.publisher = Arc::new(EventPublisher::new(failing.clone()));
        failing
    }

    pub fn router(&self) -> Router {
        build_router(self.state.clone())
    }

    pub async fn group(&self, name: &str) -> GroupId {
        self.store.create_group(name).await.expect("group").id
    }

    pub async fn node(&self, addr: &str, group: GroupId) -> NodeAddr {
        let addr = NodeAddr::new(addr);
        self.store
            .upsert_node(Node::new(addr.clone(), group))
            .await
            .expect("node");
        addr
    }

    pub async fn user(&self, username: &str, group: GroupId, root: bool) -> User {
        self.store
            .create_user(NewUser {
                username: username.to_string(),
                password: format!("{username}-password"),
                mail: format!("{username}@example.com"),
                group_id: group,
                root,
            })
            .await
            .expect("user")
    }

    pub fn token_for(&self, user: &User) -> String {
        self.state
            .codec
            .issue(user.identity(), SessionTtl::Default)
            .expect("token")
            .token
    }

    pub async fn events_for(&self, user: &User) -> Vec<AuditEvent> {
        self.store
            .list_events(
                user.id,
                Page {
                    last_id: 0,
                    pagesize: 100,
                    order: SortOrder::Asc,
                },
            )
            .await
            .expect("events")
    }
}
