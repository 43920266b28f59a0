//! Storage collaborators used by the admin plane.
//!
//! # Purpose
//! Narrow async interfaces over user, group, node, audit-event, and job-history
//! records. Handlers and core components depend on these traits only; the
//! in-memory backend in [`memory`] is the shipped implementation.
//!
//! # Key invariants
//! - Reads never mutate.
//! - `append_event` is the only write path for audit events and is append-only.
use crate::model::{
    AuditEvent, Group, JobHistory, NewAuditEvent, NewJobHistory, NewUser, Node, NodeStats, User,
    UserRecord,
};
use async_trait::async_trait;
use cadence_authz::{GroupId, NodeAddr, NodeDirectory, UserId};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

pub mod memory;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Sort direction for id-keyed feeds.
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Desc,
    Asc,
}

/// Keyset page over an id-ordered feed.
///
/// `last_id == 0` starts from the newest (desc) or oldest (asc) row; otherwise
/// the page continues strictly past `last_id` in the chosen direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub last_id: u64,
    pub pagesize: usize,
    pub order: SortOrder,
}

/// Offset page over the user table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserQuery {
    /// `None` lists every group.
    pub group: Option<GroupId>,
    pub offset: usize,
    pub limit: usize,
}

#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> StoreResult<UserRecord>;
    /// Runs the hash comparison off the async workers.
    async fn verify_password(&self, record: &UserRecord, plaintext: &str) -> bool;
}

#[async_trait]
pub trait DirectoryStore: Send + Sync {
    async fn resolve_group(&self, id: GroupId) -> StoreResult<Group>;
    async fn create_group(&self, name: &str) -> StoreResult<Group>;
    /// Node addresses owned by `group`, or every node when `None`.
    async fn list_group_addrs(&self, group: Option<GroupId>) -> StoreResult<Vec<NodeAddr>>;
    async fn node_stats(&self, group: GroupId) -> StoreResult<NodeStats>;
    async fn upsert_node(&self, node: Node) -> StoreResult<()>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create_user(&self, user: NewUser) -> StoreResult<User>;
    /// Create `user` only if its group has no members yet; `Conflict` otherwise.
    async fn create_first_in_group(&self, user: NewUser) -> StoreResult<User>;
    async fn set_user_group(&self, id: UserId, group: GroupId, root: bool) -> StoreResult<User>;
    async fn get_user(&self, id: UserId) -> StoreResult<User>;
    async fn list_users(&self, query: UserQuery) -> StoreResult<Vec<User>>;
    async fn count_users(&self, group: Option<GroupId>) -> StoreResult<u64>;
}

/// Audit-trail store.
#[async_trait]
pub trait EventStore: Send + Sync {
    async fn append_event(&self, event: NewAuditEvent) -> StoreResult<AuditEvent>;
    async fn list_events(&self, user_id: UserId, page: Page) -> StoreResult<Vec<AuditEvent>>;
}

/// Finished job runs.
///
/// The admin plane only reads this table. Rows are written by the node
/// reporting pipeline, which owns `record_job_history`; the in-memory backend
/// exposes it so that pipeline (and tests) can populate the history.
#[async_trait]
pub trait JobHistoryStore: Send + Sync {
    async fn list_job_history(&self, addrs: &[NodeAddr], page: Page)
    -> StoreResult<Vec<JobHistory>>;
    async fn record_job_history(&self, entry: NewJobHistory) -> StoreResult<JobHistory>;
}

/// Everything the HTTP layer needs from one backend.
#[async_trait]
pub trait AdminStore:
    CredentialStore + NodeDirectory + DirectoryStore + UserStore + EventStore + JobHistoryStore
{
    async fn health_check(&self) -> StoreResult<()>;
    fn backend_name(&self) -> &'static str;
}
