//! In-memory implementation of the admin store.
//!
//! # Purpose
//! Implements every store trait over maps guarded by `tokio::sync::RwLock`.
//! Used for local development, tests, and deployments where the record owner
//! lives elsewhere and this process only needs a working cache of it.
//!
//! # Durability and consistency
//! - **Not durable**: all state is lost on restart.
//! - Ids are assigned by this process, strictly increasing per table.
//! - Multi-step checks (username uniqueness, first-admin creation) run under a
//!   single write lock, so they are atomic within the process.
//!
//! # Metrics
//! Keeps `cadence_users_total` and `cadence_nodes_total` gauges current.
use super::{
    AdminStore, CredentialStore, DirectoryStore, EventStore, JobHistoryStore, Page, SortOrder,
    StoreError, StoreResult, UserQuery, UserStore,
};
use crate::auth::password;
use crate::model::{
    AuditEvent, Group, JobHistory, NewAuditEvent, NewJobHistory, NewUser, Node, NodeStats, User,
    UserRecord,
};
use async_trait::async_trait;
use cadence_authz::{GroupId, LookupError, NodeAddr, NodeDirectory, SUPER_GROUP_ID, UserId};
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

const SUPER_GROUP_NAME: &str = "super";

/// Id-keyed rows with a monotonically increasing id allocator.
#[derive(Debug)]
struct Table<T> {
    next_id: u64,
    rows: BTreeMap<u64, T>,
}

impl<T> Table<T> {
    fn starting_at(next_id: u64) -> Self {
        Self {
            next_id,
            rows: BTreeMap::new(),
        }
    }

    fn insert_with(&mut self, build: impl FnOnce(u64) -> T) -> &T {
        let id = self.next_id;
        self.next_id += 1;
        self.rows.entry(id).or_insert_with(|| build(id))
    }

    /// Rows strictly past `page.last_id` in the page direction.
    fn page<'a>(
        &'a self,
        page: Page,
        mut keep: impl FnMut(&T) -> bool + 'a,
    ) -> Box<dyn Iterator<Item = &'a T> + 'a> {
        let last_id = page.last_id;
        let iter: Box<dyn Iterator<Item = (&'a u64, &'a T)> + 'a> = match page.order {
            SortOrder::Desc if last_id == 0 => Box::new(self.rows.iter().rev()),
            SortOrder::Desc => Box::new(self.rows.range(..last_id).rev()),
            SortOrder::Asc => Box::new(self.rows.range(last_id.saturating_add(1)..)),
        };
        Box::new(
            iter.map(|(_, row)| row)
                .filter(move |row| keep(*row))
                .take(page.pagesize),
        )
    }
}

/// In-memory admin store.
///
/// All tables are `Arc<RwLock<...>>` so the store can be shared by every
/// request handler; reads proceed concurrently and writes are serialized.
pub struct InMemoryStore {
    users: Arc<RwLock<Table<UserRecord>>>,
    groups: Arc<RwLock<Table<Group>>>,
    nodes: Arc<RwLock<HashMap<NodeAddr, Node>>>,
    events: Arc<RwLock<Table<AuditEvent>>>,
    history: Arc<RwLock<Table<JobHistory>>>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    /// Empty store holding only the reserved super group.
    pub fn new() -> Self {
        let mut groups = Table::starting_at(SUPER_GROUP_ID.get() + 1);
        groups.rows.insert(
            SUPER_GROUP_ID.get(),
            Group {
                id: SUPER_GROUP_ID,
                name: SUPER_GROUP_NAME.to_string(),
            },
        );
        Self {
            users: Arc::new(RwLock::new(Table::starting_at(1))),
            groups: Arc::new(RwLock::new(groups)),
            nodes: Arc::new(RwLock::new(HashMap::new())),
            events: Arc::new(RwLock::new(Table::starting_at(1))),
            history: Arc::new(RwLock::new(Table::starting_at(1))),
        }
    }

    /// Insert or rename a group with a caller-chosen id.
    pub async fn seed_group(&self, group: Group) {
        let mut groups = self.groups.write().await;
        let id = group.id.get();
        groups.next_id = groups.next_id.max(id.saturating_add(1));
        groups.rows.insert(id, group);
    }

    /// `password_hash` is computed by the caller before `users` is locked.
    async fn insert_user(
        &self,
        users: &mut Table<UserRecord>,
        user: NewUser,
        password_hash: String,
    ) -> StoreResult<User> {
        if users
            .rows
            .values()
            .any(|record| record.user.username == user.username)
        {
            return Err(StoreError::Conflict(format!(
                "username {} already exists",
                user.username
            )));
        }
        if !self.groups.read().await.rows.contains_key(&user.group_id.get()) {
            return Err(StoreError::NotFound(format!("group {}", user.group_id)));
        }
        let record = users.insert_with(|id| UserRecord {
            user: User {
                id: UserId::new(id),
                username: user.username,
                mail: user.mail,
                group_id: user.group_id,
                group_name: None,
                root: user.root,
                created_at: Utc::now(),
            },
            password_hash,
        });
        let created = record.user.clone();
        metrics::gauge!("cadence_users_total").set(users.rows.len() as f64);
        Ok(created)
    }
}

#[async_trait]
impl CredentialStore for InMemoryStore {
    async fn find_by_username(&self, username: &str) -> StoreResult<UserRecord> {
        self.users
            .read()
            .await
            .rows
            .values()
            .find(|record| record.user.username == username)
            .cloned()
            .ok_or_else(|| StoreError::NotFound("user".to_string()))
    }

    async fn verify_password(&self, record: &UserRecord, plaintext: &str) -> bool {
        password::verify(record.password_hash.clone(), plaintext.to_string()).await
    }
}

#[async_trait]
impl NodeDirectory for InMemoryStore {
    async fn resolve_node_group(&self, addr: &NodeAddr) -> Result<Option<GroupId>, LookupError> {
        Ok(self.nodes.read().await.get(addr).map(|node| node.group_id))
    }
}

#[async_trait]
impl DirectoryStore for InMemoryStore {
    async fn resolve_group(&self, id: GroupId) -> StoreResult<Group> {
        self.groups
            .read()
            .await
            .rows
            .get(&id.get())
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("group {id}")))
    }

    async fn create_group(&self, name: &str) -> StoreResult<Group> {
        let mut groups = self.groups.write().await;
        if groups.rows.values().any(|group| group.name == name) {
            return Err(StoreError::Conflict(format!("group {name} already exists")));
        }
        let group = groups.insert_with(|id| Group {
            id: GroupId::new(id),
            name: name.to_string(),
        });
        Ok(group.clone())
    }

    async fn list_group_addrs(&self, group: Option<GroupId>) -> StoreResult<Vec<NodeAddr>> {
        let nodes = self.nodes.read().await;
        let mut addrs: Vec<NodeAddr> = nodes
            .values()
            .filter(|node| group.is_none_or(|group| node.group_id == group))
            .map(|node| node.addr.clone())
            .collect();
        addrs.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        Ok(addrs)
    }

    async fn node_stats(&self, group: GroupId) -> StoreResult<NodeStats> {
        let nodes = self.nodes.read().await;
        let mut stats = NodeStats::default();
        for node in nodes.values().filter(|node| node.group_id == group) {
            stats.add(node);
        }
        Ok(stats)
    }

    async fn upsert_node(&self, node: Node) -> StoreResult<()> {
        let mut nodes = self.nodes.write().await;
        nodes.insert(node.addr.clone(), node);
        metrics::gauge!("cadence_nodes_total").set(nodes.len() as f64);
        Ok(())
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        let password_hash = password::hash(user.password.clone()).await?;
        let mut users = self.users.write().await;
        self.insert_user(&mut users, user, password_hash).await
    }

    async fn create_first_in_group(&self, user: NewUser) -> StoreResult<User> {
        let password_hash = password::hash(user.password.clone()).await?;
        let mut users = self.users.write().await;
        if users
            .rows
            .values()
            .any(|record| record.user.group_id == user.group_id)
        {
            return Err(StoreError::Conflict(format!(
                "group {} already has members",
                user.group_id
            )));
        }
        self.insert_user(&mut users, user, password_hash).await
    }

    async fn set_user_group(&self, id: UserId, group: GroupId, root: bool) -> StoreResult<User> {
        self.resolve_group(group).await?;
        let mut users = self.users.write().await;
        let record = users
            .rows
            .get_mut(&id.get())
            .ok_or_else(|| StoreError::NotFound(format!("user {id}")))?;
        record.user.group_id = group;
        record.user.root = root;
        Ok(record.user.clone())
    }

    async fn get_user(&self, id: UserId) -> StoreResult<User> {
        self.users
            .read()
            .await
            .rows
            .get(&id.get())
            .map(|record| record.user.clone())
            .ok_or_else(|| StoreError::NotFound(format!("user {id}")))
    }

    async fn list_users(&self, query: UserQuery) -> StoreResult<Vec<User>> {
        let users = self.users.read().await;
        let groups = self.groups.read().await;
        Ok(users
            .rows
            .values()
            .filter(|record| query.group.is_none_or(|group| record.user.group_id == group))
            .skip(query.offset)
            .take(query.limit)
            .map(|record| {
                let mut user = record.user.clone();
                user.group_name = groups
                    .rows
                    .get(&user.group_id.get())
                    .map(|group| group.name.clone());
                user
            })
            .collect())
    }

    async fn count_users(&self, group: Option<GroupId>) -> StoreResult<u64> {
        let users = self.users.read().await;
        Ok(users
            .rows
            .values()
            .filter(|record| group.is_none_or(|group| record.user.group_id == group))
            .count() as u64)
    }
}

#[async_trait]
impl EventStore for InMemoryStore {
    async fn append_event(&self, event: NewAuditEvent) -> StoreResult<AuditEvent> {
        let mut events = self.events.write().await;
        Ok(events.insert_with(|id| event.into_event(id)).clone())
    }

    async fn list_events(&self, user_id: UserId, page: Page) -> StoreResult<Vec<AuditEvent>> {
        let events = self.events.read().await;
        Ok(events
            .page(page, move |event| event.user_id == user_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl JobHistoryStore for InMemoryStore {
    async fn list_job_history(
        &self,
        addrs: &[NodeAddr],
        page: Page,
    ) -> StoreResult<Vec<JobHistory>> {
        let history = self.history.read().await;
        Ok(history
            .page(page, |entry| addrs.contains(&entry.addr))
            .cloned()
            .collect())
    }

    async fn record_job_history(&self, entry: NewJobHistory) -> StoreResult<JobHistory> {
        let mut history = self.history.write().await;
        let created = history.insert_with(|id| JobHistory {
            id,
            job_id: entry.job_id,
            job_name: entry.job_name,
            job_type: entry.job_type,
            addr: entry.addr,
            exit_msg: entry.exit_msg,
            start_time: entry.start_time,
            end_time: entry.end_time,
            created_at: Utc::now(),
        });
        Ok(created.clone())
    }
}

#[async_trait]
impl AdminStore for InMemoryStore {
    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
