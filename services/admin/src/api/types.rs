//! HTTP API request/response types.
//!
//! # Purpose
//! Payload shapes for the admin REST API and OpenAPI schema generation, plus
//! the small validation rules each request carries.
use crate::model::{AuditEvent, JobHistory, JobKind, NodeStats, User};
use crate::store::{Page, SortOrder};
use cadence_authz::NodeAddr;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const DEFAULT_PAGESIZE: usize = 50;
pub const MAX_PAGESIZE: usize = 500;

fn default_page() -> usize {
    1
}

fn default_pagesize() -> usize {
    DEFAULT_PAGESIZE
}

fn check_pagesize(pagesize: usize) -> Result<(), String> {
    if pagesize == 0 || pagesize > MAX_PAGESIZE {
        return Err(format!("pagesize must be between 1 and {MAX_PAGESIZE}"));
    }
    Ok(())
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    pub request_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct HealthStatus {
    pub status: String,
    pub backend: String,
}

#[derive(Deserialize, ToSchema, Clone)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    /// Request the 30-day session.
    #[serde(default)]
    pub remember: bool,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("remember", &self.remember)
            .finish_non_exhaustive()
    }
}

impl LoginRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.username.trim().is_empty() || self.password.is_empty() {
            return Err("username and password are required".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: i64,
    pub user_id: u64,
    pub group_id: u64,
    pub root: bool,
    pub mail: String,
}

/// Account creation body shared by signup and admin initialization.
#[derive(Deserialize, ToSchema, Clone)]
pub struct UserRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub mail: String,
    /// Ignored by admin initialization.
    #[serde(default)]
    pub group_id: u64,
    #[serde(default)]
    pub root: bool,
}

impl std::fmt::Debug for UserRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserRequest")
            .field("username", &self.username)
            .field("mail", &self.mail)
            .field("group_id", &self.group_id)
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl UserRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.username.trim().is_empty() {
            return Err("username is required".to_string());
        }
        if self.password.chars().count() < 6 {
            return Err("password must be at least 6 characters".to_string());
        }
        Ok(())
    }
}

/// Audit payload recorded for a signup; never includes the password.
#[derive(Debug, Serialize, Clone)]
pub struct SignupEventPayload {
    pub username: String,
    pub mail: String,
    pub group_id: u64,
    pub root: bool,
}

impl From<&UserRequest> for SignupEventPayload {
    fn from(request: &UserRequest) -> Self {
        Self {
            username: request.username.clone(),
            mail: request.mail.clone(),
            group_id: request.group_id,
            root: request.root,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct SetGroupRequest {
    pub user_id: u64,
    /// Existing group to move the user into; ignored when
    /// `target_group_name` is set.
    #[serde(default)]
    pub target_group_id: u64,
    /// Create a new group with this name and move the user into it.
    #[serde(default)]
    pub target_group_name: Option<String>,
    #[serde(default)]
    pub root: bool,
}

impl SetGroupRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.user_id == 0 {
            return Err("user_id is required".to_string());
        }
        let named = self
            .target_group_name
            .as_deref()
            .is_some_and(|name| !name.trim().is_empty());
        if !named && self.target_group_id == 0 {
            return Err("target_group_id or target_group_name is required".to_string());
        }
        Ok(())
    }

    pub fn new_group_name(&self) -> Option<&str> {
        self.target_group_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct UserListRequest {
    #[serde(default)]
    pub is_all: bool,
    /// `0` means the caller's own group.
    #[serde(default)]
    pub query_group_id: u64,
    #[serde(default = "default_page")]
    pub page: usize,
    #[serde(default = "default_pagesize")]
    pub pagesize: usize,
}

impl UserListRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.page == 0 {
            return Err("page starts at 1".to_string());
        }
        check_pagesize(self.pagesize)
    }

    pub fn offset(&self) -> usize {
        (self.page - 1).saturating_mul(self.pagesize)
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserListResponse {
    pub list: Vec<User>,
    pub total: u64,
    pub page: usize,
    pub pagesize: usize,
}

/// Keyset paging body for activity and job history feeds.
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct ReadMoreRequest {
    #[serde(default)]
    pub last_id: u64,
    #[serde(default = "default_pagesize")]
    pub pagesize: usize,
    #[serde(default)]
    pub orderby: SortOrder,
}

impl ReadMoreRequest {
    pub fn validate(&self) -> Result<(), String> {
        check_pagesize(self.pagesize)
    }

    pub fn page(&self) -> Page {
        Page {
            last_id: self.last_id,
            pagesize: self.pagesize,
            order: self.orderby,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ActivityResponse {
    pub list: Vec<AuditEvent>,
    pub pagesize: usize,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct JobHistoryResponse {
    pub list: Vec<JobHistory>,
    pub pagesize: usize,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct AuditJobRequest {
    #[schema(value_type = String)]
    pub addr: NodeAddr,
    pub job_type: JobKind,
    pub job_ids: Vec<u64>,
}

impl AuditJobRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.addr.as_str().trim().is_empty() {
            return Err("addr is required".to_string());
        }
        if self.job_ids.is_empty() {
            return Err("job_ids must not be empty".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuditJobResponse {
    /// Names of the jobs the node matched, in the node's order.
    pub affected: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct ServerInfo {
    pub version: String,
    pub started_at: DateTime<Utc>,
    pub uptime_secs: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserStatResponse {
    pub server: ServerInfo,
    pub audit_stat: NodeStats,
}
