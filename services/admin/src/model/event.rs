//! Audit-trail records.
//!
//! # Key invariants
//! - Events are append-only; nothing in this service updates or deletes one.
//! - The actor fields are copied from verified claims, never from request
//!   bodies.
use cadence_authz::{NodeAddr, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Action tag recorded with every audit event.
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    AuditCrontabJob,
    AuditDaemonJob,
    SignupUser,
    GroupUser,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::AuditCrontabJob => "audit_crontab_job",
            EventKind::AuditDaemonJob => "audit_daemon_job",
            EventKind::SignupUser => "signup_user",
            EventKind::GroupUser => "group_user",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq)]
pub struct AuditEvent {
    pub id: u64,
    /// Affected names joined with `,`.
    pub subject: String,
    pub kind: EventKind,
    #[schema(value_type = Option<String>)]
    pub addr: Option<NodeAddr>,
    #[schema(value_type = Object)]
    pub payload: serde_json::Value,
    #[schema(value_type = u64)]
    pub user_id: UserId,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

/// Event contents before the store assigns an id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAuditEvent {
    pub subject: String,
    pub kind: EventKind,
    pub addr: Option<NodeAddr>,
    pub payload: serde_json::Value,
    pub user_id: UserId,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

impl NewAuditEvent {
    pub fn into_event(self, id: u64) -> AuditEvent {
        AuditEvent {
            id,
            subject: self.subject,
            kind: self.kind,
            addr: self.addr,
            payload: self.payload,
            user_id: self.user_id,
            username: self.username,
            created_at: self.created_at,
        }
    }
}
