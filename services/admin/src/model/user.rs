//! Operator accounts.
//!
//! # Security
//! Password hashes live only in [`UserRecord`], which is never serialized;
//! [`User`] is the client-facing projection.
use cadence_authz::{GroupId, IdentityPayload, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq, Eq)]
pub struct User {
    #[schema(value_type = u64)]
    pub id: UserId,
    pub username: String,
    pub mail: String,
    #[schema(value_type = u64)]
    pub group_id: GroupId,
    /// Name of the owning group, filled in on list reads.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_name: Option<String>,
    pub root: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Identity fields carried in a session token for this user.
    pub fn identity(&self) -> IdentityPayload {
        IdentityPayload {
            user_id: self.id,
            username: self.username.clone(),
            mail: self.mail.clone(),
            group_id: self.group_id,
            root: self.root,
        }
    }
}

/// Stored account including the PHC-encoded password hash.
#[derive(Clone)]
pub struct UserRecord {
    pub user: User,
    pub password_hash: String,
}

impl std::fmt::Debug for UserRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserRecord")
            .field("user", &self.user)
            .field("password_hash", &"<redacted>")
            .finish()
    }
}

/// Account creation input; `password` is plaintext and hashed by the store.
#[derive(Clone)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub mail: String,
    pub group_id: GroupId,
    pub root: bool,
}

impl std::fmt::Debug for NewUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewUser")
            .field("username", &self.username)
            .field("mail", &self.mail)
            .field("group_id", &self.group_id)
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}
