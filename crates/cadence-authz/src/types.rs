//! Strongly typed identifiers for users, groups, and worker nodes.
//!
//! # Purpose
//! Wraps raw ids and addresses so a user id can never be passed where a group
//! id is expected, which matters most in the ownership predicates.
//!
//! # Key invariants
//! - Ids serialize as their bare integer (`#[serde(transparent)]`) so tokens
//!   and API payloads stay flat.
//! - [`SUPER_GROUP_ID`] is reserved; members of that group act across all
//!   groups and nodes.
use serde::{Deserialize, Serialize};

/// Opaque user identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(u64);

impl UserId {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Group (tenant boundary) identifier.
///
/// # Example
/// ```rust
/// use cadence_authz::{GroupId, SUPER_GROUP_ID};
///
/// assert!(GroupId::new(1).is_super());
/// assert_eq!(SUPER_GROUP_ID.get(), 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(u64);

/// The reserved super group.
pub const SUPER_GROUP_ID: GroupId = GroupId(1);

impl GroupId {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u64 {
        self.0
    }

    pub fn is_super(self) -> bool {
        self == SUPER_GROUP_ID
    }
}

impl std::fmt::Display for GroupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Network address of a worker node.
///
/// # Invariants
/// - The inner string is preserved exactly; it is the lookup key for node
///   ownership and the RPC target.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeAddr(String);

impl NodeAddr {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NodeAddr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
