//! Fixed-role authorization predicates.
//!
//! # Purpose
//! Answers "may this caller act on that group or node?" from already verified
//! [`IdentityClaims`]. Handlers combine these predicates with [`require`]
//! instead of comparing group ids inline.
//!
//! # Key invariants
//! - Members of [`SUPER_GROUP_ID`] own every group and every node.
//! - `root` grants privilege, not group ownership.
//! - [`owns_node`] fails closed: an unknown node or a failed lookup is never
//!   owned by anyone.
//! - Callers evaluate the guard before any write, RPC, or event.
use crate::{AuthError, AuthResult, GroupId, IdentityClaims, LookupError, NodeAddr};
use async_trait::async_trait;
use std::collections::HashMap;

/// Resolves which group owns a worker node.
#[async_trait]
pub trait NodeDirectory: Send + Sync {
    /// `Ok(None)` when the address is not registered.
    async fn resolve_node_group(&self, addr: &NodeAddr) -> Result<Option<GroupId>, LookupError>;
}

#[async_trait]
impl NodeDirectory for HashMap<NodeAddr, GroupId> {
    async fn resolve_node_group(&self, addr: &NodeAddr) -> Result<Option<GroupId>, LookupError> {
        Ok(self.get(addr).copied())
    }
}

pub fn is_super(claims: &IdentityClaims) -> bool {
    claims.group_id().is_super()
}

pub fn is_privileged(claims: &IdentityClaims) -> bool {
    is_super(claims) || claims.root()
}

pub fn owns_group(claims: &IdentityClaims, target: GroupId) -> bool {
    claims.group_id() == target || is_super(claims)
}

/// Resolve the node's owning group, then apply [`owns_group`].
pub async fn owns_node<D>(claims: &IdentityClaims, addr: &NodeAddr, directory: &D) -> bool
where
    D: NodeDirectory + ?Sized,
{
    match directory.resolve_node_group(addr).await {
        Ok(Some(group_id)) => owns_group(claims, group_id),
        Ok(None) => {
            tracing::debug!(addr = %addr, "node not registered; denying");
            false
        }
        Err(err) => {
            tracing::warn!(addr = %addr, error = %err, "node ownership lookup failed; denying");
            false
        }
    }
}

/// Turn a predicate outcome into a guard decision.
///
/// ```rust
/// use cadence_authz::{AuthError, guard::require};
///
/// assert!(require(true).is_ok());
/// assert!(matches!(require(false), Err(AuthError::NotAuthorized)));
/// ```
pub fn require(allowed: bool) -> AuthResult<()> {
    if allowed {
        Ok(())
    } else {
        Err(AuthError::NotAuthorized)
    }
}
