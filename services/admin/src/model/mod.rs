//! Admin-plane data model.
//!
//! # Purpose
//! Re-exports the user, group, node, audit event, and job history records
//! shared by the store, audit, and HTTP layers.
mod event;
mod group;
mod job;
mod node;
mod user;

pub use event::{AuditEvent, EventKind, NewAuditEvent};
pub use group::Group;
pub use job::{JobHistory, JobKind, NewJobHistory};
pub use node::{Node, NodeStats};
pub use user::{NewUser, User, UserRecord};
