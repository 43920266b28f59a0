//! Audit dispatch and the audit trail.
//!
//! # Purpose
//! Forwards job audit commands to the worker node that owns the jobs and
//! records an immutable event once a privileged action has taken effect.
//!
//! # Key invariants
//! - One audit command is one remote call to one node; no fan-out, no retry.
//! - An event is published only after the action succeeded. A failed dispatch
//!   never produces an event.
//! - Publishing never fails the caller.
pub mod dispatcher;
pub mod publisher;
pub mod rpc;

pub use dispatcher::{AuditDispatcher, DispatchError};
pub use publisher::{AuditWriteFailure, EventPublisher};
pub use rpc::{HttpNodeRpc, NodeRpc, RpcError};
