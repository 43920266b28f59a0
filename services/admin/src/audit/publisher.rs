//! Best-effort audit-trail writer.
//!
//! # Key invariants
//! - Called only after the privileged action has taken effect.
//! - A failed append is logged and counted, never returned to the caller; the
//!   action it describes stays committed.
use crate::model::{AuditEvent, EventKind, NewAuditEvent};
use crate::store::{EventStore, StoreError};
use cadence_authz::{IdentityClaims, NodeAddr};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

/// An audit event that could not be persisted.
#[derive(Debug, Error)]
#[error("failed to record {kind} event for {subject:?}: {source}")]
pub struct AuditWriteFailure {
    pub kind: EventKind,
    pub subject: String,
    #[source]
    pub source: StoreError,
}

pub struct EventPublisher {
    store: Arc<dyn EventStore>,
}

impl EventPublisher {
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self { store }
    }

    /// Record an event; failures are swallowed after logging.
    pub async fn publish<P: Serialize + ?Sized>(
        &self,
        subject: &str,
        kind: EventKind,
        addr: Option<&NodeAddr>,
        payload: &P,
        claims: &IdentityClaims,
    ) {
        if let Err(failure) = self.try_publish(subject, kind, addr, payload, claims).await {
            metrics::counter!("cadence_audit_write_failures_total").increment(1);
            tracing::error!(
                error = %failure,
                kind = %failure.kind,
                actor = %claims.user_id(),
                "audit event dropped"
            );
        }
    }

    /// Same as [`EventPublisher::publish`] but surfaces the write failure.
    pub async fn try_publish<P: Serialize + ?Sized>(
        &self,
        subject: &str,
        kind: EventKind,
        addr: Option<&NodeAddr>,
        payload: &P,
        claims: &IdentityClaims,
    ) -> Result<AuditEvent, AuditWriteFailure> {
        let payload = serde_json::to_value(payload).unwrap_or_else(|err| {
            tracing::warn!(error = %err, %kind, "audit payload not serializable; recording null");
            serde_json::Value::Null
        });
        let event = NewAuditEvent {
            subject: subject.to_string(),
            kind,
            addr: addr.cloned(),
            payload,
            user_id: claims.user_id(),
            username: claims.username().to_string(),
            created_at: Utc::now(),
        };
        let stored = self
            .store
            .append_event(event)
            .await
            .map_err(|source| AuditWriteFailure {
                kind,
                subject: subject.to_string(),
                source,
            })?;
        metrics::counter!("cadence_audit_events_total", "kind" => kind.as_str()).increment(1);
        tracing::debug!(event_id = stored.id, %kind, "audit event recorded");
        Ok(stored)
    }
}
