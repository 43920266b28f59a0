//! Audit command dispatch to the owning worker node.
//!
//! # Purpose
//! Sends one audit command for a batch of job ids to one node and returns the
//! names of the jobs the node actually matched, in the node's order.
//!
//! # Key invariants
//! - Authorization happens before `dispatch` is called; this module never
//!   looks at claims.
//! - Each call is bounded by the configured timeout.
//! - The remote call runs on its own task. If the caller goes away mid-call,
//!   the call still finishes (or times out) against the node.
//! - A failed call is never retried.
use crate::audit::rpc::{NodeRpc, RpcError};
use crate::model::{EventKind, JobKind};
use cadence_authz::NodeAddr;
use serde::Deserialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Remote method and audit-trail tag for one job kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuditRoute {
    pub method: &'static str,
    pub event: EventKind,
}

/// Indexed by `JobKind as usize`.
const AUDIT_ROUTES: [AuditRoute; 2] = [
    AuditRoute {
        method: "CrontabJob.Audit",
        event: EventKind::AuditCrontabJob,
    },
    AuditRoute {
        method: "DaemonJob.Audit",
        event: EventKind::AuditDaemonJob,
    },
];

impl JobKind {
    pub fn audit_route(self) -> AuditRoute {
        AUDIT_ROUTES[self as usize]
    }
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("audit call to {addr} failed: {source}")]
    Remote {
        addr: NodeAddr,
        #[source]
        source: RpcError,
    },
    #[error("audit call to {addr} timed out after {timeout:?}")]
    Timeout { addr: NodeAddr, timeout: Duration },
    #[error("audit call to {addr} returned an unreadable reply: {reason}")]
    InvalidReply { addr: NodeAddr, reason: String },
    #[error("audit call to {addr} was aborted: {reason}")]
    Aborted { addr: NodeAddr, reason: String },
}

impl DispatchError {
    pub fn code(&self) -> &'static str {
        "remote_unavailable"
    }
}

/// Job record as returned by a node. Extra fields are ignored.
#[derive(Debug, Deserialize)]
struct MatchedJob {
    #[serde(alias = "Name")]
    name: String,
}

pub struct AuditDispatcher {
    rpc: Arc<dyn NodeRpc>,
    timeout: Duration,
}

impl AuditDispatcher {
    pub fn new(rpc: Arc<dyn NodeRpc>, timeout: Duration) -> Self {
        Self { rpc, timeout }
    }

    /// Audit `job_ids` of `kind` on `addr`.
    ///
    /// # Errors
    /// Any transport failure, remote-side error, timeout, or unreadable reply
    /// is a [`DispatchError`]. The caller must not assume partial application
    /// and must not publish an event.
    pub async fn dispatch(
        &self,
        addr: &NodeAddr,
        kind: JobKind,
        job_ids: &[u64],
    ) -> Result<Vec<String>, DispatchError> {
        let route = kind.audit_route();
        let params = serde_json::json!({ "JobIDs": job_ids });
        let rpc = Arc::clone(&self.rpc);
        let target = addr.clone();
        let timeout = self.timeout;
        let started = Instant::now();

        // Detached from the caller: dropping this future leaves the call running.
        let call = tokio::spawn(async move {
            tokio::time::timeout(timeout, rpc.invoke(&target, route.method, params)).await
        });
        let outcome = call.await.map_err(|err| DispatchError::Aborted {
            addr: addr.clone(),
            reason: err.to_string(),
        });

        let result = match outcome {
            Err(err) => Err(err),
            Ok(Err(_elapsed)) => Err(DispatchError::Timeout {
                addr: addr.clone(),
                timeout,
            }),
            Ok(Ok(Err(source))) => Err(DispatchError::Remote {
                addr: addr.clone(),
                source,
            }),
            Ok(Ok(Ok(reply))) => matched_names(addr, reply),
        };

        let outcome_label = if result.is_ok() { "ok" } else { "error" };
        metrics::counter!(
            "cadence_audit_dispatch_total",
            "method" => route.method,
            "outcome" => outcome_label
        )
        .increment(1);
        metrics::histogram!("cadence_audit_dispatch_seconds", "method" => route.method)
            .record(started.elapsed().as_secs_f64());
        match &result {
            Ok(names) => tracing::info!(
                addr = %addr,
                method = route.method,
                requested = job_ids.len(),
                matched = names.len(),
                "audit dispatched"
            ),
            Err(err) => tracing::warn!(addr = %addr, method = route.method, error = %err, "audit dispatch failed"),
        }
        result
    }
}

/// A `null` reply means the node matched nothing.
fn matched_names(addr: &NodeAddr, reply: serde_json::Value) -> Result<Vec<String>, DispatchError> {
    if reply.is_null() {
        return Ok(Vec::new());
    }
    let jobs: Vec<MatchedJob> =
        serde_json::from_value(reply).map_err(|err| DispatchError::InvalidReply {
            addr: addr.clone(),
            reason: err.to_string(),
        })?;
    Ok(jobs.into_iter().map(|job| job.name).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[derive(Debug, Clone, PartialEq)]
    struct Call {
        addr: NodeAddr,
        method: String,
        params: serde_json::Value,
    }

    enum Script {
        Reply(serde_json::Value),
        Fail(&'static str),
        Delay(Duration, serde_json::Value),
    }

    struct ScriptedRpc {
        script: Script,
        calls: Mutex<Vec<Call>>,
        finished: AtomicBool,
    }

    impl ScriptedRpc {
        fn new(script: Script) -> Arc<Self> {
            Arc::new(Self {
                script,
                calls: Mutex::new(Vec::new()),
                finished: AtomicBool::new(false),
            })
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().expect("calls").clone()
        }
    }

    #[async_trait]
    impl NodeRpc for ScriptedRpc {
        async fn invoke(
            &self,
            addr: &NodeAddr,
            method: &str,
            params: serde_json::Value,
        ) -> Result<serde_json::Value, RpcError> {
            self.calls.lock().expect("calls").push(Call {
                addr: addr.clone(),
                method: method.to_string(),
                params,
            });
            let result = match &self.script {
                Script::Reply(value) => Ok(value.clone()),
                Script::Fail(message) => Err(RpcError::Transport(message.to_string())),
                Script::Delay(delay, value) => {
                    tokio::time::sleep(*delay).await;
                    Ok(value.clone())
                }
            };
            self.finished.store(true, Ordering::SeqCst);
            result
        }
    }

    fn addr() -> NodeAddr {
        NodeAddr::new("node-1:20001")
    }

    #[test]
    fn route_table_covers_each_kind() {
        assert_eq!(JobKind::Crontab.audit_route().method, "CrontabJob.Audit");
        assert_eq!(
            JobKind::Crontab.audit_route().event,
            EventKind::AuditCrontabJob
        );
        assert_eq!(JobKind::Daemon.audit_route().method, "DaemonJob.Audit");
        assert_eq!(JobKind::Daemon.audit_route().event, EventKind::AuditDaemonJob);
    }

    #[tokio::test]
    async fn returns_names_in_remote_order() {
        let rpc = ScriptedRpc::new(Script::Reply(json!([
            { "ID": 2, "Name": "backup", "Command": ["sh"] },
            { "id": 1, "name": "cleanup" }
        ])));
        let dispatcher = AuditDispatcher::new(rpc.clone(), Duration::from_secs(1));

        let names = dispatcher
            .dispatch(&addr(), JobKind::Crontab, &[1, 2])
            .await
            .expect("dispatch");
        assert_eq!(names, ["backup", "cleanup"]);
        assert_eq!(
            rpc.calls(),
            [Call {
                addr: addr(),
                method: "CrontabJob.Audit".to_string(),
                params: json!({ "JobIDs": [1, 2] }),
            }]
        );
    }

    #[tokio::test]
    async fn daemon_kind_uses_daemon_method() {
        let rpc = ScriptedRpc::new(Script::Reply(json!([])));
        let dispatcher = AuditDispatcher::new(rpc.clone(), Duration::from_secs(1));
        let names = dispatcher
            .dispatch(&addr(), JobKind::Daemon, &[9])
            .await
            .expect("dispatch");
        assert!(names.is_empty());
        assert_eq!(rpc.calls()[0].method, "DaemonJob.Audit");
    }

    #[tokio::test]
    async fn null_reply_matches_nothing() {
        let rpc = ScriptedRpc::new(Script::Reply(serde_json::Value::Null));
        let dispatcher = AuditDispatcher::new(rpc, Duration::from_secs(1));
        let names = dispatcher
            .dispatch(&addr(), JobKind::Crontab, &[1])
            .await
            .expect("dispatch");
        assert!(names.is_empty());
    }

    #[tokio::test]
    async fn transport_failure_is_single_attempt() {
        let rpc = ScriptedRpc::new(Script::Fail("connection refused"));
        let dispatcher = AuditDispatcher::new(rpc.clone(), Duration::from_secs(1));
        let err = dispatcher
            .dispatch(&addr(), JobKind::Crontab, &[1])
            .await
            .expect_err("failure");
        assert!(matches!(err, DispatchError::Remote { .. }));
        assert_eq!(err.code(), "remote_unavailable");
        assert!(err.to_string().contains("connection refused"));
        assert_eq!(rpc.calls().len(), 1);
    }

    #[tokio::test]
    async fn unreadable_reply_is_error() {
        let rpc = ScriptedRpc::new(Script::Reply(json!({ "unexpected": true })));
        let dispatcher = AuditDispatcher::new(rpc, Duration::from_secs(1));
        let err = dispatcher
            .dispatch(&addr(), JobKind::Crontab, &[1])
            .await
            .expect_err("shape");
        assert!(matches!(err, DispatchError::InvalidReply { .. }));
    }

    #[tokio::test]
    async fn slow_node_times_out_without_retry() {
        let rpc = ScriptedRpc::new(Script::Delay(Duration::from_secs(5), json!([])));
        let dispatcher = AuditDispatcher::new(rpc.clone(), Duration::from_millis(50));
        let started = Instant::now();
        let err = dispatcher
            .dispatch(&addr(), JobKind::Daemon, &[1])
            .await
            .expect_err("timeout");
        assert!(matches!(err, DispatchError::Timeout { .. }));
        assert!(started.elapsed() < Duration::from_secs(2));
        assert_eq!(rpc.calls().len(), 1);
    }

    #[tokio::test]
    async fn caller_cancellation_does_not_abort_remote_call() {
        let rpc = ScriptedRpc::new(Script::Delay(Duration::from_millis(100), json!([])));
        let dispatcher = Arc::new(AuditDispatcher::new(rpc.clone(), Duration::from_secs(2)));

        let caller = {
            let dispatcher = Arc::clone(&dispatcher);
            tokio::spawn(async move {
                dispatcher
                    .dispatch(&NodeAddr::new("node-1:20001"), JobKind::Crontab, &[1])
                    .await
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        caller.abort();
        assert!(caller.await.expect_err("aborted").is_cancelled());
        assert!(!rpc.finished.load(Ordering::SeqCst));

        let deadline = Instant::now() + Duration::from_secs(2);
        while !rpc.finished.load(Ordering::SeqCst) {
            assert!(Instant::now() < deadline, "remote call never completed");
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(rpc.calls().len(), 1);
    }
}
