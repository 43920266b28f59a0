//! Worker node registry entries and their aggregated counters.
use cadence_authz::{GroupId, NodeAddr};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A remote worker owned by exactly one group.
///
/// The counters are reported by the node itself and are read-only here.
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq, Eq)]
pub struct Node {
    #[schema(value_type = String)]
    pub addr: NodeAddr,
    #[schema(value_type = u64)]
    pub group_id: GroupId,
    #[serde(default)]
    pub crontab_job_audit_num: u64,
    #[serde(default)]
    pub daemon_job_audit_num: u64,
    #[serde(default)]
    pub crontab_job_fail_num: u64,
    #[serde(default)]
    pub daemon_job_running_num: u64,
}

impl Node {
    pub fn new(addr: NodeAddr, group_id: GroupId) -> Self {
        Self {
            addr,
            group_id,
            crontab_job_audit_num: 0,
            daemon_job_audit_num: 0,
            crontab_job_fail_num: 0,
            daemon_job_running_num: 0,
        }
    }
}

/// Sum of node counters across one group.
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, Default, PartialEq, Eq)]
pub struct NodeStats {
    pub crontab_job_audit_num: u64,
    pub daemon_job_audit_num: u64,
    pub crontab_job_fail_num: u64,
    pub daemon_job_running_num: u64,
    pub node_num: u64,
}

impl NodeStats {
    pub fn add(&mut self, node: &Node) {
        self.crontab_job_audit_num += node.crontab_job_audit_num;
        self.daemon_job_audit_num += node.daemon_job_audit_num;
        self.crontab_job_fail_num += node.crontab_job_fail_num;
        self.daemon_job_running_num += node.daemon_job_running_num;
        self.node_num += 1;
    }
}
