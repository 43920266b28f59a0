//! Job kinds and execution history.
use cadence_authz::NodeAddr;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// The two job families a worker node runs.
///
/// Discriminants index the audit route table, so new variants must be
/// appended in the same order there.
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
#[repr(usize)]
pub enum JobKind {
    Crontab = 0,
    Daemon = 1,
}

impl JobKind {
    pub fn as_str(self) -> &'static str {
        match self {
            JobKind::Crontab => "crontab",
            JobKind::Daemon => "daemon",
        }
    }
}

impl std::str::FromStr for JobKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "crontab" => Ok(JobKind::Crontab),
            "daemon" => Ok(JobKind::Daemon),
            other => Err(format!("unknown job type: {other}")),
        }
    }
}

/// One finished job run reported by a node.
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq, Eq)]
pub struct JobHistory {
    pub id: u64,
    pub job_id: u64,
    pub job_name: String,
    pub job_type: JobKind,
    #[schema(value_type = String)]
    pub addr: NodeAddr,
    pub exit_msg: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewJobHistory {
    pub job_id: u64,
    pub job_name: String,
    pub job_type: JobKind,
    pub addr: NodeAddr,
    pub exit_msg: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}
