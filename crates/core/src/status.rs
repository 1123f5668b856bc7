//! Canonical job status enum and the worker-status mapper.
//!
//! `JobStatus` discriminants match the 1-based seed data in the
//! `job_statuses` lookup table (migration 0001). The mapper is a pure
//! table lookup from the worker's free-form status vocabulary; it is
//! total and fails open to `Running` so a worker vocabulary drift can
//! never reject a webhook.

use serde::{Deserialize, Serialize};

/// Status ID type matching SMALLINT in the database.
pub type StatusId = i16;

/// Canonical job lifecycle status.
///
/// Transitions: `queued → running ⇄ paused → {completed | failed |
/// cancelled}`. Terminal statuses have no outgoing transitions.
/// `Paused` is entered only when the worker reports
/// `awaiting_approval` (the quality gate).
#[repr(i16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Queued = 1,
    Running = 2,
    Paused = 3,
    Completed = 4,
    Failed = 5,
    Cancelled = 6,
}

impl JobStatus {
    /// Return the database status ID.
    pub fn id(self) -> StatusId {
        self as StatusId
    }

    /// Reconstruct a status from its database ID.
    pub fn from_id(id: StatusId) -> Option<Self> {
        match id {
            1 => Some(JobStatus::Queued),
            2 => Some(JobStatus::Running),
            3 => Some(JobStatus::Paused),
            4 => Some(JobStatus::Completed),
            5 => Some(JobStatus::Failed),
            6 => Some(JobStatus::Cancelled),
            _ => None,
        }
    }

    /// The client-facing status string.
    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Running => "running",
            JobStatus::Paused => "paused",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
            JobStatus::Cancelled => "cancelled",
        }
    }

    /// Whether this status has no outgoing transitions.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Failed | JobStatus::Cancelled
        )
    }
}

impl From<JobStatus> for StatusId {
    fn from(value: JobStatus) -> Self {
        value as StatusId
    }
}

/// Map the generation worker's status vocabulary onto the canonical
/// state machine.
///
/// Total over all inputs: unknown strings map to `Running` (the worker
/// only sends statuses while it is doing work, so "unknown but alive"
/// is the safe reading).
pub fn map_worker_status(worker_status: &str) -> JobStatus {
    match worker_status {
        "queued" => JobStatus::Queued,
        "processing" => JobStatus::Running,
        "awaiting_approval" => JobStatus::Paused,
        "completed" => JobStatus::Completed,
        "failed" => JobStatus::Failed,
        "cancelled" => JobStatus::Cancelled,
        _ => JobStatus::Running,
    }
}
