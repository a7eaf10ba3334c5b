use async_trait::async_trait;
use foodie_model::{ExecutionInput, TaskDefinition};
use foodie_utils::TourError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque execution identifier issued on submission
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobHandle(String);

impl JobHandle {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Succeeded,
    Failed,
}

impl JobStatus {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// Observed state of one execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobResult {
    pub status: JobStatus,
    pub payload: Option<String>,
    pub error: Option<String>,
}

impl JobResult {
    #[must_use]
    pub const fn pending() -> Self {
        Self {
            status: JobStatus::Pending,
            payload: None,
            error: None,
        }
    }

    #[must_use]
    pub fn succeeded(payload: impl Into<String>) -> Self {
        Self {
            status: JobStatus::Succeeded,
            payload: Some(payload.into()),
            error: None,
        }
    }

    #[must_use]
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            status: JobStatus::Failed,
            payload: None,
            error: Some(error.into()),
        }
    }
}

/// Asynchronous job runner with a status-poll contract.
///
/// Task/agent provisioning is the implementation's concern; callers only
/// submit and poll.
#[async_trait]
pub trait ExecutionService: Send + Sync {
    /// Start a new execution of `task` with `input`.
    ///
    /// Every call creates a new execution and a new handle.
    async fn submit(
        &self,
        task: &TaskDefinition,
        input: &ExecutionInput,
    ) -> Result<JobHandle, TourError>;

    /// Current state of `handle`. Idempotent.
    async fn get_status(&self, handle: &JobHandle) -> Result<JobResult, TourError>;
}
