use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{Actor, Application, ApplicationId, JobPosting, JobPostingId};

/// Storage abstraction so the service can be exercised against any backend.
pub trait PipelineRepository: Send + Sync {
    fn insert_job(&self, posting: JobPosting) -> Result<JobPosting, RepositoryError>;
    fn fetch_job(&self, id: &JobPostingId) -> Result<Option<JobPosting>, RepositoryError>;

    /// Stores a new application. The duplicate check and the insert happen as one
    /// step: a posting already holding an application with the same email
    /// (see [`Application::same_candidate`]) fails with
    /// [`RepositoryError::DuplicateCandidate`].
    fn insert_application(&self, record: Application) -> Result<Application, RepositoryError>;
    fn fetch_application(&self, id: &ApplicationId)
        -> Result<Option<Application>, RepositoryError>;
    fn applications_for_job(&self, job: &JobPostingId)
        -> Result<Vec<Application>, RepositoryError>;

    /// Replaces the stored record only while its status still equals
    /// `expected_status`; otherwise fails with [`RepositoryError::StatusChanged`].
    fn compare_and_swap_status(
        &self,
        expected_status: &str,
        record: Application,
    ) -> Result<(), RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("candidate already applied to this job posting")]
    DuplicateCandidate,
    #[error("record not found")]
    NotFound,
    #[error("stored status changed to '{current}'")]
    StatusChanged { current: String },
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Outbound hook notified after every applied stage change.
pub trait StageEventPublisher: Send + Sync {
    fn publish(&self, event: StageChangeEvent) -> Result<(), PublishError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageChangeEvent {
    pub application_id: ApplicationId,
    pub job_id: JobPostingId,
    pub from_round: String,
    pub to_round: String,
    pub moved_by: Actor,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("stage event transport unavailable: {0}")]
    Transport(String),
}
