use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use super::authorization::AuthorizationError;
use super::board::Board;
use super::domain::{
    Actor, Application, ApplicationId, ApplicationSubmission, JobPosting, JobPostingId,
    NewJobPosting, ValidationError,
};
use super::funnel::FunnelReport;
use super::repository::{
    PipelineRepository, RepositoryError, StageChangeEvent, StageEventPublisher,
};
use super::rounds::{entry_round, validate_rounds, RoundPlan};
use super::transition::{StageTransition, TransitionError, TransitionOutcome, TransitionRequest};

/// Service owning every pipeline mutation: postings, submissions, and stage moves.
pub struct HiringPipelineService<R, P> {
    repository: Arc<R>,
    publisher: Arc<P>,
    default_plan: RoundPlan,
}

static JOB_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static APPLICATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_job_id() -> JobPostingId {
    let id = JOB_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    JobPostingId(format!("job-{id:06}"))
}

fn next_application_id() -> ApplicationId {
    let id = APPLICATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ApplicationId(format!("app-{id:06}"))
}

impl<R, P> HiringPipelineService<R, P>
where
    R: PipelineRepository + 'static,
    P: StageEventPublisher + 'static,
{
    pub fn new(repository: Arc<R>, publisher: Arc<P>, default_plan: RoundPlan) -> Self {
        Self {
            repository,
            publisher,
            default_plan,
        }
    }

    pub fn create_job_posting(
        &self,
        request: NewJobPosting,
    ) -> Result<JobPosting, PipelineServiceError> {
        for (field, value) in [
            ("title", &request.title),
            ("description", &request.description),
            ("client", &request.client),
            ("location", &request.location),
        ] {
            if value.trim().is_empty() {
                return Err(ValidationError::BlankField { field }.into());
            }
        }
        if request.compensation_start > request.compensation_end {
            return Err(ValidationError::CompensationRange {
                start: request.compensation_start,
                end: request.compensation_end,
            }
            .into());
        }

        let rounds = match request.rounds {
            Some(rounds) => {
                validate_rounds(&rounds)?;
                rounds
            }
            None => match request.stage_two_rounds {
                Some(count) => RoundPlan::new(count)?.rounds(),
                None => self.default_plan.rounds(),
            },
        };

        let posting = JobPosting {
            id: next_job_id(),
            title: request.title.trim().to_string(),
            description: request.description,
            client: request.client.trim().to_string(),
            location: request.location.trim().to_string(),
            application_deadline: request.application_deadline,
            compensation_start: request.compensation_start,
            compensation_end: request.compensation_end,
            rounds,
            created_at: Utc::now(),
        };

        let stored = self.repository.insert_job(posting)?;
        info!(job_id = %stored.id, rounds = stored.rounds.len(), "job posting created");
        Ok(stored)
    }

    pub fn job_posting(&self, id: &JobPostingId) -> Result<JobPosting, PipelineServiceError> {
        self.repository
            .fetch_job(id)?
            .ok_or_else(|| PipelineServiceError::JobPostingNotFound(id.clone()))
    }

    /// Submit a new application; it starts in the posting's first stage 1 round.
    pub fn submit_application(
        &self,
        submission: ApplicationSubmission,
    ) -> Result<Application, PipelineServiceError> {
        let missing = submission.candidate.missing_fields();
        if !missing.is_empty() {
            return Err(ValidationError::MissingFields(missing).into());
        }

        let posting = self.job_posting(&submission.job)?;
        let entry = entry_round(&posting.rounds).ok_or(ValidationError::NoEntryRound)?;

        let email = submission.candidate.email.trim().to_string();
        let now = Utc::now();
        let mut candidate = submission.candidate;
        candidate.email = email.clone();
        let record = Application {
            id: next_application_id(),
            job_id: posting.id,
            client: submission.client,
            sub_vendor: submission.sub_vendor,
            candidate,
            status: entry.name,
            feedback: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        let job_id = record.job_id.clone();
        let stored = self
            .repository
            .insert_application(record)
            .map_err(|err| match err {
                RepositoryError::DuplicateCandidate => {
                    warn!(%job_id, "duplicate application refused");
                    PipelineServiceError::DuplicateApplication {
                        job_id,
                        email: email.clone(),
                    }
                }
                other => PipelineServiceError::Repository(other),
            })?;
        info!(
            application_id = %stored.id,
            job_id = %stored.job_id,
            status = %stored.status,
            "application submitted"
        );
        Ok(stored)
    }

    pub fn application(&self, id: &ApplicationId) -> Result<Application, PipelineServiceError> {
        self.repository
            .fetch_application(id)?
            .ok_or_else(|| PipelineServiceError::ApplicationNotFound(id.clone()))
    }

    pub fn applications_for_job(
        &self,
        job_id: &JobPostingId,
    ) -> Result<Vec<Application>, PipelineServiceError> {
        let posting = self.job_posting(job_id)?;
        Ok(self.repository.applications_for_job(&posting.id)?)
    }

    /// Move an application to another round, recording feedback for the round left.
    pub fn transition(
        &self,
        actor: &Actor,
        application_id: &ApplicationId,
        request: TransitionRequest,
    ) -> Result<Application, PipelineServiceError> {
        request.validate()?;

        let stored = self.application(application_id)?;
        let posting = self.job_posting(&stored.job_id)?;

        let mut updated = stored.clone();
        let outcome = StageTransition::new(&posting)
            .apply(actor, &mut updated, &request, Utc::now())
            .map_err(|err| {
                warn!(
                    application_id = %application_id,
                    role = %actor.role,
                    target = %request.status,
                    error = %err,
                    "stage transition refused"
                );
                err
            })?;

        if outcome == TransitionOutcome::Replayed {
            info!(
                application_id = %application_id,
                status = %stored.status,
                "stage transition replayed"
            );
            return Ok(stored);
        }

        self.repository
            .compare_and_swap_status(&stored.status, updated.clone())
            .map_err(|err| match err {
                RepositoryError::StatusChanged { current } => {
                    warn!(
                        application_id = %application_id,
                        %current,
                        "concurrent stage change detected"
                    );
                    PipelineServiceError::StatusConflict {
                        expected: stored.status.clone(),
                        current,
                    }
                }
                RepositoryError::NotFound => {
                    PipelineServiceError::ApplicationNotFound(application_id.clone())
                }
                other => PipelineServiceError::Repository(other),
            })?;

        info!(
            application_id = %application_id,
            role = %actor.role,
            from = %stored.status,
            to = %updated.status,
            "stage transition applied"
        );

        let event = StageChangeEvent {
            application_id: updated.id.clone(),
            job_id: updated.job_id.clone(),
            from_round: stored.status,
            to_round: updated.status.clone(),
            moved_by: actor.clone(),
            occurred_at: updated.updated_at,
        };
        // The move is already stored; a failed notification must not report it as refused.
        if let Err(err) = self.publisher.publish(event) {
            warn!(
                application_id = %application_id,
                error = %err,
                "stage change event not delivered"
            );
        }

        Ok(updated)
    }

    pub fn board(
        &self,
        actor: &Actor,
        job_id: &JobPostingId,
    ) -> Result<Board, PipelineServiceError> {
        let posting = self.job_posting(job_id)?;
        let applications = self.repository.applications_for_job(&posting.id)?;
        Ok(Board::assemble(&posting, &applications, actor.role))
    }

    pub fn funnel(&self, job_id: &JobPostingId) -> Result<FunnelReport, PipelineServiceError> {
        let posting = self.job_posting(job_id)?;
        let applications = self.repository.applications_for_job(&posting.id)?;
        Ok(FunnelReport::build(&posting, &applications))
    }
}

/// Error raised by the pipeline service.
#[derive(Debug, thiserror::Error)]
pub enum PipelineServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Authorization(#[from] AuthorizationError),
    #[error("application {0} not found")]
    ApplicationNotFound(ApplicationId),
    #[error("job posting {0} not found")]
    JobPostingNotFound(JobPostingId),
    #[error("application is in '{current}', not '{expected}'; reload the board and retry")]
    StatusConflict { expected: String, current: String },
    #[error("{email} has already applied to job posting {job_id}")]
    DuplicateApplication { job_id: JobPostingId, email: String },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<TransitionError> for PipelineServiceError {
    fn from(value: TransitionError) -> Self {
        match value {
            TransitionError::Validation(err) => Self::Validation(err),
            TransitionError::Unauthorized(err) => Self::Authorization(err),
            TransitionError::StatusConflict { expected, current } => {
                Self::StatusConflict { expected, current }
            }
        }
    }
}
