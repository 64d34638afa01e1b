use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{NaiveDate, TimeZone, Utc};
use serde_json::Value;

use crate::workflows::hiring::domain::{
    Application, ApplicationId, ApplicationSubmission, CandidateDetails, JobPosting,
    JobPostingId, NewJobPosting, Round, Stage,
};
use crate::workflows::hiring::repository::{
    PipelineRepository, PublishError, RepositoryError, StageChangeEvent, StageEventPublisher,
};
use crate::workflows::hiring::{pipeline_router, HiringPipelineService, RoundPlan};

pub(super) fn scenario_rounds() -> Vec<Round> {
    vec![
        Round::new("pre-screen", Stage::StageOne),
        Round::new("round 1", Stage::StageTwo),
        Round::new("hired", Stage::Hired),
        Round::new("rejected", Stage::Rejected),
    ]
}

pub(super) fn posting_with(rounds: Vec<Round>) -> JobPosting {
    JobPosting {
        id: JobPostingId("job-test".to_string()),
        title: "Platform Engineer".to_string(),
        description: "Own the build and deploy pipeline".to_string(),
        client: "client-acme".to_string(),
        location: "Remote".to_string(),
        application_deadline: NaiveDate::from_ymd_opt(2026, 12, 31).expect("valid date"),
        compensation_start: 90_000,
        compensation_end: 120_000,
        rounds,
        created_at: Utc
            .with_ymd_and_hms(2026, 10, 1, 9, 0, 0)
            .single()
            .expect("valid timestamp"),
    }
}

pub(super) fn scenario_posting() -> JobPosting {
    posting_with(scenario_rounds())
}

pub(super) fn candidate(email: &str) -> CandidateDetails {
    CandidateDetails {
        first_name: "Priya".to_string(),
        last_name: "Natarajan".to_string(),
        email: email.to_string(),
        phone: "+1 515 555 0142".to_string(),
        city: "Des Moines".to_string(),
        state: "IA".to_string(),
        country: "US".to_string(),
        pincode: "50309".to_string(),
        resume_url: Some("https://files.example.com/resumes/priya.pdf".to_string()),
    }
}

pub(super) fn application_in(posting: &JobPosting, id: &str, status: &str) -> Application {
    let created = posting.created_at;
    Application {
        id: ApplicationId(id.to_string()),
        job_id: posting.id.clone(),
        client: Some(posting.client.clone()),
        sub_vendor: None,
        candidate: candidate(&format!("{id}@example.com")),
        status: status.to_string(),
        feedback: Vec::new(),
        created_at: created,
        updated_at: created,
    }
}

pub(super) fn new_job_posting() -> NewJobPosting {
    NewJobPosting {
        title: "Platform Engineer".to_string(),
        description: "Own the build and deploy pipeline".to_string(),
        client: "client-acme".to_string(),
        location: "Remote".to_string(),
        application_deadline: NaiveDate::from_ymd_opt(2026, 12, 31).expect("valid date"),
        compensation_start: 90_000,
        compensation_end: 120_000,
        stage_two_rounds: None,
        rounds: Some(scenario_rounds()),
    }
}

pub(super) fn submission(job: &JobPostingId, email: &str) -> ApplicationSubmission {
    ApplicationSubmission {
        job: job.clone(),
        candidate: candidate(email),
        client: Some("client-acme".to_string()),
        sub_vendor: Some("vendor-northwind".to_string()),
    }
}

pub(super) type TestService = HiringPipelineService<MemoryRepository, MemoryPublisher>;

pub(super) fn build_service() -> (TestService, Arc<MemoryRepository>, Arc<MemoryPublisher>) {
    let repository = Arc::new(MemoryRepository::default());
    let publisher = Arc::new(MemoryPublisher::default());
    let service =
        HiringPipelineService::new(repository.clone(), publisher.clone(), RoundPlan::default());
    (service, repository, publisher)
}

/// Service with the scenario posting and one application waiting in `pre-screen`.
pub(super) fn seeded_service() -> (
    TestService,
    Arc<MemoryRepository>,
    Arc<MemoryPublisher>,
    JobPosting,
    Application,
) {
    let (service, repository, publisher) = build_service();
    let posting = service
        .create_job_posting(new_job_posting())
        .expect("posting created");
    let application = service
        .submit_application(submission(&posting.id, "priya@example.com"))
        .expect("application submitted");
    (service, repository, publisher, posting, application)
}

#[derive(Default)]
pub(super) struct MemoryRepository {
    jobs: Mutex<BTreeMap<JobPostingId, JobPosting>>,
    applications: Mutex<BTreeMap<ApplicationId, Application>>,
}

impl MemoryRepository {
    /// Writes a record directly, bypassing the status check.
    pub(super) fn overwrite(&self, record: Application) {
        self.applications
            .lock()
            .expect("repository mutex poisoned")
            .insert(record.id.clone(), record);
    }
}

impl PipelineRepository for MemoryRepository {
    fn insert_job(&self, posting: JobPosting) -> Result<JobPosting, RepositoryError> {
        let mut guard = self.jobs.lock().expect("repository mutex poisoned");
        if guard.contains_key(&posting.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(posting.id.clone(), posting.clone());
        Ok(posting)
    }

    fn fetch_job(&self, id: &JobPostingId) -> Result<Option<JobPosting>, RepositoryError> {
        let guard = self.jobs.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn insert_application(&self, record: Application) -> Result<Application, RepositoryError> {
        let mut guard = self.applications.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        if guard.values().any(|existing| existing.same_candidate(&record)) {
            return Err(RepositoryError::DuplicateCandidate);
        }
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn fetch_application(
        &self,
        id: &ApplicationId,
    ) -> Result<Option<Application>, RepositoryError> {
        let guard = self.applications.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn applications_for_job(
        &self,
        job: &JobPostingId,
    ) -> Result<Vec<Application>, RepositoryError> {
        let guard = self.applications.lock().expect("repository mutex poisoned");
        Ok(guard
            .values()
            .filter(|record| &record.job_id == job)
            .cloned()
            .collect())
    }

    fn compare_and_swap_status(
        &self,
        expected_status: &str,
        record: Application,
    ) -> Result<(), RepositoryError> {
        let mut guard = self.applications.lock().expect("repository mutex poisoned");
        let current = guard.get(&record.id).ok_or(RepositoryError::NotFound)?;
        if current.status != expected_status {
            return Err(RepositoryError::StatusChanged {
                current: current.status.clone(),
            });
        }
        guard.insert(record.id.clone(), record);
        Ok(())
    }
}

/// Repository whose status swap always loses to a concurrent writer.
pub(super) struct RacingRepository {
    pub(super) inner: MemoryRepository,
    pub(super) winner_status: String,
}

impl PipelineRepository for RacingRepository {
    fn insert_job(&self, posting: JobPosting) -> Result<JobPosting, RepositoryError> {
        self.inner.insert_job(posting)
    }

    fn fetch_job(&self, id: &JobPostingId) -> Result<Option<JobPosting>, RepositoryError> {
        self.inner.fetch_job(id)
    }

    fn insert_application(&self, record: Application) -> Result<Application, RepositoryError> {
        self.inner.insert_application(record)
    }

    fn fetch_application(
        &self,
        id: &ApplicationId,
    ) -> Result<Option<Application>, RepositoryError> {
        self.inner.fetch_application(id)
    }

    fn applications_for_job(
        &self,
        job: &JobPostingId,
    ) -> Result<Vec<Application>, RepositoryError> {
        self.inner.applications_for_job(job)
    }

    fn compare_and_swap_status(
        &self,
        _expected_status: &str,
        _record: Application,
    ) -> Result<(), RepositoryError> {
        Err(RepositoryError::StatusChanged {
            current: self.winner_status.clone(),
        })
    }
}

pub(super) struct UnavailableRepository;

impl PipelineRepository for UnavailableRepository {
    fn insert_job(&self, _posting: JobPosting) -> Result<JobPosting, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch_job(&self, _id: &JobPostingId) -> Result<Option<JobPosting>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn insert_application(&self, _record: Application) -> Result<Application, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch_application(
        &self,
        _id: &ApplicationId,
    ) -> Result<Option<Application>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn applications_for_job(
        &self,
        _job: &JobPostingId,
    ) -> Result<Vec<Application>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn compare_and_swap_status(
        &self,
        _expected_status: &str,
        _record: Application,
    ) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

#[derive(Default)]
pub(super) struct MemoryPublisher {
    events: Mutex<Vec<StageChangeEvent>>,
}

impl MemoryPublisher {
    pub(super) fn events(&self) -> Vec<StageChangeEvent> {
        self.events.lock().expect("publisher mutex poisoned").clone()
    }
}

impl StageEventPublisher for MemoryPublisher {
    fn publish(&self, event: StageChangeEvent) -> Result<(), PublishError> {
        self.events
            .lock()
            .expect("publisher mutex poisoned")
            .push(event);
        Ok(())
    }
}

pub(super) struct OfflinePublisher;

impl StageEventPublisher for OfflinePublisher {
    fn publish(&self, _event: StageChangeEvent) -> Result<(), PublishError> {
        Err(PublishError::Transport("broker offline".to_string()))
    }
}

pub(super) fn router_with_service(service: TestService) -> axum::Router {
    pipeline_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
