use hiring_board::workflows::hiring::{
    Application, ApplicationId, JobPosting, JobPostingId, PipelineRepository, PublishError,
    RepositoryError, StageChangeEvent, StageEventPublisher,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, RepositoryError> {
    mutex
        .lock()
        .map_err(|_| RepositoryError::Unavailable("repository mutex poisoned".to_string()))
}

/// Process-local store; the status swap runs under the applications lock.
#[derive(Default, Clone)]
pub(crate) struct InMemoryPipelineRepository {
    jobs: Arc<Mutex<HashMap<JobPostingId, JobPosting>>>,
    applications: Arc<Mutex<HashMap<ApplicationId, Application>>>,
}

impl PipelineRepository for InMemoryPipelineRepository {
    fn insert_job(&self, posting: JobPosting) -> Result<JobPosting, RepositoryError> {
        let mut guard = lock(&self.jobs)?;
        if guard.contains_key(&posting.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(posting.id.clone(), posting.clone());
        Ok(posting)
    }

    fn fetch_job(&self, id: &JobPostingId) -> Result<Option<JobPosting>, RepositoryError> {
        Ok(lock(&self.jobs)?.get(id).cloned())
    }

    fn insert_application(&self, record: Application) -> Result<Application, RepositoryError> {
        let mut guard = lock(&self.applications)?;
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
        Ok(lock(&self.applications)?.get(id).cloned())
    }

    fn applications_for_job(
        &self,
        job: &JobPostingId,
    ) -> Result<Vec<Application>, RepositoryError> {
        let mut records: Vec<Application> = lock(&self.applications)?
            .values()
            .filter(|record| &record.job_id == job)
            .cloned()
            .collect();
        records.sort_by(|left, right| {
            left.created_at
                .cmp(&right.created_at)
                .then_with(|| left.id.cmp(&right.id))
        });
        Ok(records)
    }

    fn compare_and_swap_status(
        &self,
        expected_status: &str,
        record: Application,
    ) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.applications)?;
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

/// Writes every stage change to the log and keeps nothing in memory.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct TracingStageEventPublisher;

impl StageEventPublisher for TracingStageEventPublisher {
    fn publish(&self, event: StageChangeEvent) -> Result<(), PublishError> {
        info!(
            application_id = %event.application_id,
            job_id = %event.job_id,
            from = %event.from_round,
            to = %event.to_round,
            role = %event.moved_by.role,
            "stage change published"
        );
        Ok(())
    }
}
