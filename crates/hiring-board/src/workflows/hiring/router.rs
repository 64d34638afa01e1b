use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use super::domain::{
    Actor, ApplicationId, ApplicationSubmission, JobPostingId, NewJobPosting, Role,
};
use super::repository::{PipelineRepository, StageEventPublisher};
use super::service::{HiringPipelineService, PipelineServiceError};
use super::transition::TransitionRequest;

/// Header carrying the caller's role, set by the session layer in front of the service.
pub const ACTOR_ROLE_HEADER: &str = "x-actor-role";
pub const ACTOR_ID_HEADER: &str = "x-actor-id";

type SharedService<R, P> = Arc<HiringPipelineService<R, P>>;

/// Router builder exposing the job posting, application, and board endpoints.
pub fn pipeline_router<R, P>(service: SharedService<R, P>) -> Router
where
    R: PipelineRepository + 'static,
    P: StageEventPublisher + 'static,
{
    Router::new()
        .route("/api/jobPosting", post(create_job_handler::<R, P>))
        .route("/api/jobPosting/:job_id", get(job_handler::<R, P>))
        .route(
            "/api/jobPosting/:job_id/applications",
            get(job_applications_handler::<R, P>),
        )
        .route("/api/jobPosting/:job_id/board", get(board_handler::<R, P>))
        .route("/api/jobPosting/:job_id/funnel", get(funnel_handler::<R, P>))
        .route("/api/application", post(submit_handler::<R, P>))
        .route(
            "/api/application/:application_id",
            get(application_handler::<R, P>).patch(transition_handler::<R, P>),
        )
        .with_state(service)
}

/// Reads the explicit actor from request headers; a missing or unknown role is a 401.
pub fn actor_from_headers(headers: &HeaderMap) -> Result<Actor, Response> {
    let raw = headers
        .get(ACTOR_ROLE_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| {
            let payload = json!({
                "error": format!("missing {ACTOR_ROLE_HEADER} header"),
            });
            (StatusCode::UNAUTHORIZED, Json(payload)).into_response()
        })?;

    let role = raw.parse::<Role>().map_err(|err| {
        let payload = json!({ "error": err.to_string() });
        (StatusCode::UNAUTHORIZED, Json(payload)).into_response()
    })?;

    let id = headers
        .get(ACTOR_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string);

    Ok(Actor { role, id })
}

impl PipelineServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            PipelineServiceError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            PipelineServiceError::Authorization(_) => StatusCode::FORBIDDEN,
            PipelineServiceError::ApplicationNotFound(_)
            | PipelineServiceError::JobPostingNotFound(_) => StatusCode::NOT_FOUND,
            PipelineServiceError::StatusConflict { .. }
            | PipelineServiceError::DuplicateApplication { .. } => StatusCode::CONFLICT,
            PipelineServiceError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub(crate) fn error_response(error: PipelineServiceError) -> Response {
    let status = error.status_code();
    let payload = match &error {
        PipelineServiceError::StatusConflict { expected, current } => json!({
            "error": error.to_string(),
            "expected": expected,
            "current": current,
        }),
        _ => json!({ "error": error.to_string() }),
    };
    (status, Json(payload)).into_response()
}

pub(crate) async fn create_job_handler<R, P>(
    State(service): State<SharedService<R, P>>,
    Json(request): Json<NewJobPosting>,
) -> Response
where
    R: PipelineRepository + 'static,
    P: StageEventPublisher + 'static,
{
    match service.create_job_posting(request) {
        Ok(posting) => (StatusCode::CREATED, Json(posting)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn job_handler<R, P>(
    State(service): State<SharedService<R, P>>,
    Path(job_id): Path<String>,
) -> Response
where
    R: PipelineRepository + 'static,
    P: StageEventPublisher + 'static,
{
    match service.job_posting(&JobPostingId(job_id)) {
        Ok(posting) => (StatusCode::OK, Json(posting)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn job_applications_handler<R, P>(
    State(service): State<SharedService<R, P>>,
    Path(job_id): Path<String>,
) -> Response
where
    R: PipelineRepository + 'static,
    P: StageEventPublisher + 'static,
{
    match service.applications_for_job(&JobPostingId(job_id)) {
        Ok(applications) => (StatusCode::OK, Json(applications)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn board_handler<R, P>(
    State(service): State<SharedService<R, P>>,
    Path(job_id): Path<String>,
    headers: HeaderMap,
) -> Response
where
    R: PipelineRepository + 'static,
    P: StageEventPublisher + 'static,
{
    let actor = match actor_from_headers(&headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };
    match service.board(&actor, &JobPostingId(job_id)) {
        Ok(board) => (StatusCode::OK, Json(board)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn funnel_handler<R, P>(
    State(service): State<SharedService<R, P>>,
    Path(job_id): Path<String>,
) -> Response
where
    R: PipelineRepository + 'static,
    P: StageEventPublisher + 'static,
{
    match service.funnel(&JobPostingId(job_id)) {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn submit_handler<R, P>(
    State(service): State<SharedService<R, P>>,
    Json(submission): Json<ApplicationSubmission>,
) -> Response
where
    R: PipelineRepository + 'static,
    P: StageEventPublisher + 'static,
{
    match service.submit_application(submission) {
        Ok(application) => (StatusCode::CREATED, Json(application)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn application_handler<R, P>(
    State(service): State<SharedService<R, P>>,
    Path(application_id): Path<String>,
) -> Response
where
    R: PipelineRepository + 'static,
    P: StageEventPublisher + 'static,
{
    match service.application(&ApplicationId(application_id)) {
        Ok(application) => (StatusCode::OK, Json(application)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn transition_handler<R, P>(
    State(service): State<SharedService<R, P>>,
    Path(application_id): Path<String>,
    headers: HeaderMap,
    Json(request): Json<TransitionRequest>,
) -> Response
where
    R: PipelineRepository + 'static,
    P: StageEventPublisher + 'static,
{
    let actor = match actor_from_headers(&headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };
    match service.transition(&actor, &ApplicationId(application_id), request) {
        Ok(application) => (StatusCode::OK, Json(application)).into_response(),
        Err(error) => error_response(error),
    }
}
