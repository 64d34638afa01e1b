use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::authorization::{authorize, AuthorizationError};
use super::domain::{same_round, Actor, Application, JobPosting, Stage, ValidationError};

/// Body of `PATCH /api/application/:id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionRequest {
    /// Round the application should move into.
    pub status: String,
    /// Round the caller believes the application is currently in.
    #[serde(default)]
    pub old_status: String,
    /// Feedback recorded against `old_status`.
    #[serde(default)]
    pub feedback: String,
}

impl TransitionRequest {
    pub fn new(
        status: impl Into<String>,
        old_status: impl Into<String>,
        feedback: impl Into<String>,
    ) -> Self {
        Self {
            status: status.into(),
            old_status: old_status.into(),
            feedback: feedback.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.feedback.trim().is_empty() {
            return Err(ValidationError::MissingFeedback);
        }
        if self.status.trim().is_empty() {
            return Err(ValidationError::BlankField { field: "status" });
        }
        if self.old_status.trim().is_empty() {
            return Err(ValidationError::BlankField {
                field: "oldStatus",
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// Status and feedback were written.
    Applied,
    /// The exact transition had already been applied; nothing changed.
    Replayed,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Unauthorized(#[from] AuthorizationError),
    #[error("application is in '{current}', not '{expected}'; reload the board and retry")]
    StatusConflict { expected: String, current: String },
}

/// Stage transition rules for applications of one job posting.
pub struct StageTransition<'a> {
    posting: &'a JobPosting,
}

impl<'a> StageTransition<'a> {
    pub fn new(posting: &'a JobPosting) -> Self {
        Self { posting }
    }

    /// Moves `application` per `request` on behalf of `actor`.
    ///
    /// Every check runs before the record is touched, so an `Err` leaves it
    /// exactly as it was.
    pub fn apply(
        &self,
        actor: &Actor,
        application: &mut Application,
        request: &TransitionRequest,
        now: DateTime<Utc>,
    ) -> Result<TransitionOutcome, TransitionError> {
        request.validate()?;

        let target = self.posting.round(&request.status).ok_or_else(|| {
            ValidationError::UnknownRound {
                round: request.status.trim().to_string(),
            }
        })?;
        let stage: Stage = target
            .stage()
            .ok_or_else(|| ValidationError::UnrecognisedStage {
                round: target.name.clone(),
                stage: target.stage.clone(),
            })?;
        authorize(actor, target, stage)?;

        let feedback = request.feedback.trim();
        if application.is_in(&target.name)
            && application
                .feedback_for(&request.old_status)
                .is_some_and(|entry| entry.feedback_text == feedback)
        {
            return Ok(TransitionOutcome::Replayed);
        }

        if !same_round(&application.status, &request.old_status) {
            return Err(TransitionError::StatusConflict {
                expected: request.old_status.trim().to_string(),
                current: application.status.clone(),
            });
        }

        let left = self
            .posting
            .round(&request.old_status)
            .map(|round| round.name.clone())
            .unwrap_or_else(|| request.old_status.trim().to_string());

        application.status = target.name.clone();
        application.upsert_feedback(&left, feedback);
        application.updated_at = now;
        Ok(TransitionOutcome::Applied)
    }
}
