//! Hiring pipeline: job posting rounds, role-gated stage transitions, per-round
//! feedback, and the board and funnel views built from them.

pub mod authorization;
pub mod board;
pub mod domain;
pub mod funnel;
pub mod repository;
pub mod rounds;
pub mod router;
pub mod service;
pub mod transition;

#[cfg(test)]
mod tests;

pub use authorization::{authorize, can_move_cards, can_transition, AuthorizationError};
pub use board::{Board, BoardCard, BoardColumn, EMPTY_COLUMN_PLACEHOLDER, FEEDBACK_NOT_AVAILABLE};
pub use domain::{
    Actor, Application, ApplicationId, ApplicationSubmission, CandidateDetails, FeedbackEntry,
    JobPosting, JobPostingId, NewJobPosting, Role, Round, Stage, ValidationError,
};
pub use funnel::{FunnelEntry, FunnelReport};
pub use repository::{
    PipelineRepository, PublishError, RepositoryError, StageChangeEvent, StageEventPublisher,
};
pub use rounds::{
    derive_rounds, derive_visible_rounds, entry_round, RoundPlan, DEFAULT_STAGE_TWO_ROUNDS,
    MAX_STAGE_TWO_ROUNDS, MIN_STAGE_TWO_ROUNDS,
};
pub use router::{actor_from_headers, pipeline_router, ACTOR_ID_HEADER, ACTOR_ROLE_HEADER};
pub use service::{HiringPipelineService, PipelineServiceError};
pub use transition::{StageTransition, TransitionError, TransitionOutcome, TransitionRequest};
