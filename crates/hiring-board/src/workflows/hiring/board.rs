use serde::Serialize;

use super::authorization::{can_move_cards, can_transition};
use super::domain::{
    same_round, Application, ApplicationId, JobPosting, JobPostingId, Role, Stage,
};
use super::rounds::derive_visible_rounds;

pub const FEEDBACK_NOT_AVAILABLE: &str = "not available";
pub const EMPTY_COLUMN_PLACEHOLDER: &str = "No applications in this stage.";

/// Column-per-round view of a job posting's applications for one role.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub job_id: JobPostingId,
    pub viewer: Role,
    pub draggable: bool,
    /// Round names the viewer may drop a card onto.
    pub drop_targets: Vec<String>,
    pub columns: Vec<BoardColumn>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardColumn {
    pub round: String,
    pub stage: Stage,
    pub cards: Vec<BoardCard>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardCard {
    pub application_id: ApplicationId,
    pub candidate_name: String,
    pub email: String,
    pub status: String,
    pub feedback: String,
}

impl Board {
    pub fn assemble(posting: &JobPosting, applications: &[Application], viewer: Role) -> Self {
        let visible = derive_visible_rounds(&posting.rounds, viewer);

        let drop_targets = visible
            .iter()
            .filter(|round| {
                round
                    .stage()
                    .is_some_and(|stage| can_transition(viewer, stage))
            })
            .map(|round| round.name.clone())
            .collect();

        let columns = visible
            .iter()
            .filter_map(|round| {
                let stage = round.stage()?;
                let cards: Vec<BoardCard> = applications
                    .iter()
                    .filter(|application| application.is_in(&round.name))
                    .map(|application| BoardCard {
                        application_id: application.id.clone(),
                        candidate_name: application.candidate.full_name(),
                        email: application.candidate.email.clone(),
                        status: application.status.clone(),
                        feedback: application
                            .feedback_for(&round.name)
                            .map(|entry| entry.feedback_text.clone())
                            .unwrap_or_else(|| FEEDBACK_NOT_AVAILABLE.to_string()),
                    })
                    .collect();
                let placeholder = cards.is_empty().then_some(EMPTY_COLUMN_PLACEHOLDER);
                Some(BoardColumn {
                    round: round.name.clone(),
                    stage,
                    cards,
                    placeholder,
                })
            })
            .collect();

        Self {
            job_id: posting.id.clone(),
            viewer,
            draggable: can_move_cards(viewer),
            drop_targets,
            columns,
        }
    }

    pub fn column(&self, round: &str) -> Option<&BoardColumn> {
        self.columns
            .iter()
            .find(|column| same_round(&column.round, round))
    }
}
