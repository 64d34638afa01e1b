use serde::Serialize;

use super::domain::{Application, JobPosting, JobPostingId, Stage};
use super::rounds::derive_rounds;

/// Share of a job posting's applications sitting in each round.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FunnelReport {
    pub job_id: JobPostingId,
    pub total: usize,
    pub rounds: Vec<FunnelEntry>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FunnelEntry {
    pub round: String,
    pub stage: Stage,
    pub count: usize,
    /// Percentage of `total`, one decimal place.
    pub share: f64,
}

impl FunnelReport {
    pub fn build(posting: &JobPosting, applications: &[Application]) -> Self {
        let total = applications.len();
        let rounds = derive_rounds(&posting.rounds)
            .into_iter()
            .filter_map(|round| {
                let stage = round.stage()?;
                let count = applications
                    .iter()
                    .filter(|application| application.is_in(&round.name))
                    .count();
                Some(FunnelEntry {
                    round: round.name,
                    stage,
                    count,
                    share: share_of(count, total),
                })
            })
            .collect();

        Self {
            job_id: posting.id.clone(),
            total,
            rounds,
        }
    }
}

fn share_of(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let percent = count as f64 / total as f64 * 100.0;
    (percent * 10.0).round() / 10.0
}
