//! Round lists: the default plan generated for new postings and the ordered,
//! role-filtered view every board and transition works from.

use super::domain::{Role, Round, Stage, ValidationError};

pub const MIN_STAGE_TWO_ROUNDS: u8 = 1;
pub const MAX_STAGE_TWO_ROUNDS: u8 = 3;
pub const DEFAULT_STAGE_TWO_ROUNDS: u8 = 2;

/// Default round layout for a new job posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundPlan {
    stage_two_rounds: u8,
}

impl RoundPlan {
    pub fn new(stage_two_rounds: u8) -> Result<Self, ValidationError> {
        if !(MIN_STAGE_TWO_ROUNDS..=MAX_STAGE_TWO_ROUNDS).contains(&stage_two_rounds) {
            return Err(ValidationError::StageTwoRoundCount {
                min: MIN_STAGE_TWO_ROUNDS,
                max: MAX_STAGE_TWO_ROUNDS,
                actual: stage_two_rounds,
            });
        }
        Ok(Self { stage_two_rounds })
    }

    pub fn stage_two_rounds(&self) -> u8 {
        self.stage_two_rounds
    }

    pub fn rounds(&self) -> Vec<Round> {
        let mut rounds = vec![
            Round::new("pre-screen", Stage::StageOne),
            Round::new("pre-interview", Stage::StageOne),
        ];
        rounds.extend(
            (1..=self.stage_two_rounds)
                .map(|index| Round::new(format!("round {index}"), Stage::StageTwo)),
        );
        rounds.push(Round::new("hired", Stage::Hired));
        rounds.push(Round::new("rejected", Stage::Rejected));
        rounds
    }
}

impl Default for RoundPlan {
    fn default() -> Self {
        Self {
            stage_two_rounds: DEFAULT_STAGE_TWO_ROUNDS,
        }
    }
}

/// Checks a caller-supplied round list before it is stored on a posting.
pub fn validate_rounds(rounds: &[Round]) -> Result<(), ValidationError> {
    for (index, round) in rounds.iter().enumerate() {
        if round.name.trim().is_empty() {
            return Err(ValidationError::BlankField {
                field: "rounds.name",
            });
        }
        if round.stage().is_none() {
            return Err(ValidationError::UnrecognisedStage {
                round: round.name.clone(),
                stage: round.stage.clone(),
            });
        }
        if rounds[..index].iter().any(|earlier| earlier.is_named(&round.name)) {
            return Err(ValidationError::DuplicateRound {
                round: round.name.clone(),
            });
        }
    }

    if entry_round(rounds).is_none() {
        return Err(ValidationError::NoEntryRound);
    }
    Ok(())
}

/// Recognised rounds in canonical stage order, first occurrence of each name kept.
///
/// The sort is stable, so rounds sharing a stage keep their stored order.
pub fn derive_rounds(rounds: &[Round]) -> Vec<Round> {
    let mut derived: Vec<(Stage, Round)> = Vec::with_capacity(rounds.len());
    for round in rounds {
        let Some(stage) = round.stage() else {
            continue;
        };
        if derived.iter().any(|(_, kept)| kept.is_named(&round.name)) {
            continue;
        }
        derived.push((stage, round.clone()));
    }
    derived.sort_by_key(|(stage, _)| stage.rank());
    derived.into_iter().map(|(_, round)| round).collect()
}

/// [`derive_rounds`] restricted to the stages `role` is allowed to see.
pub fn derive_visible_rounds(rounds: &[Round], role: Role) -> Vec<Round> {
    derive_rounds(rounds)
        .into_iter()
        .filter(|round| round.stage().is_some_and(|stage| role.sees(stage)))
        .collect()
}

/// Round new applications start in: the first stage 1 round in derived order.
pub fn entry_round(rounds: &[Round]) -> Option<Round> {
    derive_rounds(rounds)
        .into_iter()
        .find(|round| round.stage() == Some(Stage::StageOne))
}
