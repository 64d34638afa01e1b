use super::domain::{Actor, Role, Round, Stage};

/// Whether `role` may move an application into a round of `target` stage.
///
/// Only the target matters: the current status is not consulted, so an admin
/// can move a card across several stages in one step.
pub const fn can_transition(role: Role, target: Stage) -> bool {
    match role {
        Role::SubVendor => false,
        Role::Client => matches!(target, Stage::StageTwo),
        Role::Admin => true,
    }
}

/// Whether `role` may drag cards at all.
pub fn can_move_cards(role: Role) -> bool {
    Stage::ordered()
        .into_iter()
        .any(|stage| can_transition(role, stage))
}

/// Refusal to move an application into a round.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{role} users are not authorized to move applications to '{round}' ({stage})")]
pub struct AuthorizationError {
    pub role: Role,
    pub round: String,
    pub stage: Stage,
}

pub fn authorize(actor: &Actor, round: &Round, stage: Stage) -> Result<(), AuthorizationError> {
    if can_transition(actor.role, stage) {
        Ok(())
    } else {
        Err(AuthorizationError {
            role: actor.role,
            round: round.name.clone(),
            stage,
        })
    }
}
