use vigia_core::{EngineError, EngineResult};
use vigia_shared::ApprovalStatus;

/// Validate a requested approval transition. The only legal moves are
/// pending_approval → approved and pending_approval → rejected; terminal
/// states admit nothing. Independent of any UI.
pub fn validate_transition(from: ApprovalStatus, to: ApprovalStatus) -> EngineResult<()> {
    let legal = from == ApprovalStatus::PendingApproval
        && matches!(to, ApprovalStatus::Approved | ApprovalStatus::Rejected);
    if legal {
        Ok(())
    } else {
        Err(EngineError::InvalidTransition {
            from: from.to_string(),
            to: to.to_string(),
        })
    }
}
