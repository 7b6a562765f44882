use crate::error::{AppError, Result};
use crate::models::IncidentStatus;

/// Transition validation for incident status changes
pub struct LifecycleGuard;

impl LifecycleGuard {
    /// Statuses reachable in one step from `from`
    pub fn allowed_next(from: IncidentStatus) -> &'static [IncidentStatus] {
        use IncidentStatus::*;

        match from {
            Open => &[Acknowledged],
            Acknowledged => &[Mitigating],
            Mitigating => &[Resolved],
            Resolved => &[Closed],
            Closed => &[Closed],
        }
    }

    /// Accept `from -> to` when equal or listed in the transition table.
    ///
    /// Pure check; the caller applies the new status only after this returns
    /// `Ok`.
    pub fn validate(from: IncidentStatus, to: IncidentStatus) -> Result<()> {
        if Self::can_transition(from, to) {
            return Ok(());
        }
        Err(AppError::IllegalTransition { from, to })
    }

    pub fn can_transition(from: IncidentStatus, to: IncidentStatus) -> bool {
        from == to || Self::allowed_next(from).contains(&to)
    }
}
