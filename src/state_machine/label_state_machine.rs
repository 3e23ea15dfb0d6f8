use super::{
    errors::{invalid_transition, StateMachineResult},
    events::LabelEvent,
    guards::OrderLabelGuard,
    states::LabelStatus,
};
use crate::models::Label;
use tracing::debug;

/// Label lifecycle: `active --(Void)--> voided`. Voiding cannot be undone.
#[derive(Debug, Clone, Copy, Default)]
pub struct LabelStateMachine;

impl LabelStateMachine {
    pub fn new() -> Self {
        Self
    }

    pub fn determine_target_state(
        &self,
        current_state: LabelStatus,
        event: LabelEvent,
    ) -> StateMachineResult<LabelStatus> {
        match (current_state, event) {
            (LabelStatus::Active, LabelEvent::Void) => Ok(LabelStatus::Voided),
            (from_state, _) => Err(invalid_transition(from_state, event.event_type())),
        }
    }

    pub fn validate(&self, label: &Label, event: LabelEvent) -> StateMachineResult<LabelStatus> {
        OrderLabelGuard.check(label)?;
        self.determine_target_state(label.status, event)
    }

    pub fn transition(&self, label: &mut Label, event: LabelEvent) -> StateMachineResult<LabelStatus> {
        let target = self.validate(label, event)?;
        debug!(label = %label.label_ref(), from = %label.status, to = %target, "Label transition");
        label.status = target;
        Ok(target)
    }
}
