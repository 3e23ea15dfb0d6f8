use super::{
    errors::{invalid_transition, StateMachineResult},
    events::ItemEvent,
    guards::{StateGuard, TrackingOnFileGuard, TrackingPresentGuard},
    states::ItemStatus,
};
use crate::models::OrderItem;
use tracing::debug;

/// Order item status machine.
///
/// ```text
/// pending --(LabelPurchased | TrackingEntered)--> shipped --(Void | Cancel)--> pending
/// ```
///
/// `delivered` is terminal and only reached through carrier updates outside this crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct ItemStateMachine;

impl ItemStateMachine {
    pub fn new() -> Self {
        Self
    }

    /// Determine the target state based on current state and event
    pub fn determine_target_state(
        &self,
        current_state: ItemStatus,
        event: &ItemEvent,
    ) -> StateMachineResult<ItemStatus> {
        let target = match (current_state, event) {
            (ItemStatus::Pending, ItemEvent::LabelPurchased { .. }) => ItemStatus::Shipped,
            (ItemStatus::Pending, ItemEvent::TrackingEntered { .. }) => ItemStatus::Shipped,

            (ItemStatus::Shipped, ItemEvent::Void) => ItemStatus::Pending,
            (ItemStatus::Shipped, ItemEvent::Cancel) => ItemStatus::Pending,

            (from_state, _) => return Err(invalid_transition(from_state, event.event_type())),
        };

        Ok(target)
    }

    /// Check the transition without touching the item
    pub fn validate(&self, item: &OrderItem, event: &ItemEvent) -> StateMachineResult<ItemStatus> {
        let target = self.determine_target_state(item.item_status, event)?;
        TrackingPresentGuard.check(item, event)?;
        TrackingOnFileGuard.check(item, event)?;
        Ok(target)
    }

    /// Apply an event to an item. The item is left untouched when the transition is rejected.
    pub fn transition(&self, item: &mut OrderItem, event: &ItemEvent) -> StateMachineResult<ItemStatus> {
        let target = self.validate(item, event)?;

        debug!(
            item_id = item.item_id,
            from = %item.item_status,
            to = %target,
            event = event.event_type(),
            "Item transition"
        );

        match event.tracking() {
            Some((tracking, carrier)) => {
                item.tracking_number = Some(tracking.to_string());
                item.carrier = Some(carrier.to_string());
            }
            None => {
                item.tracking_number = None;
                item.carrier = None;
            }
        }
        item.item_status = target;

        Ok(target)
    }
}
