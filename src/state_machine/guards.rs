use super::errors::{guard_failed, StateMachineResult};
use super::events::ItemEvent;
use crate::models::{Label, LabelKind, OrderItem};

/// Trait for implementing state transition guards
pub trait StateGuard<T> {
    /// Check if a transition is allowed
    fn check(&self, entity: &T, event: &ItemEvent) -> StateMachineResult<()>;

    /// Get a description of this guard for logging
    fn description(&self) -> &'static str;
}

/// Shipping events must carry a non-blank tracking number and carrier
pub struct TrackingPresentGuard;

impl StateGuard<OrderItem> for TrackingPresentGuard {
    fn check(&self, item: &OrderItem, event: &ItemEvent) -> StateMachineResult<()> {
        match event.tracking() {
            Some((tracking, carrier)) if !tracking.trim().is_empty() && !carrier.trim().is_empty() => Ok(()),
            Some(_) => Err(guard_failed(format!(
                "Item {} requires a tracking number and carrier to ship",
                item.item_id
            ))),
            None => Ok(()),
        }
    }

    fn description(&self) -> &'static str {
        "Shipping events must carry tracking number and carrier"
    }
}

/// Cancelling a shipment requires the tracking number the carrier issued
pub struct TrackingOnFileGuard;

impl StateGuard<OrderItem> for TrackingOnFileGuard {
    fn check(&self, item: &OrderItem, event: &ItemEvent) -> StateMachineResult<()> {
        if matches!(event, ItemEvent::Cancel) && !item.has_tracking() {
            return Err(guard_failed(format!(
                "Item {} has no tracking number to cancel",
                item.item_id
            )));
        }
        Ok(())
    }

    fn description(&self) -> &'static str {
        "Cancelled shipments must have a tracking number on file"
    }
}

/// Only order labels can be voided through the label library
pub struct OrderLabelGuard;

impl OrderLabelGuard {
    pub fn check(&self, label: &Label) -> StateMachineResult<()> {
        if label.kind != LabelKind::Order {
            return Err(guard_failed(format!(
                "Label {} is a standalone label and cannot be voided here",
                label.label_ref()
            )));
        }
        Ok(())
    }

    pub fn description(&self) -> &'static str {
        "Only order labels can be voided"
    }
}
