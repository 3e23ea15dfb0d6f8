//! Validation and bookkeeping for merged shipments.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::GroupId;
use crate::constants::MIN_MERGE_ITEMS;
use crate::error::MergeError;
use crate::models::{ItemId, NormalizedAddress, Order, OrderItem};

/// Several order items shipped together in one parcel set to one address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergedShipmentGroup {
    pub group_id: GroupId,
    /// Members in selection order. The first one stands in for the group when quoting.
    pub item_ids: Vec<ItemId>,
    pub address: NormalizedAddress,
    pub created_at: DateTime<Utc>,
}

impl MergedShipmentGroup {
    pub fn primary_item(&self) -> ItemId {
        self.item_ids[0]
    }

    pub fn contains(&self, item_id: ItemId) -> bool {
        self.item_ids.contains(&item_id)
    }
}

fn find_item(orders: &[Order], item_id: ItemId) -> Option<(&Order, &OrderItem)> {
    orders
        .iter()
        .find_map(|order| order.item(item_id).map(|item| (order, item)))
}

/// Check that `selected` can form a group and return the shared address.
///
/// `is_merged` reports items already claimed by another group.
pub fn validate_merge(
    orders: &[Order],
    selected: &[ItemId],
    is_merged: impl Fn(ItemId) -> bool,
) -> Result<NormalizedAddress, MergeError> {
    if selected.len() < MIN_MERGE_ITEMS {
        return Err(MergeError::TooFewItems {
            selected: selected.len(),
        });
    }

    let mut shared: Option<NormalizedAddress> = None;
    for &item_id in selected {
        let (order, item) = find_item(orders, item_id).ok_or(MergeError::UnknownItem(item_id))?;

        if is_merged(item_id) {
            return Err(MergeError::AlreadyMerged(item_id));
        }
        if !item.item_status.is_shippable() {
            return Err(MergeError::NotPending(item_id));
        }

        let address = order
            .shipping_address
            .as_ref()
            .ok_or(MergeError::MissingAddress(item_id))?
            .normalized();

        match &shared {
            None => shared = Some(address),
            Some(first) if first.first_difference(&address).is_some() => {
                return Err(MergeError::AddressMismatch { item_id });
            }
            Some(_) => {}
        }
    }

    shared.ok_or(MergeError::TooFewItems { selected: 0 })
}
