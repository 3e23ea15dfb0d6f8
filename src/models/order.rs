use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

use super::address::ShippingAddress;
use super::order_item::{ItemId, OrderItem};
use crate::state_machine::ItemStatus;

pub type OrderId = i64;

/// A customer order with its line items, as listed for a vendor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: OrderId,
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub shipping_address: Option<ShippingAddress>,
    #[serde(default)]
    pub order_status: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub items: Vec<OrderItem>,
}

impl Order {
    pub fn item(&self, item_id: ItemId) -> Option<&OrderItem> {
        self.items.iter().find(|item| item.item_id == item_id)
    }

    pub fn has_item(&self, item_id: ItemId) -> bool {
        self.item(item_id).is_some()
    }
}

/// Order header columns, joined with items and address by the ledger.
/// Maps to `orders` table
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct OrderHeader {
    pub order_id: OrderId,
    pub customer_name: String,
    pub order_status: String,
    pub created_at: DateTime<Utc>,
}

impl OrderHeader {
    pub fn into_order(self, shipping_address: Option<ShippingAddress>, items: Vec<OrderItem>) -> Order {
        Order {
            order_id: self.order_id,
            customer_name: self.customer_name,
            shipping_address,
            order_status: self.order_status,
            created_at: self.created_at,
            items,
        }
    }
}

/// The two vendor order views
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderTab {
    /// Orders with at least one pending item
    Unshipped,
    /// Orders with items that already carry a label or tracking number
    Shipped,
}

impl OrderTab {
    /// Item statuses shown in this view
    pub fn item_statuses(&self) -> &'static [ItemStatus] {
        match self {
            Self::Unshipped => &[ItemStatus::Pending],
            Self::Shipped => &[ItemStatus::Shipped, ItemStatus::Delivered],
        }
    }

    pub fn includes(&self, status: ItemStatus) -> bool {
        self.item_statuses().contains(&status)
    }
}

impl fmt::Display for OrderTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unshipped => write!(f, "unshipped"),
            Self::Shipped => write!(f, "shipped"),
        }
    }
}

impl Default for OrderTab {
    fn default() -> Self {
        Self::Unshipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tab_statuses() {
        assert!(OrderTab::Unshipped.includes(ItemStatus::Pending));
        assert!(!OrderTab::Unshipped.includes(ItemStatus::Shipped));
        assert!(OrderTab::Shipped.includes(ItemStatus::Delivered));
        assert_eq!(OrderTab::Shipped.to_string(), "shipped");
    }

    #[test]
    fn test_order_item_lookup() {
        let order: Order = serde_json::from_str(
            r#"{
                "order_id": 5,
                "customer_name": "Lin",
                "order_status": "paid",
                "created_at": "2026-03-01T12:00:00Z",
                "items": [{"item_id": 51, "order_id": 5, "product_name": "Print", "item_status": "pending"}]
            }"#,
        )
        .unwrap();
        assert!(order.has_item(51));
        assert!(order.item(52).is_none());
        assert!(order.shipping_address.is_none());
    }
}
