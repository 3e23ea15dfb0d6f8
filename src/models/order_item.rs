use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool, Row};

use super::order::OrderId;
use crate::state_machine::ItemStatus;

pub type ItemId = i64;

/// A single line of an order. Items are the unit of shipment.
/// Maps to `order_items` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub item_id: ItemId,
    pub order_id: OrderId,
    #[serde(default)]
    pub product_id: i64,
    pub product_name: String,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
    #[serde(default)]
    pub item_status: ItemStatus,
    #[serde(default)]
    pub tracking_number: Option<String>,
    #[serde(default)]
    pub carrier: Option<String>,
}

fn default_quantity() -> i32 {
    1
}

impl<'r> FromRow<'r, PgRow> for OrderItem {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let status: String = row.try_get("item_status")?;
        let item_status = status
            .parse::<ItemStatus>()
            .map_err(|msg| sqlx::Error::Decode(msg.into()))?;

        Ok(Self {
            item_id: row.try_get("item_id")?,
            order_id: row.try_get("order_id")?,
            product_id: row.try_get("product_id")?,
            product_name: row.try_get("product_name")?,
            quantity: row.try_get("quantity")?,
            item_status,
            tracking_number: row.try_get("tracking_number")?,
            carrier: row.try_get("carrier")?,
        })
    }
}

impl OrderItem {
    /// Find an item by ID
    pub async fn find_by_id(pool: &PgPool, item_id: ItemId) -> Result<Option<OrderItem>, sqlx::Error> {
        sqlx::query_as::<_, OrderItem>(
            r#"
            SELECT item_id, order_id, product_id, product_name, quantity,
                   item_status, tracking_number, carrier
            FROM order_items
            WHERE item_id = $1
            "#,
        )
        .bind(item_id)
        .fetch_optional(pool)
        .await
    }

    /// List the items of an order in insertion order
    pub async fn list_by_order(pool: &PgPool, order_id: OrderId) -> Result<Vec<OrderItem>, sqlx::Error> {
        sqlx::query_as::<_, OrderItem>(
            r#"
            SELECT item_id, order_id, product_id, product_name, quantity,
                   item_status, tracking_number, carrier
            FROM order_items
            WHERE order_id = $1
            ORDER BY item_id
            "#,
        )
        .bind(order_id)
        .fetch_all(pool)
        .await
    }

    pub fn has_tracking(&self) -> bool {
        self.tracking_number
            .as_deref()
            .is_some_and(|t| !t.trim().is_empty())
    }
}
