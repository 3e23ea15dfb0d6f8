use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool, Row};
use std::fmt;

use super::order::OrderId;
use super::order_item::ItemId;
use crate::state_machine::LabelStatus;

pub type LabelId = i64;

/// Which table a label lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelKind {
    /// Bought for an order item, stored in `shipping_labels`
    Order,
    /// Bought outside any order, stored in `standalone_shipping_labels`
    Standalone,
}

impl Default for LabelKind {
    fn default() -> Self {
        Self::Order
    }
}

impl fmt::Display for LabelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Order => write!(f, "order"),
            Self::Standalone => write!(f, "standalone"),
        }
    }
}

impl std::str::FromStr for LabelKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "order" => Ok(Self::Order),
            "standalone" => Ok(Self::Standalone),
            _ => Err(format!("Invalid label kind: {s}")),
        }
    }
}

/// Library identity of a label. Ids are only unique per table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LabelRef {
    pub kind: LabelKind,
    pub id: LabelId,
}

impl LabelRef {
    pub fn order(id: LabelId) -> Self {
        Self {
            kind: LabelKind::Order,
            id,
        }
    }

    pub fn standalone(id: LabelId) -> Self {
        Self {
            kind: LabelKind::Standalone,
            id,
        }
    }
}

impl fmt::Display for LabelRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.kind, self.id)
    }
}

/// A purchased shipping label as shown in the label library
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    #[serde(rename = "db_id", alias = "id")]
    pub id: LabelId,
    #[serde(rename = "type", default)]
    pub kind: LabelKind,
    #[serde(default)]
    pub order_id: Option<OrderId>,
    #[serde(default)]
    pub order_item_id: Option<ItemId>,
    /// Provider-side label identifier, present on standalone labels
    #[serde(default)]
    pub label_id: Option<String>,
    #[serde(default)]
    pub carrier: Option<String>,
    #[serde(default)]
    pub service_name: String,
    pub tracking_number: String,
    #[serde(default, deserialize_with = "deserialize_cost")]
    pub cost: f64,
    #[serde(default)]
    pub label_file_path: Option<String>,
    #[serde(default)]
    pub status: LabelStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub quantity: Option<i32>,
}

/// Costs arrive either as JSON numbers or as decimal strings
fn deserialize_cost<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Cost {
        Number(f64),
        Text(String),
    }

    match Cost::deserialize(deserializer)? {
        Cost::Number(n) => Ok(n),
        Cost::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

impl<'r> FromRow<'r, PgRow> for Label {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let kind: String = row.try_get("type")?;
        let status: String = row.try_get("status")?;

        Ok(Self {
            id: row.try_get("db_id")?,
            kind: kind
                .parse()
                .map_err(|msg: String| sqlx::Error::Decode(msg.into()))?,
            order_id: row.try_get("order_id")?,
            order_item_id: row.try_get("order_item_id")?,
            label_id: row.try_get("label_id")?,
            carrier: row.try_get("carrier")?,
            service_name: row.try_get("service_name")?,
            tracking_number: row.try_get("tracking_number")?,
            cost: row.try_get("cost")?,
            label_file_path: row.try_get("label_file_path")?,
            status: status
                .parse()
                .map_err(|msg: String| sqlx::Error::Decode(msg.into()))?,
            created_at: row.try_get("created_at")?,
            customer_name: row.try_get("customer_name")?,
            product_name: row.try_get("product_name")?,
            quantity: row.try_get("quantity")?,
        })
    }
}

impl Label {
    pub fn label_ref(&self) -> LabelRef {
        LabelRef {
            kind: self.kind,
            id: self.id,
        }
    }

    pub fn is_voided(&self) -> bool {
        self.status == LabelStatus::Voided
    }

    /// Only active labels attached to an order can be voided or batch printed
    pub fn is_actionable(&self) -> bool {
        self.kind == LabelKind::Order && !self.is_voided()
    }

    /// Every order and standalone label a user owns, newest first
    pub async fn list_for_user(pool: &PgPool, user_id: i64) -> Result<Vec<Label>, sqlx::Error> {
        sqlx::query_as::<_, Label>(
            r#"
            SELECT sl.id AS db_id, 'order' AS type, sl.order_id, sl.order_item_id,
                   NULL::TEXT AS label_id, sl.carrier, sl.service_name, sl.tracking_number,
                   sl.cost::FLOAT8 AS cost, sl.label_file_path, sl.status, sl.created_at,
                   sa.recipient_name AS customer_name, oi.product_name, oi.quantity
            FROM shipping_labels sl
            JOIN order_items oi ON sl.order_item_id = oi.item_id
            LEFT JOIN shipping_addresses sa ON sa.order_id = sl.order_id
            WHERE sl.vendor_id = $1

            UNION ALL

            SELECT ssl.id AS db_id, 'standalone' AS type, NULL::BIGINT AS order_id,
                   NULL::BIGINT AS order_item_id, ssl.label_id, ssl.carrier, ssl.service_name,
                   ssl.tracking_number, ssl.cost::FLOAT8 AS cost, ssl.label_file_path,
                   ssl.status, ssl.created_at, 'N/A' AS customer_name,
                   'Standalone Label' AS product_name, 1 AS quantity
            FROM standalone_shipping_labels ssl
            WHERE ssl.user_id = $1

            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }
}
