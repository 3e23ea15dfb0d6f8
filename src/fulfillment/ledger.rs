//! # Shipment Ledger
//!
//! Database persistence for shipments: the vendor order lists, label purchases, manual
//! tracking, and voids. Every write locks the affected item rows and runs the item state
//! machine before touching them, so two purchases for the same item cannot both succeed.

use std::collections::HashMap;

use sqlx::postgres::PgPoolOptions;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use tracing::{debug, info};

use crate::client::PurchaseReceipt;
use crate::config::DatabaseConfig;
use crate::constants::ORDER_LIST_LIMIT;
use crate::error::{FulfillmentError, Result};
use crate::models::{
    ItemId, Label, LabelId, Order, OrderHeader, OrderId, OrderItem, OrderTab, Rate,
    ShippingAddress,
};
use crate::state_machine::{ItemEvent, ItemStateMachine, LabelEvent, LabelStateMachine};

#[derive(FromRow)]
struct AddressRow {
    order_id: OrderId,
    #[sqlx(flatten)]
    address: ShippingAddress,
}

#[derive(Debug, Clone)]
pub struct ShipmentLedger {
    pool: PgPool,
}

impl ShipmentLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a pool sized from configuration
    pub async fn connect(config: &DatabaseConfig, environment: &str) -> Result<Self> {
        let database_url = config.database_url(environment);
        let pool = PgPoolOptions::new()
            .max_connections(config.pool)
            .acquire_timeout(config.checkout_timeout())
            .connect(&database_url)
            .await?;

        info!(pool_size = config.pool, "Shipment ledger connected");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// A vendor's orders for one view, newest first. Only the vendor's own items whose
    /// status belongs to the view are included.
    pub async fn orders_for_vendor(&self, vendor_id: i64, tab: OrderTab) -> Result<Vec<Order>> {
        let statuses: Vec<String> = tab.item_statuses().iter().map(|s| s.to_string()).collect();

        let headers = sqlx::query_as::<_, OrderHeader>(
            r#"
            SELECT o.order_id, o.customer_name, o.order_status, o.created_at
            FROM orders o
            WHERE EXISTS (
                SELECT 1 FROM order_items oi
                WHERE oi.order_id = o.order_id
                  AND oi.vendor_id = $1
                  AND oi.item_status = ANY($2)
            )
            ORDER BY o.created_at DESC, o.order_id DESC
            LIMIT $3
            "#,
        )
        .bind(vendor_id)
        .bind(&statuses)
        .bind(ORDER_LIST_LIMIT)
        .fetch_all(&self.pool)
        .await?;

        if headers.is_empty() {
            return Ok(Vec::new());
        }
        let order_ids: Vec<OrderId> = headers.iter().map(|h| h.order_id).collect();

        let items = sqlx::query_as::<_, OrderItem>(
            r#"
            SELECT item_id, order_id, product_id, product_name, quantity,
                   item_status, tracking_number, carrier
            FROM order_items
            WHERE order_id = ANY($1) AND vendor_id = $2 AND item_status = ANY($3)
            ORDER BY item_id
            "#,
        )
        .bind(&order_ids)
        .bind(vendor_id)
        .bind(&statuses)
        .fetch_all(&self.pool)
        .await?;

        let addresses = sqlx::query_as::<_, AddressRow>(
            r#"
            SELECT order_id, recipient_name, street, address_line_2, city, state, zip, country
            FROM shipping_addresses
            WHERE order_id = ANY($1)
            "#,
        )
        .bind(&order_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut items_by_order: HashMap<OrderId, Vec<OrderItem>> = HashMap::new();
        for item in items {
            items_by_order.entry(item.order_id).or_default().push(item);
        }
        let mut address_by_order: HashMap<OrderId, ShippingAddress> = addresses
            .into_iter()
            .map(|row| (row.order_id, row.address))
            .collect();

        let orders: Vec<Order> = headers
            .into_iter()
            .map(|header| {
                let order_id = header.order_id;
                header.into_order(
                    address_by_order.remove(&order_id),
                    items_by_order.remove(&order_id).unwrap_or_default(),
                )
            })
            .collect();

        debug!(vendor_id, tab = %tab, count = orders.len(), "Loaded vendor orders");
        Ok(orders)
    }

    /// Lock the vendor's items for update, failing if any is missing
    async fn lock_items(
        tx: &mut Transaction<'_, Postgres>,
        vendor_id: i64,
        item_ids: &[ItemId],
    ) -> Result<Vec<OrderItem>> {
        let mut items = sqlx::query_as::<_, OrderItem>(
            r#"
            SELECT item_id, order_id, product_id, product_name, quantity,
                   item_status, tracking_number, carrier
            FROM order_items
            WHERE item_id = ANY($1) AND vendor_id = $2
            ORDER BY item_id
            FOR UPDATE
            "#,
        )
        .bind(item_ids)
        .bind(vendor_id)
        .fetch_all(&mut **tx)
        .await?;

        // Keep the caller's order; the first item carries a group's label cost
        let mut ordered = Vec::with_capacity(item_ids.len());
        for &item_id in item_ids {
            let pos = items
                .iter()
                .position(|i| i.item_id == item_id)
                .ok_or_else(|| FulfillmentError::not_found(format!("item {item_id}")))?;
            ordered.push(items.swap_remove(pos));
        }
        Ok(ordered)
    }

    async fn save_item(tx: &mut Transaction<'_, Postgres>, item: &OrderItem) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE order_items
            SET item_status = $2, tracking_number = $3, carrier = $4
            WHERE item_id = $1
            "#,
        )
        .bind(item.item_id)
        .bind(item.item_status.to_string())
        .bind(&item.tracking_number)
        .bind(&item.carrier)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    /// Persist a purchased label: ship every item and write one label row per item.
    /// The full cost sits on the first row; the rest record zero.
    pub async fn record_label_purchase(
        &self,
        vendor_id: i64,
        item_ids: &[ItemId],
        rate: &Rate,
        receipt: &PurchaseReceipt,
    ) -> Result<Vec<LabelId>> {
        if item_ids.is_empty() {
            return Err(FulfillmentError::validation("A label must cover at least one item"));
        }
        receipt.ensure_tracking()?;

        let carrier = receipt.carrier.clone().unwrap_or_else(|| rate.carrier.clone());
        let event = ItemEvent::LabelPurchased {
            tracking_number: receipt.tracking_number.clone(),
            carrier: carrier.clone(),
        };
        let cost = receipt.amount.unwrap_or(rate.cost);
        let state_machine = ItemStateMachine::new();

        let mut tx = self.pool.begin().await?;
        let mut items = Self::lock_items(&mut tx, vendor_id, item_ids).await?;

        let mut label_ids = Vec::with_capacity(items.len());
        for (index, item) in items.iter_mut().enumerate() {
            state_machine.transition(item, &event)?;
            Self::save_item(&mut tx, item).await?;

            let label_id: LabelId = sqlx::query_scalar(
                r#"
                INSERT INTO shipping_labels
                    (order_id, order_item_id, vendor_id, carrier, service_code, service_name,
                     tracking_number, label_file_path, label_format, cost, status)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'pdf', $9::FLOAT8::NUMERIC, 'active')
                RETURNING id
                "#,
            )
            .bind(item.order_id)
            .bind(item.item_id)
            .bind(vendor_id)
            .bind(&carrier)
            .bind(&rate.service_code)
            .bind(&rate.service)
            .bind(&receipt.tracking_number)
            .bind(&receipt.label_url)
            .bind(if index == 0 { cost } else { 0.0 })
            .fetch_one(&mut *tx)
            .await?;
            label_ids.push(label_id);
        }

        tx.commit().await?;
        info!(vendor_id, item_ids = ?item_ids, tracking_number = %receipt.tracking_number, "Recorded label purchase");
        Ok(label_ids)
    }

    /// Persist a tracking number entered by hand for every item of a shipment
    pub async fn record_tracking(
        &self,
        vendor_id: i64,
        item_ids: &[ItemId],
        carrier: &str,
        tracking_number: &str,
    ) -> Result<()> {
        let event = ItemEvent::TrackingEntered {
            tracking_number: tracking_number.to_string(),
            carrier: carrier.to_string(),
        };
        let state_machine = ItemStateMachine::new();

        let mut tx = self.pool.begin().await?;
        let mut items = Self::lock_items(&mut tx, vendor_id, item_ids).await?;
        for item in &mut items {
            state_machine.transition(item, &event)?;
            Self::save_item(&mut tx, item).await?;
        }
        tx.commit().await?;

        info!(vendor_id, item_ids = ?item_ids, tracking_number, "Recorded manual tracking");
        Ok(())
    }

    /// Void an order label and return its item to pending
    pub async fn void_label(&self, vendor_id: i64, label_id: LabelId) -> Result<Label> {
        let mut tx = self.pool.begin().await?;

        let mut label = sqlx::query_as::<_, Label>(
            r#"
            SELECT sl.id AS db_id, 'order' AS type, sl.order_id, sl.order_item_id,
                   NULL::TEXT AS label_id, sl.carrier, sl.service_name, sl.tracking_number,
                   sl.cost::FLOAT8 AS cost, sl.label_file_path, sl.status, sl.created_at,
                   NULL::TEXT AS customer_name, oi.product_name, oi.quantity
            FROM shipping_labels sl
            JOIN order_items oi ON sl.order_item_id = oi.item_id
            WHERE sl.id = $1 AND sl.vendor_id = $2
            FOR UPDATE OF sl
            "#,
        )
        .bind(label_id)
        .bind(vendor_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| FulfillmentError::not_found(format!("label {label_id}")))?;

        LabelStateMachine::new().transition(&mut label, LabelEvent::Void)?;
        sqlx::query("UPDATE shipping_labels SET status = $2 WHERE id = $1")
            .bind(label.id)
            .bind(label.status.to_string())
            .execute(&mut *tx)
            .await?;

        if let Some(item_id) = label.order_item_id {
            let mut items = Self::lock_items(&mut tx, vendor_id, &[item_id]).await?;
            for item in &mut items {
                ItemStateMachine::new().transition(item, &ItemEvent::Void)?;
                Self::save_item(&mut tx, item).await?;
            }
        }

        tx.commit().await?;
        info!(vendor_id, label_id, "Voided label");
        Ok(label)
    }

    /// Order and standalone labels for the label library
    pub async fn labels_for_user(&self, user_id: i64) -> Result<Vec<Label>> {
        Ok(Label::list_for_user(&self.pool, user_id).await?)
    }
}
