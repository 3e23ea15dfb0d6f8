//! # Shipping API Trait
//!
//! Transport-agnostic interface to the remote shipping API. The HTTP client implements it
//! for production; tests substitute in-memory doubles.

use async_trait::async_trait;

use super::errors::ClientResult;
use super::types::{
    BatchEntry, BatchItemResult, CancelLabelRequest, PrintOutcome, PurchaseLabelRequest,
    PurchaseReceipt, RateRequest,
};
use crate::models::{Label, LabelId, Order, OrderTab, Rate};

#[async_trait]
pub trait ShippingApi: Send + Sync {
    /// Vendor orders for one view, each with its items and address
    async fn list_orders(&self, tab: OrderTab) -> ClientResult<Vec<Order>>;

    /// Carrier rates for a set of packages, in the order the server ranks them
    async fn fetch_rates(&self, request: &RateRequest) -> ClientResult<Vec<Rate>>;

    /// Buy a single label
    async fn purchase_label(&self, request: &PurchaseLabelRequest) -> ClientResult<PurchaseReceipt>;

    /// Submit every completed form at once
    async fn process_batch(&self, entries: &[BatchEntry]) -> ClientResult<Vec<BatchItemResult>>;

    /// Void a label or cancel a shipment
    async fn cancel_label(&self, request: &CancelLabelRequest) -> ClientResult<()>;

    /// Labels bought for orders
    async fn list_labels(&self) -> ClientResult<Vec<Label>>;

    /// Labels bought outside any order
    async fn list_standalone_labels(&self) -> ClientResult<Vec<Label>>;

    /// Combine labels into one printable document
    async fn print_labels(&self, label_ids: &[LabelId]) -> ClientResult<PrintOutcome>;
}
