//! In-memory shipping API double. Responses are queued per endpoint and every request is
//! recorded for assertions.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use fulfillment_core::client::{
    BatchEntry, BatchItemResult, CancelLabelRequest, ClientError, ClientResult, PrintOutcome,
    PurchaseLabelRequest, PurchaseReceipt, RateRequest, ShippingApi,
};
use fulfillment_core::models::{Label, LabelId, Order, OrderTab, Rate};
use parking_lot::Mutex;
use tokio::sync::Notify;

#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    ListOrders(OrderTab),
    FetchRates(RateRequest),
    PurchaseLabel(PurchaseLabelRequest),
    ProcessBatch(Vec<BatchEntry>),
    CancelLabel(CancelLabelRequest),
    ListLabels,
    ListStandaloneLabels,
    PrintLabels(Vec<LabelId>),
}

#[derive(Default)]
pub struct MockShippingApi {
    pub unshipped: Mutex<Vec<Order>>,
    pub shipped: Mutex<Vec<Order>>,
    pub rates: Mutex<VecDeque<ClientResult<Vec<Rate>>>>,
    pub receipts: Mutex<VecDeque<ClientResult<PurchaseReceipt>>>,
    pub batch_results: Mutex<VecDeque<ClientResult<Vec<BatchItemResult>>>>,
    pub cancel_results: Mutex<VecDeque<ClientResult<()>>>,
    pub labels: Mutex<Vec<Label>>,
    pub standalone_labels: Mutex<Option<Vec<Label>>>,
    pub calls: Mutex<Vec<RecordedCall>>,
    /// When set, purchases wait for a notification before answering
    pub purchase_gate: Mutex<Option<Arc<Notify>>>,
}

impl MockShippingApi {
    pub fn with_orders(unshipped: Vec<Order>) -> Self {
        let api = Self::default();
        *api.unshipped.lock() = unshipped;
        *api.standalone_labels.lock() = Some(Vec::new());
        api
    }

    pub fn queue_rates(&self, result: ClientResult<Vec<Rate>>) {
        self.rates.lock().push_back(result);
    }

    pub fn queue_receipt(&self, result: ClientResult<PurchaseReceipt>) {
        self.receipts.lock().push_back(result);
    }

    pub fn queue_batch(&self, result: ClientResult<Vec<BatchItemResult>>) {
        self.batch_results.lock().push_back(result);
    }

    pub fn queue_cancel(&self, result: ClientResult<()>) {
        self.cancel_results.lock().push_back(result);
    }

    /// Hold purchases until the returned handle is notified
    pub fn gate_purchases(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.purchase_gate.lock() = Some(Arc::clone(&gate));
        gate
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    fn record(&self, call: RecordedCall) {
        self.calls.lock().push(call);
    }

    fn unqueued(endpoint: &str) -> ClientError {
        ClientError::api_error(500, format!("no response queued for {endpoint}"))
    }
}

pub fn receipt(tracking_number: &str) -> PurchaseReceipt {
    PurchaseReceipt {
        success: true,
        tracking_number: tracking_number.to_string(),
        carrier: None,
        label_id: Some(501),
        label_url: Some("/labels/user_7/501.pdf".to_string()),
        payment_method: None,
        amount: Some(11.2),
        error: None,
    }
}

#[async_trait]
impl ShippingApi for MockShippingApi {
    async fn list_orders(&self, tab: OrderTab) -> ClientResult<Vec<Order>> {
        self.record(RecordedCall::ListOrders(tab));
        Ok(match tab {
            OrderTab::Unshipped => self.unshipped.lock().clone(),
            OrderTab::Shipped => self.shipped.lock().clone(),
        })
    }

    async fn fetch_rates(&self, request: &RateRequest) -> ClientResult<Vec<Rate>> {
        self.record(RecordedCall::FetchRates(request.clone()));
        self.rates
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(Self::unqueued("rates")))
    }

    async fn purchase_label(&self, request: &PurchaseLabelRequest) -> ClientResult<PurchaseReceipt> {
        self.record(RecordedCall::PurchaseLabel(request.clone()));
        let gate = self.purchase_gate.lock().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.receipts
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(Self::unqueued("purchase")))
    }

    async fn process_batch(&self, entries: &[BatchEntry]) -> ClientResult<Vec<BatchItemResult>> {
        self.record(RecordedCall::ProcessBatch(entries.to_vec()));
        self.batch_results
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(Self::unqueued("batch")))
    }

    async fn cancel_label(&self, request: &CancelLabelRequest) -> ClientResult<()> {
        self.record(RecordedCall::CancelLabel(request.clone()));
        self.cancel_results.lock().pop_front().unwrap_or(Ok(()))
    }

    async fn list_labels(&self) -> ClientResult<Vec<Label>> {
        self.record(RecordedCall::ListLabels);
        Ok(self.labels.lock().clone())
    }

    async fn list_standalone_labels(&self) -> ClientResult<Vec<Label>> {
        self.record(RecordedCall::ListStandaloneLabels);
        self.standalone_labels
            .lock()
            .clone()
            .ok_or_else(|| ClientError::api_error(403, "Subscription required"))
    }

    async fn print_labels(&self, label_ids: &[LabelId]) -> ClientResult<PrintOutcome> {
        self.record(RecordedCall::PrintLabels(label_ids.to_vec()));
        Ok(PrintOutcome::Download(format!(
            "/downloads/batch-{}.pdf",
            label_ids.len()
        )))
    }
}
