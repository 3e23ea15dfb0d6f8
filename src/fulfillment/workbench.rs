//! # Fulfillment Workbench
//!
//! Async driver for a vendor's fulfillment session. The session and label library live
//! behind `parking_lot` locks that are never held across an `.await`: each remote call reads
//! a snapshot, awaits the API, then commits a [`SessionAction`] that is validated again
//! against whatever the state is by then.

use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::json;
use tracing::{debug, info, warn};

use super::batch::collect_batch_entries;
use super::ids::{FormKey, GroupId};
use super::label_library::{label_url, LabelLibrary};
use super::purchase::{plan_purchase, AccountCapabilities};
use super::rates::build_rate_request;
use super::session::{FulfillmentSession, SessionAction};
use super::Confirmation;
use crate::client::{
    BatchItemResult, CancelLabelRequest, PrintOutcome, PurchaseReceipt, ShippingApi,
};
use crate::config::ShippingApiConfig;
use crate::constants::{events, DEFAULT_CANCEL_CARRIER};
use crate::error::{FulfillmentError, Result};
use crate::events::EventPublisher;
use crate::logging::{log_error, log_label_operation, log_shipment_operation};
use crate::models::{ItemId, LabelRef, OrderTab, Rate};
use crate::state_machine::{ItemEvent, ItemStateMachine};

pub struct FulfillmentWorkbench<A: ShippingApi> {
    api: Arc<A>,
    api_config: ShippingApiConfig,
    session: RwLock<FulfillmentSession>,
    library: RwLock<LabelLibrary>,
    events: EventPublisher,
}

impl<A: ShippingApi> FulfillmentWorkbench<A> {
    pub fn new(
        api: Arc<A>,
        api_config: ShippingApiConfig,
        account: AccountCapabilities,
        events: EventPublisher,
    ) -> Self {
        Self {
            api,
            api_config,
            session: RwLock::new(FulfillmentSession::new(account)),
            library: RwLock::new(LabelLibrary::new()),
            events,
        }
    }

    /// Snapshot of the current session
    pub fn session(&self) -> FulfillmentSession {
        self.session.read().clone()
    }

    /// Snapshot of the label library
    pub fn library(&self) -> LabelLibrary {
        self.library.read().clone()
    }

    pub fn events(&self) -> &EventPublisher {
        &self.events
    }

    /// Apply an operator action to the session. A rejected action leaves the session as it was.
    pub fn dispatch(&self, action: SessionAction) -> Result<()> {
        let mut session = self.session.write();
        let next = session.apply(action)?;
        *session = next;
        Ok(())
    }

    fn publish(&self, event_name: &str, context: serde_json::Value) {
        if let Err(e) = self.events.publish(event_name, context) {
            log_error("workbench", event_name, &e.to_string(), None);
        }
    }

    pub async fn refresh_orders(&self, tab: OrderTab) -> Result<()> {
        let orders = self.api.list_orders(tab).await?;
        debug!(tab = %tab, count = orders.len(), "Fetched orders");
        self.dispatch(SessionAction::OrdersLoaded { tab, orders })
    }

    pub fn set_account(&self, account: AccountCapabilities) -> Result<()> {
        self.dispatch(SessionAction::AccountChanged(account))
    }

    pub fn toggle_merge_selection(&self, item_id: ItemId) -> Result<()> {
        self.dispatch(SessionAction::ToggleMergeSelection(item_id))
    }

    /// Merge the selected items into a new shipment
    pub fn merge_selected(&self) -> Result<GroupId> {
        let group_id = GroupId::new();
        self.dispatch(SessionAction::MergeSelected { group_id })?;

        let item_ids = self
            .session
            .read()
            .group(group_id)
            .map(|g| g.item_ids.clone())
            .unwrap_or_default();
        log_shipment_operation("merge", &group_id.to_string(), &item_ids, "merged", None);
        self.publish(
            events::SHIPMENT_MERGED,
            json!({ "group_id": group_id, "item_ids": item_ids }),
        );
        Ok(group_id)
    }

    /// Dissolve a merged shipment. Returns false when the operator declined.
    pub fn unmerge(&self, group_id: GroupId, confirmation: Confirmation) -> Result<bool> {
        self.dispatch(SessionAction::Unmerge {
            group_id,
            confirmation,
        })?;
        if confirmation == Confirmation::Declined {
            return Ok(false);
        }

        log_shipment_operation("unmerge", &group_id.to_string(), &[], "unmerged", None);
        self.publish(events::SHIPMENT_UNMERGED, json!({ "group_id": group_id }));
        Ok(true)
    }

    /// Quote rates for a form. Failures and empty quotes are also recorded on the form.
    pub async fn fetch_rates(&self, key: FormKey) -> Result<Vec<Rate>> {
        let request = build_rate_request(&self.session(), key)?;

        let rates = match self.api.fetch_rates(&request).await {
            Ok(rates) => rates,
            Err(e) => {
                self.record_rate_failure(key, format!("Failed to fetch shipping rates: {e}"));
                return Err(e.into());
            }
        };

        if rates.is_empty() {
            self.record_rate_failure(key, "No shipping rates available for these packages".to_string());
            return Err(FulfillmentError::NoRatesAvailable(key.to_string()));
        }

        self.dispatch(SessionAction::RatesLoaded {
            key,
            rates: rates.clone(),
        })?;
        log_shipment_operation(
            "fetch_rates",
            &key.to_string(),
            &[request.item_id],
            "quoted",
            Some(&format!("{} rates", rates.len())),
        );
        self.publish(
            events::SHIPMENT_RATES_FETCHED,
            json!({ "form": key, "count": rates.len() }),
        );
        Ok(rates)
    }

    fn record_rate_failure(&self, key: FormKey, message: String) {
        if let Err(e) = self.dispatch(SessionAction::RateFetchFailed { key, message }) {
            warn!(form = %key, error = %e, "Could not record rate failure on form");
        }
    }

    /// Buy a label for one form. Nothing local changes unless the purchase succeeds, and a
    /// successful purchase always returns its receipt.
    pub async fn purchase_label(&self, key: FormKey) -> Result<PurchaseReceipt> {
        let request = plan_purchase(&self.session(), key)?;

        let purchased = self
            .api
            .purchase_label(&request)
            .await
            .and_then(|receipt| receipt.ensure_tracking().map(|()| receipt));
        let receipt = match purchased {
            Ok(receipt) => receipt,
            Err(e) => {
                log_shipment_operation(
                    "purchase_label",
                    &key.to_string(),
                    &request.item_ids,
                    "failed",
                    Some(&e.to_string()),
                );
                return Err(e.into());
            }
        };

        let carrier = receipt
            .carrier
            .clone()
            .unwrap_or_else(|| request.selected_rate.carrier.clone());
        let committed = self.dispatch(SessionAction::LabelPurchased {
            key,
            item_ids: request.item_ids.clone(),
            tracking_number: receipt.tracking_number.clone(),
            carrier: carrier.clone(),
        });
        if let Err(e) = committed {
            log_error(
                "workbench",
                "purchase_label",
                &e.to_string(),
                Some("label bought; reloading orders"),
            );
            let tab = self.session.read().tab();
            if let Err(e) = self.refresh_orders(tab).await {
                log_error("workbench", "purchase_label", &e.to_string(), Some("order refresh"));
            }
        }

        log_shipment_operation(
            "purchase_label",
            &key.to_string(),
            &request.item_ids,
            "purchased",
            Some(&format!("tracking {}", receipt.tracking_number)),
        );
        self.publish(
            events::LABEL_PURCHASED,
            json!({
                "form": key,
                "item_ids": request.item_ids,
                "tracking_number": receipt.tracking_number,
                "carrier": carrier,
                "payment_source": receipt.payment_method.unwrap_or(request.payment_source),
            }),
        );
        Ok(receipt)
    }

    /// Submit every completed form in one request, then reload the order list
    pub async fn submit_batch(&self) -> Result<Vec<BatchItemResult>> {
        let entries = collect_batch_entries(&self.session())?;
        let results = self.api.process_batch(&entries).await?;

        self.dispatch(SessionAction::BatchCompleted {
            results: results.clone(),
        })?;

        let succeeded = results.iter().filter(|r| r.is_success()).count();
        info!(
            submitted = entries.len(),
            succeeded,
            failed = results.len() - succeeded,
            "Batch processed"
        );
        self.publish(
            events::BATCH_PROCESSED,
            json!({
                "submitted": entries.len(),
                "succeeded": succeeded,
                "failed": results.len() - succeeded,
            }),
        );

        let tab = self.session.read().tab();
        if let Err(e) = self.refresh_orders(tab).await {
            log_error("workbench", "submit_batch", &e.to_string(), Some("order refresh"));
        }
        Ok(results)
    }

    /// Cancel a shipped item's shipment from the shipped view. Returns false when declined.
    pub async fn cancel_shipment(&self, item_id: ItemId, confirmation: Confirmation) -> Result<bool> {
        if confirmation == Confirmation::Declined {
            return Ok(false);
        }

        let request = {
            let session = self.session.read();
            let item = session
                .item(item_id)
                .ok_or_else(|| FulfillmentError::not_found(format!("item {item_id}")))?;
            ItemStateMachine::new().validate(item, &ItemEvent::Cancel)?;

            let carrier = item
                .carrier
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| DEFAULT_CANCEL_CARRIER.to_string());
            CancelLabelRequest::for_shipment(
                item.tracking_number.clone().unwrap_or_default(),
                carrier,
            )
        };

        self.api.cancel_label(&request).await?;
        self.dispatch(SessionAction::ItemCancelled { item_id })?;

        log_label_operation(
            "cancel_shipment",
            None,
            Some(&request.tracking_number),
            "cancelled",
            None,
        );
        self.publish(
            events::SHIPMENT_CANCELLED,
            json!({ "item_id": item_id, "tracking_number": request.tracking_number }),
        );
        Ok(true)
    }

    /// Reload the label library. Standalone labels are optional: a failure there yields an
    /// empty list.
    pub async fn refresh_labels(&self) -> Result<()> {
        let (order_labels, standalone_labels) = futures::join!(
            self.api.list_labels(),
            self.api.list_standalone_labels()
        );

        let order_labels = order_labels?;
        let standalone_labels = standalone_labels.unwrap_or_else(|e| {
            warn!(error = %e, "Standalone labels unavailable");
            Vec::new()
        });

        self.library.write().replace(order_labels, standalone_labels);
        Ok(())
    }

    pub fn toggle_label_selection(&self, label: LabelRef) -> Result<()> {
        self.library.write().toggle_selection(label)
    }

    pub fn select_all_labels(&self) {
        self.library.write().select_all();
    }

    pub fn clear_label_selection(&self) {
        self.library.write().clear_selection();
    }

    /// Void an order label. Returns false when the operator declined.
    pub async fn void_label(&self, label: LabelRef, confirmation: Confirmation) -> Result<bool> {
        let Some(request) = self.library.read().prepare_void(label, confirmation)? else {
            return Ok(false);
        };

        if let Err(e) = self.api.cancel_label(&request).await {
            log_label_operation(
                "void_label",
                Some(label),
                Some(&request.tracking_number),
                "failed",
                Some(&e.to_string()),
            );
            return Err(e.into());
        }
        self.library.write().mark_voided(label)?;

        log_label_operation(
            "void_label",
            Some(label),
            Some(&request.tracking_number),
            "voided",
            None,
        );
        self.publish(
            events::LABEL_VOIDED,
            json!({ "label": label.to_string(), "tracking_number": request.tracking_number }),
        );
        Ok(true)
    }

    /// Combine the selected labels into one printable document
    pub async fn print_selected(&self) -> Result<PrintOutcome> {
        let label_ids = self.library.read().selected_ids();
        if label_ids.is_empty() {
            return Err(FulfillmentError::validation("Please select labels to print"));
        }

        let outcome = self.api.print_labels(&label_ids).await?;
        log_label_operation(
            "print_labels",
            None,
            None,
            "printed",
            Some(&format!("{} labels", label_ids.len())),
        );
        self.publish(events::LABELS_PRINTED, json!({ "label_ids": label_ids }));
        Ok(outcome)
    }

    /// Download URL for a label in the library
    pub fn label_url(&self, label: LabelRef) -> Option<String> {
        self.library
            .read()
            .find(label)
            .and_then(|l| label_url(l, &self.api_config))
    }
}
