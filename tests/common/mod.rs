#![allow(dead_code)]

pub mod builders;
pub mod mock_api;
pub mod strategies;

pub use builders::*;
pub use mock_api::*;

use std::sync::Arc;

use fulfillment_core::config::ShippingApiConfig;
use fulfillment_core::events::EventPublisher;
use fulfillment_core::fulfillment::{AccountCapabilities, FulfillmentWorkbench};
use fulfillment_core::models::OrderTab;

pub fn connect_account() -> AccountCapabilities {
    AccountCapabilities::from_permissions(&["shipping", "stripe_connect"], true)
}

/// Workbench over `api` with the unshipped list already loaded
pub async fn loaded_workbench(
    api: MockShippingApi,
    account: AccountCapabilities,
) -> (Arc<MockShippingApi>, FulfillmentWorkbench<MockShippingApi>) {
    let api = Arc::new(api);
    let workbench = FulfillmentWorkbench::new(
        Arc::clone(&api),
        ShippingApiConfig::default(),
        account,
        EventPublisher::new(64),
    );
    workbench
        .refresh_orders(OrderTab::Unshipped)
        .await
        .expect("initial order load");
    (api, workbench)
}
