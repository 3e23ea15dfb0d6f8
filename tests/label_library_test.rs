mod common;

use common::*;
use fulfillment_core::client::{CancelLabelRequest, ClientError, PrintOutcome};
use fulfillment_core::error::FulfillmentError;
use fulfillment_core::fulfillment::{AccountCapabilities, Confirmation};
use fulfillment_core::models::{LabelKind, LabelRef, OrderTab};
use fulfillment_core::state_machine::{ItemStatus, LabelStatus};

fn library_api() -> MockShippingApi {
    let api = MockShippingApi::with_orders(Vec::new());
    *api.labels.lock() = vec![
        label(LabelKind::Order, 1, 60, LabelStatus::Active),
        label(LabelKind::Order, 2, 5, LabelStatus::Active),
        label(LabelKind::Order, 3, 30, LabelStatus::Voided),
    ];
    *api.standalone_labels.lock() = Some(vec![label(LabelKind::Standalone, 1, 10, LabelStatus::Active)]);
    api
}

#[tokio::test]
async fn test_refresh_merges_both_kinds_newest_first() {
    let (_api, workbench) = loaded_workbench(library_api(), AccountCapabilities::default()).await;
    workbench.refresh_labels().await.unwrap();

    let refs: Vec<LabelRef> = workbench.library().labels().iter().map(|l| l.label_ref()).collect();
    assert_eq!(
        refs,
        vec![
            LabelRef::order(2),
            LabelRef::standalone(1),
            LabelRef::order(3),
            LabelRef::order(1),
        ]
    );
}

#[tokio::test]
async fn test_standalone_failure_yields_order_labels_only() {
    let api = library_api();
    *api.standalone_labels.lock() = None;
    let (_api, workbench) = loaded_workbench(api, AccountCapabilities::default()).await;

    workbench.refresh_labels().await.unwrap();
    let library = workbench.library();
    assert_eq!(library.labels().len(), 3);
    assert!(library.labels().iter().all(|l| l.kind == LabelKind::Order));
}

#[tokio::test]
async fn test_void_flips_label_and_deselects() {
    let (api, workbench) = loaded_workbench(library_api(), AccountCapabilities::default()).await;
    workbench.refresh_labels().await.unwrap();
    workbench.toggle_label_selection(LabelRef::order(2)).unwrap();

    assert!(!workbench
        .void_label(LabelRef::order(2), Confirmation::Declined)
        .await
        .unwrap());
    assert!(workbench
        .void_label(LabelRef::order(2), Confirmation::Confirmed)
        .await
        .unwrap());

    let library = workbench.library();
    assert!(library.find(LabelRef::order(2)).unwrap().is_voided());
    assert!(!library.is_selected(LabelRef::order(2)));
    assert!(api.calls().contains(&RecordedCall::CancelLabel(CancelLabelRequest::for_label(
        "TRK-order-2",
        2
    ))));

    let err = workbench
        .void_label(LabelRef::order(2), Confirmation::Confirmed)
        .await
        .unwrap_err();
    assert!(matches!(err, FulfillmentError::StateTransition(_)));
}

#[tokio::test]
async fn test_standalone_labels_cannot_be_voided_or_selected() {
    let (api, workbench) = loaded_workbench(library_api(), AccountCapabilities::default()).await;
    workbench.refresh_labels().await.unwrap();

    let err = workbench
        .void_label(LabelRef::standalone(1), Confirmation::Confirmed)
        .await
        .unwrap_err();
    assert!(matches!(err, FulfillmentError::StateTransition(_)));
    assert!(workbench.toggle_label_selection(LabelRef::standalone(1)).is_err());
    assert!(!api
        .calls()
        .iter()
        .any(|c| matches!(c, RecordedCall::CancelLabel(_))));
}

#[tokio::test]
async fn test_rejected_void_leaves_label_active() {
    let (api, workbench) = loaded_workbench(library_api(), AccountCapabilities::default()).await;
    workbench.refresh_labels().await.unwrap();
    api.queue_cancel(Err(ClientError::rejected("Label already used")));

    assert!(workbench
        .void_label(LabelRef::order(1), Confirmation::Confirmed)
        .await
        .is_err());
    assert!(!workbench.library().find(LabelRef::order(1)).unwrap().is_voided());
}

#[tokio::test]
async fn test_print_selected() {
    let (api, workbench) = loaded_workbench(library_api(), AccountCapabilities::default()).await;
    workbench.refresh_labels().await.unwrap();

    let err = workbench.print_selected().await.unwrap_err();
    assert!(matches!(err, FulfillmentError::Validation(ref msg) if msg == "Please select labels to print"));

    workbench.select_all_labels();
    assert_eq!(
        workbench.library().selected(),
        vec![LabelRef::order(1), LabelRef::order(2)]
    );

    let outcome = workbench.print_selected().await.unwrap();
    assert_eq!(outcome, PrintOutcome::Download("/downloads/batch-2.pdf".to_string()));
    assert!(api.calls().contains(&RecordedCall::PrintLabels(vec![2, 1])));

    workbench.clear_label_selection();
    assert!(workbench.library().selected().is_empty());
}

#[tokio::test]
async fn test_label_urls() {
    let (_api, workbench) = loaded_workbench(library_api(), AccountCapabilities::default()).await;
    workbench.refresh_labels().await.unwrap();

    let url = workbench.label_url(LabelRef::order(1)).unwrap();
    assert!(url.ends_with("/api/shipping/labels/order-1.pdf"));
    assert_eq!(workbench.label_url(LabelRef::order(3)), None);
    assert_eq!(workbench.label_url(LabelRef::order(42)), None);
}

#[tokio::test]
async fn test_cancel_shipment_returns_item_to_pending() {
    let api = MockShippingApi::with_orders(Vec::new());
    *api.shipped.lock() = vec![order(
        5,
        Some("1 Main"),
        vec![shipped_item(51, 5, None), shipped_item(52, 5, Some("UPS"))],
    )];
    let (api, workbench) = loaded_workbench(api, AccountCapabilities::default()).await;
    workbench.refresh_orders(OrderTab::Shipped).await.unwrap();

    assert!(!workbench
        .cancel_shipment(51, Confirmation::Declined)
        .await
        .unwrap());
    assert!(workbench
        .cancel_shipment(51, Confirmation::Confirmed)
        .await
        .unwrap());
    workbench
        .cancel_shipment(52, Confirmation::Confirmed)
        .await
        .unwrap();

    let cancels: Vec<CancelLabelRequest> = api
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            RecordedCall::CancelLabel(request) => Some(request),
            _ => None,
        })
        .collect();
    assert_eq!(
        cancels,
        vec![
            CancelLabelRequest::for_shipment("1Z51", "FedEx"),
            CancelLabelRequest::for_shipment("1Z52", "UPS"),
        ]
    );

    let session = workbench.session();
    let item = session.item(51).unwrap();
    assert_eq!(item.item_status, ItemStatus::Pending);
    assert_eq!(item.tracking_number, None);
}

#[tokio::test]
async fn test_cancel_requires_shipped_item() {
    let (_api, workbench) =
        loaded_workbench(MockShippingApi::with_orders(unshipped_orders()), AccountCapabilities::default()).await;

    let err = workbench
        .cancel_shipment(11, Confirmation::Confirmed)
        .await
        .unwrap_err();
    assert!(matches!(err, FulfillmentError::StateTransition(_)));
}
