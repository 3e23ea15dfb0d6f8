//! HTTP client behaviour against a local stub of the shipping API.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use fulfillment_core::client::{
    CancelLabelRequest, ClientError, PaymentSource, PrintOutcome, PurchaseLabelRequest,
    RateRequest, ShippingApi, ShippingApiClient,
};
use fulfillment_core::config::{ShippingApiAuth, ShippingApiConfig};
use fulfillment_core::models::{OrderTab, PackageSpec};
use parking_lot::Mutex;
use serde_json::{json, Value};

#[derive(Default)]
struct Seen {
    headers: Mutex<Vec<(String, HeaderMap)>>,
    bodies: Mutex<Vec<Value>>,
}

type Shared = Arc<Seen>;

async fn orders(
    State(seen): State<Shared>,
    headers: HeaderMap,
    Query(params): Query<std::collections::HashMap<String, String>>,
) -> Json<Value> {
    seen.headers.lock().push(("orders".to_string(), headers));
    let status = params.get("status").cloned().unwrap_or_default();
    Json(json!({
        "orders": [{
            "order_id": 7,
            "customer_name": "Ray",
            "order_status": status,
            "created_at": "2026-05-01T10:00:00Z",
            "shipping_address": {
                "street": "4 Birch Ln", "address_line_2": "Apt 2", "city": "Reno",
                "state": "NV", "zip": "89501", "country": "US"
            },
            "items": [{"item_id": 70, "order_id": 7, "product_name": "Vase", "item_status": "pending"}]
        }]
    }))
}

async fn rates(State(seen): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Json<Value> {
    seen.headers.lock().push(("rates".to_string(), headers));
    seen.bodies.lock().push(body);
    Json(json!({
        "rates": [
            {"carrier": "USPS", "service": "Priority", "cost": 8.1},
            {"carrier": "UPS", "service": "Ground", "cost": 9.4, "serviceCode": "03"}
        ]
    }))
}

async fn purchase(Json(body): Json<Value>) -> Json<Value> {
    if body["selected_rate"]["service"] == "Broken" {
        return Json(json!({"success": false, "error": "Card declined"}));
    }
    Json(json!({
        "success": true,
        "tracking_number": "1ZSTUB",
        "payment_method": "card",
        "label_url": "/labels/user_1/stub.pdf"
    }))
}

async fn cancel(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if body["trackingNumber"] == "GONE" {
        return (StatusCode::NOT_FOUND, Json(json!({"error": "Label not found"})));
    }
    (StatusCode::OK, Json(json!({"success": true})))
}

async fn my_labels() -> Json<Value> {
    Json(json!({
        "success": true,
        "labels": [{
            "db_id": 3, "type": "order", "tracking_number": "1Z3", "service_name": "Ground",
            "cost": "7.25", "status": "active", "created_at": "2026-05-02T08:00:00Z"
        }]
    }))
}

async fn standalone_labels() -> (StatusCode, Json<Value>) {
    (StatusCode::UNAUTHORIZED, Json(json!({"error": "Session expired"})))
}

async fn batch_labels(Json(body): Json<Value>) -> Json<Value> {
    if body["labelIds"].as_array().map_or(0, Vec::len) > 1 {
        Json(json!({"downloadUrl": "/downloads/combined.pdf"}))
    } else {
        Json(json!({}))
    }
}

async fn spawn_stub() -> (String, Shared) {
    let seen: Shared = Arc::default();
    let app = Router::new()
        .route("/vendor/orders/my", get(orders))
        .route("/api/shipping/get-label-rates", post(rates))
        .route("/api/shipping/purchase-label", post(purchase))
        .route("/api/shipping/cancel-label", post(cancel))
        .route("/api/shipping/my-labels", get(my_labels))
        .route("/api/subscriptions/shipping/standalone-labels", get(standalone_labels))
        .route("/api/shipping/batch-labels", post(batch_labels))
        .with_state(Arc::clone(&seen));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), seen)
}

fn client_for(base_url: &str) -> ShippingApiClient {
    ShippingApiClient::new(&ShippingApiConfig {
        base_url: base_url.to_string(),
        auth: ShippingApiAuth {
            bearer_token: "jwt-abc".to_string(),
            csrf_token: Some("csrf-xyz".to_string()),
            ..Default::default()
        },
        ..Default::default()
    })
    .unwrap()
}

fn complete_package() -> PackageSpec {
    PackageSpec {
        length: 10.0,
        width: 6.0,
        height: 4.0,
        weight: 1.5,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_list_orders_sends_status_and_bearer() {
    let (base_url, seen) = spawn_stub().await;
    let client = client_for(&base_url);

    let orders = client.list_orders(OrderTab::Shipped).await.unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].order_status, "shipped");
    assert_eq!(
        orders[0].shipping_address.as_ref().unwrap().line2.as_deref(),
        Some("Apt 2")
    );

    let headers = seen.headers.lock();
    let (_, orders_headers) = &headers[0];
    assert_eq!(orders_headers["authorization"], "Bearer jwt-abc");
    assert!(orders_headers.get("x-csrf-token").is_none());
}

#[tokio::test]
async fn test_rates_post_carries_csrf_and_body() {
    let (base_url, seen) = spawn_stub().await;
    let client = client_for(&base_url);

    let rates = client
        .fetch_rates(&RateRequest {
            item_id: 70,
            packages: vec![complete_package()],
        })
        .await
        .unwrap();
    assert_eq!(rates[0].service, "Priority");
    assert_eq!(rates[1].service_code.as_deref(), Some("03"));

    let (_, headers) = seen.headers.lock()[0].clone();
    assert_eq!(headers["x-csrf-token"], "csrf-xyz");
    assert_eq!(headers["cookie"], "csrf-token=csrf-xyz");

    let body = seen.bodies.lock()[0].clone();
    assert_eq!(body["item_id"], 70);
    assert_eq!(body["packages"][0]["dimUnit"], "in");
    assert_eq!(body["packages"][0]["weightUnit"], "lb");
}

#[tokio::test]
async fn test_purchase_success_and_rejection() {
    let (base_url, _seen) = spawn_stub().await;
    let client = client_for(&base_url);

    let mut request = PurchaseLabelRequest {
        item_ids: vec![70],
        group_id: None,
        selected_rate: serde_json::from_value(json!({"carrier": "UPS", "service": "Ground", "cost": 9.4}))
            .unwrap(),
        packages: vec![complete_package()],
        payment_source: PaymentSource::ConnectBalance,
        force_card_payment: false,
    };
    let receipt = client.purchase_label(&request).await.unwrap();
    assert_eq!(receipt.tracking_number, "1ZSTUB");
    assert_eq!(receipt.payment_method, Some(PaymentSource::Card));

    request.selected_rate.service = "Broken".to_string();
    let err = client.purchase_label(&request).await.unwrap_err();
    assert!(matches!(err, ClientError::Rejected(ref msg) if msg == "Card declined"));
}

#[tokio::test]
async fn test_cancel_errors_surface_server_message() {
    let (base_url, _seen) = spawn_stub().await;
    let client = client_for(&base_url);

    client
        .cancel_label(&CancelLabelRequest::for_label("1Z3", 3))
        .await
        .unwrap();

    let err = client
        .cancel_label(&CancelLabelRequest::for_shipment("GONE", "UPS"))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert_eq!(err.to_string(), "API error: 404 - Label not found");
}

#[tokio::test]
async fn test_label_listings_and_auth_failure() {
    let (base_url, _seen) = spawn_stub().await;
    let client = client_for(&base_url);

    let labels = client.list_labels().await.unwrap();
    assert_eq!(labels[0].cost, 7.25);

    let err = client.list_standalone_labels().await.unwrap_err();
    assert!(matches!(err, ClientError::AuthError(ref msg) if msg == "Session expired"));
}

#[tokio::test]
async fn test_print_labels_outcomes() {
    let (base_url, _seen) = spawn_stub().await;
    let client = client_for(&base_url);

    assert_eq!(
        client.print_labels(&[1, 2]).await.unwrap(),
        PrintOutcome::Download("/downloads/combined.pdf".to_string())
    );
    assert_eq!(
        client.print_labels(&[1]).await.unwrap(),
        PrintOutcome::Message("Batch processing completed".to_string())
    );
}
