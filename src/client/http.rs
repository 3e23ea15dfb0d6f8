//! # Shipping API HTTP Client
//!
//! `reqwest` implementation of [`ShippingApi`]. Every request carries the bearer token;
//! POST requests also carry the CSRF token as a header and as a cookie. Requests are never
//! retried here: failures go back to the operator, who decides whether to try again.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, COOKIE};
use reqwest::{Client, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error, info};

use super::errors::{ClientError, ClientResult};
use super::traits::ShippingApi;
use super::types::{
    AckResponse, BatchEntry, BatchItemResult, BatchRequest, BatchResponse, CancelLabelRequest,
    LabelsResponse, OrdersResponse, PrintLabelsRequest, PrintLabelsResponse, PrintOutcome,
    PurchaseLabelRequest, PurchaseReceipt, RateRequest, RatesResponse,
};
use crate::config::{ShippingApiConfig, ShippingEndpoints};
use crate::models::{Label, LabelId, Order, OrderTab, Rate};

#[derive(Clone)]
pub struct ShippingApiClient {
    client: Client,
    base_url: Url,
    endpoints: ShippingEndpoints,
    csrf_headers: HeaderMap,
}

impl std::fmt::Debug for ShippingApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShippingApiClient")
            .field("base_url", &self.base_url.as_str())
            .field("csrf_enabled", &!self.csrf_headers.is_empty())
            .finish()
    }
}

impl ShippingApiClient {
    /// Build a client from configuration. Fails on a malformed base URL or credentials that
    /// cannot be sent as header values.
    pub fn new(config: &ShippingApiConfig) -> ClientResult<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| ClientError::config_error(format!("Invalid base URL: {e}")))?;

        let mut default_headers = HeaderMap::new();
        if !config.auth.bearer_token.is_empty() {
            default_headers.insert(
                AUTHORIZATION,
                header_value(&format!("Bearer {}", config.auth.bearer_token), "bearer token")?,
            );
            debug!("Configured Bearer token authentication");
        }

        let mut csrf_headers = HeaderMap::new();
        if let Some(token) = config.auth.csrf_token.as_deref().filter(|t| !t.is_empty()) {
            let name = HeaderName::from_bytes(config.auth.csrf_header.as_bytes()).map_err(|e| {
                ClientError::config_error(format!("Invalid CSRF header name: {e}"))
            })?;
            csrf_headers.insert(name, header_value(token, "CSRF token")?);
            csrf_headers.insert(
                COOKIE,
                header_value(&format!("{}={token}", config.auth.csrf_cookie), "CSRF cookie")?,
            );
        }

        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(format!("fulfillment-core/{}", env!("CARGO_PKG_VERSION")))
            .default_headers(default_headers)
            .build()
            .map_err(|e| ClientError::config_error(format!("Failed to create HTTP client: {e}")))?;

        info!(
            base_url = %config.base_url,
            timeout_ms = config.timeout_ms,
            auth_enabled = !config.auth.bearer_token.is_empty(),
            csrf_enabled = !csrf_headers.is_empty(),
            "Created shipping API client"
        );

        Ok(Self {
            client,
            base_url,
            endpoints: config.endpoints.clone(),
            csrf_headers,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, path: &str) -> ClientResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| ClientError::config_error(format!("Failed to construct URL: {e}")))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> ClientResult<T> {
        let url = self.url(path)?;
        debug!(url = %url, "GET shipping API");
        let response = self.client.get(url).query(query).send().await?;
        Self::handle_response(response, path).await
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let url = self.url(path)?;
        debug!(url = %url, "POST shipping API");
        let response = self
            .client
            .post(url)
            .headers(self.csrf_headers.clone())
            .json(body)
            .send()
            .await?;
        Self::handle_response(response, path).await
    }

    async fn handle_response<T: DeserializeOwned>(response: Response, path: &str) -> ClientResult<T> {
        let status = response.status();
        if status.is_success() {
            let body = response.bytes().await?;
            return serde_json::from_slice(&body).map_err(|e| {
                error!(path = %path, error = %e, "Failed to parse shipping API response");
                ClientError::from(e)
            });
        }

        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        let message = extract_error_message(&error_text);
        error!(path = %path, status = %status, error = %message, "Shipping API request failed");

        if status == StatusCode::UNAUTHORIZED {
            return Err(ClientError::AuthError(message));
        }
        Err(ClientError::api_error(status.as_u16(), message))
    }
}

fn header_value(value: &str, what: &str) -> ClientResult<HeaderValue> {
    value
        .parse()
        .map_err(|e| ClientError::config_error(format!("Invalid {what}: {e}")))
}

/// Pull `error` or `message` out of a JSON error body, falling back to the raw text
fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .or_else(|| v.get("message"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.to_string())
}

fn rejection(error: Option<String>, message: Option<String>, fallback: &str) -> ClientError {
    ClientError::rejected(error.or(message).unwrap_or_else(|| fallback.to_string()))
}

#[async_trait]
impl ShippingApi for ShippingApiClient {
    async fn list_orders(&self, tab: OrderTab) -> ClientResult<Vec<Order>> {
        let status = tab.to_string();
        let response: OrdersResponse = self
            .get_json(&self.endpoints.orders, &[("status", status.as_str())])
            .await?;
        debug!(tab = %tab, count = response.orders.len(), "Fetched vendor orders");
        Ok(response.orders)
    }

    async fn fetch_rates(&self, request: &RateRequest) -> ClientResult<Vec<Rate>> {
        let response: RatesResponse = self.post_json(&self.endpoints.label_rates, request).await?;
        debug!(item_id = request.item_id, count = response.rates.len(), "Fetched label rates");
        Ok(response.rates)
    }

    async fn purchase_label(&self, request: &PurchaseLabelRequest) -> ClientResult<PurchaseReceipt> {
        let receipt: PurchaseReceipt = self
            .post_json(&self.endpoints.purchase_label, request)
            .await?;
        if !receipt.success {
            return Err(rejection(receipt.error, None, "Label purchase failed"));
        }
        receipt.ensure_tracking()?;
        info!(
            item_ids = ?request.item_ids,
            tracking_number = %receipt.tracking_number,
            payment_method = ?receipt.payment_method,
            "Purchased shipping label"
        );
        Ok(receipt)
    }

    async fn process_batch(&self, entries: &[BatchEntry]) -> ClientResult<Vec<BatchItemResult>> {
        let response: BatchResponse = self
            .post_json(&self.endpoints.process_batch, &BatchRequest { batch: entries })
            .await?;
        info!(
            submitted = entries.len(),
            succeeded = response.results.iter().filter(|r| r.is_success()).count(),
            "Processed shipping batch"
        );
        Ok(response.results)
    }

    async fn cancel_label(&self, request: &CancelLabelRequest) -> ClientResult<()> {
        let ack: AckResponse = self.post_json(&self.endpoints.cancel_label, request).await?;
        if !ack.success {
            return Err(rejection(ack.error, ack.message, "Failed to void label"));
        }
        Ok(())
    }

    async fn list_labels(&self) -> ClientResult<Vec<Label>> {
        let response: LabelsResponse = self.get_json(&self.endpoints.my_labels, &[]).await?;
        if !response.success {
            return Err(rejection(response.error, None, "Failed to fetch labels"));
        }
        Ok(response.labels)
    }

    async fn list_standalone_labels(&self) -> ClientResult<Vec<Label>> {
        let response: LabelsResponse = self
            .get_json(&self.endpoints.standalone_labels, &[])
            .await?;
        if !response.success {
            return Err(rejection(response.error, None, "Failed to fetch standalone labels"));
        }
        Ok(response.labels)
    }

    async fn print_labels(&self, label_ids: &[LabelId]) -> ClientResult<PrintOutcome> {
        let response: PrintLabelsResponse = self
            .post_json(&self.endpoints.batch_labels, &PrintLabelsRequest { label_ids })
            .await?;
        Ok(response.into())
    }
}
