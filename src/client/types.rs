//! Request and response bodies of the shipping API.

use serde::{Deserialize, Serialize};

use super::errors::{ClientError, ClientResult};
use crate::fulfillment::ids::{FormKey, GroupId};
use crate::models::{ItemId, Label, LabelId, Order, PackageSpec, Rate};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrdersResponse {
    #[serde(default)]
    pub orders: Vec<Order>,
}

/// Body of `get-label-rates`. Groups quote against their first member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateRequest {
    pub item_id: ItemId,
    pub packages: Vec<PackageSpec>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RatesResponse {
    #[serde(default)]
    pub rates: Vec<Rate>,
}

/// Account a label purchase is charged to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentSource {
    /// Vendor's marketplace-connect balance
    ConnectBalance,
    /// Stored card on the shipping subscription
    Card,
}

impl std::fmt::Display for PaymentSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ConnectBalance => write!(f, "connect_balance"),
            Self::Card => write!(f, "card"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseLabelRequest {
    pub item_ids: Vec<ItemId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<GroupId>,
    pub selected_rate: Rate,
    pub packages: Vec<PackageSpec>,
    pub payment_source: PaymentSource,
    pub force_card_payment: bool,
}

/// Result of a label purchase. `payment_method` reports the source actually charged,
/// which is the card when a connect-balance charge fell back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseReceipt {
    #[serde(default = "default_true")]
    pub success: bool,
    #[serde(default)]
    pub tracking_number: String,
    #[serde(default)]
    pub carrier: Option<String>,
    #[serde(default)]
    pub label_id: Option<LabelId>,
    #[serde(default)]
    pub label_url: Option<String>,
    #[serde(default)]
    pub payment_method: Option<PaymentSource>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub error: Option<String>,
}

impl PurchaseReceipt {
    /// A bought label is only usable with a tracking number
    pub fn ensure_tracking(&self) -> ClientResult<()> {
        if self.tracking_number.trim().is_empty() {
            return Err(ClientError::invalid_response(
                "tracking_number",
                "purchase succeeded without a tracking number",
            ));
        }
        Ok(())
    }
}

/// What a batch entry asks the server to do
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum BatchAction {
    /// Record a tracking number the vendor already has
    Tracking {
        carrier: String,
        #[serde(rename = "trackingNumber")]
        tracking_number: String,
    },
    /// Buy a label with the selected rate
    Label {
        selected_rate: Rate,
        packages: Vec<PackageSpec>,
        force_card_payment: bool,
    },
}

impl BatchAction {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Tracking { .. } => "tracking",
            Self::Label { .. } => "label",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchEntry {
    pub id: FormKey,
    pub is_group: bool,
    #[serde(flatten)]
    pub action: BatchAction,
    pub item_ids: Vec<ItemId>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchRequest<'a> {
    pub batch: &'a [BatchEntry],
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BatchResponse {
    #[serde(default)]
    pub results: Vec<BatchItemResult>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchItemStatus {
    Success,
    Error,
    #[serde(other)]
    Unknown,
}

/// Per-entry outcome of a batch submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchItemResult {
    pub id: FormKey,
    pub status: BatchItemStatus,
    #[serde(default)]
    pub tracking: Option<String>,
    #[serde(default)]
    pub label_url: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl BatchItemResult {
    pub fn is_success(&self) -> bool {
        self.status == BatchItemStatus::Success
    }
}

/// Body of `cancel-label`. The label library sends the label id; the shipped-orders view
/// sends the carrier instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelLabelRequest {
    pub tracking_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_id: Option<LabelId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carrier: Option<String>,
}

impl CancelLabelRequest {
    pub fn for_label(tracking_number: impl Into<String>, label_id: LabelId) -> Self {
        Self {
            tracking_number: tracking_number.into(),
            label_id: Some(label_id),
            carrier: None,
        }
    }

    pub fn for_shipment(tracking_number: impl Into<String>, carrier: impl Into<String>) -> Self {
        Self {
            tracking_number: tracking_number.into(),
            label_id: None,
            carrier: Some(carrier.into()),
        }
    }
}

/// Generic `{success, error}` acknowledgement
#[derive(Debug, Clone, Deserialize)]
pub struct AckResponse {
    #[serde(default = "default_true")]
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LabelsResponse {
    #[serde(default = "default_true")]
    pub success: bool,
    #[serde(default)]
    pub labels: Vec<Label>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintLabelsRequest<'a> {
    pub label_ids: &'a [LabelId],
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintLabelsResponse {
    #[serde(default)]
    pub download_url: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Outcome of a batch print request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrintOutcome {
    /// Path or URL of the combined label PDF
    Download(String),
    /// Informational message when no single file was produced
    Message(String),
}

impl From<PrintLabelsResponse> for PrintOutcome {
    fn from(response: PrintLabelsResponse) -> Self {
        match response.download_url {
            Some(url) => Self::Download(url),
            None => Self::Message(
                response
                    .message
                    .unwrap_or_else(|| "Batch processing completed".to_string()),
            ),
        }
    }
}

fn default_true() -> bool {
    true
}
