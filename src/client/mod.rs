//! # Shipping API Client
//!
//! Typed access to the remote rate aggregator and label service.

pub mod errors;
pub mod http;
pub mod traits;
pub mod types;

pub use errors::{ClientError, ClientResult};
pub use http::ShippingApiClient;
pub use traits::ShippingApi;
pub use types::{
    BatchAction, BatchEntry, BatchItemResult, BatchItemStatus, CancelLabelRequest, PaymentSource,
    PrintOutcome, PurchaseLabelRequest, PurchaseReceipt, RateRequest,
};
