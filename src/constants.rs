//! # System Constants
//!
//! Event names, carriers and other fixed values shared across the fulfillment core.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle events broadcast by the workbench
pub mod events {
    // Shipment grouping and quoting
    pub const SHIPMENT_MERGED: &str = "shipment.merged";
    pub const SHIPMENT_UNMERGED: &str = "shipment.unmerged";
    pub const SHIPMENT_RATES_FETCHED: &str = "shipment.rates_fetched";
    pub const SHIPMENT_CANCELLED: &str = "shipment.cancelled";

    // Labels
    pub const LABEL_PURCHASED: &str = "label.purchased";
    pub const LABEL_VOIDED: &str = "label.voided";
    pub const LABELS_PRINTED: &str = "label.batch_printed";

    // Batch submission
    pub const BATCH_PROCESSED: &str = "batch.processed";
}

/// Minimum number of items in a merged shipment
pub const MIN_MERGE_ITEMS: usize = 2;

/// Maximum orders returned by one ledger listing
pub const ORDER_LIST_LIMIT: i64 = 200;

/// Substring marking a label file stored under a user-scoped directory
pub const USER_SCOPED_LABEL_MARKER: &str = "/user_";

/// Carriers an operator can pick when entering a tracking number by hand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Carrier {
    #[serde(rename = "UPS")]
    Ups,
    #[serde(rename = "FedEx")]
    FedEx,
    #[serde(rename = "USPS")]
    Usps,
}

impl Carrier {
    pub const ALL: [Carrier; 3] = [Carrier::Ups, Carrier::FedEx, Carrier::Usps];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ups => "UPS",
            Self::FedEx => "FedEx",
            Self::Usps => "USPS",
        }
    }
}

impl fmt::Display for Carrier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Carrier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "UPS" => Ok(Self::Ups),
            "FEDEX" => Ok(Self::FedEx),
            "USPS" => Ok(Self::Usps),
            _ => Err(format!("Unknown carrier: {s}")),
        }
    }
}

/// Carrier assumed when cancelling a shipment that never recorded one
pub const DEFAULT_CANCEL_CARRIER: Carrier = Carrier::FedEx;
