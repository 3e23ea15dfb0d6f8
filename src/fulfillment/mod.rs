//! # Fulfillment
//!
//! The vendor-facing shipping workflow: merging items into shipments, per-shipment forms,
//! rate quotes, label purchases, the batch submit, and the label library.
//!
//! [`FulfillmentSession`] is a pure reducer over [`SessionAction`]s. [`FulfillmentWorkbench`]
//! drives it against a [`ShippingApi`](crate::client::ShippingApi), committing an action only
//! after the remote call it depends on has finished. [`ShipmentLedger`] is the database side
//! used by server-side handlers.

pub mod batch;
pub mod forms;
pub mod ids;
pub mod label_library;
pub mod ledger;
pub mod merge;
pub mod purchase;
pub mod rates;
pub mod session;
pub mod workbench;

pub use batch::{collect_batch_entries, EMPTY_BATCH_MESSAGE};
pub use forms::{ActiveSection, FormState, SectionKind};
pub use ids::{FormKey, GroupId};
pub use label_library::{label_url, LabelLibrary};
pub use ledger::ShipmentLedger;
pub use merge::{validate_merge, MergedShipmentGroup};
pub use purchase::{plan_purchase, AccountCapabilities, CONNECT_BALANCE_PERMISSION};
pub use rates::build_rate_request;
pub use session::{FulfillmentSession, SessionAction};
pub use workbench::FulfillmentWorkbench;

/// Operator answer to a destructive prompt (unmerge, void, cancel)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Declined,
}

impl From<bool> for Confirmation {
    fn from(confirmed: bool) -> Self {
        if confirmed {
            Self::Confirmed
        } else {
            Self::Declined
        }
    }
}
