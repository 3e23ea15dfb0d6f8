//! # Error Types
//!
//! Top-level error taxonomy for the fulfillment core.
//!
//! Errors fall into three families:
//! - operator mistakes (validation, merge rejection, empty rate lists) that are surfaced
//!   inline and fixed by the operator,
//! - remote or storage failures (`Remote`, `Database`) that are reported and re-attempted by
//!   the operator, never retried automatically,
//! - invariant violations caught by the state machines.
//!
//! Partial batch failures are not errors: they come back as per-entry results.

use crate::client::ClientError;
use crate::config::ConfigurationError;
use crate::models::ItemId;
use crate::state_machine::StateMachineError;
use thiserror::Error;

/// Reasons a merge request is rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MergeError {
    #[error("Select at least 2 items to merge ({selected} selected)")]
    TooFewItems { selected: usize },

    #[error("Item {0} is not in the unshipped order list")]
    UnknownItem(ItemId),

    #[error("Item {0} is already part of a merged shipment")]
    AlreadyMerged(ItemId),

    #[error("Item {0} is not pending and cannot be merged")]
    NotPending(ItemId),

    #[error("Order for item {0} has no shipping address")]
    MissingAddress(ItemId),

    #[error(
        "Cannot merge items with different shipping addresses. All items in a merged \
         shipment must be going to the same address (item {item_id} differs)"
    )]
    AddressMismatch { item_id: ItemId },
}

#[derive(Debug, Error)]
pub enum FulfillmentError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Merge rejected: {0}")]
    Merge(#[from] MergeError),

    #[error("No shipping rates available for {0}")]
    NoRatesAvailable(String),

    #[error("State transition error: {0}")]
    StateTransition(#[from] StateMachineError),

    #[error("Shipping API error: {0}")]
    Remote(#[from] ClientError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl FulfillmentError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// True for errors the operator caused and can fix by editing the form
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::Validation(_)
                | Self::Merge(_)
                | Self::NoRatesAvailable(_)
                | Self::StateTransition(_)
                | Self::NotFound(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, FulfillmentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_error_messages() {
        let err = MergeError::TooFewItems { selected: 1 };
        assert_eq!(err.to_string(), "Select at least 2 items to merge (1 selected)");

        let err: FulfillmentError = MergeError::AddressMismatch { item_id: 7 }.into();
        assert!(err.to_string().starts_with("Merge rejected: Cannot merge items"));
        assert!(err.is_user_error());
    }

    #[test]
    fn test_remote_errors_are_not_user_errors() {
        let err: FulfillmentError = ClientError::api_error(502, "bad gateway").into();
        assert!(!err.is_user_error());
        assert_eq!(
            err.to_string(),
            "Shipping API error: API error: 502 - bad gateway"
        );
    }
}
