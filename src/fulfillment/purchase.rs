//! Label purchase planning and payment source resolution.

use serde::{Deserialize, Serialize};

use super::ids::FormKey;
use super::session::FulfillmentSession;
use crate::client::{PaymentSource, PurchaseLabelRequest};
use crate::error::{FulfillmentError, Result};

/// Permission granting access to the marketplace-connect balance
pub const CONNECT_BALANCE_PERMISSION: &str = "stripe_connect";

/// What the vendor's account allows when paying for labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountCapabilities {
    pub connect_balance: bool,
    pub prefer_connect_balance: bool,
}

impl Default for AccountCapabilities {
    fn default() -> Self {
        Self {
            connect_balance: false,
            prefer_connect_balance: true,
        }
    }
}

impl AccountCapabilities {
    pub fn from_permissions<S: AsRef<str>>(permissions: &[S], prefer_connect_balance: bool) -> Self {
        Self {
            connect_balance: permissions
                .iter()
                .any(|p| p.as_ref() == CONNECT_BALANCE_PERMISSION),
            prefer_connect_balance,
        }
    }

    /// Source to charge first. The server falls back to the card if a balance charge fails.
    pub fn payment_source(&self, force_card_payment: bool) -> PaymentSource {
        if self.connect_balance && self.prefer_connect_balance && !force_card_payment {
            PaymentSource::ConnectBalance
        } else {
            PaymentSource::Card
        }
    }
}

/// Build the purchase request for a form from the current session
pub fn plan_purchase(session: &FulfillmentSession, key: FormKey) -> Result<PurchaseLabelRequest> {
    let item_ids = session.target_items(key)?;
    let form = session.form_or_default(key);

    let selected_rate = form
        .selected_rate
        .clone()
        .ok_or_else(|| FulfillmentError::validation("Select a rate before purchasing a label"))?;

    if !form.packages_complete() {
        return Err(FulfillmentError::validation(
            "Every package needs a positive length, width, height and weight",
        ));
    }

    Ok(PurchaseLabelRequest {
        item_ids,
        group_id: key.group_id(),
        selected_rate,
        packages: form.packages.clone(),
        payment_source: session.account().payment_source(form.force_card_payment),
        force_card_payment: form.force_card_payment,
    })
}
