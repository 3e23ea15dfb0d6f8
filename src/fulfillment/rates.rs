use super::ids::FormKey;
use super::session::FulfillmentSession;
use crate::client::RateRequest;
use crate::error::{FulfillmentError, Result};

/// Build the quote request for a form. A group quotes against its first member.
pub fn build_rate_request(session: &FulfillmentSession, key: FormKey) -> Result<RateRequest> {
    let item_id = session.rate_item_id(key)?;
    let form = session.form_or_default(key);

    if form.packages.is_empty() {
        return Err(FulfillmentError::validation("Add at least one package"));
    }
    if let Some(index) = form.packages.iter().position(|p| !p.is_complete()) {
        return Err(FulfillmentError::validation(format!(
            "Package {} needs a positive length, width, height and weight",
            index + 1
        )));
    }

    Ok(RateRequest {
        item_id,
        packages: form.packages.clone(),
    })
}
