use serde::{Deserialize, Serialize};

use super::ids::FormKey;
use crate::client::BatchAction;
use crate::constants::Carrier;
use crate::error::{FulfillmentError, Result};
use crate::models::{PackageField, PackageSpec, Rate};

/// Editable state behind one shipment: hand-entered tracking, packages and rate quotes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormState {
    pub carrier: Option<Carrier>,
    pub tracking_number: String,
    pub packages: Vec<PackageSpec>,
    pub rates: Vec<Rate>,
    pub selected_rate: Option<Rate>,
    pub force_card_payment: bool,
    pub show_all_rates: bool,
    /// Inline error from the last failed action on this form
    pub error: Option<String>,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            carrier: None,
            tracking_number: String::new(),
            packages: vec![PackageSpec::default()],
            rates: Vec::new(),
            selected_rate: None,
            force_card_payment: false,
            show_all_rates: false,
            error: None,
        }
    }
}

impl FormState {
    /// Carrier and a non-blank tracking number are both present
    pub fn has_tracking(&self) -> bool {
        self.carrier.is_some() && !self.tracking_number.trim().is_empty()
    }

    /// Rates shown to the operator: only the best one until "see more"
    pub fn visible_rates(&self) -> &[Rate] {
        if self.show_all_rates {
            &self.rates
        } else {
            &self.rates[..self.rates.len().min(1)]
        }
    }

    pub fn packages_complete(&self) -> bool {
        !self.packages.is_empty() && self.packages.iter().all(PackageSpec::is_complete)
    }

    /// Batch action this form would submit. Tracking wins over a selected rate.
    pub fn batch_action(&self) -> Option<BatchAction> {
        if let (true, Some(carrier)) = (self.has_tracking(), self.carrier) {
            return Some(BatchAction::Tracking {
                carrier: carrier.to_string(),
                tracking_number: self.tracking_number.trim().to_string(),
            });
        }

        self.selected_rate.as_ref().map(|rate| BatchAction::Label {
            selected_rate: rate.clone(),
            packages: self.packages.clone(),
            force_card_payment: self.force_card_payment,
        })
    }

    pub fn add_package(&mut self) {
        self.packages.push(PackageSpec::default());
    }

    /// The first package is permanent
    pub fn remove_package(&mut self, index: usize) -> Result<()> {
        if index == 0 {
            return Err(FulfillmentError::validation("The first package cannot be removed"));
        }
        if index >= self.packages.len() {
            return Err(FulfillmentError::validation(format!(
                "No package at position {index}"
            )));
        }
        self.packages.remove(index);
        Ok(())
    }

    pub fn update_package(&mut self, index: usize, field: PackageField) -> Result<()> {
        let package = self
            .packages
            .get_mut(index)
            .ok_or_else(|| FulfillmentError::validation(format!("No package at position {index}")))?;
        package.apply(field);
        Ok(())
    }

    /// Store fresh quotes and preselect the first
    pub fn set_rates(&mut self, rates: Vec<Rate>) {
        self.selected_rate = rates.first().cloned();
        self.rates = rates;
        self.show_all_rates = false;
        self.error = None;
    }

    pub fn select_rate(&mut self, service: &str) -> Result<()> {
        let rate = self
            .rates
            .iter()
            .find(|r| r.service == service)
            .cloned()
            .ok_or_else(|| FulfillmentError::validation(format!("No quoted rate for service {service}")))?;
        self.selected_rate = Some(rate);
        Ok(())
    }

    pub fn record_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }
}

/// Which part of a shipment form is open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Tracking,
    Label,
}

/// The single form section open at a time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveSection {
    pub key: FormKey,
    pub kind: SectionKind,
}
