//! # Label Library
//!
//! Order-linked and standalone labels side by side, with print selection and voiding.
//! Labels are keyed by [`LabelRef`] because the two kinds come from separate tables and
//! their ids overlap.

use std::collections::BTreeSet;

use reqwest::Url;

use super::Confirmation;
use crate::client::CancelLabelRequest;
use crate::config::ShippingApiConfig;
use crate::constants::USER_SCOPED_LABEL_MARKER;
use crate::error::{FulfillmentError, Result};
use crate::models::{Label, LabelId, LabelRef};
use crate::state_machine::{LabelEvent, LabelStateMachine};

#[derive(Debug, Clone, Default)]
pub struct LabelLibrary {
    labels: Vec<Label>,
    selected: BTreeSet<LabelRef>,
}

impl LabelLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the library contents, newest first. Selections that no longer point at an
    /// active order label are dropped.
    pub fn replace(&mut self, order_labels: Vec<Label>, standalone_labels: Vec<Label>) {
        let mut labels: Vec<Label> = order_labels.into_iter().chain(standalone_labels).collect();
        labels.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        self.labels = labels;

        let labels = &self.labels;
        self.selected.retain(|r| {
            labels
                .iter()
                .any(|l| l.label_ref() == *r && l.is_actionable())
        });
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn find(&self, label_ref: LabelRef) -> Option<&Label> {
        self.labels.iter().find(|l| l.label_ref() == label_ref)
    }

    fn find_mut(&mut self, label_ref: LabelRef) -> Option<&mut Label> {
        self.labels.iter_mut().find(|l| l.label_ref() == label_ref)
    }

    pub fn is_selected(&self, label_ref: LabelRef) -> bool {
        self.selected.contains(&label_ref)
    }

    pub fn selected(&self) -> Vec<LabelRef> {
        self.selected.iter().copied().collect()
    }

    /// Ids to send to the print endpoint, in library order
    pub fn selected_ids(&self) -> Vec<LabelId> {
        self.labels
            .iter()
            .filter(|l| self.selected.contains(&l.label_ref()))
            .map(|l| l.id)
            .collect()
    }

    /// Only active order labels can be selected for printing
    pub fn toggle_selection(&mut self, label_ref: LabelRef) -> Result<()> {
        if self.selected.remove(&label_ref) {
            return Ok(());
        }

        let label = self
            .find(label_ref)
            .ok_or_else(|| FulfillmentError::not_found(format!("label {label_ref}")))?;
        if !label.is_actionable() {
            return Err(FulfillmentError::validation(format!(
                "Label {label_ref} cannot be printed from the library"
            )));
        }

        self.selected.insert(label_ref);
        Ok(())
    }

    /// Select every active order label
    pub fn select_all(&mut self) {
        self.selected = self
            .labels
            .iter()
            .filter(|l| l.is_actionable())
            .map(Label::label_ref)
            .collect();
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    /// Check a void request. Returns the cancel request to send, or `None` when the operator
    /// declined.
    pub fn prepare_void(
        &self,
        label_ref: LabelRef,
        confirmation: Confirmation,
    ) -> Result<Option<CancelLabelRequest>> {
        if confirmation == Confirmation::Declined {
            return Ok(None);
        }

        let label = self
            .find(label_ref)
            .ok_or_else(|| FulfillmentError::not_found(format!("label {label_ref}")))?;
        LabelStateMachine::new().validate(label, LabelEvent::Void)?;

        Ok(Some(CancelLabelRequest::for_label(
            label.tracking_number.clone(),
            label.id,
        )))
    }

    /// Record a void the server accepted
    pub fn mark_voided(&mut self, label_ref: LabelRef) -> Result<()> {
        let label = self
            .find_mut(label_ref)
            .ok_or_else(|| FulfillmentError::not_found(format!("label {label_ref}")))?;
        LabelStateMachine::new().transition(label, LabelEvent::Void)?;
        self.selected.remove(&label_ref);
        Ok(())
    }
}

/// Where a label file can be downloaded. Voided labels have no file.
///
/// Files under a user-scoped directory are served by the API's label endpoint; everything
/// else comes from the media host.
pub fn label_url(label: &Label, config: &ShippingApiConfig) -> Option<String> {
    if label.is_voided() {
        return None;
    }
    let path = label.label_file_path.as_deref().filter(|p| !p.is_empty())?;

    if path.contains(USER_SCOPED_LABEL_MARKER) {
        let filename = path.rsplit('/').next().unwrap_or(path);
        let mut url = Url::parse(&config.base_url).ok()?;
        url.path_segments_mut()
            .ok()?
            .pop_if_empty()
            .extend(config.endpoints.label_files.split('/').filter(|s| !s.is_empty()))
            .push(filename);
        Some(url.into())
    } else {
        Some(format!(
            "{}/{}",
            config.media_base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        ))
    }
}
