//! # Fulfillment Session
//!
//! The operator's in-memory working state: the loaded orders, merge selection, merged
//! groups, per-shipment forms and the open form section.
//!
//! A session is a value. [`FulfillmentSession::apply`] validates an action against the
//! current state and returns the next state, leaving `self` untouched, so a rejected action
//! never leaves a half-applied change behind. Nothing here is persisted.

use std::collections::HashMap;

use chrono::Utc;
use serde::Serialize;
use tracing::debug;

use super::forms::{ActiveSection, FormState, SectionKind};
use super::ids::{FormKey, GroupId};
use super::merge::{validate_merge, MergedShipmentGroup};
use super::purchase::AccountCapabilities;
use super::Confirmation;
use crate::client::BatchItemResult;
use crate::constants::Carrier;
use crate::error::{FulfillmentError, MergeError, Result};
use crate::models::{ItemId, Order, OrderItem, OrderTab, PackageField, Rate};
use crate::state_machine::{ItemEvent, ItemStateMachine};

/// Every change an operator or a remote response can make to the session
#[derive(Debug, Clone, PartialEq)]
pub enum SessionAction {
    /// Replace the order list for a view
    OrdersLoaded { tab: OrderTab, orders: Vec<Order> },
    /// Change which account capabilities apply
    AccountChanged(AccountCapabilities),
    ToggleMergeSelection(ItemId),
    MergeSelected { group_id: GroupId },
    Unmerge {
        group_id: GroupId,
        confirmation: Confirmation,
    },
    /// Open a form section, or close it if it is already open
    ToggleSection { key: FormKey, kind: SectionKind },
    AddPackage(FormKey),
    RemovePackage { key: FormKey, index: usize },
    UpdatePackage {
        key: FormKey,
        index: usize,
        field: PackageField,
    },
    SetTracking {
        key: FormKey,
        carrier: Option<Carrier>,
        tracking_number: String,
    },
    RatesLoaded { key: FormKey, rates: Vec<Rate> },
    RateFetchFailed { key: FormKey, message: String },
    SelectRate { key: FormKey, service: String },
    ShowAllRates(FormKey),
    SetForceCardPayment { key: FormKey, force: bool },
    /// A label was bought for `item_ids`. Applies even when the form or group it was
    /// bought from has since gone away.
    LabelPurchased {
        key: FormKey,
        item_ids: Vec<ItemId>,
        tracking_number: String,
        carrier: String,
    },
    BatchCompleted { results: Vec<BatchItemResult> },
    ItemCancelled { item_id: ItemId },
}

impl SessionAction {
    pub fn name(&self) -> &'static str {
        match self {
            Self::OrdersLoaded { .. } => "orders_loaded",
            Self::AccountChanged(_) => "account_changed",
            Self::ToggleMergeSelection(_) => "toggle_merge_selection",
            Self::MergeSelected { .. } => "merge_selected",
            Self::Unmerge { .. } => "unmerge",
            Self::ToggleSection { .. } => "toggle_section",
            Self::AddPackage(_) => "add_package",
            Self::RemovePackage { .. } => "remove_package",
            Self::UpdatePackage { .. } => "update_package",
            Self::SetTracking { .. } => "set_tracking",
            Self::RatesLoaded { .. } => "rates_loaded",
            Self::RateFetchFailed { .. } => "rate_fetch_failed",
            Self::SelectRate { .. } => "select_rate",
            Self::ShowAllRates(_) => "show_all_rates",
            Self::SetForceCardPayment { .. } => "set_force_card_payment",
            Self::LabelPurchased { .. } => "label_purchased",
            Self::BatchCompleted { .. } => "batch_completed",
            Self::ItemCancelled { .. } => "item_cancelled",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct FulfillmentSession {
    tab: OrderTab,
    orders: Vec<Order>,
    account: AccountCapabilities,
    merge_selection: Vec<ItemId>,
    groups: Vec<MergedShipmentGroup>,
    forms: HashMap<FormKey, FormState>,
    active_section: Option<ActiveSection>,
    batch_results: Vec<BatchItemResult>,
}

impl FulfillmentSession {
    pub fn new(account: AccountCapabilities) -> Self {
        Self {
            account,
            ..Default::default()
        }
    }

    pub fn tab(&self) -> OrderTab {
        self.tab
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn account(&self) -> AccountCapabilities {
        self.account
    }

    pub fn merge_selection(&self) -> &[ItemId] {
        &self.merge_selection
    }

    pub fn is_selected_for_merge(&self, item_id: ItemId) -> bool {
        self.merge_selection.contains(&item_id)
    }

    /// Merged groups in creation order
    pub fn groups(&self) -> &[MergedShipmentGroup] {
        &self.groups
    }

    pub fn group(&self, group_id: GroupId) -> Option<&MergedShipmentGroup> {
        self.groups.iter().find(|g| g.group_id == group_id)
    }

    pub fn group_of(&self, item_id: ItemId) -> Option<&MergedShipmentGroup> {
        self.groups.iter().find(|g| g.contains(item_id))
    }

    pub fn is_merged(&self, item_id: ItemId) -> bool {
        self.group_of(item_id).is_some()
    }

    pub fn form(&self, key: FormKey) -> Option<&FormState> {
        self.forms.get(&key)
    }

    /// The stored form, or a blank one when nothing was entered yet
    pub fn form_or_default(&self, key: FormKey) -> FormState {
        self.forms.get(&key).cloned().unwrap_or_default()
    }

    pub fn active_section(&self) -> Option<ActiveSection> {
        self.active_section
    }

    pub fn batch_results(&self) -> &[BatchItemResult] {
        &self.batch_results
    }

    pub fn item(&self, item_id: ItemId) -> Option<&OrderItem> {
        self.orders.iter().find_map(|o| o.item(item_id))
    }

    /// Pending items not claimed by any group, in order-list order
    pub fn unmerged_items(&self) -> Vec<&OrderItem> {
        if self.tab != OrderTab::Unshipped {
            return Vec::new();
        }
        self.orders
            .iter()
            .flat_map(|o| o.items.iter())
            .filter(|item| item.item_status.is_shippable() && !self.is_merged(item.item_id))
            .collect()
    }

    /// Items a form ships
    pub fn target_items(&self, key: FormKey) -> Result<Vec<ItemId>> {
        match key {
            FormKey::Single(item_id) => {
                self.ensure_form_key(key)?;
                Ok(vec![item_id])
            }
            FormKey::Group(group_id) => self
                .group(group_id)
                .map(|g| g.item_ids.clone())
                .ok_or_else(|| FulfillmentError::not_found(format!("merged shipment {group_id}"))),
        }
    }

    /// Item quoted for a form: the item itself, or a group's first member
    pub fn rate_item_id(&self, key: FormKey) -> Result<ItemId> {
        match key {
            FormKey::Single(item_id) => {
                self.ensure_form_key(key)?;
                Ok(item_id)
            }
            FormKey::Group(group_id) => self
                .group(group_id)
                .map(MergedShipmentGroup::primary_item)
                .ok_or_else(|| FulfillmentError::not_found(format!("merged shipment {group_id}"))),
        }
    }

    fn ensure_form_key(&self, key: FormKey) -> Result<()> {
        match key {
            FormKey::Single(item_id) => {
                let item = self
                    .item(item_id)
                    .filter(|_| self.tab == OrderTab::Unshipped)
                    .ok_or_else(|| FulfillmentError::not_found(format!("unshipped item {item_id}")))?;
                if !item.item_status.is_shippable() {
                    return Err(FulfillmentError::validation(format!(
                        "Item {item_id} is {} and cannot be shipped again",
                        item.item_status
                    )));
                }
                if let Some(group) = self.group_of(item_id) {
                    return Err(FulfillmentError::validation(format!(
                        "Item {item_id} ships as part of {}",
                        group.group_id
                    )));
                }
                Ok(())
            }
            FormKey::Group(group_id) => self
                .group(group_id)
                .map(|_| ())
                .ok_or_else(|| FulfillmentError::not_found(format!("merged shipment {group_id}"))),
        }
    }

    fn form_mut(&mut self, key: FormKey) -> Result<&mut FormState> {
        self.ensure_form_key(key)?;
        Ok(self.forms.entry(key).or_default())
    }

    /// Validate `action` and return the resulting session
    pub fn apply(&self, action: SessionAction) -> Result<Self> {
        let mut next = self.clone();
        debug!(action = action.name(), "Applying session action");

        match action {
            SessionAction::OrdersLoaded { tab, orders } => next.load_orders(tab, orders),
            SessionAction::AccountChanged(account) => {
                next.account = account;
                if !account.connect_balance {
                    next.forms.values_mut().for_each(|f| f.force_card_payment = false);
                }
            }
            SessionAction::ToggleMergeSelection(item_id) => next.toggle_merge_selection(item_id)?,
            SessionAction::MergeSelected { group_id } => next.merge_selected(group_id)?,
            SessionAction::Unmerge {
                group_id,
                confirmation,
            } => {
                if confirmation == Confirmation::Confirmed {
                    next.unmerge(group_id)?;
                }
            }
            SessionAction::ToggleSection { key, kind } => {
                next.ensure_form_key(key)?;
                let section = ActiveSection { key, kind };
                next.active_section = if next.active_section == Some(section) {
                    None
                } else {
                    Some(section)
                };
            }
            SessionAction::AddPackage(key) => next.form_mut(key)?.add_package(),
            SessionAction::RemovePackage { key, index } => next.form_mut(key)?.remove_package(index)?,
            SessionAction::UpdatePackage { key, index, field } => {
                next.form_mut(key)?.update_package(index, field)?
            }
            SessionAction::SetTracking {
                key,
                carrier,
                tracking_number,
            } => {
                let form = next.form_mut(key)?;
                form.carrier = carrier;
                form.tracking_number = tracking_number;
            }
            SessionAction::RatesLoaded { key, rates } => {
                let form = next.form_mut(key)?;
                if rates.is_empty() {
                    form.rates.clear();
                    form.selected_rate = None;
                    form.record_error("No shipping rates available for these packages");
                } else {
                    form.set_rates(rates);
                }
            }
            SessionAction::RateFetchFailed { key, message } => {
                let form = next.form_mut(key)?;
                form.rates.clear();
                form.selected_rate = None;
                form.record_error(message);
            }
            SessionAction::SelectRate { key, service } => next.form_mut(key)?.select_rate(&service)?,
            SessionAction::ShowAllRates(key) => next.form_mut(key)?.show_all_rates = true,
            SessionAction::SetForceCardPayment { key, force } => {
                if force && !next.account.connect_balance {
                    return Err(FulfillmentError::validation(
                        "Card payment override is only available with a connect balance",
                    ));
                }
                next.form_mut(key)?.force_card_payment = force;
            }
            SessionAction::LabelPurchased {
                key,
                item_ids,
                tracking_number,
                carrier,
            } => next.label_purchased(key, &item_ids, tracking_number, carrier)?,
            SessionAction::BatchCompleted { results } => {
                next.batch_results = results;
                next.forms.clear();
                next.active_section = None;
            }
            SessionAction::ItemCancelled { item_id } => {
                let item = next
                    .item_mut(item_id)
                    .ok_or_else(|| FulfillmentError::not_found(format!("item {item_id}")))?;
                ItemStateMachine::new().transition(item, &ItemEvent::Cancel)?;
            }
        }

        Ok(next)
    }

    fn item_mut(&mut self, item_id: ItemId) -> Option<&mut OrderItem> {
        self.orders
            .iter_mut()
            .flat_map(|o| o.items.iter_mut())
            .find(|i| i.item_id == item_id)
    }

    fn load_orders(&mut self, tab: OrderTab, orders: Vec<Order>) {
        self.tab = tab;
        self.orders = orders;

        // Groups and forms describe unshipped items; keep them while another view is open
        if tab != OrderTab::Unshipped {
            self.merge_selection.clear();
            return;
        }

        let pending = |orders: &[Order], item_id: ItemId| {
            orders
                .iter()
                .find_map(|o| o.item(item_id))
                .is_some_and(|i| i.item_status.is_shippable())
        };

        let (kept, dropped): (Vec<_>, Vec<_>) = std::mem::take(&mut self.groups)
            .into_iter()
            .partition(|g| g.item_ids.iter().all(|&id| pending(&self.orders, id)));
        for group in &dropped {
            self.forms.remove(&FormKey::Group(group.group_id));
            debug!(group_id = %group.group_id, "Dropped merged shipment whose items are no longer pending");
        }
        self.groups = kept;

        let orders = &self.orders;
        let groups = &self.groups;
        self.merge_selection
            .retain(|&id| pending(orders, id) && !groups.iter().any(|g| g.contains(id)));
        self.forms.retain(|key, _| match key {
            FormKey::Single(id) => pending(orders, *id) && !groups.iter().any(|g| g.contains(*id)),
            FormKey::Group(group_id) => groups.iter().any(|g| g.group_id == *group_id),
        });

        if let Some(section) = self.active_section {
            if self.ensure_form_key(section.key).is_err() {
                self.active_section = None;
            }
        }
    }

    fn toggle_merge_selection(&mut self, item_id: ItemId) -> Result<()> {
        if let Some(pos) = self.merge_selection.iter().position(|&id| id == item_id) {
            self.merge_selection.remove(pos);
            return Ok(());
        }

        let item = self
            .item(item_id)
            .filter(|_| self.tab == OrderTab::Unshipped)
            .ok_or(MergeError::UnknownItem(item_id))?;
        if !item.item_status.is_shippable() {
            return Err(MergeError::NotPending(item_id).into());
        }
        if self.is_merged(item_id) {
            return Err(MergeError::AlreadyMerged(item_id).into());
        }

        self.merge_selection.push(item_id);
        Ok(())
    }

    fn merge_selected(&mut self, group_id: GroupId) -> Result<()> {
        if self.group(group_id).is_some() {
            return Err(FulfillmentError::validation(format!(
                "Merged shipment {group_id} already exists"
            )));
        }

        let orders = if self.tab == OrderTab::Unshipped {
            self.orders.as_slice()
        } else {
            &[]
        };
        let address = validate_merge(orders, &self.merge_selection, |id| self.is_merged(id))?;

        let item_ids = std::mem::take(&mut self.merge_selection);
        for &item_id in &item_ids {
            self.forms.remove(&FormKey::Single(item_id));
        }
        if let Some(ActiveSection {
            key: FormKey::Single(id),
            ..
        }) = self.active_section
        {
            if item_ids.contains(&id) {
                self.active_section = None;
            }
        }

        self.groups.push(MergedShipmentGroup {
            group_id,
            item_ids,
            address,
            created_at: Utc::now(),
        });
        Ok(())
    }

    fn unmerge(&mut self, group_id: GroupId) -> Result<()> {
        let pos = self
            .groups
            .iter()
            .position(|g| g.group_id == group_id)
            .ok_or_else(|| FulfillmentError::not_found(format!("merged shipment {group_id}")))?;
        self.groups.remove(pos);

        let key = FormKey::Group(group_id);
        self.forms.remove(&key);
        if self.active_section.is_some_and(|s| s.key == key) {
            self.active_section = None;
        }
        Ok(())
    }

    fn label_purchased(
        &mut self,
        key: FormKey,
        item_ids: &[ItemId],
        tracking_number: String,
        carrier: String,
    ) -> Result<()> {
        let event = ItemEvent::LabelPurchased {
            tracking_number,
            carrier,
        };

        let machine = ItemStateMachine::new();
        for &item_id in item_ids {
            let Some(item) = self.item_mut(item_id) else {
                debug!(item_id, "Purchased item is not in the loaded orders");
                continue;
            };
            // A reload during the purchase may already show the item as shipped
            if !item.item_status.is_shippable() {
                continue;
            }
            machine.transition(item, &event)?;
        }

        let shipped = |id: &ItemId| item_ids.contains(id);
        let dissolved: Vec<GroupId> = self
            .groups
            .iter()
            .filter(|g| g.item_ids.iter().any(shipped))
            .map(|g| g.group_id)
            .collect();
        self.groups.retain(|g| !dissolved.contains(&g.group_id));
        self.merge_selection.retain(|id| !shipped(id));

        let stale = |k: &FormKey| {
            *k == key
                || matches!(k, FormKey::Single(id) if shipped(id))
                || matches!(k, FormKey::Group(g) if dissolved.contains(g))
        };
        self.forms.retain(|k, _| !stale(k));
        if self.active_section.is_some_and(|s| stale(&s.key)) {
            self.active_section = None;
        }
        Ok(())
    }
}
