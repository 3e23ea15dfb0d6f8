use super::ids::FormKey;
use super::session::FulfillmentSession;
use crate::client::BatchEntry;
use crate::error::{FulfillmentError, Result};

pub const EMPTY_BATCH_MESSAGE: &str = "No completed forms to process.";

/// Gather every completed form: unmerged items in order-list order, then groups in the
/// order they were created.
pub fn collect_batch_entries(session: &FulfillmentSession) -> Result<Vec<BatchEntry>> {
    let singles = session.unmerged_items().into_iter().filter_map(|item| {
        let key = FormKey::Single(item.item_id);
        session.form(key).and_then(|form| form.batch_action()).map(|action| BatchEntry {
            id: key,
            is_group: false,
            action,
            item_ids: vec![item.item_id],
        })
    });

    let groups = session.groups().iter().filter_map(|group| {
        let key = FormKey::Group(group.group_id);
        session.form(key).and_then(|form| form.batch_action()).map(|action| BatchEntry {
            id: key,
            is_group: true,
            action,
            item_ids: group.item_ids.clone(),
        })
    });

    let entries: Vec<BatchEntry> = singles.chain(groups).collect();
    if entries.is_empty() {
        return Err(FulfillmentError::validation(EMPTY_BATCH_MESSAGE));
    }
    Ok(entries)
}
