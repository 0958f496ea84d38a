//! Append-only transaction ledger over a [`LedgerStore`].
//!
//! Stamps each snapshot with a fresh UUIDv7 id and the append time. There is
//! deliberately no update or delete surface here.

use std::sync::Arc;

use chrono::Utc;

use assetdesk_core::{ItemNo, LedgerEntryId};
use assetdesk_inventory::{LedgerEntry, NewLedgerEntry};

use crate::store::{LedgerStore, StoreError};

#[derive(Debug)]
pub struct TransactionLedger<S> {
    store: Arc<S>,
}

impl<S> Clone for TransactionLedger<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: LedgerStore> TransactionLedger<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Stamp and persist one snapshot, returning its assigned id.
    pub async fn append(&self, entry: NewLedgerEntry) -> Result<LedgerEntryId, StoreError> {
        let id = LedgerEntryId::new();
        let stamped = LedgerEntry::stamp(entry, id, Utc::now());
        self.store.append_entry(stamped).await?;
        Ok(id)
    }

    /// Full history for one identifier, newest first. Empty when the item
    /// never existed.
    pub async fn trail(&self, item_no: &ItemNo) -> Result<Vec<LedgerEntry>, StoreError> {
        self.store.entries_for_item(item_no).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;
    use assetdesk_inventory::Activity;

    fn snapshot(item_no: ItemNo, activity: Activity) -> NewLedgerEntry {
        NewLedgerEntry {
            item_no,
            activity,
            action_id: None,
            dept_id: None,
            indiv_txn_id: None,
            po_no: None,
            user_id: None,
        }
    }

    #[tokio::test]
    async fn appends_are_returned_newest_first() {
        let store = Arc::new(InMemoryStore::new());
        let ledger = TransactionLedger::new(store);
        let item_no = ItemNo::new(25, 1).unwrap();

        ledger
            .append(snapshot(item_no, Activity::Create))
            .await
            .unwrap();
        ledger
            .append(snapshot(item_no, Activity::Update))
            .await
            .unwrap();

        let trail = ledger.trail(&item_no).await.unwrap();
        assert_eq!(trail.len(), 2);
        assert_eq!(trail[0].activity, Activity::Update);
        assert_eq!(trail[1].activity, Activity::Create);
    }

    #[tokio::test]
    async fn unknown_item_has_empty_trail() {
        let store = Arc::new(InMemoryStore::new());
        let ledger = TransactionLedger::new(store);
        let trail = ledger.trail(&ItemNo::new(25, 99).unwrap()).await.unwrap();
        assert!(trail.is_empty());
    }
}
