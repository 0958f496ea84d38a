use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use assetdesk_core::{ActionId, ConditionId, DepartmentId, ItemNo, PoNumber, RecipientId};
use assetdesk_inventory::{
    ActionStatus, Condition, Department, Item, ItemFilter, LedgerEntry, PurchaseOrder, Recipient,
};

use super::r#trait::{CatalogStore, ItemStore, LedgerStore, StoreError};

#[derive(Debug, Default)]
struct State {
    items: HashMap<ItemNo, Item>,
    ledger: Vec<LedgerEntry>,
    departments: HashMap<DepartmentId, Department>,
    conditions: HashMap<ConditionId, Condition>,
    actions: HashMap<ActionId, ActionStatus>,
    recipients: HashMap<RecipientId, Recipient>,
    purchase_orders: HashMap<PoNumber, PurchaseOrder>,
}

/// In-memory store.
///
/// Intended for tests/dev. Enforces the same contracts the Postgres backend
/// gets from the database: `item_no` uniqueness across all rows (including
/// soft-deleted ones) and append-only ledger semantics.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<State>,
    fail_next_ledger_append: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Test hook: make the next ledger append fail with
    /// [`StoreError::Unavailable`], simulating a dropped round trip after the
    /// primary write.
    pub fn fail_next_ledger_append(&self) {
        self.fail_next_ledger_append.store(true, Ordering::SeqCst);
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, State>, StoreError> {
        self.state
            .read()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, State>, StoreError> {
        self.state
            .write()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))
    }
}

#[async_trait]
impl ItemStore for InMemoryStore {
    async fn insert_item(&self, item: Item) -> Result<(), StoreError> {
        let mut state = self.write()?;
        if state.items.contains_key(&item.item_no) {
            return Err(StoreError::Conflict(format!(
                "items.item_no duplicate: {}",
                item.item_no
            )));
        }
        state.items.insert(item.item_no, item);
        Ok(())
    }

    async fn fetch_item(&self, item_no: &ItemNo) -> Result<Option<Item>, StoreError> {
        Ok(self.read()?.items.get(item_no).cloned())
    }

    async fn update_item(&self, item: Item) -> Result<(), StoreError> {
        let mut state = self.write()?;
        match state.items.get_mut(&item.item_no) {
            Some(slot) => {
                *slot = item;
                Ok(())
            }
            None => Err(StoreError::NotFound),
        }
    }

    async fn mark_deleted(&self, item_no: &ItemNo, at: DateTime<Utc>) -> Result<(), StoreError> {
        let mut state = self.write()?;
        match state.items.get_mut(item_no) {
            Some(item) if item.is_active() => {
                item.deleted_at = Some(at);
                Ok(())
            }
            _ => Err(StoreError::NotFound),
        }
    }

    async fn list_active(
        &self,
        filter: &ItemFilter,
        offset: u64,
        limit: u64,
    ) -> Result<(Vec<Item>, u64), StoreError> {
        let state = self.read()?;

        let mut matched: Vec<&Item> = state
            .items
            .values()
            .filter(|i| i.is_active() && filter.matches(i))
            .collect();
        // Newest activity first; identifier as a deterministic tiebreak.
        matched.sort_by(|a, b| {
            b.updated_at
                .cmp(&a.updated_at)
                .then_with(|| b.item_no.cmp(&a.item_no))
        });

        let total = matched.len() as u64;
        let page = matched
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect();
        Ok((page, total))
    }

    async fn max_suffix(&self, year: u8) -> Result<Option<u32>, StoreError> {
        let state = self.read()?;
        Ok(state
            .items
            .keys()
            .filter(|no| no.year() == year)
            .map(|no| no.suffix())
            .max())
    }

    async fn active_po_numbers(&self) -> Result<Vec<PoNumber>, StoreError> {
        let state = self.read()?;
        let mut numbers: Vec<PoNumber> = state
            .items
            .values()
            .filter(|i| i.is_active())
            .filter_map(|i| i.po_no.clone())
            .collect();
        numbers.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        numbers.dedup();
        Ok(numbers)
    }
}

#[async_trait]
impl LedgerStore for InMemoryStore {
    async fn append_entry(&self, entry: LedgerEntry) -> Result<(), StoreError> {
        if self.fail_next_ledger_append.swap(false, Ordering::SeqCst) {
            return Err(StoreError::Unavailable(
                "simulated ledger append failure".to_string(),
            ));
        }
        self.write()?.ledger.push(entry);
        Ok(())
    }

    async fn entries_for_item(&self, item_no: &ItemNo) -> Result<Vec<LedgerEntry>, StoreError> {
        let state = self.read()?;
        let mut entries: Vec<LedgerEntry> = state
            .ledger
            .iter()
            .filter(|e| e.item_no == *item_no)
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| b.id.cmp(&a.id)));
        Ok(entries)
    }
}

#[async_trait]
impl CatalogStore for InMemoryStore {
    async fn insert_department(&self, dept: Department) -> Result<(), StoreError> {
        self.write()?.departments.insert(dept.id, dept);
        Ok(())
    }

    async fn list_departments(&self) -> Result<Vec<Department>, StoreError> {
        let mut all: Vec<Department> = self.read()?.departments.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }

    async fn insert_condition(&self, condition: Condition) -> Result<(), StoreError> {
        self.write()?.conditions.insert(condition.id, condition);
        Ok(())
    }

    async fn list_conditions(&self) -> Result<Vec<Condition>, StoreError> {
        let mut all: Vec<Condition> = self.read()?.conditions.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }

    async fn insert_action(&self, action: ActionStatus) -> Result<(), StoreError> {
        self.write()?.actions.insert(action.id, action);
        Ok(())
    }

    async fn find_action_by_name(&self, name: &str) -> Result<Option<ActionStatus>, StoreError> {
        Ok(self
            .read()?
            .actions
            .values()
            .find(|a| a.name == name)
            .cloned())
    }

    async fn list_actions(&self) -> Result<Vec<ActionStatus>, StoreError> {
        let mut all: Vec<ActionStatus> = self.read()?.actions.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }

    async fn insert_recipient(&self, recipient: Recipient) -> Result<(), StoreError> {
        self.write()?.recipients.insert(recipient.id, recipient);
        Ok(())
    }

    async fn list_recipients(&self) -> Result<Vec<Recipient>, StoreError> {
        let mut all: Vec<Recipient> = self.read()?.recipients.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }

    async fn insert_purchase_order(&self, po: PurchaseOrder) -> Result<(), StoreError> {
        let mut state = self.write()?;
        if state.purchase_orders.contains_key(&po.po_no) {
            return Err(StoreError::Conflict(format!(
                "purchase_order.po_no duplicate: {}",
                po.po_no
            )));
        }
        state.purchase_orders.insert(po.po_no.clone(), po);
        Ok(())
    }

    async fn get_purchase_order(
        &self,
        po_no: &PoNumber,
    ) -> Result<Option<PurchaseOrder>, StoreError> {
        Ok(self.read()?.purchase_orders.get(po_no).cloned())
    }

    async fn list_purchase_orders(&self) -> Result<Vec<PurchaseOrder>, StoreError> {
        let mut all: Vec<PurchaseOrder> = self.read()?.purchase_orders.values().cloned().collect();
        all.sort_by(|a, b| a.po_no.as_str().cmp(b.po_no.as_str()));
        Ok(all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assetdesk_inventory::ItemDraft;

    fn item(year: u8, suffix: u32, name: &str) -> Item {
        ItemDraft {
            name: name.to_string(),
            ..ItemDraft::default()
        }
        .into_item(ItemNo::new(year, suffix).unwrap(), None, Utc::now())
    }

    #[tokio::test]
    async fn duplicate_item_no_conflicts() {
        let store = InMemoryStore::new();
        store.insert_item(item(25, 1, "Laptop")).await.unwrap();
        let err = store.insert_item(item(25, 1, "Other")).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn soft_deleted_rows_block_reuse_and_hide_from_listing() {
        let store = InMemoryStore::new();
        store.insert_item(item(25, 1, "Laptop")).await.unwrap();
        store
            .mark_deleted(&ItemNo::new(25, 1).unwrap(), Utc::now())
            .await
            .unwrap();

        // Not listed...
        let (page, total) = store
            .list_active(&ItemFilter::default(), 0, 10)
            .await
            .unwrap();
        assert!(page.is_empty());
        assert_eq!(total, 0);

        // ...but still unique and still counted for allocation.
        assert!(matches!(
            store.insert_item(item(25, 1, "Again")).await,
            Err(StoreError::Conflict(_))
        ));
        assert_eq!(store.max_suffix(25).await.unwrap(), Some(1));
    }

    #[tokio::test]
    async fn max_suffix_is_year_scoped() {
        let store = InMemoryStore::new();
        store.insert_item(item(25, 7, "A")).await.unwrap();
        store.insert_item(item(25, 3, "B")).await.unwrap();
        store.insert_item(item(24, 90, "C")).await.unwrap();

        assert_eq!(store.max_suffix(25).await.unwrap(), Some(7));
        assert_eq!(store.max_suffix(24).await.unwrap(), Some(90));
        assert_eq!(store.max_suffix(26).await.unwrap(), None);
    }

    #[tokio::test]
    async fn mark_deleted_twice_is_not_found() {
        let store = InMemoryStore::new();
        store.insert_item(item(25, 1, "Laptop")).await.unwrap();
        let no = ItemNo::new(25, 1).unwrap();
        store.mark_deleted(&no, Utc::now()).await.unwrap();
        assert!(matches!(
            store.mark_deleted(&no, Utc::now()).await,
            Err(StoreError::NotFound)
        ));
    }
}
