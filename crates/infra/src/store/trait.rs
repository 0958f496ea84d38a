use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use assetdesk_core::{ItemNo, PoNumber};
use assetdesk_inventory::{
    ActionStatus, Condition, Department, Item, ItemFilter, LedgerEntry, PurchaseOrder, Recipient,
};

/// Store operation error.
///
/// These are **infrastructure errors** (uniqueness, transport) as opposed to
/// domain errors (validation, missing actor). The remote store is the sole
/// arbiter of uniqueness and durability; backends must surface constraint
/// violations distinguishably so callers can retry allocation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Uniqueness constraint violation (e.g. duplicate `item_no`).
    #[error("unique constraint violation: {0}")]
    Conflict(String),

    /// The targeted row does not exist.
    #[error("row not found")]
    NotFound,

    /// The store is unreachable or timed out. Retryable by the caller.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A persisted row could not be interpreted.
    #[error("invalid row: {0}")]
    Invalid(String),
}

/// Item table operations.
///
/// `fetch_item` sees soft-deleted rows (the repository decides what counts as
/// "gone"); `list_active` never does. Listing is ordered by `updated_at`
/// descending and returns the filtered total alongside the page slice.
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// Insert a new row. Fails with [`StoreError::Conflict`] when the
    /// `item_no` already exists, including on soft-deleted rows.
    async fn insert_item(&self, item: Item) -> Result<(), StoreError>;

    async fn fetch_item(&self, item_no: &ItemNo) -> Result<Option<Item>, StoreError>;

    /// Replace the row identified by `item.item_no`.
    async fn update_item(&self, item: Item) -> Result<(), StoreError>;

    /// Set `deleted_at` on an active row.
    async fn mark_deleted(&self, item_no: &ItemNo, at: DateTime<Utc>) -> Result<(), StoreError>;

    async fn list_active(
        &self,
        filter: &ItemFilter,
        offset: u64,
        limit: u64,
    ) -> Result<(Vec<Item>, u64), StoreError>;

    /// Largest allocated suffix for a year, across active and soft-deleted
    /// rows. `None` when the year has no items yet.
    async fn max_suffix(&self, year: u8) -> Result<Option<u32>, StoreError>;

    /// Purchase order numbers referenced by at least one active item.
    async fn active_po_numbers(&self) -> Result<Vec<PoNumber>, StoreError>;
}

/// Append-only ledger table. No update or delete is exposed.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    async fn append_entry(&self, entry: LedgerEntry) -> Result<(), StoreError>;

    /// Entries for one item, newest first.
    async fn entries_for_item(&self, item_no: &ItemNo) -> Result<Vec<LedgerEntry>, StoreError>;
}

/// Reference catalog tables. Trivial CRUD; items hold weak references into
/// these, so lookups return `Option` rather than failing.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn insert_department(&self, dept: Department) -> Result<(), StoreError>;
    async fn list_departments(&self) -> Result<Vec<Department>, StoreError>;

    async fn insert_condition(&self, condition: Condition) -> Result<(), StoreError>;
    async fn list_conditions(&self) -> Result<Vec<Condition>, StoreError>;

    async fn insert_action(&self, action: ActionStatus) -> Result<(), StoreError>;
    async fn find_action_by_name(&self, name: &str) -> Result<Option<ActionStatus>, StoreError>;
    async fn list_actions(&self) -> Result<Vec<ActionStatus>, StoreError>;

    async fn insert_recipient(&self, recipient: Recipient) -> Result<(), StoreError>;
    async fn list_recipients(&self) -> Result<Vec<Recipient>, StoreError>;

    async fn insert_purchase_order(&self, po: PurchaseOrder) -> Result<(), StoreError>;
    async fn get_purchase_order(&self, po_no: &PoNumber)
    -> Result<Option<PurchaseOrder>, StoreError>;
    async fn list_purchase_orders(&self) -> Result<Vec<PurchaseOrder>, StoreError>;
}
