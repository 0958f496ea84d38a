//! Audit ledger entry types (append-only).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use assetdesk_core::{
    ActionId, DepartmentId, ItemNo, LedgerEntryId, PoNumber, RecipientId, UserId,
};

use crate::item::Item;

/// Free-form activity tag on a ledger entry.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activity {
    Create,
    Update,
    Delete,
}

impl Activity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Activity::Create => "create",
            Activity::Update => "update",
            Activity::Delete => "delete",
        }
    }
}

impl core::fmt::Display for Activity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A ledger entry ready to be appended (no id or timestamp yet).
///
/// `date` is assigned by the ledger at write time, never by the caller, so a
/// skewed client clock cannot reorder the trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewLedgerEntry {
    pub item_no: ItemNo,
    pub activity: Activity,
    pub action_id: Option<ActionId>,
    pub dept_id: Option<DepartmentId>,
    pub indiv_txn_id: Option<RecipientId>,
    pub po_no: Option<PoNumber>,
    pub user_id: Option<UserId>,
}

impl NewLedgerEntry {
    /// Snapshot an item's relational state into an entry.
    ///
    /// For create/update this is the state *after* the mutation; for delete
    /// it is the state *before* the row is hidden.
    pub fn snapshot(item: &Item, activity: Activity, user_id: Option<UserId>) -> Self {
        Self {
            item_no: item.item_no,
            activity,
            action_id: item.status,
            dept_id: item.dept_id,
            indiv_txn_id: item.indiv_txn_id,
            po_no: item.po_no.clone(),
            user_id,
        }
    }
}

/// An immutable, persisted ledger entry. Once written, never updated or
/// deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: LedgerEntryId,
    pub item_no: ItemNo,
    pub activity: Activity,
    pub action_id: Option<ActionId>,
    pub dept_id: Option<DepartmentId>,
    pub indiv_txn_id: Option<RecipientId>,
    pub po_no: Option<PoNumber>,
    pub user_id: Option<UserId>,
    pub date: DateTime<Utc>,
}

impl LedgerEntry {
    pub fn stamp(entry: NewLedgerEntry, id: LedgerEntryId, date: DateTime<Utc>) -> Self {
        Self {
            id,
            item_no: entry.item_no,
            activity: entry.activity,
            action_id: entry.action_id,
            dept_id: entry.dept_id,
            indiv_txn_id: entry.indiv_txn_id,
            po_no: entry.po_no,
            user_id: entry.user_id,
            date,
        }
    }
}
