//! `assetdesk-inventory` — pure domain model for tracked assets.
//!
//! Item records, their drafts/patches, the audit ledger entry types, the
//! reference catalogs, and the list filter/pagination types. No IO here.

pub mod catalog;
pub mod item;
pub mod ledger;
pub mod query;

pub use catalog::{
    ActionStatus, Condition, DEFAULT_STATUS_NAME, Department, NA_NAME, NewActionStatus,
    NewCondition, NewDepartment, NewPurchaseOrder, NewRecipient, PurchaseOrder, Recipient,
};
pub use item::{Item, ItemDraft, ItemPatch, ItemView};
pub use ledger::{Activity, LedgerEntry, NewLedgerEntry};
pub use query::{ItemFilter, Page, PageRequest};
