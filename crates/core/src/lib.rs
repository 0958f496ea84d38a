//! `assetdesk-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod error;
pub mod id;
pub mod item_no;

pub use error::{DomainError, DomainResult};
pub use id::{ActionId, ConditionId, DepartmentId, LedgerEntryId, PoNumber, RecipientId, UserId};
pub use item_no::{ItemNo, MAX_SUFFIX, year_tag};
