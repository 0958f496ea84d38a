//! `assetdesk-infra` — ports and adapters around the remote relational store,
//! plus the orchestration services built on top of them.
//!
//! Layout:
//! - `store/`: the relational store traits + in-memory and Postgres backends
//! - `allocator`: year-scoped item number allocation
//! - `ledger`: append-only audit trail service
//! - `repository`: item lifecycle orchestration (create/update/soft-delete/list)
//! - `session`: the UI-facing facade (pagination, filters, inline catalog adds)
//! - `notify` / `labels`: outbound ports the facade consumes

pub mod allocator;
pub mod labels;
pub mod ledger;
pub mod notify;
pub mod repository;
pub mod session;
pub mod store;

pub use allocator::{AllocatorError, ItemNoAllocator, MAX_ALLOCATION_ATTEMPTS};
pub use labels::{LabelRenderer, NullLabelRenderer, SvgLabelRenderer};
pub use ledger::TransactionLedger;
pub use notify::{Notification, NotificationSink, RecordingSink, Severity};
pub use repository::{AuditStatus, ItemRepository, MutationOutcome, RepositoryError};
pub use session::{BrowseRequest, InventorySession};
pub use store::{CatalogStore, InMemoryStore, ItemStore, LedgerStore, PostgresStore, StoreError};
