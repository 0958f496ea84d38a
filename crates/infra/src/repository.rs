//! Item repository: allocation, mutation, and audit in one place.
//!
//! Ordering discipline per mutation kind:
//!
//! * create / update: mutate first, then append to the ledger. An append
//!   failure does not undo the committed write; it is reported as a degraded
//!   outcome alongside the data.
//! * delete: append first, then mark the row. An append failure aborts the
//!   delete and the record stays live.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, instrument, warn};

use assetdesk_core::{year_tag, DomainError, ItemNo, LedgerEntryId, UserId};
use assetdesk_inventory::{
    Activity, Item, ItemDraft, ItemFilter, ItemPatch, LedgerEntry, NewLedgerEntry, Page,
    PageRequest, DEFAULT_STATUS_NAME,
};

use crate::allocator::{AllocatorError, ItemNoAllocator, MAX_ALLOCATION_ATTEMPTS};
use crate::ledger::TransactionLedger;
use crate::store::{CatalogStore, ItemStore, LedgerStore, StoreError};

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("item not found")]
    NotFound,
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("unauthorized")]
    Unauthorized,
    #[error("storage unavailable: {0}")]
    Upstream(String),
}

impl From<DomainError> for RepositoryError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::Validation(msg) | DomainError::InvalidId(msg) => Self::Validation(msg),
            DomainError::NotFound => Self::NotFound,
            DomainError::Conflict(msg) => Self::Conflict(msg),
            DomainError::Unauthorized => Self::Unauthorized,
        }
    }
}

impl From<StoreError> for RepositoryError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Conflict(msg) => Self::Conflict(msg),
            StoreError::NotFound => Self::NotFound,
            StoreError::Unavailable(msg) | StoreError::Invalid(msg) => Self::Upstream(msg),
        }
    }
}

impl From<AllocatorError> for RepositoryError {
    fn from(e: AllocatorError) -> Self {
        match e {
            AllocatorError::SequenceExhausted { .. } => Self::Conflict(e.to_string()),
            AllocatorError::Store(store) => store.into(),
        }
    }
}

/// Whether a mutation's audit snapshot made it into the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditStatus {
    Recorded(LedgerEntryId),
    /// The data write committed but the ledger append failed.
    Degraded(String),
}

impl AuditStatus {
    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded(_))
    }
}

/// A committed mutation plus its audit status.
#[derive(Debug, Clone, PartialEq)]
pub struct MutationOutcome<T> {
    pub view: T,
    pub audit: AuditStatus,
}

/// Orchestrates item mutations over one backing store.
#[derive(Debug)]
pub struct ItemRepository<S> {
    store: Arc<S>,
    allocator: ItemNoAllocator<S>,
    ledger: TransactionLedger<S>,
}

impl<S> Clone for ItemRepository<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            allocator: self.allocator.clone(),
            ledger: self.ledger.clone(),
        }
    }
}

impl<S> ItemRepository<S>
where
    S: ItemStore + LedgerStore + CatalogStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self {
            allocator: ItemNoAllocator::new(Arc::clone(&store)),
            ledger: TransactionLedger::new(Arc::clone(&store)),
            store,
        }
    }

    pub fn ledger(&self) -> &TransactionLedger<S> {
        &self.ledger
    }

    /// Create an item under a freshly allocated identifier.
    ///
    /// Allocation is optimistic: read the year's highest suffix, propose the
    /// next one, and let the uniqueness constraint arbitrate. A lost race
    /// retries with a re-read, up to [`MAX_ALLOCATION_ATTEMPTS`].
    #[instrument(skip(self, draft, actor), fields(name = %draft.name))]
    pub async fn create(
        &self,
        draft: ItemDraft,
        actor: Option<UserId>,
        now: DateTime<Utc>,
    ) -> Result<MutationOutcome<Item>, RepositoryError> {
        draft.validate()?;

        let status = match draft.status {
            Some(status) => Some(status),
            None => self
                .store
                .find_action_by_name(DEFAULT_STATUS_NAME)
                .await?
                .map(|a| a.id),
        };

        let year = year_tag(now);
        for attempt in 1..=MAX_ALLOCATION_ATTEMPTS {
            let candidate = self.allocator.next_candidate(year).await?;
            let item = draft.clone().into_item(candidate, status, now);
            match self.store.insert_item(item.clone()).await {
                Ok(()) => {
                    return Ok(self.record_mutation(item, Activity::Create, actor).await);
                }
                Err(StoreError::Conflict(_)) => {
                    debug!(%candidate, attempt, "item number taken, retrying allocation");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(RepositoryError::Conflict(format!(
            "could not allocate an item number after {MAX_ALLOCATION_ATTEMPTS} attempts"
        )))
    }

    /// Fetch one active item. Soft-deleted rows read as absent.
    pub async fn get(&self, item_no: &ItemNo) -> Result<Item, RepositoryError> {
        match self.store.fetch_item(item_no).await? {
            Some(item) if item.is_active() => Ok(item),
            _ => Err(RepositoryError::NotFound),
        }
    }

    #[instrument(skip(self, patch, actor), fields(item_no = %item_no))]
    pub async fn update(
        &self,
        item_no: &ItemNo,
        patch: ItemPatch,
        actor: Option<UserId>,
        now: DateTime<Utc>,
    ) -> Result<MutationOutcome<Item>, RepositoryError> {
        patch.validate()?;
        let mut item = self.get(item_no).await?;

        patch.apply(&mut item);
        item.updated_at = now;
        self.store.update_item(item.clone()).await?;

        Ok(self.record_mutation(item, Activity::Update, actor).await)
    }

    /// Soft-delete an active item. Requires an authenticated actor; the
    /// audit entry is appended before the row is touched, so a ledger
    /// failure leaves the record live.
    #[instrument(skip(self), fields(item_no = %item_no))]
    pub async fn soft_delete(
        &self,
        item_no: &ItemNo,
        actor: UserId,
    ) -> Result<Item, RepositoryError> {
        let mut item = self.get(item_no).await?;

        let entry = NewLedgerEntry::snapshot(&item, Activity::Delete, Some(actor));
        self.ledger.append(entry).await?;

        let at = Utc::now();
        self.store.mark_deleted(item_no, at).await?;
        item.deleted_at = Some(at);
        Ok(item)
    }

    /// One page of the active view, filtered, newest update first.
    pub async fn list(
        &self,
        filter: &ItemFilter,
        request: PageRequest,
    ) -> Result<Page<Item>, RepositoryError> {
        let request = request.clamped();
        let (items, total) = self
            .store
            .list_active(filter, request.offset(), request.limit())
            .await?;
        Ok(Page::new(items, request, total))
    }

    /// Audit trail for an identifier, newest first. Works for soft-deleted
    /// items too; an identifier that never existed has an empty trail.
    pub async fn trail(&self, item_no: &ItemNo) -> Result<Vec<LedgerEntry>, RepositoryError> {
        Ok(self.ledger.trail(item_no).await?)
    }

    async fn record_mutation(
        &self,
        item: Item,
        activity: Activity,
        actor: Option<UserId>,
    ) -> MutationOutcome<Item> {
        let entry = NewLedgerEntry::snapshot(&item, activity, actor);
        let audit = match self.ledger.append(entry).await {
            Ok(id) => AuditStatus::Recorded(id),
            Err(e) => {
                warn!(item_no = %item.item_no, %activity, error = %e, "ledger append failed after committed write");
                AuditStatus::Degraded(e.to_string())
            }
        };
        MutationOutcome { view: item, audit }
    }
}
