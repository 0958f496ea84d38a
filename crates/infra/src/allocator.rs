//! Year-scoped item identifier allocation.
//!
//! The allocator proposes the next `ITM-YY-NNNNN` candidate from the highest
//! suffix already stored for the year, soft-deleted rows included. It does
//! not reserve anything: the store's uniqueness constraint arbitrates when
//! two callers race, and the repository retries on [`StoreError::Conflict`].

use std::sync::Arc;

use thiserror::Error;

use assetdesk_core::{ItemNo, MAX_SUFFIX};

use crate::store::{ItemStore, StoreError};

/// Upper bound on insert attempts before a create gives up with a conflict.
pub const MAX_ALLOCATION_ATTEMPTS: u32 = 5;

#[derive(Debug, Error)]
pub enum AllocatorError {
    /// The 5-digit suffix space for the year is used up.
    #[error("item number sequence exhausted for year {year:02}")]
    SequenceExhausted { year: u8 },
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Stateless candidate generator over an [`ItemStore`].
#[derive(Debug)]
pub struct ItemNoAllocator<S> {
    store: Arc<S>,
}

impl<S> Clone for ItemNoAllocator<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: ItemStore> ItemNoAllocator<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Next unproven candidate for `year`. Starts at 00001 when the year has
    /// no rows yet, so a year rollover resets the sequence.
    pub async fn next_candidate(&self, year: u8) -> Result<ItemNo, AllocatorError> {
        let max = self.store.max_suffix(year).await?.unwrap_or(0);
        if max >= MAX_SUFFIX {
            return Err(AllocatorError::SequenceExhausted { year });
        }
        ItemNo::new(year, max + 1)
            .map_err(|e| AllocatorError::Store(StoreError::Invalid(e.to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;
    use assetdesk_inventory::ItemDraft;
    use chrono::Utc;

    fn draft(name: &str) -> ItemDraft {
        ItemDraft {
            name: name.to_string(),
            property_no: None,
            location: None,
            serial_no: None,
            model_brand: None,
            date_acquired: None,
            status: None,
            condition_id: None,
            dept_id: None,
            indiv_txn_id: None,
            po_no: None,
        }
    }

    #[tokio::test]
    async fn empty_year_starts_at_one() {
        let store = Arc::new(InMemoryStore::new());
        let allocator = ItemNoAllocator::new(store);
        let candidate = allocator.next_candidate(25).await.unwrap();
        assert_eq!(candidate.to_string(), "ITM-25-00001");
    }

    #[tokio::test]
    async fn candidate_follows_highest_stored_suffix() {
        let store = Arc::new(InMemoryStore::new());
        let now = Utc::now();
        let item_no = ItemNo::new(25, 41).unwrap();
        store
            .insert_item(draft("Projector").into_item(item_no, None, now))
            .await
            .unwrap();

        let allocator = ItemNoAllocator::new(store);
        let candidate = allocator.next_candidate(25).await.unwrap();
        assert_eq!(candidate, ItemNo::new(25, 42).unwrap());
    }

    #[tokio::test]
    async fn years_are_independent() {
        let store = Arc::new(InMemoryStore::new());
        let now = Utc::now();
        store
            .insert_item(draft("Desk").into_item(ItemNo::new(24, 9).unwrap(), None, now))
            .await
            .unwrap();

        let allocator = ItemNoAllocator::new(store);
        assert_eq!(
            allocator.next_candidate(25).await.unwrap(),
            ItemNo::new(25, 1).unwrap()
        );
        assert_eq!(
            allocator.next_candidate(24).await.unwrap(),
            ItemNo::new(24, 10).unwrap()
        );
    }

    #[tokio::test]
    async fn full_year_reports_exhaustion() {
        let store = Arc::new(InMemoryStore::new());
        let now = Utc::now();
        store
            .insert_item(draft("Last").into_item(ItemNo::new(25, MAX_SUFFIX).unwrap(), None, now))
            .await
            .unwrap();

        let allocator = ItemNoAllocator::new(store);
        let err = allocator.next_candidate(25).await.unwrap_err();
        assert!(matches!(
            err,
            AllocatorError::SequenceExhausted { year: 25 }
        ));
    }
}
