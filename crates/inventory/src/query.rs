//! List filtering and pagination types for the active item view.

use serde::{Deserialize, Serialize};

use assetdesk_core::{ActionId, DepartmentId};

use crate::item::Item;

/// Filter predicate for item listings.
///
/// `query` is a case-insensitive substring match, ORed across name, item
/// number, property number, and model/brand. `department`/`status` narrow by
/// exact reference when set. An empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemFilter {
    pub query: Option<String>,
    pub department: Option<DepartmentId>,
    pub status: Option<ActionId>,
}

impl ItemFilter {
    pub fn is_empty(&self) -> bool {
        self.normalized_query().is_none() && self.department.is_none() && self.status.is_none()
    }

    /// Trimmed, lowercased search term; `None` when blank.
    pub fn normalized_query(&self) -> Option<String> {
        self.query
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_lowercase)
    }

    pub fn matches(&self, item: &Item) -> bool {
        if let Some(q) = self.normalized_query() {
            let hit = contains_ci(&item.name, &q)
                || contains_ci(&item.item_no.to_string(), &q)
                || item
                    .property_no
                    .as_deref()
                    .is_some_and(|v| contains_ci(v, &q))
                || item
                    .model_brand
                    .as_deref()
                    .is_some_and(|v| contains_ci(v, &q));
            if !hit {
                return false;
            }
        }
        if let Some(dept) = self.department {
            if item.dept_id != Some(dept) {
                return false;
            }
        }
        if let Some(status) = self.status {
            if item.status != Some(status) {
                return false;
            }
        }
        true
    }
}

fn contains_ci(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

/// One-based page request.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

impl PageRequest {
    pub fn new(page: u32, page_size: u32) -> Self {
        Self { page, page_size }
    }

    /// Clamp to sane lower bounds. Pages beyond the end are left alone; they
    /// resolve to an empty page rather than an error.
    pub fn clamped(self) -> Self {
        Self {
            page: self.page.max(1),
            page_size: self.page_size.max(1),
        }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.page_size)
    }

    pub fn limit(&self) -> u64 {
        u64::from(self.page_size)
    }
}

/// One page of results plus totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub page_size: u32,
    pub total_items: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, request: PageRequest, total_items: u64) -> Self {
        let page_size = request.page_size.max(1);
        Self {
            items,
            page: request.page,
            page_size,
            total_items,
            total_pages: total_items.div_ceil(u64::from(page_size)),
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            page_size: self.page_size,
            total_items: self.total_items,
            total_pages: self.total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assetdesk_core::ItemNo;
    use chrono::Utc;
    use proptest::prelude::*;

    use crate::item::ItemDraft;

    fn item(name: &str, suffix: u32) -> Item {
        ItemDraft {
            name: name.to_string(),
            model_brand: Some("Dell Latitude".to_string()),
            property_no: Some("PR-2210".to_string()),
            ..ItemDraft::default()
        }
        .into_item(ItemNo::new(25, suffix).unwrap(), None, Utc::now())
    }

    fn query(q: &str) -> ItemFilter {
        ItemFilter {
            query: Some(q.to_string()),
            ..ItemFilter::default()
        }
    }

    #[test]
    fn substring_match_is_case_insensitive() {
        let it = item("Laptop", 1);
        assert!(query("lap").matches(&it));
        assert!(query("LAPTOP").matches(&it));
        assert!(!query("printer").matches(&it));
    }

    #[test]
    fn match_spans_identifier_property_and_brand() {
        let it = item("Laptop", 42);
        assert!(query("itm-25-00042").matches(&it));
        assert!(query("pr-22").matches(&it));
        assert!(query("latitude").matches(&it));
    }

    #[test]
    fn blank_query_matches_everything() {
        let it = item("Laptop", 1);
        assert!(ItemFilter::default().matches(&it));
        assert!(query("   ").matches(&it));
        assert!(query("   ").is_empty());
    }

    #[test]
    fn department_filter_narrows() {
        let dept = DepartmentId::new();
        let mut it = item("Laptop", 1);
        let filter = ItemFilter {
            department: Some(dept),
            ..ItemFilter::default()
        };
        assert!(!filter.matches(&it));
        it.dept_id = Some(dept);
        assert!(filter.matches(&it));
    }

    #[test]
    fn page_math_matches_ceiling_division() {
        let page = Page::new(vec![1, 2, 3, 4, 5], PageRequest::new(1, 5), 12);
        assert_eq!(page.total_pages, 3);

        let empty: Page<i32> = Page::new(vec![], PageRequest::new(1, 5), 0);
        assert_eq!(empty.total_pages, 0);
    }

    #[test]
    fn request_clamps_lower_bounds_only() {
        let req = PageRequest::new(0, 0).clamped();
        assert_eq!(req, PageRequest::new(1, 1));

        // Past-the-end pages stay as requested; they yield an empty page.
        let req = PageRequest::new(4, 5).clamped();
        assert_eq!(req.offset(), 15);
    }

    proptest! {
        #[test]
        fn total_pages_covers_all_items(total in 0u64..10_000, page_size in 1u32..100) {
            let page: Page<()> = Page::new(vec![], PageRequest::new(1, page_size), total);
            prop_assert!(page.total_pages * u64::from(page_size) >= total);
            prop_assert!(page.total_pages.saturating_sub(1) * u64::from(page_size) < total || total == 0);
        }

        #[test]
        fn offset_never_overflows(page in 0u32.., page_size in 0u32..) {
            let req = PageRequest::new(page, page_size).clamped();
            // Just exercising the arithmetic: widened before multiply.
            let _ = req.offset();
        }
    }
}
