use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use assetdesk_core::{
    ActionId, ConditionId, DepartmentId, DomainError, DomainResult, ItemNo, PoNumber, RecipientId,
};

/// A tracked physical asset record.
///
/// `item_no` is immutable once assigned. Rows are never hard-deleted by the
/// normal flow: deletion sets `deleted_at`, hiding the row from the active
/// view while keeping it for the audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub item_no: ItemNo,
    pub name: String,
    pub property_no: Option<String>,
    pub location: Option<String>,
    pub serial_no: Option<String>,
    pub model_brand: Option<String>,
    pub date_acquired: Option<NaiveDate>,
    /// Current status (action taxonomy). `None` displays as the canonical
    /// default, "Issued".
    pub status: Option<ActionId>,
    pub condition_id: Option<ConditionId>,
    pub dept_id: Option<DepartmentId>,
    pub indiv_txn_id: Option<RecipientId>,
    pub po_no: Option<PoNumber>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Item {
    pub fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }
}

/// Input for creating an item. Name is the only required field; every
/// relation is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemDraft {
    pub name: String,
    pub property_no: Option<String>,
    pub location: Option<String>,
    pub serial_no: Option<String>,
    pub model_brand: Option<String>,
    pub date_acquired: Option<NaiveDate>,
    pub status: Option<ActionId>,
    pub condition_id: Option<ConditionId>,
    pub dept_id: Option<DepartmentId>,
    pub indiv_txn_id: Option<RecipientId>,
    pub po_no: Option<PoNumber>,
}

impl ItemDraft {
    pub fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("item name is required"));
        }
        Ok(())
    }

    /// Materialize the draft into a record under the allocated identifier.
    pub fn into_item(self, item_no: ItemNo, status: Option<ActionId>, now: DateTime<Utc>) -> Item {
        Item {
            item_no,
            name: self.name,
            property_no: self.property_no,
            location: self.location,
            serial_no: self.serial_no,
            model_brand: self.model_brand,
            date_acquired: self.date_acquired,
            status,
            condition_id: self.condition_id,
            dept_id: self.dept_id,
            indiv_txn_id: self.indiv_txn_id,
            po_no: self.po_no,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }
}

/// Partial update of an item's mutable attributes.
///
/// Scalar fields use `Option<T>`: `None` leaves the attribute unchanged.
/// Nullable fields use `Option<Option<T>>`: the outer `None` leaves the
/// attribute unchanged, `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemPatch {
    pub name: Option<String>,
    pub property_no: Option<Option<String>>,
    pub location: Option<Option<String>>,
    pub serial_no: Option<Option<String>>,
    pub model_brand: Option<Option<String>>,
    pub date_acquired: Option<Option<NaiveDate>>,
    pub status: Option<Option<ActionId>>,
    pub condition_id: Option<Option<ConditionId>>,
    pub dept_id: Option<Option<DepartmentId>>,
    pub indiv_txn_id: Option<Option<RecipientId>>,
    pub po_no: Option<Option<PoNumber>>,
}

impl ItemPatch {
    pub fn validate(&self) -> DomainResult<()> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(DomainError::validation("item name cannot be emptied"));
            }
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Apply the patch in place. `updated_at` is the caller's concern.
    pub fn apply(&self, item: &mut Item) {
        if let Some(name) = &self.name {
            item.name = name.clone();
        }
        if let Some(v) = &self.property_no {
            item.property_no = v.clone();
        }
        if let Some(v) = &self.location {
            item.location = v.clone();
        }
        if let Some(v) = &self.serial_no {
            item.serial_no = v.clone();
        }
        if let Some(v) = &self.model_brand {
            item.model_brand = v.clone();
        }
        if let Some(v) = &self.date_acquired {
            item.date_acquired = *v;
        }
        if let Some(v) = &self.status {
            item.status = *v;
        }
        if let Some(v) = &self.condition_id {
            item.condition_id = *v;
        }
        if let Some(v) = &self.dept_id {
            item.dept_id = *v;
        }
        if let Some(v) = &self.indiv_txn_id {
            item.indiv_txn_id = *v;
        }
        if let Some(v) = &self.po_no {
            item.po_no = v.clone();
        }
    }
}

/// An item with its catalog references resolved to display names.
///
/// Missing catalog targets fall back to `"N/A"`; a missing status falls back
/// to the canonical default `"Issued"`. `sticker` is a rendered label
/// artifact (data URL), attached by the facade; `None` when rendering fails
/// or no renderer is wired.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemView {
    #[serde(flatten)]
    pub item: Item,
    pub condition_name: String,
    pub status_name: String,
    pub dept_name: String,
    pub recipient_name: String,
    pub sticker: Option<String>,
}
