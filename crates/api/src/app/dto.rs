//! Request/response DTOs and JSON mapping helpers.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use assetdesk_core::{ActionId, ConditionId, DepartmentId, PoNumber, RecipientId};
use assetdesk_infra::{AuditStatus, BrowseRequest, MutationOutcome};
use assetdesk_inventory::{
    ItemDraft, ItemFilter, ItemPatch, ItemView, NewActionStatus, NewCondition, NewDepartment,
    NewPurchaseOrder, NewRecipient, PageRequest,
};

/// Rows per page when the client does not say.
pub const DEFAULT_PAGE_SIZE: u32 = 5;

/// Marks a present JSON value, so `Option<Option<T>>` patch fields can tell
/// "field omitted" (outer `None`) from "field set to null" (`Some(None)`).
fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

#[derive(Debug, Deserialize)]
pub struct ListItemsQuery {
    pub q: Option<String>,
    pub department: Option<DepartmentId>,
    pub status: Option<ActionId>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl ListItemsQuery {
    pub fn into_browse_request(self) -> BrowseRequest {
        BrowseRequest {
            filter: ItemFilter {
                query: self.q,
                department: self.department,
                status: self.status,
            },
            page: PageRequest::new(
                self.page.unwrap_or(1),
                self.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
            ),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateItemRequest {
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

impl CreateItemRequest {
    pub fn into_draft(self) -> ItemDraft {
        ItemDraft {
            name: self.name,
            property_no: self.property_no,
            location: self.location,
            serial_no: self.serial_no,
            model_brand: self.model_brand,
            date_acquired: self.date_acquired,
            status: self.status,
            condition_id: self.condition_id,
            dept_id: self.dept_id,
            indiv_txn_id: self.indiv_txn_id,
            po_no: self.po_no,
        }
    }
}

/// Partial update. Omitted fields stay as they are; nullable fields sent as
/// JSON `null` are cleared.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateItemRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub property_no: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub location: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub serial_no: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub model_brand: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub date_acquired: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub status: Option<Option<ActionId>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub condition_id: Option<Option<ConditionId>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub dept_id: Option<Option<DepartmentId>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub indiv_txn_id: Option<Option<RecipientId>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub po_no: Option<Option<PoNumber>>,
}

impl UpdateItemRequest {
    pub fn into_patch(self) -> ItemPatch {
        ItemPatch {
            name: self.name,
            property_no: self.property_no,
            location: self.location,
            serial_no: self.serial_no,
            model_brand: self.model_brand,
            date_acquired: self.date_acquired,
            status: self.status,
            condition_id: self.condition_id,
            dept_id: self.dept_id,
            indiv_txn_id: self.indiv_txn_id,
            po_no: self.po_no,
        }
    }
}

/// Committed mutation plus audit outcome. `warning` is set when the write
/// stuck but its audit entry could not be recorded.
#[derive(Debug, Serialize)]
pub struct MutationResponse {
    pub item: ItemView,
    pub audit_recorded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl MutationResponse {
    pub fn from_outcome(outcome: MutationOutcome<ItemView>) -> Self {
        match outcome.audit {
            AuditStatus::Recorded(_) => Self {
                item: outcome.view,
                audit_recorded: true,
                warning: None,
            },
            AuditStatus::Degraded(reason) => Self {
                item: outcome.view,
                audit_recorded: false,
                warning: Some(format!("change saved but not audited: {reason}")),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateDepartmentRequest {
    pub name: String,
}

impl CreateDepartmentRequest {
    pub fn into_new(self) -> NewDepartment {
        NewDepartment { name: self.name }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateConditionRequest {
    pub name: String,
}

impl CreateConditionRequest {
    pub fn into_new(self) -> NewCondition {
        NewCondition { name: self.name }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateStatusRequest {
    pub name: String,
}

impl CreateStatusRequest {
    pub fn into_new(self) -> NewActionStatus {
        NewActionStatus { name: self.name }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateRecipientRequest {
    pub name: String,
    pub position: Option<String>,
    pub remarks: Option<String>,
}

impl CreateRecipientRequest {
    pub fn into_new(self) -> NewRecipient {
        NewRecipient {
            name: self.name,
            position: self.position,
            remarks: self.remarks,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreatePurchaseOrderRequest {
    pub po_no: PoNumber,
    pub supplier: String,
    pub total_amount_cents: i64,
    pub order_date: NaiveDate,
}

impl CreatePurchaseOrderRequest {
    pub fn into_new(self) -> NewPurchaseOrder {
        NewPurchaseOrder {
            po_no: self.po_no,
            supplier: self.supplier,
            total_amount_cents: self.total_amount_cents,
            order_date: self.order_date,
        }
    }
}
