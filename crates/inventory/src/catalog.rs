//! Reference catalogs: small lookup tables the item table points at.
//!
//! Items hold weak references to these; a missing target displays as
//! [`NA_NAME`]. Catalog deletion is unconstrained by this core.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use assetdesk_core::{
    ActionId, ConditionId, DepartmentId, DomainError, DomainResult, PoNumber, RecipientId,
};

/// Canonical default status for new items.
pub const DEFAULT_STATUS_NAME: &str = "Issued";

/// Display fallback for a missing catalog target.
pub const NA_NAME: &str = "N/A";

fn require_name(name: &str, what: &str) -> DomainResult<()> {
    if name.trim().is_empty() {
        return Err(DomainError::validation(format!("{what} name is required")));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    pub id: DepartmentId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDepartment {
    pub name: String,
}

impl NewDepartment {
    pub fn validate(&self) -> DomainResult<()> {
        require_name(&self.name, "department")
    }

    pub fn assign(self, id: DepartmentId) -> Department {
        Department {
            id,
            name: self.name.trim().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub id: ConditionId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCondition {
    pub name: String,
}

impl NewCondition {
    pub fn validate(&self) -> DomainResult<()> {
        require_name(&self.name, "condition")
    }

    pub fn assign(self, id: ConditionId) -> Condition {
        Condition {
            id,
            name: self.name.trim().to_string(),
        }
    }
}

/// Status taxonomy record ("Issued", "Returned", ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionStatus {
    pub id: ActionId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewActionStatus {
    pub name: String,
}

impl NewActionStatus {
    pub fn validate(&self) -> DomainResult<()> {
        require_name(&self.name, "action")
    }

    pub fn assign(self, id: ActionId) -> ActionStatus {
        ActionStatus {
            id,
            name: self.name.trim().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseOrder {
    pub po_no: PoNumber,
    pub supplier: String,
    /// Amount in the smallest currency unit (cents).
    pub total_amount_cents: i64,
    pub order_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPurchaseOrder {
    pub po_no: PoNumber,
    pub supplier: String,
    pub total_amount_cents: i64,
    pub order_date: NaiveDate,
}

impl NewPurchaseOrder {
    pub fn validate(&self) -> DomainResult<()> {
        require_name(&self.supplier, "supplier")?;
        if self.total_amount_cents < 0 {
            return Err(DomainError::validation(
                "purchase order total cannot be negative",
            ));
        }
        Ok(())
    }

    pub fn into_record(self) -> PurchaseOrder {
        PurchaseOrder {
            po_no: self.po_no,
            supplier: self.supplier.trim().to_string(),
            total_amount_cents: self.total_amount_cents,
            order_date: self.order_date,
        }
    }
}

/// Custodian of an item ("individual transaction" in the persisted layout).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    pub id: RecipientId,
    pub name: String,
    pub position: Option<String>,
    pub remarks: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRecipient {
    pub name: String,
    pub position: Option<String>,
    pub remarks: Option<String>,
}

impl NewRecipient {
    pub fn validate(&self) -> DomainResult<()> {
        require_name(&self.name, "recipient")
    }

    pub fn assign(self, id: RecipientId) -> Recipient {
        Recipient {
            id,
            name: self.name.trim().to_string(),
            position: self.position,
            remarks: self.remarks,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_names_are_rejected() {
        assert!(
            NewDepartment {
                name: " ".to_string()
            }
            .validate()
            .is_err()
        );
        assert!(
            NewCondition {
                name: "".to_string()
            }
            .validate()
            .is_err()
        );
        assert!(
            NewRecipient {
                name: "".to_string(),
                position: None,
                remarks: None,
            }
            .validate()
            .is_err()
        );
    }

    #[test]
    fn assign_trims_names() {
        let dept = NewDepartment {
            name: "  Finance  ".to_string(),
        }
        .assign(DepartmentId::new());
        assert_eq!(dept.name, "Finance");
    }

    #[test]
    fn negative_po_total_is_rejected() {
        let po = NewPurchaseOrder {
            po_no: PoNumber::new("PO-001").unwrap(),
            supplier: "Acme".to_string(),
            total_amount_cents: -1,
            order_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        };
        assert!(po.validate().is_err());
    }
}
