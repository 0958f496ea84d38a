//! Console session facade.
//!
//! One object per signed-in principal bundling everything the inventory
//! console screens need: browsing with resolved display names and sticker
//! labels, item mutations, catalog lookups with inline add, and the audit
//! trail view. Each completed operation emits a notification through the
//! configured sink.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;

use assetdesk_core::{ActionId, ConditionId, DepartmentId, ItemNo, RecipientId, UserId};
use assetdesk_inventory::{
    ActionStatus, Condition, Department, Item, ItemDraft, ItemFilter, ItemPatch, ItemView,
    LedgerEntry, NewActionStatus, NewCondition, NewDepartment, NewPurchaseOrder, NewRecipient,
    Page, PageRequest, PurchaseOrder, Recipient, DEFAULT_STATUS_NAME, NA_NAME,
};

use crate::labels::LabelRenderer;
use crate::notify::{Notification, NotificationSink};
use crate::repository::{ItemRepository, MutationOutcome, RepositoryError};
use crate::store::{CatalogStore, ItemStore, LedgerStore};

/// One browse query: filter plus page.
#[derive(Debug, Clone, PartialEq)]
pub struct BrowseRequest {
    pub filter: ItemFilter,
    pub page: PageRequest,
}

pub struct InventorySession<S> {
    actor: UserId,
    repo: ItemRepository<S>,
    store: Arc<S>,
    labels: Arc<dyn LabelRenderer>,
    notifier: Arc<dyn NotificationSink>,
}

impl<S> InventorySession<S>
where
    S: ItemStore + LedgerStore + CatalogStore,
{
    pub fn new(
        actor: UserId,
        store: Arc<S>,
        labels: Arc<dyn LabelRenderer>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            actor,
            repo: ItemRepository::new(Arc::clone(&store)),
            store,
            labels,
            notifier,
        }
    }

    pub fn actor(&self) -> UserId {
        self.actor
    }

    /// One page of the active view with catalog names resolved and sticker
    /// labels attached.
    pub async fn browse(&self, request: BrowseRequest) -> Result<Page<ItemView>, RepositoryError> {
        let page = self.repo.list(&request.filter, request.page).await?;
        let names = self.catalog_names().await?;
        Ok(page.map(|item| self.resolve_view(item, &names)))
    }

    pub async fn item_details(&self, item_no: &ItemNo) -> Result<ItemView, RepositoryError> {
        let item = self.repo.get(item_no).await?;
        let names = self.catalog_names().await?;
        Ok(self.resolve_view(item, &names))
    }

    /// Audit trail for an identifier, newest first.
    pub async fn trail(&self, item_no: &ItemNo) -> Result<Vec<LedgerEntry>, RepositoryError> {
        self.repo.trail(item_no).await
    }

    pub async fn add_item(
        &self,
        draft: ItemDraft,
    ) -> Result<MutationOutcome<ItemView>, RepositoryError> {
        let result = self.repo.create(draft, Some(self.actor), Utc::now()).await;
        let outcome = self.notified(result, "New item added successfully")?;
        self.resolve_outcome(outcome).await
    }

    pub async fn edit_item(
        &self,
        item_no: &ItemNo,
        patch: ItemPatch,
    ) -> Result<MutationOutcome<ItemView>, RepositoryError> {
        let result = self
            .repo
            .update(item_no, patch, Some(self.actor), Utc::now())
            .await;
        let outcome = self.notified(result, "Item updated successfully")?;
        self.resolve_outcome(outcome).await
    }

    pub async fn remove_item(&self, item_no: &ItemNo) -> Result<Item, RepositoryError> {
        match self.repo.soft_delete(item_no, self.actor).await {
            Ok(item) => {
                self.notifier
                    .publish(Notification::success("Item deleted successfully"));
                Ok(item)
            }
            Err(e) => {
                self.notifier.publish(Notification::error(e.to_string()));
                Err(e)
            }
        }
    }

    pub async fn departments(&self) -> Result<Vec<Department>, RepositoryError> {
        Ok(self.store.list_departments().await?)
    }

    pub async fn add_department(
        &self,
        new: NewDepartment,
    ) -> Result<Department, RepositoryError> {
        new.validate()?;
        let dept = new.assign(DepartmentId::new());
        self.store.insert_department(dept.clone()).await?;
        self.notifier
            .publish(Notification::success("New department added successfully"));
        Ok(dept)
    }

    pub async fn conditions(&self) -> Result<Vec<Condition>, RepositoryError> {
        Ok(self.store.list_conditions().await?)
    }

    pub async fn add_condition(&self, new: NewCondition) -> Result<Condition, RepositoryError> {
        new.validate()?;
        let condition = new.assign(ConditionId::new());
        self.store.insert_condition(condition.clone()).await?;
        self.notifier
            .publish(Notification::success("New condition added successfully"));
        Ok(condition)
    }

    pub async fn statuses(&self) -> Result<Vec<ActionStatus>, RepositoryError> {
        Ok(self.store.list_actions().await?)
    }

    pub async fn add_status(&self, new: NewActionStatus) -> Result<ActionStatus, RepositoryError> {
        new.validate()?;
        let action = new.assign(ActionId::new());
        self.store.insert_action(action.clone()).await?;
        self.notifier
            .publish(Notification::success("New status added successfully"));
        Ok(action)
    }

    pub async fn recipients(&self) -> Result<Vec<Recipient>, RepositoryError> {
        Ok(self.store.list_recipients().await?)
    }

    pub async fn add_recipient(&self, new: NewRecipient) -> Result<Recipient, RepositoryError> {
        new.validate()?;
        let recipient = new.assign(RecipientId::new());
        self.store.insert_recipient(recipient.clone()).await?;
        self.notifier
            .publish(Notification::success("New recipient added successfully"));
        Ok(recipient)
    }

    pub async fn purchase_orders(&self) -> Result<Vec<PurchaseOrder>, RepositoryError> {
        Ok(self.store.list_purchase_orders().await?)
    }

    pub async fn add_purchase_order(
        &self,
        new: NewPurchaseOrder,
    ) -> Result<PurchaseOrder, RepositoryError> {
        new.validate()?;
        let po = new.into_record();
        self.store.insert_purchase_order(po.clone()).await?;
        self.notifier.publish(Notification::success(
            "New purchase order added successfully",
        ));
        Ok(po)
    }

    /// Purchase orders referenced by at least one active item.
    pub async fn linked_purchase_orders(&self) -> Result<Vec<PurchaseOrder>, RepositoryError> {
        let mut linked = Vec::new();
        for po_no in self.store.active_po_numbers().await? {
            if let Some(po) = self.store.get_purchase_order(&po_no).await? {
                linked.push(po);
            }
        }
        Ok(linked)
    }

    fn notified<T>(
        &self,
        result: Result<MutationOutcome<T>, RepositoryError>,
        success: &str,
    ) -> Result<MutationOutcome<T>, RepositoryError> {
        match &result {
            Ok(outcome) if outcome.audit.is_degraded() => {
                self.notifier.publish(Notification::warning(format!(
                    "{success}, but the audit entry could not be recorded"
                )));
            }
            Ok(_) => self.notifier.publish(Notification::success(success)),
            Err(e) => self.notifier.publish(Notification::error(e.to_string())),
        }
        result
    }

    async fn resolve_outcome(
        &self,
        outcome: MutationOutcome<Item>,
    ) -> Result<MutationOutcome<ItemView>, RepositoryError> {
        let names = self.catalog_names().await?;
        Ok(MutationOutcome {
            view: self.resolve_view(outcome.view, &names),
            audit: outcome.audit,
        })
    }

    async fn catalog_names(&self) -> Result<CatalogNames, RepositoryError> {
        Ok(CatalogNames {
            conditions: self
                .store
                .list_conditions()
                .await?
                .into_iter()
                .map(|c| (c.id, c.name))
                .collect(),
            actions: self
                .store
                .list_actions()
                .await?
                .into_iter()
                .map(|a| (a.id, a.name))
                .collect(),
            departments: self
                .store
                .list_departments()
                .await?
                .into_iter()
                .map(|d| (d.id, d.name))
                .collect(),
            recipients: self
                .store
                .list_recipients()
                .await?
                .into_iter()
                .map(|r| (r.id, r.name))
                .collect(),
        })
    }

    fn resolve_view(&self, item: Item, names: &CatalogNames) -> ItemView {
        let sticker = self.labels.render(&item.item_no);
        ItemView {
            condition_name: names.condition(item.condition_id),
            status_name: names.status(item.status),
            dept_name: names.department(item.dept_id),
            recipient_name: names.recipient(item.indiv_txn_id),
            sticker,
            item,
        }
    }
}

struct CatalogNames {
    conditions: HashMap<ConditionId, String>,
    actions: HashMap<ActionId, String>,
    departments: HashMap<DepartmentId, String>,
    recipients: HashMap<RecipientId, String>,
}

impl CatalogNames {
    fn condition(&self, id: Option<ConditionId>) -> String {
        id.and_then(|id| self.conditions.get(&id).cloned())
            .unwrap_or_else(|| NA_NAME.to_string())
    }

    /// A dangling or unset status reads as the canonical default.
    fn status(&self, id: Option<ActionId>) -> String {
        id.and_then(|id| self.actions.get(&id).cloned())
            .unwrap_or_else(|| DEFAULT_STATUS_NAME.to_string())
    }

    fn department(&self, id: Option<DepartmentId>) -> String {
        id.and_then(|id| self.departments.get(&id).cloned())
            .unwrap_or_else(|| NA_NAME.to_string())
    }

    fn recipient(&self, id: Option<RecipientId>) -> String {
        id.and_then(|id| self.recipients.get(&id).cloned())
            .unwrap_or_else(|| NA_NAME.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::SvgLabelRenderer;
    use crate::notify::{RecordingSink, Severity};
    use crate::store::InMemoryStore;
    use assetdesk_core::PoNumber;

    struct Fixture {
        session: InventorySession<InMemoryStore>,
        store: Arc<InMemoryStore>,
        sink: Arc<RecordingSink>,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(InMemoryStore::new());
        let sink = Arc::new(RecordingSink::new());
        let session = InventorySession::new(
            UserId::new(),
            Arc::clone(&store),
            Arc::new(SvgLabelRenderer),
            Arc::clone(&sink) as Arc<dyn NotificationSink>,
        );
        Fixture {
            session,
            store,
            sink,
        }
    }

    fn draft(name: &str) -> ItemDraft {
        ItemDraft {
            name: name.to_string(),
            ..ItemDraft::default()
        }
    }

    #[tokio::test]
    async fn browse_resolves_names_and_attaches_stickers() {
        let fx = fixture();
        let dept = fx
            .session
            .add_department(NewDepartment {
                name: "Finance".to_string(),
            })
            .await
            .unwrap();

        fx.session
            .add_item(ItemDraft {
                dept_id: Some(dept.id),
                ..draft("Laptop")
            })
            .await
            .unwrap();

        let page = fx.session.browse(BrowseRequest {
            filter: ItemFilter::default(),
            page: PageRequest::new(1, 10),
        })
        .await
        .unwrap();

        let view = &page.items[0];
        assert_eq!(view.dept_name, "Finance");
        assert_eq!(view.condition_name, NA_NAME);
        assert_eq!(view.status_name, DEFAULT_STATUS_NAME);
        assert!(view
            .sticker
            .as_deref()
            .is_some_and(|s| s.starts_with("data:image/svg+xml;base64,")));
    }

    #[tokio::test]
    async fn mutations_emit_notifications() {
        let fx = fixture();
        let added = fx.session.add_item(draft("Laptop")).await.unwrap();
        fx.session
            .remove_item(&added.view.item.item_no)
            .await
            .unwrap();

        let seen = fx.sink.drain();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].severity, Severity::Success);
        assert_eq!(seen[0].message, "New item added successfully");
        assert_eq!(seen[1].message, "Item deleted successfully");
    }

    #[tokio::test]
    async fn degraded_audit_surfaces_as_a_warning() {
        let fx = fixture();
        fx.store.fail_next_ledger_append();

        let outcome = fx.session.add_item(draft("Laptop")).await.unwrap();
        assert!(outcome.audit.is_degraded());

        let seen = fx.sink.drain();
        assert_eq!(seen[0].severity, Severity::Warning);
    }

    #[tokio::test]
    async fn failed_mutations_emit_error_notifications() {
        let fx = fixture();
        let err = fx.session.add_item(draft("  ")).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Validation(_)));

        let seen = fx.sink.drain();
        assert_eq!(seen[0].severity, Severity::Error);
    }

    #[tokio::test]
    async fn linked_purchase_orders_follow_active_items() {
        let fx = fixture();
        let po = fx
            .session
            .add_purchase_order(NewPurchaseOrder {
                po_no: PoNumber::new("PO-77").unwrap(),
                supplier: "Acme".to_string(),
                total_amount_cents: 125_000,
                order_date: chrono::NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            })
            .await
            .unwrap();

        // Not linked yet.
        assert!(fx.session.linked_purchase_orders().await.unwrap().is_empty());

        let added = fx
            .session
            .add_item(ItemDraft {
                po_no: Some(po.po_no.clone()),
                ..draft("Laptop")
            })
            .await
            .unwrap();
        let linked = fx.session.linked_purchase_orders().await.unwrap();
        assert_eq!(linked, vec![po]);

        // Deleting the only holder unlinks it again.
        fx.session
            .remove_item(&added.view.item.item_no)
            .await
            .unwrap();
        assert!(fx.session.linked_purchase_orders().await.unwrap().is_empty());
    }
}
