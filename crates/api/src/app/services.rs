//! Infrastructure wiring: store backend selection, notification fan-out, and
//! per-request session construction.

use std::sync::Arc;

use tokio::sync::broadcast;

use assetdesk_core::ItemNo;
use assetdesk_infra::{
    BrowseRequest, CatalogStore, InMemoryStore, InventorySession, ItemStore, LabelRenderer,
    LedgerStore, MutationOutcome, Notification, NotificationSink, RepositoryError,
    SvgLabelRenderer,
};
use assetdesk_inventory::{
    ActionStatus, Condition, Department, Item, ItemDraft, ItemPatch, ItemView, LedgerEntry,
    NewActionStatus, NewCondition, NewDepartment, NewPurchaseOrder, NewRecipient, Page,
    PurchaseOrder, Recipient, DEFAULT_STATUS_NAME,
};

use crate::context::PrincipalContext;

#[cfg(feature = "postgres")]
use assetdesk_infra::PostgresStore;

/// Capacity of the notification fan-out ring; slow SSE consumers lag rather
/// than block publishers.
const NOTIFICATION_BUFFER: usize = 256;

macro_rules! with_session {
    ($self:expr, $principal:expr, $session:ident => $body:expr) => {
        match &$self.backend {
            StoreBackend::InMemory(store) => {
                let $session = $self.session(Arc::clone(store), $principal);
                $body
            }
            #[cfg(feature = "postgres")]
            StoreBackend::Postgres(store) => {
                let $session = $self.session(Arc::clone(store), $principal);
                $body
            }
        }
    };
}

enum StoreBackend {
    InMemory(Arc<InMemoryStore>),
    #[cfg(feature = "postgres")]
    Postgres(Arc<PostgresStore>),
}

pub struct AppServices {
    backend: StoreBackend,
    labels: Arc<dyn LabelRenderer>,
    notifications: broadcast::Sender<Notification>,
}

/// Pick the store backend from the environment. Postgres when compiled in
/// and `DATABASE_URL` is reachable, in-memory otherwise.
pub async fn build_services() -> AppServices {
    #[cfg(feature = "postgres")]
    if let Ok(url) = std::env::var("DATABASE_URL") {
        match sqlx::postgres::PgPoolOptions::new().connect(&url).await {
            Ok(pool) => {
                tracing::info!("using postgres store");
                return AppServices::postgres(PostgresStore::new(pool));
            }
            Err(e) => {
                tracing::warn!(error = %e, "DATABASE_URL set but unreachable; using in-memory store");
            }
        }
    }
    AppServices::in_memory().await
}

impl AppServices {
    /// In-memory backend, seeded with the canonical default status.
    pub async fn in_memory() -> Self {
        let store = Arc::new(InMemoryStore::new());
        let issued = NewActionStatus {
            name: DEFAULT_STATUS_NAME.to_string(),
        }
        .assign(assetdesk_core::ActionId::new());
        if let Err(e) = store.insert_action(issued).await {
            tracing::warn!(error = %e, "failed to seed default status");
        }
        Self::with_backend(StoreBackend::InMemory(store))
    }

    #[cfg(feature = "postgres")]
    pub fn postgres(store: PostgresStore) -> Self {
        Self::with_backend(StoreBackend::Postgres(Arc::new(store)))
    }

    fn with_backend(backend: StoreBackend) -> Self {
        let (notifications, _) = broadcast::channel(NOTIFICATION_BUFFER);
        Self {
            backend,
            labels: Arc::new(SvgLabelRenderer),
            notifications,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.notifications.subscribe()
    }

    fn session<S>(&self, store: Arc<S>, principal: &PrincipalContext) -> InventorySession<S>
    where
        S: ItemStore + LedgerStore + CatalogStore,
    {
        InventorySession::new(
            principal.user_id(),
            store,
            Arc::clone(&self.labels),
            Arc::new(BroadcastSink {
                tx: self.notifications.clone(),
            }),
        )
    }

    pub async fn browse(
        &self,
        principal: &PrincipalContext,
        request: BrowseRequest,
    ) -> Result<Page<ItemView>, RepositoryError> {
        with_session!(self, principal, session => session.browse(request).await)
    }

    pub async fn item_details(
        &self,
        principal: &PrincipalContext,
        item_no: &ItemNo,
    ) -> Result<ItemView, RepositoryError> {
        with_session!(self, principal, session => session.item_details(item_no).await)
    }

    pub async fn trail(
        &self,
        principal: &PrincipalContext,
        item_no: &ItemNo,
    ) -> Result<Vec<LedgerEntry>, RepositoryError> {
        with_session!(self, principal, session => session.trail(item_no).await)
    }

    pub async fn add_item(
        &self,
        principal: &PrincipalContext,
        draft: ItemDraft,
    ) -> Result<MutationOutcome<ItemView>, RepositoryError> {
        with_session!(self, principal, session => session.add_item(draft).await)
    }

    pub async fn edit_item(
        &self,
        principal: &PrincipalContext,
        item_no: &ItemNo,
        patch: ItemPatch,
    ) -> Result<MutationOutcome<ItemView>, RepositoryError> {
        with_session!(self, principal, session => session.edit_item(item_no, patch).await)
    }

    pub async fn remove_item(
        &self,
        principal: &PrincipalContext,
        item_no: &ItemNo,
    ) -> Result<Item, RepositoryError> {
        with_session!(self, principal, session => session.remove_item(item_no).await)
    }

    pub async fn departments(
        &self,
        principal: &PrincipalContext,
    ) -> Result<Vec<Department>, RepositoryError> {
        with_session!(self, principal, session => session.departments().await)
    }

    pub async fn add_department(
        &self,
        principal: &PrincipalContext,
        new: NewDepartment,
    ) -> Result<Department, RepositoryError> {
        with_session!(self, principal, session => session.add_department(new).await)
    }

    pub async fn conditions(
        &self,
        principal: &PrincipalContext,
    ) -> Result<Vec<Condition>, RepositoryError> {
        with_session!(self, principal, session => session.conditions().await)
    }

    pub async fn add_condition(
        &self,
        principal: &PrincipalContext,
        new: NewCondition,
    ) -> Result<Condition, RepositoryError> {
        with_session!(self, principal, session => session.add_condition(new).await)
    }

    pub async fn statuses(
        &self,
        principal: &PrincipalContext,
    ) -> Result<Vec<ActionStatus>, RepositoryError> {
        with_session!(self, principal, session => session.statuses().await)
    }

    pub async fn add_status(
        &self,
        principal: &PrincipalContext,
        new: NewActionStatus,
    ) -> Result<ActionStatus, RepositoryError> {
        with_session!(self, principal, session => session.add_status(new).await)
    }

    pub async fn recipients(
        &self,
        principal: &PrincipalContext,
    ) -> Result<Vec<Recipient>, RepositoryError> {
        with_session!(self, principal, session => session.recipients().await)
    }

    pub async fn add_recipient(
        &self,
        principal: &PrincipalContext,
        new: NewRecipient,
    ) -> Result<Recipient, RepositoryError> {
        with_session!(self, principal, session => session.add_recipient(new).await)
    }

    pub async fn purchase_orders(
        &self,
        principal: &PrincipalContext,
    ) -> Result<Vec<PurchaseOrder>, RepositoryError> {
        with_session!(self, principal, session => session.purchase_orders().await)
    }

    pub async fn add_purchase_order(
        &self,
        principal: &PrincipalContext,
        new: NewPurchaseOrder,
    ) -> Result<PurchaseOrder, RepositoryError> {
        with_session!(self, principal, session => session.add_purchase_order(new).await)
    }

    pub async fn linked_purchase_orders(
        &self,
        principal: &PrincipalContext,
    ) -> Result<Vec<PurchaseOrder>, RepositoryError> {
        with_session!(self, principal, session => session.linked_purchase_orders().await)
    }
}

struct BroadcastSink {
    tx: broadcast::Sender<Notification>,
}

impl NotificationSink for BroadcastSink {
    fn publish(&self, notification: Notification) {
        // No subscribers is fine; notifications are fire-and-forget.
        let _ = self.tx.send(notification);
    }
}
