//! Postgres-backed store implementation.
//!
//! The database enforces the contracts callers rely on: the primary key on
//! `items.item_no` arbitrates identifier uniqueness (concurrent allocation
//! surfaces as a 23505 unique violation mapped to [`StoreError::Conflict`]),
//! and `transaction_log` has no UPDATE/DELETE path here at all. Schema DDL
//! lives in `schema.sql` next to this crate.

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

use assetdesk_core::{
    ActionId, ConditionId, DepartmentId, ItemNo, LedgerEntryId, PoNumber, RecipientId, UserId,
};
use assetdesk_inventory::{
    ActionStatus, Activity, Condition, Department, Item, ItemFilter, LedgerEntry, PurchaseOrder,
    Recipient,
};

use super::r#trait::{CatalogStore, ItemStore, LedgerStore, StoreError};

/// Postgres-backed relational store.
///
/// Thread-safe via the SQLx connection pool; every operation is a single
/// round trip (no client-side transactions are needed because each mutation
/// touches one row and ordering across tables is the repository's concern).
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: Arc<PgPool>,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }
}

/// SQLx → StoreError mapping.
///
/// | Postgres code | StoreError    | Scenario                                |
/// |---------------|---------------|-----------------------------------------|
/// | 23505         | `Conflict`    | unique violation (item_no, po_no)       |
/// | 23503 / 23514 | `Invalid`     | constraint violation (bad data)         |
/// | RowNotFound   | `NotFound`    | targeted row absent                     |
/// | anything else | `Unavailable` | transport/pool failure, retryable       |
fn map_sqlx_error(op: &'static str, e: sqlx::Error) -> StoreError {
    match &e {
        sqlx::Error::RowNotFound => StoreError::NotFound,
        sqlx::Error::Database(db) => match db.code().as_deref() {
            Some("23505") => StoreError::Conflict(format!("{op}: {}", db.message())),
            Some("23503") | Some("23514") => StoreError::Invalid(format!("{op}: {}", db.message())),
            _ => StoreError::Unavailable(format!("{op}: {}", db.message())),
        },
        _ => StoreError::Unavailable(format!("{op}: {e}")),
    }
}

fn parse_item_no(raw: &str) -> Result<ItemNo, StoreError> {
    ItemNo::from_str(raw).map_err(|e| StoreError::Invalid(e.to_string()))
}

fn parse_po_no(raw: Option<String>) -> Result<Option<PoNumber>, StoreError> {
    raw.map(PoNumber::new)
        .transpose()
        .map_err(|e| StoreError::Invalid(e.to_string()))
}

fn parse_activity(raw: &str) -> Result<Activity, StoreError> {
    match raw {
        "create" => Ok(Activity::Create),
        "update" => Ok(Activity::Update),
        "delete" => Ok(Activity::Delete),
        other => Err(StoreError::Invalid(format!(
            "unknown ledger activity: {other:?}"
        ))),
    }
}

fn item_from_row(row: &PgRow) -> Result<Item, StoreError> {
    let get = |e: sqlx::Error| StoreError::Invalid(format!("items row: {e}"));

    let item_no: String = row.try_get("item_no").map_err(get)?;
    Ok(Item {
        item_no: parse_item_no(&item_no)?,
        name: row.try_get("name").map_err(get)?,
        property_no: row.try_get("property_no").map_err(get)?,
        location: row.try_get("location").map_err(get)?,
        serial_no: row.try_get("serial_no").map_err(get)?,
        model_brand: row.try_get("model_brand").map_err(get)?,
        date_acquired: row
            .try_get::<Option<NaiveDate>, _>("date_acquired")
            .map_err(get)?,
        status: row
            .try_get::<Option<Uuid>, _>("status")
            .map_err(get)?
            .map(ActionId::from_uuid),
        condition_id: row
            .try_get::<Option<Uuid>, _>("condition_id")
            .map_err(get)?
            .map(ConditionId::from_uuid),
        dept_id: row
            .try_get::<Option<Uuid>, _>("dept_id")
            .map_err(get)?
            .map(DepartmentId::from_uuid),
        indiv_txn_id: row
            .try_get::<Option<Uuid>, _>("indiv_txn_id")
            .map_err(get)?
            .map(RecipientId::from_uuid),
        po_no: parse_po_no(row.try_get("po_no").map_err(get)?)?,
        created_at: row.try_get("created_at").map_err(get)?,
        updated_at: row.try_get("updated_at").map_err(get)?,
        deleted_at: row
            .try_get::<Option<DateTime<Utc>>, _>("deleted_at")
            .map_err(get)?,
    })
}

fn ledger_entry_from_row(row: &PgRow) -> Result<LedgerEntry, StoreError> {
    let get = |e: sqlx::Error| StoreError::Invalid(format!("transaction_log row: {e}"));

    let item_no: String = row.try_get("item_no").map_err(get)?;
    let activity: String = row.try_get("activity").map_err(get)?;
    Ok(LedgerEntry {
        id: LedgerEntryId::from_uuid(row.try_get("id").map_err(get)?),
        item_no: parse_item_no(&item_no)?,
        activity: parse_activity(&activity)?,
        action_id: row
            .try_get::<Option<Uuid>, _>("action_id")
            .map_err(get)?
            .map(ActionId::from_uuid),
        dept_id: row
            .try_get::<Option<Uuid>, _>("dept_id")
            .map_err(get)?
            .map(DepartmentId::from_uuid),
        indiv_txn_id: row
            .try_get::<Option<Uuid>, _>("indiv_txn_id")
            .map_err(get)?
            .map(RecipientId::from_uuid),
        po_no: parse_po_no(row.try_get("po_no").map_err(get)?)?,
        user_id: row
            .try_get::<Option<Uuid>, _>("user_id")
            .map_err(get)?
            .map(UserId::from_uuid),
        date: row.try_get("date").map_err(get)?,
    })
}

/// Built WHERE clause + the order its parameters must be bound in.
struct ActiveFilterSql {
    clause: String,
    pattern: Option<String>,
    department: Option<Uuid>,
    status: Option<Uuid>,
    next_arg: usize,
}

fn active_filter_sql(filter: &ItemFilter) -> ActiveFilterSql {
    let mut conditions = vec!["deleted_at IS NULL".to_string()];
    let mut next_arg = 1;

    let pattern = filter.normalized_query().map(|q| format!("%{q}%"));
    if pattern.is_some() {
        conditions.push(format!(
            "(name ILIKE ${n} OR item_no ILIKE ${n} OR property_no ILIKE ${n} OR model_brand ILIKE ${n})",
            n = next_arg
        ));
        next_arg += 1;
    }
    if filter.department.is_some() {
        conditions.push(format!("dept_id = ${next_arg}"));
        next_arg += 1;
    }
    if filter.status.is_some() {
        conditions.push(format!("status = ${next_arg}"));
        next_arg += 1;
    }

    ActiveFilterSql {
        clause: conditions.join(" AND "),
        pattern,
        department: filter.department.map(|d| *d.as_uuid()),
        status: filter.status.map(|s| *s.as_uuid()),
        next_arg,
    }
}

fn bind_filter<'q>(
    query: sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments>,
    sql: &'q ActiveFilterSql,
) -> sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments> {
    let mut query = query;
    if let Some(pattern) = &sql.pattern {
        query = query.bind(pattern);
    }
    if let Some(dept) = sql.department {
        query = query.bind(dept);
    }
    if let Some(status) = sql.status {
        query = query.bind(status);
    }
    query
}

#[async_trait]
impl ItemStore for PostgresStore {
    #[instrument(skip(self, item), fields(item_no = %item.item_no), err)]
    async fn insert_item(&self, item: Item) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO items (
                item_no, name, property_no, location, serial_no, model_brand,
                date_acquired, status, condition_id, dept_id, indiv_txn_id, po_no,
                created_at, updated_at, deleted_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            "#,
        )
        .bind(item.item_no.to_string())
        .bind(&item.name)
        .bind(&item.property_no)
        .bind(&item.location)
        .bind(&item.serial_no)
        .bind(&item.model_brand)
        .bind(item.date_acquired)
        .bind(item.status.map(|v| *v.as_uuid()))
        .bind(item.condition_id.map(|v| *v.as_uuid()))
        .bind(item.dept_id.map(|v| *v.as_uuid()))
        .bind(item.indiv_txn_id.map(|v| *v.as_uuid()))
        .bind(item.po_no.as_ref().map(|v| v.as_str().to_string()))
        .bind(item.created_at)
        .bind(item.updated_at)
        .bind(item.deleted_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_item", e))?;
        Ok(())
    }

    #[instrument(skip(self), fields(item_no = %item_no), err)]
    async fn fetch_item(&self, item_no: &ItemNo) -> Result<Option<Item>, StoreError> {
        let row = sqlx::query("SELECT * FROM items WHERE item_no = $1")
            .bind(item_no.to_string())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("fetch_item", e))?;

        row.as_ref().map(item_from_row).transpose()
    }

    #[instrument(skip(self, item), fields(item_no = %item.item_no), err)]
    async fn update_item(&self, item: Item) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE items SET
                name = $2, property_no = $3, location = $4, serial_no = $5,
                model_brand = $6, date_acquired = $7, status = $8, condition_id = $9,
                dept_id = $10, indiv_txn_id = $11, po_no = $12, updated_at = $13
            WHERE item_no = $1
            "#,
        )
        .bind(item.item_no.to_string())
        .bind(&item.name)
        .bind(&item.property_no)
        .bind(&item.location)
        .bind(&item.serial_no)
        .bind(&item.model_brand)
        .bind(item.date_acquired)
        .bind(item.status.map(|v| *v.as_uuid()))
        .bind(item.condition_id.map(|v| *v.as_uuid()))
        .bind(item.dept_id.map(|v| *v.as_uuid()))
        .bind(item.indiv_txn_id.map(|v| *v.as_uuid()))
        .bind(item.po_no.as_ref().map(|v| v.as_str().to_string()))
        .bind(item.updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_item", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    #[instrument(skip(self), fields(item_no = %item_no), err)]
    async fn mark_deleted(&self, item_no: &ItemNo, at: DateTime<Utc>) -> Result<(), StoreError> {
        let result =
            sqlx::query("UPDATE items SET deleted_at = $2 WHERE item_no = $1 AND deleted_at IS NULL")
                .bind(item_no.to_string())
                .bind(at)
                .execute(&*self.pool)
                .await
                .map_err(|e| map_sqlx_error("mark_deleted", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    #[instrument(skip(self, filter), err)]
    async fn list_active(
        &self,
        filter: &ItemFilter,
        offset: u64,
        limit: u64,
    ) -> Result<(Vec<Item>, u64), StoreError> {
        let sql = active_filter_sql(filter);

        let count_sql = format!("SELECT COUNT(*) FROM items WHERE {}", sql.clause);
        let total: i64 = bind_filter(sqlx::query(&count_sql), &sql)
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_active.count", e))?
            .try_get(0)
            .map_err(|e| StoreError::Invalid(format!("count row: {e}")))?;

        let page_sql = format!(
            "SELECT * FROM items WHERE {} ORDER BY updated_at DESC, item_no DESC LIMIT ${} OFFSET ${}",
            sql.clause,
            sql.next_arg,
            sql.next_arg + 1
        );
        let rows = bind_filter(sqlx::query(&page_sql), &sql)
            .bind(limit as i64)
            .bind(offset as i64)
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_active.page", e))?;

        let items = rows
            .iter()
            .map(item_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((items, total.max(0) as u64))
    }

    #[instrument(skip(self), err)]
    async fn max_suffix(&self, year: u8) -> Result<Option<u32>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT MAX((split_part(item_no, '-', 3))::int)
            FROM items
            WHERE split_part(item_no, '-', 2) = $1
            "#,
        )
        .bind(format!("{year:02}"))
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("max_suffix", e))?;

        let max: Option<i32> = row
            .try_get(0)
            .map_err(|e| StoreError::Invalid(format!("max row: {e}")))?;
        Ok(max.map(|v| v.max(0) as u32))
    }

    #[instrument(skip(self), err)]
    async fn active_po_numbers(&self) -> Result<Vec<PoNumber>, StoreError> {
        let rows = sqlx::query(
            "SELECT DISTINCT po_no FROM items WHERE deleted_at IS NULL AND po_no IS NOT NULL ORDER BY po_no",
        )
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("active_po_numbers", e))?;

        rows.iter()
            .map(|row| {
                let raw: String = row
                    .try_get("po_no")
                    .map_err(|e| StoreError::Invalid(format!("po row: {e}")))?;
                PoNumber::new(raw).map_err(|e| StoreError::Invalid(e.to_string()))
            })
            .collect()
    }
}

#[async_trait]
impl LedgerStore for PostgresStore {
    #[instrument(skip(self, entry), fields(item_no = %entry.item_no, activity = %entry.activity), err)]
    async fn append_entry(&self, entry: LedgerEntry) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO transaction_log (
                id, item_no, activity, action_id, dept_id, indiv_txn_id, po_no, user_id, date
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(*entry.id.as_uuid())
        .bind(entry.item_no.to_string())
        .bind(entry.activity.as_str())
        .bind(entry.action_id.map(|v| *v.as_uuid()))
        .bind(entry.dept_id.map(|v| *v.as_uuid()))
        .bind(entry.indiv_txn_id.map(|v| *v.as_uuid()))
        .bind(entry.po_no.as_ref().map(|v| v.as_str().to_string()))
        .bind(entry.user_id.map(|v| *v.as_uuid()))
        .bind(entry.date)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("append_entry", e))?;
        Ok(())
    }

    #[instrument(skip(self), fields(item_no = %item_no), err)]
    async fn entries_for_item(&self, item_no: &ItemNo) -> Result<Vec<LedgerEntry>, StoreError> {
        let rows =
            sqlx::query("SELECT * FROM transaction_log WHERE item_no = $1 ORDER BY date DESC, id DESC")
                .bind(item_no.to_string())
                .fetch_all(&*self.pool)
                .await
                .map_err(|e| map_sqlx_error("entries_for_item", e))?;

        rows.iter().map(ledger_entry_from_row).collect()
    }
}

#[async_trait]
impl CatalogStore for PostgresStore {
    async fn insert_department(&self, dept: Department) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO department (dept_id, dept_name) VALUES ($1, $2)")
            .bind(*dept.id.as_uuid())
            .bind(&dept.name)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("insert_department", e))?;
        Ok(())
    }

    async fn list_departments(&self) -> Result<Vec<Department>, StoreError> {
        let rows = sqlx::query("SELECT dept_id, dept_name FROM department ORDER BY dept_name")
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_departments", e))?;
        rows.iter().map(department_from_row).collect()
    }

    async fn insert_condition(&self, condition: Condition) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO condition (id, condition_name) VALUES ($1, $2)")
            .bind(*condition.id.as_uuid())
            .bind(&condition.name)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("insert_condition", e))?;
        Ok(())
    }

    async fn list_conditions(&self) -> Result<Vec<Condition>, StoreError> {
        let rows = sqlx::query("SELECT id, condition_name FROM condition ORDER BY condition_name")
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_conditions", e))?;
        rows.iter().map(condition_from_row).collect()
    }

    async fn insert_action(&self, action: ActionStatus) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO action (action_id, action_name) VALUES ($1, $2)")
            .bind(*action.id.as_uuid())
            .bind(&action.name)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("insert_action", e))?;
        Ok(())
    }

    async fn find_action_by_name(&self, name: &str) -> Result<Option<ActionStatus>, StoreError> {
        let row = sqlx::query("SELECT action_id, action_name FROM action WHERE action_name = $1")
            .bind(name)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_action_by_name", e))?;
        row.map(|r| action_from_row(&r)).transpose()
    }

    async fn list_actions(&self) -> Result<Vec<ActionStatus>, StoreError> {
        let rows = sqlx::query("SELECT action_id, action_name FROM action ORDER BY action_name")
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_actions", e))?;
        rows.iter().map(action_from_row).collect()
    }

    async fn insert_recipient(&self, recipient: Recipient) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO individual_transaction (indiv_txn_id, recipient_name, dept_position, remarks)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(*recipient.id.as_uuid())
        .bind(&recipient.name)
        .bind(&recipient.position)
        .bind(&recipient.remarks)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_recipient", e))?;
        Ok(())
    }

    async fn list_recipients(&self) -> Result<Vec<Recipient>, StoreError> {
        let rows = sqlx::query(
            "SELECT indiv_txn_id, recipient_name, dept_position, remarks FROM individual_transaction ORDER BY recipient_name",
        )
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_recipients", e))?;
        rows.iter().map(recipient_from_row).collect()
    }

    async fn insert_purchase_order(&self, po: PurchaseOrder) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO purchase_order (po_no, supplier, total_amount_cents, order_date)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(po.po_no.as_str())
        .bind(&po.supplier)
        .bind(po.total_amount_cents)
        .bind(po.order_date)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_purchase_order", e))?;
        Ok(())
    }

    async fn get_purchase_order(
        &self,
        po_no: &PoNumber,
    ) -> Result<Option<PurchaseOrder>, StoreError> {
        let row = sqlx::query(
            "SELECT po_no, supplier, total_amount_cents, order_date FROM purchase_order WHERE po_no = $1",
        )
        .bind(po_no.as_str())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_purchase_order", e))?;
        row.map(|r| purchase_order_from_row(&r)).transpose()
    }

    async fn list_purchase_orders(&self) -> Result<Vec<PurchaseOrder>, StoreError> {
        let rows = sqlx::query(
            "SELECT po_no, supplier, total_amount_cents, order_date FROM purchase_order ORDER BY po_no",
        )
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_purchase_orders", e))?;
        rows.iter().map(purchase_order_from_row).collect()
    }
}

fn department_from_row(row: &PgRow) -> Result<Department, StoreError> {
    let get = |e: sqlx::Error| StoreError::Invalid(format!("department row: {e}"));
    Ok(Department {
        id: DepartmentId::from_uuid(row.try_get("dept_id").map_err(get)?),
        name: row.try_get("dept_name").map_err(get)?,
    })
}

fn condition_from_row(row: &PgRow) -> Result<Condition, StoreError> {
    let get = |e: sqlx::Error| StoreError::Invalid(format!("condition row: {e}"));
    Ok(Condition {
        id: ConditionId::from_uuid(row.try_get("id").map_err(get)?),
        name: row.try_get("condition_name").map_err(get)?,
    })
}

fn action_from_row(row: &PgRow) -> Result<ActionStatus, StoreError> {
    let get = |e: sqlx::Error| StoreError::Invalid(format!("action row: {e}"));
    Ok(ActionStatus {
        id: ActionId::from_uuid(row.try_get("action_id").map_err(get)?),
        name: row.try_get("action_name").map_err(get)?,
    })
}

fn recipient_from_row(row: &PgRow) -> Result<Recipient, StoreError> {
    let get = |e: sqlx::Error| StoreError::Invalid(format!("individual_transaction row: {e}"));
    Ok(Recipient {
        id: RecipientId::from_uuid(row.try_get("indiv_txn_id").map_err(get)?),
        name: row.try_get("recipient_name").map_err(get)?,
        position: row.try_get("dept_position").map_err(get)?,
        remarks: row.try_get("remarks").map_err(get)?,
    })
}

fn purchase_order_from_row(row: &PgRow) -> Result<PurchaseOrder, StoreError> {
    let get = |e: sqlx::Error| StoreError::Invalid(format!("purchase_order row: {e}"));
    let raw: String = row.try_get("po_no").map_err(get)?;
    Ok(PurchaseOrder {
        po_no: PoNumber::new(raw).map_err(|e| StoreError::Invalid(e.to_string()))?,
        supplier: row.try_get("supplier").map_err(get)?,
        total_amount_cents: row.try_get("total_amount_cents").map_err(get)?,
        order_date: row.try_get("order_date").map_err(get)?,
    })
}
