//! # Table Group Repository
//!
//! Group formation and dissolution, each as one transaction.
//!
//! ## Save
//! ```text
//! BEGIN
//!   INSERT table_groups, table_group_members
//!   for each member:
//!     UPDATE order_tables SET table_group_id = ?, empty = ?, ...
//!      WHERE id = ? AND table_group_id IS NULL AND empty = 1
//!     0 rows → ROLLBACK, Conflict
//! COMMIT
//! ```
//!
//! ## Ungroup
//! ```text
//! BEGIN
//!   any non-COMPLETION order on a member?  → ROLLBACK, OrdersNotCompleted
//!   for each member:
//!     UPDATE order_tables SET table_group_id = NULL
//!      WHERE id = ? AND table_group_id = ?
//!     0 rows → ROLLBACK, Conflict
//! COMMIT
//! ```
//! The `table_groups` row and its member list stay as history.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use kitchen_core::ports;
use kitchen_core::{CoreError, CoreResult, OrderTable, TableGroup};
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};

#[derive(Debug, sqlx::FromRow)]
struct TableGroupRow {
    id: String,
    created_date: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct TableGroupRepository {
    pool: SqlitePool,
}

impl TableGroupRepository {
    pub fn new(pool: SqlitePool) -> Self {
        TableGroupRepository { pool }
    }

    /// Inserts the group and writes its already-joined members.
    ///
    /// ## Returns
    /// * `Ok(TableGroup)` - Group and every member written
    /// * `Err(DbError::Conflict)` - A member was no longer empty and ungrouped;
    ///   nothing was written
    pub async fn insert(&self, table_group: &TableGroup, members: &[OrderTable]) -> DbResult<TableGroup> {
        debug!(id = %table_group.id, members = members.len(), "Saving table group");

        let mut tx = self.pool.begin().await?;

        sqlx::query("INSERT INTO table_groups (id, created_date) VALUES (?1, ?2)")
            .bind(&table_group.id)
            .bind(table_group.created_date)
            .execute(&mut *tx)
            .await?;

        for (index, order_table_id) in table_group.order_table_ids.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO table_group_members (table_group_id, seq, order_table_id)
                VALUES (?1, ?2, ?3)
                "#,
            )
            .bind(&table_group.id)
            .bind(index as i64 + 1)
            .bind(order_table_id)
            .execute(&mut *tx)
            .await?;
        }

        for member in members {
            let result = sqlx::query(
                r#"
                UPDATE order_tables
                SET table_group_id = ?1, empty = ?2, number_of_guests = ?3
                WHERE id = ?4 AND table_group_id IS NULL AND empty = 1
                "#,
            )
            .bind(&member.table_group_id)
            .bind(member.empty)
            .bind(member.number_of_guests)
            .bind(&member.id)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                warn!(order_table_id = %member.id, "Table changed before grouping, rolling back");
                return Err(DbError::conflict("OrderTable", &member.id));
            }
        }

        tx.commit().await?;

        info!(id = %table_group.id, "Table group stored");
        Ok(table_group.clone())
    }

    /// Clears membership on every member after re-checking their orders.
    pub async fn remove_members(&self, table_group_id: &str, members: &[OrderTable]) -> CoreResult<()> {
        debug!(id = %table_group_id, members = members.len(), "Ungrouping tables");

        let mut tx = self.pool.begin().await.map_err(DbError::from)?;

        let open_orders: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM orders o
                JOIN order_tables t ON t.id = o.order_table_id
                WHERE t.table_group_id = ?1 AND o.order_status <> 'COMPLETION'
            )
            "#,
        )
        .bind(table_group_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(DbError::from)?;

        if open_orders {
            warn!(id = %table_group_id, "Order opened before ungrouping, rolling back");
            return Err(CoreError::OrdersNotCompleted(table_group_id.to_string()));
        }

        for member in members {
            let result = sqlx::query(
                "UPDATE order_tables SET table_group_id = NULL WHERE id = ?1 AND table_group_id = ?2",
            )
            .bind(&member.id)
            .bind(table_group_id)
            .execute(&mut *tx)
            .await
            .map_err(DbError::from)?;

            if result.rows_affected() == 0 {
                return Err(DbError::conflict("OrderTable", &member.id).into());
            }
        }

        tx.commit().await.map_err(DbError::from)?;

        Ok(())
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<TableGroup>> {
        let row = sqlx::query_as::<_, TableGroupRow>(
            "SELECT id, created_date FROM table_groups WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let order_table_ids: Vec<String> = sqlx::query_scalar(
            "SELECT order_table_id FROM table_group_members WHERE table_group_id = ?1 ORDER BY seq",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(TableGroup {
            id: row.id,
            created_date: row.created_date,
            order_table_ids,
        }))
    }
}

#[async_trait]
impl ports::TableGroupRepository for TableGroupRepository {
    async fn save(&self, table_group: &TableGroup, members: &[OrderTable]) -> CoreResult<TableGroup> {
        Ok(self.insert(table_group, members).await?)
    }

    async fn ungroup(&self, table_group_id: &str, members: &[OrderTable]) -> CoreResult<()> {
        self.remove_members(table_group_id, members).await
    }

    async fn find_by_id(&self, id: &str) -> CoreResult<Option<TableGroup>> {
        Ok(self.get_by_id(id).await?)
    }
}
