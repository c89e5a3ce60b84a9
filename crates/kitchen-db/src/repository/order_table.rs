//! Order table persistence.
//!
//! State changes are guarded writes:
//! ```text
//! UPDATE order_tables SET number_of_guests = ?, empty = ?
//!  WHERE id = ? AND table_group_id IS <read> AND empty = <read>
//!    0 rows → Conflict
//! ```

use async_trait::async_trait;
use kitchen_core::ports;
use kitchen_core::{CoreResult, OrderTable};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::{debug, warn};

use super::push_in_list;
use crate::error::{DbError, DbResult};

const SELECT_ORDER_TABLE: &str =
    "SELECT id, table_group_id, number_of_guests, empty FROM order_tables";

#[derive(Debug, sqlx::FromRow)]
struct OrderTableRow {
    id: String,
    table_group_id: Option<String>,
    number_of_guests: i32,
    empty: bool,
}

impl From<OrderTableRow> for OrderTable {
    fn from(row: OrderTableRow) -> Self {
        OrderTable {
            id: row.id,
            table_group_id: row.table_group_id,
            number_of_guests: row.number_of_guests,
            empty: row.empty,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OrderTableRepository {
    pool: SqlitePool,
}

impl OrderTableRepository {
    pub fn new(pool: SqlitePool) -> Self {
        OrderTableRepository { pool }
    }

    /// Inserts a table, or overwrites every column of the row with the same id.
    pub async fn insert(&self, order_table: &OrderTable) -> DbResult<OrderTable> {
        debug!(id = %order_table.id, empty = order_table.empty, "Saving order table");

        sqlx::query(
            r#"
            INSERT INTO order_tables (id, table_group_id, number_of_guests, empty)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(id) DO UPDATE SET
                table_group_id = excluded.table_group_id,
                number_of_guests = excluded.number_of_guests,
                empty = excluded.empty
            "#,
        )
        .bind(&order_table.id)
        .bind(&order_table.table_group_id)
        .bind(order_table.number_of_guests)
        .bind(order_table.empty)
        .execute(&self.pool)
        .await?;

        Ok(order_table.clone())
    }

    /// Writes guest count and empty flag if the row still matches `read`.
    ///
    /// ## Returns
    /// * `Ok(OrderTable)` - The table as written
    /// * `Err(DbError::Conflict)` - Group membership or empty flag changed
    ///   since `read`; nothing was written
    pub async fn write_state(&self, read: &OrderTable, changed: &OrderTable) -> DbResult<OrderTable> {
        debug!(
            id = %read.id,
            empty = changed.empty,
            number_of_guests = changed.number_of_guests,
            "Updating order table state"
        );

        let result = sqlx::query(
            r#"
            UPDATE order_tables
            SET number_of_guests = ?1, empty = ?2
            WHERE id = ?3 AND table_group_id IS ?4 AND empty = ?5
            "#,
        )
        .bind(changed.number_of_guests)
        .bind(changed.empty)
        .bind(&read.id)
        .bind(&read.table_group_id)
        .bind(read.empty)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            warn!(id = %read.id, "Table changed since it was validated, write rejected");
            return Err(DbError::conflict("OrderTable", &read.id));
        }

        Ok(OrderTable {
            table_group_id: read.table_group_id.clone(),
            ..changed.clone()
        })
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<OrderTable>> {
        let row = sqlx::query_as::<_, OrderTableRow>(&format!("{SELECT_ORDER_TABLE} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(OrderTable::from))
    }

    /// Returns the tables among `ids` that exist, each once.
    pub async fn get_by_ids(&self, ids: &[String]) -> DbResult<Vec<OrderTable>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder = QueryBuilder::<Sqlite>::new(SELECT_ORDER_TABLE);
        builder.push(" WHERE id IN ");
        push_in_list(&mut builder, ids.iter().map(String::as_str));
        builder.push(" ORDER BY id");

        let rows = builder
            .build_query_as::<OrderTableRow>()
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(OrderTable::from).collect())
    }

    pub async fn list_by_table_group(&self, table_group_id: &str) -> DbResult<Vec<OrderTable>> {
        let rows = sqlx::query_as::<_, OrderTableRow>(&format!(
            "{SELECT_ORDER_TABLE} WHERE table_group_id = ?1 ORDER BY id"
        ))
        .bind(table_group_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(OrderTable::from).collect())
    }

    pub async fn list(&self) -> DbResult<Vec<OrderTable>> {
        let rows = sqlx::query_as::<_, OrderTableRow>(&format!("{SELECT_ORDER_TABLE} ORDER BY id"))
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(OrderTable::from).collect())
    }
}

#[async_trait]
impl ports::OrderTableRepository for OrderTableRepository {
    async fn save(&self, order_table: &OrderTable) -> CoreResult<OrderTable> {
        Ok(self.insert(order_table).await?)
    }

    async fn update_state(&self, read: &OrderTable, changed: &OrderTable) -> CoreResult<OrderTable> {
        Ok(self.write_state(read, changed).await?)
    }

    async fn find_by_id(&self, id: &str) -> CoreResult<Option<OrderTable>> {
        Ok(self.get_by_id(id).await?)
    }

    async fn find_all_by_ids(&self, ids: &[String]) -> CoreResult<Vec<OrderTable>> {
        Ok(self.get_by_ids(ids).await?)
    }

    async fn find_all_by_table_group_id(&self, table_group_id: &str) -> CoreResult<Vec<OrderTable>> {
        Ok(self.list_by_table_group(table_group_id).await?)
    }

    async fn find_all(&self) -> CoreResult<Vec<OrderTable>> {
        Ok(self.list().await?)
    }
}
