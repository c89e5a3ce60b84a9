//! # Order Repository
//!
//! Orders and their line items.
//!
//! ## Guarded Writes
//! ```text
//! new id       INSERT INTO orders ... SELECT ...
//!               WHERE EXISTS (order_tables row with empty = 0)
//!                 0 rows → Conflict (table emptied meanwhile)
//!              then line items
//!
//! existing id  UPDATE orders SET order_status = ?
//!               WHERE id = ? AND order_status <> 'COMPLETION'
//!                 0 rows → Conflict (completed meanwhile)
//!              line items untouched
//! ```

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use kitchen_core::ports;
use kitchen_core::{CoreResult, Order, OrderLineItem, OrderStatus};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::{debug, warn};

use super::push_in_list;
use crate::error::{DbError, DbResult};

const SELECT_ORDER: &str = "SELECT id, order_table_id, order_status, ordered_time FROM orders";

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: String,
    order_table_id: String,
    order_status: OrderStatus,
    ordered_time: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct OrderLineItemRow {
    order_id: String,
    seq: i64,
    menu_id: String,
    quantity: i64,
}

impl From<OrderLineItemRow> for OrderLineItem {
    fn from(row: OrderLineItemRow) -> Self {
        OrderLineItem {
            seq: row.seq,
            order_id: row.order_id,
            menu_id: row.menu_id,
            quantity: row.quantity,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Inserts a new order with its line items, or updates the status of an
    /// existing one.
    ///
    /// ## Returns
    /// * `Ok(Order)` - The order as written
    /// * `Err(DbError::Conflict)` - The table of a new order is no longer
    ///   occupied, or the stored order is already COMPLETION
    pub async fn upsert(&self, order: &Order) -> DbResult<Order> {
        debug!(id = %order.id, status = order.order_status.as_str(), "Saving order");

        let mut tx = self.pool.begin().await?;

        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM orders WHERE id = ?1)")
            .bind(&order.id)
            .fetch_one(&mut *tx)
            .await?;

        if exists {
            let result = sqlx::query(
                r#"
                UPDATE orders SET order_status = ?1
                WHERE id = ?2 AND order_status <> 'COMPLETION'
                "#,
            )
            .bind(order.order_status)
            .bind(&order.id)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                warn!(id = %order.id, "Order already completed, write rejected");
                return Err(DbError::conflict("Order", &order.id));
            }

            tx.commit().await?;
            return Ok(order.clone());
        }

        let result = sqlx::query(
            r#"
            INSERT INTO orders (id, order_table_id, order_status, ordered_time)
            SELECT ?1, ?2, ?3, ?4
            WHERE EXISTS (SELECT 1 FROM order_tables WHERE id = ?2 AND empty = 0)
            "#,
        )
        .bind(&order.id)
        .bind(&order.order_table_id)
        .bind(order.order_status)
        .bind(order.ordered_time)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            warn!(
                id = %order.id,
                order_table_id = %order.order_table_id,
                "Order table no longer occupied, write rejected"
            );
            return Err(DbError::conflict("OrderTable", &order.order_table_id));
        }

        for item in &order.order_line_items {
            sqlx::query(
                r#"
                INSERT INTO order_line_items (order_id, seq, menu_id, quantity)
                VALUES (?1, ?2, ?3, ?4)
                "#,
            )
            .bind(&order.id)
            .bind(item.seq)
            .bind(&item.menu_id)
            .bind(item.quantity)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(order.clone())
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        let row = sqlx::query_as::<_, OrderRow>(&format!("{SELECT_ORDER} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(self.attach_line_items(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    pub async fn list_by_order_tables(&self, order_table_ids: &[String]) -> DbResult<Vec<Order>> {
        if order_table_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = {
            let mut builder = QueryBuilder::<Sqlite>::new(SELECT_ORDER);
            builder.push(" WHERE order_table_id IN ");
            push_in_list(&mut builder, order_table_ids.iter().map(String::as_str));
            builder.push(" ORDER BY ordered_time, id");

            builder
                .build_query_as::<OrderRow>()
                .fetch_all(&self.pool)
                .await?
        };

        self.attach_line_items(rows).await
    }

    /// True if the table has an order in any of `statuses`.
    pub async fn exists_with_status(
        &self,
        order_table_id: &str,
        statuses: &[OrderStatus],
    ) -> DbResult<bool> {
        if statuses.is_empty() {
            return Ok(false);
        }

        let mut builder = QueryBuilder::<Sqlite>::new(
            "SELECT EXISTS(SELECT 1 FROM orders WHERE order_table_id = ",
        );
        builder.push_bind(order_table_id.to_owned());
        builder.push(" AND order_status IN ");
        push_in_list(&mut builder, statuses.iter().map(OrderStatus::as_str));
        builder.push(")");

        let exists: bool = builder
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }

    pub async fn list(&self) -> DbResult<Vec<Order>> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!("{SELECT_ORDER} ORDER BY ordered_time, id"))
            .fetch_all(&self.pool)
            .await?;

        self.attach_line_items(rows).await
    }

    async fn attach_line_items(&self, rows: Vec<OrderRow>) -> DbResult<Vec<Order>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let items = {
            let mut builder = QueryBuilder::<Sqlite>::new(
                "SELECT order_id, seq, menu_id, quantity FROM order_line_items WHERE order_id IN ",
            );
            push_in_list(&mut builder, rows.iter().map(|r| r.id.as_str()));
            builder.push(" ORDER BY order_id, seq");

            builder
                .build_query_as::<OrderLineItemRow>()
                .fetch_all(&self.pool)
                .await?
        };

        let mut by_order: HashMap<String, Vec<OrderLineItem>> = HashMap::new();
        for item in items {
            by_order
                .entry(item.order_id.clone())
                .or_default()
                .push(OrderLineItem::from(item));
        }

        Ok(rows
            .into_iter()
            .map(|row| Order {
                order_line_items: by_order.remove(&row.id).unwrap_or_default(),
                id: row.id,
                order_table_id: row.order_table_id,
                order_status: row.order_status,
                ordered_time: row.ordered_time,
            })
            .collect())
    }
}

#[async_trait]
impl ports::OrderRepository for OrderRepository {
    async fn save(&self, order: &Order) -> CoreResult<Order> {
        Ok(self.upsert(order).await?)
    }

    async fn find_by_id(&self, id: &str) -> CoreResult<Option<Order>> {
        Ok(self.get_by_id(id).await?)
    }

    async fn find_all_by_order_table_ids(&self, order_table_ids: &[String]) -> CoreResult<Vec<Order>> {
        Ok(self.list_by_order_tables(order_table_ids).await?)
    }

    async fn exists_by_order_table_id_and_status_in(
        &self,
        order_table_id: &str,
        statuses: &[OrderStatus],
    ) -> CoreResult<bool> {
        Ok(self.exists_with_status(order_table_id, statuses).await?)
    }

    async fn find_all(&self) -> CoreResult<Vec<Order>> {
        Ok(self.list().await?)
    }
}

#[cfg(test)]
mod tests {
    use kitchen_core::{Menu, MenuGroup, MenuProduct, Money, OrderTable, Product};

    use crate::{Database, DbConfig};

    use super::*;

    struct Fixture {
        db: Database,
        menu: Menu,
        table: OrderTable,
    }

    async fn setup() -> Fixture {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let group = MenuGroup::new("One Chicken").unwrap();
        let product = Product::new("Fried Chicken", Money::from_cents(16000)).unwrap();
        let menu = Menu::new(
            "Fried Chicken",
            Money::from_cents(16000),
            group.id.clone(),
            vec![MenuProduct::new(product.id.clone(), 1).unwrap()],
        )
        .unwrap();
        let table = OrderTable::new(2, false).unwrap();

        db.menu_groups().insert(&group).await.unwrap();
        db.products().insert(&product).await.unwrap();
        db.menus().insert(&menu).await.unwrap();
        db.order_tables().insert(&table).await.unwrap();

        Fixture { db, menu, table }
    }

    fn new_order(f: &Fixture) -> Order {
        Order::new(
            f.table.id.clone(),
            vec![
                OrderLineItem::new(f.menu.id.clone(), 1).unwrap(),
                OrderLineItem::new(f.menu.id.clone(), 3).unwrap(),
            ],
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_read_back() {
        let f = setup().await;
        let order = new_order(&f);

        f.db.orders().upsert(&order).await.unwrap();

        let stored = f.db.orders().get_by_id(&order.id).await.unwrap().unwrap();
        assert_eq!(stored.order_status, OrderStatus::Cooking);
        assert_eq!(stored.ordered_time, order.ordered_time);
        assert_eq!(stored.order_line_items, order.order_line_items);
        assert_eq!(f.db.orders().list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_status_update_keeps_line_items() {
        let f = setup().await;
        let mut order = new_order(&f);
        f.db.orders().upsert(&order).await.unwrap();

        order.change_status(OrderStatus::Meal).unwrap();
        f.db.orders().upsert(&order).await.unwrap();

        let stored = f.db.orders().get_by_id(&order.id).await.unwrap().unwrap();
        assert_eq!(stored.order_status, OrderStatus::Meal);
        assert_eq!(stored.order_line_items.len(), 2);
    }

    #[tokio::test]
    async fn test_completed_order_is_not_overwritten() {
        let f = setup().await;
        let mut order = new_order(&f);
        f.db.orders().upsert(&order).await.unwrap();

        let mut stale = order.clone();
        order.change_status(OrderStatus::Completion).unwrap();
        f.db.orders().upsert(&order).await.unwrap();

        stale.change_status(OrderStatus::Meal).unwrap();
        let err = f.db.orders().upsert(&stale).await.unwrap_err();
        assert!(matches!(err, DbError::Conflict { .. }));

        let stored = f.db.orders().get_by_id(&order.id).await.unwrap().unwrap();
        assert_eq!(stored.order_status, OrderStatus::Completion);
    }

    #[tokio::test]
    async fn test_exists_with_status() {
        let f = setup().await;
        let mut order = new_order(&f);
        f.db.orders().upsert(&order).await.unwrap();

        let repo = f.db.orders();
        assert!(repo.exists_with_status(&f.table.id, &OrderStatus::ACTIVE).await.unwrap());
        assert!(!repo.exists_with_status(&f.table.id, &[]).await.unwrap());

        order.change_status(OrderStatus::Completion).unwrap();
        repo.upsert(&order).await.unwrap();
        assert!(!repo.exists_with_status(&f.table.id, &OrderStatus::ACTIVE).await.unwrap());
    }

    #[tokio::test]
    async fn test_list_by_order_tables() {
        let f = setup().await;
        let order = new_order(&f);
        f.db.orders().upsert(&order).await.unwrap();

        let repo = f.db.orders();
        let found = repo.list_by_order_tables(&[f.table.id.clone()]).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].order_line_items.len(), 2);

        assert!(repo.list_by_order_tables(&["other".to_string()]).await.unwrap().is_empty());
        assert!(repo.list_by_order_tables(&[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_order_for_unknown_menu_is_rolled_back() {
        let f = setup().await;
        let order = Order::new(
            f.table.id.clone(),
            vec![OrderLineItem::new("missing-menu", 1).unwrap()],
        )
        .unwrap();

        assert!(f.db.orders().upsert(&order).await.is_err());
        assert!(f.db.orders().get_by_id(&order.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_new_order_on_emptied_table_is_rejected() {
        let f = setup().await;
        let order = new_order(&f);

        // Emptied after the order was validated
        let mut emptied = f.table.clone();
        emptied.change_empty(true).unwrap();
        f.db.order_tables().write_state(&f.table, &emptied).await.unwrap();

        let err = f.db.orders().upsert(&order).await.unwrap_err();
        assert!(matches!(err, DbError::Conflict { ref entity, .. } if entity == "OrderTable"));
        assert!(f.db.orders().get_by_id(&order.id).await.unwrap().is_none());
        assert!(f.db.orders().list().await.unwrap().is_empty());
    }
}
