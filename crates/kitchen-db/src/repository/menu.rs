//! # Menu Repository
//!
//! Menus and their menu products.
//!
//! ```text
//! menus (1) ────< menu_products (n)     PRIMARY KEY (menu_id, seq)
//! ```
//!
//! A menu and its lines are written in one transaction. The stored price is
//! returned as-is on every read.

use std::collections::HashMap;

use async_trait::async_trait;
use kitchen_core::ports;
use kitchen_core::{CoreResult, Menu, MenuProduct};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use super::push_in_list;
use crate::error::DbResult;

#[derive(Debug, sqlx::FromRow)]
struct MenuRow {
    id: String,
    name: String,
    price_cents: i64,
    menu_group_id: String,
}

#[derive(Debug, sqlx::FromRow)]
struct MenuProductRow {
    menu_id: String,
    seq: i64,
    product_id: String,
    quantity: i64,
}

impl From<MenuProductRow> for MenuProduct {
    fn from(row: MenuProductRow) -> Self {
        MenuProduct {
            seq: row.seq,
            menu_id: row.menu_id,
            product_id: row.product_id,
            quantity: row.quantity,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MenuRepository {
    pool: SqlitePool,
}

impl MenuRepository {
    pub fn new(pool: SqlitePool) -> Self {
        MenuRepository { pool }
    }

    /// Writes the menu and replaces its menu products, atomically.
    pub async fn insert(&self, menu: &Menu) -> DbResult<Menu> {
        debug!(id = %menu.id, lines = menu.menu_products.len(), "Saving menu");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO menus (id, name, price_cents, menu_group_id)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                price_cents = excluded.price_cents,
                menu_group_id = excluded.menu_group_id
            "#,
        )
        .bind(&menu.id)
        .bind(&menu.name)
        .bind(menu.price_cents)
        .bind(&menu.menu_group_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM menu_products WHERE menu_id = ?1")
            .bind(&menu.id)
            .execute(&mut *tx)
            .await?;

        for line in &menu.menu_products {
            sqlx::query(
                r#"
                INSERT INTO menu_products (menu_id, seq, product_id, quantity)
                VALUES (?1, ?2, ?3, ?4)
                "#,
            )
            .bind(&menu.id)
            .bind(line.seq)
            .bind(&line.product_id)
            .bind(line.quantity)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(menu.clone())
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Menu>> {
        let row = sqlx::query_as::<_, MenuRow>(
            "SELECT id, name, price_cents, menu_group_id FROM menus WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(self.attach_menu_products(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    pub async fn list(&self) -> DbResult<Vec<Menu>> {
        let rows = sqlx::query_as::<_, MenuRow>(
            "SELECT id, name, price_cents, menu_group_id FROM menus ORDER BY name, id",
        )
        .fetch_all(&self.pool)
        .await?;

        self.attach_menu_products(rows).await
    }

    async fn attach_menu_products(&self, rows: Vec<MenuRow>) -> DbResult<Vec<Menu>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let lines = {
            let mut builder = QueryBuilder::<Sqlite>::new(
                "SELECT menu_id, seq, product_id, quantity FROM menu_products WHERE menu_id IN ",
            );
            push_in_list(&mut builder, rows.iter().map(|r| r.id.as_str()));
            builder.push(" ORDER BY menu_id, seq");

            builder
                .build_query_as::<MenuProductRow>()
                .fetch_all(&self.pool)
                .await?
        };

        let mut by_menu: HashMap<String, Vec<MenuProduct>> = HashMap::new();
        for line in lines {
            by_menu
                .entry(line.menu_id.clone())
                .or_default()
                .push(MenuProduct::from(line));
        }

        Ok(rows
            .into_iter()
            .map(|row| Menu {
                menu_products: by_menu.remove(&row.id).unwrap_or_default(),
                id: row.id,
                name: row.name,
                price_cents: row.price_cents,
                menu_group_id: row.menu_group_id,
            })
            .collect())
    }
}

#[async_trait]
impl ports::MenuRepository for MenuRepository {
    async fn save(&self, menu: &Menu) -> CoreResult<Menu> {
        Ok(self.insert(menu).await?)
    }

    async fn find_by_id(&self, id: &str) -> CoreResult<Option<Menu>> {
        Ok(self.get_by_id(id).await?)
    }

    async fn find_all(&self) -> CoreResult<Vec<Menu>> {
        Ok(self.list().await?)
    }
}

#[cfg(test)]
mod tests {
    use kitchen_core::{MenuGroup, Money, Product};

    use crate::{Database, DbConfig};

    use super::*;

    async fn setup() -> (Database, MenuGroup, Product, Product) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let group = MenuGroup::new("Two Chickens").unwrap();
        let fried = Product::new("Fried Chicken", Money::from_cents(16000)).unwrap();
        let spicy = Product::new("Spicy Chicken", Money::from_cents(16000)).unwrap();
        db.menu_groups().insert(&group).await.unwrap();
        db.products().insert(&fried).await.unwrap();
        db.products().insert(&spicy).await.unwrap();
        (db, group, fried, spicy)
    }

    #[tokio::test]
    async fn test_insert_and_read_back_lines() {
        let (db, group, fried, spicy) = setup().await;
        let menu = Menu::new(
            "Fried + Spicy",
            Money::from_cents(30000),
            group.id.clone(),
            vec![
                MenuProduct::new(fried.id.clone(), 1).unwrap(),
                MenuProduct::new(spicy.id.clone(), 1).unwrap(),
            ],
        )
        .unwrap();

        db.menus().insert(&menu).await.unwrap();

        let stored = db.menus().get_by_id(&menu.id).await.unwrap().unwrap();
        assert_eq!(stored, menu);
        assert_eq!(db.menus().list().await.unwrap(), vec![menu]);
        assert!(db.menus().get_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_failed_line_rolls_back_menu() {
        let (db, group, fried, _) = setup().await;
        let menu = Menu::new(
            "Broken",
            Money::from_cents(100),
            group.id.clone(),
            vec![
                MenuProduct::new(fried.id.clone(), 1).unwrap(),
                MenuProduct::new("missing-product", 1).unwrap(),
            ],
        )
        .unwrap();

        let err = db.menus().insert(&menu).await.unwrap_err();
        assert!(matches!(err, crate::DbError::ForeignKeyViolation { .. }));
        assert!(db.menus().get_by_id(&menu.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_empty() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert!(db.menus().list().await.unwrap().is_empty());
    }
}
