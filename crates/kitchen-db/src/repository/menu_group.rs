//! Menu group persistence.

use async_trait::async_trait;
use kitchen_core::ports;
use kitchen_core::{CoreResult, MenuGroup};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;

#[derive(Debug, sqlx::FromRow)]
struct MenuGroupRow {
    id: String,
    name: String,
}

impl From<MenuGroupRow> for MenuGroup {
    fn from(row: MenuGroupRow) -> Self {
        MenuGroup {
            id: row.id,
            name: row.name,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MenuGroupRepository {
    pool: SqlitePool,
}

impl MenuGroupRepository {
    pub fn new(pool: SqlitePool) -> Self {
        MenuGroupRepository { pool }
    }

    pub async fn insert(&self, menu_group: &MenuGroup) -> DbResult<MenuGroup> {
        debug!(id = %menu_group.id, "Saving menu group");

        sqlx::query(
            r#"
            INSERT INTO menu_groups (id, name)
            VALUES (?1, ?2)
            ON CONFLICT(id) DO UPDATE SET name = excluded.name
            "#,
        )
        .bind(&menu_group.id)
        .bind(&menu_group.name)
        .execute(&self.pool)
        .await?;

        Ok(menu_group.clone())
    }

    pub async fn exists(&self, id: &str) -> DbResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM menu_groups WHERE id = ?1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    pub async fn list(&self) -> DbResult<Vec<MenuGroup>> {
        let rows = sqlx::query_as::<_, MenuGroupRow>("SELECT id, name FROM menu_groups ORDER BY name, id")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(MenuGroup::from).collect())
    }
}

#[async_trait]
impl ports::MenuGroupRepository for MenuGroupRepository {
    async fn save(&self, menu_group: &MenuGroup) -> CoreResult<MenuGroup> {
        Ok(self.insert(menu_group).await?)
    }

    async fn exists_by_id(&self, id: &str) -> CoreResult<bool> {
        Ok(self.exists(id).await?)
    }

    async fn find_all(&self) -> CoreResult<Vec<MenuGroup>> {
        Ok(self.list().await?)
    }
}

#[cfg(test)]
mod tests {
    use crate::{Database, DbConfig};

    use super::*;

    #[tokio::test]
    async fn test_insert_exists_and_list() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.menu_groups();
        let group = MenuGroup::new("Two Chickens").unwrap();

        assert!(!repo.exists(&group.id).await.unwrap());
        repo.insert(&group).await.unwrap();
        assert!(repo.exists(&group.id).await.unwrap());
        assert_eq!(repo.list().await.unwrap(), vec![group]);
    }
}
