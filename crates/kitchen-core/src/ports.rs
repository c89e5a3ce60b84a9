//! # Storage Ports
//!
//! Traits through which validators and services reach persisted entities.
//!
//! Implemented by:
//! - `kitchen_db` SQLite repositories (production)
//! - [`crate::memory::InMemoryStore`] (tests, demos)
//!
//! ## Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  find_*   → read a consistent snapshot, never mutate                   │
//! │  save     → idempotent upsert by id, returns the persisted entity      │
//! │  multi-row writes (menu + lines, order + items, group + members)       │
//! │           → all-or-nothing; a guard that no longer matches fails the   │
//! │             whole unit with CoreError::ConcurrentModification          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Handles are passed in explicitly (`Arc<dyn ...>`); there is no global
//! repository state.

use async_trait::async_trait;

use crate::error::CoreResult;
use crate::types::{Menu, MenuGroup, Order, OrderStatus, OrderTable, Product, TableGroup};

#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn save(&self, product: &Product) -> CoreResult<Product>;

    async fn find_by_id(&self, id: &str) -> CoreResult<Option<Product>>;

    async fn find_all(&self) -> CoreResult<Vec<Product>>;
}

#[async_trait]
pub trait MenuGroupRepository: Send + Sync {
    async fn save(&self, menu_group: &MenuGroup) -> CoreResult<MenuGroup>;

    async fn exists_by_id(&self, id: &str) -> CoreResult<bool>;

    async fn find_all(&self) -> CoreResult<Vec<MenuGroup>>;
}

#[async_trait]
pub trait MenuRepository: Send + Sync {
    /// Persists the menu together with its menu products.
    async fn save(&self, menu: &Menu) -> CoreResult<Menu>;

    async fn find_by_id(&self, id: &str) -> CoreResult<Option<Menu>>;

    async fn find_all(&self) -> CoreResult<Vec<Menu>>;
}

#[async_trait]
pub trait OrderTableRepository: Send + Sync {
    async fn save(&self, order_table: &OrderTable) -> CoreResult<OrderTable>;

    /// Writes the guest count and empty flag of `changed`.
    ///
    /// The write happens only while the stored group membership and empty
    /// flag still equal those of `read`; otherwise nothing is written and the
    /// call fails with `ConcurrentModification`.
    async fn update_state(&self, read: &OrderTable, changed: &OrderTable) -> CoreResult<OrderTable>;

    async fn find_by_id(&self, id: &str) -> CoreResult<Option<OrderTable>>;

    /// Returns the tables that exist among `ids`. Duplicate ids resolve once.
    async fn find_all_by_ids(&self, ids: &[String]) -> CoreResult<Vec<OrderTable>>;

    async fn find_all_by_table_group_id(&self, table_group_id: &str)
        -> CoreResult<Vec<OrderTable>>;

    async fn find_all(&self) -> CoreResult<Vec<OrderTable>>;
}

#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Inserts the order with its line items, or updates its status.
    ///
    /// A new order is written only while its table is still occupied. A
    /// stored COMPLETION status is never overwritten. Either rejection fails
    /// with `ConcurrentModification`.
    async fn save(&self, order: &Order) -> CoreResult<Order>;

    async fn find_by_id(&self, id: &str) -> CoreResult<Option<Order>>;

    async fn find_all_by_order_table_ids(&self, order_table_ids: &[String])
        -> CoreResult<Vec<Order>>;

    async fn exists_by_order_table_id_and_status_in(
        &self,
        order_table_id: &str,
        statuses: &[OrderStatus],
    ) -> CoreResult<bool>;

    async fn find_all(&self) -> CoreResult<Vec<Order>>;
}

#[async_trait]
pub trait TableGroupRepository: Send + Sync {
    /// Persists the group and its already-joined member tables as one unit.
    ///
    /// Each member row is written only if it is still empty and ungrouped.
    async fn save(&self, table_group: &TableGroup, members: &[OrderTable])
        -> CoreResult<TableGroup>;

    /// Clears group membership on every member as one unit.
    ///
    /// Re-checks that no member has a non-completed order before writing.
    async fn ungroup(&self, table_group_id: &str, members: &[OrderTable]) -> CoreResult<()>;

    async fn find_by_id(&self, id: &str) -> CoreResult<Option<TableGroup>>;
}
