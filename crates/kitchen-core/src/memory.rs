//! # In-Memory Store
//!
//! Implements every storage port over plain maps behind one `Mutex`.
//!
//! ## Unit of Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  every port method  ──► lock ──► check guards ──► mutate ──► unlock    │
//! │                                                                         │
//! │  A guard failure returns before any mutation, so a rejected unit        │
//! │  leaves the maps exactly as they were.                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The guards mirror the SQLite repositories: table state changes need the
//! membership and empty flag they were validated against, new orders need an
//! occupied table, completed orders are never overwritten, group members must
//! still be empty and ungrouped, and ungroup re-checks the orders of every
//! table currently in the group.
//!
//! Maps are keyed by id (`BTreeMap`), so `find_all` returns id order.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::error::{CoreError, CoreResult};
use crate::ports::{
    MenuGroupRepository, MenuRepository, OrderRepository, OrderTableRepository,
    ProductRepository, TableGroupRepository,
};
use crate::service::Repositories;
use crate::types::{Menu, MenuGroup, Order, OrderStatus, OrderTable, Product, TableGroup};

#[derive(Debug, Default)]
struct State {
    products: BTreeMap<String, Product>,
    menu_groups: BTreeMap<String, MenuGroup>,
    menus: BTreeMap<String, Menu>,
    order_tables: BTreeMap<String, OrderTable>,
    table_groups: BTreeMap<String, TableGroup>,
    orders: BTreeMap<String, Order>,
}

/// Process-local store for tests and demos.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bundles this store as every repository a service needs.
    pub fn repositories(self: &Arc<Self>) -> Repositories {
        Repositories {
            products: self.clone(),
            menu_groups: self.clone(),
            menus: self.clone(),
            order_tables: self.clone(),
            orders: self.clone(),
            table_groups: self.clone(),
        }
    }

    fn lock(&self) -> CoreResult<MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|_| CoreError::Storage("in-memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl ProductRepository for InMemoryStore {
    async fn save(&self, product: &Product) -> CoreResult<Product> {
        let mut state = self.lock()?;
        state.products.insert(product.id.clone(), product.clone());
        Ok(product.clone())
    }

    async fn find_by_id(&self, id: &str) -> CoreResult<Option<Product>> {
        Ok(self.lock()?.products.get(id).cloned())
    }

    async fn find_all(&self) -> CoreResult<Vec<Product>> {
        Ok(self.lock()?.products.values().cloned().collect())
    }
}

#[async_trait]
impl MenuGroupRepository for InMemoryStore {
    async fn save(&self, menu_group: &MenuGroup) -> CoreResult<MenuGroup> {
        let mut state = self.lock()?;
        state
            .menu_groups
            .insert(menu_group.id.clone(), menu_group.clone());
        Ok(menu_group.clone())
    }

    async fn exists_by_id(&self, id: &str) -> CoreResult<bool> {
        Ok(self.lock()?.menu_groups.contains_key(id))
    }

    async fn find_all(&self) -> CoreResult<Vec<MenuGroup>> {
        Ok(self.lock()?.menu_groups.values().cloned().collect())
    }
}

#[async_trait]
impl MenuRepository for InMemoryStore {
    async fn save(&self, menu: &Menu) -> CoreResult<Menu> {
        let mut state = self.lock()?;
        state.menus.insert(menu.id.clone(), menu.clone());
        Ok(menu.clone())
    }

    async fn find_by_id(&self, id: &str) -> CoreResult<Option<Menu>> {
        Ok(self.lock()?.menus.get(id).cloned())
    }

    async fn find_all(&self) -> CoreResult<Vec<Menu>> {
        Ok(self.lock()?.menus.values().cloned().collect())
    }
}

#[async_trait]
impl OrderTableRepository for InMemoryStore {
    async fn save(&self, order_table: &OrderTable) -> CoreResult<OrderTable> {
        let mut state = self.lock()?;
        state
            .order_tables
            .insert(order_table.id.clone(), order_table.clone());
        Ok(order_table.clone())
    }

    async fn update_state(&self, read: &OrderTable, changed: &OrderTable) -> CoreResult<OrderTable> {
        let mut state = self.lock()?;

        let stored = state
            .order_tables
            .get_mut(&read.id)
            .filter(|t| t.table_group_id == read.table_group_id && t.empty == read.empty)
            .ok_or_else(|| CoreError::concurrent("OrderTable", read.id.clone()))?;

        stored.number_of_guests = changed.number_of_guests;
        stored.empty = changed.empty;
        Ok(stored.clone())
    }

    async fn find_by_id(&self, id: &str) -> CoreResult<Option<OrderTable>> {
        Ok(self.lock()?.order_tables.get(id).cloned())
    }

    async fn find_all_by_ids(&self, ids: &[String]) -> CoreResult<Vec<OrderTable>> {
        let state = self.lock()?;
        Ok(state
            .order_tables
            .values()
            .filter(|t| ids.contains(&t.id))
            .cloned()
            .collect())
    }

    async fn find_all_by_table_group_id(&self, table_group_id: &str) -> CoreResult<Vec<OrderTable>> {
        let state = self.lock()?;
        Ok(state
            .order_tables
            .values()
            .filter(|t| t.table_group_id.as_deref() == Some(table_group_id))
            .cloned()
            .collect())
    }

    async fn find_all(&self) -> CoreResult<Vec<OrderTable>> {
        Ok(self.lock()?.order_tables.values().cloned().collect())
    }
}

#[async_trait]
impl OrderRepository for InMemoryStore {
    async fn save(&self, order: &Order) -> CoreResult<Order> {
        let mut state = self.lock()?;

        // Existing orders only ever change status.
        if let Some(stored) = state.orders.get_mut(&order.id) {
            if stored.is_completion() {
                return Err(CoreError::concurrent("Order", order.id.clone()));
            }
            stored.order_status = order.order_status;
            return Ok(stored.clone());
        }

        let occupied = state
            .order_tables
            .get(&order.order_table_id)
            .map(|t| !t.empty)
            .unwrap_or(false);
        if !occupied {
            return Err(CoreError::concurrent("OrderTable", order.order_table_id.clone()));
        }

        state.orders.insert(order.id.clone(), order.clone());
        Ok(order.clone())
    }

    async fn find_by_id(&self, id: &str) -> CoreResult<Option<Order>> {
        Ok(self.lock()?.orders.get(id).cloned())
    }

    async fn find_all_by_order_table_ids(&self, order_table_ids: &[String]) -> CoreResult<Vec<Order>> {
        let state = self.lock()?;
        Ok(state
            .orders
            .values()
            .filter(|o| order_table_ids.contains(&o.order_table_id))
            .cloned()
            .collect())
    }

    async fn exists_by_order_table_id_and_status_in(
        &self,
        order_table_id: &str,
        statuses: &[OrderStatus],
    ) -> CoreResult<bool> {
        let state = self.lock()?;
        Ok(state
            .orders
            .values()
            .any(|o| o.order_table_id == order_table_id && statuses.contains(&o.order_status)))
    }

    async fn find_all(&self) -> CoreResult<Vec<Order>> {
        Ok(self.lock()?.orders.values().cloned().collect())
    }
}

#[async_trait]
impl TableGroupRepository for InMemoryStore {
    async fn save(&self, table_group: &TableGroup, members: &[OrderTable]) -> CoreResult<TableGroup> {
        let mut state = self.lock()?;

        for member in members {
            let still_free = state
                .order_tables
                .get(&member.id)
                .map(|t| t.empty && !t.is_grouped())
                .unwrap_or(false);
            if !still_free {
                return Err(CoreError::concurrent("OrderTable", member.id.clone()));
            }
        }

        state
            .table_groups
            .insert(table_group.id.clone(), table_group.clone());
        for member in members {
            state.order_tables.insert(member.id.clone(), member.clone());
        }

        Ok(table_group.clone())
    }

    async fn ungroup(&self, table_group_id: &str, members: &[OrderTable]) -> CoreResult<()> {
        let mut state = self.lock()?;

        let current_members: Vec<&str> = state
            .order_tables
            .values()
            .filter(|t| t.table_group_id.as_deref() == Some(table_group_id))
            .map(|t| t.id.as_str())
            .collect();
        let open_order = state
            .orders
            .values()
            .any(|o| !o.is_completion() && current_members.contains(&o.order_table_id.as_str()));
        if open_order {
            return Err(CoreError::OrdersNotCompleted(table_group_id.to_string()));
        }

        for member in members {
            let still_member = state
                .order_tables
                .get(&member.id)
                .map(|t| t.table_group_id.as_deref() == Some(table_group_id))
                .unwrap_or(false);
            if !still_member {
                return Err(CoreError::concurrent("OrderTable", member.id.clone()));
            }
        }

        for member in members {
            if let Some(stored) = state.order_tables.get_mut(&member.id) {
                stored.leave_group();
            }
        }

        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> CoreResult<Option<TableGroup>> {
        Ok(self.lock()?.table_groups.get(id).cloned())
    }
}
