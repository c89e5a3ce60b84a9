//! Table occupancy and guest-count changes.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::{CoreError, CoreResult};
use crate::ports::{OrderRepository, OrderTableRepository};
use crate::types::{OrderStatus, OrderTable};

/// Extra check run before a table's empty flag changes.
///
/// Runs after the table's own group guard has passed.
#[async_trait]
pub trait EmptyChangeVeto: Send + Sync {
    async fn check_empty_change(&self, order_table: &OrderTable, empty: bool) -> CoreResult<()>;
}

/// Refuses the change while the table still has a COOKING or MEAL order.
#[derive(Clone)]
pub struct ActiveOrderVeto {
    orders: Arc<dyn OrderRepository>,
}

impl ActiveOrderVeto {
    pub fn new(orders: Arc<dyn OrderRepository>) -> Self {
        ActiveOrderVeto { orders }
    }
}

#[async_trait]
impl EmptyChangeVeto for ActiveOrderVeto {
    async fn check_empty_change(&self, order_table: &OrderTable, _empty: bool) -> CoreResult<()> {
        let active = self
            .orders
            .exists_by_order_table_id_and_status_in(&order_table.id, &OrderStatus::ACTIVE)
            .await?;

        if active {
            warn!(order_table_id = %order_table.id, "Table has an order that is not completed");
            return Err(CoreError::ActiveOrderExists(order_table.id.clone()));
        }

        Ok(())
    }
}

/// Accepts every change.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoVeto;

#[async_trait]
impl EmptyChangeVeto for NoVeto {
    async fn check_empty_change(&self, _order_table: &OrderTable, _empty: bool) -> CoreResult<()> {
        Ok(())
    }
}

/// A validated table change.
///
/// `read` is the row the checks ran against. Storage writes `changed` only
/// while the stored group membership and empty flag still match `read`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableStateChange {
    pub read: OrderTable,
    pub changed: OrderTable,
}

/// Loads a table and applies a state change to a copy of it.
///
/// Nothing is persisted here.
#[derive(Clone)]
pub struct TableStateValidator {
    order_tables: Arc<dyn OrderTableRepository>,
    veto: Arc<dyn EmptyChangeVeto>,
}

impl TableStateValidator {
    pub fn new(order_tables: Arc<dyn OrderTableRepository>, veto: Arc<dyn EmptyChangeVeto>) -> Self {
        TableStateValidator { order_tables, veto }
    }

    /// ## Checks (in order)
    /// 1. Table exists (`OrderTableNotFound`)
    /// 2. Table is not grouped (`TableInGroup`)
    /// 3. The veto accepts the change
    pub async fn change_empty(&self, order_table_id: &str, empty: bool) -> CoreResult<TableStateChange> {
        debug!(order_table_id = %order_table_id, empty, "Validating empty change");

        let read = self.load(order_table_id).await?;
        let mut changed = read.clone();
        changed.change_empty(empty)?;
        self.veto.check_empty_change(&changed, empty).await?;

        Ok(TableStateChange { read, changed })
    }

    /// ## Checks (in order)
    /// 1. Count is not negative (`NegativeGuestCount`)
    /// 2. Table exists (`OrderTableNotFound`)
    /// 3. Table is occupied (`TableIsEmpty`)
    pub async fn change_number_of_guests(
        &self,
        order_table_id: &str,
        number_of_guests: i32,
    ) -> CoreResult<TableStateChange> {
        debug!(order_table_id = %order_table_id, number_of_guests, "Validating guest count change");

        if number_of_guests < 0 {
            return Err(CoreError::NegativeGuestCount(number_of_guests));
        }

        let read = self.load(order_table_id).await?;
        let mut changed = read.clone();
        changed.change_number_of_guests(number_of_guests)?;

        Ok(TableStateChange { read, changed })
    }

    async fn load(&self, order_table_id: &str) -> CoreResult<OrderTable> {
        self.order_tables
            .find_by_id(order_table_id)
            .await?
            .ok_or_else(|| CoreError::OrderTableNotFound(order_table_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryStore;
    use crate::types::{Order, OrderLineItem};

    struct AlwaysVeto;

    #[async_trait]
    impl EmptyChangeVeto for AlwaysVeto {
        async fn check_empty_change(&self, order_table: &OrderTable, _empty: bool) -> CoreResult<()> {
            Err(CoreError::ActiveOrderExists(order_table.id.clone()))
        }
    }

    async fn save_table(store: &InMemoryStore, guests: i32, empty: bool) -> OrderTable {
        let table = OrderTable::new(guests, empty).unwrap();
        OrderTableRepository::save(store, &table).await.unwrap()
    }

    #[tokio::test]
    async fn test_change_empty_without_veto() {
        let store = Arc::new(InMemoryStore::new());
        let table = save_table(&store, 0, true).await;
        let validator = TableStateValidator::new(store.clone(), Arc::new(NoVeto));

        let change = validator.change_empty(&table.id, false).await.unwrap();
        assert!(change.read.empty);
        assert!(!change.changed.empty);

        // Not persisted by the validator
        let stored = OrderTableRepository::find_by_id(store.as_ref(), &table.id)
            .await
            .unwrap()
            .unwrap();
        assert!(stored.empty);
    }

    #[tokio::test]
    async fn test_change_empty_unknown_table() {
        let store = Arc::new(InMemoryStore::new());
        let validator = TableStateValidator::new(store, Arc::new(NoVeto));

        let err = validator.change_empty("missing", true).await.unwrap_err();
        assert!(matches!(err, CoreError::OrderTableNotFound(_)));
    }

    #[tokio::test]
    async fn test_group_guard_runs_before_veto() {
        let store = Arc::new(InMemoryStore::new());
        let mut table = OrderTable::new(0, true).unwrap();
        table.join_group("g-1");
        OrderTableRepository::save(store.as_ref(), &table).await.unwrap();
        let validator = TableStateValidator::new(store, Arc::new(AlwaysVeto));

        let err = validator.change_empty(&table.id, true).await.unwrap_err();
        assert!(matches!(err, CoreError::TableInGroup { .. }));
    }

    #[tokio::test]
    async fn test_veto_rejects_change() {
        let store = Arc::new(InMemoryStore::new());
        let table = save_table(&store, 0, true).await;
        let validator = TableStateValidator::new(store, Arc::new(AlwaysVeto));

        let err = validator.change_empty(&table.id, false).await.unwrap_err();
        assert!(matches!(err, CoreError::ActiveOrderExists(_)));
    }

    #[tokio::test]
    async fn test_active_order_veto() {
        let store = Arc::new(InMemoryStore::new());
        let table = save_table(&store, 2, false).await;
        let mut order = Order::new(&table.id, vec![OrderLineItem::new("m-1", 1).unwrap()]).unwrap();
        OrderRepository::save(store.as_ref(), &order).await.unwrap();

        let veto = ActiveOrderVeto::new(store.clone());
        let err = veto.check_empty_change(&table, true).await.unwrap_err();
        assert!(matches!(err, CoreError::ActiveOrderExists(id) if id == table.id));

        order.change_status(OrderStatus::Completion).unwrap();
        OrderRepository::save(store.as_ref(), &order).await.unwrap();
        assert!(veto.check_empty_change(&table, true).await.is_ok());
    }

    #[tokio::test]
    async fn test_change_number_of_guests() {
        let store = Arc::new(InMemoryStore::new());
        let occupied = save_table(&store, 2, false).await;
        let empty = save_table(&store, 0, true).await;
        let validator = TableStateValidator::new(store, Arc::new(NoVeto));

        let change = validator.change_number_of_guests(&occupied.id, 4).await.unwrap();
        assert_eq!(change.read.number_of_guests, 2);
        assert_eq!(change.changed.number_of_guests, 4);

        let err = validator.change_number_of_guests(&empty.id, 4).await.unwrap_err();
        assert!(matches!(err, CoreError::TableIsEmpty(_)));
    }

    #[tokio::test]
    async fn test_negative_guest_count_checked_before_lookup() {
        let store = Arc::new(InMemoryStore::new());
        let validator = TableStateValidator::new(store, Arc::new(NoVeto));

        let err = validator.change_number_of_guests("missing", -1).await.unwrap_err();
        assert!(matches!(err, CoreError::NegativeGuestCount(-1)));

        let err = validator.change_number_of_guests("missing", 1).await.unwrap_err();
        assert!(matches!(err, CoreError::OrderTableNotFound(_)));
    }
}
