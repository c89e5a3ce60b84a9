//! Order tables: creation, occupancy and guest count.

use std::sync::Arc;

use serde::Deserialize;
use tracing::info;

use crate::error::CoreResult;
use crate::ports::OrderTableRepository;
use crate::types::OrderTable;
use crate::validator::TableStateValidator;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrderTableRequest {
    pub number_of_guests: i32,
    pub empty: bool,
    /// Accepted for compatibility; new tables are always ungrouped.
    #[serde(default)]
    pub table_group_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChangeEmptyRequest {
    pub empty: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChangeNumberOfGuestsRequest {
    pub number_of_guests: i32,
}

#[derive(Clone)]
pub struct TableService {
    order_tables: Arc<dyn OrderTableRepository>,
    state: TableStateValidator,
}

impl TableService {
    pub fn new(order_tables: Arc<dyn OrderTableRepository>, state: TableStateValidator) -> Self {
        TableService {
            order_tables,
            state,
        }
    }

    pub async fn create(&self, request: CreateOrderTableRequest) -> CoreResult<OrderTable> {
        let order_table = OrderTable::new(request.number_of_guests, request.empty)?;
        let order_table = self.order_tables.save(&order_table).await?;

        info!(order_table_id = %order_table.id, empty = order_table.empty, "Order table created");
        Ok(order_table)
    }

    pub async fn list(&self) -> CoreResult<Vec<OrderTable>> {
        self.order_tables.find_all().await
    }

    pub async fn change_empty(
        &self,
        order_table_id: &str,
        request: ChangeEmptyRequest,
    ) -> CoreResult<OrderTable> {
        let change = self.state.change_empty(order_table_id, request.empty).await?;
        let order_table = self
            .order_tables
            .update_state(&change.read, &change.changed)
            .await?;

        info!(order_table_id = %order_table.id, empty = order_table.empty, "Table occupancy changed");
        Ok(order_table)
    }

    pub async fn change_number_of_guests(
        &self,
        order_table_id: &str,
        request: ChangeNumberOfGuestsRequest,
    ) -> CoreResult<OrderTable> {
        let change = self
            .state
            .change_number_of_guests(order_table_id, request.number_of_guests)
            .await?;
        let order_table = self
            .order_tables
            .update_state(&change.read, &change.changed)
            .await?;

        info!(
            order_table_id = %order_table.id,
            number_of_guests = order_table.number_of_guests,
            "Guest count changed"
        );
        Ok(order_table)
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::error::CoreError;
    use crate::memory::InMemoryStore;
    use crate::ports::OrderRepository;
    use crate::service::{CreateTableGroupRequest, Services};
    use crate::types::{Order, OrderLineItem, OrderStatus};
    use crate::validator::{ActiveOrderVeto, EmptyChangeVeto, NoVeto};

    /// Groups the table with `partner_id` while its empty change is checked.
    struct GroupWhileChecking {
        store: Arc<InMemoryStore>,
        partner_id: String,
    }

    #[async_trait]
    impl EmptyChangeVeto for GroupWhileChecking {
        async fn check_empty_change(&self, order_table: &OrderTable, _empty: bool) -> CoreResult<()> {
            Services::new(self.store.repositories())
                .table_groups
                .create(CreateTableGroupRequest {
                    order_table_ids: vec![order_table.id.clone(), self.partner_id.clone()],
                })
                .await?;
            Ok(())
        }
    }

    fn service(store: &Arc<InMemoryStore>) -> TableService {
        TableService::new(
            store.clone(),
            TableStateValidator::new(store.clone(), Arc::new(ActiveOrderVeto::new(store.clone()))),
        )
    }

    fn create_request(number_of_guests: i32, empty: bool) -> CreateOrderTableRequest {
        CreateOrderTableRequest {
            number_of_guests,
            empty,
            table_group_id: None,
        }
    }

    #[tokio::test]
    async fn test_create_ignores_group_id() {
        let store = Arc::new(InMemoryStore::new());
        let service = service(&store);
        let mut request = create_request(0, true);
        request.table_group_id = Some("g-1".to_string());

        let table = service.create(request).await.unwrap();
        assert!(!table.is_grouped());
        assert_eq!(service.list().await.unwrap(), vec![table]);
    }

    #[tokio::test]
    async fn test_create_with_negative_guests_fails() {
        let store = Arc::new(InMemoryStore::new());
        let err = service(&store).create(create_request(-1, true)).await.unwrap_err();
        assert!(matches!(err, CoreError::NegativeGuestCount(-1)));
    }

    #[tokio::test]
    async fn test_change_empty_is_persisted() {
        let store = Arc::new(InMemoryStore::new());
        let service = service(&store);
        let table = service.create(create_request(0, true)).await.unwrap();

        service
            .change_empty(&table.id, ChangeEmptyRequest { empty: false })
            .await
            .unwrap();

        let stored = OrderTableRepository::find_by_id(store.as_ref(), &table.id)
            .await
            .unwrap()
            .unwrap();
        assert!(!stored.empty);
    }

    #[tokio::test]
    async fn test_change_empty_with_active_order_fails() {
        let store = Arc::new(InMemoryStore::new());
        let service = service(&store);
        let table = service.create(create_request(2, false)).await.unwrap();
        let mut order = Order::new(&table.id, vec![OrderLineItem::new("m-1", 1).unwrap()]).unwrap();
        OrderRepository::save(store.as_ref(), &order).await.unwrap();

        let err = service
            .change_empty(&table.id, ChangeEmptyRequest { empty: true })
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::ActiveOrderExists(_)));

        order.change_status(OrderStatus::Completion).unwrap();
        OrderRepository::save(store.as_ref(), &order).await.unwrap();
        let table = service
            .change_empty(&table.id, ChangeEmptyRequest { empty: true })
            .await
            .unwrap();
        assert!(table.empty);
    }

    #[tokio::test]
    async fn test_substituted_veto() {
        let store = Arc::new(InMemoryStore::new());
        let service = TableService::new(
            store.clone(),
            TableStateValidator::new(store.clone(), Arc::new(NoVeto)),
        );
        let table = service.create(create_request(2, false)).await.unwrap();
        let order = Order::new(&table.id, vec![OrderLineItem::new("m-1", 1).unwrap()]).unwrap();
        OrderRepository::save(store.as_ref(), &order).await.unwrap();

        assert!(service
            .change_empty(&table.id, ChangeEmptyRequest { empty: true })
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_change_number_of_guests() {
        let store = Arc::new(InMemoryStore::new());
        let service = service(&store);
        let occupied = service.create(create_request(2, false)).await.unwrap();
        let empty = service.create(create_request(0, true)).await.unwrap();

        let table = service
            .change_number_of_guests(&occupied.id, ChangeNumberOfGuestsRequest { number_of_guests: 5 })
            .await
            .unwrap();
        assert_eq!(table.number_of_guests, 5);

        let err = service
            .change_number_of_guests(&empty.id, ChangeNumberOfGuestsRequest { number_of_guests: 5 })
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::TableIsEmpty(_)));

        let err = service
            .change_number_of_guests(&occupied.id, ChangeNumberOfGuestsRequest { number_of_guests: -1 })
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::NegativeGuestCount(-1)));

        let stored = OrderTableRepository::find_by_id(store.as_ref(), &occupied.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.number_of_guests, 5);
    }

    #[tokio::test]
    async fn test_change_empty_loses_to_concurrent_grouping() {
        let store = Arc::new(InMemoryStore::new());
        let plain = service(&store);
        let table = plain.create(create_request(0, true)).await.unwrap();
        let partner = plain.create(create_request(0, true)).await.unwrap();

        let racing = TableService::new(
            store.clone(),
            TableStateValidator::new(
                store.clone(),
                Arc::new(GroupWhileChecking {
                    store: store.clone(),
                    partner_id: partner.id.clone(),
                }),
            ),
        );

        let err = racing
            .change_empty(&table.id, ChangeEmptyRequest { empty: true })
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::ConcurrentModification { .. }));

        for id in [&table.id, &partner.id] {
            let stored = OrderTableRepository::find_by_id(store.as_ref(), id)
                .await
                .unwrap()
                .unwrap();
            assert!(stored.is_grouped());
            assert!(!stored.empty);
        }
    }
}
