//! Grouping and ungrouping tables.
//!
//! ```text
//! create:   GroupTableValidator ──► TableGroup::new ──► join_group(each) ──► save (one unit)
//! ungroup:  find group ──► UngroupTableValidator ──► leave_group(each) ──► ungroup (one unit)
//! ```
//!
//! The group row is kept after ungrouping.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{CoreError, CoreResult};
use crate::ports::TableGroupRepository;
use crate::types::TableGroup;
use crate::validator::{GroupTableValidator, UngroupTableValidator};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTableGroupRequest {
    pub order_table_ids: Vec<String>,
}

#[derive(Clone)]
pub struct TableGroupService {
    table_groups: Arc<dyn TableGroupRepository>,
    group_validator: Arc<dyn GroupTableValidator>,
    ungroup_validator: Arc<dyn UngroupTableValidator>,
}

impl TableGroupService {
    pub fn new(
        table_groups: Arc<dyn TableGroupRepository>,
        group_validator: Arc<dyn GroupTableValidator>,
        ungroup_validator: Arc<dyn UngroupTableValidator>,
    ) -> Self {
        TableGroupService {
            table_groups,
            group_validator,
            ungroup_validator,
        }
    }

    pub async fn create(&self, request: CreateTableGroupRequest) -> CoreResult<TableGroup> {
        debug!(tables = request.order_table_ids.len(), "Creating table group");

        let mut members = self
            .group_validator
            .validate_group_table(&request.order_table_ids)
            .await?;

        let table_group = TableGroup::new(request.order_table_ids);
        for member in &mut members {
            member.join_group(&table_group.id);
        }

        let table_group = self.table_groups.save(&table_group, &members).await?;

        info!(
            table_group_id = %table_group.id,
            tables = members.len(),
            "Tables grouped"
        );
        Ok(table_group)
    }

    pub async fn ungroup(&self, table_group_id: &str) -> CoreResult<()> {
        debug!(table_group_id = %table_group_id, "Ungrouping tables");

        if self.table_groups.find_by_id(table_group_id).await?.is_none() {
            return Err(CoreError::TableGroupNotFound(table_group_id.to_string()));
        }

        let mut members = self.ungroup_validator.validate_ungroup(table_group_id).await?;
        for member in &mut members {
            member.leave_group();
        }

        self.table_groups.ungroup(table_group_id, &members).await?;

        info!(table_group_id = %table_group_id, tables = members.len(), "Tables ungrouped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::memory::InMemoryStore;
    use crate::ports::{OrderRepository, OrderTableRepository};
    use crate::types::{Order, OrderLineItem, OrderStatus, OrderTable};
    use crate::validator::{TableGroupOrderValidator, TableGroupTableValidator};

    struct RejectAll;

    #[async_trait]
    impl GroupTableValidator for RejectAll {
        async fn validate_group_table(&self, order_table_ids: &[String]) -> CoreResult<Vec<OrderTable>> {
            Err(CoreError::GroupTooSmall {
                found: order_table_ids.len(),
                min: usize::MAX,
            })
        }
    }

    fn service(store: &Arc<InMemoryStore>) -> TableGroupService {
        TableGroupService::new(
            store.clone(),
            Arc::new(TableGroupTableValidator::new(store.clone())),
            Arc::new(TableGroupOrderValidator::new(store.clone(), store.clone())),
        )
    }

    async fn empty_tables(store: &InMemoryStore, n: usize) -> Vec<OrderTable> {
        let mut tables = Vec::new();
        for _ in 0..n {
            let table = OrderTable::new(0, true).unwrap();
            tables.push(OrderTableRepository::save(store, &table).await.unwrap());
        }
        tables
    }

    fn request(tables: &[OrderTable]) -> CreateTableGroupRequest {
        CreateTableGroupRequest {
            order_table_ids: tables.iter().map(|t| t.id.clone()).collect(),
        }
    }

    async fn stored(store: &InMemoryStore, id: &str) -> OrderTable {
        OrderTableRepository::find_by_id(store, id).await.unwrap().unwrap()
    }

    #[tokio::test]
    async fn test_group_two_empty_tables() {
        let store = Arc::new(InMemoryStore::new());
        let tables = empty_tables(&store, 2).await;

        let group = service(&store).create(request(&tables)).await.unwrap();
        assert_eq!(group.order_table_ids.len(), 2);

        for table in &tables {
            let table = stored(&store, &table.id).await;
            assert!(!table.empty);
            assert_eq!(table.table_group_id.as_deref(), Some(group.id.as_str()));
        }
    }

    #[tokio::test]
    async fn test_group_one_table_fails() {
        let store = Arc::new(InMemoryStore::new());
        let tables = empty_tables(&store, 1).await;

        let err = service(&store).create(request(&tables)).await.unwrap_err();
        assert!(matches!(err, CoreError::GroupTooSmall { .. }));
        assert!(stored(&store, &tables[0].id).await.empty);
    }

    #[tokio::test]
    async fn test_table_cannot_join_two_groups() {
        let store = Arc::new(InMemoryStore::new());
        let tables = empty_tables(&store, 3).await;
        let service = service(&store);
        service.create(request(&tables[..2])).await.unwrap();

        let err = service.create(request(&tables[1..])).await.unwrap_err();
        assert!(matches!(err, CoreError::TableNotEmpty(_)));
        assert!(!stored(&store, &tables[2].id).await.is_grouped());
    }

    #[tokio::test]
    async fn test_substituted_group_validator() {
        let store = Arc::new(InMemoryStore::new());
        let tables = empty_tables(&store, 2).await;
        let service = TableGroupService::new(
            store.clone(),
            Arc::new(RejectAll),
            Arc::new(TableGroupOrderValidator::new(store.clone(), store.clone())),
        );

        assert!(service.create(request(&tables)).await.is_err());
    }

    #[tokio::test]
    async fn test_ungroup_after_completion() {
        let store = Arc::new(InMemoryStore::new());
        let tables = empty_tables(&store, 2).await;
        let service = service(&store);
        let group = service.create(request(&tables)).await.unwrap();

        let mut order =
            Order::new(&tables[0].id, vec![OrderLineItem::new("m-1", 1).unwrap()]).unwrap();
        OrderRepository::save(store.as_ref(), &order).await.unwrap();

        let err = service.ungroup(&group.id).await.unwrap_err();
        assert!(matches!(err, CoreError::OrdersNotCompleted(_)));
        for table in &tables {
            assert!(stored(&store, &table.id).await.is_grouped());
        }

        order.change_status(OrderStatus::Completion).unwrap();
        OrderRepository::save(store.as_ref(), &order).await.unwrap();
        service.ungroup(&group.id).await.unwrap();

        for table in &tables {
            let table = stored(&store, &table.id).await;
            assert!(!table.is_grouped());
            assert!(!table.empty);
        }
        assert!(TableGroupRepository::find_by_id(store.as_ref(), &group.id)
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_ungroup_unknown_group() {
        let store = Arc::new(InMemoryStore::new());
        let err = service(&store).ungroup("missing").await.unwrap_err();
        assert!(matches!(err, CoreError::TableGroupNotFound(_)));
    }
}
