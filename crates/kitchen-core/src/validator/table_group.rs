//! # Table Group Validators
//!
//! Formation and dissolution rules for table groups.
//!
//! ```text
//! group:    ids ──► resolve ──► all found? ──► >= 2? ──► all empty? ──► none grouped?
//!                              TableSetIncomplete  GroupTooSmall  TableNotEmpty  TableInGroup
//!
//! ungroup:  group id ──► member tables ──► their orders ──► all COMPLETION?
//!                                                           OrdersNotCompleted
//! ```
//!
//! Both are traits so services can be built with substitutes.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::{CoreError, CoreResult};
use crate::ports::{OrderRepository, OrderTableRepository};
use crate::types::OrderTable;
use crate::MIN_GROUP_TABLES;

/// Decides whether a set of tables may form a group.
#[async_trait]
pub trait GroupTableValidator: Send + Sync {
    /// Returns the resolved tables, in storage order.
    async fn validate_group_table(&self, order_table_ids: &[String]) -> CoreResult<Vec<OrderTable>>;
}

/// Decides whether a group may be dissolved.
#[async_trait]
pub trait UngroupTableValidator: Send + Sync {
    /// Returns the group's current member tables.
    async fn validate_ungroup(&self, table_group_id: &str) -> CoreResult<Vec<OrderTable>>;
}

/// Default [`GroupTableValidator`] backed by the table store.
#[derive(Clone)]
pub struct TableGroupTableValidator {
    order_tables: Arc<dyn OrderTableRepository>,
}

impl TableGroupTableValidator {
    pub fn new(order_tables: Arc<dyn OrderTableRepository>) -> Self {
        TableGroupTableValidator { order_tables }
    }
}

#[async_trait]
impl GroupTableValidator for TableGroupTableValidator {
    async fn validate_group_table(&self, order_table_ids: &[String]) -> CoreResult<Vec<OrderTable>> {
        debug!(requested = order_table_ids.len(), "Validating table group");

        let order_tables = self.order_tables.find_all_by_ids(order_table_ids).await?;

        // Duplicates resolve once, so they show up here too.
        if order_tables.len() != order_table_ids.len() {
            warn!(
                requested = order_table_ids.len(),
                found = order_tables.len(),
                "Table group references missing or repeated tables"
            );
            return Err(CoreError::TableSetIncomplete {
                requested: order_table_ids.len(),
                found: order_tables.len(),
            });
        }

        if order_tables.len() < MIN_GROUP_TABLES {
            warn!(found = order_tables.len(), "Table group too small");
            return Err(CoreError::GroupTooSmall {
                found: order_tables.len(),
                min: MIN_GROUP_TABLES,
            });
        }

        if let Some(occupied) = order_tables.iter().find(|t| !t.empty) {
            warn!(order_table_id = %occupied.id, "Table group includes an occupied table");
            return Err(CoreError::TableNotEmpty(occupied.id.clone()));
        }

        // Empty but grouped only arises from repaired data.
        if let Some(grouped) = order_tables.iter().find(|t| t.is_grouped()) {
            warn!(order_table_id = %grouped.id, "Table group includes an already grouped table");
            return Err(CoreError::TableInGroup {
                table_id: grouped.id.clone(),
                table_group_id: grouped.table_group_id.clone().unwrap_or_default(),
            });
        }

        Ok(order_tables)
    }
}

/// Default [`UngroupTableValidator`]: every order on every member is COMPLETION.
#[derive(Clone)]
pub struct TableGroupOrderValidator {
    order_tables: Arc<dyn OrderTableRepository>,
    orders: Arc<dyn OrderRepository>,
}

impl TableGroupOrderValidator {
    pub fn new(order_tables: Arc<dyn OrderTableRepository>, orders: Arc<dyn OrderRepository>) -> Self {
        TableGroupOrderValidator {
            order_tables,
            orders,
        }
    }
}

#[async_trait]
impl UngroupTableValidator for TableGroupOrderValidator {
    async fn validate_ungroup(&self, table_group_id: &str) -> CoreResult<Vec<OrderTable>> {
        debug!(table_group_id = %table_group_id, "Validating ungroup");

        let members = self
            .order_tables
            .find_all_by_table_group_id(table_group_id)
            .await?;
        let member_ids: Vec<String> = members.iter().map(|t| t.id.clone()).collect();

        let orders = self.orders.find_all_by_order_table_ids(&member_ids).await?;
        if let Some(open) = orders.iter().find(|o| !o.is_completion()) {
            warn!(
                table_group_id = %table_group_id,
                order_id = %open.id,
                status = open.order_status.as_str(),
                "Ungroup blocked by order that is not completed"
            );
            return Err(CoreError::OrdersNotCompleted(table_group_id.to_string()));
        }

        Ok(members)
    }
}
