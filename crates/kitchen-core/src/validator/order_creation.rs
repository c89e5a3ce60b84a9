//! Preconditions for placing an order.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::{CoreError, CoreResult};
use crate::ports::{MenuRepository, OrderTableRepository};
use crate::types::{OrderLineItem, OrderTable};

/// Checks that an order's line items and target table are valid.
///
/// ## Checks (in order)
/// 1. At least one line item (`EmptyOrderLineItems`)
/// 2. Every referenced menu exists (`MenuNotFound`)
/// 3. The table exists (`OrderTableNotFound`) and is occupied (`OrderTableIsEmpty`)
#[derive(Clone)]
pub struct OrderCreationValidator {
    menus: Arc<dyn MenuRepository>,
    order_tables: Arc<dyn OrderTableRepository>,
}

impl OrderCreationValidator {
    pub fn new(
        menus: Arc<dyn MenuRepository>,
        order_tables: Arc<dyn OrderTableRepository>,
    ) -> Self {
        OrderCreationValidator {
            menus,
            order_tables,
        }
    }

    /// Returns the target table on success.
    pub async fn validate(
        &self,
        order_table_id: &str,
        order_line_items: &[OrderLineItem],
    ) -> CoreResult<OrderTable> {
        debug!(
            order_table_id = %order_table_id,
            lines = order_line_items.len(),
            "Validating order creation"
        );

        if order_line_items.is_empty() {
            return Err(CoreError::EmptyOrderLineItems);
        }

        // The same menu may appear on several lines; resolve it once.
        let menu_ids: BTreeSet<&str> = order_line_items
            .iter()
            .map(|item| item.menu_id.as_str())
            .collect();
        for menu_id in menu_ids {
            if self.menus.find_by_id(menu_id).await?.is_none() {
                warn!(menu_id = %menu_id, "Order references unknown menu");
                return Err(CoreError::MenuNotFound(menu_id.to_string()));
            }
        }

        let order_table = self
            .order_tables
            .find_by_id(order_table_id)
            .await?
            .ok_or_else(|| CoreError::OrderTableNotFound(order_table_id.to_string()))?;

        if order_table.empty {
            warn!(order_table_id = %order_table_id, "Order placed against empty table");
            return Err(CoreError::OrderTableIsEmpty(order_table.id));
        }

        Ok(order_table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryStore;
    use crate::money::Money;
    use crate::types::{Menu, MenuProduct};

    struct Fixture {
        validator: OrderCreationValidator,
        menu: Menu,
        occupied: OrderTable,
        empty: OrderTable,
    }

    async fn setup() -> Fixture {
        let store = Arc::new(InMemoryStore::new());
        let menu = Menu::new(
            "Fried Chicken",
            Money::from_cents(16000),
            "g-1",
            vec![MenuProduct::new("p-1", 1).unwrap()],
        )
        .unwrap();
        MenuRepository::save(store.as_ref(), &menu).await.unwrap();

        let occupied = OrderTable::new(2, false).unwrap();
        let empty = OrderTable::new(0, true).unwrap();
        OrderTableRepository::save(store.as_ref(), &occupied).await.unwrap();
        OrderTableRepository::save(store.as_ref(), &empty).await.unwrap();

        Fixture {
            validator: OrderCreationValidator::new(store.clone(), store),
            menu,
            occupied,
            empty,
        }
    }

    #[tokio::test]
    async fn test_valid_order_returns_table() {
        let f = setup().await;
        let items = vec![OrderLineItem::new(f.menu.id.clone(), 1).unwrap()];

        let table = f.validator.validate(&f.occupied.id, &items).await.unwrap();
        assert_eq!(table.id, f.occupied.id);
    }

    #[tokio::test]
    async fn test_repeated_menu_on_several_lines_is_allowed() {
        let f = setup().await;
        let items = vec![
            OrderLineItem::new(f.menu.id.clone(), 1).unwrap(),
            OrderLineItem::new(f.menu.id.clone(), 2).unwrap(),
        ];

        assert!(f.validator.validate(&f.occupied.id, &items).await.is_ok());
    }

    #[tokio::test]
    async fn test_no_line_items_fails() {
        let f = setup().await;
        let err = f.validator.validate(&f.occupied.id, &[]).await.unwrap_err();
        assert!(matches!(err, CoreError::EmptyOrderLineItems));
    }

    #[tokio::test]
    async fn test_unknown_menu_fails() {
        let f = setup().await;
        let items = vec![
            OrderLineItem::new(f.menu.id.clone(), 1).unwrap(),
            OrderLineItem::new("missing-menu", 1).unwrap(),
        ];

        let err = f.validator.validate(&f.occupied.id, &items).await.unwrap_err();
        assert!(matches!(err, CoreError::MenuNotFound(id) if id == "missing-menu"));
    }

    #[tokio::test]
    async fn test_unknown_table_fails() {
        let f = setup().await;
        let items = vec![OrderLineItem::new(f.menu.id.clone(), 1).unwrap()];

        let err = f.validator.validate("missing-table", &items).await.unwrap_err();
        assert!(matches!(err, CoreError::OrderTableNotFound(_)));
    }

    #[tokio::test]
    async fn test_empty_table_fails() {
        let f = setup().await;
        let items = vec![OrderLineItem::new(f.menu.id.clone(), 1).unwrap()];

        let err = f.validator.validate(&f.empty.id, &items).await.unwrap_err();
        assert!(matches!(err, CoreError::OrderTableIsEmpty(id) if id == f.empty.id));
    }
}
