//! Order placement and status changes.
//!
//! ## Lifecycle
//! ```text
//! create ──► COOKING ◄──► MEAL ──► COMPLETION (terminal)
//!               └────────────────────►┘
//! ```
//! Any change is accepted until the order reaches COMPLETION.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::{CoreError, CoreResult};
use crate::ports::OrderRepository;
use crate::types::{Order, OrderLineItem, OrderStatus};
use crate::validator::OrderCreationValidator;

#[derive(Debug, Clone, Deserialize)]
pub struct OrderLineItemRequest {
    pub menu_id: String,
    pub quantity: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrderRequest {
    pub order_table_id: String,
    pub order_line_items: Vec<OrderLineItemRequest>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChangeOrderStatusRequest {
    pub order_status: OrderStatus,
}

#[derive(Clone)]
pub struct OrderService {
    orders: Arc<dyn OrderRepository>,
    validator: OrderCreationValidator,
}

impl OrderService {
    pub fn new(orders: Arc<dyn OrderRepository>, validator: OrderCreationValidator) -> Self {
        OrderService { orders, validator }
    }

    /// Places a COOKING order against an occupied table.
    pub async fn create(&self, request: CreateOrderRequest) -> CoreResult<Order> {
        debug!(
            order_table_id = %request.order_table_id,
            lines = request.order_line_items.len(),
            "Creating order"
        );

        if request.order_line_items.is_empty() {
            return Err(CoreError::EmptyOrderLineItems);
        }

        let order_line_items = request
            .order_line_items
            .into_iter()
            .map(|line| OrderLineItem::new(line.menu_id, line.quantity))
            .collect::<CoreResult<Vec<_>>>()?;

        let order_table = self
            .validator
            .validate(&request.order_table_id, &order_line_items)
            .await?;

        let order = Order::new(order_table.id, order_line_items)?;
        let order = self.orders.save(&order).await?;

        info!(order_id = %order.id, order_table_id = %order.order_table_id, "Order created");
        Ok(order)
    }

    pub async fn list(&self) -> CoreResult<Vec<Order>> {
        self.orders.find_all().await
    }

    /// Overwrites the status of a non-completed order.
    pub async fn change_order_status(
        &self,
        order_id: &str,
        request: ChangeOrderStatusRequest,
    ) -> CoreResult<Order> {
        debug!(order_id = %order_id, status = request.order_status.as_str(), "Changing order status");

        let mut order = self
            .orders
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| CoreError::OrderNotFound(order_id.to_string()))?;

        let previous = order.order_status;
        if let Err(err) = order.change_status(request.order_status) {
            warn!(order_id = %order_id, "Status change on completed order");
            return Err(err);
        }

        let order = self.orders.save(&order).await?;

        info!(
            order_id = %order.id,
            from = previous.as_str(),
            to = order.order_status.as_str(),
            "Order status changed"
        );
        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryStore;
    use crate::money::Money;
    use crate::ports::{MenuRepository, OrderTableRepository};
    use crate::types::{Menu, MenuProduct, OrderTable};

    struct Fixture {
        store: Arc<InMemoryStore>,
        service: OrderService,
        menu: Menu,
        table: OrderTable,
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
        let table = OrderTable::new(2, false).unwrap();
        OrderTableRepository::save(store.as_ref(), &table).await.unwrap();

        let service = OrderService::new(
            store.clone(),
            OrderCreationValidator::new(store.clone(), store.clone()),
        );

        Fixture {
            store,
            service,
            menu,
            table,
        }
    }

    fn request(f: &Fixture, quantity: i64) -> CreateOrderRequest {
        CreateOrderRequest {
            order_table_id: f.table.id.clone(),
            order_line_items: vec![OrderLineItemRequest {
                menu_id: f.menu.id.clone(),
                quantity,
            }],
        }
    }

    fn status(order_status: OrderStatus) -> ChangeOrderStatusRequest {
        ChangeOrderStatusRequest { order_status }
    }

    #[tokio::test]
    async fn test_create_order() {
        let f = setup().await;
        let order = f.service.create(request(&f, 2)).await.unwrap();

        assert_eq!(order.order_status, OrderStatus::Cooking);
        assert_eq!(order.order_table_id, f.table.id);
        assert_eq!(order.order_line_items[0].seq, 1);
        assert_eq!(order.order_line_items[0].order_id, order.id);
        assert_eq!(f.service.list().await.unwrap(), vec![order]);
    }

    #[tokio::test]
    async fn test_check_order_on_create() {
        let f = setup().await;

        let mut req = request(&f, 1);
        req.order_line_items.clear();
        req.order_table_id = "missing".to_string();
        let err = f.service.create(req).await.unwrap_err();
        assert!(matches!(err, CoreError::EmptyOrderLineItems));

        let mut req = request(&f, -1);
        req.order_line_items[0].menu_id = "missing".to_string();
        let err = f.service.create(req).await.unwrap_err();
        assert!(matches!(err, CoreError::NegativeQuantity(-1)));

        let mut req = request(&f, 1);
        req.order_line_items[0].menu_id = "missing".to_string();
        req.order_table_id = "missing".to_string();
        let err = f.service.create(req).await.unwrap_err();
        assert!(matches!(err, CoreError::MenuNotFound(_)));

        let mut req = request(&f, 1);
        req.order_table_id = "missing".to_string();
        let err = f.service.create(req).await.unwrap_err();
        assert!(matches!(err, CoreError::OrderTableNotFound(_)));

        assert!(f.service.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_order_on_empty_table_fails() {
        let f = setup().await;
        let empty = OrderTable::new(0, true).unwrap();
        OrderTableRepository::save(f.store.as_ref(), &empty).await.unwrap();
        let mut req = request(&f, 1);
        req.order_table_id = empty.id.clone();

        let err = f.service.create(req).await.unwrap_err();
        assert!(matches!(err, CoreError::OrderTableIsEmpty(_)));
    }

    #[tokio::test]
    async fn test_change_status_until_completion() {
        let f = setup().await;
        let order = f.service.create(request(&f, 1)).await.unwrap();

        let changed = f
            .service
            .change_order_status(&order.id, status(OrderStatus::Meal))
            .await
            .unwrap();
        assert_eq!(changed.order_status, OrderStatus::Meal);

        f.service
            .change_order_status(&order.id, status(OrderStatus::Completion))
            .await
            .unwrap();

        let err = f
            .service
            .change_order_status(&order.id, status(OrderStatus::Meal))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::OrderAlreadyCompleted(_)));

        let stored = OrderRepository::find_by_id(f.store.as_ref(), &order.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.order_status, OrderStatus::Completion);
        assert_eq!(stored.ordered_time, order.ordered_time);
    }

    #[tokio::test]
    async fn test_change_status_of_unknown_order() {
        let f = setup().await;
        let err = f
            .service
            .change_order_status("missing", status(OrderStatus::Meal))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::OrderNotFound(_)));
    }

    #[test]
    fn test_status_request_deserializes() {
        let request: ChangeOrderStatusRequest =
            serde_json::from_str(r#"{"order_status":"MEAL"}"#).unwrap();
        assert_eq!(request.order_status, OrderStatus::Meal);
    }
}
