//! # Application Services
//!
//! One service per aggregate. Each takes an already-deserialized request,
//! loads what it references, runs the validators and persists the result.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  request ──► service ──► validator(s) ──► entity guard ──► repository  │
//! │                 │                                              │        │
//! │                 └──────────── CoreError ◄──────────────────────┘        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Storage handles come in through [`Repositories`]; there is no global state.

use std::sync::Arc;

use crate::ports::{
    MenuGroupRepository, MenuRepository, OrderRepository, OrderTableRepository,
    ProductRepository, TableGroupRepository,
};
use crate::validator::{
    ActiveOrderVeto, MenuPricingValidator, OrderCreationValidator, TableGroupOrderValidator,
    TableGroupTableValidator, TableStateValidator,
};

pub mod menu;
pub mod menu_group;
pub mod order;
pub mod product;
pub mod table;
pub mod table_group;

pub use menu::{CreateMenuRequest, MenuProductRequest, MenuService};
pub use menu_group::{CreateMenuGroupRequest, MenuGroupService};
pub use order::{ChangeOrderStatusRequest, CreateOrderRequest, OrderLineItemRequest, OrderService};
pub use product::{CreateProductRequest, ProductService};
pub use table::{
    ChangeEmptyRequest, ChangeNumberOfGuestsRequest, CreateOrderTableRequest, TableService,
};
pub use table_group::{CreateTableGroupRequest, TableGroupService};

/// Storage handles for every aggregate.
#[derive(Clone)]
pub struct Repositories {
    pub products: Arc<dyn ProductRepository>,
    pub menu_groups: Arc<dyn MenuGroupRepository>,
    pub menus: Arc<dyn MenuRepository>,
    pub order_tables: Arc<dyn OrderTableRepository>,
    pub orders: Arc<dyn OrderRepository>,
    pub table_groups: Arc<dyn TableGroupRepository>,
}

/// All services, wired with the default validators.
#[derive(Clone)]
pub struct Services {
    pub products: ProductService,
    pub menu_groups: MenuGroupService,
    pub menus: MenuService,
    pub orders: OrderService,
    pub tables: TableService,
    pub table_groups: TableGroupService,
}

impl Services {
    pub fn new(repos: Repositories) -> Self {
        let pricing = MenuPricingValidator::new(repos.products.clone());
        let order_creation = OrderCreationValidator::new(repos.menus.clone(), repos.order_tables.clone());
        let table_state = TableStateValidator::new(
            repos.order_tables.clone(),
            Arc::new(ActiveOrderVeto::new(repos.orders.clone())),
        );
        let group_validator = Arc::new(TableGroupTableValidator::new(repos.order_tables.clone()));
        let ungroup_validator = Arc::new(TableGroupOrderValidator::new(
            repos.order_tables.clone(),
            repos.orders.clone(),
        ));

        Services {
            products: ProductService::new(repos.products.clone()),
            menu_groups: MenuGroupService::new(repos.menu_groups.clone()),
            menus: MenuService::new(repos.menus.clone(), repos.menu_groups.clone(), pricing),
            orders: OrderService::new(repos.orders.clone(), order_creation),
            tables: TableService::new(repos.order_tables.clone(), table_state),
            table_groups: TableGroupService::new(
                repos.table_groups.clone(),
                group_validator,
                ungroup_validator,
            ),
        }
    }
}
