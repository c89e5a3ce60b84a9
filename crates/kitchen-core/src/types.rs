//! # Domain Types
//!
//! Entities of the kitchen domain and the invariant guards that need
//! nothing but the entity itself.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌───────────────┐   ┌───────────────┐   ┌───────────────┐             │
//! │  │   Product     │◄──│  MenuProduct  │──►│     Menu      │──► MenuGroup│
//! │  │  price_cents  │ id│  quantity     │ id│  price_cents  │ id          │
//! │  └───────────────┘   └───────────────┘   └───────▲───────┘             │
//! │                                                  │ id                   │
//! │  ┌───────────────┐   ┌───────────────┐   ┌───────┴───────┐             │
//! │  │  TableGroup   │◄──│  OrderTable   │◄──│ OrderLineItem │             │
//! │  │ created_date  │ id│  empty        │   │   (in Order)  │             │
//! │  │ table ids     │   │  guests       │   └───────────────┘             │
//! │  └───────────────┘   └───────▲───────┘                                 │
//! │                              │ id                                       │
//! │                      ┌───────┴───────┐                                 │
//! │                      │    Order      │ COOKING → MEAL → COMPLETION     │
//! │                      └───────────────┘                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## References, Not Ownership
//! Every arrow above is a plain id field. `OrderTable::table_group_id`,
//! `MenuProduct::menu_id` and `OrderLineItem::order_id` are back-references;
//! the referenced aggregate lives and dies independently.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::validation::validate_name;

/// Generates a new entity id (UUID v4).
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Product
// =============================================================================

/// A product in the catalog. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    /// Price in cents (smallest currency unit), never negative.
    pub price_cents: i64,
}

impl Product {
    /// Creates a product with a fresh id.
    pub fn new(name: &str, price: Money) -> CoreResult<Self> {
        validate_name("name", name)?;
        if price.is_negative() {
            return Err(CoreError::PriceBelowZero { price });
        }

        Ok(Product {
            id: generate_id(),
            name: name.trim().to_string(),
            price_cents: price.cents(),
        })
    }

    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

// =============================================================================
// Menu Group
// =============================================================================

/// Grouping label for menus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuGroup {
    pub id: String,
    pub name: String,
}

impl MenuGroup {
    pub fn new(name: &str) -> CoreResult<Self> {
        validate_name("name", name)?;

        Ok(MenuGroup {
            id: generate_id(),
            name: name.trim().to_string(),
        })
    }
}

// =============================================================================
// Menu
// =============================================================================

/// A (product, quantity) line within a menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuProduct {
    /// Position within the owning menu, assigned by [`Menu::new`].
    pub seq: i64,
    /// Back-reference to the owning menu.
    pub menu_id: String,
    pub product_id: String,
    pub quantity: i64,
}

impl MenuProduct {
    /// Creates a line not yet attached to a menu.
    pub fn new(product_id: impl Into<String>, quantity: i64) -> CoreResult<Self> {
        if quantity < 0 {
            return Err(CoreError::NegativeQuantity(quantity));
        }

        Ok(MenuProduct {
            seq: 0,
            menu_id: String::new(),
            product_id: product_id.into(),
            quantity,
        })
    }
}

/// A sellable combination of products at a fixed price.
///
/// The price is checked against the product sum once, at creation time
/// (see `validator::MenuPricingValidator`). Later reads return the stored
/// price as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Menu {
    pub id: String,
    pub name: String,
    pub price_cents: i64,
    pub menu_group_id: String,
    pub menu_products: Vec<MenuProduct>,
}

impl Menu {
    /// Creates a menu, attaching each line with `seq` 1..n.
    pub fn new(
        name: &str,
        price: Money,
        menu_group_id: impl Into<String>,
        menu_products: Vec<MenuProduct>,
    ) -> CoreResult<Self> {
        validate_name("name", name)?;
        if price.is_negative() {
            return Err(CoreError::PriceBelowZero { price });
        }
        if menu_products.is_empty() {
            return Err(CoreError::EmptyMenuProducts);
        }

        let id = generate_id();
        let menu_products = menu_products
            .into_iter()
            .enumerate()
            .map(|(index, line)| MenuProduct {
                seq: index as i64 + 1,
                menu_id: id.clone(),
                ..line
            })
            .collect();

        Ok(Menu {
            id,
            name: name.trim().to_string(),
            price_cents: price.cents(),
            menu_group_id: menu_group_id.into(),
            menu_products,
        })
    }

    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

// =============================================================================
// Order Table
// =============================================================================

/// A physical table tracked for occupancy and guest count.
///
/// ## State Rules
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  change_empty(x)              only while table_group_id is None        │
/// │  change_number_of_guests(n)   only while empty == false, n >= 0        │
/// │  join_group(g)                sets table_group_id = g, empty = false   │
/// │  leave_group()                clears table_group_id only               │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTable {
    pub id: String,
    /// Weak reference: present means membership, never ownership.
    pub table_group_id: Option<String>,
    pub number_of_guests: i32,
    pub empty: bool,
}

impl OrderTable {
    /// Creates an ungrouped table.
    pub fn new(number_of_guests: i32, empty: bool) -> CoreResult<Self> {
        if number_of_guests < 0 {
            return Err(CoreError::NegativeGuestCount(number_of_guests));
        }

        Ok(OrderTable {
            id: generate_id(),
            table_group_id: None,
            number_of_guests,
            empty,
        })
    }

    #[inline]
    pub fn is_grouped(&self) -> bool {
        self.table_group_id.is_some()
    }

    /// Sets the empty flag. Grouped tables are frozen.
    pub fn change_empty(&mut self, empty: bool) -> CoreResult<()> {
        if let Some(table_group_id) = &self.table_group_id {
            return Err(CoreError::TableInGroup {
                table_id: self.id.clone(),
                table_group_id: table_group_id.clone(),
            });
        }

        self.empty = empty;
        Ok(())
    }

    /// Sets the guest count of an occupied table.
    pub fn change_number_of_guests(&mut self, number_of_guests: i32) -> CoreResult<()> {
        if number_of_guests < 0 {
            return Err(CoreError::NegativeGuestCount(number_of_guests));
        }
        if self.empty {
            return Err(CoreError::TableIsEmpty(self.id.clone()));
        }

        self.number_of_guests = number_of_guests;
        Ok(())
    }

    /// Marks the table as a member of `table_group_id`; a grouped table is occupied.
    pub fn join_group(&mut self, table_group_id: &str) {
        self.table_group_id = Some(table_group_id.to_string());
        self.empty = false;
    }

    /// Drops group membership. Guest count and empty flag are left untouched.
    pub fn leave_group(&mut self) {
        self.table_group_id = None;
    }
}

// =============================================================================
// Table Group
// =============================================================================

/// A set of order tables merged for shared billing.
///
/// Holds member ids only; the tables stay independently persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableGroup {
    pub id: String,
    pub created_date: DateTime<Utc>,
    pub order_table_ids: Vec<String>,
}

impl TableGroup {
    pub fn new(order_table_ids: Vec<String>) -> Self {
        TableGroup {
            id: generate_id(),
            created_date: Utc::now(),
            order_table_ids,
        }
    }
}

// =============================================================================
// Order Status
// =============================================================================

/// Lifecycle of an order. COMPLETION is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Kitchen is preparing the order.
    Cooking,
    /// Food is on the table.
    Meal,
    /// Order is settled.
    Completion,
}

impl OrderStatus {
    /// Statuses that keep a table occupied.
    pub const ACTIVE: [OrderStatus; 2] = [OrderStatus::Cooking, OrderStatus::Meal];

    #[inline]
    pub const fn is_completion(&self) -> bool {
        matches!(self, OrderStatus::Completion)
    }

    /// Upper-case name, as stored in the database.
    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Cooking => "COOKING",
            OrderStatus::Meal => "MEAL",
            OrderStatus::Completion => "COMPLETION",
        }
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Cooking
    }
}

// =============================================================================
// Order
// =============================================================================

/// A (menu, quantity) line within an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLineItem {
    pub seq: i64,
    /// Back-reference to the owning order.
    pub order_id: String,
    pub menu_id: String,
    pub quantity: i64,
}

impl OrderLineItem {
    pub fn new(menu_id: impl Into<String>, quantity: i64) -> CoreResult<Self> {
        if quantity < 0 {
            return Err(CoreError::NegativeQuantity(quantity));
        }

        Ok(OrderLineItem {
            seq: 0,
            order_id: String::new(),
            menu_id: menu_id.into(),
            quantity,
        })
    }
}

/// A customer request for one or more menus against a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub order_table_id: String,
    pub order_status: OrderStatus,
    pub ordered_time: DateTime<Utc>,
    pub order_line_items: Vec<OrderLineItem>,
}

impl Order {
    /// Creates a COOKING order stamped with the current time.
    pub fn new(
        order_table_id: impl Into<String>,
        order_line_items: Vec<OrderLineItem>,
    ) -> CoreResult<Self> {
        if order_line_items.is_empty() {
            return Err(CoreError::EmptyOrderLineItems);
        }

        let id = generate_id();
        let order_line_items = order_line_items
            .into_iter()
            .enumerate()
            .map(|(index, item)| OrderLineItem {
                seq: index as i64 + 1,
                order_id: id.clone(),
                ..item
            })
            .collect();

        Ok(Order {
            id,
            order_table_id: order_table_id.into(),
            order_status: OrderStatus::Cooking,
            ordered_time: Utc::now(),
            order_line_items,
        })
    }

    #[inline]
    pub fn is_completion(&self) -> bool {
        self.order_status.is_completion()
    }

    /// Overwrites the status unless the order is already COMPLETION.
    ///
    /// Out-of-order moves (COOKING → COMPLETION, MEAL → COOKING) are
    /// accepted; only post-completion changes are refused.
    pub fn change_status(&mut self, order_status: OrderStatus) -> CoreResult<()> {
        if self.is_completion() {
            return Err(CoreError::OrderAlreadyCompleted(self.id.clone()));
        }

        self.order_status = order_status;
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
