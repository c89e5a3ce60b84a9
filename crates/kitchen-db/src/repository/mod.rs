//! # Repository Module
//!
//! SQLite implementations of the kitchen-core storage ports.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Service (kitchen-core)                                                 │
//! │       │  Arc<dyn ports::OrderRepository>                                │
//! │       ▼                                                                 │
//! │  OrderRepository (this crate)                                          │
//! │  ├── inherent methods  → DbResult<T>   (insert, get_by_id, list, ...)   │
//! │  └── ports impl        → CoreResult<T> (delegates, DbError → CoreError) │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Multi-row writes run in one transaction. Every statement inside it uses
//! the transaction's connection, never the pool.
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`] - Product catalog
//! - [`MenuGroupRepository`] - Menu groups
//! - [`MenuRepository`] - Menus with their menu products
//! - [`OrderTableRepository`] - Tables
//! - [`OrderRepository`] - Orders with their line items, guarded status writes
//! - [`TableGroupRepository`] - Group formation and dissolution

use sqlx::{QueryBuilder, Sqlite};

pub mod menu;
pub mod menu_group;
pub mod order;
pub mod order_table;
pub mod product;
pub mod table_group;

pub use menu::MenuRepository;
pub use menu_group::MenuGroupRepository;
pub use order::OrderRepository;
pub use order_table::OrderTableRepository;
pub use product::ProductRepository;
pub use table_group::TableGroupRepository;

/// Appends `(?, ?, ...)` binding each of `values`, for an `IN` clause.
///
/// Callers handle an empty list themselves; `IN ()` is invalid.
pub(crate) fn push_in_list<'args, I, V>(builder: &mut QueryBuilder<'args, Sqlite>, values: I)
where
    I: IntoIterator<Item = V>,
    V: 'args + sqlx::Encode<'args, Sqlite> + sqlx::Type<Sqlite> + Send,
{
    builder.push("(");
    let mut separated = builder.separated(", ");
    for value in values {
        separated.push_bind(value);
    }
    separated.push_unseparated(")");
}
