//! # kitchen-core: Restaurant Order-Taking Rules
//!
//! Entities, invariant guards, cross-entity validators and application
//! services for menus, orders and tables. Storage is reached only through
//! the traits in [`ports`].
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Kitchen POS Architecture                         │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │               ★ kitchen-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   service ──► validator ──► types (guards) ──► ports (traits)  │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │ validator │  │  service  │  │   │
//! │  │   │   Menu    │  │   Money   │  │  pricing  │  │  menus    │  │   │
//! │  │   │   Order   │  │           │  │  orders   │  │  orders   │  │   │
//! │  │   │ OrderTable│  │           │  │  tables   │  │  tables   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK                            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ ports                                  │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │  kitchen-db (SQLite repositories)   │   memory::InMemoryStore   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Entities and their single-entity guards
//! - [`money`] - Integer-cent money
//! - [`error`] - Failure taxonomy with stable codes
//! - [`validation`] - Field checks (names)
//! - [`ports`] - Storage traits
//! - [`validator`] - Rules spanning several entities
//! - [`service`] - Request-level operations
//! - [`memory`] - In-memory implementation of every port
//!
//! ## Example Usage
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use kitchen_core::memory::InMemoryStore;
//! use kitchen_core::service::{CreateOrderTableRequest, CreateTableGroupRequest, Services};
//!
//! # tokio_test_block_on(async {
//! let store = Arc::new(InMemoryStore::new());
//! let services = Services::new(store.repositories());
//!
//! let mut ids = Vec::new();
//! for _ in 0..2 {
//!     let table = services
//!         .tables
//!         .create(CreateOrderTableRequest { number_of_guests: 0, empty: true, table_group_id: None })
//!         .await
//!         .unwrap();
//!     ids.push(table.id);
//! }
//!
//! let group = services
//!     .table_groups
//!     .create(CreateTableGroupRequest { order_table_ids: ids })
//!     .await
//!     .unwrap();
//! assert_eq!(group.order_table_ids.len(), 2);
//! # });
//! # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod memory;
pub mod money;
pub mod ports;
pub mod service;
pub mod types;
pub mod validation;
pub mod validator;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use service::{Repositories, Services};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum length of a product, menu or menu group name, in characters.
pub const MAX_NAME_LENGTH: usize = 200;

/// Smallest number of tables a table group may hold.
pub const MIN_GROUP_TABLES: usize = 2;
