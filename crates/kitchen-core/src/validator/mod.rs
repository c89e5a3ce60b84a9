//! # Cross-Entity Validators
//!
//! Rules that need more than one entity to decide.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Validator                  Reads                    Guards             │
//! │  ─────────────────────────  ───────────────────────  ────────────────── │
//! │  MenuPricingValidator       Product                  Menu price         │
//! │  OrderCreationValidator     Menu, OrderTable         New orders         │
//! │  TableStateValidator        OrderTable (+ veto)      Empty / guests     │
//! │  GroupTableValidator        OrderTable               Group formation    │
//! │  UngroupTableValidator      OrderTable, Order        Group dissolution  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Validators hold only storage handles. They load, check and return;
//! persisting the outcome is the caller's job. The table-empty veto and the
//! group/ungroup validators are traits so callers can substitute their own.

pub mod menu_pricing;
pub mod order_creation;
pub mod table_group;
pub mod table_state;

pub use menu_pricing::MenuPricingValidator;
pub use order_creation::OrderCreationValidator;
pub use table_group::{
    GroupTableValidator, TableGroupOrderValidator, TableGroupTableValidator,
    UngroupTableValidator,
};
pub use table_state::{
    ActiveOrderVeto, EmptyChangeVeto, NoVeto, TableStateChange, TableStateValidator,
};
