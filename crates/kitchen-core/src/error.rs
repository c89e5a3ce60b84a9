//! # Error Types
//!
//! Domain-specific error types for kitchen-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  kitchen-core errors (this file)                                       │
//! │  ├── CoreError        - Invariant violations, missing references       │
//! │  └── ValidationError  - Field-level input failures                     │
//! │                                                                         │
//! │  kitchen-db errors (separate crate)                                    │
//! │  └── DbError          - Database failures, converted into CoreError    │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError ← DbError                           │
//! │        CoreError::code() → caller maps to a user-visible failure       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every failure is raised where it is detected and propagates unchanged.
//! Nothing is retried, and a failed validation leaves no persisted mutation.

use thiserror::Error;

use crate::money::Money;

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations raised by entities, validators and services.
#[derive(Debug, Error)]
pub enum CoreError {
    // -------------------------------------------------------------------------
    // Menu pricing
    // -------------------------------------------------------------------------
    /// Menu or product price is negative.
    #[error("Price must not be negative: {price}")]
    PriceBelowZero { price: Money },

    /// Menu price is larger than the sum of its products.
    ///
    /// ## When This Occurs
    /// ```text
    /// Fried Chicken (16000) × 1 = 16000
    /// Menu price: 18000
    ///      │
    ///      ▼
    /// PriceExceedsProductSum { price: 18000, product_sum: 16000 }
    /// ```
    #[error("Menu price {price} exceeds product sum {product_sum}")]
    PriceExceedsProductSum { price: Money, product_sum: Money },

    /// A menu must contain at least one product.
    #[error("Menu must contain at least one product")]
    EmptyMenuProducts,

    // -------------------------------------------------------------------------
    // Missing references
    // -------------------------------------------------------------------------
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    #[error("Menu group not found: {0}")]
    MenuGroupNotFound(String),

    #[error("Menu not found: {0}")]
    MenuNotFound(String),

    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Order table not found: {0}")]
    OrderTableNotFound(String),

    #[error("Table group not found: {0}")]
    TableGroupNotFound(String),

    // -------------------------------------------------------------------------
    // Orders
    // -------------------------------------------------------------------------
    /// An order must contain at least one line item.
    #[error("Order must contain at least one line item")]
    EmptyOrderLineItems,

    /// Orders cannot be placed against an empty table.
    #[error("Order table {0} is empty")]
    OrderTableIsEmpty(String),

    /// COMPLETION is terminal; no further status change is accepted.
    #[error("Order {0} is already completed")]
    OrderAlreadyCompleted(String),

    /// Quantity on a menu product or order line item is negative.
    #[error("Quantity must not be negative: {0}")]
    NegativeQuantity(i64),

    // -------------------------------------------------------------------------
    // Tables
    // -------------------------------------------------------------------------
    /// The table belongs to a group, so its empty flag is frozen.
    #[error("Order table {table_id} belongs to table group {table_group_id}")]
    TableInGroup {
        table_id: String,
        table_group_id: String,
    },

    /// The table still has a COOKING or MEAL order.
    #[error("Order table {0} has an order that is not completed")]
    ActiveOrderExists(String),

    #[error("Number of guests must not be negative: {0}")]
    NegativeGuestCount(i32),

    /// Guest count can only change while the table is occupied.
    #[error("Order table {0} is empty")]
    TableIsEmpty(String),

    // -------------------------------------------------------------------------
    // Table groups
    // -------------------------------------------------------------------------
    /// Some requested ids did not resolve (missing rows or duplicates).
    #[error("Requested {requested} tables but found {found}")]
    TableSetIncomplete { requested: usize, found: usize },

    #[error("Table group needs at least {min} tables, got {found}")]
    GroupTooSmall { found: usize, min: usize },

    /// Only empty tables can be grouped.
    #[error("Order table {0} is not empty")]
    TableNotEmpty(String),

    /// Some order on the group's tables is still COOKING or MEAL.
    #[error("Table group {0} has orders that are not completed")]
    OrdersNotCompleted(String),

    // -------------------------------------------------------------------------
    // Infrastructure
    // -------------------------------------------------------------------------
    /// The store rejected a write because the row changed after validation.
    #[error("{entity} {id} was modified concurrently")]
    ConcurrentModification { entity: String, id: String },

    /// Backing store failure.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates a ConcurrentModification error.
    pub fn concurrent(entity: impl Into<String>, id: impl Into<String>) -> Self {
        CoreError::ConcurrentModification {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Stable machine-readable code for this kind of failure.
    ///
    /// Callers map these to user-visible responses; the code never changes
    /// when the display message does.
    pub fn code(&self) -> &'static str {
        match self {
            CoreError::PriceBelowZero { .. } => "PRICE_BELOW_ZERO",
            CoreError::PriceExceedsProductSum { .. } => "PRICE_EXCEEDS_PRODUCT_SUM",
            CoreError::EmptyMenuProducts => "EMPTY_MENU_PRODUCTS",
            CoreError::ProductNotFound(_) => "PRODUCT_NOT_FOUND",
            CoreError::MenuGroupNotFound(_) => "MENU_GROUP_NOT_FOUND",
            CoreError::MenuNotFound(_) => "MENU_NOT_FOUND",
            CoreError::OrderNotFound(_) => "ORDER_NOT_FOUND",
            CoreError::OrderTableNotFound(_) => "ORDER_TABLE_NOT_FOUND",
            CoreError::TableGroupNotFound(_) => "TABLE_GROUP_NOT_FOUND",
            CoreError::EmptyOrderLineItems => "EMPTY_ORDER_LINE_ITEMS",
            CoreError::OrderTableIsEmpty(_) => "ORDER_TABLE_IS_EMPTY",
            CoreError::OrderAlreadyCompleted(_) => "ORDER_ALREADY_COMPLETED",
            CoreError::NegativeQuantity(_) => "NEGATIVE_QUANTITY",
            CoreError::TableInGroup { .. } => "TABLE_IN_GROUP",
            CoreError::ActiveOrderExists(_) => "ACTIVE_ORDER_EXISTS",
            CoreError::NegativeGuestCount(_) => "NEGATIVE_GUEST_COUNT",
            CoreError::TableIsEmpty(_) => "TABLE_IS_EMPTY",
            CoreError::TableSetIncomplete { .. } => "TABLE_SET_INCOMPLETE",
            CoreError::GroupTooSmall { .. } => "GROUP_TOO_SMALL",
            CoreError::TableNotEmpty(_) => "TABLE_NOT_EMPTY",
            CoreError::OrdersNotCompleted(_) => "ORDERS_NOT_COMPLETED",
            CoreError::ConcurrentModification { .. } => "CONCURRENT_MODIFICATION",
            CoreError::Storage(_) => "STORAGE_ERROR",
            CoreError::Validation(_) => "VALIDATION_ERROR",
        }
    }

    /// True for failures caused by a reference that does not resolve.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CoreError::ProductNotFound(_)
                | CoreError::MenuGroupNotFound(_)
                | CoreError::MenuNotFound(_)
                | CoreError::OrderNotFound(_)
                | CoreError::OrderTableNotFound(_)
                | CoreError::TableGroupNotFound(_)
        )
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised when a request field doesn't meet basic requirements, before
/// any business rule runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::PriceExceedsProductSum {
            price: Money::from_cents(18000),
            product_sum: Money::from_cents(16000),
        };
        assert_eq!(
            err.to_string(),
            "Menu price $180.00 exceeds product sum $160.00"
        );

        let err = CoreError::GroupTooSmall { found: 1, min: 2 };
        assert_eq!(err.to_string(), "Table group needs at least 2 tables, got 1");
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            CoreError::OrderAlreadyCompleted("o-1".to_string()).code(),
            "ORDER_ALREADY_COMPLETED"
        );
        assert_eq!(
            CoreError::TableSetIncomplete {
                requested: 3,
                found: 2
            }
            .code(),
            "TABLE_SET_INCOMPLETE"
        );
        assert_eq!(CoreError::concurrent("Order", "o-1").code(), "CONCURRENT_MODIFICATION");
    }

    #[test]
    fn test_not_found_classification() {
        assert!(CoreError::MenuNotFound("m-1".to_string()).is_not_found());
        assert!(!CoreError::TableIsEmpty("t-1".to_string()).is_not_found());
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "name".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
        assert_eq!(core_err.code(), "VALIDATION_ERROR");
    }
}
