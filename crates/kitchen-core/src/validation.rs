//! # Validation Module
//!
//! Field-level input checks that run before any business rule.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: THIS MODULE - field format (blank names, length)             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Entity guards (types.rs) - single-entity invariants          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Validators (validator/) - cross-entity invariants            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 4: Database - NOT NULL, FOREIGN KEY, guarded updates            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::MAX_NAME_LENGTH;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validates a display name (product, menu, menu group).
///
/// ## Rules
/// - Must not be blank
/// - At most [`MAX_NAME_LENGTH`] characters after trimming
///
/// ## Example
/// ```rust
/// use kitchen_core::validation::validate_name;
///
/// assert!(validate_name("name", "Fried Chicken").is_ok());
/// assert!(validate_name("name", "   ").is_err());
/// ```
pub fn validate_name(field: &str, value: &str) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LENGTH,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert!(validate_name("name", "Fried Chicken").is_ok());
        assert!(validate_name("name", "후라이드치킨").is_ok());

        assert!(matches!(
            validate_name("name", ""),
            Err(ValidationError::Required { .. })
        ));
        assert!(matches!(
            validate_name("name", &"A".repeat(MAX_NAME_LENGTH + 1)),
            Err(ValidationError::TooLong { .. })
        ));
    }

    #[test]
    fn test_validate_name_counts_characters_not_bytes() {
        // 200 three-byte characters
        assert!(validate_name("name", &"닭".repeat(MAX_NAME_LENGTH)).is_ok());
    }
}
