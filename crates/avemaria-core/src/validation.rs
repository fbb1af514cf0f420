//! # Validation Module
//!
//! Input validation for the AVEMARÍA API.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Frontend (TypeScript)                                        │
//! │  ├── Basic format checks (empty, length)                               │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: API handler (Rust)                                           │
//! │  ├── Type validation (deserialization)                                 │
//! │  └── THIS MODULE: Business rule validation                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  ├── UNIQUE constraints                                                │
//! │  └── Foreign key constraints                                           │
//! │                                                                         │
//! │  Defense in depth: Multiple layers catch different errors              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Composite validators (`validate_new_sale`, `validate_new_purchase`, ...)
//! run before any repository call, so a rejected request never touches the
//! store.

use crate::error::{ValidationError, ValidationResult};
use crate::types::{
    NewCustomer, NewExpense, NewProduct, NewPurchase, NewSale, UpdateCustomer, UpdateProduct,
};
use crate::{MAX_ITEM_QUANTITY, MAX_SALE_ITEMS};

// =============================================================================
// Field Validators
// =============================================================================

/// Validates a product reference code.
///
/// ## Rules
/// - Must not be empty
/// - Must be at most 50 characters
/// - Only alphanumeric characters, hyphens and underscores
///
/// ## Example
/// ```rust
/// use avemaria_core::validation::validate_reference;
///
/// assert!(validate_reference("CAN-001").is_ok());
/// assert!(validate_reference("").is_err());
/// ```
pub fn validate_reference(reference: &str) -> ValidationResult<()> {
    let reference = reference.trim();

    if reference.is_empty() {
        return Err(ValidationError::Required {
            field: "ref".to_string(),
        });
    }

    if reference.len() > 50 {
        return Err(ValidationError::TooLong {
            field: "ref".to_string(),
            max: 50,
        });
    }

    if !reference
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "ref".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates a product display name.
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates a customer name (at least 2 characters).
pub fn validate_customer_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.len() < 2 {
        return Err(ValidationError::TooShort {
            field: "name".to_string(),
            min: 2,
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates a line item quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates an amount that must be strictly positive (prices, revenues).
pub fn validate_positive_amount(field: &str, amount: i64) -> ValidationResult<()> {
    if amount <= 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates an amount that may be zero but not negative (shipping, stock).
pub fn validate_non_negative(field: &str, amount: i64) -> ValidationResult<()> {
    if amount < 0 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a UUID string format.
pub fn validate_uuid(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

/// Validates a free-text description (required, bounded).
pub fn validate_description(description: &str) -> ValidationResult<()> {
    let description = description.trim();

    if description.is_empty() {
        return Err(ValidationError::Required {
            field: "description".to_string(),
        });
    }

    if description.len() > 500 {
        return Err(ValidationError::TooLong {
            field: "description".to_string(),
            max: 500,
        });
    }

    Ok(())
}

// =============================================================================
// Request Validators
// =============================================================================

/// Validates a product creation request.
pub fn validate_new_product(input: &NewProduct) -> ValidationResult<()> {
    validate_reference(&input.reference)?;
    validate_product_name(&input.name)?;
    validate_positive_amount("wholesalePrice", input.wholesale_price)?;
    validate_positive_amount("retailPrice", input.retail_price)?;
    validate_non_negative("stock", input.stock)?;
    validate_non_negative("minStock", input.min_stock)?;
    Ok(())
}

/// Validates a partial product update (only the provided fields).
pub fn validate_update_product(input: &UpdateProduct) -> ValidationResult<()> {
    if let Some(reference) = &input.reference {
        validate_reference(reference)?;
    }
    if let Some(name) = &input.name {
        validate_product_name(name)?;
    }
    if let Some(price) = input.wholesale_price {
        validate_positive_amount("wholesalePrice", price)?;
    }
    if let Some(price) = input.retail_price {
        validate_positive_amount("retailPrice", price)?;
    }
    if let Some(stock) = input.stock {
        validate_non_negative("stock", stock)?;
    }
    if let Some(min_stock) = input.min_stock {
        validate_non_negative("minStock", min_stock)?;
    }
    Ok(())
}

/// Validates a sale request: non-empty item list, positive quantities and
/// unit revenues, well-formed product/customer references.
pub fn validate_new_sale(input: &NewSale) -> ValidationResult<()> {
    if input.items.is_empty() {
        return Err(ValidationError::Required {
            field: "items".to_string(),
        });
    }

    if input.items.len() > MAX_SALE_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "items".to_string(),
            min: 1,
            max: MAX_SALE_ITEMS as i64,
        });
    }

    for item in &input.items {
        validate_uuid("productId", &item.product_id)?;
        validate_quantity(item.quantity)?;
        validate_positive_amount("unitRevenue", item.unit_revenue)?;
    }

    if let Some(customer_id) = &input.customer_id {
        validate_uuid("customerId", customer_id)?;
    }

    Ok(())
}

/// Validates a purchase request: non-empty item list, positive quantities
/// and unit costs, non-negative shipping.
pub fn validate_new_purchase(input: &NewPurchase) -> ValidationResult<()> {
    if input.items.is_empty() {
        return Err(ValidationError::Required {
            field: "items".to_string(),
        });
    }

    if input.items.len() > MAX_SALE_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "items".to_string(),
            min: 1,
            max: MAX_SALE_ITEMS as i64,
        });
    }

    for item in &input.items {
        validate_uuid("productId", &item.product_id)?;
        validate_quantity(item.quantity)?;
        validate_positive_amount("unitCost", item.unit_cost)?;
    }

    validate_non_negative("shippingCost", input.shipping_cost)?;

    Ok(())
}

/// Validates a customer creation request.
pub fn validate_new_customer(input: &NewCustomer) -> ValidationResult<()> {
    validate_customer_name(&input.name)
}

/// Validates a partial customer update.
pub fn validate_update_customer(input: &UpdateCustomer) -> ValidationResult<()> {
    if let Some(name) = &input.name {
        validate_customer_name(name)?;
    }
    Ok(())
}

/// Validates a manual expense entry.
pub fn validate_new_expense(input: &NewExpense) -> ValidationResult<()> {
    validate_positive_amount("amount", input.amount)?;
    validate_description(&input.description)?;
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
