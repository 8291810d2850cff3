//! # Checkout
//!
//! The pure half of the sale transaction engine: cart validation and line
//! pricing. The store half (conditional stock decrement, sale insert) lives
//! in `warung_db::repository::sale`.
//!
//! ## Checkout Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  validate_cart(lines)             ◄── this module, before any I/O      │
//! │     ├── empty?        → EmptyCart                                       │
//! │     ├── > 100 lines?  → CartTooLarge                                    │
//! │     └── qty <= 0?     → Validation(MustBePositive)                      │
//! │                                                                         │
//! │  for line in cart order:          ◄── warung-db, inside one transaction │
//! │     UPDATE products SET stock = stock - q                               │
//! │       WHERE id = ? AND stock >= q RETURNING price, name                 │
//! │     Receipt::push(price_line(..)) ◄── this module, checked arithmetic   │
//! │                                                                         │
//! │  INSERT sale (total = receipt.total), INSERT items, COMMIT              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::CartLine;
use crate::validation::validate_quantity;
use crate::MAX_CART_ITEMS;

/// Checks cart shape in the order clients see errors: empty, size, quantities.
///
/// ## Example
/// ```rust
/// use warung_core::checkout::validate_cart;
/// use warung_core::types::CartLine;
/// use warung_core::CoreError;
///
/// assert!(matches!(validate_cart(&[]), Err(CoreError::EmptyCart)));
/// assert!(validate_cart(&[CartLine { product_id: 1, quantity: 2 }]).is_ok());
/// ```
pub fn validate_cart(lines: &[CartLine]) -> CoreResult<()> {
    if lines.is_empty() {
        return Err(CoreError::EmptyCart);
    }

    if lines.len() > MAX_CART_ITEMS {
        return Err(CoreError::CartTooLarge {
            max: MAX_CART_ITEMS,
        });
    }

    for line in lines {
        validate_quantity(line.quantity)?;
    }

    Ok(())
}

/// A cart line priced against the product row it decremented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedLine {
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub subtotal: Money,
}

/// Prices one line: `subtotal = unit_price × quantity`.
pub fn price_line(
    line: &CartLine,
    product_name: impl Into<String>,
    unit_price: Money,
) -> CoreResult<PricedLine> {
    let subtotal = unit_price
        .checked_line_total(line.quantity)
        .ok_or(CoreError::AmountOverflow)?;

    Ok(PricedLine {
        product_id: line.product_id,
        product_name: product_name.into(),
        quantity: line.quantity,
        unit_price,
        subtotal,
    })
}

/// Priced lines in cart order plus their running total.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Receipt {
    lines: Vec<PricedLine>,
    total: Money,
    items: i64,
}

impl Receipt {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            lines: Vec::with_capacity(capacity),
            total: Money::zero(),
            items: 0,
        }
    }

    /// Appends a line, keeping `total == Σ subtotal`.
    pub fn push(&mut self, line: PricedLine) -> CoreResult<()> {
        let total = self
            .total
            .checked_add(line.subtotal)
            .ok_or(CoreError::AmountOverflow)?;
        let items = self
            .items
            .checked_add(line.quantity)
            .ok_or(CoreError::AmountOverflow)?;
        self.total = total;
        self.items = items;
        self.lines.push(line);
        Ok(())
    }

    pub fn lines(&self) -> &[PricedLine] {
        &self.lines
    }

    pub fn total(&self) -> Money {
        self.total
    }

    pub fn item_count(&self) -> i64 {
        self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;

    fn line(product_id: i64, quantity: i64) -> CartLine {
        CartLine {
            product_id,
            quantity,
        }
    }

    #[test]
    fn test_validate_cart_order_of_checks() {
        assert!(matches!(validate_cart(&[]), Err(CoreError::EmptyCart)));

        let too_many: Vec<CartLine> = (0..=MAX_CART_ITEMS as i64).map(|i| line(i, 1)).collect();
        assert!(matches!(
            validate_cart(&too_many),
            Err(CoreError::CartTooLarge { max: 100 })
        ));

        assert!(matches!(
            validate_cart(&[line(1, 2), line(2, 0)]),
            Err(CoreError::Validation(ValidationError::MustBePositive { .. }))
        ));
        assert!(validate_cart(&[line(1, 3), line(1, 3)]).is_ok());
    }

    #[test]
    fn test_receipt_totals() {
        let mut receipt = Receipt::with_capacity(2);
        receipt
            .push(price_line(&line(1, 2), "Aqua 600ml", Money::from_units(4_000)).unwrap())
            .unwrap();
        receipt
            .push(price_line(&line(2, 1), "Roti Tawar", Money::from_units(15_000)).unwrap())
            .unwrap();

        assert_eq!(receipt.total().units(), 23_000);
        assert_eq!(receipt.item_count(), 3);
        assert_eq!(receipt.lines()[0].subtotal.units(), 8_000);
        assert_eq!(receipt.lines()[1].product_name, "Roti Tawar");
    }

    #[test]
    fn test_overflow_is_rejected() {
        assert!(matches!(
            price_line(&line(1, 2), "x", Money::from_units(i64::MAX)),
            Err(CoreError::AmountOverflow)
        ));

        let mut receipt = Receipt::default();
        receipt
            .push(price_line(&line(1, 1), "x", Money::from_units(i64::MAX)).unwrap())
            .unwrap();
        let next = price_line(&line(2, 1), "y", Money::from_units(1)).unwrap();
        assert!(matches!(receipt.push(next), Err(CoreError::AmountOverflow)));
        assert_eq!(receipt.lines().len(), 1);

        let mut receipt = Receipt::default();
        receipt
            .push(price_line(&line(1, i64::MAX), "z", Money::zero()).unwrap())
            .unwrap();
        let next = price_line(&line(1, 1), "z", Money::zero()).unwrap();
        assert!(matches!(receipt.push(next), Err(CoreError::AmountOverflow)));
        assert_eq!(receipt.item_count(), i64::MAX);
    }
}
