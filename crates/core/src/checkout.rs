//! Checkout planning.
//!
//! The storefront locks a shopper's cart rows (and the books they point at)
//! inside a transaction, then hands them here. [`CheckoutPlan::build`] decides
//! whether the order can be placed and what it contains. Nothing in this
//! module touches the database; the caller applies the plan.

use rust_decimal::Decimal;

use crate::{BookId, Price};

/// One locked cart line together with the book's current state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutLine {
    pub book_id: BookId,
    pub title: String,
    pub price: Price,
    pub stock: i32,
    pub active: bool,
    pub quantity: i32,
}

/// A single order item the plan will create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedItem {
    pub book_id: BookId,
    pub title: String,
    pub quantity: i32,
    /// Unit price at the moment of purchase.
    pub unit_price: Price,
}

impl PlannedItem {
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.unit_price.times(self.quantity)
    }
}

/// Reasons a cart cannot be turned into an order.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckoutError {
    #[error("Your cart is empty")]
    EmptyCart,
    #[error("{title} is no longer available")]
    BookUnavailable { title: String },
    #[error("Invalid quantity for {title}")]
    InvalidQuantity { title: String },
    #[error("Not enough stock for {title} (requested {requested}, available {available})")]
    InsufficientStock {
        title: String,
        requested: i32,
        available: i32,
    },
    #[error("Order total is too large")]
    TotalTooLarge,
}

/// Validated contents of an order, ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutPlan {
    items: Vec<PlannedItem>,
    total: Price,
}

impl CheckoutPlan {
    /// Validate cart lines and compute the order.
    ///
    /// Lines for the same book are merged before the stock check, so two
    /// lines of 3 against a stock of 5 are rejected. Items come out in the
    /// order their book first appears.
    ///
    /// # Errors
    ///
    /// Returns the first [`CheckoutError`] found.
    pub fn build(lines: &[CheckoutLine]) -> Result<Self, CheckoutError> {
        if lines.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let mut items: Vec<(PlannedItem, i32)> = Vec::with_capacity(lines.len());
        for line in lines {
            if !line.active {
                return Err(CheckoutError::BookUnavailable {
                    title: line.title.clone(),
                });
            }
            if line.quantity <= 0 {
                return Err(CheckoutError::InvalidQuantity {
                    title: line.title.clone(),
                });
            }

            if let Some((item, _)) = items.iter_mut().find(|(i, _)| i.book_id == line.book_id) {
                item.quantity = item.quantity.saturating_add(line.quantity);
            } else {
                items.push((
                    PlannedItem {
                        book_id: line.book_id,
                        title: line.title.clone(),
                        quantity: line.quantity,
                        unit_price: line.price,
                    },
                    line.stock,
                ));
            }
        }

        for (item, stock) in &items {
            if item.quantity > *stock {
                return Err(CheckoutError::InsufficientStock {
                    title: item.title.clone(),
                    requested: item.quantity,
                    available: (*stock).max(0),
                });
            }
        }

        let items: Vec<PlannedItem> = items.into_iter().map(|(item, _)| item).collect();
        let total = items
            .iter()
            .map(|i| i.unit_price.amount() * Decimal::from(i.quantity))
            .sum::<Decimal>();
        let total = Price::new(total).map_err(|_| CheckoutError::TotalTooLarge)?;
        Ok(Self { items, total })
    }

    #[must_use]
    pub fn items(&self) -> &[PlannedItem] {
        &self.items
    }

    #[must_use]
    pub const fn total(&self) -> Price {
        self.total
    }

    /// Total number of copies across all items.
    #[must_use]
    pub fn item_count(&self) -> i32 {
        self.items.iter().map(|i| i.quantity).sum()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn line(id: i32, price: &str, stock: i32, quantity: i32) -> CheckoutLine {
        CheckoutLine {
            book_id: BookId::new(id),
            title: format!("Book {id}"),
            price: Price::parse(price).unwrap(),
            stock,
            active: true,
            quantity,
        }
    }

    #[test]
    fn test_empty_cart_is_rejected() {
        assert_eq!(CheckoutPlan::build(&[]), Err(CheckoutError::EmptyCart));
    }

    #[test]
    fn test_plan_totals_and_items() {
        let plan =
            CheckoutPlan::build(&[line(1, "12.99", 50, 2), line(2, "8.50", 3, 3)]).unwrap();

        assert_eq!(plan.items().len(), 2);
        assert_eq!(plan.items()[0].subtotal(), Price::parse("25.98").unwrap());
        assert_eq!(plan.total(), Price::parse("51.48").unwrap());
        assert_eq!(plan.item_count(), 5);
    }

    #[test]
    fn test_total_matches_sum_of_subtotals() {
        let plan = CheckoutPlan::build(&[
            line(1, "0.10", 10, 3),
            line(2, "19.99", 10, 1),
            line(3, "7.25", 10, 4),
        ])
        .unwrap();
        let sum: Price = plan.items().iter().map(PlannedItem::subtotal).sum();
        assert_eq!(plan.total(), sum);
    }

    #[test]
    fn test_quantity_equal_to_stock_is_allowed() {
        assert!(CheckoutPlan::build(&[line(1, "5.00", 4, 4)]).is_ok());
    }

    #[test]
    fn test_quantity_above_stock_is_rejected() {
        let err = CheckoutPlan::build(&[line(1, "5.00", 4, 5)]).unwrap_err();
        assert_eq!(
            err,
            CheckoutError::InsufficientStock {
                title: "Book 1".to_owned(),
                requested: 5,
                available: 4,
            }
        );
    }

    #[test]
    fn test_duplicate_lines_are_merged_before_stock_check() {
        let err = CheckoutPlan::build(&[line(1, "5.00", 5, 3), line(1, "5.00", 5, 3)]).unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::InsufficientStock { requested: 6, .. }
        ));

        let plan = CheckoutPlan::build(&[line(1, "5.00", 6, 3), line(1, "5.00", 6, 3)]).unwrap();
        assert_eq!(plan.items().len(), 1);
        assert_eq!(plan.items()[0].quantity, 6);
    }

    #[test]
    fn test_inactive_book_is_rejected() {
        let mut retired = line(1, "5.00", 5, 1);
        retired.active = false;
        assert!(matches!(
            CheckoutPlan::build(&[retired]),
            Err(CheckoutError::BookUnavailable { .. })
        ));
    }

    #[test]
    fn test_non_positive_quantity_is_rejected() {
        assert!(matches!(
            CheckoutPlan::build(&[line(1, "5.00", 5, 0)]),
            Err(CheckoutError::InvalidQuantity { .. })
        ));
    }

    #[test]
    fn test_total_above_column_width_is_rejected() {
        assert!(CheckoutPlan::build(&[line(1, "99999999.99", 5, 1)]).is_ok());
        assert_eq!(
            CheckoutPlan::build(&[line(1, "99999999.99", 5, 2)]),
            Err(CheckoutError::TotalTooLarge)
        );
        assert_eq!(
            CheckoutPlan::build(&[line(1, "60000000.00", 5, 1), line(2, "40000000.00", 5, 1)]),
            Err(CheckoutError::TotalTooLarge)
        );
    }

    #[test]
    fn test_error_messages_name_the_book() {
        let err = CheckoutPlan::build(&[line(7, "5.00", 1, 2)]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Not enough stock for Book 7 (requested 2, available 1)"
        );
    }
}
