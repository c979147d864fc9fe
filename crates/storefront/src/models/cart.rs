//! Shopping cart types.

use bookstore_core::{BookId, CartItemId, Price};

/// A cart row joined with its book.
#[derive(Debug, Clone)]
pub struct CartLine {
    pub id: CartItemId,
    pub book_id: BookId,
    pub title: String,
    pub author: String,
    pub cover_image: Option<String>,
    pub price: Price,
    pub stock: i32,
    /// False once the book has been taken off sale.
    pub is_active: bool,
    pub quantity: i32,
}

impl CartLine {
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.price.times(self.quantity)
    }

    /// Whether the requested quantity can currently be fulfilled.
    #[must_use]
    pub const fn within_stock(&self) -> bool {
        self.quantity <= self.stock
    }
}

/// A shopper's cart.
#[derive(Debug, Clone, Default)]
pub struct Cart {
    pub lines: Vec<CartLine>,
}

impl Cart {
    #[must_use]
    /// Sum of the lines that can still be bought.
    pub fn total(&self) -> Price {
        self.lines
            .iter()
            .filter(|l| l.is_active)
            .map(CartLine::subtotal)
            .sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// First line whose quantity exceeds stock, if any.
    #[must_use]
    pub fn first_over_stock(&self) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.is_active && !l.within_stock())
    }

    /// First line whose book is no longer on sale, if any.
    #[must_use]
    pub fn first_unavailable(&self) -> Option<&CartLine> {
        self.lines.iter().find(|l| !l.is_active)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn line(id: i32, price: &str, stock: i32, quantity: i32) -> CartLine {
        CartLine {
            id: CartItemId::new(id),
            book_id: BookId::new(id),
            title: format!("Book {id}"),
            author: "Author".to_string(),
            cover_image: None,
            price: Price::parse(price).unwrap(),
            stock,
            is_active: true,
            quantity,
        }
    }

    #[test]
    fn test_cart_total() {
        let cart = Cart {
            lines: vec![line(1, "12.99", 10, 2), line(2, "5.00", 10, 1)],
        };
        assert_eq!(cart.total().to_string(), "$30.98");
        assert!(!cart.is_empty());
    }

    #[test]
    fn test_first_over_stock() {
        let cart = Cart {
            lines: vec![line(1, "1.00", 5, 5), line(2, "1.00", 1, 2)],
        };
        assert_eq!(cart.first_over_stock().unwrap().title, "Book 2");
        assert!(Cart::default().first_over_stock().is_none());
    }

    #[test]
    fn test_inactive_line_is_flagged_and_not_charged() {
        let mut gone = line(2, "5.00", 10, 1);
        gone.is_active = false;
        let cart = Cart {
            lines: vec![line(1, "12.99", 10, 2), gone],
        };
        assert_eq!(cart.total().to_string(), "$25.98");
        assert_eq!(cart.first_unavailable().unwrap().title, "Book 2");
        assert!(cart.first_over_stock().is_none());
    }
}
