//! Client-side view of the basket.

use rust_decimal::Decimal;
use storefront_client::BasketLine;

/// Observable basket state.
///
/// `Loading` is the initial state and is re-entered on every full reload.
/// `Degraded` keeps the last authoritative lines (empty after a hard read
/// failure) together with a user-facing error banner.
#[derive(Debug, Clone, PartialEq)]
pub enum BasketState {
    Loading,
    Ready { lines: Vec<BasketLine> },
    Degraded { lines: Vec<BasketLine>, error: String },
}

impl BasketState {
    /// Lines currently visible, regardless of health.
    pub fn lines(&self) -> &[BasketLine] {
        match self {
            Self::Loading => &[],
            Self::Ready { lines } | Self::Degraded { lines, .. } => lines,
        }
    }

    /// Error banner text, if the basket is degraded.
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Degraded { error, .. } => Some(error),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// Sum of line quantities. Always recomputed from the line sequence so
    /// it cannot desynchronize from its source.
    pub fn total_items(&self) -> i64 {
        self.lines().iter().map(|line| i64::from(line.quantity)).sum()
    }

    /// Sum of `quantity * price` over the current lines.
    pub fn total_value(&self) -> Decimal {
        self.lines()
            .iter()
            .map(|line| Decimal::from(line.quantity) * line.product.price)
            .sum()
    }

    /// Quantity currently displayed for a line, if present.
    pub fn quantity_of(&self, line_id: i64) -> Option<i32> {
        self.lines()
            .iter()
            .find(|line| line.id == line_id)
            .map(|line| line.quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use storefront_client::Product;

    fn line(id: i64, product_id: i64, quantity: i32, price: Decimal, stock: i32) -> BasketLine {
        BasketLine {
            id,
            product_id,
            quantity,
            product: Product {
                id: product_id,
                name: format!("product-{}", product_id),
                price,
                description: None,
                stock,
            },
        }
    }

    #[test]
    fn totals_are_derived_from_lines() {
        let state = BasketState::Ready {
            lines: vec![
                line(1, 7, 2, dec!(9.50), 5),
                line(2, 8, 3, dec!(1.25), 10),
            ],
        };
        assert_eq!(state.total_items(), 5);
        assert_eq!(state.total_value(), dec!(22.75));
    }

    #[test]
    fn degraded_state_keeps_lines_and_totals() {
        let state = BasketState::Degraded {
            lines: vec![line(1, 7, 2, dec!(9.50), 5)],
            error: "Insufficient stock available".to_string(),
        };
        assert_eq!(state.total_items(), 2);
        assert_eq!(state.error(), Some("Insufficient stock available"));
    }

    #[test]
    fn loading_and_empty_states_total_zero() {
        assert_eq!(BasketState::Loading.total_items(), 0);
        assert_eq!(BasketState::Loading.total_value(), Decimal::ZERO);
        let empty = BasketState::Ready { lines: vec![] };
        assert_eq!(empty.total_items(), 0);
        assert_eq!(empty.total_value(), Decimal::ZERO);
    }

    #[test]
    fn quantity_lookup_by_line_id() {
        let state = BasketState::Ready {
            lines: vec![line(1, 7, 2, dec!(9.50), 5)],
        };
        assert_eq!(state.quantity_of(1), Some(2));
        assert_eq!(state.quantity_of(99), None);
    }
}
