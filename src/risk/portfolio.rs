//! Portfolio container: an insertion-ordered sequence of owned
//! instruments with signed quantities.

use crate::core::{Instrument, PricingError};

/// One position: an exclusively-owned instrument and a signed quantity.
/// Negative quantities are short positions; zero is allowed.
#[derive(Debug)]
pub struct PortfolioPosition {
    /// The owned instrument.
    pub instrument: Box<dyn Instrument>,
    /// Signed contract count.
    pub quantity: i64,
}

/// Insertion-ordered collection of positions. The portfolio is the
/// exclusive owner of its instruments; nothing else holds a reference to
/// them, and the ownership tree stays flat.
#[derive(Debug, Default)]
pub struct Portfolio {
    positions: Vec<PortfolioPosition>,
}

impl Portfolio {
    /// Creates an empty portfolio.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a position.
    ///
    /// # Errors
    /// [`PricingError::InvalidInput`] if the instrument reports an empty
    /// asset id or fails its own validation.
    pub fn add(
        &mut self,
        instrument: Box<dyn Instrument>,
        quantity: i64,
    ) -> Result<(), PricingError> {
        if instrument.asset_id().is_empty() {
            return Err(PricingError::InvalidInput(
                "instrument asset id cannot be empty".to_string(),
            ));
        }
        if !instrument.is_valid() {
            return Err(PricingError::InvalidInput(format!(
                "instrument {} for {} failed validation",
                instrument.kind_label(),
                instrument.asset_id()
            )));
        }
        self.positions.push(PortfolioPosition {
            instrument,
            quantity,
        });
        Ok(())
    }

    /// Removes and returns the position at `index`.
    ///
    /// # Errors
    /// [`PricingError::RangeError`] when the index is out of bounds.
    pub fn remove(&mut self, index: usize) -> Result<PortfolioPosition, PricingError> {
        if index >= self.positions.len() {
            return Err(PricingError::RangeError(format!(
                "position index {index} out of bounds for portfolio of size {}",
                self.positions.len()
            )));
        }
        Ok(self.positions.remove(index))
    }

    /// Replaces the quantity of the position at `index`.
    ///
    /// # Errors
    /// [`PricingError::RangeError`] when the index is out of bounds.
    pub fn update_quantity(&mut self, index: usize, quantity: i64) -> Result<(), PricingError> {
        let len = self.positions.len();
        let position = self.positions.get_mut(index).ok_or_else(|| {
            PricingError::RangeError(format!(
                "position index {index} out of bounds for portfolio of size {len}"
            ))
        })?;
        position.quantity = quantity;
        Ok(())
    }

    /// Signed sum of quantities across positions on the given asset.
    ///
    /// # Errors
    /// [`PricingError::RangeError`] if the sum overflows `i64`.
    pub fn total_quantity_for_asset(&self, asset_id: &str) -> Result<i64, PricingError> {
        let mut total: i64 = 0;
        for position in &self.positions {
            if position.instrument.asset_id() == asset_id {
                total = total.checked_add(position.quantity).ok_or_else(|| {
                    PricingError::RangeError(format!(
                        "quantity sum for {asset_id} overflows i64"
                    ))
                })?;
            }
        }
        Ok(total)
    }

    /// Positions in insertion order.
    pub fn positions(&self) -> &[PortfolioPosition] {
        &self.positions
    }

    /// Number of positions.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Whether the portfolio holds no positions.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Drops every position, releasing the owned instruments.
    pub fn clear(&mut self) {
        self.positions.clear();
    }

    /// Pre-allocates room for `additional` more positions.
    pub fn reserve(&mut self, additional: usize) {
        self.positions.reserve(additional);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::OptionKind;
    use crate::instruments::{AmericanOption, EuropeanOption};

    fn call(asset: &str) -> Box<dyn Instrument> {
        Box::new(EuropeanOption::new(OptionKind::Call, 100.0, 1.0, asset).unwrap())
    }

    #[test]
    fn preserves_insertion_order() {
        let mut portfolio = Portfolio::new();
        portfolio.add(call("AAPL"), 2).unwrap();
        portfolio
            .add(
                Box::new(AmericanOption::new(OptionKind::Put, 90.0, 0.5, "MSFT").unwrap()),
                -1,
            )
            .unwrap();
        portfolio.add(call("AAPL"), 3).unwrap();

        let ids: Vec<&str> = portfolio
            .positions()
            .iter()
            .map(|p| p.instrument.asset_id())
            .collect();
        assert_eq!(ids, ["AAPL", "MSFT", "AAPL"]);
        assert_eq!(portfolio.len(), 3);
    }

    #[test]
    fn remove_and_update_are_range_checked() {
        let mut portfolio = Portfolio::new();
        portfolio.add(call("AAPL"), 1).unwrap();

        assert!(matches!(
            portfolio.remove(5),
            Err(PricingError::RangeError(_))
        ));
        assert!(matches!(
            portfolio.update_quantity(1, 4),
            Err(PricingError::RangeError(_))
        ));

        portfolio.update_quantity(0, -7).unwrap();
        assert_eq!(portfolio.positions()[0].quantity, -7);

        let removed = portfolio.remove(0).unwrap();
        assert_eq!(removed.quantity, -7);
        assert!(portfolio.is_empty());
    }

    #[test]
    fn total_quantity_sums_per_asset_with_overflow_check() {
        let mut portfolio = Portfolio::new();
        portfolio.add(call("AAPL"), 2).unwrap();
        portfolio.add(call("MSFT"), 10).unwrap();
        portfolio.add(call("AAPL"), -5).unwrap();

        assert_eq!(portfolio.total_quantity_for_asset("AAPL").unwrap(), -3);
        assert_eq!(portfolio.total_quantity_for_asset("MSFT").unwrap(), 10);
        assert_eq!(portfolio.total_quantity_for_asset("TSLA").unwrap(), 0);

        portfolio.add(call("AAPL"), i64::MAX).unwrap();
        portfolio.add(call("AAPL"), i64::MAX).unwrap();
        assert!(matches!(
            portfolio.total_quantity_for_asset("AAPL"),
            Err(PricingError::RangeError(_))
        ));
    }

    #[test]
    fn clear_releases_everything() {
        let mut portfolio = Portfolio::new();
        portfolio.reserve(8);
        portfolio.add(call("AAPL"), 1).unwrap();
        portfolio.clear();
        assert!(portfolio.is_empty());
        assert_eq!(portfolio.total_quantity_for_asset("AAPL").unwrap(), 0);
    }
}
