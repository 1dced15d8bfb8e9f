//! Per-asset market snapshot used by all pricing kernels.
//!
//! A [`MarketData`] record is validated on construction and on every
//! mutation: spot strictly positive, volatility and dividend yield
//! non-negative, rate finite (possibly negative), no NaN or infinity
//! anywhere. The dividend yield is carried for data-model completeness
//! but is not consumed by any pricing kernel.

use crate::core::PricingError;

/// Validated market snapshot for a single asset.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketData {
    asset_id: String,
    spot_price: f64,
    risk_free_rate: f64,
    volatility: f64,
    dividend_yield: f64,
}

impl MarketData {
    /// Builds a snapshot with zero dividend yield.
    ///
    /// # Errors
    /// Returns [`PricingError::InvalidInput`] naming the offending field.
    ///
    /// # Examples
    /// ```
    /// use riskforge::market::MarketData;
    ///
    /// let md = MarketData::new("AAPL", 100.0, 0.05, 0.2).unwrap();
    /// assert_eq!(md.spot_price(), 100.0);
    /// assert!(MarketData::new("", 100.0, 0.05, 0.2).is_err());
    /// ```
    pub fn new(
        asset_id: impl Into<String>,
        spot_price: f64,
        risk_free_rate: f64,
        volatility: f64,
    ) -> Result<Self, PricingError> {
        Self::with_dividend_yield(asset_id, spot_price, risk_free_rate, volatility, 0.0)
    }

    /// Builds a snapshot with an explicit continuous dividend yield.
    pub fn with_dividend_yield(
        asset_id: impl Into<String>,
        spot_price: f64,
        risk_free_rate: f64,
        volatility: f64,
        dividend_yield: f64,
    ) -> Result<Self, PricingError> {
        let md = Self {
            asset_id: asset_id.into(),
            spot_price,
            risk_free_rate,
            volatility,
            dividend_yield,
        };
        md.validate()?;
        Ok(md)
    }

    /// Re-checks every field of the record.
    pub fn validate(&self) -> Result<(), PricingError> {
        if self.asset_id.is_empty() {
            return Err(PricingError::InvalidInput(
                "asset id cannot be empty".to_string(),
            ));
        }
        if !self.spot_price.is_finite() || self.spot_price <= 0.0 {
            return Err(PricingError::InvalidInput(format!(
                "spot price for {} must be finite and > 0, got {}",
                self.asset_id, self.spot_price
            )));
        }
        if !self.risk_free_rate.is_finite() {
            return Err(PricingError::InvalidInput(format!(
                "risk-free rate for {} must be finite, got {}",
                self.asset_id, self.risk_free_rate
            )));
        }
        if !self.volatility.is_finite() || self.volatility < 0.0 {
            return Err(PricingError::InvalidInput(format!(
                "volatility for {} must be finite and >= 0, got {}",
                self.asset_id, self.volatility
            )));
        }
        if !self.dividend_yield.is_finite() || self.dividend_yield < 0.0 {
            return Err(PricingError::InvalidInput(format!(
                "dividend yield for {} must be finite and >= 0, got {}",
                self.asset_id, self.dividend_yield
            )));
        }
        Ok(())
    }

    /// Identifier of the asset this snapshot belongs to.
    #[inline]
    pub fn asset_id(&self) -> &str {
        &self.asset_id
    }

    /// Spot price.
    #[inline]
    pub fn spot_price(&self) -> f64 {
        self.spot_price
    }

    /// Continuously compounded risk-free rate.
    #[inline]
    pub fn risk_free_rate(&self) -> f64 {
        self.risk_free_rate
    }

    /// Annualized volatility.
    #[inline]
    pub fn volatility(&self) -> f64 {
        self.volatility
    }

    /// Continuous dividend yield (carried, not priced).
    #[inline]
    pub fn dividend_yield(&self) -> f64 {
        self.dividend_yield
    }

    /// Replaces the spot price, re-validating the record.
    pub fn set_spot_price(&mut self, spot_price: f64) -> Result<(), PricingError> {
        let previous = std::mem::replace(&mut self.spot_price, spot_price);
        self.validate().inspect_err(|_| self.spot_price = previous)
    }

    /// Replaces the risk-free rate, re-validating the record.
    pub fn set_risk_free_rate(&mut self, risk_free_rate: f64) -> Result<(), PricingError> {
        let previous = std::mem::replace(&mut self.risk_free_rate, risk_free_rate);
        self.validate()
            .inspect_err(|_| self.risk_free_rate = previous)
    }

    /// Replaces the volatility, re-validating the record.
    pub fn set_volatility(&mut self, volatility: f64) -> Result<(), PricingError> {
        let previous = std::mem::replace(&mut self.volatility, volatility);
        self.validate().inspect_err(|_| self.volatility = previous)
    }

    /// Replaces the dividend yield, re-validating the record.
    pub fn set_dividend_yield(&mut self, dividend_yield: f64) -> Result<(), PricingError> {
        let previous = std::mem::replace(&mut self.dividend_yield, dividend_yield);
        self.validate()
            .inspect_err(|_| self.dividend_yield = previous)
    }

    /// Clones the snapshot with a new spot, leaving every other field
    /// untouched. This is the shock path used by the Monte-Carlo engine.
    pub fn bump_spot(&self, spot_price: f64) -> Result<Self, PricingError> {
        let mut shocked = self.clone();
        shocked.spot_price = spot_price;
        shocked.validate()?;
        Ok(shocked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bad_constructor_inputs() {
        assert!(MarketData::new("", 100.0, 0.05, 0.2).is_err());
        assert!(MarketData::new("AAPL", 0.0, 0.05, 0.2).is_err());
        assert!(MarketData::new("AAPL", -5.0, 0.05, 0.2).is_err());
        assert!(MarketData::new("AAPL", 100.0, f64::NAN, 0.2).is_err());
        assert!(MarketData::new("AAPL", 100.0, 0.05, -0.1).is_err());
        assert!(MarketData::with_dividend_yield("AAPL", 100.0, 0.05, 0.2, -0.01).is_err());
        assert!(MarketData::new("AAPL", f64::INFINITY, 0.05, 0.2).is_err());
    }

    #[test]
    fn accepts_negative_rates_and_zero_vol() {
        let md = MarketData::new("BUND", 100.0, -0.005, 0.0).unwrap();
        assert_eq!(md.risk_free_rate(), -0.005);
        assert_eq!(md.volatility(), 0.0);
        assert_eq!(md.dividend_yield(), 0.0);
    }

    #[test]
    fn setters_validate_and_roll_back() {
        let mut md = MarketData::new("AAPL", 100.0, 0.05, 0.2).unwrap();

        md.set_spot_price(120.0).unwrap();
        assert_eq!(md.spot_price(), 120.0);

        assert!(md.set_spot_price(-1.0).is_err());
        assert_eq!(md.spot_price(), 120.0);

        assert!(md.set_volatility(f64::NAN).is_err());
        assert_eq!(md.volatility(), 0.2);
    }

    #[test]
    fn bump_spot_changes_only_spot() {
        let md = MarketData::with_dividend_yield("AAPL", 100.0, 0.05, 0.2, 0.01).unwrap();
        let shocked = md.bump_spot(104.2).unwrap();

        assert_eq!(shocked.spot_price(), 104.2);
        assert_eq!(shocked.risk_free_rate(), md.risk_free_rate());
        assert_eq!(shocked.volatility(), md.volatility());
        assert_eq!(shocked.dividend_yield(), md.dividend_yield());
        assert_eq!(shocked.asset_id(), md.asset_id());

        assert!(md.bump_spot(0.0).is_err());
        assert!(md.bump_spot(f64::NAN).is_err());
    }
}
