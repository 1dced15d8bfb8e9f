//! Black-Scholes implied-volatility inversion.
//!
//! Newton-Raphson on the price residual with vega as the derivative.
//! The iterate is clamped into `(0.01, 10.0)` after every step; a vega
//! below `1e-10` aborts the search as numerically unusable.

use crate::core::{OptionKind, PricingError};
use crate::engines::analytic::black_scholes::{bs_price, bs_vega};
use crate::math::{validate_pricing_inputs, validate_rate};

const INITIAL_GUESS: f64 = 0.3;
const PRICE_TOLERANCE: f64 = 1e-6;
const MAX_ITERATIONS: usize = 100;
const VEGA_FLOOR: f64 = 1e-10;
const VOL_LOWER: f64 = 0.01;
const VOL_UPPER: f64 = 10.0;
const INTRINSIC_SLACK: f64 = 1e-10;

/// Recovers the Black-Scholes volatility implied by a market price.
///
/// # Errors
/// - [`PricingError::InvalidInput`] if the price violates no-arbitrage
///   bounds (below intrinsic beyond `1e-10`, or above `S` for calls /
///   `K e^{-rT}` for puts), or if `expiry <= 0`.
/// - [`PricingError::NumericalError`] when vega collapses below `1e-10`.
/// - [`PricingError::ConvergenceFailure`] after 100 iterations.
///
/// # Examples
/// ```
/// use riskforge::core::OptionKind;
/// use riskforge::engines::analytic::bs_call_price;
/// use riskforge::vol::implied_vol;
///
/// let market = bs_call_price(100.0, 100.0, 0.05, 0.25, 1.0).unwrap();
/// let sigma = implied_vol(OptionKind::Call, 100.0, 100.0, 0.05, 1.0, market).unwrap();
/// assert!((sigma - 0.25).abs() < 1e-6);
/// ```
pub fn implied_vol(
    kind: OptionKind,
    spot: f64,
    strike: f64,
    rate: f64,
    expiry: f64,
    market_price: f64,
) -> Result<f64, PricingError> {
    validate_pricing_inputs(spot, strike, expiry, 0.0)?;
    validate_rate(rate)?;
    if expiry <= 0.0 {
        return Err(PricingError::InvalidInput(
            "expiry must be > 0 for implied volatility".to_string(),
        ));
    }
    if !market_price.is_finite() {
        return Err(PricingError::InvalidInput(format!(
            "market price must be finite, got {market_price}"
        )));
    }

    let df = (-rate * expiry).exp();
    let intrinsic = match kind {
        OptionKind::Call => (spot - strike * df).max(0.0),
        OptionKind::Put => (strike * df - spot).max(0.0),
    };
    let upper_bound = match kind {
        OptionKind::Call => spot,
        OptionKind::Put => strike * df,
    };
    if market_price < intrinsic - INTRINSIC_SLACK {
        return Err(PricingError::InvalidInput(format!(
            "market price {market_price} is below intrinsic value {intrinsic}"
        )));
    }
    if market_price > upper_bound {
        return Err(PricingError::InvalidInput(format!(
            "market price {market_price} exceeds no-arbitrage bound {upper_bound}"
        )));
    }

    let mut sigma = INITIAL_GUESS;
    for _ in 0..MAX_ITERATIONS {
        let residual = bs_price(kind, spot, strike, rate, sigma, expiry)? - market_price;
        if residual.abs() < PRICE_TOLERANCE {
            return Ok(sigma);
        }

        let vega = bs_vega(spot, strike, rate, sigma, expiry)?;
        if vega.abs() < VEGA_FLOOR {
            return Err(PricingError::NumericalError(format!(
                "vega {vega} too small to continue implied-volatility search"
            )));
        }

        sigma = (sigma - residual / vega).clamp(VOL_LOWER, VOL_UPPER);
    }

    Err(PricingError::ConvergenceFailure(format!(
        "implied volatility did not converge within {MAX_ITERATIONS} iterations"
    )))
}
