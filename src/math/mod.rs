//! Numerics primitives shared by every pricing kernel: standard normal
//! density/CDF and centralized input validation.

use statrs::function::erf::erf;

use crate::core::PricingError;

/// Standard normal probability density `exp(-x^2/2) / sqrt(2*pi)`.
pub fn normal_pdf(x: f64) -> f64 {
    const INV_SQRT_2PI: f64 = 0.398_942_280_401_432_7;
    INV_SQRT_2PI * (-0.5 * x * x).exp()
}

/// Standard normal CDF `N(x) = (1 + erf(x / sqrt(2))) / 2`.
pub fn normal_cdf(x: f64) -> f64 {
    0.5 * (1.0 + erf(x / std::f64::consts::SQRT_2))
}

/// Validates the common pricing-kernel inputs.
///
/// Every kernel routes its state through this check before touching the
/// formulas: spot and strike strictly positive, expiry and volatility
/// non-negative, and all four finite.
///
/// # Errors
/// Returns [`PricingError::InvalidInput`] naming the offending field.
pub fn validate_pricing_inputs(
    spot: f64,
    strike: f64,
    expiry: f64,
    vol: f64,
) -> Result<(), PricingError> {
    if !spot.is_finite() {
        return Err(PricingError::InvalidInput(format!(
            "spot price must be finite, got {spot}"
        )));
    }
    if spot <= 0.0 {
        return Err(PricingError::InvalidInput(format!(
            "spot price must be > 0, got {spot}"
        )));
    }
    if !strike.is_finite() {
        return Err(PricingError::InvalidInput(format!(
            "strike must be finite, got {strike}"
        )));
    }
    if strike <= 0.0 {
        return Err(PricingError::InvalidInput(format!(
            "strike must be > 0, got {strike}"
        )));
    }
    if !expiry.is_finite() {
        return Err(PricingError::InvalidInput(format!(
            "expiry must be finite, got {expiry}"
        )));
    }
    if expiry < 0.0 {
        return Err(PricingError::InvalidInput(format!(
            "expiry must be >= 0, got {expiry}"
        )));
    }
    if !vol.is_finite() {
        return Err(PricingError::InvalidInput(format!(
            "volatility must be finite, got {vol}"
        )));
    }
    if vol < 0.0 {
        return Err(PricingError::InvalidInput(format!(
            "volatility must be >= 0, got {vol}"
        )));
    }
    Ok(())
}

/// Validates a rate input in isolation (rates may be negative but not
/// NaN/infinite).
pub fn validate_rate(rate: f64) -> Result<(), PricingError> {
    if !rate.is_finite() {
        return Err(PricingError::InvalidInput(format!(
            "risk-free rate must be finite, got {rate}"
        )));
    }
    Ok(())
}
