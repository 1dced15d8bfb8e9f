//! Merton jump-diffusion kernel.
//!
//! The European price under Merton's model is a Poisson-weighted series of
//! Black-Scholes prices with jump-adjusted drift and variance. Weights are
//! computed in log space (`exp(n ln(lambda T) - lambda T - ln Gamma(n+1))`)
//! so large jump counts cannot overflow the factorial.

use statrs::function::gamma::ln_gamma;

use crate::core::{OptionKind, PricingError};
use crate::engines::analytic::black_scholes::bs_price;
use crate::math::{validate_pricing_inputs, validate_rate};

/// Default cap on the number of series terms.
pub const DEFAULT_MAX_JUMPS: usize = 50;

const WEIGHT_FLOOR: f64 = 1e-10;
const TAIL_WEIGHT_FLOOR: f64 = 1e-8;
const CUMULATIVE_CUTOFF: f64 = 0.9999;

/// Poisson weight `P(N = n)` for intensity-time `lambda_t`.
fn poisson_weight(n: usize, lambda_t: f64) -> f64 {
    if lambda_t == 0.0 {
        return if n == 0 { 1.0 } else { 0.0 };
    }
    let n_f = n as f64;
    (n_f * lambda_t.ln() - lambda_t - ln_gamma(n_f + 1.0)).exp()
}

/// Merton jump-diffusion price with the default series cap.
pub fn merton_price(
    kind: OptionKind,
    spot: f64,
    strike: f64,
    rate: f64,
    vol: f64,
    expiry: f64,
    jump_intensity: f64,
    jump_mean: f64,
    jump_vol: f64,
) -> Result<f64, PricingError> {
    merton_price_with_terms(
        kind,
        spot,
        strike,
        rate,
        vol,
        expiry,
        jump_intensity,
        jump_mean,
        jump_vol,
        DEFAULT_MAX_JUMPS,
    )
}

/// Merton jump-diffusion price with an explicit cap on series terms.
///
/// The series terminates when a weight drops below `1e-10`, when the
/// cumulative weight exceeds 0.9999 and the current weight is below
/// `1e-8`, or after `max_jumps` terms.
///
/// # Errors
/// - [`PricingError::InvalidInput`] on negative intensity or jump vol.
/// - [`PricingError::NumericalError`] if the accumulated value is not
///   finite.
#[allow(clippy::too_many_arguments)]
pub fn merton_price_with_terms(
    kind: OptionKind,
    spot: f64,
    strike: f64,
    rate: f64,
    vol: f64,
    expiry: f64,
    jump_intensity: f64,
    jump_mean: f64,
    jump_vol: f64,
    max_jumps: usize,
) -> Result<f64, PricingError> {
    validate_pricing_inputs(spot, strike, expiry, vol)?;
    validate_rate(rate)?;
    if !jump_intensity.is_finite() || jump_intensity < 0.0 {
        return Err(PricingError::InvalidInput(format!(
            "jump intensity must be finite and >= 0, got {jump_intensity}"
        )));
    }
    if !jump_mean.is_finite() {
        return Err(PricingError::InvalidInput(format!(
            "jump mean must be finite, got {jump_mean}"
        )));
    }
    if !jump_vol.is_finite() || jump_vol < 0.0 {
        return Err(PricingError::InvalidInput(format!(
            "jump volatility must be finite and >= 0, got {jump_vol}"
        )));
    }

    if expiry <= 0.0 {
        return Ok(kind.intrinsic(spot, strike));
    }

    let lambda_t = jump_intensity * expiry;
    if lambda_t == 0.0 {
        return bs_price(kind, spot, strike, rate, vol, expiry);
    }

    // Mean relative jump size, used for the drift compensator.
    let kappa = (jump_mean + 0.5 * jump_vol * jump_vol).exp() - 1.0;
    let variance_per_jump = jump_vol * jump_vol / expiry;
    let drift_per_jump = (jump_mean + 0.5 * jump_vol * jump_vol) / expiry;

    let mut value = 0.0;
    let mut cumulative_weight = 0.0;

    for n in 0..=max_jumps {
        let weight = poisson_weight(n, lambda_t);
        if weight < WEIGHT_FLOOR {
            break;
        }
        cumulative_weight += weight;

        let n_f = n as f64;
        let vol_n = (vol * vol + n_f * variance_per_jump).sqrt();
        let rate_n = rate - jump_intensity * kappa + n_f * drift_per_jump;

        value += weight * bs_price(kind, spot, strike, rate_n, vol_n, expiry)?;

        if cumulative_weight > CUMULATIVE_CUTOFF && weight < TAIL_WEIGHT_FLOOR {
            break;
        }
    }

    if !value.is_finite() {
        return Err(PricingError::NumericalError(
            "jump-diffusion series did not produce a finite price".to_string(),
        ));
    }
    Ok(value)
}
