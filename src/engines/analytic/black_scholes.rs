//! Closed-form Black-Scholes kernel for European vanilla options.
//!
//! Conventions: theta is reported per calendar day (annual theta / 365),
//! rho per percentage-point rate move (/ 100), vega per full unit of
//! volatility. When `T <= 0` or `sigma <= 0` every function falls back to
//! its degenerate-branch value (intrinsic price, moneyness-step delta,
//! zero second-order Greeks).

use crate::core::{Greeks, OptionKind, PricingError};
use crate::math::{normal_cdf, normal_pdf, validate_pricing_inputs, validate_rate};

const DAYS_PER_YEAR: f64 = 365.0;

#[inline]
fn d1_d2(spot: f64, strike: f64, rate: f64, vol: f64, expiry: f64) -> (f64, f64) {
    let sig_sqrt_t = vol * expiry.sqrt();
    let d1 = ((spot / strike).ln() + (rate + 0.5 * vol * vol) * expiry) / sig_sqrt_t;
    (d1, d1 - sig_sqrt_t)
}

#[inline]
fn is_degenerate(vol: f64, expiry: f64) -> bool {
    expiry <= 0.0 || vol <= 0.0
}

fn validate(spot: f64, strike: f64, rate: f64, vol: f64, expiry: f64) -> Result<(), PricingError> {
    validate_pricing_inputs(spot, strike, expiry, vol)?;
    validate_rate(rate)
}

/// European call price `S N(d1) - K e^{-rT} N(d2)`.
pub fn bs_call_price(
    spot: f64,
    strike: f64,
    rate: f64,
    vol: f64,
    expiry: f64,
) -> Result<f64, PricingError> {
    validate(spot, strike, rate, vol, expiry)?;
    if is_degenerate(vol, expiry) {
        return Ok((spot - strike).max(0.0));
    }
    let (d1, d2) = d1_d2(spot, strike, rate, vol, expiry);
    let df = (-rate * expiry).exp();
    Ok(spot * normal_cdf(d1) - strike * df * normal_cdf(d2))
}

/// European put price `K e^{-rT} N(-d2) - S N(-d1)`.
pub fn bs_put_price(
    spot: f64,
    strike: f64,
    rate: f64,
    vol: f64,
    expiry: f64,
) -> Result<f64, PricingError> {
    validate(spot, strike, rate, vol, expiry)?;
    if is_degenerate(vol, expiry) {
        return Ok((strike - spot).max(0.0));
    }
    let (d1, d2) = d1_d2(spot, strike, rate, vol, expiry);
    let df = (-rate * expiry).exp();
    Ok(strike * df * normal_cdf(-d2) - spot * normal_cdf(-d1))
}

/// Price dispatch on the option side.
pub fn bs_price(
    kind: OptionKind,
    spot: f64,
    strike: f64,
    rate: f64,
    vol: f64,
    expiry: f64,
) -> Result<f64, PricingError> {
    match kind {
        OptionKind::Call => bs_call_price(spot, strike, rate, vol, expiry),
        OptionKind::Put => bs_put_price(spot, strike, rate, vol, expiry),
    }
}

/// Call delta `N(d1)`; steps to 1 or 0 by moneyness in the degenerate case.
pub fn bs_call_delta(
    spot: f64,
    strike: f64,
    rate: f64,
    vol: f64,
    expiry: f64,
) -> Result<f64, PricingError> {
    validate(spot, strike, rate, vol, expiry)?;
    if is_degenerate(vol, expiry) {
        return Ok(if spot > strike { 1.0 } else { 0.0 });
    }
    let (d1, _) = d1_d2(spot, strike, rate, vol, expiry);
    Ok(normal_cdf(d1))
}

/// Put delta `N(d1) - 1`; steps to -1 or 0 by moneyness in the degenerate case.
pub fn bs_put_delta(
    spot: f64,
    strike: f64,
    rate: f64,
    vol: f64,
    expiry: f64,
) -> Result<f64, PricingError> {
    validate(spot, strike, rate, vol, expiry)?;
    if is_degenerate(vol, expiry) {
        return Ok(if spot < strike { -1.0 } else { 0.0 });
    }
    let (d1, _) = d1_d2(spot, strike, rate, vol, expiry);
    Ok(normal_cdf(d1) - 1.0)
}

/// Delta dispatch on the option side.
pub fn bs_delta(
    kind: OptionKind,
    spot: f64,
    strike: f64,
    rate: f64,
    vol: f64,
    expiry: f64,
) -> Result<f64, PricingError> {
    match kind {
        OptionKind::Call => bs_call_delta(spot, strike, rate, vol, expiry),
        OptionKind::Put => bs_put_delta(spot, strike, rate, vol, expiry),
    }
}

/// Gamma `n(d1) / (S sigma sqrt(T))`, identical for calls and puts.
pub fn bs_gamma(
    spot: f64,
    strike: f64,
    rate: f64,
    vol: f64,
    expiry: f64,
) -> Result<f64, PricingError> {
    validate(spot, strike, rate, vol, expiry)?;
    if is_degenerate(vol, expiry) {
        return Ok(0.0);
    }
    let (d1, _) = d1_d2(spot, strike, rate, vol, expiry);
    Ok(normal_pdf(d1) / (spot * vol * expiry.sqrt()))
}

/// Vega `S n(d1) sqrt(T)` per full unit of volatility.
pub fn bs_vega(
    spot: f64,
    strike: f64,
    rate: f64,
    vol: f64,
    expiry: f64,
) -> Result<f64, PricingError> {
    validate(spot, strike, rate, vol, expiry)?;
    if is_degenerate(vol, expiry) {
        return Ok(0.0);
    }
    let (d1, _) = d1_d2(spot, strike, rate, vol, expiry);
    Ok(spot * normal_pdf(d1) * expiry.sqrt())
}

/// Call theta per calendar day.
pub fn bs_call_theta(
    spot: f64,
    strike: f64,
    rate: f64,
    vol: f64,
    expiry: f64,
) -> Result<f64, PricingError> {
    validate(spot, strike, rate, vol, expiry)?;
    if is_degenerate(vol, expiry) {
        return Ok(0.0);
    }
    let (d1, d2) = d1_d2(spot, strike, rate, vol, expiry);
    let sqrt_t = expiry.sqrt();
    let df = (-rate * expiry).exp();
    let decay = -spot * normal_pdf(d1) * vol / (2.0 * sqrt_t);
    Ok((decay - rate * strike * df * normal_cdf(d2)) / DAYS_PER_YEAR)
}

/// Put theta per calendar day.
pub fn bs_put_theta(
    spot: f64,
    strike: f64,
    rate: f64,
    vol: f64,
    expiry: f64,
) -> Result<f64, PricingError> {
    validate(spot, strike, rate, vol, expiry)?;
    if is_degenerate(vol, expiry) {
        return Ok(0.0);
    }
    let (d1, d2) = d1_d2(spot, strike, rate, vol, expiry);
    let sqrt_t = expiry.sqrt();
    let df = (-rate * expiry).exp();
    let decay = -spot * normal_pdf(d1) * vol / (2.0 * sqrt_t);
    Ok((decay + rate * strike * df * normal_cdf(-d2)) / DAYS_PER_YEAR)
}

/// Theta dispatch on the option side.
pub fn bs_theta(
    kind: OptionKind,
    spot: f64,
    strike: f64,
    rate: f64,
    vol: f64,
    expiry: f64,
) -> Result<f64, PricingError> {
    match kind {
        OptionKind::Call => bs_call_theta(spot, strike, rate, vol, expiry),
        OptionKind::Put => bs_put_theta(spot, strike, rate, vol, expiry),
    }
}

/// Rho per percentage-point rate move: `+-K T e^{-rT} N(+-d2) / 100`.
pub fn bs_rho(
    kind: OptionKind,
    spot: f64,
    strike: f64,
    rate: f64,
    vol: f64,
    expiry: f64,
) -> Result<f64, PricingError> {
    validate(spot, strike, rate, vol, expiry)?;
    if is_degenerate(vol, expiry) {
        return Ok(0.0);
    }
    let (_, d2) = d1_d2(spot, strike, rate, vol, expiry);
    let df = (-rate * expiry).exp();
    let rho = match kind {
        OptionKind::Call => strike * expiry * df * normal_cdf(d2),
        OptionKind::Put => -strike * expiry * df * normal_cdf(-d2),
    };
    Ok(rho / 100.0)
}

/// Single-pass computation of price plus all Greeks.
///
/// Computes d1, d2, the discount factor, and the CDF/PDF values once and
/// derives every output from those shared intermediates, instead of
/// re-deriving them per Greek.
pub fn bs_price_and_greeks(
    kind: OptionKind,
    spot: f64,
    strike: f64,
    rate: f64,
    vol: f64,
    expiry: f64,
) -> Result<(f64, Greeks), PricingError> {
    validate(spot, strike, rate, vol, expiry)?;
    if is_degenerate(vol, expiry) {
        let price = kind.intrinsic(spot, strike);
        let delta = match kind {
            OptionKind::Call if spot > strike => 1.0,
            OptionKind::Put if spot < strike => -1.0,
            _ => 0.0,
        };
        return Ok((
            price,
            Greeks {
                delta,
                gamma: 0.0,
                vega: 0.0,
                theta: 0.0,
                rho: 0.0,
            },
        ));
    }

    let sqrt_t = expiry.sqrt();
    let (d1, d2) = d1_d2(spot, strike, rate, vol, expiry);
    let df = (-rate * expiry).exp();
    let nd1 = normal_cdf(d1);
    let nd2 = normal_cdf(d2);
    let pdf_d1 = normal_pdf(d1);
    let decay = -spot * pdf_d1 * vol / (2.0 * sqrt_t);

    let (price, delta, theta, rho) = match kind {
        OptionKind::Call => (
            spot * nd1 - strike * df * nd2,
            nd1,
            (decay - rate * strike * df * nd2) / DAYS_PER_YEAR,
            strike * expiry * df * nd2 / 100.0,
        ),
        OptionKind::Put => (
            strike * df * (1.0 - nd2) - spot * (1.0 - nd1),
            nd1 - 1.0,
            (decay + rate * strike * df * (1.0 - nd2)) / DAYS_PER_YEAR,
            -strike * expiry * df * (1.0 - nd2) / 100.0,
        ),
    };

    Ok((
        price,
        Greeks {
            delta,
            gamma: pdf_d1 / (spot * vol * sqrt_t),
            vega: spot * pdf_d1 * sqrt_t,
            theta,
            rho,
        },
    ))
}
