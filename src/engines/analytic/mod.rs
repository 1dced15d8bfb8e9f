//! Closed-form pricing kernels.

pub mod black_scholes;
pub mod merton;

pub use black_scholes::{
    bs_call_delta, bs_call_price, bs_call_theta, bs_delta, bs_gamma, bs_price,
    bs_price_and_greeks, bs_put_delta, bs_put_price, bs_put_theta, bs_rho, bs_theta, bs_vega,
};
pub use merton::{DEFAULT_MAX_JUMPS, merton_price, merton_price_with_terms};
