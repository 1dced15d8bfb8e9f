//! Riskforge is a derivatives pricing and portfolio-risk engine with
//! analytic, lattice, and jump-diffusion kernels plus a one-step
//! Monte-Carlo VaR/ES simulator.
//!
//! The crate combines closed-form Black-Scholes pricing and Greeks, a
//! Cox-Ross-Rubinstein binomial tree for European and American exercise,
//! the Merton jump-diffusion series, and a portfolio risk engine that
//! aggregates quantity-weighted sensitivities and derives Value-at-Risk
//! and Expected Shortfall from an empirical P&L distribution.
//!
//! Numerical conventions used throughout:
//! - time to expiry is in years; the VaR horizon is in trading days
//!   (`dt = days / 252`),
//! - analytic theta is per calendar day, rho per percentage point, vega
//!   per full unit of volatility,
//! - VaR and ES are reported as positive loss numbers,
//! - with a fixed seed the Monte-Carlo P&L distribution is bitwise
//!   reproducible for identical inputs and insertion order.
//!
//! # Quick Start
//! Price a Black-Scholes call:
//! ```rust
//! use riskforge::engines::analytic::bs_call_price;
//!
//! let px = bs_call_price(100.0, 100.0, 0.05, 0.20, 1.0).unwrap();
//! assert!(px > 10.0 && px < 11.0);
//! ```
//!
//! Compute Greeks in one pass:
//! ```rust
//! use riskforge::core::OptionKind;
//! use riskforge::engines::analytic::bs_price_and_greeks;
//!
//! let (px, greeks) = bs_price_and_greeks(OptionKind::Call, 100.0, 100.0, 0.05, 0.20, 1.0).unwrap();
//! assert!(px > 0.0 && greeks.delta > 0.0 && greeks.gamma > 0.0);
//! ```
//!
//! Invert implied volatility:
//! ```rust
//! use riskforge::core::OptionKind;
//! use riskforge::engines::analytic::bs_call_price;
//! use riskforge::vol::implied_vol;
//!
//! let sigma_true = 0.25;
//! let market = bs_call_price(100.0, 105.0, 0.02, sigma_true, 1.0).unwrap();
//! let sigma = implied_vol(OptionKind::Call, 100.0, 105.0, 0.02, 1.0, market).unwrap();
//! assert!((sigma - sigma_true).abs() < 1e-4);
//! ```
//!
//! Run portfolio risk with a fixed seed:
//! ```rust
//! use riskforge::core::OptionKind;
//! use riskforge::instruments::EuropeanOption;
//! use riskforge::market::{MarketData, MarketDataStore};
//! use riskforge::risk::{Portfolio, RiskEngine, RiskEngineConfig};
//!
//! let mut portfolio = Portfolio::new();
//! portfolio
//!     .add(
//!         Box::new(EuropeanOption::new(OptionKind::Call, 100.0, 1.0, "AAPL").unwrap()),
//!         1,
//!     )
//!     .unwrap();
//!
//! let mut market = MarketDataStore::new();
//! market.add(MarketData::new("AAPL", 100.0, 0.05, 0.2).unwrap()).unwrap();
//!
//! let engine = RiskEngine::from_config(RiskEngineConfig {
//!     var_simulations: 2_000,
//!     time_horizon_days: 1.0,
//!     seed: Some(42),
//! })
//! .unwrap();
//!
//! let result = engine.calculate_portfolio_risk(&portfolio, &market).unwrap();
//! assert!(result.total_pv > 10.0 && result.value_at_risk_95 > 0.0);
//! ```

pub mod core;
pub mod engines;
pub mod instruments;
pub mod market;
pub mod math;
pub mod risk;
pub mod vol;

/// Common imports for ergonomic usage.
pub mod prelude {
    pub use crate::core::{
        Greeks, Instrument, OptionKind, PricingError, PricingModel,
    };
    pub use crate::instruments::{AmericanOption, EuropeanOption};
    pub use crate::market::{MarketData, MarketDataStore};
    pub use crate::risk::{Portfolio, PortfolioRiskResult, RiskEngine, RiskEngineConfig};
}
