//! Portfolio-level risk: position container, aggregation, and the
//! Monte-Carlo VaR/ES engine.

pub mod engine;
pub mod portfolio;

pub use engine::{
    DEFAULT_VAR_SIMULATIONS, PortfolioRiskResult, RiskEngine, RiskEngineConfig,
};
pub use portfolio::{Portfolio, PortfolioPosition};
