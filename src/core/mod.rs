//! Core traits, common domain types, and library-wide result/error structures.

use crate::market::MarketData;

pub mod serialization;
pub mod types;

pub use serialization::{MarketDataPayload, MarketSnapshot, RiskReport, from_json, to_json_pretty};
pub use types::*;

/// Standardized Greeks container used by kernel results.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Greeks {
    /// First derivative to spot.
    pub delta: f64,
    /// Second derivative to spot.
    pub gamma: f64,
    /// First derivative to volatility (per full unit of vol).
    pub vega: f64,
    /// Time decay (per calendar day in the closed-form kernel).
    pub theta: f64,
    /// First derivative to rate, per percentage point.
    pub rho: f64,
}

/// Common capability trait implemented by every priceable instrument.
///
/// Implementations keep their state effectively immutable during pricing,
/// so concurrent read-only `price`/Greeks calls are safe.
pub trait Instrument: std::fmt::Debug {
    /// Present value against the given market snapshot.
    fn price(&self, md: &MarketData) -> Result<f64, PricingError>;
    /// Sensitivity of price to spot.
    fn delta(&self, md: &MarketData) -> Result<f64, PricingError>;
    /// Second-order sensitivity of price to spot.
    fn gamma(&self, md: &MarketData) -> Result<f64, PricingError>;
    /// Sensitivity of price to volatility, per full unit of vol.
    fn vega(&self, md: &MarketData) -> Result<f64, PricingError>;
    /// Time decay. Closed-form Black-Scholes reports per calendar day;
    /// finite-difference models report the one-day decay divided by the
    /// year-fraction bump.
    fn theta(&self, md: &MarketData) -> Result<f64, PricingError>;
    /// Identifier of the underlying asset.
    fn asset_id(&self) -> &str;
    /// Short type label for diagnostics and reports.
    fn kind_label(&self) -> &'static str;
    /// Whether the instrument's own parameters are internally consistent.
    fn is_valid(&self) -> bool;
}

/// Engine and kernel errors surfaced by the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PricingError {
    /// Input validation error.
    InvalidInput(String),
    /// Non-convergence in an iterative algorithm.
    ConvergenceFailure(String),
    /// Required market datum is unavailable.
    MarketDataMissing(String),
    /// Numerical issue (NaN/infinity, probability outside [0, 1], etc.).
    NumericalError(String),
    /// Index out of bounds or integer overflow.
    RangeError(String),
}

impl std::fmt::Display for PricingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
            Self::ConvergenceFailure(msg) => write!(f, "convergence failure: {msg}"),
            Self::MarketDataMissing(msg) => write!(f, "market data missing: {msg}"),
            Self::NumericalError(msg) => write!(f, "numerical error: {msg}"),
            Self::RangeError(msg) => write!(f, "range error: {msg}"),
        }
    }
}

impl std::error::Error for PricingError {}
