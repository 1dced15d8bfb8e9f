//! Portfolio risk engine: quantity-weighted aggregation of PV and Greeks,
//! plus one-step Monte-Carlo VaR and Expected Shortfall at 95% and 99%.
//!
//! The simulation draws one standard normal per position per simulation,
//! in portfolio insertion order. Instruments sharing an asset therefore
//! receive different shocks within the same scenario; the draw stream
//! ordering is part of the fixed-seed reproducibility contract, so the
//! loop structure must not be reordered or parallelized.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, StandardNormal};

use crate::core::PricingError;
use crate::market::{MarketData, MarketDataStore};
use crate::risk::portfolio::{Portfolio, PortfolioPosition};

const TRADING_DAYS_PER_YEAR: f64 = 252.0;
const MAX_VAR_SIMULATIONS: usize = 1_000_000;
const MAX_TIME_HORIZON_DAYS: f64 = 252.0;
const PV_EPSILON: f64 = 1e-10;

/// Simulation count used when the caller does not choose one.
pub const DEFAULT_VAR_SIMULATIONS: usize = 10_000;

/// Aggregated portfolio risk metrics.
#[derive(Debug, Clone, Copy, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct PortfolioRiskResult {
    /// Quantity-weighted present value.
    pub total_pv: f64,
    /// Quantity-weighted delta.
    pub total_delta: f64,
    /// Quantity-weighted gamma.
    pub total_gamma: f64,
    /// Quantity-weighted vega.
    pub total_vega: f64,
    /// Quantity-weighted theta.
    pub total_theta: f64,
    /// 95% Value-at-Risk, reported as a positive loss.
    pub value_at_risk_95: f64,
    /// 99% Value-at-Risk, reported as a positive loss.
    pub value_at_risk_99: f64,
    /// 95% Expected Shortfall.
    pub expected_shortfall_95: f64,
    /// 99% Expected Shortfall.
    pub expected_shortfall_99: f64,
}

impl PortfolioRiskResult {
    /// Zeros every field.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Whether every field is finite.
    pub fn is_valid(&self) -> bool {
        [
            self.total_pv,
            self.total_delta,
            self.total_gamma,
            self.total_vega,
            self.total_theta,
            self.value_at_risk_95,
            self.value_at_risk_99,
            self.expected_shortfall_95,
            self.expected_shortfall_99,
        ]
        .iter()
        .all(|v| v.is_finite())
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct RiskMetrics {
    var_95: f64,
    var_99: f64,
    es_95: f64,
    es_99: f64,
}

/// Engine configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskEngineConfig {
    /// Number of Monte-Carlo scenarios, in `[1, 1_000_000]`.
    pub var_simulations: usize,
    /// Risk horizon in trading days, in `(0, 252]`.
    pub time_horizon_days: f64,
    /// Fixed RNG seed; `None` seeds from OS entropy.
    pub seed: Option<u32>,
}

impl Default for RiskEngineConfig {
    fn default() -> Self {
        Self {
            var_simulations: DEFAULT_VAR_SIMULATIONS,
            time_horizon_days: 1.0,
            seed: None,
        }
    }
}

impl RiskEngineConfig {
    fn validate(&self) -> Result<(), PricingError> {
        if self.var_simulations < 1 || self.var_simulations > MAX_VAR_SIMULATIONS {
            return Err(PricingError::InvalidInput(format!(
                "var simulations must be between 1 and {MAX_VAR_SIMULATIONS}, got {}",
                self.var_simulations
            )));
        }
        if !self.time_horizon_days.is_finite()
            || self.time_horizon_days <= 0.0
            || self.time_horizon_days > MAX_TIME_HORIZON_DAYS
        {
            return Err(PricingError::InvalidInput(format!(
                "time horizon must be in (0, {MAX_TIME_HORIZON_DAYS}] trading days, got {}",
                self.time_horizon_days
            )));
        }
        Ok(())
    }
}

/// Portfolio risk engine. Borrows the portfolio and market store for the
/// duration of a calculation and never mutates either; shocked market data
/// is always a local copy.
#[derive(Debug, Clone, Default)]
pub struct RiskEngine {
    config: RiskEngineConfig,
}

impl RiskEngine {
    /// Engine with default configuration (10 000 scenarios, 1-day horizon,
    /// entropy-seeded RNG).
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine with an explicit simulation count.
    pub fn with_simulations(var_simulations: usize) -> Result<Self, PricingError> {
        Self::from_config(RiskEngineConfig {
            var_simulations,
            ..RiskEngineConfig::default()
        })
    }

    /// Engine from a full configuration.
    pub fn from_config(config: RiskEngineConfig) -> Result<Self, PricingError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Number of Monte-Carlo scenarios.
    pub fn var_simulations(&self) -> usize {
        self.config.var_simulations
    }

    /// Risk horizon in trading days.
    pub fn time_horizon_days(&self) -> f64 {
        self.config.time_horizon_days
    }

    /// Fixed seed, if any.
    pub fn seed(&self) -> Option<u32> {
        self.config.seed
    }

    /// Changes the scenario count, range-checked.
    pub fn set_var_simulations(&mut self, var_simulations: usize) -> Result<(), PricingError> {
        RiskEngineConfig {
            var_simulations,
            ..self.config
        }
        .validate()?;
        self.config.var_simulations = var_simulations;
        Ok(())
    }

    /// Changes the risk horizon, range-checked.
    pub fn set_time_horizon_days(&mut self, time_horizon_days: f64) -> Result<(), PricingError> {
        RiskEngineConfig {
            time_horizon_days,
            ..self.config
        }
        .validate()?;
        self.config.time_horizon_days = time_horizon_days;
        Ok(())
    }

    /// Fixes the RNG seed (`Some`) or reverts to OS entropy (`None`).
    pub fn set_seed(&mut self, seed: Option<u32>) {
        self.config.seed = seed;
    }

    /// Computes aggregated PV, Greeks, and Monte-Carlo VaR/ES for the
    /// portfolio against the market store.
    ///
    /// Fails fast on the first missing or invalid market-data entry; a
    /// numerical failure anywhere aborts the whole calculation with no
    /// partial result.
    pub fn calculate_portfolio_risk(
        &self,
        portfolio: &Portfolio,
        market_data: &MarketDataStore,
    ) -> Result<PortfolioRiskResult, PricingError> {
        self.config.validate()?;

        let mut result = PortfolioRiskResult::default();
        if portfolio.is_empty() {
            return Ok(result);
        }

        let resolved = resolve_positions(portfolio, market_data)?;

        for &(position, md) in &resolved {
            let quantity = position.quantity as f64;
            let asset = position.instrument.asset_id();

            result.total_pv +=
                weighted(position.instrument.price(md)?, quantity, "pv", asset)?;
            result.total_delta +=
                weighted(position.instrument.delta(md)?, quantity, "delta", asset)?;
            result.total_gamma +=
                weighted(position.instrument.gamma(md)?, quantity, "gamma", asset)?;
            result.total_vega +=
                weighted(position.instrument.vega(md)?, quantity, "vega", asset)?;
            result.total_theta +=
                weighted(position.instrument.theta(md)?, quantity, "theta", asset)?;
        }

        let metrics = self.simulate_risk_metrics(&resolved)?;
        result.value_at_risk_95 = metrics.var_95;
        result.value_at_risk_99 = metrics.var_99;
        result.expected_shortfall_95 = metrics.es_95;
        result.expected_shortfall_99 = metrics.es_99;

        if !result.is_valid() {
            return Err(PricingError::NumericalError(
                "portfolio risk result contains non-finite fields".to_string(),
            ));
        }
        Ok(result)
    }

    /// One-step Monte-Carlo simulation of the P&L distribution.
    fn simulate_risk_metrics(
        &self,
        positions: &[(&PortfolioPosition, &MarketData)],
    ) -> Result<RiskMetrics, PricingError> {
        let mut initial_value = 0.0;
        for &(position, md) in positions {
            initial_value += position.instrument.price(md)? * position.quantity as f64;
        }
        if initial_value.abs() < PV_EPSILON {
            return Ok(RiskMetrics::default());
        }

        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(u64::from(seed)),
            None => StdRng::from_os_rng(),
        };

        let simulations = self.config.var_simulations;
        let dt = self.config.time_horizon_days / TRADING_DAYS_PER_YEAR;
        let sqrt_dt = dt.sqrt();

        let mut pnl = Vec::with_capacity(simulations);
        for _ in 0..simulations {
            let mut simulated_value = 0.0;

            // One draw per position, in insertion order.
            for &(position, md) in positions {
                let z: f64 = StandardNormal.sample(&mut rng);
                let vol = md.volatility();
                let drift = (md.risk_free_rate() - 0.5 * vol * vol) * dt;
                let shocked_spot = md.spot_price() * (drift + vol * sqrt_dt * z).exp();

                if !shocked_spot.is_finite() || shocked_spot <= 0.0 {
                    return Err(PricingError::NumericalError(format!(
                        "simulated spot {shocked_spot} for {} is not a valid price",
                        position.instrument.asset_id()
                    )));
                }

                let shocked = md.bump_spot(shocked_spot)?;
                simulated_value +=
                    position.instrument.price(&shocked)? * position.quantity as f64;
            }

            pnl.push(simulated_value - initial_value);
        }

        pnl.sort_by(|a, b| a.total_cmp(b));

        let (var_95, es_95) = tail_metrics(&pnl, 0.95);
        let (var_99, es_99) = tail_metrics(&pnl, 0.99);
        Ok(RiskMetrics {
            var_95,
            var_99,
            es_95,
            es_99,
        })
    }
}

fn resolve_positions<'a>(
    portfolio: &'a Portfolio,
    market_data: &'a MarketDataStore,
) -> Result<Vec<(&'a PortfolioPosition, &'a MarketData)>, PricingError> {
    portfolio
        .positions()
        .iter()
        .map(|position| {
            let md = market_data.get(position.instrument.asset_id())?;
            md.validate()?;
            Ok((position, md))
        })
        .collect()
}

fn weighted(value: f64, quantity: f64, metric: &str, asset: &str) -> Result<f64, PricingError> {
    let term = value * quantity;
    if !term.is_finite() {
        return Err(PricingError::NumericalError(format!(
            "{metric} contribution for {asset} is not finite"
        )));
    }
    Ok(term)
}

/// VaR and ES over an ascending P&L sample at the given confidence.
/// Losses come back as positive numbers.
fn tail_metrics(sorted_pnl: &[f64], confidence: f64) -> (f64, f64) {
    let n = sorted_pnl.len();
    let k = ((1.0 - confidence) * n as f64).floor() as usize;
    let k = k.min(n - 1);

    let var = -sorted_pnl[k];
    let tail_sum: f64 = sorted_pnl[..=k].iter().sum();
    let es = -tail_sum / (k + 1) as f64;
    (var, es)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::OptionKind;
    use crate::instruments::EuropeanOption;
    use crate::market::MarketData;
    use approx::assert_relative_eq;

    fn atm_call_portfolio() -> (Portfolio, MarketDataStore) {
        let mut portfolio = Portfolio::new();
        portfolio
            .add(
                Box::new(EuropeanOption::new(OptionKind::Call, 100.0, 1.0, "AAPL").unwrap()),
                1,
            )
            .unwrap();

        let mut store = MarketDataStore::new();
        store
            .add(MarketData::new("AAPL", 100.0, 0.05, 0.2).unwrap())
            .unwrap();
        (portfolio, store)
    }

    fn seeded_engine() -> RiskEngine {
        RiskEngine::from_config(RiskEngineConfig {
            var_simulations: 10_000,
            time_horizon_days: 1.0,
            seed: Some(42),
        })
        .unwrap()
    }

    #[test]
    fn config_is_range_checked() {
        assert!(RiskEngine::with_simulations(0).is_err());
        assert!(RiskEngine::with_simulations(1_000_001).is_err());
        assert!(RiskEngine::with_simulations(1).is_ok());

        let mut engine = RiskEngine::new();
        assert!(engine.set_time_horizon_days(0.0).is_err());
        assert!(engine.set_time_horizon_days(253.0).is_err());
        assert!(engine.set_time_horizon_days(f64::NAN).is_err());
        engine.set_time_horizon_days(10.0).unwrap();
        assert_eq!(engine.time_horizon_days(), 10.0);
    }

    #[test]
    fn empty_portfolio_is_all_zero() {
        let engine = RiskEngine::new();
        let result = engine
            .calculate_portfolio_risk(&Portfolio::new(), &MarketDataStore::new())
            .unwrap();
        assert_eq!(result, PortfolioRiskResult::default());
        assert!(result.is_valid());
    }

    #[test]
    fn missing_market_data_fails_fast() {
        let (portfolio, _) = atm_call_portfolio();
        let engine = RiskEngine::new();
        let err = engine
            .calculate_portfolio_risk(&portfolio, &MarketDataStore::new())
            .unwrap_err();
        assert!(matches!(err, PricingError::MarketDataMissing(_)));
    }

    #[test]
    fn single_atm_call_reference_metrics() {
        let (portfolio, store) = atm_call_portfolio();
        let result = seeded_engine()
            .calculate_portfolio_risk(&portfolio, &store)
            .unwrap();

        assert_relative_eq!(result.total_pv, 10.4506, epsilon = 1e-3);
        assert_relative_eq!(result.total_delta, 0.6368, epsilon = 1e-3);
        assert!(result.value_at_risk_95 > 0.0);
        assert!(result.value_at_risk_99 > result.value_at_risk_95);
        assert!(result.expected_shortfall_95 >= result.value_at_risk_95);
        assert!(result.expected_shortfall_99 >= result.value_at_risk_99);
        assert!(result.expected_shortfall_99 >= result.expected_shortfall_95);
    }

    #[test]
    fn fixed_seed_runs_are_bitwise_identical() {
        let (portfolio, store) = atm_call_portfolio();
        let engine = seeded_engine();

        let first = engine.calculate_portfolio_risk(&portfolio, &store).unwrap();
        let second = engine.calculate_portfolio_risk(&portfolio, &store).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn var_scales_with_quantity() {
        let (mut portfolio, store) = atm_call_portfolio();
        let engine = seeded_engine();

        let base = engine.calculate_portfolio_risk(&portfolio, &store).unwrap();
        portfolio.update_quantity(0, 10).unwrap();
        let scaled = engine.calculate_portfolio_risk(&portfolio, &store).unwrap();

        let ratio = scaled.value_at_risk_95 / base.value_at_risk_95;
        assert!((8.0..=12.0).contains(&ratio), "ratio {ratio} not ~10");
    }

    #[test]
    fn zero_value_portfolio_reports_zero_risk() {
        let mut portfolio = Portfolio::new();
        portfolio
            .add(
                Box::new(EuropeanOption::new(OptionKind::Call, 100.0, 1.0, "AAPL").unwrap()),
                0,
            )
            .unwrap();
        let mut store = MarketDataStore::new();
        store
            .add(MarketData::new("AAPL", 100.0, 0.05, 0.2).unwrap())
            .unwrap();

        let result = seeded_engine()
            .calculate_portfolio_risk(&portfolio, &store)
            .unwrap();
        assert_eq!(result.value_at_risk_95, 0.0);
        assert_eq!(result.expected_shortfall_99, 0.0);
        assert_eq!(result.total_pv, 0.0);
    }

    #[test]
    fn tail_metrics_match_hand_computed_values() {
        let mut pnl: Vec<f64> = vec![-5.0, -4.0, -3.0, -2.0, -1.0, 0.0, 1.0, 2.0, 3.0, 4.0];
        pnl.sort_by(|a, b| a.total_cmp(b));

        // n = 10, c = 0.95: k = 0 -> VaR = 5, ES = 5.
        let (var, es) = tail_metrics(&pnl, 0.95);
        assert_eq!(var, 5.0);
        assert_eq!(es, 5.0);

        // c = 0.8: k = 2 -> VaR = 3, ES = (5+4+3)/3 = 4.
        let (var, es) = tail_metrics(&pnl, 0.8);
        assert_eq!(var, 3.0);
        assert_eq!(es, 4.0);
    }

    #[test]
    fn result_reset_zeroes_fields() {
        let mut result = PortfolioRiskResult {
            total_pv: 10.0,
            value_at_risk_95: 2.0,
            ..Default::default()
        };
        result.reset();
        assert_eq!(result, PortfolioRiskResult::default());
    }
}
