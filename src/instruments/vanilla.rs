//! Vanilla option contracts: European (model-selectable) and American
//! (binomial-only).
//!
//! Greeks follow a hybrid policy. When the European contract prices under
//! closed-form Black-Scholes, Greeks are closed-form too. Every other
//! model/Greek pair goes through central finite differences over the model
//! price with fixed bumps: spot `1% * S`, volatility `0.01` (down side
//! clamped at zero), time `1/365` as a forward difference toward expiry.
//! The bump sizes are part of the numerical contract, not tuning knobs.

use crate::core::{Instrument, OptionKind, PricingError, PricingModel};
use crate::engines::analytic::black_scholes as bs;
use crate::engines::analytic::merton::merton_price;
use crate::engines::tree::binomial::{
    MAX_BINOMIAL_STEPS, crr_american_price, crr_european_price,
};
use crate::market::MarketData;

/// Tree depth used when the caller does not choose one.
pub const DEFAULT_BINOMIAL_STEPS: usize = 100;

const SPOT_BUMP_FRACTION: f64 = 0.01;
const VOL_BUMP: f64 = 0.01;
const THETA_BUMP: f64 = 1.0 / 365.0;

/// Compound-Poisson jump parameters for Merton pricing.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct JumpParams {
    /// Jump arrival intensity (per year).
    pub intensity: f64,
    /// Mean of the log jump size.
    pub mean: f64,
    /// Volatility of the log jump size.
    pub vol: f64,
}

fn validate_contract(strike: f64, expiry: f64, asset_id: &str) -> Result<(), PricingError> {
    if !strike.is_finite() || strike <= 0.0 {
        return Err(PricingError::InvalidInput(format!(
            "strike must be finite and > 0, got {strike}"
        )));
    }
    if !expiry.is_finite() || expiry < 0.0 {
        return Err(PricingError::InvalidInput(format!(
            "time to expiry must be finite and >= 0, got {expiry}"
        )));
    }
    if asset_id.is_empty() {
        return Err(PricingError::InvalidInput(
            "asset id cannot be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_binomial_steps(steps: usize) -> Result<(), PricingError> {
    if steps < 1 || steps > MAX_BINOMIAL_STEPS {
        return Err(PricingError::InvalidInput(format!(
            "binomial steps must be between 1 and {MAX_BINOMIAL_STEPS}, got {steps}"
        )));
    }
    Ok(())
}

fn ensure_finite(value: f64, metric: &str, asset_id: &str) -> Result<f64, PricingError> {
    if !value.is_finite() {
        return Err(PricingError::NumericalError(format!(
            "{metric} for {asset_id} is not finite"
        )));
    }
    Ok(value)
}

/// Central difference over spot with the standard 1% bump.
fn fd_delta<F>(model_price: F, spot: f64) -> Result<f64, PricingError>
where
    F: Fn(f64) -> Result<f64, PricingError>,
{
    let h = SPOT_BUMP_FRACTION * spot;
    Ok((model_price(spot + h)? - model_price(spot - h)?) / (2.0 * h))
}

/// Second difference over spot with the standard 1% bump.
fn fd_gamma<F>(model_price: F, spot: f64) -> Result<f64, PricingError>
where
    F: Fn(f64) -> Result<f64, PricingError>,
{
    let h = SPOT_BUMP_FRACTION * spot;
    let up = model_price(spot + h)?;
    let mid = model_price(spot)?;
    let down = model_price(spot - h)?;
    Ok((up - 2.0 * mid + down) / (h * h))
}

/// Symmetric volatility difference, down side clamped at zero.
fn fd_vega<F>(model_price: F, vol: f64) -> Result<f64, PricingError>
where
    F: Fn(f64) -> Result<f64, PricingError>,
{
    let up = model_price(vol + VOL_BUMP)?;
    let down = model_price((vol - VOL_BUMP).max(0.0))?;
    Ok((up - down) / (2.0 * VOL_BUMP))
}

/// Forward difference toward expiry; zero when the option is inside the
/// final calendar day.
fn fd_theta<F>(model_price: F, expiry: f64) -> Result<f64, PricingError>
where
    F: Fn(f64) -> Result<f64, PricingError>,
{
    if expiry < THETA_BUMP {
        return Ok(0.0);
    }
    let now = model_price(expiry)?;
    let later = model_price((expiry - THETA_BUMP).max(0.0))?;
    Ok((later - now) / THETA_BUMP)
}

/// European vanilla option with a selectable pricing model.
#[derive(Debug, Clone, PartialEq)]
pub struct EuropeanOption {
    kind: OptionKind,
    strike: f64,
    expiry: f64,
    asset_id: String,
    pricing_model: PricingModel,
    binomial_steps: usize,
    jumps: JumpParams,
}

impl EuropeanOption {
    /// Builds a European option priced under Black-Scholes.
    ///
    /// # Examples
    /// ```
    /// use riskforge::core::OptionKind;
    /// use riskforge::instruments::EuropeanOption;
    ///
    /// let call = EuropeanOption::new(OptionKind::Call, 100.0, 1.0, "AAPL").unwrap();
    /// assert_eq!(call.strike(), 100.0);
    /// assert!(EuropeanOption::new(OptionKind::Call, -1.0, 1.0, "AAPL").is_err());
    /// ```
    pub fn new(
        kind: OptionKind,
        strike: f64,
        expiry: f64,
        asset_id: impl Into<String>,
    ) -> Result<Self, PricingError> {
        Self::with_model(kind, strike, expiry, asset_id, PricingModel::BlackScholes)
    }

    /// Builds a European option with an explicit pricing model.
    pub fn with_model(
        kind: OptionKind,
        strike: f64,
        expiry: f64,
        asset_id: impl Into<String>,
        pricing_model: PricingModel,
    ) -> Result<Self, PricingError> {
        let asset_id = asset_id.into();
        validate_contract(strike, expiry, &asset_id)?;
        Ok(Self {
            kind,
            strike,
            expiry,
            asset_id,
            pricing_model,
            binomial_steps: DEFAULT_BINOMIAL_STEPS,
            jumps: JumpParams::default(),
        })
    }

    /// Option side.
    pub fn kind(&self) -> OptionKind {
        self.kind
    }

    /// Strike level.
    pub fn strike(&self) -> f64 {
        self.strike
    }

    /// Time to expiry in years.
    pub fn expiry(&self) -> f64 {
        self.expiry
    }

    /// Selected pricing model.
    pub fn pricing_model(&self) -> PricingModel {
        self.pricing_model
    }

    /// Tree depth used under [`PricingModel::Binomial`].
    pub fn binomial_steps(&self) -> usize {
        self.binomial_steps
    }

    /// Jump parameters used under [`PricingModel::MertonJumpDiffusion`].
    pub fn jump_params(&self) -> JumpParams {
        self.jumps
    }

    /// Switches the pricing model.
    pub fn set_pricing_model(&mut self, model: PricingModel) {
        self.pricing_model = model;
    }

    /// Changes the tree depth, range-checked.
    pub fn set_binomial_steps(&mut self, steps: usize) -> Result<(), PricingError> {
        validate_binomial_steps(steps)?;
        self.binomial_steps = steps;
        Ok(())
    }

    /// Configures the jump process.
    pub fn set_jump_parameters(
        &mut self,
        intensity: f64,
        mean: f64,
        vol: f64,
    ) -> Result<(), PricingError> {
        if !intensity.is_finite() || intensity < 0.0 {
            return Err(PricingError::InvalidInput(format!(
                "jump intensity must be finite and >= 0, got {intensity}"
            )));
        }
        if !mean.is_finite() {
            return Err(PricingError::InvalidInput(format!(
                "jump mean must be finite, got {mean}"
            )));
        }
        if !vol.is_finite() || vol < 0.0 {
            return Err(PricingError::InvalidInput(format!(
                "jump volatility must be finite and >= 0, got {vol}"
            )));
        }
        self.jumps = JumpParams {
            intensity,
            mean,
            vol,
        };
        Ok(())
    }

    /// Re-checks contract parameters.
    pub fn validate(&self) -> Result<(), PricingError> {
        validate_contract(self.strike, self.expiry, &self.asset_id)?;
        validate_binomial_steps(self.binomial_steps)
    }

    /// Model price as a function of the full pricing state; the single
    /// dispatch point every Greek bump goes through.
    fn model_price(
        &self,
        spot: f64,
        rate: f64,
        vol: f64,
        expiry: f64,
    ) -> Result<f64, PricingError> {
        match self.pricing_model {
            PricingModel::BlackScholes => {
                bs::bs_price(self.kind, spot, self.strike, rate, vol, expiry)
            }
            PricingModel::Binomial => crr_european_price(
                self.kind,
                spot,
                self.strike,
                rate,
                vol,
                expiry,
                self.binomial_steps,
            ),
            PricingModel::MertonJumpDiffusion => merton_price(
                self.kind,
                spot,
                self.strike,
                rate,
                vol,
                expiry,
                self.jumps.intensity,
                self.jumps.mean,
                self.jumps.vol,
            ),
        }
    }
}

impl Instrument for EuropeanOption {
    fn price(&self, md: &MarketData) -> Result<f64, PricingError> {
        let price = self.model_price(
            md.spot_price(),
            md.risk_free_rate(),
            md.volatility(),
            self.expiry,
        )?;
        let price = ensure_finite(price, "price", &self.asset_id)?;
        if price < 0.0 {
            return Err(PricingError::NumericalError(format!(
                "negative price {price} for {}",
                self.asset_id
            )));
        }
        Ok(price)
    }

    fn delta(&self, md: &MarketData) -> Result<f64, PricingError> {
        let delta = if self.pricing_model == PricingModel::BlackScholes {
            bs::bs_delta(
                self.kind,
                md.spot_price(),
                self.strike,
                md.risk_free_rate(),
                md.volatility(),
                self.expiry,
            )?
        } else {
            fd_delta(
                |s| self.model_price(s, md.risk_free_rate(), md.volatility(), self.expiry),
                md.spot_price(),
            )?
        };
        ensure_finite(delta, "delta", &self.asset_id)
    }

    fn gamma(&self, md: &MarketData) -> Result<f64, PricingError> {
        let gamma = if self.pricing_model == PricingModel::BlackScholes {
            bs::bs_gamma(
                md.spot_price(),
                self.strike,
                md.risk_free_rate(),
                md.volatility(),
                self.expiry,
            )?
        } else {
            fd_gamma(
                |s| self.model_price(s, md.risk_free_rate(), md.volatility(), self.expiry),
                md.spot_price(),
            )?
        };
        let gamma = ensure_finite(gamma, "gamma", &self.asset_id)?;
        if gamma < 0.0 {
            return Err(PricingError::NumericalError(format!(
                "negative gamma {gamma} for {}",
                self.asset_id
            )));
        }
        Ok(gamma)
    }

    fn vega(&self, md: &MarketData) -> Result<f64, PricingError> {
        let vega = if self.pricing_model == PricingModel::BlackScholes {
            bs::bs_vega(
                md.spot_price(),
                self.strike,
                md.risk_free_rate(),
                md.volatility(),
                self.expiry,
            )?
        } else {
            fd_vega(
                |vol| self.model_price(md.spot_price(), md.risk_free_rate(), vol, self.expiry),
                md.volatility(),
            )?
        };
        let vega = ensure_finite(vega, "vega", &self.asset_id)?;
        if vega < 0.0 {
            return Err(PricingError::NumericalError(format!(
                "negative vega {vega} for {}",
                self.asset_id
            )));
        }
        Ok(vega)
    }

    fn theta(&self, md: &MarketData) -> Result<f64, PricingError> {
        let theta = if self.pricing_model == PricingModel::BlackScholes {
            bs::bs_theta(
                self.kind,
                md.spot_price(),
                self.strike,
                md.risk_free_rate(),
                md.volatility(),
                self.expiry,
            )?
        } else {
            fd_theta(
                |t| self.model_price(md.spot_price(), md.risk_free_rate(), md.volatility(), t),
                self.expiry,
            )?
        };
        ensure_finite(theta, "theta", &self.asset_id)
    }

    fn asset_id(&self) -> &str {
        &self.asset_id
    }

    fn kind_label(&self) -> &'static str {
        "EuropeanOption"
    }

    fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

/// American vanilla option, priced on the CRR lattice.
#[derive(Debug, Clone, PartialEq)]
pub struct AmericanOption {
    kind: OptionKind,
    strike: f64,
    expiry: f64,
    asset_id: String,
    binomial_steps: usize,
}

impl AmericanOption {
    /// Builds an American option with the default tree depth.
    pub fn new(
        kind: OptionKind,
        strike: f64,
        expiry: f64,
        asset_id: impl Into<String>,
    ) -> Result<Self, PricingError> {
        Self::with_steps(kind, strike, expiry, asset_id, DEFAULT_BINOMIAL_STEPS)
    }

    /// Builds an American option with an explicit tree depth.
    pub fn with_steps(
        kind: OptionKind,
        strike: f64,
        expiry: f64,
        asset_id: impl Into<String>,
        binomial_steps: usize,
    ) -> Result<Self, PricingError> {
        let asset_id = asset_id.into();
        validate_contract(strike, expiry, &asset_id)?;
        validate_binomial_steps(binomial_steps)?;
        Ok(Self {
            kind,
            strike,
            expiry,
            asset_id,
            binomial_steps,
        })
    }

    /// Option side.
    pub fn kind(&self) -> OptionKind {
        self.kind
    }

    /// Strike level.
    pub fn strike(&self) -> f64 {
        self.strike
    }

    /// Time to expiry in years.
    pub fn expiry(&self) -> f64 {
        self.expiry
    }

    /// Tree depth.
    pub fn binomial_steps(&self) -> usize {
        self.binomial_steps
    }

    /// Changes the tree depth, range-checked.
    pub fn set_binomial_steps(&mut self, steps: usize) -> Result<(), PricingError> {
        validate_binomial_steps(steps)?;
        self.binomial_steps = steps;
        Ok(())
    }

    /// Immediate exercise payoff at the given spot.
    pub fn intrinsic_value(&self, spot: f64) -> f64 {
        self.kind.intrinsic(spot, self.strike)
    }

    /// Re-checks contract parameters.
    pub fn validate(&self) -> Result<(), PricingError> {
        validate_contract(self.strike, self.expiry, &self.asset_id)?;
        validate_binomial_steps(self.binomial_steps)
    }

    fn model_price(
        &self,
        spot: f64,
        rate: f64,
        vol: f64,
        expiry: f64,
    ) -> Result<f64, PricingError> {
        crr_american_price(
            self.kind,
            spot,
            self.strike,
            rate,
            vol,
            expiry,
            self.binomial_steps,
        )
    }
}

impl Instrument for AmericanOption {
    fn price(&self, md: &MarketData) -> Result<f64, PricingError> {
        let price = self.model_price(
            md.spot_price(),
            md.risk_free_rate(),
            md.volatility(),
            self.expiry,
        )?;
        let price = ensure_finite(price, "price", &self.asset_id)?;
        if price < 0.0 {
            return Err(PricingError::NumericalError(format!(
                "negative price {price} for {}",
                self.asset_id
            )));
        }
        Ok(price)
    }

    fn delta(&self, md: &MarketData) -> Result<f64, PricingError> {
        let delta = fd_delta(
            |s| self.model_price(s, md.risk_free_rate(), md.volatility(), self.expiry),
            md.spot_price(),
        )?;
        ensure_finite(delta, "delta", &self.asset_id)
    }

    fn gamma(&self, md: &MarketData) -> Result<f64, PricingError> {
        let gamma = fd_gamma(
            |s| self.model_price(s, md.risk_free_rate(), md.volatility(), self.expiry),
            md.spot_price(),
        )?;
        ensure_finite(gamma, "gamma", &self.asset_id)
    }

    fn vega(&self, md: &MarketData) -> Result<f64, PricingError> {
        let vega = fd_vega(
            |vol| self.model_price(md.spot_price(), md.risk_free_rate(), vol, self.expiry),
            md.volatility(),
        )?;
        ensure_finite(vega, "vega", &self.asset_id)
    }

    fn theta(&self, md: &MarketData) -> Result<f64, PricingError> {
        let theta = fd_theta(
            |t| self.model_price(md.spot_price(), md.risk_free_rate(), md.volatility(), t),
            self.expiry,
        )?;
        ensure_finite(theta, "theta", &self.asset_id)
    }

    fn asset_id(&self) -> &str {
        &self.asset_id
    }

    fn kind_label(&self) -> &'static str {
        "AmericanOption"
    }

    fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}
