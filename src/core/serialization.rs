//! Canonical market-snapshot and risk-report payloads.
//!
//! These types define stable serde shapes used to persist and transport
//! market snapshots and risk results. Deserialized market payloads are
//! re-validated before they become live [`MarketData`] records, so a
//! hand-edited JSON file cannot smuggle a negative spot into the engine.

use std::collections::BTreeMap;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::core::PricingError;
use crate::market::{MarketData, MarketDataStore};
use crate::risk::PortfolioRiskResult;

/// Flat market-data payload with stable field names.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MarketDataPayload {
    pub asset_id: String,
    pub spot_price: f64,
    pub risk_free_rate: f64,
    pub volatility: f64,
    #[serde(default)]
    pub dividend_yield: f64,
}

impl From<&MarketData> for MarketDataPayload {
    fn from(md: &MarketData) -> Self {
        Self {
            asset_id: md.asset_id().to_string(),
            spot_price: md.spot_price(),
            risk_free_rate: md.risk_free_rate(),
            volatility: md.volatility(),
            dividend_yield: md.dividend_yield(),
        }
    }
}

impl TryFrom<MarketDataPayload> for MarketData {
    type Error = PricingError;

    fn try_from(payload: MarketDataPayload) -> Result<Self, Self::Error> {
        MarketData::with_dividend_yield(
            payload.asset_id,
            payload.spot_price,
            payload.risk_free_rate,
            payload.volatility,
            payload.dividend_yield,
        )
    }
}

/// Point-in-time snapshot of a full market store.
///
/// Entries are keyed by asset id in a `BTreeMap` so serialized output has
/// a deterministic ordering.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MarketSnapshot {
    /// Snapshot timestamp or label, opaque to the engine.
    pub as_of: String,
    /// Per-asset payloads keyed by asset id.
    pub entries: BTreeMap<String, MarketDataPayload>,
}

impl MarketSnapshot {
    /// Captures the current contents of a store.
    pub fn from_store(as_of: impl Into<String>, store: &MarketDataStore) -> Self {
        let entries = store
            .snapshot()
            .into_iter()
            .map(|(asset_id, md)| (asset_id, MarketDataPayload::from(&md)))
            .collect();
        Self {
            as_of: as_of.into(),
            entries,
        }
    }

    /// Rebuilds a validated store from the snapshot.
    ///
    /// # Errors
    /// [`PricingError::InvalidInput`] on the first payload that fails
    /// market-data validation.
    pub fn into_store(self) -> Result<MarketDataStore, PricingError> {
        let mut store = MarketDataStore::new();
        for (_, payload) in self.entries {
            store.add(MarketData::try_from(payload)?)?;
        }
        Ok(store)
    }
}

/// Risk-engine output bundled with report metadata.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RiskReport {
    /// Identifier of the portfolio the result belongs to.
    pub portfolio_id: String,
    /// Valuation timestamp or label.
    pub as_of: String,
    /// The aggregated metrics.
    pub result: PortfolioRiskResult,
}

/// Serializes any payload type to pretty-printed JSON.
pub fn to_json_pretty<T: Serialize>(value: &T) -> Result<String, PricingError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| PricingError::InvalidInput(format!("json serialization failed: {e}")))
}

/// Deserializes any payload type from JSON.
pub fn from_json<T: DeserializeOwned>(json: &str) -> Result<T, PricingError> {
    serde_json::from_str(json)
        .map_err(|e| PricingError::InvalidInput(format!("json deserialization failed: {e}")))
}
