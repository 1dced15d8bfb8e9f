//! Keyed collection of per-asset market snapshots.

use std::collections::HashMap;

use crate::core::PricingError;
use crate::market::MarketData;

/// Mapping from asset id to [`MarketData`], with add/update semantics kept
/// deliberately strict: `add` refuses to overwrite and `update` refuses to
/// insert, so a typo in an asset id surfaces immediately instead of
/// silently forking the snapshot.
#[derive(Debug, Clone, Default)]
pub struct MarketDataStore {
    entries: HashMap<String, MarketData>,
}

impl MarketDataStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a new snapshot.
    ///
    /// # Errors
    /// [`PricingError::InvalidInput`] if the id is empty or already present.
    pub fn add(&mut self, md: MarketData) -> Result<(), PricingError> {
        md.validate()?;
        let asset_id = md.asset_id().to_string();
        if self.entries.contains_key(&asset_id) {
            return Err(PricingError::InvalidInput(format!(
                "market data for {asset_id} already exists; use update instead"
            )));
        }
        self.entries.insert(asset_id, md);
        Ok(())
    }

    /// Replaces an existing snapshot.
    ///
    /// # Errors
    /// [`PricingError::MarketDataMissing`] if the id is unknown.
    pub fn update(&mut self, md: MarketData) -> Result<(), PricingError> {
        md.validate()?;
        let asset_id = md.asset_id().to_string();
        if !self.entries.contains_key(&asset_id) {
            return Err(PricingError::MarketDataMissing(format!(
                "market data for {asset_id} does not exist; use add instead"
            )));
        }
        self.entries.insert(asset_id, md);
        Ok(())
    }

    /// Looks up the snapshot for an asset.
    pub fn get(&self, asset_id: &str) -> Result<&MarketData, PricingError> {
        if asset_id.is_empty() {
            return Err(PricingError::InvalidInput(
                "asset id cannot be empty".to_string(),
            ));
        }
        self.entries.get(asset_id).ok_or_else(|| {
            PricingError::MarketDataMissing(format!("market data for {asset_id} not found"))
        })
    }

    /// Whether a snapshot exists for the asset.
    pub fn has(&self, asset_id: &str) -> bool {
        self.entries.contains_key(asset_id)
    }

    /// Removes a snapshot.
    ///
    /// # Errors
    /// [`PricingError::MarketDataMissing`] if the id is unknown.
    pub fn remove(&mut self, asset_id: &str) -> Result<MarketData, PricingError> {
        if asset_id.is_empty() {
            return Err(PricingError::InvalidInput(
                "asset id cannot be empty".to_string(),
            ));
        }
        self.entries.remove(asset_id).ok_or_else(|| {
            PricingError::MarketDataMissing(format!("market data for {asset_id} not found"))
        })
    }

    /// Drops every snapshot.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of snapshots held.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store holds no snapshots.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Read-only copy of the full mapping.
    pub fn snapshot(&self) -> HashMap<String, MarketData> {
        self.entries.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aapl() -> MarketData {
        MarketData::new("AAPL", 100.0, 0.05, 0.2).unwrap()
    }

    #[test]
    fn add_rejects_duplicates_and_update_rejects_unknowns() {
        let mut store = MarketDataStore::new();
        store.add(aapl()).unwrap();

        let err = store.add(aapl()).unwrap_err();
        assert!(matches!(err, PricingError::InvalidInput(_)));

        let msft = MarketData::new("MSFT", 300.0, 0.05, 0.25).unwrap();
        let err = store.update(msft.clone()).unwrap_err();
        assert!(matches!(err, PricingError::MarketDataMissing(_)));

        store.add(msft).unwrap();
        let msft_new = MarketData::new("MSFT", 310.0, 0.05, 0.25).unwrap();
        store.update(msft_new).unwrap();
        assert_eq!(store.get("MSFT").unwrap().spot_price(), 310.0);
    }

    #[test]
    fn get_remove_and_lifecycle() {
        let mut store = MarketDataStore::new();
        assert!(store.is_empty());
        assert!(store.get("AAPL").is_err());
        assert!(store.get("").is_err());

        store.add(aapl()).unwrap();
        assert!(store.has("AAPL"));
        assert_eq!(store.len(), 1);

        let removed = store.remove("AAPL").unwrap();
        assert_eq!(removed.asset_id(), "AAPL");
        assert!(store.remove("AAPL").is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn snapshot_is_a_detached_copy() {
        let mut store = MarketDataStore::new();
        store.add(aapl()).unwrap();

        let snap = store.snapshot();
        store.clear();

        assert!(store.is_empty());
        assert_eq!(snap.len(), 1);
        assert_eq!(snap["AAPL"].spot_price(), 100.0);
    }
}
