//! Price oracle interface

use async_trait::async_trait;

use crate::shared::errors::SwapError;
use crate::shared::types::AssetId;

/// Source of raw swap quotes.
///
/// Every method takes and returns base units. The returned text may carry
/// grouping separators (`"1,234,567"`); `Ok(None)` means no quote could be
/// produced, e.g. there is no active connection or the pool is empty.
///
/// The two exact-output native calls fall back to the exact-input ones,
/// which is only accurate for oracles that quote at a flat rate.
#[async_trait]
pub trait PriceOracle: Send + Sync {
    /// Asset obtained for `native_amount` of the native token
    async fn price_asset_from_native(
        &self,
        asset_id: AssetId,
        native_amount: u128,
    ) -> Result<Option<String>, SwapError>;

    /// Native token obtained for `asset_amount` of the asset
    async fn price_native_from_asset(
        &self,
        asset_id: AssetId,
        asset_amount: u128,
    ) -> Result<Option<String>, SwapError>;

    /// Native token required to obtain exactly `asset_amount` of the asset
    async fn price_native_for_exact_asset(
        &self,
        asset_id: AssetId,
        asset_amount: u128,
    ) -> Result<Option<String>, SwapError> {
        self.price_native_from_asset(asset_id, asset_amount).await
    }

    /// Asset required to obtain exactly `native_amount` of the native token
    async fn price_asset_for_exact_native(
        &self,
        asset_id: AssetId,
        native_amount: u128,
    ) -> Result<Option<String>, SwapError> {
        self.price_asset_from_native(asset_id, native_amount).await
    }

    /// Asset A required to obtain `amount_b` of asset B
    async fn price_a_from_b(
        &self,
        asset_a: AssetId,
        asset_b: AssetId,
        amount_b: u128,
    ) -> Result<Option<String>, SwapError>;

    /// Asset B obtained for `amount_a` of asset A
    async fn price_b_from_a(
        &self,
        asset_a: AssetId,
        asset_b: AssetId,
        amount_a: u128,
    ) -> Result<Option<String>, SwapError>;
}
