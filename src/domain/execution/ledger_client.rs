//! Ledger client interface

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::shared::errors::SwapError;
use crate::shared::types::{AccountId, AssetId, SwapReceipt, TokenId};

/// Which way a native/asset swap goes. The native primitive always takes
/// `(native_amount, asset_amount)` in that order; this flag says which of
/// the two the user pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NativeDirection {
    /// Native in, asset out
    PayNative,
    /// Asset in, native out
    ReceiveNative,
}

impl NativeDirection {
    pub fn is_reversed(&self) -> bool {
        matches!(self, NativeDirection::ReceiveNative)
    }
}

/// Submits swaps and reports balances. All amounts are base units.
///
/// Exact-in calls fix the paid amount and treat the other as a minimum
/// receive; exact-out calls fix the received amount and treat the other
/// as a maximum pay.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    async fn balance(&self, account: &AccountId, token: TokenId) -> Result<u128, SwapError>;

    async fn swap_native_for_asset_exact_in(
        &self,
        asset_id: AssetId,
        account: &AccountId,
        native_amount: u128,
        asset_amount: u128,
        direction: NativeDirection,
    ) -> Result<SwapReceipt, SwapError>;

    async fn swap_native_for_asset_exact_out(
        &self,
        asset_id: AssetId,
        account: &AccountId,
        native_amount: u128,
        asset_amount: u128,
        direction: NativeDirection,
    ) -> Result<SwapReceipt, SwapError>;

    async fn swap_asset_for_asset_exact_in(
        &self,
        asset_a: AssetId,
        asset_b: AssetId,
        account: &AccountId,
        amount_a: u128,
        amount_b: u128,
    ) -> Result<SwapReceipt, SwapError>;

    async fn swap_asset_for_asset_exact_out(
        &self,
        asset_a: AssetId,
        asset_b: AssetId,
        account: &AccountId,
        amount_a: u128,
        amount_b: u128,
    ) -> Result<SwapReceipt, SwapError>;
}
