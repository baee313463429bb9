//! Execution domain - turning quoted bounds into a ledger call

mod execution_router;
mod ledger_client;

pub use execution_router::ExecutionRouter;
pub use ledger_client::{LedgerClient, NativeDirection};

use serde::{Deserialize, Serialize};

use crate::shared::errors::SwapError;
use crate::shared::types::{AccountId, AssetId, EditSide, SwapReceipt};

/// One of the six ledger call shapes (three paths, exact-in or exact-out)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SwapCall {
    NativeForAsset {
        mode: EditSide,
        asset_id: AssetId,
        native_amount: u128,
        asset_amount: u128,
        direction: NativeDirection,
    },
    AssetForAsset {
        mode: EditSide,
        asset_a: AssetId,
        asset_b: AssetId,
        amount_a: u128,
        amount_b: u128,
    },
}

impl SwapCall {
    pub fn mode(&self) -> EditSide {
        match self {
            SwapCall::NativeForAsset { mode, .. } | SwapCall::AssetForAsset { mode, .. } => *mode,
        }
    }

    pub async fn submit(
        &self,
        ledger: &dyn LedgerClient,
        account: &AccountId,
    ) -> Result<SwapReceipt, SwapError> {
        match *self {
            SwapCall::NativeForAsset {
                mode: EditSide::ExactIn,
                asset_id,
                native_amount,
                asset_amount,
                direction,
            } => {
                ledger
                    .swap_native_for_asset_exact_in(asset_id, account, native_amount, asset_amount, direction)
                    .await
            }
            SwapCall::NativeForAsset {
                mode: EditSide::ExactOut,
                asset_id,
                native_amount,
                asset_amount,
                direction,
            } => {
                ledger
                    .swap_native_for_asset_exact_out(asset_id, account, native_amount, asset_amount, direction)
                    .await
            }
            SwapCall::AssetForAsset {
                mode: EditSide::ExactIn,
                asset_a,
                asset_b,
                amount_a,
                amount_b,
            } => {
                ledger
                    .swap_asset_for_asset_exact_in(asset_a, asset_b, account, amount_a, amount_b)
                    .await
            }
            SwapCall::AssetForAsset {
                mode: EditSide::ExactOut,
                asset_a,
                asset_b,
                amount_a,
                amount_b,
            } => {
                ledger
                    .swap_asset_for_asset_exact_out(asset_a, asset_b, account, amount_a, amount_b)
                    .await
            }
        }
    }
}
