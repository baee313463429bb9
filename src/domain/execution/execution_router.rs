//! Picks and submits the ledger call for a quoted swap

use std::sync::Arc;
use tracing::{debug, info, warn};

use super::{LedgerClient, NativeDirection, SwapCall};
use crate::domain::amount::to_base_units;
use crate::shared::errors::SwapError;
use crate::shared::types::{AccountId, EditSide, ExecutionBounds, Slot, SwapReceipt, TokenId, TradePair};

#[derive(Clone)]
pub struct ExecutionRouter {
    ledger: Arc<dyn LedgerClient>,
}

impl ExecutionRouter {
    pub fn new(ledger: Arc<dyn LedgerClient>) -> Self {
        Self { ledger }
    }

    /// Build the ledger call for `bounds`. Each bound is converted to base
    /// units with its own token's decimals.
    pub fn plan(
        pair: &TradePair,
        edit_side: EditSide,
        bounds: &ExecutionBounds,
    ) -> Result<SwapCall, SwapError> {
        let token_a = pair.token(Slot::A).ok_or(SwapError::MissingTokenId)?;
        let token_b = pair.token(Slot::B).ok_or(SwapError::MissingTokenId)?;

        let amount_a = to_base_units(bounds.bound_a, token_a.decimals)?;
        let amount_b = to_base_units(bounds.bound_b, token_b.decimals)?;

        match (token_a.id, token_b.id) {
            (TokenId::Native, TokenId::Asset(asset_id)) => Ok(SwapCall::NativeForAsset {
                mode: edit_side,
                asset_id,
                native_amount: amount_a,
                asset_amount: amount_b,
                direction: NativeDirection::PayNative,
            }),
            (TokenId::Asset(asset_id), TokenId::Native) => Ok(SwapCall::NativeForAsset {
                mode: edit_side,
                asset_id,
                native_amount: amount_b,
                asset_amount: amount_a,
                direction: NativeDirection::ReceiveNative,
            }),
            (TokenId::Asset(asset_a), TokenId::Asset(asset_b)) if asset_a != asset_b => {
                Ok(SwapCall::AssetForAsset {
                    mode: edit_side,
                    asset_a,
                    asset_b,
                    amount_a,
                    amount_b,
                })
            }
            _ => Err(SwapError::DuplicateToken),
        }
    }

    /// Submit the swap. A pair without resolvable token ids is not ready
    /// yet and yields `Ok(None)` without touching the ledger.
    pub async fn execute(
        &self,
        pair: &TradePair,
        edit_side: EditSide,
        bounds: &ExecutionBounds,
        account: &AccountId,
    ) -> Result<Option<SwapReceipt>, SwapError> {
        let call = match Self::plan(pair, edit_side, bounds) {
            Ok(call) => call,
            Err(SwapError::MissingTokenId) => {
                debug!("Swap skipped: token ids not resolved yet");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        info!("Submitting {} swap for {}: {:?}", call.mode().as_str(), account, call);

        match call.submit(self.ledger.as_ref(), account).await {
            Ok(receipt) => {
                info!("Swap included: {}", receipt.tx_hash);
                Ok(Some(receipt))
            }
            Err(e) => {
                warn!("Swap submission failed: {}", e);
                Err(match e {
                    SwapError::SubmissionFailure(_) => e,
                    other => SwapError::SubmissionFailure(other.to_string()),
                })
            }
        }
    }
}
