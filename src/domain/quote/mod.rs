//! Quote domain - pricing paths and oracle routing

mod price_oracle;
mod quote_router;

pub use price_oracle::PriceOracle;
pub use quote_router::QuoteRouter;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::shared::errors::SwapError;
use crate::shared::types::{AssetId, EditSide, Slot, TradePair};

/// How the two selected tokens are priced against each other.
/// Resolved once per pair change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PricingPath {
    NativeVsAsset { native_side: Slot, asset_id: AssetId },
    AssetVsAsset { asset_a: AssetId, asset_b: AssetId },
}

impl PricingPath {
    pub fn resolve(pair: &TradePair) -> Result<Self, SwapError> {
        let token_a = pair.token_a.as_ref().ok_or(SwapError::TokenNotSelected(Slot::A))?;
        let token_b = pair.token_b.as_ref().ok_or(SwapError::TokenNotSelected(Slot::B))?;

        if token_a.id == token_b.id {
            return Err(SwapError::DuplicateToken);
        }

        match (token_a.id.asset_id(), token_b.id.asset_id()) {
            (None, Some(asset_id)) => Ok(PricingPath::NativeVsAsset {
                native_side: Slot::A,
                asset_id,
            }),
            (Some(asset_id), None) => Ok(PricingPath::NativeVsAsset {
                native_side: Slot::B,
                asset_id,
            }),
            (Some(asset_a), Some(asset_b)) => Ok(PricingPath::AssetVsAsset { asset_a, asset_b }),
            (None, None) => Err(SwapError::DuplicateToken),
        }
    }

    pub fn native_side(&self) -> Option<Slot> {
        match self {
            PricingPath::NativeVsAsset { native_side, .. } => Some(*native_side),
            PricingPath::AssetVsAsset { .. } => None,
        }
    }

    /// Strategy table: which oracle call prices the counterpart of an edit
    pub fn query(&self, edit_side: EditSide, edited_amount: u128) -> OracleQuery {
        match *self {
            PricingPath::NativeVsAsset { native_side, asset_id } => {
                let native_edited = native_side == edit_side.edited_slot();
                match (native_edited, edit_side) {
                    (true, EditSide::ExactIn) => OracleQuery::AssetFromNative {
                        asset_id,
                        native_amount: edited_amount,
                    },
                    (true, EditSide::ExactOut) => OracleQuery::AssetForExactNative {
                        asset_id,
                        native_amount: edited_amount,
                    },
                    (false, EditSide::ExactIn) => OracleQuery::NativeFromAsset {
                        asset_id,
                        asset_amount: edited_amount,
                    },
                    (false, EditSide::ExactOut) => OracleQuery::NativeForExactAsset {
                        asset_id,
                        asset_amount: edited_amount,
                    },
                }
            }
            PricingPath::AssetVsAsset { asset_a, asset_b } => match edit_side {
                EditSide::ExactIn => OracleQuery::BFromA {
                    asset_a,
                    asset_b,
                    amount_a: edited_amount,
                },
                EditSide::ExactOut => OracleQuery::AFromB {
                    asset_a,
                    asset_b,
                    amount_b: edited_amount,
                },
            },
        }
    }
}

/// A single oracle call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OracleQuery {
    AssetFromNative { asset_id: AssetId, native_amount: u128 },
    NativeFromAsset { asset_id: AssetId, asset_amount: u128 },
    /// Native paid for an exact asset output
    NativeForExactAsset { asset_id: AssetId, asset_amount: u128 },
    /// Asset paid for an exact native output
    AssetForExactNative { asset_id: AssetId, native_amount: u128 },
    BFromA { asset_a: AssetId, asset_b: AssetId, amount_a: u128 },
    AFromB { asset_a: AssetId, asset_b: AssetId, amount_b: u128 },
}

impl OracleQuery {
    pub async fn dispatch(&self, oracle: &dyn PriceOracle) -> Result<Option<String>, SwapError> {
        match *self {
            OracleQuery::AssetFromNative { asset_id, native_amount } => {
                oracle.price_asset_from_native(asset_id, native_amount).await
            }
            OracleQuery::NativeFromAsset { asset_id, asset_amount } => {
                oracle.price_native_from_asset(asset_id, asset_amount).await
            }
            OracleQuery::NativeForExactAsset { asset_id, asset_amount } => {
                oracle.price_native_for_exact_asset(asset_id, asset_amount).await
            }
            OracleQuery::AssetForExactNative { asset_id, native_amount } => {
                oracle.price_asset_for_exact_native(asset_id, native_amount).await
            }
            OracleQuery::BFromA { asset_a, asset_b, amount_a } => {
                oracle.price_b_from_a(asset_a, asset_b, amount_a).await
            }
            OracleQuery::AFromB { asset_a, asset_b, amount_b } => {
                oracle.price_a_from_b(asset_a, asset_b, amount_b).await
            }
        }
    }
}

/// Counterpart quote requested by one user edit
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteRequest {
    /// Monotonic per session; only the latest request may land
    pub seq: u64,
    pub path: PricingPath,
    pub edit_side: EditSide,
    /// Authoritative amount, human units of the edited token
    pub amount: Decimal,
    pub edited_decimals: u32,
    pub counterpart_decimals: u32,
}

impl QuoteRequest {
    pub fn for_pair(
        seq: u64,
        pair: &TradePair,
        edit_side: EditSide,
        amount: Decimal,
    ) -> Result<Self, SwapError> {
        let path = PricingPath::resolve(pair)?;
        let edited = pair
            .token(edit_side.edited_slot())
            .ok_or(SwapError::TokenNotSelected(edit_side.edited_slot()))?;
        let counterpart = pair
            .token(edit_side.counterpart_slot())
            .ok_or(SwapError::TokenNotSelected(edit_side.counterpart_slot()))?;

        Ok(Self {
            seq,
            path,
            edit_side,
            amount,
            edited_decimals: edited.decimals,
            counterpart_decimals: counterpart.decimals,
        })
    }
}

/// Oracle result for a [`QuoteRequest`]; `None` when no quote was available
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteResponse {
    pub seq: u64,
    pub counterpart: Option<Decimal>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::types::Token;
    use rust_decimal_macros::dec;

    fn wnd() -> Token {
        Token::native("WND", 12, dec!(100))
    }

    fn usdt() -> Token {
        Token::asset(1984, "USDT", 6, dec!(0))
    }

    fn pink() -> Token {
        Token::asset(23, "PINK", 10, dec!(0))
    }

    #[test]
    fn test_resolve_paths() {
        assert_eq!(
            PricingPath::resolve(&TradePair::new(wnd(), usdt())).unwrap(),
            PricingPath::NativeVsAsset { native_side: Slot::A, asset_id: 1984 }
        );
        assert_eq!(
            PricingPath::resolve(&TradePair::new(usdt(), wnd())).unwrap(),
            PricingPath::NativeVsAsset { native_side: Slot::B, asset_id: 1984 }
        );
        assert_eq!(
            PricingPath::resolve(&TradePair::new(usdt(), pink())).unwrap(),
            PricingPath::AssetVsAsset { asset_a: 1984, asset_b: 23 }
        );
    }

    #[test]
    fn test_resolve_rejects_incomplete_or_duplicate_pair() {
        let mut pair = TradePair::default();
        assert_eq!(PricingPath::resolve(&pair), Err(SwapError::TokenNotSelected(Slot::A)));
        pair.set(Slot::A, usdt());
        assert_eq!(PricingPath::resolve(&pair), Err(SwapError::TokenNotSelected(Slot::B)));
        pair.set(Slot::B, usdt());
        assert_eq!(PricingPath::resolve(&pair), Err(SwapError::DuplicateToken));
    }

    #[test]
    fn test_strategy_table() {
        let native_a = PricingPath::NativeVsAsset { native_side: Slot::A, asset_id: 7 };
        let native_b = PricingPath::NativeVsAsset { native_side: Slot::B, asset_id: 7 };
        let assets = PricingPath::AssetVsAsset { asset_a: 7, asset_b: 9 };

        assert_eq!(
            native_a.query(EditSide::ExactIn, 5),
            OracleQuery::AssetFromNative { asset_id: 7, native_amount: 5 }
        );
        // Exact-out: WND pay side edited on B, so native is the input
        assert_eq!(
            native_a.query(EditSide::ExactOut, 5),
            OracleQuery::NativeForExactAsset { asset_id: 7, asset_amount: 5 }
        );
        assert_eq!(
            native_b.query(EditSide::ExactIn, 5),
            OracleQuery::NativeFromAsset { asset_id: 7, asset_amount: 5 }
        );
        assert_eq!(
            native_b.query(EditSide::ExactOut, 5),
            OracleQuery::AssetForExactNative { asset_id: 7, native_amount: 5 }
        );
        assert_eq!(
            assets.query(EditSide::ExactIn, 5),
            OracleQuery::BFromA { asset_a: 7, asset_b: 9, amount_a: 5 }
        );
        assert_eq!(
            assets.query(EditSide::ExactOut, 5),
            OracleQuery::AFromB { asset_a: 7, asset_b: 9, amount_b: 5 }
        );
    }

    #[test]
    fn test_request_uses_counterpart_decimals() {
        let pair = TradePair::new(wnd(), usdt());
        let request = QuoteRequest::for_pair(3, &pair, EditSide::ExactOut, dec!(2)).unwrap();
        assert_eq!(request.seq, 3);
        assert_eq!(request.edited_decimals, 6);
        assert_eq!(request.counterpart_decimals, 12);
    }
}
