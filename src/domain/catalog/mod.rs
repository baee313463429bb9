//! Token catalog - which tokens may be picked for a slot

use async_trait::async_trait;
use std::collections::HashSet;

use crate::shared::errors::SwapError;
use crate::shared::types::{AssetId, Token, TradePair};

/// Resolves selectable tokens from pool metadata
#[async_trait]
pub trait TokenCatalog: Send + Sync {
    /// Ordered list of tokens that can be swapped, excluding the ones
    /// already selected in `pair`
    async fn list_swappable(&self, pair: &TradePair) -> Result<Vec<Token>, SwapError>;
}

/// Native token first, then every asset with a pool, in catalog order.
/// Tokens already selected in either slot are left out.
pub fn filter_swappable(
    native: &Token,
    assets: &[Token],
    pooled_assets: &HashSet<AssetId>,
    pair: &TradePair,
) -> Vec<Token> {
    std::iter::once(native)
        .chain(
            assets
                .iter()
                .filter(|t| t.id.asset_id().is_some_and(|id| pooled_assets.contains(&id))),
        )
        .filter(|t| !pair.contains(t.id))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::types::Slot;
    use rust_decimal_macros::dec;

    fn catalog() -> (Token, Vec<Token>, HashSet<AssetId>) {
        let native = Token::native("WND", 12, dec!(10));
        let assets = vec![
            Token::asset(1984, "USDT", 6, dec!(0)),
            Token::asset(7, "DUST", 8, dec!(0)),
            Token::asset(23, "PINK", 10, dec!(0)),
        ];
        // DUST has no pool
        let pooled = HashSet::from([1984, 23]);
        (native, assets, pooled)
    }

    fn symbols(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|t| t.symbol.as_str()).collect()
    }

    #[test]
    fn test_native_first_then_pooled_assets() {
        let (native, assets, pooled) = catalog();
        let tokens = filter_swappable(&native, &assets, &pooled, &TradePair::default());
        assert_eq!(symbols(&tokens), vec!["WND", "USDT", "PINK"]);
    }

    #[test]
    fn test_excludes_selected_tokens() {
        let (native, assets, pooled) = catalog();
        let mut pair = TradePair::default();
        pair.set(Slot::A, native.clone());
        pair.set(Slot::B, assets[2].clone());

        let tokens = filter_swappable(&native, &assets, &pooled, &pair);
        assert_eq!(symbols(&tokens), vec!["USDT"]);
    }
}
