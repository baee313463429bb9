//! In-memory chain: pool book, balances and swap settlement
//!
//! Every pool pairs the native token with one asset. Asset/asset trades
//! route through native in two hops, the same way the asset-conversion
//! runtime prices them.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::liquidity_pool::LiquidityPool;
use crate::domain::amount::{from_base_units, to_base_units};
use crate::domain::catalog::{filter_swappable, TokenCatalog};
use crate::domain::execution::{LedgerClient, NativeDirection};
use crate::domain::quote::PriceOracle;
use crate::shared::config::Config;
use crate::shared::errors::{AppError, SwapError};
use crate::shared::types::{AccountId, AssetId, SwapReceipt, Token, TokenId, TradePair};
use crate::shared::utils::{format_grouped, generate_tx_hash};

/// One pool traversal; `native_in` is true when native goes into the pool
#[derive(Debug, Clone, Copy)]
struct Hop {
    asset_id: AssetId,
    native_in: bool,
}

fn route(token_in: TokenId, token_out: TokenId) -> Result<Vec<Hop>, SwapError> {
    match (token_in, token_out) {
        (TokenId::Native, TokenId::Asset(asset_id)) => Ok(vec![Hop { asset_id, native_in: true }]),
        (TokenId::Asset(asset_id), TokenId::Native) => Ok(vec![Hop { asset_id, native_in: false }]),
        (TokenId::Asset(a), TokenId::Asset(b)) if a != b => Ok(vec![
            Hop { asset_id: a, native_in: false },
            Hop { asset_id: b, native_in: true },
        ]),
        _ => Err(SwapError::DuplicateToken),
    }
}

/// Fixed side of a settlement
#[derive(Debug, Clone, Copy)]
enum Fill {
    /// Pay exactly `amount_in`, receive at least `min_out`
    ExactIn { amount_in: u128, min_out: u128 },
    /// Receive exactly `amount_out`, pay at most `max_in`
    ExactOut { amount_out: u128, max_in: u128 },
}

#[derive(Debug, Default)]
struct ChainState {
    pools: HashMap<AssetId, LiquidityPool>,
    balances: HashMap<(AccountId, TokenId), u128>,
}

impl ChainState {
    fn pool(&self, asset_id: AssetId) -> Option<&LiquidityPool> {
        self.pools.get(&asset_id)
    }

    fn balance(&self, account: &AccountId, token: TokenId) -> u128 {
        self.balances.get(&(account.clone(), token)).copied().unwrap_or(0)
    }

    fn quote_out(&self, hops: &[Hop], amount_in: u128) -> Option<Vec<u128>> {
        let mut amounts = vec![amount_in];
        for hop in hops {
            let last = *amounts.last()?;
            amounts.push(self.pool(hop.asset_id)?.amount_out(hop.native_in, last)?);
        }
        Some(amounts)
    }

    fn quote_in(&self, hops: &[Hop], amount_out: u128) -> Option<Vec<u128>> {
        let mut amounts = vec![amount_out];
        for hop in hops.iter().rev() {
            let first = *amounts.first()?;
            amounts.insert(0, self.pool(hop.asset_id)?.amount_in(hop.native_in, first)?);
        }
        Some(amounts)
    }
}

/// Simulated ledger backed by constant-product pools
pub struct SimulatedChain {
    native: Token,
    assets: Vec<Token>,
    account: AccountId,
    state: RwLock<ChainState>,
    connected: AtomicBool,
}

impl SimulatedChain {
    /// Build the pool book and the configured account's balances
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        let native = config.native_token();
        let assets = config.asset_tokens();
        let account = config.account();

        let asset_decimals = |id: AssetId| {
            assets
                .iter()
                .find(|t| t.id == TokenId::Asset(id))
                .map(|t| t.decimals)
                .ok_or_else(|| AppError::UnknownToken(id.to_string()))
        };

        let mut state = ChainState::default();
        for pool in &config.pools {
            let native_reserve = to_base_units(pool.native_reserve, native.decimals)?;
            let asset_reserve = to_base_units(pool.asset_reserve, asset_decimals(pool.asset_id)?)?;
            state
                .pools
                .insert(pool.asset_id, LiquidityPool::new(pool.asset_id, native_reserve, asset_reserve));
        }

        for token in std::iter::once(&native).chain(assets.iter()) {
            let base = to_base_units(token.balance, token.decimals)?;
            if base > 0 {
                state.balances.insert((account.clone(), token.id), base);
            }
        }

        info!(
            "Simulated chain: {} {} pools, {} assets, account {}",
            state.pools.len(),
            native.symbol,
            assets.len(),
            account
        );

        Ok(Self {
            native,
            assets,
            account,
            state: RwLock::new(state),
            connected: AtomicBool::new(true),
        })
    }

    pub fn native(&self) -> &Token {
        &self.native
    }

    /// Look up a token by symbol (case-insensitive)
    pub fn token_by_symbol(&self, symbol: &str) -> Option<Token> {
        std::iter::once(&self.native)
            .chain(self.assets.iter())
            .find(|t| t.symbol.eq_ignore_ascii_case(symbol))
            .cloned()
    }

    /// Drop or restore the node connection. While disconnected the
    /// oracle answers nothing and ledger calls fail.
    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
        info!("Chain connection {}", if connected { "restored" } else { "lost" });
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    pub async fn pool(&self, asset_id: AssetId) -> Option<LiquidityPool> {
        self.state.read().await.pool(asset_id).copied()
    }

    fn ensure_connected(&self) -> Result<(), SwapError> {
        if self.is_connected() {
            Ok(())
        } else {
            Err(SwapError::SubmissionFailure("no active connection".to_string()))
        }
    }

    async fn price(&self, hops: &[Hop], amount: u128, exact_out: bool) -> Option<String> {
        if !self.is_connected() {
            debug!("Oracle query while disconnected");
            return None;
        }

        let state = self.state.read().await;
        let amounts = if exact_out {
            state.quote_in(hops, amount)?
        } else {
            state.quote_out(hops, amount)?
        };
        let priced = if exact_out { amounts.first() } else { amounts.last() };
        priced.map(|value| format_grouped(*value))
    }

    /// Settle a trade atomically: either every hop and both balance moves
    /// apply, or nothing does.
    async fn settle(
        &self,
        account: &AccountId,
        token_in: TokenId,
        token_out: TokenId,
        fill: Fill,
    ) -> Result<SwapReceipt, SwapError> {
        self.ensure_connected()?;
        let hops = route(token_in, token_out)?;

        let mut state = self.state.write().await;
        let amounts = match fill {
            Fill::ExactIn { amount_in, min_out } => {
                let amounts = state
                    .quote_out(&hops, amount_in)
                    .ok_or_else(|| SwapError::SubmissionFailure("insufficient pool liquidity".to_string()))?;
                let received = amounts.last().copied().unwrap_or(0);
                if received < min_out {
                    return Err(SwapError::SubmissionFailure(format!(
                        "slippage exceeded: would receive {}, minimum {}",
                        received, min_out
                    )));
                }
                amounts
            }
            Fill::ExactOut { amount_out, max_in } => {
                let amounts = state
                    .quote_in(&hops, amount_out)
                    .ok_or_else(|| SwapError::SubmissionFailure("insufficient pool liquidity".to_string()))?;
                let paid = amounts.first().copied().unwrap_or(u128::MAX);
                if paid > max_in {
                    return Err(SwapError::SubmissionFailure(format!(
                        "slippage exceeded: would pay {}, maximum {}",
                        paid, max_in
                    )));
                }
                amounts
            }
        };

        let amount_in = amounts.first().copied().unwrap_or(0);
        let amount_out = amounts.last().copied().unwrap_or(0);

        let available = state.balance(account, token_in);
        if available < amount_in {
            return Err(SwapError::SubmissionFailure(format!(
                "insufficient {} balance: have {}, need {}",
                token_in, available, amount_in
            )));
        }

        for (i, hop) in hops.iter().enumerate() {
            if let Some(pool) = state.pools.get_mut(&hop.asset_id) {
                pool.apply(hop.native_in, amounts[i], amounts[i + 1]);
            }
        }
        state.balances.insert((account.clone(), token_in), available - amount_in);
        *state.balances.entry((account.clone(), token_out)).or_insert(0) += amount_out;

        Ok(SwapReceipt {
            tx_hash: generate_tx_hash(),
            token_in,
            token_out,
            amount_in,
            amount_out,
            executed_at: Utc::now(),
        })
    }

    fn native_legs(asset_id: AssetId, direction: NativeDirection) -> (TokenId, TokenId) {
        match direction {
            NativeDirection::PayNative => (TokenId::Native, TokenId::Asset(asset_id)),
            NativeDirection::ReceiveNative => (TokenId::Asset(asset_id), TokenId::Native),
        }
    }
}

#[async_trait]
impl PriceOracle for SimulatedChain {
    async fn price_asset_from_native(
        &self,
        asset_id: AssetId,
        native_amount: u128,
    ) -> Result<Option<String>, SwapError> {
        Ok(self.price(&route(TokenId::Native, TokenId::Asset(asset_id))?, native_amount, false).await)
    }

    async fn price_native_from_asset(
        &self,
        asset_id: AssetId,
        asset_amount: u128,
    ) -> Result<Option<String>, SwapError> {
        Ok(self.price(&route(TokenId::Asset(asset_id), TokenId::Native)?, asset_amount, false).await)
    }

    async fn price_native_for_exact_asset(
        &self,
        asset_id: AssetId,
        asset_amount: u128,
    ) -> Result<Option<String>, SwapError> {
        Ok(self.price(&route(TokenId::Native, TokenId::Asset(asset_id))?, asset_amount, true).await)
    }

    async fn price_asset_for_exact_native(
        &self,
        asset_id: AssetId,
        native_amount: u128,
    ) -> Result<Option<String>, SwapError> {
        Ok(self.price(&route(TokenId::Asset(asset_id), TokenId::Native)?, native_amount, true).await)
    }

    async fn price_a_from_b(
        &self,
        asset_a: AssetId,
        asset_b: AssetId,
        amount_b: u128,
    ) -> Result<Option<String>, SwapError> {
        let hops = route(TokenId::Asset(asset_a), TokenId::Asset(asset_b))?;
        Ok(self.price(&hops, amount_b, true).await)
    }

    async fn price_b_from_a(
        &self,
        asset_a: AssetId,
        asset_b: AssetId,
        amount_a: u128,
    ) -> Result<Option<String>, SwapError> {
        let hops = route(TokenId::Asset(asset_a), TokenId::Asset(asset_b))?;
        Ok(self.price(&hops, amount_a, false).await)
    }
}

#[async_trait]
impl LedgerClient for SimulatedChain {
    async fn balance(&self, account: &AccountId, token: TokenId) -> Result<u128, SwapError> {
        self.ensure_connected()?;
        Ok(self.state.read().await.balance(account, token))
    }

    async fn swap_native_for_asset_exact_in(
        &self,
        asset_id: AssetId,
        account: &AccountId,
        native_amount: u128,
        asset_amount: u128,
        direction: NativeDirection,
    ) -> Result<SwapReceipt, SwapError> {
        let (token_in, token_out) = Self::native_legs(asset_id, direction);
        let (amount_in, min_out) = if direction.is_reversed() {
            (asset_amount, native_amount)
        } else {
            (native_amount, asset_amount)
        };
        self.settle(account, token_in, token_out, Fill::ExactIn { amount_in, min_out })
            .await
            .inspect_err(|e| warn!("Native swap (exact-in) rejected: {}", e))
    }

    async fn swap_native_for_asset_exact_out(
        &self,
        asset_id: AssetId,
        account: &AccountId,
        native_amount: u128,
        asset_amount: u128,
        direction: NativeDirection,
    ) -> Result<SwapReceipt, SwapError> {
        let (token_in, token_out) = Self::native_legs(asset_id, direction);
        let (max_in, amount_out) = if direction.is_reversed() {
            (asset_amount, native_amount)
        } else {
            (native_amount, asset_amount)
        };
        self.settle(account, token_in, token_out, Fill::ExactOut { amount_out, max_in })
            .await
            .inspect_err(|e| warn!("Native swap (exact-out) rejected: {}", e))
    }

    async fn swap_asset_for_asset_exact_in(
        &self,
        asset_a: AssetId,
        asset_b: AssetId,
        account: &AccountId,
        amount_a: u128,
        amount_b: u128,
    ) -> Result<SwapReceipt, SwapError> {
        self.settle(
            account,
            TokenId::Asset(asset_a),
            TokenId::Asset(asset_b),
            Fill::ExactIn {
                amount_in: amount_a,
                min_out: amount_b,
            },
        )
        .await
    }

    async fn swap_asset_for_asset_exact_out(
        &self,
        asset_a: AssetId,
        asset_b: AssetId,
        account: &AccountId,
        amount_a: u128,
        amount_b: u128,
    ) -> Result<SwapReceipt, SwapError> {
        self.settle(
            account,
            TokenId::Asset(asset_a),
            TokenId::Asset(asset_b),
            Fill::ExactOut {
                amount_out: amount_b,
                max_in: amount_a,
            },
        )
        .await
    }
}

#[async_trait]
impl TokenCatalog for SimulatedChain {
    async fn list_swappable(&self, pair: &TradePair) -> Result<Vec<Token>, SwapError> {
        let state = self.state.read().await;

        let with_balance = |token: &Token| -> Result<Token, SwapError> {
            let base = state.balance(&self.account, token.id);
            Ok(Token {
                balance: from_base_units(base, token.decimals)?,
                ..token.clone()
            })
        };

        let native = with_balance(&self.native)?;
        let assets = self
            .assets
            .iter()
            .map(with_balance)
            .collect::<Result<Vec<_>, _>>()?;
        let pooled: HashSet<AssetId> = state
            .pools
            .values()
            .filter(|p| p.has_liquidity())
            .map(|p| p.asset_id)
            .collect();

        Ok(filter_swappable(&native, &assets, &pooled, pair))
    }
}
