//! Constant-product native/asset pool, base units throughout

use serde::{Deserialize, Serialize};

use crate::shared::types::AssetId;

/// Pool fee in basis points, taken from the input amount
pub const POOL_FEE_BPS: u128 = 30;
const FEE_DENOMINATOR: u128 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidityPool {
    pub asset_id: AssetId,
    pub native_reserve: u128,
    pub asset_reserve: u128,
}

impl LiquidityPool {
    pub fn new(asset_id: AssetId, native_reserve: u128, asset_reserve: u128) -> Self {
        Self {
            asset_id,
            native_reserve,
            asset_reserve,
        }
    }

    pub fn has_liquidity(&self) -> bool {
        self.native_reserve > 0 && self.asset_reserve > 0
    }

    /// (reserve_in, reserve_out) for a trade paying native when `native_in`
    fn reserves(&self, native_in: bool) -> (u128, u128) {
        if native_in {
            (self.native_reserve, self.asset_reserve)
        } else {
            (self.asset_reserve, self.native_reserve)
        }
    }

    /// Output for an exact input. `None` when the pool cannot fill it.
    pub fn amount_out(&self, native_in: bool, amount_in: u128) -> Option<u128> {
        let (reserve_in, reserve_out) = self.reserves(native_in);
        if amount_in == 0 || reserve_in == 0 || reserve_out == 0 {
            return None;
        }

        let in_with_fee = amount_in.checked_mul(FEE_DENOMINATOR - POOL_FEE_BPS)?;
        let numerator = in_with_fee.checked_mul(reserve_out)?;
        let denominator = reserve_in.checked_mul(FEE_DENOMINATOR)?.checked_add(in_with_fee)?;

        match numerator / denominator {
            0 => None,
            out => Some(out),
        }
    }

    /// Input required for an exact output, rounded up. `None` when the
    /// output would drain the pool.
    pub fn amount_in(&self, native_in: bool, amount_out: u128) -> Option<u128> {
        let (reserve_in, reserve_out) = self.reserves(native_in);
        if amount_out == 0 || reserve_in == 0 || amount_out >= reserve_out {
            return None;
        }

        let numerator = reserve_in
            .checked_mul(amount_out)?
            .checked_mul(FEE_DENOMINATOR)?;
        let denominator = (reserve_out - amount_out).checked_mul(FEE_DENOMINATOR - POOL_FEE_BPS)?;

        Some(numerator / denominator + 1)
    }

    pub fn apply(&mut self, native_in: bool, amount_in: u128, amount_out: u128) {
        if native_in {
            self.native_reserve += amount_in;
            self.asset_reserve -= amount_out;
        } else {
            self.asset_reserve += amount_in;
            self.native_reserve -= amount_out;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_out_includes_fee() {
        let pool = LiquidityPool::new(1, 1_000, 1_000);
        // Fee-free would be 90
        assert_eq!(pool.amount_out(true, 100), Some(90));
        assert_eq!(pool.amount_out(false, 100), Some(90));
    }

    #[test]
    fn test_amount_in_covers_requested_output() {
        let pool = LiquidityPool::new(1, 1_000, 1_000);
        let needed = pool.amount_in(true, 90).unwrap();
        assert_eq!(needed, 100);
        assert!(pool.amount_out(true, needed).unwrap() >= 90);
    }

    #[test]
    fn test_empty_or_drained_pool() {
        let empty = LiquidityPool::new(1, 0, 1_000);
        assert!(!empty.has_liquidity());
        assert_eq!(empty.amount_out(true, 10), None);

        let pool = LiquidityPool::new(1, 1_000, 1_000);
        assert_eq!(pool.amount_in(true, 1_000), None);
        assert_eq!(pool.amount_out(true, 0), None);
        // Dust rounds to nothing
        assert_eq!(pool.amount_out(true, 1), None);
    }

    #[test]
    fn test_apply_moves_reserves() {
        let mut pool = LiquidityPool::new(1, 1_000, 1_000);
        pool.apply(true, 100, 90);
        assert_eq!(pool.native_reserve, 1_100);
        assert_eq!(pool.asset_reserve, 910);
    }
}
