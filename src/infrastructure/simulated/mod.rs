//! In-memory chain backend for the CLI and tests

pub mod liquidity_pool;
pub mod simulated_chain;

pub use liquidity_pool::{LiquidityPool, POOL_FEE_BPS};
pub use simulated_chain::SimulatedChain;
