//! Error handling for the swap core

use thiserror::Error;

use crate::shared::types::Slot;

/// Swap-flow errors. None of these are fatal: every one is recoverable by
/// further user input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SwapError {
    #[error("Too many decimals: {fractional_digits} given, token allows {decimals}")]
    PrecisionViolation { decimals: u32, fractional_digits: u32 },

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Quote unavailable")]
    QuoteUnavailable,

    #[error("Token id missing for swap")]
    MissingTokenId,

    #[error("Swap submission failed: {0}")]
    SubmissionFailure(String),

    #[error("No token selected for slot {0}")]
    TokenNotSelected(Slot),

    #[error("Token already selected in the other slot")]
    DuplicateToken,

    #[error("Invalid token id: {0}")]
    InvalidTokenId(String),

    #[error("Slippage tolerance out of range: {0} bps")]
    InvalidTolerance(u32),

    #[error("Unsupported token decimals: {0}")]
    UnsupportedDecimals(u32),

    #[error("Amount overflows base-unit range")]
    AmountOverflow,

    #[error("Price oracle error: {0}")]
    Oracle(String),

    #[error("Wallet not connected")]
    WalletNotConnected,

    #[error("No quoted swap to execute")]
    NothingToExecute,
}

/// General application error
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Unknown token: {0}")]
    UnknownToken(String),

    #[error("Swap not ready: {0}")]
    NotReady(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Swap error: {0}")]
    Swap(#[from] SwapError),
}
