//! Common types used across the swap core

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::shared::errors::SwapError;

/// On-chain identifier of an issued asset
pub type AssetId = u32;

/// Token identity. The chain's fee-paying token has no asset id and is
/// represented by the reserved `Native` variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenId {
    Native,
    Asset(AssetId),
}

impl TokenId {
    pub fn is_native(&self) -> bool {
        matches!(self, TokenId::Native)
    }

    pub fn asset_id(&self) -> Option<AssetId> {
        match self {
            TokenId::Native => None,
            TokenId::Asset(id) => Some(*id),
        }
    }

    /// Parse an identifier as it comes out of chain metadata.
    ///
    /// Absent, empty and `"0"` ids all denote the native token; grouping
    /// separators (`"1,984"`) are tolerated.
    pub fn parse(raw: Option<&str>) -> Result<Self, SwapError> {
        let cleaned: String = raw
            .unwrap_or_default()
            .chars()
            .filter(|c| !matches!(c, ',' | '_') && !c.is_whitespace())
            .collect();

        if cleaned.is_empty() || cleaned == "0" {
            return Ok(TokenId::Native);
        }

        cleaned
            .parse::<AssetId>()
            .map(TokenId::Asset)
            .map_err(|_| SwapError::InvalidTokenId(cleaned))
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenId::Native => write!(f, "native"),
            TokenId::Asset(id) => write!(f, "asset#{}", id),
        }
    }
}

/// Token representation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub symbol: String,
    pub id: TokenId,
    pub decimals: u32,
    /// Wallet balance in human units
    pub balance: Decimal,
}

impl Token {
    pub fn native(symbol: impl Into<String>, decimals: u32, balance: Decimal) -> Self {
        Self {
            symbol: symbol.into(),
            id: TokenId::Native,
            decimals,
            balance,
        }
    }

    pub fn asset(id: AssetId, symbol: impl Into<String>, decimals: u32, balance: Decimal) -> Self {
        Self {
            symbol: symbol.into(),
            id: TokenId::Asset(id),
            decimals,
            balance,
        }
    }

    pub fn is_native(&self) -> bool {
        self.id.is_native()
    }
}

/// One of the two token slots of the swap form: A pays, B receives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Slot {
    A,
    B,
}

impl Slot {
    pub fn other(&self) -> Slot {
        match self {
            Slot::A => Slot::B,
            Slot::B => Slot::A,
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::A => write!(f, "A"),
            Slot::B => write!(f, "B"),
        }
    }
}

/// Which field the user edited last, and therefore which amount is authoritative
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EditSide {
    /// Pay amount fixed; receive amount is an estimate bounded from below
    #[default]
    ExactIn,
    /// Receive amount fixed; pay amount is an estimate bounded from above
    ExactOut,
}

impl EditSide {
    pub fn from_slot(slot: Slot) -> Self {
        match slot {
            Slot::A => EditSide::ExactIn,
            Slot::B => EditSide::ExactOut,
        }
    }

    /// Slot holding the authoritative amount
    pub fn edited_slot(&self) -> Slot {
        match self {
            EditSide::ExactIn => Slot::A,
            EditSide::ExactOut => Slot::B,
        }
    }

    pub fn counterpart_slot(&self) -> Slot {
        self.edited_slot().other()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EditSide::ExactIn => "exact-in",
            EditSide::ExactOut => "exact-out",
        }
    }
}

/// The two selected tokens
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TradePair {
    pub token_a: Option<Token>,
    pub token_b: Option<Token>,
}

impl TradePair {
    pub fn new(token_a: Token, token_b: Token) -> Self {
        Self {
            token_a: Some(token_a),
            token_b: Some(token_b),
        }
    }

    pub fn token(&self, slot: Slot) -> Option<&Token> {
        match slot {
            Slot::A => self.token_a.as_ref(),
            Slot::B => self.token_b.as_ref(),
        }
    }

    pub fn set(&mut self, slot: Slot, token: Token) {
        match slot {
            Slot::A => self.token_a = Some(token),
            Slot::B => self.token_b = Some(token),
        }
    }

    pub fn both(&self) -> Option<(&Token, &Token)> {
        Some((self.token_a.as_ref()?, self.token_b.as_ref()?))
    }

    pub fn is_complete(&self) -> bool {
        self.token_a.is_some() && self.token_b.is_some()
    }

    pub fn native_slot(&self) -> Option<Slot> {
        if self.token_a.as_ref().is_some_and(Token::is_native) {
            Some(Slot::A)
        } else if self.token_b.as_ref().is_some_and(Token::is_native) {
            Some(Slot::B)
        } else {
            None
        }
    }

    pub fn involves_native(&self) -> bool {
        self.native_slot().is_some()
    }

    pub fn contains(&self, id: TokenId) -> bool {
        self.token_a.as_ref().is_some_and(|t| t.id == id)
            || self.token_b.as_ref().is_some_and(|t| t.id == id)
    }
}

/// Amounts shown to the user, in human units of their respective token
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayAmounts {
    pub amount_a: Decimal,
    pub amount_b: Decimal,
}

impl DisplayAmounts {
    pub fn get(&self, slot: Slot) -> Decimal {
        match slot {
            Slot::A => self.amount_a,
            Slot::B => self.amount_b,
        }
    }

    pub fn set(&mut self, slot: Slot, amount: Decimal) {
        match slot {
            Slot::A => self.amount_a = amount,
            Slot::B => self.amount_b = amount,
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Slippage-adjusted amounts submitted to the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionBounds {
    pub bound_a: Decimal,
    pub bound_b: Decimal,
}

impl ExecutionBounds {
    pub fn get(&self, slot: Slot) -> Decimal {
        match slot {
            Slot::A => self.bound_a,
            Slot::B => self.bound_b,
        }
    }
}

/// Ledger account address
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountId(pub String);

impl AccountId {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of a completed swap submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwapReceipt {
    pub tx_hash: String,
    pub token_in: TokenId,
    pub token_out: TokenId,
    /// Base units actually debited
    pub amount_in: u128,
    /// Base units actually credited
    pub amount_out: u128,
    pub executed_at: DateTime<Utc>,
}
