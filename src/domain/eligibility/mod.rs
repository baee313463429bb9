//! Eligibility - which action the swap button offers

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::shared::types::{DisplayAmounts, EditSide, TradePair};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SwapAction {
    ConnectWallet,
    SelectToken,
    EnterAmount,
    InsufficientNativeBalance,
    ReadyToSwap,
}

impl SwapAction {
    pub fn label(&self, native_symbol: &str) -> String {
        match self {
            SwapAction::ConnectWallet => "Connect Wallet".to_string(),
            SwapAction::SelectToken => "Select Token".to_string(),
            SwapAction::EnterAmount => "Enter Amount".to_string(),
            SwapAction::InsufficientNativeBalance => format!("Insufficient {} balance", native_symbol),
            SwapAction::ReadyToSwap => "Swap".to_string(),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, SwapAction::ReadyToSwap)
    }
}

/// First matching rule wins. `None` means the button stays disabled
/// without a label change.
pub fn check(
    wallet_connected: bool,
    native_balance_sufficient: bool,
    pair: &TradePair,
    display: &DisplayAmounts,
    edit_side: EditSide,
) -> Option<SwapAction> {
    if !wallet_connected {
        return Some(SwapAction::ConnectWallet);
    }
    if !pair.is_complete() {
        return Some(SwapAction::SelectToken);
    }
    if display.get(edit_side.edited_slot()) <= Decimal::ZERO {
        return Some(SwapAction::EnterAmount);
    }

    if pair.involves_native() {
        return Some(if native_balance_sufficient {
            SwapAction::ReadyToSwap
        } else {
            SwapAction::InsufficientNativeBalance
        });
    }

    if display.amount_a > Decimal::ZERO && display.amount_b > Decimal::ZERO {
        return Some(SwapAction::ReadyToSwap);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::types::{Slot, Token};
    use rust_decimal_macros::dec;

    fn wnd() -> Token {
        Token::native("WND", 12, dec!(10))
    }

    fn usdt() -> Token {
        Token::asset(1984, "USDT", 6, dec!(0))
    }

    fn pink() -> Token {
        Token::asset(23, "PINK", 10, dec!(0))
    }

    fn amounts(a: Decimal, b: Decimal) -> DisplayAmounts {
        DisplayAmounts {
            amount_a: a,
            amount_b: b,
        }
    }

    #[test]
    fn test_disconnected_wallet_always_wins() {
        let pairs = [TradePair::default(), TradePair::new(wnd(), usdt()), TradePair::new(usdt(), pink())];
        for pair in &pairs {
            for sufficient in [true, false] {
                for side in [EditSide::ExactIn, EditSide::ExactOut] {
                    assert_eq!(
                        check(false, sufficient, pair, &amounts(dec!(1), dec!(2)), side),
                        Some(SwapAction::ConnectWallet)
                    );
                }
            }
        }
    }

    #[test]
    fn test_missing_token() {
        let mut pair = TradePair::default();
        pair.set(Slot::A, wnd());
        assert_eq!(
            check(true, true, &pair, &amounts(dec!(1), dec!(1)), EditSide::ExactIn),
            Some(SwapAction::SelectToken)
        );
    }

    #[test]
    fn test_authoritative_amount_must_be_positive() {
        let pair = TradePair::new(usdt(), pink());
        assert_eq!(
            check(true, true, &pair, &amounts(dec!(0), dec!(3)), EditSide::ExactIn),
            Some(SwapAction::EnterAmount)
        );
        assert_eq!(
            check(true, true, &pair, &amounts(dec!(3), dec!(0)), EditSide::ExactOut),
            Some(SwapAction::EnterAmount)
        );
    }

    #[test]
    fn test_native_balance_gate() {
        let pair = TradePair::new(wnd(), usdt());
        let display = amounts(dec!(5), dec!(100));
        assert_eq!(
            check(true, false, &pair, &display, EditSide::ExactIn),
            Some(SwapAction::InsufficientNativeBalance)
        );
        assert_eq!(
            check(true, true, &pair, &display, EditSide::ExactIn),
            Some(SwapAction::ReadyToSwap)
        );
    }

    #[test]
    fn test_asset_pair_needs_both_amounts() {
        let pair = TradePair::new(usdt(), pink());
        assert_eq!(
            check(true, false, &pair, &amounts(dec!(5), dec!(7)), EditSide::ExactIn),
            Some(SwapAction::ReadyToSwap)
        );
        // Quote not back yet
        assert_eq!(check(true, true, &pair, &amounts(dec!(5), dec!(0)), EditSide::ExactIn), None);
    }

    #[test]
    fn test_labels() {
        assert_eq!(SwapAction::InsufficientNativeBalance.label("WND"), "Insufficient WND balance");
        assert_eq!(SwapAction::ReadyToSwap.label("WND"), "Swap");
        assert!(SwapAction::ReadyToSwap.is_ready());
        assert!(!SwapAction::EnterAmount.is_ready());
    }
}
