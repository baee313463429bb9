//! Swap form state machine
//!
//! Owns the selected pair, the last edited side, both display amounts and
//! the slippage-adjusted execution bounds. Oracle calls happen outside:
//! an edit hands back a [`QuoteRequest`] and the caller feeds the matching
//! [`QuoteResponse`] into [`SwapStateMachine::apply_quote`]. Only the most
//! recently issued request can land; anything older is stale.

use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use super::{QuoteOutcome, SwapPhase};
use crate::domain::amount::parse_amount;
use crate::domain::quote::{PricingPath, QuoteRequest, QuoteResponse};
use crate::domain::slippage::{apply_tolerance, SlippageConfig};
use crate::shared::errors::SwapError;
use crate::shared::types::{DisplayAmounts, EditSide, ExecutionBounds, Slot, Token, TradePair};

#[derive(Debug, Clone)]
pub struct SwapStateMachine {
    pair: TradePair,
    path: Option<PricingPath>,
    edit_side: EditSide,
    display: DisplayAmounts,
    bounds: Option<ExecutionBounds>,
    phase: SwapPhase,
    slippage: SlippageConfig,
    last_seq: u64,
    native_balance: Option<Decimal>,
    native_sufficient: bool,
}

impl SwapStateMachine {
    pub fn new(slippage: SlippageConfig) -> Self {
        Self {
            pair: TradePair::default(),
            path: None,
            edit_side: EditSide::default(),
            display: DisplayAmounts::default(),
            bounds: None,
            phase: SwapPhase::Idle,
            slippage,
            last_seq: 0,
            native_balance: None,
            native_sufficient: false,
        }
    }

    pub fn pair(&self) -> &TradePair {
        &self.pair
    }

    pub fn path(&self) -> Option<PricingPath> {
        self.path
    }

    pub fn edit_side(&self) -> EditSide {
        self.edit_side
    }

    pub fn display(&self) -> &DisplayAmounts {
        &self.display
    }

    pub fn bounds(&self) -> Option<&ExecutionBounds> {
        self.bounds.as_ref()
    }

    pub fn phase(&self) -> SwapPhase {
        self.phase
    }

    pub fn slippage(&self) -> SlippageConfig {
        self.slippage
    }

    pub fn is_quoting(&self) -> bool {
        matches!(self.phase, SwapPhase::Quoting { .. })
    }

    pub fn native_balance_sufficient(&self) -> bool {
        self.native_sufficient
    }

    /// Put `token` into `slot`. Any amounts, bounds and in-flight quotes
    /// belong to the old pair and are dropped.
    pub fn select_token(&mut self, slot: Slot, token: Token) -> Result<(), SwapError> {
        if self.pair.token(slot.other()).is_some_and(|t| t.id == token.id) {
            return Err(SwapError::DuplicateToken);
        }

        info!("Slot {} -> {} ({})", slot, token.symbol, token.id);
        self.pair.set(slot, token);
        self.path = if self.pair.is_complete() {
            Some(PricingPath::resolve(&self.pair)?)
        } else {
            None
        };

        self.invalidate_quotes();
        self.display.clear();
        self.bounds = None;
        self.phase = self.resting_phase();
        self.refresh_native_check();
        Ok(())
    }

    /// Handle a user edit of the amount in `slot`.
    ///
    /// Returns the quote request to dispatch, or `None` when no oracle call
    /// is needed (zero amount, or the other slot is still empty). A
    /// rejected edit leaves the state untouched.
    pub fn on_edit(&mut self, slot: Slot, text: &str) -> Result<Option<QuoteRequest>, SwapError> {
        let edited_decimals = self
            .pair
            .token(slot)
            .map(|token| token.decimals)
            .ok_or(SwapError::TokenNotSelected(slot))?;
        let amount = parse_amount(text, edited_decimals)?;

        self.edit_side = EditSide::from_slot(slot);
        self.display.set(slot, amount);
        self.bounds = None;
        self.invalidate_quotes();

        let path = match self.path {
            Some(path) if !amount.is_zero() => path,
            _ => {
                self.display.set(slot.other(), Decimal::ZERO);
                self.phase = self.resting_phase();
                self.refresh_native_check();
                return Ok(None);
            }
        };

        let counterpart_decimals = self
            .pair
            .token(slot.other())
            .map(|t| t.decimals)
            .ok_or(SwapError::TokenNotSelected(slot.other()))?;

        let request = QuoteRequest {
            seq: self.last_seq,
            path,
            edit_side: self.edit_side,
            amount,
            edited_decimals,
            counterpart_decimals,
        };

        debug!("Edit {} = {} ({}), quote #{}", slot, amount, self.edit_side.as_str(), request.seq);
        self.phase = SwapPhase::Quoting { seq: request.seq };
        self.refresh_native_check();
        Ok(Some(request))
    }

    /// Land an oracle response. Responses for anything but the latest
    /// request are discarded.
    pub fn apply_quote(&mut self, response: QuoteResponse) -> QuoteOutcome {
        if self.phase != (SwapPhase::Quoting { seq: response.seq }) {
            debug!("Discarding stale quote #{} (latest #{})", response.seq, self.last_seq);
            return QuoteOutcome::Stale;
        }

        if let Some(amount) = response.counterpart {
            self.display.set(self.edit_side.counterpart_slot(), amount);
            if self.recompute_bounds() {
                self.phase = SwapPhase::Quoted;
                self.refresh_native_check();
                debug!("Quote #{} applied: {:?}", response.seq, self.bounds);
                return QuoteOutcome::Applied;
            }
            warn!("Quote #{} out of range for slippage bounds", response.seq);
        }

        self.drop_quote();
        QuoteOutcome::Unavailable
    }

    /// Change the tolerance. A quoted swap gets its bounds re-derived from
    /// the amounts already on display.
    pub fn set_slippage(&mut self, slippage: SlippageConfig) {
        self.slippage = slippage;
        if self.phase == SwapPhase::Quoted {
            if self.recompute_bounds() {
                self.refresh_native_check();
            } else {
                warn!("Slippage bounds out of range, quote dropped");
                self.drop_quote();
            }
        }
    }

    pub fn set_native_balance(&mut self, balance: Option<Decimal>) {
        self.native_balance = balance;
        self.refresh_native_check();
    }

    /// Pair, mode and bounds of a quoted swap ready for submission
    pub fn execution_plan(&self) -> Option<(&TradePair, EditSide, ExecutionBounds)> {
        match (self.phase, self.bounds) {
            (SwapPhase::Quoted, Some(bounds)) => Some((&self.pair, self.edit_side, bounds)),
            _ => None,
        }
    }

    /// The bounds went to the ledger; start over with the same pair
    pub fn mark_submitted(&mut self) {
        self.invalidate_quotes();
        self.display.clear();
        self.bounds = None;
        self.phase = self.resting_phase();
        self.refresh_native_check();
    }

    fn invalidate_quotes(&mut self) {
        self.last_seq += 1;
    }

    fn resting_phase(&self) -> SwapPhase {
        if self.pair.is_complete() {
            SwapPhase::TokensSelected
        } else {
            SwapPhase::Idle
        }
    }

    /// Counterpart zeroed, no bounds, back to resting
    fn drop_quote(&mut self) {
        self.display.set(self.edit_side.counterpart_slot(), Decimal::ZERO);
        self.bounds = None;
        self.phase = self.resting_phase();
        self.refresh_native_check();
    }

    /// False when the tolerance pushes the bound outside `Decimal` range
    fn recompute_bounds(&mut self) -> bool {
        let edited = self.edit_side.edited_slot();
        let authoritative = self.display.get(edited);
        let Some(limit) = apply_tolerance(
            self.display.get(edited.other()),
            self.edit_side,
            self.slippage.effective_bps(),
        ) else {
            self.bounds = None;
            return false;
        };

        self.bounds = Some(match edited {
            Slot::A => ExecutionBounds {
                bound_a: authoritative,
                bound_b: limit,
            },
            Slot::B => ExecutionBounds {
                bound_a: limit,
                bound_b: authoritative,
            },
        });
        true
    }

    /// Paying native: the pay amount (bound if quoted) must fit the balance.
    /// Receiving native: the received amount is never compared against the
    /// balance, only a positive balance for the fee is required.
    fn refresh_native_check(&mut self) {
        let balance = self.native_balance;
        self.native_sufficient = match self.pair.native_slot() {
            None => true,
            Some(Slot::A) => {
                let pay = self.bounds.map(|b| b.bound_a).unwrap_or(self.display.amount_a);
                balance.is_some_and(|b| pay <= b)
            }
            Some(Slot::B) => balance.is_some_and(|b| b > Decimal::ZERO),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
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

    fn machine_with(a: Token, b: Token) -> SwapStateMachine {
        let mut machine = SwapStateMachine::new(SlippageConfig::auto());
        machine.select_token(Slot::A, a).unwrap();
        machine.select_token(Slot::B, b).unwrap();
        machine
    }

    fn respond(request: &QuoteRequest, counterpart: Option<Decimal>) -> QuoteResponse {
        QuoteResponse {
            seq: request.seq,
            counterpart,
        }
    }

    #[test]
    fn test_phases_follow_token_selection() {
        let mut machine = SwapStateMachine::new(SlippageConfig::auto());
        assert_eq!(machine.phase(), SwapPhase::Idle);
        machine.select_token(Slot::A, wnd()).unwrap();
        assert_eq!(machine.phase(), SwapPhase::Idle);
        machine.select_token(Slot::B, usdt()).unwrap();
        assert_eq!(machine.phase(), SwapPhase::TokensSelected);
        assert_eq!(
            machine.path(),
            Some(PricingPath::NativeVsAsset { native_side: Slot::A, asset_id: 1984 })
        );
    }

    #[test]
    fn test_exact_in_native_pay_bounds() {
        let mut machine = machine_with(wnd(), usdt());

        let request = machine.on_edit(Slot::A, "5").unwrap().unwrap();
        assert_eq!(machine.phase(), SwapPhase::Quoting { seq: request.seq });
        assert_eq!(request.edited_decimals, 12);

        let outcome = machine.apply_quote(respond(&request, Some(dec!(100))));
        assert_eq!(outcome, QuoteOutcome::Applied);
        assert_eq!(machine.phase(), SwapPhase::Quoted);
        assert_eq!(machine.edit_side(), EditSide::ExactIn);
        assert_eq!(machine.display().amount_a, dec!(5));
        assert_eq!(machine.display().amount_b, dec!(100));

        let bounds = machine.bounds().unwrap();
        assert_eq!(bounds.bound_a, dec!(5));
        assert_eq!(bounds.bound_b, dec!(90));
    }

    #[test]
    fn test_exact_out_asset_pair_bounds() {
        let mut machine = machine_with(usdt(), pink());

        let request = machine.on_edit(Slot::B, "50").unwrap().unwrap();
        assert_eq!(request.edit_side, EditSide::ExactOut);
        assert_eq!(request.path, PricingPath::AssetVsAsset { asset_a: 1984, asset_b: 23 });

        machine.apply_quote(respond(&request, Some(dec!(20))));
        assert_eq!(machine.display().amount_a, dec!(20));
        assert_eq!(machine.display().amount_b, dec!(50));

        let bounds = machine.bounds().unwrap();
        assert_eq!(bounds.bound_a, dec!(22));
        assert_eq!(bounds.bound_b, dec!(50));
    }

    #[test]
    fn test_precision_violation_leaves_state_untouched() {
        let mut machine = machine_with(usdt(), pink());
        let request = machine.on_edit(Slot::A, "1.5").unwrap().unwrap();
        machine.apply_quote(respond(&request, Some(dec!(3))));
        let before = machine.clone();

        let err = machine.on_edit(Slot::A, "1.1234567").unwrap_err();
        assert_eq!(
            err,
            SwapError::PrecisionViolation {
                decimals: 6,
                fractional_digits: 7
            }
        );
        assert_eq!(machine.phase(), before.phase());
        assert_eq!(machine.display(), before.display());
        assert_eq!(machine.bounds(), before.bounds());
        assert_eq!(machine.last_seq, before.last_seq);
    }

    #[test]
    fn test_edit_requires_selected_token() {
        let mut machine = SwapStateMachine::new(SlippageConfig::auto());
        assert_eq!(machine.on_edit(Slot::B, "1"), Err(SwapError::TokenNotSelected(Slot::B)));
    }

    #[test]
    fn test_edit_with_one_token_issues_no_quote() {
        let mut machine = SwapStateMachine::new(SlippageConfig::auto());
        machine.select_token(Slot::A, usdt()).unwrap();
        assert_eq!(machine.on_edit(Slot::A, "3").unwrap(), None);
        assert_eq!(machine.display().amount_a, dec!(3));
        assert_eq!(machine.phase(), SwapPhase::Idle);
    }

    #[test]
    fn test_selecting_new_token_resets_amounts_and_bounds() {
        let mut machine = machine_with(wnd(), usdt());
        let request = machine.on_edit(Slot::A, "5").unwrap().unwrap();
        machine.apply_quote(respond(&request, Some(dec!(100))));
        assert!(machine.bounds().is_some());

        machine.select_token(Slot::B, pink()).unwrap();
        assert_eq!(machine.display().amount_a, Decimal::ZERO);
        assert_eq!(machine.display().amount_b, Decimal::ZERO);
        assert!(machine.bounds().is_none());
        assert_eq!(machine.phase(), SwapPhase::TokensSelected);
    }

    #[test]
    fn test_duplicate_token_rejected() {
        let mut machine = machine_with(wnd(), usdt());
        assert_eq!(machine.select_token(Slot::A, usdt()), Err(SwapError::DuplicateToken));
        assert_eq!(machine.pair().token(Slot::A).map(|t| t.symbol.as_str()), Some("WND"));
    }

    #[test]
    fn test_superseded_quote_is_discarded() {
        let mut machine = machine_with(usdt(), pink());
        let first = machine.on_edit(Slot::A, "1").unwrap().unwrap();
        let second = machine.on_edit(Slot::A, "2").unwrap().unwrap();
        assert!(second.seq > first.seq);

        assert_eq!(machine.apply_quote(respond(&second, Some(dec!(8)))), QuoteOutcome::Applied);
        assert_eq!(machine.apply_quote(respond(&first, Some(dec!(4)))), QuoteOutcome::Stale);

        assert_eq!(machine.display().amount_a, dec!(2));
        assert_eq!(machine.display().amount_b, dec!(8));
        assert_eq!(machine.bounds().unwrap().bound_b, dec!(7.2));
    }

    #[test]
    fn test_stale_quote_before_latest_lands() {
        let mut machine = machine_with(usdt(), pink());
        let first = machine.on_edit(Slot::A, "1").unwrap().unwrap();
        let _second = machine.on_edit(Slot::A, "2").unwrap().unwrap();

        assert_eq!(machine.apply_quote(respond(&first, Some(dec!(4)))), QuoteOutcome::Stale);
        assert!(machine.is_quoting());
        assert_eq!(machine.display().amount_b, Decimal::ZERO);
    }

    #[test]
    fn test_token_change_invalidates_in_flight_quote() {
        let mut machine = machine_with(wnd(), usdt());
        let request = machine.on_edit(Slot::A, "5").unwrap().unwrap();
        machine.select_token(Slot::B, pink()).unwrap();

        assert_eq!(machine.apply_quote(respond(&request, Some(dec!(100)))), QuoteOutcome::Stale);
        assert_eq!(machine.display().amount_b, Decimal::ZERO);
    }

    #[test]
    fn test_unavailable_quote_clears_counterpart() {
        let mut machine = machine_with(usdt(), pink());
        let request = machine.on_edit(Slot::A, "1").unwrap().unwrap();
        machine.apply_quote(respond(&request, Some(dec!(4))));

        let request = machine.on_edit(Slot::A, "2").unwrap().unwrap();
        assert_eq!(machine.apply_quote(respond(&request, None)), QuoteOutcome::Unavailable);
        assert_eq!(machine.display().amount_a, dec!(2));
        assert_eq!(machine.display().amount_b, Decimal::ZERO);
        assert!(machine.bounds().is_none());
        assert_eq!(machine.phase(), SwapPhase::TokensSelected);
    }

    #[test]
    fn test_zero_edit_skips_oracle_and_drops_in_flight() {
        let mut machine = machine_with(usdt(), pink());
        let request = machine.on_edit(Slot::A, "1").unwrap().unwrap();
        assert_eq!(machine.on_edit(Slot::A, "0").unwrap(), None);
        assert_eq!(machine.phase(), SwapPhase::TokensSelected);
        assert_eq!(machine.apply_quote(respond(&request, Some(dec!(4)))), QuoteOutcome::Stale);
    }

    #[test]
    fn test_slippage_change_rederives_bounds() {
        let mut machine = machine_with(usdt(), pink());
        let request = machine.on_edit(Slot::B, "50").unwrap().unwrap();
        machine.apply_quote(respond(&request, Some(dec!(20))));
        assert_eq!(machine.bounds().unwrap().bound_a, dec!(22));

        machine.set_slippage(SlippageConfig::custom(50).unwrap());
        assert_eq!(machine.bounds().unwrap().bound_a, dec!(20.1));
        assert_eq!(machine.bounds().unwrap().bound_b, dec!(50));
    }

    #[test]
    fn test_native_balance_check_on_pay_side() {
        let mut machine = machine_with(wnd(), usdt());
        machine.set_native_balance(Some(dec!(10)));

        machine.on_edit(Slot::A, "5").unwrap();
        assert!(machine.native_balance_sufficient());

        machine.on_edit(Slot::A, "11").unwrap();
        assert!(!machine.native_balance_sufficient());

        // Exact-out: the max-pay bound is what must fit
        let request = machine.on_edit(Slot::B, "100").unwrap().unwrap();
        machine.apply_quote(respond(&request, Some(dec!(9.5))));
        assert_eq!(machine.bounds().unwrap().bound_a, dec!(10.45));
        assert!(!machine.native_balance_sufficient());
    }

    #[test]
    fn test_native_balance_check_on_receive_side() {
        let mut machine = machine_with(usdt(), wnd());
        machine.on_edit(Slot::A, "5").unwrap();
        assert!(!machine.native_balance_sufficient());

        machine.set_native_balance(Some(dec!(0.01)));
        assert!(machine.native_balance_sufficient());

        // Receiving far more native than held still passes
        let request = machine.on_edit(Slot::B, "500").unwrap().unwrap();
        machine.apply_quote(respond(&request, Some(dec!(2500))));
        assert_eq!(machine.phase(), SwapPhase::Quoted);
        assert!(machine.native_balance_sufficient());

        machine.set_native_balance(Some(Decimal::ZERO));
        assert!(!machine.native_balance_sufficient());
    }

    #[test]
    fn test_out_of_range_quote_reads_as_unavailable() {
        let mut machine = machine_with(usdt(), pink());
        let request = machine.on_edit(Slot::B, "50").unwrap().unwrap();

        let outcome = machine.apply_quote(respond(&request, Some(Decimal::MAX)));
        assert_eq!(outcome, QuoteOutcome::Unavailable);
        assert_eq!(machine.phase(), SwapPhase::TokensSelected);
        assert_eq!(machine.display().amount_a, Decimal::ZERO);
        assert_eq!(machine.display().amount_b, dec!(50));
        assert!(machine.bounds().is_none());
        assert!(machine.execution_plan().is_none());
    }

    #[test]
    fn test_slippage_change_out_of_range_drops_quote() {
        let mut machine = machine_with(usdt(), pink());
        machine.set_slippage(SlippageConfig::custom(0).unwrap());
        let request = machine.on_edit(Slot::B, "50").unwrap().unwrap();

        // Fits at 0 bps, overflows once the tolerance is raised
        let huge = dec!(7_500_000_000_000_000_000_000_000);
        assert_eq!(machine.apply_quote(respond(&request, Some(huge))), QuoteOutcome::Applied);
        assert_eq!(machine.bounds().unwrap().bound_a, huge);

        machine.set_slippage(SlippageConfig::auto());
        assert_eq!(machine.phase(), SwapPhase::TokensSelected);
        assert!(machine.bounds().is_none());
        assert_eq!(machine.display().amount_a, Decimal::ZERO);
    }

    #[test]
    fn test_execution_plan_and_submission() {
        let mut machine = machine_with(wnd(), usdt());
        assert!(machine.execution_plan().is_none());

        let request = machine.on_edit(Slot::A, "5").unwrap().unwrap();
        machine.apply_quote(respond(&request, Some(dec!(100))));
        let (_, side, bounds) = machine.execution_plan().unwrap();
        assert_eq!(side, EditSide::ExactIn);
        assert_eq!(bounds.bound_b, dec!(90));

        machine.mark_submitted();
        assert!(machine.execution_plan().is_none());
        assert_eq!(machine.phase(), SwapPhase::TokensSelected);
        assert_eq!(machine.display().amount_a, Decimal::ZERO);
    }
}
