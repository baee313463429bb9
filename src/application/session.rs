//! Swap session - the single actor driving one swap form
//!
//! Quotes run on tokio tasks and report back over a channel. The state
//! machine decides which responses are still current.

use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::domain::amount::from_base_units;
use crate::domain::catalog::TokenCatalog;
use crate::domain::eligibility::{self, SwapAction};
use crate::domain::execution::{ExecutionRouter, LedgerClient};
use crate::domain::quote::{PriceOracle, QuoteResponse, QuoteRouter};
use crate::domain::slippage::SlippageConfig;
use crate::domain::swap::{QuoteOutcome, SwapStateMachine};
use crate::shared::errors::SwapError;
use crate::shared::types::{AccountId, Slot, SwapReceipt, Token, TokenId};

/// Reply slot of one quote task. A task that ends without replying, a
/// panic included, still reports its quote as unavailable on drop.
struct PendingQuote {
    seq: u64,
    tx: Option<mpsc::UnboundedSender<QuoteResponse>>,
}

impl PendingQuote {
    fn new(seq: u64, tx: mpsc::UnboundedSender<QuoteResponse>) -> Self {
        Self { seq, tx: Some(tx) }
    }

    fn reply(mut self, response: QuoteResponse) {
        if let Some(tx) = self.tx.take() {
            if tx.send(response).is_err() {
                debug!("Session gone, dropping quote #{}", self.seq);
            }
        }
    }
}

impl Drop for PendingQuote {
    fn drop(&mut self) {
        if let Some(tx) = self.tx.take() {
            warn!("Quote #{} task ended without a response", self.seq);
            let _ = tx.send(QuoteResponse {
                seq: self.seq,
                counterpart: None,
            });
        }
    }
}

pub struct SwapSession {
    machine: SwapStateMachine,
    quotes: QuoteRouter,
    execution: ExecutionRouter,
    ledger: Arc<dyn LedgerClient>,
    catalog: Arc<dyn TokenCatalog>,
    native: Token,
    account: Option<AccountId>,
    responses_tx: mpsc::UnboundedSender<QuoteResponse>,
    responses_rx: mpsc::UnboundedReceiver<QuoteResponse>,
    in_flight: usize,
}

impl SwapSession {
    pub fn new(
        native: Token,
        slippage: SlippageConfig,
        oracle: Arc<dyn PriceOracle>,
        ledger: Arc<dyn LedgerClient>,
        catalog: Arc<dyn TokenCatalog>,
    ) -> Self {
        let (responses_tx, responses_rx) = mpsc::unbounded_channel();
        Self {
            machine: SwapStateMachine::new(slippage),
            quotes: QuoteRouter::new(oracle),
            execution: ExecutionRouter::new(ledger.clone()),
            ledger,
            catalog,
            native,
            account: None,
            responses_tx,
            responses_rx,
            in_flight: 0,
        }
    }

    pub fn with_quote_timeout(mut self, timeout: Duration) -> Self {
        self.quotes = self.quotes.with_timeout(timeout);
        self
    }

    pub fn machine(&self) -> &SwapStateMachine {
        &self.machine
    }

    pub fn account(&self) -> Option<&AccountId> {
        self.account.as_ref()
    }

    pub async fn connect_wallet(&mut self, account: AccountId) {
        info!("Wallet connected: {}", account);
        self.account = Some(account);
        self.refresh_native_balance().await;
    }

    pub fn disconnect_wallet(&mut self) {
        if let Some(account) = self.account.take() {
            info!("Wallet disconnected: {}", account);
        }
        self.machine.set_native_balance(None);
    }

    /// Tokens selectable for the current pair
    pub async fn list_tokens(&self) -> Result<Vec<Token>, SwapError> {
        self.catalog.list_swappable(self.machine.pair()).await
    }

    pub async fn select_token(&mut self, slot: Slot, token: Token) -> Result<(), SwapError> {
        self.machine.select_token(slot, token)?;
        self.refresh_native_balance().await;
        Ok(())
    }

    /// Apply an amount edit; when a quote is needed it is started in the
    /// background and its sequence number returned.
    pub fn edit(&mut self, slot: Slot, text: &str) -> Result<Option<u64>, SwapError> {
        let Some(request) = self.machine.on_edit(slot, text)? else {
            return Ok(None);
        };

        let seq = request.seq;
        let router = self.quotes.clone();
        let pending = PendingQuote::new(seq, self.responses_tx.clone());
        self.in_flight += 1;

        tokio::spawn(async move {
            let response = router.respond(request).await;
            pending.reply(response);
        });

        Ok(Some(seq))
    }

    /// Wait for the next quote response and hand it to the state machine.
    /// `None` when nothing is in flight.
    pub async fn next_quote(&mut self) -> Option<QuoteOutcome> {
        if self.in_flight == 0 {
            return None;
        }

        let response = self.responses_rx.recv().await?;
        self.in_flight -= 1;
        let outcome = self.machine.apply_quote(response);
        if outcome == QuoteOutcome::Unavailable {
            warn!("{}", SwapError::QuoteUnavailable);
        }
        Some(outcome)
    }

    /// Drain responses until the latest request has landed
    pub async fn settle(&mut self) -> Option<QuoteOutcome> {
        let mut last = None;
        while self.machine.is_quoting() {
            match self.next_quote().await {
                Some(outcome) => last = Some(outcome),
                None => break,
            }
        }
        last
    }

    pub fn set_slippage(&mut self, slippage: SlippageConfig) {
        info!("Slippage tolerance set to {}%", slippage.as_percent());
        self.machine.set_slippage(slippage);
    }

    pub fn action(&self) -> Option<SwapAction> {
        eligibility::check(
            self.account.is_some(),
            self.machine.native_balance_sufficient(),
            self.machine.pair(),
            self.machine.display(),
            self.machine.edit_side(),
        )
    }

    pub fn action_label(&self) -> Option<String> {
        self.action().map(|a| a.label(&self.native.symbol))
    }

    /// Submit the quoted swap with its stored bounds.
    ///
    /// `Ok(None)` means the pair could not be resolved to a ledger call.
    /// On failure the quote stays in place so the user can retry.
    pub async fn confirm(&mut self) -> Result<Option<SwapReceipt>, SwapError> {
        let account = self.account.clone().ok_or(SwapError::WalletNotConnected)?;
        let (pair, edit_side, bounds) = self.machine.execution_plan().ok_or(SwapError::NothingToExecute)?;

        let receipt = self.execution.execute(pair, edit_side, &bounds, &account).await?;
        if receipt.is_some() {
            self.machine.mark_submitted();
            self.refresh_native_balance().await;
        }
        Ok(receipt)
    }

    async fn refresh_native_balance(&mut self) {
        let Some(account) = self.account.as_ref() else {
            self.machine.set_native_balance(None);
            return;
        };

        let balance = match self.ledger.balance(account, TokenId::Native).await {
            Ok(base) => from_base_units(base, self.native.decimals).ok(),
            Err(e) => {
                warn!("Native balance unavailable: {}", e);
                None
            }
        };

        debug!("{} balance: {:?}", self.native.symbol, balance);
        self.machine.set_native_balance(balance);
    }

    pub fn native_balance_sufficient(&self) -> bool {
        self.machine.native_balance_sufficient()
    }

    pub fn native(&self) -> &Token {
        &self.native
    }

    /// Human-unit balance of any token for the connected account
    pub async fn balance_of(&self, token: &Token) -> Result<Decimal, SwapError> {
        let account = self.account.as_ref().ok_or(SwapError::WalletNotConnected)?;
        let base = self.ledger.balance(account, token.id).await?;
        from_base_units(base, token.decimals)
    }
}
