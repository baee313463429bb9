//! Routes an edit to the right oracle call and normalizes the answer

use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use super::{PriceOracle, QuoteRequest, QuoteResponse};
use crate::domain::amount::{from_base_units, parse_base_text, to_base_units};
use crate::shared::errors::SwapError;
use crate::shared::types::{EditSide, TradePair};

pub const DEFAULT_QUOTE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone)]
pub struct QuoteRouter {
    oracle: Arc<dyn PriceOracle>,
    timeout: Duration,
}

impl QuoteRouter {
    pub fn new(oracle: Arc<dyn PriceOracle>) -> Self {
        Self {
            oracle,
            timeout: DEFAULT_QUOTE_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Counterpart amount for `edited_value` on `edit_side`, in human units
    /// of the counterpart token. `Ok(None)` when no quote is available.
    pub async fn quote(
        &self,
        pair: &TradePair,
        edit_side: EditSide,
        edited_value: Decimal,
    ) -> Result<Option<Decimal>, SwapError> {
        let request = QuoteRequest::for_pair(0, pair, edit_side, edited_value)?;
        self.quote_request(&request).await
    }

    pub async fn quote_request(&self, request: &QuoteRequest) -> Result<Option<Decimal>, SwapError> {
        let edited_base = to_base_units(request.amount, request.edited_decimals)?;
        let query = request.path.query(request.edit_side, edited_base);
        debug!("Quote #{} -> {:?}", request.seq, query);

        let raw = match tokio::time::timeout(self.timeout, query.dispatch(self.oracle.as_ref())).await {
            Ok(Ok(Some(text))) => text,
            Ok(Ok(None)) => {
                debug!("Quote #{}: oracle returned nothing", request.seq);
                return Ok(None);
            }
            Ok(Err(e)) => {
                warn!("Quote #{}: oracle unavailable: {}", request.seq, e);
                return Ok(None);
            }
            Err(_) => {
                warn!("Quote #{}: oracle timed out after {:?}", request.seq, self.timeout);
                return Ok(None);
            }
        };

        let counterpart_base = match parse_base_text(&raw) {
            Ok(Some(value)) => value,
            Ok(None) => return Ok(None),
            Err(e) => {
                warn!("Quote #{}: {}", request.seq, e);
                return Ok(None);
            }
        };

        from_base_units(counterpart_base, request.counterpart_decimals).map(Some)
    }

    /// Run a request to completion for the session's task queue. Errors
    /// collapse into an unavailable quote so the response always lands.
    pub async fn respond(&self, request: QuoteRequest) -> QuoteResponse {
        let counterpart = match self.quote_request(&request).await {
            Ok(value) => value,
            Err(e) => {
                warn!("Quote #{} failed: {}", request.seq, e);
                None
            }
        };

        QuoteResponse {
            seq: request.seq,
            counterpart,
        }
    }
}
