//! CLI commands and handlers
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::application::session::SwapSession;
use crate::domain::amount::from_base_units;
use crate::domain::slippage::SlippageConfig;
use crate::infrastructure::SimulatedChain;
use crate::shared::config::Config;
use crate::shared::errors::{AppError, SwapError};
use crate::shared::types::{EditSide, Slot, SwapReceipt, Token};
use crate::shared::utils::format_grouped;

#[derive(Parser)]
#[command(name = "swapflow")]
#[command(version, about = "Quote and execute token swaps against native/asset liquidity pools")]
pub struct Cli {
    /// Path to the TOML config
    #[arg(long, default_value = "Config.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List swappable tokens with wallet balances
    Tokens {
        /// Token already chosen to pay with
        #[arg(long)]
        pay: Option<String>,

        /// Token already chosen to receive
        #[arg(long)]
        receive: Option<String>,

        #[arg(long)]
        json: bool,
    },

    /// Quote a swap and show its slippage bound
    Quote(TradeArgs),

    /// Quote and submit a swap
    Swap(TradeArgs),
}

#[derive(Args, Debug, Clone)]
pub struct TradeArgs {
    /// Token to pay with (symbol)
    #[arg(long)]
    pub pay: String,

    /// Token to receive (symbol)
    #[arg(long)]
    pub receive: String,

    #[command(flatten)]
    pub amount: AmountArgs,

    /// Slippage tolerance in basis points (overrides config; auto when omitted)
    #[arg(long)]
    pub slippage_bps: Option<u32>,

    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct AmountArgs {
    /// Exact amount to pay
    #[arg(long)]
    pub amount_in: Option<String>,

    /// Exact amount to receive
    #[arg(long)]
    pub amount_out: Option<String>,
}

impl AmountArgs {
    fn edit(&self) -> (Slot, &str) {
        match (&self.amount_in, &self.amount_out) {
            (Some(value), _) => (Slot::A, value),
            (None, Some(value)) => (Slot::B, value),
            (None, None) => (Slot::A, ""),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct QuoteReport {
    pub pay: String,
    pub receive: String,
    pub mode: &'static str,
    pub amount_in: Decimal,
    pub amount_out: Decimal,
    /// "minimum_receive" or "maximum_pay"
    pub bound_kind: &'static str,
    pub bound: Decimal,
    pub slippage_percent: Decimal,
    pub action: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SwapReport {
    #[serde(flatten)]
    pub quote: QuoteReport,
    pub tx_hash: String,
    pub paid: Decimal,
    pub received: Decimal,
}

#[derive(Debug, Serialize)]
struct TokenRow {
    symbol: String,
    id: String,
    decimals: u32,
    balance: Decimal,
}

pub struct CommandExecutor;

impl CommandExecutor {
    /// Execute the selected command
    pub async fn execute(command: Commands, config: Config) -> Result<(), AppError> {
        match command {
            Commands::Tokens { pay, receive, json } => {
                Self::execute_tokens_command(pay, receive, json, config).await
            }
            Commands::Quote(args) => Self::execute_quote_command(args, config).await,
            Commands::Swap(args) => Self::execute_swap_command(args, config).await,
        }
    }

    fn open_session(config: &Config, slippage_bps: Option<u32>) -> Result<(Arc<SimulatedChain>, SwapSession), AppError> {
        let chain = Arc::new(SimulatedChain::from_config(config)?);
        let slippage = match slippage_bps {
            Some(bps) => SlippageConfig::custom(bps)?,
            None => config.slippage_config()?,
        };

        let session = SwapSession::new(
            chain.native().clone(),
            slippage,
            chain.clone(),
            chain.clone(),
            chain.clone(),
        )
        .with_quote_timeout(Duration::from_millis(config.session.quote_timeout_ms));

        Ok((chain, session))
    }

    fn lookup(chain: &SimulatedChain, symbol: &str) -> Result<Token, AppError> {
        chain
            .token_by_symbol(symbol)
            .ok_or_else(|| AppError::UnknownToken(symbol.to_string()))
    }

    async fn execute_tokens_command(
        pay: Option<String>,
        receive: Option<String>,
        json: bool,
        config: Config,
    ) -> Result<(), AppError> {
        let (chain, mut session) = Self::open_session(&config, None)?;
        session.connect_wallet(config.account()).await;

        for (slot, symbol) in [(Slot::A, pay), (Slot::B, receive)] {
            if let Some(symbol) = symbol {
                session.select_token(slot, Self::lookup(&chain, &symbol)?).await?;
            }
        }

        let rows: Vec<TokenRow> = session
            .list_tokens()
            .await?
            .into_iter()
            .map(|t| TokenRow {
                symbol: t.symbol,
                id: t.id.to_string(),
                decimals: t.decimals,
                balance: t.balance,
            })
            .collect();

        if json {
            println!("{}", serde_json::to_string_pretty(&rows)?);
            return Ok(());
        }

        println!("{:<8} {:<12} {:>8} {:>24}", "SYMBOL", "ID", "DECIMALS", "BALANCE");
        for row in &rows {
            println!("{:<8} {:<12} {:>8} {:>24}", row.symbol, row.id, row.decimals, row.balance);
        }
        Ok(())
    }

    /// Select the pair, apply the edit and wait for its quote
    async fn quote(args: &TradeArgs, chain: &SimulatedChain, session: &mut SwapSession) -> Result<QuoteReport, AppError> {
        session.select_token(Slot::A, Self::lookup(chain, &args.pay)?).await?;
        session.select_token(Slot::B, Self::lookup(chain, &args.receive)?).await?;

        let (slot, text) = args.amount.edit();
        if session.edit(slot, text)?.is_none() {
            return Err(SwapError::InvalidAmount(format!("'{}' must be greater than zero", text)).into());
        }

        match session.settle().await {
            Some(_) if session.machine().bounds().is_some() => {}
            _ => return Err(SwapError::QuoteUnavailable.into()),
        }

        let machine = session.machine();
        let display = machine.display();
        let edit_side = machine.edit_side();
        let bounds = machine.bounds().copied().ok_or(SwapError::QuoteUnavailable)?;
        let counterpart = edit_side.counterpart_slot();

        Ok(QuoteReport {
            pay: args.pay.to_uppercase(),
            receive: args.receive.to_uppercase(),
            mode: edit_side.as_str(),
            amount_in: display.amount_a,
            amount_out: display.amount_b,
            bound_kind: match edit_side {
                EditSide::ExactIn => "minimum_receive",
                EditSide::ExactOut => "maximum_pay",
            },
            bound: bounds.get(counterpart),
            slippage_percent: machine.slippage().as_percent(),
            action: session.action_label(),
        })
    }

    async fn execute_quote_command(args: TradeArgs, config: Config) -> Result<(), AppError> {
        let (chain, mut session) = Self::open_session(&config, args.slippage_bps)?;
        session.connect_wallet(config.account()).await;

        let report = Self::quote(&args, &chain, &mut session).await?;
        info!("Quoted {} {} -> {} {}", report.amount_in, report.pay, report.amount_out, report.receive);

        if args.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            Self::print_quote(&report);
        }
        Ok(())
    }

    async fn execute_swap_command(args: TradeArgs, config: Config) -> Result<(), AppError> {
        let (chain, mut session) = Self::open_session(&config, args.slippage_bps)?;
        session.connect_wallet(config.account()).await;

        let quote = Self::quote(&args, &chain, &mut session).await?;
        match session.action() {
            Some(action) if action.is_ready() => {}
            Some(action) => return Err(AppError::NotReady(action.label(&session.native().symbol))),
            None => return Err(AppError::NotReady("amounts incomplete".to_string())),
        }

        let receipt = session.confirm().await?.ok_or(SwapError::MissingTokenId)?;
        let report = Self::swap_report(&chain, quote, &receipt)?;

        if args.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            Self::print_quote(&report.quote);
            println!("Submitted  {}", report.tx_hash);
            println!("Paid       {} {}", report.paid, report.quote.pay);
            println!("Received   {} {}", report.received, report.quote.receive);
        }
        Ok(())
    }

    fn swap_report(chain: &SimulatedChain, quote: QuoteReport, receipt: &SwapReceipt) -> Result<SwapReport, AppError> {
        let pay = Self::lookup(chain, &quote.pay)?;
        let receive = Self::lookup(chain, &quote.receive)?;
        info!(
            "Swap {} settled: {} base units in, {} out",
            receipt.tx_hash,
            format_grouped(receipt.amount_in),
            format_grouped(receipt.amount_out)
        );

        Ok(SwapReport {
            tx_hash: receipt.tx_hash.clone(),
            paid: from_base_units(receipt.amount_in, pay.decimals)?,
            received: from_base_units(receipt.amount_out, receive.decimals)?,
            quote,
        })
    }

    fn print_quote(report: &QuoteReport) {
        let (bound_label, bound_symbol) = match report.bound_kind {
            "maximum_pay" => ("Maximum paid", &report.pay),
            _ => ("Minimum received", &report.receive),
        };
        println!("Pay        {} {}", report.amount_in, report.pay);
        println!("Receive    {} {}", report.amount_out, report.receive);
        println!("{} {} {} ({}% slippage, {})", bound_label, report.bound, bound_symbol, report.slippage_percent, report.mode);
        if let Some(action) = &report.action {
            println!("Action     {}", action);
        }
    }
}
