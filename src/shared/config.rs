//! TOML configuration for the session and the simulated pool book

use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::domain::slippage::SlippageConfig;
use crate::shared::errors::AppError;
use crate::shared::types::{AccountId, AssetId, Token};

#[derive(Debug, Clone, Deserialize)]
pub struct SessionCfg {
    #[serde(default = "default_account")]
    pub account: String,
    #[serde(default = "default_quote_timeout_ms")]
    pub quote_timeout_ms: u64,
}

impl Default for SessionCfg {
    fn default() -> Self {
        Self {
            account: default_account(),
            quote_timeout_ms: default_quote_timeout_ms(),
        }
    }
}

fn default_account() -> String {
    "5GrwvaEF5zXb26Fz9rcQpDWS57CtERHpNehXCPcNoHGKutQY".to_string()
}

fn default_quote_timeout_ms() -> u64 {
    5_000
}

#[derive(Debug, Clone, Deserialize)]
pub struct SlippageCfg {
    #[serde(default = "default_true")]
    pub auto: bool,
    #[serde(default)]
    pub tolerance_bps: u32,
}

impl Default for SlippageCfg {
    fn default() -> Self {
        Self {
            auto: true,
            tolerance_bps: 0,
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct NativeCfg {
    pub symbol: String,
    pub decimals: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssetCfg {
    pub id: AssetId,
    pub symbol: String,
    pub decimals: u32,
}

/// Native/asset liquidity pool; reserves in human units
#[derive(Debug, Clone, Deserialize)]
pub struct PoolCfg {
    pub asset_id: AssetId,
    pub native_reserve: Decimal,
    pub asset_reserve: Decimal,
}

/// Starting wallet balance, by token symbol, in human units
#[derive(Debug, Clone, Deserialize)]
pub struct BalanceCfg {
    pub token: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub session: SessionCfg,
    #[serde(default)]
    pub slippage: SlippageCfg,
    pub native: NativeCfg,
    #[serde(default)]
    pub assets: Vec<AssetCfg>,
    #[serde(default)]
    pub pools: Vec<PoolCfg>,
    #[serde(default)]
    pub balances: Vec<BalanceCfg>,
}

impl Config {
    pub fn from_toml(content: &str) -> Result<Self, AppError> {
        let config: Config = toml::from_str(content)
            .map_err(|e| AppError::ConfigError(format!("Failed to parse config file: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        let mut ids = HashSet::new();
        let mut symbols = HashSet::new();
        symbols.insert(self.native.symbol.as_str());

        for asset in &self.assets {
            if asset.id == 0 {
                return Err(AppError::ConfigError(format!(
                    "asset {} uses reserved id 0",
                    asset.symbol
                )));
            }
            if !ids.insert(asset.id) {
                return Err(AppError::ConfigError(format!("duplicate asset id {}", asset.id)));
            }
            if !symbols.insert(asset.symbol.as_str()) {
                return Err(AppError::ConfigError(format!(
                    "duplicate token symbol {}",
                    asset.symbol
                )));
            }
        }

        for pool in &self.pools {
            if !ids.contains(&pool.asset_id) {
                return Err(AppError::ConfigError(format!(
                    "pool references unknown asset {}",
                    pool.asset_id
                )));
            }
        }

        for balance in &self.balances {
            if !symbols.contains(balance.token.as_str()) {
                return Err(AppError::UnknownToken(balance.token.clone()));
            }
        }

        self.slippage_config()?;
        Ok(())
    }

    pub fn slippage_config(&self) -> Result<SlippageConfig, AppError> {
        if self.slippage.auto {
            Ok(SlippageConfig::auto())
        } else {
            Ok(SlippageConfig::custom(self.slippage.tolerance_bps)?)
        }
    }

    pub fn account(&self) -> AccountId {
        AccountId::new(self.session.account.clone())
    }

    fn balance_of(&self, symbol: &str) -> Decimal {
        self.balances
            .iter()
            .filter(|b| b.token == symbol)
            .map(|b| b.amount)
            .sum()
    }

    pub fn native_token(&self) -> Token {
        Token::native(
            self.native.symbol.clone(),
            self.native.decimals,
            self.balance_of(&self.native.symbol),
        )
    }

    /// Asset tokens in declaration order
    pub fn asset_tokens(&self) -> Vec<Token> {
        self.assets
            .iter()
            .map(|a| Token::asset(a.id, a.symbol.clone(), a.decimals, self.balance_of(&a.symbol)))
            .collect()
    }
}

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Config, AppError> {
        let config_content = fs::read_to_string(path.as_ref())
            .map_err(|e| AppError::ConfigError(format!("Failed to read config file: {}", e)))?;

        Config::from_toml(&config_content)
    }
}
