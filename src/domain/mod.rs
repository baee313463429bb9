//! Domain layer - core business logic and entities

pub mod amount;
pub mod catalog;
pub mod eligibility;
pub mod execution;
pub mod quote;
pub mod slippage;
pub mod swap;
