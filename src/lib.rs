//! Swapflow - swap quoting and execution routing for native/asset pools
//! Built with Domain-Driven Design principles

pub mod domain;
pub mod infrastructure;
pub mod application;
pub mod shared;

// Re-export main types for convenience
pub use application::session::SwapSession;
pub use domain::execution::ExecutionRouter;
pub use domain::quote::QuoteRouter;
pub use domain::swap::SwapStateMachine;
pub use infrastructure::SimulatedChain;
