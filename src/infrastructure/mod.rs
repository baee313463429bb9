//! Infrastructure layer - collaborator implementations

pub mod simulated;

pub use simulated::SimulatedChain;
