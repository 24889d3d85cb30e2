//! The Safrole block-production state machine: slot and epoch progression,
//! VRF ticket accumulation, winners-marker emission, and validator-set
//! rotation.

pub mod marker;
pub mod state;
pub mod tickets;
pub mod transition;

// Re-export all public items from modules for convenience
pub use marker::*;
pub use state::*;
pub use tickets::*;
pub use transition::*;
