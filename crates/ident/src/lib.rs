//! Deterministic identity derivation: fresh service indices and
//! human-readable validator names.

pub mod altname;
pub mod service;

// Re-export all public items from modules for convenience
pub use altname::*;
pub use service::*;
