//! Detection components — the stages a bar history passes through.
//!
//! - Structure analyzer: break of structure and the order block behind it
//! - Confluence evaluator: order block against Fibonacci retracement levels
//! - Momentum gate: RSI confirmation at the latest bar
//! - Session filter: UTC trading windows
//!
//! The composer (`SignalEngine`) wires the first three together.

pub mod composer;
pub mod confluence;
pub mod momentum;
pub mod session;
pub mod structure;

pub use composer::SignalEngine;
pub use confluence::{ConfluenceEvaluator, ConfluenceMatch};
pub use momentum::MomentumGate;
pub use session::SessionFilter;
pub use structure::StructureAnalyzer;
