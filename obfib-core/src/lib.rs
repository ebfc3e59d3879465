//! obfib core — order block, Fibonacci and RSI setup detection with a risk gate.
//!
//! This crate contains the whole decision path:
//! - Domain types (bars, swings, order blocks, candidate signals)
//! - Series math (RSI, ATR, swing points, Fibonacci retracements)
//! - Detection components (structure, confluence, momentum, sessions)
//! - The stateful risk gate and the end-to-end pipeline

pub mod components;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod indicators;
pub mod pipeline;
pub mod risk;

pub use components::SignalEngine;
pub use config::StrategyConfig;
pub use domain::{Analysis, CandidateSignal, Direction, NoSignalReason, PriceBar, PriceHistory};
pub use error::{AnalysisError, ConfigError};
pub use pipeline::{Pipeline, PipelineOutcome};
pub use risk::{risk_evaluate, RejectReason, RiskDecision, RiskGate, RiskState};
