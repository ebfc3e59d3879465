//! Candidate signals and the explicit signal / no-signal result.
//!
//! A `CandidateSignal` only exists fully evidenced: the composer never builds
//! one without a structure break, Fibonacci confluence and RSI confirmation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::structure::{Direction, OrderBlock};

/// Evidence that supported a candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalEvidence {
    pub order_block: OrderBlock,
    /// Fibonacci ratio matched by the order block (e.g. 0.5).
    pub fib_ratio: f64,
    /// Price of the matched Fibonacci level.
    pub fib_price: f64,
    /// RSI at the evaluation bar.
    pub rsi: f64,
    /// ATR at the evaluation bar; sizes the tolerance and stop buffer.
    pub atr: f64,
    pub break_index: usize,
    /// Price level of the swing broken by the structure break.
    pub broken_level: f64,
}

/// A fully evidenced trade idea with entry, stop and target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateSignal {
    pub symbol: String,
    pub direction: Direction,
    pub entry_price: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    /// Timestamp of the bar the candidate was evaluated on.
    pub evaluated_at: DateTime<Utc>,
    pub evidence: SignalEvidence,
}

impl CandidateSignal {
    /// Absolute price distance between entry and stop.
    pub fn risk_per_unit(&self) -> f64 {
        (self.entry_price - self.stop_loss).abs()
    }

    pub fn reward_per_unit(&self) -> f64 {
        (self.take_profit - self.entry_price).abs()
    }
}

/// Why the composer produced no candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NoSignalReason {
    /// Fewer bars than the indicators and structure lookback need.
    InsufficientHistory { required: usize, available: usize },
    /// No Break of Structure, or no opposing candle before it.
    NoStructure,
    /// Swings do not provide both a high and a low for Fibonacci levels.
    NoSwingRange,
    NoConfluence,
    MomentumNotConfirmed { rsi: f64 },
    /// Entry and stop collapsed onto each other (flat range, zero ATR).
    DegenerateRisk,
}

impl std::fmt::Display for NoSignalReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NoSignalReason::InsufficientHistory {
                required,
                available,
            } => write!(f, "insufficient history ({available} of {required} bars)"),
            NoSignalReason::NoStructure => write!(f, "no break of structure"),
            NoSignalReason::NoSwingRange => write!(f, "no swing range for fibonacci levels"),
            NoSignalReason::NoConfluence => write!(f, "no fibonacci confluence"),
            NoSignalReason::MomentumNotConfirmed { rsi } => {
                write!(f, "momentum not confirmed (rsi={rsi:.1})")
            }
            NoSignalReason::DegenerateRisk => write!(f, "degenerate entry/stop distance"),
        }
    }
}

/// Outcome of one analysis pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Analysis {
    Signal(CandidateSignal),
    NoSignal(NoSignalReason),
}

impl Analysis {
    pub fn signal(&self) -> Option<&CandidateSignal> {
        match self {
            Analysis::Signal(s) => Some(s),
            Analysis::NoSignal(_) => None,
        }
    }

    pub fn into_signal(self) -> Option<CandidateSignal> {
        match self {
            Analysis::Signal(s) => Some(s),
            Analysis::NoSignal(_) => None,
        }
    }

    pub fn is_signal(&self) -> bool {
        matches!(self, Analysis::Signal(_))
    }
}
