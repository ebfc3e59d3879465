//! Risk gate — the only stateful stage.
//!
//! `risk_evaluate` checks a candidate against the account's `RiskState` in a
//! fixed order and either rejects it (leaving the state untouched) or accepts
//! it with a position size, recording the trade. `RiskGate` wraps the state
//! in a mutex so the check and the update happen atomically.

pub mod correlation;
pub mod gate;

pub use correlation::CorrelationTable;
pub use gate::RiskGate;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::RiskConfig;
use crate::domain::{CandidateSignal, Direction, Symbol};

/// An open trade, as far as the risk checks care.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenPosition {
    pub symbol: Symbol,
    pub direction: Direction,
    pub size: f64,
}

/// Account state consulted and updated by the risk gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskState {
    pub account_balance: f64,
    /// Signed realized P&L for the current day; negative is a loss.
    pub realized_daily_loss: f64,
    pub trades_taken_today: u32,
    pub open_positions: Vec<OpenPosition>,
    /// Day the daily counters belong to. `None` until the first rollover.
    pub trading_day: Option<NaiveDate>,
}

impl RiskState {
    pub fn new(account_balance: f64) -> Self {
        Self {
            account_balance,
            realized_daily_loss: 0.0,
            trades_taken_today: 0,
            open_positions: Vec::new(),
            trading_day: None,
        }
    }

    pub fn open_positions_count(&self) -> usize {
        self.open_positions.len()
    }

    /// Reset the daily counters if `day` is later than the current trading day.
    /// Returns true when a rollover happened. The same or an earlier day is a
    /// no-op, so the daily ceilings cannot be reset by going back in time.
    /// Open positions carry over.
    pub fn begin_day(&mut self, day: NaiveDate) -> bool {
        if self.trading_day.is_some_and(|current| day <= current) {
            return false;
        }
        self.trading_day = Some(day);
        self.trades_taken_today = 0;
        self.realized_daily_loss = 0.0;
        true
    }

    /// Apply a closed trade: drop one open position on `symbol` and book `pnl`.
    /// A close with no matching position leaves the state untouched.
    pub fn record_close(&mut self, symbol: &str, pnl: f64) -> Option<OpenPosition> {
        let idx = self.open_positions.iter().position(|p| p.symbol == symbol)?;
        self.realized_daily_loss += pnl;
        self.account_balance += pnl;
        Some(self.open_positions.remove(idx))
    }
}

/// Why the gate turned a candidate down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RejectReason {
    DailyTradeLimit,
    DailyLossLimit,
    CorrelationLimit,
    OpenPositionLimit,
    /// Entry and stop coincide or are not finite; no size can be computed.
    InvalidStopDistance,
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RejectReason::DailyTradeLimit => "daily trade limit reached",
            RejectReason::DailyLossLimit => "daily loss limit reached",
            RejectReason::CorrelationLimit => "correlated position already open",
            RejectReason::OpenPositionLimit => "open position limit reached",
            RejectReason::InvalidStopDistance => "invalid entry/stop distance",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskDecision {
    Accept { position_size: f64 },
    Reject { reason: RejectReason },
}

impl RiskDecision {
    pub fn is_accept(&self) -> bool {
        matches!(self, RiskDecision::Accept { .. })
    }
}

/// Check `candidate` against `state` and `config`.
///
/// Checks run in order: trade count, daily loss, correlation, open-position
/// ceiling, stop distance. A reject never mutates `state`; an accept bumps
/// the trade counter and records the open position.
///
/// # Formula
/// ```text
/// position_size = risk_per_trade_fraction * account_balance / |entry - stop|
/// ```
pub fn risk_evaluate(
    candidate: &CandidateSignal,
    state: &mut RiskState,
    config: &RiskConfig,
) -> RiskDecision {
    match check(candidate, state, config) {
        Ok(position_size) => {
            state.trades_taken_today += 1;
            state.open_positions.push(OpenPosition {
                symbol: candidate.symbol.clone(),
                direction: candidate.direction,
                size: position_size,
            });
            RiskDecision::Accept { position_size }
        }
        Err(reason) => RiskDecision::Reject { reason },
    }
}

fn check(
    candidate: &CandidateSignal,
    state: &RiskState,
    config: &RiskConfig,
) -> Result<f64, RejectReason> {
    if state.trades_taken_today >= config.max_trades_per_day {
        return Err(RejectReason::DailyTradeLimit);
    }

    let loss_limit = config.max_daily_loss_fraction * state.account_balance;
    if state.realized_daily_loss <= -loss_limit {
        return Err(RejectReason::DailyLossLimit);
    }

    let table = CorrelationTable::new(&config.correlations);
    if state
        .open_positions
        .iter()
        .any(|p| table.exceeds(&p.symbol, &candidate.symbol, config.correlation_threshold))
    {
        return Err(RejectReason::CorrelationLimit);
    }

    if let Some(max) = config.max_open_positions {
        if state.open_positions_count() >= max as usize {
            return Err(RejectReason::OpenPositionLimit);
        }
    }

    let distance = candidate.risk_per_unit();
    if !(distance.is_finite() && distance > 0.0) {
        return Err(RejectReason::InvalidStopDistance);
    }
    Ok(config.risk_per_trade_fraction * state.account_balance / distance)
}

/// Candidate with fixed evidence for risk tests.
#[cfg(test)]
pub(crate) fn test_candidate(symbol: &str, entry: f64, stop: f64) -> CandidateSignal {
    use crate::domain::{OrderBlock, SignalEvidence};
    use chrono::TimeZone;

    let direction = if entry > stop {
        Direction::Bullish
    } else {
        Direction::Bearish
    };
    CandidateSignal {
        symbol: symbol.into(),
        direction,
        entry_price: entry,
        stop_loss: stop,
        take_profit: entry + 2.0 * (entry - stop),
        evaluated_at: chrono::Utc.with_ymd_and_hms(2024, 3, 15, 9, 0, 0).unwrap(),
        evidence: SignalEvidence {
            order_block: OrderBlock {
                direction,
                low: entry.min(stop),
                high: entry.max(stop),
                index: 0,
            },
            fib_ratio: 0.5,
            fib_price: entry,
            rsi: 25.0,
            atr: 1.0,
            break_index: 1,
            broken_level: entry,
        },
    }
}
