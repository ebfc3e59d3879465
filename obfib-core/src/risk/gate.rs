//! Thread-safe risk gate holding the account state behind one mutex.

use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::config::RiskConfig;
use crate::domain::CandidateSignal;
use crate::error::ConfigError;

use super::{risk_evaluate, OpenPosition, RiskDecision, RiskState};

/// Serializes every check-then-update on the shared `RiskState`.
#[derive(Debug)]
pub struct RiskGate {
    config: RiskConfig,
    state: Mutex<RiskState>,
}

impl RiskGate {
    pub fn new(config: RiskConfig, state: RiskState) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            state: Mutex::new(state),
        })
    }

    pub fn config(&self) -> &RiskConfig {
        &self.config
    }

    // Mutations happen only after all checks pass, so a poisoned state is still whole.
    fn lock(&self) -> MutexGuard<'_, RiskState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Evaluate and, on accept, record the trade, all under one lock.
    pub fn evaluate(&self, candidate: &CandidateSignal) -> RiskDecision {
        let mut state = self.lock();
        let decision = risk_evaluate(candidate, &mut state, &self.config);
        match decision {
            RiskDecision::Accept { position_size } => info!(
                symbol = %candidate.symbol,
                direction = %candidate.direction,
                position_size,
                trades_today = state.trades_taken_today,
                "risk accepted"
            ),
            RiskDecision::Reject { reason } => info!(
                symbol = %candidate.symbol,
                %reason,
                "risk rejected"
            ),
        }
        decision
    }

    /// Roll the daily counters over when `day` is a new trading day.
    /// An earlier day is ignored.
    pub fn begin_day(&self, day: NaiveDate) {
        let mut state = self.lock();
        let previous = state.trading_day;
        if state.begin_day(day) {
            info!(%day, ?previous, "trading day rollover");
        } else if previous.is_some_and(|current| day < current) {
            warn!(%day, ?previous, "ignoring rollover to an earlier day");
        }
    }

    /// Trade-close notification. Ignored when no position on `symbol` is open.
    pub fn record_close(&self, symbol: &str, pnl: f64) -> Option<OpenPosition> {
        let closed = self.lock().record_close(symbol, pnl);
        if closed.is_none() {
            warn!(symbol, pnl, "ignoring close without a matching open position");
        }
        closed
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> RiskState {
        self.lock().clone()
    }
}
