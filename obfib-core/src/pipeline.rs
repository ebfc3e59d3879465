//! End-to-end flow: signal engine → session filter → risk gate.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::components::{SessionFilter, SignalEngine};
use crate::config::StrategyConfig;
use crate::domain::{Analysis, CandidateSignal, NoSignalReason, PriceHistory};
use crate::error::ConfigError;
use crate::risk::{RejectReason, RiskDecision, RiskGate, RiskState};

/// What happened to one history at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PipelineOutcome {
    NoSignal {
        reason: NoSignalReason,
    },
    /// A setup exists but `now` is outside every session; risk was not consulted.
    OutsideSession {
        candidate: CandidateSignal,
    },
    Accepted {
        candidate: CandidateSignal,
        position_size: f64,
    },
    Rejected {
        candidate: CandidateSignal,
        reason: RejectReason,
    },
}

impl PipelineOutcome {
    pub fn candidate(&self) -> Option<&CandidateSignal> {
        match self {
            PipelineOutcome::NoSignal { .. } => None,
            PipelineOutcome::OutsideSession { candidate }
            | PipelineOutcome::Accepted { candidate, .. }
            | PipelineOutcome::Rejected { candidate, .. } => Some(candidate),
        }
    }
}

#[derive(Debug)]
pub struct Pipeline {
    engine: SignalEngine,
    sessions: SessionFilter,
    gate: RiskGate,
}

impl Pipeline {
    pub fn new(config: StrategyConfig, state: RiskState) -> Result<Self, ConfigError> {
        let sessions = SessionFilter::new(&config.sessions)?;
        let gate = RiskGate::new(config.risk.clone(), state)?;
        let engine = SignalEngine::new(config)?;
        Ok(Self {
            engine,
            sessions,
            gate,
        })
    }

    pub fn engine(&self) -> &SignalEngine {
        &self.engine
    }

    pub fn gate(&self) -> &RiskGate {
        &self.gate
    }

    /// Run one history through the whole flow as of `now`.
    ///
    /// The risk gate's daily counters roll over on the UTC date of `now`.
    pub fn process<Tz: TimeZone>(
        &self,
        history: &PriceHistory,
        now: &DateTime<Tz>,
    ) -> PipelineOutcome {
        let now_utc = now.with_timezone(&Utc);
        self.gate.begin_day(now_utc.date_naive());

        let candidate = match self.engine.analyze(history) {
            Analysis::Signal(candidate) => candidate,
            Analysis::NoSignal(reason) => return PipelineOutcome::NoSignal { reason },
        };

        if !self.sessions.is_active(&now_utc) {
            debug!(symbol = %candidate.symbol, time = %now_utc.time(), "outside trading sessions");
            return PipelineOutcome::OutsideSession { candidate };
        }

        match self.gate.evaluate(&candidate) {
            RiskDecision::Accept { position_size } => PipelineOutcome::Accepted {
                candidate,
                position_size,
            },
            RiskDecision::Reject { reason } => PipelineOutcome::Rejected { candidate, reason },
        }
    }
}
