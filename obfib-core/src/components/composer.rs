//! Signal composer — runs the pipeline stages in order and builds a candidate.
//!
//! Structure → Confluence → Momentum → construct. The latest break in each
//! direction is tried, most recent first; the first one that passes every
//! stage becomes the candidate. Otherwise the result is `Analysis::NoSignal`
//! with the reason the most recent break failed. Absence of a setup is an
//! expected, frequent result and never an error.

use rayon::prelude::*;
use tracing::{debug, info};

use crate::config::{StrategyConfig, TargetConfig};
use crate::domain::{
    Analysis, CandidateSignal, Direction, NoSignalReason, OrderBlock, PriceBar, PriceHistory,
    SignalEvidence, StructureBreak, SwingPoint,
};
use crate::error::{AnalysisError, ConfigError};
use crate::indicators::{swing_points, Atr, FibonacciLevels, Indicator, Rsi};

use super::confluence::ConfluenceEvaluator;
use super::momentum::MomentumGate;
use super::structure::StructureAnalyzer;

/// Stateless setup detector. Cheap to share across threads.
#[derive(Debug, Clone)]
pub struct SignalEngine {
    config: StrategyConfig,
    structure: StructureAnalyzer,
    confluence: ConfluenceEvaluator,
    momentum: MomentumGate,
    rsi: Rsi,
    atr: Atr,
}

impl SignalEngine {
    pub fn new(config: StrategyConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            structure: StructureAnalyzer::new(&config.structure),
            confluence: ConfluenceEvaluator::new(config.fibonacci.tolerance_atr_multiple),
            momentum: MomentumGate::new(&config.momentum),
            rsi: Rsi::new(config.momentum.rsi_period),
            atr: Atr::new(config.atr_period),
            config,
        })
    }

    pub fn config(&self) -> &StrategyConfig {
        &self.config
    }

    /// Analyze one validated history. Idempotent for identical input.
    pub fn analyze(&self, history: &PriceHistory) -> Analysis {
        let analysis = self.run(history);
        match &analysis {
            Analysis::Signal(s) => info!(
                symbol = history.symbol(),
                direction = %s.direction,
                entry = s.entry_price,
                stop = s.stop_loss,
                target = s.take_profit,
                fib_ratio = s.evidence.fib_ratio,
                rsi = s.evidence.rsi,
                "candidate signal"
            ),
            Analysis::NoSignal(reason) => {
                debug!(symbol = history.symbol(), %reason, "no signal")
            }
        }
        analysis
    }

    /// Validate raw bars into a `PriceHistory`, then analyze.
    pub fn analyze_bars(
        &self,
        symbol: &str,
        bars: Vec<PriceBar>,
    ) -> Result<Analysis, AnalysisError> {
        let history = PriceHistory::new(symbol, bars)?;
        Ok(self.analyze(&history))
    }

    /// Analyze independent histories in parallel; results keep input order.
    pub fn analyze_many(&self, histories: &[PriceHistory]) -> Vec<Analysis> {
        histories.par_iter().map(|h| self.analyze(h)).collect()
    }

    fn run(&self, history: &PriceHistory) -> Analysis {
        let bars = history.bars();
        let required = self.config.min_history();
        let insufficient = Analysis::NoSignal(NoSignalReason::InsufficientHistory {
            required,
            available: bars.len(),
        });
        let Some(last) = bars.last().filter(|_| bars.len() >= required) else {
            return insufficient;
        };

        let swings: Vec<SwingPoint> = swing_points(bars, self.structure.lookback()).collect();
        let breaks = self.structure.breaks(bars, &swings);
        if breaks.is_empty() {
            return Analysis::NoSignal(NoSignalReason::NoStructure);
        }

        let (Some(atr), Some(rsi)) = (self.atr.latest(bars), self.rsi.latest(bars)) else {
            return insufficient;
        };

        let mut first_failure = None;
        for structure in breaks {
            let direction = structure.direction;
            match self.setup(history, last, &swings, structure, atr, rsi) {
                Ok(candidate) => return Analysis::Signal(candidate),
                Err(reason) => {
                    debug!(symbol = history.symbol(), %direction, %reason, "setup rejected");
                    first_failure.get_or_insert(reason);
                }
            }
        }
        Analysis::NoSignal(first_failure.unwrap_or(NoSignalReason::NoStructure))
    }

    /// Confluence, momentum and trade levels for one structure break.
    fn setup(
        &self,
        history: &PriceHistory,
        last: &PriceBar,
        swings: &[SwingPoint],
        structure: StructureBreak,
        atr: f64,
        rsi: f64,
    ) -> Result<CandidateSignal, NoSignalReason> {
        let direction = structure.direction;
        let fib = FibonacciLevels::from_swings(swings, direction, &self.config.fibonacci.ratios)
            .map_err(|_| NoSignalReason::NoSwingRange)?;

        let matched = self
            .confluence
            .evaluate(&structure.order_block, &fib, atr)
            .ok_or(NoSignalReason::NoConfluence)?;

        if !self.momentum.confirms(rsi, direction) {
            return Err(NoSignalReason::MomentumNotConfirmed { rsi });
        }

        let levels = trade_levels(
            &structure.order_block,
            direction,
            last.close,
            atr,
            &self.config.targets,
        )
        .ok_or(NoSignalReason::DegenerateRisk)?;

        Ok(CandidateSignal {
            symbol: history.symbol().to_string(),
            direction,
            entry_price: levels.entry,
            stop_loss: levels.stop,
            take_profit: levels.target,
            evaluated_at: last.timestamp,
            evidence: SignalEvidence {
                order_block: structure.order_block,
                fib_ratio: matched.ratio,
                fib_price: matched.price,
                rsi,
                atr,
                break_index: structure.break_index,
                broken_level: structure.broken_swing.price,
            },
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct TradeLevels {
    entry: f64,
    stop: f64,
    target: f64,
}

/// Entry at the order-block bound nearer the current price, stop beyond the
/// far bound by `stop_buffer_atr_multiple * atr`, target at `risk_reward`
/// times the entry-to-stop distance. `None` when the buffer collapses.
fn trade_levels(
    ob: &OrderBlock,
    direction: Direction,
    current_price: f64,
    atr: f64,
    targets: &TargetConfig,
) -> Option<TradeLevels> {
    let buffer = targets.stop_buffer_atr_multiple * atr;
    if !(buffer.is_finite() && buffer > 0.0) {
        return None;
    }

    let entry = if (current_price - ob.high).abs() <= (current_price - ob.low).abs() {
        ob.high
    } else {
        ob.low
    };
    let stop = match direction {
        Direction::Bullish => ob.low - buffer,
        Direction::Bearish => ob.high + buffer,
    };
    let target = entry + targets.risk_reward * (entry - stop);

    Some(TradeLevels {
        entry,
        stop,
        target,
    })
}
