//! Fibonacci retracement levels.
//!
//! For a bullish leg (low → high) the retracement is measured down from the
//! high: level(r) = high - r * (high - low). For a bearish leg it is measured
//! up from the low: level(r) = low + r * (high - low).

use serde::{Deserialize, Serialize};

use crate::domain::{Direction, SwingKind, SwingPoint};
use crate::error::AnalysisError;

/// Default retracement ratios.
pub const DEFAULT_RATIOS: [f64; 3] = [0.382, 0.5, 0.618];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FibLevel {
    pub ratio: f64,
    pub price: f64,
}

/// Retracement levels for one swing leg.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FibonacciLevels {
    pub swing_high: f64,
    pub swing_low: f64,
    pub direction: Direction,
    /// One entry per configured ratio, in configuration order.
    pub levels: Vec<FibLevel>,
}

/// Compute retracement levels for the given leg and ratios.
pub fn fibonacci_levels(
    swing_low: f64,
    swing_high: f64,
    direction: Direction,
    ratios: &[f64],
) -> FibonacciLevels {
    let span = swing_high - swing_low;
    let levels = ratios
        .iter()
        .map(|&ratio| {
            let price = match direction {
                Direction::Bullish => swing_high - ratio * span,
                Direction::Bearish => swing_low + ratio * span,
            };
            FibLevel { ratio, price }
        })
        .collect();
    FibonacciLevels {
        swing_high,
        swing_low,
        direction,
        levels,
    }
}

impl FibonacciLevels {
    /// Levels from the most recent swing HIGH and most recent swing LOW.
    ///
    /// Fails with `InsufficientData` unless `swings` holds at least one of each.
    pub fn from_swings(
        swings: &[SwingPoint],
        direction: Direction,
        ratios: &[f64],
    ) -> Result<Self, AnalysisError> {
        let latest = |kind: SwingKind| swings.iter().rev().find(|s| s.kind == kind);
        match (latest(SwingKind::High), latest(SwingKind::Low)) {
            (Some(high), Some(low)) => {
                Ok(fibonacci_levels(low.price, high.price, direction, ratios))
            }
            _ => Err(AnalysisError::InsufficientData(format!(
                "fibonacci levels need a swing high and a swing low, found {} swing point(s)",
                swings.len()
            ))),
        }
    }

    /// Price for `ratio`, if it was one of the computed ratios.
    pub fn level(&self, ratio: f64) -> Option<f64> {
        self.levels
            .iter()
            .find(|l| (l.ratio - ratio).abs() < 1e-9)
            .map(|l| l.price)
    }
}
