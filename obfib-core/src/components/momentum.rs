//! Momentum gate — RSI must be oversold for longs, overbought for shorts.

use crate::config::MomentumConfig;
use crate::domain::Direction;

#[derive(Debug, Clone, Copy)]
pub struct MomentumGate {
    oversold: f64,
    overbought: f64,
}

impl MomentumGate {
    pub fn new(config: &MomentumConfig) -> Self {
        Self {
            oversold: config.oversold,
            overbought: config.overbought,
        }
    }

    /// True when `rsi` confirms a trade in `direction`. NaN never confirms.
    pub fn confirms(&self, rsi: f64, direction: Direction) -> bool {
        match direction {
            Direction::Bullish => rsi < self.oversold,
            Direction::Bearish => rsi > self.overbought,
        }
    }
}
