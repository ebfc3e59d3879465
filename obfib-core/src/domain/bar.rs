//! PriceBar and PriceHistory — the market data the pipeline consumes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

/// OHLCV bar for a single instrument over one period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl PriceBar {
    pub fn new(
        timestamp: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Returns true if any OHLCV field is NaN or infinite.
    pub fn is_void(&self) -> bool {
        !(self.open.is_finite()
            && self.high.is_finite()
            && self.low.is_finite()
            && self.close.is_finite()
            && self.volume.is_finite())
    }

    /// Basic OHLC sanity check: high bounds open/close from above, low from below.
    pub fn is_sane(&self) -> bool {
        if self.is_void() {
            return false;
        }
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
            && self.volume >= 0.0
    }

    /// Close strictly above open.
    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    /// Close strictly below open.
    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }

    pub fn range(&self) -> f64 {
        self.high - self.low
    }
}

/// A validated, time-ordered bar sequence for one symbol.
///
/// Construction checks every bar and the timestamp ordering once, so the
/// pipeline stages can index freely without re-validating. Empty and short
/// histories are valid; they simply produce no signal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceHistory {
    symbol: String,
    bars: Vec<PriceBar>,
}

impl PriceHistory {
    pub fn new(symbol: impl Into<String>, bars: Vec<PriceBar>) -> Result<Self, AnalysisError> {
        for (index, bar) in bars.iter().enumerate() {
            if bar.is_void() {
                return Err(AnalysisError::MalformedBar {
                    index,
                    reason: "non-finite price or volume".into(),
                });
            }
            if !bar.is_sane() {
                return Err(AnalysisError::MalformedBar {
                    index,
                    reason: format!(
                        "high/low do not bound open/close (o={}, h={}, l={}, c={})",
                        bar.open, bar.high, bar.low, bar.close
                    ),
                });
            }
        }
        if let Some(pos) = bars
            .windows(2)
            .position(|w| w[1].timestamp <= w[0].timestamp)
        {
            return Err(AnalysisError::UnorderedTimestamps { index: pos + 1 });
        }
        Ok(Self {
            symbol: symbol.into(),
            bars,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn last(&self) -> Option<&PriceBar> {
        self.bars.last()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }
}
