//! Series math: RSI, ATR, swing points and Fibonacci retracements.
//!
//! Everything here is a pure function of the bar history. `Rsi` and `Atr`
//! also implement the `Indicator` trait so the composer can query their
//! warmup length uniformly.

pub mod atr;
pub mod fibonacci;
pub mod rsi;
pub mod swing;

pub use atr::{atr, true_range, Atr};
pub use fibonacci::{fibonacci_levels, FibLevel, FibonacciLevels};
pub use rsi::{rsi, Rsi};
pub use swing::{swing_points, SwingPoints};

use crate::domain::PriceBar;

/// Trait for single-series indicators.
///
/// Indicators take a full bar series and produce a numeric output series of
/// the same length. Values before `lookback()` are `f64::NAN` (warmup).
///
/// No value at bar t may depend on bars after t.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "rsi_14", "atr_14").
    fn name(&self) -> &str;

    /// Number of bars needed before the indicator produces valid output.
    fn lookback(&self) -> usize;

    /// Compute the indicator for the entire bar series.
    fn compute(&self, bars: &[PriceBar]) -> Vec<f64>;

    /// Value at the last bar, if past warmup.
    fn latest(&self, bars: &[PriceBar]) -> Option<f64> {
        self.compute(bars).last().copied().filter(|v| !v.is_nan())
    }
}

/// Create synthetic bars from close prices for testing.
///
/// Generates plausible OHLCV: open = prev_close (or close for first bar),
/// high = max(open,close) + 1.0, low = min(open,close) - 1.0, volume = 1000.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<PriceBar> {
    use chrono::TimeZone;
    let base = chrono::Utc.with_ymd_and_hms(2024, 1, 2, 7, 0, 0).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            PriceBar {
                timestamp: base + chrono::Duration::minutes(5 * i as i64),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume: 1000.0,
            }
        })
        .collect()
}

/// Create bars from explicit (open, high, low, close) tuples for testing.
#[cfg(test)]
pub fn make_ohlc_bars(data: &[(f64, f64, f64, f64)]) -> Vec<PriceBar> {
    use chrono::TimeZone;
    let base = chrono::Utc.with_ymd_and_hms(2024, 1, 2, 7, 0, 0).unwrap();
    data.iter()
        .enumerate()
        .map(|(i, &(open, high, low, close))| PriceBar {
            timestamp: base + chrono::Duration::minutes(5 * i as i64),
            open,
            high,
            low,
            close,
            volume: 1000.0,
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
