//! Relative Strength Index (RSI).
//!
//! Uses Wilder smoothing of average gains and average losses.
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss)
//! Lookback: period.
//! Edge cases: avg_loss == 0 → RSI = 100 (including a flat window);
//! avg_gain == 0 with losses → RSI = 0.

use super::Indicator;
use crate::domain::PriceBar;

/// Wilder RSI over a close series.
///
/// Returns a series the same length as `closes`; indices before `period` are
/// `NaN`. A NaN close poisons every value from that point on.
pub fn rsi(closes: &[f64], period: usize) -> Vec<f64> {
    let n = closes.len();
    let mut result = vec![f64::NAN; n];

    if period == 0 || n < period + 1 {
        return result;
    }

    // Seed: average gain and average loss over the first `period` changes
    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;
    for w in closes[..=period].windows(2) {
        let ch = w[1] - w[0];
        if ch.is_nan() {
            return result;
        }
        if ch > 0.0 {
            avg_gain += ch;
        } else {
            avg_loss -= ch;
        }
    }
    avg_gain /= period as f64;
    avg_loss /= period as f64;

    result[period] = compute_rsi(avg_gain, avg_loss);

    let alpha = 1.0 / period as f64;
    for i in (period + 1)..n {
        let ch = closes[i] - closes[i - 1];
        if ch.is_nan() {
            return result;
        }
        let gain = ch.max(0.0);
        let loss = (-ch).max(0.0);

        avg_gain = alpha * gain + (1.0 - alpha) * avg_gain;
        avg_loss = alpha * loss + (1.0 - alpha) * avg_loss;

        result[i] = compute_rsi(avg_gain, avg_loss);
    }

    result
}

fn compute_rsi(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        100.0
    } else if avg_gain == 0.0 {
        0.0
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}

#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
    name: String,
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "RSI period must be >= 1");
        Self {
            period,
            name: format!("rsi_{period}"),
        }
    }
}

impl Indicator for Rsi {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, bars: &[PriceBar]) -> Vec<f64> {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        rsi(&closes, self.period)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars};

    #[test]
    fn rsi_all_gains() {
        let result = rsi(&[100.0, 101.0, 102.0, 103.0, 104.0, 105.0], 3);
        assert_approx(result[3], 100.0, 1e-6);
        assert_approx(result[5], 100.0, 1e-6);
    }

    #[test]
    fn rsi_all_losses() {
        let result = rsi(&[105.0, 104.0, 103.0, 102.0, 101.0, 100.0], 3);
        assert_approx(result[3], 0.0, 1e-6);
    }

    #[test]
    fn rsi_flat_window_is_100() {
        let result = rsi(&[100.0; 6], 3);
        assert_approx(result[3], 100.0, 1e-6);
    }

    #[test]
    fn rsi_mixed_seed_value() {
        // Changes: +0.34, -0.25, -0.48, +0.72
        // period=3 seed: avg_gain = 0.34/3, avg_loss = 0.73/3
        // RSI[3] = 100 - 100/(1 + 0.34/0.73)
        let result = rsi(&[44.0, 44.34, 44.09, 43.61, 44.33], 3);
        assert!(result[0].is_nan());
        assert!(result[1].is_nan());
        assert!(result[2].is_nan());
        assert_approx(result[3], 100.0 - 100.0 / (1.0 + 0.34 / 0.73), 1e-9);

        // Wilder step: avg_gain = (0.72 + 2*0.34/3)/3, avg_loss = (2*0.73/3)/3
        let g = (0.72 + 2.0 * 0.34 / 3.0) / 3.0;
        let l = (2.0 * 0.73 / 3.0) / 3.0;
        assert_approx(result[4], 100.0 - 100.0 / (1.0 + g / l), 1e-9);
    }

    #[test]
    fn rsi_bounds() {
        let result = rsi(&[100.0, 105.0, 98.0, 110.0, 95.0, 115.0, 90.0, 120.0], 3);
        for (i, &v) in result.iter().enumerate() {
            if !v.is_nan() {
                assert!((0.0..=100.0).contains(&v), "RSI out of bounds at bar {i}: {v}");
            }
        }
    }

    #[test]
    fn rsi_short_series_is_all_nan() {
        assert!(rsi(&[1.0, 2.0, 3.0], 3).iter().all(|v| v.is_nan()));
        assert!(rsi(&[], 14).is_empty());
    }

    #[test]
    fn rsi_nan_in_seed_poisons_series() {
        let result = rsi(&[100.0, 101.0, f64::NAN, 103.0, 104.0], 3);
        assert!(result.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn indicator_impl_matches_free_function() {
        let closes = [10.0, 11.0, 10.5, 10.8, 11.2, 10.9, 11.5];
        let bars = make_bars(&closes);
        let ind = Rsi::new(3);
        assert_eq!(ind.name(), "rsi_3");
        assert_eq!(ind.lookback(), 3);
        let a = ind.compute(&bars);
        let b = rsi(&closes, 3);
        assert_eq!(a.len(), b.len());
        for (i, (&x, &y)) in a.iter().zip(b.iter()).enumerate() {
            assert_eq!(x.is_nan(), y.is_nan(), "warmup mismatch at bar {i}");
            if !x.is_nan() {
                assert_approx(x, y, 1e-12);
            }
        }
        assert!(a[..3].iter().all(|v| v.is_nan()));
        assert_approx(ind.latest(&bars).unwrap(), b[6], 1e-12);
    }
}
