//! Swing highs and lows by local-extremum comparison.
//!
//! Bar i is a swing HIGH if its high is strictly greater than every other high
//! in `[i - lookback, i + lookback]`, and a swing LOW if its low is strictly
//! below every other low in that window. Only bars with a full window on both
//! sides are eligible, so a swing at i is known no earlier than bar
//! i + lookback.

use crate::domain::{PriceBar, SwingKind, SwingPoint};

/// Lazy iterator over swing points, ordered by index.
///
/// Finite and restartable: a clone resumes from the same position, and a
/// fresh [`swing_points`] call starts over from the first eligible bar.
#[derive(Debug, Clone)]
pub struct SwingPoints<'a> {
    bars: &'a [PriceBar],
    lookback: usize,
    next_index: usize,
    pending_low: Option<SwingPoint>,
}

/// Iterate the swing points of `bars` with the given one-sided window.
pub fn swing_points(bars: &[PriceBar], lookback: usize) -> SwingPoints<'_> {
    SwingPoints {
        bars,
        lookback,
        next_index: lookback,
        pending_low: None,
    }
}

impl<'a> SwingPoints<'a> {
    fn window(&self, i: usize) -> impl Iterator<Item = (usize, &'a PriceBar)> {
        let bars: &'a [PriceBar] = self.bars;
        let lo = i - self.lookback;
        let hi = i + self.lookback;
        bars[lo..=hi]
            .iter()
            .enumerate()
            .map(move |(k, b)| (lo + k, b))
            .filter(move |(j, _)| *j != i)
    }

    fn is_swing_high(&self, i: usize) -> bool {
        let h = self.bars[i].high;
        self.window(i).all(|(_, b)| b.high < h)
    }

    fn is_swing_low(&self, i: usize) -> bool {
        let l = self.bars[i].low;
        self.window(i).all(|(_, b)| b.low > l)
    }
}

impl Iterator for SwingPoints<'_> {
    type Item = SwingPoint;

    fn next(&mut self) -> Option<SwingPoint> {
        if let Some(low) = self.pending_low.take() {
            return Some(low);
        }
        if self.lookback == 0 {
            return None;
        }
        while self.next_index + self.lookback < self.bars.len() {
            let i = self.next_index;
            self.next_index += 1;

            let low = self.is_swing_low(i).then(|| SwingPoint {
                index: i,
                price: self.bars[i].low,
                kind: SwingKind::Low,
            });
            if self.is_swing_high(i) {
                self.pending_low = low;
                return Some(SwingPoint {
                    index: i,
                    price: self.bars[i].high,
                    kind: SwingKind::High,
                });
            }
            if low.is_some() {
                return low;
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_ohlc_bars;

    /// Bars with explicit highs and lows; open/close sit mid-range.
    fn hl_bars(hl: &[(f64, f64)]) -> Vec<PriceBar> {
        let data: Vec<(f64, f64, f64, f64)> = hl
            .iter()
            .map(|&(h, l)| {
                let mid = (h + l) / 2.0;
                (mid, h, l, mid)
            })
            .collect();
        make_ohlc_bars(&data)
    }

    #[test]
    fn finds_peak_and_trough() {
        let bars = hl_bars(&[
            (10.0, 9.0),
            (11.0, 10.0),
            (14.0, 13.0), // swing high
            (12.0, 11.0),
            (10.0, 9.0),
            (8.0, 7.0), // swing low
            (9.0, 8.0),
            (10.0, 9.0),
        ]);
        let swings: Vec<SwingPoint> = swing_points(&bars, 2).collect();
        assert_eq!(swings.len(), 2);
        assert_eq!(swings[0].index, 2);
        assert_eq!(swings[0].kind, SwingKind::High);
        assert_eq!(swings[0].price, 14.0);
        assert_eq!(swings[1].index, 5);
        assert_eq!(swings[1].kind, SwingKind::Low);
        assert_eq!(swings[1].price, 7.0);
    }

    #[test]
    fn equal_highs_are_not_strict_extrema() {
        let bars = hl_bars(&[
            (10.0, 9.0),
            (12.0, 11.0),
            (12.0, 11.5),
            (10.0, 9.5),
            (9.0, 8.5),
        ]);
        assert!(swing_points(&bars, 1).all(|s| s.kind != SwingKind::High));
    }

    #[test]
    fn edges_without_full_window_are_skipped() {
        // Highest high at index 0 and lowest low at the last bar: neither qualifies.
        let bars = hl_bars(&[(20.0, 15.0), (18.0, 14.0), (17.0, 13.0), (16.0, 12.0)]);
        assert_eq!(swing_points(&bars, 1).count(), 0);
    }

    #[test]
    fn outside_bar_yields_high_then_low() {
        let bars = hl_bars(&[(10.0, 9.0), (12.0, 7.0), (10.5, 8.5)]);
        let swings: Vec<SwingPoint> = swing_points(&bars, 1).collect();
        assert_eq!(swings.len(), 2);
        assert_eq!(swings[0].kind, SwingKind::High);
        assert_eq!(swings[1].kind, SwingKind::Low);
        assert_eq!(swings[0].index, swings[1].index);
    }

    #[test]
    fn restartable_and_short_input() {
        let bars = hl_bars(&[(10.0, 9.0), (14.0, 13.0), (10.0, 9.0)]);
        let first: Vec<_> = swing_points(&bars, 1).collect();
        let second: Vec<_> = swing_points(&bars, 1).collect();
        assert_eq!(first, second);
        assert_eq!(swing_points(&bars, 5).count(), 0);
        assert_eq!(swing_points(&bars, 0).count(), 0);
    }
}
