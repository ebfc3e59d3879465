//! Confluence evaluator — does the order block sit on a Fibonacci level?
//!
//! For each configured ratio the distance is measured from the level to the
//! nearer bound of the order-block range (zero when the level lies inside
//! it). Confluence holds when any distance is within the ATR-derived
//! tolerance.
//!
//! Tie-break among matching ratios: closest to 0.5 first, then the smaller
//! price distance, then the smaller ratio.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::domain::OrderBlock;
use crate::indicators::{FibLevel, FibonacciLevels};

/// Anchor ratio for the tie-break.
const ANCHOR_RATIO: f64 = 0.5;

/// The Fibonacci level matched by an order block.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfluenceMatch {
    pub ratio: f64,
    pub price: f64,
    /// Distance from the level to the order block (zero if inside).
    pub distance: f64,
}

fn anchor_gap(ratio: f64) -> f64 {
    (ratio - ANCHOR_RATIO).abs()
}

// 0.5 - 0.382 and 0.618 - 0.5 differ in the last bits; treat them as equal.
fn approx_cmp(a: f64, b: f64) -> Ordering {
    if (a - b).abs() < 1e-9 {
        Ordering::Equal
    } else {
        a.total_cmp(&b)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ConfluenceEvaluator {
    tolerance_atr_multiple: f64,
}

impl ConfluenceEvaluator {
    pub fn new(tolerance_atr_multiple: f64) -> Self {
        Self {
            tolerance_atr_multiple,
        }
    }

    /// Absolute tolerance for the given ATR.
    pub fn tolerance(&self, atr: f64) -> f64 {
        self.tolerance_atr_multiple * atr
    }

    /// Best matching level, or `None` for "no confluence".
    pub fn evaluate(
        &self,
        order_block: &OrderBlock,
        fib: &FibonacciLevels,
        atr: f64,
    ) -> Option<ConfluenceMatch> {
        let tolerance = self.tolerance(atr);
        fib.levels
            .iter()
            .map(|&FibLevel { ratio, price }| ConfluenceMatch {
                ratio,
                price,
                distance: order_block.distance_to(price),
            })
            .filter(|m| m.distance <= tolerance)
            .min_by(|a, b| {
                approx_cmp(anchor_gap(a.ratio), anchor_gap(b.ratio))
                    .then(a.distance.total_cmp(&b.distance))
                    .then(a.ratio.total_cmp(&b.ratio))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Direction;
    use crate::indicators::fibonacci::DEFAULT_RATIOS;
    use crate::indicators::{assert_approx, fibonacci_levels};

    fn ob(low: f64, high: f64) -> OrderBlock {
        OrderBlock {
            direction: Direction::Bullish,
            low,
            high,
            index: 10,
        }
    }

    // Leg 100 → 200, bullish: 0.382 → 161.8, 0.5 → 150, 0.618 → 138.2
    fn fib() -> FibonacciLevels {
        fibonacci_levels(100.0, 200.0, Direction::Bullish, &DEFAULT_RATIOS)
    }

    #[test]
    fn level_inside_block_matches() {
        let m = ConfluenceEvaluator::new(0.1)
            .evaluate(&ob(148.0, 152.0), &fib(), 5.0)
            .unwrap();
        assert_eq!(m.ratio, 0.5);
        assert_eq!(m.distance, 0.0);
        assert_approx(m.price, 150.0, 1e-9);
    }

    #[test]
    fn level_within_tolerance_of_nearer_bound() {
        // 0.618 level at 138.2; block low 138.6 → distance 0.4 ≤ 0.1 * 5.0
        let m = ConfluenceEvaluator::new(0.1)
            .evaluate(&ob(138.6, 141.0), &fib(), 5.0)
            .unwrap();
        assert_eq!(m.ratio, 0.618);
        assert_approx(m.distance, 0.4, 1e-9);
    }

    #[test]
    fn outside_tolerance_is_no_confluence() {
        assert!(ConfluenceEvaluator::new(0.1)
            .evaluate(&ob(152.0, 158.0), &fib(), 5.0)
            .is_none());
    }

    #[test]
    fn prefers_ratio_closest_to_half() {
        // A wide block spans all three levels.
        let m = ConfluenceEvaluator::new(0.1)
            .evaluate(&ob(135.0, 165.0), &fib(), 1.0)
            .unwrap();
        assert_eq!(m.ratio, 0.5);
    }

    #[test]
    fn symmetric_tie_prefers_smaller_distance_then_smaller_ratio() {
        // Block spans 0.382 (161.8) exactly, 0.618 (138.2) within tolerance.
        let evaluator = ConfluenceEvaluator::new(10.0);
        let m = evaluator.evaluate(&ob(139.0, 162.0), &fib(), 1.0);
        // 0.5 is inside as well and wins outright.
        assert_eq!(m.unwrap().ratio, 0.5);

        let only_outer = fibonacci_levels(100.0, 200.0, Direction::Bullish, &[0.382, 0.618]);
        let m = evaluator.evaluate(&ob(139.0, 162.0), &only_outer, 1.0).unwrap();
        assert_eq!(m.ratio, 0.382); // distance 0 beats 0.8

        let m = evaluator.evaluate(&ob(100.0, 300.0), &only_outer, 1.0).unwrap();
        assert_eq!(m.ratio, 0.382); // both inside: smaller ratio
    }

    #[test]
    fn zero_atr_requires_level_inside_block() {
        let e = ConfluenceEvaluator::new(0.1);
        assert!(e.evaluate(&ob(149.0, 151.0), &fib(), 0.0).is_some());
        assert!(e.evaluate(&ob(150.5, 151.0), &fib(), 0.0).is_none());
    }
}
