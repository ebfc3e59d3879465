//! Structure analyzer — Break of Structure detection and order-block localization.
//!
//! Scans forward through the bars. A swing point at index i is only usable
//! once its right-hand window is complete (bar i + lookback), so no break is
//! ever detected against a swing that was not yet knowable. A bullish BOS is
//! a close above the most recent confirmed swing high; a bearish BOS is a
//! close below the most recent confirmed swing low. A broken swing is
//! consumed. The latest BOS in each direction is kept; the more recent of
//! the two comes first.

use tracing::debug;

use crate::config::StructureConfig;
use crate::domain::{Direction, OrderBlock, PriceBar, StructureBreak, SwingKind, SwingPoint};

/// Bars averaged for the optional order-block volume qualification.
const VOLUME_WINDOW: usize = 10;

type Break = (Direction, usize, SwingPoint);

#[derive(Debug, Clone)]
pub struct StructureAnalyzer {
    lookback: usize,
    volume_ratio: Option<f64>,
}

impl StructureAnalyzer {
    pub fn new(config: &StructureConfig) -> Self {
        Self {
            lookback: config.lookback,
            volume_ratio: config.order_block_volume_ratio,
        }
    }

    pub fn lookback(&self) -> usize {
        self.lookback
    }

    /// Most recent break that has an order block, or `None` ("no structure").
    ///
    /// `swings` must be ordered by index, as `swing_points` yields them.
    pub fn analyze(&self, bars: &[PriceBar], swings: &[SwingPoint]) -> Option<StructureBreak> {
        self.breaks(bars, swings).into_iter().next()
    }

    /// Latest break per direction that has an order block, most recent first.
    /// At most one bullish and one bearish break.
    pub fn breaks(&self, bars: &[PriceBar], swings: &[SwingPoint]) -> Vec<StructureBreak> {
        let (bullish, bearish) = self.latest_breaks(bars, swings);
        let mut found: Vec<StructureBreak> = [bullish, bearish]
            .into_iter()
            .flatten()
            .filter_map(|(direction, break_index, broken_swing)| {
                let Some(order_block) = self.find_order_block(bars, direction, break_index) else {
                    debug!(
                        break_index,
                        %direction,
                        "structure break without an opposing candle in range"
                    );
                    return None;
                };
                Some(StructureBreak {
                    direction,
                    break_index,
                    broken_swing,
                    order_block,
                })
            })
            .collect();
        found.sort_by(|a, b| b.break_index.cmp(&a.break_index));
        found
    }

    /// Latest bullish and latest bearish break as (direction, bar, broken swing).
    fn latest_breaks(
        &self,
        bars: &[PriceBar],
        swings: &[SwingPoint],
    ) -> (Option<Break>, Option<Break>) {
        let mut pending = swings.iter().peekable();
        let mut active_high: Option<SwingPoint> = None;
        let mut active_low: Option<SwingPoint> = None;
        let mut bullish = None;
        let mut bearish = None;

        for (j, bar) in bars.iter().enumerate() {
            while let Some(s) = pending.next_if(|s| s.index + self.lookback <= j) {
                match s.kind {
                    SwingKind::High => active_high = Some(*s),
                    SwingKind::Low => active_low = Some(*s),
                }
            }

            if let Some(high) = active_high.filter(|h| bar.close > h.price) {
                bullish = Some((Direction::Bullish, j, high));
                active_high = None;
            }
            if let Some(low) = active_low.filter(|l| bar.close < l.price) {
                bearish = Some((Direction::Bearish, j, low));
                active_low = None;
            }
        }

        (bullish, bearish)
    }

    /// Nearest candle before `break_index` whose body opposes the break,
    /// searching at most `lookback` bars back.
    fn find_order_block(
        &self,
        bars: &[PriceBar],
        direction: Direction,
        break_index: usize,
    ) -> Option<OrderBlock> {
        let start = break_index.saturating_sub(self.lookback);
        (start..break_index)
            .rev()
            .find(|&k| {
                let bar = &bars[k];
                let opposes = match direction {
                    Direction::Bullish => bar.is_bearish(),
                    Direction::Bearish => bar.is_bullish(),
                };
                opposes && self.volume_qualifies(bars, k)
            })
            .map(|k| OrderBlock {
                direction,
                low: bars[k].low,
                high: bars[k].high,
                index: k,
            })
    }

    fn volume_qualifies(&self, bars: &[PriceBar], k: usize) -> bool {
        let Some(ratio) = self.volume_ratio else {
            return true;
        };
        let window = &bars[k.saturating_sub(VOLUME_WINDOW)..k];
        if window.is_empty() {
            return false;
        }
        let mean = window.iter().map(|b| b.volume).sum::<f64>() / window.len() as f64;
        bars[k].volume > ratio * mean
    }
}
