//! Market-structure types derived per analysis pass: swings, breaks, order blocks.

use serde::{Deserialize, Serialize};

/// Directional bias of a structure break, order block or trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    Bullish,
    Bearish,
}

impl Direction {
    pub fn opposite(self) -> Self {
        match self {
            Direction::Bullish => Direction::Bearish,
            Direction::Bearish => Direction::Bullish,
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Bullish => write!(f, "BULLISH"),
            Direction::Bearish => write!(f, "BEARISH"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SwingKind {
    High,
    Low,
}

/// A local extremum in the bar sequence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SwingPoint {
    /// Index into the bar sequence.
    pub index: usize,
    pub price: f64,
    pub kind: SwingKind,
}

/// The candle that opposed a breaking move, treated as a re-entry zone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrderBlock {
    pub direction: Direction,
    pub low: f64,
    pub high: f64,
    /// Index of the order-block candle in the bar sequence.
    pub index: usize,
}

impl OrderBlock {
    /// Distance from `price` to the nearer bound; zero when inside the range.
    pub fn distance_to(&self, price: f64) -> f64 {
        if price < self.low {
            self.low - price
        } else if price > self.high {
            price - self.high
        } else {
            0.0
        }
    }

    pub fn contains(&self, price: f64) -> bool {
        self.low <= price && price <= self.high
    }
}

/// A confirmed Break of Structure and the order block that preceded it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StructureBreak {
    pub direction: Direction,
    /// Index of the bar whose close broke the swing.
    pub break_index: usize,
    /// The swing that was broken.
    pub broken_swing: SwingPoint,
    pub order_block: OrderBlock,
}
