//! Pairwise symbol correlations from configuration.

use crate::config::CorrelatedPair;

/// Symmetric lookup over configured pairs. Unlisted pairs are uncorrelated.
#[derive(Debug, Clone, Copy)]
pub struct CorrelationTable<'a> {
    pairs: &'a [CorrelatedPair],
}

impl<'a> CorrelationTable<'a> {
    pub fn new(pairs: &'a [CorrelatedPair]) -> Self {
        Self { pairs }
    }

    /// Coefficient between `a` and `b`. A symbol is fully correlated with itself.
    pub fn coefficient(&self, a: &str, b: &str) -> Option<f64> {
        if a == b {
            return Some(1.0);
        }
        self.pairs
            .iter()
            .find(|p| (p.a == a && p.b == b) || (p.a == b && p.b == a))
            .map(|p| p.coefficient)
    }

    /// True when |coefficient| is strictly above `threshold`.
    pub fn exceeds(&self, a: &str, b: &str, threshold: f64) -> bool {
        self.coefficient(a, b).is_some_and(|c| c.abs() > threshold)
    }
}
