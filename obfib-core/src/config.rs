//! Typed strategy configuration, loaded from TOML and validated once.
//!
//! Every section has defaults for the stock strategy, so a config
//! file only needs the values it overrides. `validate()` is the single
//! fail-fast gate; the engine, session filter and risk gate all refuse an
//! invalid config at construction.

use std::path::Path;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::indicators::fibonacci::DEFAULT_RATIOS;

/// Full configuration for one strategy instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyConfig {
    pub name: String,
    pub structure: StructureConfig,
    pub fibonacci: FibonacciConfig,
    pub momentum: MomentumConfig,
    /// ATR period for the confluence tolerance and the stop buffer.
    pub atr_period: usize,
    pub targets: TargetConfig,
    pub sessions: SessionConfig,
    pub risk: RiskConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StructureConfig {
    /// One-sided swing window and the order-block search depth.
    pub lookback: usize,
    /// When set, an order-block candle must trade more than this multiple of
    /// the mean volume of the 10 bars before it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_block_volume_ratio: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FibonacciConfig {
    pub ratios: Vec<f64>,
    /// Confluence tolerance as a multiple of ATR.
    pub tolerance_atr_multiple: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MomentumConfig {
    pub rsi_period: usize,
    pub oversold: f64,
    pub overbought: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    /// Take-profit distance as a multiple of the entry-to-stop distance.
    pub risk_reward: f64,
    /// Stop distance beyond the order block as a multiple of ATR.
    pub stop_buffer_atr_multiple: f64,
}

/// A named wall-clock window in UTC, half-open `[start, end)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionWindow {
    pub name: String,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl SessionWindow {
    pub fn new(name: impl Into<String>, start: NaiveTime, end: NaiveTime) -> Self {
        Self {
            name: name.into(),
            start,
            end,
        }
    }

    pub fn contains(&self, t: NaiveTime) -> bool {
        self.start <= t && t < self.end
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub windows: Vec<SessionWindow>,
}

/// Correlation coefficient between two symbols.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelatedPair {
    pub a: String,
    pub b: String,
    pub coefficient: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    /// Fraction of balance risked per trade (0.10 = 10%).
    pub risk_per_trade_fraction: f64,
    pub max_trades_per_day: u32,
    /// Daily loss ceiling as a fraction of balance.
    pub max_daily_loss_fraction: f64,
    /// Open positions correlated strictly above this (absolute) block a candidate.
    pub correlation_threshold: f64,
    pub correlations: Vec<CorrelatedPair>,
    /// Optional ceiling on concurrently open positions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_open_positions: Option<u32>,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            name: "order_block_rsi_fib".into(),
            structure: StructureConfig::default(),
            fibonacci: FibonacciConfig::default(),
            momentum: MomentumConfig::default(),
            atr_period: 14,
            targets: TargetConfig::default(),
            sessions: SessionConfig::default(),
            risk: RiskConfig::default(),
        }
    }
}

impl Default for StructureConfig {
    fn default() -> Self {
        Self {
            lookback: 20,
            order_block_volume_ratio: None,
        }
    }
}

impl Default for FibonacciConfig {
    fn default() -> Self {
        Self {
            ratios: DEFAULT_RATIOS.to_vec(),
            tolerance_atr_multiple: 0.1,
        }
    }
}

impl Default for MomentumConfig {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            oversold: 30.0,
            overbought: 70.0,
        }
    }
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            risk_reward: 2.0,
            stop_buffer_atr_multiple: 0.1,
        }
    }
}

fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN)
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            windows: vec![
                SessionWindow::new("london", hm(7, 0), hm(11, 0)),
                SessionWindow::new("new_york", hm(12, 0), hm(16, 0)),
            ],
        }
    }
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            risk_per_trade_fraction: 0.10,
            max_trades_per_day: 3,
            max_daily_loss_fraction: 0.10,
            correlation_threshold: 0.7,
            correlations: Vec::new(),
            max_open_positions: None,
        }
    }
}

fn fraction(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange { field, value })
    }
}

fn period(field: &'static str, value: usize) -> Result<(), ConfigError> {
    if value >= 1 {
        Ok(())
    } else {
        Err(ConfigError::ZeroPeriod { field })
    }
}

impl StrategyConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Deterministic BLAKE3 hash of the canonical JSON form.
    ///
    /// Two configs with identical parameters share a fingerprint, which makes
    /// it usable as a tag on emitted candidates and log lines.
    pub fn fingerprint(&self) -> String {
        let json = serde_json::to_string(self).unwrap_or_default();
        blake3::hash(json.as_bytes()).to_hex().to_string()
    }

    /// Bars needed before a full analysis pass can run.
    pub fn min_history(&self) -> usize {
        let indicator_warmup = self.momentum.rsi_period.max(self.atr_period) + 1;
        indicator_warmup.max(2 * self.structure.lookback + 1)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.structure.validate()?;
        self.fibonacci.validate()?;
        self.momentum.validate()?;
        period("atr_period", self.atr_period)?;
        self.targets.validate()?;
        self.sessions.validate()?;
        self.risk.validate()
    }
}

impl StructureConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        period("lookback", self.lookback)?;
        if let Some(ratio) = self.order_block_volume_ratio {
            if !(ratio.is_finite() && ratio > 0.0) {
                return Err(ConfigError::OutOfRange {
                    field: "order_block_volume_ratio",
                    value: ratio,
                });
            }
        }
        Ok(())
    }
}

impl FibonacciConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ratios.is_empty() {
            return Err(ConfigError::InvalidRatios("no ratios configured".into()));
        }
        for (i, &r) in self.ratios.iter().enumerate() {
            if !(r > 0.0 && r < 1.0) {
                return Err(ConfigError::InvalidRatios(format!(
                    "ratio {r} outside (0, 1)"
                )));
            }
            if self.ratios[..i].iter().any(|&prev| (prev - r).abs() < 1e-9) {
                return Err(ConfigError::InvalidRatios(format!("duplicate ratio {r}")));
            }
        }
        if !(self.tolerance_atr_multiple.is_finite() && self.tolerance_atr_multiple >= 0.0) {
            return Err(ConfigError::OutOfRange {
                field: "tolerance_atr_multiple",
                value: self.tolerance_atr_multiple,
            });
        }
        Ok(())
    }
}

impl MomentumConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        period("rsi_period", self.rsi_period)?;
        let in_bounds = |v: f64| (0.0..=100.0).contains(&v);
        if !(in_bounds(self.oversold) && in_bounds(self.overbought))
            || self.oversold >= self.overbought
        {
            return Err(ConfigError::InvalidThresholds {
                oversold: self.oversold,
                overbought: self.overbought,
            });
        }
        Ok(())
    }
}

impl TargetConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.risk_reward.is_finite() && self.risk_reward > 0.0) {
            return Err(ConfigError::OutOfRange {
                field: "risk_reward",
                value: self.risk_reward,
            });
        }
        if !(self.stop_buffer_atr_multiple.is_finite() && self.stop_buffer_atr_multiple > 0.0) {
            return Err(ConfigError::OutOfRange {
                field: "stop_buffer_atr_multiple",
                value: self.stop_buffer_atr_multiple,
            });
        }
        Ok(())
    }
}

impl SessionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.windows.is_empty() {
            return Err(ConfigError::InvalidSession {
                name: String::new(),
                reason: "no session windows configured".into(),
            });
        }
        for w in &self.windows {
            if w.start >= w.end {
                return Err(ConfigError::InvalidSession {
                    name: w.name.clone(),
                    reason: format!("start {} is not before end {}", w.start, w.end),
                });
            }
        }
        let mut sorted: Vec<&SessionWindow> = self.windows.iter().collect();
        sorted.sort_by_key(|w| w.start);
        for pair in sorted.windows(2) {
            if pair[1].start < pair[0].end {
                return Err(ConfigError::InvalidSession {
                    name: pair[1].name.clone(),
                    reason: format!("overlaps '{}'", pair[0].name),
                });
            }
        }
        Ok(())
    }
}

impl RiskConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        fraction("risk_per_trade_fraction", self.risk_per_trade_fraction)?;
        fraction("max_daily_loss_fraction", self.max_daily_loss_fraction)?;
        if self.max_trades_per_day == 0 {
            return Err(ConfigError::OutOfRange {
                field: "max_trades_per_day",
                value: 0.0,
            });
        }
        if !(0.0..=1.0).contains(&self.correlation_threshold) {
            return Err(ConfigError::OutOfRange {
                field: "correlation_threshold",
                value: self.correlation_threshold,
            });
        }
        for pair in &self.correlations {
            let reason = if pair.a == pair.b {
                Some("a symbol cannot be paired with itself")
            } else if !(-1.0..=1.0).contains(&pair.coefficient) {
                Some("coefficient outside [-1, 1]")
            } else {
                None
            };
            if let Some(reason) = reason {
                return Err(ConfigError::InvalidCorrelation {
                    a: pair.a.clone(),
                    b: pair.b.clone(),
                    reason: reason.into(),
                });
            }
        }
        if self.max_open_positions == Some(0) {
            return Err(ConfigError::OutOfRange {
                field: "max_open_positions",
                value: 0.0,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = StrategyConfig::default();
        config.validate().unwrap();
        assert_eq!(config.structure.lookback, 20);
        assert_eq!(config.fibonacci.ratios, vec![0.382, 0.5, 0.618]);
        assert_eq!(config.momentum.rsi_period, 14);
        assert_eq!(config.targets.risk_reward, 2.0);
        assert_eq!(config.sessions.windows.len(), 2);
        assert_eq!(config.min_history(), 41);
    }

    #[test]
    fn fingerprint_deterministic_and_param_sensitive() {
        let a = StrategyConfig::default();
        let mut b = a.clone();
        assert_eq!(a.fingerprint(), b.fingerprint());
        b.momentum.oversold = 25.0;
        assert_ne!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn toml_roundtrip_and_partial_override() {
        let text = StrategyConfig::default().to_toml_string().unwrap();
        let parsed = StrategyConfig::from_toml_str(&text).unwrap();
        assert_eq!(parsed, StrategyConfig::default());

        let partial = StrategyConfig::from_toml_str(
            r#"
            [momentum]
            oversold = 25.0

            [risk]
            max_trades_per_day = 5
            "#,
        )
        .unwrap();
        assert_eq!(partial.momentum.oversold, 25.0);
        assert_eq!(partial.momentum.overbought, 70.0);
        assert_eq!(partial.risk.max_trades_per_day, 5);
        assert_eq!(partial.structure.lookback, 20);
    }

    #[test]
    fn rejects_invalid_ratios() {
        let mut c = StrategyConfig::default();
        c.fibonacci.ratios = vec![0.5, 1.2];
        assert!(matches!(c.validate(), Err(ConfigError::InvalidRatios(_))));

        c.fibonacci.ratios = vec![0.5, 0.5];
        assert!(matches!(c.validate(), Err(ConfigError::InvalidRatios(_))));

        c.fibonacci.ratios = vec![];
        assert!(matches!(c.validate(), Err(ConfigError::InvalidRatios(_))));
    }

    #[test]
    fn rejects_inverted_thresholds() {
        let mut c = StrategyConfig::default();
        c.momentum.oversold = 75.0;
        assert!(matches!(c.validate(), Err(ConfigError::InvalidThresholds { .. })));
    }

    #[test]
    fn rejects_non_positive_risk_fractions() {
        let mut c = StrategyConfig::default();
        c.risk.risk_per_trade_fraction = 0.0;
        assert!(matches!(
            c.validate(),
            Err(ConfigError::OutOfRange {
                field: "risk_per_trade_fraction",
                ..
            })
        ));

        let mut c = StrategyConfig::default();
        c.risk.max_daily_loss_fraction = -0.1;
        assert!(c.validate().is_err());
    }

    #[test]
    fn rejects_inverted_and_overlapping_sessions() {
        let mut c = StrategyConfig::default();
        c.sessions.windows = vec![SessionWindow::new("late", hm(16, 0), hm(12, 0))];
        assert!(matches!(c.validate(), Err(ConfigError::InvalidSession { .. })));

        c.sessions.windows = vec![
            SessionWindow::new("london", hm(7, 0), hm(11, 0)),
            SessionWindow::new("overlap", hm(10, 0), hm(13, 0)),
        ];
        let err = c.validate().unwrap_err();
        assert!(err.to_string().contains("overlaps 'london'"));

        // Adjacent windows do not overlap.
        c.sessions.windows = vec![
            SessionWindow::new("a", hm(7, 0), hm(11, 0)),
            SessionWindow::new("b", hm(11, 0), hm(13, 0)),
        ];
        c.validate().unwrap();
    }

    #[test]
    fn rejects_bad_correlations_and_zero_periods() {
        let mut c = StrategyConfig::default();
        c.risk.correlations = vec![CorrelatedPair {
            a: "EURUSD".into(),
            b: "GBPUSD".into(),
            coefficient: 1.5,
        }];
        assert!(matches!(c.validate(), Err(ConfigError::InvalidCorrelation { .. })));

        let mut c = StrategyConfig::default();
        c.momentum.rsi_period = 0;
        assert!(matches!(
            c.validate(),
            Err(ConfigError::ZeroPeriod {
                field: "rsi_period"
            })
        ));
    }

    #[test]
    fn session_window_is_half_open() {
        let w = SessionWindow::new("london", hm(7, 0), hm(11, 0));
        assert!(w.contains(hm(7, 0)));
        assert!(w.contains(hm(10, 59)));
        assert!(!w.contains(hm(11, 0)));
    }

    #[test]
    fn load_reads_file_and_validates() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[momentum]\noversold = 25.0\n").unwrap();
        let config = StrategyConfig::load(file.path()).unwrap();
        assert_eq!(config.momentum.oversold, 25.0);
        assert_eq!(config.momentum.overbought, 70.0);

        let mut bad = tempfile::NamedTempFile::new().unwrap();
        writeln!(bad, "[momentum]\noversold = 80.0\n").unwrap();
        assert!(matches!(
            StrategyConfig::load(bad.path()),
            Err(ConfigError::InvalidThresholds { .. })
        ));

        assert!(matches!(
            StrategyConfig::load(Path::new("/nonexistent/obfib.toml")),
            Err(ConfigError::Io(_))
        ));
    }
}
