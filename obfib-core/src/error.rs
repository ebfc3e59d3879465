//! Error types for the analysis and configuration layers.
//!
//! Absence of a setup and risk rejections are not errors; they are
//! `Analysis::NoSignal` and `RiskDecision::Reject` values.

use thiserror::Error;

/// Errors raised on malformed or insufficient price input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    #[error("insufficient data: {0}")]
    InsufficientData(String),

    #[error("malformed bar at index {index}: {reason}")]
    MalformedBar { index: usize, reason: String },

    #[error("timestamps not strictly increasing at index {index}")]
    UnorderedTimestamps { index: usize },
}

/// Errors raised while loading or validating a `StrategyConfig`.
///
/// All of these surface at configuration-load time, before any analysis call.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid fibonacci ratios: {0}")]
    InvalidRatios(String),

    #[error("invalid momentum thresholds: oversold={oversold}, overbought={overbought}")]
    InvalidThresholds { oversold: f64, overbought: f64 },

    #[error("{field} must be >= 1")]
    ZeroPeriod { field: &'static str },

    #[error("{field} out of range: {value}")]
    OutOfRange { field: &'static str, value: f64 },

    #[error("invalid session window '{name}': {reason}")]
    InvalidSession { name: String, reason: String },

    #[error("invalid correlation entry {a}/{b}: {reason}")]
    InvalidCorrelation { a: String, b: String, reason: String },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analysis_error_messages() {
        let err = AnalysisError::MalformedBar {
            index: 3,
            reason: "high below low".into(),
        };
        assert_eq!(err.to_string(), "malformed bar at index 3: high below low");

        let err = AnalysisError::UnorderedTimestamps { index: 7 };
        assert!(err.to_string().contains("index 7"));
    }

    #[test]
    fn config_error_messages() {
        let err = ConfigError::ZeroPeriod { field: "rsi_period" };
        assert_eq!(err.to_string(), "rsi_period must be >= 1");
    }
}
