//! Session filter — restricts proposals to configured UTC trading windows.

use chrono::{DateTime, TimeZone, Utc};

use crate::config::{SessionConfig, SessionWindow};
use crate::error::ConfigError;

#[derive(Debug, Clone)]
pub struct SessionFilter {
    windows: Vec<SessionWindow>,
}

impl SessionFilter {
    /// Validates the windows (non-empty, start < end, no overlap).
    pub fn new(config: &SessionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            windows: config.windows.clone(),
        })
    }

    /// The window containing `now`, if any. `now` may be in any timezone.
    pub fn active_session<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Option<&SessionWindow> {
        let t = now.with_timezone(&Utc).time();
        self.windows.iter().find(|w| w.contains(t))
    }

    pub fn is_active<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> bool {
        self.active_session(now).is_some()
    }

    pub fn windows(&self) -> &[SessionWindow] {
        &self.windows
    }
}
