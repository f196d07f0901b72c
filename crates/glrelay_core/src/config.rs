//! # Relay Configuration
//!
//! Loaded once at startup, usually from a TOML table:
//!
//! ```toml
//! batch_capacity_hint = 128
//! blocking_timeout_ms = 2000
//! log_drains = false
//! ```

use std::time::Duration;

use serde::Deserialize;

use crate::error::{RelayError, RelayResult};

/// Tuning knobs for a relay.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RelayConfig {
    /// Initial capacity of each fresh pending batch.
    pub batch_capacity_hint: usize,
    /// Upper bound for `run_blocking_timeout`. `None` waits forever.
    pub blocking_timeout_ms: Option<u64>,
    /// Emit a debug event for every non-empty drain.
    pub log_drains: bool,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            batch_capacity_hint: 64,
            blocking_timeout_ms: None,
            log_drains: true,
        }
    }
}

impl RelayConfig {
    /// Parses and validates a config from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::InvalidConfig`] if the text is not valid TOML,
    /// contains unknown keys, or fails validation.
    pub fn from_toml_str(text: &str) -> RelayResult<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| RelayError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::InvalidConfig`] for a zero capacity hint or a
    /// zero timeout.
    pub fn validate(&self) -> RelayResult<()> {
        if self.batch_capacity_hint == 0 {
            return Err(RelayError::InvalidConfig(
                "batch_capacity_hint must be greater than zero".to_string(),
            ));
        }
        if self.blocking_timeout_ms == Some(0) {
            return Err(RelayError::InvalidConfig(
                "blocking_timeout_ms must be greater than zero when set".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns the blocking timeout as a `Duration`, if one is configured.
    #[inline]
    #[must_use]
    pub fn blocking_timeout(&self) -> Option<Duration> {
        self.blocking_timeout_ms.map(Duration::from_millis)
    }
}
