//! # Context Configuration
//!
//! ```toml
//! headless_viewport = [0, 0, 300, 150]
//! clear_color = [0.0, 0.0, 0.0, 0.0]
//! clear_depth = 1.0
//! clear_stencil = 0
//!
//! [relay]
//! batch_capacity_hint = 64
//! blocking_timeout_ms = 5000
//! ```

use serde::Deserialize;

use glrelay_core::{RelayConfig, RelayError};

use crate::error::ContextResult;

/// Values applied by the baseline batch, plus the relay tuning.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContextConfig {
    /// `[x, y, width, height]` set when there is no default drawable.
    pub headless_viewport: [i32; 4],
    /// Initial clear color (RGBA).
    pub clear_color: [f32; 4],
    /// Initial depth clear value.
    pub clear_depth: f32,
    /// Initial stencil clear value.
    pub clear_stencil: i32,
    /// Relay tuning.
    pub relay: RelayConfig,
}

impl Default for ContextConfig {
    fn default() -> Self {
        // Same initial state a freshly created WebGL context reports.
        Self {
            headless_viewport: [0, 0, 300, 150],
            clear_color: [0.0; 4],
            clear_depth: 1.0,
            clear_stencil: 0,
            relay: RelayConfig::default(),
        }
    }
}

impl ContextConfig {
    /// Parses and validates a config from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::InvalidConfig`] (wrapped) for malformed TOML,
    /// unknown keys, or out-of-range values.
    pub fn from_toml_str(text: &str) -> ContextResult<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| RelayError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::InvalidConfig`] (wrapped) for a negative viewport
    /// size, a depth outside `[0, 1]`, or an invalid relay section.
    pub fn validate(&self) -> ContextResult<()> {
        let [_, _, width, height] = self.headless_viewport;
        if width < 0 || height < 0 {
            return Err(RelayError::InvalidConfig(format!(
                "headless_viewport size must be non-negative, got {width}x{height}"
            ))
            .into());
        }
        if !(0.0..=1.0).contains(&self.clear_depth) {
            return Err(RelayError::InvalidConfig(format!(
                "clear_depth must be within [0, 1], got {}",
                self.clear_depth
            ))
            .into());
        }
        self.relay.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ContextError;

    #[test]
    fn test_defaults_match_webgl_initial_state() {
        let config = ContextConfig::default();
        assert_eq!(config.headless_viewport, [0, 0, 300, 150]);
        assert_eq!(config.clear_color, [0.0; 4]);
        assert!((config.clear_depth - 1.0).abs() < f32::EPSILON);
        assert_eq!(config.clear_stencil, 0);
    }

    #[test]
    fn test_parse_with_nested_relay() {
        let config = ContextConfig::from_toml_str(
            "headless_viewport = [0, 0, 640, 480]\n\n[relay]\nblocking_timeout_ms = 250\n",
        )
        .unwrap();

        assert_eq!(config.headless_viewport, [0, 0, 640, 480]);
        assert_eq!(config.relay.blocking_timeout_ms, Some(250));
        assert_eq!(config.relay.batch_capacity_hint, 64);
    }

    #[test]
    fn test_rejects_negative_viewport() {
        let err = ContextConfig::from_toml_str("headless_viewport = [0, 0, -1, 150]").unwrap_err();
        assert!(matches!(err, ContextError::Relay(RelayError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_bad_relay_section() {
        let err = ContextConfig::from_toml_str("[relay]\nbatch_capacity_hint = 0\n").unwrap_err();
        assert!(matches!(err, ContextError::Relay(RelayError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_depth_out_of_range() {
        assert!(ContextConfig::from_toml_str("clear_depth = 2.0").is_err());
    }
}
