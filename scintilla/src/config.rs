//! Scintilla host configuration that extends the base `Config` from core.
//!
//! This configuration includes:
//! - All tracker options from `caretfix_core::Config` (flattened via serde)
//! - The parent-chain depth limit used when locating compositions
//! - How the simulated host produces its own default caret feedback
//!
//! # Example
//!
//! ```rust
//! use caretfix_scintilla::ScintillaConfig;
//!
//! let config = ScintillaConfig::default();
//! assert_eq!(config.base().class_marker, "Scintilla");
//! ```

use serde::{Deserialize, Serialize};

use caretfix_core::{CaretError, Config};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ScintillaConfig {
    /// Upper bound on parent hops when looking for a composition
    pub max_parent_depth: usize,

    // Simulated host behaviour
    /// Latency of the host's own caret feedback after a step key
    pub default_feedback_latency_ms: u64,
    /// What the host says for a caret it cannot read inside a composition
    pub default_feedback_text: String,

    /// Base tracker configuration (class marker, delays, step keys, ...).
    /// Kept last so its `[step_keys]` table serializes after plain values.
    #[serde(flatten)]
    pub base: Config,
}

impl Default for ScintillaConfig {
    fn default() -> Self {
        Self {
            max_parent_depth: 32,
            default_feedback_latency_ms: 25,
            default_feedback_text: "blank".to_string(),
            base: Config::default(),
        }
    }
}

impl ScintillaConfig {
    /// Convert into the base config for `CaretTracker::new()`
    pub fn into_base(self) -> Config {
        self.base
    }

    pub fn base(&self) -> &Config {
        &self.base
    }

    pub fn base_mut(&mut self) -> &mut Config {
        &mut self.base
    }

    pub fn load_toml<P: AsRef<std::path::Path>>(path: P) -> Result<Self, CaretError> {
        let content = std::fs::read_to_string(path)?;
        let config: ScintillaConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    pub fn validate(&self) -> Result<(), CaretError> {
        self.base.validate()?;
        if self.max_parent_depth == 0 {
            return Err(CaretError::InvalidConfig(
                "max_parent_depth must be greater than zero".to_string(),
            ));
        }
        if self.default_feedback_latency_ms >= self.base.announce_delay_ms {
            tracing::warn!(
                host_latency_ms = self.default_feedback_latency_ms,
                announce_delay_ms = self.base.announce_delay_ms,
                "announcements will not outlast the host's own feedback"
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flattened_fields() {
        let toml = r#"
            class_marker = "Scintilla"
            announce_delay_ms = 180
            max_parent_depth = 8

            [step_keys]
            left_key_name = "numpad4"
        "#;
        let config: ScintillaConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.base.announce_delay_ms, 180);
        assert_eq!(config.base.poll_interval_ms, 50);
        assert_eq!(config.base.step_keys.left_key_name, "numpad4");
        assert_eq!(config.max_parent_depth, 8);
        assert_eq!(config.default_feedback_text, "blank");
    }

    #[test]
    fn test_round_trip_through_toml() {
        let config = ScintillaConfig::default();
        let text = config.to_toml_string().unwrap();
        let parsed: ScintillaConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_zero_depth_rejected() {
        let config = ScintillaConfig {
            max_parent_depth: 0,
            ..ScintillaConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
