use crate::error::ConfigError;
use crate::telemetry::LogLevel;
use serde::{Deserialize, Serialize};

/// Tuning knobs for a flow controller.
///
/// Every field is optional when deserialised; missing fields take the defaults
/// listed on [`FlowConfig::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[serde(default, rename_all = "camelCase")]
pub struct FlowConfig {
    /// Render every screen regardless of distance from the active one.
    pub render_all_screens: bool,
    /// Ledger size that triggers pruning of the oldest screens.
    pub max_screens: usize,
    /// Fraction of the ledger dropped when `max_screens` is exceeded.
    pub screens_drop_ratio: f64,
    /// End the flow when an operation fails.
    pub end_on_error: bool,
    /// How many ledger positions around the active screen keep a render result.
    pub render_distance: usize,
    pub log_level: LogLevel,
    /// Upper bound on items visited by a single stack walk.
    pub max_walk_steps: usize,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            render_all_screens: false,
            max_screens: 100,
            screens_drop_ratio: 0.3,
            end_on_error: true,
            render_distance: 1,
            log_level: LogLevel::Warning,
            max_walk_steps: 10_000,
        }
    }
}

impl FlowConfig {
    /// Parse a TOML document and validate the result.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: FlowConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_screens == 0 {
            return Err(ConfigError::Invalid("maxScreens must be at least 1".into()));
        }
        if !(self.screens_drop_ratio > 0.0 && self.screens_drop_ratio <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "screensDropRatio must be in (0, 1], got {}",
                self.screens_drop_ratio
            )));
        }
        if self.max_walk_steps == 0 {
            return Err(ConfigError::Invalid(
                "maxWalkSteps must be at least 1".into(),
            ));
        }
        Ok(())
    }

    pub fn with_render_all_screens(mut self, enabled: bool) -> Self {
        self.render_all_screens = enabled;
        self
    }

    pub fn with_max_screens(mut self, max_screens: usize, drop_ratio: f64) -> Self {
        self.max_screens = max_screens;
        self.screens_drop_ratio = drop_ratio;
        self
    }

    pub fn with_end_on_error(mut self, enabled: bool) -> Self {
        self.end_on_error = enabled;
        self
    }

    pub fn with_render_distance(mut self, distance: usize) -> Self {
        self.render_distance = distance;
        self
    }

    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.log_level = level;
        self
    }

    pub fn with_max_walk_steps(mut self, steps: usize) -> Self {
        self.max_walk_steps = steps;
        self
    }

    /// Whether a screen `distance` positions from the active one gets rendered.
    pub fn within_render_distance(&self, distance: usize) -> bool {
        self.render_all_screens || distance <= self.render_distance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FlowConfig::default();
        assert_eq!(config.max_screens, 100);
        assert_eq!(config.render_distance, 1);
        assert!(config.end_on_error);
        assert!(!config.render_all_screens);
        assert_eq!(config.log_level, LogLevel::Warning);
    }

    #[test]
    fn test_from_toml_partial() {
        let config = FlowConfig::from_toml_str(
            r#"
            renderDistance = 2
            endOnError = false
            logLevel = "debug"
            "#,
        )
        .unwrap();

        assert_eq!(config.render_distance, 2);
        assert!(!config.end_on_error);
        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(config.max_screens, 100);
    }

    #[test]
    fn test_rejects_bad_ratio() {
        let err = FlowConfig::from_toml_str("screensDropRatio = 1.5").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_rejects_malformed_toml() {
        let err = FlowConfig::from_toml_str("maxScreens = \"many\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_render_distance_window() {
        let config = FlowConfig::default();
        assert!(config.within_render_distance(1));
        assert!(!config.within_render_distance(2));
        assert!(config.with_render_all_screens(true).within_render_distance(50));
    }
}
