use serde::{Deserialize, Serialize};
use std::path::Path;

/// Errors from loading a locomotion configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid value for `{field}`: {value}")]
    Invalid { field: &'static str, value: f32 },
}

/// Tunables for both locomotion modes. Every field is optional in YAML.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocomotionConfig {
    /// Velocity damping rate, per second.
    pub friction: f32,
    /// Walking speed in units per second.
    pub walk_speed: f32,
    /// Speed factor applied while the run modifier is held.
    pub run_multiplier: f32,
    /// Camera height pinned after every desktop frame.
    pub eye_height: f32,
    /// Glide speed while the XR trigger is held, units per second.
    pub vr_speed: f32,
}

impl Default for LocomotionConfig {
    fn default() -> Self {
        Self {
            friction: 10.0,
            walk_speed: 5.0,
            run_multiplier: 2.5,
            eye_height: 1.6,
            vr_speed: 3.0,
        }
    }
}

impl LocomotionConfig {
    /// Read and validate a YAML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_yaml_str(&text)?;
        tracing::debug!(path = %path.display(), ?config, "loaded locomotion config");
        Ok(config)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject negative or non-finite tunables.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("friction", self.friction),
            ("walk_speed", self.walk_speed),
            ("run_multiplier", self.run_multiplier),
            ("eye_height", self.eye_height),
            ("vr_speed", self.vr_speed),
        ];
        for (field, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid { field, value });
            }
        }
        Ok(())
    }

    /// Scalar speed for the current run state.
    pub fn speed(&self, running: bool) -> f32 {
        if running {
            self.walk_speed * self.run_multiplier
        } else {
            self.walk_speed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults() {
        let c = LocomotionConfig::default();
        assert_eq!(c.friction, 10.0);
        assert_eq!(c.walk_speed, 5.0);
        assert_eq!(c.run_multiplier, 2.5);
        assert_eq!(c.eye_height, 1.6);
        assert_eq!(c.vr_speed, 3.0);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn speed_selection() {
        let c = LocomotionConfig::default();
        assert_eq!(c.speed(false), 5.0);
        assert_eq!(c.speed(true), 12.5);
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let c = LocomotionConfig::from_yaml_str("walk_speed: 7.5\n").unwrap();
        assert_eq!(c.walk_speed, 7.5);
        assert_eq!(c.friction, 10.0);
        assert_eq!(c.eye_height, 1.6);
    }

    #[test]
    fn empty_mapping_is_default() {
        let c = LocomotionConfig::from_yaml_str("{}").unwrap();
        assert_eq!(c, LocomotionConfig::default());
    }

    #[test]
    fn negative_value_rejected() {
        let err = LocomotionConfig::from_yaml_str("friction: -1.0").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "friction",
                ..
            }
        ));
    }

    #[test]
    fn non_finite_rejected() {
        let c = LocomotionConfig {
            vr_speed: f32::NAN,
            ..LocomotionConfig::default()
        };
        assert!(matches!(
            c.validate(),
            Err(ConfigError::Invalid {
                field: "vr_speed",
                ..
            })
        ));
    }

    #[test]
    fn malformed_yaml_is_yaml_error() {
        let err = LocomotionConfig::from_yaml_str("walk_speed: [fast]").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "run_multiplier: 3.0\nvr_speed: 1.5").unwrap();

        let c = LocomotionConfig::load(file.path()).unwrap();
        assert_eq!(c.run_multiplier, 3.0);
        assert_eq!(c.vr_speed, 1.5);
        assert_eq!(c.walk_speed, 5.0);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = LocomotionConfig::load(dir.path().join("absent.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
