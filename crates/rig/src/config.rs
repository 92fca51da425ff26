use serde::{Deserialize, Serialize};
use std::path::Path;
use thirdperson_camera::CameraConfig;
use thirdperson_common::InvalidParam;
use thirdperson_input::{ActionMap, InputError};
use thirdperson_kernel::CharacterBody;
use thirdperson_locomotion::LocomotionConfig;

/// Errors from loading or validating a rig config.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("locomotion config: {0}")]
    Locomotion(#[source] InvalidParam),
    #[error("camera config: {0}")]
    Camera(#[source] InvalidParam),
    #[error("body config: {0}")]
    Body(#[source] InvalidParam),
    #[error("input config: {0}")]
    Input(#[from] InputError),
    #[error("unsupported config format `{0}` (expected yaml, yml or json)")]
    UnsupportedFormat(String),
}

/// Everything needed to stand up one player and its camera.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RigConfig {
    pub locomotion: LocomotionConfig,
    pub camera: CameraConfig,
    /// Capsule handed to the reference scene when spawning the player.
    pub body: CharacterBody,
    pub input: ActionMap,
}

impl RigConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.locomotion.validate().map_err(ConfigError::Locomotion)?;
        self.camera.validate().map_err(ConfigError::Camera)?;
        validate_body(&self.body).map_err(ConfigError::Body)?;
        self.input.validate()?;
        Ok(())
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml_string(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Load by extension: `.yaml`/`.yml` or `.json`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        if !matches!(ext.as_str(), "yaml" | "yml" | "json") {
            return Err(ConfigError::UnsupportedFormat(ext));
        }
        let text = std::fs::read_to_string(path)?;
        let config = if ext == "json" {
            Self::from_json_str(&text)?
        } else {
            Self::from_yaml_str(&text)?
        };
        tracing::info!(path = %path.display(), "rig config loaded");
        Ok(config)
    }
}

fn validate_body(body: &CharacterBody) -> Result<(), InvalidParam> {
    use thirdperson_common::error::{ensure_finite, ensure_positive};

    ensure_positive("radius", body.radius)?;
    ensure_positive("height", body.height)?;
    if body.height < body.radius * 2.0 {
        return Err(InvalidParam::new(
            "height",
            "must be at least twice the radius",
        ));
    }
    ensure_finite("skin_width", body.skin_width)?;
    if body.skin_width < 0.0 {
        return Err(InvalidParam::new("skin_width", "must not be negative"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use thirdperson_input::ActionName;

    #[test]
    fn defaults_validate() {
        assert!(RigConfig::default().validate().is_ok());
    }

    #[test]
    fn yaml_roundtrip_preserves_everything() {
        let mut config = RigConfig::default();
        config.locomotion.run_speed = 11.0;
        config.camera.invert_y = true;
        let text = config.to_yaml_string().unwrap();
        assert_eq!(RigConfig::from_yaml_str(&text).unwrap(), config);
    }

    #[test]
    fn partial_yaml_fills_defaults() {
        let config = RigConfig::from_yaml_str("locomotion:\n  walk_speed: 3.5\n").unwrap();
        assert_eq!(config.locomotion.walk_speed, 3.5);
        assert_eq!(config.locomotion.run_speed, 8.0);
        assert_eq!(config.camera, CameraConfig::default());
    }

    #[test]
    fn partial_body_and_input_sections_fill_defaults() {
        let config = RigConfig::from_yaml_str("body:\n  radius: 0.4\n").unwrap();
        let defaults = CharacterBody::default();
        assert_eq!(config.body.radius, 0.4);
        assert_eq!(config.body.height, defaults.height);
        assert_eq!(config.body.skin_width, defaults.skin_width);

        let config = RigConfig::from_yaml_str("input:\n  name: Custom\n").unwrap();
        assert_eq!(config.input.name, "Custom");
        assert_eq!(config.input.actions, ActionMap::player_default().actions);
    }

    #[test]
    fn json_partial_config() {
        let config = RigConfig::from_json_str(r#"{"camera": {"distance": 7.0}}"#).unwrap();
        assert_eq!(config.camera.distance, 7.0);
    }

    #[test]
    fn invalid_values_are_reported_per_section() {
        let err = RigConfig::from_yaml_str("locomotion:\n  gravity: 3.0\n").unwrap_err();
        let ConfigError::Locomotion(param) = err else {
            panic!("expected a locomotion error");
        };
        assert_eq!(param.field, "gravity");

        let text = "camera:\n  min_pitch: 50\n  max_pitch: 10\n";
        let err = RigConfig::from_yaml_str(text).unwrap_err();
        assert!(matches!(err, ConfigError::Camera(_)));

        let err = RigConfig::from_yaml_str("body:\n  radius: 1.0\n  height: 1.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Body(_)));
    }

    #[test]
    fn empty_binding_list_rejected() {
        let mut config = RigConfig::default();
        config.input.actions.insert(ActionName::Jump, Vec::new());
        let Err(ConfigError::Input(InputError::EmptyBindings(action))) = config.validate() else {
            panic!("expected an empty binding error");
        };
        assert_eq!(action, ActionName::Jump);
    }

    #[test]
    fn load_by_extension() {
        let dir = tempfile::tempdir().unwrap();

        let yaml = dir.path().join("rig.yaml");
        std::fs::write(&yaml, "camera:\n  height: 1.6\n").unwrap();
        assert_eq!(RigConfig::load(&yaml).unwrap().camera.height, 1.6);

        let json = dir.path().join("rig.JSON");
        std::fs::write(&json, r#"{"locomotion": {"jump_height": 2.0}}"#).unwrap();
        assert_eq!(RigConfig::load(&json).unwrap().locomotion.jump_height, 2.0);

        let toml = dir.path().join("rig.toml");
        std::fs::write(&toml, "").unwrap();
        assert!(matches!(
            RigConfig::load(&toml),
            Err(ConfigError::UnsupportedFormat(ref e)) if e == "toml"
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            RigConfig::load(dir.path().join("absent.yml")),
            Err(ConfigError::Io(_))
        ));
    }
}
