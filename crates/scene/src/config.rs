use serde::{Deserialize, Serialize};
use std::path::Path;

/// Errors from loading a scene configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// How a held key turns into an angle delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepMode {
    /// Fixed `rotation_step` per update, regardless of frame time.
    #[default]
    PerFrame,
    /// `angular_speed * dt` per update.
    TimeScaled,
}

/// Orbit camera parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Orbit radius around the origin.
    pub distance: f32,
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Gap kept between pitch and the poles, in radians.
    pub pitch_margin: f32,
    /// Radians per update in `PerFrame` mode.
    pub rotation_step: f32,
    pub step_mode: StepMode,
    /// Radians per second in `TimeScaled` mode.
    pub angular_speed: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            distance: 20.0,
            fov_y_degrees: 45.0,
            near: 0.1,
            far: 100.0,
            pitch_margin: 0.1,
            rotation_step: 0.002,
            step_mode: StepMode::PerFrame,
            angular_speed: 0.12,
        }
    }
}

/// Window the desktop host opens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "wireorbit".into(),
            width: 800,
            height: 600,
        }
    }
}

/// Top-level configuration. Every field has a default, so an empty file is
/// valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub window: WindowConfig,
    /// Background RGBA.
    pub clear_color: [f64; 4],
    pub camera: CameraConfig,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            clear_color: [0.1, 0.1, 0.2, 1.0],
            camera: CameraConfig::default(),
        }
    }
}

impl SceneConfig {
    /// Parse YAML text and validate it.
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let config: SceneConfig = if text.trim().is_empty() {
            SceneConfig::default()
        } else {
            serde_yaml::from_str(text)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_yaml_str(&text)?;
        tracing::info!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let cam = &self.camera;
        let checks = [
            (cam.distance > 0.0, "camera.distance must be positive"),
            (
                cam.fov_y_degrees > 0.0 && cam.fov_y_degrees < 180.0,
                "camera.fov_y_degrees must be in (0, 180)",
            ),
            (
                cam.near > 0.0 && cam.far > cam.near,
                "camera planes must satisfy 0 < near < far",
            ),
            (
                cam.pitch_margin >= 0.0 && cam.pitch_margin < std::f32::consts::FRAC_PI_2,
                "camera.pitch_margin must be in [0, pi/2)",
            ),
            (
                self.window.width > 0 && self.window.height > 0,
                "window size must be non-zero",
            ),
        ];
        match checks.iter().find(|(ok, _)| !ok) {
            Some((_, msg)) => Err(ConfigError::Invalid((*msg).into())),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_reference_scene() {
        let config = SceneConfig::default();
        assert_eq!(config.camera.distance, 20.0);
        assert_eq!(config.camera.fov_y_degrees, 45.0);
        assert_eq!(config.camera.rotation_step, 0.002);
        assert_eq!(config.camera.step_mode, StepMode::PerFrame);
        assert_eq!(config.window.width, 800);
        assert_eq!(config.window.height, 600);
        assert_eq!(config.clear_color, [0.1, 0.1, 0.2, 1.0]);
    }

    #[test]
    fn empty_yaml_is_default() {
        assert_eq!(SceneConfig::from_yaml_str("").unwrap(), SceneConfig::default());
    }

    #[test]
    fn partial_yaml_keeps_other_defaults() {
        let config = SceneConfig::from_yaml_str(
            "camera:\n  distance: 8.5\n  step_mode: time_scaled\n",
        )
        .unwrap();
        assert_eq!(config.camera.distance, 8.5);
        assert_eq!(config.camera.step_mode, StepMode::TimeScaled);
        assert_eq!(config.camera.near, 0.1);
        assert_eq!(config.window.title, "wireorbit");
    }

    #[test]
    fn rejects_bad_planes() {
        let err = SceneConfig::from_yaml_str("camera:\n  near: 5.0\n  far: 1.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_unknown_step_mode() {
        let err = SceneConfig::from_yaml_str("camera:\n  step_mode: warp\n").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "window:\n  title: orbit test\n  width: 1024").unwrap();
        let config = SceneConfig::load(file.path()).unwrap();
        assert_eq!(config.window.title, "orbit test");
        assert_eq!(config.window.width, 1024);
        assert_eq!(config.window.height, 600);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = SceneConfig::load(dir.path().join("missing.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
