use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::WorldError;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct WorldSettings {
    /// 0 derives a seed from the current time.
    pub seed: u32,
    pub render_radius: i32,
    pub load_radius: i32,
    pub unload_distance: i32,
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self {
            seed: 0,
            render_radius: RENDER_RADIUS,
            load_radius: LOAD_RADIUS,
            unload_distance: UNLOAD_DISTANCE,
        }
    }
}

impl WorldSettings {
    pub fn load(path: &Path) -> Result<Self, WorldError> {
        let text = fs::read_to_string(path).map_err(|source| WorldError::SettingsIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self, WorldError> {
        let settings: WorldSettings = toml::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Radii must be non-negative and chunks must not unload inside the load radius.
    pub fn validate(&self) -> Result<(), WorldError> {
        if self.render_radius < 0 || self.load_radius < 0 {
            return Err(WorldError::InvalidSettings(
                "radii must be non-negative".to_string(),
            ));
        }
        if self.load_radius > MAX_STREAM_RADIUS {
            return Err(WorldError::InvalidSettings(format!(
                "load_radius {} exceeds the maximum of {MAX_STREAM_RADIUS}",
                self.load_radius
            )));
        }
        if self.unload_distance < self.load_radius {
            return Err(WorldError::InvalidSettings(format!(
                "unload_distance {} is inside load_radius {}",
                self.unload_distance, self.load_radius
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_constants() {
        let settings = WorldSettings::default();
        assert_eq!(settings.load_radius, LOAD_RADIUS);
        assert_eq!(settings.unload_distance, UNLOAD_DISTANCE);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let settings = WorldSettings::from_toml("seed = 42\nload_radius = 3\n").unwrap();
        assert_eq!(settings.seed, 42);
        assert_eq!(settings.load_radius, 3);
        assert_eq!(settings.render_radius, RENDER_RADIUS);
    }

    #[test]
    fn rejects_unload_inside_load() {
        let err = WorldSettings::from_toml("load_radius = 8\nunload_distance = 4\n").unwrap_err();
        assert!(matches!(err, WorldError::InvalidSettings(_)));
    }

    #[test]
    fn rejects_oversized_load_radius() {
        let toml = format!(
            "load_radius = {}\nunload_distance = {}\n",
            MAX_STREAM_RADIUS + 1,
            i32::MAX
        );
        let err = WorldSettings::from_toml(&toml).unwrap_err();
        assert!(matches!(err, WorldError::InvalidSettings(_)));
    }

    #[test]
    fn rejects_malformed_toml() {
        let err = WorldSettings::from_toml("seed = \"abc\"").unwrap_err();
        assert!(matches!(err, WorldError::SettingsParse(_)));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = WorldSettings::load(Path::new("/nonexistent/world.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/world.toml"));
    }
}
