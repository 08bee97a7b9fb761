//! Configuration system

pub use serde::{Deserialize, Serialize};

use crate::rhi::Size2D;

/// Configuration trait with format-by-extension loading
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;

        if path.ends_with(".toml") {
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else if path.ends_with(".ron") {
            ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            Err(ConfigError::UnsupportedFormat(path.to_string()))
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = if path.ends_with(".toml") {
            toml::to_string(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else if path.ends_with(".ron") {
            ron::ser::to_string_pretty(self, Default::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Tunables for RHI construction
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct RhiSettings {
    /// How many frames the CPU may record ahead of the GPU
    pub frames_in_flight: u32,
    /// Back buffer count requested from the presentation engine
    pub swapchain_images: u32,
    /// Enable the validation layer (honored in debug builds)
    pub enable_validation: bool,
    /// Application name reported to the native API
    pub app_name: String,
    /// Surface extent used by the headless backend, which has no window
    pub headless_extent: Size2D,
}

impl Default for RhiSettings {
    fn default() -> Self {
        Self {
            frames_in_flight: 2,
            swapchain_images: 2,
            enable_validation: cfg!(debug_assertions),
            app_name: "prism".to_string(),
            headless_extent: Size2D::new(1280, 720),
        }
    }
}

impl Config for RhiSettings {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_toml_round_trip() {
        let mut settings = RhiSettings::default();
        settings.frames_in_flight = 3;
        settings.app_name = "round-trip".to_string();

        let text = toml::to_string(&settings).unwrap();
        let parsed: RhiSettings = toml::from_str(&text).unwrap();
        assert_eq!(parsed.frames_in_flight, 3);
        assert_eq!(parsed.app_name, "round-trip");
        assert_eq!(parsed.swapchain_images, settings.swapchain_images);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let parsed: RhiSettings = toml::from_str("frames_in_flight = 4").unwrap();
        assert_eq!(parsed.frames_in_flight, 4);
        assert_eq!(parsed.swapchain_images, RhiSettings::default().swapchain_images);
    }

    #[test]
    fn test_unknown_extension_is_rejected() {
        let path = std::env::temp_dir().join("prism_rhi_settings.yaml");
        std::fs::write(&path, "frames_in_flight: 2").unwrap();
        let err = RhiSettings::load_from_file(path.to_str().unwrap()).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat(_)));
        let _ = std::fs::remove_file(&path);
    }
}
