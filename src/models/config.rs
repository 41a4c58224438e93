use photo_tone::Settings;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration written by `photoglow init`.
pub const DEFAULT_CONFIG_YAML: &str = include_str!("../../config.yaml");

/// Application configuration loaded from config.yaml
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct AppConfig {
    /// Longest side after decoding; larger images are downscaled
    #[serde(default = "default_max_dimension")]
    pub max_dimension: u32,

    /// Largest accepted upload in bytes
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,

    /// Re-compress output PNGs with oxipng (smaller files, slower)
    #[serde(default)]
    pub optimize_png: bool,

    /// Appended to the input file stem for the download name
    #[serde(default = "default_output_suffix")]
    pub output_suffix: String,

    /// Slider values used when a request names no preset
    #[serde(default)]
    pub defaults: Settings,
}

fn default_max_dimension() -> u32 {
    1600
}

fn default_max_upload_bytes() -> usize {
    25 * 1024 * 1024 // 25 MiB
}

fn default_output_suffix() -> String {
    "-enhanced".to_string()
}

impl AppConfig {
    /// Load configuration from a YAML file, falling back to defaults.
    ///
    /// A missing path, unreadable file or invalid YAML never aborts
    /// startup; the problem is logged and defaults are used.
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            tracing::debug!("No config file configured, using defaults");
            return Self::default();
        };

        match std::fs::read_to_string(path) {
            Ok(content) => match Self::from_yaml(&content) {
                Ok(config) => {
                    tracing::info!(
                        path = %path.display(),
                        max_dimension = config.max_dimension,
                        optimize_png = config.optimize_png,
                        "Loaded configuration"
                    );
                    config
                }
                Err(e) => {
                    tracing::warn!(%e, path = %path.display(), "Failed to parse config, using defaults");
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!(%e, path = %path.display(), "Failed to read config, using defaults");
                Self::default()
            }
        }
    }

    /// Parse configuration from YAML text.
    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        let mut config: Self = serde_yaml::from_str(content)?;
        if config.max_dimension == 0 {
            tracing::warn!("max_dimension must be positive, using 1600");
            config.max_dimension = default_max_dimension();
        }
        Ok(config)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            max_dimension: default_max_dimension(),
            max_upload_bytes: default_max_upload_bytes(),
            optimize_png: false,
            output_suffix: default_output_suffix(),
            defaults: Settings::default(),
        }
    }
}
