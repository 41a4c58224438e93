pub mod config;

pub use config::{AppConfig, DEFAULT_CONFIG_YAML};
