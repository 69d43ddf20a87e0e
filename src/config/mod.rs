//! Configuration module for searchlight
//!
//! Handles loading settings from YAML files and environment variables.

mod settings;

pub use settings::*;

use anyhow::Result;
use once_cell::sync::OnceCell;
use std::path::Path;

/// Global settings instance
static SETTINGS: OnceCell<Settings> = OnceCell::new();

/// Initialize global settings from a file
pub fn init_from_file<P: AsRef<Path>>(path: P) -> Result<()> {
    let mut settings = Settings::from_file(path)?;
    settings.merge_env();
    init(settings)
}

/// Initialize global settings with defaults
pub fn init_default() -> Result<()> {
    let mut settings = Settings::default();
    settings.merge_env();
    init(settings)
}

/// Install an already-built settings value
pub fn init(settings: Settings) -> Result<()> {
    SETTINGS
        .set(settings)
        .map_err(|_| anyhow::anyhow!("Settings already initialized"))?;
    Ok(())
}

/// Get a reference to the global settings
pub fn get() -> Option<&'static Settings> {
    SETTINGS.get()
}

/// Check if settings have been initialized
pub fn is_initialized() -> bool {
    SETTINGS.get().is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_settings_initialize_once() {
        let mut settings = Settings::default();
        settings.search.default_indices = vec!["logs".to_string()];

        init(settings).unwrap();
        assert!(is_initialized());
        assert_eq!(get().unwrap().search.default_indices, ["logs"]);

        assert!(init_default().is_err());
    }
}
