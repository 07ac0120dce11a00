//! Service configuration and store resolution.
//!
//! Configuration is loaded from a TOML file (or the bundled `floatad.toml`)
//! and merged with environment variables prefixed with `FLOATAD__`. For
//! example, `FLOATAD__STORE__PATH` overrides `store.path`.

use std::fs;
use std::path::{Path, PathBuf};

use floatad_common::ad_settings::RawSettings;
use floatad_common::config_store::FileStore;
use floatad_common::settings::Settings;
use serde_json::Value;

use crate::error::CliError;

/// Load and merge configuration with environment variables.
pub(crate) fn load_settings(file: Option<&Path>) -> Result<Settings, CliError> {
    let settings = match file {
        Some(file) => {
            let content = fs::read_to_string(file)?;
            Settings::from_toml(&content)
        }
        None => Settings::new(),
    };

    settings.map_err(|e| CliError::Config(format!("Failed to load configuration: {e:?}")))
}

/// The file store named on the command line, or the configured one.
pub(crate) fn open_store(settings: &Settings, store: Option<PathBuf>) -> FileStore {
    FileStore::new(store.unwrap_or_else(|| PathBuf::from(&settings.store.path)))
}

/// Reads a JSON object holding an unsanitized settings record.
pub(crate) fn read_raw_settings(file: &Path) -> Result<RawSettings, CliError> {
    let content = fs::read_to_string(file)?;
    match serde_json::from_str::<Value>(&content)? {
        Value::Object(raw) => Ok(raw),
        _ => Err(CliError::Input(format!(
            "'{}' does not hold a JSON object",
            file.display()
        ))),
    }
}
