//! Hash computation for ad settings.

use std::fs;
use std::path::Path;

use floatad_common::config_store::{
    canonical_json, compute_settings_hash, load_ad_settings, FileStore,
};

use crate::error::CliError;
use crate::HashFormat;

/// Compute SHA-256 hash of a file as-is.
///
/// Line endings are normalized to LF for consistent hashing across platforms.
pub fn compute_file_hash(path: &Path) -> Result<String, CliError> {
    let content = fs::read_to_string(path)?;
    Ok(compute_settings_hash(&content))
}

/// Hash of the effective settings, or of the raw store file with `raw`.
pub fn compute_and_format(
    store: &FileStore,
    format: HashFormat,
    raw: bool,
) -> Result<String, CliError> {
    let hash = if raw {
        compute_file_hash(store.path())?
    } else {
        let settings =
            load_ad_settings(store).map_err(|e| CliError::Store(format!("{e:?}")))?;
        compute_settings_hash(&canonical_json(&settings))
    };

    Ok(match format {
        HashFormat::Text => hash,
        HashFormat::Json => {
            let output = serde_json::json!({
                "file": store.path().display().to_string(),
                "hash": hash,
                "algorithm": "sha256"
            });
            serde_json::to_string_pretty(&output)?
        }
    })
}
