//! Ad settings management commands.
//!
//! Every record written to the store goes through the sanitizer first; the
//! commands print the canonical JSON that results.

use std::path::Path;

use floatad_common::ad_settings::sanitize;
use floatad_common::config_store::{
    activate, canonical_json, compute_settings_hash, load_ad_settings, save_ad_settings,
    uninstall, AdSettingsStore, FileStore,
};

use crate::config::read_raw_settings;
use crate::error::CliError;

fn store_error(e: impl std::fmt::Debug) -> CliError {
    CliError::Store(format!("{e:?}"))
}

/// Sanitizes a settings file without touching the store.
pub fn sanitize_file(file: &Path) -> Result<String, CliError> {
    let raw = read_raw_settings(file)?;
    Ok(canonical_json(&sanitize(&raw)))
}

/// Sanitizes a settings file and writes it to the store.
pub fn push(
    store: &FileStore,
    file: &Path,
    dry_run: bool,
    verbose: bool,
) -> Result<String, CliError> {
    let raw = read_raw_settings(file)?;

    if dry_run {
        let settings = sanitize(&raw);
        let json = canonical_json(&settings);
        let mut output = format!(
            "[Dry Run] Would write to '{}':\n{}",
            store.path().display(),
            json
        );
        if verbose {
            output.push_str(&format!("\nHash: {}", compute_settings_hash(&json)));
        }
        return Ok(output);
    }

    let settings = save_ad_settings(store, &raw).map_err(store_error)?;
    Ok(canonical_json(&settings))
}

/// The effective settings, defaults included when nothing is stored.
pub fn show(store: &FileStore) -> Result<String, CliError> {
    let settings = load_ad_settings(store).map_err(store_error)?;
    Ok(canonical_json(&settings))
}

/// Seeds default settings into an empty store.
pub fn init(store: &FileStore) -> Result<String, CliError> {
    let seeded = activate(store).map_err(store_error)?;
    Ok(if seeded {
        format!("Seeded default settings into '{}'", store.path().display())
    } else {
        format!("Settings already present in '{}'", store.path().display())
    })
}

/// Removes the stored settings.
pub fn delete(store: &FileStore) -> Result<String, CliError> {
    let existed = store.get().map_err(store_error)?.is_some();
    uninstall(store).map_err(store_error)?;
    Ok(if existed {
        format!("Removed settings from '{}'", store.path().display())
    } else {
        format!("No settings stored in '{}'", store.path().display())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    use floatad_common::ad_settings::{AdSettings, AdType};

    fn write_settings(dir: &Path, json: &str) -> std::path::PathBuf {
        let path = dir.join("ad.json");
        fs::write(&path, json).unwrap();
        path
    }

    #[test]
    fn test_sanitize_file_prints_canonical_record() {
        let dir = tempfile::tempdir().unwrap();
        let file = write_settings(
            dir.path(),
            r#"{"ad_type": "flash", "ad_width": "-5px", "ad_height": "0", "position_x": "top: 3px;"}"#,
        );

        let json = sanitize_file(&file).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["ad_type"], "image");
        assert_eq!(value["ad_width"], 5);
        assert_eq!(value["ad_height"], 1);
        assert_eq!(value["position_x"], "right: 15px;");
    }

    #[test]
    fn test_push_writes_sanitized_record() {
        let dir = tempfile::tempdir().unwrap();
        let file = write_settings(dir.path(), r#"{"ad_type": "lottie", "enabled": "0"}"#);
        let store = FileStore::new(dir.path().join("store.json"));

        let dry = push(&store, &file, true, true).unwrap();
        assert!(dry.starts_with("[Dry Run]"));
        assert!(dry.contains("Hash: sha256:"));
        assert!(store.get().unwrap().is_none());

        push(&store, &file, false, false).unwrap();
        let stored = load_ad_settings(&store).unwrap();
        assert_eq!(stored.ad_type, AdType::Lottie);
        assert!(!stored.enabled);
        assert_eq!(show(&store).unwrap(), canonical_json(&stored));
    }

    #[test]
    fn test_init_and_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("store.json"));

        assert_eq!(show(&store).unwrap(), canonical_json(&AdSettings::default()));
        assert!(init(&store).unwrap().starts_with("Seeded"));
        assert!(init(&store).unwrap().starts_with("Settings already present"));

        assert!(delete(&store).unwrap().starts_with("Removed"));
        assert!(delete(&store).unwrap().starts_with("No settings stored"));
    }
}
