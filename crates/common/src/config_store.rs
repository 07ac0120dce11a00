//! Storage for the ad settings record.
//!
//! The store holds one record in the raw key-value shape. Whatever comes out
//! of [`AdSettingsStore::get`] is passed through [`sanitize`] before use, and
//! only sanitized records are written back.
//!
//! Two implementations are provided:
//! - [`MemoryStore`] for embedding and tests
//! - [`FileStore`] keeping the record as a JSON document on disk

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use error_stack::{Report, ResultExt};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::ad_settings::{sanitize, AdSettings, RawSettings};
use crate::error::FloatAdError;

/// Storage backend for the ad settings record.
pub trait AdSettingsStore {
    /// Returns the stored record, or `None` if nothing has been stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get(&self) -> Result<Option<RawSettings>, Report<FloatAdError>>;

    /// Replaces the stored record.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn put(&self, settings: &AdSettings) -> Result<(), Report<FloatAdError>>;

    /// Removes the stored record. Deleting an absent record is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn delete(&self) -> Result<(), Report<FloatAdError>>;
}

fn store_error(message: impl Into<String>) -> FloatAdError {
    FloatAdError::Store {
        message: message.into(),
    }
}

/// In-process store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    record: Mutex<Option<RawSettings>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-filled with an unsanitized record.
    pub fn with_raw(raw: RawSettings) -> Self {
        Self {
            record: Mutex::new(Some(raw)),
        }
    }
}

impl AdSettingsStore for MemoryStore {
    fn get(&self) -> Result<Option<RawSettings>, Report<FloatAdError>> {
        let record = self
            .record
            .lock()
            .map_err(|_| Report::new(store_error("Memory store lock poisoned")))?;
        Ok(record.clone())
    }

    fn put(&self, settings: &AdSettings) -> Result<(), Report<FloatAdError>> {
        let mut record = self
            .record
            .lock()
            .map_err(|_| Report::new(store_error("Memory store lock poisoned")))?;
        *record = Some(settings.to_raw());
        Ok(())
    }

    fn delete(&self) -> Result<(), Report<FloatAdError>> {
        let mut record = self
            .record
            .lock()
            .map_err(|_| Report::new(store_error("Memory store lock poisoned")))?;
        *record = None;
        Ok(())
    }
}

/// Store keeping the record as a pretty-printed JSON object in a file.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AdSettingsStore for FileStore {
    fn get(&self) -> Result<Option<RawSettings>, Report<FloatAdError>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(Report::new(e).change_context(store_error(format!(
                    "Failed to read settings file '{}'",
                    self.path.display()
                ))))
            }
        };

        let value: Value = serde_json::from_str(&content).change_context(store_error(format!(
            "Settings file '{}' is not valid JSON",
            self.path.display()
        )))?;

        match value {
            Value::Object(raw) => Ok(Some(raw)),
            _ => Err(Report::new(store_error(format!(
                "Settings file '{}' does not hold a JSON object",
                self.path.display()
            )))),
        }
    }

    fn put(&self, settings: &AdSettings) -> Result<(), Report<FloatAdError>> {
        let json = canonical_json(settings);
        fs::write(&self.path, json).change_context(store_error(format!(
            "Failed to write settings file '{}'",
            self.path.display()
        )))
    }

    fn delete(&self) -> Result<(), Report<FloatAdError>> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Report::new(e).change_context(store_error(format!(
                "Failed to delete settings file '{}'",
                self.path.display()
            )))),
        }
    }
}

/// Pretty JSON for a sanitized record, keys in sorted order.
pub fn canonical_json(settings: &AdSettings) -> String {
    let value = Value::Object(settings.to_raw());
    serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string())
}

/// Compute the SHA-256 hash of a settings document.
///
/// Returns the hash in the format `sha256:<hex>`.
pub fn compute_settings_hash(content: &str) -> String {
    // Normalize line endings for consistent hashing across platforms
    let normalized = content.replace("\r\n", "\n");
    let mut hasher = Sha256::new();
    hasher.update(normalized.as_bytes());
    let hash = hasher.finalize();
    format!("sha256:{}", hex::encode(hash))
}

/// Verify that a settings hash matches the content.
pub fn verify_settings_hash(content: &str, expected_hash: &str) -> bool {
    compute_settings_hash(content) == expected_hash
}

/// Reads and sanitizes the stored record, using defaults if none is stored.
///
/// # Errors
///
/// Returns an error if the store cannot be read.
pub fn load_ad_settings<S: AdSettingsStore + ?Sized>(
    store: &S,
) -> Result<AdSettings, Report<FloatAdError>> {
    match store.get()? {
        Some(raw) => Ok(sanitize(&raw)),
        None => {
            log::debug!("No ad settings stored, using defaults");
            Ok(AdSettings::default())
        }
    }
}

/// Sanitizes `raw` and stores the result, returning the canonical record.
///
/// # Errors
///
/// Returns an error if the store cannot be written.
pub fn save_ad_settings<S: AdSettingsStore + ?Sized>(
    store: &S,
    raw: &RawSettings,
) -> Result<AdSettings, Report<FloatAdError>> {
    let settings = sanitize(raw);
    store.put(&settings)?;
    log::info!(
        "Saved ad settings ({} ad, hash {})",
        settings.ad_type,
        compute_settings_hash(&canonical_json(&settings))
    );
    Ok(settings)
}

/// Seeds the store with default settings unless a record already exists.
///
/// Returns whether defaults were written.
///
/// # Errors
///
/// Returns an error if the store cannot be read or written.
pub fn activate<S: AdSettingsStore + ?Sized>(store: &S) -> Result<bool, Report<FloatAdError>> {
    if store.get()?.is_some() {
        return Ok(false);
    }
    store.put(&AdSettings::default())?;
    log::info!("Seeded default ad settings");
    Ok(true)
}

/// Removes the stored record.
///
/// # Errors
///
/// Returns an error if the store cannot be written.
pub fn uninstall<S: AdSettingsStore + ?Sized>(store: &S) -> Result<(), Report<FloatAdError>> {
    store.delete()?;
    log::info!("Removed ad settings");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ad_settings::AdType;
    use serde_json::json;

    fn raw(value: Value) -> RawSettings {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_compute_settings_hash() {
        let hash = compute_settings_hash("{\"enabled\": true}");
        assert!(hash.starts_with("sha256:"));
        assert_eq!(hash.len(), 7 + 64); // "sha256:" + 64 hex chars
    }

    #[test]
    fn test_hash_normalization() {
        let lf_hash = compute_settings_hash("line1\nline2\n");
        let crlf_hash = compute_settings_hash("line1\r\nline2\r\n");
        assert_eq!(lf_hash, crlf_hash);
    }

    #[test]
    fn test_verify_settings_hash() {
        let content = canonical_json(&AdSettings::default());
        let hash = compute_settings_hash(&content);

        assert!(verify_settings_hash(&content, &hash));
        assert!(!verify_settings_hash(&content, "sha256:invalid"));
    }

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemoryStore::new();
        assert!(store.get().unwrap().is_none());

        let saved = save_ad_settings(
            &store,
            &raw(json!({"ad_type": "lottie", "image_url": "https://x/anim.json", "ad_width": 0})),
        )
        .unwrap();
        assert_eq!(saved.ad_type, AdType::Lottie);
        assert_eq!(saved.ad_width, 1);

        let loaded = load_ad_settings(&store).unwrap();
        assert_eq!(loaded, saved);

        uninstall(&store).unwrap();
        assert!(store.get().unwrap().is_none());
    }

    #[test]
    fn test_load_sanitizes_raw_records() {
        let store = MemoryStore::with_raw(raw(json!({
            "display_devices": [],
            "position_y": "left: 4px;",
        })));
        let loaded = load_ad_settings(&store).unwrap();
        assert_eq!(loaded, AdSettings::default());
    }

    #[test]
    fn test_activate_only_seeds_once() {
        let store = MemoryStore::new();
        assert!(activate(&store).unwrap());
        assert_eq!(load_ad_settings(&store).unwrap(), AdSettings::default());

        save_ad_settings(&store, &raw(json!({"enabled": false}))).unwrap();
        assert!(!activate(&store).unwrap());
        assert!(!load_ad_settings(&store).unwrap().enabled);
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("settings.json"));

        assert!(store.get().unwrap().is_none());
        assert_eq!(load_ad_settings(&store).unwrap(), AdSettings::default());

        let saved = save_ad_settings(
            &store,
            &raw(json!({"display_devices": ["desktop"], "link_url": "https://x"})),
        )
        .unwrap();
        assert_eq!(load_ad_settings(&store).unwrap(), saved);

        let on_disk = fs::read_to_string(store.path()).unwrap();
        assert_eq!(on_disk, canonical_json(&saved));

        uninstall(&store).unwrap();
        assert!(!store.path().exists());
        uninstall(&store).unwrap();
    }

    #[test]
    fn test_file_store_rejects_non_object() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "[1, 2, 3]").unwrap();

        let store = FileStore::new(&path);
        assert!(store.get().is_err());
        assert!(load_ad_settings(&store).is_err());

        fs::write(&path, "{ not json").unwrap();
        let err = store.get().unwrap_err();
        assert!(format!("{err:?}").contains("is not valid JSON"));
    }
}
