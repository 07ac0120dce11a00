//! Service configuration.
//!
//! Settings are read from TOML and merged with environment variables prefixed
//! with `FLOATAD__` (`FLOATAD__LOTTIE__LOAD_POLICY=displayed_devices`
//! overrides `lottie.load_policy`). The per-ad record lives in a settings
//! store instead, see [`crate::config_store`].

use std::str;

use config::{Config, Environment, File, FileFormat};
use error_stack::{Report, ResultExt};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::FloatAdError;

pub const ENVIRONMENT_VARIABLE_PREFIX: &str = "FLOATAD";
pub const ENVIRONMENT_VARIABLE_SEPARATOR: &str = "__";

/// Appearance of the overlay chrome.
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct Overlay {
    #[serde(default = "default_z_index")]
    #[validate(range(min = 1, max = 2_147_483_647))]
    pub z_index: u32,

    #[serde(default = "default_alt_text")]
    #[validate(length(min = 1, max = 200))]
    pub alt_text: String,

    #[serde(default = "default_close_label")]
    #[validate(length(min = 1, max = 8))]
    pub close_label: String,
}

impl Default for Overlay {
    fn default() -> Self {
        Self {
            z_index: default_z_index(),
            alt_text: default_alt_text(),
            close_label: default_close_label(),
        }
    }
}

fn default_z_index() -> u32 {
    9999
}

fn default_alt_text() -> String {
    "Floating advertisement".to_string()
}

fn default_close_label() -> String {
    "×".to_string()
}

/// Which displayed devices receive the Lottie player script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LottieLoadPolicy {
    /// Only mobile-classified clients get the player. Tablets and desktops
    /// that are targeted still receive the container, which then stays static.
    #[default]
    MobileOnly,
    /// Every client the overlay is displayed to gets the player.
    DisplayedDevices,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct Lottie {
    #[serde(default = "default_player_url")]
    #[validate(url)]
    pub player_url: String,

    #[serde(default)]
    pub load_policy: LottieLoadPolicy,
}

impl Default for Lottie {
    fn default() -> Self {
        Self {
            player_url: default_player_url(),
            load_policy: LottieLoadPolicy::default(),
        }
    }
}

fn default_player_url() -> String {
    "https://cdn.jsdelivr.net/npm/lottie-web@5.11.0/build/player/lottie.min.js".to_string()
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct Logging {
    /// Emit debug-level records, including every settings fallback.
    #[serde(default)]
    pub debug: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct Store {
    /// JSON file holding the ad settings record.
    #[serde(default = "default_store_path")]
    #[validate(length(min = 1))]
    pub path: String,
}

impl Default for Store {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

fn default_store_path() -> String {
    "floatad-settings.json".to_string()
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct Settings {
    #[serde(default)]
    #[validate(nested)]
    pub overlay: Overlay,

    #[serde(default)]
    #[validate(nested)]
    pub lottie: Lottie,

    #[serde(default)]
    #[validate(nested)]
    pub logging: Logging,

    #[serde(default)]
    #[validate(nested)]
    pub store: Store,
}

impl Settings {
    /// Loads the settings bundled with the crate, merged with the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the merged configuration is invalid.
    pub fn new() -> Result<Self, Report<FloatAdError>> {
        let toml_bytes = include_bytes!("../../../floatad.toml");
        let toml_str = str::from_utf8(toml_bytes).change_context(FloatAdError::InvalidUtf8 {
            message: "embedded floatad.toml".to_string(),
        })?;

        Self::from_toml(toml_str)
    }

    /// Parses settings from TOML, applying environment overrides and validation.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML cannot be parsed, does not deserialize into
    /// [`Settings`], or fails validation.
    pub fn from_toml(toml_str: &str) -> Result<Self, Report<FloatAdError>> {
        let environment = Environment::default()
            .prefix(ENVIRONMENT_VARIABLE_PREFIX)
            .separator(ENVIRONMENT_VARIABLE_SEPARATOR);

        let toml = File::from_str(toml_str, FileFormat::Toml);
        let config = Config::builder()
            .add_source(toml)
            .add_source(environment)
            .build()
            .change_context(FloatAdError::Configuration {
                message: "Failed to build configuration".to_string(),
            })?;

        let settings: Self = config
            .try_deserialize()
            .change_context(FloatAdError::Configuration {
                message: "Failed to deserialize configuration".to_string(),
            })?;

        settings
            .validate()
            .change_context(FloatAdError::Configuration {
                message: "Settings validation failed".to_string(),
            })?;

        Ok(settings)
    }

    /// Serializes the effective settings back to TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_canonical_toml(&self) -> Result<String, Report<FloatAdError>> {
        toml::to_string(self).change_context(FloatAdError::Configuration {
            message: "Failed to serialize settings".to_string(),
        })
    }
}
