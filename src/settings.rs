//! Persistent tool settings
//!
//! Settings are read from `$LUXTEST_SETTINGS` when set, otherwise from
//! `<config dir>/luxtest/settings.json`. Missing or unreadable files fall
//! back to defaults.

use crate::layer::{Overrides, CONE_ANGLE_ATTR};
use crate::util::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Environment variable naming an explicit settings file.
pub const SETTINGS_ENV: &str = "LUXTEST_SETTINGS";

/// Settings shared by the library helpers and the CLI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Light detection
    pub light_suffix: String,

    // Description filters
    pub excluded_namespaces: Vec<String>,
    pub excluded_attributes: Vec<String>,

    // Attribute overrides applied to every light carrying the attribute
    pub default_overrides: BTreeMap<String, Json>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            light_suffix: "_light".to_string(),
            excluded_namespaces: vec!["houdini".to_string()],
            excluded_attributes: vec!["extent".to_string()],
            default_overrides: BTreeMap::from([(CONE_ANGLE_ATTR.to_string(), Json::from(180))]),
        }
    }
}

impl Settings {
    /// Settings file path: `$LUXTEST_SETTINGS` or the per-user config file.
    pub fn path() -> Option<PathBuf> {
        if let Some(path) = std::env::var_os(SETTINGS_ENV) {
            return Some(PathBuf::from(path));
        }
        dirs::config_dir().map(|mut p| {
            p.push("luxtest");
            p.push("settings.json");
            p
        })
    }

    /// Load settings, falling back to defaults.
    pub fn load() -> Self {
        let Some(path) = Self::path() else {
            return Self::default();
        };
        if !path.exists() {
            debug!(path = %path.display(), "no settings file, using defaults");
            return Self::default();
        }
        Self::from_file(&path).unwrap_or_else(|e| {
            warn!("ignoring settings: {e}");
            Self::default()
        })
    }

    /// Load settings from a specific file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| Error::from(e).in_file(path))?;
        serde_json::from_str(&text).map_err(|e| Error::from(e).in_file(path))
    }

    /// Save settings to the settings path.
    pub fn save(&self) -> Result<()> {
        let path = Self::path().ok_or_else(|| Error::other("no config directory"))?;
        self.save_to(path)
    }

    /// Save settings to a specific file, creating parent directories.
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| Error::from(e).in_file(parent))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|e| Error::from(e).in_file(path))
    }

    /// True for prims named like lights (`rect_light`).
    pub fn is_light_name(&self, name: &str) -> bool {
        name.len() > self.light_suffix.len() && name.ends_with(&self.light_suffix)
    }

    /// Light name without the suffix (`rect_light` -> `rect`).
    pub fn light_name<'a>(&self, prim_name: &'a str) -> Option<&'a str> {
        if self.is_light_name(prim_name) {
            prim_name.strip_suffix(self.light_suffix.as_str())
        } else {
            None
        }
    }

    /// True when an attribute is left out of light descriptions.
    pub fn is_excluded(&self, attr_name: &str) -> bool {
        let namespace = attr_name.split(':').next().unwrap_or(attr_name);
        self.excluded_namespaces.iter().any(|ns| ns == namespace)
            || self.excluded_attributes.iter().any(|a| a == attr_name)
    }

    /// Default overrides as an override set.
    pub fn overrides(&self) -> Overrides {
        Overrides::from_defaults(self.default_overrides.clone())
    }
}
