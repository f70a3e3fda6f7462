//! # Backend Preference Store
//!
//! Persistence for the chosen backend name. The resolver talks to a narrow
//! [`ConfigStore`] interface with two slots, the live value and a default
//! snapshot, so later code paths observe the same choice. Hosts with their
//! own configuration system implement the trait; the in-memory and
//! file-backed stores here cover everything else.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::config::{self, ConfigError};

/// Reserved configuration value requesting environment-based inference
const AUTO_VALUE: &str = "auto";

/// A configured backend preference: a concrete name, or inference from the
/// environment.
///
/// The literal name `auto` is reserved for the sentinel and is never a valid
/// persisted backend name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum BackendPreference {
    /// Infer the backend from the environment
    #[default]
    Auto,
    /// Use the named backend
    Named(String),
}

impl BackendPreference {
    /// Parse a configuration value, treating `auto` (case-insensitively) as
    /// the sentinel
    #[must_use]
    pub fn from_config_value(value: &str) -> Self {
        if value.eq_ignore_ascii_case(AUTO_VALUE) {
            Self::Auto
        } else {
            Self::Named(value.to_owned())
        }
    }

    /// The value persisted for this preference
    #[must_use]
    pub fn as_config_value(&self) -> &str {
        match self {
            Self::Auto => AUTO_VALUE,
            Self::Named(name) => name,
        }
    }
}

/// Two-slot store for the chosen backend name.
pub trait ConfigStore {
    /// The currently configured preference.
    ///
    /// Starts as the host's default (possibly the auto sentinel) and is
    /// overwritten by every successful selection.
    fn default_backend_name(&self) -> BackendPreference;

    /// Record a committed selection in both the live and default-snapshot
    /// slots.
    fn set_backend_name(&mut self, live: &str, default: &str);
}

/// In-memory preference store.
#[derive(Debug, Clone)]
pub struct MemoryPreferences {
    live: BackendPreference,
    default_snapshot: BackendPreference,
}

impl MemoryPreferences {
    /// Create a store whose live and snapshot slots both start at the given
    /// host default
    #[must_use]
    pub fn new(default: BackendPreference) -> Self {
        Self {
            live: default.clone(),
            default_snapshot: default,
        }
    }

    /// Current live slot
    pub fn live(&self) -> &BackendPreference {
        &self.live
    }

    /// Current default-snapshot slot
    pub fn default_snapshot(&self) -> &BackendPreference {
        &self.default_snapshot
    }
}

impl Default for MemoryPreferences {
    fn default() -> Self {
        Self::new(BackendPreference::Auto)
    }
}

impl ConfigStore for MemoryPreferences {
    fn default_backend_name(&self) -> BackendPreference {
        self.live.clone()
    }

    fn set_backend_name(&mut self, live: &str, default: &str) {
        self.live = BackendPreference::from_config_value(live);
        self.default_snapshot = BackendPreference::from_config_value(default);
    }
}

/// On-disk layout of the preference file
#[derive(Debug, Serialize, Deserialize)]
struct PreferencesDoc {
    backend: String,
    backend_default: String,
}

impl Default for PreferencesDoc {
    fn default() -> Self {
        Self {
            backend: AUTO_VALUE.to_owned(),
            backend_default: AUTO_VALUE.to_owned(),
        }
    }
}

/// File-backed preference store (TOML or RON, by extension).
///
/// Selections are written through to disk as they commit; a write failure is
/// logged and the in-memory state stays authoritative for the session.
#[derive(Debug)]
pub struct FilePreferences {
    path: PathBuf,
    doc: PreferencesDoc,
}

impl FilePreferences {
    /// Open a preference file, starting from the auto sentinel when the file
    /// does not exist yet.
    ///
    /// # Errors
    /// [`ConfigError`] when the file exists but cannot be read or parsed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let doc = if path.exists() {
            config::load(&path)?
        } else {
            PreferencesDoc::default()
        };
        Ok(Self { path, doc })
    }

    /// Location of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigStore for FilePreferences {
    fn default_backend_name(&self) -> BackendPreference {
        BackendPreference::from_config_value(&self.doc.backend)
    }

    fn set_backend_name(&mut self, live: &str, default: &str) {
        self.doc.backend = live.to_owned();
        self.doc.backend_default = default.to_owned();
        if let Err(err) = config::save(&self.doc, &self.path) {
            log::warn!(
                "failed to persist backend preference to {}: {err}",
                self.path.display()
            );
        }
    }
}
