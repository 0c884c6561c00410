//! The persisted preference file: just the theme, read at startup and
//! written on every toggle

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::style::Theme;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub theme: Theme,
}

impl Preferences {
    fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("mdview").join("preferences.toml"))
    }

    /// Missing or unreadable preference files fall back to defaults;
    /// startup never fails over a bad preference file.
    pub fn load() -> Self {
        match Self::path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    pub fn load_from(path: &Path) -> Self {
        let Ok(raw) = fs::read_to_string(path) else {
            return Self::default();
        };
        match toml::from_str(&raw) {
            Ok(prefs) => prefs,
            Err(e) => {
                warn!(path = %path.display(), %e, "ignoring malformed preference file");
                Self::default()
            }
        }
    }

    pub fn save(&self) -> io::Result<()> {
        match Self::path() {
            Some(path) => self.save_to(&path),
            None => Ok(()),
        }
    }

    pub fn save_to(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let raw = toml::to_string(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(path, raw)
    }
}
