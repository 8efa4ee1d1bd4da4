//! Hardcoded coordinates for addresses that automated lookup gets wrong.
//!
//! The default table is embedded from `overrides.toml`. Each entry's
//! `pattern` is matched as a plain substring of the raw address.

use serde::Deserialize;
use zip_cluster_geography_models::Coordinate;

use crate::config::ConfigError;

const OVERRIDES_TOML: &str = include_str!("../overrides.toml");

#[derive(Debug, Deserialize)]
struct OverrideFile {
    #[serde(default)]
    overrides: Vec<OverrideEntry>,
}

/// One known-bad address and its verified location.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OverrideEntry {
    /// Short description for logs.
    pub label: String,
    /// Substring identifying the address.
    pub pattern: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// The override table, checked in file order.
#[derive(Debug, Clone, Default)]
pub struct OverrideTable {
    entries: Vec<(OverrideEntry, Coordinate)>,
}

impl OverrideTable {
    /// Parses a table from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Toml`] if the text is malformed, or
    /// [`ConfigError::Invalid`] if an entry has an empty pattern or an
    /// out-of-range coordinate.
    pub fn from_toml_str(name: &str, text: &str) -> Result<Self, ConfigError> {
        let file: OverrideFile = toml::de::from_str(text).map_err(|source| ConfigError::Toml {
            name: name.to_string(),
            source,
        })?;

        let entries = file
            .overrides
            .into_iter()
            .map(|entry| {
                if entry.pattern.trim().is_empty() {
                    return Err(ConfigError::Invalid {
                        name: format!("{name}: override '{}'", entry.label),
                        message: "empty pattern".to_string(),
                    });
                }
                let coordinate = Coordinate::new(entry.latitude, entry.longitude).map_err(|e| {
                    ConfigError::Invalid {
                        name: format!("{name}: override '{}'", entry.label),
                        message: e.to_string(),
                    }
                })?;
                Ok((entry, coordinate))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { entries })
    }

    /// The embedded default table.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the embedded file is malformed.
    pub fn embedded() -> Result<Self, ConfigError> {
        Self::from_toml_str("overrides.toml", OVERRIDES_TOML)
    }

    /// Loads a table from a TOML file on disk.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or any error
    /// from [`Self::from_toml_str`].
    pub fn from_path(path: &std::path::Path) -> Result<Self, ConfigError> {
        let display = path.display().to_string();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: display.clone(),
            source,
        })?;
        Self::from_toml_str(&display, &text)
    }

    /// Returns the first entry whose pattern occurs in `address`.
    #[must_use]
    pub fn find(&self, address: &str) -> Option<(&OverrideEntry, Coordinate)> {
        self.entries
            .iter()
            .find(|(entry, _)| address.contains(entry.pattern.as_str()))
            .map(|(entry, coordinate)| (entry, *coordinate))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
