use std::path::Path;

use serde::{Deserialize, Serialize};

/// Configuration for finding-aid post-processing.
///
/// Controls the calendar window used when scanning raw date text for year
/// tokens, and the markers that denote an explicitly open-ended date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Config {
    /// The earliest year recognized as a year token.
    ///
    /// Four-digit numbers outside the window are ignored, which keeps item
    /// counts and folio numbers from being mistaken for years.
    year_min: i32,

    /// The latest year recognized as a year token.
    year_max: i32,

    /// Raw date strings that mean "no date given" rather than a parse
    /// failure. Compared case-insensitively after trimming punctuation.
    open_range_markers: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            year_min: default_year_min(),
            year_max: default_year_max(),
            open_range_markers: default_open_range_markers(),
        }
    }
}

impl Config {
    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {e}"))?;
        toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {e}"))
    }

    /// Saves the configuration to a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized to TOML or
    /// if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content =
            toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize config: {e}"))?;
        std::fs::write(path, content).map_err(|e| format!("Failed to write config file: {e}"))
    }

    /// Whether the given year falls inside the recognized window.
    #[must_use]
    pub const fn year_in_window(&self, year: i32) -> bool {
        year >= self.year_min && year <= self.year_max
    }

    /// Whether the given raw text is an open-ended marker such as `n.d.`.
    #[must_use]
    pub fn is_open_range_marker(&self, raw: &str) -> bool {
        let raw = raw.trim().trim_end_matches(['.', ',', ';']).trim();
        self.open_range_markers.iter().any(|marker| {
            let marker = marker.trim_end_matches(['.', ',', ';']);
            raw.eq_ignore_ascii_case(marker)
        })
    }
}

const fn default_year_min() -> i32 {
    1500
}

const fn default_year_max() -> i32 {
    2199
}

fn default_open_range_markers() -> Vec<String> {
    vec!["no date".to_string(), "n.d.".to_string(), "nd".to_string()]
}

/// The serialized versions of the configuration.
/// This allows for future changes to the configuration format and to the
/// domain type without breaking compatibility.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default = "default_year_min")]
        year_min: i32,

        #[serde(default = "default_year_max")]
        year_max: i32,

        #[serde(default = "default_open_range_markers")]
        open_range_markers: Vec<String>,
    },
}

impl From<Versions> for Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                year_min,
                year_max,
                open_range_markers,
            } => Self {
                year_min,
                year_max,
                open_range_markers,
            },
        }
    }
}

impl From<Config> for Versions {
    fn from(config: Config) -> Self {
        Self::V1 {
            year_min: config.year_min,
            year_max: config.year_max,
            open_range_markers: config.open_range_markers,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn load_reads_valid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            b"_version = \"1\"\nyear_min = 1700\nyear_max = 1950\nopen_range_markers = [\"undated\"]\n",
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();

        assert!(config.year_in_window(1700));
        assert!(config.year_in_window(1950));
        assert!(!config.year_in_window(1699));
        assert!(config.is_open_range_marker("Undated"));
        assert!(!config.is_open_range_marker("n.d."));
    }

    #[test]
    fn load_missing_file_returns_error() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("missing.toml");

        let error = Config::load(&missing).unwrap_err();
        assert!(error.starts_with("Failed to read config file:"));
    }

    #[test]
    fn load_invalid_toml_returns_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"_version = \"1\"\nyear_min = \"many\"\n")
            .unwrap();

        let error = Config::load(file.path()).unwrap_err();
        assert!(error.starts_with("Failed to parse config file:"));
    }

    #[test]
    fn empty_file_returns_default() {
        // Tests that deserialising a bare version header returns the default
        // configuration.
        let expected = Config::default();
        let actual: Config = toml::from_str(r#"_version = "1""#).unwrap();
        assert_eq!(actual, expected);
    }

    #[test]
    fn save_round_trips() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("fonds.toml");

        let config = Config::default();
        config.save(&path).unwrap();
        assert_eq!(Config::load(&path).unwrap(), config);
    }

    #[test]
    fn default_markers_match_archival_conventions() {
        let config = Config::default();
        assert!(config.is_open_range_marker("no date"));
        assert!(config.is_open_range_marker("No Date."));
        assert!(config.is_open_range_marker("n.d."));
        assert!(!config.is_open_range_marker("1915"));
    }
}
