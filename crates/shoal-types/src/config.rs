//! Shell configuration loaded from TOML.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Line width used when nothing else says otherwise.
pub const DEFAULT_WIDTH: usize = 80;

/// Tunables for an interactive session.
///
/// Every field has a default, so a config file only needs the keys it
/// wants to change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    /// Prompt printed before each line is read.
    pub prompt: String,
    /// Emphasise errors and section headings with terminal codes.
    pub highlight: bool,
    /// Fixed line width for column output. Falls back to `COLUMNS`.
    pub width: Option<usize>,
    /// History file name, relative to `$HOME` unless absolute.
    pub history_file: PathBuf,
    /// Maximum number of history entries kept by the line reader.
    pub history_size: usize,
    /// Print the introductory banner on start.
    pub banner: bool,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            prompt: "shoal> ".to_string(),
            highlight: true,
            width: None,
            history_file: PathBuf::from(".shoal_history"),
            history_size: 1000,
            banner: true,
        }
    }
}

impl ShellConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load a configuration file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&text)?;
        log::info!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Pick the initial line width.
    ///
    /// Resolution order: explicit override, the config file, a numeric
    /// `COLUMNS` value, then [`DEFAULT_WIDTH`].
    pub fn resolve_width(&self, explicit: Option<usize>, columns: Option<&str>) -> usize {
        explicit
            .or(self.width)
            .or_else(|| columns.and_then(|c| c.trim().parse().ok()))
            .unwrap_or(DEFAULT_WIDTH)
    }

    /// Full path of the history file, if one can be determined.
    ///
    /// Relative names are joined onto `home`; without a home directory a
    /// relative history file has nowhere to live.
    pub fn history_path(&self, home: Option<&Path>) -> Option<PathBuf> {
        if self.history_file.is_absolute() {
            return Some(self.history_file.clone());
        }
        home.map(|h| h.join(&self.history_file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = ShellConfig::default();
        assert_eq!(cfg.prompt, "shoal> ");
        assert!(cfg.highlight);
        assert_eq!(cfg.width, None);
        assert!(cfg.banner);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg = ShellConfig::from_toml("highlight = false\nwidth = 120\n").unwrap();
        assert!(!cfg.highlight);
        assert_eq!(cfg.width, Some(120));
        assert_eq!(cfg.prompt, "shoal> ");
    }

    #[test]
    fn empty_toml_is_default() {
        assert_eq!(ShellConfig::from_toml("").unwrap(), ShellConfig::default());
    }

    #[test]
    fn malformed_toml_is_error() {
        assert!(ShellConfig::from_toml("prompt = ").is_err());
    }

    #[test]
    fn wrong_type_is_error() {
        assert!(ShellConfig::from_toml("width = \"wide\"").is_err());
    }

    #[test]
    fn missing_file_is_default() {
        let cfg = ShellConfig::load(Path::new("/nonexistent/shoal/config.toml")).unwrap();
        assert_eq!(cfg, ShellConfig::default());
    }

    #[test]
    fn width_explicit_wins() {
        let cfg = ShellConfig {
            width: Some(100),
            ..ShellConfig::default()
        };
        assert_eq!(cfg.resolve_width(Some(60), Some("132")), 60);
    }

    #[test]
    fn width_config_beats_columns() {
        let cfg = ShellConfig {
            width: Some(100),
            ..ShellConfig::default()
        };
        assert_eq!(cfg.resolve_width(None, Some("132")), 100);
    }

    #[test]
    fn width_from_columns() {
        let cfg = ShellConfig::default();
        assert_eq!(cfg.resolve_width(None, Some("132")), 132);
    }

    #[test]
    fn width_bad_columns_falls_back() {
        let cfg = ShellConfig::default();
        assert_eq!(cfg.resolve_width(None, Some("wide")), DEFAULT_WIDTH);
        assert_eq!(cfg.resolve_width(None, None), DEFAULT_WIDTH);
    }

    #[test]
    fn history_path_relative_needs_home() {
        let cfg = ShellConfig::default();
        assert_eq!(cfg.history_path(None), None);
        assert_eq!(
            cfg.history_path(Some(Path::new("/home/ann"))),
            Some(PathBuf::from("/home/ann/.shoal_history"))
        );
    }

    #[test]
    fn history_path_absolute_ignores_home() {
        let cfg = ShellConfig {
            history_file: PathBuf::from("/var/tmp/hist"),
            ..ShellConfig::default()
        };
        assert_eq!(cfg.history_path(None), Some(PathBuf::from("/var/tmp/hist")));
    }
}
