//! Client configuration.
//!
//! All settings live in a single `config.toml` file at
//! `~/.config/divert/config.toml` by default. A missing file means defaults:
//! the `America/Regina` zone and a seven-day backfill.

use std::path::{Path, PathBuf};

use divert_core::{CivilStyle, DEFAULT_BACKFILL_DAYS, DEFAULT_ZONE_ID, TimeFormat, Zone};
use serde::{Deserialize, Serialize};

/// Configuration for the divert client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// IANA zone every civil date and time is expressed in.
    pub zone: String,

    /// Days before a query window scanned for still-open diverts.
    pub backfill_days: u32,

    /// Length of the default query window, in hours from now.
    pub window_hours: u32,

    /// Debug mode.
    pub debug: bool,

    /// Display settings.
    #[serde(default)]
    pub display: DisplaySettings,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            zone: DEFAULT_ZONE_ID.to_string(),
            backfill_days: DEFAULT_BACKFILL_DAYS,
            window_hours: 24,
            debug: false,
            display: DisplaySettings::default(),
        }
    }
}

/// Display settings for civil time output.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    /// Layout of rendered dates and times.
    pub style: CivilStyle,

    /// 12-hour or 24-hour clock.
    pub time_format: TimeFormat,
}

impl ClientConfig {
    /// Loads configuration from the default path.
    pub fn load() -> Result<Self, String> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, String> {
        let content =
            std::fs::read_to_string(path).map_err(|e| format!("failed to read config: {}", e))?;
        toml::from_str(&content).map_err(|e| format!("failed to parse config: {}", e))
    }

    /// Resolves the configured zone.
    pub fn zone(&self) -> Result<Zone, String> {
        Zone::parse(&self.zone).map_err(|e| e.to_string())
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    /// Returns the default configuration directory.
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("divert")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.zone, "America/Regina");
        assert_eq!(config.backfill_days, 7);
        assert_eq!(config.window_hours, 24);
        assert!(!config.debug);
        assert_eq!(config.display.style, CivilStyle::Iso);
        assert_eq!(config.zone().unwrap(), Zone::regina());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: ClientConfig = toml::from_str("backfill_days = 3\n").unwrap();
        assert_eq!(config.backfill_days, 3);
        assert_eq!(config.zone, "America/Regina");
        assert_eq!(config.display.time_format, TimeFormat::H24);
    }

    #[test]
    fn full_toml() {
        let toml_content = r#"
zone = "America/Winnipeg"
backfill_days = 14
window_hours = 12
debug = true

[display]
style = "medium"
time_format = "h12"
"#;
        let config: ClientConfig = toml::from_str(toml_content).unwrap();
        assert_eq!(config.zone().unwrap().name(), "America/Winnipeg");
        assert_eq!(config.backfill_days, 14);
        assert_eq!(config.window_hours, 12);
        assert!(config.debug);
        assert_eq!(config.display.style, CivilStyle::Medium);
        assert_eq!(config.display.time_format, TimeFormat::H12);
    }

    #[test]
    fn unknown_zone_is_reported() {
        let config: ClientConfig = toml::from_str("zone = \"Atlantis/Central\"\n").unwrap();
        let err = config.zone().unwrap_err();
        assert!(err.contains("Atlantis/Central"));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "zone = \"UTC\"").unwrap();
        let config = ClientConfig::load_from(file.path()).unwrap();
        assert_eq!(config.zone, "UTC");

        let missing = file.path().with_extension("missing");
        assert!(
            ClientConfig::load_from(&missing)
                .unwrap_err()
                .contains("failed to read config")
        );
    }

    #[test]
    fn load_from_rejects_bad_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "backfill_days = \"many\"").unwrap();
        let err = ClientConfig::load_from(file.path()).unwrap_err();
        assert!(err.contains("failed to parse config"));
    }

    #[test]
    fn dumps_round_trip() {
        let config = ClientConfig::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: ClientConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed.zone, config.zone);
        assert_eq!(parsed.backfill_days, config.backfill_days);
    }
}
