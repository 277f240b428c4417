use std::path::Path;
use std::time::Duration;

use clap::ValueEnum;
use serde::Deserialize;

use crate::error::ConfigError;

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_FADE_MS: u64 = 400;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PagingMode {
    /// Every section stacked on one page
    Single,
    /// One section per page, advanced by the user
    #[default]
    Carousel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    #[default]
    Hours,
    Minutes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Transition {
    #[default]
    None,
    Fade,
}

/// How a report is laid out and navigated.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub paging_mode: PagingMode,
    pub time_unit: TimeUnit,
    pub transition: Transition,
    /// Fade-out duration; the fade-in takes the same time.
    pub fade_ms: u64,
    /// Background colors cycled by the fade transition, independently of the
    /// page count.
    pub backgrounds: Vec<String>,
    /// Reject payloads with missing required values instead of rendering
    /// placeholders.
    pub strict: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            paging_mode: PagingMode::default(),
            time_unit: TimeUnit::default(),
            transition: Transition::default(),
            fade_ms: DEFAULT_FADE_MS,
            backgrounds: vec![
                "#1e1e2e".to_string(),
                "#2b1d3a".to_string(),
                "#13293d".to_string(),
            ],
            strict: false,
        }
    }
}

impl ReportConfig {
    pub fn fade_duration(&self) -> Duration {
        Duration::from_millis(self.fade_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub server_url: String,
    /// No timeout when unset; the transport's own failure signaling applies.
    pub timeout_secs: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            timeout_secs: None,
        }
    }
}

impl ClientConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub client: ClientConfig,
    pub report: ReportConfig,
}

/// Load settings from a TOML file. Absent keys keep their defaults.
pub fn load_settings(path: &Path) -> Result<Settings, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    toml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.client.server_url, DEFAULT_SERVER_URL);
        assert_eq!(settings.client.timeout(), None);
        assert_eq!(settings.report.paging_mode, PagingMode::Carousel);
        assert_eq!(settings.report.time_unit, TimeUnit::Hours);
        assert_eq!(settings.report.transition, Transition::None);
        assert_eq!(settings.report.fade_duration(), Duration::from_millis(400));
        assert_eq!(settings.report.backgrounds.len(), 3);
    }

    #[test]
    fn test_partial_toml() {
        let settings: Settings = toml::from_str(
            r#"
            [client]
            timeout_secs = 30

            [report]
            time_unit = "minutes"
            transition = "fade"
            backgrounds = ["red", "blue"]
            "#,
        )
        .unwrap();
        assert_eq!(settings.client.server_url, DEFAULT_SERVER_URL);
        assert_eq!(settings.client.timeout(), Some(Duration::from_secs(30)));
        assert_eq!(settings.report.time_unit, TimeUnit::Minutes);
        assert_eq!(settings.report.transition, Transition::Fade);
        assert_eq!(settings.report.paging_mode, PagingMode::Carousel);
        assert_eq!(settings.report.backgrounds, vec!["red", "blue"]);
    }

    #[test]
    fn test_load_settings_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        assert!(matches!(
            load_settings(&missing),
            Err(ConfigError::Read { .. })
        ));

        let bad = dir.path().join("bad.toml");
        std::fs::write(&bad, "[report]\npaging_mode = \"sideways\"\n").unwrap();
        assert!(matches!(load_settings(&bad), Err(ConfigError::Parse { .. })));
    }
}
