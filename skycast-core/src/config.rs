use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fmt, fs, path::Path, path::PathBuf};

use crate::dates::{DateFormatter, Tz, parse_locale};

pub const DEFAULT_API_URL: &str = "https://api.openweathermap.org";

pub const ENV_API_URL: &str = "SKYCAST_API_URL";
pub const ENV_API_KEY: &str = "SKYCAST_API_KEY";
pub const ENV_LOCALE: &str = "SKYCAST_LOCALE";
pub const ENV_TIMEZONE: &str = "SKYCAST_TIMEZONE";

/// Resolved provider connection settings, fixed for the lifetime of a client.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiSettings {
    pub base_url: String,
    pub api_key: String,
}

impl ApiSettings {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }
}

impl fmt::Debug for ApiSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let api_key = if self.api_key.is_empty() {
            "<unset>"
        } else {
            "<redacted>"
        };

        f.debug_struct("ApiSettings")
            .field("base_url", &self.base_url)
            .field("api_key", &api_key)
            .finish()
    }
}

/// How timestamps are rendered.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct DisplayConfig {
    /// e.g. "en_US" or "vi-VN"
    pub locale: Option<String>,

    /// IANA name, e.g. "Europe/London". Host timezone when absent.
    pub timezone: Option<String>,
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_url = "https://api.openweathermap.org"
/// api_key = "..."
///
/// [display]
/// locale = "en_US"
/// timezone = "Europe/London"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    pub api_url: Option<String>,
    pub api_key: Option<String>,

    #[serde(default)]
    pub display: DisplayConfig,
}

impl Config {
    /// Load config from the platform config file, or defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        tracing::debug!(path = %path.display(), "Loaded configuration");
        Ok(cfg)
    }

    /// Like [`Config::load`], but an unreadable or unparseable file yields defaults
    /// together with the error that was hit.
    pub fn load_or_default() -> (Self, Option<anyhow::Error>) {
        match Self::config_file_path() {
            Ok(path) => Self::load_from_or_default(&path),
            Err(err) => (Self::default(), Some(err)),
        }
    }

    pub fn load_from_or_default(path: &Path) -> (Self, Option<anyhow::Error>) {
        match Self::load_from(path) {
            Ok(cfg) => (cfg, None),
            Err(err) => {
                tracing::debug!(path = %path.display(), "Ignoring unusable config file: {err:#}");
                (Self::default(), Some(err))
            }
        }
    }

    /// Save config to the platform config file, creating parent directories as needed.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "skycast", "skycast")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Overlay values found through `lookup` on top of this config. Empty values are ignored.
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(url) = get(ENV_API_URL) {
            self.api_url = Some(url);
        }
        if let Some(key) = get(ENV_API_KEY) {
            self.api_key = Some(key);
        }
        if let Some(locale) = get(ENV_LOCALE) {
            self.display.locale = Some(locale);
        }
        if let Some(tz) = get(ENV_TIMEZONE) {
            self.display.timezone = Some(tz);
        }

        self
    }

    pub fn with_process_env(self) -> Self {
        self.with_env_overrides(|name| std::env::var(name).ok())
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }

    /// Connection settings for the client.
    ///
    /// A missing key is passed through as empty; the provider then rejects the request.
    pub fn api_settings(&self) -> ApiSettings {
        if !self.has_api_key() {
            tracing::warn!("No API key configured; provider requests will be rejected");
        }

        ApiSettings::new(
            self.api_url.as_deref().unwrap_or(DEFAULT_API_URL),
            self.api_key.clone().unwrap_or_default(),
        )
    }

    /// Formatter for the configured locale and timezone, detecting the timezone when unset.
    pub fn date_formatter(&self) -> Result<DateFormatter> {
        let mut formatter = DateFormatter::detect();

        if let Some(name) = self.display.timezone.as_deref() {
            let timezone = name
                .parse::<Tz>()
                .map_err(|err| anyhow!("Invalid timezone '{name}' in configuration: {err}"))?;
            formatter = formatter.with_timezone(timezone);
        }

        if let Some(name) = self.display.locale.as_deref() {
            let locale = parse_locale(name)
                .ok_or_else(|| anyhow!("Unknown locale '{name}' in configuration"))?;
            formatter = formatter.with_locale(locale);
        }

        Ok(formatter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::dates::Locale;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn api_settings_default_to_public_url_and_empty_key() {
        let cfg = Config::default();
        let settings = cfg.api_settings();

        assert_eq!(settings.base_url, DEFAULT_API_URL);
        assert_eq!(settings.api_key, "");
        assert!(!cfg.has_api_key());
    }

    #[test]
    fn env_overrides_file_values() {
        let lookup = env(&[(ENV_API_KEY, "ENV_KEY"), (ENV_TIMEZONE, "Asia/Tokyo")]);
        let cfg = Config {
            api_url: Some("https://file.example".into()),
            api_key: Some("FILE_KEY".into()),
            ..Config::default()
        }
        .with_env_overrides(lookup);

        assert_eq!(cfg.api_url.as_deref(), Some("https://file.example"));
        assert_eq!(cfg.api_key.as_deref(), Some("ENV_KEY"));
        assert_eq!(cfg.display.timezone.as_deref(), Some("Asia/Tokyo"));
    }

    #[test]
    fn empty_env_values_are_ignored() {
        let cfg = Config {
            api_key: Some("FILE_KEY".into()),
            ..Config::default()
        }
        .with_env_overrides(env(&[(ENV_API_KEY, "  ")]));

        assert_eq!(cfg.api_key.as_deref(), Some("FILE_KEY"));
    }

    #[test]
    fn api_settings_debug_hides_key() {
        let settings = ApiSettings::new("https://x", "SECRET");
        let out = format!("{settings:?}");
        assert!(!out.contains("SECRET"));
        assert!(out.contains("<redacted>"));
    }

    #[test]
    fn date_formatter_uses_configured_values() {
        let cfg = Config {
            display: DisplayConfig {
                locale: Some("de-DE".into()),
                timezone: Some("Europe/Berlin".into()),
            },
            ..Config::default()
        };

        let fmt = cfg.date_formatter().expect("valid display config");
        assert_eq!(fmt.locale(), Locale::de_DE);
        assert_eq!(fmt.timezone(), chrono_tz::Europe::Berlin);
    }

    #[test]
    fn date_formatter_rejects_bad_timezone() {
        let cfg = Config {
            display: DisplayConfig {
                timezone: Some("Mars/Olympus".into()),
                locale: None,
            },
            ..Config::default()
        };

        let err = cfg.date_formatter().unwrap_err();
        assert!(err.to_string().contains("Invalid timezone 'Mars/Olympus'"));
    }

    #[test]
    fn date_formatter_rejects_bad_locale() {
        let cfg = Config {
            display: DisplayConfig {
                locale: Some("klingon".into()),
                timezone: Some("UTC".into()),
            },
            ..Config::default()
        };

        let err = cfg.date_formatter().unwrap_err();
        assert!(err.to_string().contains("Unknown locale 'klingon'"));
    }

    #[test]
    fn date_formatter_without_display_settings_detects() {
        let fmt = Config::default().date_formatter().unwrap();
        assert_eq!(fmt, DateFormatter::detect());
    }

    #[test]
    fn date_formatter_locale_only_keeps_detected_timezone() {
        let cfg = Config {
            display: DisplayConfig {
                locale: Some("fr_FR".into()),
                timezone: None,
            },
            ..Config::default()
        };

        let fmt = cfg.date_formatter().unwrap();
        assert_eq!(fmt.locale(), Locale::fr_FR);
        assert_eq!(fmt.timezone(), DateFormatter::detect().timezone());
    }

    #[test]
    fn load_missing_file_returns_default() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn save_then_load_preserves_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let cfg = Config {
            api_url: Some("https://api.example.com".into()),
            api_key: Some("KEY".into()),
            display: DisplayConfig {
                locale: Some("en_GB".into()),
                timezone: None,
            },
        };
        cfg.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), cfg);
    }

    #[test]
    fn load_reports_parse_errors_with_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "api_url = [").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn load_or_default_recovers_from_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "api_key = ").unwrap();

        let (cfg, err) = Config::load_from_or_default(&path);
        assert_eq!(cfg, Config::default());

        let err = err.expect("corrupt file should be reported");
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn load_or_default_returns_valid_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "api_key = \"KEY\"\n").unwrap();

        let (cfg, err) = Config::load_from_or_default(&path);
        assert_eq!(cfg.api_key.as_deref(), Some("KEY"));
        assert!(err.is_none());
    }

    #[test]
    fn file_without_display_section_parses() {
        let cfg: Config = toml::from_str(r#"api_key = "abc""#).unwrap();
        assert_eq!(cfg.api_key.as_deref(), Some("abc"));
        assert_eq!(cfg.display, DisplayConfig::default());
    }
}
