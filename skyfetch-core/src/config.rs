use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf, time::Duration};

use crate::{
    client::DEFAULT_BASE_URL,
    location::DEFAULT_IP_LOOKUP_URL,
    model::Coordinates,
};

/// Environment variable that overrides the stored API key.
pub const API_KEY_ENV: &str = "SKYFETCH_API_KEY";

const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// How "use my location" is resolved.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LocationConfig {
    /// When false, location lookups fail as permission denied.
    pub enabled: bool,

    /// Fixed position; both must be set to take effect.
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,

    pub ip_lookup_url: String,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            latitude: None,
            longitude: None,
            ip_lookup_url: DEFAULT_IP_LOOKUP_URL.to_string(),
        }
    }
}

impl LocationConfig {
    pub fn fixed_coordinates(&self) -> Option<Coordinates> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some(Coordinates::new(lat, lon)),
            _ => None,
        }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// timeout_secs = 10
///
/// [location]
/// enabled = true
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout_secs: u64,
    pub location: LocationConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            location: LocationConfig::default(),
        }
    }
}

impl Config {
    /// Load config from the platform config dir, or defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
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

        Ok(cfg)
    }

    /// Save config to the platform config dir, creating parent directories as needed.
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
        let dirs = ProjectDirs::from("dev", "skyfetch", "skyfetch")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// The API key to use, preferring `env_override` (the value of
    /// [`API_KEY_ENV`]) over the stored one. Blank values count as unset.
    pub fn api_key(&self, env_override: Option<String>) -> Result<String> {
        env_override
            .filter(|k| !k.trim().is_empty())
            .or_else(|| self.api_key.clone().filter(|k| !k.trim().is_empty()))
            .ok_or_else(|| {
                anyhow!(
                    "No API key configured.\n\
                     Hint: run `skyfetch configure` or set {API_KEY_ENV}."
                )
            })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_api_key_errors_with_hint() {
        let cfg = Config::default();
        let err = cfg.api_key(None).unwrap_err();

        assert!(err.to_string().contains("No API key configured"));
        assert!(err.to_string().contains("skyfetch configure"));
    }

    #[test]
    fn env_key_overrides_stored_key() {
        let cfg = Config { api_key: Some("STORED".into()), ..Config::default() };

        assert_eq!(cfg.api_key(Some("FROM_ENV".into())).unwrap(), "FROM_ENV");
        assert_eq!(cfg.api_key(Some("  ".into())).unwrap(), "STORED");
        assert_eq!(cfg.api_key(None).unwrap(), "STORED");
    }

    #[test]
    fn fixed_coordinates_need_both_values() {
        let mut loc = LocationConfig { latitude: Some(1.0), ..LocationConfig::default() };
        assert_eq!(loc.fixed_coordinates(), None);

        loc.longitude = Some(2.0);
        assert_eq!(loc.fixed_coordinates(), Some(Coordinates::new(1.0, 2.0)));
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_from(&dir.path().join("nope.toml")).unwrap();

        assert_eq!(cfg, Config::default());
        assert!(cfg.location.enabled);
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn save_then_load_preserves_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config { api_key: Some("KEY".into()), timeout_secs: 3, ..Config::default() };
        cfg.location.enabled = false;
        cfg.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), cfg);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "api_key = \"abc\"\n[location]\nenabled = false\n").unwrap();

        let cfg = Config::load_from(&path).unwrap();

        assert_eq!(cfg.api_key.as_deref(), Some("abc"));
        assert!(!cfg.location.enabled);
        assert_eq!(cfg.location.ip_lookup_url, DEFAULT_IP_LOOKUP_URL);
        assert_eq!(cfg.timeout(), Duration::from_secs(10));
    }

    #[test]
    fn garbage_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "this is = = not toml").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
